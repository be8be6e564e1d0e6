//! Hardware card and software audio server discovery.

use std::io;
use std::path::Path;

use tracing::{debug, warn};

use crate::command::CommandBuilder;
use crate::error::MixerError;
use crate::invoke::CommandRunner;
use crate::types::{CardMap, SOFTWARE_DEVICE_ID};

/// One card line of the registry, e.g. ` 0 [PCH            ]: HDA-Intel - HDA Intel PCH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryCard {
    pub number: u32,
    /// The bracketed short id (`PCH`).
    pub short_id: String,
}

/// Extract card entries from registry text. Continuation lines are ignored.
pub fn parse_card_registry(text: &str) -> Vec<RegistryCard> {
    text.lines()
        .filter(|line| line.contains("]:"))
        .filter_map(|line| {
            let (number, rest) = line.trim().split_once(" [")?;
            let number = number.trim().parse().ok()?;
            let short_id = rest
                .split_once(']')
                .map(|(id, _)| id.trim().to_string())
                .unwrap_or_default();
            Some(RegistryCard { number, short_id })
        })
        .collect()
}

/// Read the registry file. A missing file means no hardware cards.
pub async fn read_card_registry(path: &Path) -> Result<Vec<RegistryCard>, MixerError> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(parse_card_registry(&text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no card registry, assuming no hardware cards");
            Ok(Vec::new())
        }
        Err(source) => Err(MixerError::Registry {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Display name from the second line of `amixer info`, e.g.
/// `  Mixer name	: 'Realtek ALC892'`.
pub fn parse_info_name(stdout: &str) -> Option<String> {
    let line = stdout.lines().nth(1)?;
    let (_, value) = line.split_once(':')?;
    let name = value.replace('\'', "").trim().to_string();
    (!name.is_empty()).then_some(name)
}

/// Build the device id → display name map.
///
/// Each registry card is probed with `info`; when the probe fails the
/// registry short id is used instead. The software audio server is listed
/// under [`SOFTWARE_DEVICE_ID`] only if its own probe succeeds.
pub async fn enumerate_cards(
    runner: &dyn CommandRunner,
    builder: &CommandBuilder,
    registry: &Path,
) -> Result<CardMap, MixerError> {
    let mut cards = CardMap::new();

    for card in read_card_registry(registry).await? {
        let command = builder.card_info(card.number);
        let name = match runner.run(&command).await {
            Ok(output) if output.success() => parse_info_name(&output.stdout_text()),
            Ok(output) => {
                warn!(%command, code = ?output.code, "card info probe failed");
                None
            }
            Err(e) => {
                warn!(%command, error = %e, "card info probe failed");
                None
            }
        };
        cards.insert(card.number, name.unwrap_or(card.short_id));
    }

    let probe = builder.software_info();
    match runner.run(&probe).await {
        Ok(output) if output.success() => {
            cards.insert(SOFTWARE_DEVICE_ID, builder.software_label().to_string());
        }
        Ok(_) => debug!(command = %probe, "software audio server not responding"),
        Err(e) => debug!(command = %probe, error = %e, "software audio server probe failed"),
    }

    Ok(cards)
}
