//! Builds mixer utility invocations from a context and an operation.

use std::fmt;

use mixconf::MixerToolConfig;

use crate::context::{DeviceSelection, MixerContext};
use crate::error::MixerError;

/// A program plus its argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl MixerCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// True if `needle` appears as a contiguous run of arguments.
    pub fn has_args(&self, needle: &[&str]) -> bool {
        needle.is_empty()
            || self
                .args
                .windows(needle.len())
                .any(|w| w.iter().zip(needle).all(|(a, b)| a == b))
    }
}

impl fmt::Display for MixerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Join the numeric entries of `levels` as `"<n>%,<n>%"`.
///
/// Empty and non-numeric entries are dropped; order is preserved.
pub fn format_percentages<S: AsRef<str>>(levels: &[S]) -> String {
    levels
        .iter()
        .map(AsRef::as_ref)
        .filter(|level| !level.is_empty() && level.bytes().all(|b| b.is_ascii_digit()))
        .map(|level| format!("{}%", level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Synthesizes `amixer` / `alsactl` invocations.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    amixer: String,
    alsactl: String,
    software_device: String,
    software_label: String,
    equalizer_device: String,
}

impl CommandBuilder {
    pub fn new(config: &MixerToolConfig) -> Self {
        Self {
            amixer: config.amixer.clone(),
            alsactl: config.alsactl.clone(),
            software_device: config.software_device.clone(),
            software_label: config.software_label.clone(),
            equalizer_device: config.equalizer_device.clone(),
        }
    }

    /// Display name for the software audio server.
    pub fn software_label(&self) -> &str {
        &self.software_label
    }

    /// Utility name plus device flags for `context`. The equalizer device
    /// flag, when present, follows the card flag.
    pub fn base(&self, context: &MixerContext) -> MixerCommand {
        let mut command = MixerCommand::new(&self.amixer);
        match context.device() {
            DeviceSelection::SystemDefault => {}
            DeviceSelection::SoftwareServer => {
                command = command.args(["-D", self.software_device.as_str()]);
            }
            DeviceSelection::Card(n) => {
                command = command.arg("-c").arg(n.to_string());
            }
        }
        if context.equalizer_mode() {
            command = command.args(["-D", self.equalizer_device.as_str()]);
        }
        command
    }

    /// List every simple control with mapped volumes.
    pub fn query(&self, context: &MixerContext) -> MixerCommand {
        self.base(context).args(["scontents", "-M"])
    }

    pub fn set_switch(&self, context: &MixerContext, selector: &str, on: bool) -> MixerCommand {
        self.base(context)
            .args(["set", selector, if on { "on" } else { "off" }])
    }

    pub fn set_item(&self, context: &MixerContext, selector: &str, item: usize) -> MixerCommand {
        self.base(context)
            .args(["set", selector])
            .arg(item.to_string())
    }

    /// Set per-channel percentages. Fails when no entry of `levels` is numeric.
    pub fn set_levels<S: AsRef<str>>(
        &self,
        context: &MixerContext,
        selector: &str,
        levels: &[S],
    ) -> Result<MixerCommand, MixerError> {
        let joined = format_percentages(levels);
        if joined.is_empty() {
            return Err(MixerError::invalid("no numeric channel levels supplied"));
        }
        Ok(self
            .base(context)
            .args(["set", selector])
            .arg(joined)
            .arg("-M"))
    }

    /// Card info probe, used for the display name.
    pub fn card_info(&self, card: u32) -> MixerCommand {
        MixerCommand::new(&self.amixer)
            .arg("-c")
            .arg(card.to_string())
            .arg("info")
    }

    /// Info probe against the software audio server.
    pub fn software_info(&self) -> MixerCommand {
        MixerCommand::new(&self.amixer).args(["-D", self.software_device.as_str(), "info"])
    }

    /// Persist the current hardware mixer state.
    pub fn store(&self) -> MixerCommand {
        MixerCommand::new(&self.alsactl).arg("store")
    }
}
