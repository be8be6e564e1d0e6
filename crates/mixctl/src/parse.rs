//! Parser for `amixer scontents` reports.
//!
//! A report is a sequence of segments, each opened by a header line:
//!
//! ```text
//! Simple mixer control 'Capture',0
//!   Capabilities: cvolume cswitch
//!   Capture channels: Front Left - Front Right
//!   Limits: Capture 0 - 63
//!   Front Left: Capture 39 [62%] [12.00dB] [on]
//!   Front Right: Capture 39 [62%] [12.00dB] [on]
//! ```
//!
//! The first token after `Capabilities:` picks the control kind. Malformed
//! segments are logged and skipped; they never abort the report.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::index::ControlIndex;
use crate::types::{Control, ControlDetail};

const SEGMENT_MARKER: &str = "Simple mixer control ";

static PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+)%\]").expect("percent pattern is valid"));

/// Why a single segment was skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SegmentError {
    #[error("header is not of the form 'name',index: {0:?}")]
    MissingHeader(String),

    #[error("no capability token after the header")]
    MissingTypeLine,

    #[error("enumerated control has no Items line")]
    MissingItems,

    #[error("volume control has no Limits line")]
    MissingLimits,

    #[error("unreadable Limits line: {0:?}")]
    BadLimits(String),
}

/// Controls of one parse pass and the index that resolves their ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedReport {
    pub controls: Vec<Control>,
    /// `name` or `name,index`, position = control id.
    pub selectors: Vec<String>,
}

impl ParsedReport {
    pub fn into_parts(self) -> (Vec<Control>, ControlIndex) {
        (self.controls, ControlIndex::new(self.selectors))
    }
}

struct Segment<'a> {
    header: &'a str,
    body: Vec<&'a str>,
}

fn split_segments(text: &str) -> Vec<Segment<'_>> {
    let mut segments: Vec<Segment<'_>> = Vec::new();
    for line in text.lines() {
        if let Some(header) = line.strip_prefix(SEGMENT_MARKER) {
            segments.push(Segment {
                header,
                body: Vec::new(),
            });
        } else if let Some(current) = segments.last_mut() {
            current.body.push(line);
        }
    }
    segments
}

/// Parse a full report. Ids are assigned in order of the controls kept.
pub fn parse_report(text: &str) -> ParsedReport {
    let mut report = ParsedReport::default();

    for (position, segment) in split_segments(text).iter().enumerate() {
        match parse_segment(segment) {
            Ok((name, selector, detail)) => {
                report.controls.push(Control {
                    id: report.controls.len(),
                    name,
                    detail,
                });
                report.selectors.push(selector);
            }
            Err(error) => {
                warn!(
                    segment = position,
                    header = segment.header,
                    %error,
                    "skipping malformed mixer control"
                );
            }
        }
    }

    report
}

/// `'Mic',1` → (`Mic`, `Mic,1`). Index 0 is addressed by bare name.
fn parse_header(header: &str) -> Result<(String, String), SegmentError> {
    let missing = || SegmentError::MissingHeader(header.to_string());

    let (quoted, index) = header.trim_end().rsplit_once(',').ok_or_else(missing)?;
    let name = quoted
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .ok_or_else(missing)?;
    let index: u32 = index.trim().parse().map_err(|_| missing())?;

    let selector = if index == 0 {
        name.to_string()
    } else {
        format!("{},{}", name, index)
    };
    Ok((name.to_string(), selector))
}

fn parse_segment(segment: &Segment<'_>) -> Result<(String, String, ControlDetail), SegmentError> {
    let (name, selector) = parse_header(segment.header)?;

    let token = segment
        .body
        .first()
        .and_then(|line| line.split_whitespace().nth(1))
        .ok_or(SegmentError::MissingTypeLine)?;
    let rest = &segment.body[1..];

    let detail = if token.contains("enum") {
        parse_enumerated(rest)?
    } else if token.contains("switch") {
        parse_switch(rest)
    } else if token.contains("volume") {
        parse_volume(rest)?
    } else {
        ControlDetail::Other {
            token: token.to_string(),
        }
    };

    Ok((name, selector, detail))
}

/// Labels between single quotes, in order.
fn quoted_labels(line: &str) -> impl Iterator<Item = &str> {
    line.split('\'').skip(1).step_by(2)
}

fn parse_enumerated(lines: &[&str]) -> Result<ControlDetail, SegmentError> {
    let options: Vec<&str> = lines
        .iter()
        .map(|l| l.trim_start())
        .find(|l| l.starts_with("Items:"))
        .map(|l| quoted_labels(l).collect())
        .ok_or(SegmentError::MissingItems)?;

    // `Item0: 'Line'`, one line per selected channel
    let values = lines
        .iter()
        .map(|l| l.trim_start())
        .filter(|l| {
            l.strip_prefix("Item")
                .is_some_and(|r| r.starts_with(|c: char| c.is_ascii_digit()))
        })
        .flat_map(quoted_labels)
        .filter_map(|label| options.iter().position(|o| *o == label))
        .collect();

    let items: BTreeMap<usize, String> = options
        .iter()
        .enumerate()
        .map(|(i, label)| (i, label.to_string()))
        .collect();

    Ok(ControlDetail::Enumerated { items, values })
}

fn parse_switch(lines: &[&str]) -> ControlDetail {
    let mut values = Vec::new();
    for line in lines {
        if line.contains("[on]") {
            values.push(true);
        }
        if line.contains("[off]") {
            values.push(false);
        }
    }
    ControlDetail::Boolean { values }
}

fn parse_limits(line: &str) -> Result<(i64, i64), SegmentError> {
    let bad = || SegmentError::BadLimits(line.trim().to_string());
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(bad());
    }
    let min = tokens[tokens.len() - 3].parse().map_err(|_| bad())?;
    let max = tokens[tokens.len() - 1].parse().map_err(|_| bad())?;
    Ok((min, max))
}

fn parse_volume(lines: &[&str]) -> Result<ControlDetail, SegmentError> {
    let limits_line = lines
        .iter()
        .find(|l| l.contains("Limits:"))
        .ok_or(SegmentError::MissingLimits)?;
    let (min, max) = parse_limits(limits_line)?;

    let mut channels = Vec::new();
    let mut values = Vec::new();
    for line in lines {
        let Some(caps) = PERCENT.captures(line) else {
            continue;
        };
        let Some((channel, _)) = line.split_once(':') else {
            continue;
        };
        let Ok(percent) = caps[1].parse::<u32>() else {
            continue;
        };
        channels.push(channel.trim().to_string());
        values.push(percent);
    }

    Ok(ControlDetail::Integer {
        min,
        max,
        channels,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD_REPORT: &str = "\
Simple mixer control 'Master',0
  Capabilities: pvolume pvolume-joined pswitch pswitch-joined
  Playback channels: Mono
  Limits: Playback 0 - 87
  Mono: Playback 64 [74%] [-17.25dB] [on]
Simple mixer control 'PCM',0
  Capabilities: pvolume
  Playback channels: Front Left - Front Right
  Limits: Playback 0 - 255
  Mono:
  Front Left: Playback 255 [100%] [0.00dB]
  Front Right: Playback 191 [75%] [-12.00dB]
Simple mixer control 'IEC958',0
  Capabilities: pswitch pswitch-joined
  Playback channels: Mono
  Mono: Playback [off]
Simple mixer control 'Input Source',0
  Capabilities: cenum
  Items: 'Front Mic' 'Rear Mic' 'Line'
  Item0: 'Rear Mic'
Simple mixer control 'Input Source',1
  Capabilities: cenum
  Items: 'Front Mic' 'Rear Mic' 'Line'
  Item0: 'Line'
";

    const EQUALIZER_REPORT: &str = "\
Simple mixer control '00. 31 Hz',0
  Capabilities: volume
  Playback channels: Front Left - Front Right
  Capture channels: Front Left - Front Right
  Limits: 0 - 100
  Front Left: 66 [66%]
  Front Right: 60 [60%]
Simple mixer control '01. 63 Hz',0
  Capabilities: volume
  Playback channels: Front Left - Front Right
  Capture channels: Front Left - Front Right
  Limits: 0 - 100
  Front Left: 50 [50%]
  Front Right: 50 [50%]
";

    #[test]
    fn test_one_control_per_segment_in_order() {
        let report = parse_report(CARD_REPORT);
        let names: Vec<&str> = report.controls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Master", "PCM", "IEC958", "Input Source", "Input Source"]
        );
        for (position, control) in report.controls.iter().enumerate() {
            assert_eq!(control.id, position);
        }
        assert_eq!(
            report.selectors,
            vec!["Master", "PCM", "IEC958", "Input Source", "Input Source,1"]
        );
    }

    #[test]
    fn test_integer_channels_and_limits() {
        let report = parse_report(
            "Simple mixer control 'Front',0\n  Capabilities: pvolume\n  Playback channels: Front Left - Front Right\n  Limits: Playback 0 - 100\n  Front Left: Playback 50 [50%] [-20.00dB]\n  Front Right: Playback 75 [75%] [-8.00dB]\n",
        );

        assert_eq!(
            report.controls[0].detail,
            ControlDetail::Integer {
                min: 0,
                max: 100,
                channels: vec!["Front Left".to_string(), "Front Right".to_string()],
                values: vec![50, 75],
            }
        );
    }

    #[test]
    fn test_skips_lines_without_percent() {
        let report = parse_report(CARD_REPORT);
        match &report.controls[1].detail {
            ControlDetail::Integer {
                max,
                channels,
                values,
                ..
            } => {
                assert_eq!(*max, 255);
                assert_eq!(channels, &vec!["Front Left", "Front Right"]);
                assert_eq!(values, &vec![100, 75]);
            }
            other => panic!("expected INTEGER, got {:?}", other),
        }
    }

    #[test]
    fn test_boolean_one_value_per_marker() {
        let report = parse_report(
            "Simple mixer control 'Capture',0\n  Capabilities: cswitch\n  Capture channels: Front Left - Front Right\n  Front Left: Capture [on]\n  Front Right: Capture [on]\n",
        );
        assert_eq!(
            report.controls[0].detail,
            ControlDetail::Boolean {
                values: vec![true, true]
            }
        );

        let card = parse_report(CARD_REPORT);
        assert_eq!(
            card.controls[2].detail,
            ControlDetail::Boolean {
                values: vec![false]
            }
        );
    }

    #[test]
    fn test_enumerated_items_and_selection() {
        let report = parse_report(
            "Simple mixer control 'Source',0\n  Capabilities: enum\n  Items: 'Mic' 'Line'\n  Item0: 'Line'\n",
        );
        assert_eq!(
            report.controls[0].detail,
            ControlDetail::Enumerated {
                items: [(0, "Mic".to_string()), (1, "Line".to_string())].into(),
                values: vec![1],
            }
        );
    }

    #[test]
    fn test_enumerated_unknown_label_is_omitted() {
        let report = parse_report(
            "Simple mixer control 'Source',0\n  Capabilities: enum\n  Items: 'Mic' 'Line'\n  Item0: 'Aux'\n  Item1: 'Mic'\n",
        );
        match &report.controls[0].detail {
            ControlDetail::Enumerated { items, values } => {
                assert_eq!(items.keys().copied().collect::<Vec<_>>(), vec![0, 1]);
                assert_eq!(values, &vec![0]);
            }
            other => panic!("expected ENUMERATED, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_token_keeps_common_fields() {
        let report = parse_report("Simple mixer control 'Odd',0\n  Capabilities: cvol\n");
        assert_eq!(report.controls.len(), 1);
        assert_eq!(report.controls[0].kind().as_str(), "cvol");
    }

    #[test]
    fn test_malformed_segments_are_skipped() {
        let text = "\
Simple mixer control 'NoCaps',0
Simple mixer control 'NoLimits',0
  Capabilities: volume
  Front Left: 10 [10%]
Simple mixer control 'Master',0
  Capabilities: pvolume
  Limits: Playback 0 - 87
  Mono: Playback 87 [100%] [0.00dB] [on]
Simple mixer control 'NoItems',0
  Capabilities: enum
  Item0: 'Line'
";
        let report = parse_report(text);
        assert_eq!(report.controls.len(), 1);
        assert_eq!(report.controls[0].id, 0);
        assert_eq!(report.controls[0].name, "Master");
        assert_eq!(report.selectors, vec!["Master"]);
    }

    #[test]
    fn test_bad_limits() {
        assert!(matches!(
            parse_limits("  Limits: Playback low - high"),
            Err(SegmentError::BadLimits(_))
        ));
        assert_eq!(parse_limits("  Limits: Playback -16 - 0"), Ok((-16, 0)));
    }

    #[test]
    fn test_header_forms() {
        assert_eq!(
            parse_header("'Mic Boost',0").unwrap(),
            ("Mic Boost".to_string(), "Mic Boost".to_string())
        );
        assert_eq!(
            parse_header("'Mic',2").unwrap(),
            ("Mic".to_string(), "Mic,2".to_string())
        );
        assert!(parse_header("Mic").is_err());
    }

    #[test]
    fn test_equalizer_bands() {
        let (controls, index) = parse_report(EQUALIZER_REPORT).into_parts();
        assert_eq!(controls.len(), 2);
        assert_eq!(index.get(1), Some("01. 63 Hz"));
        match &controls[0].detail {
            ControlDetail::Integer { min, max, values, .. } => {
                assert_eq!((*min, *max), (0, 100));
                assert_eq!(values, &vec![66, 60]);
            }
            other => panic!("expected INTEGER, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_is_idempotent() {
        assert_eq!(parse_report(CARD_REPORT), parse_report(CARD_REPORT));
    }

    #[test]
    fn test_empty_and_preamble_only() {
        assert!(parse_report("").controls.is_empty());
        assert!(parse_report("amixer: Mixer attach default error\n").controls.is_empty());
    }
}
