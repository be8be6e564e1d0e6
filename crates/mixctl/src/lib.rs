//! ALSA simple-mixer control through the `amixer` command line utility.
//!
//! `amixer scontents` reports are parsed into typed [`Control`] records whose
//! ids are positions in the most recent parse of their scope. Writes resolve
//! an id back to a selector and synthesize the matching `amixer set` call.
//! [`MixerService`] owns the selected device, the equalizer flag and both
//! control indices behind a single lock.

pub mod command;
pub mod context;
pub mod devices;
pub mod error;
pub mod index;
pub mod invoke;
pub mod parse;
pub mod service;
pub mod types;

pub use command::{format_percentages, CommandBuilder, MixerCommand};
pub use context::{ContextGuard, DeviceSelection, MixerContext, Scope};
pub use devices::enumerate_cards;
pub use error::MixerError;
pub use index::{ControlIndex, ControlTables};
pub use invoke::{CommandOutput, CommandRunner, InvokeError, SystemRunner};
pub use parse::{parse_report, ParsedReport};
pub use service::{is_elevated, should_persist, MixerService};
pub use types::{CardMap, Control, ControlDetail, ControlKind, SOFTWARE_DEVICE_ID};

#[cfg(any(test, feature = "testing"))]
pub use invoke::ScriptedRunner;
