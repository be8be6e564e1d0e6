//! Configuration sections. Each section carries its compiled defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Network bind address for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindConfig {
    /// Interface to listen on.
    /// Default: 0.0.0.0
    #[serde(default = "BindConfig::default_host")]
    pub host: String,

    /// HTTP port.
    /// Default: 8080
    #[serde(default = "BindConfig::default_port")]
    pub port: u16,
}

impl BindConfig {
    pub(crate) fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    pub(crate) fn default_port() -> u16 {
        8080
    }

    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

/// When to run the persistence utility after a mixer change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistMode {
    /// Persist only when running with an effective uid of 0.
    #[default]
    Auto,
    Always,
    Never,
}

impl fmt::Display for PersistMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Auto => "auto",
            Self::Always => "always",
            Self::Never => "never",
        };
        f.write_str(s)
    }
}

impl FromStr for PersistMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            other => Err(format!("unknown persist mode: {}", other)),
        }
    }
}

/// External mixer tooling and device naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixerToolConfig {
    /// Mixer utility used for queries and changes.
    /// Default: amixer
    #[serde(default = "MixerToolConfig::default_amixer")]
    pub amixer: String,

    /// Utility that stores the mixer state (`<alsactl> store`).
    /// Default: alsactl
    #[serde(default = "MixerToolConfig::default_alsactl")]
    pub alsactl: String,

    /// Line-oriented registry of hardware cards.
    /// Default: /proc/asound/cards
    #[serde(default = "MixerToolConfig::default_card_registry")]
    pub card_registry: PathBuf,

    /// Device name of the software audio server.
    /// Default: pulse
    #[serde(default = "MixerToolConfig::default_software_device")]
    pub software_device: String,

    /// Display name reported for the software audio server.
    /// Default: PulseAudio
    #[serde(default = "MixerToolConfig::default_software_label")]
    pub software_label: String,

    /// Device name of the equalizer plugin.
    /// Default: equal
    #[serde(default = "MixerToolConfig::default_equalizer_device")]
    pub equalizer_device: String,

    /// Persistence policy.
    /// Default: auto
    #[serde(default)]
    pub persist: PersistMode,
}

impl MixerToolConfig {
    pub(crate) fn default_amixer() -> String {
        "amixer".to_string()
    }

    pub(crate) fn default_alsactl() -> String {
        "alsactl".to_string()
    }

    pub(crate) fn default_card_registry() -> PathBuf {
        PathBuf::from("/proc/asound/cards")
    }

    pub(crate) fn default_software_device() -> String {
        "pulse".to_string()
    }

    pub(crate) fn default_software_label() -> String {
        "PulseAudio".to_string()
    }

    pub(crate) fn default_equalizer_device() -> String {
        "equal".to_string()
    }
}

impl Default for MixerToolConfig {
    fn default() -> Self {
        Self {
            amixer: Self::default_amixer(),
            alsactl: Self::default_alsactl(),
            card_registry: Self::default_card_registry(),
            software_device: Self::default_software_device(),
            software_label: Self::default_software_label(),
            equalizer_device: Self::default_equalizer_device(),
            persist: PersistMode::default(),
        }
    }
}

/// Logging and OpenTelemetry export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log filter (trace, debug, info, warn, error or a full EnvFilter directive).
    /// Default: info
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,

    /// OTLP gRPC endpoint. Export is disabled when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otlp_endpoint: Option<String>,
}

impl TelemetryConfig {
    pub(crate) fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            otlp_endpoint: None,
        }
    }
}
