//! Configuration loading for the ALSA mixer web service.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/amixer-webui/config.toml` (system)
//! 2. `~/.config/amixer-webui/config.toml` (user)
//! 3. `./amixer-webui.toml` or the `--config` path (local override)
//! 4. Environment variables (`AMIXER_WEBUI_*`, `RUST_LOG`, `OTEL_EXPORTER_OTLP_ENDPOINT`)
//!
//! The INI file `/etc/amixer-webui.conf` from earlier releases is not read.
//! When it exists its path is reported in [`ConfigSources::ignored_legacy`]
//! so the binary can warn; move its `host`/`port` into `[bind]`.
//!
//! # Example Config
//!
//! ```toml
//! [bind]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [mixer]
//! amixer = "amixer"
//! alsactl = "alsactl"
//! card_registry = "/proc/asound/cards"
//! software_device = "pulse"
//! equalizer_device = "equal"
//! persist = "auto"
//!
//! [telemetry]
//! log_level = "info"
//! otlp_endpoint = "127.0.0.1:4317"
//! ```

pub mod loader;
pub mod sections;

pub use loader::{discover_config_files, ConfigSources};
pub use sections::{BindConfig, MixerToolConfig, PersistMode, TelemetryConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to render config: {0}")]
    Render(String),
}

/// Complete service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MixerConfig {
    #[serde(default)]
    pub bind: BindConfig,

    #[serde(default)]
    pub mixer: MixerToolConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl MixerConfig {
    /// Load configuration from optional path and return information about sources.
    ///
    /// If `config_path` is provided, it takes precedence over the local
    /// `./amixer-webui.toml` override. System and user configs still load first.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = MixerConfig::default();

        for path in loader::discover_config_files(config_path) {
            let file_config = loader::load_from_file(&path)?;
            config = loader::merge_configs(config, file_config);
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources);
        sources.ignored_legacy = loader::legacy_config_file(Path::new(loader::LEGACY_CONFIG));

        Ok((config, sources))
    }

    /// Serialize config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        let body = toml::to_string_pretty(self).map_err(|e| ConfigError::Render(e.to_string()))?;
        Ok(format!("# amixer-webui configuration\n\n{}", body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MixerConfig::default();
        assert_eq!(config.bind.port, 8080);
        assert_eq!(config.mixer.persist, PersistMode::Auto);
        assert!(config.telemetry.otlp_endpoint.is_none());
    }

    #[test]
    fn test_to_toml_round_trips() {
        let config = MixerConfig::default();
        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("[bind]"));
        assert!(rendered.contains("[mixer]"));
        assert!(rendered.contains("persist = \"auto\""));

        let parsed = loader::parse_toml(&rendered, Path::new("rendered.toml")).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_cli_path_is_ignored() {
        let files = discover_config_files(Some(Path::new("/nonexistent/amixer-webui.toml")));
        assert!(!files.contains(&PathBuf::from("/nonexistent/amixer-webui.toml")));
    }
}
