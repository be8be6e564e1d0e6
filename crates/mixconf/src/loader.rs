//! Config file discovery, loading, and environment variable overlay.

use crate::sections::{BindConfig, MixerToolConfig, PersistMode, TelemetryConfig};
use crate::{ConfigError, MixerConfig};
use std::env;
use std::path::{Path, PathBuf};

const SYSTEM_CONFIG: &str = "/etc/amixer-webui/config.toml";
const USER_CONFIG: &str = "amixer-webui/config.toml";
const LOCAL_CONFIG: &str = "amixer-webui.toml";

/// INI file used by earlier releases (`[amixer-webui]` host/port).
pub const LEGACY_CONFIG: &str = "/etc/amixer-webui.conf";

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
    /// Legacy INI file that exists but was not read
    pub ignored_legacy: Option<PathBuf>,
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided and exists, it replaces the local override.
/// Returns paths in load order (system, user, local/cli). Only existing
/// files are returned.
pub fn discover_config_files(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from(SYSTEM_CONFIG);
    if system.exists() {
        files.push(system);
    }

    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join(USER_CONFIG);
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from(LOCAL_CONFIG);
    if local.exists() {
        files.push(local);
    }

    files
}

/// Load config from a TOML file.
pub fn load_from_file(path: &Path) -> Result<MixerConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_toml(&contents, path)
}

/// Parse config from a TOML string. Missing keys take their defaults.
pub fn parse_toml(contents: &str, path: &Path) -> Result<MixerConfig, ConfigError> {
    let mut config: MixerConfig =
        toml::from_str(contents).map_err(|e: toml::de::Error| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    // An empty host means "listen everywhere"
    if config.bind.host.trim().is_empty() {
        config.bind.host = BindConfig::default_host();
    }
    if let Some(endpoint) = &config.telemetry.otlp_endpoint {
        if endpoint.trim().is_empty() {
            config.telemetry.otlp_endpoint = None;
        }
    }
    config.mixer.card_registry = expand_path(&config.mixer.card_registry.to_string_lossy());

    Ok(config)
}

fn pick<T: PartialEq>(base: T, overlay: T, default: T) -> T {
    if overlay != default {
        overlay
    } else {
        base
    }
}

/// Merge two configs, with `overlay` taking precedence wherever it differs
/// from the compiled default.
pub fn merge_configs(base: MixerConfig, overlay: MixerConfig) -> MixerConfig {
    let bind = BindConfig::default();
    let mixer = MixerToolConfig::default();
    let telemetry = TelemetryConfig::default();

    MixerConfig {
        bind: BindConfig {
            host: pick(base.bind.host, overlay.bind.host, bind.host),
            port: pick(base.bind.port, overlay.bind.port, bind.port),
        },
        mixer: MixerToolConfig {
            amixer: pick(base.mixer.amixer, overlay.mixer.amixer, mixer.amixer),
            alsactl: pick(base.mixer.alsactl, overlay.mixer.alsactl, mixer.alsactl),
            card_registry: pick(
                base.mixer.card_registry,
                overlay.mixer.card_registry,
                mixer.card_registry,
            ),
            software_device: pick(
                base.mixer.software_device,
                overlay.mixer.software_device,
                mixer.software_device,
            ),
            software_label: pick(
                base.mixer.software_label,
                overlay.mixer.software_label,
                mixer.software_label,
            ),
            equalizer_device: pick(
                base.mixer.equalizer_device,
                overlay.mixer.equalizer_device,
                mixer.equalizer_device,
            ),
            persist: pick(base.mixer.persist, overlay.mixer.persist, mixer.persist),
        },
        telemetry: TelemetryConfig {
            log_level: pick(
                base.telemetry.log_level,
                overlay.telemetry.log_level,
                telemetry.log_level,
            ),
            otlp_endpoint: pick(
                base.telemetry.otlp_endpoint,
                overlay.telemetry.otlp_endpoint,
                telemetry.otlp_endpoint,
            ),
        },
    }
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut MixerConfig, sources: &mut ConfigSources) {
    apply_overrides_with(config, sources, |key| env::var(key).ok());
}

/// Apply overrides using an arbitrary variable lookup.
///
/// A variable is recorded in `sources` only when its value was applied.
pub fn apply_overrides_with<F>(config: &mut MixerConfig, sources: &mut ConfigSources, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = |key: &str| sources.env_overrides.push(key.to_string());

    if let Some(v) = lookup("AMIXER_WEBUI_HOST").filter(|v| !v.trim().is_empty()) {
        config.bind.host = v;
        applied("AMIXER_WEBUI_HOST");
    }
    if let Some(port) = lookup("AMIXER_WEBUI_PORT").and_then(|v| v.parse::<u16>().ok()) {
        config.bind.port = port;
        applied("AMIXER_WEBUI_PORT");
    }
    if let Some(v) = lookup("AMIXER_WEBUI_AMIXER") {
        config.mixer.amixer = v;
        applied("AMIXER_WEBUI_AMIXER");
    }
    if let Some(v) = lookup("AMIXER_WEBUI_ALSACTL") {
        config.mixer.alsactl = v;
        applied("AMIXER_WEBUI_ALSACTL");
    }
    if let Some(mode) = lookup("AMIXER_WEBUI_PERSIST").and_then(|v| v.parse::<PersistMode>().ok())
    {
        config.mixer.persist = mode;
        applied("AMIXER_WEBUI_PERSIST");
    }

    if let Some(v) = lookup("AMIXER_WEBUI_LOG_LEVEL") {
        config.telemetry.log_level = v;
        applied("AMIXER_WEBUI_LOG_LEVEL");
    }
    // RUST_LOG wins over the service-specific variable
    if let Some(v) = lookup("RUST_LOG") {
        config.telemetry.log_level = v;
        applied("RUST_LOG");
    }
    if let Some(v) = lookup("AMIXER_WEBUI_OTLP_ENDPOINT") {
        config.telemetry.otlp_endpoint = Some(v);
        applied("AMIXER_WEBUI_OTLP_ENDPOINT");
    }
    if let Some(v) = lookup("OTEL_EXPORTER_OTLP_ENDPOINT") {
        config.telemetry.otlp_endpoint = Some(v);
        applied("OTEL_EXPORTER_OTLP_ENDPOINT");
    }
}

/// The pre-TOML INI file, if one is present at `path`. It is never read.
pub fn legacy_config_file(path: &Path) -> Option<PathBuf> {
    path.is_file().then(|| path.to_path_buf())
}

/// Expand a leading `~/` to the home directory.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
