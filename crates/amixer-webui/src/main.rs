//! amixer-webui - serve the ALSA mixer over HTTP
//!
//! ```text
//! amixer-webui                 # 0.0.0.0:8080, config files + env
//! amixer-webui -l 127.0.0.1 -p 9000 -d
//! amixer-webui --show-config   # print the effective config and exit
//! ```

use std::path::PathBuf;

use amixer_webui::{serve, telemetry};
use anyhow::{Context, Result};
use clap::Parser;
use mixconf::MixerConfig;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "amixer-webui")]
#[command(about = "Web interface for the ALSA mixer")]
#[command(version)]
struct Cli {
    /// Address to listen on
    #[arg(short = 'l', long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Log at debug level
    #[arg(short, long)]
    debug: bool,

    /// Config file, read after the system and user files
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    show_config: bool,
}

impl Cli {
    fn apply(&self, config: &mut MixerConfig) {
        if let Some(host) = &self.host {
            config.bind.host = host.clone();
        }
        if let Some(port) = self.port {
            config.bind.port = port;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, sources) = MixerConfig::load_with_sources_from(cli.config.as_deref())
        .context("Failed to load configuration")?;
    cli.apply(&mut config);

    if cli.show_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let telemetry = telemetry::init(&config.telemetry, cli.debug)?;

    for file in &sources.files {
        info!("Loaded config from {}", file.display());
    }
    if !sources.env_overrides.is_empty() {
        info!("Environment overrides: {}", sources.env_overrides.join(", "));
    }
    if let Some(legacy) = &sources.ignored_legacy {
        warn!(
            "Ignoring {}: INI config is no longer read, move host/port into [bind] of a TOML config",
            legacy.display()
        );
    }

    let result = serve::run(&config).await;
    telemetry.shutdown();
    result
}
