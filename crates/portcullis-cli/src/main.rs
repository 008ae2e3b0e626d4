//! Access terminal runner.
//!
//! Runs the terminal core against the configured remote authority, with
//! credentials typed on standard input and the indicator rendered as log
//! lines. Stops on Ctrl-C.

mod console;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use portcullis_core::Identity;
use portcullis_hardware::mock::{MockCredentialReader, MockPowerSensor};
use portcullis_network::{HttpTransport, HttpTransportConfig};
use portcullis_terminal::{Peripherals, Terminal, TerminalConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::console::{CardLayout, ConsoleIndicator};

#[derive(Parser, Debug)]
#[command(name = "portcullis")]
#[command(version, about, long_about = None)]
struct Args {
    /// Terminal configuration file
    #[arg(short, long, env = "PORTCULLIS_CONFIG", default_value = "portcullis.toml")]
    config: PathBuf,

    /// File holding the secret seed the reader key is derived from
    #[arg(short, long, env = "PORTCULLIS_SEED_FILE")]
    seed_file: PathBuf,

    /// Override the remote authority address
    #[arg(long)]
    server_url: Option<String>,

    #[arg(long, env = "PORTCULLIS_LOG", default_value = "info")]
    log_level: String,
}

fn load_config(path: &Path) -> Result<TerminalConfig> {
    if !path.exists() {
        warn!(path = %path.display(), "Configuration file not found, using defaults");
        return Ok(TerminalConfig::default());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

/// Raw seed bytes; key derivation strips the trailing terminator itself.
fn load_seed(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read seed file {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = load_config(&args.config)?;
    if let Some(server_url) = args.server_url {
        config.server_url = server_url;
    }
    config.validate().context("invalid configuration")?;

    let seed = load_seed(&args.seed_file)?;
    let identity =
        Identity::derive(config.reader_id, &seed).context("reader key derivation failed")?;

    let transport = HttpTransport::new(HttpTransportConfig {
        server_url: config.server_url.clone(),
        timeout: config.request_timeout(),
    })
    .context("failed to build HTTP transport")?;

    let (reader, reader_handle) = MockCredentialReader::with_name("console".to_string());
    let (power, _power_handle) = MockPowerSensor::new();
    let layout = CardLayout {
        first_block: config.first_block,
        block_key: config.block_key,
    };

    let terminal = Terminal::new(
        identity,
        config,
        Peripherals {
            reader,
            indicator: ConsoleIndicator,
            power,
        },
        transport,
    )
    .start()
    .await?;

    let console = tokio::spawn(console::feed_credentials(reader_handle, layout));

    let cancel = terminal.cancellation_token();
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for Ctrl-C")?;
            info!("Ctrl-C received");
        }
        () = cancel.cancelled() => {}
    }

    console.abort();
    let report = terminal.shutdown().await;
    if report.failed + report.panicked > 0 {
        anyhow::bail!("terminal stopped with {} failed tasks", report.failed + report.panicked);
    }
    Ok(())
}
