use anyhow::{Context, bail};
use clap::Parser;
use cu132_core::ProtocolError;
use cu132_core::session::{CuSession, SessionConfig};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Control Unit race monitor", long_about = None)]
struct Args {
    /// Serial port the CU is connected to (e.g. /dev/ttyUSB0)
    port: Option<String>,

    /// Load session settings from a TOML file
    #[arg(long)]
    config: Option<String>,

    /// Per-byte read timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Reject frames that fail checksum validation
    #[arg(long)]
    strict_checksum: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(if args.verbose {
                    tracing::Level::DEBUG.into()
                } else {
                    tracing::Level::INFO.into()
                })
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let mut config = match &args.config {
        Some(path) => {
            SessionConfig::load_from_file(path).with_context(|| format!("loading {path}"))?
        }
        None => SessionConfig::default(),
    };
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    if args.strict_checksum {
        config.enforce_checksum = true;
    }
    if config.port.is_empty() {
        bail!("no serial port given (pass it as an argument or via --config)");
    }

    info!(port = %config.port, "Connecting to CU");
    let mut session = CuSession::open(config).context("opening CU port")?;

    match session.version() {
        Ok(version) => info!(version, "Found CU"),
        Err(err) => warn!(error = %err, "Version query failed"),
    }

    loop {
        match session.poll() {
            Ok(Some(event)) => println!("{event}"),
            Ok(None) => {}
            Err(ProtocolError::Transport(err)) => {
                return Err(err).context("CU transport failed");
            }
            Err(err) => warn!(error = %err, "Protocol error, continuing"),
        }
    }
}
