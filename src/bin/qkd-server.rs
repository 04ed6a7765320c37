//! QKD server: listens for peers and runs one BB84 handshake per
//! connection, registering each established key with the chat web server
//! named by the peer.

use std::time::Duration;

use clap::Parser;
use qkd_protocol::listener::QkdListener;
use qkd_protocol::protocol::ProtocolConfig;

#[derive(Debug, Parser)]
#[command(
    name = "qkd-server",
    version,
    about = "BB84 quantum key distribution server"
)]
struct Cli {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:8765")]
    listen: String,

    /// Simulate an intercept-resend eavesdropper between the peers.
    #[arg(long)]
    intercept: bool,

    /// Per-connection read timeout in seconds (0 disables).
    #[arg(long, default_value_t = 30)]
    read_timeout: u64,

    /// Rounds attempted per session before giving up.
    #[arg(long, default_value_t = 64)]
    max_rounds: u32,
}

fn main() -> qkd_protocol::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let read_timeout = (cli.read_timeout > 0).then(|| Duration::from_secs(cli.read_timeout));
    let config = ProtocolConfig::default().with_max_rounds(cli.max_rounds);

    let listener = QkdListener::bind(cli.listen.as_str(), config)?
        .with_intercept(cli.intercept)
        .with_read_timeout(read_timeout);
    if cli.intercept {
        tracing::warn!("interception mode on");
    }
    listener.run()
}
