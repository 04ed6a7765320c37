//! QKD client: connects to a QKD server, runs the receiver side of the
//! BB84 handshake, asks the server to register the key for a username,
//! and prints the key fingerprint used to log in to the chat front-end.

use std::net::TcpStream;
use std::time::Duration;

use clap::Parser;
use qkd_protocol::protocol::{ProtocolConfig, ReceiverEngine};
use qkd_protocol::registration::request_registration;
use qkd_protocol::transport::FramedStream;

#[derive(Debug, Parser)]
#[command(
    name = "qkd-client",
    version,
    about = "BB84 quantum key distribution client"
)]
struct Cli {
    /// Username to register for the chat system.
    username: String,

    /// Address of the QKD server (host:port).
    qkd: String,

    /// URL of the secure chat web server.
    url: String,

    /// Read timeout in seconds (0 disables).
    #[arg(long, default_value_t = 30)]
    read_timeout: u64,
}

fn main() -> qkd_protocol::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let socket = TcpStream::connect(cli.qkd.as_str())?;
    let read_timeout = (cli.read_timeout > 0).then(|| Duration::from_secs(cli.read_timeout));
    socket.set_read_timeout(read_timeout)?;

    let mut stream = FramedStream::new(socket);
    let key = ReceiverEngine::new(&mut stream, ProtocolConfig::default()).run()?;
    request_registration(&mut stream, &cli.url, &cli.username)?;

    println!(
        "authenticated {} with shared key fingerprint: {}",
        cli.username,
        key.fingerprint()
    );
    Ok(())
}
