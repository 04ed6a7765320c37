/*!
Session listener.

Accepts one connection per session and runs an independent sender engine
for each on its own thread. Sessions share nothing but the registration
endpoint; a failure in one never touches another. Each socket gets a read
timeout so a stalled peer cannot hold a session open forever.
*/

use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::core::channel::Eavesdropper;
use crate::core::constants::defaults;
use crate::core::error::{Error, Result};
use crate::protocol::config::ProtocolConfig;
use crate::protocol::sender::SenderEngine;
use crate::registration::{RegistrationClient, handle_registration};
use crate::transport::framed::FramedStream;

/// TCP listener serving one QKD handshake per accepted connection
pub struct QkdListener {
    listener: TcpListener,
    config: ProtocolConfig,
    registration: RegistrationClient,
    read_timeout: Option<Duration>,
    intercept: bool,
}

impl QkdListener {
    /// Bind to an address with the given protocol parameters
    pub fn bind(addr: impl ToSocketAddrs, config: ProtocolConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            listener: TcpListener::bind(addr)?,
            config,
            registration: RegistrationClient::new()?,
            read_timeout: Some(defaults::READ_TIMEOUT),
            intercept: false,
        })
    }

    /// Route every session's artifacts through an intercept-resend
    /// adversary (demonstration mode)
    pub fn with_intercept(mut self, intercept: bool) -> Self {
        self.intercept = intercept;
        self
    }

    /// Override the per-socket read timeout (`None` disables it)
    pub fn with_read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Use a preconfigured registration client
    pub fn with_registration(mut self, registration: RegistrationClient) -> Self {
        self.registration = registration;
        self
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever, one session thread per connection
    pub fn run(&self) -> Result<()> {
        info!(addr = %self.local_addr()?, "qkd server online");
        for connection in self.listener.incoming() {
            match connection {
                Ok(socket) => self.spawn_session(socket),
                Err(err) => warn!(error = %err, "failed to accept connection"),
            }
        }
        Ok(())
    }

    fn spawn_session(&self, socket: TcpStream) {
        let peer = socket.peer_addr().ok();
        let config = self.config.clone();
        let registration = self.registration.clone();
        let read_timeout = self.read_timeout;
        let intercept = self.intercept;
        thread::spawn(move || {
            info!(?peer, "session started");
            let outcome =
                serve_connection(socket, &config, &registration, read_timeout, intercept);
            match outcome {
                Ok(identity) => info!(?peer, identity = %identity, "session complete"),
                Err(Error::EavesdropDetected) => {
                    error!(?peer, "session aborted: eavesdropper on the quantum channel");
                }
                Err(err) => warn!(?peer, error = %err, "session failed"),
            }
        });
    }
}

/// Run one full sender-side session on an accepted socket
///
/// Returns the registered identity. The connection is torn down when the
/// socket drops, on success and failure alike.
pub fn serve_connection(
    socket: TcpStream,
    config: &ProtocolConfig,
    registration: &RegistrationClient,
    read_timeout: Option<Duration>,
    intercept: bool,
) -> Result<String> {
    socket.set_read_timeout(read_timeout)?;
    let mut stream = FramedStream::new(socket);

    let mut engine = SenderEngine::new(&mut stream, config.clone());
    if intercept {
        engine = engine.with_eavesdropper(Eavesdropper::new());
    }
    let key = engine.run()?;

    handle_registration(&mut stream, registration, &key)
}
