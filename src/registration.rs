/*!
Key registration with the external web service.

After a handshake finalizes, the receiver names a registration endpoint and
an identity over the same framed connection; the sender posts the
hex-encoded session key there and relays the outcome back as the final
frame. Key agreement and key registration are distinct success conditions:
a rejected registration fails the session even though the key is valid.
*/

use std::io::{Read, Write};
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use tracing::{info, warn};

use crate::core::constants::{REGISTRATION_AUTH, defaults};
use crate::core::error::{Error, Result};
use crate::core::key::SessionKey;
use crate::transport::framed::FramedStream;

/// Outcome of a registration attempt, as relayed on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStatus {
    /// Endpoint accepted the key (wire code `"0"`)
    Accepted,
    /// Endpoint rejected the key or was unreachable (wire code `"1"`)
    Rejected,
}

impl RegistrationStatus {
    /// Wire code for the final result frame
    pub fn code(self) -> &'static str {
        match self {
            RegistrationStatus::Accepted => "0",
            RegistrationStatus::Rejected => "1",
        }
    }
}

/// HTTP client for the registration endpoint
#[derive(Debug, Clone)]
pub struct RegistrationClient {
    http: Client,
}

impl RegistrationClient {
    /// Create a client with the default request timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(defaults::REGISTRATION_TIMEOUT)
    }

    /// Create a client with an explicit request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// `POST {endpoint}/update` with the hex key and claimed identity
    ///
    /// Only HTTP 200 counts as acceptance; any other status or transport
    /// failure is a registration failure, not an error.
    pub fn register(
        &self,
        endpoint: &str,
        key: &SessionKey,
        identity: &str,
    ) -> RegistrationStatus {
        let url = format!("{}/update", endpoint.trim_end_matches('/'));
        let form = [("quantkey", key.to_hex()), ("username", identity.to_string())];
        info!(identity = %identity, "updating quant key database");

        let response = self
            .http
            .post(&url)
            .header("Authorization", REGISTRATION_AUTH)
            .form(&form)
            .send();
        match response {
            Ok(response) if response.status() == StatusCode::OK => {
                RegistrationStatus::Accepted
            }
            Ok(response) => {
                warn!(status = %response.status(), "registration endpoint rejected key");
                RegistrationStatus::Rejected
            }
            Err(err) => {
                warn!(error = %err, "registration endpoint unreachable");
                RegistrationStatus::Rejected
            }
        }
    }
}

/// Sender-side final round-trip: receive the endpoint and identity frames,
/// register the key, and relay the result
///
/// Returns the registered identity on success.
pub fn handle_registration<S: Read + Write>(
    stream: &mut FramedStream<S>,
    client: &RegistrationClient,
    key: &SessionKey,
) -> Result<String> {
    let endpoint = stream.recv_text()?;
    let identity = stream.recv_text()?;
    let status = client.register(&endpoint, key, &identity);
    stream.send_text(status.code())?;
    match status {
        RegistrationStatus::Accepted => {
            info!(identity = %identity, "registered session key");
            Ok(identity)
        }
        RegistrationStatus::Rejected => Err(Error::RegistrationFailed),
    }
}

/// Receiver-side final round-trip: name the endpoint and identity, then
/// wait for the sender's registration result
pub fn request_registration<S: Read + Write>(
    stream: &mut FramedStream<S>,
    endpoint: &str,
    identity: &str,
) -> Result<()> {
    stream.send_text(endpoint)?;
    stream.send_text(identity)?;
    let result = stream.recv_text()?;
    match result.as_str() {
        "0" => Ok(()),
        "1" => Err(Error::RegistrationFailed),
        other => Err(Error::format(format!(
            "invalid registration result: {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_codes() {
        assert_eq!(RegistrationStatus::Accepted.code(), "0");
        assert_eq!(RegistrationStatus::Rejected.code(), "1");
    }

    #[test]
    fn test_unreachable_endpoint_is_rejected() {
        // Nothing listens on this port; the attempt must degrade to a
        // Rejected status rather than an error.
        let client = RegistrationClient::with_timeout(Duration::from_millis(200)).unwrap();
        let key = SessionKey::derive(&vec![1u8; 128]).unwrap();
        let status = client.register("http://127.0.0.1:1/", &key, "alice");
        assert_eq!(status, RegistrationStatus::Rejected);
    }
}
