/*!
Sender-side handshake engine.

The sender prepares random bits and bases, transmits one artifact frame per
bit, reconciles bases, and drives the eavesdrop check: it samples a random
subset of the sifted key, publishes its bounds and hash, and waits for the
receiver's verdict.
*/

use std::io::{Read, Write};

use tracing::{debug, error, info};

use crate::core::channel::{Eavesdropper, encode, join_bases, parse_bases, random_bases, random_bits};
use crate::core::error::{Error, Result};
use crate::core::key::SessionKey;
use crate::core::sifting::{Subset, subset_hash};
use crate::protocol::config::ProtocolConfig;
use crate::protocol::session::Session;
use crate::protocol::state::{HandshakeState, Role};
use crate::transport::framed::FramedStream;

/// Drives the sender side of one handshake over a framed connection
pub struct SenderEngine<'a, S> {
    stream: &'a mut FramedStream<S>,
    config: ProtocolConfig,
    session: Session,
    eavesdropper: Option<Eavesdropper>,
}

impl<'a, S: Read + Write> SenderEngine<'a, S> {
    /// Create an engine over an established connection
    pub fn new(stream: &'a mut FramedStream<S>, config: ProtocolConfig) -> Self {
        Self {
            stream,
            config,
            session: Session::new(Role::Sender),
            eavesdropper: None,
        }
    }

    /// Route every transmitted artifact through an intercept-resend
    /// adversary, for demonstrating detection
    pub fn with_eavesdropper(mut self, eavesdropper: Eavesdropper) -> Self {
        self.eavesdropper = Some(eavesdropper);
        self
    }

    /// Session state, observable after `run` returns
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run the handshake to completion or abort
    pub fn run(&mut self) -> Result<SessionKey> {
        self.config.validate()?;
        let mut rng = rand::rng();

        loop {
            if self.session.round() >= self.config.max_rounds {
                return Err(Error::TooManyRetries {
                    rounds: self.session.round(),
                    minimum: self.config.min_sifted_bits,
                });
            }
            self.session.begin_round();
            debug!(round = self.session.round(), "starting key exchange round");

            // PREPARE
            let bits = random_bits(&mut rng, self.config.round_size);
            let bases = random_bases(&mut rng, self.config.round_size);

            // EXCHANGE_BITS: one artifact frame per bit, in index order
            self.session.set_state(HandshakeState::BitExchange);
            for (&bit, &basis) in bits.iter().zip(&bases) {
                let mut artifact = encode(bit, basis);
                if let Some(eavesdropper) = &self.eavesdropper {
                    artifact = eavesdropper.intercept(&artifact);
                }
                self.stream.send_frame(&artifact.to_bytes())?;
            }

            // EXCHANGE_BASIS: receiver announces first, then we do
            self.session.set_state(HandshakeState::BasisExchange);
            let peer_line = self.stream.recv_text()?;
            let peer_bases = parse_bases(&peer_line, self.config.round_size)?;
            self.stream.send_text(&join_bases(&bases))?;

            // SIFT
            self.session.set_state(HandshakeState::Sift);
            self.session.set_round_material(bits, bases, peer_bases);
            let sifted_len = self.session.sift_round();
            if sifted_len < self.config.min_sifted_bits {
                debug!(
                    round = self.session.round(),
                    sifted = sifted_len,
                    "insufficient sifted material, restarting round"
                );
                continue;
            }

            // ERROR_CHECK: publish subset bounds and hash
            self.session.set_state(HandshakeState::ErrorCheck);
            let subset = Subset::sample(&mut rng, sifted_len);
            let digest = subset_hash(&subset.extract(self.session.sifted()));
            self.stream.send_text(&subset.to_string())?;
            self.stream.send_text(&digest)?;

            // VALIDATE: receiver's verdict
            self.session.set_state(HandshakeState::Validate);
            let verdict = self.stream.recv_text()?;
            match verdict.as_str() {
                "0" => break,
                "1" => {
                    self.session.set_state(HandshakeState::Aborted);
                    error!("eavesdropper detected on the quantum channel");
                    return Err(Error::EavesdropDetected);
                }
                other => {
                    return Err(Error::format(format!(
                        "invalid validation verdict: {other:?}"
                    )));
                }
            }
        }

        // FINALIZE
        self.session.set_state(HandshakeState::Finalize);
        let key = SessionKey::derive(self.session.sifted())?;
        self.session.set_state(HandshakeState::Complete);
        info!(
            rounds = self.session.round(),
            sifted = self.session.sifted().len(),
            "session key established"
        );
        Ok(key)
    }
}
