/*!
Receiver-side handshake engine.

The receiver measures each incoming artifact against its own per-index
basis choice, announces its bases, and validates the sender's subset hash
against the same range of its own sifted key. A mismatch is presumed
eavesdropping: the receiver reports `"1"` and aborts.
*/

use std::io::{Read, Write};

use tracing::{debug, error, info};

use crate::core::channel::{EncodedBit, join_bases, measure, parse_bases, random_bases};
use crate::core::constants::sizes;
use crate::core::error::{Error, Result};
use crate::core::key::SessionKey;
use crate::core::sifting::{Subset, subset_hash};
use crate::protocol::config::ProtocolConfig;
use crate::protocol::session::Session;
use crate::protocol::state::{HandshakeState, Role};
use crate::transport::framed::FramedStream;

/// Drives the receiver side of one handshake over a framed connection
pub struct ReceiverEngine<'a, S> {
    stream: &'a mut FramedStream<S>,
    config: ProtocolConfig,
    session: Session,
}

impl<'a, S: Read + Write> ReceiverEngine<'a, S> {
    /// Create an engine over an established connection
    pub fn new(stream: &'a mut FramedStream<S>, config: ProtocolConfig) -> Self {
        Self {
            stream,
            config,
            session: Session::new(Role::Receiver),
        }
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

            // PREPARE: an independent basis choice per expected bit
            let bases = random_bases(&mut rng, self.config.round_size);

            // EXCHANGE_BITS: measure artifacts as the frames arrive
            self.session.set_state(HandshakeState::BitExchange);
            let mut bits = Vec::with_capacity(self.config.round_size);
            for &basis in &bases {
                let frame = self.stream.recv_frame()?;
                let artifact = EncodedBit::from_bytes(&frame)?;
                bits.push(measure(&artifact, basis));
            }

            // EXCHANGE_BASIS: we announce first, then the sender does
            self.session.set_state(HandshakeState::BasisExchange);
            self.stream.send_text(&join_bases(&bases))?;
            let peer_line = self.stream.recv_text()?;
            let peer_bases = parse_bases(&peer_line, self.config.round_size)?;

            // SIFT: same reconciliation as the sender, in lockstep
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

            // ERROR_CHECK: the sender's subset bounds and hash
            self.session.set_state(HandshakeState::ErrorCheck);
            let bounds = self.stream.recv_text()?;
            let subset = Subset::parse(&bounds, sifted_len)?;
            let peer_digest = self.stream.recv_text()?;
            if peer_digest.len() != sizes::DIGEST_HEX {
                return Err(Error::format(format!(
                    "subset digest must be {} hex characters, got {}",
                    sizes::DIGEST_HEX,
                    peer_digest.len()
                )));
            }

            // VALIDATE: compare against the same range of our sifted key
            self.session.set_state(HandshakeState::Validate);
            let digest = subset_hash(&subset.extract(self.session.sifted()));
            if digest == peer_digest {
                self.stream.send_text("0")?;
                break;
            }
            self.stream.send_text("1")?;
            self.session.set_state(HandshakeState::Aborted);
            error!("eavesdropper detected on the quantum channel");
            return Err(Error::EavesdropDetected);
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
