/*!
Per-connection session state.

A `Session` is created when a connection is accepted and destroyed when the
handshake completes or the transport fails. It owns this side's random
material for the current round plus the accumulated sifted key, and is
never shared across connections.
*/

use crate::core::channel::Basis;
use crate::core::sifting::sift;
use crate::protocol::state::{HandshakeState, Role};

/// State owned by one side of one handshake
#[derive(Debug)]
pub struct Session {
    role: Role,
    state: HandshakeState,
    round: u32,
    bits: Vec<u8>,
    bases: Vec<Basis>,
    peer_bases: Vec<Basis>,
    sifted: Vec<u8>,
}

impl Session {
    /// Create a fresh session for the given role
    pub fn new(role: Role) -> Self {
        Self {
            role,
            state: HandshakeState::Prepare,
            round: 0,
            bits: Vec::new(),
            bases: Vec::new(),
            peer_bases: Vec::new(),
            sifted: Vec::new(),
        }
    }

    /// Endpoint role
    pub fn role(&self) -> Role {
        self.role
    }

    /// Current handshake state
    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Rounds started so far, including the current one
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Sifted key accumulated in the current round
    pub fn sifted(&self) -> &[u8] {
        &self.sifted
    }

    pub(crate) fn set_state(&mut self, state: HandshakeState) {
        self.state = state;
    }

    /// Discard the previous round's material and start a new round
    pub(crate) fn begin_round(&mut self) {
        self.round += 1;
        self.state = HandshakeState::Prepare;
        self.bits.clear();
        self.bases.clear();
        self.peer_bases.clear();
        self.sifted.clear();
    }

    /// Install this round's bits and both basis sequences
    pub(crate) fn set_round_material(
        &mut self,
        bits: Vec<u8>,
        bases: Vec<Basis>,
        peer_bases: Vec<Basis>,
    ) {
        self.bits = bits;
        self.bases = bases;
        self.peer_bases = peer_bases;
    }

    /// Reconcile bases and return the sifted length
    pub(crate) fn sift_round(&mut self) -> usize {
        self.sifted = sift(&self.bits, &self.bases, &self.peer_bases);
        self.sifted.len()
    }
}
