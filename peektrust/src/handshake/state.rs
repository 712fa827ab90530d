// Handshake state machines for both roles.

use crate::crypto::keys::{Nonce, SessionKey};

/// Initiator progress: Start -> NonceSent -> ResponseReceived -> Established | Failed.
#[derive(Debug)]
pub enum InitiatorState {
    /// Nothing sent yet.
    Start,

    /// Hello written; waiting for the reply.
    NonceSent {
        /// Our challenge, kept to check the echo in the reply.
        nonce_a: Nonce,
    },

    /// Reply decrypted; length and echo are being verified.
    ResponseReceived,

    /// Session key derived.
    Established,

    /// Terminal: the attempt must be discarded.
    Failed,
}

impl InitiatorState {
    /// Human-readable label for the current state (used in error messages).
    pub fn label(&self) -> &'static str {
        match self {
            InitiatorState::Start => "Start",
            InitiatorState::NonceSent { .. } => "NonceSent",
            InitiatorState::ResponseReceived => "ResponseReceived",
            InitiatorState::Established => "Established",
            InitiatorState::Failed => "Failed",
        }
    }
}

/// Responder progress: Listening -> HelloReceived -> Responded -> Established | Failed.
#[derive(Debug)]
pub enum ResponderState {
    /// Waiting for a hello.
    Listening,

    /// Hello decrypted and its length checked.
    HelloReceived,

    /// Reply built; the caller still has to deliver it.
    Responded {
        /// Key both sides will hold once the reply lands.
        session_key: SessionKey,
    },

    /// Reply delivered and session key handed out.
    Established,

    /// Terminal: the attempt must be discarded.
    Failed,
}

impl ResponderState {
    /// Human-readable label for the current state (used in error messages).
    pub fn label(&self) -> &'static str {
        match self {
            ResponderState::Listening => "Listening",
            ResponderState::HelloReceived => "HelloReceived",
            ResponderState::Responded { .. } => "Responded",
            ResponderState::Established => "Established",
            ResponderState::Failed => "Failed",
        }
    }
}
