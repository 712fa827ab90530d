// PeekTrust handshake protocol: 2-message nonce exchange under a pre-shared secret.
//
//   Initiator                          Responder
//     |--- hello: E_s(nonceA) ------------->|
//     |<-- reply: E_s(nonceA || nonceB) ----|
//     |==== session key = SHA-256(nonceA || nonceB) ====|
//
// Neither role touches the network; the caller moves the bytes.

use std::mem;

use zeroize::Zeroizing;

use crate::crypto::cipher::{decrypt, encrypt};
use crate::crypto::keys::{Nonce, SessionKey, SharedSecret, NONCE_LEN};
use crate::error::{PeekTrustError, Result};
use crate::handshake::messages::{HandshakeHello, HandshakeReply};
use crate::handshake::state::{InitiatorState, ResponderState};

fn handshake_decrypt(message: &[u8], secret: &SharedSecret) -> Result<Zeroizing<Vec<u8>>> {
    decrypt(message, secret.as_bytes())
        .map(Zeroizing::new)
        .map_err(|e| PeekTrustError::HandshakeDecryption(Box::new(e)))
}

// ── Initiator ────────────────────────────────────────────────────────────

/// Dialing side of the handshake.
pub struct Initiator {
    secret: SharedSecret,
    state: InitiatorState,
}

impl Initiator {
    pub fn new(secret: SharedSecret) -> Self {
        Self {
            secret,
            state: InitiatorState::Start,
        }
    }

    pub fn state(&self) -> &InitiatorState {
        &self.state
    }

    /// Step 1: draw nonce A and encrypt it under the shared secret.
    pub fn create_hello(&mut self) -> Result<HandshakeHello> {
        if !matches!(self.state, InitiatorState::Start) {
            return Err(PeekTrustError::InvalidStateTransition {
                from: self.state.label().into(),
                to: "NonceSent".into(),
            });
        }

        let nonce_a = Nonce::generate()?;
        let ciphertext = encrypt(nonce_a.as_bytes(), self.secret.as_bytes())?;
        self.state = InitiatorState::NonceSent { nonce_a };
        Ok(HandshakeHello::new(ciphertext))
    }

    /// Step 2: verify the responder echoed nonce A and derive the session key.
    ///
    /// Any failure leaves the initiator in `Failed`.
    pub fn process_reply(&mut self, reply: &[u8]) -> Result<SessionKey> {
        let nonce_a = match mem::replace(&mut self.state, InitiatorState::Failed) {
            InitiatorState::NonceSent { nonce_a } => nonce_a,
            other => {
                let from = other.label();
                self.state = other;
                return Err(PeekTrustError::InvalidStateTransition {
                    from: from.into(),
                    to: "ResponseReceived".into(),
                });
            }
        };

        let plain = handshake_decrypt(reply, &self.secret)?;
        self.state = InitiatorState::ResponseReceived;

        if plain.len() != 2 * NONCE_LEN {
            self.state = InitiatorState::Failed;
            return Err(PeekTrustError::ReplyLength {
                expected: 2 * NONCE_LEN,
                actual: plain.len(),
            });
        }

        // Only a holder of the secret can produce a decryptable echo of nonce A.
        if !nonce_a.ct_matches(&plain[..NONCE_LEN]) {
            self.state = InitiatorState::Failed;
            return Err(PeekTrustError::NonceChallengeFailed);
        }

        let session_key = SessionKey::derive(&plain);
        self.state = InitiatorState::Established;
        Ok(session_key)
    }
}

// ── Responder ────────────────────────────────────────────────────────────

/// Accepting side of the handshake; one per accepted stream.
pub struct Responder {
    secret: SharedSecret,
    state: ResponderState,
}

impl Responder {
    pub fn new(secret: SharedSecret) -> Self {
        Self {
            secret,
            state: ResponderState::Listening,
        }
    }

    pub fn state(&self) -> &ResponderState {
        &self.state
    }

    /// Step 1 (responder side): decrypt nonce A, draw nonce B and build the reply.
    ///
    /// The session key is held back until [`Responder::complete`] so that it
    /// is only released once the caller has delivered the reply.
    pub fn process_hello(&mut self, hello: &[u8]) -> Result<HandshakeReply> {
        if !matches!(self.state, ResponderState::Listening) {
            return Err(PeekTrustError::InvalidStateTransition {
                from: self.state.label().into(),
                to: "HelloReceived".into(),
            });
        }
        self.state = ResponderState::Failed;

        let nonce_a = handshake_decrypt(hello, &self.secret)?;
        if nonce_a.len() != NONCE_LEN {
            return Err(PeekTrustError::HelloLength {
                expected: NONCE_LEN,
                actual: nonce_a.len(),
            });
        }
        self.state = ResponderState::HelloReceived;

        match self.build_reply(&nonce_a) {
            Ok((reply, session_key)) => {
                self.state = ResponderState::Responded { session_key };
                Ok(reply)
            }
            Err(e) => {
                self.state = ResponderState::Failed;
                Err(e)
            }
        }
    }

    fn build_reply(&self, nonce_a: &[u8]) -> Result<(HandshakeReply, SessionKey)> {
        let nonce_b = Nonce::generate()?;
        let mut transcript = Zeroizing::new(Vec::with_capacity(2 * NONCE_LEN));
        transcript.extend_from_slice(nonce_a);
        transcript.extend_from_slice(nonce_b.as_bytes());

        let ciphertext = encrypt(&transcript, self.secret.as_bytes())?;
        Ok((HandshakeReply::new(ciphertext), SessionKey::derive(&transcript)))
    }

    /// Step 2 (responder side): the reply is on the wire; release the session key.
    pub fn complete(&mut self) -> Result<SessionKey> {
        match mem::replace(&mut self.state, ResponderState::Established) {
            ResponderState::Responded { session_key } => Ok(session_key),
            other => {
                let from = other.label();
                self.state = other;
                Err(PeekTrustError::InvalidStateTransition {
                    from: from.into(),
                    to: "Established".into(),
                })
            }
        }
    }
}
