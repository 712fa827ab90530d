// Handshake messages exchanged during the two-message PeekTrust protocol.
//
// Both messages are ordinary codec output keyed by the shared secret:
//
//   hello:  IV(16) || CBC(pad(nonceA))            = 64 bytes
//   reply:  IV(16) || CBC(pad(nonceA || nonceB)) = 96 bytes

use bytes::Bytes;

/// Wire length of a hello: IV, zero header block, two nonce blocks.
pub const HELLO_WIRE_LEN: usize = 64;

/// Wire length of a reply: IV, zero header block, four nonce blocks.
pub const REPLY_WIRE_LEN: usize = 96;

/// Message 1: Initiator -> Responder, carrying the encrypted nonce A.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeHello {
    ciphertext: Bytes,
}

impl HandshakeHello {
    pub(crate) fn new(ciphertext: Vec<u8>) -> Self {
        Self {
            ciphertext: Bytes::from(ciphertext),
        }
    }

    /// Raw bytes to write to the stream.
    pub fn as_bytes(&self) -> &[u8] {
        &self.ciphertext
    }
}

/// Message 2: Responder -> Initiator, echoing nonce A and adding nonce B.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeReply {
    ciphertext: Bytes,
}

impl HandshakeReply {
    pub(crate) fn new(ciphertext: Vec<u8>) -> Self {
        Self {
            ciphertext: Bytes::from(ciphertext),
        }
    }

    /// Raw bytes to write to the stream.
    pub fn as_bytes(&self) -> &[u8] {
        &self.ciphertext
    }
}
