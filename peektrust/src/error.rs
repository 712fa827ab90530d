// PeekTrust error types

use thiserror::Error;

/// Top-level error type for the PeekTrust crate.
#[derive(Debug, Error)]
pub enum PeekTrustError {
    // ── Cipher errors ───────────────────────────────────────────────────
    #[error("invalid key length: {0} bytes (expected 16, 24 or 32)")]
    InvalidKeyLength(usize),

    #[error("invalid shared secret length: {0} bytes (expected 32)")]
    InvalidSecretLength(usize),

    #[error("cannot encrypt empty message")]
    EmptyPlaintext,

    #[error("cannot pad empty input")]
    EmptyInput,

    #[error("invalid block size: {0}")]
    InvalidBlockSize(usize),

    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    #[error("no valid padding")]
    InvalidPadding,

    #[error("secure random source failed: {0}")]
    Random(String),

    // ── Handshake errors ────────────────────────────────────────────────
    #[error("handshake message could not be decrypted: {0}")]
    HandshakeDecryption(#[source] Box<PeekTrustError>),

    #[error("remote hello too short: expected {expected} bytes, got {actual}")]
    HelloLength { expected: usize, actual: usize },

    #[error("remote reply too short: expected {expected} bytes, got {actual}")]
    ReplyLength { expected: usize, actual: usize },

    #[error("remote failed nonce challenge")]
    NonceChallengeFailed,

    #[error("invalid handshake state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },
}

impl PeekTrustError {
    /// True for failures raised while verifying a peer's handshake message.
    pub fn is_handshake_failure(&self) -> bool {
        matches!(
            self,
            PeekTrustError::HandshakeDecryption(_)
                | PeekTrustError::HelloLength { .. }
                | PeekTrustError::ReplyLength { .. }
                | PeekTrustError::NonceChallengeFailed
        )
    }
}

/// Crate-level result alias.
pub type Result<T> = std::result::Result<T, PeekTrustError>;
