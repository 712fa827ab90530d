// PeekTrust: pre-shared-secret handshake and message codec
//
// Crate root: module declarations and public re-exports.

pub mod crypto;
pub mod error;
pub mod handshake;

// Re-export key types at crate root for convenience.
pub use crypto::cipher::{decrypt, encrypt, BLOCK_SIZE};
pub use crypto::keys::{Nonce, SessionKey, SharedSecret, NONCE_LEN, SECRET_LEN, SESSION_KEY_LEN};
pub use error::{PeekTrustError, Result};
pub use handshake::protocol::{Initiator, Responder};
