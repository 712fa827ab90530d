//! PeekStream -- encrypted connections over an ordered byte stream.
//!
//! A connection is keyed by the PeekTrust handshake: both ends prove they hold
//! the same pre-shared secret, agree on a fresh session key, and from then on
//! every `write` is one AES-CBC message and every `read` expects exactly one.
//!
//! - [`dial`] / [`SecureListener`]: TCP entry points.
//! - [`handshake::initiate`] / [`handshake::respond`]: run the handshake over
//!   any `AsyncRead + AsyncWrite` stream.
//! - [`SecureConnection`]: the established channel.

pub mod config;
pub mod conn;
pub mod error;
pub mod handshake;
pub mod listener;

// Re-export key public types at crate root.
pub use config::PeekConfig;
pub use conn::{SecureConnection, SecureReadHalf, SecureWriteHalf};
pub use error::{PeekStreamError, Result};
pub use listener::{dial, dial_with_config, SecureListener};
pub use peektrust::{SessionKey, SharedSecret};
