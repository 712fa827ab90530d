//! Connection configuration.
//!
//! The shared secret and the address are passed explicitly to [`crate::dial`]
//! and [`crate::SecureListener::bind`]; this only tunes handshake deadlines
//! and buffer sizing.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PeekStreamError, Result};

/// Smallest accepted handshake read buffer.
pub const MIN_HANDSHAKE_READ_BUFFER: usize = 256;

/// Configuration for dialers and listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeekConfig {
    /// Deadline for writing our handshake message.
    pub handshake_write_timeout: Duration,
    /// Deadline for reading the peer's handshake message.
    pub handshake_read_timeout: Duration,
    /// Size of the single read used to receive a handshake message.
    pub handshake_read_buffer: usize,
}

impl Default for PeekConfig {
    fn default() -> Self {
        Self {
            handshake_write_timeout: Duration::from_secs(1),
            handshake_read_timeout: Duration::from_secs(1),
            handshake_read_buffer: MIN_HANDSHAKE_READ_BUFFER,
        }
    }
}

impl PeekConfig {
    pub fn validate(&self) -> Result<()> {
        if self.handshake_write_timeout.is_zero() || self.handshake_read_timeout.is_zero() {
            return Err(PeekStreamError::InvalidConfig(
                "handshake timeouts must be non-zero".into(),
            ));
        }
        if self.handshake_read_buffer < MIN_HANDSHAKE_READ_BUFFER {
            return Err(PeekStreamError::InvalidConfig(format!(
                "handshake_read_buffer {} is below the minimum of {MIN_HANDSHAKE_READ_BUFFER}",
                self.handshake_read_buffer
            )));
        }
        Ok(())
    }
}
