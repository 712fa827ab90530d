use peektrust::PeekTrustError;
use thiserror::Error;

/// All errors produced by the PeekStream connection layer.
#[derive(Debug, Error)]
pub enum PeekStreamError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("handshake timeout: {0}")]
    HandshakeTimeout(&'static str),

    #[error("connection closed during handshake")]
    ClosedDuringHandshake,

    #[error(transparent)]
    Trust(#[from] PeekTrustError),

    #[error("{0} timed out")]
    Timeout(&'static str),

    #[error("buffer too small: need {need}, have {have}")]
    BufferTooSmall { need: usize, have: usize },

    #[error("connection is closed")]
    ConnectionClosed,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PeekStreamError {
    /// True when the handshake was rejected or abandoned, i.e. the attempted
    /// connection has to be discarded.
    pub fn is_handshake_failure(&self) -> bool {
        match self {
            PeekStreamError::HandshakeTimeout(_) | PeekStreamError::ClosedDuringHandshake => true,
            PeekStreamError::Trust(e) => e.is_handshake_failure(),
            _ => false,
        }
    }

    /// True for handshake and steady-state deadline expiry.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            PeekStreamError::HandshakeTimeout(_) | PeekStreamError::Timeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PeekStreamError>;
