//! Async drivers for the PeekTrust handshake.
//!
//! Each driver owns the raw stream for the duration of the exchange, performs
//! one write and one read under the configured deadlines, and hands back a
//! [`SecureConnection`] only if the handshake fully succeeded. On any error
//! the stream is dropped, which closes it.

use std::time::Duration;

use bytes::BytesMut;
use peektrust::{Initiator, Responder, SharedSecret};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace, warn};

use crate::config::PeekConfig;
use crate::conn::{io_deadline, SecureConnection};
use crate::error::{PeekStreamError, Result};

/// Run the initiator role over `stream`: send the hello, verify the reply.
pub async fn initiate<S>(
    mut stream: S,
    secret: &SharedSecret,
    config: &PeekConfig,
) -> Result<SecureConnection<S>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    config.validate()?;
    let mut initiator = Initiator::new(secret.clone());

    let hello = initiator.create_hello()?;
    send(&mut stream, hello.as_bytes(), config.handshake_write_timeout, "hello write").await?;
    trace!(len = hello.as_bytes().len(), "hello sent");

    let reply = receive(
        &mut stream,
        config.handshake_read_buffer,
        config.handshake_read_timeout,
        "reply read",
    )
    .await?;

    let session_key = initiator.process_reply(&reply).map_err(|e| {
        warn!(error = %e, "handshake reply rejected");
        e
    })?;
    debug!("handshake established as initiator");
    Ok(SecureConnection::new(stream, session_key))
}

/// Run the responder role over a freshly accepted `stream`.
pub async fn respond<S>(
    mut stream: S,
    secret: &SharedSecret,
    config: &PeekConfig,
) -> Result<SecureConnection<S>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    config.validate()?;
    let mut responder = Responder::new(secret.clone());

    let hello = receive(
        &mut stream,
        config.handshake_read_buffer,
        config.handshake_read_timeout,
        "hello read",
    )
    .await?;

    let reply = responder.process_hello(&hello).map_err(|e| {
        warn!(error = %e, "handshake hello rejected");
        e
    })?;
    send(&mut stream, reply.as_bytes(), config.handshake_write_timeout, "reply write").await?;
    trace!(len = reply.as_bytes().len(), "reply sent");

    let session_key = responder.complete()?;
    debug!("handshake established as responder");
    Ok(SecureConnection::new(stream, session_key))
}

async fn send<S>(stream: &mut S, message: &[u8], deadline: Duration, what: &'static str) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    io_deadline(Some(deadline), PeekStreamError::HandshakeTimeout(what), async {
        stream.write_all(message).await?;
        stream.flush().await
    })
    .await
}

/// One read of at most `capacity` bytes; the handshake never reassembles.
async fn receive<S>(
    stream: &mut S,
    capacity: usize,
    deadline: Duration,
    what: &'static str,
) -> Result<BytesMut>
where
    S: AsyncRead + Unpin,
{
    let mut buf = BytesMut::zeroed(capacity);
    let n = io_deadline(
        Some(deadline),
        PeekStreamError::HandshakeTimeout(what),
        stream.read(&mut buf),
    )
    .await?;
    if n == 0 {
        return Err(PeekStreamError::ClosedDuringHandshake);
    }
    buf.truncate(n);
    Ok(buf)
}
