//! Established secure connections.
//!
//! Framing is one-to-one: every `write` encrypts the whole buffer into a single
//! message and every `read` performs a single underlying read and expects it
//! to hold exactly one message. Nothing is buffered or reassembled, so a
//! message that arrives split across reads fails to decrypt and must be resent.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use peektrust::{decrypt, encrypt, SessionKey, BLOCK_SIZE};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::error::{PeekStreamError, Result};

/// Extra scratch space per read: IV, padding header block and trailing padding.
pub const READ_OVERHEAD: usize = 3 * BLOCK_SIZE;

/// Run `fut` under an optional deadline, mapping expiry to `on_timeout`.
pub(crate) async fn io_deadline<F, T>(
    deadline: Option<Duration>,
    on_timeout: PeekStreamError,
    fut: F,
) -> Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    match deadline {
        Some(d) => match timeout(d, fut).await {
            Ok(res) => Ok(res?),
            Err(_) => Err(on_timeout),
        },
        None => Ok(fut.await?),
    }
}

async fn read_message<R>(
    reader: &mut R,
    key: &SessionKey,
    deadline: Option<Duration>,
    buf: &mut [u8],
) -> Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut scratch = BytesMut::zeroed(buf.len() + READ_OVERHEAD);
    let n = io_deadline(deadline, PeekStreamError::Timeout("read"), reader.read(&mut scratch)).await?;
    if n == 0 {
        return Ok(0);
    }

    let plain = decrypt(&scratch[..n], key.as_bytes()).map_err(|e| {
        debug!(received = n, error = %e, "dropping undecryptable message");
        e
    })?;
    if plain.len() > buf.len() {
        return Err(PeekStreamError::BufferTooSmall {
            need: plain.len(),
            have: buf.len(),
        });
    }
    buf[..plain.len()].copy_from_slice(&plain);
    Ok(plain.len())
}

async fn write_message<W>(
    writer: &mut W,
    key: &SessionKey,
    deadline: Option<Duration>,
    buf: &[u8],
) -> Result<usize>
where
    W: AsyncWrite + Unpin,
{
    let message = encrypt(buf, key.as_bytes())?;
    io_deadline(deadline, PeekStreamError::Timeout("write"), async {
        writer.write_all(&message).await?;
        writer.flush().await
    })
    .await?;
    Ok(buf.len())
}

/// A stream paired with the session key negotiated over it.
///
/// Generic over the transport so the same type serves TCP and in-memory
/// streams; `TcpStream` is the default.
pub struct SecureConnection<S = TcpStream> {
    stream: S,
    /// `None` once closed; dropping the key wipes it.
    key: Option<SessionKey>,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
}

impl<S> SecureConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(stream: S, key: SessionKey) -> Self {
        Self {
            stream,
            key: Some(key),
            read_timeout: None,
            write_timeout: None,
        }
    }

    /// The negotiated session key, or `None` after [`close`](Self::close).
    pub fn session_key(&self) -> Option<&SessionKey> {
        self.key.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.key.is_none()
    }

    /// Deadline applied to each subsequent `read`; `None` waits forever.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) {
        self.read_timeout = timeout;
    }

    /// Deadline applied to each subsequent `write`; `None` waits forever.
    pub fn set_write_timeout(&mut self, timeout: Option<Duration>) {
        self.write_timeout = timeout;
    }

    /// Encrypt all of `buf` as one message and write it.
    ///
    /// Returns `buf.len()` on success. An empty buffer is rejected because an
    /// empty message cannot be encrypted.
    pub async fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let key = self.key.as_ref().ok_or(PeekStreamError::ConnectionClosed)?;
        write_message(&mut self.stream, key, self.write_timeout, buf).await
    }

    /// Read one message and copy its plaintext into `buf`.
    ///
    /// Returns the plaintext length, or `Ok(0)` when the peer has closed the
    /// stream. No partial plaintext is ever returned.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let key = self.key.as_ref().ok_or(PeekStreamError::ConnectionClosed)?;
        read_message(&mut self.stream, key, self.read_timeout, buf).await
    }

    /// Shut down the write direction and discard the session key. Calling it
    /// again is a no-op.
    ///
    /// The peer reads EOF. The read direction of the transport stays open until
    /// the connection is dropped, but nothing can be read or written through
    /// it once the key is gone.
    pub async fn close(&mut self) -> Result<()> {
        if self.key.take().is_none() {
            return Ok(());
        }
        self.stream.shutdown().await?;
        Ok(())
    }

    /// Split into independently owned read and write halves.
    pub fn into_split(self) -> Result<(SecureReadHalf<S>, SecureWriteHalf<S>)> {
        let key = Arc::new(self.key.ok_or(PeekStreamError::ConnectionClosed)?);
        let (reader, writer) = tokio::io::split(self.stream);
        Ok((
            SecureReadHalf {
                reader,
                key: Arc::clone(&key),
                read_timeout: self.read_timeout,
            },
            SecureWriteHalf {
                writer,
                key,
                write_timeout: self.write_timeout,
            },
        ))
    }

    /// The underlying stream. Bytes written through it bypass encryption.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }
}

impl SecureConnection<TcpStream> {
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.stream.local_addr()?)
    }

    pub fn peer_addr(&self) -> Result<SocketAddr> {
        Ok(self.stream.peer_addr()?)
    }
}

/// Receiving half of a split [`SecureConnection`].
pub struct SecureReadHalf<S = TcpStream> {
    reader: ReadHalf<S>,
    key: Arc<SessionKey>,
    read_timeout: Option<Duration>,
}

impl<S: AsyncRead> SecureReadHalf<S> {
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) {
        self.read_timeout = timeout;
    }

    /// Same contract as [`SecureConnection::read`].
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        read_message(&mut self.reader, &self.key, self.read_timeout, buf).await
    }
}

/// Sending half of a split [`SecureConnection`].
pub struct SecureWriteHalf<S = TcpStream> {
    writer: WriteHalf<S>,
    key: Arc<SessionKey>,
    write_timeout: Option<Duration>,
}

impl<S: AsyncWrite> SecureWriteHalf<S> {
    pub fn set_write_timeout(&mut self, timeout: Option<Duration>) {
        self.write_timeout = timeout;
    }

    /// Same contract as [`SecureConnection::write`].
    pub async fn write(&mut self, buf: &[u8]) -> Result<usize> {
        write_message(&mut self.writer, &self.key, self.write_timeout, buf).await
    }

    /// Shut down the write direction.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }
}
