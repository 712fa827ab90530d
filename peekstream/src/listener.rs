//! TCP entry points: [`dial`] for the initiator, [`SecureListener`] for the responder.

use std::net::SocketAddr;

use peektrust::SharedSecret;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tracing::{debug, warn};

use crate::config::PeekConfig;
use crate::conn::SecureConnection;
use crate::error::Result;
use crate::handshake::{initiate, respond};

/// Connect to `addr` and negotiate a session key with default deadlines.
pub async fn dial<A: ToSocketAddrs>(addr: A, secret: &SharedSecret) -> Result<SecureConnection> {
    dial_with_config(addr, secret, &PeekConfig::default()).await
}

/// Connect to `addr` and negotiate a session key.
pub async fn dial_with_config<A: ToSocketAddrs>(
    addr: A,
    secret: &SharedSecret,
    config: &PeekConfig,
) -> Result<SecureConnection> {
    config.validate()?;
    let stream = TcpStream::connect(addr).await?;
    // Each write is one message; don't let Nagle hold it back.
    stream.set_nodelay(true)?;
    let peer = stream.peer_addr()?;
    debug!(%peer, "connected, starting handshake");
    initiate(stream, secret, config).await
}

/// Listens for TCP connections and runs the responder handshake on each.
///
/// The shared secret is fixed at bind time and only read afterwards, so a
/// listener can be shared behind an `Arc` by concurrent accept loops.
pub struct SecureListener {
    listener: TcpListener,
    secret: SharedSecret,
    config: PeekConfig,
}

impl SecureListener {
    /// Bind to `addr` with default deadlines.
    pub async fn bind<A: ToSocketAddrs>(addr: A, secret: SharedSecret) -> Result<Self> {
        Self::bind_with_config(addr, secret, PeekConfig::default()).await
    }

    pub async fn bind_with_config<A: ToSocketAddrs>(
        addr: A,
        secret: SharedSecret,
        config: PeekConfig,
    ) -> Result<Self> {
        config.validate()?;
        let listener = TcpListener::bind(addr).await?;
        debug!(addr = ?listener.local_addr().ok(), "listening");
        Ok(Self {
            listener,
            secret,
            config,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept the next connection and complete the handshake on it.
    ///
    /// A failed handshake is returned as an error for that connection only;
    /// the listener stays usable.
    pub async fn accept(&self) -> Result<SecureConnection> {
        let (stream, peer) = self.accept_raw().await?;
        match respond(stream, &self.secret, &self.config).await {
            Ok(conn) => {
                debug!(%peer, "accepted secure connection");
                Ok(conn)
            }
            Err(e) => {
                warn!(%peer, error = %e, "handshake with peer failed");
                Err(e)
            }
        }
    }

    /// Accept a TCP connection without running the handshake, so the caller
    /// can run [`respond`] on its own task.
    pub async fn accept_raw(&self) -> Result<(TcpStream, SocketAddr)> {
        let (stream, peer) = self.listener.accept().await?;
        stream.set_nodelay(true)?;
        Ok((stream, peer))
    }
}
