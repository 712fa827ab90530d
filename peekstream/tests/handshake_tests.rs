//! Handshake driver tests over in-memory and TCP streams.

use std::time::Duration;

use peekstream::handshake::{initiate, respond};
use peekstream::{dial, PeekConfig, PeekStreamError, SecureListener, SharedSecret};
use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

fn secret(byte: u8) -> SharedSecret {
    SharedSecret::from_bytes([byte; 32])
}

#[tokio::test]
async fn duplex_handshake_agrees_on_key() {
    let (a, b) = duplex(4096);
    let config = PeekConfig::default();
    let s = secret(0x11);

    let (client, server) = tokio::join!(initiate(a, &s, &config), respond(b, &s, &config));
    let client = client.unwrap();
    let server = server.unwrap();

    assert_eq!(client.session_key().unwrap(), server.session_key().unwrap());
}

#[tokio::test]
async fn hello_and_reply_have_fixed_wire_sizes() {
    let (mut raw, b) = duplex(4096);
    let s = secret(0x12);
    let server = tokio::spawn(async move { respond(b, &secret(0x12), &PeekConfig::default()).await });

    let mut initiator = peektrust::Initiator::new(s);
    let hello = initiator.create_hello().unwrap();
    assert_eq!(hello.as_bytes().len(), 64);
    raw.write_all(hello.as_bytes()).await.unwrap();

    let mut reply = vec![0u8; 256];
    let n = raw.read(&mut reply).await.unwrap();
    assert_eq!(n, 96);
    let client_key = initiator.process_reply(&reply[..n]).unwrap();

    let server = server.await.unwrap().unwrap();
    assert_eq!(&client_key, server.session_key().unwrap());
}

#[tokio::test]
async fn duplex_mismatched_secrets_fail_both_ends() {
    let (a, b) = duplex(4096);
    let config = PeekConfig::default();
    let (client_secret, server_secret) = (secret(0x21), secret(0x22));
    let (client, server) = tokio::join!(
        initiate(a, &client_secret, &config),
        respond(b, &server_secret, &config)
    );

    let server_err = server.err().expect("responder must reject the hello");
    assert!(server_err.is_handshake_failure(), "{server_err}");
    // The responder drops the stream, so the initiator sees EOF.
    let client_err = client.err().expect("initiator must not establish");
    assert!(matches!(client_err, PeekStreamError::ClosedDuringHandshake), "{client_err}");
}

#[tokio::test(start_paused = true)]
async fn initiator_times_out_waiting_for_reply() {
    let (a, _silent_peer) = duplex(4096);
    let err = initiate(a, &secret(0x31), &PeekConfig::default())
        .await
        .err()
        .unwrap();
    assert!(matches!(err, PeekStreamError::HandshakeTimeout("reply read")), "{err}");
    assert!(err.is_timeout());
    assert!(err.is_handshake_failure());
}

#[tokio::test(start_paused = true)]
async fn responder_times_out_waiting_for_hello() {
    let (_silent_peer, b) = duplex(4096);
    let config = PeekConfig {
        handshake_read_timeout: Duration::from_millis(200),
        ..PeekConfig::default()
    };
    let err = respond(b, &secret(0x32), &config).await.err().unwrap();
    assert!(matches!(err, PeekStreamError::HandshakeTimeout("hello read")), "{err}");
}

#[tokio::test]
async fn responder_sees_closed_stream() {
    let (a, b) = duplex(4096);
    drop(a);
    let err = respond(b, &secret(0x33), &PeekConfig::default())
        .await
        .err()
        .unwrap();
    assert!(matches!(err, PeekStreamError::ClosedDuringHandshake));
}

#[tokio::test]
async fn responder_rejects_short_hello() {
    let (mut raw, b) = duplex(4096);
    let s = secret(0x34);
    let hello = peektrust::encrypt(&[0xAA; 16], s.as_bytes()).unwrap();
    raw.write_all(&hello).await.unwrap();

    let err = respond(b, &s, &PeekConfig::default()).await.err().unwrap();
    assert!(
        matches!(err, PeekStreamError::Trust(peektrust::PeekTrustError::HelloLength { .. })),
        "{err}"
    );
}

#[tokio::test]
async fn invalid_config_refused_before_io() {
    let (a, _b) = duplex(4096);
    let config = PeekConfig {
        handshake_read_buffer: 64,
        ..PeekConfig::default()
    };
    let err = initiate(a, &secret(0x35), &config).await.err().unwrap();
    assert!(matches!(err, PeekStreamError::InvalidConfig(_)));
}

#[tokio::test]
async fn tcp_mismatched_secrets_fail_both_ends() {
    let listener = SecureListener::bind("127.0.0.1:0", secret(0x41)).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move { listener.accept().await.map(|_| ()) });
    let client = dial(addr, &secret(0x42)).await;

    assert!(client.is_err());
    assert!(server.await.unwrap().is_err());
}

#[tokio::test]
async fn listener_survives_a_failed_handshake() {
    let s = secret(0x43);
    let listener = SecureListener::bind("127.0.0.1:0", s.clone()).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        assert!(listener.accept().await.is_err());
        listener.accept().await.map(|conn| conn.session_key().cloned())
    });

    assert!(dial(addr, &secret(0x44)).await.is_err());
    let client = dial(addr, &s).await.unwrap();
    let server_key = server.await.unwrap().unwrap();
    assert_eq!(client.session_key().cloned(), server_key);
}
