// Integration tests for the PeekTrust 2-message handshake.

use peektrust::handshake::state::{InitiatorState, ResponderState};
use peektrust::{Initiator, PeekTrustError, Responder, SessionKey, SharedSecret};

fn secret(byte: u8) -> SharedSecret {
    SharedSecret::from_bytes([byte; 32])
}

/// Drive both roles to completion and return (initiator key, responder key).
fn run_handshake(client_secret: SharedSecret, server_secret: SharedSecret) -> (SessionKey, SessionKey) {
    let mut initiator = Initiator::new(client_secret);
    let mut responder = Responder::new(server_secret);
    let hello = initiator.create_hello().unwrap();
    let reply = responder.process_hello(hello.as_bytes()).unwrap();
    let client_key = initiator.process_reply(reply.as_bytes()).unwrap();
    let server_key = responder.complete().unwrap();
    (client_key, server_key)
}

// ── Key agreement ────────────────────────────────────────────────────────

#[test]
fn matching_secrets_agree_on_session_key() {
    let (client, server) = run_handshake(secret(0x10), secret(0x10));
    assert_eq!(client, server);
    assert_eq!(client.as_bytes().len(), 32);
}

#[test]
fn session_keys_are_fresh_per_handshake() {
    let (a, _) = run_handshake(secret(0x20), secret(0x20));
    let (b, _) = run_handshake(secret(0x20), secret(0x20));
    assert_ne!(a, b);
}

#[test]
fn zero_secret_is_usable() {
    let (client, server) = run_handshake(secret(0), secret(0));
    assert_eq!(client, server);
}

#[test]
fn mismatched_secrets_fail_on_responder() {
    let mut initiator = Initiator::new(secret(0x30));
    let mut responder = Responder::new(secret(0x31));
    let hello = initiator.create_hello().unwrap();
    let err = responder.process_hello(hello.as_bytes()).unwrap_err();
    assert!(err.is_handshake_failure(), "unexpected error: {err}");
    assert!(matches!(responder.state(), ResponderState::Failed));
    assert!(responder.complete().is_err());
}

#[test]
fn reply_under_wrong_secret_fails_on_initiator() {
    let mut initiator = Initiator::new(secret(0x40));
    initiator.create_hello().unwrap();
    let forged = peektrust::encrypt(&[0x01; 64], secret(0x41).as_bytes()).unwrap();
    let err = initiator.process_reply(&forged).unwrap_err();
    assert!(err.is_handshake_failure(), "unexpected error: {err}");
    assert!(matches!(initiator.state(), InitiatorState::Failed));
}

#[test]
fn replayed_reply_fails_nonce_challenge() {
    let mut first = Initiator::new(secret(0x50));
    let mut responder = Responder::new(secret(0x50));
    let hello = first.create_hello().unwrap();
    let old_reply = responder.process_hello(hello.as_bytes()).unwrap();

    let mut second = Initiator::new(secret(0x50));
    second.create_hello().unwrap();
    assert!(matches!(
        second.process_reply(old_reply.as_bytes()),
        Err(PeekTrustError::NonceChallengeFailed)
    ));
}

#[test]
fn responder_rejects_second_hello() {
    let mut initiator = Initiator::new(secret(0x60));
    let mut responder = Responder::new(secret(0x60));
    let hello = initiator.create_hello().unwrap();
    responder.process_hello(hello.as_bytes()).unwrap();
    assert!(matches!(
        responder.process_hello(hello.as_bytes()),
        Err(PeekTrustError::InvalidStateTransition { .. })
    ));
    assert!(matches!(responder.state(), ResponderState::Responded { .. }));
}

#[test]
fn garbage_hello_rejected() {
    let mut responder = Responder::new(secret(0x70));
    assert!(responder.process_hello(&[0u8; 64]).is_err());
    assert!(responder.process_hello(b"").is_err());
}

// ── Tampering ────────────────────────────────────────────────────────────

#[test]
fn bit_flip_in_hello_never_completes() {
    let s = secret(0x80);
    for bit in 0..64 * 8 {
        let mut initiator = Initiator::new(s.clone());
        let mut responder = Responder::new(s.clone());
        let mut hello = initiator.create_hello().unwrap().as_bytes().to_vec();
        hello[bit / 8] ^= 1 << (bit % 8);

        let Ok(reply) = responder.process_hello(&hello) else {
            continue;
        };
        assert!(
            initiator.process_reply(reply.as_bytes()).is_err(),
            "flip of hello bit {bit} went undetected"
        );
    }
}

#[test]
fn bit_flip_in_reply_never_agrees_on_a_key() {
    let s = secret(0x90);
    for bit in 0..96 * 8 {
        let mut initiator = Initiator::new(s.clone());
        let mut responder = Responder::new(s.clone());
        let hello = initiator.create_hello().unwrap();
        let mut reply = responder.process_hello(hello.as_bytes()).unwrap().as_bytes().to_vec();
        let server_key = responder.complete().unwrap();
        reply[bit / 8] ^= 1 << (bit % 8);

        match initiator.process_reply(&reply) {
            Err(e) => assert!(e.is_handshake_failure(), "bit {bit}: {e}"),
            // Flips confined to the nonce B blocks are not detectable without a
            // MAC, but they can never produce the responder's key.
            Ok(client_key) => {
                assert!(bit >= 64 * 8, "flip of reply bit {bit} went undetected");
                assert_ne!(client_key, server_key, "bit {bit}");
            }
        }
    }
}
