// AES-CBC message codec with length-prefixed padding.
//
// Every encrypted message on the wire, handshake or application, is
//
//   IV (16 bytes) || AES-CBC(pad(plaintext))
//
// The key size selects AES-128, AES-192 or AES-256. There is no MAC: a
// successful unpad is the only integrity signal this codec provides.

use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::crypto::padding::{pad, unpad};
use crate::error::{PeekTrustError, Result};

/// AES block size; also the IV length.
pub const BLOCK_SIZE: usize = 16;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;
type Aes192CbcEnc = cbc::Encryptor<Aes192>;
type Aes192CbcDec = cbc::Decryptor<Aes192>;
type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// AES variant selected by key length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AesVariant {
    Aes128,
    Aes192,
    Aes256,
}

impl AesVariant {
    fn for_key(key: &[u8]) -> Result<Self> {
        match key.len() {
            16 => Ok(AesVariant::Aes128),
            24 => Ok(AesVariant::Aes192),
            32 => Ok(AesVariant::Aes256),
            other => Err(PeekTrustError::InvalidKeyLength(other)),
        }
    }

    /// CBC-encrypt `buf` in place. `buf.len()` must be a multiple of the block size.
    fn encrypt_in_place(self, key: &[u8], iv: &[u8], buf: &mut [u8]) -> Result<()> {
        let len = buf.len();
        let res = match self {
            AesVariant::Aes128 => Aes128CbcEnc::new_from_slices(key, iv)
                .map_err(|e| PeekTrustError::MalformedCiphertext(format!("cipher init: {e}")))?
                .encrypt_padded_mut::<NoPadding>(buf, len)
                .map(|_| ()),
            AesVariant::Aes192 => Aes192CbcEnc::new_from_slices(key, iv)
                .map_err(|e| PeekTrustError::MalformedCiphertext(format!("cipher init: {e}")))?
                .encrypt_padded_mut::<NoPadding>(buf, len)
                .map(|_| ()),
            AesVariant::Aes256 => Aes256CbcEnc::new_from_slices(key, iv)
                .map_err(|e| PeekTrustError::MalformedCiphertext(format!("cipher init: {e}")))?
                .encrypt_padded_mut::<NoPadding>(buf, len)
                .map(|_| ()),
        };
        res.map_err(|_| PeekTrustError::MalformedCiphertext("plaintext not block aligned".into()))
    }

    /// CBC-decrypt `buf` in place. `buf.len()` must be a multiple of the block size.
    fn decrypt_in_place(self, key: &[u8], iv: &[u8], buf: &mut [u8]) -> Result<()> {
        let res = match self {
            AesVariant::Aes128 => Aes128CbcDec::new_from_slices(key, iv)
                .map_err(|e| PeekTrustError::MalformedCiphertext(format!("cipher init: {e}")))?
                .decrypt_padded_mut::<NoPadding>(buf)
                .map(|_| ()),
            AesVariant::Aes192 => Aes192CbcDec::new_from_slices(key, iv)
                .map_err(|e| PeekTrustError::MalformedCiphertext(format!("cipher init: {e}")))?
                .decrypt_padded_mut::<NoPadding>(buf)
                .map(|_| ()),
            AesVariant::Aes256 => Aes256CbcDec::new_from_slices(key, iv)
                .map_err(|e| PeekTrustError::MalformedCiphertext(format!("cipher init: {e}")))?
                .decrypt_padded_mut::<NoPadding>(buf)
                .map(|_| ()),
        };
        res.map_err(|_| PeekTrustError::MalformedCiphertext("ciphertext not block aligned".into()))
    }
}

/// Encrypt `plaintext` under `key` with a fresh IV from the OS CSPRNG.
///
/// Returns `IV || ciphertext`. Fails on an empty plaintext or a key that is
/// not 16, 24 or 32 bytes long.
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    encrypt_with_rng(plaintext, key, &mut OsRng)
}

/// [`encrypt`] with a caller-supplied IV source.
pub fn encrypt_with_rng<R: RngCore + CryptoRng>(
    plaintext: &[u8],
    key: &[u8],
    rng: &mut R,
) -> Result<Vec<u8>> {
    if plaintext.is_empty() {
        return Err(PeekTrustError::EmptyPlaintext);
    }
    let variant = AesVariant::for_key(key)?;

    let mut iv = [0u8; BLOCK_SIZE];
    rng.try_fill_bytes(&mut iv)
        .map_err(|e| PeekTrustError::Random(format!("{e}")))?;

    let padded = pad(plaintext, BLOCK_SIZE)?;
    let mut out = Vec::with_capacity(BLOCK_SIZE + padded.len());
    out.extend_from_slice(&iv);
    out.extend_from_slice(&padded);
    variant.encrypt_in_place(key, &iv, &mut out[BLOCK_SIZE..])?;
    Ok(out)
}

/// Decrypt an `IV || ciphertext` message produced by [`encrypt`].
///
/// Fails with [`PeekTrustError::InvalidPadding`] when the recovered plaintext
/// does not carry valid padding, which is what a wrong key or a truncated
/// message looks like.
pub fn decrypt(ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    let variant = AesVariant::for_key(key)?;

    if ciphertext.len() < BLOCK_SIZE {
        return Err(PeekTrustError::MalformedCiphertext(format!(
            "{} bytes is shorter than the IV",
            ciphertext.len()
        )));
    }
    let (iv, body) = ciphertext.split_at(BLOCK_SIZE);
    if body.len() % BLOCK_SIZE != 0 {
        return Err(PeekTrustError::MalformedCiphertext(format!(
            "{} bytes is not a whole number of blocks",
            body.len()
        )));
    }

    let mut buf = body.to_vec();
    variant.decrypt_in_place(key, iv, &mut buf)?;
    Ok(unpad(&buf, BLOCK_SIZE)?.to_vec())
}
