//! Credential material helpers: password generation, password hashing and
//! symmetric text encryption.
//!
//! Nothing here takes part in the digest exchange itself; these are the
//! provisioning-side helpers for whoever maintains the credential store.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use pbkdf2::pbkdf2_hmac;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use sha2::Sha256;
use thiserror::Error;

const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const NUMERIC: &[u8] = b"0123456789";
const SPECIAL: &[u8] = b"!@#{}[]^_-()*?";

const PBKDF2_SCHEME: &str = "pbkdf2-sha256";
const PBKDF2_ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

const GCM_NONCE_LEN: usize = 12;

/// Errors from the text encryption helpers.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum SecretError {
    /// The key did not base64-decode to 32 bytes.
    #[error("encryption key must be base64 of 32 bytes")]
    InvalidKey,

    /// The ciphertext payload could not be decoded.
    #[error("malformed encrypted payload")]
    InvalidPayload,

    /// Authenticated decryption failed (wrong key or tampered payload).
    #[error("decryption failed")]
    Decrypt,
}

/// Generates a random password of `length` characters.
///
/// The output always contains at least one lowercase, one uppercase and one
/// numeric character, plus one special character when
/// `include_special_chars` is set (for lengths that can fit them all).
pub fn generate_password(length: usize, include_special_chars: bool) -> String {
    let mut rng = rand::rng();
    let mut chars = Vec::with_capacity(length);

    let pick = |rng: &mut rand::rngs::ThreadRng, pool: &[u8]| pool[rng.random_range(0..pool.len())];

    chars.push(pick(&mut rng, LOWER));
    chars.push(pick(&mut rng, UPPER));
    chars.push(pick(&mut rng, NUMERIC));
    if include_special_chars {
        chars.push(pick(&mut rng, SPECIAL));
    }

    while chars.len() < length {
        let pool = match rng.random_range(0..if include_special_chars { 4 } else { 3 }) {
            0 => LOWER,
            1 => UPPER,
            2 => NUMERIC,
            _ => SPECIAL,
        };
        chars.push(pick(&mut rng, pool));
    }

    chars.shuffle(&mut rng);
    chars.truncate(length);

    chars.into_iter().map(char::from).collect()
}

/// Hashes a password for storage.
///
/// PBKDF2-HMAC-SHA256 with a random 16-byte salt, encoded as
/// `pbkdf2-sha256$<iterations>$<salt-hex>$<key-hex>` so the parameters
/// travel with the hash.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);

    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut key);

    format!(
        "{PBKDF2_SCHEME}${PBKDF2_ITERATIONS}${}${}",
        hex::encode(salt),
        hex::encode(key)
    )
}

/// Checks a password against an encoded hash from [`hash_password`].
///
/// Any malformed encoding verifies as false.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let mut parts = encoded.split('$');

    let (Some(scheme), Some(iterations), Some(salt), Some(key), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };

    if scheme != PBKDF2_SCHEME {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let Ok(salt) = hex::decode(salt) else {
        return false;
    };
    let Ok(expected) = hex::decode(key) else {
        return false;
    };
    if expected.len() != KEY_LEN {
        return false;
    }

    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut key);

    key[..] == expected[..]
}

/// Encrypts `value` with AES-256-GCM under a base64-encoded 32-byte key.
///
/// The random nonce is prepended to the ciphertext and the whole payload is
/// base64-encoded; with `url_safe` the base64 text is additionally
/// hex-encoded so it survives being embedded in a URL.
pub fn encrypt_text(value: &str, crypto_key: &str, url_safe: bool) -> Result<String, SecretError> {
    let cipher = cipher_for_key(crypto_key)?;

    let mut nonce = [0u8; GCM_NONCE_LEN];
    rand::rng().fill_bytes(&mut nonce);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), value.as_bytes())
        .map_err(|_| SecretError::InvalidPayload)?;

    let mut payload = nonce.to_vec();
    payload.extend_from_slice(&ciphertext);

    let encoded = BASE64.encode(payload);

    Ok(if url_safe { hex::encode(encoded) } else { encoded })
}

/// Decrypts a payload produced by [`encrypt_text`].
pub fn decrypt_text(value: &str, crypto_key: &str, url_safe: bool) -> Result<String, SecretError> {
    let cipher = cipher_for_key(crypto_key)?;

    let encoded = if url_safe {
        let bytes = hex::decode(value).map_err(|_| SecretError::InvalidPayload)?;
        String::from_utf8(bytes).map_err(|_| SecretError::InvalidPayload)?
    } else {
        value.to_string()
    };

    let payload = BASE64
        .decode(encoded)
        .map_err(|_| SecretError::InvalidPayload)?;

    if payload.len() < GCM_NONCE_LEN {
        return Err(SecretError::InvalidPayload);
    }
    let (nonce, ciphertext) = payload.split_at(GCM_NONCE_LEN);

    let plain = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| SecretError::Decrypt)?;

    String::from_utf8(plain).map_err(|_| SecretError::Decrypt)
}

fn cipher_for_key(crypto_key: &str) -> Result<Aes256Gcm, SecretError> {
    let key_bytes = BASE64.decode(crypto_key).map_err(|_| SecretError::InvalidKey)?;

    if key_bytes.len() != KEY_LEN {
        return Err(SecretError::InvalidKey);
    }

    Ok(Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes)))
}
