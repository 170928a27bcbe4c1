//! Authenticated encryption of garbled-table rows and OT payloads.
//!
//! Keys are derived by hashing the encrypting party's secret material
//! (wire labels or a Diffie-Hellman shared point) together with a tweak
//! that binds the ciphertext to its position in the protocol. Every key
//! encrypts exactly one row, so the fixed nonce never repeats under a key.

use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes128Gcm, Key, KeyInit, Nonce};
use sha2::{Digest, Sha256};

use crate::Block;

/// An AES-128-GCM key derived for a single row.
pub type RowKey = [u8; 16];

/// Authenticated decryption (or encryption) failed.
///
/// On decryption this signals protocol-level corruption and is always
/// fatal to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("authenticated decryption failed")]
pub struct CryptoError;

/// Derive a row key from a position tweak and the labels held for the
/// gate's input wires, in input order.
///
/// The tweak makes keys position-specific: a ciphertext for one gate can
/// never be decrypted at another, even if labels were to collide.
pub fn derive_key(tweak: u64, labels: &[Block]) -> RowKey {
    let mut hasher = Sha256::new();
    hasher.update(tweak.to_le_bytes());
    for label in labels {
        hasher.update(label.as_ref());
    }
    let digest = hasher.finalize();
    let mut key = [0u8; 16];
    key.copy_from_slice(&digest[..16]);
    key
}

/// Derive a row key from raw secret bytes (the OT shared point).
pub fn derive_key_from_bytes(tweak: u64, secret: &[u8]) -> RowKey {
    let mut hasher = Sha256::new();
    hasher.update(tweak.to_le_bytes());
    hasher.update(secret);
    let digest = hasher.finalize();
    let mut key = [0u8; 16];
    key.copy_from_slice(&digest[..16]);
    key
}

fn nonce(tweak: u64, row: u32) -> [u8; 12] {
    let mut n = [0u8; 12];
    n[..8].copy_from_slice(&tweak.to_le_bytes());
    n[8..].copy_from_slice(&row.to_le_bytes());
    n
}

/// Encrypt `plaintext` under `key` at position (`tweak`, `row`).
pub fn seal(key: &RowKey, tweak: u64, row: u32, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes128Gcm::new(Key::<Aes128Gcm>::from_slice(key));
    let n = nonce(tweak, row);
    cipher
        .encrypt(Nonce::from_slice(&n), Payload::from(plaintext))
        .map_err(|_| CryptoError)
}

/// Decrypt and authenticate a ciphertext produced by [`seal`].
pub fn open(key: &RowKey, tweak: u64, row: u32, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes128Gcm::new(Key::<Aes128Gcm>::from_slice(key));
    let n = nonce(tweak, row);
    cipher
        .decrypt(Nonce::from_slice(&n), Payload::from(ciphertext))
        .map_err(|_| CryptoError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn seal_open_roundtrip() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let labels = [rng.gen::<Block>(), rng.gen::<Block>()];
        let payload = rng.gen::<Block>();

        let key = derive_key(42, &labels);
        let ct = seal(&key, 42, 3, payload.as_ref()).unwrap();
        let pt = open(&key, 42, 3, &ct).unwrap();
        assert_eq!(pt, payload.as_ref());
    }

    #[test]
    fn tampered_ciphertext_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let key = derive_key(7, &[rng.gen::<Block>()]);
        let mut ct = seal(&key, 7, 0, &[0xAB; 16]).unwrap();
        ct[5] ^= 0x01;
        assert_eq!(open(&key, 7, 0, &ct), Err(CryptoError));
    }

    #[test]
    fn wrong_position_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let key = derive_key(7, &[rng.gen::<Block>()]);
        let ct = seal(&key, 7, 0, &[0xCD; 16]).unwrap();
        assert_eq!(open(&key, 7, 1, &ct), Err(CryptoError));
        assert_eq!(open(&key, 8, 0, &ct), Err(CryptoError));
    }

    #[test]
    fn keys_are_position_specific() {
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let labels = [rng.gen::<Block>()];
        assert_ne!(derive_key(0, &labels), derive_key(1, &labels));
    }
}
