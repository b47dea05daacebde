//! Cryptographic utilities for opaque token generation and hashing.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of random bytes in an opaque token (256 bits of entropy).
pub const OPAQUE_TOKEN_BYTES: usize = 32;

/// Computes SHA-256 hash of the input and returns it as a hex string.
///
/// Used as the storage-side lookup key for refresh tokens and single-use
/// tokens. The output is lowercase hex and always 64 characters long.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generates a high-entropy opaque token from the OS random source.
///
/// The raw value is handed to the caller exactly once; only
/// [`sha256_hex`] of it is ever persisted.
pub fn generate_opaque_token() -> String {
    let mut bytes = [0u8; OPAQUE_TOKEN_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generates an opaque token together with its storage hash.
pub fn generate_token_pair() -> (String, String) {
    let raw = generate_opaque_token();
    let hash = sha256_hex(&raw);
    (raw, hash)
}
