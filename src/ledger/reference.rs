//! Transaction references
//!
//! Public tokens that identify ledger entries to API callers, distinct
//! from the primary key.

use rand::Rng;

const PREFIX: &str = "TX-";
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const TOKEN_LEN: usize = 16;

/// Generate a fresh transaction reference.
pub fn next_reference() -> String {
    let mut rng = rand::thread_rng();
    let token: String = (0..TOKEN_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{PREFIX}{token}")
}
