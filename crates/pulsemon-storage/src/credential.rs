//! API key minting for registered targets.

use base64::{engine::general_purpose, Engine as _};
use rand::Rng;

/// Generate a 32-byte cryptographically random API key.
///
/// URL-safe base64 without padding, since agents put the key in the
/// ingestion URL path. 256 bits of entropy makes collisions and guessing
/// negligible; the key is minted once at registration and never changes.
pub fn generate_api_key() -> String {
    let mut rng = rand::thread_rng();
    let key_bytes: [u8; 32] = rng.gen();
    general_purpose::URL_SAFE_NO_PAD.encode(key_bytes)
}
