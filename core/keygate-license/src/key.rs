//! License key generation.
//!
//! Keys are two groups of random bytes, hex-encoded and joined by a hyphen:
//! 8 bytes (16 hex chars) then 4 bytes (8 hex chars). Uniqueness against
//! existing keys is not checked; at 96 bits the collision odds are negligible
//! for the volumes this service handles.

use rand::RngCore;

const HEAD_BYTES: usize = 8;
const TAIL_BYTES: usize = 4;

/// Generates a new opaque license key, e.g. `3f9a0c1b2d4e5f60-a1b2c3d4`.
#[must_use]
pub fn generate_license_key() -> String {
    let mut rng = rand::thread_rng();
    let mut head = [0u8; HEAD_BYTES];
    let mut tail = [0u8; TAIL_BYTES];
    rng.fill_bytes(&mut head);
    rng.fill_bytes(&mut tail);
    format!("{}-{}", hex::encode(head), hex::encode(tail))
}
