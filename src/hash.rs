use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use sha2::{Digest, Sha512};

use crate::randutil::{hash_to_point as uhash_to_point, hash_to_scalar as uhash_to_scalar};

/// ===== Random oracles =====
/// Domain-separated SHA-512, then map to:
/// - points via RistrettoPoint::from_uniform_bytes (through randutil::hash_to_point)
/// - scalars via Scalar::from_bytes_mod_order_wide (through randutil::hash_to_scalar)

/// Hash(domain || data) -> 64 bytes (SHA-512)
fn hash_64(domain: &[u8], data: &[u8]) -> [u8; 64] {
    let mut h = Sha512::new();
    h.update(domain);
    h.update(data);
    let out = h.finalize();
    let mut r = [0u8; 64];
    r.copy_from_slice(&out[..64]);
    r
}

/// Domain-separated hash-to-point
fn hash_to_point(domain: &[u8], data: &[u8]) -> RistrettoPoint {
    let wide = hash_64(domain, data);
    uhash_to_point(&wide)
}

/// Domain-separated hash-to-scalar
fn hash_to_scalar(domain: &[u8], data: &[u8]) -> Scalar {
    let wide = hash_64(domain, data);
    uhash_to_scalar(&wide)
}

/// Serialize helper (compressed ristretto)
pub fn enc_point(p: &RistrettoPoint) -> [u8; 32] {
    p.compress().to_bytes()
}

pub fn enc_scalar(s: &Scalar) -> [u8; 32] {
    s.to_bytes()
}

/// Fiat-Shamir challenge of the multiplication proof.
/// Binds the base point, the three statement commitments and the three
/// prover announcements, in that order.
pub fn mul_challenge(
    h: &RistrettoPoint,
    ca: &RistrettoPoint,
    cb: &RistrettoPoint,
    cc: &RistrettoPoint,
    alpha: &RistrettoPoint,
    beta: &RistrettoPoint,
    gamma: &RistrettoPoint,
) -> Scalar {
    let mut buf = Vec::with_capacity(7 * 32);
    for p in [h, ca, cb, cc, alpha, beta, gamma] {
        buf.extend_from_slice(&enc_point(p));
    }
    hash_to_scalar(b"MulOpen::MulZkp", &buf)
}

/// Deterministically derive a "random" generator with unknown discrete log
/// relative to the basepoint.
pub fn derive_generator(tag: &[u8]) -> RistrettoPoint {
    hash_to_point(b"MulOpen::Gen", tag)
}
