use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;

pub fn random_scalar() -> Scalar {
    // sample 64 bytes and reduce mod l
    let bytes: [u8; 64] = rand::random();
    Scalar::from_bytes_mod_order_wide(&bytes)
}

/// n distinct non-zero scalars, used as player evaluation indices.
pub fn random_indices(n: usize) -> Vec<Scalar> {
    let mut out: Vec<Scalar> = Vec::with_capacity(n);
    while out.len() < n {
        let x = random_scalar();
        if x != Scalar::ZERO && !out.contains(&x) {
            out.push(x);
        }
    }
    out
}

/// Indices 1..=n, handy for reproducible runs.
pub fn sequential_indices(n: usize) -> Vec<Scalar> {
    (1..=n as u64).map(Scalar::from).collect()
}

pub fn hash_to_scalar(bytes: &[u8]) -> Scalar {
    let mut wide = [0u8; 64];
    let take = bytes.len().min(64);
    wide[..take].copy_from_slice(&bytes[..take]);
    Scalar::from_bytes_mod_order_wide(&wide)
}

pub fn hash_to_point(bytes: &[u8]) -> RistrettoPoint {
    let mut wide = [0u8; 64];
    let take = bytes.len().min(64);
    wide[..take].copy_from_slice(&bytes[..take]);
    RistrettoPoint::from_uniform_bytes(&wide)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_indices_are_distinct_and_nonzero() {
        let idx = random_indices(16);
        assert_eq!(idx.len(), 16);
        for (i, x) in idx.iter().enumerate() {
            assert_ne!(*x, Scalar::ZERO);
            assert!(!idx[i + 1..].contains(x));
        }
    }

    #[test]
    fn sequential_indices_start_at_one() {
        let idx = sequential_indices(3);
        assert_eq!(idx, vec![Scalar::from(1u64), Scalar::from(2u64), Scalar::from(3u64)]);
    }
}
