use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::{IsIdentity, MultiscalarMul};

pub fn is_identity(p: &RistrettoPoint) -> bool {
    p.is_identity()
}

/// Σ k_i * P_i
pub fn multiscalar(scalars: &[Scalar], points: &[RistrettoPoint]) -> RistrettoPoint {
    RistrettoPoint::multiscalar_mul(scalars.iter(), points.iter())
}

/// [1, x, x^2, ..., x^(len-1)]
pub fn powers(x: &Scalar, len: usize) -> Vec<Scalar> {
    let mut out = Vec::with_capacity(len);
    let mut pow = Scalar::ONE;
    for _ in 0..len {
        out.push(pow);
        pow *= x;
    }
    out
}
