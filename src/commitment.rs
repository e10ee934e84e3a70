// src/commitment.rs
//
// Pedersen commitments over Ristretto
//
// - pedersen_commit: C = g*v + h*r
// - PolyCommitment: coefficient-wise commitments of a Pedersen VSS sharing,
//   C_j = g*f_j + h*r_j, so a share (x, f(x), r(x)) verifies against Σ C_j x^j
// - commitments add homomorphically, matching share addition

use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;

use crate::group::{is_identity, multiscalar, powers};
use crate::types::VerifiableShare;

/// Commit to `value` with blinding `blinding`: g*value + h*blinding.
pub fn pedersen_commit(
    g: &RistrettoPoint,
    h: &RistrettoPoint,
    value: &Scalar,
    blinding: &Scalar,
) -> RistrettoPoint {
    g * value + h * blinding
}

/// Public validity check for the second base point.
///
/// Ristretto has prime order, so every non-identity point generates the
/// group. What remains to exclude are points with a known relation to g.
pub fn is_valid_pedersen_parameter(g: &RistrettoPoint, h: &RistrettoPoint) -> bool {
    !is_identity(h) && h != g && *h != -g
}

/// Commitment to a sharing polynomial: one point per coefficient.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PolyCommitment {
    pub points: Vec<RistrettoPoint>,
}

impl PolyCommitment {
    pub fn with_capacity(k: usize) -> Self {
        PolyCommitment {
            points: Vec::with_capacity(k + 1),
        }
    }

    /// Σ C_j * x^j
    pub fn eval(&self, x: &Scalar) -> RistrettoPoint {
        multiscalar(&powers(x, self.points.len()), &self.points)
    }

    /// Commitment to the sum of the two committed polynomials.
    pub fn add(&self, other: &PolyCommitment) -> PolyCommitment {
        let (long, short) = if self.points.len() >= other.points.len() {
            (self, other)
        } else {
            (other, self)
        };
        let mut points = long.points.clone();
        for (p, q) in points.iter_mut().zip(&short.points) {
            *p += q;
        }
        PolyCommitment { points }
    }

    /// Check g*f(x) + h*r(x) == Σ C_j x^j.
    pub fn verify(&self, g: &RistrettoPoint, h: &RistrettoPoint, vs: &VerifiableShare) -> bool {
        pedersen_commit(g, h, &vs.share.value, &vs.decommitment) == self.eval(&vs.share.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::derive_generator;
    use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
    use curve25519_dalek::traits::Identity;

    #[test]
    fn commitments_are_additively_homomorphic() {
        let g = RISTRETTO_BASEPOINT_POINT;
        let h = derive_generator(b"h");
        let (a, ra) = (Scalar::from(3u64), Scalar::from(11u64));
        let (b, rb) = (Scalar::from(4u64), Scalar::from(13u64));
        let sum = pedersen_commit(&g, &h, &a, &ra) + pedersen_commit(&g, &h, &b, &rb);
        assert_eq!(sum, pedersen_commit(&g, &h, &(a + b), &(ra + rb)));
    }

    #[test]
    fn rejects_degenerate_base_points() {
        let g = RISTRETTO_BASEPOINT_POINT;
        assert!(!is_valid_pedersen_parameter(&g, &RistrettoPoint::identity()));
        assert!(!is_valid_pedersen_parameter(&g, &g));
        assert!(!is_valid_pedersen_parameter(&g, &-g));
        assert!(is_valid_pedersen_parameter(&g, &derive_generator(b"h")));
    }
}
