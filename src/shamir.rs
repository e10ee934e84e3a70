use curve25519_dalek::scalar::Scalar;

use crate::commitment::{pedersen_commit, PolyCommitment};
use crate::error::ShareError;
use crate::randutil::random_scalar;
use crate::types::{Params, Share, VerifiableShare};

/// Degree-k polynomial represented by coefficients [c0, c1, ..., ck]
#[derive(Clone, Debug)]
pub struct Poly {
    pub coeffs: Vec<Scalar>,
}

impl Poly {
    pub fn eval(&self, x: Scalar) -> Scalar {
        let mut pow = Scalar::ONE;
        let mut acc = Scalar::ZERO;
        for c in &self.coeffs {
            acc += c * pow;
            pow *= x;
        }
        acc
    }
}

/// Sample random degree-k polynomial with chosen constant term.
pub fn sample_poly_with_constant(k: usize, c0: Scalar) -> Poly {
    let mut coeffs = Vec::with_capacity(k + 1);
    coeffs.push(c0);
    for _ in 0..k {
        coeffs.push(random_scalar());
    }
    Poly { coeffs }
}

/// Lagrange coefficient for evaluating at 0: L_i = Π_{j∈S\{i}} x_j/(x_j - x_i)
pub fn lagrange_coeff_at_zero(i: &Scalar, set: &[Scalar]) -> Scalar {
    let mut num = Scalar::ONE;
    let mut den = Scalar::ONE;
    for x in set {
        if x == i {
            continue;
        }
        num *= x;
        den *= x - i;
    }
    num * den.invert()
}

/// A secret distributed over every player index, plus its public commitment.
#[derive(Clone, Debug)]
pub struct Sharing {
    pub shares: Vec<VerifiableShare>,
    pub commitment: PolyCommitment,
}

impl Sharing {
    pub fn share_for(&self, index: &Scalar) -> Option<&VerifiableShare> {
        self.shares.iter().find(|vs| vs.share.index == *index)
    }
}

/// Pedersen VSS of `secret` at every index in `par.indices`, degree `par.k`.
pub fn share_secret(par: &Params, secret: Scalar) -> Sharing {
    let f = sample_poly_with_constant(par.k, secret);
    let r = sample_poly_with_constant(par.k, random_scalar());

    let mut commitment = PolyCommitment::with_capacity(par.k);
    for (fj, rj) in f.coeffs.iter().zip(&r.coeffs) {
        commitment.points.push(pedersen_commit(&par.g, &par.h, fj, rj));
    }

    let shares = par
        .indices
        .iter()
        .map(|x| VerifiableShare::new(*x, f.eval(*x), r.eval(*x)))
        .collect();

    Sharing { shares, commitment }
}

/// Reconstruct f(0) from a set of shares by interpolation.
///
/// Whatever points are supplied get interpolated; a tampered value yields a
/// different scalar rather than an error.
pub fn open(shares: &[Share]) -> Result<Scalar, ShareError> {
    if shares.is_empty() {
        return Err(ShareError::Empty);
    }
    let xs: Vec<Scalar> = shares.iter().map(|s| s.index).collect();
    for (i, x) in xs.iter().enumerate() {
        if xs[i + 1..].contains(x) {
            return Err(ShareError::DuplicateIndex);
        }
    }

    let mut acc = Scalar::ZERO;
    for s in shares {
        acc += s.value * lagrange_coeff_at_zero(&s.index, &xs);
    }
    Ok(acc)
}
