use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use serde::{Deserialize, Serialize};

use crate::hash::{enc_point, enc_scalar, mul_challenge};
use crate::randutil::random_scalar;

/// Public statement: Ca, Cb, Cc are Pedersen commitments under (g, h) and
/// the value in Cc is the product of the values in Ca and Cb.
#[derive(Clone, Copy, Debug)]
pub struct MulStatement<'a> {
    pub g: &'a RistrettoPoint,
    pub h: &'a RistrettoPoint,
    pub ca: &'a RistrettoPoint,
    pub cb: &'a RistrettoPoint,
    pub cc: &'a RistrettoPoint,
}

/// Openings of the three commitments: Ca = g*a + h*ra, Cb = g*b + h*rb,
/// Cc = g*(a*b) + h*tau.
#[derive(Clone, Copy, Debug)]
pub struct MulWitness {
    pub a: Scalar,
    pub ra: Scalar,
    pub b: Scalar,
    pub rb: Scalar,
    pub tau: Scalar,
}

/// Proof π := (alpha, beta, gamma, za, zra, zb, zrb, zs).
///
/// Since Cc = b*Ca + h*(tau - b*ra), the relation reduces to three linked
/// discrete-log representations sharing the exponent b.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    pub alpha: [u8; 32],
    pub beta: [u8; 32],
    pub gamma: [u8; 32],
    pub za: [u8; 32],
    pub zra: [u8; 32],
    pub zb: [u8; 32],
    pub zrb: [u8; 32],
    pub zs: [u8; 32],
}

/// Proof engine for the product relation. Implementations must be usable
/// from every player at once.
pub trait ProductProofSystem: Send + Sync {
    fn prove(&self, st: &MulStatement<'_>, w: &MulWitness) -> Proof;
    fn verify(&self, st: &MulStatement<'_>, proof: &Proof) -> bool;
}

/// Fiat-Shamir Σ-protocol for the Pedersen multiplication relation.
#[derive(Clone, Copy, Debug, Default)]
pub struct PedersenMulProof;

fn dec_point(bytes: &[u8; 32]) -> Option<RistrettoPoint> {
    CompressedRistretto(*bytes).decompress()
}

/// Non-canonical encodings are rejected, so every scalar has one valid
/// byte form.
fn dec_scalar(bytes: &[u8; 32]) -> Option<Scalar> {
    Scalar::from_canonical_bytes(*bytes).into()
}

impl ProductProofSystem for PedersenMulProof {
    fn prove(&self, st: &MulStatement<'_>, w: &MulWitness) -> Proof {
        let (g, h) = (st.g, st.h);
        // Cc - b*Ca = h*s
        let s = w.tau - w.b * w.ra;

        // sample hats
        let a_hat = random_scalar();
        let ra_hat = random_scalar();
        let b_hat = random_scalar();
        let rb_hat = random_scalar();
        let s_hat = random_scalar();

        let alpha = g * a_hat + h * ra_hat;
        let beta = g * b_hat + h * rb_hat;
        let gamma = st.ca * b_hat + h * s_hat;

        let e = mul_challenge(h, st.ca, st.cb, st.cc, &alpha, &beta, &gamma);

        Proof {
            alpha: enc_point(&alpha),
            beta: enc_point(&beta),
            gamma: enc_point(&gamma),
            za: enc_scalar(&(a_hat + e * w.a)),
            zra: enc_scalar(&(ra_hat + e * w.ra)),
            zb: enc_scalar(&(b_hat + e * w.b)),
            zrb: enc_scalar(&(rb_hat + e * w.rb)),
            zs: enc_scalar(&(s_hat + e * s)),
        }
    }

    fn verify(&self, st: &MulStatement<'_>, proof: &Proof) -> bool {
        let decoded = (|| {
            Some((
                dec_point(&proof.alpha)?,
                dec_point(&proof.beta)?,
                dec_point(&proof.gamma)?,
                dec_scalar(&proof.za)?,
                dec_scalar(&proof.zra)?,
                dec_scalar(&proof.zb)?,
                dec_scalar(&proof.zrb)?,
                dec_scalar(&proof.zs)?,
            ))
        })();
        let Some((alpha, beta, gamma, za, zra, zb, zrb, zs)) = decoded else {
            return false;
        };

        let (g, h) = (st.g, st.h);
        let e = mul_challenge(h, st.ca, st.cb, st.cc, &alpha, &beta, &gamma);

        // g^za h^zra == alpha * Ca^e
        let ok_a = g * za + h * zra == alpha + st.ca * e;
        // g^zb h^zrb == beta * Cb^e
        let ok_b = g * zb + h * zrb == beta + st.cb * e;
        // Ca^zb h^zs == gamma * Cc^e
        let ok_c = st.ca * zb + h * zs == gamma + st.cc * e;

        ok_a && ok_b && ok_c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment::pedersen_commit;
    use crate::hash::derive_generator;
    use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;

    struct Fixture {
        g: RistrettoPoint,
        h: RistrettoPoint,
        ca: RistrettoPoint,
        cb: RistrettoPoint,
        cc: RistrettoPoint,
        w: MulWitness,
    }

    impl Fixture {
        fn honest() -> Self {
            let g = RISTRETTO_BASEPOINT_POINT;
            let h = derive_generator(b"h");
            let w = MulWitness {
                a: random_scalar(),
                ra: random_scalar(),
                b: random_scalar(),
                rb: random_scalar(),
                tau: random_scalar(),
            };
            Fixture {
                g,
                h,
                ca: pedersen_commit(&g, &h, &w.a, &w.ra),
                cb: pedersen_commit(&g, &h, &w.b, &w.rb),
                cc: pedersen_commit(&g, &h, &(w.a * w.b), &w.tau),
                w,
            }
        }

        fn statement(&self) -> MulStatement<'_> {
            MulStatement {
                g: &self.g,
                h: &self.h,
                ca: &self.ca,
                cb: &self.cb,
                cc: &self.cc,
            }
        }
    }

    #[test]
    fn honest_proof_verifies() {
        let f = Fixture::honest();
        let proof = PedersenMulProof.prove(&f.statement(), &f.w);
        assert!(PedersenMulProof.verify(&f.statement(), &proof));
    }

    #[test]
    fn wrong_product_is_rejected() {
        let mut f = Fixture::honest();
        f.cc = pedersen_commit(&f.g, &f.h, &(f.w.a * f.w.b + Scalar::ONE), &f.w.tau);
        let proof = PedersenMulProof.prove(&f.statement(), &f.w);
        assert!(!PedersenMulProof.verify(&f.statement(), &proof));
    }

    #[test]
    fn tampered_cc_is_rejected() {
        let mut f = Fixture::honest();
        let proof = PedersenMulProof.prove(&f.statement(), &f.w);
        let mut bytes = f.cc.compress().to_bytes();
        bytes[0] ^= 0x02;
        match CompressedRistretto(bytes).decompress() {
            Some(p) => f.cc = p,
            None => f.cc += f.g,
        }
        assert!(!PedersenMulProof.verify(&f.statement(), &proof));
    }

    fn field_mut(p: &mut Proof, i: usize) -> &mut [u8; 32] {
        match i {
            0 => &mut p.alpha,
            1 => &mut p.beta,
            2 => &mut p.gamma,
            3 => &mut p.za,
            4 => &mut p.zra,
            5 => &mut p.zb,
            6 => &mut p.zrb,
            _ => &mut p.zs,
        }
    }

    #[test]
    fn any_single_bit_flip_in_proof_is_rejected() {
        let f = Fixture::honest();
        let proof = PedersenMulProof.prove(&f.statement(), &f.w);
        for field in 0..8 {
            for bit in [0usize, 7, 100, 255] {
                let mut bad = proof.clone();
                field_mut(&mut bad, field)[bit / 8] ^= 1 << (bit % 8);
                assert!(!PedersenMulProof.verify(&f.statement(), &bad), "field {field} bit {bit}");
            }
        }
    }
}
