use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::scalar::Scalar;

use crate::config::SessionConfig;
use crate::commitment::is_valid_pedersen_parameter;
use crate::error::ProtocolError;
use crate::hash::derive_generator;
use crate::randutil::random_indices;
use crate::shamir::{share_secret, Sharing};
use crate::types::{Params, PlayerId, VerifiableShare};

/// Resolve and validate session parameters.
pub fn setup(cfg: &SessionConfig) -> Result<Params, ProtocolError> {
    let (n, k) = (cfg.n, cfg.k);
    if k < 1 || k >= n {
        return Err(ProtocolError::InvalidThreshold { n, k });
    }

    // Deterministic hash-derived h stands in for a randomly sampled one.
    let g = RISTRETTO_BASEPOINT_POINT;
    let h = cfg.h.unwrap_or_else(|| derive_generator(b"h"));
    if !is_valid_pedersen_parameter(&g, &h) {
        return Err(ProtocolError::InsecureParameter);
    }

    let indices = match &cfg.indices {
        Some(idx) => idx.clone(),
        None => random_indices(n),
    };
    check_indices(&indices, n)?;

    // The product of two degree-k shares lies on a degree-2k polynomial.
    // Opening it from all n players is only meaningful when n > 2k.
    if n <= 2 * k {
        tracing::warn!(n, k, "n <= 2k: opened product is not uniquely determined by a degree-2k fit");
    }

    Ok(Params { n, k, g, h, indices })
}

fn check_indices(indices: &[Scalar], n: usize) -> Result<(), ProtocolError> {
    if indices.len() != n {
        return Err(ProtocolError::InvalidIndices(format!(
            "expected {n} indices, got {}",
            indices.len()
        )));
    }
    for (i, x) in indices.iter().enumerate() {
        if *x == Scalar::ZERO {
            return Err(ProtocolError::InvalidIndices("index 0 is the secret's position".into()));
        }
        if indices[i + 1..].contains(x) {
            return Err(ProtocolError::InvalidIndices("indices must be distinct".into()));
        }
    }
    Ok(())
}

/// Share one operand secret and check every share against the commitment
/// before it leaves the dealer.
pub fn deal_operand(par: &Params, secret: Scalar) -> Result<Sharing, ProtocolError> {
    let sharing = share_secret(par, secret);
    for (pos, vs) in sharing.shares.iter().enumerate() {
        if !sharing.commitment.verify(&par.g, &par.h, vs) {
            return Err(ProtocolError::InvalidShare {
                player: PlayerId(pos as u32 + 1),
            });
        }
    }
    Ok(sharing)
}

/// One verifiable share of 0 per index, generated centrally.
///
/// Stands in for the output of a distributed zero-share protocol; only the
/// per-player result matters to a session.
pub fn deal_zero_shares(par: &Params) -> Vec<VerifiableShare> {
    share_secret(par, Scalar::ZERO).shares
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shamir::open;
    use curve25519_dalek::ristretto::RistrettoPoint;
    use curve25519_dalek::traits::Identity;

    #[test]
    fn setup_rejects_bad_thresholds() {
        assert_eq!(
            setup(&SessionConfig::new(5, 0)).unwrap_err(),
            ProtocolError::InvalidThreshold { n: 5, k: 0 }
        );
        assert_eq!(
            setup(&SessionConfig::new(5, 5)).unwrap_err(),
            ProtocolError::InvalidThreshold { n: 5, k: 5 }
        );
    }

    #[test]
    fn setup_rejects_insecure_base_point() {
        let cfg = SessionConfig::new(5, 2).with_base_point(RistrettoPoint::identity());
        assert_eq!(setup(&cfg).unwrap_err(), ProtocolError::InsecureParameter);
        let cfg = SessionConfig::new(5, 2).with_base_point(RISTRETTO_BASEPOINT_POINT);
        assert_eq!(setup(&cfg).unwrap_err(), ProtocolError::InsecureParameter);
    }

    #[test]
    fn setup_rejects_bad_indices() {
        let one = Scalar::ONE;
        let cfg = SessionConfig::new(3, 1).with_indices(vec![one, one, Scalar::from(3u64)]);
        assert!(matches!(setup(&cfg), Err(ProtocolError::InvalidIndices(_))));
        let cfg = SessionConfig::new(3, 1).with_indices(vec![one, Scalar::ZERO, Scalar::from(3u64)]);
        assert!(matches!(setup(&cfg), Err(ProtocolError::InvalidIndices(_))));
        let cfg = SessionConfig::new(3, 1).with_indices(vec![one]);
        assert!(matches!(setup(&cfg), Err(ProtocolError::InvalidIndices(_))));
    }

    #[test]
    fn zero_shares_open_to_zero() {
        let par = setup(&SessionConfig::new(6, 2)).unwrap();
        let zs = deal_zero_shares(&par);
        assert_eq!(zs.len(), 6);
        let plain: Vec<_> = zs.iter().map(|vs| vs.share).collect();
        assert_eq!(open(&plain).unwrap(), Scalar::ZERO);
    }
}
