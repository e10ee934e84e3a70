use std::fmt;

use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use serde::{Deserialize, Serialize};

use crate::error::ShareError;
use crate::nizk::Proof;

/// Public session parameters, fixed before any message is sent.
#[derive(Clone, Debug)]
pub struct Params {
    pub n: usize,
    pub k: usize,
    pub g: RistrettoPoint,
    pub h: RistrettoPoint,
    pub indices: Vec<Scalar>,
}

/// Human readable player number, 1..=n.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub id: PlayerId,
    /// x-coordinate of this player in every sharing polynomial
    pub index: Scalar,
}

/// One point of a shared secret.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub index: Scalar,
    pub value: Scalar,
}

/// A share together with the blinding-polynomial evaluation that lets it be
/// checked against the dealer's Pedersen commitment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiableShare {
    pub share: Share,
    pub decommitment: Scalar,
}

impl VerifiableShare {
    pub fn new(index: Scalar, value: Scalar, decommitment: Scalar) -> Self {
        VerifiableShare {
            share: Share { index, value },
            decommitment,
        }
    }

    pub fn index(&self) -> Scalar {
        self.share.index
    }

    pub fn value(&self) -> Scalar {
        self.share.value
    }

    /// share(x) + share(y) at the same index is a share of x + y.
    pub fn checked_add(&self, other: &VerifiableShare) -> Result<VerifiableShare, ShareError> {
        if self.share.index != other.share.index {
            return Err(ShareError::IndexMismatch);
        }
        Ok(VerifiableShare::new(
            self.share.index,
            self.share.value + other.share.value,
            self.decommitment + other.decommitment,
        ))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    OperandAShare,
    OperandBShare,
    CombinedA,
    CombinedB,
    ProductShare,
}

/// Directed single-hop message carrying one verifiable share.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMessage {
    from: Scalar,
    to: Scalar,
    kind: MessageKind,
    vshare: VerifiableShare,
}

impl PlayerMessage {
    pub fn new(from: Scalar, to: Scalar, kind: MessageKind, vshare: VerifiableShare) -> Self {
        PlayerMessage { from, to, kind, vshare }
    }

    pub fn from(&self) -> Scalar {
        self.from
    }

    pub fn to(&self) -> Scalar {
        self.to
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn vshare(&self) -> &VerifiableShare {
        &self.vshare
    }

    /// Replace the payload, keeping routing. Only an in-flight interceptor
    /// (fault injection) has a reason to call this.
    pub fn with_vshare(self, vshare: VerifiableShare) -> Self {
        PlayerMessage { vshare, ..self }
    }
}

/// Player progress. Only ever moves forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    CollectingOperands,
    OperandsReady,
    ProductReady,
    Done,
}

/// Public tuple (Ca, Cb, Cc, proof) a player publishes for its product share.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProductEvidence {
    pub ca: RistrettoPoint,
    pub cb: RistrettoPoint,
    pub cc: RistrettoPoint,
    pub proof: Proof,
}
