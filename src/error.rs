use thiserror::Error;

use crate::types::{Phase, PlayerId};

/// Failures of the share arithmetic layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShareError {
    /// Interpolation needs at least one point.
    #[error("cannot open an empty set of shares")]
    Empty,
    /// Two shares sit on the same evaluation index.
    #[error("duplicate evaluation index in share set")]
    DuplicateIndex,
    /// Homomorphic addition of shares taken at different indices.
    #[error("shares are at different evaluation indices")]
    IndexMismatch,
}

/// Failures of a multiply-then-open session.
///
/// Every variant is terminal for the unit it names (a player or the whole
/// session). Duplicate deliveries are not represented here: they are logged
/// and dropped by the receiving player.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The Pedersen base point failed the public validity check.
    #[error("insecure choice of pedersen parameter")]
    InsecureParameter,
    /// Threshold out of range for the player count.
    #[error("invalid threshold: k = {k}, n = {n} (need 1 <= k < n)")]
    InvalidThreshold { n: usize, k: usize },
    /// Evaluation indices are not n distinct non-zero scalars.
    #[error("invalid evaluation indices: {0}")]
    InvalidIndices(String),
    /// One secret per player is required for each operand.
    #[error("expected {expected} operand secrets, got {got}")]
    InvalidSecrets { expected: usize, got: usize },
    /// A dealt share does not match its public commitment.
    #[error("share for player {player} does not match the dealer commitment")]
    InvalidShare { player: PlayerId },
    /// A player never collected n contributions for its current phase.
    #[error("player {player} stalled in {phase:?}: {received_a}/{n} A, {received_b}/{n} B, {received_product}/{n} product shares")]
    MissingOperand {
        player: PlayerId,
        phase: Phase,
        n: usize,
        received_a: usize,
        received_b: usize,
        received_product: usize,
    },
    /// The product proof of a player did not verify.
    #[error("product proof of player {player} failed verification")]
    ProofVerificationFailed { player: PlayerId },
    /// Ca or Cb does not commit to the player's combined operand share.
    #[error("operand commitments of player {player} do not match the dealt sharings")]
    OperandCommitmentMismatch { player: PlayerId },
    /// Players disagree on the opened product.
    #[error("opened values disagree between player {first} and player {second}")]
    OpenMismatch { first: PlayerId, second: PlayerId },
    /// A message names an evaluation index no player owns.
    #[error("no player with the given evaluation index")]
    UnknownPlayer,
    /// A message reached a handler it was not meant for.
    #[error("misrouted message for player {player}: {reason}")]
    Misrouted { player: PlayerId, reason: &'static str },
    /// The orchestrator delivered more messages than the configured budget.
    #[error("delivery budget of {budget} messages exceeded")]
    DeliveryBudgetExceeded { budget: usize },
    #[error(transparent)]
    Share(#[from] ShareError),
}
