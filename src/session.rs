//! One multiply-then-open run over n simulated players.
//!
//! The session owns the players and the message bus. After the bus drains it
//! checks liveness, verifies every published product proof and compares the
//! opened values across players.

use curve25519_dalek::scalar::Scalar;
use rand::seq::SliceRandom;

use crate::bus::MessageBus;
use crate::commitment::PolyCommitment;
use crate::config::SessionConfig;
use crate::dealer::{deal_operand, deal_zero_shares, setup};
use crate::error::ProtocolError;
use crate::nizk::{MulStatement, PedersenMulProof, ProductProofSystem};
use crate::player::{PlayerContext, PlayerState};
use crate::shamir::open;
use crate::types::{MessageKind, Params, Phase, PlayerId, PlayerIdentity, PlayerMessage, Share};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    A,
    B,
}

pub struct Session {
    params: Params,
    players: Vec<PlayerState>,
    bus: MessageBus,
    prover: Box<dyn ProductProofSystem>,
    /// Σ of the dealers' commitments; evaluates to each player's Ca / Cb.
    commitment_a: PolyCommitment,
    commitment_b: PolyCommitment,
}

#[derive(Clone, Debug)]
pub struct PlayerOutcome {
    pub id: PlayerId,
    pub index: Scalar,
    pub phase: Phase,
    pub opened_value: Option<Scalar>,
    /// `None` when the player never published product evidence.
    pub proof_verified: Option<bool>,
}

#[derive(Clone, Debug)]
pub struct SessionReport {
    pub outcomes: Vec<PlayerOutcome>,
    pub failures: Vec<ProtocolError>,
    pub delivered: usize,
}

impl SessionReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// The agreed product, unless some player stalled or players disagree.
    /// Proof failures are per player and do not affect this value.
    pub fn opened_value(&self) -> Result<Scalar, ProtocolError> {
        if let Some(err) = self.failures.iter().find(|e| {
            matches!(
                e,
                ProtocolError::MissingOperand { .. } | ProtocolError::OpenMismatch { .. }
            )
        }) {
            return Err(err.clone());
        }
        self.outcomes
            .first()
            .and_then(|o| o.opened_value)
            .ok_or(crate::error::ShareError::Empty.into())
    }

    pub fn proof_failures(&self) -> Vec<PlayerId> {
        self.failures
            .iter()
            .filter_map(|e| match e {
                ProtocolError::ProofVerificationFailed { player }
                | ProtocolError::OperandCommitmentMismatch { player } => Some(*player),
                _ => None,
            })
            .collect()
    }
}

impl Session {
    /// Set up players for `cfg`, with player i dealing `secrets_a[i]` and
    /// `secrets_b[i]`.
    pub fn new(
        cfg: &SessionConfig,
        secrets_a: &[Scalar],
        secrets_b: &[Scalar],
    ) -> Result<Self, ProtocolError> {
        Self::with_prover(cfg, secrets_a, secrets_b, Box::new(PedersenMulProof))
    }

    pub fn with_prover(
        cfg: &SessionConfig,
        secrets_a: &[Scalar],
        secrets_b: &[Scalar],
        prover: Box<dyn ProductProofSystem>,
    ) -> Result<Self, ProtocolError> {
        let params = setup(cfg)?;
        for secrets in [secrets_a, secrets_b] {
            if secrets.len() != params.n {
                return Err(ProtocolError::InvalidSecrets {
                    expected: params.n,
                    got: secrets.len(),
                });
            }
        }

        let mut initial = Vec::with_capacity(2 * params.n * params.n);
        let mut commitment_a = PolyCommitment::with_capacity(params.k);
        let mut commitment_b = PolyCommitment::with_capacity(params.k);
        for (dealer, from) in params.indices.iter().enumerate() {
            let sharing_a = deal_operand(&params, secrets_a[dealer])?;
            let sharing_b = deal_operand(&params, secrets_b[dealer])?;
            for (j, to) in params.indices.iter().enumerate() {
                let player = PlayerId(j as u32 + 1);
                let (Some(sa), Some(sb)) = (sharing_a.share_for(to), sharing_b.share_for(to)) else {
                    return Err(ProtocolError::InvalidShare { player });
                };
                initial.push(PlayerMessage::new(*from, *to, MessageKind::OperandAShare, *sa));
                initial.push(PlayerMessage::new(*from, *to, MessageKind::OperandBShare, *sb));
            }
            commitment_a = commitment_a.add(&sharing_a.commitment);
            commitment_b = commitment_b.add(&sharing_b.commitment);
        }
        if cfg.shuffle {
            initial.shuffle(&mut rand::rng());
        }

        let zeros = deal_zero_shares(&params);
        let players = params
            .indices
            .iter()
            .zip(zeros)
            .enumerate()
            .map(|(pos, (index, zero))| {
                let identity = PlayerIdentity {
                    id: PlayerId(pos as u32 + 1),
                    index: *index,
                };
                PlayerState::new(identity, zero)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut bus = MessageBus::with_budget(cfg.delivery_budget);
        bus.extend(initial);
        tracing::info!(n = params.n, k = params.k, pending = bus.len(), "session ready");

        Ok(Session {
            params,
            players,
            bus,
            prover,
            commitment_a,
            commitment_b,
        })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    pub fn run(&mut self) -> Result<SessionReport, ProtocolError> {
        self.run_with(|_| {})
    }

    /// Run with a hook over every in-flight message (fault injection).
    pub fn run_with<F>(&mut self, intercept: F) -> Result<SessionReport, ProtocolError>
    where
        F: FnMut(&mut PlayerMessage),
    {
        let ctx = PlayerContext {
            params: &self.params,
            prover: &*self.prover,
        };
        let delivered = self.bus.run_with(&mut self.players, &ctx, intercept)?;

        let mut failures = Vec::new();
        let mut outcomes = Vec::with_capacity(self.players.len());
        for p in &self.players {
            if p.phase() != Phase::Done {
                let err = self.stalled(p);
                tracing::warn!(player = %p.identity().id, error = %err, "player did not finish");
                failures.push(err);
            }

            let proof_verified = match self.verify_player(p) {
                Ok(checked) => checked,
                Err(err) => {
                    tracing::warn!(player = %p.identity().id, error = %err, "product evidence rejected");
                    failures.push(err);
                    Some(false)
                }
            };
            tracing::debug!(player = %p.identity().id, phase = ?p.phase(), proof_verified = ?proof_verified, "player finished");

            outcomes.push(PlayerOutcome {
                id: p.identity().id,
                index: p.identity().index,
                phase: p.phase(),
                opened_value: p.opened_value(),
                proof_verified,
            });
        }

        if outcomes.iter().all(|o| o.phase == Phase::Done) {
            if let Err(err) = check_consistency(&outcomes) {
                tracing::warn!(error = %err, "opened values inconsistent");
                failures.push(err);
            }
        }

        Ok(SessionReport {
            outcomes,
            failures,
            delivered,
        })
    }

    /// Check one player's published (Ca, Cb, Cc, proof).
    ///
    /// Ca and Cb must also be the dealt commitments evaluated at the player's
    /// index, which ties the proof to the operands the player was given.
    /// Returns `Ok(None)` when the player published nothing to check.
    pub fn verify_player(&self, p: &PlayerState) -> Result<Option<bool>, ProtocolError> {
        let player = p.identity().id;
        let Some(ev) = p.evidence() else {
            return Ok(None);
        };
        let x = p.identity().index;
        if ev.ca != self.commitment_a.eval(&x) || ev.cb != self.commitment_b.eval(&x) {
            return Err(ProtocolError::OperandCommitmentMismatch { player });
        }
        let st = MulStatement {
            g: &self.params.g,
            h: &self.params.h,
            ca: &ev.ca,
            cb: &ev.cb,
            cc: &ev.cc,
        };
        if !self.prover.verify(&st, &ev.proof) {
            return Err(ProtocolError::ProofVerificationFailed { player });
        }
        Ok(Some(true))
    }

    /// Open the players' combined shares of one operand; equals the sum of
    /// the dealt secrets for that operand.
    pub fn open_combined(&self, operand: Operand) -> Result<Scalar, ProtocolError> {
        let shares = self
            .players
            .iter()
            .map(|p| {
                let combined = match operand {
                    Operand::A => p.combined_a(),
                    Operand::B => p.combined_b(),
                };
                combined.map(|vs| vs.share).ok_or_else(|| self.stalled(p))
            })
            .collect::<Result<Vec<Share>, _>>()?;
        Ok(open(&shares)?)
    }

    fn stalled(&self, p: &PlayerState) -> ProtocolError {
        let (received_a, received_b, received_product) = p.received();
        ProtocolError::MissingOperand {
            player: p.identity().id,
            phase: p.phase(),
            n: self.params.n,
            received_a,
            received_b,
            received_product,
        }
    }
}

fn check_consistency(outcomes: &[PlayerOutcome]) -> Result<(), ProtocolError> {
    let Some(first) = outcomes.first() else {
        return Ok(());
    };
    for o in &outcomes[1..] {
        if o.opened_value != first.opened_value {
            return Err(ProtocolError::OpenMismatch {
                first: first.id,
                second: o.id,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(id: u32, v: u64) -> PlayerOutcome {
        PlayerOutcome {
            id: PlayerId(id),
            index: Scalar::from(id as u64),
            phase: Phase::Done,
            opened_value: Some(Scalar::from(v)),
            proof_verified: Some(true),
        }
    }

    #[test]
    fn consistency_flags_first_disagreeing_player() {
        assert!(check_consistency(&[outcome(1, 5), outcome(2, 5)]).is_ok());
        assert_eq!(
            check_consistency(&[outcome(1, 5), outcome(2, 5), outcome(3, 6)]),
            Err(ProtocolError::OpenMismatch {
                first: PlayerId(1),
                second: PlayerId(3)
            })
        );
    }

    #[test]
    fn secrets_must_match_player_count() {
        let cfg = SessionConfig::new(3, 1);
        let two = [Scalar::ONE, Scalar::ONE];
        let three = [Scalar::ONE; 3];
        assert_eq!(
            Session::new(&cfg, &two, &three).err(),
            Some(ProtocolError::InvalidSecrets { expected: 3, got: 2 })
        );
    }

    #[test]
    fn small_run_opens_product() {
        let cfg = SessionConfig::new(3, 1);
        let a = [Scalar::from(1u64), Scalar::from(2u64), Scalar::from(3u64)];
        let b = [Scalar::from(4u64), Scalar::ZERO, Scalar::ZERO];
        let mut session = Session::new(&cfg, &a, &b).unwrap();
        let report = session.run().unwrap();
        assert!(report.is_success(), "{:?}", report.failures);
        assert_eq!(report.delivered, cfg.expected_deliveries());
        assert_eq!(report.opened_value().unwrap(), Scalar::from(24u64));
        assert_eq!(session.open_combined(Operand::A).unwrap(), Scalar::from(6u64));
        assert_eq!(session.open_combined(Operand::B).unwrap(), Scalar::from(4u64));
    }
}
