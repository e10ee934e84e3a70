//! Per-player state machine.
//!
//! A player moves through CollectingOperands -> OperandsReady ->
//! ProductReady -> Done. Each step is gated on the player's own buffers,
//! never on what other players have done, and the state is only touched
//! from inside [`PlayerState::handle`].

use std::collections::BTreeMap;

use curve25519_dalek::scalar::Scalar;

use crate::commitment::pedersen_commit;
use crate::error::ProtocolError;
use crate::nizk::{MulStatement, MulWitness, ProductProofSystem};
use crate::randutil::random_scalar;
use crate::shamir::open;
use crate::types::{
    MessageKind, Params, Phase, PlayerIdentity, PlayerMessage, ProductEvidence, Share,
    VerifiableShare,
};

/// Read-only session configuration shared by every player.
#[derive(Clone, Copy)]
pub struct PlayerContext<'a> {
    pub params: &'a Params,
    pub prover: &'a dyn ProductProofSystem,
}

/// Buffers are keyed by the sender's encoded index.
type Inbox = BTreeMap<[u8; 32], VerifiableShare>;

#[derive(Clone, Debug)]
pub struct PlayerState {
    identity: PlayerIdentity,
    phase: Phase,
    operand_a: Inbox,
    operand_b: Inbox,
    product_shares: Inbox,
    combined_a: Option<VerifiableShare>,
    combined_b: Option<VerifiableShare>,
    zero_share: VerifiableShare,
    product_share: Option<VerifiableShare>,
    evidence: Option<ProductEvidence>,
    opened_value: Option<Scalar>,
}

impl PlayerState {
    /// `zero_share` is this player's share of 0 from the zero-share
    /// distributor and must sit at the player's own index.
    pub fn new(identity: PlayerIdentity, zero_share: VerifiableShare) -> Result<Self, ProtocolError> {
        if zero_share.index() != identity.index {
            return Err(crate::error::ShareError::IndexMismatch.into());
        }
        Ok(PlayerState {
            identity,
            phase: Phase::CollectingOperands,
            operand_a: Inbox::new(),
            operand_b: Inbox::new(),
            product_shares: Inbox::new(),
            combined_a: None,
            combined_b: None,
            zero_share,
            product_share: None,
            evidence: None,
            opened_value: None,
        })
    }

    pub fn identity(&self) -> &PlayerIdentity {
        &self.identity
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn combined_a(&self) -> Option<&VerifiableShare> {
        self.combined_a.as_ref()
    }

    pub fn combined_b(&self) -> Option<&VerifiableShare> {
        self.combined_b.as_ref()
    }

    pub fn product_share(&self) -> Option<&VerifiableShare> {
        self.product_share.as_ref()
    }

    pub fn evidence(&self) -> Option<&ProductEvidence> {
        self.evidence.as_ref()
    }

    pub fn opened_value(&self) -> Option<Scalar> {
        self.opened_value
    }

    /// (operand A, operand B, product) shares received so far.
    pub fn received(&self) -> (usize, usize, usize) {
        (self.operand_a.len(), self.operand_b.len(), self.product_shares.len())
    }

    /// Apply one delivered message and return whatever it causes this
    /// player to send.
    pub fn handle(
        &mut self,
        msg: &PlayerMessage,
        ctx: &PlayerContext<'_>,
    ) -> Result<Vec<PlayerMessage>, ProtocolError> {
        let own = self.identity.index;
        if msg.to() != own {
            return Err(self.misrouted("addressed to another player"));
        }
        if !ctx.params.indices.contains(&msg.from()) {
            return Err(ProtocolError::UnknownPlayer);
        }

        match msg.kind() {
            MessageKind::OperandAShare | MessageKind::OperandBShare => {
                if msg.vshare().index() != own {
                    return Err(self.misrouted("operand share not at recipient index"));
                }
                let inbox = match msg.kind() {
                    MessageKind::OperandAShare => &mut self.operand_a,
                    _ => &mut self.operand_b,
                };
                if !insert_once(inbox, msg) {
                    self.log_duplicate(msg);
                    return Ok(Vec::new());
                }
                self.try_combine(ctx)
            }
            MessageKind::CombinedA | MessageKind::CombinedB => {
                if msg.from() != own {
                    return Err(self.misrouted("combined share from another player"));
                }
                if msg.kind() == MessageKind::CombinedA {
                    self.combined_a = Some(*msg.vshare());
                } else {
                    self.combined_b = Some(*msg.vshare());
                }
                self.try_multiply(ctx)
            }
            MessageKind::ProductShare => {
                if msg.vshare().index() != msg.from() {
                    return Err(self.misrouted("product share not at sender index"));
                }
                if !insert_once(&mut self.product_shares, msg) {
                    self.log_duplicate(msg);
                    return Ok(Vec::new());
                }
                self.try_open(ctx)?;
                Ok(Vec::new())
            }
        }
    }

    /// Addition phase: once n shares of both operands are in, sum them.
    fn try_combine(&mut self, ctx: &PlayerContext<'_>) -> Result<Vec<PlayerMessage>, ProtocolError> {
        let n = ctx.params.n;
        if self.phase != Phase::CollectingOperands
            || self.operand_a.len() < n
            || self.operand_b.len() < n
        {
            return Ok(Vec::new());
        }

        let sum_a = sum_shares(&self.operand_a)?;
        let sum_b = sum_shares(&self.operand_b)?;
        self.advance(Phase::OperandsReady);

        let own = self.identity.index;
        Ok(vec![
            PlayerMessage::new(own, own, MessageKind::CombinedA, sum_a),
            PlayerMessage::new(own, own, MessageKind::CombinedB, sum_b),
        ])
    }

    /// Multiplication phase: local product, commitments, proof, and a
    /// zero-share refresh before the product share is broadcast.
    fn try_multiply(&mut self, ctx: &PlayerContext<'_>) -> Result<Vec<PlayerMessage>, ProtocolError> {
        if self.phase != Phase::OperandsReady {
            return Ok(Vec::new());
        }
        let (Some(a), Some(b)) = (self.combined_a, self.combined_b) else {
            return Ok(Vec::new());
        };
        let par = ctx.params;

        // A degree-2k point; see dealer::setup for the n > 2k assumption.
        let product = a.value() * b.value();
        let tau = random_scalar();

        let ca = pedersen_commit(&par.g, &par.h, &a.value(), &a.decommitment);
        let cb = pedersen_commit(&par.g, &par.h, &b.value(), &b.decommitment);
        let cc = pedersen_commit(&par.g, &par.h, &product, &tau);

        let statement = MulStatement {
            g: &par.g,
            h: &par.h,
            ca: &ca,
            cb: &cb,
            cc: &cc,
        };
        let witness = MulWitness {
            a: a.value(),
            ra: a.decommitment,
            b: b.value(),
            rb: b.decommitment,
            tau,
        };
        let proof = ctx.prover.prove(&statement, &witness);

        let own = self.identity.index;
        let share = VerifiableShare::new(own, product, tau).checked_add(&self.zero_share)?;

        self.product_share = Some(share);
        self.evidence = Some(ProductEvidence { ca, cb, cc, proof });
        self.advance(Phase::ProductReady);

        Ok(par
            .indices
            .iter()
            .map(|to| PlayerMessage::new(own, *to, MessageKind::ProductShare, share))
            .collect())
    }

    /// Open phase: interpolate once all n product shares are in.
    fn try_open(&mut self, ctx: &PlayerContext<'_>) -> Result<(), ProtocolError> {
        if self.phase != Phase::ProductReady
            || self.product_shares.len() < ctx.params.n
            || self.opened_value.is_some()
        {
            return Ok(());
        }
        let shares: Vec<Share> = self.product_shares.values().map(|vs| vs.share).collect();
        let value = open(&shares)?;
        self.opened_value = Some(value);
        self.advance(Phase::Done);
        Ok(())
    }

    fn advance(&mut self, next: Phase) {
        debug_assert!(next > self.phase, "phase moves forward only");
        tracing::debug!(player = %self.identity.id, from = ?self.phase, to = ?next, "phase transition");
        self.phase = next;
    }

    fn misrouted(&self, reason: &'static str) -> ProtocolError {
        tracing::warn!(player = %self.identity.id, reason, "rejected message");
        ProtocolError::Misrouted {
            player: self.identity.id,
            reason,
        }
    }

    fn log_duplicate(&self, msg: &PlayerMessage) {
        tracing::debug!(player = %self.identity.id, kind = ?msg.kind(), "dropped duplicate message");
    }
}

/// Returns false when the sender already has an entry.
fn insert_once(inbox: &mut Inbox, msg: &PlayerMessage) -> bool {
    let key = msg.from().to_bytes();
    if inbox.contains_key(&key) {
        return false;
    }
    inbox.insert(key, *msg.vshare());
    true
}

fn sum_shares(inbox: &Inbox) -> Result<VerifiableShare, ProtocolError> {
    let mut it = inbox.values();
    let first = *it.next().ok_or(crate::error::ShareError::Empty)?;
    let sum = it.try_fold(first, |acc, vs| acc.checked_add(vs))?;
    Ok(sum)
}
