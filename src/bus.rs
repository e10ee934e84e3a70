use std::collections::{HashMap, VecDeque};

use crate::error::ProtocolError;
use crate::player::{PlayerContext, PlayerState};
use crate::types::PlayerMessage;

/// FIFO worklist of directed messages.
///
/// Messages emitted while the queue is being drained go to the back, so a
/// recipient always sees its messages in enqueue order.
#[derive(Debug, Default)]
pub struct MessageBus {
    queue: VecDeque<PlayerMessage>,
    budget: Option<usize>,
}

impl MessageBus {
    pub fn new() -> Self {
        MessageBus::default()
    }

    /// Abort a run that would deliver more than `budget` messages.
    pub fn with_budget(budget: Option<usize>) -> Self {
        MessageBus {
            queue: VecDeque::new(),
            budget,
        }
    }

    pub fn enqueue(&mut self, msg: PlayerMessage) {
        self.queue.push_back(msg);
        tracing::trace!(pending = self.queue.len(), "enqueued");
    }

    pub fn extend<I: IntoIterator<Item = PlayerMessage>>(&mut self, msgs: I) {
        self.queue.extend(msgs);
        tracing::trace!(pending = self.queue.len(), "enqueued batch");
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Deliver until the queue is empty. Returns the number of deliveries.
    pub fn run(
        &mut self,
        players: &mut [PlayerState],
        ctx: &PlayerContext<'_>,
    ) -> Result<usize, ProtocolError> {
        self.run_with(players, ctx, |_| {})
    }

    /// Like [`MessageBus::run`], with a hook that sees every message just
    /// before it is delivered.
    pub fn run_with<F>(
        &mut self,
        players: &mut [PlayerState],
        ctx: &PlayerContext<'_>,
        mut intercept: F,
    ) -> Result<usize, ProtocolError>
    where
        F: FnMut(&mut PlayerMessage),
    {
        let slots: HashMap<[u8; 32], usize> = players
            .iter()
            .enumerate()
            .map(|(pos, p)| (p.identity().index.to_bytes(), pos))
            .collect();

        let mut delivered = 0usize;
        while !self.queue.is_empty() {
            if let Some(budget) = self.budget {
                if delivered >= budget {
                    tracing::warn!(budget, pending = self.queue.len(), "delivery budget exhausted");
                    return Err(ProtocolError::DeliveryBudgetExceeded { budget });
                }
            }
            let Some(mut msg) = self.queue.pop_front() else {
                break;
            };
            intercept(&mut msg);

            let pos = *slots
                .get(&msg.to().to_bytes())
                .ok_or(ProtocolError::UnknownPlayer)?;
            let emitted = players[pos].handle(&msg, ctx)?;
            delivered += 1;

            if !emitted.is_empty() {
                self.extend(emitted);
            }
        }
        tracing::debug!(delivered, "message queue drained");
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dealer::{deal_zero_shares, setup};
    use crate::config::SessionConfig;
    use crate::nizk::PedersenMulProof;
    use crate::randutil::sequential_indices;
    use crate::types::{MessageKind, PlayerId, PlayerIdentity, VerifiableShare};
    use curve25519_dalek::scalar::Scalar;

    #[test]
    fn unknown_recipient_is_an_error() {
        let params = setup(&SessionConfig::new(2, 1).with_indices(sequential_indices(2))).unwrap();
        let zeros = deal_zero_shares(&params);
        let mut players: Vec<PlayerState> = params
            .indices
            .iter()
            .enumerate()
            .map(|(i, x)| {
                PlayerState::new(
                    PlayerIdentity {
                        id: PlayerId(i as u32 + 1),
                        index: *x,
                    },
                    zeros[i],
                )
                .unwrap()
            })
            .collect();
        let prover = PedersenMulProof;
        let ctx = PlayerContext {
            params: &params,
            prover: &prover,
        };

        let mut bus = MessageBus::new();
        let nowhere = Scalar::from(7u64);
        bus.enqueue(PlayerMessage::new(
            params.indices[0],
            nowhere,
            MessageKind::OperandAShare,
            VerifiableShare::new(nowhere, Scalar::ONE, Scalar::ONE),
        ));
        assert_eq!(bus.len(), 1);
        assert_eq!(bus.run(&mut players, &ctx), Err(ProtocolError::UnknownPlayer));
    }

    #[test]
    fn budget_stops_the_run() {
        let params = setup(&SessionConfig::new(2, 1).with_indices(sequential_indices(2))).unwrap();
        let zeros = deal_zero_shares(&params);
        let identity = PlayerIdentity {
            id: PlayerId(1),
            index: params.indices[0],
        };
        let mut players = vec![PlayerState::new(identity, zeros[0]).unwrap()];
        let prover = PedersenMulProof;
        let ctx = PlayerContext {
            params: &params,
            prover: &prover,
        };

        let mut bus = MessageBus::with_budget(Some(1));
        let share = VerifiableShare::new(params.indices[0], Scalar::ONE, Scalar::ONE);
        for from in &params.indices {
            bus.enqueue(PlayerMessage::new(*from, params.indices[0], MessageKind::OperandAShare, share));
        }
        assert_eq!(
            bus.run(&mut players, &ctx),
            Err(ProtocolError::DeliveryBudgetExceeded { budget: 1 })
        );
        assert_eq!(players[0].received(), (1, 0, 0));
        assert!(!bus.is_empty());
    }
}
