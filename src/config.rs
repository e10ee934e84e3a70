use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use serde::{Deserialize, Serialize};

/// In-memory session configuration, supplied by whoever drives a session.
///
/// Unset fields are resolved by `dealer::setup`: `h` defaults to a
/// hash-derived generator, `indices` to n random distinct non-zero scalars.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    pub n: usize,
    pub k: usize,
    pub h: Option<RistrettoPoint>,
    pub indices: Option<Vec<Scalar>>,
    /// Shuffle the initial operand messages before they are enqueued.
    pub shuffle: bool,
    /// Upper bound on deliveries for one run; `None` means unbounded.
    pub delivery_budget: Option<usize>,
}

impl SessionConfig {
    pub fn new(n: usize, k: usize) -> Self {
        SessionConfig {
            n,
            k,
            h: None,
            indices: None,
            shuffle: true,
            delivery_budget: None,
        }
    }

    pub fn with_base_point(mut self, h: RistrettoPoint) -> Self {
        self.h = Some(h);
        self
    }

    pub fn with_indices(mut self, indices: Vec<Scalar>) -> Self {
        self.indices = Some(indices);
        self
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn with_delivery_budget(mut self, budget: usize) -> Self {
        self.delivery_budget = Some(budget);
        self
    }

    /// Every message a complete run delivers: 2n^2 operand shares, 2n
    /// self-directed combined shares, n^2 product shares.
    pub fn expected_deliveries(&self) -> usize {
        3 * self.n * self.n + 2 * self.n
    }
}
