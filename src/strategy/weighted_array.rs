//! Cumulative weight array for proportional selection.

use crate::backend::Backend;

/// Read-only mapping from an ordered backend sequence to cumulative weight
/// ranges.
///
/// Backend `i` owns the index range `[cumulative[i-1], cumulative[i])`, so a
/// uniformly distributed index selects backends in exact proportion to their
/// weights. Instances are never mutated after construction, only swapped
/// wholesale.
#[derive(Debug)]
pub(crate) struct WeightedBackendArray {
    backends: Vec<Backend>,
    cumulative_weights: Vec<u64>,
    total_weight: u64,
}

impl WeightedBackendArray {
    /// Build the prefix sums for an ordered, already filtered and weighted
    /// sequence. Deterministic for a given input order.
    pub(crate) fn new(backends: Vec<Backend>) -> Self {
        let mut cumulative_weights = Vec::with_capacity(backends.len());
        let mut sum = 0u64;
        for backend in &backends {
            sum += backend.weight();
            cumulative_weights.push(sum);
        }
        Self {
            backends,
            cumulative_weights,
            total_weight: sum,
        }
    }

    /// Backend owning the given weight index.
    ///
    /// The index must already be normalized to `[0, total_weight)`; calling
    /// this on an empty array is a logic error.
    pub(crate) fn backend_at(&self, weight_index: u64) -> &Backend {
        // First prefix sum strictly greater than the index. Sums are
        // strictly increasing (every weight >= 1), so an exact hit and a
        // miss resolve to the same position.
        let pos = match self.cumulative_weights.binary_search(&(weight_index + 1)) {
            Ok(pos) | Err(pos) => pos,
        };
        &self.backends[pos]
    }

    /// Whether this array was built from an element-wise equal backend
    /// sequence and can therefore be reused without rebuilding.
    pub(crate) fn matches(&self, other: &[Backend]) -> bool {
        self.backends == other
    }

    /// The underlying ordered sequence.
    pub(crate) fn backends(&self) -> &[Backend] {
        &self.backends
    }

    /// Sum of all weights; 0 for an empty array.
    pub(crate) fn total_weight(&self) -> u64 {
        self.total_weight
    }
}
