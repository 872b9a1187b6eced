//! Capacity policy for slot storage.
//!
//! Growth and shrink always move by exactly one fixed increment, never
//! proportionally. Component counts in the runtime are small and bounded,
//! so predictable low-overhead steps win over amortized-doubling
//! throughput. Shrinking requires the live length to fall two increments
//! below capacity (hysteresis), which prevents grow/shrink thrashing at a
//! single boundary.

// ---------------------------------------------------------------------------
// CapacityPolicy
// ---------------------------------------------------------------------------

/// Controls how a [`SlotStore`](crate::store::SlotStore) allocates.
///
/// `increment` is the fixed step, in slots, for both growth and shrink.
/// Capacity is always a non-zero multiple of the increment once the store
/// exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityPolicy {
    /// Fixed growth/shrink step in slots. Must be non-zero.
    pub increment: usize,
}

impl CapacityPolicy {
    /// Create a policy with the given increment.
    ///
    /// # Panics
    ///
    /// Panics if `increment` is zero.
    pub fn new(increment: usize) -> Self {
        assert!(increment > 0, "capacity increment must be non-zero");
        Self { increment }
    }

    /// The capacity a freshly created store starts with.
    #[inline]
    pub fn initial_capacity(&self) -> usize {
        self.increment
    }

    /// Whether a store at `len` live records and `capacity` slots should
    /// give back one increment.
    ///
    /// The condition is strictly self-referential: each store's threshold
    /// depends only on its own capacity.
    #[inline]
    pub fn should_shrink(&self, len: usize, capacity: usize) -> bool {
        len + 2 * self.increment <= capacity
    }
}

impl Default for CapacityPolicy {
    /// Five slots per step, matching the runtime's historical default.
    fn default() -> Self {
        Self { increment: 5 }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_increment_is_five() {
        assert_eq!(CapacityPolicy::default().increment, 5);
        assert_eq!(CapacityPolicy::default().initial_capacity(), 5);
    }

    #[test]
    #[should_panic(expected = "capacity increment must be non-zero")]
    fn zero_increment_panics() {
        let _ = CapacityPolicy::new(0);
    }

    #[test]
    fn shrink_requires_two_increments_of_slack() {
        let policy = CapacityPolicy::new(5);
        // At capacity 15, the threshold sits at length 5.
        assert!(policy.should_shrink(5, 15));
        assert!(!policy.should_shrink(6, 15));
        // A store at its initial capacity never shrinks.
        assert!(!policy.should_shrink(0, 5));
    }
}
