//! Growable slot storage with swap-remove and incremental capacity.
//!
//! A [`SlotStore`] keeps its live records contiguous in `[0, len)`. Insertion
//! appends; removal swaps the last live record into the vacated slot, so an
//! index is only valid until the next removal. Capacity is tracked logically
//! in whole increments of the store's [`CapacityPolicy`] -- growth reserves
//! exactly one increment, shrink gives one back once the hysteresis
//! threshold is crossed.
//!
//! Growth failure is reported as [`StoreError::OutOfMemory`] and leaves the
//! store untouched. Shrink failure is non-fatal: the removal has already
//! succeeded, so the store simply keeps its larger capacity and logs a
//! warning.

use tracing::warn;

use crate::policy::CapacityPolicy;
use crate::StoreError;

// ---------------------------------------------------------------------------
// SlotStore
// ---------------------------------------------------------------------------

/// A contiguous, capacity-managed sequence of records.
///
/// Records are exclusively owned by the store; removing one returns it to
/// the caller, and dropping the store drops every remaining record exactly
/// once.
#[derive(Debug)]
pub struct SlotStore<T> {
    /// Live records in `[0, len)`. The `Vec`'s real capacity is always at
    /// least `capacity`.
    slots: Vec<T>,
    /// Logical capacity in slots; a non-zero multiple of the increment.
    capacity: usize,
    policy: CapacityPolicy,
}

impl<T> SlotStore<T> {
    /// Create a store with the default capacity policy.
    pub fn new() -> Self {
        Self::with_policy(CapacityPolicy::default())
    }

    /// Create a store governed by `policy`, pre-allocating one increment.
    pub fn with_policy(policy: CapacityPolicy) -> Self {
        let capacity = policy.initial_capacity();
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            policy,
        }
    }

    /// Number of live records.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the store holds no live records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Logical capacity in slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The policy governing this store.
    #[inline]
    pub fn policy(&self) -> CapacityPolicy {
        self.policy
    }

    /// Shared access to the record at `index`, if live.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)
    }

    /// Mutable access to the record at `index`, if live.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)
    }

    /// Iterate the live records in slot order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.slots.iter()
    }

    /// Iterate the live records mutably in slot order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.slots.iter_mut()
    }

    /// Append `record`, growing by one increment if the store is full.
    ///
    /// Returns the assigned slot index. That index is valid until the next
    /// removal. On reallocation failure the insertion has no effect and
    /// [`StoreError::OutOfMemory`] is returned.
    pub fn insert(&mut self, record: T) -> Result<usize, StoreError> {
        if self.slots.len() + 1 > self.capacity {
            let target = self.capacity + self.policy.increment;
            self.slots
                .try_reserve_exact(target - self.slots.len())
                .map_err(|_| StoreError::OutOfMemory { requested: target })?;
            self.capacity = target;
        }
        let index = self.slots.len();
        self.slots.push(record);
        Ok(index)
    }

    /// Remove the record at `index` in O(1), returning it.
    ///
    /// If `index` is not the last live slot, the record at `len - 1` is
    /// moved into it. Any index previously referring to the last slot now
    /// refers to a different record; callers must not cache indices across
    /// removals.
    ///
    /// Once the live length falls two increments below capacity, the
    /// backing storage is rebuilt one increment smaller. If that
    /// reallocation fails, the removal still succeeds and the store keeps
    /// its current capacity.
    pub fn swap_remove(&mut self, index: usize) -> Result<T, StoreError> {
        if index >= self.slots.len() {
            return Err(StoreError::IndexOutOfBounds {
                index,
                len: self.slots.len(),
            });
        }
        let record = self.slots.swap_remove(index);
        self.maybe_shrink();
        Ok(record)
    }

    /// Drop every live record and return to the initial capacity.
    pub fn clear(&mut self) {
        self.capacity = self.policy.initial_capacity();
        // Replacing the Vec drops all records and releases the old storage.
        self.slots = Vec::with_capacity(self.capacity);
    }

    /// Give back one increment if the hysteresis threshold is crossed.
    fn maybe_shrink(&mut self) {
        if !self.policy.should_shrink(self.slots.len(), self.capacity) {
            return;
        }
        let target = self.capacity - self.policy.increment;
        let mut next: Vec<T> = Vec::new();
        if next.try_reserve_exact(target).is_err() {
            // The removal itself has already succeeded; degrade to keeping
            // the larger capacity.
            warn!(
                capacity = self.capacity,
                target, "slot storage shrink reallocation failed; keeping capacity"
            );
            return;
        }
        next.extend(self.slots.drain(..));
        self.slots = next;
        self.capacity = target;
    }
}

impl<T> Default for SlotStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(n: usize) -> SlotStore<usize> {
        let mut store = SlotStore::new();
        for i in 0..n {
            store.insert(i).unwrap();
        }
        store
    }

    #[test]
    fn growth_tracks_smallest_increment_multiple() {
        let mut store: SlotStore<u32> = SlotStore::new();
        assert_eq!(store.capacity(), 5);
        for n in 1..=23u32 {
            store.insert(n).unwrap();
            let expected = (n as usize).div_ceil(5) * 5;
            assert_eq!(store.len(), n as usize);
            assert_eq!(store.capacity(), expected, "after {n} insertions");
        }
    }

    #[test]
    fn insert_returns_sequential_indices() {
        let mut store: SlotStore<&str> = SlotStore::new();
        assert_eq!(store.insert("a").unwrap(), 0);
        assert_eq!(store.insert("b").unwrap(), 1);
        assert_eq!(store.insert("c").unwrap(), 2);
    }

    #[test]
    fn swap_remove_middle_moves_last_record() {
        let mut store = filled(5);
        let removed = store.swap_remove(1).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 4);
        // The former last record now occupies slot 1.
        assert_eq!(store.get(1), Some(&4));
        // Every other record is unchanged.
        assert_eq!(store.get(0), Some(&0));
        assert_eq!(store.get(2), Some(&2));
        assert_eq!(store.get(3), Some(&3));
    }

    #[test]
    fn swap_remove_last_has_no_data_movement() {
        let mut store = filled(3);
        assert_eq!(store.swap_remove(2).unwrap(), 2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(0), Some(&0));
        assert_eq!(store.get(1), Some(&1));
    }

    #[test]
    fn swap_remove_out_of_range_is_an_error() {
        let mut store = filled(2);
        let err = store.swap_remove(2).unwrap_err();
        assert!(matches!(
            err,
            StoreError::IndexOutOfBounds { index: 2, len: 2 }
        ));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn shrink_waits_for_two_increments_of_slack() {
        // Grow to capacity 15, then remove down to the threshold.
        let mut store = filled(11);
        assert_eq!(store.capacity(), 15);
        for _ in 0..5 {
            store.swap_remove(0).unwrap();
        }
        // len 6: one above the threshold, no shrink yet.
        assert_eq!(store.len(), 6);
        assert_eq!(store.capacity(), 15);
        store.swap_remove(0).unwrap();
        // len 5 == capacity - 2 * increment: exactly one increment given back.
        assert_eq!(store.len(), 5);
        assert_eq!(store.capacity(), 10);
    }

    #[test]
    fn no_thrash_when_oscillating_around_the_threshold() {
        let mut store = filled(11);
        for _ in 0..6 {
            store.swap_remove(0).unwrap();
        }
        assert_eq!((store.len(), store.capacity()), (5, 10));
        // Oscillate +-1 around the old boundary; capacity must not move
        // until the new threshold (len 0 for capacity 10) is crossed.
        for _ in 0..4 {
            store.insert(99).unwrap();
            assert_eq!(store.capacity(), 10);
            store.swap_remove(store.len() - 1).unwrap();
            assert_eq!(store.capacity(), 10);
        }
    }

    #[test]
    fn shrink_floor_is_the_initial_increment() {
        let mut store = filled(6);
        assert_eq!(store.capacity(), 10);
        while !store.is_empty() {
            store.swap_remove(0).unwrap();
        }
        assert_eq!(store.capacity(), 5);
    }

    #[test]
    fn custom_increment_policy() {
        let mut store: SlotStore<u8> = SlotStore::with_policy(CapacityPolicy::new(3));
        assert_eq!(store.capacity(), 3);
        for i in 0..4 {
            store.insert(i).unwrap();
        }
        assert_eq!(store.capacity(), 6);
    }

    #[test]
    fn clear_resets_to_initial_capacity() {
        let mut store = filled(12);
        assert_eq!(store.capacity(), 15);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 5);
    }

    #[test]
    fn iteration_follows_slot_order() {
        let store = filled(4);
        let collected: Vec<usize> = store.iter().copied().collect();
        assert_eq!(collected, vec![0, 1, 2, 3]);
    }
}
