//! Melos Registry -- capacity-managed slot storage for the frame runtime.
//!
//! This crate provides the container layer underneath the component
//! registry: a contiguous [`SlotStore`](store::SlotStore) whose backing
//! storage grows and shrinks by a fixed increment under an explicit
//! [`CapacityPolicy`](policy::CapacityPolicy). Removal is O(1) swap-remove,
//! so slot indices are only stable until the next removal.
//!
//! # Quick Start
//!
//! ```
//! use melos_registry::prelude::*;
//!
//! let mut store: SlotStore<&str> = SlotStore::new();
//! let a = store.insert("alpha").unwrap();
//! let b = store.insert("beta").unwrap();
//! assert_eq!((a, b), (0, 1));
//!
//! // Swap-remove moves the last record into the removed slot.
//! assert_eq!(store.swap_remove(0).unwrap(), "alpha");
//! assert_eq!(store.get(0), Some(&"beta"));
//! ```

#![deny(unsafe_code)]

pub mod policy;
pub mod store;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by slot store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A growth or shrink reallocation failed. Fatal on growth (the
    /// insertion is aborted without mutating the store); degraded on shrink
    /// (the removal has already succeeded, only the capacity stays larger).
    #[error("slot storage reallocation failed (requested capacity {requested})")]
    OutOfMemory {
        /// The capacity, in slots, that could not be allocated.
        requested: usize,
    },

    /// A removal was given an index outside the live range. This is a
    /// programming error surfaced as a diagnostic, not a user-facing
    /// failure mode.
    #[error("slot index {index} out of bounds (live length {len})")]
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// The live length at the time of the call.
        len: usize,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::policy::CapacityPolicy;
    pub use crate::store::SlotStore;
    pub use crate::StoreError;
}
