//! Deferred registry mutations queued by hooks during dispatch.
//!
//! Hooks cannot touch the registry directly while it is being iterated, so
//! they queue [`TickOp`]s into the [`TickOps`] buffer they receive. The
//! dispatcher applies queued ops in FIFO order as soon as the hook that
//! queued them returns -- immediately enough that a hook unregistering its
//! own slot observes the same swap-remove semantics as direct removal, but
//! never while a record is borrowed.
//!
//! Frame-level requests (queue a redraw, stop the loop) are flags rather
//! than ordered ops; the runtime folds them into its own state after the
//! dispatch pass via the [`DispatchReport`].

use crate::component::{ComponentKind, ComponentSpec, SlotIndex};

// ---------------------------------------------------------------------------
// TickOp
// ---------------------------------------------------------------------------

/// A single deferred registry mutation.
#[derive(Debug)]
pub enum TickOp {
    /// Register a new component; it is not visited until the next pass.
    Register(ComponentSpec),
    /// Unregister the component at `index` in the `kind` store.
    Unregister {
        /// Which typed store to remove from.
        kind: ComponentKind,
        /// The slot to vacate.
        index: SlotIndex,
    },
}

// ---------------------------------------------------------------------------
// TickOps
// ---------------------------------------------------------------------------

/// Mutation buffer handed to event and update hooks.
///
/// Cleared by the dispatcher after every hook invocation; the backing
/// allocation is reused across ticks.
#[derive(Debug, Default)]
pub struct TickOps {
    ops: Vec<TickOp>,
    redraw_queued: bool,
    exit_requested: bool,
}

impl TickOps {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a registration. Applied when the current hook returns.
    pub fn register(&mut self, spec: ComponentSpec) {
        self.ops.push(TickOp::Register(spec));
    }

    /// Queue a removal. Applied when the current hook returns; the freed
    /// slot is refilled from the tail, so `index` must be one the hook was
    /// handed this call, not a cached value.
    pub fn unregister(&mut self, kind: ComponentKind, index: SlotIndex) {
        self.ops.push(TickOp::Unregister { kind, index });
    }

    /// Ask the runtime to re-render the offscreen surface this tick.
    pub fn queue_redraw(&mut self) {
        self.redraw_queued = true;
    }

    /// Ask the runtime to leave the frame loop after this tick.
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    /// Number of queued (unapplied) mutations.
    pub fn pending(&self) -> usize {
        self.ops.len()
    }

    /// Drain queued mutations in FIFO order.
    pub(crate) fn drain(&mut self) -> std::vec::Drain<'_, TickOp> {
        self.ops.drain(..)
    }

    /// Consume the redraw flag.
    pub(crate) fn take_redraw_queued(&mut self) -> bool {
        std::mem::take(&mut self.redraw_queued)
    }

    /// Consume the exit flag.
    pub(crate) fn take_exit_requested(&mut self) -> bool {
        std::mem::take(&mut self.exit_requested)
    }
}

// ---------------------------------------------------------------------------
// DispatchReport
// ---------------------------------------------------------------------------

/// Summary of one `dispatch_update` pass.
///
/// `rejected` counts unregister requests that named an out-of-range slot --
/// a component bug surfaced as a diagnostic, not a failure of the pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Event hooks invoked.
    pub events_run: usize,
    /// Module update hooks invoked.
    pub modules_run: usize,
    /// Components registered by hooks this pass.
    pub registered: usize,
    /// Components unregistered by hooks this pass.
    pub unregistered: usize,
    /// Unregister requests dropped for naming a dead slot.
    pub rejected: usize,
    /// A hook asked for the offscreen surface to be re-rendered.
    pub redraw_queued: bool,
    /// A hook asked the runtime to terminate.
    pub exit_requested: bool,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
