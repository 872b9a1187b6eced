//! The component registry: typed slot stores plus per-frame dispatch.
//!
//! Two [`SlotStore`]s -- one per [`ComponentKind`] -- share a single
//! capacity policy. Registration appends, removal is swap-remove, and both
//! may be requested by hooks mid-dispatch through the [`TickOps`] buffer.
//!
//! # Iteration contract
//!
//! Each dispatch pass iterates slots `[0, end)` with `end` captured at loop
//! start, additionally bounded by the live length. Queued ops are applied
//! between hook invocations, which yields the documented
//! swap-remove-during-iteration behavior:
//!
//! - A hook that unregisters its own slot pulls the tail record into that
//!   slot; the moved record is *skipped* for the remainder of the pass and
//!   visited normally on the next one.
//! - Records registered mid-pass land past the captured end and are not
//!   visited until the next pass.
//!
//! Insertion order is therefore only meaningful within a pass over a stable
//! length; components must not rely on it across removals.

use melos_registry::policy::CapacityPolicy;
use melos_registry::store::SlotStore;
use melos_registry::StoreError;
use tracing::{debug, error};

use crate::canvas::Canvas;
use crate::component::{ComponentKind, ComponentSpec, EventSlot, ModuleSlot, SlotIndex};
use crate::ops::{DispatchReport, TickOp, TickOps};
use crate::RuntimeError;

// ---------------------------------------------------------------------------
// ComponentRegistry
// ---------------------------------------------------------------------------

/// Holds every live component and runs the update/draw passes over them.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    events: SlotStore<EventSlot>,
    modules: SlotStore<ModuleSlot>,
    /// Mutation buffer reused across ticks.
    ops: TickOps,
}

impl ComponentRegistry {
    /// Create a registry with the default capacity policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry whose stores share `policy`.
    pub fn with_policy(policy: CapacityPolicy) -> Self {
        Self {
            events: SlotStore::with_policy(policy),
            modules: SlotStore::with_policy(policy),
            ops: TickOps::new(),
        }
    }

    /// Register a component, returning its assigned slot.
    ///
    /// The index is valid until the next removal in the same store. Growth
    /// out-of-memory aborts the registration without mutating the registry
    /// and is fatal to the run loop.
    pub fn register(&mut self, spec: ComponentSpec) -> Result<SlotIndex, RuntimeError> {
        let index = match spec {
            ComponentSpec::Event { call, state } => self.events.insert(EventSlot { call, state })?,
            ComponentSpec::Module {
                update,
                draw,
                state,
            } => self.modules.insert(ModuleSlot {
                update,
                draw,
                state,
            })?,
        };
        Ok(SlotIndex::new(index))
    }

    /// Remove the component at `index` from the `kind` store, releasing its
    /// owned state.
    pub fn unregister(&mut self, kind: ComponentKind, index: SlotIndex) -> Result<(), RuntimeError> {
        match kind {
            ComponentKind::Event => drop(self.events.swap_remove(index.get())?),
            ComponentKind::Module => drop(self.modules.swap_remove(index.get())?),
        }
        Ok(())
    }

    /// Live components in the `kind` store.
    pub fn len_of(&self, kind: ComponentKind) -> usize {
        match kind {
            ComponentKind::Event => self.events.len(),
            ComponentKind::Module => self.modules.len(),
        }
    }

    /// Slot capacity of the `kind` store.
    pub fn capacity_of(&self, kind: ComponentKind) -> usize {
        match kind {
            ComponentKind::Event => self.events.capacity(),
            ComponentKind::Module => self.modules.capacity(),
        }
    }

    /// Live event components.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Live module components.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Shared access to a module's state, for assertions and setup.
    pub fn module_state(&self, index: SlotIndex) -> Option<&crate::component::ModuleState> {
        self.modules.get(index.get()).map(|slot| &slot.state)
    }

    /// Shared access to an event's state, for assertions and setup.
    pub fn event_state(&self, index: SlotIndex) -> Option<&crate::component::EventState> {
        self.events.get(index.get()).map(|slot| &slot.state)
    }

    /// Tear down both stores, releasing every owned state.
    pub fn clear(&mut self) {
        self.events.clear();
        self.modules.clear();
    }

    /// Run the event pass, then the module update pass.
    ///
    /// Returns the pass summary, including redraw/exit requests queued by
    /// hooks. A fatal growth failure while applying a queued registration
    /// aborts the pass.
    pub fn dispatch_update(&mut self) -> Result<DispatchReport, RuntimeError> {
        let mut report = DispatchReport::default();
        let mut ops = std::mem::take(&mut self.ops);

        let result = self.run_update_passes(&mut ops, &mut report);
        report.redraw_queued = ops.take_redraw_queued();
        report.exit_requested = ops.take_exit_requested();
        self.ops = ops;

        result.map(|()| report)
    }

    /// Invoke every present draw hook in slot order against `canvas`.
    ///
    /// Draw hooks cannot mutate the registry, so this pass iterates the
    /// stable live length directly. Returns the number of hooks invoked.
    pub fn dispatch_draw(&self, canvas: &mut dyn Canvas) -> usize {
        let mut drawn = 0;
        for (index, slot) in self.modules.iter().enumerate() {
            if let Some(draw) = slot.draw {
                draw(SlotIndex::new(index), &slot.state, canvas);
                drawn += 1;
            }
        }
        debug!(drawn, "draw pass complete");
        drawn
    }

    fn run_update_passes(
        &mut self,
        ops: &mut TickOps,
        report: &mut DispatchReport,
    ) -> Result<(), RuntimeError> {
        let end = self.events.len();
        let mut index = 0;
        while index < end && index < self.events.len() {
            if let Some(slot) = self.events.get_mut(index) {
                (slot.call)(SlotIndex::new(index), &mut slot.state, ops);
                report.events_run += 1;
            }
            self.apply_ops(ops, report)?;
            index += 1;
        }

        let end = self.modules.len();
        let mut index = 0;
        while index < end && index < self.modules.len() {
            if let Some(slot) = self.modules.get_mut(index) {
                if let Some(update) = slot.update {
                    update(SlotIndex::new(index), &mut slot.state, ops);
                    report.modules_run += 1;
                }
            }
            self.apply_ops(ops, report)?;
            index += 1;
        }

        Ok(())
    }

    /// Apply queued mutations in FIFO order.
    ///
    /// Out-of-range unregister requests are dropped with a diagnostic (the
    /// hook cached an index across a removal -- a component bug, not a
    /// registry failure). Growth out-of-memory propagates.
    fn apply_ops(&mut self, ops: &mut TickOps, report: &mut DispatchReport) -> Result<(), RuntimeError> {
        for op in ops.drain() {
            match op {
                TickOp::Register(spec) => {
                    self.register(spec)?;
                    report.registered += 1;
                }
                TickOp::Unregister { kind, index } => match self.unregister(kind, index) {
                    Ok(()) => report.unregistered += 1,
                    Err(RuntimeError::Store(StoreError::IndexOutOfBounds { index, len })) => {
                        error!(%kind, index, len, "unregister request named a dead slot; dropped");
                        report.rejected += 1;
                    }
                    Err(other) => return Err(other),
                },
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
