//! Component records: kinds, state payloads, and hook entry points.
//!
//! Every registered component is either an *event* (a bare per-tick
//! callback) or a *module* (optional update and draw hooks around owned
//! state). State is a closed sum type per kind, so dispatch is exhaustive
//! and checked at compile time -- there is no untyped payload and no
//! runtime default-case error path.
//!
//! Hooks receive the [`SlotIndex`] they currently occupy on every call.
//! Indices are not stable across removals (removal swaps the tail record
//! into the vacated slot), so hooks must act on the index they were handed
//! and never cache one.

use std::fmt;

use crate::canvas::{Canvas, Vec2};
use crate::ops::TickOps;
use crate::RuntimeError;

// ---------------------------------------------------------------------------
// SlotIndex
// ---------------------------------------------------------------------------

/// The slot a component currently occupies in its store.
///
/// Valid for the duration of the hook call that received it, or until any
/// removal in the same store -- whichever ends first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotIndex(usize);

impl SlotIndex {
    /// Wrap a raw store index.
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The raw store index.
    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ComponentKind
// ---------------------------------------------------------------------------

/// Which typed store a component lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Bare per-tick callback, no draw hook.
    Event,
    /// Stateful module with optional update and draw hooks.
    Module,
}

impl ComponentKind {
    /// Raw tag for dynamic registration paths (scripting, wire formats).
    pub fn as_raw(self) -> u8 {
        match self {
            ComponentKind::Event => 0,
            ComponentKind::Module => 1,
        }
    }
}

impl TryFrom<u8> for ComponentKind {
    type Error = RuntimeError;

    /// Resolve a raw tag; unrecognized tags are rejected without touching
    /// the registry.
    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(ComponentKind::Event),
            1 => Ok(ComponentKind::Module),
            _ => Err(RuntimeError::InvalidKind { raw }),
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Event => write!(f, "event"),
            ComponentKind::Module => write!(f, "module"),
        }
    }
}

// ---------------------------------------------------------------------------
// State payloads
// ---------------------------------------------------------------------------

/// Countdown state for a timer event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerEvent {
    /// Ticks remaining before the timer fires.
    pub remaining: u64,
}

/// A bordered pane with a labeled title bar.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalPane {
    /// Top-left corner in offscreen pixels.
    pub position: Vec2,
    /// Full extents in offscreen pixels.
    pub size: Vec2,
    /// Label painted in the title bar.
    pub title: String,
}

/// A tick counter, typically surfaced as a HUD overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    /// Update passes observed since registration.
    pub ticks: u64,
}

/// Owned state of an event component.
#[derive(Debug, Clone, PartialEq)]
pub enum EventState {
    /// No owned state.
    Stateless,
    /// Countdown timer.
    Timer(TimerEvent),
}

/// Owned state of a module component.
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleState {
    /// A pane with chrome.
    Terminal(TerminalPane),
    /// A tick counter.
    Tally(Tally),
}

// ---------------------------------------------------------------------------
// Hook entry points
// ---------------------------------------------------------------------------

/// Per-tick callback of an event component.
///
/// Registry mutations (including unregistering the event itself) go through
/// the [`TickOps`] buffer and take effect as soon as the hook returns.
pub type EventFn = fn(SlotIndex, &mut EventState, &mut TickOps);

/// Update hook of a module component. Same mutation contract as
/// [`EventFn`].
pub type UpdateFn = fn(SlotIndex, &mut ModuleState, &mut TickOps);

/// Draw hook of a module component. Runs only on redraw ticks, against the
/// offscreen surface; it cannot mutate the registry.
pub type DrawFn = fn(SlotIndex, &ModuleState, &mut dyn Canvas);

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// One live event record.
#[derive(Debug)]
pub struct EventSlot {
    /// The per-tick callback.
    pub call: EventFn,
    /// Owned state, released when the slot is removed.
    pub state: EventState,
}

/// One live module record.
#[derive(Debug)]
pub struct ModuleSlot {
    /// Update hook, if any.
    pub update: Option<UpdateFn>,
    /// Draw hook, if any.
    pub draw: Option<DrawFn>,
    /// Owned state, released when the slot is removed.
    pub state: ModuleState,
}

// ---------------------------------------------------------------------------
// ComponentSpec
// ---------------------------------------------------------------------------

/// A fully constructed registration request.
///
/// Building a spec statically guarantees a recognized kind; the raw-tag
/// path ([`ComponentKind::try_from`]) exists for dynamic callers.
#[derive(Debug)]
pub enum ComponentSpec {
    /// Register an event component.
    Event {
        /// The per-tick callback.
        call: EventFn,
        /// Initial owned state.
        state: EventState,
    },
    /// Register a module component.
    Module {
        /// Update hook, if any.
        update: Option<UpdateFn>,
        /// Draw hook, if any.
        draw: Option<DrawFn>,
        /// Initial owned state.
        state: ModuleState,
    },
}

impl ComponentSpec {
    /// Shorthand for an event registration.
    pub fn event(call: EventFn, state: EventState) -> Self {
        ComponentSpec::Event { call, state }
    }

    /// Shorthand for a module registration.
    pub fn module(update: Option<UpdateFn>, draw: Option<DrawFn>, state: ModuleState) -> Self {
        ComponentSpec::Module {
            update,
            draw,
            state,
        }
    }

    /// The store this spec registers into.
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentSpec::Event { .. } => ComponentKind::Event,
            ComponentSpec::Module { .. } => ComponentKind::Module,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_raw_tags_round_trip() {
        for kind in [ComponentKind::Event, ComponentKind::Module] {
            assert_eq!(ComponentKind::try_from(kind.as_raw()).unwrap(), kind);
        }
    }

    #[test]
    fn unrecognized_raw_tag_is_invalid_kind() {
        let err = ComponentKind::try_from(7).unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidKind { raw: 7 }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn spec_reports_its_kind() {
        let event = ComponentSpec::event(|_, _, _| {}, EventState::Stateless);
        assert_eq!(event.kind(), ComponentKind::Event);

        let module = ComponentSpec::module(None, None, ModuleState::Tally(Tally::default()));
        assert_eq!(module.kind(), ComponentKind::Module);
    }

    #[test]
    fn slot_index_display() {
        assert_eq!(SlotIndex::new(3).to_string(), "#3");
    }
}
