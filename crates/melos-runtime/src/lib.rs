//! Melos Runtime -- frame-driven host for pluggable components.
//!
//! This crate builds on [`melos_registry`] to provide the component model
//! and the frame loop: a [`ComponentRegistry`](registry::ComponentRegistry)
//! of event and module components, a [`Runtime`](runtime::Runtime) that
//! drives one update/draw tick per frame against a
//! [`Presentation`](present::Presentation) adapter, and a redraw flag that
//! decouples re-rendering the offscreen surface from presenting it.
//!
//! Rendering to a real window (winit + wgpu) is gated behind the `renderer`
//! feature; the [`HeadlessPresentation`](present::HeadlessPresentation)
//! drives everything in memory for tests and embedders.
//!
//! # Quick Start
//!
//! ```
//! use melos_runtime::prelude::*;
//!
//! let mut registry = ComponentRegistry::new();
//! melos_runtime::modules::tally::spawn(&mut registry).unwrap();
//!
//! let mut runtime = Runtime::new(
//!     registry,
//!     HeadlessPresentation::new(),
//!     RuntimeConfig::default(),
//! );
//! runtime.tick().unwrap();
//! assert_eq!(runtime.tick_count(), 1);
//! ```

#![deny(unsafe_code)]

pub mod canvas;
pub mod chrome;
pub mod component;
pub mod input;
pub mod modules;
pub mod ops;
pub mod present;
pub mod registry;
#[cfg(feature = "renderer")]
pub mod render;
pub mod runtime;

/// Re-export the container crate for convenience.
pub use melos_registry;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by registry and runtime operations.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// A slot store operation failed (growth/shrink reallocation or an
    /// out-of-range index).
    #[error(transparent)]
    Store(#[from] melos_registry::StoreError),

    /// A registration named an unrecognized component category. Logged and
    /// ignored; the registry is unaffected.
    #[error("unrecognized component kind tag {raw}")]
    InvalidKind {
        /// The raw tag that failed to resolve.
        raw: u8,
    },

    /// The presentation adapter lost its output surface or device.
    #[error("presentation failure: {0}")]
    Presentation(#[source] anyhow::Error),
}

impl RuntimeError {
    /// Whether this error terminates the run loop.
    ///
    /// Growth out-of-memory is fatal because the runtime cannot safely
    /// continue without guaranteed slot capacity, and a lost presentation
    /// surface leaves nothing to present to. Everything else is a
    /// diagnostic.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RuntimeError::Store(melos_registry::StoreError::OutOfMemory { .. })
                | RuntimeError::Presentation(_)
        )
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common runtime usage.
pub mod prelude {
    pub use crate::canvas::{Canvas, Color, DrawCommand, Rect, RecordingCanvas, Vec2};
    pub use crate::component::{
        ComponentKind, ComponentSpec, EventState, ModuleState, SlotIndex, Tally, TerminalPane,
        TimerEvent,
    };
    pub use crate::input::{Key, KeyAction, Keymap};
    pub use crate::ops::{DispatchReport, TickOps};
    pub use crate::present::{FrameInput, HeadlessPresentation, Presentation};
    pub use crate::registry::ComponentRegistry;
    pub use crate::runtime::{ChromeConfig, LoopState, Runtime, RuntimeConfig};
    pub use crate::RuntimeError;

    pub use melos_registry::prelude::*;
}
