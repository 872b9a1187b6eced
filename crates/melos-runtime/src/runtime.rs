//! The frame loop: one update/draw tick per call, against a presentation
//! adapter.
//!
//! A tick always runs the update pass and always presents; the draw pass
//! runs only when a redraw has been queued since the last one. Presenting a
//! stale retained frame is cheap, so callers (and the windowed driver) tick
//! at display rate and let components decide when pixels actually change.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::canvas::{Color, Vec2};
use crate::chrome;
use crate::input::{Keymap, KeyAction};
use crate::ops::DispatchReport;
use crate::present::Presentation;
use crate::registry::ComponentRegistry;
use crate::RuntimeError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Static chrome painted under the component draw pass on redraw ticks:
/// a bordered frame with a labeled title bar spanning the offscreen
/// surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChromeConfig {
    /// Title bar label.
    pub label: String,
    /// Title bar height in offscreen pixels.
    pub bar_height: f32,
    /// Bar at the top edge instead of the bottom.
    pub bar_on_top: bool,
    /// Extents the frame spans -- normally the offscreen resolution.
    pub surface: Vec2,
    /// Border, divider and label color.
    pub color: Color,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            label: "melos".to_owned(),
            bar_height: 30.0,
            bar_on_top: false,
            surface: Vec2::new(1280.0, 720.0),
            color: Color::WHITE,
        }
    }
}

/// Tunables for a [`Runtime`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Bindings for the built-in key actions.
    pub keymap: Keymap,
    /// Color the offscreen surface is reset to before each draw pass.
    pub clear_color: Color,
    /// Queue a redraw for the very first tick, so the initial frame is not
    /// blank.
    pub initial_redraw: bool,
    /// Static frame chrome, or `None` for a bare surface.
    pub chrome: Option<ChromeConfig>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            keymap: Keymap::default(),
            clear_color: Color::BLANK,
            initial_redraw: true,
            chrome: Some(ChromeConfig::default()),
        }
    }
}

// ---------------------------------------------------------------------------
// LoopState
// ---------------------------------------------------------------------------

/// Where the loop is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Ticking normally.
    Running,
    /// An exit was requested or a fatal error occurred; no further ticks.
    Terminating,
}

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

/// Drives a [`ComponentRegistry`] against a [`Presentation`], one tick at a
/// time.
#[derive(Debug)]
pub struct Runtime<P: Presentation> {
    registry: ComponentRegistry,
    presentation: P,
    config: RuntimeConfig,
    state: LoopState,
    redraw_queued: bool,
    ticks: u64,
    closed: bool,
}

impl<P: Presentation> Runtime<P> {
    pub fn new(registry: ComponentRegistry, presentation: P, config: RuntimeConfig) -> Self {
        Self {
            registry,
            presentation,
            redraw_queued: config.initial_redraw,
            config,
            state: LoopState::Running,
            ticks: 0,
            closed: false,
        }
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Mutable registry access, for registration between ticks.
    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    /// Mutable adapter access, for drivers that feed input in between
    /// ticks.
    pub fn presentation_mut(&mut self) -> &mut P {
        &mut self.presentation
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Completed ticks since construction.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Whether the next tick will run the draw pass.
    pub fn redraw_queued(&self) -> bool {
        self.redraw_queued
    }

    /// Queue a redraw from outside the dispatch (resize, expose, embedder
    /// state change). Idempotent until the next draw pass consumes it.
    pub fn queue_redraw(&mut self) {
        self.redraw_queued = true;
    }

    /// Ask the loop to stop after the current tick.
    pub fn request_exit(&mut self) {
        self.state = LoopState::Terminating;
    }

    /// Run one frame: poll input, dispatch updates, redraw if queued,
    /// present.
    ///
    /// Returns the loop state after the tick. A fatal error
    /// ([`RuntimeError::is_fatal`]) leaves the runtime terminating; callers
    /// in a loop should follow it with [`shutdown`](Self::shutdown).
    pub fn tick(&mut self) -> Result<LoopState, RuntimeError> {
        if self.state == LoopState::Terminating {
            return Ok(LoopState::Terminating);
        }

        self.handle_input();

        let report = match self.registry.dispatch_update() {
            Ok(report) => report,
            Err(err) => {
                error!(%err, "update pass failed");
                if err.is_fatal() {
                    self.state = LoopState::Terminating;
                    return Err(err);
                }
                DispatchReport::default()
            }
        };
        if report.redraw_queued {
            self.redraw_queued = true;
        }
        if report.exit_requested {
            debug!("exit requested by component");
            self.state = LoopState::Terminating;
        }

        if self.redraw_queued {
            let canvas = self.presentation.canvas();
            canvas.clear(self.config.clear_color);
            if let Some(chrome) = &self.config.chrome {
                chrome::draw_frame(
                    canvas,
                    Vec2::default(),
                    chrome.surface,
                    chrome.bar_height,
                    chrome.bar_on_top,
                    &chrome.label,
                    chrome.color,
                );
            }
            self.registry.dispatch_draw(canvas);
            let committed = self.presentation.commit_frame();
            self.fatal(committed)?;
            self.redraw_queued = false;
        }

        let presented = self.presentation.present();
        self.fatal(presented)?;
        self.ticks += 1;
        Ok(self.state)
    }

    /// Tick until a component, the keymap, or the host requests exit, then
    /// shut down. The first fatal error ends the run and is returned after
    /// shutdown.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        info!("runtime loop starting");
        let result = loop {
            match self.tick() {
                Ok(LoopState::Running) => {}
                Ok(LoopState::Terminating) => break Ok(()),
                Err(err) => break Err(err),
            }
        };
        self.shutdown();
        result
    }

    /// Tear down the registry and close the presentation. Idempotent.
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.registry.clear();
        self.presentation.close();
        self.closed = true;
        self.state = LoopState::Terminating;
        info!(ticks = self.ticks, "runtime shut down");
    }

    fn handle_input(&mut self) {
        let input = self.presentation.poll_input();
        if input.close_requested {
            debug!("close requested by host");
            self.state = LoopState::Terminating;
        }
        for key in input.pressed {
            match self.config.keymap.action_for(key, input.modifier_down) {
                Some(KeyAction::ForceQuit) => {
                    debug!("force quit");
                    self.state = LoopState::Terminating;
                }
                Some(action) => self.presentation.apply_action(action),
                None => {}
            }
        }
    }

    /// Mark the loop terminating before propagating a fatal error.
    fn fatal(&mut self, result: Result<(), RuntimeError>) -> Result<(), RuntimeError> {
        if let Err(err) = &result {
            error!(%err, "presentation failed");
            self.state = LoopState::Terminating;
        }
        result
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
