//! Windowed driver: a winit event loop around the frame runtime.
//!
//! Provides [`run_windowed`], which takes ownership of a populated
//! [`ComponentRegistry`] and ticks it once per `RedrawRequested` against a
//! [`GpuPresentation`]. Keyboard events are translated and fed into the
//! adapter so the runtime's own keymap handling sees them on the next
//! tick.
//!
//! This module is feature-gated behind `renderer`.

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{WindowAttributes, WindowId};

use super::presentation::GpuPresentation;
use crate::input::Key;
use crate::registry::ComponentRegistry;
use crate::runtime::{LoopState, Runtime, RuntimeConfig};
use crate::RuntimeError;

// ---------------------------------------------------------------------------
// WindowConfig
// ---------------------------------------------------------------------------

/// Window and offscreen-surface parameters for [`run_windowed`].
#[derive(Debug, Clone)]
pub struct WindowConfig {
    /// Title for the OS window.
    pub title: String,
    /// Initial window width in physical pixels.
    pub width: u32,
    /// Initial window height in physical pixels.
    pub height: u32,
    /// Retained offscreen frame width; the blit stretches it to the
    /// window.
    pub offscreen_width: u32,
    /// Retained offscreen frame height.
    pub offscreen_height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "melos".to_owned(),
            width: 1280,
            height: 720,
            offscreen_width: 1280,
            offscreen_height: 720,
        }
    }
}

/// Run the registry in a window until a component, the keymap, or the
/// window manager requests exit.
///
/// Takes ownership of the registry and blocks until the loop ends. Each
/// `RedrawRequested` runs one runtime tick; the runtime decides whether
/// that tick re-renders the offscreen frame or just presents the retained
/// one.
///
/// # Errors
///
/// Returns an error if the event loop or GPU cannot be initialized, or if
/// the run ended on a fatal runtime error.
pub fn run_windowed(
    registry: ComponentRegistry,
    runtime_config: RuntimeConfig,
    window_config: WindowConfig,
) -> Result<(), anyhow::Error> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(winit::event_loop::ControlFlow::Poll);

    let mut app = App {
        state: AppState::Pending {
            registry,
            runtime_config,
            window_config,
        },
        init_failed: false,
        fatal: None,
    };

    event_loop.run_app(&mut app)?;

    if app.init_failed {
        return Err(anyhow::anyhow!(
            "failed to initialize windowed presentation (see logs for details)"
        ));
    }
    if let Some(err) = app.fatal {
        return Err(err.into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Internal state machine
// ---------------------------------------------------------------------------

/// Winit 0.30 requires window creation inside `resumed`, so the app is a
/// two-phase state machine: `Pending` before the window exists, `Running`
/// once the runtime owns a live presentation.
enum AppState {
    /// Waiting for `resumed` to create the window and GPU presentation.
    Pending {
        registry: ComponentRegistry,
        runtime_config: RuntimeConfig,
        window_config: WindowConfig,
    },
    /// Window and GPU are up; the runtime ticks on redraw.
    Running { runtime: Runtime<GpuPresentation> },
    /// Temporary placeholder during state transitions.
    Transitioning,
}

struct App {
    state: AppState,
    /// Window or GPU initialization failed; reported after the loop exits.
    init_failed: bool,
    /// Fatal runtime error that ended the run, if any.
    fatal: Option<RuntimeError>,
}

/// Translate a winit key event to the runtime's key model.
fn translate_key(event: &winit::event::KeyEvent) -> Option<Key> {
    match event.physical_key {
        PhysicalKey::Code(KeyCode::Escape) => Some(Key::Escape),
        PhysicalKey::Code(KeyCode::F11) => Some(Key::F11),
        PhysicalKey::Code(KeyCode::ShiftLeft) => Some(Key::LeftShift),
        _ => match &event.logical_key {
            winit::keyboard::Key::Character(text) => text.chars().next().map(Key::Char),
            _ => None,
        },
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let state = std::mem::replace(&mut self.state, AppState::Transitioning);
        match state {
            AppState::Pending {
                registry,
                runtime_config,
                window_config,
            } => {
                let window_attrs = WindowAttributes::default()
                    .with_title(window_config.title.clone())
                    .with_inner_size(winit::dpi::PhysicalSize::new(
                        window_config.width,
                        window_config.height,
                    ));

                let window = match event_loop.create_window(window_attrs) {
                    Ok(window) => Arc::new(window),
                    Err(e) => {
                        tracing::error!(error = %e, "failed to create window -- exiting");
                        self.init_failed = true;
                        self.state = AppState::Pending {
                            registry,
                            runtime_config,
                            window_config,
                        };
                        event_loop.exit();
                        return;
                    }
                };

                match pollster::block_on(GpuPresentation::new(
                    window.clone(),
                    window_config.offscreen_width,
                    window_config.offscreen_height,
                )) {
                    Ok(presentation) => {
                        tracing::info!(
                            width = window_config.width,
                            height = window_config.height,
                            "presentation window created"
                        );
                        // Kick off the first frame so the loop starts even
                        // on backends that don't send an initial
                        // RedrawRequested.
                        window.request_redraw();
                        self.state = AppState::Running {
                            runtime: Runtime::new(registry, presentation, runtime_config),
                        };
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to initialize GPU presentation -- exiting");
                        self.init_failed = true;
                        self.state = AppState::Pending {
                            registry,
                            runtime_config,
                            window_config,
                        };
                        event_loop.exit();
                    }
                }
            }
            running @ AppState::Running { .. } => {
                // Already running; put state back.
                self.state = running;
            }
            AppState::Transitioning => {
                tracing::warn!("resumed called during state transition");
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let AppState::Running { runtime } = &mut self.state else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => {
                // Route through the runtime so components see a clean
                // shutdown on the next tick.
                runtime.presentation_mut().push_close_request();
                runtime.presentation().window().request_redraw();
            }
            WindowEvent::Resized(new_size) => {
                tracing::debug!(
                    width = new_size.width,
                    height = new_size.height,
                    "window resized"
                );
                runtime.presentation_mut().resize(new_size);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let Some(key) = translate_key(&event) else {
                    return;
                };
                let modifier = runtime.config().keymap.modifier;
                if key == modifier {
                    runtime
                        .presentation_mut()
                        .set_modifier(event.state.is_pressed());
                } else if event.state.is_pressed() && !event.repeat {
                    runtime.presentation_mut().push_key(key);
                }
            }
            WindowEvent::RedrawRequested => {
                match runtime.tick() {
                    Ok(LoopState::Running) => {
                        runtime.presentation().window().request_redraw();
                    }
                    Ok(LoopState::Terminating) => {
                        tracing::info!(ticks = runtime.tick_count(), "loop ended -- shutting down");
                        runtime.shutdown();
                        event_loop.exit();
                    }
                    Err(err) => {
                        tracing::error!(%err, "fatal tick error -- shutting down");
                        runtime.shutdown();
                        self.fatal = Some(err);
                        event_loop.exit();
                    }
                }
            }
            _ => {}
        }
    }
}
