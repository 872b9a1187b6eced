//! Built-in components: the ones every embedder wants on day one.
//!
//! Each submodule exposes a `spawn` that registers the component and
//! returns its slot. The hooks are plain `fn` items, so built-ins dispatch
//! exactly like user components.

use crate::canvas::{Canvas, Color, Vec2};
use crate::chrome;
use crate::component::{
    ComponentSpec, EventState, ModuleState, SlotIndex, Tally, TerminalPane, TimerEvent,
};
use crate::ops::TickOps;
use crate::registry::ComponentRegistry;
use crate::RuntimeError;

/// A bordered terminal pane with a labeled title bar.
pub mod terminal {
    use super::*;

    /// Title bar height in offscreen pixels.
    pub const BAR_HEIGHT: f32 = 22.0;

    /// Register a pane at `position` with the given extents and title.
    pub fn spawn(
        registry: &mut ComponentRegistry,
        position: Vec2,
        size: Vec2,
        title: impl Into<String>,
    ) -> Result<SlotIndex, RuntimeError> {
        registry.register(ComponentSpec::module(
            None,
            Some(draw),
            ModuleState::Terminal(TerminalPane {
                position,
                size,
                title: title.into(),
            }),
        ))
    }

    fn draw(_: SlotIndex, state: &ModuleState, canvas: &mut dyn Canvas) {
        let ModuleState::Terminal(pane) = state else {
            return;
        };
        chrome::draw_frame(
            canvas,
            pane.position,
            pane.size,
            BAR_HEIGHT,
            true,
            &pane.title,
            Color::WHITE,
        );
    }
}

/// A tick counter overlay. Queues a redraw every tick, since its face
/// changes every tick.
pub mod tally {
    use super::*;

    /// Where the counter text is painted.
    pub const ORIGIN: Vec2 = Vec2::new(8.0, 8.0);
    /// Counter text height in offscreen pixels.
    pub const TEXT_SIZE: f32 = 14.0;

    pub fn spawn(registry: &mut ComponentRegistry) -> Result<SlotIndex, RuntimeError> {
        registry.register(ComponentSpec::module(
            Some(update),
            Some(draw),
            ModuleState::Tally(Tally::default()),
        ))
    }

    fn update(_: SlotIndex, state: &mut ModuleState, ops: &mut TickOps) {
        let ModuleState::Tally(tally) = state else {
            return;
        };
        tally.ticks += 1;
        ops.queue_redraw();
    }

    fn draw(_: SlotIndex, state: &ModuleState, canvas: &mut dyn Canvas) {
        let ModuleState::Tally(tally) = state else {
            return;
        };
        canvas.text(&format!("ticks {}", tally.ticks), ORIGIN, TEXT_SIZE, Color::WHITE);
    }
}

/// A countdown that removes itself when it expires.
pub mod timer {
    use super::*;
    use crate::component::ComponentKind;
    use tracing::debug;

    /// Register a countdown of `ticks` update passes.
    ///
    /// On expiry the event queues a redraw (whatever it was pacing likely
    /// changed) and unregisters itself.
    pub fn spawn(registry: &mut ComponentRegistry, ticks: u64) -> Result<SlotIndex, RuntimeError> {
        registry.register(ComponentSpec::event(
            call,
            EventState::Timer(TimerEvent { remaining: ticks }),
        ))
    }

    fn call(index: SlotIndex, state: &mut EventState, ops: &mut TickOps) {
        let EventState::Timer(timer) = state else {
            return;
        };
        timer.remaining = timer.remaining.saturating_sub(1);
        if timer.remaining == 0 {
            debug!(%index, "timer expired");
            ops.queue_redraw();
            ops.unregister(ComponentKind::Event, index);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawCommand, RecordingCanvas};

    #[test]
    fn terminal_draws_its_chrome() {
        let mut registry = ComponentRegistry::new();
        terminal::spawn(
            &mut registry,
            Vec2::new(10.0, 10.0),
            Vec2::new(200.0, 120.0),
            "melos",
        )
        .unwrap();

        let mut canvas = RecordingCanvas::new();
        registry.dispatch_draw(&mut canvas);

        let has_label = canvas.commands().iter().any(|cmd| {
            matches!(cmd, DrawCommand::Text { text, .. } if text == "melos")
        });
        assert!(has_label);
        assert!(canvas
            .commands()
            .iter()
            .any(|cmd| matches!(cmd, DrawCommand::RectLines { .. })));
    }

    #[test]
    fn tally_counts_passes_and_requests_redraw() {
        let mut registry = ComponentRegistry::new();
        let slot = tally::spawn(&mut registry).unwrap();

        let mut last = crate::ops::DispatchReport::default();
        for _ in 0..3 {
            last = registry.dispatch_update().unwrap();
        }
        assert!(last.redraw_queued);
        assert_eq!(
            registry.module_state(slot),
            Some(&ModuleState::Tally(Tally { ticks: 3 }))
        );

        let mut canvas = RecordingCanvas::new();
        registry.dispatch_draw(&mut canvas);
        assert!(matches!(
            &canvas.commands()[0],
            DrawCommand::Text { text, .. } if text == "ticks 3"
        ));
    }

    #[test]
    fn timer_removes_itself_at_expiry() {
        let mut registry = ComponentRegistry::new();
        timer::spawn(&mut registry, 3).unwrap();

        let mut redraws = 0;
        for _ in 0..3 {
            assert_eq!(registry.event_count(), 1);
            if registry.dispatch_update().unwrap().redraw_queued {
                redraws += 1;
            }
        }
        assert_eq!(registry.event_count(), 0);
        assert_eq!(redraws, 1);

        // Further passes are no-ops.
        let report = registry.dispatch_update().unwrap();
        assert_eq!(report.events_run, 0);
    }
}
