//! End-to-end frame loop tests on the headless presentation.
//!
//! These drive full ticks -- input, update dispatch, redraw decision,
//! present -- and assert on the committed frames the adapter retains.

use melos_runtime::modules::{tally, terminal, timer};
use melos_runtime::prelude::*;

fn marker_module(marker: u64, draw: bool) -> ComponentSpec {
    fn draw_marker(_: SlotIndex, state: &ModuleState, canvas: &mut dyn Canvas) {
        let ModuleState::Tally(t) = state else {
            return;
        };
        canvas.fill_rect(Rect::new(t.ticks as f32, 0.0, 1.0, 1.0), Color::WHITE);
    }

    ComponentSpec::module(
        None,
        if draw { Some(draw_marker) } else { None },
        ModuleState::Tally(Tally { ticks: marker }),
    )
}

fn markers_of(frame: &[DrawCommand]) -> Vec<u64> {
    frame
        .iter()
        .filter_map(|cmd| match cmd {
            DrawCommand::FillRect { rect, .. } => Some(rect.x as u64),
            _ => None,
        })
        .collect()
}

#[test]
fn redraw_tick_draws_each_module_once_in_order() {
    let mut registry = ComponentRegistry::new();
    for marker in 0..3 {
        registry.register(marker_module(marker, true)).unwrap();
    }
    let mut runtime = Runtime::new(
        registry,
        HeadlessPresentation::new(),
        RuntimeConfig::default(),
    );

    runtime.tick().unwrap();

    let frames = runtime.presentation().frames();
    assert_eq!(frames.len(), 1);
    // The frame starts from a clear, then one quad per module in slot
    // order.
    assert!(matches!(frames[0][0], DrawCommand::Clear(_)));
    assert_eq!(markers_of(&frames[0]), vec![0, 1, 2]);
    assert!(!runtime.redraw_queued());
}

#[test]
fn quiet_ticks_present_the_stale_frame() {
    let mut registry = ComponentRegistry::new();
    registry.register(marker_module(7, true)).unwrap();
    let mut runtime = Runtime::new(
        registry,
        HeadlessPresentation::new(),
        RuntimeConfig::default(),
    );

    for _ in 0..5 {
        runtime.tick().unwrap();
    }

    // One committed frame (the initial redraw); five presents.
    assert_eq!(runtime.presentation().frames().len(), 1);
    assert_eq!(runtime.presentation().presents(), 5);
}

#[test]
fn tally_redraws_every_tick() {
    let mut registry = ComponentRegistry::new();
    tally::spawn(&mut registry).unwrap();
    let mut runtime = Runtime::new(
        registry,
        HeadlessPresentation::new(),
        RuntimeConfig::default(),
    );

    for _ in 0..4 {
        runtime.tick().unwrap();
    }
    assert_eq!(runtime.presentation().frames().len(), 4);

    // The last frame shows the latest count.
    let last = runtime.presentation().frames().last().unwrap();
    assert!(last
        .iter()
        .any(|cmd| matches!(cmd, DrawCommand::Text { text, .. } if text == "ticks 4")));
}

#[test]
fn terminal_chrome_lands_in_the_committed_frame() {
    let mut registry = ComponentRegistry::new();
    terminal::spawn(
        &mut registry,
        Vec2::new(10.0, 20.0),
        Vec2::new(300.0, 200.0),
        "console",
    )
    .unwrap();
    let mut runtime = Runtime::new(
        registry,
        HeadlessPresentation::new(),
        RuntimeConfig::default(),
    );

    runtime.tick().unwrap();

    let frame = &runtime.presentation().frames()[0];
    assert!(frame
        .iter()
        .any(|cmd| matches!(cmd, DrawCommand::RectLines { .. })));
    assert!(frame
        .iter()
        .any(|cmd| matches!(cmd, DrawCommand::Text { text, .. } if text == "console")));
}

#[test]
fn timer_expiry_triggers_exactly_one_redraw() {
    let mut registry = ComponentRegistry::new();
    timer::spawn(&mut registry, 3).unwrap();
    let mut runtime = Runtime::new(
        registry,
        HeadlessPresentation::new(),
        RuntimeConfig {
            initial_redraw: false,
            ..RuntimeConfig::default()
        },
    );

    for _ in 0..5 {
        runtime.tick().unwrap();
    }

    assert_eq!(runtime.registry().event_count(), 0);
    assert_eq!(runtime.presentation().frames().len(), 1);
    assert_eq!(runtime.presentation().presents(), 5);
}

#[test]
fn force_quit_ends_the_run_and_clears_the_registry() {
    let mut registry = ComponentRegistry::new();
    for marker in 0..4 {
        registry.register(marker_module(marker, false)).unwrap();
    }

    let script = vec![
        FrameInput::default(),
        FrameInput::default(),
        FrameInput {
            pressed: vec![Key::Escape],
            modifier_down: true,
            close_requested: false,
        },
    ];
    let mut runtime = Runtime::new(
        registry,
        HeadlessPresentation::with_script(script),
        RuntimeConfig::default(),
    );

    runtime.run().unwrap();

    assert_eq!(runtime.tick_count(), 3);
    assert_eq!(runtime.registry().module_count(), 0);
    assert!(runtime.presentation().is_closed());
}

#[test]
fn exit_requested_by_component_shuts_down_after_the_tick() {
    fn exit_at_three(_: SlotIndex, state: &mut ModuleState, ops: &mut TickOps) {
        let ModuleState::Tally(t) = state else {
            return;
        };
        t.ticks += 1;
        if t.ticks == 3 {
            ops.request_exit();
        }
    }

    let mut registry = ComponentRegistry::new();
    registry
        .register(ComponentSpec::module(
            Some(exit_at_three),
            None,
            ModuleState::Tally(Tally::default()),
        ))
        .unwrap();
    let mut runtime = Runtime::new(
        registry,
        HeadlessPresentation::new(),
        RuntimeConfig::default(),
    );

    runtime.run().unwrap();

    // The exiting tick still presents.
    assert_eq!(runtime.tick_count(), 3);
    assert_eq!(runtime.presentation().presents(), 3);
    assert!(runtime.presentation().is_closed());
}
