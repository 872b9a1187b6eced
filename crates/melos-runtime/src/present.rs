//! Presentation adapters: where the retained frame goes each tick.
//!
//! The runtime draws into a retained offscreen surface only on redraw
//! ticks, and *presents* that surface every tick. [`Presentation`] is the
//! seam between those two operations and whatever the host actually shows:
//! a GPU window (`renderer` feature) or the in-memory
//! [`HeadlessPresentation`] used by tests and embedders.

use anyhow::anyhow;
use tracing::debug;

use crate::canvas::{Canvas, DrawCommand, RecordingCanvas};
use crate::input::{Key, KeyAction};
use crate::RuntimeError;

// ---------------------------------------------------------------------------
// FrameInput
// ---------------------------------------------------------------------------

/// Input gathered by the adapter since the previous poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    /// Keys that went down this tick, in arrival order.
    pub pressed: Vec<Key>,
    /// Whether the keymap modifier is currently held.
    pub modifier_down: bool,
    /// The host asked the window to close (close button, WM signal).
    pub close_requested: bool,
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

/// Output seam for the run loop.
///
/// Call order per tick is fixed: `poll_input`, then on redraw ticks
/// `canvas` followed by `commit_frame`, then `present` unconditionally.
/// `close` runs exactly once at shutdown.
pub trait Presentation {
    /// Drain input gathered since the previous tick.
    fn poll_input(&mut self) -> FrameInput;

    /// The retained offscreen surface draw hooks target on redraw ticks.
    fn canvas(&mut self) -> &mut dyn Canvas;

    /// Finish the offscreen frame begun by `canvas`. Only called on redraw
    /// ticks, after the draw pass.
    fn commit_frame(&mut self) -> Result<(), RuntimeError>;

    /// Show the retained surface. Called every tick, redraw or not.
    fn present(&mut self) -> Result<(), RuntimeError>;

    /// Apply a window-mode action from the keymap. Adapters without a
    /// window ignore it.
    fn apply_action(&mut self, action: KeyAction);

    /// Release output resources. Called exactly once, after the loop ends.
    fn close(&mut self);
}

// ---------------------------------------------------------------------------
// HeadlessPresentation
// ---------------------------------------------------------------------------

/// In-memory adapter: records draw commands, replays scripted input.
///
/// The retained surface is a [`RecordingCanvas`]; committed frames are kept
/// so tests can assert exactly what each redraw tick painted. `presents()`
/// counts every tick, which is how tests distinguish "presented the stale
/// frame" from "re-drew it".
#[derive(Debug, Default)]
pub struct HeadlessPresentation {
    canvas: RecordingCanvas,
    /// Scripted input, one entry per poll; empty input once exhausted.
    script: Vec<FrameInput>,
    cursor: usize,
    frames: Vec<Vec<DrawCommand>>,
    presents: usize,
    actions: Vec<KeyAction>,
    closed: bool,
    /// When set, the next `commit_frame` and `present` fail.
    fail_next: bool,
}

impl HeadlessPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a fixed input sequence; polls past the end return no input.
    pub fn with_script(script: Vec<FrameInput>) -> Self {
        Self {
            script,
            ..Self::default()
        }
    }

    /// Commands captured by completed redraw ticks, oldest first.
    pub fn frames(&self) -> &[Vec<DrawCommand>] {
        &self.frames
    }

    /// Ticks presented so far.
    pub fn presents(&self) -> usize {
        self.presents
    }

    /// Window-mode actions the runtime routed here.
    pub fn actions(&self) -> &[KeyAction] {
        &self.actions
    }

    /// Whether `close` has run.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Make the next commit/present fail, to exercise fatal paths.
    pub fn fail_next_frame(&mut self) {
        self.fail_next = true;
    }

    fn check_failure(&mut self, stage: &str) -> Result<(), RuntimeError> {
        if self.fail_next {
            self.fail_next = false;
            return Err(RuntimeError::Presentation(anyhow!(
                "scripted {stage} failure"
            )));
        }
        Ok(())
    }
}

impl Presentation for HeadlessPresentation {
    fn poll_input(&mut self) -> FrameInput {
        let input = self.script.get(self.cursor).cloned().unwrap_or_default();
        self.cursor += 1;
        input
    }

    fn canvas(&mut self) -> &mut dyn Canvas {
        &mut self.canvas
    }

    fn commit_frame(&mut self) -> Result<(), RuntimeError> {
        self.check_failure("commit")?;
        let commands = self.canvas.take();
        debug!(commands = commands.len(), "offscreen frame committed");
        self.frames.push(commands);
        Ok(())
    }

    fn present(&mut self) -> Result<(), RuntimeError> {
        self.check_failure("present")?;
        self.presents += 1;
        Ok(())
    }

    fn apply_action(&mut self, action: KeyAction) {
        self.actions.push(action);
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Color, Rect};

    #[test]
    fn scripted_input_then_silence() {
        let mut present = HeadlessPresentation::with_script(vec![FrameInput {
            pressed: vec![Key::F11],
            ..FrameInput::default()
        }]);

        assert_eq!(present.poll_input().pressed, vec![Key::F11]);
        assert_eq!(present.poll_input(), FrameInput::default());
        assert_eq!(present.poll_input(), FrameInput::default());
    }

    #[test]
    fn committed_frames_are_retained_in_order() {
        let mut present = HeadlessPresentation::new();

        present.canvas().clear(Color::BLANK);
        present.commit_frame().unwrap();
        present
            .canvas()
            .fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), Color::WHITE);
        present.commit_frame().unwrap();

        assert_eq!(present.frames().len(), 2);
        assert_eq!(present.frames()[0].len(), 1);
        assert!(matches!(present.frames()[1][0], DrawCommand::FillRect { .. }));
    }

    #[test]
    fn scripted_failure_is_fatal_and_one_shot() {
        let mut present = HeadlessPresentation::new();
        present.fail_next_frame();

        let err = present.present().unwrap_err();
        assert!(err.is_fatal());
        present.present().unwrap();
        assert_eq!(present.presents(), 1);
    }
}
