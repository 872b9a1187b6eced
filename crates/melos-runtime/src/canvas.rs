//! Drawing surface abstraction and the commands that cross it.
//!
//! Draw hooks and the window chrome paint through the object-safe
//! [`Canvas`] trait. Every call maps to one [`DrawCommand`], which is what
//! the GPU presentation turns into vertices and what [`RecordingCanvas`]
//! logs verbatim for headless runs and tests.
//!
//! Coordinates are offscreen pixels: origin top-left, `x` right, `y` down,
//! at the fixed offscreen resolution (not the window size).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A point or extent in offscreen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    /// Construct from components.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in offscreen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Construct from top-left corner and extents.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner.
    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Extents as a vector.
    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// RGBA color, each channel `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    /// Fully transparent black -- the clear color of the offscreen surface.
    pub const BLANK: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    /// Construct from channels.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Construct an opaque color from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            1.0,
        )
    }

    /// Channels as an array, for uniform/vertex upload.
    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

// ---------------------------------------------------------------------------
// DrawCommand
// ---------------------------------------------------------------------------

/// One recorded canvas operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Reset the surface to a single color.
    Clear(Color),
    /// Filled rectangle.
    FillRect { rect: Rect, color: Color },
    /// Rectangle outline of the given border thickness.
    RectLines {
        rect: Rect,
        thickness: f32,
        color: Color,
    },
    /// Straight line segment of the given thickness.
    Line {
        from: Vec2,
        to: Vec2,
        thickness: f32,
        color: Color,
    },
    /// Text at `origin` (top-left of the first glyph), `size` pixels tall.
    Text {
        text: String,
        origin: Vec2,
        size: f32,
        color: Color,
    },
}

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// An offscreen drawing surface.
///
/// Object-safe so draw hooks can take `&mut dyn Canvas` without knowing
/// which presentation backs it.
pub trait Canvas {
    /// Reset the surface to `color`.
    fn clear(&mut self, color: Color);

    /// Paint a filled rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Paint a rectangle outline.
    fn rect_lines(&mut self, rect: Rect, thickness: f32, color: Color);

    /// Paint a line segment.
    fn line(&mut self, from: Vec2, to: Vec2, thickness: f32, color: Color);

    /// Paint text, `size` pixels tall, starting at `origin`.
    fn text(&mut self, text: &str, origin: Vec2, size: f32, color: Color);
}

// ---------------------------------------------------------------------------
// RecordingCanvas
// ---------------------------------------------------------------------------

/// A canvas that logs every call as a [`DrawCommand`].
///
/// Backs the headless presentation and lets tests assert on exactly what a
/// draw pass produced.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    /// Create an empty recording.
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded commands, in call order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Discard the recording.
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    /// Take the recording, leaving this canvas empty.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn rect_lines(&mut self, rect: Rect, thickness: f32, color: Color) {
        self.commands.push(DrawCommand::RectLines {
            rect,
            thickness,
            color,
        });
    }

    fn line(&mut self, from: Vec2, to: Vec2, thickness: f32, color: Color) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            thickness,
            color,
        });
    }

    fn text(&mut self, text: &str, origin: Vec2, size: f32, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_owned(),
            origin,
            size,
            color,
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_preserves_call_order() {
        let mut canvas = RecordingCanvas::new();
        canvas.clear(Color::BLANK);
        canvas.fill_rect(Rect::new(1.0, 2.0, 3.0, 4.0), Color::WHITE);
        canvas.text("hi", Vec2::new(0.0, 0.0), 12.0, Color::WHITE);

        assert_eq!(canvas.commands().len(), 3);
        assert_eq!(canvas.commands()[0], DrawCommand::Clear(Color::BLANK));
        assert!(matches!(canvas.commands()[2], DrawCommand::Text { .. }));
    }

    #[test]
    fn color_from_rgb8() {
        let c = Color::from_rgb8(255, 0, 127);
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert!((c.b - 0.498).abs() < 0.001);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn take_leaves_canvas_empty() {
        let mut canvas = RecordingCanvas::new();
        canvas.clear(Color::WHITE);
        let taken = canvas.take();
        assert_eq!(taken.len(), 1);
        assert!(canvas.commands().is_empty());
    }
}
