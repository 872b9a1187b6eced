//! Window-chrome drawing: the bordered "tab" panel with a labeled bar.
//!
//! A leaf utility over [`Canvas`], not part of the registry logic. The
//! geometry follows the classic tab layout: a 5-pixel border, a title bar
//! of configurable height at the top or bottom, a divider line between bar
//! and content, and the label inset into the bar.

use crate::canvas::{Canvas, Color, Rect, Vec2};

/// Border thickness of the tab outline and divider.
const BORDER: f32 = 5.0;
/// Horizontal inset of the label inside the bar.
const LABEL_INSET_X: f32 = 8.0;
/// Vertical inset of the label inside the bar.
const LABEL_INSET_Y: f32 = 3.0;
/// The label is this much shorter than the bar.
const LABEL_PAD: f32 = 6.0;
/// Gap between the border/divider and the content area.
const CONTENT_GAP: f32 = 2.0;

/// Paint a bordered panel with a labeled title bar; return the inner
/// content rectangle for nested drawing.
///
/// `bar_height` is the title bar's extent; `bar_on_top` selects which edge
/// carries it. The content rect excludes the border, the bar, and the
/// divider gap on the bar side.
pub fn draw_frame(
    canvas: &mut dyn Canvas,
    position: Vec2,
    size: Vec2,
    bar_height: f32,
    bar_on_top: bool,
    label: &str,
    color: Color,
) -> Rect {
    canvas.rect_lines(
        Rect::new(position.x, position.y, size.x, size.y),
        BORDER,
        color,
    );

    // Divider between the bar and the content, hugging the bar's inner edge.
    let divider_y = if bar_on_top {
        position.y + bar_height
    } else {
        position.y + size.y - bar_height
    };
    canvas.line(
        Vec2::new(position.x, divider_y),
        Vec2::new(position.x + size.x, divider_y),
        BORDER,
        color,
    );

    let label_y = if bar_on_top {
        position.y + LABEL_INSET_Y
    } else {
        position.y + size.y - bar_height + LABEL_INSET_Y
    };
    canvas.text(
        label,
        Vec2::new(position.x + LABEL_INSET_X, label_y),
        bar_height - LABEL_PAD,
        color,
    );

    let content_y = if bar_on_top {
        position.y + bar_height + BORDER + CONTENT_GAP
    } else {
        position.y + BORDER + CONTENT_GAP
    };
    Rect::new(
        position.x + BORDER,
        content_y,
        size.x - 2.0 * BORDER,
        size.y - bar_height - BORDER - CONTENT_GAP - BORDER,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawCommand, RecordingCanvas};

    #[test]
    fn emits_border_divider_and_label() {
        let mut canvas = RecordingCanvas::new();
        draw_frame(
            &mut canvas,
            Vec2::new(0.0, 0.0),
            Vec2::new(640.0, 360.0),
            30.0,
            true,
            "melos",
            Color::WHITE,
        );

        let commands = canvas.commands();
        assert_eq!(commands.len(), 3);
        assert!(matches!(
            commands[0],
            DrawCommand::RectLines { thickness, .. } if thickness == BORDER
        ));
        assert!(matches!(commands[1], DrawCommand::Line { .. }));
        let DrawCommand::Text { text, size, .. } = &commands[2] else {
            panic!("expected a label");
        };
        assert_eq!(text, "melos");
        assert_eq!(*size, 30.0 - LABEL_PAD);
    }

    #[test]
    fn content_rect_sits_below_a_top_bar() {
        let mut canvas = RecordingCanvas::new();
        let content = draw_frame(
            &mut canvas,
            Vec2::new(10.0, 20.0),
            Vec2::new(200.0, 100.0),
            30.0,
            true,
            "t",
            Color::WHITE,
        );
        assert_eq!(content.x, 15.0);
        assert_eq!(content.y, 20.0 + 30.0 + BORDER + CONTENT_GAP);
        assert_eq!(content.width, 190.0);
        assert_eq!(content.height, 100.0 - 30.0 - 2.0 * BORDER - CONTENT_GAP);
    }

    #[test]
    fn content_rect_sits_above_a_bottom_bar() {
        let mut canvas = RecordingCanvas::new();
        let content = draw_frame(
            &mut canvas,
            Vec2::new(0.0, 0.0),
            Vec2::new(200.0, 100.0),
            30.0,
            false,
            "t",
            Color::WHITE,
        );
        assert_eq!(content.y, BORDER + CONTENT_GAP);
        // Divider hugs the bar's top edge.
        let DrawCommand::Line { from, .. } = canvas.commands()[1] else {
            panic!("expected the divider");
        };
        assert_eq!(from.y, 100.0 - 30.0);
        // Label sits inside the bottom bar.
        let DrawCommand::Text { origin, .. } = &canvas.commands()[2] else {
            panic!("expected a label");
        };
        assert_eq!(origin.y, 100.0 - 30.0 + LABEL_INSET_Y);
    }
}
