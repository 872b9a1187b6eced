//! 5x7 bitmap glyph layout for the quad pipeline.
//!
//! Canvas text is rasterized as one filled rectangle per lit glyph pixel,
//! so it flows through the same shape pipeline as everything else -- no
//! font atlas, no sampler, no kerning. Enough for pane titles and HUD
//! counters.

use crate::canvas::{Rect, Vec2};

/// Columns per glyph cell.
const COLS: u32 = 5;
/// Rows per glyph cell.
const ROWS: u32 = 7;
/// Horizontal advance in columns (glyph plus one column of spacing).
const ADVANCE: u32 = COLS + 1;

/// Bitmap rows for `ch`, top to bottom; bit 4 is the leftmost column.
///
/// Uppercase folds to lowercase. `None` means "advance, draw nothing",
/// which also covers the space character.
fn glyph(ch: char) -> Option<[u8; ROWS as usize]> {
    let rows = match ch.to_ascii_lowercase() {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        'a' => [0b00000, 0b00000, 0b01110, 0b00001, 0b01111, 0b10001, 0b01111],
        'b' => [0b10000, 0b10000, 0b10110, 0b11001, 0b10001, 0b10001, 0b11110],
        'c' => [0b00000, 0b00000, 0b01110, 0b10000, 0b10000, 0b10001, 0b01110],
        'd' => [0b00001, 0b00001, 0b01101, 0b10011, 0b10001, 0b10001, 0b01111],
        'e' => [0b00000, 0b00000, 0b01110, 0b10001, 0b11111, 0b10000, 0b01110],
        'f' => [0b00110, 0b01001, 0b01000, 0b11100, 0b01000, 0b01000, 0b01000],
        'g' => [0b00000, 0b01111, 0b10001, 0b10001, 0b01111, 0b00001, 0b01110],
        'h' => [0b10000, 0b10000, 0b10110, 0b11001, 0b10001, 0b10001, 0b10001],
        'i' => [0b00100, 0b00000, 0b01100, 0b00100, 0b00100, 0b00100, 0b01110],
        'j' => [0b00010, 0b00000, 0b00110, 0b00010, 0b00010, 0b10010, 0b01100],
        'k' => [0b10000, 0b10000, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010],
        'l' => [0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'm' => [0b00000, 0b00000, 0b11010, 0b10101, 0b10101, 0b10001, 0b10001],
        'n' => [0b00000, 0b00000, 0b10110, 0b11001, 0b10001, 0b10001, 0b10001],
        'o' => [0b00000, 0b00000, 0b01110, 0b10001, 0b10001, 0b10001, 0b01110],
        'p' => [0b00000, 0b00000, 0b11110, 0b10001, 0b11110, 0b10000, 0b10000],
        'q' => [0b00000, 0b00000, 0b01101, 0b10011, 0b01111, 0b00001, 0b00001],
        'r' => [0b00000, 0b00000, 0b10110, 0b11001, 0b10000, 0b10000, 0b10000],
        's' => [0b00000, 0b00000, 0b01110, 0b10000, 0b01110, 0b00001, 0b11110],
        't' => [0b01000, 0b01000, 0b11100, 0b01000, 0b01000, 0b01001, 0b00110],
        'u' => [0b00000, 0b00000, 0b10001, 0b10001, 0b10001, 0b10011, 0b01101],
        'v' => [0b00000, 0b00000, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'w' => [0b00000, 0b00000, 0b10001, 0b10001, 0b10101, 0b10101, 0b01010],
        'x' => [0b00000, 0b00000, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001],
        'y' => [0b00000, 0b00000, 0b10001, 0b10001, 0b01111, 0b00001, 0b01110],
        'z' => [0b00000, 0b00000, 0b11111, 0b00010, 0b00100, 0b01000, 0b11111],
        ':' => [0b00000, 0b00100, 0b00100, 0b00000, 0b00100, 0b00100, 0b00000],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '#' => [0b01010, 0b11111, 0b01010, 0b01010, 0b01010, 0b11111, 0b01010],
        _ => return None,
    };
    Some(rows)
}

/// Lay `text` out starting at `origin`, `size` pixels tall, appending one
/// rect per lit pixel via `emit`.
pub fn layout(text: &str, origin: Vec2, size: f32, emit: &mut dyn FnMut(Rect)) {
    let cell = size / ROWS as f32;
    let mut pen_x = origin.x;
    for ch in text.chars() {
        if let Some(rows) = glyph(ch) {
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..COLS {
                    if (bits >> (COLS - 1 - col)) & 1 == 1 {
                        emit(Rect::new(
                            pen_x + col as f32 * cell,
                            origin.y + row as f32 * cell,
                            cell,
                            cell,
                        ));
                    }
                }
            }
        }
        pen_x += ADVANCE as f32 * cell;
    }
}

/// Width in pixels `text` occupies at the given height.
pub fn measure(text: &str, size: f32) -> f32 {
    let cell = size / ROWS as f32;
    text.chars().count() as f32 * ADVANCE as f32 * cell
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(text: &str, size: f32) -> Vec<Rect> {
        let mut rects = Vec::new();
        layout(text, Vec2::default(), size, &mut |rect| rects.push(rect));
        rects
    }

    #[test]
    fn space_advances_without_pixels() {
        assert!(collect(" ", 14.0).is_empty());
        let shifted = collect(" 1", 14.0);
        let plain = collect("1", 14.0);
        assert_eq!(shifted.len(), plain.len());
        assert!(shifted[0].x > plain[0].x);
    }

    #[test]
    fn uppercase_folds_to_lowercase() {
        assert_eq!(collect("M", 14.0), collect("m", 14.0));
    }

    #[test]
    fn pixel_cells_scale_with_size() {
        let small = collect("8", 7.0);
        let large = collect("8", 14.0);
        assert_eq!(small.len(), large.len());
        assert!((large[0].width - 2.0 * small[0].width).abs() < f32::EPSILON);
    }

    #[test]
    fn measure_matches_advance() {
        let cell = 14.0 / 7.0;
        assert!((measure("abc", 14.0) - 3.0 * 6.0 * cell).abs() < f32::EPSILON);
    }
}
