//! Utility functions for rendering UI components

use ratatui::{layout::Rect, style::Color};

/// Terminal cell size in the pixel units the card transform uses
pub const CELL_WIDTH_PX: f32 = 8.0;
pub const CELL_HEIGHT_PX: f32 = 16.0;

pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() > max_width {
        let truncated: String = s.chars().take(max_width.saturating_sub(3)).collect();
        format!("{}...", truncated)
    } else {
        s.to_string()
    }
}

/// A `width` x `height` rect centered in `area`, clamped to fit
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Move `rect` by a pixel offset, keeping only the part still inside `bounds`
pub fn offset_rect(rect: Rect, offset_x: f32, offset_y: f32, bounds: Rect) -> Rect {
    let dx = (offset_x / CELL_WIDTH_PX).round() as i32;
    let dy = (offset_y / CELL_HEIGHT_PX).round() as i32;

    let left = (rect.x as i32 + dx).max(bounds.x as i32);
    let top = (rect.y as i32 + dy).max(bounds.y as i32);
    let right = (rect.right() as i32 + dx).min(bounds.right() as i32);
    let bottom = (rect.bottom() as i32 + dy).min(bounds.bottom() as i32);

    if right <= left || bottom <= top {
        return Rect::new(bounds.x, bounds.y, 0, 0);
    }
    Rect::new(left as u16, top as u16, (right - left) as u16, (bottom - top) as u16)
}

/// Mix `overlay` over `base`; `alpha` is the overlay opacity
pub fn blend(base: (u8, u8, u8), overlay: (u8, u8, u8), alpha: f32) -> Color {
    let alpha = alpha.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * alpha).round() as u8;
    Color::Rgb(mix(base.0, overlay.0), mix(base.1, overlay.1), mix(base.2, overlay.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_rect_clips_to_bounds() {
        let bounds = Rect::new(0, 0, 100, 40);
        let card = centered_rect(bounds, 40, 20);
        assert_eq!(card, Rect::new(30, 10, 40, 20));

        assert_eq!(offset_rect(card, 80.0, 0.0, bounds), Rect::new(40, 10, 40, 20));
        assert_eq!(offset_rect(card, 400.0, 0.0, bounds), Rect::new(80, 10, 20, 20));
        assert_eq!(offset_rect(card, -480.0, 0.0, bounds), Rect::new(0, 10, 10, 20));
        assert_eq!(offset_rect(card, -1000.0, 0.0, bounds).width, 0);
    }

    #[test]
    fn test_blend() {
        assert_eq!(blend((0, 0, 0), (200, 100, 50), 0.5), Color::Rgb(100, 50, 25));
        assert_eq!(blend((10, 10, 10), (200, 100, 50), 0.0), Color::Rgb(10, 10, 10));
        assert_eq!(blend((10, 10, 10), (200, 100, 50), 2.0), Color::Rgb(200, 100, 50));
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Short", 10), "Short");
        assert_eq!(truncate_string("A rather long title", 10), "A rathe...");
    }
}
