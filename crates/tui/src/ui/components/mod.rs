pub mod account_card;
pub mod card;
pub mod input;
pub mod modal;

use ratatui::layout::Rect;

/// Fixed-size rect centered in `area`, shrunk to fit when `area` is smaller.
pub fn centered_box(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
