//! Reusable TUI components

pub mod confirm_prompt;
pub mod help_overlay;
pub mod keybindings;

use ratatui::layout::Rect;

/// Rectangle of at most `width` x `height` centred in `parent`
pub fn popup_area(parent: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(parent.width);
    let height = height.min(parent.height);
    Rect::new(
        parent.x + (parent.width - width) / 2,
        parent.y + (parent.height - height) / 2,
        width,
        height,
    )
}
