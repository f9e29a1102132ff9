//! Drawing a `FormSession` into a ratatui frame
//!
//! The dialog is a bordered block centred in the terminal. Its inner area is
//! split into the three grid columns; grid rows collapse to zero height when
//! they have nothing to show, so error rows only take space while an inline
//! error is displayed. The last inner line shows the focused tooltip and the
//! bottom border carries the key hints.

use crate::components::help_overlay::HelpOverlay;
use crate::components::keybindings::KeyMode;
use crate::components::popup_area;
use crate::renderer::elements::{ElementState, LiveElement};
use crate::renderer::layout::{column_widths, ColumnInfo, ColumnWidths, GRID_COLUMNS};
use crate::renderer::session::FormSession;
use crate::spec::{FieldKind, FieldSpec};
use crate::theme::{Styles, Theme};
use crate::validation::Severity;
use ratatui::{
    layout::{Position, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Narrowest input column
const MIN_INPUT_WIDTH: u16 = 20;

/// Inner lines outside the grid (tooltip line)
const FOOTER_LINES: u16 = 1;

/// Everything a per-kind drawer needs for one cell
pub struct Cell<'a> {
    pub area: Rect,
    pub field: &'a FieldSpec,
    pub element: &'a LiveElement,
    pub focused: bool,
}

/// Draws one element; returns the cursor position when the element wants it
type DrawFn = fn(&mut Frame, &Cell<'_>) -> Option<Position>;

/// Per-kind drawers
const ELEMENT_DRAWERS: &[(FieldKind, DrawFn)] = &[
    (FieldKind::Label, draw_label),
    (FieldKind::Text, draw_text),
    (FieldKind::Select, draw_select),
    (FieldKind::Checkbox, draw_checkbox),
    (FieldKind::Button, draw_bound_button),
];

/// Height of every grid row for the session's current state
pub fn row_heights(session: &FormSession) -> Vec<u16> {
    let layout = session.layout();
    let mut heights = vec![0u16; usize::from(layout.row_count())];

    for placement in &layout.placements {
        if let Some(h) = heights.get_mut(usize::from(placement.grid_row)) {
            *h = 1;
        }
        let field = &session.spec().fields()[placement.field_index];
        let has_error = field
            .key
            .as_deref()
            .is_some_and(|k| session.inline_error(k).is_some());
        if has_error {
            if let Some(h) = heights.get_mut(usize::from(placement.error_row())) {
                *h = 1;
            }
        }
    }
    for row in [layout.separator_row, layout.button_row].into_iter().flatten() {
        if let Some(h) = heights.get_mut(usize::from(row)) {
            *h = 1;
        }
    }
    heights
}

/// Dialog rectangle inside `area`: at least the minimum size, grown to fit
/// the content, centred and clamped to `area`
pub fn dialog_area(session: &FormSession, area: Rect) -> Rect {
    let widths = column_widths(session.spec());
    let (min_cols, min_rows) = session.spec().min_cells();

    let grid_height: u16 = row_heights(session).iter().sum();
    let content_height = grid_height.saturating_add(FOOTER_LINES).saturating_add(2);
    let content_width = widths
        .label
        .saturating_add(widths.aux)
        .saturating_add(MIN_INPUT_WIDTH)
        .saturating_add(4);

    popup_area(
        area,
        content_width.max(min_cols),
        content_height.max(min_rows),
    )
}

/// Left edge and width of each grid column inside `inner`
fn column_bounds(inner: Rect, widths: ColumnWidths) -> [(u16, u16); GRID_COLUMNS as usize] {
    let label = widths.label.min(inner.width);
    let aux = widths.aux.min(inner.width - label);
    let input = inner.width - label - aux;
    [
        (inner.x, label),
        (inner.x + label, input),
        (inner.x + label + input, aux),
    ]
}

fn cell_rect(bounds: &[(u16, u16); GRID_COLUMNS as usize], cell: ColumnInfo, y: u16) -> Rect {
    let first = usize::from(cell.column.min(GRID_COLUMNS - 1));
    let last = usize::from((cell.column + cell.span).clamp(1, GRID_COLUMNS)) - 1;
    let width = bounds[first..=last].iter().map(|(_, w)| *w).sum();
    Rect::new(bounds[first].0, y, width, 1)
}

/// Draw the whole dialog, then any overlay
pub fn draw(f: &mut Frame, session: &FormSession) {
    let screen = f.area();
    let area = dialog_area(session, screen);
    let mode = session.key_mode();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Line::styled(format!(" {} ", session.spec().title()), Styles::title()))
        .title_bottom(Line::styled(
            format!(" {} ", session.keybindings().hint_line(mode)),
            Styles::nav_hint(),
        ))
        .border_style(Styles::border_active())
        .style(Styles::panel_bg());
    let padded = block.inner(area);
    f.render_widget(block, area);

    let inner = Rect::new(
        padded.x.saturating_add(1),
        padded.y,
        padded.width.saturating_sub(2),
        padded.height,
    );
    let bounds = column_bounds(inner, column_widths(session.spec()));

    let heights = row_heights(session);
    let mut row_y = Vec::with_capacity(heights.len());
    let mut y = inner.y;
    for h in &heights {
        row_y.push(y);
        y = y.saturating_add(*h);
    }

    let focused = session.focused_element();
    let mut cursor = None;

    for placement in &session.layout().placements {
        let row = usize::from(placement.grid_row);
        if heights.get(row) != Some(&1) {
            continue;
        }
        let field = &session.spec().fields()[placement.field_index];
        let Some(element) = session.elements().get(placement.field_index) else {
            continue;
        };
        let is_focused = focused == Some(placement.field_index);

        if placement.has_label_cell {
            let label_area = cell_rect(&bounds, ColumnInfo::new(0, 1), row_y[row]).intersection(inner);
            draw_field_label(f, label_area, field, is_focused);
        }

        let cell = Cell {
            area: cell_rect(&bounds, placement.cell, row_y[row]).intersection(inner),
            field,
            element,
            focused: is_focused,
        };
        if let Some((_, drawer)) = ELEMENT_DRAWERS.iter().find(|(kind, _)| *kind == field.kind) {
            if let Some(pos) = drawer(f, &cell) {
                cursor = Some(pos);
            }
        }

        let error = field.key.as_deref().and_then(|k| session.inline_error(k));
        let error_row = usize::from(placement.error_row());
        if let (Some(message), Some(&1)) = (error, heights.get(error_row)) {
            let area = cell_rect(&bounds, ColumnInfo::new(1, 2), row_y[error_row]).intersection(inner);
            f.render_widget(
                Paragraph::new(message.to_string()).style(Theme::severity_style(Severity::Error)),
                area,
            );
        }
    }

    if let Some(row) = session.layout().separator_row.map(usize::from) {
        let area = Rect::new(inner.x, row_y[row], inner.width, 1).intersection(inner);
        f.render_widget(
            Paragraph::new("\u{2500}".repeat(usize::from(area.width))).style(Styles::border_inactive()),
            area,
        );
    }
    if let Some(row) = session.layout().button_row.map(usize::from) {
        let area = Rect::new(inner.x, row_y[row], inner.width, 1).intersection(inner);
        draw_action_buttons(f, area, session, focused);
    }

    let hint_area = Rect::new(inner.x, inner.bottom().saturating_sub(1), inner.width, 1).intersection(inner);
    if let Some(tooltip) = session.focused_tooltip() {
        f.render_widget(Paragraph::new(tooltip).style(Styles::hint()), hint_area);
    }

    if let Some(prompt) = session.pending_prompt() {
        prompt.render(f, screen);
    } else if session.is_help_visible() {
        HelpOverlay::new(KeyMode::Form, session.keybindings()).render(f, screen);
    } else if let Some(pos) = cursor {
        f.set_cursor_position(pos);
    }
}

fn draw_field_label(f: &mut Frame, area: Rect, field: &FieldSpec, focused: bool) {
    let style = if focused { Styles::focused() } else { Styles::text() };
    f.render_widget(
        Paragraph::new(field.label.clone()).style(Theme::font_style(style, field.font)),
        area,
    );
}

fn draw_action_buttons(f: &mut Frame, area: Rect, session: &FormSession, focused: Option<usize>) {
    let mut spans = Vec::new();
    for &idx in &session.layout().action_buttons {
        let field = &session.spec().fields()[idx];
        let style = if focused == Some(idx) {
            Styles::button_active()
        } else {
            Styles::button_inactive()
        };
        if !spans.is_empty() {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            format!("[ {} ]", field.label),
            Theme::font_style(style, field.font),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

// =============================================================================
// PER-KIND DRAWERS
// =============================================================================

fn draw_label(f: &mut Frame, cell: &Cell<'_>) -> Option<Position> {
    f.render_widget(
        Paragraph::new(cell.field.label.clone()).style(Theme::font_style(Styles::text(), cell.field.font)),
        cell.area,
    );
    None
}

/// Visible slice of `text` in `width` columns keeping `cursor` in view
fn scroll_window(text: &str, cursor: usize, width: u16) -> (String, u16) {
    let width = usize::from(width.max(1));
    let offset = (cursor + 1).saturating_sub(width);
    let visible: String = text.chars().skip(offset).take(width).collect();
    let column = u16::try_from(cursor - offset).unwrap_or(u16::MAX);
    (visible, column)
}

fn draw_input(f: &mut Frame, area: Rect, cell: &Cell<'_>, text: &str, cursor: Option<usize>) -> Option<Position> {
    let base = if cell.focused {
        Styles::input_focused()
    } else {
        Styles::input()
    };
    let style = Theme::font_style(base, cell.field.font);
    match cursor {
        Some(cursor) if cell.focused => {
            let (visible, column) = scroll_window(text, cursor, area.width);
            f.render_widget(Paragraph::new(visible).style(style), area);
            (area.width > 0).then(|| Position::new(area.x + column, area.y))
        }
        _ => {
            let visible: String = text.chars().take(usize::from(area.width)).collect();
            f.render_widget(Paragraph::new(visible).style(style), area);
            None
        }
    }
}

fn draw_text(f: &mut Frame, cell: &Cell<'_>) -> Option<Position> {
    let ElementState::Text(input) = &cell.element.state else {
        return None;
    };
    draw_input(f, cell.area, cell, &input.var.text(), Some(input.cursor()))
}

fn draw_select(f: &mut Frame, cell: &Cell<'_>) -> Option<Position> {
    let ElementState::Select { input, readonly, .. } = &cell.element.state else {
        return None;
    };
    let marker_width = 2.min(cell.area.width);
    let text_area = Rect {
        width: cell.area.width - marker_width,
        ..cell.area
    };
    let marker_area = Rect {
        x: text_area.right(),
        width: marker_width,
        ..cell.area
    };
    f.render_widget(
        Paragraph::new(" \u{25be}").style(if cell.focused { Styles::focused() } else { Styles::text_muted() }),
        marker_area,
    );
    let cursor = (!*readonly).then(|| input.cursor());
    draw_input(f, text_area, cell, &input.var.text(), cursor)
}

fn draw_checkbox(f: &mut Frame, cell: &Cell<'_>) -> Option<Position> {
    let ElementState::Checkbox(var) = &cell.element.state else {
        return None;
    };
    let mark = if var.get().as_bool().unwrap_or(false) { "x" } else { " " };
    let style = if cell.focused { Styles::focused() } else { Styles::text() };
    f.render_widget(
        Paragraph::new(format!("[{mark}] {}", cell.field.label)).style(Theme::font_style(style, cell.field.font)),
        cell.area,
    );
    None
}

fn draw_bound_button(f: &mut Frame, cell: &Cell<'_>) -> Option<Position> {
    let style = if cell.focused {
        Styles::button_active()
    } else {
        Styles::button_inactive()
    };
    f.render_widget(
        Paragraph::new(format!("[ {} ]", cell.field.label)).style(Theme::font_style(style, cell.field.font)),
        cell.area,
    );
    None
}
