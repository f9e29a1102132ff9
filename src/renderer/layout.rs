//! Grid layout computation
//!
//! Pure functions from a [`FormSpec`] to grid placements. The grid has three
//! columns: 0 holds field labels, 1 holds inputs and stretches, 2 holds
//! auxiliary (bound) buttons. Field rows are doubled so the odd row below
//! every field stays free for its inline error.
//!
//! Overlapping `(row, col)` declarations are not detected; such fields share
//! a cell when drawn.

use crate::spec::{FieldKind, FieldSpec, FormSpec};
use std::collections::HashMap;

/// Number of grid columns
pub const GRID_COLUMNS: u16 = 3;

/// Grid column and span of a field's main element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnInfo {
    pub column: u16,
    pub span: u16,
}

impl ColumnInfo {
    pub const fn new(column: u16, span: u16) -> Self {
        Self { column, span }
    }
}

/// Where one non-action field is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Index into `FormSpec::fields`
    pub field_index: usize,
    pub grid_row: u16,
    pub cell: ColumnInfo,
    /// TEXT/SELECT fields with a label draw it in column 0
    pub has_label_cell: bool,
}

impl Placement {
    /// Row reserved for this field's inline error
    #[inline]
    pub fn error_row(&self) -> u16 {
        error_row(self.grid_row)
    }
}

/// Complete grid layout of a form
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormLayout {
    /// Form fields sorted by declared `(row, col)`
    pub placements: Vec<Placement>,
    /// Indices of unbound buttons, in declaration order
    pub action_buttons: Vec<usize>,
    /// Separator row; present only when there are action buttons
    pub separator_row: Option<u16>,
    /// Button bar row; present only when there are action buttons
    pub button_row: Option<u16>,
}

impl FormLayout {
    /// Placement of the field at `field_index`
    pub fn placement_of(&self, field_index: usize) -> Option<&Placement> {
        self.placements.iter().find(|p| p.field_index == field_index)
    }

    /// Total grid rows, including the error row of the last field row
    pub fn row_count(&self) -> u16 {
        if let Some(row) = self.button_row {
            return row.saturating_add(1);
        }
        self.placements
            .iter()
            .map(|p| p.error_row().saturating_add(1))
            .max()
            .unwrap_or(0)
    }
}

/// Row reserved for the inline error beneath `grid_row`
#[inline]
pub const fn error_row(grid_row: u16) -> u16 {
    grid_row.saturating_add(1)
}

/// Grid row for a declared row
#[inline]
pub const fn grid_row(row: u16) -> u16 {
    row.saturating_mul(2)
}

/// Grid column and span for a field's main element
pub fn column_info(field: &FieldSpec) -> ColumnInfo {
    match field.kind {
        FieldKind::Text | FieldKind::Select => {
            let labelled = !field.label.is_empty();
            match (labelled, field.is_bound) {
                (true, true) => ColumnInfo::new(1, 1),
                (true, false) => ColumnInfo::new(1, 2),
                (false, true) => ColumnInfo::new(0, 2),
                (false, false) => ColumnInfo::new(0, 3),
            }
        }
        FieldKind::Label => ColumnInfo::new(0, 3),
        FieldKind::Checkbox => ColumnInfo::new(0, 2),
        FieldKind::Button => ColumnInfo::new(2, 1),
    }
}

/// Lay out every field of `spec`
pub fn compute_layout(spec: &FormSpec) -> FormLayout {
    let fields = spec.fields();

    let mut form_fields: Vec<usize> = Vec::new();
    let mut action_buttons: Vec<usize> = Vec::new();
    for (idx, field) in fields.iter().enumerate() {
        if field.is_action_button() {
            action_buttons.push(idx);
        } else {
            form_fields.push(idx);
        }
    }
    form_fields.sort_by_key(|&idx| (fields[idx].row, fields[idx].col));

    let key_rows: HashMap<&str, u16> = fields
        .iter()
        .filter(|f| f.kind != FieldKind::Button)
        .filter_map(|f| f.key.as_deref().map(|k| (k, grid_row(f.row))))
        .collect();

    let placements = form_fields
        .into_iter()
        .map(|idx| {
            let field = &fields[idx];
            let row = match (&field.kind, &field.bind_to) {
                (FieldKind::Button, Some(target)) => key_rows
                    .get(target.as_str())
                    .copied()
                    .unwrap_or_else(|| grid_row(field.row)),
                _ => grid_row(field.row),
            };
            Placement {
                field_index: idx,
                grid_row: row,
                cell: column_info(field),
                has_label_cell: matches!(field.kind, FieldKind::Text | FieldKind::Select)
                    && !field.label.is_empty(),
            }
        })
        .collect();

    let (separator_row, button_row) = if action_buttons.is_empty() {
        (None, None)
    } else {
        let sep = grid_row(spec.max_row().unwrap_or(0).saturating_add(1));
        (Some(sep), Some(sep.saturating_add(1)))
    };

    FormLayout {
        placements,
        action_buttons,
        separator_row,
        button_row,
    }
}

/// Fixed widths of the label column and the auxiliary button column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnWidths {
    pub label: u16,
    pub aux: u16,
}

pub fn column_widths(spec: &FormSpec) -> ColumnWidths {
    let width = |s: &str| u16::try_from(s.chars().count()).unwrap_or(u16::MAX);

    let label = spec
        .fields()
        .iter()
        .filter(|f| matches!(f.kind, FieldKind::Text | FieldKind::Select))
        .map(|f| width(&f.label))
        .max()
        .filter(|w| *w > 0)
        .map_or(0, |w| w.saturating_add(2));
    let aux = spec
        .fields()
        .iter()
        .filter(|f| f.is_bound_button())
        .map(|f| width(&f.label).saturating_add(4))
        .max()
        .unwrap_or(0);

    ColumnWidths { label, aux }
}
