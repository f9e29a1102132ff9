//! Declarative form specification
//!
//! A `FormSpec` is a complete, self-sufficient description of one dialog: an
//! ordered list of `FieldSpec`s plus sizing metadata. Build one directly with
//! `FormSpec::new`, or fluently with [`crate::builder::DialogBuilder`]. Either
//! way the construction checks run once, and the spec is read-only afterwards.
//!
//! # Invariant
//!
//! Exactly one of these holds for every field:
//! - the field has a key, or
//! - the field is a LABEL or an unbound action BUTTON.

use crate::error::ConstructionError;
use crate::validation::Validator;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use strum::{Display, EnumIter, EnumString};

/// Default minimum dialog width in pixels
pub const DEFAULT_MIN_WIDTH: u32 = 520;

/// Default minimum dialog height in pixels
pub const DEFAULT_MIN_HEIGHT: u32 = 320;

/// Pixel width of one terminal cell, used to convert sizing hints
pub const CELL_WIDTH_PX: u32 = 8;

/// Pixel height of one terminal cell, used to convert sizing hints
pub const CELL_HEIGHT_PX: u32 = 16;

/// Highest declarable row. Grid rows are doubled and followed by an error
/// row, a separator and a button bar, all of which must fit in a `u16`.
pub const MAX_ROW: u16 = (u16::MAX - 4) / 2;

/// Discriminator for `FieldSpec`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Select,
    Checkbox,
    Button,
    Label,
}

impl FieldKind {
    /// Kinds that own a live variable and contribute to the result values
    #[inline]
    pub const fn holds_value(self) -> bool {
        matches!(self, Self::Text | Self::Select | Self::Checkbox)
    }
}

/// The value held by a keyed field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    #[default]
    Absent,
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Trim text and collapse empty text to `Absent`.
    pub fn normalized(&self) -> Self {
        match self {
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Self::Absent
                } else {
                    Self::Text(trimmed.to_string())
                }
            }
            other => other.clone(),
        }
    }

    /// Text shown for this value in tooltips and debug output
    pub fn display_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
            Self::Absent => String::new(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Option<String>> for FieldValue {
    fn from(s: Option<String>) -> Self {
        s.map_or(Self::Absent, Self::Text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSlant {
    #[default]
    Roman,
    Italic,
}

/// Presentation hint for a field's text. Not semantically load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FontHint {
    pub weight: FontWeight,
    pub slant: FontSlant,
    pub underline: bool,
    pub overstrike: bool,
}

impl FontHint {
    pub fn bold() -> Self {
        Self {
            weight: FontWeight::Bold,
            ..Self::default()
        }
    }
}

/// Zero-argument button callback. A returned string is pushed into the
/// button's `bind_to` field.
pub type ButtonCallback = Rc<dyn Fn() -> Option<String>>;

/// Built-in behaviour for an action button without a callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultAction {
    Submit,
    Cancel,
}

/// Normalise a button label into an identifier: lower-cased, whitespace runs
/// joined with `_`.
pub fn action_slug(label: &str) -> String {
    label
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Specification for a single form field
#[derive(Clone)]
pub struct FieldSpec {
    pub kind: FieldKind,
    /// Result-map key. Required for value-holding kinds and bound buttons.
    pub key: Option<String>,
    pub label: String,
    /// Text for TEXT/SELECT, bool for CHECKBOX, unused otherwise
    pub default: FieldValue,
    pub help_text: String,
    /// SELECT only
    pub options: Vec<String>,
    /// SELECT only
    pub readonly: bool,
    /// BUTTON only
    pub callback: Option<ButtonCallback>,
    /// BUTTON only: key of the field overwritten with the callback's result
    pub bind_to: Option<String>,
    pub row: u16,
    pub col: u16,
    pub validators: Vec<Validator>,
    pub font: FontHint,
    /// Whether an auxiliary button is bound to this field
    pub is_bound: bool,
}

impl FieldSpec {
    /// A field of `kind` with every other attribute at its default
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            key: None,
            label: String::new(),
            default: FieldValue::Absent,
            help_text: String::new(),
            options: Vec::new(),
            readonly: false,
            callback: None,
            bind_to: None,
            row: 0,
            col: 0,
            validators: Vec::new(),
            font: FontHint::default(),
            is_bound: false,
        }
    }

    /// A button bound to another field (auxiliary button)
    #[inline]
    pub fn is_bound_button(&self) -> bool {
        self.kind == FieldKind::Button && self.bind_to.is_some()
    }

    /// A button rendered in the bottom button bar
    #[inline]
    pub fn is_action_button(&self) -> bool {
        self.kind == FieldKind::Button && self.bind_to.is_none()
    }

    /// Identifier derived from the label, used to address buttons
    pub fn action_id(&self) -> String {
        action_slug(&self.label)
    }

    /// Submit/Cancel behaviour for a button that has no callback
    pub fn default_action(&self) -> Option<DefaultAction> {
        if self.kind != FieldKind::Button || self.callback.is_some() {
            return None;
        }
        match self.label.trim().to_lowercase().as_str() {
            "submit" => Some(DefaultAction::Submit),
            "cancel" => Some(DefaultAction::Cancel),
            _ => None,
        }
    }

    /// Key, label, or a placeholder, for messages
    pub fn display_name(&self) -> &str {
        if !self.label.is_empty() {
            &self.label
        } else if let Some(key) = &self.key {
            key
        } else {
            "<unnamed>"
        }
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("kind", &self.kind)
            .field("key", &self.key)
            .field("label", &self.label)
            .field("default", &self.default)
            .field("help_text", &self.help_text)
            .field("options", &self.options)
            .field("readonly", &self.readonly)
            .field("callback", &self.callback.as_ref().map(|_| "<callback>"))
            .field("bind_to", &self.bind_to)
            .field("row", &self.row)
            .field("col", &self.col)
            .field("validators", &self.validators)
            .field("font", &self.font)
            .field("is_bound", &self.is_bound)
            .finish()
    }
}

/// Value equality. Callbacks compare by presence, validators by name.
impl PartialEq for FieldSpec {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.key == other.key
            && self.label == other.label
            && self.default == other.default
            && self.help_text == other.help_text
            && self.options == other.options
            && self.readonly == other.readonly
            && self.callback.is_some() == other.callback.is_some()
            && self.bind_to == other.bind_to
            && self.row == other.row
            && self.col == other.col
            && self.validators == other.validators
            && self.font == other.font
            && self.is_bound == other.is_bound
    }
}

/// Complete specification for a form dialog
#[derive(Debug, Clone, PartialEq)]
pub struct FormSpec {
    title: String,
    fields: Vec<FieldSpec>,
    min_width: u32,
    min_height: u32,
}

impl FormSpec {
    /// Validate `fields` and assemble a spec.
    ///
    /// Every field targeted by a bound button is marked `is_bound`.
    ///
    /// # Errors
    ///
    /// Any [`ConstructionError`]: missing or unexpected keys, duplicate keys,
    /// unresolved bindings, ambiguous buttons, misplaced attributes.
    pub fn new(
        title: impl Into<String>,
        mut fields: Vec<FieldSpec>,
    ) -> Result<Self, ConstructionError> {
        check_fields(&mut fields)?;
        Ok(Self {
            title: title.into(),
            fields,
            min_width: DEFAULT_MIN_WIDTH,
            min_height: DEFAULT_MIN_HEIGHT,
        })
    }

    /// Set the minimum dialog size in pixels
    pub fn with_min_size(mut self, width: u32, height: u32) -> Self {
        self.min_width = width;
        self.min_height = height;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn min_width(&self) -> u32 {
        self.min_width
    }

    pub fn min_height(&self) -> u32 {
        self.min_height
    }

    /// Minimum size converted to terminal cells (columns, rows)
    pub fn min_cells(&self) -> (u16, u16) {
        let cols = (self.min_width / CELL_WIDTH_PX).min(u16::MAX as u32) as u16;
        let rows = (self.min_height / CELL_HEIGHT_PX).min(u16::MAX as u32) as u16;
        (cols, rows)
    }

    /// Look up a field by key
    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key.as_deref() == Some(key))
    }

    /// Fields that own a live variable, in declaration order
    pub fn value_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.kind.holds_value())
    }

    /// Highest declared row across all fields
    pub fn max_row(&self) -> Option<u16> {
        self.fields.iter().map(|f| f.row).max()
    }
}

fn check_fields(fields: &mut [FieldSpec]) -> Result<(), ConstructionError> {
    let mut kinds_by_key: HashMap<String, FieldKind> = HashMap::new();

    for field in fields.iter() {
        check_row(field)?;
        check_attributes(field)?;
        check_key(field)?;
        check_default(field)?;

        if let Some(key) = &field.key {
            if kinds_by_key.insert(key.clone(), field.kind).is_some() {
                return Err(ConstructionError::DuplicateKey { key: key.clone() });
            }
        }
    }

    let mut bound_targets = Vec::new();
    for field in fields.iter().filter(|f| f.is_bound_button()) {
        let target = field.bind_to.clone().unwrap_or_default();
        match kinds_by_key.get(&target) {
            Some(FieldKind::Text | FieldKind::Select) => bound_targets.push(target),
            Some(FieldKind::Checkbox) => {
                return Err(ConstructionError::InvalidBindTarget {
                    button: field.label.clone(),
                    target,
                    kind: FieldKind::Checkbox,
                });
            }
            _ => {
                return Err(ConstructionError::UnresolvedBinding {
                    button: field.label.clone(),
                    target,
                });
            }
        }
    }

    for field in fields.iter_mut() {
        if let Some(key) = &field.key {
            if field.kind.holds_value() && bound_targets.contains(key) {
                field.is_bound = true;
            }
        }
    }

    Ok(())
}

fn check_row(field: &FieldSpec) -> Result<(), ConstructionError> {
    if field.row > MAX_ROW {
        return Err(ConstructionError::RowOutOfRange {
            label: field.display_name().to_string(),
            row: field.row,
            max: MAX_ROW,
        });
    }
    Ok(())
}

fn check_attributes(field: &FieldSpec) -> Result<(), ConstructionError> {
    let invalid = |attribute: &'static str| ConstructionError::InvalidAttribute {
        kind: field.kind,
        label: field.display_name().to_string(),
        attribute,
    };

    if field.kind != FieldKind::Select {
        if !field.options.is_empty() {
            return Err(invalid("options"));
        }
        if field.readonly {
            return Err(invalid("readonly"));
        }
    }
    if field.kind != FieldKind::Button {
        if field.callback.is_some() {
            return Err(invalid("callback"));
        }
        if field.bind_to.is_some() {
            return Err(invalid("bind_to"));
        }
    }
    if !field.kind.holds_value() && !field.validators.is_empty() {
        return Err(invalid("validators"));
    }
    Ok(())
}

fn check_key(field: &FieldSpec) -> Result<(), ConstructionError> {
    let needs_key = field.kind.holds_value() || field.is_bound_button();

    match (&field.key, needs_key) {
        (None, true) => Err(ConstructionError::MissingKey {
            kind: field.kind,
            label: field.display_name().to_string(),
        }),
        (Some(key), false) => Err(ConstructionError::UnexpectedKey {
            kind: field.kind,
            label: field.label.clone(),
            key: key.clone(),
        }),
        _ => {
            if field.kind != FieldKind::Button {
                return Ok(());
            }
            match &field.bind_to {
                Some(target) if field.callback.is_none() => {
                    Err(ConstructionError::MissingCallback {
                        label: field.label.clone(),
                        target: target.clone(),
                    })
                }
                None if field.callback.is_none() && field.default_action().is_none() => {
                    Err(ConstructionError::AmbiguousButton {
                        label: field.label.clone(),
                    })
                }
                _ => Ok(()),
            }
        }
    }
}

fn check_default(field: &FieldSpec) -> Result<(), ConstructionError> {
    let ok = match field.kind {
        FieldKind::Text | FieldKind::Select => {
            matches!(field.default, FieldValue::Text(_) | FieldValue::Absent)
        }
        FieldKind::Checkbox => matches!(field.default, FieldValue::Bool(_) | FieldValue::Absent),
        FieldKind::Button | FieldKind::Label => true,
    };
    if ok {
        return Ok(());
    }
    Err(ConstructionError::DefaultTypeMismatch {
        kind: field.kind,
        key: field.key.clone().unwrap_or_default(),
    })
}
