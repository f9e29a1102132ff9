//! Live dialog elements
//!
//! One `LiveElement` is built per field by a per-kind handler looked up in
//! [`ELEMENT_BUILDERS`]. Value-holding elements wrap the field's `LiveVar`;
//! buttons carry their resolved action.

use crate::error::ConstructionError;
use crate::spec::{ButtonCallback, DefaultAction, FieldKind, FieldSpec, FieldValue};
use crate::tooltip::Tooltip;
use crate::trace::{LiveVar, TraceRegistry};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::BTreeMap;
use std::fmt;

/// What a button does when activated
#[derive(Clone)]
pub enum ButtonAction {
    Submit,
    Cancel,
    /// Action button with an explicit callback; the return value is ignored
    Callback(ButtonCallback),
    /// Auxiliary button writing the callback's result into `target`
    Bound {
        callback: ButtonCallback,
        target: String,
    },
}

impl fmt::Debug for ButtonAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submit => write!(f, "Submit"),
            Self::Cancel => write!(f, "Cancel"),
            Self::Callback(_) => write!(f, "Callback"),
            Self::Bound { target, .. } => write!(f, "Bound({target})"),
        }
    }
}

/// Editable text state over a live variable
#[derive(Debug, Clone)]
pub struct TextState {
    pub var: LiveVar,
    /// Cursor position in characters
    cursor: usize,
}

impl TextState {
    pub fn new(var: LiveVar) -> Self {
        let cursor = var.text().chars().count();
        Self { var, cursor }
    }

    /// Cursor clamped to the current text length
    pub fn cursor(&self) -> usize {
        self.cursor.min(self.var.text().chars().count())
    }

    pub fn move_to_end(&mut self) {
        self.cursor = self.var.text().chars().count();
    }

    fn edit(&mut self, key: &KeyEvent) -> bool {
        let mut text = self.var.text();
        let len = text.chars().count();
        let cursor = self.cursor.min(len);

        match key.code {
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                text.insert(byte_index(&text, cursor), c);
                self.cursor = cursor + 1;
            }
            KeyCode::Backspace if cursor > 0 => {
                text.remove(byte_index(&text, cursor - 1));
                self.cursor = cursor - 1;
            }
            KeyCode::Delete if cursor < len => {
                text.remove(byte_index(&text, cursor));
                self.cursor = cursor;
            }
            KeyCode::Left => {
                self.cursor = cursor.saturating_sub(1);
                return true;
            }
            KeyCode::Right => {
                self.cursor = (cursor + 1).min(len);
                return true;
            }
            KeyCode::Home => {
                self.cursor = 0;
                return true;
            }
            KeyCode::End => {
                self.cursor = len;
                return true;
            }
            KeyCode::Backspace | KeyCode::Delete => return true,
            _ => return false,
        }
        self.var.set(FieldValue::Text(text));
        true
    }
}

fn byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map_or(s.len(), |(idx, _)| idx)
}

/// Kind-specific state of a live element
#[derive(Debug, Clone)]
pub enum ElementState {
    Label,
    Text(TextState),
    Select {
        input: TextState,
        options: Vec<String>,
        readonly: bool,
    },
    Checkbox(LiveVar),
    Button(ButtonAction),
}

/// Result of feeding a key to an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementInput {
    Consumed,
    Ignored,
    /// The element asks to be activated (buttons)
    Activate,
}

/// A field instantiated for one render pass
#[derive(Debug, Clone)]
pub struct LiveElement {
    /// Index into `FormSpec::fields`
    pub field_index: usize,
    pub kind: FieldKind,
    pub state: ElementState,
    pub tooltip: Tooltip,
}

impl LiveElement {
    pub fn is_focusable(&self) -> bool {
        self.kind != FieldKind::Label
    }

    pub fn var(&self) -> Option<&LiveVar> {
        match &self.state {
            ElementState::Text(input) | ElementState::Select { input, .. } => Some(&input.var),
            ElementState::Checkbox(var) => Some(var),
            ElementState::Label | ElementState::Button(_) => None,
        }
    }

    pub fn button_action(&self) -> Option<&ButtonAction> {
        match &self.state {
            ElementState::Button(action) => Some(action),
            _ => None,
        }
    }

    /// Cursor position for text-like elements
    pub fn cursor(&self) -> Option<usize> {
        match &self.state {
            ElementState::Text(input) => Some(input.cursor()),
            ElementState::Select { input, readonly: false, .. } => Some(input.cursor()),
            _ => None,
        }
    }

    /// Empty the element's text. Returns false when nothing can be cleared.
    pub fn clear(&mut self) -> bool {
        match &mut self.state {
            ElementState::Text(input) | ElementState::Select { input, .. } => {
                input.var.set(FieldValue::Text(String::new()));
                input.move_to_end();
                true
            }
            _ => false,
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> ElementInput {
        let consumed = match &mut self.state {
            ElementState::Label => false,
            ElementState::Text(input) => input.edit(key),
            ElementState::Select {
                input,
                options,
                readonly,
            } => match key.code {
                KeyCode::Left => cycle(input, options, false),
                KeyCode::Right => cycle(input, options, true),
                KeyCode::Char(' ') if *readonly => cycle(input, options, true),
                _ if *readonly => false,
                _ => input.edit(key),
            },
            ElementState::Checkbox(var) => match key.code {
                KeyCode::Char(' ') => {
                    let checked = var.get().as_bool().unwrap_or(false);
                    var.set(FieldValue::Bool(!checked));
                    true
                }
                _ => false,
            },
            ElementState::Button(_) => {
                if key.code == KeyCode::Char(' ') {
                    return ElementInput::Activate;
                }
                false
            }
        };
        if consumed {
            ElementInput::Consumed
        } else {
            ElementInput::Ignored
        }
    }
}

/// Step to the next or previous option. A value outside `options` steps to
/// the first (forward) or last (backward) option.
fn cycle(input: &mut TextState, options: &[String], forward: bool) -> bool {
    if options.is_empty() {
        return false;
    }
    let current = input.var.text();
    let next = match options.iter().position(|o| *o == current) {
        Some(idx) if forward => (idx + 1) % options.len(),
        Some(idx) => (idx + options.len() - 1) % options.len(),
        None if forward => 0,
        None => options.len() - 1,
    };
    input.var.set(FieldValue::Text(options[next].clone()));
    input.move_to_end();
    true
}

/// Registries filled while building elements
pub struct BuildContext<'a> {
    pub vars: &'a mut BTreeMap<String, LiveVar>,
    pub traces: &'a mut TraceRegistry,
}

type BuildFn = fn(usize, &FieldSpec, &mut BuildContext<'_>) -> Result<LiveElement, ConstructionError>;

/// Per-kind element builders
pub const ELEMENT_BUILDERS: &[(FieldKind, BuildFn)] = &[
    (FieldKind::Label, build_label),
    (FieldKind::Text, build_text),
    (FieldKind::Select, build_select),
    (FieldKind::Checkbox, build_checkbox),
    (FieldKind::Button, build_button),
];

/// Build the live element for `field` through the dispatch table
pub fn build_element(
    field_index: usize,
    field: &FieldSpec,
    ctx: &mut BuildContext<'_>,
) -> Result<LiveElement, ConstructionError> {
    let (_, build) = ELEMENT_BUILDERS
        .iter()
        .find(|(kind, _)| *kind == field.kind)
        .ok_or(ConstructionError::UnsupportedKind { kind: field.kind })?;
    build(field_index, field, ctx)
}

fn register_var(field: &FieldSpec, initial: FieldValue, ctx: &mut BuildContext<'_>) -> LiveVar {
    let key = field.key.clone().unwrap_or_default();
    let var = LiveVar::new(key.clone(), initial);
    ctx.vars.insert(key, var.clone());
    var
}

/// Static help text, or a tooltip following `var`
fn text_tooltip(field: &FieldSpec, var: &LiveVar, ctx: &mut BuildContext<'_>) -> Tooltip {
    if !field.help_text.is_empty() {
        return Tooltip::new(field.help_text.clone());
    }
    let tooltip = Tooltip::default();
    tooltip.follow(var, ctx.traces);
    tooltip
}

fn build_label(
    field_index: usize,
    field: &FieldSpec,
    _ctx: &mut BuildContext<'_>,
) -> Result<LiveElement, ConstructionError> {
    Ok(LiveElement {
        field_index,
        kind: FieldKind::Label,
        state: ElementState::Label,
        tooltip: Tooltip::new(field.help_text.clone()),
    })
}

fn build_text(
    field_index: usize,
    field: &FieldSpec,
    ctx: &mut BuildContext<'_>,
) -> Result<LiveElement, ConstructionError> {
    let initial = FieldValue::Text(field.default.as_text().unwrap_or_default().to_string());
    let var = register_var(field, initial, ctx);
    let tooltip = text_tooltip(field, &var, ctx);
    Ok(LiveElement {
        field_index,
        kind: FieldKind::Text,
        state: ElementState::Text(TextState::new(var)),
        tooltip,
    })
}

fn build_select(
    field_index: usize,
    field: &FieldSpec,
    ctx: &mut BuildContext<'_>,
) -> Result<LiveElement, ConstructionError> {
    let initial = FieldValue::Text(field.default.as_text().unwrap_or_default().to_string());
    let var = register_var(field, initial, ctx);
    let tooltip = text_tooltip(field, &var, ctx);
    Ok(LiveElement {
        field_index,
        kind: FieldKind::Select,
        state: ElementState::Select {
            input: TextState::new(var),
            options: field.options.clone(),
            readonly: field.readonly,
        },
        tooltip,
    })
}

fn build_checkbox(
    field_index: usize,
    field: &FieldSpec,
    ctx: &mut BuildContext<'_>,
) -> Result<LiveElement, ConstructionError> {
    let initial = FieldValue::Bool(field.default.as_bool().unwrap_or(false));
    let var = register_var(field, initial, ctx);
    Ok(LiveElement {
        field_index,
        kind: FieldKind::Checkbox,
        state: ElementState::Checkbox(var),
        tooltip: Tooltip::new(field.help_text.clone()),
    })
}

fn build_button(
    field_index: usize,
    field: &FieldSpec,
    _ctx: &mut BuildContext<'_>,
) -> Result<LiveElement, ConstructionError> {
    let action = match (&field.callback, &field.bind_to) {
        (Some(callback), Some(target)) => ButtonAction::Bound {
            callback: callback.clone(),
            target: target.clone(),
        },
        (Some(callback), None) => ButtonAction::Callback(callback.clone()),
        (None, Some(target)) => {
            return Err(ConstructionError::MissingCallback {
                label: field.label.clone(),
                target: target.clone(),
            });
        }
        (None, None) => match field.default_action() {
            Some(DefaultAction::Submit) => ButtonAction::Submit,
            Some(DefaultAction::Cancel) => ButtonAction::Cancel,
            None => {
                return Err(ConstructionError::AmbiguousButton {
                    label: field.label.clone(),
                });
            }
        },
    };
    Ok(LiveElement {
        field_index,
        kind: FieldKind::Button,
        state: ElementState::Button(action),
        tooltip: Tooltip::new(field.help_text.clone()),
    })
}
