//! Dialog session state machine
//!
//! `FormSession` is the renderer without a terminal: it owns the live
//! elements and variables of one dialog and drives every state transition.
//! `FormDialog` draws it and feeds it events.
//!
//! # State Flow
//!
//! ```text
//! Unbuilt
//!     ↓ render()
//! Rendered ──(errors / declined warnings)──┐
//!     ↓            ↑______________________│
//! Submitted | Cancelled   (terminal)
//! ```
//!
//! Teardown removes subscriptions first, then clears the element and
//! variable registries, then drops focus and prompt references. It runs from
//! `finish()` and again (idempotently) from `Drop`.

use crate::components::confirm_prompt::ConfirmPrompt;
use crate::components::keybindings::{KeyAction, KeyMode, KeybindingContext};
use crate::context::FormContext;
use crate::error::Result;
use crate::renderer::elements::{build_element, BuildContext, ButtonAction, ElementInput, LiveElement};
use crate::renderer::events::FormEvent;
use crate::renderer::layout::{compute_layout, ColumnInfo, FormLayout};
use crate::result::FormResult;
use crate::spec::{FieldKind, FieldSpec, FieldValue, FormSpec};
use crate::trace::{LiveVar, TraceRegistry};
use crate::validation::{run_validators, ValidationResult};
use crossterm::event::{KeyEvent, KeyEventKind};
use std::collections::BTreeMap;
use strum::Display;
use thiserror::Error;

/// Lifecycle state of a dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum DialogState {
    Unbuilt,
    Rendered,
    Submitted,
    Cancelled,
}

impl DialogState {
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Submitted | Self::Cancelled)
    }
}

/// What caused a cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum CancelTrigger {
    /// A Cancel action button
    Button,
    /// The escape key
    Escape,
    /// The window was closed (Ctrl+C, signal, end of input)
    WindowClosed,
}

/// Outcome of a submit attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// At least one error; inline messages are shown and the dialog stays open
    Blocked(ValidationResult),
    /// Only warnings; a confirmation prompt is waiting for an answer
    AwaitingConfirmation(ValidationResult),
    /// The warning prompt was answered "No"; the dialog stays open
    Declined,
    Submitted,
}

/// Outcome of activating a button
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonOutcome {
    Submit(SubmitOutcome),
    Cancelled,
    /// An action button callback ran
    Invoked,
    /// A bound button ran; `value` is what its callback returned
    Bound { target: String, value: Option<String> },
}

/// Errors that can occur during dialog state transitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DialogTransitionError {
    /// The operation needs a rendered, open dialog
    #[error("Dialog is {state}, not Rendered")]
    NotRendered { state: DialogState },

    /// `render()` was called on a session that was already rendered
    #[error("Dialog is already {state}")]
    AlreadyRendered { state: DialogState },

    /// A warning confirmation must be answered first
    #[error("A warning confirmation is pending")]
    AwaitingConfirmation,

    /// `confirm_warnings` was called with no prompt open
    #[error("No warning confirmation is pending")]
    NoPendingConfirmation,

    /// `finish()` was called before a terminal state was reached
    #[error("Dialog is {state}; no result yet")]
    NotFinished { state: DialogState },

    #[error("No field with key '{key}'")]
    UnknownField { key: String },

    #[error("No button with id '{id}'")]
    UnknownButton { id: String },

    #[error("Value {value:?} does not fit {kind} field '{key}'")]
    ValueMismatch {
        key: String,
        kind: FieldKind,
        value: FieldValue,
    },
}

/// One row of the debug snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSnapshot {
    /// Key, label, or "-"
    pub name: String,
    pub kind: FieldKind,
    pub label: String,
    /// Live value; `None` for fields without a variable
    pub value: Option<FieldValue>,
    pub default: FieldValue,
    pub row: u16,
    pub col: u16,
    /// Grid row and cell; `None` for action buttons
    pub grid: Option<(u16, ColumnInfo)>,
    pub subscriptions: usize,
}

/// Warning prompt plus the values captured when it opened
#[derive(Debug, Clone)]
struct PendingConfirmation {
    prompt: ConfirmPrompt,
    values: BTreeMap<String, FieldValue>,
}

/// One dialog instance driven through its lifecycle
pub struct FormSession {
    spec: FormSpec,
    ctx: FormContext,
    layout: FormLayout,
    state: DialogState,
    /// Parallel to `spec.fields()` once rendered
    elements: Vec<LiveElement>,
    vars: BTreeMap<String, LiveVar>,
    traces: TraceRegistry,
    /// Element indices in focus order
    focus_order: Vec<usize>,
    /// Position in `focus_order`
    focus: Option<usize>,
    inline_errors: BTreeMap<String, String>,
    pending: Option<PendingConfirmation>,
    show_help: bool,
    keys: KeybindingContext,
    result: Option<FormResult>,
    torn_down: bool,
}

impl FormSession {
    pub fn new(spec: FormSpec, ctx: FormContext) -> Self {
        let layout = compute_layout(&spec);
        Self {
            spec,
            ctx,
            layout,
            state: DialogState::Unbuilt,
            elements: Vec::new(),
            vars: BTreeMap::new(),
            traces: TraceRegistry::new(),
            focus_order: Vec::new(),
            focus: None,
            inline_errors: BTreeMap::new(),
            pending: None,
            show_help: false,
            keys: KeybindingContext::new(),
            result: None,
            torn_down: false,
        }
    }

    // ==================== Accessors ====================

    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn spec(&self) -> &FormSpec {
        &self.spec
    }

    pub fn context(&self) -> &FormContext {
        &self.ctx
    }

    pub fn layout(&self) -> &FormLayout {
        &self.layout
    }

    pub fn elements(&self) -> &[LiveElement] {
        &self.elements
    }

    pub fn keybindings(&self) -> &KeybindingContext {
        &self.keys
    }

    /// Current input mode
    pub fn key_mode(&self) -> KeyMode {
        if self.pending.is_some() {
            KeyMode::Confirm
        } else if self.show_help {
            KeyMode::Help
        } else {
            KeyMode::Form
        }
    }

    pub fn is_help_visible(&self) -> bool {
        self.show_help
    }

    pub fn pending_prompt(&self) -> Option<&ConfirmPrompt> {
        self.pending.as_ref().map(|p| &p.prompt)
    }

    pub fn subscription_count(&self) -> usize {
        self.traces.len()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Result, once a terminal state is reached
    pub fn result(&self) -> Option<&FormResult> {
        self.result.as_ref()
    }

    // ==================== Rendering ====================

    /// Instantiate live elements, variables and subscriptions.
    ///
    /// # Errors
    ///
    /// `AlreadyRendered` when called twice; a construction error when a field
    /// has no element builder.
    pub fn render(&mut self) -> Result<()> {
        if self.state != DialogState::Unbuilt {
            return Err(DialogTransitionError::AlreadyRendered { state: self.state }.into());
        }

        let mut build_ctx = BuildContext {
            vars: &mut self.vars,
            traces: &mut self.traces,
        };
        let built: std::result::Result<Vec<LiveElement>, _> = self
            .spec
            .fields()
            .iter()
            .enumerate()
            .map(|(idx, field)| build_element(idx, field, &mut build_ctx))
            .collect();
        self.elements = match built {
            Ok(elements) => elements,
            Err(e) => {
                self.teardown();
                return Err(e.into());
            }
        };

        self.focus_order = self
            .layout
            .placements
            .iter()
            .map(|p| p.field_index)
            .chain(self.layout.action_buttons.iter().copied())
            .filter(|&idx| self.elements[idx].is_focusable())
            .collect();
        self.focus = (!self.focus_order.is_empty()).then_some(0);

        self.state = DialogState::Rendered;
        tracing::debug!(
            title = %self.spec.title(),
            elements = self.elements.len(),
            vars = self.vars.len(),
            traces = self.traces.len(),
            "Dialog rendered"
        );
        Ok(())
    }

    /// Fresh rendered session for `spec` whose variables are overwritten
    /// with `preserved`. Unknown keys and mismatched values are skipped.
    pub fn rebuild(
        spec: FormSpec,
        ctx: FormContext,
        preserved: &BTreeMap<String, FieldValue>,
    ) -> Result<Self> {
        let mut session = Self::new(spec, ctx);
        session.render()?;
        for (key, value) in preserved {
            if value.is_absent() {
                continue;
            }
            if let Err(e) = session.set_value(key, value.clone()) {
                tracing::debug!("Skipping preserved value: {}", e);
            }
        }
        Ok(session)
    }

    // ==================== Focus ====================

    /// Spec of the focused field
    pub fn focused_field(&self) -> Option<&FieldSpec> {
        self.focused_element()
            .map(|idx| &self.spec.fields()[idx])
    }

    /// Element index of the focused field
    pub fn focused_element(&self) -> Option<usize> {
        self.focus.and_then(|pos| self.focus_order.get(pos).copied())
    }

    pub fn focus_next(&mut self) {
        if let Some(pos) = self.focus {
            self.focus = Some((pos + 1) % self.focus_order.len());
        }
    }

    pub fn focus_previous(&mut self) {
        if let Some(pos) = self.focus {
            let len = self.focus_order.len();
            self.focus = Some((pos + len - 1) % len);
        }
    }

    /// Move focus to the field with `key`
    pub fn focus_key(&mut self, key: &str) -> bool {
        let fields = self.spec.fields();
        let found = self
            .focus_order
            .iter()
            .position(|&idx| fields[idx].key.as_deref() == Some(key));
        if found.is_some() {
            self.focus = found;
        }
        found.is_some()
    }

    // ==================== Values ====================

    /// Raw live value of a keyed field
    pub fn value(&self, key: &str) -> Option<FieldValue> {
        self.vars.get(key).map(LiveVar::get)
    }

    /// Overwrite a keyed field's live variable
    pub fn set_value(&mut self, key: &str, value: impl Into<FieldValue>) -> std::result::Result<(), DialogTransitionError> {
        self.require_rendered()?;
        let value = value.into();
        let field = self
            .spec
            .field(key)
            .filter(|f| f.kind.holds_value())
            .ok_or_else(|| DialogTransitionError::UnknownField { key: key.to_string() })?;

        let value = match (field.kind, value) {
            (FieldKind::Text | FieldKind::Select, FieldValue::Absent) => FieldValue::Text(String::new()),
            (FieldKind::Checkbox, FieldValue::Absent) => FieldValue::Bool(false),
            (FieldKind::Text | FieldKind::Select, v @ FieldValue::Text(_)) => v,
            (FieldKind::Checkbox, v @ FieldValue::Bool(_)) => v,
            (kind, value) => {
                return Err(DialogTransitionError::ValueMismatch {
                    key: key.to_string(),
                    kind,
                    value,
                });
            }
        };

        let var = self
            .vars
            .get(key)
            .ok_or_else(|| DialogTransitionError::UnknownField { key: key.to_string() })?;
        var.set(value);
        Ok(())
    }

    /// Normalised values of every keyed field, read from the live variables
    pub fn collect_values(&self) -> BTreeMap<String, FieldValue> {
        self.vars
            .iter()
            .map(|(key, var)| (key.clone(), var.get().normalized()))
            .collect()
    }

    /// Inline error shown beneath `key`
    pub fn inline_error(&self, key: &str) -> Option<&str> {
        self.inline_errors.get(key).map(String::as_str)
    }

    pub fn inline_errors(&self) -> &BTreeMap<String, String> {
        &self.inline_errors
    }

    /// Tooltip of the keyed field `key`
    pub fn tooltip_text(&self, key: &str) -> Option<String> {
        let idx = self
            .spec
            .fields()
            .iter()
            .position(|f| f.key.as_deref() == Some(key))?;
        self.elements.get(idx).map(|e| e.tooltip.text())
    }

    /// Tooltip of the focused element
    pub fn focused_tooltip(&self) -> Option<String> {
        let idx = self.focused_element()?;
        self.elements
            .get(idx)
            .map(|e| e.tooltip.text())
            .filter(|t| !t.is_empty())
    }

    // ==================== Transitions ====================

    fn require_rendered(&self) -> std::result::Result<(), DialogTransitionError> {
        if self.state != DialogState::Rendered {
            return Err(DialogTransitionError::NotRendered { state: self.state });
        }
        Ok(())
    }

    /// Collect, validate and either submit, block, or ask about warnings
    pub fn submit(&mut self) -> std::result::Result<SubmitOutcome, DialogTransitionError> {
        self.require_rendered()?;
        if self.pending.is_some() {
            return Err(DialogTransitionError::AwaitingConfirmation);
        }

        let values = self.collect_values();
        let validation = run_validators(&self.spec, &values, &self.ctx);
        self.inline_errors.clear();

        if validation.has_errors() {
            for issue in validation.errors() {
                self.inline_errors
                    .entry(issue.field_key.clone())
                    .or_insert_with(|| issue.message.clone());
            }
            tracing::debug!(errors = validation.errors().count(), "Submission blocked");
            return Ok(SubmitOutcome::Blocked(validation));
        }

        if validation.has_warnings() {
            tracing::debug!(warnings = validation.warnings().count(), "Asking to confirm warnings");
            self.pending = Some(PendingConfirmation {
                prompt: ConfirmPrompt::for_warnings(validation.warnings()),
                values,
            });
            return Ok(SubmitOutcome::AwaitingConfirmation(validation));
        }

        self.complete_submit(values);
        Ok(SubmitOutcome::Submitted)
    }

    /// Answer the warning prompt. Declining leaves the dialog open.
    pub fn confirm_warnings(&mut self, accept: bool) -> std::result::Result<SubmitOutcome, DialogTransitionError> {
        self.require_rendered()?;
        let pending = self
            .pending
            .take()
            .ok_or(DialogTransitionError::NoPendingConfirmation)?;

        if !accept {
            tracing::debug!("Warnings declined, returning to form");
            return Ok(SubmitOutcome::Declined);
        }
        self.complete_submit(pending.values);
        Ok(SubmitOutcome::Submitted)
    }

    fn complete_submit(&mut self, values: BTreeMap<String, FieldValue>) {
        tracing::info!(title = %self.spec.title(), fields = values.len(), "Dialog submitted");
        self.result = Some(FormResult::submitted(values));
        self.state = DialogState::Submitted;
    }

    /// Cancel from any open state; validation is skipped
    pub fn cancel(&mut self, trigger: CancelTrigger) -> std::result::Result<(), DialogTransitionError> {
        self.require_rendered()?;
        tracing::info!(title = %self.spec.title(), %trigger, "Dialog cancelled");
        self.pending = None;
        self.result = Some(FormResult::cancelled());
        self.state = DialogState::Cancelled;
        Ok(())
    }

    /// Activate the button whose action id is `id`
    pub fn activate_button(&mut self, id: &str) -> std::result::Result<ButtonOutcome, DialogTransitionError> {
        let idx = self
            .spec
            .fields()
            .iter()
            .position(|f| f.kind == FieldKind::Button && f.action_id() == id)
            .ok_or_else(|| DialogTransitionError::UnknownButton { id: id.to_string() })?;
        self.activate_element(idx)
    }

    /// Activate the focused element if it is a button
    pub fn activate_focused(&mut self) -> std::result::Result<Option<ButtonOutcome>, DialogTransitionError> {
        match self.focused_element() {
            Some(idx) if self.spec.fields()[idx].kind == FieldKind::Button => {
                self.activate_element(idx).map(Some)
            }
            _ => Ok(None),
        }
    }

    fn activate_element(&mut self, idx: usize) -> std::result::Result<ButtonOutcome, DialogTransitionError> {
        self.require_rendered()?;
        if self.pending.is_some() {
            return Err(DialogTransitionError::AwaitingConfirmation);
        }
        let action = self
            .elements
            .get(idx)
            .and_then(LiveElement::button_action)
            .cloned()
            .ok_or_else(|| DialogTransitionError::UnknownButton {
                id: self.spec.fields()[idx].action_id(),
            })?;

        match action {
            ButtonAction::Submit => self.submit().map(ButtonOutcome::Submit),
            ButtonAction::Cancel => {
                self.cancel(CancelTrigger::Button)?;
                Ok(ButtonOutcome::Cancelled)
            }
            ButtonAction::Callback(callback) => {
                callback();
                Ok(ButtonOutcome::Invoked)
            }
            ButtonAction::Bound { callback, target } => {
                let value = callback();
                if let Some(text) = &value {
                    self.write_bound(&target, text);
                }
                Ok(ButtonOutcome::Bound { target, value })
            }
        }
    }

    fn write_bound(&mut self, target: &str, text: &str) {
        let Some(var) = self.vars.get(target) else {
            tracing::warn!(field = target, "Bound button target has no variable");
            return;
        };
        var.set(FieldValue::Text(text.to_string()));
        tracing::debug!(field = target, "Bound button updated field");
    }

    // ==================== Events ====================

    pub fn handle_event(&mut self, event: FormEvent) -> std::result::Result<(), DialogTransitionError> {
        match event {
            FormEvent::Key(key) => self.handle_key(key),
            FormEvent::Resize(..) => Ok(()),
            FormEvent::Closed => {
                if self.state == DialogState::Rendered {
                    self.cancel(CancelTrigger::WindowClosed)?;
                }
                Ok(())
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> std::result::Result<(), DialogTransitionError> {
        if self.state != DialogState::Rendered || key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let mode = self.key_mode();
        let action = self.keys.resolve(mode, &key);
        if action == Some(KeyAction::CloseWindow) {
            return self.cancel(CancelTrigger::WindowClosed);
        }

        match mode {
            KeyMode::Confirm => self.handle_confirm_action(action),
            KeyMode::Help => {
                if matches!(action, Some(KeyAction::Dismiss)) {
                    self.show_help = false;
                }
                Ok(())
            }
            KeyMode::Form => match action {
                Some(action) => self.handle_form_action(action),
                None => self.forward_to_focused(&key),
            },
        }
    }

    fn handle_confirm_action(&mut self, action: Option<KeyAction>) -> std::result::Result<(), DialogTransitionError> {
        match action {
            Some(KeyAction::Accept) => self.confirm_warnings(true).map(drop),
            Some(KeyAction::Decline) => self.confirm_warnings(false).map(drop),
            Some(KeyAction::Confirm) => {
                let accept = self.pending.as_ref().is_some_and(|p| p.prompt.selected_yes);
                self.confirm_warnings(accept).map(drop)
            }
            Some(KeyAction::Toggle) => {
                if let Some(pending) = self.pending.as_mut() {
                    pending.prompt.toggle();
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn handle_form_action(&mut self, action: KeyAction) -> std::result::Result<(), DialogTransitionError> {
        match action {
            KeyAction::FocusNext => self.focus_next(),
            KeyAction::FocusPrevious => self.focus_previous(),
            KeyAction::Activate => {
                if self.activate_focused()?.is_none() {
                    self.submit()?;
                }
            }
            KeyAction::Cancel => self.cancel(CancelTrigger::Escape)?,
            KeyAction::ClearField => {
                if let Some(idx) = self.focused_element() {
                    self.elements[idx].clear();
                }
            }
            KeyAction::Help => self.show_help = true,
            KeyAction::DebugSnapshot if self.ctx.is_debug() => self.log_debug_snapshot(),
            _ => {}
        }
        Ok(())
    }

    fn forward_to_focused(&mut self, key: &KeyEvent) -> std::result::Result<(), DialogTransitionError> {
        let Some(idx) = self.focused_element() else {
            return Ok(());
        };
        match self.elements[idx].handle_key(key) {
            ElementInput::Activate => self.activate_element(idx).map(drop),
            ElementInput::Consumed | ElementInput::Ignored => Ok(()),
        }
    }

    // ==================== Debug ====================

    /// Per-field state, sorted by declared `(row, col)`
    pub fn debug_snapshot(&self) -> Vec<FieldSnapshot> {
        let mut indices: Vec<usize> = (0..self.spec.fields().len()).collect();
        indices.sort_by_key(|&i| (self.spec.fields()[i].row, self.spec.fields()[i].col));

        indices
            .into_iter()
            .map(|idx| {
                let field = &self.spec.fields()[idx];
                let var = field.key.as_deref().and_then(|k| self.vars.get(k));
                FieldSnapshot {
                    name: field
                        .key
                        .clone()
                        .or_else(|| (!field.label.is_empty()).then(|| field.label.clone()))
                        .unwrap_or_else(|| "-".to_string()),
                    kind: field.kind,
                    label: field.label.clone(),
                    value: var.map(LiveVar::get),
                    default: field.default.clone(),
                    row: field.row,
                    col: field.col,
                    grid: self
                        .layout
                        .placement_of(idx)
                        .map(|p| (p.grid_row, p.cell)),
                    subscriptions: var.map_or(0, LiveVar::subscriber_count),
                }
            })
            .collect()
    }

    /// Log the debug snapshot at debug level
    pub fn log_debug_snapshot(&self) {
        let (min_w, min_h) = (self.spec.min_width(), self.spec.min_height());
        tracing::debug!(
            title = %self.spec.title(),
            min_size = %format!("{min_w}x{min_h}"),
            fields = self.spec.fields().len(),
            vars = self.vars.len(),
            traces = self.traces.len(),
            "Form field state"
        );
        for snap in self.debug_snapshot() {
            let value = snap.value.as_ref().map_or("-".to_string(), FieldValue::display_text);
            let grid = snap.grid.map_or("-".to_string(), |(row, cell)| {
                format!("row={row}, column={}, columnspan={}", cell.column, cell.span)
            });
            tracing::debug!(
                "  {:<20} {:<8} {:<20} value={:<20} default={:<12} row={} col={} {}",
                snap.name,
                snap.kind,
                snap.label,
                value,
                snap.default.display_text(),
                snap.row,
                snap.col,
                grid
            );
        }
    }

    // ==================== Teardown ====================

    /// Release every subscription, element and variable. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        let failures = self.traces.release_all();
        if failures > 0 {
            tracing::warn!("{} trace(s) could not be removed during teardown", failures);
        }
        self.elements.clear();
        self.vars.clear();
        self.focus_order.clear();
        self.focus = None;
        self.pending = None;
        self.show_help = false;
        self.torn_down = true;
        tracing::debug!(state = %self.state, "Dialog torn down");
    }

    /// Tear down and hand over the result
    ///
    /// # Errors
    ///
    /// `NotFinished` before a terminal state is reached.
    pub fn finish(mut self) -> std::result::Result<FormResult, DialogTransitionError> {
        if !self.state.is_terminal() {
            return Err(DialogTransitionError::NotFinished { state: self.state });
        }
        self.teardown();
        Ok(self.result.take().unwrap_or_default())
    }
}

impl Drop for FormSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
