//! Keybinding system for context-aware keyboard shortcuts
//!
//! Provides a registry of keybindings that change with the dialog's input
//! mode (form, warning confirmation, help overlay).

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;
use strum::Display;

/// Input mode of a running dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum KeyMode {
    /// Editing fields
    Form,
    /// Answering the warning confirmation prompt
    Confirm,
    /// Help overlay is open
    Help,
}

/// Actions that can be triggered by keybindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    FocusNext,
    FocusPrevious,
    /// Activate the focused button, otherwise submit
    Activate,
    /// Escape-equivalent cancel
    Cancel,
    /// Window-close cancel
    CloseWindow,
    ClearField,
    Help,
    DebugSnapshot,
    Accept,
    Decline,
    Toggle,
    Confirm,
    Dismiss,
}

/// A keybinding definition
#[derive(Debug, Clone)]
pub struct Keybinding {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
    pub action: KeyAction,
    pub display: String,
    pub description: String,
}

impl Keybinding {
    /// Create a new keybinding with no modifiers
    pub fn new(key: KeyCode, action: KeyAction, display: &str, description: &str) -> Self {
        Self {
            key,
            modifiers: KeyModifiers::NONE,
            action,
            display: display.to_string(),
            description: description.to_string(),
        }
    }

    /// Create a keybinding with modifiers
    pub fn with_modifiers(
        key: KeyCode,
        modifiers: KeyModifiers,
        action: KeyAction,
        display: &str,
        description: &str,
    ) -> Self {
        Self {
            key,
            modifiers,
            action,
            display: display.to_string(),
            description: description.to_string(),
        }
    }

    /// Match a key event. SHIFT is ignored so that `BackTab` (reported with
    /// SHIFT) and upper-case letters resolve like their plain bindings.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        let strip = |m: KeyModifiers| m.difference(KeyModifiers::SHIFT);
        let code_matches = match (self.key, event.code) {
            (KeyCode::Char(a), KeyCode::Char(b)) => a.eq_ignore_ascii_case(&b),
            (a, b) => a == b,
        };
        code_matches && strip(self.modifiers) == strip(event.modifiers)
    }
}

/// Context-aware keybinding registry
pub struct KeybindingContext {
    /// Mode-specific keybindings
    mode_bindings: HashMap<KeyMode, Vec<Keybinding>>,
    /// Global keybindings (available in all modes)
    global_bindings: Vec<Keybinding>,
}

impl Default for KeybindingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl KeybindingContext {
    /// Create a new keybinding context with default bindings
    pub fn new() -> Self {
        let mut ctx = Self {
            mode_bindings: HashMap::new(),
            global_bindings: Vec::new(),
        };
        ctx.register_defaults();
        ctx
    }

    fn register_defaults(&mut self) {
        self.global_bindings = vec![
            Keybinding::with_modifiers(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL,
                KeyAction::CloseWindow,
                "Ctrl+C",
                "Close dialog",
            ),
            Keybinding::with_modifiers(
                KeyCode::Char('q'),
                KeyModifiers::CONTROL,
                KeyAction::CloseWindow,
                "Ctrl+Q",
                "Close dialog",
            ),
        ];

        self.mode_bindings.insert(
            KeyMode::Form,
            vec![
                Keybinding::new(KeyCode::Tab, KeyAction::FocusNext, "Tab", "Next field"),
                Keybinding::new(KeyCode::Down, KeyAction::FocusNext, "Down", "Next field"),
                Keybinding::new(KeyCode::BackTab, KeyAction::FocusPrevious, "Shift+Tab", "Previous field"),
                Keybinding::new(KeyCode::Up, KeyAction::FocusPrevious, "Up", "Previous field"),
                Keybinding::new(KeyCode::Enter, KeyAction::Activate, "Enter", "Submit / press button"),
                Keybinding::new(KeyCode::Esc, KeyAction::Cancel, "Esc", "Cancel"),
                Keybinding::with_modifiers(
                    KeyCode::Char('u'),
                    KeyModifiers::CONTROL,
                    KeyAction::ClearField,
                    "Ctrl+U",
                    "Clear field",
                ),
                Keybinding::new(KeyCode::F(1), KeyAction::Help, "F1", "Help"),
                Keybinding::new(KeyCode::F(2), KeyAction::DebugSnapshot, "F2", "Log field state"),
            ],
        );

        self.mode_bindings.insert(
            KeyMode::Confirm,
            vec![
                Keybinding::new(KeyCode::Char('y'), KeyAction::Accept, "Y", "Proceed"),
                Keybinding::new(KeyCode::Char('n'), KeyAction::Decline, "N", "Go back"),
                Keybinding::new(KeyCode::Left, KeyAction::Toggle, "Left", "Select No"),
                Keybinding::new(KeyCode::Right, KeyAction::Toggle, "Right", "Select Yes"),
                Keybinding::new(KeyCode::Tab, KeyAction::Toggle, "Tab", "Toggle selection"),
                Keybinding::new(KeyCode::Enter, KeyAction::Confirm, "Enter", "Confirm"),
                Keybinding::new(KeyCode::Esc, KeyAction::Decline, "Esc", "Go back"),
            ],
        );

        self.mode_bindings.insert(
            KeyMode::Help,
            vec![
                Keybinding::new(KeyCode::F(1), KeyAction::Dismiss, "F1", "Close help"),
                Keybinding::new(KeyCode::Esc, KeyAction::Dismiss, "Esc", "Close help"),
            ],
        );
    }

    /// Get keybindings for a specific mode (includes global bindings)
    pub fn get_bindings(&self, mode: KeyMode) -> Vec<&Keybinding> {
        let mut bindings: Vec<&Keybinding> = Vec::new();
        if let Some(mode_bindings) = self.mode_bindings.get(&mode) {
            bindings.extend(mode_bindings.iter());
        }
        bindings.extend(self.global_bindings.iter());
        bindings
    }

    /// Resolve a key event to an action in `mode`
    pub fn resolve(&self, mode: KeyMode, event: &KeyEvent) -> Option<KeyAction> {
        self.get_bindings(mode)
            .into_iter()
            .find(|b| b.matches(event))
            .map(|b| b.action)
    }

    /// One-line key hint for the dialog border
    pub fn hint_line(&self, mode: KeyMode) -> String {
        let priority = match mode {
            KeyMode::Form => vec![
                KeyAction::FocusNext,
                KeyAction::Activate,
                KeyAction::Cancel,
                KeyAction::Help,
            ],
            KeyMode::Confirm => vec![KeyAction::Accept, KeyAction::Decline, KeyAction::Toggle],
            KeyMode::Help => vec![KeyAction::Dismiss],
        };

        let bindings = self.get_bindings(mode);
        priority
            .into_iter()
            .filter_map(|action| bindings.iter().find(|b| b.action == action))
            .map(|b| format!("{}: {}", b.display, b.description))
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Get full help content for a mode (for help overlay)
    pub fn get_help_content(&self, mode: KeyMode) -> Vec<HelpSection> {
        let groups: [(&str, &[KeyAction]); 3] = [
            ("Navigation", &[KeyAction::FocusNext, KeyAction::FocusPrevious]),
            (
                "Actions",
                &[
                    KeyAction::Activate,
                    KeyAction::ClearField,
                    KeyAction::Accept,
                    KeyAction::Decline,
                    KeyAction::Toggle,
                    KeyAction::Confirm,
                    KeyAction::DebugSnapshot,
                ],
            ),
            (
                "General",
                &[
                    KeyAction::Cancel,
                    KeyAction::CloseWindow,
                    KeyAction::Help,
                    KeyAction::Dismiss,
                ],
            ),
        ];

        let bindings = self.get_bindings(mode);
        groups
            .iter()
            .filter_map(|(title, actions)| {
                let items: Vec<(String, String)> = bindings
                    .iter()
                    .filter(|b| actions.contains(&b.action))
                    .map(|b| (b.display.clone(), b.description.clone()))
                    .collect();
                (!items.is_empty()).then(|| HelpSection {
                    title: (*title).to_string(),
                    items,
                })
            })
            .collect()
    }
}

/// Help section for the help overlay
#[derive(Debug, Clone)]
pub struct HelpSection {
    pub title: String,
    pub items: Vec<(String, String)>,
}
