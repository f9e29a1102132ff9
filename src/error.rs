//! Error handling module for formdialog
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Construction errors describe a malformed `FormSpec` and are programming
//! defects; they are never shown to the person filling in the form.

use crate::spec::FieldKind;
use thiserror::Error;

/// Main error type for formdialog
#[derive(Error, Debug)]
pub enum FormError {
    /// IO errors (terminal setup, event reading, file access)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The form specification is malformed
    #[error("Construction error: {0}")]
    Construction(#[from] ConstructionError),

    /// The renderer was driven through an illegal state transition
    #[error("Dialog transition error: {0}")]
    Transition(#[from] crate::renderer::session::DialogTransitionError),

    /// Terminal/UI errors
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for formdialog operations
pub type Result<T> = std::result::Result<T, FormError>;

impl FormError {
    /// Create a terminal error
    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }
}

/// A malformed form specification, detected before anything is drawn.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    /// TEXT, SELECT and CHECKBOX fields must carry a key
    #[error("{kind} field '{label}' has no key")]
    MissingKey { kind: FieldKind, label: String },

    /// Labels and unbound action buttons never carry a key
    #[error("{kind} field '{label}' must not have a key (found '{key}')")]
    UnexpectedKey {
        kind: FieldKind,
        label: String,
        key: String,
    },

    /// Two keyed fields share the same key
    #[error("Duplicate field key '{key}'")]
    DuplicateKey { key: String },

    /// A button's bind_to names a key that no field declares
    #[error("Button '{button}' is bound to undeclared field '{target}'")]
    UnresolvedBinding { button: String, target: String },

    /// A button is bound to a field whose value cannot hold a string
    #[error("Button '{button}' cannot be bound to {kind} field '{target}'")]
    InvalidBindTarget {
        button: String,
        target: String,
        kind: FieldKind,
    },

    /// An unbound button with no callback whose label is neither Submit nor Cancel
    #[error("Button '{label}' has no callback and is not 'Submit' or 'Cancel'")]
    AmbiguousButton { label: String },

    /// A bound button must supply the callback that produces its value
    #[error("Button '{label}' is bound to '{target}' but has no callback")]
    MissingCallback { label: String, target: String },

    /// An attribute was set on a field kind that does not support it
    #[error("Attribute '{attribute}' is not valid on {kind} field '{label}'")]
    InvalidAttribute {
        kind: FieldKind,
        label: String,
        attribute: &'static str,
    },

    /// The default value does not match the field kind
    #[error("Default value of {kind} field '{key}' has the wrong type")]
    DefaultTypeMismatch { kind: FieldKind, key: String },

    /// The declared row leaves no room for the doubled grid
    #[error("Field '{label}' is on row {row}; rows go up to {max}")]
    RowOutOfRange { label: String, row: u16, max: u16 },

    /// No handler is registered for the field kind
    #[error("Unsupported field kind: {kind}")]
    UnsupportedKind { kind: FieldKind },
}
