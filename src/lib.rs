//! formdialog Library
//!
//! Declarative form dialogs for the terminal: describe fields once with a
//! [`FormSpec`] (or the fluent [`DialogBuilder`]), show them as a modal
//! ratatui dialog and get back a [`FormResult`].

pub mod builder;
pub mod cli;
pub mod components;
pub mod config_file;
pub mod context;
pub mod error;
pub mod renderer;
pub mod repo_dialog;
pub mod result;
pub mod spec;
pub mod theme;
pub mod tooltip;
pub mod trace;
pub mod validation;

// Re-export main types for convenience
pub use builder::{DialogBuilder, FieldOptions};
pub use context::FormContext;
pub use error::{ConstructionError, FormError, Result};
pub use renderer::events::{EventSource, FormEvent, ScriptedEvents};
pub use renderer::session::FormSession;
pub use renderer::{CancelTrigger, DialogState, DialogTransitionError, FormDialog, SubmitOutcome};
pub use repo_dialog::{RepoConfig, RepoDialog, Visibility};
pub use result::FormResult;
pub use spec::{FieldKind, FieldSpec, FieldValue, FontHint, FormSpec};
pub use validation::{
    choices, no_spaces_warning, path_exists, required, Severity, ValidationIssue,
    ValidationReport, ValidationResult, ValidationStatus, Validator,
};
