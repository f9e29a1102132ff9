//! Fluent dialog builder
//!
//! ```no_run
//! use formdialog::builder::{DialogBuilder, FieldOptions};
//! use formdialog::validation::{choices, Validator};
//!
//! let spec = DialogBuilder::new("My Form")
//!     .min_size(600, 400)
//!     .add_label("Section Header", FieldOptions::at(0, 0).bold())
//!     .add_text("username", "user", FieldOptions::at(1, 0).label("Username"))
//!     .add_select(
//!         "visibility",
//!         "local",
//!         ["public", "private", "local"],
//!         FieldOptions::at(2, 0)
//!             .label("Visibility")
//!             .validator(choices(["public", "private", "local"])),
//!     )
//!     .add_checkbox("notify", true, FieldOptions::at(3, 0).label("Send notification"))
//!     .add_button("Submit", FieldOptions::default())
//!     .add_button("Cancel", FieldOptions::default())
//!     .build()
//!     .expect("valid form");
//! # let _ = spec;
//! ```

use crate::context::FormContext;
use crate::error::Result;
use crate::renderer::FormDialog;
use crate::result::FormResult;
use crate::spec::{
    action_slug, ButtonCallback, FieldKind, FieldSpec, FieldValue, FontHint, FormSpec,
    DEFAULT_MIN_HEIGHT, DEFAULT_MIN_WIDTH,
};
use crate::validation::Validator;
use std::rc::Rc;

/// Optional attributes shared by the `add_*` methods.
///
/// Attributes that do not apply to the kind being added are rejected by
/// `build()`.
#[derive(Clone, Default)]
pub struct FieldOptions {
    pub label: String,
    pub help_text: String,
    pub row: u16,
    pub col: u16,
    pub validators: Vec<Validator>,
    pub font: FontHint,
    pub readonly: bool,
    pub callback: Option<ButtonCallback>,
    pub bind_to: Option<String>,
}

impl FieldOptions {
    /// Options placed at `(row, col)`
    pub fn at(row: u16, col: u16) -> Self {
        Self {
            row,
            col,
            ..Self::default()
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn help(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = help_text.into();
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn font(mut self, font: FontHint) -> Self {
        self.font = font;
        self
    }

    pub fn bold(self) -> Self {
        self.font(FontHint::bold())
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn callback(mut self, callback: impl Fn() -> Option<String> + 'static) -> Self {
        self.callback = Some(Rc::new(callback));
        self
    }

    pub fn bind_to(mut self, key: impl Into<String>) -> Self {
        self.bind_to = Some(key.into());
        self
    }
}

/// Fluent builder that produces a [`FormSpec`]
pub struct DialogBuilder {
    title: String,
    fields: Vec<FieldSpec>,
    min_width: u32,
    min_height: u32,
    debug: bool,
}

impl DialogBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
            min_width: DEFAULT_MIN_WIDTH,
            min_height: DEFAULT_MIN_HEIGHT,
            debug: false,
        }
    }

    /// Enable the debug snapshot key in `show()`
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Minimum dialog size in pixels
    pub fn min_size(mut self, width: u32, height: u32) -> Self {
        self.min_width = width;
        self.min_height = height;
        self
    }

    /// Decorative label; no key, no result
    pub fn add_label(self, text: impl Into<String>, opts: FieldOptions) -> Self {
        self.push(FieldKind::Label, None, text.into(), FieldValue::Absent, Vec::new(), opts)
    }

    pub fn add_text(self, key: impl Into<String>, default: impl Into<String>, opts: FieldOptions) -> Self {
        let label = opts.label.clone();
        self.push(
            FieldKind::Text,
            Some(key.into()),
            label,
            FieldValue::Text(default.into()),
            Vec::new(),
            opts,
        )
    }

    pub fn add_select<I, S>(
        self,
        key: impl Into<String>,
        default: impl Into<String>,
        options: I,
        opts: FieldOptions,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let label = opts.label.clone();
        self.push(
            FieldKind::Select,
            Some(key.into()),
            label,
            FieldValue::Text(default.into()),
            options.into_iter().map(Into::into).collect(),
            opts,
        )
    }

    pub fn add_checkbox(self, key: impl Into<String>, default: bool, opts: FieldOptions) -> Self {
        let label = opts.label.clone();
        self.push(
            FieldKind::Checkbox,
            Some(key.into()),
            label,
            FieldValue::Bool(default),
            Vec::new(),
            opts,
        )
    }

    /// Add a button labelled with `text` in title case.
    ///
    /// A button labelled "Submit" or "Cancel" (any case) without a callback
    /// gets submit or cancel behaviour. A button with `bind_to` is keyed by
    /// its normalised label; an action button has no key.
    pub fn add_button(self, text: &str, opts: FieldOptions) -> Self {
        let key = opts.bind_to.as_ref().map(|_| action_slug(text));
        self.push(
            FieldKind::Button,
            key,
            title_case(text),
            FieldValue::Absent,
            Vec::new(),
            opts,
        )
    }

    fn push(
        mut self,
        kind: FieldKind,
        key: Option<String>,
        label: String,
        default: FieldValue,
        options: Vec<String>,
        opts: FieldOptions,
    ) -> Self {
        self.fields.push(FieldSpec {
            kind,
            key,
            label,
            default,
            help_text: opts.help_text,
            options,
            readonly: opts.readonly,
            callback: opts.callback,
            bind_to: opts.bind_to,
            row: opts.row,
            col: opts.col,
            validators: opts.validators,
            font: opts.font,
            is_bound: false,
        });
        self
    }

    /// Produce the final [`FormSpec`]
    ///
    /// # Errors
    ///
    /// [`crate::error::FormError::Construction`] when the accumulated fields
    /// are malformed.
    pub fn build(self) -> Result<FormSpec> {
        let spec = FormSpec::new(self.title, self.fields)?.with_min_size(self.min_width, self.min_height);
        tracing::debug!(title = %spec.title(), fields = spec.fields().len(), "Built form spec");
        Ok(spec)
    }

    /// Build and immediately show the dialog
    pub fn show(self) -> Result<FormResult> {
        let ctx = FormContext::from_env().with_debug(self.debug);
        let spec = self.build()?;
        FormDialog::new(spec).with_context(ctx).show()
    }
}

/// Upper-case the first letter of each word and lower-case the rest
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}
