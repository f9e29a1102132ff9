//! Dialog outcome
//!
//! `FormResult` is produced once, at the terminal transition of the renderer,
//! and outlives it.

use crate::spec::FieldValue;
use serde::Serialize;
use std::collections::BTreeMap;

/// Result returned by `FormDialog::show`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormResult {
    /// True when the dialog was cancelled or closed
    pub cancelled: bool,
    /// Collected `{key: value}` mapping; empty when cancelled
    pub values: BTreeMap<String, FieldValue>,
}

impl Default for FormResult {
    fn default() -> Self {
        Self::cancelled()
    }
}

impl FormResult {
    pub fn cancelled() -> Self {
        Self {
            cancelled: true,
            values: BTreeMap::new(),
        }
    }

    pub fn submitted(values: BTreeMap<String, FieldValue>) -> Self {
        Self {
            cancelled: false,
            values,
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    /// Text value for `key`; `None` when missing, absent or not text
    pub fn text(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(FieldValue::as_text)
    }

    /// Checkbox value for `key`
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(FieldValue::as_bool)
    }
}
