//! Field validators and validation result types
//!
//! A validator is a total function from a field value to a
//! [`ValidationReport`]. Validators never fail: a panic escaping one is a
//! programming defect and is left to propagate.

use crate::context::FormContext;
use crate::spec::{FieldValue, FormSpec};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use strum::{Display, EnumString};

/// How serious a validation finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Ok,
}

/// Outcome of a single validator invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ValidationStatus {
    Valid,
    Invalid,
}

/// Result of one validator call on one value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub status: ValidationStatus,
    pub severity: Severity,
    pub message: Option<String>,
    /// Value handed to the next validator of the same field
    pub value: FieldValue,
}

impl ValidationReport {
    pub fn valid(value: FieldValue) -> Self {
        Self {
            status: ValidationStatus::Valid,
            severity: Severity::Ok,
            message: None,
            value,
        }
    }

    pub fn error(message: impl Into<String>, value: FieldValue) -> Self {
        Self {
            status: ValidationStatus::Invalid,
            severity: Severity::Error,
            message: Some(message.into()),
            value,
        }
    }

    pub fn warning(message: impl Into<String>, value: FieldValue) -> Self {
        Self {
            status: ValidationStatus::Invalid,
            severity: Severity::Warning,
            message: Some(message.into()),
            value,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.status == ValidationStatus::Valid
    }
}

/// A single finding attached to a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub field_key: String,
    pub message: String,
}

/// All issues found during one submission attempt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn error_messages_for(&self, key: &str) -> Vec<&str> {
        self.messages_for(key, Severity::Error)
    }

    pub fn warning_messages_for(&self, key: &str) -> Vec<&str> {
        self.messages_for(key, Severity::Warning)
    }

    fn messages_for(&self, key: &str, severity: Severity) -> Vec<&str> {
        self.issues
            .iter()
            .filter(|i| i.field_key == key && i.severity == severity)
            .map(|i| i.message.as_str())
            .collect()
    }
}

/// Signature shared by every validator
pub type ValidatorFn = dyn Fn(&FieldValue, &FormContext) -> ValidationReport;

/// A named validator attached to a field spec.
///
/// Two validators are equal when their names are equal, which is enough to
/// compare specs by value in tests.
#[derive(Clone)]
pub struct Validator {
    name: Cow<'static, str>,
    check: Rc<ValidatorFn>,
}

impl Validator {
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        check: impl Fn(&FieldValue, &FormContext) -> ValidationReport + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            check: Rc::new(check),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the validator
    pub fn check(&self, value: &FieldValue, ctx: &FormContext) -> ValidationReport {
        (self.check)(value, ctx)
    }

    pub fn required() -> Self {
        Self::new("required", required)
    }

    pub fn path_exists() -> Self {
        Self::new("path_exists", path_exists)
    }

    pub fn no_spaces_warning() -> Self {
        Self::new("no_spaces_warning", no_spaces_warning)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validator({})", self.name)
    }
}

impl PartialEq for Validator {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

fn is_blank(value: &FieldValue) -> bool {
    match value {
        FieldValue::Absent => true,
        FieldValue::Text(s) => s.trim().is_empty(),
        FieldValue::Bool(_) => false,
    }
}

/// Value must be present and, for text, non-blank.
pub fn required(value: &FieldValue, _ctx: &FormContext) -> ValidationReport {
    if is_blank(value) {
        return ValidationReport::error("This field is required.", value.clone());
    }
    ValidationReport::valid(value.clone())
}

/// Value must be one of `allowed`.
pub fn choices<I, S>(allowed: I) -> Validator
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let allowed: Vec<String> = allowed.into_iter().map(Into::into).collect();
    let message = format!("Must be one of: {}", allowed.join(", "));
    let name = format!("choices({})", allowed.join(","));

    Validator::new(name, move |value, _ctx| {
        let member = value
            .as_text()
            .is_some_and(|v| allowed.iter().any(|a| a == v));
        if member {
            ValidationReport::valid(value.clone())
        } else {
            ValidationReport::error(message.clone(), value.clone())
        }
    })
}

/// Value must name an existing path.
///
/// Absolute paths are checked directly; relative paths are searched from the
/// context's working directory upward.
pub fn path_exists(value: &FieldValue, ctx: &FormContext) -> ValidationReport {
    let raw = match value {
        FieldValue::Text(s) if !s.trim().is_empty() => s.trim(),
        _ => return ValidationReport::error("Path is required.", value.clone()),
    };

    if ctx.resolve_upward(raw).is_some() {
        return ValidationReport::valid(value.clone());
    }
    ValidationReport::error(
        format!("Path does not exist: {}", ctx.expand_user(raw).display()),
        value.clone(),
    )
}

/// Warn (never block) when the trimmed text contains a space.
pub fn no_spaces_warning(value: &FieldValue, _ctx: &FormContext) -> ValidationReport {
    if value.as_text().is_some_and(|s| s.trim().contains(' ')) {
        return ValidationReport::warning(
            "Contains spaces; this may cause issues.",
            value.clone(),
        );
    }
    ValidationReport::valid(value.clone())
}

/// Run every field's validators against `values`.
///
/// Fields are visited in declaration order and every validator runs; nothing
/// short-circuits. The value returned by one validator is handed to the next
/// validator of the same field. `values` itself is not rewritten.
pub fn run_validators(
    spec: &FormSpec,
    values: &BTreeMap<String, FieldValue>,
    ctx: &FormContext,
) -> ValidationResult {
    let mut result = ValidationResult::default();

    for field in spec.fields() {
        let Some(key) = field.key.as_deref() else {
            continue;
        };
        if field.validators.is_empty() {
            continue;
        }

        let mut value = values.get(key).cloned().unwrap_or_default();
        for validator in &field.validators {
            let report = validator.check(&value, ctx);
            if !report.is_valid() {
                tracing::debug!(field = key, validator = validator.name(), severity = %report.severity, "Validation issue");
                result.issues.push(ValidationIssue {
                    severity: report.severity,
                    field_key: key.to_string(),
                    message: report.message.unwrap_or_else(|| "Invalid value.".to_string()),
                });
            }
            value = report.value;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> FormContext {
        FormContext::new("/")
    }

    #[test]
    fn test_required_accepts_bool() {
        assert!(required(&FieldValue::Bool(false), &ctx()).is_valid());
    }

    #[test]
    fn test_choices_rejects_non_text() {
        let v = choices(["yes"]);
        assert!(!v.check(&FieldValue::Bool(true), &ctx()).is_valid());
    }

    #[test]
    fn test_validator_equality_by_name() {
        assert_eq!(Validator::required(), Validator::required());
        assert_ne!(Validator::required(), Validator::path_exists());
        assert_eq!(choices(["a", "b"]), choices(["a", "b"]));
    }

    #[test]
    fn test_missing_message_becomes_invalid_value() {
        let mut field = crate::spec::FieldSpec::new(crate::spec::FieldKind::Text);
        field.key = Some("name".into());
        field.validators.push(Validator::new("silent", |v, _| ValidationReport {
            status: ValidationStatus::Invalid,
            severity: Severity::Error,
            message: None,
            value: v.clone(),
        }));
        let spec = FormSpec::new("t", vec![field]).expect("valid");
        let result = run_validators(&spec, &BTreeMap::new(), &ctx());
        assert_eq!(result.error_messages_for("name"), vec!["Invalid value."]);
    }

    #[test]
    fn test_validators_chain_values() {
        let mut field = crate::spec::FieldSpec::new(crate::spec::FieldKind::Text);
        field.key = Some("name".into());
        field.validators.push(Validator::new("upper", |v, _| {
            ValidationReport::valid(FieldValue::from(v.display_text().to_uppercase()))
        }));
        field.validators.push(choices(["OCTO"]));
        let spec = FormSpec::new("t", vec![field]).expect("valid");

        let mut values = BTreeMap::new();
        values.insert("name".to_string(), FieldValue::from("octo"));
        let result = run_validators(&spec, &values, &ctx());
        assert!(result.issues.is_empty());
        assert_eq!(values["name"], FieldValue::from("octo"));
    }

    #[test]
    fn test_result_partitions_issues() {
        let result = ValidationResult {
            issues: vec![
                ValidationIssue {
                    severity: Severity::Error,
                    field_key: "name".into(),
                    message: "bad".into(),
                },
                ValidationIssue {
                    severity: Severity::Warning,
                    field_key: "name".into(),
                    message: "iffy".into(),
                },
            ],
        };
        assert!(result.has_errors());
        assert!(result.has_warnings());
        assert_eq!(result.error_messages_for("name"), vec!["bad"]);
        assert_eq!(result.warning_messages_for("name"), vec!["iffy"]);
        assert!(result.error_messages_for("other").is_empty());
    }
}
