//! Repository configuration dialog
//!
//! Collects the settings needed to create a project repository and maps the
//! submitted form onto a typed [`RepoConfig`]. Creating the repository is the
//! caller's business; this module only asks.

use crate::builder::{DialogBuilder, FieldOptions};
use crate::context::FormContext;
use crate::error::Result;
use crate::renderer::events::EventSource;
use crate::renderer::FormDialog;
use crate::result::FormResult;
use crate::spec::{FieldValue, FormSpec};
use crate::validation::{choices, Validator};
use ratatui::{backend::Backend, Terminal};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Dialog title
pub const TITLE: &str = "GitHub Repository Configuration";

/// Where the repository lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    /// No remote
    #[default]
    Local,
}

/// Canonical repository configuration; field names are the form keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    pub name: String,
    pub project_directory: String,
    pub username: String,
    pub branch: String,
    pub description: String,
    pub visibility: Visibility,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            project_directory: String::new(),
            username: String::new(),
            branch: "master".to_string(),
            description: String::new(),
            visibility: Visibility::default(),
        }
    }
}

impl RepoConfig {
    /// Copy known keys from `values` into `self`.
    ///
    /// `Absent` values leave the field untouched. Returns the keys that were
    /// ignored: unknown keys and values that do not fit their field.
    pub fn apply_values(&mut self, values: &BTreeMap<String, FieldValue>) -> Vec<String> {
        let mut ignored = Vec::new();
        for (key, value) in values {
            if value.is_absent() {
                continue;
            }
            let Some(text) = value.as_text() else {
                ignored.push(key.clone());
                continue;
            };
            let slot = match key.as_str() {
                "name" => &mut self.name,
                "project_directory" => &mut self.project_directory,
                "username" => &mut self.username,
                "branch" => &mut self.branch,
                "description" => &mut self.description,
                "visibility" => {
                    match Visibility::from_str(text) {
                        Ok(visibility) => self.visibility = visibility,
                        Err(_) => ignored.push(key.clone()),
                    }
                    continue;
                }
                _ => {
                    ignored.push(key.clone());
                    continue;
                }
            };
            *slot = text.to_string();
        }
        if !ignored.is_empty() {
            tracing::debug!(?ignored, "Ignored values not in RepoConfig");
        }
        ignored
    }

    /// Config built from a submitted result, with a relative project
    /// directory resolved to an absolute path. `None` when cancelled.
    pub fn from_result(result: &FormResult, ctx: &FormContext) -> Option<Self> {
        if result.cancelled {
            return None;
        }
        let mut config = Self::default();
        config.apply_values(&result.values);
        if !config.project_directory.is_empty() {
            if let Some(path) = ctx.resolve_upward(&config.project_directory) {
                config.project_directory = path.display().to_string();
            }
        }
        Some(config)
    }
}

/// The repository configuration dialog
#[derive(Debug, Clone, Default)]
pub struct RepoDialog {
    defaults: RepoConfig,
}

impl RepoDialog {
    /// Dialog pre-filled with `defaults`
    pub fn new(defaults: RepoConfig) -> Self {
        Self { defaults }
    }

    /// Form specification.
    ///
    /// The "Use cwd" button fills the directory field with the working
    /// directory's name, relative to its parent.
    pub fn spec(&self, ctx: &FormContext) -> Result<FormSpec> {
        let d = &self.defaults;
        let working_dir = ctx.working_dir().to_path_buf();
        let visibilities: Vec<String> = Visibility::iter().map(|v| v.to_string()).collect();

        DialogBuilder::new(TITLE)
            .min_size(520, 340)
            .add_text(
                "project_directory",
                d.project_directory.clone(),
                FieldOptions::at(1, 1)
                    .label("Directory")
                    .validator(Validator::path_exists()),
            )
            .add_button(
                "Use cwd",
                FieldOptions::at(1, 2)
                    .help("Select the project directory.")
                    .bind_to("project_directory")
                    .callback(move || {
                        working_dir
                            .file_name()
                            .map(|name| name.to_string_lossy().into_owned())
                    }),
            )
            .add_text(
                "username",
                d.username.clone(),
                FieldOptions::at(2, 1).label("Username").help(
                    "GitHub username (informational). The repository is created under the GITHUB_TOKEN owner.",
                ),
            )
            .add_text(
                "branch",
                d.branch.clone(),
                FieldOptions::at(3, 1)
                    .label("Branch")
                    .help("Initial branch name for the repository."),
            )
            .add_text(
                "name",
                d.name.clone(),
                FieldOptions::at(4, 1)
                    .label("Name")
                    .help("Name of the GitHub repository.")
                    .validator(Validator::no_spaces_warning()),
            )
            .add_text(
                "description",
                d.description.clone(),
                FieldOptions::at(5, 1)
                    .label("Description")
                    .help("Short description of the repository."),
            )
            .add_select(
                "visibility",
                d.visibility.to_string(),
                visibilities.clone(),
                FieldOptions::at(6, 1)
                    .label("Visibility")
                    .help("public/private for remote, or local for no remote.")
                    .readonly()
                    .validator(choices(visibilities)),
            )
            .add_button("submit", FieldOptions::at(7, 1).help("Create the repository."))
            .add_button("cancel", FieldOptions::at(7, 2).help("Cancel without creating."))
            .build()
    }

    /// Show on the controlling terminal
    pub fn show(self, ctx: FormContext) -> Result<Option<RepoConfig>> {
        let spec = self.spec(&ctx)?;
        let result = FormDialog::new(spec).with_context(ctx.clone()).show()?;
        Ok(RepoConfig::from_result(&result, &ctx))
    }

    /// Show on any backend with any event source
    pub fn show_on<B: Backend>(
        self,
        ctx: FormContext,
        terminal: &mut Terminal<B>,
        events: &mut dyn EventSource,
    ) -> Result<Option<RepoConfig>> {
        let spec = self.spec(&ctx)?;
        let result = FormDialog::new(spec)
            .with_context(ctx.clone())
            .show_on(terminal, events)?;
        Ok(RepoConfig::from_result(&result, &ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, FieldValue)]) -> BTreeMap<String, FieldValue> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_apply_values_ignores_unknown_keys() {
        let mut config = RepoConfig::default();
        let ignored = config.apply_values(&values(&[
            ("name", FieldValue::Text("demo".into())),
            ("bogus", FieldValue::Text("x".into())),
            ("visibility", FieldValue::Text("private".into())),
        ]));
        assert_eq!(ignored, vec!["bogus".to_string()]);
        assert_eq!(config.name, "demo");
        assert_eq!(config.visibility, Visibility::Private);
    }

    #[test]
    fn test_absent_leaves_default() {
        let mut config = RepoConfig::default();
        config.apply_values(&values(&[("branch", FieldValue::Absent)]));
        assert_eq!(config.branch, "master");
    }

    #[test]
    fn test_spec_layout_matches_form() {
        let spec = RepoDialog::default()
            .spec(&FormContext::new("/tmp/project"))
            .expect("spec");
        assert_eq!(spec.title(), TITLE);
        assert_eq!(spec.min_width(), 520);
        assert_eq!(spec.min_height(), 340);
        let keys: Vec<&str> = spec.fields().iter().filter_map(|f| f.key.as_deref()).collect();
        assert_eq!(
            keys,
            vec!["project_directory", "use_cwd", "username", "branch", "name", "description", "visibility"]
        );
        assert!(spec.field("project_directory").expect("dir").is_bound);
    }

    #[test]
    fn test_visibility_parses_lowercase() {
        assert_eq!(Visibility::from_str("public").ok(), Some(Visibility::Public));
        assert_eq!(Visibility::Local.to_string(), "local");
        assert!(Visibility::from_str("internal").is_err());
    }
}
