//! Per-dialog context
//!
//! A `FormContext` is created once per `show()` call and handed to the renderer
//! and to every validator. It carries the process-level facts validators need
//! (working directory, home directory) so none of them reach for globals.

use std::path::{Path, PathBuf};

/// Explicit context scoped to one dialog session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormContext {
    /// Base directory for resolving relative paths
    working_dir: PathBuf,
    /// Directory substituted for a leading `~`
    home_dir: Option<PathBuf>,
    /// Enables the debug snapshot key and verbose transition logging
    debug: bool,
}

impl Default for FormContext {
    fn default() -> Self {
        Self::from_env()
    }
}

impl FormContext {
    /// Create a context rooted at `working_dir` with no home directory
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            home_dir: None,
            debug: false,
        }
    }

    /// Build a context from the process environment.
    ///
    /// `PWD` is preferred over the canonical current directory so symlinked
    /// project paths resolve the way the user typed them.
    pub fn from_env() -> Self {
        let working_dir = std::env::var_os("PWD")
            .map(PathBuf::from)
            .filter(|p| p.is_absolute())
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        let home_dir = std::env::var_os("HOME")
            .map(PathBuf::from)
            .filter(|p| !p.as_os_str().is_empty());

        Self {
            working_dir,
            home_dir,
            debug: false,
        }
    }

    pub fn with_home_dir(mut self, home: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(home.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[inline]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    #[inline]
    pub fn home_dir(&self) -> Option<&Path> {
        self.home_dir.as_deref()
    }

    #[inline]
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Expand a leading `~` or `~/` using the context's home directory.
    ///
    /// Paths without a tilde, and tilde paths when no home is known, are
    /// returned unchanged.
    pub fn expand_user(&self, raw: &str) -> PathBuf {
        let Some(home) = self.home_dir() else {
            return PathBuf::from(raw);
        };
        if raw == "~" {
            return home.to_path_buf();
        }
        match raw.strip_prefix("~/") {
            Some(rest) => home.join(rest),
            None => PathBuf::from(raw),
        }
    }

    /// Resolve `raw` to an existing path.
    ///
    /// Absolute paths are checked directly. Relative paths are joined onto the
    /// working directory and then onto each of its ancestors in turn; the first
    /// candidate that exists wins.
    pub fn resolve_upward(&self, raw: &str) -> Option<PathBuf> {
        let path = self.expand_user(raw);
        if path.is_absolute() {
            return path.exists().then_some(path);
        }

        self.working_dir
            .ancestors()
            .map(|base| base.join(&path))
            .find(|candidate| candidate.exists())
    }
}
