use crate::repo_dialog::{RepoConfig, Visibility};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// formdialog - Declarative terminal form dialogs
#[derive(Parser)]
#[command(name = "formdialog")]
#[command(about = "Terminal form dialogs for project setup")]
#[command(version)]
pub struct Cli {
    /// Debug mode: verbose logging and F2 field snapshots.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Write logs to this file instead of stderr.
    ///
    /// The dialog owns the terminal while it is open, so stderr output is
    /// only readable after it closes.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the repository configuration dialog
    Repo(RepoArgs),
    /// Show a form with every field kind and print the values
    Demo,
    /// Validate a defaults file against the repository form without a terminal
    Validate {
        /// Path to the JSON defaults file
        #[arg(long)]
        defaults: PathBuf,
    },
}

/// Pre-filled values for the repository dialog
#[derive(Args, Debug, Default, Clone)]
pub struct RepoArgs {
    /// JSON file with default values
    #[arg(long)]
    pub defaults: Option<PathBuf>,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub username: Option<String>,

    #[arg(long)]
    pub branch: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// public, private or local
    #[arg(long)]
    pub visibility: Option<Visibility>,

    /// Project directory
    #[arg(long)]
    pub directory: Option<String>,

    /// Write the resulting configuration here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl RepoArgs {
    /// Layer the command-line overrides on top of `base`
    pub fn apply_overrides(&self, mut base: RepoConfig) -> RepoConfig {
        let overrides = [
            (&self.name, &mut base.name),
            (&self.username, &mut base.username),
            (&self.branch, &mut base.branch),
            (&self.description, &mut base.description),
            (&self.directory, &mut base.project_directory),
        ];
        for (value, slot) in overrides {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }
        if let Some(visibility) = self.visibility {
            base.visibility = visibility;
        }
        base
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_no_args() {
        // Running with no args should succeed (defaults to the repo dialog)
        let result = Cli::try_parse_from(["formdialog"]);
        assert!(result.is_ok());
        let cli = result.unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_repo_overrides() {
        let cli = Cli::try_parse_from([
            "formdialog",
            "--debug",
            "repo",
            "--name",
            "demo",
            "--visibility",
            "private",
        ])
        .unwrap();
        assert!(cli.debug);
        match cli.command {
            Some(Commands::Repo(args)) => {
                let config = args.apply_overrides(RepoConfig::default());
                assert_eq!(config.name, "demo");
                assert_eq!(config.visibility, Visibility::Private);
                assert_eq!(config.branch, "master");
            }
            _ => panic!("Expected Repo command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_visibility() {
        let result = Cli::try_parse_from(["formdialog", "repo", "--visibility", "internal"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_validate_command() {
        let cli = Cli::try_parse_from([
            "formdialog",
            "validate",
            "--defaults",
            "/path/to/repo.json",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Validate { defaults }) => {
                assert_eq!(defaults.to_str().unwrap(), "/path/to/repo.json");
            }
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_cli_log_file_is_global() {
        let cli = Cli::try_parse_from(["formdialog", "demo", "--log-file", "/tmp/fd.log"]).unwrap();
        assert_eq!(cli.log_file.unwrap().to_str().unwrap(), "/tmp/fd.log");
        assert!(matches!(cli.command, Some(Commands::Demo)));
    }
}
