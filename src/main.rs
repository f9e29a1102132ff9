//! formdialog - Main entry point
//!
//! Shows the repository configuration dialog, a demo form, or validates a
//! defaults file headlessly.

use anyhow::Context;
use formdialog::builder::{DialogBuilder, FieldOptions};
use formdialog::cli::{Cli, Commands, RepoArgs};
use formdialog::context::FormContext;
use formdialog::renderer::session::FormSession;
use formdialog::renderer::SubmitOutcome;
use formdialog::repo_dialog::{RepoConfig, RepoDialog};
use formdialog::spec::FontHint;
use formdialog::validation::{choices, Validator};
use std::fs::File;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Initialize tracing. `RUST_LOG` overrides the level chosen by `--debug`.
fn init_logger(debug: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let default_level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {:?}", path))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    if let Err(e) = init_logger(cli.debug, cli.log_file.as_deref()) {
        eprintln!("✗ {:#}", e);
        return ExitCode::FAILURE;
    }
    info!("formdialog starting up");

    let result = match cli.command {
        Some(Commands::Repo(args)) => run_repo_dialog(&args, cli.debug),
        Some(Commands::Demo) => run_demo(cli.debug),
        Some(Commands::Validate { defaults }) => run_validate(&defaults),
        None => {
            info!("No command specified, launching repository dialog");
            run_repo_dialog(&RepoArgs::default(), cli.debug)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("✗ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_defaults(path: Option<&Path>) -> anyhow::Result<RepoConfig> {
    match path {
        Some(path) => {
            info!("Loading dialog defaults from: {:?}", path);
            RepoConfig::load_from_file(path)
        }
        None => Ok(RepoConfig::default()),
    }
}

/// Show the repository dialog and print or save the submitted config
fn run_repo_dialog(args: &RepoArgs, debug: bool) -> anyhow::Result<ExitCode> {
    let defaults = args.apply_overrides(load_defaults(args.defaults.as_deref())?);
    debug!(?defaults, "Repository dialog defaults");

    let ctx = FormContext::from_env().with_debug(debug);
    let Some(config) = RepoDialog::new(defaults).show(ctx)? else {
        eprintln!("Repository configuration cancelled.");
        return Ok(ExitCode::FAILURE);
    };

    match &args.output {
        Some(path) => {
            config.save_to_file(path)?;
            println!("✓ Configuration written to {:?}", path);
        }
        None => println!("{}", serde_json::to_string_pretty(&config)?),
    }
    Ok(ExitCode::SUCCESS)
}

/// Form exercising every field kind
fn run_demo(debug: bool) -> anyhow::Result<ExitCode> {
    let result = DialogBuilder::new("Form Demo")
        .debug(debug)
        .min_size(560, 320)
        .add_label("Contact Details", FieldOptions::at(0, 0).font(FontHint::bold()))
        .add_text(
            "full_name",
            "",
            FieldOptions::at(1, 0)
                .label("Full name")
                .help("Your name as it should appear.")
                .validator(Validator::required()),
        )
        .add_button(
            "Fill",
            FieldOptions::at(1, 2)
                .help("Use the login name.")
                .bind_to("full_name")
                .callback(|| std::env::var("USER").ok()),
        )
        .add_text(
            "nickname",
            "",
            FieldOptions::at(2, 0)
                .label("Nickname")
                .validator(Validator::no_spaces_warning()),
        )
        .add_select(
            "color",
            "green",
            ["red", "green", "blue"],
            FieldOptions::at(3, 0)
                .label("Colour")
                .help("Type a colour or cycle with Left/Right.")
                .validator(choices(["red", "green", "blue"])),
        )
        .add_checkbox("subscribe", true, FieldOptions::at(4, 0).label("Subscribe to updates"))
        .add_button(
            "Log",
            FieldOptions::default()
                .help("Write a log line.")
                .callback(|| {
                    info!("Demo log button pressed");
                    None
                }),
        )
        .add_button("Submit", FieldOptions::default())
        .add_button("Cancel", FieldOptions::default())
        .show()?;

    if result.cancelled {
        eprintln!("Demo form cancelled.");
        return Ok(ExitCode::FAILURE);
    }
    println!("{}", serde_json::to_string_pretty(&result.values)?);
    Ok(ExitCode::SUCCESS)
}

/// Submit the repository form with the file's defaults, without a terminal
fn run_validate(path: &Path) -> anyhow::Result<ExitCode> {
    info!("Validating defaults file: {:?}", path);
    let defaults = RepoConfig::load_from_file(path)?;
    let ctx = FormContext::from_env();
    let spec = RepoDialog::new(defaults).spec(&ctx)?;

    let mut session = FormSession::new(spec, ctx);
    session.render()?;
    match session.submit()? {
        SubmitOutcome::Blocked(report) => {
            for issue in report.errors() {
                eprintln!("✗ {}: {}", issue.field_key, issue.message);
            }
            Ok(ExitCode::FAILURE)
        }
        SubmitOutcome::AwaitingConfirmation(report) => {
            for issue in report.warnings() {
                println!("! {}: {}", issue.field_key, issue.message);
            }
            println!("✓ Defaults are valid (with warnings): {:?}", path);
            Ok(ExitCode::SUCCESS)
        }
        SubmitOutcome::Declined => Ok(ExitCode::FAILURE),
        SubmitOutcome::Submitted => {
            println!("✓ Defaults are valid: {:?}", path);
            Ok(ExitCode::SUCCESS)
        }
    }
}
