//! Session state machine tests
//!
//! Drive `FormSession` without a terminal: submit, cancel, warning
//! confirmation, bound buttons, key handling and teardown.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use formdialog::builder::{DialogBuilder, FieldOptions};
use formdialog::components::keybindings::KeyMode;
use formdialog::renderer::session::{ButtonOutcome, FormSession};
use formdialog::renderer::{CancelTrigger, DialogState, DialogTransitionError, SubmitOutcome};
use formdialog::validation::{choices, Validator};
use formdialog::{FieldValue, FormContext, FormEvent, FormResult, FormSpec};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

fn ctx() -> FormContext {
    FormContext::new("/")
}

fn rendered(spec: FormSpec) -> FormSession {
    let mut session = FormSession::new(spec, ctx());
    session.render().expect("render");
    session
}

fn press(session: &mut FormSession, code: KeyCode) {
    session
        .handle_key(KeyEvent::new(code, KeyModifiers::NONE))
        .expect("key");
}

fn type_text(session: &mut FormSession, text: &str) {
    for event in FormEvent::text(text) {
        session.handle_event(event).expect("typing");
    }
}

fn name_spec() -> FormSpec {
    DialogBuilder::new("Name")
        .add_text(
            "name",
            "octo",
            FieldOptions::at(0, 0).validator(Validator::required()),
        )
        .add_button("Submit", FieldOptions::default())
        .add_button("Cancel", FieldOptions::default())
        .build()
        .expect("spec")
}

fn warning_spec() -> FormSpec {
    DialogBuilder::new("Repo")
        .add_text(
            "name",
            "my repo",
            FieldOptions::at(0, 0)
                .label("Name")
                .validator(Validator::no_spaces_warning()),
        )
        .add_button("Submit", FieldOptions::default())
        .add_button("Cancel", FieldOptions::default())
        .build()
        .expect("spec")
}

// =============================================================================
// Submission
// =============================================================================

#[test]
fn test_submit_unedited_default() {
    let mut session = rendered(name_spec());
    assert_eq!(session.submit().expect("submit"), SubmitOutcome::Submitted);
    assert_eq!(session.state(), DialogState::Submitted);

    let result = session.finish().expect("finish");
    assert!(!result.cancelled);
    assert_eq!(result.text("name"), Some("octo"));
}

#[test]
fn test_cleared_select_is_blocked() {
    let options = ["public", "private", "local"];
    let spec = DialogBuilder::new("Visibility")
        .add_select(
            "visibility",
            "local",
            options,
            FieldOptions::at(0, 0).validator(choices(options)),
        )
        .add_button("Submit", FieldOptions::default())
        .build()
        .expect("spec");
    let mut session = rendered(spec);
    session.set_value("visibility", "").expect("clear");

    let SubmitOutcome::Blocked(report) = session.submit().expect("submit") else {
        panic!("expected a blocked submission");
    };
    assert_eq!(
        report.error_messages_for("visibility"),
        vec!["Must be one of: public, private, local"]
    );
    assert_eq!(session.state(), DialogState::Rendered);
    assert!(session.result().is_none());
    assert_eq!(
        session.inline_error("visibility"),
        Some("Must be one of: public, private, local")
    );
}

#[test]
fn test_errors_never_submit() {
    let mut session = rendered(name_spec());
    session.set_value("name", "   ").expect("set");

    assert!(matches!(session.submit(), Ok(SubmitOutcome::Blocked(_))));
    assert_eq!(session.inline_error("name"), Some("This field is required."));
    assert!(matches!(
        session.finish(),
        Err(DialogTransitionError::NotFinished {
            state: DialogState::Rendered
        })
    ));
}

#[test]
fn test_inline_errors_cleared_on_next_attempt() {
    let mut session = rendered(name_spec());
    session.set_value("name", "").expect("set");
    session.submit().expect("submit");
    assert!(session.inline_error("name").is_some());

    session.set_value("name", "fixed").expect("set");
    assert_eq!(session.submit().expect("submit"), SubmitOutcome::Submitted);
    assert!(session.inline_errors().is_empty());
}

#[test]
fn test_first_error_per_field_is_shown() {
    let spec = DialogBuilder::new("Two")
        .add_text(
            "name",
            "",
            FieldOptions::at(0, 0)
                .validator(Validator::required())
                .validator(Validator::new("second", |v, _| {
                    formdialog::ValidationReport::error("Second problem", v.clone())
                })),
        )
        .build()
        .expect("spec");
    let mut session = rendered(spec);

    let SubmitOutcome::Blocked(report) = session.submit().expect("submit") else {
        panic!("expected a blocked submission");
    };
    assert_eq!(
        report.error_messages_for("name"),
        vec!["This field is required.", "Second problem"]
    );
    assert_eq!(session.inline_error("name"), Some("This field is required."));
}

#[test]
fn test_values_reflect_live_edits() {
    let mut session = rendered(name_spec());
    type_text(&mut session, "cat");
    press(&mut session, KeyCode::Enter);

    assert_eq!(session.state(), DialogState::Submitted);
    let result = session.finish().expect("finish");
    assert_eq!(result.text("name"), Some("octocat"));
}

#[test]
fn test_submitted_values_are_trimmed() {
    let mut session = rendered(name_spec());
    session.set_value("name", "  padded  ").expect("set");
    session.submit().expect("submit");
    let result = session.finish().expect("finish");
    assert_eq!(result.text("name"), Some("padded"));
}

// =============================================================================
// Warnings
// =============================================================================

#[test]
fn test_declined_warnings_keep_dialog_open() {
    let mut session = rendered(warning_spec());

    let SubmitOutcome::AwaitingConfirmation(report) = session.submit().expect("submit") else {
        panic!("expected a confirmation prompt");
    };
    assert_eq!(
        report.warning_messages_for("name"),
        vec!["Contains spaces; this may cause issues."]
    );
    assert_eq!(session.key_mode(), KeyMode::Confirm);
    assert!(session.pending_prompt().is_some());

    press(&mut session, KeyCode::Char('n'));
    assert_eq!(session.state(), DialogState::Rendered);
    assert!(session.pending_prompt().is_none());
    assert!(session.result().is_none());
}

#[test]
fn test_decline_is_distinct_from_blocked() {
    let mut session = rendered(warning_spec());
    session.submit().expect("submit");

    assert_eq!(
        session.confirm_warnings(false).expect("decline"),
        SubmitOutcome::Declined
    );
    assert!(session.inline_errors().is_empty());
    assert_eq!(session.state(), DialogState::Rendered);

    // The prompt opens again on the next attempt
    assert!(matches!(
        session.submit(),
        Ok(SubmitOutcome::AwaitingConfirmation(_))
    ));
}

#[test]
fn test_accepted_warnings_submit() {
    let mut session = rendered(warning_spec());
    session.submit().expect("submit");
    press(&mut session, KeyCode::Char('y'));

    assert_eq!(session.state(), DialogState::Submitted);
    let result = session.finish().expect("finish");
    assert_eq!(result.text("name"), Some("my repo"));
}

#[test]
fn test_prompt_enter_uses_selection() {
    let mut session = rendered(warning_spec());
    session.submit().expect("submit");

    // "No" is selected initially
    press(&mut session, KeyCode::Enter);
    assert_eq!(session.state(), DialogState::Rendered);

    session.submit().expect("submit");
    press(&mut session, KeyCode::Right);
    assert!(session.pending_prompt().expect("prompt").selected_yes);
    press(&mut session, KeyCode::Enter);
    assert_eq!(session.state(), DialogState::Submitted);
}

#[test]
fn test_submit_while_prompt_open_is_rejected() {
    let mut session = rendered(warning_spec());
    session.submit().expect("submit");
    assert_eq!(
        session.submit(),
        Err(DialogTransitionError::AwaitingConfirmation)
    );
}

#[test]
fn test_confirm_without_prompt_is_rejected() {
    let mut session = rendered(warning_spec());
    assert_eq!(
        session.confirm_warnings(true),
        Err(DialogTransitionError::NoPendingConfirmation)
    );
}

// =============================================================================
// Cancellation
// =============================================================================

fn cancelled_after_edit(cancel: impl FnOnce(&mut FormSession)) -> FormResult {
    let mut session = rendered(name_spec());
    type_text(&mut session, "unsaved");
    cancel(&mut session);
    assert_eq!(session.state(), DialogState::Cancelled);
    session.finish().expect("finish")
}

#[test]
fn test_cancel_by_every_trigger() {
    let results = [
        cancelled_after_edit(|s| press(s, KeyCode::Esc)),
        cancelled_after_edit(|s| {
            s.activate_button("cancel").expect("cancel button");
        }),
        cancelled_after_edit(|s| s.handle_event(FormEvent::Closed).expect("close")),
        cancelled_after_edit(|s| {
            s.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
                .expect("ctrl+c")
        }),
        cancelled_after_edit(|s| s.cancel(CancelTrigger::WindowClosed).expect("cancel")),
    ];
    for result in results {
        assert_eq!(result, FormResult::cancelled());
        assert!(result.values.is_empty());
    }
}

#[test]
fn test_cancel_while_prompt_open() {
    let mut session = rendered(warning_spec());
    session.submit().expect("submit");
    session.handle_event(FormEvent::Closed).expect("close");
    assert_eq!(session.state(), DialogState::Cancelled);
    assert!(session.pending_prompt().is_none());
}

#[test]
fn test_transitions_after_close_are_rejected() {
    let mut session = rendered(name_spec());
    session.cancel(CancelTrigger::Escape).expect("cancel");
    assert_eq!(
        session.submit(),
        Err(DialogTransitionError::NotRendered {
            state: DialogState::Cancelled
        })
    );
    assert!(session.cancel(CancelTrigger::Button).is_err());
}

// =============================================================================
// Buttons
// =============================================================================

#[test]
fn test_bound_button_writes_target() {
    let spec = DialogBuilder::new("Dir")
        .add_text("directory", "", FieldOptions::at(0, 0).label("Directory"))
        .add_button(
            "Browse",
            FieldOptions::at(0, 2)
                .bind_to("directory")
                .callback(|| Some("/tmp/x".to_string())),
        )
        .build()
        .expect("spec");
    let mut session = rendered(spec);

    let outcome = session.activate_button("browse").expect("browse");
    assert_eq!(
        outcome,
        ButtonOutcome::Bound {
            target: "directory".to_string(),
            value: Some("/tmp/x".to_string())
        }
    );
    assert_eq!(
        session.value("directory"),
        Some(FieldValue::Text("/tmp/x".to_string()))
    );
    assert_eq!(session.tooltip_text("directory").as_deref(), Some("/tmp/x"));
}

#[test]
fn test_bound_button_returning_none_keeps_value() {
    let spec = DialogBuilder::new("Dir")
        .add_text("directory", "/srv", FieldOptions::at(0, 0))
        .add_button(
            "Browse",
            FieldOptions::at(0, 2).bind_to("directory").callback(|| None),
        )
        .build()
        .expect("spec");
    let mut session = rendered(spec);
    session.activate_button("browse").expect("browse");
    assert_eq!(session.value("directory"), Some(FieldValue::from("/srv")));
}

#[test]
fn test_callback_button_keeps_dialog_open() {
    let presses = Rc::new(Cell::new(0));
    let counter = Rc::clone(&presses);
    let spec = DialogBuilder::new("Callback")
        .add_button(
            "Ping",
            FieldOptions::default().callback(move || {
                counter.set(counter.get() + 1);
                None
            }),
        )
        .build()
        .expect("spec");
    let mut session = rendered(spec);

    assert_eq!(session.activate_button("ping"), Ok(ButtonOutcome::Invoked));
    press(&mut session, KeyCode::Enter);
    assert_eq!(presses.get(), 2);
    assert_eq!(session.state(), DialogState::Rendered);
}

#[test]
fn test_unknown_button() {
    let mut session = rendered(name_spec());
    assert_eq!(
        session.activate_button("nope"),
        Err(DialogTransitionError::UnknownButton {
            id: "nope".to_string()
        })
    );
}

// =============================================================================
// Key handling
// =============================================================================

fn mixed_spec() -> FormSpec {
    DialogBuilder::new("Mixed")
        .add_label("Header", FieldOptions::at(0, 0))
        .add_text("name", "octo", FieldOptions::at(1, 0).label("Name"))
        .add_select(
            "visibility",
            "local",
            ["public", "private", "local"],
            FieldOptions::at(2, 0).label("Visibility").readonly(),
        )
        .add_checkbox("notify", false, FieldOptions::at(3, 0).label("Notify"))
        .add_button("Submit", FieldOptions::default())
        .add_button("Cancel", FieldOptions::default())
        .build()
        .expect("spec")
}

#[test]
fn test_focus_skips_labels_and_wraps() {
    let mut session = rendered(mixed_spec());
    let order: Vec<String> = (0..6)
        .map(|_| {
            let name = session
                .focused_field()
                .map(|f| f.key.clone().unwrap_or_else(|| f.action_id()))
                .expect("focus");
            press(&mut session, KeyCode::Tab);
            name
        })
        .collect();
    assert_eq!(
        order,
        vec!["name", "visibility", "notify", "submit", "cancel", "name"]
    );

    // Focus is on "visibility" after the last Tab
    press(&mut session, KeyCode::BackTab);
    press(&mut session, KeyCode::BackTab);
    assert_eq!(
        session.focused_field().map(|f| f.action_id()),
        Some("cancel".to_string())
    );
}

#[test]
fn test_readonly_select_cycles_and_ignores_typing() {
    let mut session = rendered(mixed_spec());
    assert!(session.focus_key("visibility"));

    press(&mut session, KeyCode::Right);
    assert_eq!(session.value("visibility"), Some(FieldValue::from("public")));
    press(&mut session, KeyCode::Left);
    assert_eq!(session.value("visibility"), Some(FieldValue::from("local")));
    type_text(&mut session, "x");
    assert_eq!(session.value("visibility"), Some(FieldValue::from("local")));
}

#[test]
fn test_space_toggles_checkbox() {
    let mut session = rendered(mixed_spec());
    assert!(session.focus_key("notify"));
    press(&mut session, KeyCode::Char(' '));
    assert_eq!(session.value("notify"), Some(FieldValue::Bool(true)));
}

#[test]
fn test_ctrl_u_clears_text() {
    let mut session = rendered(mixed_spec());
    session
        .handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL))
        .expect("clear");
    assert_eq!(session.value("name"), Some(FieldValue::from("")));
}

#[test]
fn test_help_overlay_swallows_keys() {
    let mut session = rendered(mixed_spec());
    press(&mut session, KeyCode::F(1));
    assert_eq!(session.key_mode(), KeyMode::Help);

    type_text(&mut session, "zz");
    press(&mut session, KeyCode::Esc);
    assert_eq!(session.key_mode(), KeyMode::Form);
    assert_eq!(session.state(), DialogState::Rendered);
    assert_eq!(session.value("name"), Some(FieldValue::from("octo")));
}

// =============================================================================
// Tooltips, rebuild and teardown
// =============================================================================

#[test]
fn test_tooltip_follows_value_without_help() {
    let spec = DialogBuilder::new("Tips")
        .add_text("name", "octo", FieldOptions::at(0, 0))
        .add_text("branch", "main", FieldOptions::at(1, 0).help("Initial branch."))
        .build()
        .expect("spec");
    let mut session = rendered(spec);

    assert_eq!(session.tooltip_text("name").as_deref(), Some("octo"));
    session.set_value("name", "hubot").expect("set");
    assert_eq!(session.tooltip_text("name").as_deref(), Some("hubot"));

    session.set_value("branch", "dev").expect("set");
    assert_eq!(session.tooltip_text("branch").as_deref(), Some("Initial branch."));
}

#[test]
fn test_rebuild_preserves_values() {
    let spec = mixed_spec();
    let mut preserved = BTreeMap::new();
    preserved.insert("name".to_string(), FieldValue::from("kept"));
    preserved.insert("notify".to_string(), FieldValue::Bool(true));
    preserved.insert("gone".to_string(), FieldValue::from("ignored"));
    preserved.insert("visibility".to_string(), FieldValue::Absent);

    let session = FormSession::rebuild(spec, ctx(), &preserved).expect("rebuild");
    assert_eq!(session.state(), DialogState::Rendered);
    assert_eq!(session.value("name"), Some(FieldValue::from("kept")));
    assert_eq!(session.value("notify"), Some(FieldValue::Bool(true)));
    assert_eq!(session.value("visibility"), Some(FieldValue::from("local")));
}

#[test]
fn test_set_value_type_mismatch() {
    let mut session = rendered(mixed_spec());
    assert!(matches!(
        session.set_value("notify", "yes"),
        Err(DialogTransitionError::ValueMismatch { .. })
    ));
    assert!(matches!(
        session.set_value("missing", "x"),
        Err(DialogTransitionError::UnknownField { .. })
    ));
}

#[test]
fn test_teardown_releases_subscriptions() {
    let mut session = rendered(mixed_spec());
    assert!(session.subscription_count() > 0);

    session.teardown();
    assert!(session.is_torn_down());
    assert_eq!(session.subscription_count(), 0);
    assert!(session.elements().is_empty());
    assert!(session.value("name").is_none());

    // Idempotent
    session.teardown();
    assert!(session.is_torn_down());
}

#[test]
fn test_finish_after_submit_tears_down() {
    let mut session = rendered(name_spec());
    session.submit().expect("submit");
    let result = session.finish().expect("finish");
    assert_eq!(result.get("name"), Some(&FieldValue::from("octo")));
}
