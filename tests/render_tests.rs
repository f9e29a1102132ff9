//! Headless rendering tests
//!
//! Run the full `show_on` loop against ratatui's `TestBackend` with a
//! scripted event source, and inspect drawn frames.

use crossterm::event::KeyCode;
use formdialog::builder::{DialogBuilder, FieldOptions};
use formdialog::renderer::draw::{dialog_area, draw, row_heights};
use formdialog::renderer::session::FormSession;
use formdialog::validation::{ValidationReport, Validator};
use formdialog::{FieldValue, FormContext, FormDialog, FormEvent, FormSpec, ScriptedEvents};
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::Terminal;

fn terminal() -> Terminal<TestBackend> {
    Terminal::new(TestBackend::new(100, 30)).expect("terminal")
}

fn screen_text(buffer: &Buffer) -> Vec<String> {
    let area = buffer.area;
    (area.top()..area.bottom())
        .map(|y| {
            (area.left()..area.right())
                .map(|x| buffer[(x, y)].symbol())
                .collect::<String>()
        })
        .collect()
}

fn contains(lines: &[String], needle: &str) -> bool {
    lines.iter().any(|line| line.contains(needle))
}

fn profile_spec() -> FormSpec {
    DialogBuilder::new("Profile")
        .add_label("Account", FieldOptions::at(0, 0).bold())
        .add_text(
            "name",
            "octo",
            FieldOptions::at(1, 0)
                .label("Name")
                .help("Your display name.")
                .validator(Validator::required()),
        )
        .add_checkbox("notify", true, FieldOptions::at(2, 0).label("Notify me"))
        .add_button("Submit", FieldOptions::default())
        .add_button("Cancel", FieldOptions::default())
        .build()
        .expect("spec")
}

fn draw_session(session: &FormSession) -> Vec<String> {
    let mut terminal = terminal();
    terminal.draw(|f| draw(f, session)).expect("draw");
    screen_text(terminal.backend().buffer())
}

// =============================================================================
// show_on loop
// =============================================================================

#[test]
fn test_show_on_submits_typed_value() {
    let mut events = ScriptedEvents::new(
        [FormEvent::key(KeyCode::Backspace)]
            .into_iter()
            .chain(FormEvent::text("cat"))
            .chain([FormEvent::key(KeyCode::Enter)]),
    );
    let result = FormDialog::new(profile_spec())
        .with_context(FormContext::new("/"))
        .show_on(&mut terminal(), &mut events)
        .expect("show");

    assert!(!result.cancelled);
    assert_eq!(result.text("name"), Some("octcat"));
    assert_eq!(result.flag("notify"), Some(true));
    assert_eq!(events.remaining(), 0);
}

#[test]
fn test_show_on_exhausted_events_cancel() {
    let mut events = ScriptedEvents::new(FormEvent::text("zzz"));
    let result = FormDialog::new(profile_spec())
        .with_context(FormContext::new("/"))
        .show_on(&mut terminal(), &mut events)
        .expect("show");
    assert!(result.cancelled);
    assert!(result.values.is_empty());
}

#[test]
fn test_show_on_stops_reading_after_close() {
    let mut events = ScriptedEvents::new([
        FormEvent::key(KeyCode::Esc),
        FormEvent::key(KeyCode::Enter),
    ]);
    let result = FormDialog::new(profile_spec())
        .with_context(FormContext::new("/"))
        .show_on(&mut terminal(), &mut events)
        .expect("show");
    assert!(result.cancelled);
    assert_eq!(events.remaining(), 1);
}

#[test]
fn test_show_on_resize_is_harmless() {
    let mut events = ScriptedEvents::new([
        FormEvent::Resize(80, 24),
        FormEvent::key(KeyCode::Enter),
    ]);
    let result = FormDialog::new(profile_spec())
        .with_context(FormContext::new("/"))
        .show_on(&mut terminal(), &mut events)
        .expect("show");
    assert_eq!(result.text("name"), Some("octo"));
}

// =============================================================================
// Frames
// =============================================================================

#[test]
fn test_frame_shows_title_fields_and_buttons() {
    let mut session = FormSession::new(profile_spec(), FormContext::new("/"));
    session.render().expect("render");
    let lines = draw_session(&session);

    assert!(contains(&lines, "Profile"));
    assert!(contains(&lines, "Account"));
    assert!(contains(&lines, "Name"));
    assert!(contains(&lines, "octo"));
    assert!(contains(&lines, "[x] Notify me"));
    assert!(contains(&lines, "[ Submit ]  [ Cancel ]"));
    assert!(contains(&lines, "Your display name."));
    assert!(contains(&lines, "Tab: Next field"));
}

#[test]
fn test_inline_error_is_drawn_below_field() {
    let mut session = FormSession::new(profile_spec(), FormContext::new("/"));
    session.render().expect("render");
    session.set_value("name", "").expect("clear");
    session.submit().expect("submit");

    let lines = draw_session(&session);
    let field_row = lines
        .iter()
        .position(|l| l.contains("Name"))
        .expect("name row");
    assert!(lines[field_row + 1].contains("This field is required."));
}

#[test]
fn test_error_rows_collapse_when_empty() {
    let mut session = FormSession::new(profile_spec(), FormContext::new("/"));
    session.render().expect("render");
    let before: u16 = row_heights(&session).iter().sum();

    session.set_value("name", "").expect("clear");
    session.submit().expect("submit");
    let after: u16 = row_heights(&session).iter().sum();
    assert_eq!(after, before + 1);
}

#[test]
fn test_warning_prompt_is_drawn() {
    let spec = DialogBuilder::new("Repo")
        .add_text(
            "name",
            "my repo",
            FieldOptions::at(0, 0).validator(Validator::no_spaces_warning()),
        )
        .add_button("Submit", FieldOptions::default())
        .build()
        .expect("spec");
    let mut session = FormSession::new(spec, FormContext::new("/"));
    session.render().expect("render");
    session.submit().expect("submit");

    let lines = draw_session(&session);
    assert!(contains(&lines, "The following warnings were found:"));
    assert!(contains(&lines, "Contains spaces; this may cause issues."));
    assert!(contains(&lines, "[ No ]  [ Yes ]"));
}

#[test]
fn test_long_warning_keeps_buttons_visible() {
    let message = "This name is very long and will be shortened by some hosting providers, \
                   which can make the repository hard to find later on. Consider a shorter name.";
    let spec = DialogBuilder::new("Repo")
        .add_text(
            "name",
            "x",
            FieldOptions::at(0, 0).validator(Validator::new("long_warning", move |v, _| {
                ValidationReport::warning(message, v.clone())
            })),
        )
        .add_button("Submit", FieldOptions::default())
        .build()
        .expect("spec");
    let mut session = FormSession::new(spec, FormContext::new("/"));
    session.render().expect("render");
    session.submit().expect("submit");

    let lines = draw_session(&session);
    assert!(contains(&lines, "Consider a shorter name."));
    assert!(contains(&lines, "Proceed anyway?"));
    assert!(contains(&lines, "[ No ]  [ Yes ]"));
}

#[test]
fn test_help_overlay_is_drawn() {
    let mut session = FormSession::new(profile_spec(), FormContext::new("/"));
    session.render().expect("render");
    session
        .handle_event(FormEvent::key(KeyCode::F(1)))
        .expect("help");
    let lines = draw_session(&session);
    assert!(contains(&lines, "Press F1 or Esc to close"));
}

#[test]
fn test_dialog_respects_min_size_and_terminal() {
    let spec = profile_spec().with_min_size(640, 320);
    let mut session = FormSession::new(spec, FormContext::new("/"));
    session.render().expect("render");

    let area = dialog_area(&session, Rect::new(0, 0, 100, 30));
    assert_eq!((area.width, area.height), (80, 20));
    assert_eq!((area.x, area.y), (10, 5));

    let small = dialog_area(&session, Rect::new(0, 0, 40, 10));
    assert_eq!(small, Rect::new(0, 0, 40, 10));
}

#[test]
fn test_bound_value_is_drawn_after_button() {
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
    let mut session = FormSession::new(spec, FormContext::new("/"));
    session.render().expect("render");
    assert!(contains(&draw_session(&session), "[ Browse ]"));

    session.activate_button("browse").expect("browse");
    assert_eq!(session.value("directory"), Some(FieldValue::from("/tmp/x")));
    assert!(contains(&draw_session(&session), "/tmp/x"));
}
