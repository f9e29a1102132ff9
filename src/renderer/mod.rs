//! Modal form renderer
//!
//! [`FormDialog`] puts a [`FormSession`] on a terminal: it enters raw mode
//! and the alternate screen, draws after every event and returns the
//! [`FormResult`] once the session reaches a terminal state.

pub mod draw;
pub mod elements;
pub mod events;
pub mod layout;
pub mod session;

use crate::context::FormContext;
use crate::error::{FormError, Result};
use crate::result::FormResult;
use crate::spec::FormSpec;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use events::{CrosstermEvents, EventSource};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use session::FormSession;
use std::io::stdout;

pub use session::{ButtonOutcome, CancelTrigger, DialogState, DialogTransitionError, SubmitOutcome};

/// A form dialog ready to be shown
pub struct FormDialog {
    spec: FormSpec,
    ctx: FormContext,
}

impl FormDialog {
    pub fn new(spec: FormSpec) -> Self {
        Self {
            spec,
            ctx: FormContext::from_env(),
        }
    }

    pub fn with_context(mut self, ctx: FormContext) -> Self {
        self.ctx = ctx;
        self
    }

    pub fn spec(&self) -> &FormSpec {
        &self.spec
    }

    /// Show the dialog on the controlling terminal and block until it closes
    ///
    /// # Errors
    ///
    /// Terminal setup or event read failures, and construction errors found
    /// while building the live elements.
    pub fn show(self) -> Result<FormResult> {
        tracing::debug!(title = %self.spec.title(), "Initializing terminal for dialog");
        let _guard = TerminalGuard::enter()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))
            .map_err(|e| FormError::terminal(format!("Failed to create terminal: {}", e)))?;
        let mut events = CrosstermEvents::new()?;
        self.show_on(&mut terminal, &mut events)
    }

    /// Run the dialog on any backend, pulling events from `events`
    pub fn show_on<B: Backend>(
        self,
        terminal: &mut Terminal<B>,
        events: &mut dyn EventSource,
    ) -> Result<FormResult> {
        let mut session = FormSession::new(self.spec, self.ctx);
        session.render()?;
        if session.context().is_debug() {
            session.log_debug_snapshot();
        }

        loop {
            terminal.draw(|f| draw::draw(f, &session))?;
            let event = events.next_event()?;
            session.handle_event(event)?;
            if session.state().is_terminal() {
                break;
            }
        }

        let result = session.finish()?;
        tracing::info!(cancelled = result.cancelled, fields = result.values.len(), "Dialog closed");
        Ok(result)
    }
}

/// Raw mode plus alternate screen, restored on drop
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()
            .map_err(|e| FormError::terminal(format!("Failed to enable raw mode: {}", e)))?;
        if let Err(e) = crossterm::execute!(stdout(), crossterm::terminal::EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(FormError::terminal(format!(
                "Failed to enter alternate screen: {}",
                e
            )));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Always attempt cleanup, even if the dialog failed
        let _ = disable_raw_mode();
        let _ = crossterm::execute!(
            stdout(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::cursor::Show
        );
    }
}
