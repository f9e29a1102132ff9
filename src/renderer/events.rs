//! Input event sources
//!
//! The dialog loop pulls `FormEvent`s from an [`EventSource`]. The terminal
//! source wraps crossterm and watches SIGTERM/SIGHUP; the scripted source
//! replays a fixed list and reports the window as closed once it runs dry.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use signal_hook::consts::signal::{SIGHUP, SIGTERM};
use signal_hook::SigId;
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Poll interval of the terminal event source
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Event delivered to a dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    /// The window was closed by platform-level means
    Closed,
}

impl FormEvent {
    /// A key press with no modifiers
    pub fn key(code: KeyCode) -> Self {
        Self::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    pub fn key_with(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self::Key(KeyEvent::new(code, modifiers))
    }

    /// One key press per character
    pub fn text(text: &str) -> Vec<Self> {
        text.chars().map(|c| Self::key(KeyCode::Char(c))).collect()
    }
}

/// Blocking source of dialog events
pub trait EventSource {
    /// Wait for the next event
    fn next_event(&mut self) -> io::Result<FormEvent>;
}

/// Terminal events from crossterm, plus SIGTERM/SIGHUP as `Closed`
pub struct CrosstermEvents {
    closed: Arc<AtomicBool>,
    signal_ids: Vec<SigId>,
}

impl CrosstermEvents {
    /// Register the signal watch
    pub fn new() -> io::Result<Self> {
        let closed = Arc::new(AtomicBool::new(false));
        let mut signal_ids = Vec::new();
        for signal in [SIGTERM, SIGHUP] {
            signal_ids.push(signal_hook::flag::register(signal, Arc::clone(&closed))?);
        }
        tracing::debug!("Registered SIGTERM/SIGHUP watch for dialog");
        Ok(Self { closed, signal_ids })
    }
}

impl EventSource for CrosstermEvents {
    fn next_event(&mut self) -> io::Result<FormEvent> {
        loop {
            if self.closed.load(Ordering::Relaxed) {
                tracing::info!("Termination signal received, closing dialog");
                return Ok(FormEvent::Closed);
            }
            if !crossterm::event::poll(POLL_INTERVAL)? {
                continue;
            }
            match crossterm::event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => return Ok(FormEvent::Key(key)),
                Event::Resize(width, height) => return Ok(FormEvent::Resize(width, height)),
                _ => {}
            }
        }
    }
}

impl Drop for CrosstermEvents {
    fn drop(&mut self) {
        for id in self.signal_ids.drain(..) {
            if !signal_hook::low_level::unregister(id) {
                tracing::warn!("Signal handler was already unregistered");
            }
        }
    }
}

/// Fixed event list, for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct ScriptedEvents {
    events: VecDeque<FormEvent>,
}

impl ScriptedEvents {
    pub fn new(events: impl IntoIterator<Item = FormEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl EventSource for ScriptedEvents {
    fn next_event(&mut self) -> io::Result<FormEvent> {
        Ok(self.events.pop_front().unwrap_or(FormEvent::Closed))
    }
}
