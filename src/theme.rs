//! Centralized theme and styling for dialogs
//!
//! Single source of truth for the colours and styles used to draw forms.
//!
//! # Usage
//! ```rust
//! use formdialog::theme::{Colors, Styles, Theme};
//! use formdialog::validation::Severity;
//! use ratatui::style::Style;
//!
//! let style = Style::default().fg(Colors::PRIMARY);
//! let title_style = Styles::title();
//! let error_style = Theme::severity_style(Severity::Error);
//! # let _ = (style, title_style, error_style);
//! ```

use crate::spec::{FontHint, FontSlant, FontWeight};
use crate::validation::Severity;
use ratatui::style::{Color, Modifier, Style};

// =============================================================================
// COLOR PALETTE
// =============================================================================

/// Core color palette
pub struct Colors;

impl Colors {
    // -------------------------------------------------------------------------
    // Base Colors (backgrounds, foregrounds)
    // -------------------------------------------------------------------------

    /// Dialog background
    pub const BG_PRIMARY: Color = Color::Rgb(20, 20, 30);

    /// Input field background
    pub const BG_INPUT: Color = Color::Rgb(35, 35, 48);

    /// Warning prompt background
    pub const BG_DANGER: Color = Color::Rgb(30, 20, 20);

    /// Default foreground text color
    pub const FG_PRIMARY: Color = Color::White;

    /// Secondary text color
    pub const FG_SECONDARY: Color = Color::Gray;

    /// Disabled/inactive text color
    pub const FG_MUTED: Color = Color::DarkGray;

    // -------------------------------------------------------------------------
    // Accent Colors
    // -------------------------------------------------------------------------

    /// Borders, titles, highlights
    pub const PRIMARY: Color = Color::Cyan;

    // -------------------------------------------------------------------------
    // Semantic Colors
    // -------------------------------------------------------------------------

    pub const SUCCESS: Color = Color::Green;

    pub const WARNING: Color = Color::Yellow;

    pub const ERROR: Color = Color::Red;

    // -------------------------------------------------------------------------
    // UI Element Colors
    // -------------------------------------------------------------------------

    /// Focused element border
    pub const BORDER_ACTIVE: Color = Color::Cyan;

    /// Unfocused border and separator
    pub const BORDER_INACTIVE: Color = Color::DarkGray;

    /// Selected item highlight
    pub const SELECTED_BG: Color = Color::Yellow;

    /// Selected item text (for contrast on yellow bg)
    pub const SELECTED_FG: Color = Color::Black;
}

// =============================================================================
// PRE-BUILT STYLES
// =============================================================================

/// Pre-built styles for common UI patterns
pub struct Styles;

impl Styles {
    /// Default text style
    pub fn text() -> Style {
        Style::default().fg(Colors::FG_PRIMARY)
    }

    /// Muted/secondary text
    pub fn text_muted() -> Style {
        Style::default().fg(Colors::FG_MUTED)
    }

    /// Dialog title (cyan, bold)
    pub fn title() -> Style {
        Style::default()
            .fg(Colors::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_active() -> Style {
        Style::default().fg(Colors::BORDER_ACTIVE)
    }

    pub fn border_inactive() -> Style {
        Style::default().fg(Colors::BORDER_INACTIVE)
    }

    pub fn panel_bg() -> Style {
        Style::default().bg(Colors::BG_PRIMARY)
    }

    /// Unfocused input
    pub fn input() -> Style {
        Style::default().fg(Colors::FG_PRIMARY).bg(Colors::BG_INPUT)
    }

    /// Focused input
    pub fn input_focused() -> Style {
        Style::default()
            .fg(Colors::FG_PRIMARY)
            .bg(Colors::BG_INPUT)
            .add_modifier(Modifier::UNDERLINED)
    }

    /// Selected/highlighted item
    pub fn selected() -> Style {
        Style::default()
            .fg(Colors::SELECTED_FG)
            .bg(Colors::SELECTED_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Focused label or checkbox
    pub fn focused() -> Style {
        Style::default()
            .fg(Colors::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Focused button
    pub fn button_active() -> Style {
        Style::default()
            .fg(Colors::SELECTED_FG)
            .bg(Colors::FG_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Unfocused button
    pub fn button_inactive() -> Style {
        Style::default().fg(Colors::FG_PRIMARY)
    }

    /// Key hints in the bottom border
    pub fn nav_hint() -> Style {
        Style::default().fg(Colors::FG_MUTED)
    }

    /// Tooltip line
    pub fn hint() -> Style {
        Style::default()
            .fg(Colors::FG_SECONDARY)
            .add_modifier(Modifier::ITALIC)
    }
}

// =============================================================================
// THEME CONTEXT
// =============================================================================

/// Semantic style lookups
pub struct Theme;

impl Theme {
    /// Text style for a validation severity
    pub fn severity_style(severity: Severity) -> Style {
        match severity {
            Severity::Error => Style::default().fg(Colors::ERROR),
            Severity::Warning => Style::default().fg(Colors::WARNING),
            Severity::Ok => Style::default().fg(Colors::SUCCESS),
        }
    }

    /// Terminal modifiers for a font hint, layered on `base`
    pub fn font_style(base: Style, font: FontHint) -> Style {
        let mut modifiers = Modifier::empty();
        if font.weight == FontWeight::Bold {
            modifiers |= Modifier::BOLD;
        }
        if font.slant == FontSlant::Italic {
            modifiers |= Modifier::ITALIC;
        }
        if font.underline {
            modifiers |= Modifier::UNDERLINED;
        }
        if font.overstrike {
            modifiers |= Modifier::CROSSED_OUT;
        }
        base.add_modifier(modifiers)
    }
}
