//! Yes/no confirmation popup
//!
//! Used to ask whether to proceed despite validation warnings. "No" sits on
//! the left and is selected initially.

use super::popup_area;
use crate::theme::{Colors, Styles};
use crate::validation::ValidationIssue;
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Outer width of the popup, borders included
const PROMPT_WIDTH: u16 = 56;

/// Confirmation prompt state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub message: String,
    /// `true` = "Yes" selected
    pub selected_yes: bool,
}

impl ConfirmPrompt {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            selected_yes: false,
        }
    }

    /// Prompt listing every warning as a bullet
    pub fn for_warnings<'a>(warnings: impl IntoIterator<Item = &'a ValidationIssue>) -> Self {
        Self::new("Warning", warning_message(warnings))
    }

    pub fn toggle(&mut self) {
        self.selected_yes = !self.selected_yes;
    }

    pub fn render(&self, f: &mut Frame, parent: Rect) {
        let inner_width = PROMPT_WIDTH.min(parent.width).saturating_sub(2);
        let message = wrap_text(&self.message, usize::from(inner_width));
        // Message, blank line, buttons, two borders
        let height = u16::try_from(message.len())
            .unwrap_or(u16::MAX)
            .saturating_add(4);
        let area = popup_area(parent, PROMPT_WIDTH, height);

        f.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(Colors::WARNING))
            .style(Style::default().bg(Colors::BG_DANGER));

        let button = |label: &str, selected: bool| {
            let style = if selected {
                Styles::selected()
            } else {
                Style::default().fg(Colors::FG_SECONDARY)
            };
            Span::styled(format!("[ {label} ]"), style)
        };

        let mut lines: Vec<Line> = message.into_iter().map(Line::from).collect();
        lines.push(Line::from(""));
        lines.push(
            Line::from(vec![
                button("No", !self.selected_yes),
                Span::raw("  "),
                button("Yes", self.selected_yes),
            ])
            .alignment(Alignment::Center),
        );

        f.render_widget(Paragraph::new(lines).block(block), area);
    }
}

/// Word-wrap `text` to `width` columns, keeping its own line breaks.
/// Words longer than a line are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    for source in text.lines() {
        let mut line = String::new();
        let mut len = 0;
        for word in source.split_whitespace() {
            let word_len = word.chars().count();
            if len > 0 && len + 1 + word_len > width {
                out.push(std::mem::take(&mut line));
                len = 0;
            }
            if len > 0 {
                line.push(' ');
                len += 1;
            }
            for ch in word.chars() {
                if len == width {
                    out.push(std::mem::take(&mut line));
                    len = 0;
                }
                line.push(ch);
                len += 1;
            }
        }
        out.push(line);
    }
    out
}

/// "The following warnings were found:" followed by one bullet per warning
pub fn warning_message<'a>(warnings: impl IntoIterator<Item = &'a ValidationIssue>) -> String {
    let bullets: Vec<String> = warnings
        .into_iter()
        .map(|w| format!("\u{2022} {}", w.message))
        .collect();
    format!(
        "The following warnings were found:\n\n{}\n\nProceed anyway?",
        bullets.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Severity;

    #[test]
    fn test_warning_message_format() {
        let issues = vec![
            ValidationIssue {
                severity: Severity::Warning,
                field_key: "name".into(),
                message: "Contains spaces; this may cause issues.".into(),
            },
            ValidationIssue {
                severity: Severity::Warning,
                field_key: "branch".into(),
                message: "Unusual branch".into(),
            },
        ];
        assert_eq!(
            warning_message(&issues),
            "The following warnings were found:\n\n\u{2022} Contains spaces; this may cause issues.\n\u{2022} Unusual branch\n\nProceed anyway?"
        );
    }

    #[test]
    fn test_wrap_text_breaks_long_lines() {
        assert_eq!(
            wrap_text("one two three four", 9),
            vec!["one two", "three", "four"]
        );
        assert_eq!(wrap_text("a\n\nb", 10), vec!["a", "", "b"]);
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_defaults_to_no() {
        let mut prompt = ConfirmPrompt::new("Warning", "Proceed?");
        assert!(!prompt.selected_yes);
        prompt.toggle();
        assert!(prompt.selected_yes);
    }
}
