//! Status bar widget.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::state::Store;

/// Status bar widget.
pub struct StatusBar;

impl StatusBar {
    /// Render the status bar.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let auth_status = if store.app.signed_in {
            Span::styled("● Signed in", Style::default().fg(Color::Green))
        } else {
            Span::styled("○ Signed out", Style::default().fg(Color::Red))
        };

        let wallet_status = if store.app.wallet_available {
            Span::styled("● Wallet", Style::default().fg(Color::Green))
        } else {
            Span::styled("○ No wallet", Style::default().fg(Color::Yellow))
        };

        let stage = if store.mint.stage.is_busy() {
            Span::styled(
                format!(" {}… ", store.mint.stage),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            )
        } else {
            Span::raw("")
        };

        let loading = if store.strategies.loading {
            Span::styled(
                " Loading... ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            )
        } else {
            Span::raw("")
        };

        let help_hint = Span::styled(" Press ? for help ", Style::default().fg(Color::Gray));

        let mut spans = vec![
            Span::styled(
                " Gammabots ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            auth_status,
            Span::raw(" | "),
            wallet_status,
            Span::raw(" |"),
            stage,
            loading,
        ];

        // Right-align the help hint
        let left_width: usize = spans.iter().map(|s| s.width()).sum();
        let padding = (area.width as usize).saturating_sub(left_width + help_hint.width());
        spans.push(Span::raw(" ".repeat(padding)));
        spans.push(help_hint);

        let paragraph =
            Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));

        frame.render_widget(paragraph, area);
    }
}
