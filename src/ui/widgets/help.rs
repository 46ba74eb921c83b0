//! Help panel widget.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::super::layout::centered_rect;
use crate::config::KeyBindings;

/// Help panel showing keybindings.
pub struct HelpPanel;

impl HelpPanel {
    /// Render the help panel.
    pub fn render(frame: &mut Frame, area: Rect, keys: &KeyBindings) {
        let popup_area = centered_rect(60, 80, area);

        // Clear the area behind the popup
        frame.render_widget(Clear, popup_area);

        let mut lines = Vec::new();
        section(&mut lines, "Views");
        entry(&mut lines, &keys.mint, "Mint a strategy");
        entry(&mut lines, &keys.strategies, "Your strategies");
        entry(&mut lines, &keys.back, "Back / close");

        section(&mut lines, "Minting");
        entry(&mut lines, &keys.edit, "Edit strategy text");
        entry(&mut lines, "Esc", "Stop editing");
        entry(&mut lines, &keys.submit, "Validate and mint");
        entry(&mut lines, &keys.clear, "Clear strategy text");

        section(&mut lines, "Strategies");
        entry(&mut lines, &format!("{}/↓", keys.down), "Move down");
        entry(&mut lines, &format!("{}/↑", keys.up), "Move up");
        entry(&mut lines, "Home/End", "Go to top / bottom");
        entry(&mut lines, &keys.refresh, "Refresh list");

        section(&mut lines, "General");
        entry(&mut lines, &keys.help, "Toggle help");
        entry(&mut lines, &keys.quit, "Quit");

        let help = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(" Help ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            )
            .style(Style::default().fg(Color::White));

        frame.render_widget(help, popup_area);
    }
}

fn section(lines: &mut Vec<Line<'static>>, title: &'static str) {
    if !lines.is_empty() {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        title,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )));
}

fn entry(lines: &mut Vec<Line<'static>>, key: &str, description: &'static str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:<10}", key), Style::default().fg(Color::Cyan)),
        Span::raw(description),
    ]));
}
