//! Mint view: strategy editor and session panel.

use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::config::KeyBindings;
use crate::mint::{MintSession, MintStage};
use crate::state::{AppState, Store};
use crate::ui::Layout;

/// Mint view widget.
pub struct MintPanel;

impl MintPanel {
    /// Render the editor and the session panel side by side.
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        store: &Store,
        keys: &KeyBindings,
        max_chars: usize,
    ) {
        let (editor_area, session_area) = Layout::mint_columns(area);
        render_editor(frame, editor_area, &store.app, max_chars);
        render_session(frame, session_area, &store.mint, keys);
    }
}

fn render_editor(frame: &mut Frame, area: Rect, app: &AppState, max_chars: usize) {
    let len = app.input_len();
    let counter_style = if len > max_chars {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let border_color = if app.is_editing() {
        Color::Yellow
    } else {
        Color::Cyan
    };

    let block = Block::default()
        .title(" Strategy ")
        .title_bottom(
            Line::from(Span::styled(format!(" {len}/{max_chars} "), counter_style))
                .right_aligned(),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);

    let (row, col) = cursor_row_col(&app.input_buffer, app.cursor_position);
    let scroll = row.saturating_sub(inner.height.saturating_sub(1));

    let paragraph = if app.input_buffer.is_empty() && !app.is_editing() {
        Paragraph::new(Line::from(Span::styled(
            "Describe your trading strategy in plain language...",
            Style::default().fg(Color::DarkGray),
        )))
    } else {
        Paragraph::new(app.input_buffer.as_str())
    };

    frame.render_widget(paragraph.block(block).scroll((scroll, 0)), area);

    if app.is_editing() && inner.width > 0 && inner.height > 0 {
        let x = inner.x + col.min(inner.width - 1);
        let y = inner.y + (row - scroll).min(inner.height - 1);
        frame.set_cursor_position(Position::new(x, y));
    }
}

fn render_session(frame: &mut Frame, area: Rect, session: &MintSession, keys: &KeyBindings) {
    let mut lines = vec![Line::from(vec![
        Span::styled("Stage: ", Style::default().fg(Color::DarkGray)),
        Span::styled(session.stage.to_string(), stage_style(session.stage)),
    ])];

    if session.has_errors() {
        lines.push(Line::from(""));
        for error in &session.errors {
            lines.push(Line::from(Span::styled(
                format!("✗ {error}"),
                Style::default().fg(Color::Red),
            )));
        }
    }

    if let Some(id) = &session.duplicate_id {
        lines.push(Line::from(Span::styled(
            format!("Duplicate of strategy #{id}"),
            Style::default().fg(Color::Magenta),
        )));
    }

    if let Some(warning) = &session.warning {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("⚠ {warning}"),
            Style::default().fg(Color::Yellow),
        )));
    }

    lines.push(Line::from(""));
    let hint = if session.stage.is_busy() {
        "Please wait, the mint is in progress.".to_string()
    } else {
        format!(
            "{} edit · {} mint · {} clear",
            keys.edit, keys.submit, keys.clear
        )
    };
    lines.push(Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))));

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(" Mint ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(paragraph, area);
}

fn stage_style(stage: MintStage) -> Style {
    match stage {
        MintStage::Idle => Style::default().fg(Color::White),
        MintStage::Validating | MintStage::Minting | MintStage::Finalizing => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    }
}

/// Row and column of the cursor, counted in characters.
fn cursor_row_col(text: &str, cursor: usize) -> (u16, u16) {
    let before: String = text.chars().take(cursor).collect();
    let row = before.matches('\n').count();
    let col = before
        .rsplit('\n')
        .next()
        .map(|line| line.chars().count())
        .unwrap_or(0);
    (
        u16::try_from(row).unwrap_or(u16::MAX),
        u16::try_from(col).unwrap_or(u16::MAX),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_row_col() {
        assert_eq!(cursor_row_col("", 0), (0, 0));
        assert_eq!(cursor_row_col("buy", 3), (0, 3));
        assert_eq!(cursor_row_col("buy\nhold", 6), (1, 2));
        assert_eq!(cursor_row_col("a\n\n", 3), (2, 0));
        assert_eq!(cursor_row_col("é\nü", 3), (1, 1));
    }
}
