//! Strategy list widget.

use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use crate::api::MintStatus;
use crate::state::Store;

/// Strategy list widget.
pub struct StrategyList;

impl StrategyList {
    /// Render the strategy list.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let state = &store.strategies;

        let header_cells = ["Strategy", "Status", "Token", "Tx", "Created"].iter().map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });
        let header = Row::new(header_cells).height(1).bottom_margin(1);

        let rows = state.strategies.iter().map(|strategy| {
            let status_style = match strategy.mint_status {
                MintStatus::Confirmed => Style::default().fg(Color::Green),
                MintStatus::Pending => Style::default().fg(Color::Yellow),
                MintStatus::Failed => Style::default().fg(Color::Red),
            };

            let cells = vec![
                Cell::from(truncate_string(strategy.label(), 40)),
                Cell::from(strategy.mint_status.to_string()).style(status_style),
                Cell::from(
                    strategy
                        .token_id
                        .as_deref()
                        .map(|id| format!("#{id}"))
                        .unwrap_or_else(|| "-".to_string()),
                ),
                Cell::from(
                    strategy
                        .tx_hash
                        .as_deref()
                        .map(short_hash)
                        .unwrap_or_else(|| "-".to_string()),
                ),
                Cell::from(
                    strategy
                        .created_at
                        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_default(),
                ),
            ];

            Row::new(cells).height(1)
        });

        let title = format!(
            " Strategies ({}, {} minted, {} pending) ",
            state.strategies.len(),
            state.minted_count(),
            state.pending_count()
        );

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(40),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(14),
                Constraint::Length(17),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");

        let mut table_state = TableState::default();
        table_state.select(state.selected_index);

        frame.render_stateful_widget(table, area, &mut table_state);

        if state.loading {
            render_loading(frame, area);
        } else if state.strategies.is_empty() {
            render_empty(frame, area);
        }
    }
}

fn truncate_string(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

fn short_hash(hash: &str) -> String {
    if hash.len() <= 12 || !hash.is_ascii() {
        return hash.to_string();
    }
    format!("{}…{}", &hash[..6], &hash[hash.len() - 4..])
}

fn render_loading(frame: &mut Frame, area: Rect) {
    if area.width < 17 || area.height < 3 {
        return;
    }
    let loading = Line::from(Span::styled(
        "Loading...",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::ITALIC),
    ));

    // Bottom right, inside the border
    let loading_area = Rect {
        x: area.x + area.width - 16,
        y: area.y + area.height - 2,
        width: 15,
        height: 1,
    };

    frame.render_widget(Paragraph::new(loading), loading_area);
}

fn render_empty(frame: &mut Frame, area: Rect) {
    if area.height < 5 {
        return;
    }
    let hint = Paragraph::new(Line::from(Span::styled(
        "No strategies yet. Mint one from the Mint view.",
        Style::default().fg(Color::DarkGray),
    )));
    let hint_area = Rect {
        x: area.x + 2,
        y: area.y + 3,
        width: area.width.saturating_sub(4),
        height: 1,
    };
    frame.render_widget(hint, hint_area);
}
