//! TUI widgets.

mod help;
mod mint_panel;
mod notifications;
mod status_bar;
mod strategy_list;
mod tab_bar;

pub use help::HelpPanel;
pub use mint_panel::MintPanel;
pub use notifications::{render_error, render_notification};
pub use status_bar::StatusBar;
pub use strategy_list::StrategyList;
pub use tab_bar::TabBar;
