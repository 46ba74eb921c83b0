//! Event handling for Gammabots.
//!
//! Terminal input is polled and translated into store [`Action`]s by the
//! [`EventHandler`].
//!
//! [`Action`]: crate::state::Action

mod handler;
mod input;

pub use handler::EventHandler;
pub use input::{InputEvent, Key, Modifiers};
