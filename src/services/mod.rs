//! Supporting services: arithmetic, number formatting and command history.

pub mod calculator;
pub mod format;
pub mod history;

pub use calculator::Calculation;
pub use history::{CommandHistory, HistoryEntry};
