//! Custom widgets for the TUI

pub mod sentence_grid;

pub use sentence_grid::{GridCard, SentenceGrid};
