//! Humanlike TUI - Terminal surface for the sentence reveal core
//!
//! A full-screen chat where each reply appears one sentence card at a time
//! inside a randomly generated grid.
//!
//! # Architecture
//!
//! - **ConductorClient**: Embeds the Conductor and drives its logical clock
//! - **Display**: State rebuilt from ConductorMessages
//! - **Widgets**: The sentence card grid
//! - **Theme**: Card palette and chrome colours

pub mod app;
pub mod conductor_client;
pub mod display;
pub mod theme;
pub mod widgets;

pub use app::App;
