//! Humanlike Core - Headless Sentence-Card Reveal
//!
//! This crate holds everything about revealing a reply one sentence card at a
//! time, with no dependency on any UI framework: splitting replies into
//! sentences, planning the grid the cards fill, scheduling the timed reveal,
//! and keeping the finalized conversation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         UI Surface                           │
//! │                     (TUI, tests, ...)                        │
//! │                           │                                  │
//! │                  SurfaceEvent (up)                           │
//! │                ConductorMessage (down)                       │
//! └───────────────────────────┼──────────────────────────────────┘
//!                             │
//! ┌───────────────────────────┼──────────────────────────────────┐
//! │                      HUMANLIKE CORE                          │
//! │  ┌────────────────────────┴───────────────────────────────┐  │
//! │  │                      Conductor                         │  │
//! │  │  ┌──────────┐  ┌────────────────┐  ┌───────────────┐   │  │
//! │  │  │ Session  │◄─│ RevealScheduler│  │ ResponseSource│   │  │
//! │  │  │  Store   │  │   + Timeline   │  │   (canned)    │   │  │
//! │  │  └──────────┘  └───────┬────────┘  └───────────────┘   │  │
//! │  │                ┌───────┴────────┐                      │  │
//! │  │                │ split + layout │                      │  │
//! │  │                └────────────────┘                      │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Conductor`]: Application state, mutated only through [`SurfaceEvent`]s
//! - [`RevealScheduler`]: Timed, cancellable reveal state machine
//! - [`LayoutGenerator`]: Random grid rows for a sentence count
//! - [`Session`]: Finalized messages with snapshot semantics
//!
//! # Quick Start
//!
//! ```
//! use std::time::Duration;
//!
//! use humanlike_core::{CannedResponder, Conductor, ConductorConfig, SurfaceEvent};
//! use tokio::sync::mpsc;
//!
//! let (tx, mut rx) = mpsc::unbounded_channel();
//! let mut conductor = Conductor::new(
//!     CannedResponder::new("Hello world. This is a test."),
//!     ConductorConfig::default(),
//!     tx,
//! );
//!
//! conductor.handle_event(SurfaceEvent::user_message("hi")).unwrap();
//! conductor.advance_to(Duration::from_secs(5)).unwrap();
//!
//! assert_eq!(conductor.session().message_count(), 2);
//! while let Ok(msg) = rx.try_recv() {
//!     // Render message to UI
//!     let _ = msg;
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`sentence`]: Naive sentence splitting and card colours
//! - [`layout`]: Grid rows and the layout generator
//! - [`reveal`]: Logical timeline and reveal scheduler
//! - [`session`]: Finalized conversation
//! - [`conductor`]: Application state and command handlers
//! - [`events`]: Events from UI surfaces to Conductor
//! - [`messages`]: Messages from Conductor to UI surfaces
//! - [`responder`]: Reply text sources
//! - [`animation`]: Card entrance timing and easing
//! - [`config`]: TOML and environment configuration
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework, and never sleeps or reads a clock to schedule work.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animation;
pub mod conductor;
pub mod config;
pub mod events;
pub mod layout;
pub mod messages;
pub mod responder;
pub mod reveal;
pub mod sentence;
pub mod session;

// Re-exports for convenience
pub use animation::{CardEntrance, EasingFunction};
pub use conductor::{Conductor, ConductorError};
pub use events::SurfaceEvent;
pub use layout::{GridRow, Layout, LayoutGenerator, Slot, ViewportClass};
pub use messages::{ConductorMessage, ConductorState, MessageId, MessageRole};
pub use responder::{CannedResponder, ResponseSource};
pub use reveal::{
    CommitSink, Continuation, Dispatch, Epoch, FinishedReveal, RevealEvent, RevealScheduler,
    RevealState, RevealStep, RevealTiming, SchedulerState, Timeline,
};
pub use sentence::{ColorTag, SequenceId, Sentence};
pub use session::{Message, Session};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConductorConfig, ConfigError,
    ConfigSource,
};
