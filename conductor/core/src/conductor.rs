//! Conductor - The Application State
//!
//! The Conductor owns everything a chat surface displays: the session, the
//! reply waiting to be revealed, the live reveal, which messages are expanded
//! and how wide the viewport is. Surfaces change it only by sending
//! [`SurfaceEvent`]s, and learn about changes only through
//! [`ConductorMessage`]s.
//!
//! # Time
//!
//! The Conductor never reads a clock. The owner calls [`Conductor::advance_to`]
//! with a logical time, and every reply and reveal step due by then runs in
//! order. Tests drive it with exact times; the TUI maps a monotonic clock onto
//! the same axis.

use std::collections::HashSet;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::ConductorConfig;
use crate::events::SurfaceEvent;
use crate::layout::{LayoutGenerator, ViewportClass};
use crate::messages::{ConductorMessage, ConductorState, MessageId};
use crate::responder::ResponseSource;
use crate::reveal::{RevealEvent, RevealScheduler, RevealState};
use crate::session::Session;

/// Errors surfaced by the Conductor
#[derive(Debug, Error)]
pub enum ConductorError {
    /// The surface dropped its receiver
    #[error("Surface disconnected")]
    SurfaceDisconnected,
}

/// A reply waiting out the thinking delay
#[derive(Clone, Debug, PartialEq, Eq)]
struct PendingReply {
    due: Duration,
    prompt: String,
}

/// The Conductor - headless application state
pub struct Conductor<S: ResponseSource> {
    /// Configuration
    config: ConductorConfig,
    /// Reply text source
    responder: S,
    /// Finalized conversation
    session: Session,
    /// Reveal state machine
    scheduler: RevealScheduler,
    /// Reply armed by the last submit
    pending_reply: Option<PendingReply>,
    /// Messages the user expanded
    expanded: HashSet<MessageId>,
    /// Last reported viewport width
    viewport_width: Option<u32>,
    /// Current operational state
    state: ConductorState,
    /// Channel to send messages to UI surface
    tx: mpsc::UnboundedSender<ConductorMessage>,
}

impl<S: ResponseSource> Conductor<S> {
    /// Create a new Conductor with the given response source
    pub fn new(
        responder: S,
        config: ConductorConfig,
        tx: mpsc::UnboundedSender<ConductorMessage>,
    ) -> Self {
        let generator = match config.layout_seed {
            Some(seed) => LayoutGenerator::with_seed(seed),
            None => LayoutGenerator::from_entropy(),
        };
        let scheduler = RevealScheduler::new(config.timing, generator);

        Self {
            config,
            responder,
            session: Session::new(),
            scheduler,
            pending_reply: None,
            expanded: HashSet::new(),
            viewport_width: None,
            state: ConductorState::Ready,
            tx,
        }
    }

    /// Get current state
    #[must_use]
    pub fn state(&self) -> ConductorState {
        self.state
    }

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &ConductorConfig {
        &self.config
    }

    /// The finalized conversation
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The live reveal, if one is running
    #[must_use]
    pub fn reveal(&self) -> Option<&RevealState> {
        self.scheduler.reveal()
    }

    /// Current logical time
    #[must_use]
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Whether a reply is waiting out the thinking delay
    #[must_use]
    pub fn has_pending_reply(&self) -> bool {
        self.pending_reply.is_some()
    }

    /// Whether a message is expanded
    #[must_use]
    pub fn is_expanded(&self, id: &MessageId) -> bool {
        self.expanded.contains(id)
    }

    /// Viewport class for the last reported width
    ///
    /// Standard until a surface reports its size.
    #[must_use]
    pub fn viewport_class(&self) -> ViewportClass {
        self.viewport_width
            .map(|w| ViewportClass::from_width(w, self.config.compact_max_width))
            .unwrap_or_default()
    }

    /// Earliest logical time at which something will happen
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        let reply = self.pending_reply.as_ref().map(|p| p.due);
        let step = self.scheduler.pending().map(|c| c.due);
        match (reply, step) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Announce the current state to a freshly attached surface
    ///
    /// # Errors
    ///
    /// Returns [`ConductorError::SurfaceDisconnected`] if the surface is gone.
    pub fn start(&mut self) -> Result<(), ConductorError> {
        tracing::info!(
            tick_ms = self.config.timing.tick_interval.as_millis() as u64,
            compact_max_width = self.config.compact_max_width,
            "Conductor started"
        );
        self.send(ConductorMessage::State { state: self.state })
    }

    /// Handle an event from the UI surface
    ///
    /// # Errors
    ///
    /// Returns [`ConductorError::SurfaceDisconnected`] if the surface is gone.
    pub fn handle_event(&mut self, event: SurfaceEvent) -> Result<(), ConductorError> {
        match event {
            SurfaceEvent::UserMessage { content } => self.handle_user_message(&content),

            SurfaceEvent::ToggleMessage { message_id } => {
                if self.session.get_message(&message_id).is_none() {
                    tracing::debug!(message_id = %message_id, "Toggle for unknown message ignored");
                    return Ok(());
                }
                let expanded = if self.expanded.remove(&message_id) {
                    false
                } else {
                    self.expanded.insert(message_id.clone());
                    true
                };
                self.send(ConductorMessage::ExpansionChanged {
                    message_id,
                    expanded,
                })
            }

            SurfaceEvent::Resized { width, height } => {
                tracing::debug!(width, height, "Viewport resized");
                self.viewport_width = Some(width);
                Ok(())
            }

            SurfaceEvent::QuitRequested => self.shutdown(),
        }
    }

    /// Run everything due at or before `time`
    ///
    /// # Errors
    ///
    /// Returns [`ConductorError::SurfaceDisconnected`] if the surface is gone.
    pub fn advance_to(&mut self, time: Duration) -> Result<(), ConductorError> {
        while let Some(due) = self
            .pending_reply
            .as_ref()
            .map(|p| p.due)
            .filter(|due| *due <= time)
        {
            let events = self.scheduler.advance_to(due, &mut self.session);
            self.dispatch(events)?;

            if let Some(reply) = self.pending_reply.take() {
                self.start_reply(&reply.prompt)?;
            }
        }

        let events = self.scheduler.advance_to(time, &mut self.session);
        self.dispatch(events)
    }

    /// Cancel everything and tell the surface to quit
    ///
    /// # Errors
    ///
    /// Returns [`ConductorError::SurfaceDisconnected`] if the surface is gone.
    pub fn shutdown(&mut self) -> Result<(), ConductorError> {
        self.pending_reply = None;
        let events: Vec<RevealEvent> = self.scheduler.cancel().into_iter().collect();
        self.dispatch(events)?;
        self.set_state(ConductorState::ShuttingDown)?;
        self.send(ConductorMessage::Quit)
    }

    /// Handle user message
    fn handle_user_message(&mut self, content: &str) -> Result<(), ConductorError> {
        let text = content.trim();
        if text.is_empty() {
            tracing::debug!("Ignoring empty submit");
            return Ok(());
        }
        if self.state == ConductorState::ShuttingDown {
            return Ok(());
        }

        if self.pending_reply.take().is_some() {
            tracing::debug!("Pending reply replaced by new submit");
        }
        let events: Vec<RevealEvent> = self.scheduler.cancel().into_iter().collect();
        self.dispatch(events)?;

        self.session.add_user_message(text.to_string());
        self.flush_appended()?;

        let due = self.now() + self.config.thinking_delay;
        tracing::debug!(due_ms = due.as_millis() as u64, "Reply armed");
        self.pending_reply = Some(PendingReply {
            due,
            prompt: text.to_string(),
        });
        self.set_state(ConductorState::Thinking)?;

        // A zero thinking delay starts the reveal right away.
        self.advance_to(self.now())
    }

    /// Fetch the reply and start revealing it
    fn start_reply(&mut self, prompt: &str) -> Result<(), ConductorError> {
        let text = self.responder.respond(prompt);
        let viewport = self.viewport_class();
        let events = self.scheduler.start(&text, viewport);
        self.dispatch(events)
    }

    /// Translate scheduler events into surface messages
    fn dispatch(&mut self, events: Vec<RevealEvent>) -> Result<(), ConductorError> {
        for event in events {
            match event {
                RevealEvent::Started {
                    layout,
                    sentence_count,
                    viewport,
                    ..
                } => {
                    self.send(ConductorMessage::RevealStarted {
                        layout,
                        sentence_count,
                        viewport,
                    })?;
                    self.set_state(ConductorState::Revealing)?;
                }
                RevealEvent::SentenceRevealed {
                    index, sentence, ..
                } => {
                    self.send(ConductorMessage::SentenceRevealed { index, sentence })?;
                }
                RevealEvent::Settling { .. } => {
                    self.send(ConductorMessage::RevealSettling)?;
                    self.set_state(ConductorState::Settling)?;
                }
                RevealEvent::Committed { .. } => {
                    self.flush_appended()?;
                    self.set_state(ConductorState::Ready)?;
                }
                RevealEvent::Cancelled { revealed, .. } => {
                    self.send(ConductorMessage::RevealCancelled { revealed })?;
                }
            }
        }
        Ok(())
    }

    /// Announce messages the session gained since the last flush
    fn flush_appended(&mut self) -> Result<(), ConductorError> {
        for message in self.session.drain_appended() {
            self.send(ConductorMessage::MessageAppended { message })?;
        }
        Ok(())
    }

    /// Set state and notify UI
    fn set_state(&mut self, state: ConductorState) -> Result<(), ConductorError> {
        self.state = state;
        self.send(ConductorMessage::State { state })
    }

    /// Send a message to the UI surface
    fn send(&self, msg: ConductorMessage) -> Result<(), ConductorError> {
        self.tx.send(msg).map_err(|_| {
            tracing::warn!("Failed to send message to surface");
            ConductorError::SurfaceDisconnected
        })
    }
}
