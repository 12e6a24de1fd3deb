//! Conductor Client
//!
//! Thin wrapper around the Conductor for TUI integration.
//! This client embeds the Conductor directly (no network) and provides
//! a convenient interface for sending events and receiving messages.
//!
//! # Architecture
//!
//! The TUI is a "thin client" - it doesn't contain any business logic.
//! All reveal timing happens in the Conductor. The TUI's job is:
//! 1. Convert terminal events to SurfaceEvents
//! 2. Move the Conductor's logical clock along with real time
//! 3. Receive ConductorMessages
//! 4. Render display state based on messages

use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use humanlike_core::{
    CannedResponder, Conductor, ConductorConfig, ConductorMessage, ConductorState, MessageId,
    SurfaceEvent, ViewportClass,
};

/// Client for communicating with the embedded Conductor
pub struct ConductorClient {
    /// The embedded Conductor instance
    conductor: Conductor<CannedResponder>,
    /// Receiver for messages from Conductor
    rx: mpsc::UnboundedReceiver<ConductorMessage>,
    /// Real instant matching logical time zero
    origin: Instant,
    /// Viewport units per terminal column
    cell_width: u32,
}

impl ConductorClient {
    /// Create a new ConductorClient with embedded Conductor
    pub fn new(config: ConductorConfig) -> Self {
        // Create channel for Conductor -> TUI messages
        let (tx, rx) = mpsc::unbounded_channel();

        let responder = CannedResponder::new(config.response_text.clone());
        let cell_width = config.cell_width;
        let conductor = Conductor::new(responder, config, tx);

        Self {
            conductor,
            rx,
            origin: Instant::now(),
            cell_width,
        }
    }

    /// Start the Conductor
    pub fn start(&mut self) -> anyhow::Result<()> {
        self.conductor.start()?;
        Ok(())
    }

    /// Send a user message to the Conductor
    pub fn send_message(&mut self, content: String) -> anyhow::Result<()> {
        self.send_event(SurfaceEvent::UserMessage { content })
    }

    /// Expand or collapse a message
    pub fn toggle_message(&mut self, message_id: MessageId) -> anyhow::Result<()> {
        self.send_event(SurfaceEvent::ToggleMessage { message_id })
    }

    /// Notify Conductor that user wants to quit
    pub fn request_quit(&mut self) -> anyhow::Result<()> {
        self.send_event(SurfaceEvent::QuitRequested)
    }

    /// Notify Conductor of resize (terminal cells)
    pub fn resized(&mut self, columns: u16, rows: u16) -> anyhow::Result<()> {
        self.send_event(SurfaceEvent::Resized {
            width: u32::from(columns) * self.cell_width,
            height: u32::from(rows),
        })
    }

    /// Send raw surface event to Conductor
    pub fn send_event(&mut self, event: SurfaceEvent) -> anyhow::Result<()> {
        self.conductor.handle_event(event)?;
        Ok(())
    }

    /// Logical time elapsed since the client was created
    pub fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    /// Run everything due by now (must be called regularly)
    pub fn advance(&mut self) -> anyhow::Result<()> {
        let now = self.elapsed();
        self.advance_to(now)
    }

    /// Run everything due by logical time `time`
    pub fn advance_to(&mut self, time: Duration) -> anyhow::Result<()> {
        self.conductor.advance_to(time)?;
        Ok(())
    }

    /// Receive all pending messages from the Conductor (non-blocking)
    pub fn recv_all(&mut self) -> Vec<ConductorMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Get the current Conductor state
    pub fn state(&self) -> ConductorState {
        self.conductor.state()
    }

    /// Viewport class the next reveal will use
    pub fn viewport_class(&self) -> ViewportClass {
        self.conductor.viewport_class()
    }
}

impl Default for ConductorClient {
    fn default() -> Self {
        Self::new(ConductorConfig::default())
    }
}
