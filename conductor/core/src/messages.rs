//! Conductor Messages
//!
//! Messages sent from the Conductor to UI surfaces. A surface never decides
//! when a sentence appears or when a reply is committed; it renders what these
//! messages tell it.

use serde::{Deserialize, Serialize};

use crate::layout::{Layout, ViewportClass};
use crate::sentence::Sentence;
use crate::session::Message;

/// Messages from Conductor to UI Surface
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConductorMessage {
    // ============================================
    // Conversation Messages
    // ============================================
    /// A message was added to the session (user submit or committed reply)
    MessageAppended {
        /// The new message
        message: Message,
    },

    // ============================================
    // Reveal Messages
    // ============================================
    /// A reply started revealing
    RevealStarted {
        /// Grid the sentences will fill
        layout: Layout,
        /// Number of sentences to reveal
        sentence_count: usize,
        /// Viewport class the layout was generated for
        viewport: ViewportClass,
    },

    /// One more sentence card is visible
    SentenceRevealed {
        /// Position of the sentence in the reply
        index: usize,
        /// The sentence
        sentence: Sentence,
    },

    /// All cards are out; the reply is about to be committed
    RevealSettling,

    /// The live reveal was discarded without committing
    RevealCancelled {
        /// How many sentences had been revealed
        revealed: usize,
    },

    // ============================================
    // System Messages
    // ============================================
    /// Conductor state change
    State {
        /// The new state
        state: ConductorState,
    },

    /// A message was expanded or collapsed
    ExpansionChanged {
        /// The toggled message
        message_id: MessageId,
        /// Whether it is now expanded
        expanded: bool,
    },

    /// Request surface to quit
    Quit,
}

/// Message identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generate a new unique message ID
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        Self(format!("msg_{id}"))
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who sent a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    /// User input
    User,
    /// Revealed reply
    Assistant,
}

/// Conductor operational states
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConductorState {
    /// Ready for input
    #[default]
    Ready,
    /// Waiting before the reply starts revealing
    Thinking,
    /// Sentence cards are appearing
    Revealing,
    /// Every card is out, commit pending
    Settling,
    /// Shutting down
    ShuttingDown,
}

impl ConductorState {
    /// Human-readable description
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Thinking => "Thinking...",
            Self::Revealing => "Revealing...",
            Self::Settling => "Settling...",
            Self::ShuttingDown => "Shutting down...",
        }
    }

    /// Whether a reply is on its way
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Thinking | Self::Revealing | Self::Settling)
    }
}
