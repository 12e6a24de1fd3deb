//! Session Management
//!
//! The finalized conversation: user submissions and committed replies, in
//! order. The message list lives behind an `Arc` and every write replaces it
//! copy-on-write, so a snapshot handed to a surface never changes underneath
//! it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::layout::Layout;
use crate::messages::{MessageId, MessageRole};
use crate::reveal::{CommitSink, FinishedReveal};
use crate::sentence::Sentence;

/// A message in the conversation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: MessageId,
    /// Who sent this message
    pub role: MessageRole,
    /// Message content
    pub text: String,
    /// When the message was created (Unix timestamp ms)
    pub timestamp: u64,
    /// Revealed sentences (committed replies only)
    #[serde(default)]
    pub sentences: Option<Vec<Sentence>>,
    /// Grid the sentences were revealed into (committed replies only)
    #[serde(default)]
    pub layout: Option<Layout>,
}

impl Message {
    /// Create a user message
    pub fn user(text: String) -> Self {
        Self {
            id: MessageId::new(),
            role: MessageRole::User,
            text,
            timestamp: now_ms(),
            sentences: None,
            layout: None,
        }
    }

    /// Create an assistant message from a finished reveal
    pub fn assistant(reveal: FinishedReveal) -> Self {
        Self {
            id: MessageId::new(),
            role: MessageRole::Assistant,
            text: reveal.text,
            timestamp: now_ms(),
            sentences: Some(reveal.sentences),
            layout: Some(reveal.layout),
        }
    }

    /// Whether the user sent this message
    #[must_use]
    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}

/// A conversation session
#[derive(Clone, Debug, Default)]
pub struct Session {
    messages: Arc<Vec<Message>>,
    /// Messages appended since the last [`Session::drain_appended`]
    appended: Vec<Message>,
}

impl Session {
    /// Create an empty session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current message list
    ///
    /// The returned snapshot is immutable; later writes produce a new list.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Vec<Message>> {
        Arc::clone(&self.messages)
    }

    /// Record a user submission
    pub fn add_user_message(&mut self, text: String) -> MessageId {
        self.push(Message::user(text))
    }

    /// Look up a message by id
    #[must_use]
    pub fn get_message(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    /// The user message an assistant message replies to
    ///
    /// Only a user message immediately preceding the reply counts.
    #[must_use]
    pub fn prompt_for(&self, reply: &MessageId) -> Option<&Message> {
        let index = self.messages.iter().position(|m| &m.id == reply)?;
        if self.messages[index].is_user() {
            return None;
        }
        index
            .checked_sub(1)
            .map(|i| &self.messages[i])
            .filter(|m| m.is_user())
    }

    /// All messages
    #[must_use]
    pub fn all_messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Take the messages appended since the last call
    pub fn drain_appended(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.appended)
    }

    fn push(&mut self, message: Message) -> MessageId {
        let id = message.id.clone();
        self.appended.push(message.clone());
        Arc::make_mut(&mut self.messages).push(message);
        id
    }
}

impl CommitSink for Session {
    fn commit(&mut self, reveal: FinishedReveal) -> MessageId {
        self.push(Message::assistant(reveal))
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
