//! Display State Types
//!
//! Types that represent the current display state for the TUI.
//! These are derived from ConductorMessages and used for rendering.
//!
//! - DisplayMessage: A finalized conversation message
//! - LiveReveal: The reply currently being revealed
//! - Exchange: A prompt paired with its reply, the unit the TUI renders

use std::collections::HashSet;
use std::time::Instant;

use humanlike_core::{
    ConductorMessage, ConductorState, Layout, Message, MessageId, MessageRole, Sentence,
    ViewportClass,
};

/// A finalized conversation message
#[derive(Clone, Debug)]
pub struct DisplayMessage {
    /// Unique message ID
    pub id: MessageId,
    /// Who sent this message
    pub role: DisplayRole,
    /// The message content
    pub text: String,
    /// Revealed sentences (replies only)
    pub sentences: Vec<Sentence>,
    /// Card grid (replies only)
    pub layout: Option<Layout>,
}

impl From<Message> for DisplayMessage {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            role: message.role.into(),
            text: message.text,
            sentences: message.sentences.unwrap_or_default(),
            layout: message.layout,
        }
    }
}

/// Display role for messages
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayRole {
    /// User input
    User,
    /// Revealed reply
    Assistant,
}

impl From<MessageRole> for DisplayRole {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::User => DisplayRole::User,
            MessageRole::Assistant => DisplayRole::Assistant,
        }
    }
}

/// A sentence card that has appeared
#[derive(Clone, Debug)]
pub struct RevealedCard {
    /// The sentence
    pub sentence: Sentence,
    /// When the card appeared (drives the entrance animation)
    pub revealed_at: Instant,
}

/// The reply currently being revealed
#[derive(Clone, Debug)]
pub struct LiveReveal {
    /// Grid the sentences fill
    pub layout: Layout,
    /// Total sentences expected
    pub sentence_count: usize,
    /// Viewport class the layout was generated for
    pub viewport: ViewportClass,
    /// Cards revealed so far, in order
    pub cards: Vec<RevealedCard>,
    /// Whether every card is out and the commit is pending
    pub settling: bool,
}

/// A user prompt and the reply that followed it
#[derive(Clone, Copy, Debug)]
pub struct Exchange<'a> {
    /// The prompt (absent for a reply with no prompt before it)
    pub prompt: Option<&'a DisplayMessage>,
    /// The committed reply, if there is one yet
    pub reply: Option<&'a DisplayMessage>,
}

/// The full display state for the TUI
#[derive(Debug, Default)]
pub struct DisplayState {
    /// Conversation messages
    pub messages: Vec<DisplayMessage>,
    /// Reply being revealed (if any)
    pub live: Option<LiveReveal>,
    /// Messages the user expanded
    pub expanded: HashSet<MessageId>,
    /// Conductor state
    pub conductor_state: ConductorState,
    /// Whether the Conductor asked us to quit
    pub quit_requested: bool,
}

impl DisplayState {
    /// Create a new display state
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a ConductorMessage to update display state
    pub fn apply_message(&mut self, msg: ConductorMessage) {
        match msg {
            // Conversation messages
            ConductorMessage::MessageAppended { message } => {
                if message.role == MessageRole::Assistant {
                    self.live = None;
                }
                self.messages.push(message.into());
            }

            // Reveal messages
            ConductorMessage::RevealStarted {
                layout,
                sentence_count,
                viewport,
            } => {
                self.live = Some(LiveReveal {
                    layout,
                    sentence_count,
                    viewport,
                    cards: Vec::with_capacity(sentence_count),
                    settling: false,
                });
            }
            ConductorMessage::SentenceRevealed { index, sentence } => {
                if let Some(live) = self.live.as_mut() {
                    if index == live.cards.len() {
                        live.cards.push(RevealedCard {
                            sentence,
                            revealed_at: Instant::now(),
                        });
                    } else {
                        tracing::warn!(index, have = live.cards.len(), "Out-of-order sentence");
                    }
                }
            }
            ConductorMessage::RevealSettling => {
                if let Some(live) = self.live.as_mut() {
                    live.settling = true;
                }
            }
            ConductorMessage::RevealCancelled { .. } => {
                self.live = None;
            }

            // System messages
            ConductorMessage::State { state } => {
                self.conductor_state = state;
            }
            ConductorMessage::ExpansionChanged {
                message_id,
                expanded,
            } => {
                if expanded {
                    self.expanded.insert(message_id);
                } else {
                    self.expanded.remove(&message_id);
                }
            }
            ConductorMessage::Quit => {
                // The app will handle quitting
                self.quit_requested = true;
            }
        }
    }

    /// Whether a message is expanded
    pub fn is_expanded(&self, id: &MessageId) -> bool {
        self.expanded.contains(id)
    }

    /// Group messages into prompt/reply exchanges, oldest first
    ///
    /// A user message directly followed by a reply forms one exchange. The
    /// newest prompt of a live reveal is its own exchange with no reply yet.
    pub fn exchanges(&self) -> Vec<Exchange<'_>> {
        let mut exchanges = Vec::new();
        let mut iter = self.messages.iter().peekable();

        while let Some(message) = iter.next() {
            match message.role {
                DisplayRole::User => {
                    let reply = iter.next_if(|next| next.role == DisplayRole::Assistant);
                    exchanges.push(Exchange {
                        prompt: Some(message),
                        reply,
                    });
                }
                DisplayRole::Assistant => exchanges.push(Exchange {
                    prompt: None,
                    reply: Some(message),
                }),
            }
        }

        exchanges
    }

    /// Ids of user messages, oldest first
    pub fn user_message_ids(&self) -> Vec<MessageId> {
        self.messages
            .iter()
            .filter(|m| m.role == DisplayRole::User)
            .map(|m| m.id.clone())
            .collect()
    }

    /// Check if a reply is being revealed
    pub fn is_revealing(&self) -> bool {
        self.live.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use humanlike_core::sentence::split;
    use humanlike_core::{GridRow, Message, MessageRole};
    use pretty_assertions::assert_eq;

    fn user(text: &str) -> Message {
        Message {
            id: MessageId::new(),
            role: MessageRole::User,
            text: text.to_string(),
            timestamp: 0,
            sentences: None,
            layout: None,
        }
    }

    fn reply(text: &str) -> Message {
        let sentences = split(text);
        let layout = Layout::from_rows(vec![GridRow::new(vec![1_u8; sentences.len()])]);
        Message {
            id: MessageId::new(),
            role: MessageRole::Assistant,
            text: text.to_string(),
            timestamp: 0,
            sentences: Some(sentences),
            layout: Some(layout),
        }
    }

    fn started(count: u8) -> ConductorMessage {
        ConductorMessage::RevealStarted {
            layout: Layout::from_rows(vec![GridRow::new(vec![1_u8; usize::from(count)])]),
            sentence_count: usize::from(count),
            viewport: ViewportClass::Standard,
        }
    }

    // ========================================================================
    // DisplayState Tests
    // ========================================================================

    #[test]
    fn test_display_state_default() {
        let state = DisplayState::new();
        assert!(state.messages.is_empty());
        assert!(state.live.is_none());
        assert_eq!(state.conductor_state, ConductorState::Ready);
        assert!(!state.quit_requested);
    }

    #[test]
    fn test_display_state_apply_message() {
        let mut state = DisplayState::new();
        let msg = user("Hello");
        let id = msg.id.clone();
        state.apply_message(ConductorMessage::MessageAppended { message: msg });
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].text, "Hello");
        assert_eq!(state.messages[0].id, id);
        assert_eq!(state.messages[0].role, DisplayRole::User);
    }

    #[test]
    fn test_live_reveal_lifecycle() {
        let mut state = DisplayState::new();
        state.apply_message(started(2));
        let sentences = split("One. Two.");
        for (index, sentence) in sentences.iter().cloned().enumerate() {
            state.apply_message(ConductorMessage::SentenceRevealed { index, sentence });
        }
        state.apply_message(ConductorMessage::RevealSettling);

        let live = state.live.as_ref().expect("live reveal");
        assert_eq!(live.cards.len(), 2);
        assert!(live.settling);

        state.apply_message(ConductorMessage::MessageAppended {
            message: reply("One. Two."),
        });
        assert!(state.live.is_none());
        assert_eq!(state.messages[0].sentences.len(), 2);
    }

    #[test]
    fn test_out_of_order_sentence_ignored() {
        let mut state = DisplayState::new();
        state.apply_message(started(3));
        let sentence = split("Late.").remove(0);
        state.apply_message(ConductorMessage::SentenceRevealed { index: 2, sentence });
        assert_eq!(state.live.as_ref().map(|l| l.cards.len()), Some(0));
    }

    #[test]
    fn test_cancel_clears_live() {
        let mut state = DisplayState::new();
        state.apply_message(started(3));
        state.apply_message(ConductorMessage::RevealCancelled { revealed: 1 });
        assert!(!state.is_revealing());
    }

    #[test]
    fn test_expansion_changed() {
        let mut state = DisplayState::new();
        let id = MessageId::new();
        state.apply_message(ConductorMessage::ExpansionChanged {
            message_id: id.clone(),
            expanded: true,
        });
        assert!(state.is_expanded(&id));
        state.apply_message(ConductorMessage::ExpansionChanged {
            message_id: id.clone(),
            expanded: false,
        });
        assert!(!state.is_expanded(&id));
    }

    #[test]
    fn test_exchanges_pair_prompt_and_reply() {
        let mut state = DisplayState::new();
        for message in [user("a"), reply("A."), user("b"), user("c"), reply("C.")] {
            state.apply_message(ConductorMessage::MessageAppended { message });
        }

        let shape: Vec<(Option<&str>, Option<&str>)> = state
            .exchanges()
            .iter()
            .map(|e| {
                (
                    e.prompt.map(|m| m.text.as_str()),
                    e.reply.map(|m| m.text.as_str()),
                )
            })
            .collect();
        assert_eq!(
            shape,
            vec![
                (Some("a"), Some("A.")),
                (Some("b"), None),
                (Some("c"), Some("C.")),
            ]
        );
    }

    #[test]
    fn test_display_state_conductor_state() {
        let mut state = DisplayState::new();
        state.apply_message(ConductorMessage::State {
            state: ConductorState::Thinking,
        });
        assert_eq!(state.conductor_state, ConductorState::Thinking);
    }

    #[test]
    fn test_display_state_quit_message() {
        let mut state = DisplayState::new();
        state.apply_message(ConductorMessage::Quit);
        assert!(state.quit_requested);
    }
}
