//! Surface Events
//!
//! Events sent from UI surfaces to the Conductor. Surfaces report what the
//! user did; the Conductor decides what it means.

use serde::{Deserialize, Serialize};

use crate::messages::MessageId;

/// Events from UI Surface to Conductor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceEvent {
    /// User submitted a message
    UserMessage {
        /// The raw input; trimmed by the Conductor
        content: String,
    },

    /// User toggled a message between collapsed and expanded
    ToggleMessage {
        /// The message to toggle
        message_id: MessageId,
    },

    /// Surface window/viewport resized
    Resized {
        /// New width (in surface-specific units)
        width: u32,
        /// New height (in surface-specific units)
        height: u32,
    },

    /// User asked to quit
    QuitRequested,
}

impl SurfaceEvent {
    /// Convenience constructor for a submit
    pub fn user_message(content: impl Into<String>) -> Self {
        Self::UserMessage {
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_constructor() {
        assert_eq!(
            SurfaceEvent::user_message("hi"),
            SurfaceEvent::UserMessage {
                content: "hi".to_string()
            }
        );
    }

    #[test]
    fn test_event_serializes() {
        let event = SurfaceEvent::Resized {
            width: 1024,
            height: 768,
        };
        let json = serde_json::to_string(&event).expect("serialize");
        assert!(json.contains("Resized"));
    }
}
