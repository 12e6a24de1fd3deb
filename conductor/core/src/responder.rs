//! Response Sources
//!
//! Where reply text comes from. The shipped source is canned: every prompt
//! gets the same configured reply.

/// Reply used when nothing else is configured
pub const DEFAULT_RESPONSE: &str = "This is an example of response. This is another example. \
Here's a third sentence to demonstrate the effect. And finally, a fourth sentence with \
different styling. now it is a fifth response. sixth response to text. this is seventh response.";

/// Produces reply text for a prompt
pub trait ResponseSource {
    /// Reply to `prompt`
    fn respond(&mut self, prompt: &str) -> String;
}

/// Replies with fixed text regardless of the prompt
#[derive(Clone, Debug)]
pub struct CannedResponder {
    text: String,
}

impl CannedResponder {
    /// Create a responder that always replies with `text`
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for CannedResponder {
    fn default() -> Self {
        Self::new(DEFAULT_RESPONSE)
    }
}

impl ResponseSource for CannedResponder {
    fn respond(&mut self, prompt: &str) -> String {
        tracing::trace!(prompt_len = prompt.len(), "Canned reply");
        self.text.clone()
    }
}

impl<F> ResponseSource for F
where
    F: FnMut(&str) -> String,
{
    fn respond(&mut self, prompt: &str) -> String {
        self(prompt)
    }
}
