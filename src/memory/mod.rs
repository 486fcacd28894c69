pub mod message;

pub use message::{Message, MessageId, Sender};

/// Append-only, in-memory history of one conversation.
/// Insertion order is chronological order; nothing is ever removed.
#[derive(Debug, Default)]
pub struct ConversationLog {
    messages: Vec<Message>,
    last_id: u64,
}

#[allow(dead_code)]
impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a message with the next id and store it
    pub fn append(&mut self, sender: Sender, text: impl Into<String>) -> MessageId {
        self.last_id += 1;
        let id = MessageId::new(self.last_id);
        self.messages.push(Message::new(id, sender, text.into()));
        id
    }

    /// All messages in insertion order
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
