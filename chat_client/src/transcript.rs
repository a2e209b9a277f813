use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

use crate::relay_client::{ChatReply, RelayCallError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Ai,
    Error,
}

impl Sender {
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Ai => "AI",
            Sender::Error => "Error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    /// ISO-8601, either generated locally or echoed from the relay.
    pub timestamp: String,
}

impl ChatMessage {
    fn new(text: String, sender: Sender, timestamp: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            sender,
            timestamp,
        }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Session-local chat state. At most one relay call is outstanding at a time.
#[derive(Debug, Default)]
pub struct ChatState {
    messages: Vec<ChatMessage>,
    input: String,
    pending: bool,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Moves the input into the transcript and returns the text to send.
    /// Returns `None` without touching anything when the input is blank or
    /// a reply is still pending.
    pub fn submit(&mut self) -> Option<String> {
        let text = self.input.trim();
        if text.is_empty() || self.pending {
            return None;
        }
        let text = text.to_string();
        self.input.clear();
        self.messages
            .push(ChatMessage::new(text.clone(), Sender::User, now()));
        self.pending = true;
        Some(text)
    }

    pub fn settle(&mut self, outcome: Result<ChatReply, RelayCallError>) {
        let message = match outcome {
            Ok(reply) => ChatMessage::new(reply.message, Sender::Ai, reply.timestamp),
            Err(e) => ChatMessage::new(e.to_string(), Sender::Error, now()),
        };
        self.messages.push(message);
        self.pending = false;
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
