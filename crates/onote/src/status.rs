use onote_core::EditError;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Info,
    Success,
    Warning,
    Error,
}

impl MessageType {
    fn lifetime(self) -> Duration {
        match self {
            MessageType::Info => Duration::from_secs(3),
            MessageType::Success => Duration::from_secs(2),
            MessageType::Warning => Duration::from_secs(5),
            MessageType::Error => Duration::from_secs(7),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub content: String,
    pub message_type: MessageType,
    pub created_at: Instant,
    pub lifetime: Option<Duration>,
}

impl StatusMessage {
    pub fn new(content: impl Into<String>, message_type: MessageType) -> Self {
        Self {
            content: content.into(),
            message_type,
            created_at: Instant::now(),
            lifetime: Some(message_type.lifetime()),
        }
    }

    /// Stays until replaced or cleared.
    pub fn sticky(content: impl Into<String>, message_type: MessageType) -> Self {
        Self {
            lifetime: None,
            ..Self::new(content, message_type)
        }
    }

    pub fn is_expired(&self) -> bool {
        self.lifetime
            .map(|lifetime| self.created_at.elapsed() > lifetime)
            .unwrap_or(false)
    }
}

/// The one-line message area under the document.
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    current: Option<StatusMessage>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.set(StatusMessage::new(message, MessageType::Info));
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.set(StatusMessage::new(message, MessageType::Success));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.set(StatusMessage::new(message, MessageType::Warning));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.set(StatusMessage::new(message, MessageType::Error));
    }

    pub fn set(&mut self, message: StatusMessage) {
        self.current = Some(message);
    }

    /// Shows an engine notice. Engine notices are never errors: an empty
    /// history or a rejected position is just information for the user.
    pub fn notice(&mut self, notice: &EditError) {
        let message_type = match notice {
            EditError::OutOfRange { .. } => MessageType::Warning,
            EditError::EmptyHistory(_) | EditError::NotFound(_) => MessageType::Info,
        };
        self.set(StatusMessage::new(notice.to_string(), message_type));
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Drops the message once its lifetime has passed.
    pub fn tick(&mut self) {
        if self.current.as_ref().is_some_and(StatusMessage::is_expired) {
            self.current = None;
        }
    }

    pub fn current(&self) -> Option<&StatusMessage> {
        self.current.as_ref()
    }

    pub fn has_message(&self) -> bool {
        self.current.is_some()
    }
}
