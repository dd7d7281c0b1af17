//! In-memory transport

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::communication::mailer::{Message, Transport, TransportError};

/// Keeps sent messages in memory instead of delivering them
#[derive(Clone, Debug, Default)]
pub struct InMemoryTransport {
    messages: Arc<Mutex<Vec<Message>>>,
}

impl InMemoryTransport {
    /// Create an empty in-memory transport
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Message>> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The most recently sent message
    pub fn last_message(&self) -> Option<Message> {
        self.lock().last().cloned()
    }

    /// Every message sent so far, oldest first
    pub fn messages(&self) -> Vec<Message> {
        self.lock().clone()
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn send(&self, message: Message) -> Result<(), TransportError> {
        self.lock().push(message);
        Ok(())
    }
}
