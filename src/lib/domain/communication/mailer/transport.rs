//! Mail transport

use async_trait::async_trait;

#[cfg(test)]
use mockall::mock;

use super::{errors::TransportError, message::Message};

/// Delivers composed messages
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Send a message
    ///
    /// # Arguments
    /// * `message` - The composed [`Message`].
    ///
    /// # Returns
    /// A [`Result`] indicating success or failure.
    async fn send(&self, message: Message) -> Result<(), TransportError>;
}

#[cfg(test)]
mock! {
    pub Transport {}

    #[async_trait]
    impl Transport for Transport {
        async fn send(&self, message: Message) -> Result<(), TransportError>;
    }
}
