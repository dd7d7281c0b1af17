//! Mailer module
//!
//! The mail service is a facade over message composition: it resolves the
//! address fields of a [`Message`] from [`SendOptions`], renders the body
//! through a [`Renderer`] and hands the result to a [`Transport`].

mod errors;
mod message;
mod options;
mod renderer;
mod service;
mod transport;

pub use errors::{MailError, RenderError, TransportError, ValidationError};
pub use message::{AddressField, Body, Headers, Mailbox, Message, Part, TEXT_HTML, TEXT_PLAIN};
pub use options::{AddressOption, SendOptions};
pub use renderer::{Renderer, Variables};
pub use service::{MailService, MailServiceImpl};
pub use transport::Transport;

#[cfg(test)]
pub mod tests {
    pub use super::renderer::MockRenderer;
    pub use super::service::MockMailService;
    pub use super::transport::MockTransport;
}
