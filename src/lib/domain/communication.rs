//! Communication module: message composition and transport option substitution.

pub mod mailer;
pub mod placeholders;
