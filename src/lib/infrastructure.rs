//! Infrastructure layer: configuration, templates and concrete transports.

pub mod config;
pub mod email;
pub mod templates;
