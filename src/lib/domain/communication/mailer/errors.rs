//! Mailer errors

use thiserror::Error;

/// Errors for send options that are missing or have the wrong shape
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required option is missing
    #[error("\"{0}\" parameter is missing from options")]
    MissingOption(&'static str),

    /// The `headers` option is not a mapping
    #[error("Header options must be a map of header name => value")]
    HeadersNotAMapping,

    /// The options could not be parsed
    #[error("Malformed options: {0}")]
    MalformedOptions(String),
}

/// Errors raised by a [`Renderer`](super::Renderer)
#[derive(Debug, Error)]
pub enum RenderError {
    /// The template does not exist
    #[error("Template \"{0}\" not found")]
    TemplateNotFound(String),

    /// Unknown error
    #[error(transparent)]
    UnknownError(#[from] anyhow::Error),
}

/// Errors raised by a [`Transport`](super::Transport)
#[derive(Debug, Error)]
pub enum TransportError {
    /// An address could not be used by the transport
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// A header could not be used by the transport
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Unknown error
    #[error(transparent)]
    UnknownError(#[from] anyhow::Error),
}

/// Mail service errors
#[derive(Debug, Error)]
pub enum MailError {
    /// The send options are invalid
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A feature was requested that is not implemented
    #[error("{0} are not supported yet")]
    Unsupported(&'static str),

    /// The renderer failed
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The transport failed
    #[error(transparent)]
    Transport(#[from] TransportError),
}
