//! Email transports built from configuration

mod delivery;
mod memory;

use async_trait::async_trait;
use lettre::{AsyncFileTransport, AsyncSendmailTransport, AsyncSmtpTransport, Tokio1Executor};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

pub use delivery::{
    build_message, ConnectionClass, ConnectionConfig, FileOptions, LettreTransport, SendmailOptions,
    SmtpOptions, SslMode,
};
pub use memory::InMemoryTransport;

use crate::{
    domain::communication::{
        mailer::{Message, Transport, TransportError},
        placeholders,
    },
    infrastructure::config::{ConfigError, TransportKind, TransportSettings},
};

/// A transport selected by [`TransportSettings`]
#[derive(Clone, Debug)]
pub enum ConfiguredTransport {
    /// SMTP relay
    Smtp(LettreTransport<AsyncSmtpTransport<Tokio1Executor>>),

    /// Local sendmail binary
    Sendmail(LettreTransport<AsyncSendmailTransport<Tokio1Executor>>),

    /// Messages written to a directory
    File(LettreTransport<AsyncFileTransport<Tokio1Executor>>),

    /// Messages kept in memory
    InMemory(InMemoryTransport),
}

impl ConfiguredTransport {
    /// Build the transport described by `settings`
    ///
    /// `%KEY%` tokens in the options are replaced with the matching variables
    /// before the options are read.
    pub fn from_settings(settings: &TransportSettings) -> Result<Self, ConfigError> {
        let options = transport_options(settings);

        debug!(kind = %settings.kind, "building transport");

        let transport = match settings.kind {
            TransportKind::Smtp => {
                let options: SmtpOptions = parse_options(settings.kind, options)?;
                Self::Smtp(LettreTransport::new(options.transport()?))
            }
            TransportKind::Sendmail => {
                let options: SendmailOptions = parse_options(settings.kind, options)?;
                Self::Sendmail(LettreTransport::new(options.transport()))
            }
            TransportKind::File => {
                let options: FileOptions = parse_options(settings.kind, options)?;
                Self::File(LettreTransport::new(options.transport()))
            }
            TransportKind::InMemory => Self::InMemory(InMemoryTransport::new()),
        };

        Ok(transport)
    }

    /// The kind of this transport
    pub fn kind(&self) -> TransportKind {
        match self {
            Self::Smtp(_) => TransportKind::Smtp,
            Self::Sendmail(_) => TransportKind::Sendmail,
            Self::File(_) => TransportKind::File,
            Self::InMemory(_) => TransportKind::InMemory,
        }
    }
}

#[async_trait]
impl Transport for ConfiguredTransport {
    async fn send(&self, message: Message) -> Result<(), TransportError> {
        match self {
            Self::Smtp(transport) => transport.send(message).await,
            Self::Sendmail(transport) => transport.send(message).await,
            Self::File(transport) => transport.send(message).await,
            Self::InMemory(transport) => transport.send(message).await,
        }
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(values) => values.is_empty(),
        _ => false,
    }
}

/// The options of `settings` with variables substituted
pub fn transport_options(settings: &TransportSettings) -> Value {
    if is_empty(&settings.options) || settings.variables.is_empty() {
        return settings.options.clone();
    }

    placeholders::resolve(&settings.options, &settings.variables)
}

fn parse_options<O>(kind: TransportKind, options: Value) -> Result<O, ConfigError>
where
    O: DeserializeOwned + Default,
{
    if is_empty(&options) {
        return Ok(O::default());
    }

    serde_json::from_value(options).map_err(|e| ConfigError::InvalidTransportOptions {
        kind,
        reason: e.to_string(),
    })
}
