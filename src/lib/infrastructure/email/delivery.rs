//! Delivery through lettre transports (SMTP, sendmail and file)

use std::{fmt, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use lettre::{
    message::{
        header::{ContentType, HeaderName, HeaderValue},
        Mailbox as LettreMailbox, MultiPart,
    },
    transport::smtp::{
        authentication::{Credentials, Mechanism},
        extension::ClientId,
    },
    Address, AsyncFileTransport, AsyncSendmailTransport, AsyncSmtpTransport, AsyncTransport,
    Message as LettreMessage, Tokio1Executor,
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    domain::communication::mailer::{AddressField, Body, Mailbox, Message, Transport, TransportError},
    infrastructure::config::{ConfigError, TransportKind},
};

impl From<lettre::error::Error> for TransportError {
    fn from(err: lettre::error::Error) -> Self {
        TransportError::UnknownError(err.into())
    }
}

/// A [`Transport`] sending through a lettre [`AsyncTransport`]
pub struct LettreTransport<T> {
    inner: Arc<T>,
}

impl<T> LettreTransport<T> {
    /// Wrap a lettre transport
    pub fn new(inner: T) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }
}

impl<T> Clone for LettreTransport<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for LettreTransport<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LettreTransport").finish_non_exhaustive()
    }
}

#[async_trait]
impl<T> Transport for LettreTransport<T>
where
    T: AsyncTransport + Send + Sync + 'static,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    async fn send(&self, message: Message) -> Result<(), TransportError> {
        let email = build_message(&message)?;

        match self.inner.send(email).await {
            Ok(_) => Ok(()),
            Err(e) => Err(TransportError::UnknownError(e.into())),
        }
    }
}

fn mailbox(mailbox: &Mailbox) -> Result<LettreMailbox, TransportError> {
    let email: Address = mailbox
        .email
        .parse()
        .map_err(|_| TransportError::InvalidAddress(mailbox.email.clone()))?;

    Ok(LettreMailbox::new(mailbox.name.clone(), email))
}

/// Convert a [`Message`] into a lettre message
///
/// A `Content-Type` header line is applied to a plain body and dropped for a
/// multipart body, which carries its own. Every other header line is copied
/// as is.
pub fn build_message(message: &Message) -> Result<LettreMessage, TransportError> {
    if let Some(encoding) = message.encoding() {
        if !encoding.eq_ignore_ascii_case("utf-8") {
            warn!(encoding, "messages are always encoded as UTF-8");
        }
    }

    let mut builder = LettreMessage::builder().subject(message.subject());

    for field in AddressField::ALL {
        for address in message.addresses(field) {
            let address = mailbox(address)?;

            builder = match field {
                AddressField::To => builder.to(address),
                AddressField::Cc => builder.cc(address),
                AddressField::Bcc => builder.bcc(address),
                AddressField::From => builder.from(address),
                AddressField::ReplyTo => builder.reply_to(address),
            };
        }
    }

    // More than one author needs a single `Sender`; the first one is it.
    if let [sender, _, ..] = message.from() {
        builder = builder.sender(mailbox(sender)?);
    }

    let mut content_type = None;

    for (name, value) in message.headers().iter() {
        if name.eq_ignore_ascii_case("Content-Type") {
            let parsed = ContentType::parse(value)
                .map_err(|_| TransportError::InvalidHeader(format!("{name}: {value}")))?;
            content_type = Some(parsed);
            continue;
        }

        let header = HeaderName::new_from_ascii(name.to_string())
            .map_err(|_| TransportError::InvalidHeader(name.to_string()))?;

        builder = builder.raw_header(HeaderValue::new(header, value.to_string()));
    }

    let email = match message.body() {
        Body::Plain(content) => {
            if let Some(content_type) = content_type {
                builder = builder.header(content_type);
            }

            builder.body(content.clone())?
        }
        Body::Multipart { text, html } => {
            if content_type.is_some() {
                debug!("dropping Content-Type header line from multipart message");
            }

            builder.multipart(MultiPart::alternative_plain_html(
                text.content.clone(),
                html.content.clone(),
            ))?
        }
    };

    Ok(email)
}

fn invalid(kind: TransportKind, reason: impl fmt::Display) -> ConfigError {
    ConfigError::InvalidTransportOptions {
        kind,
        reason: reason.to_string(),
    }
}

/// How the SMTP connection authenticates
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionClass {
    /// No authentication
    #[default]
    Smtp,

    /// `AUTH PLAIN`
    Plain,

    /// `AUTH LOGIN`
    Login,
}

/// Transport security of the SMTP connection
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SslMode {
    /// STARTTLS upgrade
    Tls,

    /// Implicit TLS
    Ssl,
}

/// Connection settings of the SMTP transport
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Transport security; plaintext when absent
    pub ssl: Option<SslMode>,

    /// The user name
    pub username: Option<String>,

    /// The password
    pub password: Option<String>,
}

/// Options of the SMTP transport
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SmtpOptions {
    /// The name sent with `EHLO`
    pub name: String,

    /// The SMTP host
    pub host: String,

    /// The SMTP port; the default of the security mode when absent
    pub port: Option<u16>,

    /// How to authenticate
    pub connection_class: ConnectionClass,

    /// Connection settings
    pub connection_config: ConnectionConfig,
}

impl Default for SmtpOptions {
    fn default() -> Self {
        Self {
            name: "localhost".to_string(),
            host: "127.0.0.1".to_string(),
            port: None,
            connection_class: ConnectionClass::default(),
            connection_config: ConnectionConfig::default(),
        }
    }
}

impl SmtpOptions {
    /// Build the SMTP transport
    pub fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, ConfigError> {
        let config = &self.connection_config;

        let mut builder = match config.ssl {
            Some(SslMode::Tls) => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
                .map_err(|e| invalid(TransportKind::Smtp, e))?,
            Some(SslMode::Ssl) => AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)
                .map_err(|e| invalid(TransportKind::Smtp, e))?,
            None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.host),
        };

        if let Some(port) = self.port {
            builder = builder.port(port);
        }

        builder = builder.hello_name(ClientId::Domain(self.name.clone()));

        let mechanism = match self.connection_class {
            ConnectionClass::Smtp => None,
            ConnectionClass::Plain => Some(Mechanism::Plain),
            ConnectionClass::Login => Some(Mechanism::Login),
        };

        if let Some(mechanism) = mechanism {
            let (Some(username), Some(password)) = (&config.username, &config.password) else {
                return Err(invalid(
                    TransportKind::Smtp,
                    "username and password are required to authenticate",
                ));
            };

            builder = builder
                .credentials(Credentials::new(username.clone(), password.clone()))
                .authentication(vec![mechanism]);
        }

        Ok(builder.build())
    }
}

/// Options of the sendmail transport
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SendmailOptions {
    /// The sendmail binary; looked up on `PATH` when absent
    pub path: Option<PathBuf>,
}

impl SendmailOptions {
    /// Build the sendmail transport
    pub fn transport(&self) -> AsyncSendmailTransport<Tokio1Executor> {
        match &self.path {
            Some(path) => AsyncSendmailTransport::<Tokio1Executor>::new_with_command(path.clone()),
            None => AsyncSendmailTransport::<Tokio1Executor>::new(),
        }
    }
}

/// Options of the file transport
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileOptions {
    /// The directory messages are written to
    pub path: PathBuf,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            path: std::env::temp_dir(),
        }
    }
}

impl FileOptions {
    /// Build the file transport
    pub fn transport(&self) -> AsyncFileTransport<Tokio1Executor> {
        AsyncFileTransport::<Tokio1Executor>::new(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use crate::domain::communication::mailer::{Part, TEXT_HTML};

    use super::*;

    fn message() -> Message {
        let mut message = Message::new();

        message.set_subject("Hello");
        message.set_from(vec![Mailbox::new("noreply@acme.org", Some("Acme".to_string()))]);
        message.set_to(vec![
            Mailbox::new("a@x.com", Some("A".to_string())),
            Mailbox::new("b@x.com", None),
        ]);
        message.set_bcc(vec![Mailbox::new("archive@acme.org", None)]);

        message
    }

    #[test]
    fn test_build_plain_message() -> TestResult {
        let mut message = message();
        message.headers_mut().add_header_line("Content-Type", TEXT_HTML);
        message.headers_mut().add_header_line("X-Foo", "Bar");
        message.set_body(Body::Plain("<p>Hi</p>".to_string()));

        let email = build_message(&message)?;

        assert_eq!(email.headers().get_raw("Subject"), Some("Hello"));
        assert_eq!(email.headers().get_raw("X-Foo"), Some("Bar"));
        assert_eq!(email.headers().get_raw("Content-Type"), Some("text/html"));

        let recipients: Vec<String> = email.envelope().to().iter().map(ToString::to_string).collect();

        assert_eq!(recipients, vec!["a@x.com", "b@x.com", "archive@acme.org"]);
        assert_eq!(
            email.envelope().from().map(ToString::to_string),
            Some("noreply@acme.org".to_string())
        );

        Ok(())
    }

    #[test]
    fn test_build_multipart_message() -> TestResult {
        let mut message = message();
        message.set_body(Body::Multipart {
            text: Part::plain("Hi"),
            html: Part::html("<p>Hi</p>"),
        });

        let formatted = String::from_utf8(build_message(&message)?.formatted())?;

        assert!(formatted.contains("multipart/alternative"));
        assert!(formatted.contains("text/plain"));
        assert!(formatted.contains("<p>Hi</p>"));

        Ok(())
    }

    #[test]
    fn test_invalid_address_is_rejected() {
        let mut message = message();
        message.set_cc(vec![Mailbox::new("not-an-address", None)]);

        let result = build_message(&message);

        assert!(matches!(
            result,
            Err(TransportError::InvalidAddress(address)) if address == "not-an-address"
        ));
    }

    #[test]
    fn test_invalid_header_name_is_rejected() {
        let mut message = message();
        message.headers_mut().add_header_line("X Foo", "Bar");

        let result = build_message(&message);

        assert!(matches!(result, Err(TransportError::InvalidHeader(_))));
    }

    #[test]
    fn test_message_without_sender_is_rejected() {
        let mut message = message();
        message.set_from(Vec::new());

        assert!(matches!(
            build_message(&message),
            Err(TransportError::UnknownError(_))
        ));
    }

    #[test]
    fn test_multiple_authors_set_sender() -> TestResult {
        let mut message = Message::new();

        message.set_subject("Hello");
        message.set_from(vec![
            Mailbox::new("f1@x.com", None),
            Mailbox::new("f2@x.com", Some("F2".to_string())),
        ]);
        message.set_to(vec![Mailbox::new("a@x.com", None)]);

        let email = build_message(&message)?;

        let from = email.headers().get_raw("From").ok_or("missing From")?;
        let sender = email.headers().get_raw("Sender").ok_or("missing Sender")?;

        assert!(from.contains("f1@x.com"));
        assert!(from.contains("f2@x.com"));
        assert!(sender.contains("f1@x.com"));
        assert!(!sender.contains("f2@x.com"));
        assert_eq!(
            email.envelope().from().map(ToString::to_string),
            Some("f1@x.com".to_string())
        );

        Ok(())
    }

    #[test]
    fn test_single_author_has_no_sender() -> TestResult {
        let email = build_message(&message())?;

        assert_eq!(email.headers().get_raw("Sender"), None);

        Ok(())
    }

    #[test]
    fn test_smtp_options_defaults() -> TestResult {
        let options: SmtpOptions = serde_json::from_value(json!({ "host": "smtp.acme.org" }))?;

        assert_eq!(options.name, "localhost");
        assert_eq!(options.host, "smtp.acme.org");
        assert_eq!(options.connection_class, ConnectionClass::Smtp);
        assert_eq!(options.connection_config, ConnectionConfig::default());

        Ok(())
    }

    #[test]
    fn test_smtp_options_parse_connection_config() -> TestResult {
        let options: SmtpOptions = serde_json::from_value(json!({
            "name": "gmail.com",
            "host": "smtp.gmail.com",
            "port": 587,
            "connection_class": "login",
            "connection_config": {
                "ssl": "tls",
                "username": "bob",
                "password": "secret",
            },
        }))?;

        assert_eq!(options.port, Some(587));
        assert_eq!(options.connection_class, ConnectionClass::Login);
        assert_eq!(options.connection_config.ssl, Some(SslMode::Tls));
        assert_eq!(options.connection_config.username.as_deref(), Some("bob"));

        Ok(())
    }

    #[tokio::test]
    async fn test_smtp_authentication_requires_credentials() -> TestResult {
        let options: SmtpOptions = serde_json::from_value(json!({ "connection_class": "plain" }))?;

        assert!(matches!(
            options.transport(),
            Err(ConfigError::InvalidTransportOptions {
                kind: TransportKind::Smtp,
                ..
            })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_smtp_implicit_tls_with_login() -> TestResult {
        let options: SmtpOptions = serde_json::from_value(json!({
            "host": "smtp.acme.org",
            "port": 465,
            "connection_class": "login",
            "connection_config": {
                "ssl": "ssl",
                "username": "bob",
                "password": "secret",
            },
        }))?;

        assert_eq!(options.connection_config.ssl, Some(SslMode::Ssl));
        assert!(options.transport().is_ok());

        Ok(())
    }

    #[tokio::test]
    async fn test_smtp_starttls_with_plain_auth() -> TestResult {
        let options: SmtpOptions = serde_json::from_value(json!({
            "host": "smtp.acme.org",
            "connection_class": "plain",
            "connection_config": {
                "ssl": "tls",
                "username": "bob",
                "password": "secret",
            },
        }))?;

        assert!(options.transport().is_ok());

        Ok(())
    }
}
