//! Mail configuration

use std::{fs, path::PathBuf};

use clap::Parser;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::communication::mailer::{Mailbox, Message};

/// Errors that can occur when loading configuration or building from it
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read
    #[error("could not read {}: {source}", .path.display())]
    Io {
        /// The settings file
        path: PathBuf,

        /// The underlying error
        source: std::io::Error,
    },

    /// The settings file is not valid
    #[error("could not parse {}: {source}", .path.display())]
    Parse {
        /// The settings file
        path: PathBuf,

        /// The underlying error
        source: serde_json::Error,
    },

    /// The transport options do not fit the transport type
    #[error("invalid options for {kind} transport: {reason}")]
    InvalidTransportOptions {
        /// The transport type
        kind: TransportKind,

        /// Why the options were rejected
        reason: String,
    },
}

/// Mail configuration from command-line arguments / environment variables
#[derive(Clone, Debug, PartialEq, Eq, Parser)]
pub struct MailConfig {
    /// The JSON settings file
    #[arg(long = "mail-config", env = "MAIL_CONFIG", default_value = "mail.json")]
    pub settings_path: PathBuf,

    /// The template directory
    #[arg(long = "mail-templates", env = "MAIL_TEMPLATES", default_value = "templates")]
    pub templates_path: PathBuf,

    /// The default layout, overriding the settings file
    #[arg(long = "mail-layout", env = "MAIL_LAYOUT")]
    pub layout: Option<String>,
}

impl MailConfig {
    /// Load the settings file, applying overrides from the arguments
    pub fn settings(&self) -> Result<MailSettings, ConfigError> {
        let mut settings = MailSettings::load(&self.settings_path)?;

        if self.layout.is_some() {
            settings.layout.clone_from(&self.layout);
        }

        Ok(settings)
    }
}

/// Contents of the settings file
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MailSettings {
    /// The default message
    #[serde(default)]
    pub message: MessageSettings,

    /// The default layout
    #[serde(default)]
    pub layout: Option<String>,

    /// The transport
    pub transport: TransportSettings,
}

impl MailSettings {
    /// Read settings from a JSON file
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(source) => return Err(ConfigError::Io { path, source }),
        };

        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse { path, source })
    }
}

/// Settings of the default message
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MessageSettings {
    /// The sender address; empty for none
    pub from: String,

    /// The sender name; empty for none
    pub from_name: String,

    /// The character encoding
    pub encoding: String,
}

impl Default for MessageSettings {
    fn default() -> Self {
        Self {
            from: String::new(),
            from_name: String::new(),
            encoding: "UTF-8".to_string(),
        }
    }
}

impl MessageSettings {
    /// Build the default message
    pub fn default_message(&self) -> Message {
        let mut message = Message::new();

        message.set_encoding(self.encoding.as_str());

        if !self.from.is_empty() {
            let name = Some(self.from_name.clone()).filter(|name| !name.is_empty());
            message.set_from(vec![Mailbox::new(self.from.as_str(), name)]);
        }

        message
    }
}

/// The kind of transport to build
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// SMTP relay
    Smtp,

    /// Local sendmail binary
    Sendmail,

    /// Messages written to a directory
    File,

    /// Messages kept in memory
    InMemory,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Smtp => "smtp",
            Self::Sendmail => "sendmail",
            Self::File => "file",
            Self::InMemory => "in_memory",
        };

        f.write_str(name)
    }
}

/// Transport settings
///
/// `options` may reference `variables` as `%KEY%` tokens.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TransportSettings {
    /// The transport type
    #[serde(rename = "type")]
    pub kind: TransportKind,

    /// Options of the transport
    #[serde(default)]
    pub options: Value,

    /// Variables substituted into the options
    #[serde(default)]
    pub variables: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    fn message_settings(value: Value) -> Result<MessageSettings, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn test_default_message_has_utf8_encoding() -> TestResult {
        let message = message_settings(json!({}))?.default_message();

        assert_eq!(message.encoding(), Some("UTF-8"));
        assert!(message.from().is_empty());

        Ok(())
    }

    #[test]
    fn test_default_message_sets_encoding_from_settings() -> TestResult {
        let message = message_settings(json!({ "encoding": "Foo" }))?.default_message();

        assert_eq!(message.encoding(), Some("Foo"));

        Ok(())
    }

    #[test]
    fn test_default_message_sets_from_address() -> TestResult {
        let message = message_settings(json!({ "from": "bob@acme.org" }))?.default_message();

        assert_eq!(message.from(), [Mailbox::new("bob@acme.org", None)]);

        Ok(())
    }

    #[test]
    fn test_default_message_sets_from_name() -> TestResult {
        let message = message_settings(json!({ "from": "bob@acme.org", "from_name": "Bob" }))?
            .default_message();

        assert_eq!(
            message.from(),
            [Mailbox::new("bob@acme.org", Some("Bob".to_string()))]
        );

        Ok(())
    }

    #[test]
    fn test_transport_type_is_required() {
        let result: Result<TransportSettings, _> =
            serde_json::from_value(json!({ "options": { "host": "localhost" } }));

        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_transport_type_is_rejected() {
        let result: Result<TransportSettings, _> = serde_json::from_value(json!({ "type": "pigeon" }));

        assert!(result.is_err());
    }

    #[test]
    fn test_load_settings_file() -> TestResult {
        let path = std::env::temp_dir().join(format!("soflomo-mail-{}.json", std::process::id()));

        let mut file = fs::File::create(&path)?;
        write!(
            file,
            "{}",
            json!({
                "message": { "from": "bob@acme.org" },
                "transport": {
                    "type": "smtp",
                    "options": { "host": "%HOST%" },
                    "variables": { "host": "mail.acme.org" },
                },
            })
        )?;

        let config = MailConfig::parse_from([
            "mailer",
            "--mail-config",
            path.to_str().ok_or("non utf-8 temp path")?,
            "--mail-layout",
            "layout",
        ]);

        let settings = config.settings()?;
        fs::remove_file(&path)?;

        assert_eq!(settings.layout.as_deref(), Some("layout"));
        assert_eq!(settings.message.encoding, "UTF-8");
        assert_eq!(settings.transport.kind, TransportKind::Smtp);
        assert_eq!(settings.transport.variables["host"], json!("mail.acme.org"));

        Ok(())
    }

    #[test]
    fn test_missing_settings_file() {
        let result = MailSettings::load("/nonexistent/mail.json");

        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
