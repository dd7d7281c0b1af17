//! Send options

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::{
    errors::ValidationError,
    message::{AddressField, Mailbox},
};

/// The value of an address option: one address, or a map of addresses to names
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum AddressOption {
    /// A single email address, named by the matching `<field>_name` option
    Single(String),

    /// Email addresses mapped to their (optional) display names
    Many(IndexMap<String, Option<String>>),
}

impl AddressOption {
    /// Build a multi-address option from `(email, name)` pairs
    pub fn many<I, E>(addresses: I) -> Self
    where
        I: IntoIterator<Item = (E, Option<String>)>,
        E: Into<String>,
    {
        Self::Many(
            addresses
                .into_iter()
                .map(|(email, name)| (email.into(), name))
                .collect(),
        )
    }

    /// Resolve into mailboxes. `name` only applies to a single address.
    pub fn mailboxes(&self, name: Option<&str>) -> Vec<Mailbox> {
        match self {
            Self::Single(email) => vec![Mailbox::new(email.as_str(), name.map(str::to_string))],
            Self::Many(addresses) => addresses
                .iter()
                .map(|(email, name)| Mailbox::new(email.as_str(), name.clone()))
                .collect(),
        }
    }
}

impl From<&str> for AddressOption {
    fn from(email: &str) -> Self {
        Self::Single(email.to_string())
    }
}

impl From<String> for AddressOption {
    fn from(email: String) -> Self {
        Self::Single(email)
    }
}

/// Options for a single send
///
/// `to`, `subject` and `template` are required by the mail service; they are
/// optional here so that their absence is reported when sending.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SendOptions {
    /// Recipient(s)
    pub to: Option<AddressOption>,

    /// Name of a single recipient
    pub to_name: Option<String>,

    /// Carbon copy recipient(s)
    pub cc: Option<AddressOption>,

    /// Name of a single carbon copy recipient
    pub cc_name: Option<String>,

    /// Blind carbon copy recipient(s)
    pub bcc: Option<AddressOption>,

    /// Name of a single blind carbon copy recipient
    pub bcc_name: Option<String>,

    /// Sender address(es)
    pub from: Option<AddressOption>,

    /// Name of a single sender
    pub from_name: Option<String>,

    /// Reply-to address(es)
    pub reply_to: Option<AddressOption>,

    /// Name of a single reply-to address
    pub reply_to_name: Option<String>,

    /// Subject line
    pub subject: Option<String>,

    /// Name of the HTML template
    pub template: Option<String>,

    /// Name of the plain text template
    pub template_text: Option<String>,

    /// Name of the layout wrapping the HTML template
    pub layout: Option<String>,

    /// Attachments. Present even when `null`.
    #[serde(deserialize_with = "present")]
    pub attachments: Option<Value>,

    /// Additional header lines. Present even when `null`.
    #[serde(deserialize_with = "present")]
    pub headers: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl SendOptions {
    /// Options with the three required fields set
    pub fn new(
        to: impl Into<AddressOption>,
        subject: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            to: Some(to.into()),
            subject: Some(subject.into()),
            template: Some(template.into()),
            ..Default::default()
        }
    }

    /// Parse options from a JSON object
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        serde_json::from_value(value).map_err(|e| ValidationError::MalformedOptions(e.to_string()))
    }

    /// The address option for `field`
    pub fn address(&self, field: AddressField) -> Option<&AddressOption> {
        match field {
            AddressField::To => self.to.as_ref(),
            AddressField::Cc => self.cc.as_ref(),
            AddressField::Bcc => self.bcc.as_ref(),
            AddressField::From => self.from.as_ref(),
            AddressField::ReplyTo => self.reply_to.as_ref(),
        }
    }

    /// The `<field>_name` option for `field`
    pub fn address_name(&self, field: AddressField) -> Option<&str> {
        match field {
            AddressField::To => self.to_name.as_deref(),
            AddressField::Cc => self.cc_name.as_deref(),
            AddressField::Bcc => self.bcc_name.as_deref(),
            AddressField::From => self.from_name.as_deref(),
            AddressField::ReplyTo => self.reply_to_name.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn test_single_address_uses_name_option() -> TestResult {
        let options = SendOptions::from_value(json!({
            "to": "a@x.com",
            "to_name": "A",
        }))?;

        let to = options.address(AddressField::To).ok_or("missing to")?;

        assert_eq!(
            to.mailboxes(options.address_name(AddressField::To)),
            vec![Mailbox::new("a@x.com", Some("A".to_string()))]
        );

        Ok(())
    }

    #[test]
    fn test_address_map_keeps_order_and_ignores_name_option() -> TestResult {
        let options = SendOptions::from_value(json!({
            "cc": { "b@x.com": "B", "a@x.com": null },
            "cc_name": "ignored",
        }))?;

        let cc = options.address(AddressField::Cc).ok_or("missing cc")?;

        assert_eq!(
            cc.mailboxes(options.address_name(AddressField::Cc)),
            vec![
                Mailbox::new("b@x.com", Some("B".to_string())),
                Mailbox::new("a@x.com", None),
            ]
        );

        Ok(())
    }

    #[test]
    fn test_null_attachments_and_headers_are_present() -> TestResult {
        let options = SendOptions::from_value(json!({
            "attachments": null,
            "headers": null,
        }))?;

        assert_eq!(options.attachments, Some(Value::Null));
        assert_eq!(options.headers, Some(Value::Null));

        let options = SendOptions::from_value(json!({}))?;

        assert_eq!(options.attachments, None);
        assert_eq!(options.headers, None);

        Ok(())
    }

    #[test]
    fn test_wrongly_typed_option_is_malformed() {
        let result = SendOptions::from_value(json!({ "subject": 42 }));

        assert!(matches!(result, Err(ValidationError::MalformedOptions(_))));
    }
}
