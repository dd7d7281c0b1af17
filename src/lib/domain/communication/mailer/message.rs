//! Email message

use std::fmt;

/// MIME type of the plain text part of a message
pub const TEXT_PLAIN: &str = "text/plain";

/// MIME type of the HTML part of a message
pub const TEXT_HTML: &str = "text/html";

/// A single address with an optional display name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mailbox {
    /// The email address
    pub email: String,

    /// The display name
    pub name: Option<String>,
}

impl Mailbox {
    /// Create a new mailbox
    pub fn new(email: impl Into<String>, name: Option<String>) -> Self {
        Self {
            email: email.into(),
            name,
        }
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} <{}>", self.email),
            None => write!(f, "{}", self.email),
        }
    }
}

/// The address fields of a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressField {
    /// `To`
    To,

    /// `Cc`
    Cc,

    /// `Bcc`
    Bcc,

    /// `From`
    From,

    /// `Reply-To`
    ReplyTo,
}

impl AddressField {
    /// All address fields, in the order they are resolved from send options
    pub const ALL: [AddressField; 5] = [
        AddressField::To,
        AddressField::Cc,
        AddressField::Bcc,
        AddressField::From,
        AddressField::ReplyTo,
    ];

    /// The option key holding the address(es) of this field
    pub fn option_key(&self) -> &'static str {
        match self {
            Self::To => "to",
            Self::Cc => "cc",
            Self::Bcc => "bcc",
            Self::From => "from",
            Self::ReplyTo => "reply_to",
        }
    }
}

/// One part of a multipart body
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Part {
    /// The MIME type of the part
    pub content_type: &'static str,

    /// The content of the part
    pub content: String,
}

impl Part {
    /// A `text/plain` part
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content_type: TEXT_PLAIN,
            content: content.into(),
        }
    }

    /// A `text/html` part
    pub fn html(content: impl Into<String>) -> Self {
        Self {
            content_type: TEXT_HTML,
            content: content.into(),
        }
    }
}

/// The body of a message
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Body {
    /// A single-part body
    Plain(String),

    /// A text/html alternative body
    Multipart {
        /// The plain text part
        text: Part,

        /// The HTML part
        html: Part,
    },
}

impl Body {
    /// The parts of a multipart body, text first. A plain body has no parts.
    pub fn parts(&self) -> Vec<&Part> {
        match self {
            Self::Plain(_) => Vec::new(),
            Self::Multipart { text, html } => vec![text, html],
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::Plain(String::new())
    }
}

/// Header lines of a message, in insertion order
///
/// Adding a header never replaces an existing line with the same name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    /// Append a header line
    pub fn add_header_line(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// The value of the first header line with `name`, compared case-insensitively
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Iterate over all header lines
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// The number of header lines
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no header lines
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Email message
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Message {
    subject: String,
    encoding: Option<String>,
    to: Vec<Mailbox>,
    cc: Vec<Mailbox>,
    bcc: Vec<Mailbox>,
    from: Vec<Mailbox>,
    reply_to: Vec<Mailbox>,
    body: Body,
    headers: Headers,
}

impl Message {
    /// Create an empty message
    pub fn new() -> Self {
        Self::default()
    }

    /// The subject of the message
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Set the subject of the message
    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.subject = subject.into();
    }

    /// The character encoding of the message, if any was set
    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    /// Set the character encoding of the message
    pub fn set_encoding(&mut self, encoding: impl Into<String>) {
        self.encoding = Some(encoding.into());
    }

    /// The `To` addresses
    pub fn to(&self) -> &[Mailbox] {
        &self.to
    }

    /// Replace the `To` addresses
    pub fn set_to(&mut self, mailboxes: Vec<Mailbox>) {
        self.to = mailboxes;
    }

    /// The `Cc` addresses
    pub fn cc(&self) -> &[Mailbox] {
        &self.cc
    }

    /// Replace the `Cc` addresses
    pub fn set_cc(&mut self, mailboxes: Vec<Mailbox>) {
        self.cc = mailboxes;
    }

    /// The `Bcc` addresses
    pub fn bcc(&self) -> &[Mailbox] {
        &self.bcc
    }

    /// Replace the `Bcc` addresses
    pub fn set_bcc(&mut self, mailboxes: Vec<Mailbox>) {
        self.bcc = mailboxes;
    }

    /// The `From` addresses
    pub fn from(&self) -> &[Mailbox] {
        &self.from
    }

    /// Replace the `From` addresses
    pub fn set_from(&mut self, mailboxes: Vec<Mailbox>) {
        self.from = mailboxes;
    }

    /// The `Reply-To` addresses
    pub fn reply_to(&self) -> &[Mailbox] {
        &self.reply_to
    }

    /// Replace the `Reply-To` addresses
    pub fn set_reply_to(&mut self, mailboxes: Vec<Mailbox>) {
        self.reply_to = mailboxes;
    }

    /// The addresses of `field`
    pub fn addresses(&self, field: AddressField) -> &[Mailbox] {
        match field {
            AddressField::To => self.to(),
            AddressField::Cc => self.cc(),
            AddressField::Bcc => self.bcc(),
            AddressField::From => self.from(),
            AddressField::ReplyTo => self.reply_to(),
        }
    }

    /// Replace the addresses of `field`
    pub fn set_addresses(&mut self, field: AddressField, mailboxes: Vec<Mailbox>) {
        match field {
            AddressField::To => self.set_to(mailboxes),
            AddressField::Cc => self.set_cc(mailboxes),
            AddressField::Bcc => self.set_bcc(mailboxes),
            AddressField::From => self.set_from(mailboxes),
            AddressField::ReplyTo => self.set_reply_to(mailboxes),
        }
    }

    /// The body of the message
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Set the body of the message
    pub fn set_body(&mut self, body: Body) {
        self.body = body;
    }

    /// The header lines of the message
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable access to the header lines of the message
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }
}
