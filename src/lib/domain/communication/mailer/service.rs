//! Mail service

use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::mock;
use serde_json::Value;
use tracing::debug;

use super::{
    errors::{MailError, ValidationError},
    message::{AddressField, Body, Message, Part, TEXT_HTML},
    options::SendOptions,
    renderer::{Renderer, Variables},
    transport::Transport,
};

/// Mail service
#[async_trait]
pub trait MailService: Send + Sync + 'static {
    /// Compose a message and send it
    ///
    /// # Arguments
    /// * `options` - The [`SendOptions`]; `to`, `subject` and `template` are required.
    /// * `variables` - The variables passed to the templates.
    /// * `message` - The message to start from. Defaults to a copy of the
    ///   service's default message.
    ///
    /// # Returns
    /// A [`Result`] indicating success or failure.
    async fn send(
        &self,
        options: &SendOptions,
        variables: &Variables,
        message: Option<Message>,
    ) -> Result<(), MailError>;

    /// A fresh copy of the default message
    fn default_message(&self) -> Message;
}

#[cfg(test)]
mock! {
    pub MailService {}

    #[async_trait]
    impl MailService for MailService {
        async fn send(
            &self,
            options: &SendOptions,
            variables: &Variables,
            message: Option<Message>,
        ) -> Result<(), MailError>;

        fn default_message(&self) -> Message;
    }
}

/// Mail service implementation
#[derive(Debug)]
pub struct MailServiceImpl<T, R>
where
    T: Transport,
    R: Renderer,
{
    transport: Arc<T>,
    renderer: Arc<R>,
    default_message: Message,
    layout: Option<String>,
}

impl<T, R> MailServiceImpl<T, R>
where
    T: Transport,
    R: Renderer,
{
    /// Creates a new mail service with an empty default message and no layout.
    pub fn new(transport: Arc<T>, renderer: Arc<R>) -> Self {
        Self {
            transport,
            renderer,
            default_message: Message::new(),
            layout: None,
        }
    }

    /// Sets the message every send starts from when none is given.
    pub fn with_default_message(mut self, message: Message) -> Self {
        self.default_message = message;
        self
    }

    /// Sets the layout used when the send options name none.
    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    fn prepare_message(&self, message: &mut Message, options: &SendOptions) -> Result<(), MailError> {
        if options.to.is_none() {
            return Err(ValidationError::MissingOption("to").into());
        }

        let subject = options
            .subject
            .as_deref()
            .ok_or(ValidationError::MissingOption("subject"))?;

        message.set_subject(subject);

        for field in AddressField::ALL {
            if let Some(address) = options.address(field) {
                message.set_addresses(field, address.mailboxes(options.address_name(field)));

                debug!(
                    field = field.option_key(),
                    count = message.addresses(field).len(),
                    "resolved addresses"
                );
            }
        }

        Ok(())
    }

    fn render_body(
        &self,
        message: &mut Message,
        options: &SendOptions,
        variables: &Variables,
    ) -> Result<(), MailError> {
        let template = options
            .template
            .as_deref()
            .ok_or(ValidationError::MissingOption("template"))?;

        debug!(template, "rendering html template");

        let mut html = self.renderer.render(template, variables)?;

        if let Some(layout) = options.layout.as_deref().or(self.layout.as_deref()) {
            debug!(layout, "wrapping html in layout");

            let mut content = Variables::new();
            content.insert("content".to_string(), Value::String(html));

            html = self.renderer.render(layout, &content)?;
        }

        let Some(template_text) = options.template_text.as_deref() else {
            message.headers_mut().add_header_line("Content-Type", TEXT_HTML);
            message.set_body(Body::Plain(html));

            return Ok(());
        };

        debug!(template = template_text, "rendering text template");

        let text = self.renderer.render(template_text, variables)?;

        message.set_body(Body::Multipart {
            text: Part::plain(text),
            html: Part::html(html),
        });

        Ok(())
    }

    fn add_custom_headers(&self, message: &mut Message, headers: &Value) -> Result<(), MailError> {
        let Value::Object(headers) = headers else {
            return Err(ValidationError::HeadersNotAMapping.into());
        };

        for (name, value) in headers {
            let value = match value {
                Value::String(value) => value.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };

            message.headers_mut().add_header_line(name.as_str(), value);
        }

        Ok(())
    }
}

#[async_trait]
impl<T, R> MailService for MailServiceImpl<T, R>
where
    T: Transport,
    R: Renderer,
{
    async fn send(
        &self,
        options: &SendOptions,
        variables: &Variables,
        message: Option<Message>,
    ) -> Result<(), MailError> {
        let mut message = message.unwrap_or_else(|| self.default_message());

        self.prepare_message(&mut message, options)?;
        self.render_body(&mut message, options, variables)?;

        if options.attachments.is_some() {
            return Err(MailError::Unsupported("attachments"));
        }

        if let Some(headers) = &options.headers {
            self.add_custom_headers(&mut message, headers)?;
        }

        debug!(subject = message.subject(), to = message.to().len(), "sending message");

        self.transport.send(message).await?;

        Ok(())
    }

    fn default_message(&self) -> Message {
        self.default_message.clone()
    }
}
