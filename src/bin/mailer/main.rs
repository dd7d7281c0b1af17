#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Sends a single templated email from the command line

use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use serde_json::Value;
use soflomo_mail::{
    domain::communication::mailer::{MailService, MailServiceImpl, SendOptions, Variables},
    infrastructure::{config::MailConfig, email::ConfiguredTransport, templates::TemplateRenderer},
};
use tracing::info;

/// Command-line arguments / environment variables
#[derive(Debug, Parser)]
pub struct Args {
    /// The mail configuration
    #[clap(flatten)]
    pub mail: MailConfig,

    /// The recipient
    #[arg(long)]
    pub to: String,

    /// The name of the recipient
    #[arg(long)]
    pub to_name: Option<String>,

    /// The subject line
    #[arg(long)]
    pub subject: String,

    /// The HTML template
    #[arg(long)]
    pub template: String,

    /// The plain text template
    #[arg(long)]
    pub template_text: Option<String>,

    /// The layout, overriding the configured default
    #[arg(long)]
    pub layout: Option<String>,

    /// A template variable as `name=value`
    #[arg(long = "var", value_parser = parse_key_value)]
    pub variables: Vec<(String, String)>,

    /// An additional header as `name=value`
    #[arg(long = "header", value_parser = parse_key_value)]
    pub headers: Vec<(String, String)>,
}

fn parse_key_value(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected name=value, got `{raw}`"))?;

    Ok((key.to_string(), value.to_string()))
}

fn to_map(pairs: Vec<(String, String)>) -> Variables {
    pairs
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect()
}

#[mutants::skip]
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let settings = args.mail.settings()?;

    let transport = ConfiguredTransport::from_settings(&settings.transport)?;
    let renderer = TemplateRenderer::new(&args.mail.templates_path);

    info!(kind = %transport.kind(), "transport ready");

    let mut service = MailServiceImpl::new(Arc::new(transport), Arc::new(renderer))
        .with_default_message(settings.message.default_message());

    if let Some(layout) = settings.layout {
        service = service.with_layout(layout);
    }

    let headers = (!args.headers.is_empty()).then(|| Value::Object(to_map(args.headers)));

    let options = SendOptions {
        to_name: args.to_name,
        template_text: args.template_text,
        layout: args.layout,
        headers,
        ..SendOptions::new(args.to, args.subject, args.template)
    };

    service.send(&options, &to_map(args.variables), None).await?;

    info!("message sent");

    Ok(())
}
