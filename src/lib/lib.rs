#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Mail composition library
//!
//! Builds e-mail messages from declarative send options and rendered
//! templates, and hands them to a pluggable transport.

pub mod domain;
pub mod infrastructure;
