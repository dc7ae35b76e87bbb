//! Relocale - Schema-Driven Document Translation
//!
//! Extracts localized text from a document by walking its field schema,
//! sends the texts to a translation provider, and writes the translations
//! back into a copy of the document for each target locale.

pub mod address;
pub mod apply;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod richtext;
pub mod schema;
pub mod store;
pub mod translate;
pub mod workflow;
