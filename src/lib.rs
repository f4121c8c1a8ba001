//! Docfilter: translates method-call predicates into parameterized filters for
//! documents stored as JSON inside a relational table.
//!
//! A query pipeline walking a predicate tree hands each call node it meets (e.g.
//! `Name.StartsWith("Sm")` or `Tags.Contains("blue")`) to a [`TranslatorRegistry`],
//! which finds the translator that understands the call and returns a
//! [`FilterFragment`]: SQL text with `?` placeholders plus the bound values.
//!
//! # Architecture
//! - Expression model (`CallExpr`, `Expr`) and a small call parser
//! - Document schema and field locator resolution (`DocumentMapping`)
//! - Value encoding (`Serializer`)
//! - Matcher/translator traits and the built-in translators
//! - Ordered translator registry, the single entry point

mod expr;
mod fragment;
mod mapping;
mod matcher;
mod registry;
mod schema;
mod serializer;
mod translators;
mod types;

pub use expr::*;
pub use fragment::*;
pub use mapping::*;
pub use matcher::*;
pub use registry::*;
pub use schema::*;
pub use serializer::*;
pub use translators::*;
pub use types::*;

use thiserror::Error;

/// Unified error type for translation.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("unsupported query operator: no translator for '{method}' on receiver of type {receiver}")]
    UnrecognizedExpression { method: String, receiver: String },
    #[error("unsupported expression shape: {0}")]
    UnsupportedShape(String),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Serialization(#[from] SerializeError),
    #[error(transparent)]
    Fragment(#[from] FragmentError),
    #[error("parse error: {0}")]
    Parse(String),
}
