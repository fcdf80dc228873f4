//! Typed failures of the routing core and its collaborators.
//!
//! Ambiguous or negative input is never an error here: the policy always
//! produces an action for a well-formed configuration. The only failure the
//! policy itself reports is a malformed configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration rejected before any routing rule ran.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RoutingError {
    #[error("unsupported tool_choice `{0}` (expected auto|required)")]
    UnknownToolChoice(String),
}

/// Failure reported by an order lookup backend.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("order not found: {order_id}")]
    NotFound { order_id: String },
    #[error("order backend unavailable: {0}")]
    Unavailable(String),
}

/// Failure while loading a knowledge snapshot.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("could not read knowledge file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse knowledge data: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("faq entry #{index} has an empty topic")]
    EmptyTopic { index: usize },
    #[error("order id `{0}` is not canonical (expected ORD-<3-6 digits>)")]
    InvalidOrderId(String),
}
