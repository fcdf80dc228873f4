// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod capability;
pub mod classify;
pub mod config;
pub mod decision;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod guardrail;
pub mod history;
pub mod knowledge;
pub mod metrics;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::decision::{Action, HandoffReason, Message, RoutingConfig, ToolChoice};
pub use crate::engine::{route, SupportRouter};
pub use crate::error::{KnowledgeError, LookupError, RoutingError};
pub use crate::knowledge::{KnowledgeBase, KnowledgeHandle};
