// src/capability.rs
//! Backend capabilities the policy may request, the gate deciding whether a
//! capability may run, and the caller-side contracts for executing one.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::classify::detect_order_intent;
use crate::error::LookupError;
use crate::knowledge::OrderRecord;

/// Named backend operations. The policy names them; callers execute them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    #[serde(rename = "get_order_status")]
    OrderLookup,
}

impl Capability {
    pub fn name(&self) -> &'static str {
        match self {
            Capability::OrderLookup => "get_order_status",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "get_order_status" => Ok(Capability::OrderLookup),
            other => Err(format!("unknown capability `{other}`")),
        }
    }
}

/// Conversation context visible to the gate. Only the current message counts.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityContext<'a> {
    pub last_user_message: &'a str,
}

impl<'a> CapabilityContext<'a> {
    pub fn new(last_user_message: &'a str) -> Self {
        Self { last_user_message }
    }
}

/// Whether `capability` may run for this turn.
pub fn is_capability_enabled(capability: Capability, ctx: &CapabilityContext<'_>) -> bool {
    let enabled = match capability {
        Capability::OrderLookup => detect_order_intent(ctx.last_user_message),
    };
    info!(
        target: "support_router::capability",
        capability = capability.name(),
        enabled,
        "capability gate evaluated"
    );
    debug!(
        target: "support_router::capability",
        capability = capability.name(),
        text = ctx.last_user_message,
        "capability gate input"
    );
    enabled
}

/// Order lookup backend, executed by the caller after a `CapabilityInvocation`.
#[async_trait]
pub trait OrderLookup: Send + Sync {
    async fn lookup(&self, order_id: &str) -> Result<OrderRecord, LookupError>;
}

/// Status line shown for a successful lookup.
pub fn format_order_status(order_id: &str, record: &OrderRecord) -> String {
    let mut parts = vec![format!("Status: {}", record.status)];
    if let Some(eta) = record.eta.as_deref().filter(|e| *e != "N/A") {
        parts.push(format!("ETA: {eta}"));
    }
    if let Some(carrier) = record.carrier.as_deref() {
        parts.push(format!("Carrier: {carrier}"));
    }
    format!("Order {order_id} → {}", parts.join(", "))
}

/// User-facing copy for a failed lookup. Only called on failure.
pub fn translate_lookup_error(order_id: Option<&str>, err: &LookupError) -> String {
    let order_id = order_id.unwrap_or("UNKNOWN");
    error!(
        target: "support_router::capability",
        capability = Capability::OrderLookup.name(),
        order_id,
        error = %err,
        "capability lookup failed"
    );
    format!(
        "Sorry, I couldn’t find details for order '{order_id}'. \
Please double-check the ID (e.g., ORD-1001) or ask me to connect you to a human agent."
    )
}
