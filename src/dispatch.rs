// src/dispatch.rs
//! Reference caller: turns an [`Action`] into the reply a front end would show.
//!
//! The policy only decides; this is where a capability actually runs. The
//! action itself is never modified.

use serde::Serialize;
use tracing::info;

use crate::capability::{format_order_status, translate_lookup_error, Capability, OrderLookup};
use crate::decision::Action;
use crate::error::LookupError;

pub const TRANSFER_TEXT: &str =
    "I’m connecting you with a human agent who can help further. Please hold on.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub kind: &'static str,
    pub text: String,
    pub handed_off: bool,
}

impl Reply {
    fn say(action: &Action, text: impl Into<String>) -> Self {
        Self {
            kind: action.kind(),
            text: text.into(),
            handed_off: false,
        }
    }
}

pub async fn dispatch(action: &Action, lookup: &dyn OrderLookup) -> Reply {
    match action {
        Action::DirectAnswer { text } => Reply::say(action, text.as_str()),
        Action::ClarificationRequest { prompt } => Reply::say(action, prompt.as_str()),
        Action::HandoffRequest { reason, notice, .. } => {
            info!(
                target: "support_router::dispatch",
                reason = %reason,
                "handing off to human agent"
            );
            Reply {
                kind: action.kind(),
                text: notice.clone().unwrap_or_else(|| TRANSFER_TEXT.to_string()),
                handed_off: true,
            }
        }
        Action::CapabilityInvocation {
            capability: Capability::OrderLookup,
            arguments,
            ..
        } => {
            let order_id = arguments.get("order_id").and_then(|v| v.as_str());
            let text = match order_id {
                Some(id) => match lookup.lookup(id).await {
                    Ok(record) => format_order_status(id, &record),
                    Err(e) => translate_lookup_error(Some(id), &e),
                },
                None => translate_lookup_error(
                    None,
                    &LookupError::Unavailable("missing order_id argument".into()),
                ),
            };
            Reply::say(action, text)
        }
    }
}
