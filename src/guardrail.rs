// src/guardrail.rs
//! Civility guardrail applied to every inbound message before routing.
//!
//! There is no bypass switch: a message either trips the guardrail or it does
//! not. A blocked message is replaced by a fixed redirect copy and the
//! original text is not passed on to classification.

use serde::Serialize;
use tracing::{debug, info};

use crate::classify::detect_negative_or_offensive;
use crate::metrics::record_guardrail;
use crate::telemetry::message_id;

pub const REDIRECT_COPY: &str =
    "I’m here to help. Let’s keep things respectful so I can assist you quickly. \
Could you please restate your request? For example: \
‘Please check my order status ORD-1234’ or ‘What is your return policy?’";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuardrailVerdict {
    pub allowed: bool,
    pub effective_text: String,
}

impl GuardrailVerdict {
    fn pass(text: &str) -> Self {
        Self {
            allowed: true,
            effective_text: text.to_string(),
        }
    }

    fn block() -> Self {
        Self {
            allowed: false,
            effective_text: REDIRECT_COPY.to_string(),
        }
    }
}

pub fn evaluate(text: &str) -> GuardrailVerdict {
    let blocked = detect_negative_or_offensive(text);
    record_guardrail(!blocked);
    if blocked {
        info!(
            target: "support_router::guardrail",
            msg_id = %message_id(text),
            allowed = false,
            "civility guardrail blocked message"
        );
        GuardrailVerdict::block()
    } else {
        debug!(
            target: "support_router::guardrail",
            msg_id = %message_id(text),
            allowed = true,
            "civility guardrail passed message"
        );
        GuardrailVerdict::pass(text)
    }
}
