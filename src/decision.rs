//! decision.rs: the outcome types the routing policy emits.
//!
//! Every call produces exactly one [`Action`], built fresh and owned by the
//! caller. The policy holds no action state between calls.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::capability::Capability;
use crate::error::RoutingError;

pub const CLARIFY_ORDER_ID_PROMPT: &str =
    "Could you share your order ID (e.g., ORD-1001) so I can check the status?";

pub const GENERIC_HELP_TEXT: &str =
    "I can help with order tracking (share your order ID like ORD-1001) \
or answer policies like shipping time, warranty, and returns.";

/// Whether a capability must be used once its intent is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    Auto,
    Required,
}

impl ToolChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolChoice::Auto => "auto",
            ToolChoice::Required => "required",
        }
    }
}

impl FromStr for ToolChoice {
    type Err = RoutingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "auto" => Ok(Self::Auto),
            "required" => Ok(Self::Required),
            other => Err(RoutingError::UnknownToolChoice(other.to_string())),
        }
    }
}

/// Per-call configuration as received from the caller.
///
/// `tool_choice` stays a raw string here so a bad value can be reported as a
/// configuration error instead of being silently defaulted. Only the exact
/// values `auto` and `required` are accepted; no trimming or case folding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingConfig {
    #[serde(default = "default_tool_choice")]
    pub tool_choice: String,
    /// Opaque to the policy; forwarded on capability invocations.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

fn default_tool_choice() -> String {
    ToolChoice::Auto.as_str().to_string()
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            tool_choice: default_tool_choice(),
            metadata: Map::new(),
        }
    }
}

impl RoutingConfig {
    pub fn new(tool_choice: ToolChoice) -> Self {
        Self {
            tool_choice: tool_choice.as_str().to_string(),
            metadata: Map::new(),
        }
    }

    /// Add one metadata entry (builder style).
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn tool_choice(&self) -> Result<ToolChoice, RoutingError> {
        self.tool_choice.parse()
    }
}

/// One inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub customer_id: String,
}

impl Message {
    pub fn new(text: impl Into<String>, customer_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            customer_id: customer_id.into(),
        }
    }
}

/// Why a conversation is escalated to a human.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoffReason {
    NegativeSentiment,
    RequiredCapabilityUnusable,
    ComplexRequest,
}

impl HandoffReason {
    /// Wire code, same as the serialized form.
    pub fn code(&self) -> &'static str {
        match self {
            HandoffReason::NegativeSentiment => "negative_sentiment",
            HandoffReason::RequiredCapabilityUnusable => "required_capability_unusable",
            HandoffReason::ComplexRequest => "complex_request",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            HandoffReason::NegativeSentiment => "negative sentiment/offensive language",
            HandoffReason::RequiredCapabilityUnusable => {
                "required capability unusable or id missing"
            }
            HandoffReason::ComplexRequest => "complex or ambiguous request",
        }
    }
}

impl fmt::Display for HandoffReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// What a human agent receives: always the customer's original words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffContext {
    pub last_user_message: String,
    pub customer_id: String,
}

impl From<&Message> for HandoffContext {
    fn from(m: &Message) -> Self {
        Self {
            last_user_message: m.text.clone(),
            customer_id: m.customer_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    DirectAnswer {
        text: String,
    },
    HandoffRequest {
        reason: HandoffReason,
        /// Human-readable form of `reason`, for consumers that only read JSON.
        #[serde(default)]
        description: String,
        context: HandoffContext,
        /// Copy the caller may show while transferring (set on guardrail blocks).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notice: Option<String>,
    },
    CapabilityInvocation {
        capability: Capability,
        arguments: Map<String, Value>,
        tool_choice: ToolChoice,
        metadata: Map<String, Value>,
    },
    ClarificationRequest {
        prompt: String,
    },
}

impl Action {
    pub fn answer(text: impl Into<String>) -> Self {
        Action::DirectAnswer { text: text.into() }
    }

    pub fn handoff(reason: HandoffReason, message: &Message) -> Self {
        Action::HandoffRequest {
            reason,
            description: reason.description().to_string(),
            context: HandoffContext::from(message),
            notice: None,
        }
    }

    /// Attach a user-facing notice to a handoff; no-op for other variants.
    pub fn with_notice(mut self, copy: impl Into<String>) -> Self {
        if let Action::HandoffRequest { notice, .. } = &mut self {
            *notice = Some(copy.into());
        }
        self
    }

    pub fn clarify(prompt: impl Into<String>) -> Self {
        Action::ClarificationRequest {
            prompt: prompt.into(),
        }
    }

    /// Order-status lookup for `order_id`. Caller metadata is copied and
    /// `customer_id` is written last so it always wins.
    pub fn order_lookup(
        order_id: &str,
        tool_choice: ToolChoice,
        config: &RoutingConfig,
        customer_id: &str,
    ) -> Self {
        let mut arguments = Map::new();
        arguments.insert("order_id".to_string(), Value::from(order_id));

        let mut metadata = config.metadata.clone();
        metadata.insert("customer_id".to_string(), Value::from(customer_id));

        Action::CapabilityInvocation {
            capability: Capability::OrderLookup,
            arguments,
            tool_choice,
            metadata,
        }
    }

    /// Stable short name, used for logs, metrics and history.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::DirectAnswer { .. } => "direct_answer",
            Action::HandoffRequest { .. } => "handoff_request",
            Action::CapabilityInvocation { .. } => "capability_invocation",
            Action::ClarificationRequest { .. } => "clarification_request",
        }
    }

    pub fn is_handoff(&self) -> bool {
        matches!(self, Action::HandoffRequest { .. })
    }
}
