//! # Routing Policy
//! Pure logic that maps `(message, config, knowledge snapshot)` → `Action`.
//! No I/O and no state across calls.
//!
//! Precedence, first match wins:
//! 1. guardrail block → handoff
//! 2. FAQ hit without order intent → direct answer
//! 3. order intent → capability invocation, handoff (`required`) or clarification (`auto`)
//! 4. long or complex request → handoff
//! 5. generic help text

use std::sync::Arc;

use tracing::info;

use crate::capability::{is_capability_enabled, Capability, CapabilityContext};
use crate::classify::{classify, word_count};
use crate::decision::{
    Action, HandoffReason, Message, RoutingConfig, ToolChoice, CLARIFY_ORDER_ID_PROMPT,
    GENERIC_HELP_TEXT,
};
use crate::error::RoutingError;
use crate::guardrail;
use crate::knowledge::{KnowledgeBase, KnowledgeHandle};
use crate::telemetry::message_id;

/// Messages longer than this many whitespace-separated words are escalated.
pub const MAX_SIMPLE_WORDS: usize = 40;

const COMPLEXITY_MARKERS: &[&str] = &["complicated", "legal"];

/// Route one message against an explicit knowledge snapshot.
///
/// The configuration is validated before any rule runs; an unknown
/// `tool_choice` is rejected rather than defaulted.
pub fn route(
    message: &Message,
    config: &RoutingConfig,
    kb: &KnowledgeBase,
) -> Result<Action, RoutingError> {
    let tool_choice = config.tool_choice()?;
    let msg_id = message_id(&message.text);

    // 1) Guardrail runs first on every message.
    let verdict = guardrail::evaluate(&message.text);
    if !verdict.allowed {
        let action = Action::handoff(HandoffReason::NegativeSentiment, message)
            .with_notice(verdict.effective_text);
        log_decision("guardrail_handoff", &msg_id, &action);
        return Ok(action);
    }

    let text = verdict.effective_text.as_str();
    let signals = classify(text, kb.faqs());

    // 2) FAQ, unless the order subflow applies.
    if let Some(answer) = signals.faq_match.as_deref() {
        if !signals.has_order_intent {
            let action = Action::answer(answer);
            log_decision("faq_answer", &msg_id, &action);
            return Ok(action);
        }
    }

    // 3) Order subflow.
    if signals.has_order_intent {
        let order_id = signals.extracted_order_id.as_deref();
        let action = match tool_choice {
            ToolChoice::Required => {
                let enabled =
                    is_capability_enabled(Capability::OrderLookup, &CapabilityContext::new(text));
                match order_id {
                    Some(id) if enabled => {
                        Action::order_lookup(id, ToolChoice::Required, config, &message.customer_id)
                    }
                    _ => Action::handoff(HandoffReason::RequiredCapabilityUnusable, message),
                }
            }
            ToolChoice::Auto => match order_id {
                Some(id) => {
                    Action::order_lookup(id, ToolChoice::Auto, config, &message.customer_id)
                }
                None => Action::clarify(CLARIFY_ORDER_ID_PROMPT),
            },
        };
        log_decision("order_flow", &msg_id, &action);
        return Ok(action);
    }

    // 4) Complexity escalation.
    if is_complex(text) {
        let action = Action::handoff(HandoffReason::ComplexRequest, message);
        log_decision("complexity_handoff", &msg_id, &action);
        return Ok(action);
    }

    // 5) Default.
    let action = Action::answer(GENERIC_HELP_TEXT);
    log_decision("default_help", &msg_id, &action);
    Ok(action)
}

fn is_complex(text: &str) -> bool {
    if word_count(text) > MAX_SIMPLE_WORDS {
        return true;
    }
    let t = text.to_lowercase();
    COMPLEXITY_MARKERS.iter().any(|m| t.contains(m))
}

fn log_decision(decision: &str, msg_id: &str, action: &Action) {
    let reason = match action {
        Action::HandoffRequest { reason, .. } => reason.description(),
        _ => "",
    };
    info!(
        target: "support_router::policy",
        decision,
        msg_id,
        action = action.kind(),
        reason,
        "routing decision"
    );
}

/// Public entry point: routes against whatever snapshot is current at call time.
#[derive(Clone, Debug, Default)]
pub struct SupportRouter {
    knowledge: KnowledgeHandle,
}

impl SupportRouter {
    pub fn new(knowledge: KnowledgeHandle) -> Self {
        Self { knowledge }
    }

    pub fn knowledge(&self) -> &KnowledgeHandle {
        &self.knowledge
    }

    pub fn route(
        &self,
        message_text: &str,
        customer_id: &str,
        config: &RoutingConfig,
    ) -> Result<Action, RoutingError> {
        self.route_message(&Message::new(message_text, customer_id), config)
    }

    pub fn route_message(
        &self,
        message: &Message,
        config: &RoutingConfig,
    ) -> Result<Action, RoutingError> {
        // One snapshot for the whole call.
        let kb: Arc<KnowledgeBase> = self.knowledge.snapshot();
        route(message, config, &kb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::HandoffContext;
    use crate::guardrail::REDIRECT_COPY;
    use serde_json::json;

    fn kb() -> KnowledgeBase {
        KnowledgeBase::default_seed()
    }

    fn msg(text: &str) -> Message {
        Message::new(text, "CUST-789")
    }

    fn auto() -> RoutingConfig {
        RoutingConfig::new(ToolChoice::Auto)
    }

    fn required() -> RoutingConfig {
        RoutingConfig::new(ToolChoice::Required)
    }

    #[test]
    fn faq_answer_for_return_policy() {
        let cfg = RoutingConfig::default();
        let a = route(&msg("What's your return policy?"), &cfg, &kb()).unwrap();
        assert_eq!(
            a,
            Action::answer("You can return unopened items within 30 days for a full refund.")
        );
    }

    #[test]
    fn negative_message_escalates_with_original_context() {
        let text = "This is the worst service ever, I'm furious! Track my order ORD-1003.";
        let a = route(&msg(text), &auto(), &kb()).unwrap();
        assert_eq!(
            a,
            Action::HandoffRequest {
                reason: HandoffReason::NegativeSentiment,
                description: "negative sentiment/offensive language".to_string(),
                context: HandoffContext {
                    last_user_message: text.to_string(),
                    customer_id: "CUST-789".to_string(),
                },
                notice: Some(REDIRECT_COPY.to_string()),
            }
        );
    }

    #[test]
    fn order_intent_beats_faq_match() {
        let a = route(&msg("return policy for order ORD-1001"), &auto(), &kb()).unwrap();
        assert_eq!(a.kind(), "capability_invocation");
    }

    #[test]
    fn auto_with_id_invokes_lookup_with_merged_metadata() {
        let cfg = auto().with_metadata("channel", "web");
        let a = route(&msg("Can you track my order ORD-1001?"), &cfg, &kb()).unwrap();
        match a {
            Action::CapabilityInvocation {
                capability,
                arguments,
                tool_choice,
                metadata,
            } => {
                assert_eq!(capability, Capability::OrderLookup);
                assert_eq!(arguments["order_id"], json!("ORD-1001"));
                assert_eq!(tool_choice, ToolChoice::Auto);
                assert_eq!(metadata["channel"], json!("web"));
                assert_eq!(metadata["customer_id"], json!("CUST-789"));
            }
            other => panic!("expected capability invocation, got {other:?}"),
        }
    }

    #[test]
    fn auto_without_id_asks_for_it() {
        let a = route(&msg("I want the status of my order"), &auto(), &kb()).unwrap();
        assert_eq!(a, Action::clarify(CLARIFY_ORDER_ID_PROMPT));
    }

    #[test]
    fn required_without_id_hands_off() {
        let a = route(&msg("I want the status of my order"), &required(), &kb()).unwrap();
        match a {
            Action::HandoffRequest { reason, notice, .. } => {
                assert_eq!(reason, HandoffReason::RequiredCapabilityUnusable);
                assert!(notice.is_none());
            }
            other => panic!("expected handoff, got {other:?}"),
        }
    }

    #[test]
    fn required_with_id_invokes_required_lookup() {
        let a = route(&msg("Status for ORD-1002 please."), &required(), &kb()).unwrap();
        assert_eq!(
            a,
            Action::order_lookup("ORD-1002", ToolChoice::Required, &required(), "CUST-789")
        );
    }

    #[test]
    fn id_without_intent_is_not_an_order_flow() {
        let a = route(&msg("ORD-1001"), &auto(), &kb()).unwrap();
        assert_eq!(a, Action::answer(GENERIC_HELP_TEXT));
    }

    #[test]
    fn legal_keyword_escalates() {
        let m = msg("I have a legal question");
        let a = route(&m, &auto(), &kb()).unwrap();
        assert_eq!(a, Action::handoff(HandoffReason::ComplexRequest, &m));
    }

    #[test]
    fn word_count_boundary() {
        let forty = vec!["word"; MAX_SIMPLE_WORDS].join(" ");
        let a = route(&msg(&forty), &auto(), &kb()).unwrap();
        assert_eq!(a, Action::answer(GENERIC_HELP_TEXT));

        let forty_one = vec!["word"; MAX_SIMPLE_WORDS + 1].join(" ");
        let a = route(&msg(&forty_one), &auto(), &kb()).unwrap();
        assert!(a.is_handoff());
    }

    #[test]
    fn empty_message_gets_generic_help() {
        let a = route(&msg(""), &auto(), &kb()).unwrap();
        assert_eq!(a, Action::answer(GENERIC_HELP_TEXT));
    }

    #[test]
    fn bad_tool_choice_fails_before_any_rule() {
        let cfg = RoutingConfig {
            tool_choice: "always".into(),
            ..RoutingConfig::default()
        };
        for text in ["I hate this", "What's your return policy?", ""] {
            assert_eq!(
                route(&msg(text), &cfg, &kb()),
                Err(RoutingError::UnknownToolChoice("always".into()))
            );
        }
    }

    #[test]
    fn router_sees_swapped_snapshot_on_next_call() {
        let router = SupportRouter::default();
        let before = router.route("warranty?", "C1", &auto()).unwrap();
        assert_eq!(before.kind(), "direct_answer");
        assert_ne!(before, Action::answer(GENERIC_HELP_TEXT));

        router.knowledge().replace(KnowledgeBase::default());
        let after = router.route("warranty?", "C1", &auto()).unwrap();
        assert_eq!(after, Action::answer(GENERIC_HELP_TEXT));
    }
}
