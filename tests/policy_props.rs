// tests/policy_props.rs
//
// Property tests for the routing rules that must hold for whole families of
// messages. Vocabularies are fixed so generated text cannot accidentally
// trip another rule.

use proptest::prelude::*;

use support_router::classify::extract_order_identifier;
use support_router::{
    route, Action, HandoffReason, KnowledgeBase, Message, RoutingConfig, ToolChoice,
};

// No negative token, FAQ topic, complexity marker, digit or order trigger.
const NEUTRAL: &[&str] = &[
    "hello", "please", "thanks", "today", "my", "the", "a", "package", "shipment", "question",
    "about", "item", "blue", "green", "quick", "help", "need", "info", "when", "where",
];

const NEGATIVE: &[&str] = &["hate", "furious", "worst", "idiot", "disappointed", "terrible"];

const ORDER_WORDS: &[&str] = &["order", "track", "status"];

const FAQ_OR_ORDER: &[&str] = &["", "return policy", "track ORD-1001", "warranty"];

const PUNCT: &[&str] = &["", ".", "?", ",", "!"];

fn words(vocab: &'static [&'static str], min: usize, max: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(vocab), min..max).prop_map(|w| w.join(" "))
}

fn seed() -> KnowledgeBase {
    KnowledgeBase::default_seed()
}

fn msg(text: &str) -> Message {
    Message::new(text, "CUST-42")
}

proptest! {
    #[test]
    fn negative_token_always_hands_off(
        prefix in words(NEUTRAL, 0, 6),
        bad in prop::sample::select(NEGATIVE),
        extra in prop::sample::select(FAQ_OR_ORDER),
        required in any::<bool>(),
    ) {
        let text = format!("{prefix} {bad} {extra}");
        let choice = if required { ToolChoice::Required } else { ToolChoice::Auto };
        let cfg = RoutingConfig::new(choice);
        let a = route(&msg(&text), &cfg, &seed()).unwrap();
        match a {
            Action::HandoffRequest { reason, .. } => {
                prop_assert_eq!(reason, HandoffReason::NegativeSentiment)
            }
            other => prop_assert!(false, "expected handoff, got {:?}", other),
        }
    }

    #[test]
    fn single_faq_topic_returns_stored_answer(
        before in words(NEUTRAL, 0, 10),
        after in words(NEUTRAL, 0, 10),
        idx in 0usize..3,
    ) {
        let kb = seed();
        let faq = &kb.faqs()[idx];
        let text = format!("{before} {} {after}", faq.topic.to_uppercase());
        let a = route(&msg(&text), &RoutingConfig::default(), &kb).unwrap();
        prop_assert_eq!(a, Action::answer(faq.answer.clone()));
    }

    #[test]
    fn canonical_id_round_trips(
        digits in "[0-9]{3,6}",
        before in words(NEUTRAL, 0, 5),
        after in words(NEUTRAL, 0, 5),
        punct in prop::sample::select(PUNCT),
    ) {
        let id = format!("ORD-{digits}");
        let text = format!("{before} {id}{punct} {after}");
        prop_assert_eq!(extract_order_identifier(&text), Some(id));
    }

    #[test]
    fn required_without_id_never_clarifies(
        before in words(NEUTRAL, 0, 8),
        trigger in prop::sample::select(ORDER_WORDS),
        after in words(NEUTRAL, 0, 8),
    ) {
        let text = format!("{before} {trigger} {after}");
        let a = route(&msg(&text), &RoutingConfig::new(ToolChoice::Required), &seed()).unwrap();
        match a {
            Action::HandoffRequest { reason, .. } => {
                prop_assert_eq!(reason, HandoffReason::RequiredCapabilityUnusable)
            }
            other => prop_assert!(false, "expected handoff, got {:?}", other),
        }
    }

    #[test]
    fn auto_without_id_always_clarifies(
        before in words(NEUTRAL, 0, 8),
        trigger in prop::sample::select(ORDER_WORDS),
        after in words(NEUTRAL, 0, 8),
    ) {
        let text = format!("{before} {trigger} {after}");
        let a = route(&msg(&text), &RoutingConfig::new(ToolChoice::Auto), &seed()).unwrap();
        prop_assert!(matches!(a, Action::ClarificationRequest { .. }), "got {:?}", a);
    }

    #[test]
    fn long_neutral_messages_escalate(text in words(NEUTRAL, 41, 80)) {
        let a = route(&msg(&text), &RoutingConfig::default(), &seed()).unwrap();
        match a {
            Action::HandoffRequest { reason, context, .. } => {
                prop_assert_eq!(reason.to_string(), "complex or ambiguous request");
                prop_assert_eq!(context.last_user_message, text);
            }
            other => prop_assert!(false, "expected handoff, got {:?}", other),
        }
    }
}
