// src/classify.rs
//! Text classifiers: pure, case-insensitive, total over any input string.
//!
//! These are keyword heuristics, a cheap first line of defense. They are not
//! a sentiment model and misses in both directions are expected.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::knowledge::FaqEntry;
use crate::telemetry::message_id;

const OFFENSIVE_PATTERNS: &[&str] = &[
    r"\b(dumb|stupid|idiot|shut up|hate|useless)\b",
    r"\b(f\*?ck|s\*?it|b\*?tch|a\*?shole)\b",
];

const NEGATIVE_SENTIMENT_PATTERNS: &[&str] = &[
    r"\b(angry|furious|terrible|awful|worst|hate|refund now)\b",
    r"\b(complain|complaint|speak to manager|not happy|disappointed)\b",
];

const ORDER_TRIGGERS: &[&str] = &["order", "track", "status"];

static NEGATIVE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    OFFENSIVE_PATTERNS
        .iter()
        .chain(NEGATIVE_SENTIMENT_PATTERNS)
        .map(|p| Regex::new(p).expect("guardrail pattern"))
        .collect()
});

// ASCII digits only; `\d` would also accept other Unicode digit classes.
static ORDER_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bORD[- ]?([0-9]{3,6})\b").expect("order id regex"));

static CANONICAL_ORDER_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ORD-[0-9]{3,6}$").expect("canonical order id regex"));

/// Everything the policy needs to know about one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub is_negative_or_offensive: bool,
    pub has_order_intent: bool,
    pub extracted_order_id: Option<String>,
    pub faq_match: Option<String>,
}

/// Run all classifiers over `text`.
pub fn classify(text: &str, faqs: &[FaqEntry]) -> ClassificationResult {
    ClassificationResult {
        is_negative_or_offensive: detect_negative_or_offensive(text),
        has_order_intent: detect_order_intent(text),
        extracted_order_id: extract_order_identifier(text),
        faq_match: match_faq(text, faqs).map(str::to_string),
    }
}

pub fn detect_negative_or_offensive(text: &str) -> bool {
    let t = text.to_lowercase();
    let hit = NEGATIVE_RES.iter().find(|re| re.is_match(&t));
    debug!(
        target: "support_router::classify",
        decision = "negative_or_offensive",
        msg_id = %message_id(text),
        outcome = hit.is_some(),
        pattern = hit.map(|re| re.as_str()).unwrap_or("")
    );
    hit.is_some()
}

pub fn detect_order_intent(text: &str) -> bool {
    let t = text.to_lowercase();
    let outcome = ORDER_TRIGGERS.iter().any(|w| t.contains(w));
    debug!(
        target: "support_router::classify",
        decision = "order_intent",
        msg_id = %message_id(text),
        outcome
    );
    outcome
}

/// First `ORD<sep?><3-6 digits>` token, canonicalized to `ORD-<digits>`.
pub fn extract_order_identifier(text: &str) -> Option<String> {
    let upper = text.to_uppercase();
    let id = ORDER_ID_RE
        .captures(&upper)
        .and_then(|caps| caps.get(1))
        .map(|digits| format!("ORD-{}", digits.as_str()));
    debug!(
        target: "support_router::classify",
        decision = "order_id",
        msg_id = %message_id(text),
        outcome = id.as_deref().unwrap_or("none")
    );
    id
}

/// Answer of the first-declared topic contained in the message.
pub fn match_faq<'a>(text: &str, faqs: &'a [FaqEntry]) -> Option<&'a str> {
    let t = text.to_lowercase();
    let hit = faqs.iter().find(|f| t.contains(f.topic.as_str()));
    debug!(
        target: "support_router::classify",
        decision = "faq_match",
        msg_id = %message_id(text),
        outcome = hit.map(|f| f.topic.as_str()).unwrap_or("none")
    );
    hit.map(|f| f.answer.as_str())
}

pub fn is_canonical_order_id(id: &str) -> bool {
    CANONICAL_ORDER_ID_RE.is_match(id)
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
