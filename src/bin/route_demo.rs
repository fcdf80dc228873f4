//! Demo that runs a few canned conversations through the router and the
//! reference caller, using the built-in knowledge seed.

use support_router::config::LogFormat;
use support_router::dispatch::dispatch;
use support_router::telemetry::init_tracing;
use support_router::{Action, KnowledgeHandle, RoutingConfig, SupportRouter, ToolChoice};

struct Scenario {
    title: &'static str,
    text: &'static str,
    customer_id: &'static str,
    config: RoutingConfig,
}

fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            title: "Friendly FAQ",
            text: "Hi! What’s your return policy?",
            customer_id: "CUST-789",
            config: RoutingConfig::default(),
        },
        Scenario {
            title: "Order tracking with ID (auto)",
            text: "Can you track my order ORD-1001?",
            customer_id: "CUST-789",
            config: RoutingConfig::new(ToolChoice::Auto).with_metadata("channel", "web"),
        },
        Scenario {
            title: "Order lookup required, valid ID",
            text: "Status for ORD-1002 please.",
            customer_id: "CUST-001",
            config: RoutingConfig::new(ToolChoice::Required).with_metadata("channel", "mobile-app"),
        },
        Scenario {
            title: "Missing ID (auto)",
            text: "I want the status of my order",
            customer_id: "CUST-002",
            config: RoutingConfig::new(ToolChoice::Auto).with_metadata("channel", "web"),
        },
        Scenario {
            title: "Unknown order",
            text: "Track ORD-9999 for me",
            customer_id: "CUST-002",
            config: RoutingConfig::new(ToolChoice::Auto).with_metadata("channel", "web"),
        },
        Scenario {
            title: "Negative message escalates",
            text: "This is the worst service ever, I’m furious! Track my damn order ORD-1003.",
            customer_id: "CUST-123",
            config: RoutingConfig::new(ToolChoice::Auto).with_metadata("channel", "web"),
        },
        Scenario {
            title: "Long message mentioning a FAQ topic",
            text: "Hello, I need help with a multi-country warranty claim involving two shipments, \
a customs dispute, and a missed delivery window, plus legal follow-up.",
            customer_id: "CUST-555",
            config: RoutingConfig::new(ToolChoice::Auto).with_metadata("channel", "email"),
        },
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(LogFormat::Compact)?;

    let knowledge = KnowledgeHandle::default();
    let router = SupportRouter::new(knowledge.clone());

    for (i, s) in scenarios().into_iter().enumerate() {
        println!("\n--- Demo {}: {} ---", i + 1, s.title);
        let action = router.route(s.text, s.customer_id, &s.config)?;
        match &action {
            Action::HandoffRequest { reason, .. } => println!("[HANDOFF] {reason}"),
            _ => println!("{}", dispatch(&action, &knowledge).await.text),
        }
        println!("{}", serde_json::to_string(&action)?);
    }

    println!("\nroute-demo done");
    Ok(())
}
