use axum::{routing::get, Router};
use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::decision::Action;

pub const ROUTE_ACTIONS_TOTAL: &str = "support_route_actions_total";
pub const ROUTE_ERRORS_TOTAL: &str = "support_route_config_errors_total";
pub const GUARDRAIL_TOTAL: &str = "support_guardrail_verdicts_total";

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Fails if one is already installed.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;
        Ok(Self { handle })
    }

    /// Router exposing `/metrics` in the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// Count one routing outcome. No-op when no recorder is installed.
pub fn record_action(action: &Action) {
    let reason = match action {
        Action::HandoffRequest { reason, .. } => reason.code(),
        _ => "",
    };
    counter!(ROUTE_ACTIONS_TOTAL, "action" => action.kind(), "reason" => reason).increment(1);
}

pub fn record_config_error() {
    counter!(ROUTE_ERRORS_TOTAL).increment(1);
}

pub fn record_guardrail(allowed: bool) {
    let outcome = if allowed { "allowed" } else { "blocked" };
    counter!(GUARDRAIL_TOTAL, "outcome" => outcome).increment(1);
}
