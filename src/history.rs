//! history.rs: small in-memory ring of recent routing decisions for `/debug/history`.
//!
//! Entries carry only the hashed message id, never the text.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::decision::Action;
use crate::telemetry::message_id;

const MAX_CAP: usize = 10_000;

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub ts: DateTime<Utc>,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub msg_id: String,
}

#[derive(Debug)]
pub struct History {
    inner: Mutex<Vec<HistoryEntry>>,
    cap: usize,
}

impl History {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, MAX_CAP);
        Self {
            inner: Mutex::new(Vec::with_capacity(cap)),
            cap,
        }
    }

    pub fn push(&self, text: &str, action: &Action) {
        let reason = match action {
            Action::HandoffRequest { reason, .. } => Some(reason.to_string()),
            _ => None,
        };
        let entry = HistoryEntry {
            ts: Utc::now(),
            kind: action.kind(),
            reason,
            msg_id: message_id(text),
        };

        let mut v = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        v.push(entry);
        if v.len() > self.cap {
            let excess = v.len() - self.cap;
            v.drain(0..excess);
        }
    }

    /// Oldest first.
    pub fn snapshot_last_n(&self, n: usize) -> Vec<HistoryEntry> {
        let v = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        let start = v.len().saturating_sub(n);
        v[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
