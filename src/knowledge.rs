// src/knowledge.rs
//! FAQ and order tables the router reads.
//!
//! - Loaded from TOML (`config/knowledge.toml` by default) or the compiled-in seed.
//! - FAQ topics keep file order; matching is first-declared-wins.
//! - Held as an immutable snapshot behind [`KnowledgeHandle`]; updates swap the
//!   whole snapshot so a routing call never sees a half-applied table.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::capability::OrderLookup;
use crate::classify::is_canonical_order_id;
use crate::error::{KnowledgeError, LookupError};

const SEED_TOML: &str = include_str!("../config/knowledge.toml");
const RELOAD_POLL: Duration = Duration::from_secs(2);

/// One FAQ topic; `topic` is stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub topic: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub status: String,
    #[serde(default)]
    pub eta: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KnowledgeFile {
    #[serde(default)]
    faq: Vec<FaqEntry>,
    #[serde(default)]
    orders: BTreeMap<String, OrderRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeBase {
    faqs: Vec<FaqEntry>,
    orders: BTreeMap<String, OrderRecord>,
}

impl KnowledgeBase {
    pub fn new(
        faqs: Vec<FaqEntry>,
        orders: BTreeMap<String, OrderRecord>,
    ) -> Result<Self, KnowledgeError> {
        let mut clean = Vec::with_capacity(faqs.len());
        for (index, entry) in faqs.into_iter().enumerate() {
            let topic = entry.topic.trim().to_lowercase();
            if topic.is_empty() {
                return Err(KnowledgeError::EmptyTopic { index });
            }
            clean.push(FaqEntry {
                topic,
                answer: entry.answer,
            });
        }
        if let Some(bad) = orders.keys().find(|id| !is_canonical_order_id(id)) {
            return Err(KnowledgeError::InvalidOrderId(bad.clone()));
        }
        Ok(Self {
            faqs: clean,
            orders,
        })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, KnowledgeError> {
        let file: KnowledgeFile = toml::from_str(raw)?;
        Self::new(file.faq, file.orders)
    }

    pub fn load(path: &Path) -> Result<Self, KnowledgeError> {
        let raw = fs::read_to_string(path).map_err(|source| KnowledgeError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Load `path` if it exists, otherwise fall back to the built-in seed.
    pub fn load_or_seed(path: &Path) -> Result<Self, KnowledgeError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "knowledge file missing; using built-in seed");
            Ok(Self::default_seed())
        }
    }

    /// Built-in tables compiled from `config/knowledge.toml`.
    pub fn default_seed() -> Self {
        Self::from_toml_str(SEED_TOML).unwrap_or_else(|e| {
            warn!(error = %e, "built-in knowledge seed is invalid; starting empty");
            Self::default()
        })
    }

    pub fn faqs(&self) -> &[FaqEntry] {
        &self.faqs
    }

    pub fn order(&self, order_id: &str) -> Option<&OrderRecord> {
        self.orders.get(order_id)
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}

/* ----------------------------
Thread-safe handle + hot reload
---------------------------- */

#[derive(Clone, Debug)]
pub struct KnowledgeHandle {
    inner: Arc<RwLock<Arc<KnowledgeBase>>>,
}

impl KnowledgeHandle {
    pub fn new(kb: KnowledgeBase) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(kb))),
        }
    }

    /// Current snapshot. Holding it pins that version for as long as needed.
    pub fn snapshot(&self) -> Arc<KnowledgeBase> {
        match self.inner.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    pub fn replace(&self, kb: KnowledgeBase) {
        let fresh = Arc::new(kb);
        match self.inner.write() {
            Ok(mut guard) => *guard = fresh,
            Err(poisoned) => *poisoned.into_inner() = fresh,
        }
    }

    /// Re-read `path` and swap it in. On error the previous snapshot stays.
    pub fn reload_from(&self, path: &Path) -> Result<(), KnowledgeError> {
        let kb = KnowledgeBase::load(path)?;
        info!(
            path = %path.display(),
            faqs = kb.faqs().len(),
            orders = kb.order_count(),
            "knowledge snapshot reloaded"
        );
        self.replace(kb);
        Ok(())
    }
}

impl Default for KnowledgeHandle {
    fn default() -> Self {
        Self::new(KnowledgeBase::default_seed())
    }
}

#[async_trait]
impl OrderLookup for KnowledgeHandle {
    async fn lookup(&self, order_id: &str) -> Result<OrderRecord, LookupError> {
        self.snapshot()
            .order(order_id)
            .cloned()
            .ok_or_else(|| LookupError::NotFound {
                order_id: order_id.to_string(),
            })
    }
}

/// Modification time of `path`, or `None` when it does not exist (yet).
pub fn modified_at(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Poll `path` mtime every 2s and swap in a fresh snapshot when it changes.
///
/// `baseline` is the mtime of the file the current snapshot came from, taken
/// before it was loaded (`None` when the seed is in use). A file that appears
/// after a `None` baseline counts as a change.
pub fn start_hot_reload_thread(
    handle: KnowledgeHandle,
    path: PathBuf,
    baseline: Option<SystemTime>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut last_mtime = baseline;

        loop {
            thread::sleep(RELOAD_POLL);

            let Some(mtime) = modified_at(&path) else {
                continue;
            };
            if last_mtime.is_some_and(|prev| mtime == prev) {
                continue;
            }
            if let Err(e) = handle.reload_from(&path) {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "knowledge reload failed; keeping previous snapshot"
                );
            }
            last_mtime = Some(mtime);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_has_three_topics_in_file_order() {
        let kb = KnowledgeBase::default_seed();
        let topics: Vec<&str> = kb.faqs().iter().map(|f| f.topic.as_str()).collect();
        assert_eq!(topics, vec!["return policy", "shipping time", "warranty"]);
        assert_eq!(kb.order_count(), 3);
    }

    #[test]
    fn seed_orders_keep_optional_fields() {
        let kb = KnowledgeBase::default_seed();
        let shipped = kb.order("ORD-1001").unwrap();
        assert_eq!(shipped.carrier.as_deref(), Some("DHL"));
        let processing = kb.order("ORD-1002").unwrap();
        assert!(processing.carrier.is_none());
        assert!(kb.order("ORD-9999").is_none());
    }

    #[test]
    fn topics_are_trimmed_and_lowercased() {
        let kb = KnowledgeBase::from_toml_str(
            r#"
[[faq]]
topic = "  Gift Cards "
answer = "Gift cards never expire."
"#,
        )
        .unwrap();
        assert_eq!(kb.faqs()[0].topic, "gift cards");
    }

    #[test]
    fn empty_topic_is_rejected() {
        let err = KnowledgeBase::from_toml_str(
            r#"
[[faq]]
topic = "   "
answer = "x"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, KnowledgeError::EmptyTopic { index: 0 }));
    }

    #[test]
    fn non_canonical_order_id_is_rejected() {
        let err = KnowledgeBase::from_toml_str(
            r#"
[orders."ORD1001"]
status = "Shipped"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, KnowledgeError::InvalidOrderId(ref id) if id == "ORD1001"));
    }

    #[test]
    fn snapshot_survives_replace() {
        let handle = KnowledgeHandle::default();
        let before = handle.snapshot();
        handle.replace(KnowledgeBase::default());

        assert_eq!(before.faqs().len(), 3, "held snapshot must not change");
        assert!(handle.snapshot().faqs().is_empty());
    }

    #[tokio::test]
    async fn lookup_reads_current_snapshot() {
        let handle = KnowledgeHandle::default();
        let rec = handle.lookup("ORD-1003").await.unwrap();
        assert_eq!(rec.status, "Delivered");

        let err = handle.lookup("ORD-9999").await.unwrap_err();
        assert_eq!(
            err,
            LookupError::NotFound {
                order_id: "ORD-9999".into()
            }
        );
    }
}
