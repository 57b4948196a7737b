//! The in-memory report store shared by all request handlers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// One node's submitted report: its identifier plus the opaque serialized
/// result sequence. The server never parses `results`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeReport {
    /// Reporting node's identifier.
    #[serde(rename = "NodeID")]
    pub node_id: String,

    /// Serialized results, stored and returned verbatim.
    #[serde(rename = "Results")]
    pub results: String,
}

/// Map of node id → latest result blob, plus the append-only log of every
/// received report.
///
/// Both structures live behind ONE mutex: a submission mutates both, and
/// `/checkNode` scans the log while `/result` reads the map -- guarding
/// them separately would let a reader observe a node in one but not the
/// other. All state is process-lifetime only; nothing is persisted.
#[derive(Debug, Default)]
pub struct ReportStore {
    inner: Mutex<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    outputs: HashMap<String, Vec<u8>>,
    received: Vec<NodeReport>,
}

impl ReportStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submitted report: last-write-wins on the result map, and
    /// an unconditional append to the received log.
    pub fn record(&self, report: NodeReport) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .outputs
            .insert(report.node_id.clone(), report.results.clone().into_bytes());
        inner.received.push(report);
    }

    /// The stored result blob for a node, verbatim.
    #[must_use]
    pub fn results_for(&self, node_id: &str) -> Option<Vec<u8>> {
        self.inner.lock().unwrap().outputs.get(node_id).cloned()
    }

    /// Whether at least one report has been received from `node_id`.
    /// Linear in the number of received reports.
    #[must_use]
    pub fn has_reported(&self, node_id: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .received
            .iter()
            .any(|r| r.node_id == node_id)
    }

    /// Number of reports received so far (including overwrites).
    #[must_use]
    pub fn received_count(&self) -> usize {
        self.inner.lock().unwrap().received.len()
    }

    /// Number of distinct nodes with stored results.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.inner.lock().unwrap().outputs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn report(node: &str, results: &str) -> NodeReport {
        NodeReport {
            node_id: node.to_string(),
            results: results.to_string(),
        }
    }

    #[test]
    fn test_round_trip_verbatim() {
        let store = ReportStore::new();
        store.record(report("n1", r#"[{"Name":"x","Status":"PASS","Output":""}]"#));

        let bytes = store.results_for("n1").unwrap();
        assert_eq!(
            bytes,
            br#"[{"Name":"x","Status":"PASS","Output":""}]"#.to_vec()
        );
    }

    #[test]
    fn test_last_write_wins_but_log_keeps_both() {
        let store = ReportStore::new();
        store.record(report("n1", "first"));
        store.record(report("n1", "second"));

        assert_eq!(store.results_for("n1").unwrap(), b"second".to_vec());
        assert_eq!(store.received_count(), 2);
        assert_eq!(store.node_count(), 1);
    }

    #[test]
    fn test_unknown_node_is_none() {
        let store = ReportStore::new();
        assert!(store.results_for("ghost").is_none());
        assert!(!store.has_reported("ghost"));
    }

    #[test]
    fn test_has_reported_is_per_node() {
        let store = ReportStore::new();
        store.record(report("n1", "data"));
        assert!(store.has_reported("n1"));
        assert!(!store.has_reported("n2"));
    }

    #[test]
    fn test_wire_field_names() {
        let parsed: NodeReport =
            serde_json::from_str(r#"{"NodeID":"n1","Results":"[]"}"#).unwrap();
        assert_eq!(parsed.node_id, "n1");
        assert_eq!(parsed.results, "[]");
    }

    #[test]
    fn test_concurrent_distinct_nodes_all_persist() {
        let store = Arc::new(ReportStore::new());
        let mut handles = Vec::new();

        for i in 0..32 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                store.record(report(&format!("node-{i}"), &format!("results-{i}")));
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.node_count(), 32);
        for i in 0..32 {
            let bytes = store.results_for(&format!("node-{i}")).unwrap();
            assert_eq!(bytes, format!("results-{i}").into_bytes());
            assert!(store.has_reported(&format!("node-{i}")));
        }
    }
}
