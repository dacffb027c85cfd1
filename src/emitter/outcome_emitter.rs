use event_emitter_rs::EventEmitter;
use serde::Serialize;

use crate::outcome::{report, Outcome, OutcomeReport};
use crate::record::Record;

/// Payload delivered to listeners, as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeNotice {
    pub collection: String,
    pub id: String,
    /// Committed version, for applied outcomes.
    pub version: Option<u64>,
    #[serde(flatten)]
    pub report: OutcomeReport,
}

impl OutcomeNotice {
    pub fn new<R: Record>(id: &str, outcome: &Outcome<R>) -> Self {
        Self {
            collection: R::COLLECTION.to_string(),
            id: id.to_string(),
            version: outcome.applied().map(|versioned| versioned.version),
            report: report(outcome),
        }
    }
}

/// Listener registry for mutation outcomes.
///
/// Listeners subscribe to an outcome code (`"applied"`, `"conflict_exhausted"`,
/// ...) and receive the [`OutcomeNotice`] as a JSON string. Lives beside the
/// engine, never inside it: notify after a call returns. Listeners run on
/// separate threads; no delivery order is guaranteed between notices.
///
/// # Example
///
/// ```ignore
/// let mut emitter = OutcomeEmitter::new();
/// emitter.on("applied", |notice| tracing::info!(%notice, "stock moved"));
///
/// let outcome = reserve(&engine, "sku-1", 2);
/// emitter.notify("sku-1", &outcome);
/// ```
pub struct OutcomeEmitter {
    event_emitter: EventEmitter,
    queued: Vec<(String, String)>,
}

impl Default for OutcomeEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutcomeEmitter {
    pub fn new() -> Self {
        Self {
            event_emitter: EventEmitter::new(),
            queued: Vec::new(),
        }
    }

    /// Register a listener for an outcome code.
    pub fn on<F>(&mut self, code: &str, listener: F)
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.event_emitter.on(code, listener);
    }

    /// Emit the outcome to its listeners immediately.
    pub fn notify<R: Record>(&mut self, id: &str, outcome: &Outcome<R>) {
        let (code, payload) = encode(id, outcome);
        self.event_emitter.emit(&code, payload);
    }

    /// Hold the outcome back until [`emit_queued`](Self::emit_queued).
    pub fn enqueue<R: Record>(&mut self, id: &str, outcome: &Outcome<R>) {
        self.queued.push(encode(id, outcome));
    }

    /// Emit all queued outcomes.
    ///
    /// Emission follows queue order, but each listener call runs on its own
    /// thread, so listeners may observe the outcomes in any order.
    pub fn emit_queued(&mut self) {
        let queued: Vec<_> = self.queued.drain(..).collect();
        for (code, payload) in queued {
            self.event_emitter.emit(&code, payload);
        }
    }

    /// Number of outcomes waiting for emission.
    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }
}

fn encode<R: Record>(id: &str, outcome: &Outcome<R>) -> (String, String) {
    let notice = OutcomeNotice::new(id, outcome);
    // Serializing plain strings and integers cannot fail.
    let payload = serde_json::to_string(&notice).unwrap_or_default();
    (outcome.code().to_string(), payload)
}
