//! In-memory audit log of answered messages.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// One answered message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Starts at 1 and is never reused, even after eviction.
    pub sequence_id: u64,
    pub timestamp: DateTime<Utc>,
    pub user_message: String,
    pub bot_response: String,
    pub intent: String,
    pub confidence: f64,
}

/// Append-only log, optionally bounded; the oldest records are evicted first.
#[derive(Debug)]
pub struct ConversationLog {
    records: Mutex<VecDeque<ConversationRecord>>,
    next_sequence: AtomicU64,
    capacity: Option<usize>,
}

impl ConversationLog {
    /// `None` keeps every record.
    pub fn new(capacity: Option<usize>) -> Self {
        ConversationLog {
            records: Mutex::new(VecDeque::new()),
            next_sequence: AtomicU64::new(1),
            capacity,
        }
    }

    /// Append a record and return its sequence id.
    pub fn record(
        &self,
        user_message: &str,
        bot_response: &str,
        intent: &str,
        confidence: f64,
    ) -> u64 {
        let mut records = self.records.lock();
        // Taken under the lock so ids follow insertion order.
        let sequence_id = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        records.push_back(ConversationRecord {
            sequence_id,
            timestamp: Utc::now(),
            user_message: user_message.to_string(),
            bot_response: bot_response.to_string(),
            intent: intent.to_string(),
            confidence,
        });
        if let Some(capacity) = self.capacity {
            while records.len() > capacity {
                records.pop_front();
            }
        }
        sequence_id
    }

    /// The last `n` retained records, oldest first.
    pub fn recent(&self, n: usize) -> Vec<ConversationRecord> {
        let records = self.records.lock();
        let skip = records.len().saturating_sub(n);
        records.iter().skip(skip).cloned().collect()
    }

    /// Retained records.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Records ever appended, including evicted ones.
    pub fn total_recorded(&self) -> u64 {
        self.next_sequence.load(Ordering::Relaxed) - 1
    }

    /// Count of retained records per intent.
    pub fn intent_usage(&self) -> BTreeMap<String, usize> {
        let records = self.records.lock();
        let mut usage = BTreeMap::new();
        for record in records.iter() {
            *usage.entry(record.intent.clone()).or_insert(0) += 1;
        }
        usage
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}
