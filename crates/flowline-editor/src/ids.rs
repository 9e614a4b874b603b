//! Node id generation
//!
//! Ids come from a monotonically increasing source and are never reused
//! within a session.

use chrono::Utc;

use crate::types::NodeId;

/// Source of fresh node ids
pub trait NodeIdSource: Send {
    /// Produce the next id. Must never repeat a previous value.
    fn next_id(&mut self) -> NodeId;

    /// Record an id that already exists (e.g. from a hydrated payload)
    /// so it is never produced again.
    fn observe(&mut self, _id: &str) {}
}

/// Millisecond timestamp ids, bumped when the clock has not advanced
#[derive(Debug, Default)]
pub struct TimestampIdSource {
    last: i64,
}

impl TimestampIdSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NodeIdSource for TimestampIdSource {
    fn next_id(&mut self) -> NodeId {
        let now = Utc::now().timestamp_millis();
        self.last = now.max(self.last + 1);
        self.last.to_string()
    }

    fn observe(&mut self, id: &str) {
        if let Ok(value) = id.parse::<i64>() {
            self.last = self.last.max(value);
        }
    }
}

/// Counter-based ids with a fixed prefix
///
/// Deterministic, which makes it the source of choice in tests.
#[derive(Debug)]
pub struct SequentialIdSource {
    prefix: String,
    next: u64,
}

impl SequentialIdSource {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIdSource {
    fn default() -> Self {
        Self::new("node-")
    }
}

impl NodeIdSource for SequentialIdSource {
    fn next_id(&mut self) -> NodeId {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }

    fn observe(&mut self, id: &str) {
        if let Some(value) = id
            .strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.parse::<u64>().ok())
        {
            self.next = self.next.max(value + 1);
        }
    }
}
