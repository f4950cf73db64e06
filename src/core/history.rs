//! Transition history tracking.
//!
//! Machines can keep a bounded log of the transitions they performed,
//! which is handy for test harnesses and for post-mortem dumps of a device
//! that ended up in an unexpected state.

use super::event::EventId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// How an event was consumed.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// Exit on the old state, enter on the new one.
    External,
    /// Self-loop edge handled by the state's internal action.
    Internal,
}

/// Record of a single consumed event.
///
/// # Example
///
/// ```rust
/// use deferflow::core::{EventId, TransitionKind, TransitionLog, TransitionRecord};
/// use chrono::Utc;
///
/// let mut log = TransitionLog::new(8);
/// log.record(TransitionRecord {
///     from: "Idle".into(),
///     to: "Backlight".into(),
///     trigger: EventId::new(1),
///     kind: TransitionKind::External,
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(log.get_path(), vec!["Idle", "Backlight"]);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Label of the state the event was evaluated in
    pub from: String,
    /// Label of the state the machine ended up in
    pub to: String,
    /// The event that drove the transition
    pub trigger: EventId,
    pub kind: TransitionKind,
    /// When the transition completed
    pub timestamp: DateTime<Utc>,
}

impl TransitionRecord {
    pub(crate) fn now(
        from: String,
        to: String,
        trigger: EventId,
        kind: TransitionKind,
    ) -> Self {
        Self {
            from,
            to,
            trigger,
            kind,
            timestamp: Utc::now(),
        }
    }
}

/// Bounded, ordered log of transitions.
///
/// Once `limit` records are held, recording a new one evicts the oldest.
/// A limit of zero disables recording entirely.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionLog {
    limit: usize,
    records: VecDeque<TransitionRecord>,
}

impl TransitionLog {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            records: VecDeque::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.limit > 0
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn record(&mut self, record: TransitionRecord) {
        if self.limit == 0 {
            return;
        }
        while self.records.len() >= self.limit {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records, oldest first.
    pub fn transitions(&self) -> impl Iterator<Item = &TransitionRecord> + '_ {
        self.records.iter()
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` label of the oldest retained record followed by
    /// the `to` label of each record. Internal transitions repeat a label.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.records.front() {
            path.push(first.from.as_str());
        }
        for record in &self.records {
            path.push(record.to.as_str());
        }
        path
    }

    /// Time between the oldest and newest retained record.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.front()?, self.records.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn last(&self) -> Option<&TransitionRecord> {
        self.records.back()
    }
}
