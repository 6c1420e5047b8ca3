use crate::{Adherence, Medication, ResponseOutcome};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;

/// Identifier handed to us by the chat transport. Opaque to the core.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Everything the store keeps for one user: the medication set and the
/// adherence counters, both keyed by medication name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    pub medications: HashMap<String, Medication>,
    pub adherence: HashMap<String, Adherence>,
}

impl UserRecord {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            medications: HashMap::new(),
            adherence: HashMap::new(),
        }
    }

    /// Inserts or replaces a medication. Adherence counters for an already
    /// known name survive the overwrite so re-adding a medication does not
    /// wipe its history.
    pub fn add_medication(&mut self, name: &str, medication: Medication) {
        self.medications.insert(name.to_string(), medication);
        self.adherence.entry(name.to_string()).or_default();
    }

    /// Removes all medications and resets all adherence counters.
    pub fn clear_medications(&mut self) -> usize {
        let deleted_count = self.medications.len();
        self.medications.clear();
        self.adherence.clear();
        deleted_count
    }

    pub fn medication(&self, name: &str) -> Option<&Medication> {
        self.medications.get(name)
    }

    /// Increments the matching adherence counter, returning the new counts.
    /// `None` when no counter exists for `name`, which happens when a
    /// response races a clear-all; the record must not be resurrected.
    pub fn record_response(&mut self, name: &str, outcome: ResponseOutcome) -> Option<Adherence> {
        let adherence = self.adherence.get_mut(name)?;
        adherence.record(outcome);
        Some(adherence.clone())
    }
}
