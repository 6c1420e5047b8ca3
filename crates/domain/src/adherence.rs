use serde::{Deserialize, Serialize};

/// A user's answer to a delivered reminder prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseOutcome {
    Taken,
    Skipped,
}

/// Running taken/skipped counters for one medication. Created alongside
/// the medication, reset only when the whole medication set is cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adherence {
    pub taken: u32,
    pub skipped: u32,
}

impl Adherence {
    pub fn record(&mut self, outcome: ResponseOutcome) {
        match outcome {
            ResponseOutcome::Taken => self.taken += 1,
            ResponseOutcome::Skipped => self.skipped += 1,
        }
    }
}
