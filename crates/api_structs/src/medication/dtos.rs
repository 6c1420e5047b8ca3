use chrono::{DateTime, NaiveDate, Utc};
use pillbox_domain::{Adherence, Medication, TimeOfDay};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationDTO {
    pub name: String,
    pub time_of_day: TimeOfDay,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: i64,
    pub days_left: i64,
}

impl MedicationDTO {
    pub fn new(name: &str, medication: &Medication, now: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            time_of_day: medication.time_of_day,
            start_date: medication.start_date,
            end_date: medication.end_date(),
            duration_days: medication.duration_days,
            days_left: medication.days_left(now),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdherenceDTO {
    pub medication_name: String,
    pub taken: u32,
    pub skipped: u32,
    /// Share of the course days marked as taken, in percent
    pub taken_percent: f64,
}

impl AdherenceDTO {
    pub fn new(medication_name: &str, adherence: &Adherence, duration_days: i64) -> Self {
        let taken_percent = if duration_days > 0 {
            f64::from(adherence.taken) / duration_days as f64 * 100.0
        } else {
            0.0
        };
        Self {
            medication_name: medication_name.to_string(),
            taken: adherence.taken,
            skipped: adherence.skipped,
            taken_percent,
        }
    }
}
