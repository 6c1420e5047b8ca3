mod adherence;
mod medication;
mod user;

pub use adherence::{Adherence, ResponseOutcome};
pub use medication::{InvalidTimeOfDayError, Medication, TimeOfDay};
pub use user::{UserId, UserRecord};
