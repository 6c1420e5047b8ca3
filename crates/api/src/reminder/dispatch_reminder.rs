use crate::shared::usecase::UseCase;
use chrono::{DateTime, Utc};
use pillbox_domain::UserId;
use pillbox_infra::PillboxContext;
use tracing::{info, warn};

/// Delivers one due reminder occurrence.
///
/// Re-reads the medication from the store first: a record that was deleted
/// or expired while the timer was in flight produces no send and no next
/// occurrence, which is how a racing clear-all suppresses the re-arm.
/// The caller is expected to hold the user's lock.
#[derive(Debug)]
pub struct DispatchReminderUseCase {
    pub user_id: UserId,
    pub medication_name: String,
    /// The armed instant that triggered this dispatch
    pub fired_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct DispatchOutcome {
    /// Whether the notifier accepted the reminder
    pub delivered: bool,
    /// When this medication is due next; `None` means do not re-arm
    pub next_due: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait]
impl UseCase for DispatchReminderUseCase {
    type Response = DispatchOutcome;

    type Errors = UseCaseError;

    const NAME: &'static str = "DispatchReminder";

    async fn execute(&mut self, ctx: &PillboxContext) -> Result<Self::Response, Self::Errors> {
        let user = ctx
            .repos
            .users
            .find(&self.user_id)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        let now = ctx.sys.now();
        let medication = match user
            .as_ref()
            .and_then(|user| user.medication(&self.medication_name))
        {
            Some(medication) if medication.is_active(now) => medication,
            _ => {
                info!(
                    "Medication: {} for user: {} is gone or expired, skipping dispatch",
                    self.medication_name, self.user_id
                );
                return Ok(DispatchOutcome {
                    delivered: false,
                    next_due: None,
                });
            }
        };

        let delivered = match ctx.notifier.send(&self.user_id, &self.medication_name).await {
            Ok(()) => true,
            Err(e) => {
                // Best effort: no retry within this occurrence, the next
                // scheduled occurrence is the retry boundary.
                warn!(
                    "Could not deliver reminder for user: {} medication: {}: {}",
                    self.user_id, self.medication_name, e
                );
                false
            }
        };

        // Recompute from the fired instant so this occurrence is never
        // scheduled twice. A process that slept past several occurrences
        // skips ahead to the next future one.
        let reference = if now > self.fired_at { now } else { self.fired_at };
        Ok(DispatchOutcome {
            delivered,
            next_due: medication.next_occurrence_after(reference),
        })
    }
}
