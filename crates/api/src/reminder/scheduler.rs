use crate::reminder::dispatch_reminder::DispatchReminderUseCase;
use crate::shared::usecase::execute;
use chrono::{DateTime, Utc};
use pillbox_domain::UserId;
use pillbox_infra::PillboxContext;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::error;

/// Key of an outstanding reminder timer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimerId {
    pub user_id: UserId,
    pub medication_name: String,
}

impl TimerId {
    pub fn new(user_id: UserId, medication_name: impl Into<String>) -> Self {
        Self {
            user_id,
            medication_name: medication_name.into(),
        }
    }
}

struct ArmedTimer {
    due: DateTime<Utc>,
    generation: u64,
    handle: JoinHandle<()>,
}

/// Owns at most one outstanding timer per (user, medication) pair.
///
/// Timers are armed and canceled by the reconciler. A timer that fires
/// claims its map entry (which a cancellation that happened first will
/// have removed), takes the owning user's lock, dispatches through the
/// `DispatchReminderUseCase` and re-arms at the next occurrence the
/// dispatcher reports. The generation counter makes cancel-versus-fire
/// deterministic: a sleeper whose generation no longer matches the map
/// entry was superseded and gives up.
pub struct ReminderScheduler {
    ctx: PillboxContext,
    timers: Mutex<HashMap<TimerId, ArmedTimer>>,
    generation: AtomicU64,
}

impl fmt::Debug for ReminderScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReminderScheduler")
            .field("armed", &self.armed_count())
            .finish()
    }
}

impl ReminderScheduler {
    pub fn new(ctx: PillboxContext) -> Arc<Self> {
        Arc::new(Self {
            ctx,
            timers: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
        })
    }

    /// The due instant `id` is currently armed for, if any.
    pub fn armed(&self, id: &TimerId) -> Option<DateTime<Utc>> {
        self.timers.lock().unwrap().get(id).map(|timer| timer.due)
    }

    pub fn armed_count(&self) -> usize {
        self.timers.lock().unwrap().len()
    }

    pub fn armed_for_user(&self, user_id: &UserId) -> Vec<(TimerId, DateTime<Utc>)> {
        self.timers
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| &id.user_id == user_id)
            .map(|(id, timer)| (id.clone(), timer.due))
            .collect()
    }

    /// Arms `id` to fire at `due`. A timer already armed at that exact
    /// instant is left untouched so that reconciliation never shifts the
    /// phase of a pending reminder.
    pub fn arm(self: &Arc<Self>, id: TimerId, due: DateTime<Utc>) {
        let mut timers = self.timers.lock().unwrap();
        if let Some(existing) = timers.get(&id) {
            if existing.due == due {
                return;
            }
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let delay = (due - self.ctx.sys.now()).to_std().unwrap_or_default();
        let scheduler = self.clone();
        let timer_id = id.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            scheduler.fire(timer_id, generation).await;
        });

        if let Some(superseded) = timers.insert(id, ArmedTimer { due, generation, handle }) {
            superseded.handle.abort();
        }
    }

    /// Cancels the outstanding timer for `id`. A firing that has already
    /// claimed its entry is past the point of cancellation and completes;
    /// its re-arm is suppressed by the dispatcher's store re-read.
    pub fn cancel(&self, id: &TimerId) -> bool {
        match self.timers.lock().unwrap().remove(id) {
            Some(timer) => {
                timer.handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn cancel_user(&self, user_id: &UserId) -> usize {
        let mut timers = self.timers.lock().unwrap();
        let ids: Vec<_> = timers
            .keys()
            .filter(|id| &id.user_id == user_id)
            .cloned()
            .collect();
        for id in &ids {
            if let Some(timer) = timers.remove(id) {
                timer.handle.abort();
            }
        }
        ids.len()
    }

    /// Runs the fire path of an armed timer right away, bypassing its
    /// sleeper. Lets tests step through a course without waiting.
    #[cfg(test)]
    pub(crate) async fn trigger(self: &Arc<Self>, id: &TimerId) -> bool {
        let generation = match self.timers.lock().unwrap().get(id) {
            Some(armed) => armed.generation,
            None => return false,
        };
        self.clone().fire(id.clone(), generation).await;
        true
    }

    async fn fire(self: Arc<Self>, id: TimerId, generation: u64) {
        // Claim the entry. Losing the claim means a cancel or a newer arm
        // won the race and this sleeper must not dispatch.
        let fired_at = {
            let mut timers = self.timers.lock().unwrap();
            let due = match timers.get(&id) {
                Some(armed) if armed.generation == generation => armed.due,
                _ => return,
            };
            timers.remove(&id);
            due
        };

        // The user lock keeps dispatch and re-arm mutually exclusive with
        // reconciliation and schedule mutations for this user.
        let _guard = self.ctx.locks.acquire(&id.user_id).await;

        let usecase = DispatchReminderUseCase {
            user_id: id.user_id.clone(),
            medication_name: id.medication_name.clone(),
            fired_at,
        };
        match execute(usecase, &self.ctx).await {
            Ok(dispatched) => {
                if let Some(next_due) = dispatched.next_due {
                    self.arm(id, next_due);
                }
            }
            Err(e) => {
                // Leave the key unarmed; the periodic reconciliation sweep
                // re-arms it once the store is reachable again. Other keys
                // are unaffected.
                error!(
                    "Failed to dispatch reminder for user: {} medication: {}: {:?}",
                    id.user_id, id.medication_name, e
                );
            }
        }
    }
}
