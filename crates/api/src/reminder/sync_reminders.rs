use crate::reminder::scheduler::{ReminderScheduler, TimerId};
use crate::shared::usecase::UseCase;
use pillbox_domain::UserId;
use pillbox_infra::PillboxContext;
use std::collections::HashMap;
use std::sync::Arc;

/// Resynchronizes the armed timer set with the durable schedule state.
///
/// Computes the desired set (one timer per active medication with an
/// upcoming occurrence), cancels timers whose backing record is gone or
/// expired and arms the missing ones. Timers already armed at the right
/// instant are left untouched, so running this twice in a row is a no-op.
#[derive(Debug)]
pub struct SyncRemindersUseCase {
    pub scheduler: Arc<ReminderScheduler>,
    pub trigger: SyncRemindersTrigger,
}

#[derive(Debug)]
pub enum SyncRemindersTrigger {
    /// A user's medication set changed through an add or a clear-all.
    ScheduleModified(UserId),
    /// Startup recovery and the periodic consistency sweep. Covers all
    /// users; it only repairs the timer set and never dispatches, so it
    /// cannot double-deliver.
    JobScheduler,
}

#[derive(Debug, Default, PartialEq)]
pub struct SyncReport {
    pub armed: usize,
    pub canceled: usize,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

impl SyncRemindersUseCase {
    async fn reconcile_user(
        &self,
        user_id: &UserId,
        ctx: &PillboxContext,
    ) -> Result<SyncReport, UseCaseError> {
        let _guard = ctx.locks.acquire(user_id).await;

        let user = ctx
            .repos
            .users
            .find(user_id)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        let now = ctx.sys.now();
        let mut desired: HashMap<TimerId, chrono::DateTime<chrono::Utc>> = HashMap::new();
        if let Some(user) = &user {
            for (name, medication) in &user.medications {
                if let Some(due) = medication.next_occurrence(now) {
                    desired.insert(TimerId::new(user_id.clone(), name.clone()), due);
                }
            }
        }

        let mut report = SyncReport::default();
        for (id, _due) in self.scheduler.armed_for_user(user_id) {
            if !desired.contains_key(&id) && self.scheduler.cancel(&id) {
                report.canceled += 1;
            }
        }
        for (id, due) in desired {
            if self.scheduler.armed(&id) != Some(due) {
                report.armed += 1;
            }
            self.scheduler.arm(id, due);
        }
        Ok(report)
    }
}

#[async_trait::async_trait]
impl UseCase for SyncRemindersUseCase {
    type Response = SyncReport;

    type Errors = UseCaseError;

    const NAME: &'static str = "SyncReminders";

    async fn execute(&mut self, ctx: &PillboxContext) -> Result<Self::Response, Self::Errors> {
        match &self.trigger {
            SyncRemindersTrigger::ScheduleModified(user_id) => {
                let user_id = user_id.clone();
                self.reconcile_user(&user_id, ctx).await
            }
            SyncRemindersTrigger::JobScheduler => {
                let users = ctx
                    .repos
                    .users
                    .find_all()
                    .await
                    .map_err(|_| UseCaseError::StorageError)?;

                let mut report = SyncReport::default();
                for user in users {
                    // A failing user must not stop the sweep for the rest
                    if let Ok(user_report) = self.reconcile_user(&user.id, ctx).await {
                        report.armed += user_report.armed;
                        report.canceled += user_report.canceled;
                    }
                }
                Ok(report)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{instant, test_context};
    use crate::shared::usecase::execute;
    use pillbox_domain::{Medication, TimeOfDay, UserRecord};

    fn two_medication_user(user_id: &UserId) -> UserRecord {
        let start_date = chrono::NaiveDate::from_ymd_opt(2023, 4, 10).unwrap();
        let mut user = UserRecord::new(user_id.clone());
        user.add_medication(
            "Aspirin",
            Medication::new(TimeOfDay::new(8, 0).unwrap(), start_date, 3),
        );
        user.add_medication(
            "Ibuprofen",
            Medication::new(TimeOfDay::new(20, 30).unwrap(), start_date, 5),
        );
        user
    }

    #[tokio::test]
    async fn arms_one_timer_per_active_medication() {
        let now = instant(2023, 4, 10, 7, 0);
        let (ctx, _sys, _notifier) = test_context(now);
        let user_id = UserId::from("1");
        ctx.repos
            .users
            .save(&two_medication_user(&user_id))
            .await
            .unwrap();

        let scheduler = ReminderScheduler::new(ctx.clone());
        let usecase = SyncRemindersUseCase {
            scheduler: scheduler.clone(),
            trigger: SyncRemindersTrigger::ScheduleModified(user_id.clone()),
        };
        let report = execute(usecase, &ctx).await.unwrap();

        assert_eq!(report, SyncReport { armed: 2, canceled: 0 });
        assert_eq!(
            scheduler.armed(&TimerId::new(user_id.clone(), "Aspirin")),
            Some(instant(2023, 4, 10, 8, 0))
        );
        assert_eq!(
            scheduler.armed(&TimerId::new(user_id, "Ibuprofen")),
            Some(instant(2023, 4, 10, 20, 30))
        );
    }

    #[tokio::test]
    async fn reconciling_twice_is_a_noop() {
        let now = instant(2023, 4, 10, 7, 0);
        let (ctx, _sys, _notifier) = test_context(now);
        let user_id = UserId::from("1");
        ctx.repos
            .users
            .save(&two_medication_user(&user_id))
            .await
            .unwrap();

        let scheduler = ReminderScheduler::new(ctx.clone());
        let first = execute(
            SyncRemindersUseCase {
                scheduler: scheduler.clone(),
                trigger: SyncRemindersTrigger::ScheduleModified(user_id.clone()),
            },
            &ctx,
        )
        .await
        .unwrap();
        let armed_after_first: Vec<_> = scheduler.armed_for_user(&user_id);

        let second = execute(
            SyncRemindersUseCase {
                scheduler: scheduler.clone(),
                trigger: SyncRemindersTrigger::ScheduleModified(user_id.clone()),
            },
            &ctx,
        )
        .await
        .unwrap();

        assert_eq!(first, SyncReport { armed: 2, canceled: 0 });
        assert_eq!(second, SyncReport { armed: 0, canceled: 0 });
        let mut armed_after_second = scheduler.armed_for_user(&user_id);
        let mut armed_after_first = armed_after_first;
        armed_after_first.sort_by(|a, b| a.0.medication_name.cmp(&b.0.medication_name));
        armed_after_second.sort_by(|a, b| a.0.medication_name.cmp(&b.0.medication_name));
        assert_eq!(armed_after_first, armed_after_second);
    }

    #[tokio::test]
    async fn cancels_timers_for_cleared_medications() {
        let now = instant(2023, 4, 10, 7, 0);
        let (ctx, _sys, _notifier) = test_context(now);
        let user_id = UserId::from("1");
        let mut user = two_medication_user(&user_id);
        ctx.repos.users.save(&user).await.unwrap();

        let scheduler = ReminderScheduler::new(ctx.clone());
        execute(
            SyncRemindersUseCase {
                scheduler: scheduler.clone(),
                trigger: SyncRemindersTrigger::ScheduleModified(user_id.clone()),
            },
            &ctx,
        )
        .await
        .unwrap();
        assert_eq!(scheduler.armed_count(), 2);

        user.clear_medications();
        ctx.repos.users.save(&user).await.unwrap();

        let report = execute(
            SyncRemindersUseCase {
                scheduler: scheduler.clone(),
                trigger: SyncRemindersTrigger::ScheduleModified(user_id.clone()),
            },
            &ctx,
        )
        .await
        .unwrap();

        assert_eq!(report, SyncReport { armed: 0, canceled: 2 });
        assert_eq!(scheduler.armed_count(), 0);
    }

    #[tokio::test]
    async fn expired_courses_are_not_armed() {
        // Three days past the end of the 3-day Aspirin course, Ibuprofen
        // (5 days) is also over
        let now = instant(2023, 4, 20, 7, 0);
        let (ctx, _sys, _notifier) = test_context(now);
        let user_id = UserId::from("1");
        ctx.repos
            .users
            .save(&two_medication_user(&user_id))
            .await
            .unwrap();

        let scheduler = ReminderScheduler::new(ctx.clone());
        let report = execute(
            SyncRemindersUseCase {
                scheduler: scheduler.clone(),
                trigger: SyncRemindersTrigger::ScheduleModified(user_id),
            },
            &ctx,
        )
        .await
        .unwrap();

        assert_eq!(report, SyncReport::default());
        assert_eq!(scheduler.armed_count(), 0);
    }

    #[tokio::test]
    async fn startup_sweep_covers_all_users() {
        let now = instant(2023, 4, 10, 7, 0);
        let (ctx, _sys, _notifier) = test_context(now);
        ctx.repos
            .users
            .save(&two_medication_user(&UserId::from("1")))
            .await
            .unwrap();
        ctx.repos
            .users
            .save(&two_medication_user(&UserId::from("2")))
            .await
            .unwrap();

        let scheduler = ReminderScheduler::new(ctx.clone());
        let report = execute(
            SyncRemindersUseCase {
                scheduler: scheduler.clone(),
                trigger: SyncRemindersTrigger::JobScheduler,
            },
            &ctx,
        )
        .await
        .unwrap();

        assert_eq!(report, SyncReport { armed: 4, canceled: 0 });
        assert_eq!(scheduler.armed_count(), 4);
    }
}
