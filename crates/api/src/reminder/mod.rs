mod dispatch_reminder;
mod record_response;
pub mod scheduler;
mod sync_reminders;

pub use sync_reminders::{SyncRemindersTrigger, SyncRemindersUseCase};

use crate::error::PillboxError;
use crate::shared::usecase::execute;
use actix_web::{web, HttpResponse};
use pillbox_api_structs::record_response::*;
use pillbox_domain::UserId;
use pillbox_infra::PillboxContext;
use record_response::RecordResponseUseCase;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/users/{user_id}/responses",
        web::post().to(record_response_controller),
    );
}

fn handle_record_response_error(e: record_response::UseCaseError) -> PillboxError {
    match e {
        record_response::UseCaseError::NotFound => PillboxError::NotFound(
            "Could not update adherence, the medication no longer exists.".into(),
        ),
        record_response::UseCaseError::StorageError => {
            PillboxError::StoreUnavailable("Unable to record the response right now.".into())
        }
    }
}

async fn record_response_controller(
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<PillboxContext>,
) -> Result<HttpResponse, PillboxError> {
    let body = body.into_inner();
    let medication_name = body.medication_name.clone();

    let usecase = RecordResponseUseCase {
        user_id: UserId::from(path_params.user_id.as_str()),
        medication_name: body.medication_name,
        outcome: body.outcome,
    };

    execute(usecase, &ctx)
        .await
        .map(|adherence| HttpResponse::Ok().json(APIResponse::new(medication_name, adherence)))
        .map_err(handle_record_response_error)
}

#[cfg(test)]
mod tests {
    use super::scheduler::{ReminderScheduler, TimerId};
    use super::*;
    use crate::medication::{AddMedicationUseCase, ClearMedicationsUseCase};
    use crate::reminder::record_response::RecordResponseUseCase;
    use crate::shared::test_helpers::{instant, test_context};
    use pillbox_domain::{Adherence, ResponseOutcome, TimeOfDay};
    use std::sync::Arc;

    async fn reconcile(
        scheduler: &Arc<ReminderScheduler>,
        user_id: &UserId,
        ctx: &PillboxContext,
    ) {
        execute(
            SyncRemindersUseCase {
                scheduler: scheduler.clone(),
                trigger: SyncRemindersTrigger::ScheduleModified(user_id.clone()),
            },
            ctx,
        )
        .await
        .unwrap();
    }

    async fn respond(user_id: &UserId, outcome: ResponseOutcome, ctx: &PillboxContext) {
        execute(
            RecordResponseUseCase {
                user_id: user_id.clone(),
                medication_name: "Aspirin".into(),
                outcome,
            },
            ctx,
        )
        .await
        .unwrap();
    }

    /// Walks a three day Aspirin course end to end: a reminder fires each
    /// course day, responses land on the counters and the course goes
    /// silent once it expires.
    #[tokio::test]
    async fn three_day_course_end_to_end() {
        let day_0 = instant(2023, 4, 10, 7, 50);
        let (ctx, sys, notifier) = test_context(day_0);
        let user_id = UserId::from("1");
        let id = TimerId::new(user_id.clone(), "Aspirin");

        execute(
            AddMedicationUseCase {
                user_id: user_id.clone(),
                name: "Aspirin".into(),
                time_of_day: TimeOfDay::new(8, 0).unwrap(),
                duration_days: 3,
            },
            &ctx,
        )
        .await
        .unwrap();

        let scheduler = ReminderScheduler::new(ctx.clone());
        reconcile(&scheduler, &user_id, &ctx).await;
        assert_eq!(scheduler.armed(&id), Some(instant(2023, 4, 10, 8, 0)));

        // Day 0: reminder fires, user takes the medication
        sys.set(instant(2023, 4, 10, 8, 0));
        assert!(scheduler.trigger(&id).await);
        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(scheduler.armed(&id), Some(instant(2023, 4, 11, 8, 0)));
        respond(&user_id, ResponseOutcome::Taken, &ctx).await;

        // Day 1: reminder fires, no response given
        sys.set(instant(2023, 4, 11, 8, 0));
        assert!(scheduler.trigger(&id).await);
        assert_eq!(notifier.sent().len(), 2);
        assert_eq!(scheduler.armed(&id), Some(instant(2023, 4, 12, 8, 0)));

        // Day 2: last reminder of the course, user skips
        sys.set(instant(2023, 4, 12, 8, 0));
        assert!(scheduler.trigger(&id).await);
        assert_eq!(notifier.sent().len(), 3);
        assert_eq!(scheduler.armed(&id), None);
        respond(&user_id, ResponseOutcome::Skipped, &ctx).await;

        // Day 3: course expired, nothing fires and reconciling arms nothing
        sys.set(instant(2023, 4, 13, 8, 0));
        reconcile(&scheduler, &user_id, &ctx).await;
        assert_eq!(scheduler.armed_count(), 0);
        assert_eq!(notifier.sent().len(), 3);

        let stored = ctx.repos.users.find(&user_id).await.unwrap().unwrap();
        assert_eq!(
            stored.adherence.get("Aspirin"),
            Some(&Adherence { taken: 1, skipped: 1 })
        );
    }

    /// Clearing one user's medications cancels that user's timers and
    /// resets the counters without touching anybody else.
    #[tokio::test]
    async fn clear_all_cancels_timers_and_resets_counters() {
        let now = instant(2023, 4, 10, 7, 0);
        let (ctx, _sys, notifier) = test_context(now);
        let user_1 = UserId::from("1");
        let user_2 = UserId::from("2");

        for (user_id, name) in &[
            (&user_1, "Aspirin"),
            (&user_1, "Ibuprofen"),
            (&user_2, "Aspirin"),
        ] {
            execute(
                AddMedicationUseCase {
                    user_id: (*user_id).clone(),
                    name: (*name).into(),
                    time_of_day: TimeOfDay::new(8, 0).unwrap(),
                    duration_days: 3,
                },
                &ctx,
            )
            .await
            .unwrap();
        }
        respond(&user_1, ResponseOutcome::Taken, &ctx).await;

        let scheduler = ReminderScheduler::new(ctx.clone());
        reconcile(&scheduler, &user_1, &ctx).await;
        reconcile(&scheduler, &user_2, &ctx).await;
        assert_eq!(scheduler.armed_count(), 3);

        execute(
            ClearMedicationsUseCase {
                user_id: user_1.clone(),
            },
            &ctx,
        )
        .await
        .unwrap();
        reconcile(&scheduler, &user_1, &ctx).await;

        // The cleared user's timers are gone, the other user's remain
        assert_eq!(scheduler.armed_for_user(&user_1).len(), 0);
        assert_eq!(scheduler.armed_for_user(&user_2).len(), 1);

        let stored = ctx.repos.users.find(&user_1).await.unwrap().unwrap();
        assert!(stored.adherence.is_empty());

        // And no dispatch ever happens for the canceled timers
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(notifier.sent().is_empty());
    }
}
