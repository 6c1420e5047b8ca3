use crate::shared::usecase::UseCase;
use pillbox_domain::{Adherence, ResponseOutcome, UserId};
use pillbox_infra::PillboxContext;

/// Applies one taken/skipped response to the matching adherence counter.
///
/// `NotFound` is an expected race outcome: a stale prompt button pressed
/// after a clear-all must neither crash nor resurrect the record.
#[derive(Debug)]
pub struct RecordResponseUseCase {
    pub user_id: UserId,
    pub medication_name: String,
    pub outcome: ResponseOutcome,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound,
    StorageError,
}

#[async_trait::async_trait]
impl UseCase for RecordResponseUseCase {
    type Response = Adherence;

    type Errors = UseCaseError;

    const NAME: &'static str = "RecordResponse";

    async fn execute(&mut self, ctx: &PillboxContext) -> Result<Self::Response, Self::Errors> {
        let _guard = ctx.locks.acquire(&self.user_id).await;

        let mut user = ctx
            .repos
            .users
            .find(&self.user_id)
            .await
            .map_err(|_| UseCaseError::StorageError)?
            .ok_or(UseCaseError::NotFound)?;

        let adherence = user
            .record_response(&self.medication_name, self.outcome)
            .ok_or(UseCaseError::NotFound)?;

        ctx.repos
            .users
            .save(&user)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(adherence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{instant, test_context};
    use crate::shared::usecase::execute;
    use pillbox_domain::{Medication, TimeOfDay, UserRecord};

    async fn seed_user(ctx: &PillboxContext, user_id: &UserId) {
        let mut user = UserRecord::new(user_id.clone());
        user.add_medication(
            "Aspirin",
            Medication::new(
                TimeOfDay::new(8, 0).unwrap(),
                chrono::NaiveDate::from_ymd_opt(2023, 4, 10).unwrap(),
                3,
            ),
        );
        ctx.repos.users.save(&user).await.unwrap();
    }

    fn record(user_id: &UserId, outcome: ResponseOutcome) -> RecordResponseUseCase {
        RecordResponseUseCase {
            user_id: user_id.clone(),
            medication_name: "Aspirin".into(),
            outcome,
        }
    }

    #[tokio::test]
    async fn increments_and_persists_the_matching_counter() {
        let (ctx, _sys, _notifier) = test_context(instant(2023, 4, 10, 9, 0));
        let user_id = UserId::from("1");
        seed_user(&ctx, &user_id).await;

        let counts = execute(record(&user_id, ResponseOutcome::Taken), &ctx)
            .await
            .unwrap();
        assert_eq!(counts, Adherence { taken: 1, skipped: 0 });

        let counts = execute(record(&user_id, ResponseOutcome::Taken), &ctx)
            .await
            .unwrap();
        assert_eq!(counts, Adherence { taken: 2, skipped: 0 });

        let counts = execute(record(&user_id, ResponseOutcome::Skipped), &ctx)
            .await
            .unwrap();
        assert_eq!(counts, Adherence { taken: 2, skipped: 1 });

        let stored = ctx.repos.users.find(&user_id).await.unwrap().unwrap();
        assert_eq!(
            stored.adherence.get("Aspirin"),
            Some(&Adherence { taken: 2, skipped: 1 })
        );
    }

    #[tokio::test]
    async fn response_for_unknown_user_is_not_found() {
        let (ctx, _sys, _notifier) = test_context(instant(2023, 4, 10, 9, 0));

        let res = execute(record(&UserId::from("404"), ResponseOutcome::Taken), &ctx).await;
        assert_eq!(res.unwrap_err(), UseCaseError::NotFound);
    }

    #[tokio::test]
    async fn response_after_clear_all_is_not_found_and_resurrects_nothing() {
        let (ctx, _sys, _notifier) = test_context(instant(2023, 4, 10, 9, 0));
        let user_id = UserId::from("1");
        seed_user(&ctx, &user_id).await;

        let mut user = ctx.repos.users.find(&user_id).await.unwrap().unwrap();
        user.clear_medications();
        ctx.repos.users.save(&user).await.unwrap();

        let res = execute(record(&user_id, ResponseOutcome::Taken), &ctx).await;
        assert_eq!(res.unwrap_err(), UseCaseError::NotFound);

        let stored = ctx.repos.users.find(&user_id).await.unwrap().unwrap();
        assert!(stored.adherence.is_empty());
    }
}
