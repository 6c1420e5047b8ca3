use super::reconcile_user;
use crate::error::PillboxError;
use crate::reminder::scheduler::ReminderScheduler;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use pillbox_api_structs::clear_medications::{APIResponse, PathParams};
use pillbox_domain::UserId;
use pillbox_infra::PillboxContext;

fn handle_error(e: UseCaseError) -> PillboxError {
    match e {
        UseCaseError::StorageError => {
            PillboxError::StoreUnavailable("Unable to clear the medication list right now.".into())
        }
    }
}

pub async fn clear_medications_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<PillboxContext>,
    scheduler: web::Data<ReminderScheduler>,
) -> Result<HttpResponse, PillboxError> {
    let user_id = UserId::from(path_params.user_id.as_str());

    let usecase = ClearMedicationsUseCase {
        user_id: user_id.clone(),
    };
    let deleted_count = execute(usecase, &ctx).await.map_err(handle_error)?;

    reconcile_user(user_id, scheduler, &ctx).await;

    Ok(HttpResponse::Ok().json(APIResponse::new(deleted_count)))
}

/// Removes all of a user's medications and resets every adherence counter.
/// The caller reconciles afterwards, which cancels the outstanding timers.
#[derive(Debug)]
pub struct ClearMedicationsUseCase {
    pub user_id: UserId,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait]
impl UseCase for ClearMedicationsUseCase {
    type Response = usize;

    type Errors = UseCaseError;

    const NAME: &'static str = "ClearMedications";

    async fn execute(&mut self, ctx: &PillboxContext) -> Result<Self::Response, Self::Errors> {
        let _guard = ctx.locks.acquire(&self.user_id).await;

        let user = ctx
            .repos
            .users
            .find(&self.user_id)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        let mut user = match user {
            Some(user) => user,
            // Nothing to clear
            None => return Ok(0),
        };

        let deleted_count = user.clear_medications();
        ctx.repos
            .users
            .save(&user)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(deleted_count)
    }
}
