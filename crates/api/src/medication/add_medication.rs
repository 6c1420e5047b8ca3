use super::reconcile_user;
use crate::error::PillboxError;
use crate::reminder::scheduler::ReminderScheduler;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use pillbox_api_structs::add_medication::{APIResponse, PathParams, RequestBody};
use pillbox_api_structs::dtos::MedicationDTO;
use pillbox_domain::{Medication, TimeOfDay, UserId};
use pillbox_infra::PillboxContext;

fn handle_error(e: UseCaseError) -> PillboxError {
    match e {
        UseCaseError::InvalidSchedule(msg) => PillboxError::BadClientData(msg),
        UseCaseError::StorageError => {
            PillboxError::StoreUnavailable("Unable to store the medication right now.".into())
        }
    }
}

pub async fn add_medication_controller(
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<PillboxContext>,
    scheduler: web::Data<ReminderScheduler>,
) -> Result<HttpResponse, PillboxError> {
    let user_id = UserId::from(path_params.user_id.as_str());
    let body = body.into_inner();
    let name = body.name.trim().to_string();

    let usecase = AddMedicationUseCase {
        user_id: user_id.clone(),
        name: name.clone(),
        time_of_day: body.time_of_day,
        duration_days: body.duration_days,
    };
    let medication = execute(usecase, &ctx).await.map_err(handle_error)?;

    reconcile_user(user_id, scheduler, &ctx).await;

    let dto = MedicationDTO::new(&name, &medication, ctx.sys.now());
    Ok(HttpResponse::Ok().json(APIResponse::new(dto)))
}

/// Longest accepted course, 100 years of daily doses. Anything beyond that
/// is a client mistake.
const MAX_DURATION_DAYS: i64 = 36_500;

/// Stores a new medication course for a user, starting today. Re-adding a
/// known name replaces the schedule but keeps the adherence history.
#[derive(Debug)]
pub struct AddMedicationUseCase {
    pub user_id: UserId,
    pub name: String,
    pub time_of_day: TimeOfDay,
    pub duration_days: i64,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    InvalidSchedule(String),
    StorageError,
}

#[async_trait::async_trait]
impl UseCase for AddMedicationUseCase {
    type Response = Medication;

    type Errors = UseCaseError;

    const NAME: &'static str = "AddMedication";

    async fn execute(&mut self, ctx: &PillboxContext) -> Result<Self::Response, Self::Errors> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(UseCaseError::InvalidSchedule(
                "Medication name cannot be empty".into(),
            ));
        }
        if self.duration_days <= 0 {
            return Err(UseCaseError::InvalidSchedule(format!(
                "Duration of {} days is not a positive number of days",
                self.duration_days
            )));
        }
        if self.duration_days > MAX_DURATION_DAYS {
            return Err(UseCaseError::InvalidSchedule(format!(
                "Duration of {} days is longer than the longest supported course of {} days",
                self.duration_days, MAX_DURATION_DAYS
            )));
        }

        let _guard = ctx.locks.acquire(&self.user_id).await;

        let mut user = ctx
            .repos
            .users
            .find(&self.user_id)
            .await
            .map_err(|_| UseCaseError::StorageError)?
            .unwrap_or_else(|| pillbox_domain::UserRecord::new(self.user_id.clone()));

        let start_date = ctx.sys.now().naive_utc().date();
        let medication = Medication::new(self.time_of_day, start_date, self.duration_days);
        user.add_medication(name, medication.clone());

        ctx.repos
            .users
            .save(&user)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(medication)
    }
}
