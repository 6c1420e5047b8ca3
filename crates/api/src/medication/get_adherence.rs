use crate::error::PillboxError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use pillbox_api_structs::dtos::AdherenceDTO;
use pillbox_api_structs::get_adherence::{APIResponse, PathParams};
use pillbox_domain::{Adherence, UserId};
use pillbox_infra::PillboxContext;

fn handle_error(e: UseCaseError) -> PillboxError {
    match e {
        UseCaseError::StorageError => {
            PillboxError::StoreUnavailable("Unable to read adherence counters right now.".into())
        }
    }
}

pub async fn get_adherence_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<PillboxContext>,
) -> Result<HttpResponse, PillboxError> {
    let usecase = GetAdherenceUseCase {
        user_id: UserId::from(path_params.user_id.as_str()),
    };
    let adherence = execute(usecase, &ctx).await.map_err(handle_error)?;

    let dtos = adherence
        .iter()
        .map(|entry| {
            AdherenceDTO::new(
                &entry.medication_name,
                &entry.adherence,
                entry.duration_days,
            )
        })
        .collect();
    Ok(HttpResponse::Ok().json(APIResponse::new(dtos)))
}

/// Returns the adherence counters for every medication the user still has,
/// together with the course duration so the share taken can be reported.
#[derive(Debug)]
pub struct GetAdherenceUseCase {
    pub user_id: UserId,
}

#[derive(Debug)]
pub struct MedicationAdherence {
    pub medication_name: String,
    pub adherence: Adherence,
    pub duration_days: i64,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait]
impl UseCase for GetAdherenceUseCase {
    type Response = Vec<MedicationAdherence>;

    type Errors = UseCaseError;

    const NAME: &'static str = "GetAdherence";

    async fn execute(&mut self, ctx: &PillboxContext) -> Result<Self::Response, Self::Errors> {
        let user = match ctx
            .repos
            .users
            .find(&self.user_id)
            .await
            .map_err(|_| UseCaseError::StorageError)?
        {
            Some(user) => user,
            None => return Ok(Vec::new()),
        };

        let mut adherence: Vec<_> = user
            .adherence
            .iter()
            // Counters without a live medication do not exist outside of
            // clear-all, which wipes both maps together
            .filter_map(|(name, counters)| {
                user.medication(name).map(|medication| MedicationAdherence {
                    medication_name: name.clone(),
                    adherence: counters.clone(),
                    duration_days: medication.duration_days,
                })
            })
            .collect();
        adherence.sort_by(|a, b| a.medication_name.cmp(&b.medication_name));
        Ok(adherence)
    }
}
