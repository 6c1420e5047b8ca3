use crate::error::PillboxError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use pillbox_api_structs::dtos::MedicationDTO;
use pillbox_api_structs::get_medications::{APIResponse, PathParams};
use pillbox_domain::{Medication, UserId};
use pillbox_infra::PillboxContext;

fn handle_error(e: UseCaseError) -> PillboxError {
    match e {
        UseCaseError::StorageError => {
            PillboxError::StoreUnavailable("Unable to read the medication list right now.".into())
        }
    }
}

pub async fn get_medications_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<PillboxContext>,
) -> Result<HttpResponse, PillboxError> {
    let usecase = GetMedicationsUseCase {
        user_id: UserId::from(path_params.user_id.as_str()),
    };
    let medications = execute(usecase, &ctx).await.map_err(handle_error)?;

    let now = ctx.sys.now();
    let dtos = medications
        .iter()
        .map(|(name, medication)| MedicationDTO::new(name, medication, now))
        .collect();
    Ok(HttpResponse::Ok().json(APIResponse::new(dtos)))
}

#[derive(Debug)]
pub struct GetMedicationsUseCase {
    pub user_id: UserId,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait]
impl UseCase for GetMedicationsUseCase {
    type Response = Vec<(String, Medication)>;

    type Errors = UseCaseError;

    const NAME: &'static str = "GetMedications";

    async fn execute(&mut self, ctx: &PillboxContext) -> Result<Self::Response, Self::Errors> {
        let user = ctx
            .repos
            .users
            .find(&self.user_id)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        let mut medications: Vec<_> = user
            .map(|user| user.medications.into_iter().collect())
            .unwrap_or_default();
        medications.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(medications)
    }
}
