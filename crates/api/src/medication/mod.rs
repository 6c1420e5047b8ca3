mod add_medication;
mod clear_medications;
mod get_adherence;
mod get_medications;

pub use add_medication::AddMedicationUseCase;
pub use clear_medications::ClearMedicationsUseCase;
pub use get_adherence::GetAdherenceUseCase;
pub use get_medications::GetMedicationsUseCase;

use crate::reminder::scheduler::ReminderScheduler;
use crate::reminder::{SyncRemindersTrigger, SyncRemindersUseCase};
use crate::shared::usecase::execute;
use actix_web::web;
use add_medication::add_medication_controller;
use clear_medications::clear_medications_controller;
use get_adherence::get_adherence_controller;
use get_medications::get_medications_controller;
use pillbox_domain::UserId;
use pillbox_infra::PillboxContext;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/users/{user_id}/medications",
        web::post().to(add_medication_controller),
    );
    cfg.route(
        "/users/{user_id}/medications",
        web::get().to(get_medications_controller),
    );
    cfg.route(
        "/users/{user_id}/medications",
        web::delete().to(clear_medications_controller),
    );
    cfg.route(
        "/users/{user_id}/adherence",
        web::get().to(get_adherence_controller),
    );
}

/// Brings the armed timer set back in line after a schedule mutation.
/// Reconcile errors do not fail the request that triggered them; the
/// periodic sweep repairs the timer set on its next run.
async fn reconcile_user(
    user_id: UserId,
    scheduler: web::Data<ReminderScheduler>,
    ctx: &PillboxContext,
) {
    let usecase = SyncRemindersUseCase {
        scheduler: scheduler.into_inner(),
        trigger: SyncRemindersTrigger::ScheduleModified(user_id),
    };
    let _ = execute(usecase, ctx).await;
}
