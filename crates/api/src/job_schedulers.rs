use crate::{
    reminder::{scheduler::ReminderScheduler, SyncRemindersTrigger, SyncRemindersUseCase},
    shared::usecase::execute,
};
use pillbox_infra::PillboxContext;
use std::sync::Arc;
use tokio::time::interval;
use tracing::error;

/// Spawns the periodic sweep that compares the armed timer set against the
/// stored schedules and repairs any drift. The first tick fires immediately,
/// so this also covers the startup reconcile that re-arms timers lost on a
/// restart.
pub fn start_reconcile_sweep_job(ctx: PillboxContext, scheduler: Arc<ReminderScheduler>) {
    tokio::spawn(async move {
        let mut sweep_interval = interval(ctx.config.reconcile_sweep_interval);
        loop {
            sweep_interval.tick().await;

            // Each sweep runs in its own task so that a panicking sweep
            // cannot take the loop down with it.
            let context = ctx.clone();
            let scheduler = scheduler.clone();
            let sweep = tokio::spawn(async move {
                let usecase = SyncRemindersUseCase {
                    scheduler,
                    trigger: SyncRemindersTrigger::JobScheduler,
                };
                let _ = execute(usecase, &context).await;
            });
            if sweep.await.is_err() {
                error!("Reconcile sweep aborted, retrying on the next tick");
            }
        }
    });
}
