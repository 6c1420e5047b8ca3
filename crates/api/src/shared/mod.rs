pub mod usecase;

#[cfg(test)]
pub mod test_helpers {
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use pillbox_infra::{setup_context, FakeSys, PillboxContext, StubNotifier};
    use std::sync::Arc;

    pub fn instant(
        year: i32,
        month: u32,
        day: u32,
        hours: u32,
        minutes: u32,
    ) -> DateTime<Utc> {
        let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        Utc.from_utc_datetime(&date.and_hms_opt(hours, minutes, 0).unwrap())
    }

    /// In-memory context with a controllable clock and a notifier that
    /// records every send.
    pub fn test_context(
        now: DateTime<Utc>,
    ) -> (PillboxContext, Arc<FakeSys>, Arc<StubNotifier>) {
        let mut ctx = setup_context();
        let sys = Arc::new(FakeSys::new(now));
        let notifier = Arc::new(StubNotifier::new());
        ctx.sys = sys.clone();
        ctx.notifier = notifier.clone();
        (ctx, sys, notifier)
    }
}
