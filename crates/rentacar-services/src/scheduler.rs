//! In-process trigger for the reconciliation job
//!
//! Only one instance of the service should run this. Scaled-out deployments
//! turn it off and call the admin reconcile endpoint from an external cron.

use rentacar_core::{
    traits::{CarRepository, ReservationRepository},
    AppError, AppResult,
};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::reconciliation::ReconciliationJob;

/// Hourly, on the hour
pub const DEFAULT_SCHEDULE: &str = "0 0 * * * *";

/// Register the reconciliation job on `schedule` and start the scheduler
///
/// The returned scheduler keeps running in the background; keep it to shut it
/// down on exit.
pub async fn start_scheduler<C, R>(
    job: Arc<ReconciliationJob<C, R>>,
    schedule: &str,
) -> AppResult<JobScheduler>
where
    C: CarRepository + 'static,
    R: ReservationRepository + 'static,
{
    let scheduler = JobScheduler::new().await.map_err(scheduler_error)?;

    let cron_job = Job::new_async(schedule, move |_uuid, _lock| {
        let job = job.clone();

        Box::pin(async move {
            if let Err(e) = job.run().await {
                error!("Error running reconciliation: {}", e);
            }
        })
    })
    .map_err(scheduler_error)?;

    scheduler.add(cron_job).await.map_err(scheduler_error)?;
    scheduler.start().await.map_err(scheduler_error)?;

    info!(schedule = %schedule, "Reconciliation scheduler started");

    Ok(scheduler)
}

fn scheduler_error(e: tokio_cron_scheduler::JobSchedulerError) -> AppError {
    AppError::Scheduler(e.to_string())
}
