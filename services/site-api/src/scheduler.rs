//! Periodic removal of expired admin sessions
//!
//! Validation never depends on this job; it only keeps the session store
//! from growing.

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::session::SessionManager;

/// Start a scheduler that purges expired sessions on `schedule`
///
/// The returned scheduler must be kept alive for the job to keep running.
pub async fn start_session_purge(manager: SessionManager, schedule: &str) -> Result<JobScheduler> {
    let job = Job::new_async(schedule, move |_, _| {
        let manager = manager.clone();
        Box::pin(async move {
            match manager.purge_expired().await {
                Ok(0) => {}
                Ok(removed) => info!("Session purge removed {} expired sessions", removed),
                Err(e) => error!("Session purge failed: {}", e),
            }
        })
    })?;

    let scheduler = JobScheduler::new().await?;
    scheduler.add(job).await?;
    scheduler.start().await?;

    info!("Started session purge scheduler with schedule: {}", schedule);
    Ok(scheduler)
}
