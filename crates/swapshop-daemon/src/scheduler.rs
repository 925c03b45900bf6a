// crates/swapshop-daemon/src/scheduler.rs
//
// Maintenance scheduler for the SwapShop trust daemon.
//
// Runs the inactivity sweep and, if enabled, the projection resync on fixed
// intervals until ctrl-c. Both jobs are idempotent per record, so a run cut
// short by shutdown is simply repeated on the next tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};

use swapshop_service::TrustScoreService;

/// A maintenance job the scheduler can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    InactivitySweep,
    ProjectionResync,
}

/// Interval-driven runner for trust-score maintenance jobs.
pub struct MaintenanceScheduler {
    service: Arc<TrustScoreService>,
    sweep_interval: Duration,
    /// `None` disables the resync job.
    resync_interval: Option<Duration>,
}

impl MaintenanceScheduler {
    pub fn new(
        service: Arc<TrustScoreService>,
        sweep_interval_secs: u64,
        resync_interval_secs: u64,
    ) -> Self {
        Self {
            service,
            sweep_interval: Duration::from_secs(sweep_interval_secs.max(1)),
            resync_interval: (resync_interval_secs > 0)
                .then(|| Duration::from_secs(resync_interval_secs)),
        }
    }

    /// Run both jobs once at startup, then on their intervals until ctrl-c.
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        tracing::info!(
            "Maintenance scheduler started (sweep every {}s, resync {})",
            self.sweep_interval.as_secs(),
            match self.resync_interval {
                Some(d) => format!("every {}s", d.as_secs()),
                None => "disabled".to_string(),
            }
        );

        self.run_job(Job::InactivitySweep).await;
        if self.resync_interval.is_some() {
            self.run_job(Job::ProjectionResync).await;
        }

        let mut sweep_tick = interval_at(Instant::now() + self.sweep_interval, self.sweep_interval);
        sweep_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // A disabled resync still needs a timer to select on; the branch
        // guard below keeps it from ever being polled.
        let resync_period = self.resync_interval.unwrap_or(Duration::from_secs(365 * 86_400));
        let mut resync_tick = interval_at(Instant::now() + resync_period, resync_period);
        resync_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Maintenance scheduler received shutdown signal");
                    break;
                }
                _ = sweep_tick.tick() => {
                    self.run_job(Job::InactivitySweep).await;
                }
                _ = resync_tick.tick(), if self.resync_interval.is_some() => {
                    self.run_job(Job::ProjectionResync).await;
                }
            }
        }

        Ok(())
    }

    /// Run one job, logging its outcome. Failures never stop the scheduler.
    pub async fn run_job(&self, job: Job) -> bool {
        match job {
            Job::InactivitySweep => match self.service.run_inactivity_sweep().await {
                Ok(report) => {
                    tracing::info!(
                        "Inactivity sweep: {} scanned, {} penalized, {} failed",
                        report.scanned,
                        report.affected.len(),
                        report.failed
                    );
                    true
                }
                Err(e) => {
                    tracing::error!("Inactivity sweep error: {}", e);
                    false
                }
            },
            Job::ProjectionResync => match self.service.resync_all().await {
                Ok(report) => {
                    tracing::info!(
                        "Projection resync: {} synced, {} failed",
                        report.successful,
                        report.failed
                    );
                    true
                }
                Err(e) => {
                    tracing::error!("Projection resync error: {}", e);
                    false
                }
            },
        }
    }
}
