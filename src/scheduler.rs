use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::config::SCHEDULER_TICK;
use crate::error::{AppError, Result};

/// Interval plus the next time a run is due. `next_fire_at` is `None` while
/// idle.
#[derive(Debug, Clone)]
pub struct ScheduleState {
    interval: Duration,
    next_fire_at: Option<Instant>,
}

impl ScheduleState {
    pub fn new(interval: Duration) -> Self {
        Self { interval, next_fire_at: None }
    }

    pub fn is_run_once(&self) -> bool {
        self.interval.is_zero()
    }

    /// Arm the next run one interval after `completed_at`, the moment the
    /// previous job returned. Fails if that point is past the clock's range.
    pub fn arm(&mut self, completed_at: Instant) -> Result<()> {
        let at = completed_at.checked_add(self.interval).ok_or_else(|| {
            AppError::Config(format!(
                "refresh interval {:?} is too long to schedule",
                self.interval
            ))
        })?;
        self.next_fire_at = Some(at);
        Ok(())
    }

    pub fn is_due(&self, now: Instant) -> bool {
        matches!(self.next_fire_at, Some(at) if now >= at)
    }

    pub fn next_fire_at(&self) -> Option<Instant> {
        self.next_fire_at
    }
}

/// Runs a job once, then again every `interval` after the previous run
/// finished. The job runs inline on the polling loop, so two runs can never
/// overlap. The first job error ends the loop and is returned.
pub struct Scheduler {
    state: ScheduleState,
    tick: Duration,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            state: ScheduleState::new(interval),
            tick: SCHEDULER_TICK,
        }
    }

    /// Returns `Ok(())` after the single run when the interval is zero;
    /// otherwise only returns with the error of a failed run.
    pub async fn run<F, T>(mut self, mut job: F) -> Result<()>
    where
        F: FnMut() -> Result<T>,
    {
        job()?;

        if self.state.is_run_once() {
            info!("Run-once mode: done");
            return Ok(());
        }

        self.state.arm(Instant::now())?;
        info!(
            interval_secs = self.state.interval.as_secs_f64(),
            "Scheduler armed; next refresh in {:?}",
            self.state.interval,
        );

        loop {
            sleep(self.tick).await;
            if !self.state.is_due(Instant::now()) {
                continue;
            }

            debug!("Scheduled refresh firing");
            job()?;
            self.state.arm(Instant::now())?;
            debug!(next_fire_at = ?self.state.next_fire_at(), "Next refresh in {:?}", self.state.interval);
        }
    }
}
