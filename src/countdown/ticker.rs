use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::clock::Clock;
use super::formatter::DisplayCategory;
use crate::contests::catalog::ContestCatalog;

#[derive(Error, Debug)]
pub enum TickerError {
    #[error("ticker is already running")]
    AlreadyRunning,
    #[error("tick period must be greater than zero")]
    InvalidPeriod,
    #[error("no async runtime to schedule ticks on: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// Receives one category per tick.
pub trait RenderSink: Send + Sync {
    fn render(&self, category: &DisplayCategory);
}

/// What the countdown counts towards.
#[derive(Debug, Clone)]
pub enum CountdownSource {
    NextContest(Arc<ContestCatalog>),
    Target(DateTime<Utc>),
}

impl CountdownSource {
    pub fn category(&self, now: DateTime<Utc>) -> DisplayCategory {
        match self {
            CountdownSource::NextContest(catalog) => catalog.time_until_next(now).into(),
            CountdownSource::Target(target) => DisplayCategory::until(*target, now),
        }
    }
}

struct Running {
    handle: JoinHandle<()>,
    // held across each render so that stop() waits out a render in progress
    active: Arc<Mutex<bool>>,
}

/// Owns the periodic tick task. Dropping it stops the ticks.
#[derive(Default)]
pub struct Ticker {
    running: Option<Running>,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn start(
        &mut self,
        period: Duration,
        source: CountdownSource,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn RenderSink>,
    ) -> Result<(), TickerError> {
        if self.running.is_some() {
            return Err(TickerError::AlreadyRunning);
        }
        if period.is_zero() {
            return Err(TickerError::InvalidPeriod);
        }
        let runtime = tokio::runtime::Handle::try_current()?;

        let active = Arc::new(Mutex::new(true));
        let flag = Arc::clone(&active);
        let handle = runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let guard = match flag.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                if !*guard {
                    break;
                }
                sink.render(&source.category(clock.now()));
            }
        });
        log::debug!("ticker started: every {:?}", period);
        self.running = Some(Running { handle, active });
        Ok(())
    }

    /// Returns false when there was nothing to stop.
    pub fn stop(&mut self) -> bool {
        let Some(running) = self.running.take() else {
            return false;
        };
        match running.active.lock() {
            Ok(mut active) => *active = false,
            Err(poisoned) => *poisoned.into_inner() = false,
        }
        running.handle.abort();
        log::debug!("ticker stopped");
        true
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
