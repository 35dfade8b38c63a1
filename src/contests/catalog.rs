use std::sync::{Arc, RwLock};

use chrono::{DateTime, TimeDelta, Utc};

use super::contest_type::Contest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Uninitialized,
    Loading,
    Loaded,
    LoadFailed,
}

/// Answer to "how long until the next contest".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUntil {
    Remaining(TimeDelta),
    NoUpcomingEvent,
    Loading,
    LoadFailed,
}

#[derive(Debug, Default)]
struct CatalogState {
    status: LoadStatus,
    contests: Arc<Vec<Contest>>,
}

/// The set of currently known contests together with its load status.
///
/// The record set is only ever swapped as a whole, and every query works on one
/// snapshot of it.
#[derive(Debug, Default)]
pub struct ContestCatalog {
    state: RwLock<CatalogState>,
}

impl ContestCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn from_contests(contests: Vec<Contest>) -> Self {
        let catalog = Self::new();
        catalog.replace_all(contests);
        catalog
    }

    pub fn status(&self) -> LoadStatus {
        self.read(|state| state.status)
    }

    pub fn snapshot(&self) -> Arc<Vec<Contest>> {
        self.read(|state| Arc::clone(&state.contests))
    }

    pub fn begin_refresh(&self) {
        self.write(|state| {
            log::debug!("catalog {:?} -> Loading", state.status);
            state.status = LoadStatus::Loading;
        });
    }

    pub fn replace_all(&self, contests: Vec<Contest>) {
        for contest in &contests {
            if let Err(e) = contest.validate() {
                log::warn!("excluded from scheduling: {}", e);
            }
        }
        let contests = Arc::new(contests);
        self.write(move |state| {
            state.contests = contests;
            state.status = LoadStatus::Loaded;
        });
    }

    /// Keeps the previous records; they are not consulted while the status is failed.
    pub fn mark_failed(&self, reason: &str) {
        log::warn!("contest feed failed to load: {}", reason);
        self.write(|state| state.status = LoadStatus::LoadFailed);
    }

    pub fn time_until_next(&self, now: DateTime<Utc>) -> TimeUntil {
        let (status, contests) = self.read(|state| (state.status, Arc::clone(&state.contests)));
        match status {
            LoadStatus::Uninitialized | LoadStatus::Loading => TimeUntil::Loading,
            LoadStatus::LoadFailed => TimeUntil::LoadFailed,
            LoadStatus::Loaded => contests
                .iter()
                .filter_map(|contest| contest.validate().ok())
                .map(|start| start - now)
                .filter(|remaining| *remaining >= TimeDelta::zero())
                .min()
                .map_or(TimeUntil::NoUpcomingEvent, TimeUntil::Remaining),
        }
    }

    /// Valid contests that have not started yet, soonest first.
    pub fn upcoming(&self, now: DateTime<Utc>) -> Vec<Contest> {
        let contests = self.snapshot();
        let mut upcoming: Vec<(DateTime<Utc>, &Contest)> = contests
            .iter()
            .filter_map(|contest| contest.validate().ok().map(|start| (start, contest)))
            .filter(|(start, _)| now < *start)
            .collect();
        upcoming.sort_by_key(|(start, _)| *start);
        upcoming.into_iter().map(|(_, contest)| contest.clone()).collect()
    }

    /// Contests running at `now`, the one ending first at the front.
    pub fn ongoing(&self, now: DateTime<Utc>) -> Vec<Contest> {
        let contests = self.snapshot();
        let mut ongoing: Vec<(DateTime<Utc>, &Contest)> = contests
            .iter()
            .filter_map(|contest| {
                let start = contest.validate().ok()?;
                let end = contest.ends_at()?;
                (start <= now && now <= end).then_some((end, contest))
            })
            .collect();
        ongoing.sort_by_key(|(end, _)| *end);
        ongoing.into_iter().map(|(_, contest)| contest.clone()).collect()
    }

    fn read<T>(&self, f: impl FnOnce(&CatalogState) -> T) -> T {
        match self.state.read() {
            Ok(state) => f(&state),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    fn write(&self, f: impl FnOnce(&mut CatalogState)) {
        match self.state.write() {
            Ok(mut state) => f(&mut state),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}
