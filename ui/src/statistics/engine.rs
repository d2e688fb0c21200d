//! Single-flight fetcher that fills the point cache one value at a time.
//!
//! The backend computes one data point per request. [`FetchScheduler`] keeps
//! at most one of those requests in flight: `tick` hands out the next missing
//! cell and marks the scheduler busy, `complete` writes the answer back and
//! frees it again. [`drain`] loops over both until nothing is missing or a
//! request fails; there is no retry, the next user change starts a new chain.

use api::{ApiError, Dataset, DatasetId, StatisticsApi};
use time::Date;
use tracing::{debug, warn};

use super::cache::{CacheKey, EnabledDatasets, PointCache, Variant};
use super::dates::{DateRange, SampleDate};
use super::graph::{project, GraphMatrix};

#[derive(Debug, Clone, PartialEq)]
pub struct PointRequest {
    pub key: CacheKey,
    pub date: SampleDate,
}

#[derive(Debug, Clone, Default, PartialEq)]
enum SchedulerState {
    #[default]
    Idle,
    Busy(PointRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Value stored, look for the next missing cell.
    Continue,
    /// Request failed or was aborted; wait for the next trigger.
    Halted,
}

#[derive(Debug, Clone, Default)]
pub struct FetchScheduler {
    state: SchedulerState,
    error: Option<String>,
}

impl FetchScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, SchedulerState::Busy(_))
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Hands out the next unfetched cell, or `None` while a request is in
    /// flight or when everything for `keys` is resolved.
    pub fn tick(&mut self, cache: &PointCache, keys: &[CacheKey]) -> Option<PointRequest> {
        if self.is_busy() {
            return None;
        }

        let (key, date) = cache.next_unfetched(keys)?;
        let request = PointRequest { key, date };
        debug!(
            dataset = %request.key.dataset,
            relative = request.key.variant.is_relative(),
            date = %request.date,
            "scheduling graph point"
        );

        self.error = None;
        self.state = SchedulerState::Busy(request.clone());
        Some(request)
    }

    pub fn complete(
        &mut self,
        cache: &mut PointCache,
        request: &PointRequest,
        outcome: Result<Option<f64>, ApiError>,
    ) -> Completion {
        self.state = SchedulerState::Idle;

        match outcome {
            Ok(value) => {
                cache.write(&request.key, request.date, value);
                Completion::Continue
            }
            Err(err) if err.is_aborted() => {
                debug!(dataset = %request.key.dataset, "graph point request aborted");
                Completion::Halted
            }
            Err(err) => {
                warn!(
                    dataset = %request.key.dataset,
                    date = %request.date,
                    error = %err,
                    "graph point request failed"
                );
                self.error = Some(format!("Failed to load :( error message: {err}"));
                Completion::Halted
            }
        }
    }
}

/// Everything the graph widget owns: selected range, enabled datasets, the
/// point memo and the scheduler working on it.
#[derive(Debug, Clone)]
pub struct GraphState {
    range: DateRange,
    dates: Vec<SampleDate>,
    enabled: EnabledDatasets,
    cache: PointCache,
    scheduler: FetchScheduler,
}

impl GraphState {
    pub fn new(range: DateRange, today: Date) -> Self {
        let dates = range.expand(today);
        Self {
            range,
            dates,
            enabled: EnabledDatasets::new(),
            cache: PointCache::new(),
            scheduler: FetchScheduler::new(),
        }
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }

    pub fn dates(&self) -> &[SampleDate] {
        &self.dates
    }

    pub fn enabled(&self) -> &EnabledDatasets {
        &self.enabled
    }

    pub fn is_fetching(&self) -> bool {
        self.scheduler.is_busy()
    }

    pub fn error(&self) -> Option<&str> {
        self.scheduler.error()
    }

    /// Applies `change` to the range and re-expands the sample dates.
    pub fn update_range(&mut self, today: Date, change: impl FnOnce(&mut DateRange)) {
        change(&mut self.range);
        self.dates = self.range.expand(today);
        self.sync();
    }

    pub fn set_enabled(&mut self, variant: Variant, dataset: DatasetId, enabled: bool) -> bool {
        let changed = self.enabled.set(variant, dataset, enabled);
        if changed {
            self.sync();
        }
        changed
    }

    /// Registers cells for every enabled key and current date. Returns how
    /// many cells were new.
    pub fn sync(&mut self) -> usize {
        self.enabled
            .keys()
            .iter()
            .map(|key| self.cache.ensure_keys_exist(key, &self.dates))
            .sum()
    }

    pub fn tick(&mut self) -> Option<PointRequest> {
        let keys = self.enabled.keys();
        self.scheduler.tick(&self.cache, &keys)
    }

    pub fn complete(
        &mut self,
        request: &PointRequest,
        outcome: Result<Option<f64>, ApiError>,
    ) -> Completion {
        self.scheduler.complete(&mut self.cache, request, outcome)
    }

    /// Cells of enabled datasets in the current range that still wait for a
    /// value. Stale dates outside the range are not counted.
    pub fn pending(&self) -> usize {
        let (done, total) = self.progress();
        total - done
    }

    /// `(fetched, total)` over enabled keys and the current sample dates.
    pub fn progress(&self) -> (usize, usize) {
        let keys = self.enabled.keys();
        let total = keys.len() * self.dates.len();
        let done = keys
            .iter()
            .flat_map(|key| self.dates.iter().map(move |date| (key, *date)))
            .filter(|(key, date)| {
                self.cache
                    .read(key, *date)
                    .is_some_and(|cell| cell.is_fetched())
            })
            .count();
        (done, total)
    }

    pub fn project(&self, datasets: &[Dataset]) -> GraphMatrix {
        project(&self.cache, &self.enabled, &self.dates, datasets)
    }
}

/// Access to a [`GraphState`] that may live behind a reactive handle.
pub trait GraphHandle {
    fn update<R>(&mut self, change: impl FnOnce(&mut GraphState) -> R) -> R;
}

impl GraphHandle for GraphState {
    fn update<R>(&mut self, change: impl FnOnce(&mut GraphState) -> R) -> R {
        change(self)
    }
}

/// Fetches missing points one after another until the cache is complete or a
/// request fails. The state is only borrowed between requests, so the UI
/// stays free to change the selection while a request is pending.
///
/// Returns the number of values stored.
pub async fn drain<H, A>(handle: &mut H, api: &A) -> usize
where
    H: GraphHandle,
    A: StatisticsApi + ?Sized,
{
    let mut stored = 0;
    while let Some(request) = handle.update(GraphState::tick) {
        let outcome = api
            .graph_point(
                &request.key.dataset,
                request.date.date(),
                request.key.variant.is_relative(),
            )
            .await;

        match handle.update(|state| state.complete(&request, outcome)) {
            Completion::Continue => stored += 1,
            Completion::Halted => break,
        }
    }
    stored
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use api::{DatapointExport, ExportColumn};
    use async_trait::async_trait;
    use futures::executor::block_on;
    use time::macros::date;

    use super::*;
    use crate::statistics::dates::Granularity;

    #[derive(Clone, Copy)]
    enum Answer {
        Value(Option<f64>),
        Fail,
        Abort,
    }

    #[derive(Default)]
    struct FakeStatistics {
        answers: RefCell<HashMap<(String, Date, bool), Answer>>,
        calls: RefCell<Vec<(String, Date, bool)>>,
    }

    impl FakeStatistics {
        fn answer(&self, dataset: &str, at: Date, relative: bool, answer: Answer) {
            self.answers
                .borrow_mut()
                .insert((dataset.to_string(), at, relative), answer);
        }

        fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    #[async_trait(?Send)]
    impl StatisticsApi for FakeStatistics {
        async fn graph_point(
            &self,
            dataset: &DatasetId,
            at_date: Date,
            relative: bool,
        ) -> Result<Option<f64>, ApiError> {
            let key = (dataset.to_string(), at_date, relative);
            self.calls.borrow_mut().push(key.clone());
            match self.answers.borrow().get(&key).copied() {
                Some(Answer::Value(value)) => Ok(value),
                Some(Answer::Abort) => Err(ApiError::Aborted),
                Some(Answer::Fail) | None => Err(ApiError::Status {
                    endpoint: "statistics/graph_point".into(),
                    status: 500,
                }),
            }
        }

        async fn available_datasets(&self, _: &str) -> Result<Vec<Dataset>, ApiError> {
            Ok(Vec::new())
        }

        async fn available_colourblindness_types(&self) -> Result<Vec<String>, ApiError> {
            Ok(Vec::new())
        }

        async fn available_export_columns(&self) -> Result<Vec<ExportColumn>, ApiError> {
            Ok(Vec::new())
        }

        async fn export_dataset(
            &self,
            _: &DatasetId,
            _: &[String],
            _: Date,
        ) -> Result<Vec<DatapointExport>, ApiError> {
            Ok(Vec::new())
        }
    }

    const TODAY: Date = date!(2025 - 01 - 15);

    fn three_month_state() -> GraphState {
        let mut range = DateRange::new(Granularity::FirstOfMonth, false);
        range.set_from(Some(date!(2024 - 01 - 01)));
        range.set_to(Some(date!(2024 - 03 - 01)));
        GraphState::new(range, TODAY)
    }

    fn members_answers(api: &FakeStatistics) {
        api.answer("members", date!(2024 - 01 - 01), false, Answer::Value(Some(10.0)));
        api.answer("members", date!(2024 - 02 - 01), false, Answer::Value(Some(12.0)));
        api.answer("members", date!(2024 - 03 - 01), false, Answer::Value(None));
    }

    #[test]
    fn drain_fills_every_enabled_cell() {
        let api = FakeStatistics::default();
        members_answers(&api);
        let mut state = three_month_state();
        state.set_enabled(Variant::Absolute, "members".into(), true);

        let stored = block_on(drain(&mut state, &api));

        assert_eq!(stored, 3);
        assert_eq!(state.pending(), 0);
        assert!(state.error().is_none());
        let matrix = state.project(&[]);
        assert_eq!(matrix.series.len(), 1);
        assert_eq!(matrix.series[0].data, vec![Some(10.0), Some(12.0), None]);
    }

    #[test]
    fn only_one_request_is_handed_out_at_a_time() {
        let mut state = three_month_state();
        state.set_enabled(Variant::Absolute, "members".into(), true);

        let first = state.tick().expect("work available");
        assert!(state.is_fetching());
        assert_eq!(state.tick(), None);

        state.complete(&first, Ok(Some(1.0)));
        assert!(!state.is_fetching());
        let second = state.tick().expect("more work available");
        assert_ne!(first.date, second.date);
    }

    #[test]
    fn drained_scheduler_stays_idle() {
        let api = FakeStatistics::default();
        members_answers(&api);
        let mut state = three_month_state();
        state.set_enabled(Variant::Absolute, "members".into(), true);
        block_on(drain(&mut state, &api));

        assert_eq!(state.tick(), None);
        assert_eq!(block_on(drain(&mut state, &api)), 0);
        assert_eq!(api.call_count(), 3);
    }

    #[test]
    fn failure_halts_the_chain_and_keeps_partial_results() {
        let api = FakeStatistics::default();
        api.answer("members", date!(2024 - 01 - 01), false, Answer::Value(Some(10.0)));
        api.answer("members", date!(2024 - 02 - 01), false, Answer::Fail);
        let mut state = three_month_state();
        state.set_enabled(Variant::Absolute, "members".into(), true);

        let stored = block_on(drain(&mut state, &api));

        assert_eq!(stored, 1);
        assert_eq!(api.call_count(), 2);
        assert!(!state.is_fetching());
        let error = state.error().expect("error banner");
        assert!(error.starts_with("Failed to load :( error message:"));
        assert_eq!(
            state.project(&[]).series[0].data,
            vec![Some(10.0), None, None]
        );

        // The next trigger resumes with the failed cell and clears the banner.
        let retry = state.tick().expect("failed cell is still missing");
        assert_eq!(retry.date.date(), date!(2024 - 02 - 01));
        assert!(state.error().is_none());
    }

    #[test]
    fn aborted_request_is_not_an_error() {
        let api = FakeStatistics::default();
        api.answer("members", date!(2024 - 01 - 01), false, Answer::Abort);
        let mut state = three_month_state();
        state.set_enabled(Variant::Absolute, "members".into(), true);

        assert_eq!(block_on(drain(&mut state, &api)), 0);
        assert!(state.error().is_none());
        assert!(!state.is_fetching());
        assert_eq!(state.pending(), 3);
    }

    #[test]
    fn reenabling_a_dataset_reuses_cached_values() {
        let api = FakeStatistics::default();
        members_answers(&api);
        let mut state = three_month_state();
        state.set_enabled(Variant::Absolute, "members".into(), true);
        block_on(drain(&mut state, &api));

        state.set_enabled(Variant::Absolute, "members".into(), false);
        assert!(state.project(&[]).series.is_empty());
        state.set_enabled(Variant::Absolute, "members".into(), true);

        assert_eq!(block_on(drain(&mut state, &api)), 0);
        assert_eq!(api.call_count(), 3);
        assert_eq!(
            state.project(&[]).series[0].data,
            vec![Some(10.0), Some(12.0), None]
        );
    }

    #[test]
    fn enabling_twice_does_not_duplicate_work() {
        let mut state = three_month_state();
        assert!(state.set_enabled(Variant::Absolute, "members".into(), true));
        assert!(!state.set_enabled(Variant::Absolute, "members".into(), true));
        assert_eq!(state.enabled().keys().len(), 1);
        assert_eq!(state.progress(), (0, 3));
        assert_eq!(state.project(&[]).series.len(), 1);
    }

    #[test]
    fn widening_the_range_only_fetches_new_dates() {
        let api = FakeStatistics::default();
        members_answers(&api);
        api.answer("members", date!(2024 - 04 - 01), false, Answer::Value(Some(15.0)));
        let mut state = three_month_state();
        state.set_enabled(Variant::Absolute, "members".into(), true);
        block_on(drain(&mut state, &api));

        state.update_range(TODAY, |range| range.set_to(Some(date!(2024 - 04 - 01))));
        assert_eq!(state.pending(), 1);
        assert_eq!(block_on(drain(&mut state, &api)), 1);
        assert_eq!(api.call_count(), 4);
    }

    #[test]
    fn narrowing_mid_chain_keeps_stale_dates_and_bounded_progress() {
        let months = [
            date!(2024 - 01 - 01),
            date!(2024 - 02 - 01),
            date!(2024 - 03 - 01),
            date!(2024 - 04 - 01),
            date!(2024 - 05 - 01),
            date!(2024 - 06 - 01),
        ];
        let api = FakeStatistics::default();
        for (index, day) in months.iter().enumerate() {
            api.answer("members", *day, false, Answer::Value(Some(index as f64)));
        }
        let mut range = DateRange::new(Granularity::FirstOfMonth, false);
        range.set_from(Some(months[0]));
        range.set_to(Some(months[5]));
        let mut state = GraphState::new(range, TODAY);
        state.set_enabled(Variant::Absolute, "members".into(), true);

        let in_flight = state.tick().expect("january is missing");
        assert_eq!(in_flight.date.date(), months[0]);

        state.update_range(TODAY, |range| range.set_to(Some(months[0])));
        assert_eq!(state.dates().len(), 1);
        assert_eq!(state.progress(), (0, 1));
        assert_eq!(state.pending(), 1);

        state.complete(&in_flight, Ok(Some(0.0)));
        assert_eq!(state.progress(), (1, 1));
        assert_eq!(state.pending(), 0);

        // Dates that fell out of the range are still registered and get
        // fetched in registration order.
        assert_eq!(block_on(drain(&mut state, &api)), 5);
        let fetched: Vec<Date> = api.calls.borrow().iter().map(|call| call.1).collect();
        assert_eq!(fetched, months[1..].to_vec());
        assert_eq!(state.project(&[]).series[0].data, vec![Some(0.0)]);

        state.update_range(TODAY, |range| range.set_to(Some(months[5])));
        assert_eq!(state.progress(), (6, 6));
        assert_eq!(block_on(drain(&mut state, &api)), 0);
        assert_eq!(
            state.project(&[]).series[0].data,
            vec![Some(0.0), Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)]
        );
    }

    #[test]
    fn absolute_cells_are_fetched_before_relative_ones() {
        let api = FakeStatistics::default();
        members_answers(&api);
        for day in [date!(2024 - 01 - 01), date!(2024 - 02 - 01), date!(2024 - 03 - 01)] {
            api.answer("members", day, true, Answer::Value(Some(1.0)));
        }
        let mut state = three_month_state();
        state.set_enabled(Variant::Relative, "members".into(), true);
        state.set_enabled(Variant::Absolute, "members".into(), true);

        block_on(drain(&mut state, &api));

        let relative_flags: Vec<bool> = api.calls.borrow().iter().map(|c| c.2).collect();
        assert_eq!(relative_flags, vec![false, false, false, true, true, true]);
    }
}
