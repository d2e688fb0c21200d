//! Search-as-you-type with cancellation of the superseded request.
//!
//! Every keystroke starts a new query through [`SearchController::begin`],
//! which aborts the previous one and bumps a generation counter. Results are
//! only applied by [`SearchController::finish`] when they belong to the latest
//! generation, so a slow answer for "A" can never overwrite the answer for
//! "AB".

use api::{ApiError, ShareOwnerForWelcomeDesk, WelcomeDeskApi};
use futures::future::{AbortHandle, AbortRegistration, Abortable};
use tracing::{debug, warn};

const ERROR_PREFIX: &str = "Whoops! Something went wrong. Please try again. If it keeps happening, please write in the #tapir channel on Slack with your current search: ";

#[derive(Debug)]
pub enum SearchStep {
    /// Nothing to ask the server; state was reset.
    Idle,
    Query {
        generation: u64,
        input: String,
        registration: AbortRegistration,
    },
}

#[derive(Debug, Default)]
pub struct SearchController {
    generation: u64,
    in_flight: Option<AbortHandle>,
    min_query_len: usize,
    input: String,
    results: Vec<ShareOwnerForWelcomeDesk>,
    loading: bool,
    error: Option<String>,
    selected: Option<i64>,
}

impl SearchController {
    pub fn new(min_query_len: usize) -> Self {
        Self {
            min_query_len,
            ..Self::default()
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn results(&self) -> &[ShareOwnerForWelcomeDesk] {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn begin(&mut self, input: &str) -> SearchStep {
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }
        self.generation += 1;
        self.input = input.to_string();
        self.selected = None;
        self.error = None;

        if input.is_empty() || input.chars().count() < self.min_query_len {
            self.results.clear();
            self.loading = false;
            return SearchStep::Idle;
        }

        let (handle, registration) = AbortHandle::new_pair();
        self.in_flight = Some(handle);
        self.loading = true;
        SearchStep::Query {
            generation: self.generation,
            input: input.to_string(),
            registration,
        }
    }

    /// Applies the outcome of query `generation`. Returns `false` when it was
    /// superseded or aborted and therefore ignored.
    pub fn finish(
        &mut self,
        generation: u64,
        outcome: Result<Vec<ShareOwnerForWelcomeDesk>, ApiError>,
    ) -> bool {
        if generation != self.generation {
            debug!(generation, latest = self.generation, "dropping stale search result");
            return false;
        }

        match outcome {
            Ok(results) => {
                self.in_flight = None;
                if let [only] = results.as_slice() {
                    self.selected = Some(only.id);
                }
                self.results = results;
                self.loading = false;
                true
            }
            Err(err) if err.is_aborted() => false,
            Err(err) => {
                warn!(input = %self.input, error = %err, "welcome desk search failed");
                self.in_flight = None;
                self.error = Some(format!("{ERROR_PREFIX}'{}'", self.input));
                self.loading = false;
                true
            }
        }
    }

    /// Clicking the selected member again deselects it.
    pub fn toggle_selection(&mut self, member_id: i64) {
        self.selected = match self.selected {
            Some(current) if current == member_id => None,
            _ => Some(member_id),
        };
    }

    pub fn selected(&self) -> Option<&ShareOwnerForWelcomeDesk> {
        let id = self.selected?;
        self.results.iter().find(|member| member.id == id)
    }
}

/// Runs one search, resolving to [`ApiError::Aborted`] if the registration's
/// handle is aborted first.
pub async fn run_query<A>(
    api: &A,
    input: &str,
    registration: AbortRegistration,
) -> Result<Vec<ShareOwnerForWelcomeDesk>, ApiError>
where
    A: WelcomeDeskApi + ?Sized,
{
    match Abortable::new(api.search(input), registration).await {
        Ok(outcome) => outcome,
        Err(_) => Err(ApiError::Aborted),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailTone {
    Danger,
    Warning,
    Success,
}

impl DetailTone {
    pub fn for_member(member: &ShareOwnerForWelcomeDesk) -> Self {
        if !member.can_shop {
            Self::Danger
        } else if !member.warnings.is_empty() {
            Self::Warning
        } else {
            Self::Success
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Danger => "text-bg-danger",
            Self::Warning => "text-bg-warning",
            Self::Success => "text-bg-success",
        }
    }
}
