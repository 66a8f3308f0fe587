//! Search panel logic: query state, debounced lookup, client-side paging,
//! and selection gating.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use regex::Regex;
use thiserror::Error;

use locfield_core::{has_address_value, AddressCandidate, Coordinate, LocationFieldValue};
use locfield_geocode::{CancelHandle, Debouncer, GeocodeError, LocationHelper};

/// Neutral term for the warm-up search issued when the modal opens, so a
/// dead geocoding service surfaces before the user types anything.
const WARM_UP_QUERY: &str = "singapore";
/// Probe point for the warm-up reverse-geocode health check.
const WARM_UP_POINT: Coordinate = Coordinate {
    lat: 1.3437,
    lng: 103.8357,
};

/// Markers wrapped around query-substring matches in the display text.
pub const HIGHLIGHT_OPEN: &str = "<mark>";
pub const HIGHLIGHT_CLOSE: &str = "</mark>";

/// Lifecycle of the result list. Re-enters `Pristine` whenever the query
/// changes without a re-selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultState {
    Pristine,
    Found,
    NotFound,
}

/// Outcome of a query change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Results were fetched and applied.
    Applied,
    /// A newer query superseded this one inside the debounce window; nothing
    /// was applied.
    Superseded,
    /// The query was empty; results were cleared without a network call.
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectError {
    /// The field requires a postal code and the candidate has none.
    /// Recoverable; the previous selection is untouched.
    #[error("selected address has no postal code")]
    PostalCodeMissing,

    #[error("result index out of range")]
    OutOfRange,
}

/// Owns the query string, fetched results, and selection for the search side
/// of the location modal.
#[derive(Debug, Clone)]
pub struct SearchPanel {
    helper: LocationHelper,
    debouncer: Debouncer,
    page_size: usize,
    must_have_postal_code: bool,
    query: String,
    results: Vec<AddressCandidate>,
    visible_count: usize,
    api_page_num: Option<u32>,
    total_num_pages: Option<u32>,
    selected_index: Option<usize>,
    result_state: ResultState,
    loading: Arc<AtomicBool>,
}

/// Holds the loading flag for the duration of one fetch. Released on drop, so
/// a caller abandoning the in-flight future (a newer keystroke superseding a
/// pending lookup) cannot leave the flag stuck.
struct LoadingGuard(Arc<AtomicBool>);

impl LoadingGuard {
    fn engage(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(Arc::clone(flag))
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SearchPanel {
    #[must_use]
    pub fn new(
        helper: LocationHelper,
        debounce_ms: u64,
        page_size: usize,
        must_have_postal_code: bool,
    ) -> Self {
        Self {
            helper,
            debouncer: Debouncer::new(debounce_ms),
            page_size,
            must_have_postal_code,
            query: String::new(),
            results: Vec::new(),
            visible_count: 0,
            api_page_num: None,
            total_num_pages: None,
            selected_index: None,
            result_state: ResultState::Pristine,
            loading: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn result_state(&self) -> ResultState {
        self.result_state
    }

    /// Loading is distinct from `NotFound` so the empty state is not flashed
    /// while a lookup is still pending.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    #[must_use]
    pub fn selected_candidate(&self) -> Option<&AddressCandidate> {
        self.selected_index.and_then(|i| self.results.get(i))
    }

    /// Confirm is only offered once a candidate is selected and the list is
    /// in the `Found` state.
    #[must_use]
    pub fn can_confirm(&self) -> bool {
        self.result_state == ResultState::Found && self.selected_index.is_some()
    }

    /// Connectivity probe run while the modal opens: one neutral forward
    /// search and one reverse-geocode call. Results are discarded; only a
    /// service failure matters, and it surfaces before the user interacts.
    ///
    /// # Errors
    ///
    /// Propagates the first [`GeocodeError`] from either probe.
    pub async fn warm_up(&self, cancel: &CancelHandle) -> Result<(), GeocodeError> {
        self.helper.fetch_address(WARM_UP_QUERY, 1).await?;
        self.helper
            .fetch_location_list(WARM_UP_POINT, true, cancel, false)
            .await?;
        Ok(())
    }

    /// Applies a query change: debounced forward search, with stale results
    /// dropped by generation so an older query can never overwrite a newer
    /// one's list.
    ///
    /// # Errors
    ///
    /// Propagates [`GeocodeError`] from the forward search. Callers route it
    /// through the modal's error dispatcher.
    pub async fn set_query(&mut self, query: &str) -> Result<QueryOutcome, GeocodeError> {
        self.query = query.to_owned();
        // Any query change invalidates the previous selection and paging.
        self.selected_index = None;
        self.result_state = ResultState::Pristine;
        self.api_page_num = None;
        self.total_num_pages = None;

        if query.trim().is_empty() {
            self.results.clear();
            self.visible_count = 0;
            return Ok(QueryOutcome::Cleared);
        }

        if !self.debouncer.acquire().await {
            return Ok(QueryOutcome::Superseded);
        }
        let generation = self.debouncer.current();

        let guard = LoadingGuard::engage(&self.loading);
        let fetched = self.helper.fetch_address(query, 1).await;
        drop(guard);

        let page = match fetched {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(error = %e, "forward search failed");
                return Err(e);
            }
        };

        if !self.debouncer.is_current(generation) || self.query != query {
            return Ok(QueryOutcome::Superseded);
        }

        let page = page.unwrap_or_default();
        self.results = page.results;
        self.api_page_num = page.api_page_num;
        self.total_num_pages = page.total_num_pages;
        self.visible_count = self.results.len().min(self.page_size);
        self.result_state = if self.results.is_empty() {
            ResultState::NotFound
        } else {
            ResultState::Pristine
        };
        Ok(QueryOutcome::Applied)
    }

    /// Reveals the next client-side page of 10, fetching the next remote page
    /// when the local buffer is exhausted. No-op while another page fetch is
    /// in flight.
    ///
    /// # Errors
    ///
    /// Propagates [`GeocodeError`] from the next-page fetch.
    pub async fn load_more(&mut self) -> Result<(), GeocodeError> {
        if self.is_loading() {
            return Ok(());
        }

        if self.visible_count < self.results.len() {
            self.visible_count = (self.visible_count + self.page_size).min(self.results.len());
            return Ok(());
        }

        let (Some(current), Some(total)) = (self.api_page_num, self.total_num_pages) else {
            return Ok(());
        };
        if current >= total {
            return Ok(());
        }

        let guard = LoadingGuard::engage(&self.loading);
        let fetched = self.helper.fetch_address(&self.query, current + 1).await;
        drop(guard);

        let page = fetched?.unwrap_or_default();
        self.api_page_num = page.api_page_num.or(Some(current + 1));
        self.results.extend(page.results);
        self.visible_count = (self.visible_count + self.page_size).min(self.results.len());
        Ok(())
    }

    /// The currently visible slice, with query matches wrapped in highlight
    /// markers. Highlighting touches only `display_address_text`; `address`
    /// stays canonical.
    #[must_use]
    pub fn visible_results(&self) -> Vec<AddressCandidate> {
        self.results[..self.visible_count.min(self.results.len())]
            .iter()
            .map(|candidate| {
                let mut shown = candidate.clone();
                shown.display_address_text =
                    Some(highlight_matches(&candidate.address, &self.query));
                shown
            })
            .collect()
    }

    /// Selects a result by index in the full fetched list.
    ///
    /// # Errors
    ///
    /// - [`SelectError::PostalCodeMissing`] when the field requires a postal
    ///   code and the candidate lacks one; the selection is not updated.
    /// - [`SelectError::OutOfRange`] for a bad index.
    pub fn select(&mut self, index: usize) -> Result<AddressCandidate, SelectError> {
        let candidate = self.results.get(index).ok_or(SelectError::OutOfRange)?;
        if self.must_have_postal_code && !has_address_value(candidate.postal_code.as_deref()) {
            return Err(SelectError::PostalCodeMissing);
        }
        self.selected_index = Some(index);
        self.result_state = ResultState::Found;
        Ok(candidate.clone())
    }

    /// Reverts the panel when the modal is dismissed: a complete committed
    /// value restores its address as the query, anything else clears it.
    pub fn cancel(&mut self, committed: &LocationFieldValue) {
        let complete = committed.coordinate().is_some()
            && has_address_value(committed.address.as_deref());
        if complete {
            self.query = committed.address.clone().unwrap_or_default();
        } else {
            self.query.clear();
        }
        self.results.clear();
        self.visible_count = 0;
        self.api_page_num = None;
        self.total_num_pages = None;
        self.selected_index = None;
        self.result_state = ResultState::Pristine;
        self.loading.store(false, Ordering::SeqCst);
    }
}

/// Wraps case-insensitive occurrences of `query` in `text` with the
/// highlight markers.
#[must_use]
pub fn highlight_matches(text: &str, query: &str) -> String {
    let needle = query.trim();
    if needle.is_empty() {
        return text.to_owned();
    }
    let Ok(re) = Regex::new(&format!("(?i){}", regex::escape(needle))) else {
        return text.to_owned();
    };
    re.replace_all(text, format!("{HIGHLIGHT_OPEN}$0{HIGHLIGHT_CLOSE}"))
        .into_owned()
}
