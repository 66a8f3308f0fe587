//! The location modal state machine.
//!
//! Composes the search panel and map picker, owns the provisional selection
//! and the cancellation handle, and funnels every asynchronous failure
//! through one dispatcher. Panel mode and error overlay are orthogonal
//! state axes.

use std::time::Duration;

use serde_json::json;

use locfield_core::{AddressCandidate, Coordinate, LocationFieldValue};
use locfield_geocode::normalize::pin_candidate;
use locfield_geocode::{CancelHandle, GeocodeError, LocationHelper, LocationList};

use crate::events::{Decision, EventHooks, FieldEvent};
use crate::geolocate::{GeolocateError, Geolocator};
use crate::picker::MapPicker;
use crate::search::{SearchPanel, SelectError};

/// Which panels are visible. `Double` is exclusive to wide viewports;
/// `Search` and `Map` are the mutually exclusive narrow-viewport states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelInputMode {
    Search,
    Map,
    Double,
}

/// Mutually exclusive error overlays, each with one recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalErrorState {
    None,
    /// Geocoding backend unreachable or erroring. The feature is unusable;
    /// the only recovery closes the modal.
    OneMapError,
    /// Geolocation denied or failed for a non-timeout reason. Dismissing
    /// keeps the modal open for manual search.
    GetLocationError,
    /// Geolocation timed out. The only recovery closes the modal.
    GetLocationTimeoutError,
    /// Raised by the search panel; does not close the modal.
    PostalCodeError,
}

impl ModalErrorState {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::OneMapError => "OneMapError",
            Self::GetLocationError => "GetLocationError",
            Self::GetLocationTimeoutError => "GetLocationTimeoutError",
            Self::PostalCodeError => "PostalCodeError",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModalConfig {
    pub field_id: String,
    pub must_have_postal_code: bool,
    pub exclude_non_sg: bool,
    pub geolocation_timeout: Duration,
    pub debounce_ms: u64,
    pub page_size: usize,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            field_id: String::new(),
            must_have_postal_code: false,
            exclude_non_sg: false,
            geolocation_timeout: Duration::from_millis(6_000),
            debounce_ms: 500,
            page_size: 10,
        }
    }
}

/// Top-level orchestrator for one location field's modal.
///
/// Owns the provisional (uncommitted) selection; the committed value is only
/// written by [`LocationModal::confirm`] and read back on reopen. Closing the
/// modal without confirming always reverts to the committed value.
pub struct LocationModal<G, H> {
    config: ModalConfig,
    helper: LocationHelper,
    search: SearchPanel,
    picker: MapPicker,
    geolocator: G,
    hooks: H,
    cancel: CancelHandle,
    panel_mode: PanelInputMode,
    error_state: ModalErrorState,
    pending_error: Option<ModalErrorState>,
    selected: Option<AddressCandidate>,
    map_picked: Option<Coordinate>,
    committed: LocationFieldValue,
    open: bool,
    online: bool,
    wide_viewport: bool,
}

impl<G: Geolocator, H: EventHooks> LocationModal<G, H> {
    #[must_use]
    pub fn new(helper: LocationHelper, geolocator: G, hooks: H, config: ModalConfig) -> Self {
        let search = SearchPanel::new(
            helper.clone(),
            config.debounce_ms,
            config.page_size,
            config.must_have_postal_code,
        );
        Self {
            config,
            helper,
            search,
            picker: MapPicker::new(),
            geolocator,
            hooks,
            cancel: CancelHandle::new(),
            panel_mode: PanelInputMode::Map,
            error_state: ModalErrorState::None,
            pending_error: None,
            selected: None,
            map_picked: None,
            committed: LocationFieldValue::default(),
            open: false,
            online: true,
            wide_viewport: false,
        }
    }

    // --- state accessors ---------------------------------------------------

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Offline preempts every other interaction behind a connectivity
    /// overlay.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.open && self.online
    }

    #[must_use]
    pub fn panel_mode(&self) -> PanelInputMode {
        self.panel_mode
    }

    #[must_use]
    pub fn error_state(&self) -> ModalErrorState {
        self.error_state
    }

    #[must_use]
    pub fn selected(&self) -> Option<&AddressCandidate> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn map_picked(&self) -> Option<Coordinate> {
        self.map_picked
    }

    #[must_use]
    pub fn committed(&self) -> &LocationFieldValue {
        &self.committed
    }

    #[must_use]
    pub fn search(&self) -> &SearchPanel {
        &self.search
    }

    #[must_use]
    pub fn picker(&self) -> &MapPicker {
        &self.picker
    }

    /// Confirm is offered once a provisional candidate exists and no error
    /// overlay blocks it.
    #[must_use]
    pub fn can_confirm(&self) -> bool {
        self.is_interactive()
            && self.error_state == ModalErrorState::None
            && self.selected.is_some()
    }

    /// Sets the committed value programmatically (form prefill or reset).
    pub fn set_committed_value(&mut self, value: LocationFieldValue) {
        self.committed = value;
    }

    // --- opening -----------------------------------------------------------

    /// Edit-button entry point: dispatches `click-edit-button`, then opens.
    pub async fn edit_button_clicked(&mut self, wide_viewport: bool) {
        if self.dispatch(FieldEvent::ClickEditButton, json!(null)) == Decision::Intercepted {
            return;
        }
        self.open(wide_viewport).await;
    }

    /// Opens the modal. Interceptable via `show-location-modal`; resume with
    /// [`Self::trigger_show_location_modal`].
    pub async fn open(&mut self, wide_viewport: bool) {
        if self.dispatch(FieldEvent::ShowLocationModal, json!(null)) == Decision::Intercepted {
            return;
        }
        self.trigger_show_location_modal(wide_viewport).await;
    }

    /// Built-in open behavior: warm up the service, then prefill from the
    /// committed coordinate or fall back to device geolocation.
    pub async fn trigger_show_location_modal(&mut self, wide_viewport: bool) {
        self.open = true;
        self.wide_viewport = wide_viewport;
        self.panel_mode = if wide_viewport {
            PanelInputMode::Double
        } else {
            PanelInputMode::Map
        };
        self.error_state = ModalErrorState::None;

        if let Err(e) = self.search.warm_up(&self.cancel).await {
            self.handle_geocode_error(e);
            return;
        }

        if let Some(coord) = self.committed.coordinate() {
            match self
                .helper
                .fetch_single_location_by_lat_lng(
                    coord,
                    self.config.must_have_postal_code,
                    &self.cancel,
                )
                .await
            {
                Ok(candidate) => {
                    self.picker.focus(coord, self.is_mobile());
                    self.selected = Some(candidate.unwrap_or_else(|| pin_candidate(coord)));
                }
                Err(e) => self.handle_geocode_error(e),
            }
        } else {
            self.get_current_location().await;
        }
    }

    // --- geolocation -------------------------------------------------------

    /// Requests the device's current position. Interceptable via
    /// `get-current-location`; an intercepting host supplies its own
    /// coordinate through [`Self::set_current_location`] or resumes the
    /// built-in path with [`Self::trigger_get_current_location`].
    pub async fn get_current_location(&mut self) {
        if self.dispatch(FieldEvent::GetCurrentLocation, json!(null)) == Decision::Intercepted {
            return;
        }
        self.trigger_get_current_location().await;
    }

    /// Built-in geolocation: taps are suppressed while the retrieval is in
    /// flight so they cannot race the result.
    pub async fn trigger_get_current_location(&mut self) {
        self.picker.set_locating(true);
        let result = self
            .geolocator
            .current_position(self.config.geolocation_timeout)
            .await;
        self.picker.set_locating(false);
        match result {
            Ok(coord) => self.set_current_location(coord).await,
            Err(e) => self.handle_geolocate_error(&e),
        }
    }

    /// Applies a device (or host-supplied) coordinate. Interceptable via
    /// `set-current-location`; resume with
    /// [`Self::trigger_set_current_location`].
    pub async fn set_current_location(&mut self, coord: Coordinate) {
        let payload = json!({ "lat": coord.lat, "lng": coord.lng });
        if self.dispatch(FieldEvent::SetCurrentLocation, payload) == Decision::Intercepted {
            return;
        }
        self.trigger_set_current_location(coord).await;
    }

    pub async fn trigger_set_current_location(&mut self, coord: Coordinate) {
        self.resolve_coordinate(coord).await;
    }

    // --- map interaction ---------------------------------------------------

    /// A tap on the map surface. Ignored while offline or while geolocation
    /// is in flight.
    pub async fn handle_map_tap(&mut self, coord: Coordinate) {
        if !self.is_interactive() {
            return;
        }
        let Some(coord) = self.picker.tap(coord) else {
            return;
        };
        self.map_picked = Some(coord);
        self.resolve_coordinate(coord).await;
    }

    /// Resolves a coordinate to its best address candidate and makes it the
    /// provisional selection. A canceled lookup changes nothing; an empty
    /// one selects the synthesized pin candidate.
    async fn resolve_coordinate(&mut self, coord: Coordinate) {
        match self
            .helper
            .fetch_location_list(
                coord,
                self.config.must_have_postal_code,
                &self.cancel,
                self.config.exclude_non_sg,
            )
            .await
        {
            Ok(LocationList::Canceled) => {}
            Ok(LocationList::Results(list)) => {
                let candidate = list
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| pin_candidate(coord));
                self.picker.focus(coord, self.is_mobile());
                self.selected = Some(candidate);
            }
            Err(e) => self.handle_geocode_error(e),
        }
    }

    // --- search interaction ------------------------------------------------

    /// Routes a query change through the panel, funnelling failures into the
    /// error dispatcher.
    pub async fn set_search_query(&mut self, query: &str) {
        if !self.is_interactive() {
            return;
        }
        if let Err(e) = self.search.set_query(query).await {
            self.handle_geocode_error(e);
        }
    }

    pub async fn load_more_results(&mut self) {
        if !self.is_interactive() {
            return;
        }
        if let Err(e) = self.search.load_more().await {
            self.handle_geocode_error(e);
        }
    }

    /// Accepts a search result. A postal-code rejection raises the
    /// recoverable overlay without touching the current selection; a valid
    /// pick in single-panel `Search` mode auto-switches to `Map` to preview
    /// the pin.
    pub fn select_search_result(&mut self, index: usize) {
        match self.search.select(index) {
            Ok(candidate) => {
                if let Some(coord) = candidate.coordinate() {
                    self.picker.focus(coord, self.is_mobile());
                }
                self.selected = Some(candidate);
                if self.panel_mode == PanelInputMode::Search {
                    self.panel_mode = PanelInputMode::Map;
                }
            }
            Err(SelectError::PostalCodeMissing) => {
                self.raise_error(ModalErrorState::PostalCodeError);
            }
            Err(SelectError::OutOfRange) => {
                tracing::debug!(index, "ignored out-of-range result selection");
            }
        }
    }

    // --- panel mode --------------------------------------------------------

    /// Breakpoint crossing: `Double` and `Map` track the viewport; an active
    /// `Search` panel stays put.
    pub fn set_viewport(&mut self, wide: bool) {
        self.wide_viewport = wide;
        match self.panel_mode {
            PanelInputMode::Search => {}
            PanelInputMode::Map if wide => self.panel_mode = PanelInputMode::Double,
            PanelInputMode::Double if !wide => self.panel_mode = PanelInputMode::Map,
            _ => {}
        }
    }

    /// Narrow-viewport toggle to the search panel.
    pub fn show_search(&mut self) {
        if !self.wide_viewport {
            self.panel_mode = PanelInputMode::Search;
        }
    }

    /// Narrow-viewport toggle to the map panel.
    pub fn show_map(&mut self) {
        if !self.wide_viewport {
            self.panel_mode = PanelInputMode::Map;
        }
    }

    fn is_mobile(&self) -> bool {
        !self.wide_viewport
    }

    // --- confirm / cancel --------------------------------------------------

    /// Commits the provisional selection to the form value and closes.
    /// Returns the committed value, or `None` when nothing is selected or a
    /// hook intercepted `click-confirm-location`.
    pub async fn confirm(&mut self) -> Option<LocationFieldValue> {
        if !self.can_confirm() {
            return None;
        }
        let payload = self
            .selected
            .as_ref()
            .map(|c| json!({ "address": c.address }))
            .unwrap_or(json!(null));
        if self.dispatch(FieldEvent::ClickConfirmLocation, payload) == Decision::Intercepted {
            return None;
        }
        Some(self.trigger_confirm_location())
    }

    /// Built-in confirm: one atomic assignment of the committed value, then
    /// close.
    pub fn trigger_confirm_location(&mut self) -> LocationFieldValue {
        let value = self
            .selected
            .as_ref()
            .map_or_else(|| self.committed.clone(), AddressCandidate::to_field_value);
        self.committed = value.clone();
        self.request_close();
        value
    }

    /// Discards the provisional selection (reverting to the committed value)
    /// and closes.
    pub fn cancel_modal(&mut self) {
        self.request_close();
    }

    fn request_close(&mut self) {
        if self.dispatch(FieldEvent::HideLocationModal, json!(null)) == Decision::Intercepted {
            return;
        }
        self.trigger_hide_location_modal();
    }

    /// Built-in close: cancels outstanding work and reverts all provisional
    /// state to the committed value.
    pub fn trigger_hide_location_modal(&mut self) {
        self.open = false;
        self.cancel.cancel();
        self.map_picked = None;
        self.selected = if self.committed.is_empty() {
            None
        } else {
            Some(AddressCandidate::from_field_value(&self.committed))
        };
        self.search.cancel(&self.committed);
        self.picker.set_locating(false);
        if let Some(coord) = self.committed.coordinate() {
            self.picker.focus(coord, self.is_mobile());
        } else {
            self.picker.clear();
        }
        self.error_state = ModalErrorState::None;
        self.pending_error = None;
    }

    // --- connectivity ------------------------------------------------------

    /// Connectivity change. Going offline cancels in-flight work and raises
    /// the overlay; coming back online is the only automatic dismissal, and
    /// re-resolves an already-selected coordinate's address exactly once.
    pub async fn set_online(&mut self, online: bool) {
        if online == self.online {
            return;
        }
        self.online = online;
        if !online {
            self.cancel.cancel();
            return;
        }
        if let Some(coord) = self.selected.as_ref().and_then(AddressCandidate::coordinate) {
            self.resolve_coordinate(coord).await;
        }
    }

    // --- error handling ----------------------------------------------------

    /// Single funnel for every geocoding failure. Cancellations are benign
    /// and swallowed here; everything else raises the service overlay.
    fn handle_geocode_error(&mut self, err: GeocodeError) {
        if err.is_canceled() {
            return;
        }
        tracing::warn!(error = %err, "geocoding service failure");
        self.raise_error(ModalErrorState::OneMapError);
    }

    fn handle_geolocate_error(&mut self, err: &GeolocateError) {
        tracing::warn!(error = %err, "geolocation failure");
        let state = match err {
            GeolocateError::Timeout => ModalErrorState::GetLocationTimeoutError,
            GeolocateError::PermissionDenied | GeolocateError::Unavailable(_) => {
                ModalErrorState::GetLocationError
            }
        };
        self.raise_error(state);
    }

    /// Dispatches the cancelable `error` event, then applies the built-in
    /// overlay unless a hook intercepted. An intercepting consumer resumes
    /// with [`Self::trigger_error`].
    fn raise_error(&mut self, state: ModalErrorState) {
        let payload = json!({ "code": state.code() });
        if self.dispatch(FieldEvent::Error, payload) == Decision::Intercepted {
            self.pending_error = Some(state);
            return;
        }
        self.trigger_error(state);
    }

    /// Built-in error handling for `state`. The service overlay restores the
    /// last committed value as the provisional selection.
    pub fn trigger_error(&mut self, state: ModalErrorState) {
        self.pending_error = None;
        if state == ModalErrorState::OneMapError {
            self.selected = if self.committed.is_empty() {
                None
            } else {
                Some(AddressCandidate::from_field_value(&self.committed))
            };
        }
        self.error_state = state;
    }

    /// The error overlay a hook intercepted and has not yet resumed.
    #[must_use]
    pub fn pending_error(&self) -> Option<ModalErrorState> {
        self.pending_error
    }

    /// The overlay's single recovery action. Dispatches the cancelable
    /// `error-end` event, then runs the state's recovery (closing the modal
    /// for service and timeout errors, staying open otherwise).
    pub fn dismiss_error(&mut self) {
        if self.error_state == ModalErrorState::None {
            return;
        }
        let payload = json!({ "code": self.error_state.code() });
        if self.dispatch(FieldEvent::ErrorEnd, payload) == Decision::Intercepted {
            return;
        }
        self.trigger_error_end();
    }

    /// Built-in `error-end` behavior.
    pub fn trigger_error_end(&mut self) {
        let state = std::mem::replace(&mut self.error_state, ModalErrorState::None);
        match state {
            ModalErrorState::OneMapError | ModalErrorState::GetLocationTimeoutError => {
                self.trigger_hide_location_modal();
            }
            ModalErrorState::None
            | ModalErrorState::GetLocationError
            | ModalErrorState::PostalCodeError => {}
        }
    }

    fn dispatch(&mut self, event: FieldEvent, payload: serde_json::Value) -> Decision {
        self.hooks.on_event(&self.config.field_id, event, &payload)
    }
}

#[cfg(test)]
#[path = "modal_test.rs"]
mod tests;
