//! Orchestration on top of [`OneMapClient`]: the dual-radius reverse-geocode
//! strategy, result dedupe, debounced forward search, and single-candidate
//! convenience fetches.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use locfield_core::{AddressCandidate, Coordinate, SearchResultPage};

use crate::cancel::CancelHandle;
use crate::client::OneMapClient;
use crate::error::GeocodeError;
use crate::normalize::{candidate_from_geocode_info, candidate_from_search_hit};

/// Tight radius for the "on the spot" reverse-geocode call, in meters.
const ON_THE_SPOT_RADIUS_M: u32 = 10;
/// Wide radius for the "expanded" reverse-geocode call, in meters.
const EXPANDED_RADIUS_M: u32 = 500;

/// OneMap reports points across the strait under this region; filtered when
/// the field is restricted to Singapore addresses.
const NON_SG_SENTINEL: &str = "JOHOR (MALAYSIA)";

/// Outcome of a reverse-geocode orchestration.
///
/// `Canceled` is kept distinct from an empty `Results` so a superseded
/// request can never clobber state a newer request is about to write.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationList {
    Canceled,
    Results(Vec<AddressCandidate>),
}

impl LocationList {
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }

    /// The candidate list; empty when the request was canceled.
    #[must_use]
    pub fn into_results(self) -> Vec<AddressCandidate> {
        match self {
            Self::Canceled => Vec::new(),
            Self::Results(list) => list,
        }
    }
}

/// Orchestrates geocoding calls for one location field.
#[derive(Debug, Clone)]
pub struct LocationHelper {
    client: OneMapClient,
}

impl LocationHelper {
    #[must_use]
    pub fn new(client: OneMapClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &OneMapClient {
        &self.client
    }

    /// Resolves the address candidates around a coordinate using the
    /// dual-radius strategy.
    ///
    /// OneMap-style reverse geocoders exclude postal-code-less places (parks,
    /// fields) from a tight radius when postal-coded buildings exist nearby;
    /// the wider second call recovers them. The merge keeps every expanded
    /// result, plus on-the-spot results whose building name is not already in
    /// the expanded set.
    ///
    /// Arms `cancel` first, so only the latest request for this field is ever
    /// outstanding. A canceled call resolves to [`LocationList::Canceled`],
    /// never an error.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`GeocodeError`] for real failures (transport,
    /// timeout, malformed body). Callers route these through their error
    /// dispatcher and render an empty list; nothing may escalate past them.
    pub async fn fetch_location_list(
        &self,
        coord: Coordinate,
        must_have_postal_code: bool,
        cancel: &CancelHandle,
        exclude_non_sg: bool,
    ) -> Result<LocationList, GeocodeError> {
        let on_the_spot = if must_have_postal_code {
            Vec::new()
        } else {
            let registration = cancel.arm();
            match self
                .client
                .reverse_geocode(coord.lat, coord.lng, ON_THE_SPOT_RADIUS_M, true, registration)
                .await
            {
                Ok(records) => records,
                Err(e) if e.is_canceled() => return Ok(LocationList::Canceled),
                Err(e) => {
                    tracing::warn!(error = %e, "on-the-spot reverse geocode failed");
                    return Err(e);
                }
            }
        };

        let registration = cancel.arm();
        let expanded = match self
            .client
            .reverse_geocode(coord.lat, coord.lng, EXPANDED_RADIUS_M, false, registration)
            .await
        {
            Ok(records) => records,
            Err(e) if e.is_canceled() => return Ok(LocationList::Canceled),
            Err(e) => {
                tracing::warn!(error = %e, "expanded reverse geocode failed");
                return Err(e);
            }
        };

        let expanded: Vec<AddressCandidate> = expanded
            .iter()
            .map(|info| candidate_from_geocode_info(info, coord))
            .collect();

        // Expanded set wins on conflict; dedupe is by building name.
        let mut merged: Vec<AddressCandidate> = on_the_spot
            .iter()
            .map(|info| candidate_from_geocode_info(info, coord))
            .filter(|candidate| {
                candidate.building.as_deref().is_none_or(|name| {
                    !expanded
                        .iter()
                        .any(|e| e.building.as_deref() == Some(name))
                })
            })
            .collect();
        merged.extend(expanded);

        if exclude_non_sg {
            merged.retain(|candidate| {
                candidate.building.as_deref() != Some(NON_SG_SENTINEL)
                    && candidate.road_name.as_deref() != Some(NON_SG_SENTINEL)
            });
        }

        Ok(LocationList::Results(merged))
    }

    /// Forward search for one remote page, normalized.
    ///
    /// An empty or whitespace-only query resolves immediately to `None`
    /// without touching the network.
    ///
    /// # Errors
    ///
    /// Propagates [`GeocodeError`] from [`OneMapClient::search_by_address`].
    pub async fn fetch_address(
        &self,
        query: &str,
        page_num: u32,
    ) -> Result<Option<SearchResultPage>, GeocodeError> {
        if query.trim().is_empty() {
            return Ok(None);
        }

        let response = self.client.search_by_address(query, page_num).await?;
        let results = response
            .results
            .iter()
            .filter_map(candidate_from_search_hit)
            .collect();

        Ok(Some(SearchResultPage {
            results,
            api_page_num: response.page_num,
            total_num_pages: response.total_num_pages,
        }))
    }

    /// Page-1 forward search returning only the first candidate. Used to
    /// re-resolve a committed address when the modal reopens.
    ///
    /// # Errors
    ///
    /// Propagates [`GeocodeError`] from the forward search.
    pub async fn fetch_single_location_by_address(
        &self,
        address: &str,
    ) -> Result<Option<AddressCandidate>, GeocodeError> {
        let page = self.fetch_address(address, 1).await?;
        Ok(page.and_then(|p| p.results.into_iter().next()))
    }

    /// Reverse geocode returning only the first candidate. Used to prefill a
    /// field from a stored coordinate. A canceled lookup yields `None`.
    ///
    /// # Errors
    ///
    /// Propagates [`GeocodeError`] from the reverse geocode.
    pub async fn fetch_single_location_by_lat_lng(
        &self,
        coord: Coordinate,
        must_have_postal_code: bool,
        cancel: &CancelHandle,
    ) -> Result<Option<AddressCandidate>, GeocodeError> {
        let list = self
            .fetch_location_list(coord, must_have_postal_code, cancel, false)
            .await?;
        Ok(list.into_results().into_iter().next())
    }
}

/// Trailing debounce shared by rapid callers: of N calls within the window,
/// only the last proceeds.
///
/// Each caller takes a fresh generation, sleeps for the window, and proceeds
/// only if no later caller arrived meanwhile. Generation numbers also key
/// result application — a caller that loses the race never gets to apply a
/// stale result.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    #[must_use]
    pub fn new(window_ms: u64) -> Self {
        Self {
            window: Duration::from_millis(window_ms),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Waits out the debounce window. Returns `true` iff this caller is still
    /// the latest and should proceed with its network call.
    pub async fn acquire(&self) -> bool {
        let mine = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.window).await;
        self.generation.load(Ordering::SeqCst) == mine
    }

    /// Whether `generation` (as returned by [`Self::current`] at call time)
    /// is still the latest. Used to drop late-arriving results.
    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    #[must_use]
    pub fn current(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn geocode_record(building: &str, road: &str, postal: &str) -> serde_json::Value {
        serde_json::json!({
            "BUILDINGNAME": building,
            "BLOCK": "NIL",
            "ROAD": road,
            "POSTALCODE": postal,
            "XCOORD": "29000.0",
            "YCOORD": "39000.0",
            "LATITUDE": "1.3000",
            "LONGITUDE": "103.8000",
        })
    }

    async fn helper_for(server: &MockServer) -> LocationHelper {
        let client = OneMapClient::with_base_url(&server.uri(), 15, "locfield-test")
            .expect("client construction should not fail");
        LocationHelper::new(client)
    }

    #[tokio::test]
    async fn dual_radius_merge_dedupes_by_building_name() {
        let server = MockServer::start().await;

        // 2 on-the-spot results, one of which shares a building name with the
        // expanded set.
        Mock::given(method("GET"))
            .and(path("/api/public/revgeocode"))
            .and(query_param("buffer", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "GeocodeInfo": [
                    geocode_record("PUNGGOL PARK", "PUNGGOL ROAD", "NIL"),
                    geocode_record("SHARED TOWER", "SHARED ROAD", "530000"),
                ]
            })))
            .mount(&server)
            .await;

        // 3 expanded results.
        Mock::given(method("GET"))
            .and(path("/api/public/revgeocode"))
            .and(query_param("buffer", "500"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "GeocodeInfo": [
                    geocode_record("SHARED TOWER", "SHARED ROAD", "530000"),
                    geocode_record("BLOCK A", "A ROAD", "530001"),
                    geocode_record("BLOCK B", "B ROAD", "530002"),
                ]
            })))
            .mount(&server)
            .await;

        let helper = helper_for(&server).await;
        let cancel = CancelHandle::new();
        let list = helper
            .fetch_location_list(Coordinate::new(1.3, 103.8), false, &cancel, false)
            .await
            .expect("fetch should succeed")
            .into_results();

        assert_eq!(list.len(), 4, "expanded set wins on the shared building");
        let buildings: Vec<_> = list.iter().filter_map(|c| c.building.as_deref()).collect();
        assert_eq!(
            buildings
                .iter()
                .filter(|b| **b == "SHARED TOWER")
                .count(),
            1
        );
        assert!(buildings.contains(&"PUNGGOL PARK"));
    }

    #[tokio::test]
    async fn postal_code_required_skips_the_tight_radius_call() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/public/revgeocode"))
            .and(query_param("buffer", "500"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "GeocodeInfo": [geocode_record("BLOCK A", "A ROAD", "530001")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let helper = helper_for(&server).await;
        let cancel = CancelHandle::new();
        let list = helper
            .fetch_location_list(Coordinate::new(1.3, 103.8), true, &cancel, false)
            .await
            .expect("fetch should succeed")
            .into_results();

        assert_eq!(list.len(), 1);
        // The wiremock expectation fails at drop if the 10 m call was made,
        // since no mock matches buffer=10.
    }

    #[tokio::test]
    async fn non_sg_sentinel_is_filtered_when_requested() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/public/revgeocode"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "GeocodeInfo": [
                    geocode_record("JOHOR (MALAYSIA)", "NIL", "NIL"),
                    geocode_record("BLOCK A", "A ROAD", "530001"),
                ]
            })))
            .mount(&server)
            .await;

        let helper = helper_for(&server).await;
        let cancel = CancelHandle::new();
        let list = helper
            .fetch_location_list(Coordinate::new(1.45, 103.8), true, &cancel, true)
            .await
            .expect("fetch should succeed")
            .into_results();

        assert_eq!(list.len(), 1);
        assert_eq!(list[0].building.as_deref(), Some("BLOCK A"));
    }

    #[tokio::test]
    async fn canceled_fetch_resolves_to_empty_without_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/public/revgeocode"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "GeocodeInfo": [] }))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let helper = helper_for(&server).await;
        let cancel = CancelHandle::new();

        let in_flight = tokio::spawn({
            let helper = helper.clone();
            let cancel = cancel.clone();
            async move {
                helper
                    .fetch_location_list(Coordinate::new(1.3, 103.8), true, &cancel, false)
                    .await
            }
        });

        // Give the request time to go out, then supersede it.
        tokio::time::sleep(Duration::from_millis(100)).await;
        let _newer = cancel.arm();

        let result = in_flight.await.expect("task should not panic");
        assert!(
            matches!(result, Ok(LocationList::Canceled)),
            "canceled fetch must be a silent no-op, got: {result:?}"
        );
    }

    #[tokio::test]
    async fn empty_query_resolves_without_network() {
        // No mock server at all: any network call would error.
        let client = OneMapClient::with_base_url("http://127.0.0.1:9", 1, "locfield-test")
            .expect("client construction should not fail");
        let helper = LocationHelper::new(client);

        let page = helper.fetch_address("", 1).await.expect("no-op");
        assert!(page.is_none());
        let page = helper.fetch_address("   ", 1).await.expect("no-op");
        assert!(page.is_none());
    }

    #[tokio::test]
    async fn single_location_by_address_takes_first_hit() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/common/elastic/search"))
            .and(query_param("searchVal", "raffles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "found": 2,
                "totalNumPages": 1,
                "pageNum": 1,
                "results": [
                    {
                        "SEARCHVAL": "RAFFLES PLACE",
                        "BLK_NO": "1",
                        "ROAD_NAME": "RAFFLES PLACE",
                        "BUILDING": "ONE RAFFLES PLACE",
                        "ADDRESS": "1 RAFFLES PLACE",
                        "POSTAL": "048616",
                        "X": "30000.0",
                        "Y": "29000.0",
                        "LATITUDE": "1.2840",
                        "LONGITUDE": "103.8510"
                    },
                    {
                        "SEARCHVAL": "RAFFLES CITY",
                        "BLK_NO": "252",
                        "ROAD_NAME": "NORTH BRIDGE ROAD",
                        "BUILDING": "RAFFLES CITY",
                        "ADDRESS": "252 NORTH BRIDGE ROAD",
                        "POSTAL": "179103",
                        "X": "30500.0",
                        "Y": "30500.0",
                        "LATITUDE": "1.2930",
                        "LONGITUDE": "103.8530"
                    }
                ]
            })))
            .mount(&server)
            .await;

        let helper = helper_for(&server).await;
        let first = helper
            .fetch_single_location_by_address("raffles")
            .await
            .expect("fetch should succeed")
            .expect("a candidate");
        assert_eq!(first.building.as_deref(), Some("ONE RAFFLES PLACE"));
        assert_eq!(first.postal_code.as_deref(), Some("048616"));
    }

    #[tokio::test(start_paused = true)]
    async fn debouncer_lets_only_the_last_caller_through() {
        let debouncer = Debouncer::new(500);

        let mut handles = Vec::new();
        for _ in 0..5 {
            let d = debouncer.clone();
            handles.push(tokio::spawn(async move { d.acquire().await }));
            // Space calls 50 ms apart, all inside one 500 ms window.
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        let mut passed = 0;
        for handle in handles {
            if handle.await.expect("task should not panic") {
                passed += 1;
            }
        }
        assert_eq!(passed, 1, "exactly one caller proceeds");
    }

    #[tokio::test(start_paused = true)]
    async fn debouncer_generation_detects_staleness() {
        let debouncer = Debouncer::new(500);
        assert!(debouncer.acquire().await);
        let seen = debouncer.current();
        assert!(debouncer.is_current(seen));
        assert!(debouncer.acquire().await);
        assert!(!debouncer.is_current(seen));
    }
}
