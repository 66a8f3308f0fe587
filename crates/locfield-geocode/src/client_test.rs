use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::cancel::CancelHandle;

use super::*;

fn test_client(base_url: &str) -> OneMapClient {
    OneMapClient::with_base_url(base_url, 15, "locfield-test")
        .expect("client construction should not fail")
}

#[test]
fn rejects_invalid_base_url() {
    let result = OneMapClient::with_base_url("not-a-url", 15, "locfield-test");
    assert!(
        matches!(result, Err(GeocodeError::InvalidBaseUrl { .. })),
        "expected InvalidBaseUrl, got: {result:?}"
    );
}

#[test]
fn static_map_url_is_pure_construction() {
    let client = test_client("https://www.onemap.gov.sg");
    let url = client.static_map_url(1.284, 103.851, 400, 200, "255,0,0");
    assert!(url.starts_with("https://www.onemap.gov.sg/api/staticmap/getStaticImage?"));
    assert!(url.contains("latitude=1.284"));
    assert!(url.contains("longitude=103.851"));
    assert!(url.contains("width=400"));
    assert!(url.contains("height=200"));
    assert!(url.contains("points="));
}

#[test]
fn static_map_url_keeps_base_path() {
    let client = test_client("https://proxy.example.com/onemap");
    let url = client.static_map_url(1.3, 103.8, 100, 100, "0,0,255");
    assert!(
        url.starts_with("https://proxy.example.com/onemap/api/staticmap/getStaticImage?"),
        "got: {url}"
    );
}

#[tokio::test]
async fn search_sends_expected_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/common/elastic/search"))
        .and(query_param("searchVal", "orchard road"))
        .and(query_param("returnGeom", "Y"))
        .and(query_param("getAddrDetails", "Y"))
        .and(query_param("pageNum", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "found": 0,
            "totalNumPages": 0,
            "pageNum": 2,
            "results": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let response = client
        .search_by_address("orchard road", 2)
        .await
        .expect("search should succeed");
    assert_eq!(response.page_num, Some(2));
    assert!(response.results.is_empty());
}

#[tokio::test]
async fn non_2xx_is_an_unexpected_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/common/elastic/search"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.search_by_address("anything", 1).await;
    assert!(
        matches!(result, Err(GeocodeError::UnexpectedStatus { status: 502, .. })),
        "expected UnexpectedStatus(502), got: {result:?}"
    );
}

#[tokio::test]
async fn malformed_body_is_a_deserialize_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/common/elastic/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.search_by_address("anything", 1).await;
    assert!(
        matches!(result, Err(GeocodeError::Deserialize { .. })),
        "expected Deserialize, got: {result:?}"
    );
}

#[tokio::test]
async fn reverse_geocode_sends_radius_and_flags() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/public/revgeocode"))
        .and(query_param("location", "1.3,103.8"))
        .and(query_param("buffer", "500"))
        .and(query_param("addressType", "All"))
        .and(query_param("otherFeatures", "N"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "GeocodeInfo": [{
                "BUILDINGNAME": "BLOCK A",
                "BLOCK": "1",
                "ROAD": "A ROAD",
                "POSTALCODE": "530001",
                "XCOORD": "30000.0",
                "YCOORD": "39000.0",
                "LATITUDE": "1.3001",
                "LONGITUDE": "103.8001"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let cancel = CancelHandle::new();
    let records = client
        .reverse_geocode(1.3, 103.8, 500, false, cancel.arm())
        .await
        .expect("reverse geocode should succeed");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].building_name.as_deref(), Some("BLOCK A"));
}

#[tokio::test]
async fn aborted_reverse_geocode_resolves_to_canceled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/public/revgeocode"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "GeocodeInfo": [] }))
                .set_delay(std::time::Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let cancel = CancelHandle::new();
    let registration = cancel.arm();

    let in_flight = tokio::spawn({
        let client = client.clone();
        async move { client.reverse_geocode(1.3, 103.8, 500, false, registration).await }
    });
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    cancel.cancel();

    let result = in_flight.await.expect("task should not panic");
    assert!(
        matches!(result, Err(GeocodeError::Canceled)),
        "expected Canceled, got: {result:?}"
    );
    assert!(result.unwrap_err().is_canceled());
}

#[tokio::test]
async fn request_timeout_maps_to_timeout_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/common/elastic/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "results": [] }))
                .set_delay(std::time::Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    // 1 s client timeout against a 10 s response delay.
    let client = OneMapClient::with_base_url(&server.uri(), 1, "locfield-test")
        .expect("client construction should not fail");
    let result = client.search_by_address("slow", 1).await;
    assert!(
        matches!(result, Err(GeocodeError::Timeout { .. })),
        "expected Timeout, got: {result:?}"
    );
}
