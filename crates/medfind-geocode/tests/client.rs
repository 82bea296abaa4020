//! Integration tests for `NominatimClient` using wiremock HTTP mocks.

use std::time::Duration;

use medfind_core::{Coordinate, Geocoder};
use medfind_geocode::{GeocodeError, NominatimClient};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER_AGENT: &str = "medfind-test/0.1 (integration)";

fn test_client(base_url: &str) -> NominatimClient {
    NominatimClient::with_base_url(USER_AGENT, 1, base_url)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn search_returns_first_hit_and_sends_required_params() {
    let server = MockServer::start().await;

    let body = serde_json::json!([
        { "lat": "18.5114", "lon": "73.8048", "display_name": "Kothrud, Pune" }
    ]);

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Kothrud, Pune"))
        .and(query_param("format", "json"))
        .and(query_param("limit", "1"))
        .and(query_param("addressdetails", "1"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let coordinate = client
        .search("Kothrud, Pune")
        .await
        .expect("search should succeed");

    assert_eq!(coordinate, Some(Coordinate::new(18.5114, 73.8048)));
}

#[tokio::test]
async fn search_with_empty_array_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert_eq!(client.search("Nowhere").await.unwrap(), None);
}

#[tokio::test]
async fn blank_query_sends_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert_eq!(client.search("   ").await.unwrap(), None);
}

#[tokio::test]
async fn server_error_surfaces_as_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.search("Kothrud").await.unwrap_err();
    assert!(
        matches!(err, GeocodeError::UnexpectedStatus { status: 503, .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn malformed_body_surfaces_as_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.search("Kothrud").await.unwrap_err();
    assert!(matches!(err, GeocodeError::Deserialize { .. }), "got {err:?}");
}

#[tokio::test]
async fn out_of_range_hit_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{ "lat": "123.0", "lon": "73.0" }])),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.search("Kothrud").await.unwrap_err();
    assert!(matches!(err, GeocodeError::InvalidCoordinate(_)), "got {err:?}");
}

#[tokio::test]
async fn geocoder_port_flattens_failures_to_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert_eq!(client.forward_geocode("Kothrud").await, None);
}

#[tokio::test]
async fn slow_provider_times_out_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.search("Kothrud").await.unwrap_err();
    match err {
        GeocodeError::Http(e) => assert!(e.is_timeout(), "expected timeout, got {e}"),
        other => panic!("expected Http timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn reverse_prefers_city_and_suburb_fields() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "lat": "18.5344",
        "lon": "73.8985",
        "address": {
            "suburb": "Koregaon Park",
            "neighbourhood": "Lane 7",
            "city": "Pune",
            "town": "Hadapsar",
            "state": "Maharashtra",
            "country": "India"
        }
    });

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("lat", "18.5344"))
        .and(query_param("lon", "73.8985"))
        .and(query_param("format", "json"))
        .and(query_param("addressdetails", "1"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let locality = client
        .reverse(Coordinate::new(18.5344, 73.8985))
        .await
        .expect("reverse should succeed")
        .expect("address should be present");

    assert_eq!(locality.city, "Pune");
    assert_eq!(locality.area, "Koregaon Park");
}

#[tokio::test]
async fn reverse_falls_back_to_village_and_residential() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "address": { "village": "Manjri", "residential": "Green Acres" }
    });

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let locality = client
        .reverse(Coordinate::new(18.5119, 73.9446))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(locality.city, "Manjri");
    assert_eq!(locality.area, "Green Acres");
}

#[tokio::test]
async fn reverse_without_address_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "error": "Unable to geocode" })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert_eq!(client.reverse(Coordinate::new(0.0, 0.0)).await.unwrap(), None);
}

#[tokio::test]
async fn reverse_rejects_invalid_coordinate_without_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .reverse(Coordinate::new(95.0, 0.0))
        .await
        .unwrap_err();
    assert!(matches!(err, GeocodeError::InvalidCoordinate(_)));
    assert_eq!(client.reverse_geocode(Coordinate::new(95.0, 0.0)).await, None);
}
