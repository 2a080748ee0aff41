//! Integration tests for `GeocodeClient` using wiremock HTTP mocks.

use tienda_geocode::{GeocodeClient, GeocodeError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> GeocodeClient {
    GeocodeClient::with_base_url(base_url, 10, "MiTiendaApp/1.0")
        .expect("client construction should not fail")
}

#[tokio::test]
async fn search_returns_first_place() {
    let server = MockServer::start().await;

    let body = serde_json::json!([
        {
            "place_id": 1,
            "lat": "-29.9078",
            "lon": "-71.2567",
            "display_name": "Avenida Balmaceda 2650, La Serena, Coquimbo, Chile"
        }
    ]);

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("format", "json"))
        .and(query_param("q", "Av. Balmaceda 2650, La Serena, Chile"))
        .and(query_param("limit", "1"))
        .and(header("user-agent", "MiTiendaApp/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let hit = client
        .search("  Av. Balmaceda 2650,  La Serena ")
        .await
        .expect("should geocode")
        .expect("should find a place");

    assert!((hit.coordinate.lat + 29.9078).abs() < 1e-9);
    assert!((hit.coordinate.lng + 71.2567).abs() < 1e-9);
    assert!(hit.display_name.starts_with("Avenida Balmaceda"));
}

#[tokio::test]
async fn search_with_no_results_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let hit = client.search("Calle Inexistente 0").await.unwrap();
    assert!(hit.is_none());
}

#[tokio::test]
async fn custom_country_is_appended() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Gran Vía 1, España"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "lat": "40.4200", "lon": "-3.7025", "display_name": "Gran Vía, Madrid" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).with_country("España");
    let hit = client.search("Gran Vía 1").await.unwrap();
    assert!(hit.is_some());
}

#[tokio::test]
async fn blank_address_never_hits_network() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.search("   ").await.unwrap_err();
    assert!(matches!(err, GeocodeError::EmptyAddress));
}

#[tokio::test]
async fn server_error_is_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.search("Av. del Mar 100").await.unwrap_err();
    assert!(matches!(err, GeocodeError::Http(_)));
}

#[tokio::test]
async fn non_array_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "error": "rate limited" })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.search("Av. del Mar 100").await.unwrap_err();
    assert!(matches!(err, GeocodeError::Deserialize { .. }));
}
