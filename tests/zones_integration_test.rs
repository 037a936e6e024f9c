mod common;

use common::{error_envelope, fast_client, zone_json, ZONE_ID};

use cloudflare_api::domain::models::ZoneParams;
use cloudflare_api::infrastructure::api::ApiError;
use tokio_test::{assert_err, assert_ok};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn page(zones: Vec<serde_json::Value>, page: u32, total_pages: u32) -> serde_json::Value {
    let count = zones.len();
    serde_json::json!({
        "success": true,
        "errors": [],
        "messages": [],
        "result": zones,
        "result_info": {
            "page": page,
            "per_page": 2,
            "total_pages": total_pages,
            "count": count,
            "total_count": 5
        }
    })
}

#[tokio::test]
async fn test_get_zone() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/client/v4/zones/{ZONE_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "errors": [],
            "messages": [],
            "result": zone_json(ZONE_ID, "example.com")
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = fast_client(&mock_server.uri(), 0);
    let zone = assert_ok!(client.zones().get(&CancellationToken::new(), ZONE_ID).await);

    assert_eq!(zone.id, ZONE_ID);
    assert_eq!(zone.name, "example.com");
    assert_eq!(zone.plan.common.name, "Pro Plan");
    assert_eq!(zone.plan.common.price, 20);
    assert_eq!(zone.account.name, "Demo Account");
    assert!(zone.original_ns.is_empty());
    assert!(zone.created_on.is_some());
}

#[tokio::test]
async fn test_get_zone_rejects_invalid_identifier() {
    let mock_server = MockServer::start().await;
    let (client, _) = fast_client(&mock_server.uri(), 0);

    let err = assert_err!(client.zones().get(&CancellationToken::new(), "example.com").await);
    assert!(matches!(err, ApiError::InvalidIdentifier { kind: "zone", .. }));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_zone_propagates_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(error_envelope(1001, "Invalid zone identifier")))
        .mount(&mock_server)
        .await;

    let (client, _) = fast_client(&mock_server.uri(), 0);
    let err = assert_err!(client.zones().get(&CancellationToken::new(), ZONE_ID).await);
    assert!(err.as_request_error().unwrap().has_error_code(1001));
}

#[tokio::test]
async fn test_get_zone_with_unexpected_result_shape() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"success":true,"result":"oops"}"#))
        .mount(&mock_server)
        .await;

    let (client, _) = fast_client(&mock_server.uri(), 0);
    let err = assert_err!(client.zones().get(&CancellationToken::new(), ZONE_ID).await);
    assert!(matches!(err, ApiError::DecodeResult { resource: "zone", .. }));
}

#[tokio::test]
async fn test_list_zones_sends_filters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/client/v4/zones"))
        .and(query_param("name", "example.com"))
        .and(query_param("status", "active"))
        .and(query_param("account.id", "01a7362d577a6c3019a474fd6f485823"))
        .and(query_param("per_page", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page(vec![zone_json(ZONE_ID, "example.com")], 1, 1)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = fast_client(&mock_server.uri(), 0);
    let params = ZoneParams {
        name: Some("example.com".to_string()),
        status: Some("active".to_string()),
        account_id: Some("01a7362d577a6c3019a474fd6f485823".to_string()),
        per_page: Some(2),
        ..Default::default()
    };

    let response = assert_ok!(client.zones().list(&CancellationToken::new(), &params).await);
    assert!(response.response.success);
    assert_eq!(response.result.len(), 1);
    assert_eq!(response.result_info.total, 5);
    assert!(!response.result_info.has_next_page());
}

#[tokio::test]
async fn test_list_all_follows_pagination() {
    let mock_server = MockServer::start().await;
    let ids: Vec<String> = (0..5).map(|i| format!("{i:032x}")).collect();

    for (number, chunk) in ids.chunks(2).enumerate() {
        let zones = chunk
            .iter()
            .map(|id| zone_json(id, &format!("zone-{id}.example")))
            .collect();
        let page_number = u32::try_from(number + 1).unwrap();

        Mock::given(method("GET"))
            .and(path("/client/v4/zones"))
            .and(query_param("page", page_number.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(zones, page_number, 3)))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let (client, _) = fast_client(&mock_server.uri(), 0);
    let params = ZoneParams {
        per_page: Some(2),
        ..Default::default()
    };

    let zones = assert_ok!(client.zones().list_all(&CancellationToken::new(), &params).await);
    let fetched: Vec<String> = zones.into_iter().map(|z| z.id).collect();
    assert_eq!(fetched, ids);
}

#[tokio::test]
async fn test_list_all_stops_on_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page(vec![zone_json(ZONE_ID, "example.com")], 1, 2)),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(403).set_body_json(error_envelope(9109, "Invalid access")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = fast_client(&mock_server.uri(), 0);
    let err = assert_err!(
        client
            .zones()
            .list_all(&CancellationToken::new(), &ZoneParams::default())
            .await
    );
    assert_eq!(err.status(), Some(403));
}

#[tokio::test]
async fn test_delete_zone() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("/client/v4/zones/{ZONE_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "errors": [],
            "messages": [],
            "result": {"id": ZONE_ID}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = fast_client(&mock_server.uri(), 0);
    let deleted = assert_ok!(client.zones().delete(&CancellationToken::new(), ZONE_ID).await);
    assert_eq!(deleted.id, ZONE_ID);
}
