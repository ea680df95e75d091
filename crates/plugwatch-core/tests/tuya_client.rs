//! Tuya client tests against a mock OpenAPI server.

use std::time::Duration;

use mockito::Matcher;
use plugwatch_core::{ApiError, CoreError, Credentials, InvalidReading, SampleSource, TuyaClient};
use url::Url;

const TOKEN_BODY: &str =
    r#"{"success":true,"result":{"access_token":"tok-123","expire_time":7200,"uid":"u1"},"t":1700000000000}"#;

fn client(server: &mockito::Server) -> TuyaClient {
    TuyaClient::with_base_url(
        Url::parse(&server.url()).unwrap(),
        "dev1",
        Credentials {
            api_key: "test-id".into(),
            api_secret: "test-secret".into(),
        },
        Duration::from_secs(5),
    )
    .unwrap()
}

async fn mock_token(server: &mut mockito::Server) -> mockito::Mock {
    server
        .mock("GET", "/v1.0/token")
        .match_query(Matcher::UrlEncoded("grant_type".into(), "1".into()))
        .match_header("client_id", "test-id")
        .match_header("sign_method", "HMAC-SHA256")
        .match_header("sign", Matcher::Regex("^[0-9A-F]{64}$".into()))
        .match_header("t", Matcher::Regex("^[0-9]{13}$".into()))
        .with_header("content-type", "application/json")
        .with_body(TOKEN_BODY)
        .create_async()
        .await
}

#[tokio::test]
async fn fetch_reading_decodes_status_points() {
    let mut server = mockito::Server::new_async().await;
    let token = mock_token(&mut server).await;
    let status = server
        .mock("GET", "/v1.0/devices/dev1/status")
        .match_header("access_token", "tok-123")
        .match_header("sign", Matcher::Regex("^[0-9A-F]{64}$".into()))
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"success":true,"t":1700000000000,"result":[
                {"code":"switch_1","value":true},
                {"code":"countdown_1","value":0},
                {"code":"add_ele","value":3},
                {"code":"cur_current","value":412},
                {"code":"cur_voltage","value":2298},
                {"code":"cur_power","value":905},
                {"code":"relay_status","value":"last"}
            ]}"#,
        )
        .create_async()
        .await;

    let reading = client(&server).fetch_reading().await.unwrap();
    assert_eq!(reading.raw_status.power_on, Some(true));
    assert_eq!(reading.power_watts, Some(90.5));
    assert_eq!(reading.raw_status.relay_status, "last");
    assert_eq!(reading.timestamp.timestamp_subsec_nanos(), 0);

    token.assert_async().await;
    status.assert_async().await;
}

#[tokio::test]
async fn rejected_token_is_an_auth_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/v1.0/token")
        .match_query(Matcher::Any)
        .with_body(r#"{"success":false,"code":1004,"msg":"sign invalid","t":1700000000000}"#)
        .create_async()
        .await;

    let err = client(&server).fetch_reading().await.unwrap_err();
    assert!(matches!(err, CoreError::Api(ApiError::Auth(_))), "{err:?}");
}

#[tokio::test]
async fn http_failure_is_reported_with_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/v1.0/token")
        .match_query(Matcher::Any)
        .with_status(502)
        .create_async()
        .await;

    let err = client(&server).token().await.unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 502, .. }), "{err:?}");
}

#[tokio::test]
async fn too_many_requests_is_rate_limited() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/v1.0/token")
        .match_query(Matcher::Any)
        .with_status(429)
        .create_async()
        .await;

    let err = client(&server).token().await.unwrap_err();
    assert!(matches!(err, ApiError::RateLimited(_)), "{err:?}");
}

#[tokio::test]
async fn malformed_switch_flag_is_invalid_reading() {
    let mut server = mockito::Server::new_async().await;
    let _token = mock_token(&mut server).await;
    let _status = server
        .mock("GET", "/v1.0/devices/dev1/status")
        .with_body(r#"{"success":true,"result":[{"code":"switch_1","value":"yes"}]}"#)
        .create_async()
        .await;

    let err = client(&server).fetch_reading().await.unwrap_err();
    assert!(
        matches!(err, CoreError::InvalidReading(InvalidReading::BadDataPoint { .. })),
        "{err:?}"
    );
}

#[tokio::test]
async fn device_info_reads_metadata() {
    let mut server = mockito::Server::new_async().await;
    let _token = mock_token(&mut server).await;
    let _status = server
        .mock("GET", "/v1.0/devices/dev1")
        .match_header("access_token", "tok-123")
        .with_body(
            r#"{"success":true,"result":{"id":"dev1","name":"Washer plug","product_name":"Smart Plug","online":true,"ip":"1.2.3.4","time_zone":"+01:00","uuid":"x"}}"#,
        )
        .create_async()
        .await;

    let info = client(&server).device_info().await.unwrap();
    assert_eq!(info.name, "Washer plug");
    assert!(info.online);
    assert_eq!(info.time_zone, "+01:00");
}
