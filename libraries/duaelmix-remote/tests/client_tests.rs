//! Tests for the HTTP mode client.
//!
//! These tests use mock servers to verify client behavior without
//! requiring a real server connection.

use duaelmix_core::SubIndex;
use duaelmix_remote::{HttpModeClient, ModeChannel, RemoteConfig, RemoteError, SessionId};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SESSION: &str = "abcdefghij";

fn session() -> SessionId {
    SessionId::parse(SESSION).unwrap()
}

fn client_for(server: &MockServer) -> HttpModeClient {
    let config = RemoteConfig::new(server.uri(), session())
        .with_poll_interval(Duration::from_millis(20));
    HttpModeClient::new(config).unwrap()
}

// =============================================================================
// Client Creation Tests
// =============================================================================

mod client_creation {
    use super::*;

    #[test]
    fn test_valid_urls() {
        for url in ["https://example.com", "http://localhost:8080"] {
            assert!(HttpModeClient::new(RemoteConfig::new(url, session())).is_ok());
        }
    }

    #[test]
    fn test_empty_url_rejected() {
        match HttpModeClient::new(RemoteConfig::new("", session())) {
            Err(RemoteError::InvalidUrl(msg)) => assert!(msg.contains("empty")),
            other => panic!("Expected InvalidUrl error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_url_without_scheme_rejected() {
        let result = HttpModeClient::new(RemoteConfig::new("example.com", session()));
        assert!(matches!(result, Err(RemoteError::InvalidUrl(_))));
    }

    #[test]
    fn test_trailing_slashes_removed() {
        let client = HttpModeClient::new(RemoteConfig::new("https://example.com///", session()))
            .unwrap();
        assert_eq!(client.url(), "https://example.com");
    }

    #[test]
    fn test_mode_urls() {
        let client =
            HttpModeClient::new(RemoteConfig::new("https://example.com/", session())).unwrap();
        assert_eq!(
            client.mode_url(SubIndex::Driving),
            "https://example.com/api/v1?session=abcdefghij&on=0"
        );
        assert_eq!(
            client.mode_url(SubIndex::Driven),
            "https://example.com/api/v1?session=abcdefghij&on=1"
        );
    }
}

// =============================================================================
// Publish Tests
// =============================================================================

mod publish {
    use super::*;

    #[tokio::test]
    async fn test_publish_sends_session_and_mode() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1"))
            .and(query_param("session", SESSION))
            .and(query_param("on", "1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        client_for(&mock_server)
            .publish(SubIndex::Driven)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_publish_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&mock_server)
            .await;

        match client_for(&mock_server).publish(SubIndex::Driving).await {
            Err(RemoteError::ServerError { status, .. }) => assert_eq!(status, 400),
            other => panic!("Expected ServerError, got {:?}", other),
        }
    }
}

// =============================================================================
// State Tests
// =============================================================================

mod state {
    use super::*;

    #[tokio::test]
    async fn test_fetch_state() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/state"))
            .and(query_param("session", SESSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "timestamp": 1_700_000_000,
                "mode": 1
            })))
            .mount(&mock_server)
            .await;

        let record = client_for(&mock_server).fetch_state().await.unwrap().unwrap();
        assert_eq!(record.timestamp, 1_700_000_000);
        assert_eq!(record.sub_index(), SubIndex::Driven);
    }

    #[tokio::test]
    async fn test_missing_state_is_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/state"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        assert_eq!(client_for(&mock_server).fetch_state().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_state_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/state"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not valid json"))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).fetch_state().await;
        assert!(matches!(result, Err(RemoteError::ParseError(_))));
    }
}

// =============================================================================
// Subscription Tests
// =============================================================================

mod subscription {
    use super::*;

    async fn next_mode(modes: &mut tokio::sync::mpsc::Receiver<SubIndex>) -> Option<SubIndex> {
        tokio::time::timeout(Duration::from_secs(5), modes.recv())
            .await
            .expect("no mode delivered in time")
    }

    #[tokio::test]
    async fn test_initial_snapshot_then_changes() {
        let mock_server = MockServer::start().await;

        // First poll finds nothing, every later poll finds mode 1
        Mock::given(method("GET"))
            .and(path("/api/v1/state"))
            .respond_with(ResponseTemplate::new(404))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/state"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "timestamp": 1,
                "mode": 1
            })))
            .mount(&mock_server)
            .await;

        let mut modes = client_for(&mock_server).subscribe().await.unwrap();
        assert_eq!(next_mode(&mut modes).await, Some(SubIndex::Driving));
        assert_eq!(next_mode(&mut modes).await, Some(SubIndex::Driven));
    }

    #[tokio::test]
    async fn test_unchanged_mode_is_not_repeated() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/state"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "timestamp": 1,
                "mode": 1
            })))
            .mount(&mock_server)
            .await;

        let mut modes = client_for(&mock_server).subscribe().await.unwrap();
        assert_eq!(next_mode(&mut modes).await, Some(SubIndex::Driven));

        let repeated = tokio::time::timeout(Duration::from_millis(200), modes.recv()).await;
        assert!(repeated.is_err(), "unchanged mode was delivered again");
    }

    #[tokio::test]
    async fn test_subscribe_fails_when_server_errors() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/state"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).subscribe().await;
        assert!(matches!(
            result,
            Err(RemoteError::ServerError { status: 500, .. })
        ));
    }
}
