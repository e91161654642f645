use claims::*;
use sdk::ArmError;
use sdk::client::ArmRequest;
use sdk::resources::ResourceGroupsClient;
use sdk::resources::resource_groups::ResourceGroup;
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::*;

fn group_body(name: &str) -> Value {
    json!({
        "id": format!("/subscriptions/{SUBSCRIPTION}/resourceGroups/{name}"),
        "name": name,
        "location": "westus2",
        "tags": {"sample": "true"},
        "properties": {"provisioningState": "Succeeded"}
    })
}

mod request_pipeline {
    use super::*;

    #[tokio::test]
    async fn test_bearer_token_and_request_id_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(group_path("sample-rg")))
            .and(query_param("api-version", "2021-04-01"))
            .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
            .and(header_exists("x-ms-client-request-id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(group_body("sample-rg")))
            .expect(1)
            .mount(&server)
            .await;

        let groups = ResourceGroupsClient::new(mock_client(&server), SUBSCRIPTION);
        let group = groups.get("sample-rg").await.unwrap();

        assert_eq!(group.name.as_deref(), Some("sample-rg"));
        assert_eq!(group.provisioning_state(), Some("Succeeded"));
        assert_eq!(group.tags.get("sample").map(String::as_str), Some("true"));
    }

    #[tokio::test]
    async fn test_create_sends_only_writable_fields() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(group_path("sample-rg")))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"location": "westus2", "tags": {"sample": "true"}})))
            .respond_with(ResponseTemplate::new(201).set_body_json(group_body("sample-rg")))
            .expect(1)
            .mount(&server)
            .await;

        let groups = ResourceGroupsClient::new(mock_client(&server), SUBSCRIPTION);
        let body = ResourceGroup::new("westus2").with_tags(sdk::model::tags([("sample", "true")]));
        let created = groups.create_or_update("sample-rg", &body).await.unwrap();
        assert_some!(created.id);
    }

    #[tokio::test]
    async fn test_custom_headers_are_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/custom"))
            .and(header("if-match", "*"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let request = ArmRequest::new("custom.delete", reqwest::Method::DELETE, format!("{}/custom", server.uri()))
            .header("If-Match", "*");
        assert_ok!(client.send(&request).await);
    }
}

mod retries {
    use super::*;

    #[tokio::test]
    async fn test_throttled_request_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(group_path("busy-rg")))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after-ms", "1")
                    .set_body_json(json!({"error": {"code": "TooManyRequests", "message": "slow down"}})),
            )
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(group_path("busy-rg")))
            .respond_with(ResponseTemplate::new(200).set_body_json(group_body("busy-rg")))
            .expect(1)
            .mount(&server)
            .await;

        let groups = ResourceGroupsClient::new(mock_client(&server), SUBSCRIPTION);
        let group = groups.get("busy-rg").await.unwrap();
        assert_eq!(group.name.as_deref(), Some("busy-rg"));
    }

    #[tokio::test]
    async fn test_retries_stop_after_the_limit() {
        let server = MockServer::start().await;
        // One attempt plus two retries
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let groups = ResourceGroupsClient::new(mock_client(&server), SUBSCRIPTION);
        let err = assert_err!(groups.get("down-rg").await);
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.code(), Some("ServerError"));
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "code": "LocationNotAvailableForResourceGroup",
                    "message": "The provided location 'mars' is not available for resource group."
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let groups = ResourceGroupsClient::new(mock_client(&server), SUBSCRIPTION);
        let err = assert_err!(
            groups
                .create_or_update("bad-rg", &ResourceGroup::new("mars"))
                .await
        );
        assert_matches!(err, ArmError::Api { status: 400, .. });
        assert_eq!(err.code(), Some("LocationNotAvailableForResourceGroup"));
        assert!(err.to_string().contains("mars"));
    }
}

mod error_mapping {
    use super::*;

    #[tokio::test]
    async fn test_not_found_carries_request_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404)
                    .insert_header("x-ms-request-id", "req-42")
                    .set_body_json(json!({
                        "error": {
                            "code": "ResourceGroupNotFound",
                            "message": "Resource group 'missing-rg' could not be found."
                        }
                    })),
            )
            .mount(&server)
            .await;

        let groups = ResourceGroupsClient::new(mock_client(&server), SUBSCRIPTION);
        let err = assert_err!(groups.get("missing-rg").await);
        assert!(err.is_not_found());
        match err {
            ArmError::Api {
                operation,
                code,
                request_id,
                ..
            } => {
                assert_eq!(operation, "resource_groups.get");
                assert_eq!(code, "ResourceGroupNotFound");
                assert_eq!(request_id.as_deref(), Some("req-42"));
            }
            other => panic!("Expected Api error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_head_maps_existence() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path(group_path("present-rg")))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path(group_path("absent-rg")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let groups = ResourceGroupsClient::new(mock_client(&server), SUBSCRIPTION);
        assert!(groups.check_existence("present-rg").await.unwrap());
        assert!(!groups.check_existence("absent-rg").await.unwrap());
    }

    #[tokio::test]
    async fn test_unexpected_body_is_a_deserialize_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
            .mount(&server)
            .await;

        let groups = ResourceGroupsClient::new(mock_client(&server), SUBSCRIPTION);
        assert_matches!(
            groups.get("sample-rg").await,
            Err(ArmError::Deserialize { .. })
        );
    }
}

mod credentials {
    use super::*;

    #[tokio::test]
    async fn test_token_is_requested_for_the_endpoint_scope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(group_body("a")))
            .mount(&server)
            .await;

        let credential = Arc::new(StaticTokenCredential::default());
        let client = Arc::new(
            sdk::ArmClient::with_options(credential.clone(), fast_options(&format!("{}/", server.uri())))
                .unwrap(),
        );
        assert_eq!(client.endpoint(), server.uri());
        assert_eq!(client.scope(), format!("{}/.default", server.uri()));

        let groups = ResourceGroupsClient::new(client, SUBSCRIPTION);
        groups.get("a").await.unwrap();
        groups.get("a").await.unwrap();
        assert_eq!(credential.calls(), 2);
    }
}
