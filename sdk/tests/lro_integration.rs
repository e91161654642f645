use claims::*;
use sdk::{ArmError, NoContent, OperationStatus, Poller};
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::*;

fn resource_url(server: &MockServer) -> String {
    format!("{}/things/one?api-version=2024-01-01", server.uri())
}

mod async_operation_header {
    use super::*;

    #[tokio::test]
    async fn test_put_polls_operation_then_reads_resource() {
        let server = MockServer::start().await;
        let status_url = format!("{}/operations/op-1", server.uri());

        Mock::given(method("PUT"))
            .and(path("/things/one"))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("Azure-AsyncOperation", status_url.as_str())
                    .set_body_json(json!({"name": "one", "properties": {"provisioningState": "Creating"}})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/operations/op-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "InProgress"})))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/operations/op-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Succeeded"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/things/one"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "one",
                "properties": {"provisioningState": "Succeeded"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let mut poller: Poller<Value> = client
            .begin_put("things.create", &resource_url(&server), &json!({"location": "westus2"}))
            .await
            .unwrap();
        assert_eq!(poller.status(), OperationStatus::InProgress);
        assert!(!poller.done());

        assert_eq!(poller.poll().await.unwrap(), OperationStatus::InProgress);
        let resource = poller.poll_until_done().await.unwrap();
        assert_eq!(resource["properties"]["provisioningState"], "Succeeded");
        assert_eq!(poller.status(), OperationStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_failed_operation_surfaces_service_error() {
        let server = MockServer::start().await;
        let status_url = format!("{}/operations/op-2", server.uri());

        Mock::given(method("PUT"))
            .respond_with(
                ResponseTemplate::new(201).insert_header("Azure-AsyncOperation", status_url.as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/operations/op-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "Failed",
                "error": {"code": "QuotaExceeded", "message": "Operation could not be completed as it results in exceeding approved quota."}
            })))
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let mut poller: Poller<Value> = client
            .begin_put("things.create", &resource_url(&server), &json!({}))
            .await
            .unwrap();

        let err = assert_err!(poller.poll_until_done().await);
        match err {
            ArmError::OperationFailed {
                operation,
                status,
                code,
                ..
            } => {
                assert_eq!(operation, "things.create");
                assert_eq!(status, "Failed");
                assert_eq!(code, "QuotaExceeded");
            }
            other => panic!("Expected OperationFailed, got: {other:?}"),
        }
        assert!(poller.done());
        assert_err!(poller.result().await);
    }
}

mod location_header {
    use super::*;

    #[tokio::test]
    async fn test_delete_polls_location_until_no_content() {
        let server = MockServer::start().await;
        let monitor = format!("{}/monitor/del-1", server.uri());

        Mock::given(method("DELETE"))
            .and(path(group_path("doomed-rg")))
            .respond_with(
                ResponseTemplate::new(202)
                    .insert_header("Location", monitor.as_str())
                    .insert_header("Retry-After", "0"),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/monitor/del-1"))
            .respond_with(ResponseTemplate::new(202).insert_header("Location", monitor.as_str()))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/monitor/del-1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let groups = sdk::resources::ResourceGroupsClient::new(mock_client(&server), SUBSCRIPTION);
        let mut poller = groups.begin_delete("doomed-rg").await.unwrap();
        let result = poller.poll_until_done().await.unwrap();
        assert_eq!(result, NoContent);
        assert_eq!(poller.status(), OperationStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_post_result_comes_from_final_response() {
        let server = MockServer::start().await;
        let monitor = format!("{}/monitor/post-1", server.uri());

        Mock::given(method("POST"))
            .and(path("/things/one/action"))
            .respond_with(ResponseTemplate::new(202).insert_header("Location", monitor.as_str()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/monitor/post-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"outcome": "done"})))
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let url = format!("{}/things/one/action", server.uri());
        let mut poller: Poller<Value> = client
            .begin_post("things.action", &url, &json!({}))
            .await
            .unwrap();
        let result = poller.poll_until_done_every(Duration::from_millis(1)).await.unwrap();
        assert_eq!(result, json!({"outcome": "done"}));
    }
}

mod provisioning_state {
    use super::*;

    #[tokio::test]
    async fn test_body_polling_until_terminal_state() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "name": "one",
                "properties": {"provisioningState": "Accepted"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/things/one"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "one",
                "properties": {"provisioningState": "Updating"}
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/things/one"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "one",
                "properties": {"provisioningState": "Succeeded", "endpoint": "https://one"}
            })))
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let mut poller: Poller<Value> = client
            .begin_put("things.create", &resource_url(&server), &json!({}))
            .await
            .unwrap();
        let resource = poller.poll_until_done().await.unwrap();
        assert_eq!(resource["properties"]["endpoint"], "https://one");
    }

    #[tokio::test]
    async fn test_synchronous_completion_needs_no_polling() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "one",
                "properties": {"provisioningState": "Succeeded"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let mut poller: Poller<Value> = client
            .begin_put("things.create", &resource_url(&server), &json!({}))
            .await
            .unwrap();
        assert!(poller.done());
        let resource = poller.poll_until_done().await.unwrap();
        assert_eq!(resource["name"], "one");
    }

    #[tokio::test]
    async fn test_result_before_completion_is_invalid_state() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "properties": {"provisioningState": "Creating"}
            })))
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let poller: Poller<Value> = client
            .begin_put("things.create", &resource_url(&server), &json!({}))
            .await
            .unwrap();
        assert_matches!(poller.result().await, Err(ArmError::InvalidState(_)));
    }
}

mod resume {
    use super::*;

    #[tokio::test]
    async fn test_resume_token_continues_in_new_poller() {
        let server = MockServer::start().await;
        let status_url = format!("{}/operations/op-3", server.uri());

        Mock::given(method("PUT"))
            .respond_with(
                ResponseTemplate::new(201).insert_header("Azure-AsyncOperation", status_url.as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/operations/op-3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Succeeded"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/things/one"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "one"})))
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let first: Poller<Value> = client
            .begin_put("things.create", &resource_url(&server), &json!({}))
            .await
            .unwrap();
        let token = first.resume_token().unwrap();
        drop(first);

        let mut resumed: Poller<Value> = Poller::resume(client, &token).unwrap();
        assert_eq!(resumed.operation(), "things.create");
        assert_eq!(resumed.status(), OperationStatus::InProgress);

        let resource = resumed.poll_until_done().await.unwrap();
        assert_eq!(resource["name"], "one");
    }

    #[tokio::test]
    async fn test_garbage_token_is_rejected() {
        let server = MockServer::start().await;
        let client = mock_client(&server);
        assert_matches!(
            Poller::<Value>::resume(client, "not a token"),
            Err(ArmError::InvalidState(_))
        );
    }
}
