//! Long-running operation polling.
//!
//! ARM answers slow writes with `201`/`202` and one of three ways to follow
//! progress: an `Azure-AsyncOperation` status URL, a `Location` URL, or a
//! `properties.provisioningState` on the resource itself. [`Poller`] picks
//! the strategy from the initial response and drives it to a terminal state.

use crate::client::{ArmClient, ArmRequest, read_json};
use crate::common::errors::header_value;
use crate::common::retry::parse_retry_after;
use crate::common::{ArmError, ArmResult, ErrorDetail};
use reqwest::Method;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// Status of a long-running operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationStatus {
    InProgress,
    Succeeded,
    Failed,
    Canceled,
}

impl OperationStatus {
    /// Case-insensitive; anything that is not terminal counts as in progress
    /// (`Creating`, `Updating`, `Accepted`, ...).
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "succeeded" => OperationStatus::Succeeded,
            "failed" => OperationStatus::Failed,
            "canceled" | "cancelled" => OperationStatus::Canceled,
            _ => OperationStatus::InProgress,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OperationStatus::InProgress)
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationStatus::InProgress => "InProgress",
            OperationStatus::Succeeded => "Succeeded",
            OperationStatus::Failed => "Failed",
            OperationStatus::Canceled => "Canceled",
        };
        f.write_str(name)
    }
}

/// Result type of operations that produce no resource (deletes, purges).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoContent;

impl<'de> Deserialize<'de> for NoContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IgnoredAny::deserialize(deserializer)?;
        Ok(NoContent)
    }
}

/// HTTP verb of the operation's initial request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LroMethod {
    Put,
    Patch,
    Post,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum PollingStrategy {
    AsyncOperation { url: String },
    Location { url: String },
    Body,
    Done,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PollerState {
    operation: String,
    method: LroMethod,
    resource_url: String,
    strategy: PollingStrategy,
    status: OperationStatus,
    #[serde(default)]
    final_location: Option<String>,
    #[serde(default)]
    final_body: Option<Value>,
    #[serde(default)]
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct AsyncOperationBody {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error: Option<ErrorDetail>,
}

fn provisioning_state(body: &Value) -> Option<&str> {
    body.pointer("/properties/provisioningState")
        .and_then(Value::as_str)
}

fn select_strategy(
    async_operation: Option<String>,
    location: Option<String>,
    body: &Value,
) -> (PollingStrategy, OperationStatus) {
    if let Some(url) = async_operation {
        return (
            PollingStrategy::AsyncOperation { url },
            OperationStatus::InProgress,
        );
    }
    if let Some(url) = location {
        return (PollingStrategy::Location { url }, OperationStatus::InProgress);
    }
    match provisioning_state(body).map(OperationStatus::parse) {
        Some(status) if !status.is_terminal() => (PollingStrategy::Body, status),
        Some(status) => (PollingStrategy::Done, status),
        None => (PollingStrategy::Done, OperationStatus::Succeeded),
    }
}

/// Tracks a long-running operation started by one of the `begin_*` calls.
///
/// ```no_run
/// # async fn run(groups: sdk::resources::ResourceGroupsClient) -> sdk::ArmResult<()> {
/// let mut poller = groups.begin_delete("sample-rg").await?;
/// poller.poll_until_done().await?;
/// # Ok(())
/// # }
/// ```
pub struct Poller<T> {
    client: Arc<ArmClient>,
    state: PollerState,
    retry_after: Option<Duration>,
    _result: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for Poller<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Poller")
            .field("state", &self.state)
            .field("retry_after", &self.retry_after)
            .finish_non_exhaustive()
    }
}

impl<T: DeserializeOwned> Poller<T> {
    pub(crate) async fn from_response(
        client: Arc<ArmClient>,
        operation: String,
        method: LroMethod,
        resource_url: String,
        response: reqwest::Response,
    ) -> ArmResult<Self> {
        let headers = response.headers().clone();
        let retry_after = parse_retry_after(&headers);
        let async_operation = header_value(&headers, "azure-asyncoperation");
        let location = header_value(&headers, "location");
        let body: Value = read_json(&operation, response).await?;

        let (strategy, status) = select_strategy(async_operation, location.clone(), &body);
        let final_location = match strategy {
            PollingStrategy::AsyncOperation { .. } => location,
            _ => None,
        };
        let final_body = match strategy {
            PollingStrategy::Body | PollingStrategy::Done if !body.is_null() => Some(body),
            _ => None,
        };

        log::debug!("{operation} started: {strategy:?}, status {status}");

        Ok(Self {
            client,
            state: PollerState {
                operation,
                method,
                resource_url,
                strategy,
                status,
                final_location,
                final_body,
                error: None,
            },
            retry_after,
            _result: PhantomData,
        })
    }

    /// Recreates a poller from [`Poller::resume_token`].
    pub fn resume(client: Arc<ArmClient>, token: &str) -> ArmResult<Self> {
        let state: PollerState = serde_json::from_str(token)
            .map_err(|e| ArmError::InvalidState(format!("Invalid resume token: {e}")))?;
        Ok(Self {
            client,
            state,
            retry_after: None,
            _result: PhantomData,
        })
    }

    /// Serialized polling state; pass to [`Poller::resume`] to continue later.
    pub fn resume_token(&self) -> ArmResult<String> {
        serde_json::to_string(&self.state).map_err(|e| ArmError::deserialize(&self.state.operation, e))
    }

    pub fn status(&self) -> OperationStatus {
        self.state.status
    }

    pub fn done(&self) -> bool {
        self.state.status.is_terminal()
    }

    pub fn operation(&self) -> &str {
        &self.state.operation
    }

    /// Performs one status request.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::OperationFailed`] once the operation reports
    /// `Failed` or `Canceled`.
    pub async fn poll(&mut self) -> ArmResult<OperationStatus> {
        if self.done() {
            return self.terminal_status();
        }

        let operation = self.state.operation.clone();
        match self.state.strategy.clone() {
            PollingStrategy::AsyncOperation { url } => {
                let response = self
                    .client
                    .send(&ArmRequest::new(&operation, Method::GET, url))
                    .await?;
                self.retry_after = parse_retry_after(response.headers());
                let body: AsyncOperationBody = read_json(&operation, response).await?;
                self.state.status = OperationStatus::parse(&body.status);
                self.state.error = body.error;
            }
            PollingStrategy::Location { url } => {
                let response = self
                    .client
                    .send(&ArmRequest::new(&operation, Method::GET, url))
                    .await?;
                self.retry_after = parse_retry_after(response.headers());
                if response.status().as_u16() == 202 {
                    self.state.status = OperationStatus::InProgress;
                } else {
                    let body: Value = read_json(&operation, response).await?;
                    if !body.is_null() {
                        self.state.final_body = Some(body);
                    }
                    self.state.status = OperationStatus::Succeeded;
                }
            }
            PollingStrategy::Body => {
                let request = ArmRequest::new(&operation, Method::GET, &self.state.resource_url);
                match self.client.send(&request).await {
                    Ok(response) => {
                        self.retry_after = parse_retry_after(response.headers());
                        let body: Value = read_json(&operation, response).await?;
                        self.state.status = provisioning_state(&body)
                            .map(OperationStatus::parse)
                            .unwrap_or(OperationStatus::Succeeded);
                        if self.state.status.is_terminal() {
                            self.state.final_body = Some(body);
                        }
                    }
                    Err(e) if e.is_not_found() && self.state.method == LroMethod::Delete => {
                        self.state.status = OperationStatus::Succeeded;
                    }
                    Err(e) => return Err(e),
                }
            }
            PollingStrategy::Done => {}
        }

        log::debug!("{operation}: {}", self.state.status);
        self.terminal_status()
    }

    /// Polls with the client's default frequency and returns the final result.
    pub async fn poll_until_done(&mut self) -> ArmResult<T> {
        let frequency = self.client.poll_frequency();
        self.poll_until_done_every(frequency).await
    }

    /// Sleeps `Retry-After` (or `frequency`) between polls.
    pub async fn poll_until_done_every(&mut self, frequency: Duration) -> ArmResult<T> {
        while !self.done() {
            let delay = self.retry_after.unwrap_or(frequency);
            tokio::time::sleep(delay).await;
            self.poll().await?;
        }
        self.result().await
    }

    /// The operation's final result.
    ///
    /// PUT and PATCH return the resource (re-read unless the last response
    /// already carried it), POST returns the final body or the `Location`
    /// resource, DELETE returns nothing.
    pub async fn result(&self) -> ArmResult<T> {
        if !self.done() {
            return Err(ArmError::InvalidState(format!(
                "{} has not finished yet",
                self.state.operation
            )));
        }
        self.terminal_status()?;

        let operation = &self.state.operation;
        let value = match self.state.method {
            LroMethod::Delete => Value::Null,
            LroMethod::Put | LroMethod::Patch => match (&self.state.strategy, &self.state.final_body) {
                (PollingStrategy::Body | PollingStrategy::Done, Some(body)) => body.clone(),
                _ => {
                    self.client
                        .get_json(operation, &self.state.resource_url)
                        .await?
                }
            },
            LroMethod::Post => match (&self.state.final_body, &self.state.final_location) {
                (Some(body), _) => body.clone(),
                (None, Some(location)) => self.client.get_json(operation, location).await?,
                (None, None) => Value::Null,
            },
        };

        serde_json::from_value(value).map_err(|e| ArmError::deserialize(operation, e))
    }

    fn terminal_status(&self) -> ArmResult<OperationStatus> {
        match self.state.status {
            status @ (OperationStatus::Failed | OperationStatus::Canceled) => {
                let detail = self.state.error.clone().unwrap_or_default();
                Err(ArmError::OperationFailed {
                    operation: self.state.operation.clone(),
                    status: status.to_string(),
                    code: if detail.code.is_empty() {
                        status.to_string()
                    } else {
                        detail.code
                    },
                    message: if detail.message.is_empty() {
                        "the service did not report a reason".to_string()
                    } else {
                        detail.message
                    },
                })
            }
            status => Ok(status),
        }
    }
}
