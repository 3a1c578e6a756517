//! HTTP transport over the REST wire protocol

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::TaskTransport;
use crate::task::{NewTask, Task, TaskPatch};
use crate::{Error, Result};

/// REST client for the task service
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl HttpTransport {
    /// Create a transport against a base URL such as
    /// `http://localhost:5000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn tasks_url(&self) -> String {
        format!("{}/api/tasks", self.base_url)
    }

    fn task_url(&self, id: &str) -> String {
        // Identifiers are opaque strings; encode them for the path
        format!("{}/api/tasks/{}", self.base_url, urlencoding::encode(id))
    }

    /// Map a non-2xx response to an error, decoding the server's
    /// `{"message": ...}` body when it has one.
    async fn fail(response: Response, id: Option<&str>) -> Error {
        let status = response.status();
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message);
        debug!(%status, ?message, "request rejected");
        match (status, id) {
            (StatusCode::NOT_FOUND, Some(id)) => Error::TaskNotFound(id.to_string()),
            _ => Error::transport(message),
        }
    }

    fn send_error(err: reqwest::Error) -> Error {
        Error::transport(err.to_string())
    }
}

#[async_trait]
impl TaskTransport for HttpTransport {
    async fn list(&self) -> Result<Vec<Task>> {
        let response = self
            .client
            .get(self.tasks_url())
            .send()
            .await
            .map_err(Self::send_error)?;
        if !response.status().is_success() {
            return Err(Self::fail(response, None).await);
        }
        Ok(response.json().await.map_err(Self::send_error)?)
    }

    async fn get(&self, id: &str) -> Result<Task> {
        let response = self
            .client
            .get(self.task_url(id))
            .send()
            .await
            .map_err(Self::send_error)?;
        if !response.status().is_success() {
            return Err(Self::fail(response, Some(id)).await);
        }
        Ok(response.json().await.map_err(Self::send_error)?)
    }

    async fn create(&self, draft: &NewTask) -> Result<Task> {
        let response = self
            .client
            .post(self.tasks_url())
            .json(draft)
            .send()
            .await
            .map_err(Self::send_error)?;
        if !response.status().is_success() {
            return Err(Self::fail(response, None).await);
        }
        Ok(response.json().await.map_err(Self::send_error)?)
    }

    async fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task> {
        let response = self
            .client
            .put(self.task_url(id))
            .json(patch)
            .send()
            .await
            .map_err(Self::send_error)?;
        if !response.status().is_success() {
            return Err(Self::fail(response, Some(id)).await);
        }
        Ok(response.json().await.map_err(Self::send_error)?)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.task_url(id))
            .send()
            .await
            .map_err(Self::send_error)?;
        if !response.status().is_success() {
            return Err(Self::fail(response, Some(id)).await);
        }
        Ok(())
    }
}
