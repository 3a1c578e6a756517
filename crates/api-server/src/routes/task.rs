//! Task API endpoints
//!
//! RESTful API for task CRUD operations. Bodies are JSON, camelCase;
//! validation and not-found failures come back as `{"message": ...}`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use taskdeck_core::task::{NewTask, Task, TaskPatch};
use taskdeck_core::Error;

use super::{error_response, rejection_response, MessageResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub message: String,
    pub id: String,
}

/// GET /api/tasks - List all tasks, newest first
async fn list_tasks(
    State(state): State<AppState>,
) -> Result<Json<Vec<Task>>, (StatusCode, Json<MessageResponse>)> {
    let tasks = state.task_store().list().await.map_err(error_response)?;
    Ok(Json(tasks))
}

/// POST /api/tasks - Create a new task
async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<NewTask>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), (StatusCode, Json<MessageResponse>)> {
    let Json(draft) = body.map_err(rejection_response)?;
    let created = state
        .task_store()
        .create(draft)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/tasks/{id} - Get a single task
async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, (StatusCode, Json<MessageResponse>)> {
    match state.task_store().get(&id).await.map_err(error_response)? {
        Some(task) => Ok(Json(task)),
        None => Err(error_response(Error::TaskNotFound(id))),
    }
}

/// PUT /api/tasks/{id} - Apply a partial update
async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<TaskPatch>, JsonRejection>,
) -> Result<Json<Task>, (StatusCode, Json<MessageResponse>)> {
    let Json(patch) = body.map_err(rejection_response)?;
    let updated = state
        .task_store()
        .update(&id, patch)
        .await
        .map_err(error_response)?;
    Ok(Json(updated))
}

/// DELETE /api/tasks/{id} - Delete a task
async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, (StatusCode, Json<MessageResponse>)> {
    if state.task_store().delete(&id).await.map_err(error_response)? {
        Ok(Json(DeleteResponse {
            message: "Task deleted".to_string(),
            id,
        }))
    } else {
        Err(error_response(Error::TaskNotFound(id)))
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes;
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use taskdeck_core::cache::QueryKey;
    use taskdeck_core::client::TaskClient;
    use taskdeck_core::task::{MemoryTaskStore, TaskStatus};
    use taskdeck_core::transport::HttpTransport;
    use tower::ServiceExt;

    fn app() -> Router {
        let state = AppState::with_store(Arc::new(MemoryTaskStore::new()));
        Router::new()
            .merge(routes::health::router())
            .merge(router())
            .fallback(routes::not_found)
            .with_state(state)
    }

    fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        match body {
            Some(value) => builder.body(Body::from(value.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(request("GET", "/api/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert!(body["version"].is_string());
    }

    #[tokio::test]
    async fn test_create_task_wire_shape() {
        let response = app()
            .oneshot(request(
                "POST",
                "/api/tasks",
                Some(json!({"title": "  Buy milk  ", "priority": 3})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["title"], "Buy milk");
        assert_eq!(body["description"], "");
        assert_eq!(body["status"], "todo");
        assert_eq!(body["priority"], 3);
        // camelCase timestamps in whole seconds
        assert!(body["createdAt"].is_i64());
        assert_eq!(body["createdAt"], body["updatedAt"]);
        assert!(body.get("dueDate").is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let response = app()
            .oneshot(request("POST", "/api/tasks", Some(json!({"title": "   "}))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Title cannot be empty");
    }

    #[tokio::test]
    async fn test_unknown_status_keeps_error_contract() {
        let response = app()
            .oneshot(request(
                "POST",
                "/api/tasks",
                Some(json!({"title": "x", "status": "bogus"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["message"].as_str().unwrap().contains("bogus"));
    }

    #[tokio::test]
    async fn test_malformed_body_keeps_error_contract() {
        // Not even JSON
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/tasks")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["message"].is_string());

        // Out-of-type priority on update
        let app = app();
        let created = body_json(
            app.clone()
                .oneshot(request("POST", "/api/tasks", Some(json!({"title": "Task"}))))
                .await
                .unwrap(),
        )
        .await;
        let id = created["id"].as_str().unwrap();
        let response = app
            .oneshot(request(
                "PUT",
                &format!("/api/tasks/{id}"),
                Some(json!({"priority": 300})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let app = app();
        for title in ["First", "Second"] {
            let response = app
                .clone()
                .oneshot(request("POST", "/api/tasks", Some(json!({"title": title}))))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app
            .oneshot(request("GET", "/api/tasks", None))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body[0]["title"], "Second");
        assert_eq!(body[1]["title"], "First");
    }

    #[tokio::test]
    async fn test_get_unknown_task() {
        let response = app()
            .oneshot(request("GET", "/api/tasks/nope", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Task not found: nope");
    }

    #[tokio::test]
    async fn test_update_null_clears_priority() {
        let app = app();
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/tasks",
                Some(json!({"title": "Task", "priority": 5})),
            ))
            .await
            .unwrap();
        let created = body_json(response).await;
        let id = created["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(request(
                "PUT",
                &format!("/api/tasks/{id}"),
                Some(json!({"priority": null, "status": "done"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "done");
        // Cleared means absent, not null
        assert!(body.get("priority").is_none());
    }

    #[tokio::test]
    async fn test_update_with_no_fields_is_a_noop() {
        let app = app();
        let response = app
            .clone()
            .oneshot(request("POST", "/api/tasks", Some(json!({"title": "Task"}))))
            .await
            .unwrap();
        let created = body_json(response).await;
        let id = created["id"].as_str().unwrap();

        let response = app
            .oneshot(request("PUT", &format!("/api/tasks/{id}"), Some(json!({}))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["updatedAt"], created["updatedAt"]);
    }

    #[tokio::test]
    async fn test_delete_task() {
        let app = app();
        let response = app
            .clone()
            .oneshot(request("POST", "/api/tasks", Some(json!({"title": "Doomed"}))))
            .await
            .unwrap();
        let created = body_json(response).await;
        let id = created["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(request("DELETE", &format!("/api/tasks/{id}"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["id"], id.as_str());

        let response = app
            .oneshot(request("DELETE", &format!("/api/tasks/{id}"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = app()
            .oneshot(request("GET", "/api/nope", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Route not found");
    }

    #[tokio::test]
    async fn test_optimistic_client_against_served_instance() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app()).await.unwrap();
        });

        let transport = Arc::new(HttpTransport::new(format!("http://{addr}")));
        let client = TaskClient::new(transport);

        assert!(client.tasks().await.unwrap().is_empty());

        let created = client
            .create(NewTask::new("Ship it").with_priority(2))
            .await
            .unwrap();
        assert_eq!(client.tasks().await.unwrap(), vec![created.clone()]);

        let updated = client
            .update(
                &created.id,
                TaskPatch::default()
                    .clear_priority()
                    .with_status(TaskStatus::Done),
            )
            .await
            .unwrap();
        assert!(updated.priority.is_none());
        assert_eq!(updated.status, TaskStatus::Done);
        assert_eq!(client.task(&created.id).await.unwrap(), updated);

        // A failed mutation reverts the cached list
        let before = client.tasks().await.unwrap();
        let err = client
            .update("missing", TaskPatch::default().with_title("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TaskNotFound(_)));
        let cached = client
            .cache()
            .read(&QueryKey::TaskList)
            .unwrap();
        assert_eq!(cached.as_list().unwrap(), &before[..]);

        client.delete(&created.id).await.unwrap();
        assert!(client.refresh_tasks().await.unwrap().is_empty());
    }
}
