//! HTTP transport: discovery and invocation endpoints over the registry.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::tools::{OperationDescriptor, ToolRegistry};

/// Body accepted by the invocation endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct InvokeRequest {
    #[serde(default)]
    pub parameters: serde_json::Value,
}

#[derive(Serialize)]
struct ToolList {
    tools: Vec<OperationDescriptor>,
}

/// Build the application router around an operation registry.
pub fn build_router(registry: Arc<ToolRegistry>) -> Router {
    Router::new()
        .route("/tools", post(list_tools))
        .route("/tools/:operation_id", post(invoke_tool))
        .layer(TraceLayer::new_for_http())
        .with_state(registry)
}

/// Discovery: the static descriptor list. No side effects.
async fn list_tools(State(registry): State<Arc<ToolRegistry>>) -> Json<ToolList> {
    Json(ToolList {
        tools: registry.descriptors().await,
    })
}

/// Invocation. An unknown operation id answers 400 whatever the payload;
/// a missing or unparseable body counts as empty parameters. Past the
/// lookup everything answers 200: the envelope, not the transport
/// status, signals invoke failures.
async fn invoke_tool(
    State(registry): State<Arc<ToolRegistry>>,
    Path(operation_id): Path<String>,
    body: Option<Json<InvokeRequest>>,
) -> Response {
    let parameters = body.map(|Json(b)| b.parameters).unwrap_or_default();

    match registry.invoke(&operation_id, &parameters).await {
        Some(result) => (StatusCode::OK, Json(json!({ "result": result }))).into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "unknown operation" })),
        )
            .into_response(),
    }
}
