//! Route handlers.
//!
//! Each handler decodes its body, opens a [`GraphClient`] with the supplied
//! credentials, runs one operation, and lets the client drop before the
//! response is written.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ike_core::{
    Credentials, Element, NewNode, NewRelationship, NodeData, RelationshipData, WireElement,
};
use ike_graph::{cypher, ExecutionSummary, GraphClient};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::routes::AppState;

// ── Request Bodies ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NodeQuery {
    pub creds: Credentials,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct RelationshipQuery {
    pub creds: Credentials,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub types: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct NodeCreate {
    pub creds: Credentials,
    pub node_data: NewNode,
}

#[derive(Debug, Deserialize)]
pub struct RelationshipCreate {
    pub creds: Credentials,
    pub relationship_data: NewRelationship,
}

// ── Responses ────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct WriteResponse {
    pub message: String,
    pub summary: ExecutionSummary,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

async fn connect(state: &AppState, creds: &Credentials) -> Result<GraphClient, ApiError> {
    Ok(GraphClient::connect(creds, &state.driver).await?)
}

// ── Handlers ─────────────────────────────────────────────────────

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Check that the credentials open a working session.
///
/// Every failure, including an undecodable body, answers with
/// `success: false` alongside the usual error fields.
pub async fn validate(
    State(state): State<AppState>,
    body: Result<ApiJson<Credentials>, ApiError>,
) -> Response {
    let result = match body {
        Ok(ApiJson(creds)) => check_connection(&state, &creds).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(resp) => Json(resp).into_response(),
        Err(err) => err.into_failed_response(),
    }
}

async fn check_connection(
    state: &AppState,
    creds: &Credentials,
) -> Result<ValidateResponse, ApiError> {
    let client = connect(state, creds).await?;
    client.ping().await?;

    info!(uri = %creds.uri, database = %creds.database, "Connection validated");
    Ok(ValidateResponse {
        success: true,
        message: "Connection successful".to_string(),
    })
}

pub async fn schema(
    State(state): State<AppState>,
    ApiJson(creds): ApiJson<Credentials>,
) -> Result<Json<Vec<WireElement>>, ApiError> {
    let client = connect(&state, &creds).await?;
    let elements = client.schema().await?;
    info!(count = elements.len(), "Schema visualised");
    Ok(Json(elements))
}

pub async fn node_labels(
    State(state): State<AppState>,
    ApiJson(creds): ApiJson<Credentials>,
) -> Result<Json<Vec<String>>, ApiError> {
    let client = connect(&state, &creds).await?;
    let labels = client.node_labels().await?;
    info!(?labels, "Node labels found");
    Ok(Json(labels))
}

pub async fn list_nodes(
    State(state): State<AppState>,
    ApiJson(query): ApiJson<NodeQuery>,
) -> Result<Json<Vec<Element<NodeData>>>, ApiError> {
    let labels = query.labels.as_deref().unwrap_or_default();
    let client = connect(&state, &query.creds).await?;
    let nodes = client.list_nodes(labels).await?;
    info!(count = nodes.len(), filter = ?labels, "Nodes listed");
    Ok(Json(nodes))
}

pub async fn create_node(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NodeCreate>,
) -> Result<Json<WriteResponse>, ApiError> {
    cypher::validate_identifier(&body.node_data.label)?;

    let client = connect(&state, &body.creds).await?;
    let summary = client.merge_node(&body.node_data).await?;
    Ok(Json(WriteResponse {
        message: "New node created".to_string(),
        summary,
    }))
}

pub async fn relationship_types(
    State(state): State<AppState>,
    ApiJson(creds): ApiJson<Credentials>,
) -> Result<Json<Vec<String>>, ApiError> {
    let client = connect(&state, &creds).await?;
    let types = client.relationship_types().await?;
    info!(?types, "Relationship types found");
    Ok(Json(types))
}

pub async fn list_relationships(
    State(state): State<AppState>,
    ApiJson(query): ApiJson<RelationshipQuery>,
) -> Result<Json<Vec<Element<RelationshipData>>>, ApiError> {
    let labels = query.labels.as_deref().unwrap_or_default();
    let types = query.types.as_deref().unwrap_or_default();
    let client = connect(&state, &query.creds).await?;
    let rels = client.list_relationships(labels, types).await?;
    info!(count = rels.len(), ?labels, ?types, "Relationships listed");
    Ok(Json(rels))
}

pub async fn create_relationship(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RelationshipCreate>,
) -> Result<Json<WriteResponse>, ApiError> {
    cypher::validate_identifier(&body.relationship_data.rel_type)?;

    let client = connect(&state, &body.creds).await?;
    let summary = client.merge_relationship(&body.relationship_data).await?;
    Ok(Json(WriteResponse {
        message: "New relationship created".to_string(),
        summary,
    }))
}
