//! API route definitions

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use ike_graph::DriverSettings;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{CorsConfig, ServerConfig};
use crate::handlers;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub driver: DriverSettings,
}

/// Create the API router
pub fn create_router(config: &ServerConfig) -> Router {
    let state = AppState {
        driver: config.neo4j.clone(),
    };

    Router::new()
        .route("/health", get(handlers::health))
        .route("/validate", post(handlers::validate))
        .route("/schema/", post(handlers::schema))
        // Nodes
        .route("/nodes/labels/", post(handlers::node_labels))
        .route("/nodes/", post(handlers::list_nodes))
        .route("/nodes/new", post(handlers::create_node))
        // Relationships
        .route("/relationships/types/", post(handlers::relationship_types))
        .route("/relationships/", post(handlers::list_relationships))
        .route("/relationships/new/", post(handlers::create_relationship))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(&config.cors))
        .with_state(state)
}

/// Builds the CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    if config.allowed_origins.iter().any(|o| o == "*") {
        // Browsers refuse credentialed responses for a wildcard origin.
        if config.allow_credentials {
            tracing::warn!("CORS allows any origin; credentialed requests are disabled");
        }
        return cors.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(origins)
        .allow_credentials(config.allow_credentials)
}
