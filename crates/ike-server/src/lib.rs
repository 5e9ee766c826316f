//! ike-server: REST façade over caller-chosen Neo4j databases.
//!
//! Every route takes the database credentials in its body, runs one
//! statement through a request-scoped [`ike_graph::GraphClient`], and
//! answers with `{data: {...}}` elements ready for a graph view.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;

pub use config::ServerConfig;
pub use error::ApiError;
pub use routes::{create_router, AppState};
