//! Per-request Neo4j connection and statement execution.

use ike_core::Credentials;
use neo4rs::{ConfigBuilder, Graph};
use serde::Deserialize;

use crate::cypher::Statement;

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Invalid connection settings: {0}")]
    InvalidConfig(String),

    #[error("Neo4j authentication failed: {0}")]
    Authentication(String),

    #[error("Neo4j unavailable: {0}")]
    Unavailable(String),

    #[error("Neo4j query error: {0}")]
    Query(#[source] neo4rs::Error),

    #[error("Invalid identifier {name:?}: {reason}")]
    InvalidIdentifier { name: String, reason: &'static str },

    #[error("No nodes with id {source_id:?} and {target_id:?}")]
    EndpointsNotFound { source_id: String, target_id: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// How a driver error should be reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DriverFailure {
    Config,
    Authentication,
    Unavailable,
    Other,
}

fn classify(err: &neo4rs::Error) -> DriverFailure {
    use neo4rs::Error as E;

    match err {
        E::AuthenticationError(_) => DriverFailure::Authentication,
        E::IOError { .. } | E::ConnectionError | E::InvalidDnsName(_) => {
            DriverFailure::Unavailable
        }
        E::UrlParseError(_) | E::UnsupportedScheme(_) | E::InvalidConfig => DriverFailure::Config,
        other => {
            // Security failures reported after HELLO arrive as server messages.
            let message = other.to_string();
            if message.contains("Neo.ClientError.Security")
                || message.to_ascii_lowercase().contains("unauthorized")
            {
                DriverFailure::Authentication
            } else {
                DriverFailure::Other
            }
        }
    }
}

impl From<neo4rs::Error> for GraphError {
    fn from(err: neo4rs::Error) -> Self {
        match classify(&err) {
            DriverFailure::Config => Self::InvalidConfig(err.to_string()),
            DriverFailure::Authentication => Self::Authentication(err.to_string()),
            DriverFailure::Unavailable => Self::Unavailable(err.to_string()),
            DriverFailure::Other => Self::Query(err),
        }
    }
}

/// Driver tuning applied to every per-request connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DriverSettings {
    /// Upper bound on connections opened for a single request.
    pub max_connections: usize,
    /// Rows pulled per round trip.
    pub fetch_size: usize,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            max_connections: 1,
            fetch_size: 200,
        }
    }
}

/// Neo4j handle scoped to one request.
///
/// Built from the caller's credentials; connections close when it is dropped.
pub struct GraphClient {
    graph: Graph,
    database: String,
}

impl GraphClient {
    /// Connect to the database named in `creds`.
    pub async fn connect(
        creds: &Credentials,
        settings: &DriverSettings,
    ) -> Result<Self, GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&creds.uri)
            .user(&creds.user)
            .password(&creds.password)
            .db(creds.database.as_str())
            .max_connections(settings.max_connections)
            .fetch_size(settings.fetch_size)
            .build()?;

        let graph = Graph::connect(neo_config).await.map_err(|e| {
            let err = GraphError::from(e);
            tracing::warn!(
                uri = %creds.uri,
                database = %creds.database,
                error = %err,
                "Failed to connect to Neo4j"
            );
            err
        })?;

        tracing::debug!(uri = %creds.uri, database = %creds.database, "Connected to Neo4j");
        Ok(Self {
            graph,
            database: creds.database.clone(),
        })
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Execute a statement, discarding any rows.
    pub async fn run(&self, stmt: &Statement) -> Result<(), GraphError> {
        self.graph
            .run(stmt.to_query())
            .await
            .map_err(|e| self.failed(stmt, e.into()))
    }

    /// Execute a statement and collect all rows.
    pub async fn query_rows(&self, stmt: &Statement) -> Result<Vec<neo4rs::Row>, GraphError> {
        let mut stream = self
            .graph
            .execute(stmt.to_query())
            .await
            .map_err(|e| self.failed(stmt, e.into()))?;

        let mut rows = Vec::new();
        while let Some(row) = stream
            .next()
            .await
            .map_err(|e| self.failed(stmt, e.into()))?
        {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Execute a statement and return the first row, if any.
    pub async fn query_one(&self, stmt: &Statement) -> Result<Option<neo4rs::Row>, GraphError> {
        let mut stream = self
            .graph
            .execute(stmt.to_query())
            .await
            .map_err(|e| self.failed(stmt, e.into()))?;
        stream
            .next()
            .await
            .map_err(|e| self.failed(stmt, e.into()))
    }

    /// Log a failed statement with its parameters and hand the error back.
    pub(crate) fn failed(&self, stmt: &Statement, err: GraphError) -> GraphError {
        tracing::error!(
            database = %self.database,
            statement = %stmt.text(),
            params = %stmt.params_json(),
            error = %err,
            "Problem running query"
        );
        err
    }
}
