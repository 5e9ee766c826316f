//! Write operations for the graph.
//!
//! Both writes use MERGE (upsert) semantics, so repeating a request leaves
//! the graph unchanged. Nodes are identified by their `id` property.

use std::time::Instant;

use chrono::{DateTime, Utc};
use ike_core::{NewNode, NewRelationship};
use neo4rs::Row;
use serde::Serialize;

use crate::client::{GraphClient, GraphError};
use crate::cypher::{self, Statement};

/// What a write did, echoed back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionSummary {
    pub query: String,
    pub parameters: serde_json::Value,
    pub database: String,
    /// Rows returned by the statement.
    pub records: usize,
    pub elapsed_ms: u64,
    pub executed_at: DateTime<Utc>,
    /// Element id of the merged node or relationship.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    /// Labels of the merged node; empty for relationships.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

impl GraphClient {
    /// Upsert a node by label and `id`.
    pub async fn merge_node(&self, node: &NewNode) -> Result<ExecutionSummary, GraphError> {
        let stmt = cypher::merge_node(node)?;
        let (mut summary, rows) = self.write(&stmt).await?;
        if let Some(row) = rows.first() {
            let (element_id, labels) = merged_identity(row, "element_id", Some("labels"))
                .map_err(|(column, e)| self.decode_failed(&stmt, column, e))?;
            summary.element_id = Some(element_id);
            summary.labels = labels;
        }

        tracing::info!(
            label = %node.label,
            id = %node.id,
            element_id = ?summary.element_id,
            elapsed_ms = summary.elapsed_ms,
            "Merged node"
        );
        Ok(summary)
    }

    /// Upsert a directed relationship between two existing nodes.
    ///
    /// Fails with [`GraphError::EndpointsNotFound`] when no node pair matches.
    pub async fn merge_relationship(
        &self,
        rel: &NewRelationship,
    ) -> Result<ExecutionSummary, GraphError> {
        let stmt = cypher::merge_relationship(rel)?;
        let (mut summary, rows) = self.write(&stmt).await?;

        let Some(row) = rows.first() else {
            tracing::warn!(
                source_id = %rel.source_id,
                target_id = %rel.target_id,
                rel_type = %rel.rel_type,
                "Relationship endpoints not found"
            );
            return Err(GraphError::EndpointsNotFound {
                source_id: rel.source_id.clone(),
                target_id: rel.target_id.clone(),
            });
        };
        let (element_id, _) = merged_identity(row, "id", None)
            .map_err(|(column, e)| self.decode_failed(&stmt, column, e))?;
        summary.element_id = Some(element_id);

        tracing::info!(
            source_id = %rel.source_id,
            target_id = %rel.target_id,
            rel_type = %rel.rel_type,
            records = summary.records,
            "Merged relationship"
        );
        Ok(summary)
    }

    async fn write(&self, stmt: &Statement) -> Result<(ExecutionSummary, Vec<Row>), GraphError> {
        let executed_at = Utc::now();
        let started = Instant::now();
        let rows = self.query_rows(stmt).await?;

        let summary = ExecutionSummary {
            query: stmt.text().to_string(),
            parameters: stmt.params_json(),
            database: self.database().to_string(),
            records: rows.len(),
            elapsed_ms: started.elapsed().as_millis() as u64,
            executed_at,
            element_id: None,
            labels: Vec::new(),
        };
        Ok((summary, rows))
    }
}

/// Element id and labels from the first row of a merge.
fn merged_identity<'a>(
    row: &Row,
    id_column: &'a str,
    labels_column: Option<&'a str>,
) -> Result<(String, Vec<String>), (&'a str, String)> {
    let element_id: String = row.get(id_column).map_err(|e| (id_column, e.to_string()))?;
    let labels = match labels_column {
        Some(column) => row
            .get::<Vec<String>>(column)
            .map_err(|e| (column, e.to_string()))?,
        None => Vec::new(),
    };
    Ok((element_id, labels))
}
