//! Cypher statements issued by the service.
//!
//! Filter values always travel as parameters. Labels and relationship types
//! that Cypher cannot take as parameters (`MERGE (n:Label)`) are quoted with
//! [`quote_identifier`].

use std::collections::BTreeMap;

use ike_core::{NewNode, NewRelationship};
use serde::Serialize;

use crate::client::GraphError;

const NODE_COLUMNS: &str = "elementId(n) AS id, labels(n) AS labels, properties(n) AS properties";

const RELATIONSHIP_COLUMNS: &str = "elementId(n) AS source, elementId(n2) AS target, \
     elementId(r) AS id, type(r) AS type, properties(r) AS properties";

/// A parameter value bound to a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Param {
    Text(String),
    List(Vec<String>),
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<&[String]> for Param {
    fn from(value: &[String]) -> Self {
        Self::List(value.to_vec())
    }
}

/// Statement text plus its parameters.
///
/// Kept separate from `neo4rs::Query` so the text and parameters can be
/// logged and echoed back in write summaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    text: String,
    params: BTreeMap<String, Param>,
}

impl Statement {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<Param>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &BTreeMap<String, Param> {
        &self.params
    }

    /// Parameters as a JSON object.
    pub fn params_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.params).unwrap_or_default()
    }

    pub(crate) fn to_query(&self) -> neo4rs::Query {
        self.params
            .iter()
            .fold(neo4rs::query(&self.text), |q, (key, value)| match value {
                Param::Text(s) => q.param(key, s.clone()),
                Param::List(items) => q.param(key, items.clone()),
            })
    }
}

/// Quote a label or relationship type for direct use in statement text.
///
/// The name is wrapped in backticks with embedded backticks doubled.
pub fn quote_identifier(name: &str) -> Result<String, GraphError> {
    validate_identifier(name)?;
    Ok(format!("`{}`", name.replace('`', "``")))
}

/// Reject names that cannot be quoted safely.
pub fn validate_identifier(name: &str) -> Result<(), GraphError> {
    let reason = if name.trim().is_empty() {
        "must not be empty"
    } else if name.contains('\0') {
        "must not contain NUL"
    } else if name.contains("\\u") {
        // Older servers decode unicode escapes inside quoted names.
        "must not contain unicode escapes"
    } else {
        return Ok(());
    };
    Err(GraphError::InvalidIdentifier {
        name: name.to_string(),
        reason,
    })
}

// ── Introspection ─────────────────────────────────────────────────

pub fn ping() -> Statement {
    Statement::new("RETURN 1 AS ok")
}

pub fn node_labels() -> Statement {
    Statement::new("CALL db.labels() YIELD label RETURN label")
}

pub fn relationship_types() -> Statement {
    Statement::new("CALL db.relationshipTypes() YIELD relationshipType RETURN relationshipType")
}

pub fn schema_visualization() -> Statement {
    Statement::new(
        "CALL db.schema.visualization() YIELD nodes, relationships \
         RETURN nodes, relationships",
    )
}

// ── Listings ──────────────────────────────────────────────────────

/// All nodes, or those carrying at least one of `labels`.
pub fn list_nodes(labels: &[String]) -> Statement {
    if labels.is_empty() {
        return Statement::new(format!("MATCH (n)\nRETURN {NODE_COLUMNS}"));
    }
    Statement::new(format!(
        "MATCH (n)\n\
         WHERE any(label IN labels(n) WHERE label IN $labels)\n\
         RETURN {NODE_COLUMNS}"
    ))
    .param("labels", labels)
}

/// Directed relationships, optionally restricted by endpoint label and type.
///
/// With `labels`, both endpoints must carry one of them. With `types`, the
/// relationship type must be one of them. Both filters together are ANDed.
pub fn list_relationships(labels: &[String], types: &[String]) -> Statement {
    let mut text = String::from("MATCH (n)-[r]->(n2)");
    let mut keyword = "WHERE";

    if !labels.is_empty() {
        text.push_str(&format!(
            "\n{keyword} any(label IN labels(n) WHERE label IN $labels)\
             \nAND any(label IN labels(n2) WHERE label IN $labels)"
        ));
        keyword = "AND";
    }
    if !types.is_empty() {
        text.push_str(&format!("\n{keyword} type(r) IN $types"));
    }
    text.push_str(&format!("\nRETURN {RELATIONSHIP_COLUMNS}"));

    let mut stmt = Statement::new(text);
    if !labels.is_empty() {
        stmt = stmt.param("labels", labels);
    }
    if !types.is_empty() {
        stmt = stmt.param("types", types);
    }
    stmt
}

// ── Merges ────────────────────────────────────────────────────────

/// Upsert a node by label and `id` property.
pub fn merge_node(node: &NewNode) -> Result<Statement, GraphError> {
    let label = quote_identifier(&node.label)?;
    Ok(Statement::new(format!(
        "MERGE (n:{label} {{id: $id}})\n\
         RETURN elementId(n) AS element_id, n.id AS id, labels(n) AS labels"
    ))
    .param("id", node.id.as_str()))
}

/// Upsert a directed relationship between the nodes whose `id` properties
/// match. Returns no rows when either endpoint is missing.
pub fn merge_relationship(rel: &NewRelationship) -> Result<Statement, GraphError> {
    let rel_type = quote_identifier(&rel.rel_type)?;
    Ok(Statement::new(format!(
        "MATCH (n {{id: $source_id}}), (n2 {{id: $target_id}})\n\
         MERGE (n)-[r:{rel_type}]->(n2)\n\
         RETURN elementId(r) AS id, type(r) AS type"
    ))
    .param("source_id", rel.source_id.as_str())
    .param("target_id", rel.target_id.as_str()))
}
