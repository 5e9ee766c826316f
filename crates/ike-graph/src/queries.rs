//! Read operations and result reshaping.

use ike_core::{Element, NodeData, RelationshipData, WireElement};
use neo4rs::{BoltMap, BoltNode, BoltRelation, BoltType, Row};
use serde_json::{Map, Value};

use crate::client::{GraphClient, GraphError};
use crate::cypher::{self, Statement};

impl GraphClient {
    // ── Connectivity ─────────────────────────────────────────────

    /// Run a trivial statement to prove the credentials and host work.
    pub async fn ping(&self) -> Result<(), GraphError> {
        self.query_one(&cypher::ping()).await?;
        Ok(())
    }

    // ── Introspection ────────────────────────────────────────────

    /// All node labels, in database order.
    pub async fn node_labels(&self) -> Result<Vec<String>, GraphError> {
        self.string_column(&cypher::node_labels(), "label").await
    }

    /// All relationship types, in database order.
    pub async fn relationship_types(&self) -> Result<Vec<String>, GraphError> {
        self.string_column(&cypher::relationship_types(), "relationshipType")
            .await
    }

    async fn string_column(
        &self,
        stmt: &Statement,
        column: &str,
    ) -> Result<Vec<String>, GraphError> {
        let rows = self.query_rows(stmt).await?;
        let mut values = Vec::with_capacity(rows.len());
        for row in rows {
            let value: String = row
                .get(column)
                .map_err(|e| self.decode_failed(stmt, column, e))?;
            values.push(value);
        }
        tracing::debug!(column, count = values.len(), "Introspection finished");
        Ok(values)
    }

    // ── Listings ─────────────────────────────────────────────────

    /// Nodes carrying at least one of `labels`, or every node when empty.
    pub async fn list_nodes(
        &self,
        labels: &[String],
    ) -> Result<Vec<Element<NodeData>>, GraphError> {
        let stmt = cypher::list_nodes(labels);
        let rows = self.query_rows(&stmt).await?;

        let mut nodes = Vec::with_capacity(rows.len());
        for row in rows {
            let node = node_from_row(&row)
                .map_err(|(column, e)| self.decode_failed(&stmt, column, e))?;
            nodes.push(Element::new(node));
        }

        tracing::debug!(count = nodes.len(), "Listed nodes");
        Ok(nodes)
    }

    /// Directed relationships filtered by endpoint labels and by type.
    pub async fn list_relationships(
        &self,
        labels: &[String],
        types: &[String],
    ) -> Result<Vec<Element<RelationshipData>>, GraphError> {
        let stmt = cypher::list_relationships(labels, types);
        let rows = self.query_rows(&stmt).await?;

        let mut rels = Vec::with_capacity(rows.len());
        for row in rows {
            let decode = |column: &str| -> Result<String, GraphError> {
                row.get(column)
                    .map_err(|e| self.decode_failed(&stmt, column, e))
            };
            rels.push(Element::new(RelationshipData {
                source: decode("source")?,
                target: decode("target")?,
                id: decode("id")?,
                label: decode("type")?,
                properties: row_properties(&row),
            }));
        }

        tracing::debug!(count = rels.len(), "Listed relationships");
        Ok(rels)
    }

    // ── Schema ───────────────────────────────────────────────────

    /// Node types and relationship types as sampled by
    /// `db.schema.visualization()`, nodes first.
    pub async fn schema(&self) -> Result<Vec<WireElement>, GraphError> {
        let stmt = cypher::schema_visualization();
        let Some(row) = self.query_one(&stmt).await? else {
            return Ok(Vec::new());
        };

        let nodes: BoltType = row
            .get("nodes")
            .map_err(|e| self.decode_failed(&stmt, "nodes", e))?;
        let relationships: BoltType = row
            .get("relationships")
            .map_err(|e| self.decode_failed(&stmt, "relationships", e))?;

        Ok(schema_elements(&nodes, &relationships))
    }

    pub(crate) fn decode_failed(
        &self,
        stmt: &Statement,
        column: &str,
        err: impl std::fmt::Display,
    ) -> GraphError {
        self.failed(
            stmt,
            GraphError::Serialization(format!("Failed to decode column {column}: {err}")),
        )
    }
}

// ── Helpers ──────────────────────────────────────────────────────

/// Decode one `list_nodes` row; a bad column is reported with its name.
fn node_from_row(row: &Row) -> Result<NodeData, (&'static str, String)> {
    let id: String = row.get("id").map_err(|e| ("id", e.to_string()))?;
    let labels: Vec<String> = row.get("labels").map_err(|e| ("labels", e.to_string()))?;
    Ok(NodeData::from_labels(id, &labels, row_properties(row)))
}

fn row_properties(row: &Row) -> Map<String, Value> {
    match row.get::<BoltType>("properties") {
        Ok(BoltType::Map(map)) => bolt_map_to_json(&map),
        _ => Map::new(),
    }
}

fn schema_elements(nodes: &BoltType, relationships: &BoltType) -> Vec<WireElement> {
    let mut elements: Vec<WireElement> = Vec::new();
    for value in bolt_items(nodes).iter().chain(bolt_items(relationships)) {
        match value {
            BoltType::Node(node) => elements.push(schema_node(node).into()),
            BoltType::Relation(rel) => elements.push(schema_relationship(rel).into()),
            other => tracing::warn!(value = ?other, "Unexpected schema entry"),
        }
    }
    elements
}

fn bolt_items(value: &BoltType) -> &[BoltType] {
    match value {
        BoltType::List(list) => list.value.as_slice(),
        _ => &[],
    }
}

/// Schema entries are virtual; their integer ids only need to be consistent
/// within one response.
fn schema_node(node: &BoltNode) -> NodeData {
    let labels: Vec<String> = node
        .labels
        .value
        .iter()
        .filter_map(|l| match l {
            BoltType::String(s) => Some(s.value.clone()),
            _ => None,
        })
        .collect();
    NodeData::from_labels(
        node.id.value.to_string(),
        &labels,
        bolt_map_to_json(&node.properties),
    )
}

fn schema_relationship(rel: &BoltRelation) -> RelationshipData {
    RelationshipData {
        source: rel.start_node_id.value.to_string(),
        target: rel.end_node_id.value.to_string(),
        id: rel.id.value.to_string(),
        label: rel.typ.value.clone(),
        properties: bolt_map_to_json(&rel.properties),
    }
}

pub(crate) fn bolt_map_to_json(map: &BoltMap) -> Map<String, Value> {
    map.value
        .iter()
        .map(|(k, v)| (k.value.clone(), bolt_to_json(v)))
        .collect()
}

/// Convert a driver value into JSON.
///
/// Temporal and spatial values fall back to their debug rendering.
pub(crate) fn bolt_to_json(value: &BoltType) -> Value {
    match value {
        BoltType::Null(_) => Value::Null,
        BoltType::Boolean(b) => Value::Bool(b.value),
        BoltType::Integer(i) => Value::from(i.value),
        BoltType::Float(f) => serde_json::Number::from_f64(f.value)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        BoltType::String(s) => Value::String(s.value.clone()),
        BoltType::List(list) => Value::Array(list.value.iter().map(bolt_to_json).collect()),
        BoltType::Map(map) => Value::Object(bolt_map_to_json(map)),
        BoltType::Node(node) => Value::Object(bolt_map_to_json(&node.properties)),
        BoltType::Relation(rel) => Value::Object(bolt_map_to_json(&rel.properties)),
        BoltType::Bytes(bytes) => {
            Value::Array(bytes.value.iter().map(|b| Value::from(*b)).collect())
        }
        other => Value::String(format!("{other:?}")),
    }
}
