//! Wire types for the graph service.
//!
//! Nodes and relationships leave the service wrapped in a `{"data": {...}}`
//! envelope so visualisation clients can load them without reshaping.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ── Credentials ───────────────────────────────────────────────────

/// Connection details for the Neo4j instance a request targets.
///
/// Supplied on every request and dropped with it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub uri: String,
    #[serde(default = "default_user")]
    pub user: String,
    pub password: String,
    #[serde(default = "default_database")]
    pub database: String,
}

fn default_user() -> String {
    "neo4j".to_string()
}

fn default_database() -> String {
    "neo4j".to_string()
}

// Credentials end up in request spans; keep the password out of them.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("uri", &self.uri)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

// ── Elements ──────────────────────────────────────────────────────

/// Envelope around a node or relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element<T> {
    pub data: T,
}

impl<T> Element<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// A node as seen by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Element id assigned by the database.
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl NodeData {
    /// Build a node from its full label set, picking one label with [`select_label`].
    pub fn from_labels<S: AsRef<str>>(
        id: impl Into<String>,
        labels: &[S],
        properties: Map<String, Value>,
    ) -> Self {
        Self {
            id: id.into(),
            label: select_label(labels),
            properties,
        }
    }
}

/// A directed relationship as seen by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipData {
    /// Element id of the start node.
    pub source: String,
    /// Element id of the end node.
    pub target: String,
    pub id: String,
    /// Relationship type.
    pub label: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// Either kind of element, as mixed together by the schema view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireElement {
    // Relationship first: a relationship payload also satisfies the node shape.
    Relationship(Element<RelationshipData>),
    Node(Element<NodeData>),
}

impl From<NodeData> for WireElement {
    fn from(node: NodeData) -> Self {
        Self::Node(Element::new(node))
    }
}

impl From<RelationshipData> for WireElement {
    fn from(rel: RelationshipData) -> Self {
        Self::Relationship(Element::new(rel))
    }
}

/// Pick the display label for a node.
///
/// Neo4j does not guarantee label order, so the lexicographically smallest
/// label wins. A node without labels gets an empty label.
pub fn select_label<S: AsRef<str>>(labels: &[S]) -> String {
    labels
        .iter()
        .map(AsRef::as_ref)
        .min()
        .unwrap_or_default()
        .to_string()
}

// ── Write Inputs ──────────────────────────────────────────────────

/// Node to merge: one label plus the `id` property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNode {
    pub label: String,
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
}

/// Relationship to merge between two nodes identified by their `id` property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRelationship {
    #[serde(deserialize_with = "string_or_number")]
    pub source_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub target_id: String,
    #[serde(rename = "type")]
    pub rel_type: String,
}

/// Accept `"42"` and `42` alike; ids are stored as strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}
