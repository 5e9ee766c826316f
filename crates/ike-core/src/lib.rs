//! ike-core: Shared types for the IKE graph service.
//!
//! This crate provides the types exchanged between the HTTP layer and the
//! graph client:
//! - Per-request Neo4j credentials
//! - Node and relationship wire objects in the `{data: {...}}` shape
//!   consumed by graph visualisation front ends
//! - The error kinds and the single error body returned by every route

pub mod error;
pub mod types;

pub use error::{ErrorBody, ErrorKind};
pub use types::{
    select_label, Credentials, Element, NewNode, NewRelationship, NodeData, RelationshipData,
    WireElement,
};
