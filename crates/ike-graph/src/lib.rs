//! IKE Graph — Neo4j access for the graph service.
//!
//! Every request builds its own [`GraphClient`] from the credentials it
//! carries; the client is dropped, and its connections closed, when the
//! request completes. Statements are built in [`cypher`] so that labels and
//! relationship types only ever reach the database as parameters or as
//! quoted identifiers.

pub mod client;
pub mod cypher;
pub mod mutations;
pub mod queries;

pub use client::{DriverSettings, GraphClient, GraphError};
pub use cypher::{Param, Statement};
pub use mutations::ExecutionSummary;
