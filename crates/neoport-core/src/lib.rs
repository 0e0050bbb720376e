//! neoport-core: In-memory labeled graph model for the neoport pipelines.
//!
//! This crate provides the graph representation shared by both data-flow
//! directions:
//! - The export pipeline walks a [`Graph`] and turns it into a batched
//!   write request for a remote Neo4j server.
//! - The import pipeline reconstructs a directed [`Graph`] from a remote
//!   query result.
//!
//! Nodes are kept in an insertion-ordered map so that batch output is
//! reproducible for a given construction sequence.

pub mod graph;

pub use graph::{Edge, Graph, GraphKind, Properties};
