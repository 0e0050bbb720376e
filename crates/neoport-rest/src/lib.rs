//! neoport-rest — Neo4j REST batch client for neoport graphs.
//!
//! Translates an in-memory [`Graph`] into one batched write request
//! against a Neo4j server's REST batch endpoint, and rebuilds a directed
//! graph from a label-scoped batch read. Each operation performs exactly
//! two sequential round-trips: a discovery GET on the server root to find
//! the batch endpoint, then a single batch POST.
//!
//! ```no_run
//! use neoport_core::{Graph, Properties};
//! use neoport_rest::{export, ExportOptions, ServerConfig};
//!
//! # async fn run() -> neoport_rest::Result<()> {
//! let mut graph = Graph::undirected();
//! graph.add_node(1, Properties::new());
//! graph.add_node(2, Properties::new());
//! graph.add_node(3, Properties::new());
//! graph.add_edge(1, 2, Properties::new());
//! graph.add_edge(2, 3, Properties::new());
//!
//! let config = ServerConfig::default();
//! let options = ExportOptions::new().rel_type("LINKS_TO").label("Node");
//! let created = export(&config, &graph, &options).await?;
//! # let _ = created;
//! # Ok(())
//! # }
//! ```

use std::hash::Hash;

pub mod batch;
pub mod client;
pub mod rebuild;

pub use batch::{build_batch, BatchMethod, BatchOp, ExportOptions};
pub use client::{check_response, BatchClient, Result, RestError, ServerConfig, JSON_CONTENT_TYPE};
pub use rebuild::{build_graph, import_ops, REL_NAME_KEY};

use neoport_core::Graph;

/// Export a graph as one batched write.
///
/// The batch is built (and its options validated) before anything goes on
/// the wire. Returns the server's response: one created-resource
/// descriptor per batch operation.
pub async fn export<N>(
    config: &ServerConfig,
    graph: &Graph<N>,
    options: &ExportOptions,
) -> Result<serde_json::Value>
where
    N: Eq + Hash + Clone,
{
    let ops = build_batch(graph, options)?;
    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        ops = ops.len(),
        "Built export batch"
    );

    let client = BatchClient::new(config.clone());
    let batch_url = client.discover().await?;
    client.post_batch(&batch_url, &ops).await
}

/// Import every node bearing `label`, and the edges between those nodes,
/// as a directed graph.
pub async fn import(config: &ServerConfig, label: &str) -> Result<Graph<i64>> {
    let client = BatchClient::new(config.clone());
    let batch_url = client.discover().await?;

    let response = client.post_batch(&batch_url, &import_ops(label)).await?;
    let graph = rebuild::build_graph(response)?;
    tracing::debug!(
        label = %label,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Rebuilt graph from server"
    );
    Ok(graph)
}
