//! Import query construction and graph reconstruction.
//!
//! An import POSTs a two-part batch — a node listing for the label and a
//! Cypher query for the relationships strictly between nodes bearing that
//! label — and rebuilds a directed graph from the two response parts.

use serde::Deserialize;
use serde_json::Value;

use neoport_core::{Graph, Properties};

use crate::batch::{BatchMethod, BatchOp};
use crate::client::{RestError, Result};

/// Property key synthesized onto every rebuilt edge, holding the
/// relationship's type string.
///
/// A relationship property with this exact name is silently overwritten.
pub const REL_NAME_KEY: &str = "neo_rel_name";

/// The two-operation batch that reads a label's subgraph.
pub fn import_ops(label: &str) -> Vec<BatchOp> {
    vec![
        BatchOp {
            method: BatchMethod::Get,
            to: format!("/label/{label}/nodes"),
            id: None,
            body: serde_json::json!({}),
        },
        BatchOp {
            method: BatchMethod::Post,
            to: "/cypher".to_string(),
            id: None,
            body: serde_json::json!({
                "query": label_query(label),
                "params": {},
            }),
        },
    ]
}

/// Cypher query selecting edges between nodes that both carry `label`,
/// returning (source internal id, relationship, target internal id).
fn label_query(label: &str) -> String {
    format!("MATCH (a:{label})-[r]->(b:{label}) RETURN ID(a), r, ID(b);")
}

// ── Response Shapes ──────────────────────────────────────────────

/// A node as returned by `/label/<label>/nodes`: a self-reference URL
/// whose trailing segment is the server-assigned id, plus properties.
#[derive(Debug, Deserialize)]
struct NodeRecord {
    #[serde(rename = "self")]
    self_url: String,
    data: Properties,
}

/// A relationship object inside a Cypher result row.
#[derive(Debug, Deserialize)]
struct RelRecord {
    #[serde(rename = "type")]
    rel_type: String,
    data: Properties,
}

#[derive(Debug, Deserialize)]
struct NodesPart {
    body: Vec<NodeRecord>,
}

#[derive(Debug, Deserialize)]
struct EdgesPart {
    body: CypherResult,
}

#[derive(Debug, Deserialize)]
struct CypherResult {
    data: Vec<(i64, RelRecord, i64)>,
}

// ── Reconstruction ───────────────────────────────────────────────

/// Rebuild a directed graph from a two-part batch response.
///
/// The result is always directed, even if the data was originally
/// exported from an undirected graph; direction reconstruction is out of
/// scope.
pub fn build_graph(response: Value) -> Result<Graph<i64>> {
    let (nodes_part, edges_part): (NodesPart, EdgesPart) = serde_json::from_value(response)
        .map_err(|e| RestError::MalformedResponse(format!("unexpected batch response shape: {e}")))?;

    let mut graph = Graph::directed();

    for record in nodes_part.body {
        let node_id = node_id_from_self_url(&record.self_url)?;
        graph.add_node(node_id, record.data);
    }

    for (from, rel, to) in edges_part.body.data {
        let mut properties = rel.data;
        properties.insert(REL_NAME_KEY.to_string(), Value::String(rel.rel_type));
        graph.add_edge(from, to, properties);
    }

    Ok(graph)
}

/// Extract the integer node id from the trailing path segment of a node's
/// self-reference URL.
fn node_id_from_self_url(url: &str) -> Result<i64> {
    let tail = url.rsplit('/').next().unwrap_or(url);
    tail.parse().map_err(|_| {
        RestError::MalformedResponse(format!(
            "node self URL `{url}` does not end in an integer id"
        ))
    })
}
