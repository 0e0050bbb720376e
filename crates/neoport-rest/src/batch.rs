//! Batch operation descriptors and the export request builder.
//!
//! An export walks the graph once: nodes are assigned temp-ids 0..N-1 in
//! iteration order, then every operation that needs to reference a node
//! created earlier in the same batch embeds the placeholder `{temp_id}`,
//! which the server resolves when it applies the batch.

use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use serde_json::json;

use neoport_core::{Graph, Properties};

use crate::client::{RestError, Result};

// ── Operation Descriptors ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BatchMethod {
    Get,
    Post,
}

/// One step of a server-side batch, serialized as `{method, to, id?, body}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOp {
    pub method: BatchMethod,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<usize>,
    pub body: serde_json::Value,
}

impl BatchOp {
    /// Create a node carrying its property mapping, tagged with the
    /// temp-id later operations use to reference it.
    pub fn create_node(temp_id: usize, properties: &Properties) -> Self {
        Self {
            method: BatchMethod::Post,
            to: "/node".to_string(),
            id: Some(temp_id),
            body: serde_json::Value::Object(properties.clone()),
        }
    }

    /// Add a label to a node created earlier in the batch.
    pub fn add_label(temp_id: usize, label: &str) -> Self {
        Self {
            method: BatchMethod::Post,
            to: format!("{{{temp_id}}}/labels"),
            id: None,
            body: serde_json::Value::String(label.to_string()),
        }
    }

    /// Create a typed relationship between two nodes created earlier in
    /// the batch.
    pub fn create_relationship(
        from_temp_id: usize,
        to_temp_id: usize,
        rel_type: &str,
        properties: &Properties,
    ) -> Self {
        Self {
            method: BatchMethod::Post,
            to: format!("{{{from_temp_id}}}/relationships"),
            id: None,
            body: json!({
                "to": format!("{{{to_temp_id}}}"),
                "type": rel_type,
                "data": properties,
            }),
        }
    }
}

// ── Export Options ───────────────────────────────────────────────

/// How an export names relationships and labels nodes.
///
/// At least one of `rel_type` and `rel_type_key` must be set. When
/// `rel_type_key` is set, each edge's type is looked up under that key in
/// the edge's properties, falling back to `rel_type` when the key is
/// absent.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub rel_type: Option<String>,
    pub label: Option<String>,
    pub rel_type_key: Option<String>,
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relationship type applied to every edge (or used as fallback when
    /// `rel_type_key` misses).
    pub fn rel_type(mut self, name: impl Into<String>) -> Self {
        self.rel_type = Some(name.into());
        self
    }

    /// Label added to every exported node.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Edge property key whose value names that edge's relationship type.
    pub fn rel_type_key(mut self, key: impl Into<String>) -> Self {
        self.rel_type_key = Some(key.into());
        self
    }
}

// ── Batch Builder ────────────────────────────────────────────────

/// Build the ordered operation list that exports `graph`.
///
/// Emission order: one CreateNode per node (temp-ids 0..N-1 in node
/// iteration order), then one AddLabel per node when a label is set, then
/// the relationship operations in edge iteration order. Undirected graphs
/// emit a mirrored relationship right after each forward one, sharing the
/// same type and properties. The property key used for type resolution,
/// if any, stays in the emitted properties.
pub fn build_batch<N>(graph: &Graph<N>, options: &ExportOptions) -> Result<Vec<BatchOp>>
where
    N: Eq + Hash + Clone,
{
    if options.rel_type.is_none() && options.rel_type_key.is_none() {
        return Err(RestError::Config(
            "must provide a relationship type name or a type key".to_string(),
        ));
    }

    let mut ops = Vec::with_capacity(graph.node_count() * 2 + graph.edge_count() * 2);
    let mut temp_ids: HashMap<&N, usize> = HashMap::with_capacity(graph.node_count());

    for (temp_id, (node, properties)) in graph.nodes().enumerate() {
        ops.push(BatchOp::create_node(temp_id, properties));
        temp_ids.insert(node, temp_id);
    }

    if let Some(label) = &options.label {
        for temp_id in 0..graph.node_count() {
            ops.push(BatchOp::add_label(temp_id, label));
        }
    }

    for edge in graph.edges() {
        let rel_type = resolve_rel_type(&edge.properties, options)?;
        // add_edge inserts both endpoints, so these lookups cannot miss.
        let from = temp_ids[&edge.source];
        let to = temp_ids[&edge.target];

        ops.push(BatchOp::create_relationship(
            from,
            to,
            rel_type,
            &edge.properties,
        ));

        if !graph.is_directed() {
            ops.push(BatchOp::create_relationship(
                to,
                from,
                rel_type,
                &edge.properties,
            ));
        }
    }

    Ok(ops)
}

/// Resolve the relationship type name for one edge.
///
/// Non-string values under `rel_type_key` are treated the same as an
/// absent key.
fn resolve_rel_type<'a>(properties: &'a Properties, options: &'a ExportOptions) -> Result<&'a str> {
    let resolved = match &options.rel_type_key {
        Some(key) => match properties.get(key).and_then(|v| v.as_str()) {
            Some(name) => Some(name),
            None => options.rel_type.as_deref(),
        },
        None => options.rel_type.as_deref(),
    };

    match resolved {
        Some(name) if !name.is_empty() => Ok(name),
        Some(_) => Err(RestError::Config(
            "relationship type name is empty".to_string(),
        )),
        None => Err(RestError::Config("invalid edge label key".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn props(value: Value) -> Properties {
        value.as_object().cloned().unwrap_or_default()
    }

    /// Two-level balanced binary tree: edges (0,1) and (0,2), with a
    /// property on node 2 and on the first edge.
    fn tree(directed: bool) -> Graph<i64> {
        let mut graph = if directed {
            Graph::directed()
        } else {
            Graph::undirected()
        };
        graph.add_node(0, Properties::new());
        graph.add_node(1, Properties::new());
        graph.add_node(2, props(json!({"debug": "test"})));
        graph.add_edge(0, 1, props(json!({"debug": false})));
        graph.add_edge(0, 2, Properties::new());
        graph
    }

    #[test]
    fn test_build_batch_directed() {
        let graph = tree(true);
        let options = ExportOptions::new().rel_type("LINK_TO").label("ITEM");
        let ops = build_batch(&graph, &options).unwrap();

        let expected = json!([
            {"method": "POST", "to": "/node", "id": 0, "body": {}},
            {"method": "POST", "to": "/node", "id": 1, "body": {}},
            {"method": "POST", "to": "/node", "id": 2, "body": {"debug": "test"}},
            {"method": "POST", "to": "{0}/labels", "body": "ITEM"},
            {"method": "POST", "to": "{1}/labels", "body": "ITEM"},
            {"method": "POST", "to": "{2}/labels", "body": "ITEM"},
            {"method": "POST", "to": "{0}/relationships",
             "body": {"to": "{1}", "type": "LINK_TO", "data": {"debug": false}}},
            {"method": "POST", "to": "{0}/relationships",
             "body": {"to": "{2}", "type": "LINK_TO", "data": {}}},
        ]);
        assert_eq!(serde_json::to_value(&ops).unwrap(), expected);
    }

    #[test]
    fn test_build_batch_undirected_mirrors_each_edge() {
        let graph = tree(false);
        let options = ExportOptions::new().rel_type("LINK_TO").label("ITEM");
        let ops = build_batch(&graph, &options).unwrap();

        let expected = json!([
            {"method": "POST", "to": "/node", "id": 0, "body": {}},
            {"method": "POST", "to": "/node", "id": 1, "body": {}},
            {"method": "POST", "to": "/node", "id": 2, "body": {"debug": "test"}},
            {"method": "POST", "to": "{0}/labels", "body": "ITEM"},
            {"method": "POST", "to": "{1}/labels", "body": "ITEM"},
            {"method": "POST", "to": "{2}/labels", "body": "ITEM"},
            {"method": "POST", "to": "{0}/relationships",
             "body": {"to": "{1}", "type": "LINK_TO", "data": {"debug": false}}},
            {"method": "POST", "to": "{1}/relationships",
             "body": {"to": "{0}", "type": "LINK_TO", "data": {"debug": false}}},
            {"method": "POST", "to": "{0}/relationships",
             "body": {"to": "{2}", "type": "LINK_TO", "data": {}}},
            {"method": "POST", "to": "{2}/relationships",
             "body": {"to": "{0}", "type": "LINK_TO", "data": {}}},
        ]);
        assert_eq!(serde_json::to_value(&ops).unwrap(), expected);
    }

    #[test]
    fn test_build_batch_without_label_skips_label_ops() {
        let graph = tree(true);
        let ops = build_batch(&graph, &ExportOptions::new().rel_type("LINK_TO")).unwrap();
        assert_eq!(ops.len(), 5);
        assert!(ops.iter().all(|op| !op.to.ends_with("/labels")));
    }

    #[test]
    fn test_build_batch_requires_name_or_key() {
        let err = build_batch(&tree(true), &ExportOptions::new()).unwrap_err();
        assert!(matches!(err, RestError::Config(_)));

        // Holds for the empty graph too.
        let empty: Graph<i64> = Graph::directed();
        let err = build_batch(&empty, &ExportOptions::new()).unwrap_err();
        assert!(matches!(err, RestError::Config(_)));
    }

    #[test]
    fn test_rel_type_key_names_each_edge() {
        let mut graph = Graph::directed();
        graph.add_edge(1, 2, props(json!({"label": "KNOWS"})));
        graph.add_edge(2, 3, props(json!({"label": "OWNS"})));

        let options = ExportOptions::new().rel_type_key("label");
        let ops = build_batch(&graph, &options).unwrap();

        assert_eq!(ops[3].body["type"], json!("KNOWS"));
        assert_eq!(ops[4].body["type"], json!("OWNS"));
        // The naming key stays in the emitted properties.
        assert_eq!(ops[3].body["data"]["label"], json!("KNOWS"));
    }

    #[test]
    fn test_rel_type_key_falls_back_to_rel_type() {
        let mut graph = Graph::directed();
        graph.add_edge(1, 2, props(json!({"label": "KNOWS"})));
        graph.add_edge(2, 3, Properties::new());

        let options = ExportOptions::new().rel_type("LINKS_TO").rel_type_key("label");
        let ops = build_batch(&graph, &options).unwrap();

        assert_eq!(ops[3].body["type"], json!("KNOWS"));
        assert_eq!(ops[4].body["type"], json!("LINKS_TO"));
    }

    #[test]
    fn test_rel_type_key_miss_without_fallback_fails() {
        let mut graph = Graph::directed();
        graph.add_edge(1, 2, Properties::new());

        let err = build_batch(&graph, &ExportOptions::new().rel_type_key("label")).unwrap_err();
        match err {
            RestError::Config(msg) => assert_eq!(msg, "invalid edge label key"),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_rel_type_is_rejected() {
        let mut graph = Graph::directed();
        graph.add_edge(1, 2, Properties::new());

        let err = build_batch(&graph, &ExportOptions::new().rel_type("")).unwrap_err();
        assert!(matches!(err, RestError::Config(_)));
    }

    #[test]
    fn test_round_trip_scenario_counts() {
        // 3-node, 2-edge undirected chain: 3 creates, 3 labels, 4 rels.
        let mut graph = Graph::undirected();
        graph.add_node(1, Properties::new());
        graph.add_node(2, Properties::new());
        graph.add_node(3, Properties::new());
        graph.add_edge(1, 2, Properties::new());
        graph.add_edge(2, 3, Properties::new());

        let options = ExportOptions::new().rel_type("LINKS_TO").label("Node");
        let ops = build_batch(&graph, &options).unwrap();

        assert_eq!(ops.len(), 10);
        let creates: Vec<_> = ops.iter().filter(|op| op.to == "/node").collect();
        assert_eq!(creates.len(), 3);
        assert_eq!(
            creates.iter().map(|op| op.id).collect::<Vec<_>>(),
            vec![Some(0), Some(1), Some(2)]
        );
        assert_eq!(ops.iter().filter(|op| op.to.ends_with("/labels")).count(), 3);

        let rels: Vec<_> = ops
            .iter()
            .filter(|op| op.to.ends_with("/relationships"))
            .collect();
        assert_eq!(rels.len(), 4);
        assert!(rels.iter().all(|op| op.body["type"] == json!("LINKS_TO")));
    }

    #[test]
    fn test_ordering_nodes_then_labels_then_relationships() {
        let graph = tree(false);
        let options = ExportOptions::new().rel_type("LINK_TO").label("ITEM");
        let ops = build_batch(&graph, &options).unwrap();

        let phase = |op: &BatchOp| -> u8 {
            if op.to == "/node" {
                0
            } else if op.to.ends_with("/labels") {
                1
            } else {
                2
            }
        };
        let phases: Vec<_> = ops.iter().map(phase).collect();
        let mut sorted = phases.clone();
        sorted.sort_unstable();
        assert_eq!(phases, sorted);
    }
}
