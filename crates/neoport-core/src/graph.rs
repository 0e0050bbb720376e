//! Labeled graph with insertion-ordered nodes and JSON property mappings.
//!
//! Property values are `serde_json::Value`, so any type a caller can
//! serialize with serde can be attached to a node or an edge. Node
//! iteration order is insertion order, which keeps the batch operations
//! derived from a graph deterministic.

use std::hash::Hash;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Property mapping attached to a node or an edge.
pub type Properties = serde_json::Map<String, serde_json::Value>;

// ── Graph ─────────────────────────────────────────────────────────

/// Whether a graph's edges are directed or undirected.
///
/// Undirected graphs are a derived view: each undirected edge is exported
/// as two directed relationships (forward and reverse).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphKind {
    Directed,
    Undirected,
}

/// An edge between two nodes, with its property mapping.
///
/// For undirected graphs the (source, target) orientation records how the
/// edge was inserted; it carries no semantic direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge<N> {
    pub source: N,
    pub target: N,
    pub properties: Properties,
}

/// A labeled graph: insertion-ordered nodes plus an edge list.
///
/// Node identifiers are opaque to the graph; anything hashable and
/// comparable works (`i64` for graphs rebuilt from a server, strings or
/// domain ids for graphs built by an application).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph<N: Eq + Hash + Clone> {
    kind: GraphKind,
    nodes: IndexMap<N, Properties>,
    edges: Vec<Edge<N>>,
}

impl<N: Eq + Hash + Clone> Graph<N> {
    /// Create an empty graph of the given kind.
    pub fn new(kind: GraphKind) -> Self {
        Self {
            kind,
            nodes: IndexMap::new(),
            edges: Vec::new(),
        }
    }

    /// Create an empty directed graph.
    pub fn directed() -> Self {
        Self::new(GraphKind::Directed)
    }

    /// Create an empty undirected graph.
    pub fn undirected() -> Self {
        Self::new(GraphKind::Undirected)
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    pub fn is_directed(&self) -> bool {
        self.kind == GraphKind::Directed
    }

    // ── Construction ─────────────────────────────────────────────

    /// Insert a node with its properties.
    ///
    /// Re-inserting an existing node replaces its properties but keeps its
    /// original position in the iteration order.
    pub fn add_node(&mut self, id: N, properties: Properties) {
        self.nodes.insert(id, properties);
    }

    /// Insert a node with no properties.
    pub fn add_bare_node(&mut self, id: N) {
        self.nodes.entry(id).or_default();
    }

    /// Insert an edge with its properties.
    ///
    /// Endpoints not yet present are inserted as bare nodes first, in
    /// (source, target) order.
    pub fn add_edge(&mut self, source: N, target: N, properties: Properties) {
        self.nodes.entry(source.clone()).or_default();
        self.nodes.entry(target.clone()).or_default();
        self.edges.push(Edge {
            source,
            target,
            properties,
        });
    }

    // ── Access ───────────────────────────────────────────────────

    /// Iterate nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (&N, &Properties)> {
        self.nodes.iter()
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> &[Edge<N>] {
        &self.edges
    }

    pub fn contains_node(&self, id: &N) -> bool {
        self.nodes.contains_key(id)
    }

    /// Properties of a node, if present.
    pub fn node_properties(&self, id: &N) -> Option<&Properties> {
        self.nodes.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
