//! Diagram Connectivity Graph
//!
//! A petgraph view over a diagram: components become nodes, connections
//! become edges with their endpoint pins resolved through the pin name
//! resolver. Built on demand for connectivity queries and for refreshing
//! per-pin `connected` flags; never persisted.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

use crate::resolver::resolve_pin;
use crate::schema::{Connection, Diagram};

/// A connection with both endpoints resolved to concrete pin ids.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLink {
    pub from: (String, String),
    pub to: (String, String),
}

/// Resolve a connection's endpoints against the current pin lists.
///
/// Returns `None` when either referenced component is missing from the
/// diagram; such connections are skipped at render/route time.
pub fn resolved_link(diagram: &Diagram, conn: &Connection) -> Option<ResolvedLink> {
    let from = diagram.find_component(&conn.from_component)?;
    let to = diagram.find_component(&conn.to_component)?;
    Some(ResolvedLink {
        from: (from.id.clone(), resolve_pin(&conn.from_pin, &from.pins)),
        to: (to.id.clone(), resolve_pin(&conn.to_pin, &to.pins)),
    })
}

/// Two links are duplicates when they join the same unordered
/// component+pin pair, regardless of direction.
pub fn links_equal(a: &ResolvedLink, b: &ResolvedLink) -> bool {
    (a.from == b.from && a.to == b.to) || (a.from == b.to && a.to == b.from)
}

/// Edge payload of the connectivity graph.
#[derive(Debug, Clone)]
pub struct WireEdge {
    pub connection_id: String,
    pub from_pin: String,
    pub to_pin: String,
}

/// Directed graph of components joined by resolved connections.
#[derive(Debug)]
pub struct DiagramGraph {
    graph: DiGraph<String, WireEdge>,
    indices: HashMap<String, NodeIndex>,
}

impl DiagramGraph {
    /// Build the view for one diagram snapshot. Connections whose
    /// endpoints cannot be resolved are skipped.
    pub fn build(diagram: &Diagram) -> Self {
        let mut graph = DiGraph::new();
        let mut indices = HashMap::new();

        for comp in &diagram.components {
            let idx = graph.add_node(comp.id.clone());
            indices.insert(comp.id.clone(), idx);
        }

        for conn in &diagram.connections {
            let Some(link) = resolved_link(diagram, conn) else {
                tracing::debug!(connection = %conn.id, "skipping unresolvable connection");
                continue;
            };
            let (Some(&a), Some(&b)) =
                (indices.get(&link.from.0), indices.get(&link.to.0))
            else {
                continue;
            };
            graph.add_edge(
                a,
                b,
                WireEdge {
                    connection_id: conn.id.clone(),
                    from_pin: link.from.1,
                    to_pin: link.to.1,
                },
            );
        }

        Self { graph, indices }
    }

    /// Connection ids touching a component, in edge order.
    pub fn connections_of(&self, component_id: &str) -> Vec<String> {
        let Some(&idx) = self.indices.get(component_id) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(idx, petgraph::Direction::Outgoing)
            .chain(self.graph.edges_directed(idx, petgraph::Direction::Incoming))
            .map(|e| e.weight().connection_id.clone())
            .collect()
    }

    /// Whether any resolved connection lands on this pin.
    pub fn is_pin_connected(&self, component_id: &str, pin_id: &str) -> bool {
        let Some(&idx) = self.indices.get(component_id) else {
            return false;
        };
        self.graph
            .edges_directed(idx, petgraph::Direction::Outgoing)
            .any(|e| e.weight().from_pin == pin_id)
            || self
                .graph
                .edges_directed(idx, petgraph::Direction::Incoming)
                .any(|e| e.weight().to_pin == pin_id)
    }

    /// Number of electrically independent groups of placed components.
    pub fn island_count(&self) -> usize {
        petgraph::algo::connected_components(&self.graph)
    }
}

/// Recompute every pin's `connected` flag from the current connections.
pub fn refresh_connected_flags(diagram: &mut Diagram) {
    let view = DiagramGraph::build(diagram);
    for comp in &mut diagram.components {
        let id = comp.id.clone();
        for pin in &mut comp.pins {
            pin.connected = view.is_pin_connected(&id, &pin.id);
        }
    }
}
