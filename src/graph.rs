//! Dependency graph module.
//!
//! Provides the `DependencyGraph` type, which records which named dice
//! expressions read from which others. The registry consults it before
//! accepting a new input so that no expression ever depends on itself.

use crate::dice_id::DiceId;
use crate::error::DiceError;
use petgraph::algo::{astar, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};
use petgraph::Direction;
use std::collections::HashMap;

/// A directed acyclic graph of expression dependencies.
///
/// An edge runs from a dependency to the expression that reads it, so a
/// topological order lists inputs before the composites built on them.
///
/// # Examples
///
/// ```rust
/// use exactdice::graph::DependencyGraph;
/// use exactdice::DiceId;
///
/// let mut graph = DependencyGraph::new();
/// let d6 = DiceId::new("d6");
/// let pool = DiceId::new("pool");
///
/// graph.add_edge(pool.clone(), d6.clone());
/// assert!(graph.check_edge(&d6, &pool).is_err());
///
/// let order = graph.topological_sort().unwrap();
/// assert_eq!(order, vec![d6, pool]);
/// ```
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<DiceId, ()>,
    node_map: HashMap<DiceId, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the graph if it doesn't exist.
    pub fn add_node(&mut self, id: DiceId) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(&id) {
            idx
        } else {
            let idx = self.graph.add_node(id.clone());
            self.node_map.insert(id, idx);
            idx
        }
    }

    /// Record that `from` reads `to`.
    ///
    /// Does not check for cycles; call [`check_edge`](Self::check_edge)
    /// first.
    pub fn add_edge(&mut self, from: DiceId, to: DiceId) {
        let from_idx = self.add_node(from);
        let to_idx = self.add_node(to);
        self.graph.add_edge(to_idx, from_idx, ());
    }

    /// Check whether `from` may read `to` without creating a cycle.
    ///
    /// Walks the existing dependents of `from`; if `to` is among them,
    /// the returned `DiceError::Cycle` lists the loop starting and ending
    /// at `from`. The graph is never modified.
    pub fn check_edge(&self, from: &DiceId, to: &DiceId) -> Result<(), DiceError> {
        if from == to {
            return Err(DiceError::Cycle {
                path: vec![from.clone(), from.clone()],
            });
        }
        let (Some(&from_idx), Some(&to_idx)) = (self.node_map.get(from), self.node_map.get(to))
        else {
            return Ok(());
        };
        match astar(&self.graph, from_idx, |n| n == to_idx, |_| 1, |_| 0) {
            Some((_, nodes)) => {
                let mut path: Vec<DiceId> =
                    nodes.into_iter().map(|idx| self.graph[idx].clone()).collect();
                path.push(from.clone());
                Err(DiceError::Cycle { path })
            }
            None => Ok(()),
        }
    }

    /// Forget everything `id` reads. The node itself stays.
    pub fn clear_dependencies(&mut self, id: &DiceId) {
        let Some(&idx) = self.node_map.get(id) else {
            return;
        };
        let mut incoming: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|edge| edge.id())
            .collect();
        // Removal swaps the last edge into the hole, so go from the back.
        incoming.sort_unstable_by(|a, b| b.cmp(a));
        for edge in incoming {
            self.graph.remove_edge(edge);
        }
    }

    /// Direct inputs of `id`.
    pub fn dependencies(&self, id: &DiceId) -> Vec<DiceId> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Every expression that reads `id`, directly or transitively.
    pub fn dependents(&self, id: &DiceId) -> Vec<DiceId> {
        let Some(&idx) = self.node_map.get(id) else {
            return Vec::new();
        };
        let mut dfs = Dfs::new(&self.graph, idx);
        let mut found = Vec::new();
        while let Some(node) = dfs.next(&self.graph) {
            if node != idx {
                found.push(self.graph[node].clone());
            }
        }
        found
    }

    fn neighbors(&self, id: &DiceId, direction: Direction) -> Vec<DiceId> {
        self.node_map
            .get(id)
            .map(|&idx| {
                self.graph
                    .neighbors_directed(idx, direction)
                    .map(|n| self.graph[n].clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All nodes, inputs before the expressions that read them.
    pub fn topological_sort(&self) -> Result<Vec<DiceId>, DiceError> {
        toposort(&self.graph, None)
            .map(|indices| {
                indices
                    .into_iter()
                    .map(|idx| self.graph[idx].clone())
                    .collect()
            })
            .map_err(|cycle| DiceError::Cycle {
                path: vec![self.graph[cycle.node_id()].clone()],
            })
    }

    pub fn contains_node(&self, id: &DiceId) -> bool {
        self.node_map.contains_key(id)
    }

    pub fn nodes(&self) -> Vec<DiceId> {
        self.graph
            .node_indices()
            .map(|idx| self.graph[idx].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> DiceId {
        DiceId::new(name)
    }

    #[test]
    fn test_topological_order_puts_inputs_first() {
        let mut graph = DependencyGraph::new();
        graph.add_edge(id("attack"), id("pool"));
        graph.add_edge(id("pool"), id("d6"));
        graph.add_edge(id("attack"), id("d6"));

        let order = graph.topological_sort().unwrap();
        let pos = |name: &str| order.iter().position(|n| n == &id(name)).unwrap();
        assert!(pos("d6") < pos("pool"));
        assert!(pos("pool") < pos("attack"));
    }

    #[test]
    fn test_check_edge_reports_cycle_path() {
        let mut graph = DependencyGraph::new();
        graph.add_edge(id("B"), id("A"));
        graph.add_edge(id("C"), id("B"));

        // A reading C would close A -> B -> C -> A.
        let err = graph.check_edge(&id("A"), &id("C")).unwrap_err();
        assert_eq!(
            err,
            DiceError::Cycle {
                path: vec![id("A"), id("B"), id("C"), id("A")]
            }
        );
        assert!(graph.check_edge(&id("C"), &id("A")).is_ok());
        assert!(graph.check_edge(&id("X"), &id("A")).is_ok());
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let graph = DependencyGraph::new();
        assert!(matches!(
            graph.check_edge(&id("A"), &id("A")),
            Err(DiceError::Cycle { .. })
        ));
    }

    #[test]
    fn test_dependents_are_transitive() {
        let mut graph = DependencyGraph::new();
        graph.add_edge(id("pool"), id("d6"));
        graph.add_edge(id("best"), id("pool"));
        graph.add_edge(id("other"), id("d8"));

        let mut dependents = graph.dependents(&id("d6"));
        dependents.sort();
        assert_eq!(dependents, vec![id("best"), id("pool")]);
        assert_eq!(graph.dependencies(&id("best")), vec![id("pool")]);
    }

    #[test]
    fn test_clear_dependencies() {
        let mut graph = DependencyGraph::new();
        graph.add_edge(id("mixed"), id("d4"));
        graph.add_edge(id("mixed"), id("d6"));
        graph.add_edge(id("other"), id("d6"));

        graph.clear_dependencies(&id("mixed"));
        assert!(graph.dependencies(&id("mixed")).is_empty());
        assert_eq!(graph.dependencies(&id("other")), vec![id("d6")]);
        assert!(graph.contains_node(&id("mixed")));
    }
}
