//! Directed acyclic graph over deployable units.
//!
//! Internal to `wright-deploy`: the plan builder is the only consumer.
//! Nodes are added in declaration order, and that order is the tie-breaker
//! everywhere: topological sorting and cycle reporting are both fully
//! deterministic for a given descriptor set.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::fmt::Display;
use std::hash::Hash;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::error::{Error, Result};

/// A directed graph with deterministic topological sorting.
///
/// An edge `A -> B` means B depends on A: A must be ordered (and deployed)
/// before B.
#[derive(Debug, Clone)]
pub(crate) struct Dag<T>
where
    T: Clone + Eq + Hash + Display,
{
    graph: DiGraph<T, ()>,
    index_map: HashMap<T, NodeIndex>,
    /// Declaration order, used for tie-breaking.
    insertion_order: Vec<NodeIndex>,
}

impl<T> Default for Dag<T>
where
    T: Clone + Eq + Hash + Display,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Dag<T>
where
    T: Clone + Eq + Hash + Display,
{
    pub(crate) fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            index_map: HashMap::new(),
            insertion_order: Vec::new(),
        }
    }

    pub(crate) fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Adds a node. Re-adding an existing node is a no-op.
    pub(crate) fn add_node(&mut self, value: T) -> NodeIndex {
        if let Some(&idx) = self.index_map.get(&value) {
            return idx;
        }
        let idx = self.graph.add_node(value.clone());
        self.index_map.insert(value, idx);
        self.insertion_order.push(idx);
        idx
    }

    /// Adds a directed edge from `from` to `to` (`to` depends on `from`).
    ///
    /// # Errors
    ///
    /// Returns an error if either node index is invalid.
    pub(crate) fn add_edge(&mut self, from: NodeIndex, to: NodeIndex) -> Result<()> {
        for idx in [from, to] {
            self.graph
                .node_weight(idx)
                .ok_or_else(|| Error::DagNodeNotFound {
                    node: format!("index {}", idx.index()),
                })?;
        }
        self.graph.add_edge(from, to, ());
        Ok(())
    }

    pub(crate) fn get_index(&self, value: &T) -> Option<NodeIndex> {
        self.index_map.get(value).copied()
    }

    /// Returns a topologically sorted list of nodes.
    ///
    /// Kahn's algorithm over a min-heap keyed by declaration index: whenever
    /// several nodes are eligible, the earliest-declared one is emitted
    /// first. Repeated calls on the same graph produce identical output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CycleDetected`] with one concrete closed path if the
    /// graph contains a cycle.
    pub(crate) fn toposort(&self) -> Result<Vec<T>> {
        let node_count = self.graph.node_count();
        if node_count == 0 {
            return Ok(Vec::new());
        }

        let position: HashMap<NodeIndex, usize> = self
            .insertion_order
            .iter()
            .enumerate()
            .map(|(pos, &idx)| (idx, pos))
            .collect();

        let mut in_degree: HashMap<NodeIndex, usize> = HashMap::with_capacity(node_count);
        for idx in self.graph.node_indices() {
            in_degree.insert(idx, 0);
        }
        for edge in self.graph.edge_references() {
            *in_degree.entry(edge.target()).or_insert(0) += 1;
        }

        let mut ready: BinaryHeap<Reverse<usize>> = self
            .insertion_order
            .iter()
            .enumerate()
            .filter(|&(_, idx)| in_degree.get(idx).copied().unwrap_or(0) == 0)
            .map(|(pos, _)| Reverse(pos))
            .collect();

        let mut result = Vec::with_capacity(node_count);

        while let Some(Reverse(pos)) = ready.pop() {
            let idx = *self
                .insertion_order
                .get(pos)
                .ok_or_else(|| Error::DagNodeNotFound {
                    node: format!("position {pos}"),
                })?;
            let node = self
                .graph
                .node_weight(idx)
                .ok_or_else(|| Error::DagNodeNotFound {
                    node: format!("index {}", idx.index()),
                })?
                .clone();
            result.push(node);

            for neighbor in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                if let Some(deg) = in_degree.get_mut(&neighbor) {
                    *deg = deg.saturating_sub(1);
                    if *deg == 0 {
                        if let Some(&neighbor_pos) = position.get(&neighbor) {
                            ready.push(Reverse(neighbor_pos));
                        }
                    }
                }
            }
        }

        if result.len() != node_count {
            return Err(Error::CycleDetected {
                cycle: self.find_cycle(&in_degree, &position),
            });
        }

        Ok(result)
    }

    /// Extracts one concrete cycle from the unresolved remainder of a failed
    /// Kahn pass.
    ///
    /// Every node with residual in-degree > 0 has at least one unresolved
    /// predecessor, so walking predecessors must revisit a node; the visited
    /// segment between the two visits is a cycle. The reported path starts
    /// at the earliest-declared node on the cycle and is closed (first name
    /// repeated at the end).
    fn find_cycle(
        &self,
        in_degree: &HashMap<NodeIndex, usize>,
        position: &HashMap<NodeIndex, usize>,
    ) -> Vec<String> {
        let unresolved = |idx: &NodeIndex| in_degree.get(idx).copied().unwrap_or(0) > 0;

        let Some(&start) = self.insertion_order.iter().find(|idx| unresolved(*idx)) else {
            return Vec::new();
        };

        let mut path: Vec<NodeIndex> = vec![start];
        let mut seen: HashMap<NodeIndex, usize> = HashMap::from([(start, 0)]);
        let mut current = start;

        loop {
            let mut predecessors: Vec<NodeIndex> = self
                .graph
                .neighbors_directed(current, Direction::Incoming)
                .filter(unresolved)
                .collect();
            predecessors.sort_by_key(|idx| position.get(idx).copied().unwrap_or(usize::MAX));

            let Some(&predecessor) = predecessors.first() else {
                // Unreachable for a genuine cycle; report what we walked.
                break;
            };

            if let Some(&first_visit) = seen.get(&predecessor) {
                // path[first_visit..] walked predecessor edges backwards;
                // reverse it to follow edge direction.
                let mut cycle: Vec<NodeIndex> = path[first_visit..].iter().rev().copied().collect();

                // Rotate so the earliest-declared node leads.
                if let Some(min_at) = (0..cycle.len()).min_by_key(|&i| {
                    position.get(&cycle[i]).copied().unwrap_or(usize::MAX)
                }) {
                    cycle.rotate_left(min_at);
                }

                let mut names: Vec<String> = cycle
                    .iter()
                    .filter_map(|idx| self.graph.node_weight(*idx))
                    .map(ToString::to_string)
                    .collect();
                if let Some(first) = names.first().cloned() {
                    names.push(first);
                }
                return names;
            }

            seen.insert(predecessor, path.len());
            path.push(predecessor);
            current = predecessor;
        }

        path.iter()
            .filter_map(|idx| self.graph.node_weight(*idx))
            .map(ToString::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dag_of(edges: &[(&str, &str)], nodes: &[&str]) -> Dag<String> {
        let mut dag: Dag<String> = Dag::new();
        for node in nodes {
            dag.add_node((*node).to_string());
        }
        for (from, to) in edges {
            let from = dag.get_index(&(*from).to_string()).unwrap();
            let to = dag.get_index(&(*to).to_string()).unwrap();
            dag.add_edge(from, to).unwrap();
        }
        dag
    }

    #[test]
    fn empty_dag_sorts_to_nothing() {
        let dag: Dag<String> = Dag::new();
        assert!(dag.toposort().unwrap().is_empty());
    }

    #[test]
    fn re_adding_a_node_is_a_no_op() {
        let mut dag: Dag<String> = Dag::new();
        let first = dag.add_node("a".into());
        let second = dag.add_node("a".into());
        assert_eq!(first, second);
        assert_eq!(dag.node_count(), 1);
    }

    #[test]
    fn linear_chain_sorts_in_edge_order() {
        let dag = dag_of(&[("a", "b"), ("b", "c")], &["c", "b", "a"]);
        assert_eq!(dag.toposort().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn tie_break_prefers_earliest_declared() {
        // b and c both depend only on a; b was declared first.
        let dag = dag_of(&[("a", "b"), ("a", "c")], &["a", "b", "c"]);
        assert_eq!(dag.toposort().unwrap(), vec!["a", "b", "c"]);

        // Same graph, c declared before b.
        let dag = dag_of(&[("a", "b"), ("a", "c")], &["a", "c", "b"]);
        assert_eq!(dag.toposort().unwrap(), vec!["a", "c", "b"]);
    }

    #[test]
    fn earliest_declared_eligible_node_wins_even_mid_sort() {
        // d is declared first but only becomes eligible after a; once a is
        // emitted, d must precede the later-declared b and c.
        let dag = dag_of(
            &[("a", "d"), ("a", "b"), ("a", "c")],
            &["d", "a", "b", "c"],
        );
        assert_eq!(dag.toposort().unwrap(), vec!["a", "d", "b", "c"]);
    }

    #[test]
    fn toposort_is_repeatable() {
        let dag = dag_of(&[("a", "c"), ("b", "c"), ("c", "d")], &["a", "b", "c", "d"]);
        let first = dag.toposort().unwrap();
        let second = dag.toposort().unwrap();
        assert_eq!(first, second);
        assert_eq!(first, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn two_node_cycle_is_reported_as_closed_path() {
        let dag = dag_of(&[("a", "b"), ("b", "a")], &["a", "b"]);
        let err = dag.toposort().unwrap_err();
        match err {
            Error::CycleDetected { cycle } => {
                assert_eq!(cycle, vec!["a", "b", "a"]);
            }
            other => panic!("expected CycleDetected, got {other:?}"),
        }
    }

    #[test]
    fn three_node_cycle_starts_at_earliest_declared() {
        let dag = dag_of(&[("b", "c"), ("c", "a"), ("a", "b")], &["a", "b", "c"]);
        let err = dag.toposort().unwrap_err();
        match err {
            Error::CycleDetected { cycle } => {
                assert_eq!(cycle.first().map(String::as_str), Some("a"));
                assert_eq!(cycle.last().map(String::as_str), Some("a"));
                assert_eq!(cycle.len(), 4);
            }
            other => panic!("expected CycleDetected, got {other:?}"),
        }
    }

    #[test]
    fn cycle_in_a_partially_sortable_graph_is_found() {
        // a sorts fine; b <-> c cycle remains.
        let dag = dag_of(&[("a", "b"), ("b", "c"), ("c", "b")], &["a", "b", "c"]);
        let err = dag.toposort().unwrap_err();
        match err {
            Error::CycleDetected { cycle } => {
                assert_eq!(cycle, vec!["b", "c", "b"]);
            }
            other => panic!("expected CycleDetected, got {other:?}"),
        }
    }

    #[test]
    fn invalid_edge_index_is_rejected() {
        let mut dag: Dag<String> = Dag::new();
        let a = dag.add_node("a".into());
        let mut other: Dag<String> = Dag::new();
        for name in ["x", "y", "z"] {
            other.add_node(name.into());
        }
        let bogus = other.get_index(&"z".to_string()).unwrap();
        assert!(matches!(
            dag.add_edge(a, bogus),
            Err(Error::DagNodeNotFound { .. })
        ));
    }
}
