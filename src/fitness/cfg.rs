//! Control-flow graphs and approach-level distances
//!
//! The evaluator measures how far an execution strayed from an objective as
//! the shortest path in an undirected mirror of the CFG, where edges taken on
//! a false branch weigh 2 and every other edge weighs 1.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::FitnessError;

/// Branch outcome an edge is taken on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeDirection {
    True,
    False,
    None,
}

impl EdgeDirection {
    /// Weight of the edge in the approach-level graph
    pub fn weight(&self) -> u32 {
        match self {
            Self::False => 2,
            Self::True | Self::None => 1,
        }
    }
}

/// A CFG node
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CfgNode {
    pub id: String,
    pub is_branch: bool,
    pub line: u32,
    /// Branch outcome this node represents (meaningful for branch nodes)
    pub branch_direction: bool,
}

/// A directed CFG edge
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CfgEdge {
    pub from: String,
    pub to: String,
    pub direction: EdgeDirection,
}

/// Control-flow graph of the program under test
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlFlowGraph {
    pub nodes: Vec<CfgNode>,
    pub edges: Vec<CfgEdge>,
}

impl ControlFlowGraph {
    pub fn new(nodes: Vec<CfgNode>, edges: Vec<CfgEdge>) -> Self {
        Self { nodes, edges }
    }

    /// Add a plain node
    pub fn add_node(&mut self, id: impl Into<String>, line: u32) -> &mut Self {
        self.nodes.push(CfgNode {
            id: id.into(),
            is_branch: false,
            line,
            branch_direction: false,
        });
        self
    }

    /// Add a branch node
    pub fn add_branch(&mut self, id: impl Into<String>, line: u32, direction: bool) -> &mut Self {
        self.nodes.push(CfgNode {
            id: id.into(),
            is_branch: true,
            line,
            branch_direction: direction,
        });
        self
    }

    /// Add a directed edge
    pub fn add_edge(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        direction: EdgeDirection,
    ) -> &mut Self {
        self.edges.push(CfgEdge {
            from: from.into(),
            to: to.into(),
            direction,
        });
        self
    }
}

/// All-pairs shortest paths over the undirected, weighted CFG mirror
#[derive(Clone, Debug)]
pub struct ShortestPaths {
    index: HashMap<String, usize>,
    branch_index: HashMap<(u32, bool), usize>,
    distances: Vec<Vec<Option<u32>>>,
}

impl ShortestPaths {
    /// Build the mirror graph and run Dijkstra from every node
    pub fn from_cfg(cfg: &ControlFlowGraph) -> Result<Self, FitnessError> {
        let mut index = HashMap::with_capacity(cfg.nodes.len());
        let mut branch_index = HashMap::new();
        for (i, node) in cfg.nodes.iter().enumerate() {
            if index.insert(node.id.clone(), i).is_some() {
                return Err(FitnessError::BrokenInvariant(format!(
                    "duplicate CFG node id `{}`",
                    node.id
                )));
            }
            if node.is_branch {
                branch_index
                    .entry((node.line, node.branch_direction))
                    .or_insert(i);
            }
        }

        let mut adjacency: Vec<Vec<(usize, u32)>> = vec![Vec::new(); cfg.nodes.len()];
        for edge in &cfg.edges {
            let from = *index.get(&edge.from).ok_or_else(|| {
                FitnessError::BrokenInvariant(format!("edge source `{}` is not a node", edge.from))
            })?;
            let to = *index.get(&edge.to).ok_or_else(|| {
                FitnessError::BrokenInvariant(format!("edge target `{}` is not a node", edge.to))
            })?;
            let weight = edge.direction.weight();
            adjacency[from].push((to, weight));
            adjacency[to].push((from, weight));
        }

        let distances = (0..cfg.nodes.len())
            .map(|source| dijkstra(&adjacency, source))
            .collect();

        Ok(Self {
            index,
            branch_index,
            distances,
        })
    }

    /// Number of nodes in the graph
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Index of the node with the given id
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Index of the branch node at `line` for `direction`
    pub fn branch_node(&self, line: u32, direction: bool) -> Option<usize> {
        self.branch_index.get(&(line, direction)).copied()
    }

    /// Shortest distance between two nodes
    ///
    /// `Ok(None)` means unreachable; an out-of-range index is an error.
    pub fn distance(&self, from: usize, to: usize) -> Result<Option<u32>, FitnessError> {
        self.distances
            .get(from)
            .and_then(|row| row.get(to))
            .copied()
            .ok_or_else(|| {
                FitnessError::BrokenInvariant(format!(
                    "no shortest-path entry for ({}, {})",
                    from, to
                ))
            })
    }
}

fn dijkstra(adjacency: &[Vec<(usize, u32)>], source: usize) -> Vec<Option<u32>> {
    let mut dist: Vec<Option<u32>> = vec![None; adjacency.len()];
    let mut heap = BinaryHeap::new();
    dist[source] = Some(0);
    heap.push(Reverse((0u32, source)));

    while let Some(Reverse((d, node))) = heap.pop() {
        if dist[node].is_some_and(|best| d > best) {
            continue;
        }
        for &(next, weight) in &adjacency[node] {
            let candidate = d + weight;
            if dist[next].map_or(true, |best| candidate < best) {
                dist[next] = Some(candidate);
                heap.push(Reverse((candidate, next)));
            }
        }
    }

    dist
}
