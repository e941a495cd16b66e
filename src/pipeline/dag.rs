// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! Stage dependency graph
//!
//! Turns the flat stage list of a pipeline into a validated DAG with a
//! deterministic execution order. Stages live in a petgraph arena and edges
//! point from a dependency to its dependent.
//!
//! Ordering is dependency-first. Among stages that are ready at the same
//! time, the lower `order_index` goes first, then the lower stage id, so the
//! same stage set always yields the same order.

use petgraph::algo::{has_path_connecting, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::errors::DedaError;
use crate::pipeline::StageRecord;

/// Validated, topologically ordered stage graph of one pipeline
#[derive(Debug, Clone)]
pub struct StageGraph {
    graph: DiGraph<StageRecord, ()>,
    id_to_index: HashMap<String, NodeIndex>,
    /// Nodes in execution order
    order: Vec<NodeIndex>,
    /// Position of each node in `order`, indexed by `NodeIndex::index()`
    rank: Vec<usize>,
}

/// Borrowed view of one stage and its resolved edges
#[derive(Debug, Clone, PartialEq)]
pub struct StageNode<'a> {
    pub record: &'a StageRecord,
    /// Upstream stage ids, in declared order
    pub dependencies: Vec<&'a str>,
    /// Downstream stage ids, in execution order
    pub dependents: Vec<&'a str>,
}

impl StageGraph {
    /// Build and validate the graph for a pipeline's stages
    ///
    /// Fails with `InvalidStage` when a stage has a blank id, image or
    /// command, `DuplicateStage` when two stages share an id,
    /// `DanglingDependency` when a `depends_on` entry names no stage of this
    /// set, and `CycleDetected` when the dependencies loop (a stage depending
    /// on itself included). An empty stage set yields an empty graph.
    #[tracing::instrument(level = "debug", skip(stages), fields(stages = stages.len()))]
    pub fn build(pipeline_id: &str, stages: Vec<StageRecord>) -> Result<Self, DedaError> {
        let mut graph = DiGraph::with_capacity(stages.len(), stages.len());
        let mut id_to_index = HashMap::with_capacity(stages.len());

        for stage in stages {
            check_stage(&stage)?;
            if id_to_index.contains_key(&stage.id) {
                return Err(DedaError::DuplicateStage { stage: stage.id });
            }
            let id = stage.id.clone();
            let node = graph.add_node(stage);
            id_to_index.insert(id, node);
        }

        // Resolve every reference before touching edges so the first dangling
        // entry in input order is the one reported.
        let mut edges = Vec::new();
        for node in graph.node_indices() {
            let stage = &graph[node];
            for dep in stage.dependencies() {
                let dep_node = id_to_index.get(dep).ok_or_else(|| {
                    DedaError::DanglingDependency {
                        stage: stage.id.clone(),
                        dependency: dep.to_string(),
                    }
                })?;
                edges.push((*dep_node, node));
            }
        }
        for (from, to) in edges {
            graph.add_edge(from, to, ());
        }

        let order = match Self::ordered_nodes(&graph) {
            Some(order) => order,
            None => return Err(Self::cycle_error(&graph)),
        };

        let mut rank = vec![0; order.len()];
        for (position, node) in order.iter().enumerate() {
            rank[node.index()] = position;
        }

        tracing::debug!(
            pipeline = pipeline_id,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "stage graph built"
        );

        Ok(Self {
            graph,
            id_to_index,
            order,
            rank,
        })
    }

    /// Kahn's algorithm with a `(order_index, id)` min-heap as tie-breaker.
    ///
    /// Returns `None` when some nodes never become ready, i.e. a cycle.
    fn ordered_nodes(graph: &DiGraph<StageRecord, ()>) -> Option<Vec<NodeIndex>> {
        let mut pending: Vec<usize> = graph
            .node_indices()
            .map(|n| graph.neighbors_directed(n, Direction::Incoming).count())
            .collect();

        let mut ready: BinaryHeap<Reverse<(i64, &str, NodeIndex)>> = graph
            .node_indices()
            .filter(|n| pending[n.index()] == 0)
            .map(|n| Reverse((graph[n].order_index, graph[n].id.as_str(), n)))
            .collect();

        let mut order = Vec::with_capacity(graph.node_count());
        while let Some(Reverse((_, _, node))) = ready.pop() {
            order.push(node);
            for next in graph.neighbors_directed(node, Direction::Outgoing) {
                pending[next.index()] -= 1;
                if pending[next.index()] == 0 {
                    ready.push(Reverse((graph[next].order_index, graph[next].id.as_str(), next)));
                }
            }
        }

        (order.len() == graph.node_count()).then_some(order)
    }

    /// Describe the cycle containing the smallest stage id that sits on one
    fn cycle_error(graph: &DiGraph<StageRecord, ()>) -> DedaError {
        let mut cycles: Vec<Vec<String>> = tarjan_scc(graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1 || graph.contains_edge(component[0], component[0])
            })
            .map(|component| {
                let mut ids: Vec<String> =
                    component.iter().map(|n| graph[*n].id.clone()).collect();
                ids.sort();
                ids
            })
            .collect();
        cycles.sort();

        // Kahn only stalls on a cycle, so there is at least one component.
        let cycle = cycles.into_iter().next().unwrap_or_default();
        let stage = cycle.first().cloned().unwrap_or_default();

        tracing::debug!(stage = %stage, members = cycle.len(), "dependency cycle");
        DedaError::CycleDetected { stage, cycle }
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the pipeline has no stages
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Number of dependency edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up a stage by id
    pub fn get(&self, stage_id: &str) -> Option<StageNode<'_>> {
        self.id_to_index.get(stage_id).map(|n| self.node(*n))
    }

    /// Stages in execution order
    pub fn ordered(&self) -> impl Iterator<Item = StageNode<'_>> + '_ {
        self.order.iter().map(|n| self.node(*n))
    }

    /// Stage ids in execution order
    pub fn order_ids(&self) -> Vec<&str> {
        self.order.iter().map(|n| self.graph[*n].id.as_str()).collect()
    }

    /// Stages that must finish before `stage_id`
    pub fn dependencies(&self, stage_id: &str) -> Option<Vec<&str>> {
        let node = self.id_to_index.get(stage_id)?;
        Some(self.graph[*node].dependencies())
    }

    /// Stages waiting on `stage_id`, in execution order
    pub fn dependents(&self, stage_id: &str) -> Option<Vec<&str>> {
        let node = self.id_to_index.get(stage_id)?;
        Some(self.dependents_of(*node))
    }

    /// Check if stage A depends (directly or transitively) on stage B
    pub fn depends_on(&self, stage_a: &str, stage_b: &str) -> bool {
        let (Some(a), Some(b)) = (self.id_to_index.get(stage_a), self.id_to_index.get(stage_b))
        else {
            return false;
        };

        a != b && has_path_connecting(&self.graph, *b, *a, None)
    }

    fn node(&self, index: NodeIndex) -> StageNode<'_> {
        let record = &self.graph[index];
        StageNode {
            record,
            dependencies: record.dependencies(),
            dependents: self.dependents_of(index),
        }
    }

    fn dependents_of(&self, index: NodeIndex) -> Vec<&str> {
        let mut next: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(index, Direction::Outgoing)
            .collect();
        next.sort_by_key(|n| self.rank[n.index()]);
        next.into_iter().map(|n| self.graph[n].id.as_str()).collect()
    }

    /// Generate Mermaid diagram of the graph
    pub fn to_mermaid(&self) -> String {
        let mut out = String::from("graph TD\n");

        for (position, node) in self.order.iter().enumerate() {
            let label = self.graph[*node].id.replace('"', "#quot;");
            out.push_str(&format!("    n{}[\"{}\"]\n", position, label));
        }

        for node in &self.order {
            for dep in self.dependencies_of(*node) {
                out.push_str(&format!(
                    "    n{} --> n{}\n",
                    self.rank[dep.index()],
                    self.rank[node.index()]
                ));
            }
        }

        out
    }

    /// Generate DOT diagram of the graph
    pub fn to_dot(&self) -> String {
        let quote = |id: &str| format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""));

        let mut out = String::from("digraph pipeline {\n");
        out.push_str("    rankdir=TB;\n");
        out.push_str("    node [shape=box, style=rounded];\n\n");

        for node in &self.order {
            out.push_str(&format!("    {};\n", quote(&self.graph[*node].id)));
        }

        for node in &self.order {
            for dep in self.dependencies_of(*node) {
                out.push_str(&format!(
                    "    {} -> {};\n",
                    quote(&self.graph[dep].id),
                    quote(&self.graph[*node].id)
                ));
            }
        }

        out.push_str("}\n");
        out
    }

    /// Generate text representation of execution order
    pub fn to_text(&self) -> String {
        let mut out = String::new();

        for (i, stage) in self.ordered().enumerate() {
            let tool = if stage.record.tool_name.is_empty() {
                stage.record.image.as_str()
            } else {
                stage.record.tool_name.as_str()
            };
            out.push_str(&format!("{}. {} ({})", i + 1, stage.record.id, tool));

            if !stage.dependencies.is_empty() {
                out.push_str(&format!(" [depends: {}]", stage.dependencies.join(", ")));
            }

            out.push('\n');
        }

        out
    }

    fn dependencies_of(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.graph[index]
            .dependencies()
            .into_iter()
            .filter_map(|dep| self.id_to_index.get(dep).copied())
            .collect()
    }
}

/// A stage must name itself, its image and its command
fn check_stage(stage: &StageRecord) -> Result<(), DedaError> {
    let invalid = |reason: &str| DedaError::InvalidStage {
        stage: stage.id.clone(),
        reason: reason.to_string(),
    };

    if stage.id.trim().is_empty() {
        return Err(invalid("id is empty"));
    }
    if stage.image.trim().is_empty() {
        return Err(invalid("image is empty"));
    }
    if stage.command.trim().is_empty() {
        return Err(invalid("command is empty"));
    }

    Ok(())
}
