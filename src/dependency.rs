//! File-to-file dependencies and the project dependency graph.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A directed dependency between two indexed files. Weight counts how
/// strongly `from` leans on `to`, for example the number of imports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Dependency {
    from: PathBuf,
    to: PathBuf,
    weight: u32,
}

impl Dependency {
    pub(crate) fn new(from: PathBuf, to: PathBuf, weight: u32) -> Self {
        Self { from, to, weight }
    }

    pub fn from(&self) -> &Path {
        &self.from
    }

    pub fn to(&self) -> &Path {
        &self.to
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }
}

/// Cyclic dependency between files, in graph order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DependencyCycle {
    pub files: Vec<PathBuf>,
}

/// Dependency graph over all saved dependencies of one run.
pub struct DependencyGraph {
    graph: DiGraph<PathBuf, u32>,
    nodes: HashMap<PathBuf, NodeIndex>,
}

impl DependencyGraph {
    pub fn from_dependencies(dependencies: &[Dependency]) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes: HashMap<PathBuf, NodeIndex> = HashMap::new();
        for dep in dependencies {
            let from = node_for(&mut graph, &mut nodes, &dep.from);
            let to = node_for(&mut graph, &mut nodes, &dep.to);
            graph.add_edge(from, to, dep.weight);
        }
        Self { graph, nodes }
    }

    pub fn file_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn dependency_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Files the given file depends on, sorted.
    pub fn dependencies_of(&self, file: &Path) -> Vec<PathBuf> {
        self.neighbors(file, petgraph::Direction::Outgoing)
    }

    /// Files depending on the given file, sorted.
    pub fn dependents_of(&self, file: &Path) -> Vec<PathBuf> {
        self.neighbors(file, petgraph::Direction::Incoming)
    }

    /// Strongly connected components with more than one file, each a cycle.
    /// Sorted by their smallest member for stable reports.
    pub fn cycles(&self) -> Vec<DependencyCycle> {
        let mut cycles: Vec<DependencyCycle> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| component.len() > 1)
            .map(|component| {
                let mut files: Vec<PathBuf> = component
                    .into_iter()
                    .map(|node| self.graph[node].clone())
                    .collect();
                files.sort();
                DependencyCycle { files }
            })
            .collect();
        cycles.sort_by(|a, b| a.files.cmp(&b.files));
        cycles
    }

    fn neighbors(&self, file: &Path, direction: petgraph::Direction) -> Vec<PathBuf> {
        let Some(&node) = self.nodes.get(file) else {
            return Vec::new();
        };
        let mut out: Vec<PathBuf> = self
            .graph
            .neighbors_directed(node, direction)
            .map(|n| self.graph[n].clone())
            .collect();
        out.sort();
        out.dedup();
        out
    }
}

fn node_for(
    graph: &mut DiGraph<PathBuf, u32>,
    nodes: &mut HashMap<PathBuf, NodeIndex>,
    file: &Path,
) -> NodeIndex {
    match nodes.get(file) {
        Some(&node) => node,
        None => {
            let node = graph.add_node(file.to_path_buf());
            nodes.insert(file.to_path_buf(), node);
            node
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dep(from: &str, to: &str) -> Dependency {
        Dependency::new(PathBuf::from(from), PathBuf::from(to), 1)
    }

    #[test]
    fn test_cycle_detection() {
        let deps = vec![
            dep("a.rs", "b.rs"),
            dep("b.rs", "c.rs"),
            dep("c.rs", "a.rs"),
            dep("c.rs", "d.rs"),
        ];
        let graph = DependencyGraph::from_dependencies(&deps);
        let cycles = graph.cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(
            cycles[0].files,
            vec![
                PathBuf::from("a.rs"),
                PathBuf::from("b.rs"),
                PathBuf::from("c.rs")
            ]
        );
    }

    #[test]
    fn test_acyclic_graph_has_no_cycles() {
        let deps = vec![dep("a.rs", "b.rs"), dep("a.rs", "c.rs"), dep("b.rs", "c.rs")];
        let graph = DependencyGraph::from_dependencies(&deps);
        assert!(graph.cycles().is_empty());
        assert_eq!(graph.file_count(), 3);
        assert_eq!(graph.dependency_count(), 3);
    }

    #[test]
    fn test_neighbor_queries() {
        let deps = vec![dep("a.rs", "b.rs"), dep("a.rs", "c.rs"), dep("d.rs", "a.rs")];
        let graph = DependencyGraph::from_dependencies(&deps);
        assert_eq!(
            graph.dependencies_of(Path::new("a.rs")),
            vec![PathBuf::from("b.rs"), PathBuf::from("c.rs")]
        );
        assert_eq!(
            graph.dependents_of(Path::new("a.rs")),
            vec![PathBuf::from("d.rs")]
        );
        assert!(graph.dependencies_of(Path::new("unknown.rs")).is_empty());
    }
}
