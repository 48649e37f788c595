//! Dependency graph between script operations using `petgraph`.
//!
//! Each operation is a node. An edge runs from the operation that
//! creates a component or channel to every operation that uses it, so a
//! script is well ordered when every edge points forward.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;

use hublink_common::types::{ChannelId, ComponentPath};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::script::{Script, ScriptOp};

/// Something an operation creates or uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Dependency {
    /// A component instance.
    Component(ComponentPath),
    /// A channel.
    Channel(ChannelId),
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Component(path) => write!(f, "component {path}"),
            Self::Channel(id) => write!(f, "channel {id}"),
        }
    }
}

fn defines(op: &ScriptOp) -> Option<Dependency> {
    match op {
        ScriptOp::AddComponent { path, .. } => Some(Dependency::Component(path.clone())),
        ScriptOp::AddChannel { channel, .. } => Some(Dependency::Channel(channel.clone())),
        _ => None,
    }
}

fn uses(op: &ScriptOp) -> Vec<Dependency> {
    match op {
        ScriptOp::AddComponent { .. } | ScriptOp::AddChannel { .. } => Vec::new(),
        ScriptOp::SetAttribute { path, .. } | ScriptOp::Remove { path } => {
            vec![Dependency::Component(path.clone())]
        }
        ScriptOp::Bind { port, channel } => vec![
            Dependency::Component(port.component.clone()),
            Dependency::Channel(channel.clone()),
        ],
    }
}

/// Dependency graph of one script.
#[derive(Debug)]
pub struct ScriptGraph {
    graph: DiGraph<usize, Dependency>,
    created: Vec<(usize, Dependency)>,
    external: Vec<(usize, Dependency)>,
    duplicates: Vec<(usize, Dependency)>,
}

impl ScriptGraph {
    /// Builds the graph of a script.
    #[must_use]
    pub fn from_script(script: &Script) -> Self {
        let mut graph = DiGraph::new();
        let nodes: Vec<NodeIndex> = (0..script.len()).map(|i| graph.add_node(i)).collect();

        let mut definers: HashMap<Dependency, usize> = HashMap::new();
        let mut created = Vec::new();
        let mut duplicates = Vec::new();
        for (idx, op) in script.iter().enumerate() {
            if let Some(dep) = defines(op) {
                if definers.contains_key(&dep) {
                    duplicates.push((idx, dep));
                } else {
                    let _ = definers.insert(dep.clone(), idx);
                    created.push((idx, dep));
                }
            }
        }

        let mut external = Vec::new();
        for (idx, op) in script.iter().enumerate() {
            for dep in uses(op) {
                match definers.get(&dep) {
                    Some(&definer) => {
                        let _ = graph.add_edge(nodes[definer], nodes[idx], dep);
                    }
                    None => external.push((idx, dep)),
                }
            }
        }

        Self {
            graph,
            created,
            external,
            duplicates,
        }
    }

    /// Edges whose creating operation comes after the operation using it,
    /// as `(creator, user, dependency)` operation indices.
    #[must_use]
    pub fn misordered(&self) -> Vec<(usize, usize, &Dependency)> {
        self.graph
            .edge_indices()
            .filter_map(|e| {
                let (from, to) = self.graph.edge_endpoints(e)?;
                let (creator, user) = (self.graph[from], self.graph[to]);
                (creator > user).then(|| (creator, user, &self.graph[e]))
            })
            .collect()
    }

    /// Components and channels created by the script, with the index of
    /// the creating operation.
    #[must_use]
    pub fn created(&self) -> &[(usize, Dependency)] {
        &self.created
    }

    /// Dependencies the script uses without creating them. They must
    /// already exist in the model.
    #[must_use]
    pub fn external(&self) -> &[(usize, Dependency)] {
        &self.external
    }

    /// Second and later creations of something the script already creates.
    #[must_use]
    pub fn duplicates(&self) -> &[(usize, Dependency)] {
        &self.duplicates
    }

    /// Returns an operation order in which every creation precedes its
    /// uses, keeping the original relative order wherever possible.
    #[must_use]
    pub fn stable_order(&self) -> Vec<usize> {
        let mut pending: Vec<usize> = self
            .graph
            .node_indices()
            .map(|n| self.graph.neighbors_directed(n, Direction::Incoming).count())
            .collect();
        let mut ready: BinaryHeap<Reverse<usize>> = self
            .graph
            .node_indices()
            .filter(|n| pending[n.index()] == 0)
            .map(|n| Reverse(self.graph[n]))
            .collect();

        let mut order = Vec::with_capacity(pending.len());
        while let Some(Reverse(idx)) = ready.pop() {
            order.push(idx);
            for next in self.graph.neighbors_directed(NodeIndex::new(idx), Direction::Outgoing) {
                pending[next.index()] -= 1;
                if pending[next.index()] == 0 {
                    ready.push(Reverse(self.graph[next]));
                }
            }
        }
        order
    }
}

/// Returns a copy of `script` with operations moved after the creations
/// they depend on.
#[must_use]
pub fn reorder(script: &Script) -> Script {
    let graph = ScriptGraph::from_script(script);
    graph
        .stable_order()
        .into_iter()
        .map(|idx| script.ops()[idx].clone())
        .collect()
}
