//! Cycle detection over the `blocked_by` graph

use std::collections::{HashMap, HashSet};

use crate::models::artifact::ArtifactSet;
use crate::models::artifact_id::ArtifactId;

use super::issues::DependencyIssue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Not yet visited.
    White,
    /// On the current DFS path.
    Gray,
    /// Fully explored.
    Black,
}

/// Find cycles in the `blocked_by` graph.
///
/// DFS in the set's natural iteration order with white/gray/black coloring.
/// References to ids outside the set are skipped. A back-edge to a gray node
/// yields the cycle path, closed by repeating its first node
/// (`A.1 → A.2 → A.1`). Every strongly connected component that contains a
/// cycle is reported exactly once, at the first back-edge found into it,
/// however many components hang off the same DFS root.
pub fn detect_circular_dependencies(artifacts: &ArtifactSet) -> Vec<DependencyIssue> {
    let components = strongly_connected(artifacts);
    let mut search = CycleSearch {
        artifacts,
        components: &components,
        colors: artifacts.ids().map(|id| (id, Color::White)).collect(),
        path: Vec::new(),
        reported: HashSet::new(),
        issues: Vec::new(),
    };

    for root in artifacts.ids() {
        if search.colors.get(root) == Some(&Color::White) {
            search.visit(root);
        }
    }

    search.issues
}

struct CycleSearch<'a> {
    artifacts: &'a ArtifactSet,
    components: &'a HashMap<&'a ArtifactId, usize>,
    colors: HashMap<&'a ArtifactId, Color>,
    path: Vec<&'a ArtifactId>,
    /// Components that already have an issue.
    reported: HashSet<usize>,
    issues: Vec<DependencyIssue>,
}

impl<'a> CycleSearch<'a> {
    fn visit(&mut self, node: &'a ArtifactId) {
        self.colors.insert(node, Color::Gray);
        self.path.push(node);

        if let Some(artifact) = self.artifacts.get(node) {
            for dep in &artifact.metadata.relationships.blocked_by {
                match self.colors.get(dep).copied() {
                    // Not in the snapshot: dangling reference, not an edge.
                    None => continue,
                    Some(Color::White) => self.visit(dep),
                    Some(Color::Gray) => {
                        let fresh = match self.components.get(dep) {
                            Some(component) => self.reported.insert(*component),
                            None => true,
                        };
                        if fresh {
                            let cycle = close_cycle(&self.path, dep);
                            self.issues.push(DependencyIssue::cycle(cycle));
                        }
                    }
                    Some(Color::Black) => {}
                }
            }
        }

        self.path.pop();
        self.colors.insert(node, Color::Black);
    }
}

/// Slice the current path from `entry` onward and close the loop.
fn close_cycle(path: &[&ArtifactId], entry: &ArtifactId) -> Vec<ArtifactId> {
    let start = path.iter().position(|id| *id == entry).unwrap_or(0);
    let mut cycle: Vec<ArtifactId> = path[start..].iter().map(|id| (*id).clone()).collect();
    cycle.push(entry.clone());
    cycle
}

/// Label every node with its strongly connected component (Tarjan).
fn strongly_connected(artifacts: &ArtifactSet) -> HashMap<&ArtifactId, usize> {
    let mut tarjan = Tarjan {
        artifacts,
        next_index: 0,
        index: HashMap::new(),
        lowlink: HashMap::new(),
        stack: Vec::new(),
        on_stack: HashSet::new(),
        component: HashMap::new(),
        next_component: 0,
    };
    for id in artifacts.ids() {
        if !tarjan.index.contains_key(id) {
            tarjan.connect(id);
        }
    }
    tarjan.component
}

struct Tarjan<'a> {
    artifacts: &'a ArtifactSet,
    next_index: usize,
    index: HashMap<&'a ArtifactId, usize>,
    lowlink: HashMap<&'a ArtifactId, usize>,
    stack: Vec<&'a ArtifactId>,
    on_stack: HashSet<&'a ArtifactId>,
    component: HashMap<&'a ArtifactId, usize>,
    next_component: usize,
}

impl<'a> Tarjan<'a> {
    fn connect(&mut self, node: &'a ArtifactId) {
        self.index.insert(node, self.next_index);
        self.lowlink.insert(node, self.next_index);
        self.next_index += 1;
        self.stack.push(node);
        self.on_stack.insert(node);

        if let Some(artifact) = self.artifacts.get(node) {
            for dep in &artifact.metadata.relationships.blocked_by {
                if !self.artifacts.contains(dep) {
                    continue;
                }
                if !self.index.contains_key(dep) {
                    self.connect(dep);
                    let low = self.lowlink[node].min(self.lowlink[dep]);
                    self.lowlink.insert(node, low);
                } else if self.on_stack.contains(dep) {
                    let low = self.lowlink[node].min(self.index[dep]);
                    self.lowlink.insert(node, low);
                }
            }
        }

        if self.lowlink[node] == self.index[node] {
            while let Some(member) = self.stack.pop() {
                self.on_stack.remove(member);
                self.component.insert(member, self.next_component);
                if member == node {
                    break;
                }
            }
            self.next_component += 1;
        }
    }
}
