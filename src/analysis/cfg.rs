use crate::analysis::{DotParseError, Graph};
use fnv::{FnvHashMap, FnvHashSet};
use regex::Regex;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io;
use std::io::{Read, Write};
use std::ops::{Index, IndexMut};
use std::path::Path;

/// Handle of a node inside a [NodeArena].
pub type NodeId = usize;

/// Classification assigned to a loop header during structuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopType {
    /// The exit test sits at the loop header (while loop).
    PreTest,
    /// The exit test sits at the latching node (do-while loop).
    PostTest,
    /// The loop has no exit test.
    Endless,
}

impl Display for LoopType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LoopType::PreTest => write!(f, "pre_test"),
            LoopType::PostTest => write!(f, "post_test"),
            LoopType::Endless => write!(f, "endless"),
        }
    }
}

/// A basic block of a control flow graph, together with the structural
/// annotations filled in by the structuring passes.
///
/// The identity of a node is its arena handle; the name is only used to
/// format output. All annotations start empty and are written exclusively by
/// [analyze](crate::analysis::analyze).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Stable textual identifier (the DOT ID), used for output.
    pub name: String,
    /// Depth-first pre-order number.
    pub pre: usize,
    /// Reverse post-order number.
    pub rev_post: usize,
    /// Number of back edges entering this node.
    pub n_back_edges: usize,
    /// Header of the innermost loop containing this node.
    pub loop_head: Option<NodeId>,
    /// For a loop header, the latching node of its loop.
    pub latch: Option<NodeId>,
    /// Set on nodes identified as a loop latch.
    pub is_latch: bool,
    /// For a loop header, the loop classification.
    pub loop_type: Option<LoopType>,
    /// For a loop header, the node control reaches on loop exit.
    pub loop_follow: Option<NodeId>,
    /// Header of the switch governing this node.
    pub switch_head: Option<NodeId>,
    /// For a switch header, the node where the cases merge.
    pub switch_follow: Option<NodeId>,
    /// Merge node of the enclosing two-way conditional.
    pub if_follow: Option<NodeId>,
}

impl Node {
    fn new(name: String) -> Node {
        Node {
            name,
            pre: usize::MAX,
            rev_post: usize::MAX,
            n_back_edges: 0,
            loop_head: None,
            latch: None,
            is_latch: false,
            loop_type: None,
            loop_follow: None,
            switch_head: None,
            switch_follow: None,
            if_follow: None,
        }
    }
}

/// Arena owning every node identity used by a graph and by the graphs derived
/// from it during an analysis.
///
/// Nodes are never removed: collapsing intervals allocates fresh nodes while
/// the originals keep their annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    /// Allocates a new node with the given name and returns its handle.
    pub fn alloc<S: Into<String>>(&mut self, name: S) -> NodeId {
        self.nodes.push(Node::new(name.into()));
        self.nodes.len() - 1
    }

    /// Returns the name of the given node.
    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id].name
    }

    /// Returns the number of nodes ever allocated.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if no node has been allocated yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resets every structural annotation, keeping the node identities.
    ///
    /// After this call the arena is ready for a new analysis of the same
    /// graph.
    pub fn clear_annotations(&mut self) {
        for node in self.nodes.iter_mut() {
            let name = std::mem::take(&mut node.name);
            *node = Node::new(name);
        }
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    fn index(&self, index: NodeId) -> &Self::Output {
        &self.nodes[index]
    }
}

impl IndexMut<NodeId> for NodeArena {
    fn index_mut(&mut self, index: NodeId) -> &mut Self::Output {
        &mut self.nodes[index]
    }
}

/// A control flow graph over arena nodes.
///
/// The graph holds a name (the DOT ID), a designated entry and both
/// directions of adjacency. For nodes with exactly two successors the first
/// successor is the false target and the second the true target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cfg {
    name: String,
    entry: Option<NodeId>,
    succs: FnvHashMap<NodeId, Vec<NodeId>>,
    preds: FnvHashMap<NodeId, Vec<NodeId>>,
}

impl Cfg {
    /// Creates a graph from a list of node names and a list of edges.
    ///
    /// Nodes are allocated into a fresh arena in the order given; edge
    /// endpoints not present in `nodes` are allocated in order of appearance.
    /// The entry is the first node. Edges keep their listing order, so for a
    /// two-way node the false target must be listed first.
    pub fn new(name: &str, nodes: &[&str], edges: &[(&str, &str)]) -> (Cfg, NodeArena) {
        let mut arena = NodeArena::default();
        let mut ids = FnvHashMap::default();
        let mut intern = |name: &str, arena: &mut NodeArena, ids: &mut FnvHashMap<String, NodeId>| {
            if let Some(&id) = ids.get(name) {
                id
            } else {
                let id = arena.alloc(name);
                ids.insert(name.to_string(), id);
                id
            }
        };
        for name in nodes {
            intern(name, &mut arena, &mut ids);
        }
        let mut succs: FnvHashMap<NodeId, Vec<NodeId>> = FnvHashMap::default();
        for (from, to) in edges {
            let from = intern(from, &mut arena, &mut ids);
            let to = intern(to, &mut arena, &mut ids);
            let targets = succs.entry(from).or_default();
            if !targets.contains(&to) {
                targets.push(to);
            }
        }
        for id in 0..arena.len() {
            succs.entry(id).or_default();
        }
        let entry = if arena.is_empty() { None } else { Some(0) };
        (Cfg::from_parts(name.to_string(), entry, succs), arena)
    }

    // builds the predecessor map and finalises the graph
    fn from_parts(
        name: String,
        entry: Option<NodeId>,
        succs: FnvHashMap<NodeId, Vec<NodeId>>,
    ) -> Cfg {
        let mut preds: FnvHashMap<NodeId, Vec<NodeId>> = FnvHashMap::default();
        let mut sources = succs.keys().copied().collect::<Vec<_>>();
        sources.sort_unstable();
        for &from in &sources {
            preds.entry(from).or_default();
        }
        for &from in &sources {
            for &to in &succs[&from] {
                preds.entry(to).or_default().push(from);
            }
        }
        Cfg {
            name,
            entry,
            succs,
            preds,
        }
    }

    /// Returns the name (DOT ID) of the graph.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    /// Returns the designated entry node, or None if the graph is empty.
    pub fn entry(&self) -> Option<NodeId> {
        self.entry
    }

    /// Returns true if the given node belongs to this graph.
    pub fn contains(&self, node: NodeId) -> bool {
        self.succs.contains_key(&node)
    }

    /// Returns an iterator over the nodes of the graph, in no specific order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.succs.keys().copied()
    }

    /// Returns the nodes of the graph sorted by reverse post-order.
    ///
    /// [Cfg::number_nodes] must have run on this graph beforehand; unnumbered
    /// nodes sort last, by handle.
    pub fn nodes_by_rev_post(&self, nodes: &NodeArena) -> Vec<NodeId> {
        let mut ids = self.succs.keys().copied().collect::<Vec<_>>();
        ids.sort_by_key(|&id| (nodes[id].rev_post, id));
        ids
    }

    /// Returns the predecessors of the given node.
    pub fn predecessors(&self, node: NodeId) -> &[NodeId] {
        self.preds.get(&node).map_or(&[], |p| p.as_slice())
    }

    /// Returns the target of the false branch of a two-way node.
    ///
    /// Returns None if the node does not have exactly two successors.
    pub fn false_target(&self, node: NodeId) -> Option<NodeId> {
        match self.succs.get(&node) {
            Some(targets) if targets.len() == 2 => Some(targets[0]),
            _ => None,
        }
    }

    /// Returns the target of the true branch of a two-way node.
    ///
    /// Returns None if the node does not have exactly two successors.
    pub fn true_target(&self, node: NodeId) -> Option<NodeId> {
        match self.succs.get(&node) {
            Some(targets) if targets.len() == 2 => Some(targets[1]),
            _ => None,
        }
    }

    /// Assigns the DFS numbers `pre` and `rev_post` to every reachable node.
    ///
    /// Both numbers come from a single depth-first walk rooted at the entry,
    /// visiting successors in ascending handle order so that repeated runs
    /// produce identical numbers. `pre` follows the visit order; `rev_post`
    /// orders predecessors before successors on the acyclic skeleton of the
    /// graph.
    pub fn number_nodes(&self, nodes: &mut NodeArena) {
        let entry = match self.entry {
            Some(entry) => entry,
            None => return,
        };
        let mut sorted = FnvHashMap::default();
        for (&id, targets) in self.succs.iter() {
            let mut targets = targets.clone();
            targets.sort_unstable();
            sorted.insert(id, targets);
        }
        let mut next_pre = 0;
        let mut postorder = Vec::with_capacity(self.succs.len());
        let mut visited = FnvHashSet::default();
        let mut stack: Vec<(NodeId, usize)> = Vec::with_capacity(self.succs.len());
        visited.insert(entry);
        nodes[entry].pre = next_pre;
        next_pre += 1;
        stack.push((entry, 0));
        while let Some((id, cursor)) = stack.last_mut() {
            let id = *id;
            let targets = &sorted[&id];
            if *cursor < targets.len() {
                let target = targets[*cursor];
                *cursor += 1;
                if visited.insert(target) {
                    nodes[target].pre = next_pre;
                    next_pre += 1;
                    stack.push((target, 0));
                }
            } else {
                stack.pop();
                postorder.push(id);
            }
        }
        for (rank, &id) in postorder.iter().rev().enumerate() {
            nodes[id].rev_post = rank;
        }
    }

    /// Collapses a set of nodes into a single fresh node.
    ///
    /// Returns the new graph and the handle of the replacement node. Edges
    /// into the set from outside become edges into the new node; edges
    /// leaving the set become edges of the new node, collected walking the
    /// members in reverse post-order. Edges internal to the set are dropped
    /// and duplicates are removed. Two-way nodes outside the set keep their
    /// branch slots. If the entry is collapsed the new node becomes the
    /// entry.
    pub fn merge(
        &self,
        del_set: &FnvHashSet<NodeId>,
        new_name: &str,
        nodes: &mut NodeArena,
    ) -> (Cfg, NodeId) {
        let mut members = del_set.iter().copied().collect::<Vec<_>>();
        members.sort_by_key(|&id| (nodes[id].rev_post, id));
        let new_id = nodes.alloc(new_name);
        let mut succs: FnvHashMap<NodeId, Vec<NodeId>> = FnvHashMap::default();
        for (&id, targets) in self.succs.iter() {
            if del_set.contains(&id) {
                continue;
            }
            let mut mapped = Vec::with_capacity(targets.len());
            for &target in targets {
                let target = if del_set.contains(&target) {
                    new_id
                } else {
                    target
                };
                if !mapped.contains(&target) {
                    mapped.push(target);
                }
            }
            succs.insert(id, mapped);
        }
        let mut out = Vec::new();
        for &member in &members {
            for &target in &self.succs[&member] {
                if !del_set.contains(&target) && !out.contains(&target) {
                    out.push(target);
                }
            }
        }
        succs.insert(new_id, out);
        let entry = self.entry.map(|entry| {
            if del_set.contains(&entry) {
                new_id
            } else {
                entry
            }
        });
        (Cfg::from_parts(self.name.clone(), entry, succs), new_id)
    }

    /// Converts the current graph into a Graphviz dot representation.
    ///
    /// The entry node is listed first; for two-way nodes the branch slots are
    /// recorded as `label` attributes so that the output can be read back
    /// with [Cfg::from_dot] without losing information.
    pub fn to_dot(&self, nodes: &NodeArena) -> String {
        let mut ids = self.succs.keys().copied().collect::<Vec<_>>();
        ids.sort_unstable();
        if let Some(entry) = self.entry {
            if let Some(position) = ids.iter().position(|&id| id == entry) {
                ids.remove(position);
                ids.insert(0, entry);
            }
        }
        let mut content = Vec::new();
        for &id in &ids {
            content.push(format!("\t\"{}\";", nodes.name(id)));
        }
        for &id in &ids {
            let targets = &self.succs[&id];
            if targets.len() == 2 {
                content.push(format!(
                    "\t\"{}\" -> \"{}\" [label=\"false\"];",
                    nodes.name(id),
                    nodes.name(targets[0])
                ));
                content.push(format!(
                    "\t\"{}\" -> \"{}\" [label=\"true\"];",
                    nodes.name(id),
                    nodes.name(targets[1])
                ));
            } else {
                for &target in targets {
                    content.push(format!(
                        "\t\"{}\" -> \"{}\";",
                        nodes.name(id),
                        nodes.name(target)
                    ));
                }
            }
        }
        format!("digraph {} {{\n{}\n}}\n", self.name, content.join("\n"))
    }

    /// Constructs a graph from a Graphviz dot representation.
    ///
    /// The parser is intentionally small: it accepts `digraph` headers, node
    /// statements and single edge statements, with optional quotes and
    /// attribute lists. The entry is the first node that appears. For a
    /// two-way node the first listed edge is the false target and the second
    /// the true target, unless `label="true"` / `label="false"` attributes
    /// say otherwise.
    pub fn from_dot(src: &str) -> Result<(Cfg, NodeArena), DotParseError> {
        let header_re = Regex::new(r#"^\s*digraph(?:\s+"?([\w.]+)"?)?\s*\{\s*$"#).unwrap();
        let edge_re =
            Regex::new(r#"^\s*"?([\w.]+)"?\s*->\s*"?([\w.]+)"?\s*(?:\[([^\]]*)\])?\s*;?\s*$"#)
                .unwrap();
        let node_re = Regex::new(r#"^\s*"?([\w.]+)"?\s*(?:\[[^\]]*\])?\s*;?\s*$"#).unwrap();
        let label_re = Regex::new(r#"label\s*=\s*"?(true|false)"?"#).unwrap();
        let mut lines = src.lines().enumerate();
        let name = loop {
            match lines.next() {
                Some((_, line)) if line.trim().is_empty() => continue,
                Some((_, line)) => match header_re.captures(line) {
                    Some(cap) => {
                        break cap.get(1).map_or("G", |m| m.as_str()).to_string();
                    }
                    None => return Err(DotParseError::NotADigraph),
                },
                None => return Err(DotParseError::NotADigraph),
            }
        };
        let mut arena = NodeArena::default();
        let mut ids: FnvHashMap<String, NodeId> = FnvHashMap::default();
        let mut edges: Vec<(NodeId, NodeId, Option<bool>)> = Vec::new();
        let mut closed = false;
        for (index, line) in lines {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed == "}" {
                closed = true;
                continue;
            }
            if closed {
                return Err(DotParseError::Syntax { line: index + 1 });
            }
            if let Some(cap) = edge_re.captures(trimmed) {
                let mut intern = |name: &str, arena: &mut NodeArena| {
                    *ids.entry(name.to_string())
                        .or_insert_with(|| arena.alloc(name))
                };
                let from = intern(cap.get(1).map_or("", |m| m.as_str()), &mut arena);
                let to = intern(cap.get(2).map_or("", |m| m.as_str()), &mut arena);
                let label = cap
                    .get(3)
                    .and_then(|attrs| label_re.captures(attrs.as_str()))
                    .map(|l| l.get(1).map_or("", |m| m.as_str()) == "true");
                edges.push((from, to, label));
            } else if let Some(cap) = node_re.captures(trimmed) {
                let name = cap.get(1).map_or("", |m| m.as_str());
                // skip attribute defaults such as `node [shape=box];`
                if name != "graph" && name != "node" && name != "edge" {
                    ids.entry(name.to_string())
                        .or_insert_with(|| arena.alloc(name));
                }
            } else {
                return Err(DotParseError::Syntax { line: index + 1 });
            }
        }
        let mut succs: FnvHashMap<NodeId, Vec<NodeId>> = FnvHashMap::default();
        let mut labels: FnvHashMap<NodeId, Vec<Option<bool>>> = FnvHashMap::default();
        for (from, to, label) in edges {
            let targets = succs.entry(from).or_default();
            if !targets.contains(&to) {
                targets.push(to);
                labels.entry(from).or_default().push(label);
            }
        }
        for id in 0..arena.len() {
            succs.entry(id).or_default();
        }
        for (id, targets) in succs.iter_mut() {
            if targets.len() == 2 {
                let slots = &labels[id];
                if slots[0] == Some(true) || slots[1] == Some(false) {
                    targets.swap(0, 1);
                }
            }
        }
        let entry = if arena.is_empty() { None } else { Some(0) };
        Ok((Cfg::from_parts(name, entry, succs), arena))
    }

    /// Saves the current graph as a Graphviz .dot file.
    ///
    /// This is equivalent to calling [Cfg::to_dot] and then saving the
    /// string content to file.
    pub fn to_file<S: AsRef<Path>>(&self, nodes: &NodeArena, filename: S) -> Result<(), io::Error> {
        let mut file = File::create(filename)?;
        file.write_all(self.to_dot(nodes).as_bytes())
    }

    /// Reads a graph from a Graphviz .dot file.
    pub fn from_file<S: AsRef<Path>>(filename: S) -> Result<(Cfg, NodeArena), DotParseError> {
        let mut file = File::open(filename)?;
        let mut content = String::new();
        file.read_to_string(&mut content)?;
        Cfg::from_dot(&content)
    }
}

impl Display for Cfg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let edges: usize = self.succs.values().map(|targets| targets.len()).sum();
        write!(f, "{}({}, {})", self.name, self.succs.len(), edges)
    }
}

impl Graph for Cfg {
    type Item = NodeId;

    fn root(&self) -> Option<NodeId> {
        self.entry
    }

    fn successors(&self, node: NodeId) -> &[NodeId] {
        self.succs.get(&node).map_or(&[], |targets| targets.as_slice())
    }

    fn len(&self) -> usize {
        self.succs.len()
    }
}

#[cfg(test)]
mod tests {
    use crate::analysis::{Cfg, Graph};
    use fnv::FnvHashSet;

    fn nested_loops() -> (Cfg, crate::analysis::NodeArena) {
        Cfg::new(
            "nested",
            &["1", "2", "3", "4", "5", "6", "7", "8"],
            &[
                ("1", "2"),
                ("2", "3"),
                ("3", "4"),
                ("4", "3"),
                ("4", "5"),
                ("5", "6"),
                ("6", "5"),
                ("6", "7"),
                ("7", "2"),
                ("7", "8"),
            ],
        )
    }

    #[test]
    fn build_empty() {
        let (graph, arena) = Cfg::new("empty", &[], &[]);
        assert!(graph.is_empty());
        assert!(graph.entry().is_none());
        assert!(arena.is_empty());
    }

    #[test]
    fn build_and_navigate() {
        let (graph, arena) = nested_loops();
        assert_eq!(graph.len(), 8);
        assert_eq!(graph.entry(), Some(0));
        assert_eq!(arena.name(0), "1");
        assert_eq!(graph.successors(3), &[2, 4]);
        assert_eq!(graph.predecessors(2), &[1, 3]);
        assert_eq!(graph.false_target(3), Some(2));
        assert_eq!(graph.true_target(3), Some(4));
        assert!(graph.true_target(0).is_none());
        assert!(graph.contains(7));
        assert!(!graph.contains(8));
    }

    #[test]
    fn number_nodes_orders() {
        let (graph, mut arena) = nested_loops();
        graph.number_nodes(&mut arena);
        let pre = (0..8).map(|id| arena[id].pre).collect::<Vec<_>>();
        let rev_post = (0..8).map(|id| arena[id].rev_post).collect::<Vec<_>>();
        assert_eq!(pre, vec![0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(rev_post, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn number_nodes_branching() {
        let (graph, mut arena) = Cfg::new(
            "diamond",
            &["c", "t", "f", "m"],
            &[("c", "t"), ("c", "f"), ("t", "m"), ("f", "m")],
        );
        graph.number_nodes(&mut arena);
        // c=0 t=1 f=2 m=3; the walk takes t first, reaching m through it
        assert_eq!(arena[0].pre, 0);
        assert_eq!(arena[1].pre, 1);
        assert_eq!(arena[3].pre, 2);
        assert_eq!(arena[2].pre, 3);
        assert_eq!(arena[0].rev_post, 0);
        assert_eq!(arena[2].rev_post, 1);
        assert_eq!(arena[1].rev_post, 2);
        assert_eq!(arena[3].rev_post, 3);
    }

    #[test]
    fn merge_rewires_edges() {
        let (graph, mut arena) = Cfg::new(
            "merging",
            &["a", "b", "c", "d", "e"],
            &[
                ("a", "b"),
                ("a", "c"),
                ("b", "d"),
                ("c", "d"),
                ("d", "b"),
                ("d", "e"),
            ],
        );
        graph.number_nodes(&mut arena);
        let del = [1, 3].into_iter().collect::<FnvHashSet<_>>(); // b and d
        let (merged, new_id) = graph.merge(&del, "bd", &mut arena);
        assert_eq!(arena.name(new_id), "bd");
        assert_eq!(merged.len(), 4);
        assert!(!merged.contains(1));
        assert!(!merged.contains(3));
        // a keeps its branch slots, with b replaced
        assert_eq!(merged.successors(0), &[new_id, 2]);
        assert_eq!(merged.false_target(0), Some(new_id));
        assert_eq!(merged.true_target(0), Some(2));
        // the internal d->b edge is gone, the exit edge survives
        assert_eq!(merged.successors(new_id), &[4]);
        assert_eq!(merged.predecessors(new_id), &[0, 2]);
        assert_eq!(merged.entry(), Some(0));
    }

    #[test]
    fn merge_replaces_entry() {
        let (graph, mut arena) = Cfg::new("tiny", &["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        graph.number_nodes(&mut arena);
        let del = [0, 1].into_iter().collect::<FnvHashSet<_>>();
        let (merged, new_id) = graph.merge(&del, "ab", &mut arena);
        assert_eq!(merged.entry(), Some(new_id));
        assert_eq!(merged.successors(new_id), &[2]);
    }

    #[test]
    fn merge_deduplicates() {
        let (graph, mut arena) = Cfg::new(
            "dedup",
            &["a", "b", "c", "d"],
            &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
        );
        graph.number_nodes(&mut arena);
        let del = [1, 2].into_iter().collect::<FnvHashSet<_>>();
        let (merged, new_id) = graph.merge(&del, "bc", &mut arena);
        // both branches of a collapse into a single edge
        assert_eq!(merged.successors(0), &[new_id]);
        assert_eq!(merged.successors(new_id), &[3]);
    }

    #[test]
    fn clear_annotations_resets() {
        let (graph, mut arena) = nested_loops();
        graph.number_nodes(&mut arena);
        assert_ne!(arena[3].pre, usize::MAX);
        arena.clear_annotations();
        assert_eq!(arena[3].pre, usize::MAX);
        assert_eq!(arena.name(3), "4");
    }

    #[test]
    fn dot_round_trip() {
        let (graph, arena) = nested_loops();
        let dot = graph.to_dot(&arena);
        let (reparsed, rearena) = Cfg::from_dot(&dot).unwrap();
        assert_eq!(graph, reparsed);
        assert_eq!(arena, rearena);
    }

    #[test]
    fn dot_labels_override_slots() {
        let src = "digraph g {\n\ta -> b [label=\"true\"];\n\ta -> c [label=\"false\"];\n}\n";
        let (graph, arena) = Cfg::from_dot(src).unwrap();
        assert_eq!(arena.name(graph.true_target(0).unwrap()), "b");
        assert_eq!(arena.name(graph.false_target(0).unwrap()), "c");
    }

    #[test]
    fn dot_unnamed_graph() {
        let (graph, _) = Cfg::from_dot("digraph {\n\ta -> b;\n}\n").unwrap();
        assert_eq!(graph.name(), "G");
    }

    #[test]
    fn dot_rejects_non_digraph() {
        let err = Cfg::from_dot("graph g {\n\ta -- b;\n}\n");
        assert!(err.is_err());
    }

    #[test]
    fn dot_rejects_garbage_line() {
        let err = Cfg::from_dot("digraph g {\n\ta -> b\n\t!!!\n}\n");
        assert!(err.is_err());
    }
}
