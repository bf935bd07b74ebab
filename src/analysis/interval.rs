use crate::analysis::{Cfg, NodeArena, NodeId};
use fnv::FnvHashSet;

/// The interval I(h) with header node h: the maximal single-entry subgraph
/// in which h is the only entry node and every closed path contains h.
#[derive(Debug, Clone)]
pub struct Interval {
    header: NodeId,
    nodes: FnvHashSet<NodeId>,
}

impl Interval {
    fn new(header: NodeId) -> Interval {
        let mut nodes = FnvHashSet::default();
        nodes.insert(header);
        Interval { header, nodes }
    }

    /// Returns the header node of the interval.
    pub fn header(&self) -> NodeId {
        self.header
    }

    /// Returns true if the node belongs to the interval.
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// Returns the number of nodes in the interval.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the interval only contains its header.
    pub fn is_trivial(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Returns the member set of the interval.
    pub fn node_set(&self) -> &FnvHashSet<NodeId> {
        &self.nodes
    }

    /// Returns the members of the interval sorted by reverse post-order.
    pub fn nodes_by_rev_post(&self, nodes: &NodeArena) -> Vec<NodeId> {
        let mut members = self.nodes.iter().copied().collect::<Vec<_>>();
        members.sort_by_key(|&id| (nodes[id].rev_post, id));
        members
    }

    // true if n has at least one predecessor and all of them are inside the
    // interval. Nodes without predecessors are rejected, otherwise they would
    // end up in every interval.
    fn contains_all_preds(&self, graph: &Cfg, node: NodeId) -> bool {
        let preds = graph.predecessors(node);
        !preds.is_empty() && preds.iter().all(|pred| self.nodes.contains(pred))
    }
}

/// Finds the unique set of intervals of the given control flow graph.
///
/// The entry node always heads the first interval and every node reachable
/// from the entry belongs to exactly one interval. Candidate nodes are
/// examined in reverse post-order, so [Cfg::number_nodes] must have run
/// beforehand for the result to be deterministic.
pub fn intervals(graph: &Cfg, nodes: &NodeArena) -> Vec<Interval> {
    let entry = match graph.entry() {
        Some(entry) => entry,
        None => return Vec::new(),
    };
    let order = graph.nodes_by_rev_post(nodes);
    let mut headers = HeaderQueue::default();
    headers.push(entry);
    let mut found = Vec::new();
    while let Some(header) = headers.pop() {
        let mut interval = Interval::new(header);
        // grow the interval to its fixpoint
        let mut added = true;
        while added {
            added = false;
            for &node in &order {
                if interval.contains(node) {
                    continue;
                }
                if interval.contains_all_preds(graph, node) {
                    interval.nodes.insert(node);
                    added = true;
                }
            }
        }
        // nodes entered from the interval but not absorbed by it head the
        // next intervals
        for &node in &order {
            if headers.seen(node) || interval.contains(node) {
                continue;
            }
            if graph
                .predecessors(node)
                .iter()
                .any(|pred| interval.contains(*pred))
            {
                headers.push(node);
            }
        }
        found.push(interval);
    }
    found
}

// FIFO queue of header candidates which remembers every node ever enqueued.
#[derive(Default)]
struct HeaderQueue {
    list: Vec<NodeId>,
    next: usize,
    seen: FnvHashSet<NodeId>,
}

impl HeaderQueue {
    fn push(&mut self, node: NodeId) {
        if self.seen.insert(node) {
            self.list.push(node);
        }
    }

    fn seen(&self, node: NodeId) -> bool {
        self.seen.contains(&node)
    }

    fn pop(&mut self) -> Option<NodeId> {
        let node = self.list.get(self.next).copied();
        self.next += 1;
        node
    }
}
