use fnv::FnvHashMap;
use std::collections::HashSet;
use std::hash::Hash;

/// A trait used to represent a generic rooted directed graph.
///
/// Nodes are identified by a cheap copyable handle (an index or a small id).
/// After implementing the methods returning the root, the successors of a
/// node and the graph len, several visits are available on the graph.
pub trait Graph {
    /// Type of the node handles contained in the graph.
    type Item: Hash + Eq + Ord + Copy;

    /// Returns the starting node of the graph.
    ///
    /// Returns None if the graph is empty. Every visit starts from this node,
    /// so nodes not reachable from it are never yielded.
    fn root(&self) -> Option<Self::Item>;

    /// Given a node, returns its successors, in a stable order.
    fn successors(&self, node: Self::Item) -> &[Self::Item];

    /// Returns the size of the graph in number of nodes.
    fn len(&self) -> usize;

    /// Returns true if the graph has no nodes, false otherwise.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visits the graph nodes using a depth-first search in pre-order.
    ///
    /// Returns an iterator yielding every node reachable from [Graph::root()]
    /// using a depth-first pre-order. The visit is iterative.
    fn dfs_preorder(&self) -> DfsPreIter<'_, Self>
    where
        Self: Sized,
    {
        let mut stack = Vec::with_capacity(self.len());
        let mut marked = HashSet::with_capacity(self.len());
        if let Some(root) = self.root() {
            stack.push(root);
            marked.insert(root);
        }
        DfsPreIter {
            stack,
            marked,
            graph: self,
        }
    }

    /// Visits the graph nodes using a depth-first search in post-order.
    ///
    /// Returns an iterator yielding every node reachable from [Graph::root()]
    /// using a depth-first post-order. The visit is iterative.
    fn dfs_postorder(&self) -> DfsPostIter<'_, Self>
    where
        Self: Sized,
    {
        let mut stack = Vec::with_capacity(self.len());
        let mut marked = HashSet::with_capacity(self.len());
        if let Some(root) = self.root() {
            stack.push((root, 0));
            marked.insert(root);
        }
        DfsPostIter {
            stack,
            marked,
            graph: self,
        }
    }

    /// Calculates the immediate dominator tree of the current graph.
    ///
    /// Node `d` dominates `n` if every path from the root to `n` passes
    /// through `d`; the immediate dominator is the closest strict dominator.
    /// Only nodes reachable from [Graph::root()] appear in the tree.
    ///
    /// This method uses the iterative data-flow formulation of Cooper, Harvey
    /// and Kennedy over the reverse post-order of the graph.
    fn dominators(&self) -> DomTree<Self::Item>
    where
        Self: Sized,
    {
        let root = match self.root() {
            Some(root) => root,
            None => return DomTree::default(),
        };
        let post = self.dfs_postorder().collect::<Vec<_>>();
        let index = post
            .iter()
            .enumerate()
            .map(|(i, &n)| (n, i))
            .collect::<FnvHashMap<_, _>>();
        let len = post.len();
        let mut preds = vec![Vec::new(); len];
        for &node in &post {
            let from = index[&node];
            for succ in self.successors(node) {
                if let Some(&to) = index.get(succ) {
                    preds[to].push(from);
                }
            }
        }
        let root_id = index[&root];
        let mut idom = vec![usize::MAX; len];
        idom[root_id] = root_id;
        let mut changed = true;
        while changed {
            changed = false;
            // higher post-order index = earlier in reverse post-order
            for id in (0..len).rev() {
                if id == root_id {
                    continue;
                }
                let mut new_idom = usize::MAX;
                for &pred in &preds[id] {
                    if idom[pred] == usize::MAX {
                        continue;
                    }
                    new_idom = if new_idom == usize::MAX {
                        pred
                    } else {
                        intersect(&idom, new_idom, pred)
                    };
                }
                if new_idom != usize::MAX && idom[id] != new_idom {
                    idom[id] = new_idom;
                    changed = true;
                }
            }
        }
        let mut tree = DomTree::default();
        for id in (0..len).rev() {
            if id == root_id || idom[id] == usize::MAX {
                continue;
            }
            let node = post[id];
            let dominator = post[idom[id]];
            tree.idom.insert(node, dominator);
            tree.children.entry(dominator).or_default().push(node);
        }
        tree
    }
}

// walks the two fingers up the dominator forest until they meet
fn intersect(idom: &[usize], a: usize, b: usize) -> usize {
    let mut finger1 = a;
    let mut finger2 = b;
    while finger1 != finger2 {
        while finger1 < finger2 {
            finger1 = idom[finger1];
        }
        while finger2 < finger1 {
            finger2 = idom[finger2];
        }
    }
    finger1
}

/// Immediate dominator tree of a rooted graph.
///
/// This tree is created by [Graph::dominators].
#[derive(Debug, Clone)]
pub struct DomTree<T> {
    idom: FnvHashMap<T, T>,
    children: FnvHashMap<T, Vec<T>>,
}

impl<T> Default for DomTree<T> {
    fn default() -> Self {
        DomTree {
            idom: FnvHashMap::default(),
            children: FnvHashMap::default(),
        }
    }
}

impl<T: Hash + Eq + Copy> DomTree<T> {
    /// Returns the immediate dominator of the given node.
    ///
    /// Returns None for the root and for nodes outside the tree.
    pub fn idom(&self, node: T) -> Option<T> {
        self.idom.get(&node).copied()
    }

    /// Returns the nodes immediately dominated by the given node.
    pub fn dominated_by(&self, node: T) -> &[T] {
        self.children.get(&node).map_or(&[], |c| c.as_slice())
    }

    /// Returns true if `dominator` dominates `node`.
    ///
    /// Every node dominates itself.
    pub fn dominates(&self, dominator: T, node: T) -> bool {
        let mut current = node;
        loop {
            if current == dominator {
                return true;
            }
            match self.idom(current) {
                Some(up) => current = up,
                None => return false,
            }
        }
    }
}

/// An iterator that performs a pre-order depth-first visit of a graph.
///
/// This iterator is created from [Graph::dfs_preorder].
pub struct DfsPreIter<'a, G: Graph> {
    stack: Vec<G::Item>,
    marked: HashSet<G::Item>,
    graph: &'a G,
}

impl<'a, G: Graph> Iterator for DfsPreIter<'a, G> {
    type Item = G::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        for &succ in self.graph.successors(current).iter().rev() {
            if self.marked.insert(succ) {
                self.stack.push(succ);
            }
        }
        Some(current)
    }
}

/// An iterator that performs a post-order depth-first visit of a graph.
///
/// This iterator is created from [Graph::dfs_postorder].
pub struct DfsPostIter<'a, G: Graph> {
    // (node, index of the next successor to expand)
    stack: Vec<(G::Item, usize)>,
    marked: HashSet<G::Item>,
    graph: &'a G,
}

impl<'a, G: Graph> Iterator for DfsPostIter<'a, G> {
    type Item = G::Item;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, visited)) = self.stack.last_mut() {
            let node = *node;
            let succs = self.graph.successors(node);
            if *visited < succs.len() {
                let succ = succs[*visited];
                *visited += 1;
                if self.marked.insert(succ) {
                    self.stack.push((succ, 0));
                }
            } else {
                self.stack.pop();
                return Some(node);
            }
        }
        None
    }
}
