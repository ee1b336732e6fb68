use core::iter::FusedIterator;

use smallvec::SmallVec;
use tracing::trace;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{InternalNode, LeafNode, Node};
use crate::{Fanout, Key};

/// The core B+Tree implementation backing `BPTree`.
pub(crate) struct RawBPTree<V> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<V>>,
    /// Handle to the root node. An empty tree has an empty leaf root.
    root: Handle,
    fanout: Fanout,
    /// Total number of key-value pairs in the tree.
    len: usize,
}

/// Path element for tracking traversal during mutations.
struct PathElement {
    /// Handle to the internal node at this level.
    node: Handle,
    /// Index of the child we descended into.
    child_index: usize,
}

/// Ancestors of the current node, root first.
type Path = SmallVec<[PathElement; 16]>;

/// The two halves of a split node and the key promoted to their parent.
struct Split {
    promoted: Key,
    left: Handle,
    right: Handle,
}

/// Walks entries in key order along the leaf chain.
pub(crate) struct LeafChain<'a, V> {
    nodes: &'a Arena<Node<V>>,
    leaf: Option<Handle>,
    index: usize,
}

impl<'a, V> Iterator for LeafChain<'a, V> {
    type Item = (Key, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf = self.nodes.get(self.leaf?).as_leaf();
            if let (Some(&key), Some(value)) = (leaf.keys().get(self.index), leaf.values().get(self.index)) {
                self.index += 1;
                return Some((key, value));
            }
            self.leaf = leaf.next();
            self.index = 0;
        }
    }
}

impl<V> FusedIterator for LeafChain<'_, V> {}

impl<V> RawBPTree<V> {
    /// Creates a tree whose root is an empty leaf.
    pub(crate) fn new(fanout: Fanout) -> Self {
        let mut nodes = Arena::new();
        let root = nodes.alloc(Node::Leaf(LeafNode::new()));
        Self {
            nodes,
            root,
            fanout,
            len: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn fanout(&self) -> Fanout {
        self.fanout
    }

    pub(crate) const fn root(&self) -> Handle {
        self.root
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<V> {
        self.nodes.get(handle)
    }

    /// Number of levels, counting the leaf level.
    pub(crate) fn height(&self) -> usize {
        let mut height = 1;
        let mut current = self.root;
        while let Node::Internal(internal) = self.nodes.get(current) {
            current = internal.child(0);
            height += 1;
        }
        height
    }

    /// Drops every entry and starts over from an empty leaf root.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = self.nodes.alloc(Node::Leaf(LeafNode::new()));
        self.len = 0;
    }

    /// Descends to the leaf whose range contains `key`.
    fn find_leaf(&self, key: Key) -> Handle {
        let mut current = self.root;
        while let Node::Internal(internal) = self.nodes.get(current) {
            current = internal.child(internal.child_index(key));
        }
        current
    }

    fn leftmost_leaf(&self) -> Handle {
        let mut current = self.root;
        while let Node::Internal(internal) = self.nodes.get(current) {
            current = internal.child(0);
        }
        current
    }

    /// Descends like `find_leaf`, recording every internal node visited.
    fn descend(&self, key: Key) -> (Handle, Path) {
        let mut path = Path::new();
        let mut current = self.root;
        while let Node::Internal(internal) = self.nodes.get(current) {
            let child_index = internal.child_index(key);
            path.push(PathElement {
                node: current,
                child_index,
            });
            current = internal.child(child_index);
        }
        (current, path)
    }

    pub(crate) fn get(&self, key: Key) -> Option<&V> {
        self.nodes.get(self.find_leaf(key)).as_leaf().get(key)
    }

    pub(crate) fn get_mut(&mut self, key: Key) -> Option<&mut V> {
        let leaf = self.find_leaf(key);
        self.nodes.get_mut(leaf).as_leaf_mut().get_mut(key)
    }

    /// Entries with keys `>= start`, in key order.
    pub(crate) fn chain_from(&self, start: Key) -> LeafChain<'_, V> {
        let leaf = self.find_leaf(start);
        let index = self.nodes.get(leaf).as_leaf().keys().partition_point(|&key| key < start);
        LeafChain {
            nodes: &self.nodes,
            leaf: Some(leaf),
            index,
        }
    }

    /// All entries, in key order.
    pub(crate) fn chain(&self) -> LeafChain<'_, V> {
        LeafChain {
            nodes: &self.nodes,
            leaf: Some(self.leftmost_leaf()),
            index: 0,
        }
    }

    /// Inserts or overwrites. Returns the previous value if `key` was present.
    pub(crate) fn set(&mut self, key: Key, value: V) -> Option<V> {
        let (leaf_handle, mut path) = self.descend(key);
        let leaf = self.nodes.get_mut(leaf_handle).as_leaf_mut();
        if let Some(previous) = leaf.insert(key, value) {
            return Some(previous);
        }
        self.len += 1;
        if !self.fanout.overflows(leaf.key_count()) {
            return None;
        }

        // Absorb splits upward until some ancestor has room.
        let mut split = self.split_node(leaf_handle);
        while let Some(PathElement { node, child_index }) = path.pop() {
            let parent = self.nodes.get_mut(node).as_internal_mut();
            parent.insert_split(child_index, split.promoted, split.left, split.right);
            if !self.fanout.overflows(parent.key_count()) {
                return None;
            }
            split = self.split_node(node);
        }

        self.grow_root(split);
        None
    }

    /// Removes `key`. Returns its value, or `None` (leaving the tree untouched)
    /// if it was absent.
    pub(crate) fn delete(&mut self, key: Key) -> Option<V> {
        let (leaf_handle, mut path) = self.descend(key);

        // The deepest ancestor holding `key` as a separator.
        let holder = path
            .iter()
            .rev()
            .map(|element| element.node)
            .find(|&node| self.nodes.get(node).as_internal().key_index(key).is_some());

        let leaf = self.nodes.get_mut(leaf_handle).as_leaf_mut();
        let (value, replacement) = leaf.remove(key)?;
        self.len -= 1;

        if self.fanout.underflows(leaf.key_count()) {
            // The merge reshapes the separators; a stale copy of `key` still
            // partitions correctly.
            self.merge_upward(&mut path);
            return Some(value);
        }

        if let (Some(holder), Some(replacement)) = (holder, replacement) {
            let holder = self.nodes.get_mut(holder).as_internal_mut();
            if let Some(index) = holder.key_index(key) {
                holder.set_key(index, replacement);
            }
        }
        Some(value)
    }

    /// Repairs an underflowing child of each ancestor on `path`, bottom up,
    /// stopping at the first ancestor that is itself within bounds.
    fn merge_upward(&mut self, path: &mut Path) {
        while let Some(PathElement { node, child_index }) = path.pop() {
            let parent = self.nodes.get(node).as_internal();
            debug_assert!(parent.key_count() > 0, "an ancestor on the path has at least two children");

            // Merge with the right sibling; the last child has none, so it
            // merges into its left sibling instead.
            let index = if child_index == parent.child_count() - 1 {
                child_index - 1
            } else {
                child_index
            };
            let left = parent.child(index);
            let right = parent.child(index + 1);
            let separator = parent.key(index);

            let merged = self.merge_nodes(left, separator, right);
            if self.fanout.overflows(self.nodes.get(merged).key_count()) {
                let split = self.split_node(merged);
                trace!(promoted = split.promoted, "re-split merged node");
                self.nodes.get_mut(node).as_internal_mut().replace_pair_split(
                    index,
                    split.promoted,
                    split.left,
                    split.right,
                );
            } else {
                self.nodes.get_mut(node).as_internal_mut().replace_pair(index, merged);
            }

            if !self.fanout.underflows(self.nodes.get(node).key_count()) {
                break;
            }
        }

        self.shrink_root();
    }

    /// Replaces an overflowing node with two fresh halves.
    fn split_node(&mut self, handle: Handle) -> Split {
        match self.nodes.take(handle) {
            Node::Leaf(leaf) => {
                let (prev, next) = (leaf.prev(), leaf.next());
                let (promoted, left, right) = leaf.split();
                let left = self.nodes.alloc(Node::Leaf(left));
                let right = self.nodes.alloc(Node::Leaf(right));
                self.link(prev, Some(left));
                self.link(Some(left), Some(right));
                self.link(Some(right), next);
                trace!(promoted, ?left, ?right, "split leaf");
                Split { promoted, left, right }
            }
            Node::Internal(internal) => {
                let (promoted, left, right) = internal.split();
                let left = self.nodes.alloc(Node::Internal(left));
                let right = self.nodes.alloc(Node::Internal(right));
                trace!(promoted, ?left, ?right, "split internal node");
                Split { promoted, left, right }
            }
        }
    }

    /// Replaces two adjacent siblings with one fresh node holding both.
    fn merge_nodes(&mut self, left: Handle, separator: Key, right: Handle) -> Handle {
        let merged = match (self.nodes.take(left), self.nodes.take(right)) {
            (Node::Leaf(left), Node::Leaf(right)) => {
                let (prev, next) = (left.prev(), right.next());
                let merged = self.nodes.alloc(Node::Leaf(left.merge_right(right)));
                self.link(prev, Some(merged));
                self.link(Some(merged), next);
                merged
            }
            (Node::Internal(left), Node::Internal(right)) => {
                self.nodes.alloc(Node::Internal(left.merge_right(separator, right)))
            }
            _ => unreachable!("siblings always sit at the same depth"),
        };
        trace!(?left, ?right, ?merged, "merged siblings");
        merged
    }

    /// Points `left.next` at `right` and `right.prev` at `left`.
    fn link(&mut self, left: Option<Handle>, right: Option<Handle>) {
        if let Some(left) = left {
            self.nodes.get_mut(left).as_leaf_mut().set_next(right);
        }
        if let Some(right) = right {
            self.nodes.get_mut(right).as_leaf_mut().set_prev(left);
        }
    }

    /// The root split: the tree gains a level.
    fn grow_root(&mut self, split: Split) {
        let root = InternalNode::from_parts(&[split.promoted], &[split.left, split.right]);
        self.root = self.nodes.alloc(Node::Internal(root));
        trace!(root = ?self.root, promoted = split.promoted, "grew root");
    }

    /// A keyless internal root hands over to its only child: the tree loses a level.
    fn shrink_root(&mut self) {
        if let Node::Internal(root) = self.nodes.get(self.root)
            && root.key_count() == 0
        {
            let child = root.child(0);
            self.nodes.take(self.root);
            self.root = child;
            trace!(root = ?self.root, "shrank root");
        }
    }
}
