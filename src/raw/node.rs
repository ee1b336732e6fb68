use smallvec::SmallVec;

use super::handle::Handle;
use crate::Key;

// Nodes up to this many keys (plus the one overflow slot) stay inline.
pub(crate) const INLINE_KEYS: usize = 16;

type Keys = SmallVec<[Key; INLINE_KEYS + 1]>;
type Children = SmallVec<[Handle; INLINE_KEYS + 2]>;
type Values<V> = SmallVec<[V; INLINE_KEYS + 1]>;

pub(crate) enum Node<V> {
    Internal(InternalNode),
    Leaf(LeafNode<V>),
}

// B+Tree: Internal nodes store separator keys and child handles.
pub(crate) struct InternalNode {
    // children[i] holds keys in [keys[i - 1], keys[i]).
    keys: Keys,
    children: Children,
}

// B+Tree: Leaf nodes store the entries and the lateral links of the leaf chain.
pub(crate) struct LeafNode<V> {
    prev: Option<Handle>,
    next: Option<Handle>,
    keys: Keys,
    values: Values<V>,
}

impl<V> Node<V> {
    /// Returns the number of keys in this node.
    pub(crate) fn key_count(&self) -> usize {
        match self {
            Node::Internal(internal) => internal.key_count(),
            Node::Leaf(leaf) => leaf.key_count(),
        }
    }

    /// Returns the leaf node, panicking if this is not a leaf.
    pub(crate) fn as_leaf(&self) -> &LeafNode<V> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the leaf node mutably, panicking if this is not a leaf.
    pub(crate) fn as_leaf_mut(&mut self) -> &mut LeafNode<V> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the internal node, panicking if this is not internal.
    pub(crate) fn as_internal(&self) -> &InternalNode {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    /// Returns the internal node mutably, panicking if this is not internal.
    pub(crate) fn as_internal_mut(&mut self) -> &mut InternalNode {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    /// Returns the keys of either node kind.
    pub(crate) fn keys(&self) -> &[Key] {
        match self {
            Node::Internal(internal) => internal.keys(),
            Node::Leaf(leaf) => leaf.keys(),
        }
    }
}

impl InternalNode {
    /// Builds a node from separator keys and one more child than keys.
    pub(crate) fn from_parts(keys: &[Key], children: &[Handle]) -> Self {
        debug_assert_eq!(children.len(), keys.len() + 1, "an internal node needs keys + 1 children");
        Self {
            keys: SmallVec::from_slice(keys),
            children: SmallVec::from_slice(children),
        }
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> Key {
        self.keys[index]
    }

    pub(crate) fn keys(&self) -> &[Key] {
        &self.keys
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    pub(crate) fn children(&self) -> &[Handle] {
        &self.children
    }

    /// Index of the child whose range can contain `key`: the number of
    /// separators `<= key`.
    #[inline]
    pub(crate) fn child_index(&self, key: Key) -> usize {
        self.keys.partition_point(|&separator| separator <= key)
    }

    /// Position of `key` among the separators, if it is one verbatim.
    pub(crate) fn key_index(&self, key: Key) -> Option<usize> {
        self.keys.binary_search(&key).ok()
    }

    /// Overwrites the separator at `index`.
    pub(crate) fn set_key(&mut self, index: usize, key: Key) {
        self.keys[index] = key;
    }

    /// Absorbs a split child: `children[index]` becomes `left, right` and
    /// `separator` is inserted between them.
    pub(crate) fn insert_split(&mut self, index: usize, separator: Key, left: Handle, right: Handle) {
        self.keys.insert(index, separator);
        self.children[index] = left;
        self.children.insert(index + 1, right);
    }

    /// Replaces `children[index]`, `children[index + 1]` and the separator
    /// between them with a single merged child.
    pub(crate) fn replace_pair(&mut self, index: usize, merged: Handle) {
        self.keys.remove(index);
        self.children.remove(index + 1);
        self.children[index] = merged;
    }

    /// Replaces `children[index]`, `children[index + 1]` and the separator
    /// between them with a re-split pair.
    pub(crate) fn replace_pair_split(&mut self, index: usize, separator: Key, left: Handle, right: Handle) {
        self.keys[index] = separator;
        self.children[index] = left;
        self.children[index + 1] = right;
    }

    /// Splits at `m / 2`. The middle key moves up and is in neither half.
    /// Returns (`promoted`, `left`, `right`).
    pub(crate) fn split(self) -> (Key, InternalNode, InternalNode) {
        let mid = self.keys.len() / 2;
        let left = InternalNode::from_parts(&self.keys[..mid], &self.children[..=mid]);
        let right = InternalNode::from_parts(&self.keys[mid + 1..], &self.children[mid + 1..]);
        (self.keys[mid], left, right)
    }

    /// Concatenates with the right sibling, pulling down the separator that
    /// sat between the two in the parent.
    pub(crate) fn merge_right(self, separator: Key, right: InternalNode) -> InternalNode {
        let mut keys = self.keys;
        keys.push(separator);
        keys.extend_from_slice(&right.keys);
        let mut children = self.children;
        children.extend_from_slice(&right.children);
        InternalNode { keys, children }
    }
}

impl<V> LeafNode<V> {
    pub(crate) fn new() -> Self {
        Self {
            prev: None,
            next: None,
            keys: SmallVec::new(),
            values: SmallVec::new(),
        }
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn prev(&self) -> Option<Handle> {
        self.prev
    }

    pub(crate) fn set_prev(&mut self, prev: Option<Handle>) {
        self.prev = prev;
    }

    pub(crate) fn next(&self) -> Option<Handle> {
        self.next
    }

    pub(crate) fn set_next(&mut self, next: Option<Handle>) {
        self.next = next;
    }

    pub(crate) fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub(crate) fn values(&self) -> &[V] {
        &self.values
    }

    pub(crate) fn get(&self, key: Key) -> Option<&V> {
        let index = self.keys.binary_search(&key).ok()?;
        Some(&self.values[index])
    }

    pub(crate) fn get_mut(&mut self, key: Key) -> Option<&mut V> {
        let index = self.keys.binary_search(&key).ok()?;
        Some(&mut self.values[index])
    }

    /// Inserts at the sorted position, or overwrites in place and returns the
    /// previous value if `key` is already present.
    pub(crate) fn insert(&mut self, key: Key, value: V) -> Option<V> {
        match self.keys.binary_search(&key) {
            Ok(index) => Some(core::mem::replace(&mut self.values[index], value)),
            Err(index) => {
                self.keys.insert(index, key);
                self.values.insert(index, value);
                None
            }
        }
    }

    /// Removes `key`, returning its value and the key that now stands in its
    /// place: the one at the same index, or the one before it if the last key
    /// was removed. The replacement is `None` once the leaf is empty.
    pub(crate) fn remove(&mut self, key: Key) -> Option<(V, Option<Key>)> {
        let index = self.keys.binary_search(&key).ok()?;
        self.keys.remove(index);
        let value = self.values.remove(index);
        let replacement = match self.keys.get(index) {
            Some(&next) => Some(next),
            None => index.checked_sub(1).map(|before| self.keys[before]),
        };
        Some((value, replacement))
    }

    /// Splits at `n / 2`. The right half's first key is promoted and stays in
    /// the right half. Returns (`promoted`, `left`, `right`).
    ///
    /// The halves inherit the outer links (`left.prev`, `right.next`); the
    /// caller links them to each other once they have handles.
    pub(crate) fn split(self) -> (Key, LeafNode<V>, LeafNode<V>) {
        let mid = self.keys.len() / 2;
        let mut left_keys = self.keys;
        let right_keys: Keys = left_keys.drain(mid..).collect();
        let mut left_values = self.values;
        let right_values: Values<V> = left_values.drain(mid..).collect();

        let promoted = right_keys[0];
        let left = LeafNode {
            prev: self.prev,
            next: None,
            keys: left_keys,
            values: left_values,
        };
        let right = LeafNode {
            prev: None,
            next: self.next,
            keys: right_keys,
            values: right_values,
        };
        (promoted, left, right)
    }

    /// Concatenates with the right sibling. The result takes `self.prev` and
    /// `right.next` as its outer links.
    pub(crate) fn merge_right(self, right: LeafNode<V>) -> LeafNode<V> {
        debug_assert!(
            !matches!((self.keys.last(), right.keys.first()), (Some(l), Some(r)) if l >= r),
            "right sibling keys must all be greater"
        );
        let mut keys = self.keys;
        keys.extend_from_slice(&right.keys);
        let mut values = self.values;
        values.extend(right.values);
        LeafNode {
            prev: self.prev,
            next: right.next,
            keys,
            values,
        }
    }
}
