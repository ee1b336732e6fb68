use alloc::vec::Vec;
use core::fmt;

use crate::error::FanoutError;
use crate::fanout::Fanout;
use crate::raw::{Node, RawBPTree};
use crate::Key;

/// An in-memory B+tree mapping integer keys to values.
///
/// Every entry lives in a leaf. Internal nodes hold only separator keys, which
/// are copies of keys drawn from the leaf level, and route each lookup to the
/// one leaf that can contain it. Leaves are threaded into a doubly-linked chain
/// in key order, so range scans walk sideways instead of re-descending.
///
/// Each node holds at most [`Fanout::max_keys`] keys and, unless it is the root,
/// at least [`Fanout::min_keys`]. `set` splits nodes that overflow and `delete`
/// merges nodes that underflow, all the way up to the root if necessary.
///
/// The tree has no internal synchronization: share it between threads behind a
/// lock.
///
/// # Examples
///
/// ```
/// use bptree_index::BPTree;
///
/// let mut index = BPTree::new(4);
/// index.set(7, "seven");
/// index.set(3, "three");
/// index.set(5, "five");
///
/// assert_eq!(index.get(5), Some(&"five"));
/// assert_eq!(index.get(6), None);
///
/// // Overwriting keeps a single entry per key.
/// assert_eq!(index.set(7, "SEVEN"), Some("seven"));
/// assert_eq!(index.len(), 3);
///
/// // Scans are inclusive of both bounds and ordered by key.
/// assert_eq!(index.scan(3, 5), [&"three", &"five"]);
/// assert_eq!(index.scan_all(), [&"three", &"five", &"SEVEN"]);
///
/// index.delete(3);
/// assert_eq!(index.scan_all(), [&"five", &"SEVEN"]);
/// ```
pub struct BPTree<V> {
    raw: RawBPTree<V>,
}

impl<V> BPTree<V> {
    /// Creates an empty tree whose nodes hold at most `keys_per_node` keys.
    ///
    /// # Panics
    ///
    /// Panics if `keys_per_node < 2`. Use [`BPTree::try_new`] to handle the
    /// error instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree_index::BPTree;
    ///
    /// let index: BPTree<u64> = BPTree::new(16);
    /// assert!(index.is_empty());
    /// assert_eq!(index.fanout().max_keys(), 16);
    /// ```
    #[must_use]
    pub fn new(keys_per_node: usize) -> Self {
        match Fanout::new(keys_per_node) {
            Ok(fanout) => Self::with_fanout(fanout),
            Err(err) => panic!("`BPTree::new()` - {err}"),
        }
    }

    /// Creates an empty tree, rejecting an unusable fan-out bound.
    ///
    /// # Errors
    ///
    /// Returns [`FanoutError::TooSmall`] if `keys_per_node < 2`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree_index::BPTree;
    ///
    /// assert!(BPTree::<()>::try_new(3).is_ok());
    /// assert!(BPTree::<()>::try_new(1).is_err());
    /// ```
    pub fn try_new(keys_per_node: usize) -> Result<Self, FanoutError> {
        Fanout::new(keys_per_node).map(Self::with_fanout)
    }

    /// Creates an empty tree from an already validated bound.
    #[must_use]
    pub fn with_fanout(fanout: Fanout) -> Self {
        BPTree {
            raw: RawBPTree::new(fanout),
        }
    }

    /// Returns the fan-out bound the tree was created with.
    #[must_use]
    pub fn fanout(&self) -> Fanout {
        self.raw.fanout()
    }

    /// Returns the number of entries in the tree.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    /// Returns the number of levels in the tree. A tree whose root is a leaf,
    /// including an empty tree, has height 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree_index::BPTree;
    ///
    /// let mut index = BPTree::new(2);
    /// index.extend([(1, ()), (2, ())]);
    /// assert_eq!(index.height(), 1);
    /// index.set(3, ());
    /// assert_eq!(index.height(), 2);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Removes every entry. The fan-out bound is kept.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the value stored under `key`.
    ///
    /// # Complexity
    ///
    /// O(log n) descent plus a search of one leaf.
    #[must_use]
    pub fn get(&self, key: Key) -> Option<&V> {
        self.raw.get(key)
    }

    /// Returns a mutable reference to the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree_index::BPTree;
    ///
    /// let mut index = BPTree::new(4);
    /// index.set(1, 10);
    /// if let Some(value) = index.get_mut(1) {
    ///     *value += 1;
    /// }
    /// assert_eq!(index.get(1), Some(&11));
    /// ```
    pub fn get_mut(&mut self, key: Key) -> Option<&mut V> {
        self.raw.get_mut(key)
    }

    /// Returns `true` if the tree holds an entry for `key`.
    #[must_use]
    pub fn contains_key(&self, key: Key) -> bool {
        self.raw.get(key).is_some()
    }

    /// Maps `key` to `value`, overwriting in place if `key` is present.
    ///
    /// Returns the previous value, if any. A new key may overflow its leaf,
    /// splitting it and possibly every ancestor up to the root.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree_index::BPTree;
    ///
    /// let mut index = BPTree::new(3);
    /// assert_eq!(index.set(37, "a"), None);
    /// assert_eq!(index.set(37, "b"), Some("a"));
    /// assert_eq!(index.get(37), Some(&"b"));
    /// ```
    pub fn set(&mut self, key: Key, value: V) -> Option<V> {
        self.raw.set(key, value)
    }

    /// Removes the entry for `key`, returning its value. Deleting an absent key
    /// is a no-op that returns `None`.
    ///
    /// A removal may underflow the leaf, merging it with a sibling and possibly
    /// cascading up to the root.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree_index::BPTree;
    ///
    /// let mut index = BPTree::new(3);
    /// index.set(1, "a");
    /// assert_eq!(index.delete(1), Some("a"));
    /// assert_eq!(index.delete(1), None);
    /// assert_eq!(index.get(1), None);
    /// ```
    pub fn delete(&mut self, key: Key) -> Option<V> {
        self.raw.delete(key)
    }

    /// Returns the values whose keys lie in `start..=end`, in key order.
    ///
    /// Empty if no key matches, including when `start > end`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree_index::BPTree;
    ///
    /// let mut index = BPTree::new(3);
    /// index.extend((0..10).map(|key| (key, key * 10)));
    ///
    /// assert_eq!(index.scan(2, 4), [&20, &30, &40]);
    /// assert_eq!(index.scan(8, 100), [&80, &90]);
    /// assert!(index.scan(5, 4).is_empty());
    /// ```
    #[must_use]
    pub fn scan(&self, start: Key, end: Key) -> Vec<&V> {
        self.raw
            .chain_from(start)
            .take_while(|&(key, _)| key <= end)
            .map(|(_, value)| value)
            .collect()
    }

    /// Like [`BPTree::scan`], but keeps each key alongside its value.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree_index::BPTree;
    ///
    /// let mut index = BPTree::new(3);
    /// index.extend([(4, 'd'), (1, 'a'), (9, 'i')]);
    /// assert_eq!(index.scan_entries(0, 5), [(1, &'a'), (4, &'d')]);
    /// ```
    #[must_use]
    pub fn scan_entries(&self, start: Key, end: Key) -> Vec<(Key, &V)> {
        self.raw.chain_from(start).take_while(|&(key, _)| key <= end).collect()
    }

    /// Returns every value, in key order.
    ///
    /// # Complexity
    ///
    /// O(n), walking the leaf chain from the leftmost leaf.
    #[must_use]
    pub fn scan_all(&self) -> Vec<&V> {
        self.raw.chain().map(|(_, value)| value).collect()
    }
}

impl<V> Extend<(Key, V)> for BPTree<V> {
    fn extend<I: IntoIterator<Item = (Key, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for BPTree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.raw.chain()).finish()
    }
}

/// Renders the tree one level per line, root first. Each node shows its keys
/// in brackets; nodes on the same level are separated by tabs.
///
/// ```
/// use bptree_index::BPTree;
///
/// let mut index = BPTree::new(2);
/// index.extend([(1, ()), (2, ()), (3, ())]);
/// assert_eq!(index.to_string(), "[2]\n[1]\t[2 3]");
/// ```
impl<V> fmt::Display for BPTree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut level = alloc::vec![self.raw.root()];
        let mut depth = 0;
        while !level.is_empty() {
            if depth > 0 {
                f.write_str("\n")?;
            }
            let mut below = Vec::new();
            for (i, &handle) in level.iter().enumerate() {
                if i > 0 {
                    f.write_str("\t")?;
                }
                let node = self.raw.node(handle);
                f.write_str("[")?;
                for (j, key) in node.keys().iter().enumerate() {
                    if j > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{key}")?;
                }
                f.write_str("]")?;
                if let Node::Internal(internal) = node {
                    below.extend_from_slice(internal.children());
                }
            }
            level = below;
            depth += 1;
        }
        Ok(())
    }
}
