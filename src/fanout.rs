use core::fmt;

use crate::error::FanoutError;

/// The maximum number of keys a node may hold ("keys per node").
///
/// A non-root node must also hold at least half this many keys (integer
/// division). A node briefly exceeds either bound only while a `set` or
/// `delete` is restructuring the tree.
///
/// # Examples
///
/// ```
/// use bptree_index::Fanout;
///
/// let fanout = Fanout::new(5).unwrap();
/// assert_eq!(fanout.max_keys(), 5);
/// assert_eq!(fanout.min_keys(), 2);
///
/// assert!(Fanout::new(1).is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Fanout(usize);

impl Fanout {
    /// The smallest bound for which a split yields two non-empty halves.
    pub const MIN: usize = 2;

    /// Validates `keys_per_node` as a fan-out bound.
    ///
    /// # Errors
    ///
    /// Returns [`FanoutError::TooSmall`] if `keys_per_node < Fanout::MIN`.
    pub const fn new(keys_per_node: usize) -> Result<Self, FanoutError> {
        if keys_per_node < Self::MIN {
            return Err(FanoutError::TooSmall {
                requested: keys_per_node,
                minimum: Self::MIN,
            });
        }
        Ok(Self(keys_per_node))
    }

    /// Upper bound on keys in any node. A node above it must split.
    #[inline]
    #[must_use]
    pub const fn max_keys(self) -> usize {
        self.0
    }

    /// Lower bound on keys in a non-root node. A node below it must merge.
    #[inline]
    #[must_use]
    pub const fn min_keys(self) -> usize {
        self.0 / 2
    }

    #[inline]
    pub(crate) const fn overflows(self, key_count: usize) -> bool {
        key_count > self.max_keys()
    }

    #[inline]
    pub(crate) const fn underflows(self, key_count: usize) -> bool {
        key_count < self.min_keys()
    }
}

impl TryFrom<usize> for Fanout {
    type Error = FanoutError;

    fn try_from(keys_per_node: usize) -> Result<Self, Self::Error> {
        Self::new(keys_per_node)
    }
}

impl fmt::Display for Fanout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} keys per node", self.0)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use proptest::prelude::*;

    #[test]
    fn bounds_below_two_are_rejected() {
        assert_eq!(Fanout::new(0), Err(FanoutError::TooSmall { requested: 0, minimum: 2 }));
        assert_eq!(Fanout::try_from(1), Err(FanoutError::TooSmall { requested: 1, minimum: 2 }));
        assert!(Fanout::new(2).is_ok());
    }

    #[test]
    fn minimum_uses_integer_division() {
        let three = Fanout::new(3).unwrap();
        assert_eq!(three.min_keys(), 1);
        assert!(three.underflows(0));
        assert!(!three.underflows(1));
        assert!(three.overflows(4));
        assert!(!three.overflows(3));
    }

    #[test]
    fn display() {
        assert_eq!(Fanout::new(16).unwrap().to_string(), "16 keys per node");
    }

    proptest! {
        #[test]
        fn split_of_overflow_satisfies_minimum(keys_per_node in Fanout::MIN..512usize) {
            // Halving an overflowing leaf must leave both halves legal.
            let fanout = Fanout::new(keys_per_node).unwrap();
            let n = fanout.max_keys() + 1;
            prop_assert!(!fanout.underflows(n / 2));
            prop_assert!(!fanout.underflows(n - n / 2));
            prop_assert!(!fanout.overflows(n - n / 2));
        }
    }
}
