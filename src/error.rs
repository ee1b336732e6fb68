use thiserror::Error;

/// Returned when a tree is configured with an unusable fan-out bound.
///
/// # Examples
///
/// ```
/// use bptree_index::{BPTree, FanoutError};
///
/// let err = BPTree::<&str>::try_new(1).unwrap_err();
/// assert_eq!(err, FanoutError::TooSmall { requested: 1, minimum: 2 });
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum FanoutError {
    /// Fewer keys per node than a split can divide between two nodes.
    #[error("fan-out bound must be at least {minimum} keys per node, got {requested}")]
    TooSmall { requested: usize, minimum: usize },
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn message_names_both_bounds() {
        let err = FanoutError::TooSmall { requested: 0, minimum: 2 };
        assert_eq!(err.to_string(), "fan-out bound must be at least 2 keys per node, got 0");
    }
}
