//! An in-memory B+tree index over integer keys.
//!
//! This crate provides [`BPTree`], the ordered indexing primitive beneath a
//! storage engine: a sorted associative container from [`Key`] to any value
//! type, with logarithmic point operations and cheap ordered range scans.
//!
//! # Example
//!
//! ```
//! use bptree_index::BPTree;
//!
//! let letters: Vec<char> = ('a'..='z').chain('A'..='Z').collect();
//!
//! let mut index = BPTree::new(5);
//! for (key, &letter) in (0..).zip(&letters) {
//!     index.set(key, letter);
//! }
//!
//! let all: Vec<char> = index.scan_all().into_iter().copied().collect();
//! assert_eq!(all, letters);
//! assert_eq!(index.scan(2, 5), [&'c', &'d', &'e', &'f']);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`
//! - **Configurable fan-out** - Any bound of two or more keys per node, fixed at construction
//! - **Linked leaves** - Range scans walk a doubly-linked leaf chain rather than re-descending
//!
//! # Implementation
//!
//! Nodes live in an arena and refer to one another by index, so the parent to
//! child hierarchy and the lateral leaf links never form owning cycles.
//! Mutations record the path of internal nodes they descend through and walk it
//! back up to split overflowing nodes or merge underflowing ones. Split and
//! merge build fresh nodes from the ones they replace.
//!
//! Structural changes are reported as `tracing` events at `TRACE` level.

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod fanout;
mod raw;

pub mod bptree;

pub use bptree::BPTree;
pub use error::FanoutError;
pub use fanout::Fanout;

/// The key domain of the index: totally ordered signed integers.
pub type Key = i64;
