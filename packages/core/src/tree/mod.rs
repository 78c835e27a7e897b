//! Tree Projections and Editing
//!
//! - [`grouping`] - display-only projections (by category, alphabetic, by popularity)
//! - [`lookup`] - key-based search and in-place visibility mutation
//!
//! Projections always return fresh clones and never write back into their
//! input. Lookup failures are reported through `Option`/`bool`, never errors.

pub mod grouping;
pub mod lookup;

pub use grouping::{
    category_group_key, group_by_alpha, group_by_category, group_by_popular,
    CATEGORY_GROUP_KEY_PREFIX, UNCATEGORIZED,
};
pub use lookup::{find_by_key, find_by_key_mut, set_subtree_visible, set_visible, TreeMut, TreeRef};
