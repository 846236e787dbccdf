//! Merge policy applied before any source is layered in.

pub mod merge_policy;
