//! Property-based tests for the configuration store

mod merge_semantics;
