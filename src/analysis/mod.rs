//! Checks over the emission sequence before anything is written.

pub mod graph;

pub use graph::{validate_dependency_order, DependencyGraph, DependencyType, ObjectRef};
