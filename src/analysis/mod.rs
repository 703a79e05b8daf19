//! Derived indices and models built from dependency streams.

pub mod clusters;
pub mod field_types;
pub mod finder;
pub mod graph;
pub mod inheritance;
pub mod structure;

pub use clusters::{density, Cluster, ClusterGraph};
pub use field_types::FieldTypes;
pub use finder::{Dependencies, Finder};
pub use graph::{DegreeDelta, DependencyGraph, Reassignments};
pub use inheritance::Inheritance;
pub use structure::{Method, Structure};
