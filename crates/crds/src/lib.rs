//! Janusgraph Operator CRD Definitions
//!
//! Kubernetes Custom Resource Definitions for the Janusgraph controller.

pub mod janusgraph;

pub use janusgraph::*;
