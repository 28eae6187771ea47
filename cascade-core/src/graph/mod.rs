//! Dependency Graph
//!
//! This module implements the computed side of the engine: nodes, the
//! conditionals and lifetime scopes that constrain how nodes may be wired
//! together, and the driver that runs whole validate-then-settle passes.
//!
//! # Overview
//!
//! Nodes form a directed acyclic graph: each node's parameters are bound to
//! cells or to other nodes' outputs. Evaluation is pull-based and lazy —
//! querying a node's dirtiness recursively checks its inputs and recomputes
//! the output only when something actually changed, at most once per pass.
//!
//! Scopes sit alongside the DAG as a parent-linked lifetime tree. Binding a
//! parameter across scopes is only allowed towards longer-lived targets,
//! which is checked once at bind time.
//!
//! The model assumes the caller constructs a DAG; there is no cycle
//! detection.

mod conditional;
mod driver;
mod node;
mod scope;

pub use conditional::Conditional;
pub use driver::Graph;
pub use node::{Node, NodeBuilder, Transform};
pub use scope::Scope;
