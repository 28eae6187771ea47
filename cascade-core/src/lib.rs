//! Cascade Core
//!
//! This crate provides an in-process incremental-computation engine: a
//! directed acyclic graph of typed value cells connected by computed nodes.
//! It implements:
//!
//! - Typed cells with change-aware writes and a dirty flag
//! - A parameter indirection layer (constant values or bindings)
//! - Lazy, memoized node evaluation with at most one transform invocation
//!   per node per pass, even on diamond-shaped graphs
//! - A hierarchical lifetime ("scope") system enforced at bind time
//! - A pass driver that validates and settles a whole terminal set under
//!   mutual exclusion
//!
//! # Architecture
//!
//! The crate is organized into two modules:
//!
//! - `reactive`: cells, parameters, the accessor, and the capability trait
//!   everything binds through
//! - `graph`: nodes, conditionals, scopes, and the pass driver
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use cascade_core::{Graph, NodeBuilder, TypedCell, Value, ValueType};
//!
//! // A source cell and a node that doubles it.
//! let x = TypedCell::new(ValueType::Real);
//! let double = NodeBuilder::new("double")
//!     .parameter("x", ValueType::Real)
//!     .output(ValueType::Real)
//!     .transform(|params| {
//!         let Value::Real(x) = params.get("x")? else { unreachable!() };
//!         Ok(Value::Real(2.0 * x))
//!     })
//!     .build()
//!     .unwrap();
//! double.bind("x", Arc::new(x.clone())).unwrap();
//!
//! let graph = Graph::new(vec![double.clone()]).unwrap();
//!
//! x.write(Value::Real(3.0)).unwrap();
//! graph.update().unwrap();
//! assert_eq!(double.value(), Value::Real(6.0));
//! ```

pub mod graph;
pub mod reactive;

mod error;
mod value;

pub use error::Error;
pub use graph::{Conditional, Graph, Node, NodeBuilder, Scope, Transform};
pub use reactive::{Accessor, Parameter, Reactive, TypedCell};
pub use value::{Value, ValueType};
