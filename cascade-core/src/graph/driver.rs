//! Graph Driver
//!
//! The driver holds a fixed set of terminal nodes and runs full
//! validate-then-settle passes across them: first a taint-check sweep that
//! recursively recomputes the whole reachable subgraph (at most one
//! transform invocation per node), then an untaint sweep that resets it.
//!
//! A whole pass runs under a single mutex, so concurrent [`Graph::update`]
//! calls from multiple threads serialize end to end. There is no
//! finer-grained locking; callers must not mutate reachable nodes from
//! outside a pass without their own synchronization.

use parking_lot::Mutex;
use tracing::debug;

use crate::error::Error;
use crate::graph::{Node, Scope};
use crate::value::Value;

/// A pass driver over a fixed set of terminal nodes.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use cascade_core::{Graph, NodeBuilder, Value, ValueType};
///
/// let double = NodeBuilder::new("double")
///     .parameter("x", ValueType::Real)
///     .output(ValueType::Real)
///     .transform(|params| {
///         let Value::Real(x) = params.get("x")? else { unreachable!() };
///         Ok(Value::Real(2.0 * x))
///     })
///     .build()
///     .unwrap();
///
/// let graph = Graph::new(vec![double.clone()]).unwrap();
/// double.set("x", Value::Real(3.0)).unwrap();
///
/// let mut outputs = Vec::new();
/// graph.update_with(|value| outputs.push(*value)).unwrap();
/// assert_eq!(outputs, vec![Value::Real(6.0)]);
/// ```
pub struct Graph {
    /// The terminal nodes, in registration order. Fixed at construction.
    terminals: Vec<Node>,

    /// The scope the graph was declared in.
    scope: Scope,

    /// Serializes whole passes.
    pass_lock: Mutex<()>,
}

impl Graph {
    /// Create a graph over the given terminal nodes in the global scope.
    ///
    /// Fails with [`Error::OutOfScope`] if any terminal node's scope is not
    /// included in the global scope.
    pub fn new(terminals: Vec<Node>) -> Result<Self, Error> {
        Self::with_scope(terminals, Scope::global())
    }

    /// Create a graph over the given terminal nodes in the given scope.
    ///
    /// Fails with [`Error::OutOfScope`] if any terminal node's scope is not
    /// included in `scope`.
    pub fn with_scope(terminals: Vec<Node>, scope: Scope) -> Result<Self, Error> {
        for node in &terminals {
            if !scope.includes_scope(&node.scope()) {
                return Err(Error::OutOfScope { name: node.name().to_owned() });
            }
        }
        Ok(Self { terminals, scope, pass_lock: Mutex::new(()) })
    }

    /// The terminal nodes, in registration order.
    pub fn terminals(&self) -> &[Node] {
        &self.terminals
    }

    /// The scope the graph was declared in.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Run one full validate-then-settle pass.
    pub fn update(&self) -> Result<(), Error> {
        self.run_pass(|_| {})
    }

    /// Run one full pass, then deliver each terminal node's output value to
    /// `consumer` in terminal order.
    pub fn update_with<F>(&self, consumer: F) -> Result<(), Error>
    where
        F: FnMut(&Value),
    {
        self.run_pass(consumer)
    }

    fn run_pass<F>(&self, mut consumer: F) -> Result<(), Error>
    where
        F: FnMut(&Value),
    {
        let _guard = self.pass_lock.lock();
        debug!(terminals = self.terminals.len(), "running update pass");

        // An error mid-sweep propagates immediately; interim check state is
        // left as-is and the graph needs an explicit settle to recover.
        for node in &self.terminals {
            node.tainted()?;
        }
        for node in &self.terminals {
            node.untaint();
        }
        for node in &self.terminals {
            consumer(&node.value());
        }
        Ok(())
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("terminals", &self.terminals.iter().map(Node::name).collect::<Vec<_>>())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
