//! Conditionals
//!
//! A conditional is a specialized node: exactly one input parameter and a
//! boolean output computed by a caller-supplied predicate. [`Conditional::met`]
//! is the question "is the condition currently true", answered through the
//! normal dirty-check path.
//!
//! Conditionals double as the liveness signal a [`Scope`](crate::graph::Scope)
//! binds to, which is why they can be [forced](Conditional::force): freezing
//! the output to `true` is how a scope is killed.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::Error;
use crate::graph::{Node, Scope};
use crate::reactive::{Parameter, Reactive, TypedCell};
use crate::value::{Value, ValueType};

/// A one-input node with a boolean output computed by a predicate.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use cascade_core::{Conditional, TypedCell, Value, ValueType};
///
/// let is_negative = Conditional::new(ValueType::Real, |v| match v {
///     Value::Real(r) => *r < 0.0,
///     _ => false,
/// });
///
/// let x = TypedCell::with_initial(ValueType::Real, Value::Real(-1.0)).unwrap();
/// is_negative.bind(Conditional::INPUT, Arc::new(x.clone())).unwrap();
/// assert!(is_negative.met());
///
/// is_negative.untaint();
/// x.write(Value::Real(5.0)).unwrap();
/// assert!(!is_negative.met());
/// ```
#[derive(Clone)]
pub struct Conditional {
    node: Node,
}

impl Conditional {
    /// The name of the single input parameter.
    pub const INPUT: &'static str = "input";

    /// Create a conditional in the global scope.
    pub fn new<F>(input_type: ValueType, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::with_scope(input_type, Scope::global(), predicate)
    }

    /// Create a conditional in the given scope.
    pub fn with_scope<F>(input_type: ValueType, scope: Scope, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let mut parameters = IndexMap::new();
        parameters.insert(Self::INPUT.to_owned(), Parameter::new(input_type));

        let node = Node::from_parts(
            "conditional".to_owned(),
            parameters,
            TypedCell::new(ValueType::Bool),
            scope,
            Some(Arc::new(move |params: &crate::reactive::Accessor| {
                Ok(Value::Bool(predicate(&params.get(Self::INPUT)?)))
            })),
        );

        Self { node }
    }

    /// Check whether the condition currently holds.
    ///
    /// Drives the normal dirty-check path first, then reads the boolean
    /// output. The predicate is always present and the output cell is
    /// `Bool`, so the check itself cannot fail.
    pub fn met(&self) -> bool {
        let _ = self.node.tainted();
        self.node.value().is_truthy()
    }

    /// Freeze the output to the given value.
    ///
    /// The input is unbound (if bound) and untainted so it can no longer
    /// affect the output. Returns whether the output actually changed.
    pub fn force(&self, value: bool) -> Result<bool, Error> {
        let input = self.node.param(Self::INPUT)?;
        if !input.is_constant() {
            input.unbind()?;
        }
        input.untaint();
        self.node.output().write(Value::Bool(value))
    }

    /// The underlying node, for graph registration.
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Bind the named parameter to an external target.
    ///
    /// See [`Node::bind`].
    pub fn bind(&self, name: &str, target: Arc<dyn Reactive>) -> Result<(), Error> {
        self.node.bind(name, target)
    }

    /// Write a constant value into the named parameter.
    ///
    /// See [`Node::set`].
    pub fn set(&self, name: &str, value: Value) -> Result<(), Error> {
        self.node.set(name, value)
    }

    /// See [`Node::tainted`].
    pub fn tainted(&self) -> Result<bool, Error> {
        self.node.tainted()
    }

    /// See [`Node::untaint`].
    pub fn untaint(&self) {
        self.node.untaint();
    }

    /// The current boolean output value.
    pub fn value(&self) -> Value {
        self.node.value()
    }

    /// The scope this conditional belongs to.
    pub fn scope(&self) -> Scope {
        self.node.scope()
    }
}

impl Reactive for Conditional {
    fn value_type(&self) -> ValueType {
        ValueType::Bool
    }

    fn value(&self) -> Value {
        self.node.value()
    }

    fn tainted(&self) -> Result<bool, Error> {
        self.node.tainted()
    }

    fn dirty(&self) -> bool {
        self.node.dirty()
    }

    fn untaint(&self) {
        self.node.untaint();
    }

    fn scope(&self) -> Scope {
        self.node.scope()
    }

    fn as_node(&self) -> Option<Node> {
        Some(self.node.clone())
    }
}

impl std::fmt::Debug for Conditional {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conditional").field("node", &self.node).finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
