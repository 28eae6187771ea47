//! Computed Nodes
//!
//! A node owns a named set of parameters and an output cell, and carries a
//! transform from current parameter values to a new output value. The
//! interesting part is the evaluation protocol:
//!
//! # Evaluation Protocol
//!
//! Per pass, a node moves `Unchecked -> Checked`, reset only by
//! [`Node::untaint`]. A [`Node::tainted`] query:
//!
//! 1. If already checked this pass, returns the output cell's current
//!    dirtiness with no further work. This is what keeps diamond-shaped
//!    graphs cheap: a shared ancestor is visited once no matter how many
//!    descendants query it.
//!
//! 2. Otherwise marks the node checked and queries every parameter, each of
//!    which recursively drives the same protocol on whatever it targets.
//!    If no parameter reports dirty, the output is left untouched and the
//!    query returns false.
//!
//! 3. If any parameter is dirty, the transform runs once with the current
//!    parameter accessor and the result is written into the output cell,
//!    whose own equality check decides whether the node's consumers see a
//!    change.
//!
//! The transform never runs more than once per pass, and only runs at all
//! when at least one input changed.
//!
//! # Scopes
//!
//! A node belongs to exactly one [`Scope`] and refuses to bind parameters
//! to targets outside that scope's lifetime. The check happens once, at
//! bind time, not on every evaluation.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use crate::error::Error;
use crate::graph::Scope;
use crate::reactive::{Accessor, Parameter, Reactive, TypedCell};
use crate::value::{Value, ValueType};

/// The transform of a node: a pure function from the current parameter
/// values to a new output value.
pub type Transform = dyn Fn(&Accessor) -> Result<Value, Error> + Send + Sync;

/// A computed node in the dependency graph.
///
/// Nodes are cheap-clone handles sharing their state, so a node can be
/// registered with a [`Graph`](crate::graph::Graph) while its output is
/// bound into other nodes' parameters.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use cascade_core::{NodeBuilder, TypedCell, Value, ValueType};
///
/// let x = TypedCell::with_initial(ValueType::Real, Value::Real(3.0)).unwrap();
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
/// double.bind("x", Arc::new(x)).unwrap();
/// assert_eq!(double.tainted(), Ok(true));
/// assert_eq!(double.value(), Value::Real(6.0));
/// ```
#[derive(Clone)]
pub struct Node {
    inner: Arc<NodeInner>,
}

struct NodeInner {
    /// Human-readable name, used in diagnostics and error reporting.
    name: String,

    /// The declared parameter set. Fixed at construction; only parameter
    /// state mutates afterwards.
    parameters: IndexMap<String, Parameter>,

    /// The read-only view handed to the transform.
    accessor: Accessor,

    /// The output cell, written only by the node's own transform.
    output: TypedCell,

    /// The lifetime scope this node belongs to.
    scope: Scope,

    /// Whether this node has been checked in the current pass.
    visited: AtomicBool,

    /// The transform. `None` fails evaluation with `NotImplemented`.
    transform: Option<Arc<Transform>>,
}

impl Node {
    pub(crate) fn from_parts(
        name: String,
        parameters: IndexMap<String, Parameter>,
        output: TypedCell,
        scope: Scope,
        transform: Option<Arc<Transform>>,
    ) -> Self {
        let accessor = Accessor::new(parameters.clone());
        Self {
            inner: Arc::new(NodeInner {
                name,
                parameters,
                accessor,
                output,
                scope,
                visited: AtomicBool::new(false),
                transform,
            }),
        }
    }

    /// The node's name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Check whether the output has changed since the last settle,
    /// recomputing it if any input changed.
    ///
    /// See the module docs for the full protocol. Fails with
    /// [`Error::NotImplemented`] if no transform was supplied, or with
    /// whatever error the transform or the output write raises.
    pub fn tainted(&self) -> Result<bool, Error> {
        if self.inner.visited.swap(true, Ordering::SeqCst) {
            return Ok(self.inner.output.is_tainted());
        }

        // Every parameter is queried; no short-circuit. Each query drives
        // the same protocol on the parameter's target, and shared ancestors
        // answer from their checked state on the second visit.
        let mut any_tainted = false;
        for parameter in self.inner.parameters.values() {
            any_tainted |= parameter.tainted()?;
        }

        if !any_tainted {
            return Ok(false);
        }

        let transform = self.inner.transform.as_ref().ok_or(Error::NotImplemented)?;
        trace!(node = %self.inner.name, "running transform");
        let result = transform(&self.inner.accessor)?;
        self.inner.output.write(result)?;
        Ok(self.inner.output.is_tainted())
    }

    /// Settle the node: reset the per-pass check state and untaint the
    /// output and all parameters.
    ///
    /// Assumption: if the output is already clean, the parameters must be
    /// unchanged too, so the recursive walk is skipped. A never-evaluated
    /// subgraph is therefore not forcibly cleaned by this call.
    pub fn untaint(&self) {
        self.inner.visited.store(false, Ordering::SeqCst);
        if !self.inner.output.is_tainted() {
            return;
        }

        for parameter in self.inner.parameters.values() {
            parameter.untaint();
        }
        self.inner.output.untaint();
    }

    /// Bind the named parameter to an external target.
    ///
    /// Fails with [`Error::UnknownParameter`] if the name was never
    /// declared, and with [`Error::OutOfScope`] unless the target is usable
    /// from this node's scope.
    pub fn bind(&self, name: &str, target: Arc<dyn Reactive>) -> Result<(), Error> {
        let parameter = self.param(name)?;
        if !self.inner.scope.includes(target.as_ref()) {
            return Err(Error::OutOfScope { name: name.to_owned() });
        }
        parameter.bind(target)
    }

    /// Write a constant value into the named parameter.
    ///
    /// Fails with [`Error::UnknownParameter`] if the name was never
    /// declared.
    pub fn set(&self, name: &str, value: Value) -> Result<(), Error> {
        self.param(name)?.set(value)
    }

    /// Check whether a parameter with the given name was declared.
    pub fn has_parameter(&self, name: &str) -> bool {
        self.inner.parameters.contains_key(name)
    }

    /// Every currently-bound parameter target that is itself a node.
    ///
    /// A snapshot for callers' graph introspection (auditing, debugging);
    /// evaluation does not use it. Call again for a fresh traversal.
    pub fn bound_nodes(&self) -> Vec<Node> {
        self.inner
            .parameters
            .values()
            .filter(|parameter| !parameter.is_constant())
            .filter_map(|parameter| parameter.target().ok())
            .filter_map(|target| target.as_node())
            .collect()
    }

    /// The read-only parameter accessor.
    pub fn parameters(&self) -> &Accessor {
        &self.inner.accessor
    }

    /// The current output value.
    pub fn value(&self) -> Value {
        self.inner.output.read()
    }

    /// The type of value this node produces.
    pub fn value_type(&self) -> ValueType {
        self.inner.output.value_type()
    }

    /// Check whether this node produces values of the given type.
    pub fn produces(&self, value_type: ValueType) -> bool {
        self.value_type() == value_type
    }

    /// The lifetime scope this node belongs to.
    pub fn scope(&self) -> Scope {
        self.inner.scope.clone()
    }

    pub(crate) fn param(&self, name: &str) -> Result<&Parameter, Error> {
        self.inner
            .parameters
            .get(name)
            .ok_or_else(|| Error::unknown_parameter(name))
    }

    pub(crate) fn output(&self) -> &TypedCell {
        &self.inner.output
    }
}

impl Reactive for Node {
    fn value_type(&self) -> ValueType {
        Node::value_type(self)
    }

    fn value(&self) -> Value {
        Node::value(self)
    }

    fn tainted(&self) -> Result<bool, Error> {
        Node::tainted(self)
    }

    fn dirty(&self) -> bool {
        self.inner.output.is_tainted()
    }

    fn untaint(&self) {
        Node::untaint(self);
    }

    fn scope(&self) -> Scope {
        Node::scope(self)
    }

    fn as_node(&self) -> Option<Node> {
        Some(self.clone())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.inner.name)
            .field("parameters", &self.inner.parameters.keys().collect::<Vec<_>>())
            .field("output", &self.inner.output)
            .finish()
    }
}

impl fmt::Display for Node {
    /// Renders the node's signature as `name(a: real, b: real) -> real`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.inner.name)?;
        for (index, (name, parameter)) in self.inner.parameters.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {}", parameter.value_type())?;
        }
        write!(f, ") -> {}", self.value_type())
    }
}

// ----------------------------------------------------------------------------
// Builder
// ----------------------------------------------------------------------------

/// Declarative construction of a [`Node`].
///
/// Parameter names, types and defaults, the output type, and the transform
/// are declared up front; [`NodeBuilder::build`] produces a ready node with
/// fresh parameter and output cells.
///
/// Constant values supplied via [`NodeBuilder::initial`] are applied after
/// construction, as if by [`Node::set`].
pub struct NodeBuilder {
    name: String,
    parameters: IndexMap<String, (ValueType, Option<Value>)>,
    output: Option<ValueType>,
    scope: Scope,
    transform: Option<Arc<Transform>>,
    initial: Vec<(String, Value)>,
}

impl NodeBuilder {
    /// Start building a node with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: IndexMap::new(),
            output: None,
            scope: Scope::global(),
            transform: None,
            initial: Vec::new(),
        }
    }

    /// Declare a parameter with the type's default value.
    pub fn parameter(mut self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.parameters.insert(name.into(), (value_type, None));
        self
    }

    /// Declare a parameter with an explicit default value.
    pub fn parameter_with_default(
        mut self,
        name: impl Into<String>,
        value_type: ValueType,
        default: Value,
    ) -> Self {
        self.parameters.insert(name.into(), (value_type, Some(default)));
        self
    }

    /// Declare the output value type. Required.
    pub fn output(mut self, value_type: ValueType) -> Self {
        self.output = Some(value_type);
        self
    }

    /// Place the node in the given scope instead of the global scope.
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Supply the transform.
    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&Accessor) -> Result<Value, Error> + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Queue a constant value to write into a parameter at build time.
    pub fn initial(mut self, name: impl Into<String>, value: Value) -> Self {
        self.initial.push((name.into(), value));
        self
    }

    /// Build the node.
    ///
    /// Fails with [`Error::InvalidState`] when no output type was declared,
    /// [`Error::UnknownParameter`] when an initial value names an
    /// undeclared parameter, and [`Error::TypeMismatch`] when a default or
    /// initial value cannot be coerced.
    pub fn build(self) -> Result<Node, Error> {
        let output = self
            .output
            .ok_or_else(|| Error::invalid_state("no output type declared"))?;

        let mut parameters = IndexMap::with_capacity(self.parameters.len());
        for (name, (value_type, default)) in self.parameters {
            let parameter = match default {
                Some(default) => Parameter::with_default(value_type, default)?,
                None => Parameter::new(value_type),
            };
            parameters.insert(name, parameter);
        }

        let node = Node::from_parts(
            self.name,
            parameters,
            TypedCell::new(output),
            self.scope,
            self.transform,
        );

        for (name, value) in self.initial {
            node.set(&name, value)?;
        }

        Ok(node)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
