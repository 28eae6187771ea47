//! Reactive Primitives
//!
//! This module implements the value-level building blocks of the engine:
//! typed cells, the parameter indirection layer, and the read-only accessor
//! handed to node transforms.
//!
//! # Concepts
//!
//! ## Cells
//!
//! A [`TypedCell`] is a mutable value box with change-aware writes. Writing
//! the value it already holds is a no-op; writing a different value marks
//! the cell as tainted until someone explicitly untaints it.
//!
//! ## Parameters
//!
//! A [`Parameter`] is an indirection cell. It either owns a constant cell or
//! borrows another reactive object (a cell, or the output of a node) and
//! delegates every query to whichever is active. Bound parameters never copy
//! the target's value.
//!
//! ## The capability trait
//!
//! Anything a parameter can bind to implements [`Reactive`]: it has a value,
//! a dirtiness protocol, and a scope. Both [`TypedCell`] and
//! [`Node`](crate::graph::Node) implement it, and the rest of the crate
//! depends only on the trait.

mod accessor;
mod cell;
mod parameter;

pub use accessor::Accessor;
pub use cell::TypedCell;
pub use parameter::Parameter;

use crate::error::Error;
use crate::graph::{Node, Scope};
use crate::value::{Value, ValueType};

/// A value source that parameters can bind to.
///
/// The trait captures the full contract a parameter relies on: a current
/// value, the lazy taint-check protocol, the matching settle operation, and
/// a lifetime scope checked at bind time.
pub trait Reactive: Send + Sync {
    /// The type of value this source produces.
    fn value_type(&self) -> ValueType;

    /// The current value.
    ///
    /// Reads whatever is stored right now; does not trigger an evaluation.
    fn value(&self) -> Value;

    /// Check whether the value has changed since the last [`untaint`].
    ///
    /// For nodes this drives the lazy evaluation protocol and may invoke
    /// the node's transform, which is why it can fail.
    ///
    /// [`untaint`]: Reactive::untaint
    fn tainted(&self) -> Result<bool, Error>;

    /// The current dirty flag, with no evaluation side effects.
    ///
    /// Used by diagnostics and `Display` impls, which must never kick off a
    /// recompute.
    fn dirty(&self) -> bool;

    /// Mark the value (and, for nodes, its inputs) as settled.
    fn untaint(&self);

    /// The lifetime scope this source belongs to.
    fn scope(&self) -> Scope;

    /// Downcast to a node handle, if this source is a node.
    fn as_node(&self) -> Option<Node> {
        None
    }
}
