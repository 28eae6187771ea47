//! Lifetime Scopes
//!
//! Scopes protect nodes from being bound to parameters with a different
//! lifetime than their own. Each scope is a node in a parent-linked tree
//! and carries a [`Conditional`]; as long as its own conditional and the
//! conditionals of all its ancestors stay unmet, the scope is alive.
//!
//! Checking that one scope is included in another guarantees that values
//! belonging to the first are safe to use from the second: an included
//! scope lives at least as long. The check happens once, at bind time.
//!
//! The global scope is the distinguished root: a process-wide singleton
//! obtained through [`Scope::global`]. It has no parent, can never die, and
//! includes only itself.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::error::Error;
use crate::graph::Conditional;
use crate::reactive::Reactive;

/// A lifetime domain in a parent-linked tree.
///
/// Scopes are cheap-clone handles; two clones of the same scope compare
/// equal.
///
/// # Example
///
/// ```
/// use cascade_core::{Conditional, Scope, ValueType};
///
/// let stop = Conditional::new(ValueType::Bool, |v| v.is_truthy());
/// let scope = Scope::global().create_scope(stop).unwrap();
///
/// assert!(scope.is_alive());
/// scope.kill().unwrap();
/// assert!(scope.is_dead());
/// ```
#[derive(Clone)]
pub struct Scope {
    inner: Arc<ScopeInner>,
}

enum ScopeInner {
    /// The distinguished root scope.
    Global,

    /// A scope parented inside another, alive until its conditional is met.
    Child {
        parent: Scope,
        conditional: Conditional,
    },
}

static GLOBAL_SCOPE: OnceLock<Scope> = OnceLock::new();

impl Scope {
    /// The process-wide global scope.
    pub fn global() -> Scope {
        GLOBAL_SCOPE
            .get_or_init(|| Scope { inner: Arc::new(ScopeInner::Global) })
            .clone()
    }

    /// Check whether this is the global scope.
    pub fn is_global(&self) -> bool {
        matches!(*self.inner, ScopeInner::Global)
    }

    /// The parent scope, or `None` for the global scope.
    pub fn parent(&self) -> Option<&Scope> {
        match &*self.inner {
            ScopeInner::Global => None,
            ScopeInner::Child { parent, .. } => Some(parent),
        }
    }

    /// A scope is dead once its own conditional is met, or if any ancestor
    /// is dead. Computed on demand by walking towards the root; the result
    /// is never cached.
    pub fn is_dead(&self) -> bool {
        match &*self.inner {
            ScopeInner::Global => false,
            ScopeInner::Child { parent, conditional } => conditional.met() || parent.is_dead(),
        }
    }

    /// The inverse of [`Scope::is_dead`].
    pub fn is_alive(&self) -> bool {
        !self.is_dead()
    }

    /// Create a child scope whose lifetime ends when `conditional` is met.
    ///
    /// Fails with [`Error::InvalidState`] if the conditional itself lives
    /// outside this scope: a scope must not depend on a liveness signal
    /// that can disappear before it does.
    pub fn create_scope(&self, conditional: Conditional) -> Result<Scope, Error> {
        if !self.includes_scope(&conditional.scope()) {
            return Err(Error::invalid_state("conditional is outside this scope"));
        }
        Ok(Scope {
            inner: Arc::new(ScopeInner::Child { parent: self.clone(), conditional }),
        })
    }

    /// Check whether the given object is usable from this scope, i.e.
    /// whether its scope is this one or any ancestor.
    pub fn includes(&self, obj: &dyn Reactive) -> bool {
        self.includes_scope(&obj.scope())
    }

    /// Check whether `other` is this scope or one of its ancestors.
    ///
    /// Every scope includes the global scope; the global scope includes
    /// only itself.
    pub fn includes_scope(&self, other: &Scope) -> bool {
        if self == other {
            return true;
        }
        match &*self.inner {
            ScopeInner::Global => false,
            ScopeInner::Child { parent, .. } => parent.includes_scope(other),
        }
    }

    /// Force this scope dead by freezing its conditional to true.
    ///
    /// Fails with [`Error::InvalidState`] for the global scope, which can
    /// never be killed.
    pub fn kill(&self) -> Result<(), Error> {
        match &*self.inner {
            ScopeInner::Global => Err(Error::invalid_state("the global scope cannot be killed")),
            ScopeInner::Child { conditional, .. } => {
                conditional.force(true)?;
                Ok(())
            }
        }
    }
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Scope {}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.inner {
            ScopeInner::Global => f.write_str("Scope::Global"),
            ScopeInner::Child { parent, .. } => {
                f.debug_struct("Scope").field("parent", parent).finish_non_exhaustive()
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
