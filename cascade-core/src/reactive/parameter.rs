//! Parameter Implementation
//!
//! A parameter is the indirection layer between a node and its inputs. At
//! any moment it is in one of two modes:
//!
//! - **Constant**: the parameter delegates to a locally owned cell.
//! - **Bound**: the parameter delegates to an external reactive target and
//!   holds no independent value.
//!
//! Mode switching is always explicit: [`Parameter::set`] forces constant
//! mode, [`Parameter::bind`] forces bound mode, [`Parameter::unbind`]
//! snapshots the target's current value into the constant cell before
//! switching back, and [`Parameter::clear`] resets to the original default.
//!
//! Scope checking is deliberately *not* done here; the owning node checks
//! the target's scope before calling [`Parameter::bind`].

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Error;
use crate::reactive::{Reactive, TypedCell};
use crate::value::{Value, ValueType};

/// An input slot that is either a locally owned constant or a binding to
/// another reactive object.
///
/// Parameters are cheap-clone handles sharing their state.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use cascade_core::{Parameter, TypedCell, Value, ValueType};
///
/// let param = Parameter::new(ValueType::Real);
/// param.set(Value::Real(42.0)).unwrap();
/// assert_eq!(param.value(), Value::Real(42.0));
///
/// let target = TypedCell::with_initial(ValueType::Real, Value::Real(4.2)).unwrap();
/// param.bind(Arc::new(target)).unwrap();
/// assert_eq!(param.value(), Value::Real(4.2));
/// ```
#[derive(Clone)]
pub struct Parameter {
    /// The default restored by [`Parameter::clear`], already coerced.
    default: Value,

    /// The locally owned cell backing constant mode. Always allocated, even
    /// while the parameter is bound.
    constant: TypedCell,

    /// The bound target. `None` means constant mode.
    target: Arc<RwLock<Option<Arc<dyn Reactive>>>>,
}

impl Parameter {
    /// Create a constant parameter seeded with the type's default value.
    pub fn new(value_type: ValueType) -> Self {
        Self {
            default: value_type.default_value(),
            constant: TypedCell::new(value_type),
            target: Arc::new(RwLock::new(None)),
        }
    }

    /// Create a constant parameter with an explicit default value.
    ///
    /// The default is coerced into `value_type` once, up front; both the
    /// initial value and later [`Parameter::clear`] calls use the coerced
    /// form.
    pub fn with_default(value_type: ValueType, default: Value) -> Result<Self, Error> {
        let default = value_type.coerce(default)?;
        Ok(Self {
            default,
            constant: TypedCell::with_initial(value_type, default)?,
            target: Arc::new(RwLock::new(None)),
        })
    }

    /// The value type of the parameter.
    pub fn value_type(&self) -> ValueType {
        self.constant.value_type()
    }

    /// Write a constant value, discarding any binding.
    pub fn set(&self, value: Value) -> Result<(), Error> {
        self.constant.write(value)?;
        *self.target.write() = None;
        Ok(())
    }

    /// Bind the parameter to an external target.
    ///
    /// Fails with [`Error::TypeMismatch`] if the target produces a different
    /// value type. The caller is responsible for checking the target's scope
    /// first.
    pub fn bind(&self, target: Arc<dyn Reactive>) -> Result<(), Error> {
        if target.value_type() != self.value_type() {
            return Err(Error::TypeMismatch {
                expected: self.value_type(),
                found: target.value_type(),
            });
        }
        *self.target.write() = Some(target);
        Ok(())
    }

    /// Snapshot the target's current value and switch back to constant mode.
    ///
    /// Fails with [`Error::InvalidState`] if the parameter is already
    /// constant.
    pub fn unbind(&self) -> Result<(), Error> {
        let target = self
            .target
            .write()
            .take()
            .ok_or_else(|| Error::invalid_state("cannot unbind a constant parameter"))?;
        self.constant.write(target.value())?;
        Ok(())
    }

    /// Reset the parameter to its original default constant.
    pub fn clear(&self) -> Result<(), Error> {
        self.set(self.default)
    }

    /// Check whether the parameter is in constant mode.
    pub fn is_constant(&self) -> bool {
        self.target.read().is_none()
    }

    /// The currently bound target.
    ///
    /// Fails with [`Error::InvalidState`] if the parameter is constant.
    pub fn target(&self) -> Result<Arc<dyn Reactive>, Error> {
        self.target
            .read()
            .clone()
            .ok_or_else(|| Error::invalid_state("a constant parameter has no target"))
    }

    /// The current value, read from whichever cell or target is active.
    pub fn value(&self) -> Value {
        match &*self.target.read() {
            Some(target) => target.value(),
            None => self.constant.read(),
        }
    }

    /// Run the taint-check protocol on the active cell or target.
    pub fn tainted(&self) -> Result<bool, Error> {
        let target = self.target.read().clone();
        match target {
            Some(target) => target.tainted(),
            None => Ok(self.constant.is_tainted()),
        }
    }

    /// The active cell or target's current dirty flag, without evaluation.
    pub fn dirty(&self) -> bool {
        match &*self.target.read() {
            Some(target) => target.dirty(),
            None => self.constant.is_tainted(),
        }
    }

    /// Settle the active cell or target.
    pub fn untaint(&self) {
        let target = self.target.read().clone();
        match target {
            Some(target) => target.untaint(),
            None => self.constant.untaint(),
        }
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("type", &self.value_type())
            .field("constant", &self.is_constant())
            .field("value", &self.value())
            .finish()
    }
}

impl fmt::Display for Parameter {
    /// Renders the current value wrapped in `(…)` when constant or `{…}`
    /// when bound, with a `*` suffix while dirty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.value();
        if self.is_constant() {
            write!(f, "({value})")?;
        } else {
            write!(f, "{{{value}}}")?;
        }
        if self.dirty() {
            f.write_str("*")?;
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
