//! Typed Cell Implementation
//!
//! A cell is the fundamental storage primitive: an owned, mutable value box
//! with change-aware writes and a dirty flag.
//!
//! # Change Detection
//!
//! A write first coerces the new value into the cell's declared type and
//! then compares it against the stored value. Equal writes are no-ops; only
//! a write that actually changes the value taints the cell. The flag stays
//! set until [`TypedCell::untaint`] clears it.
//!
//! A freshly created cell is always tainted, so a first evaluation pass
//! observes every cell as changed.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Error;
use crate::graph::Scope;
use crate::reactive::Reactive;
use crate::value::{Value, ValueType};

/// A mutable value box with change-aware writes.
///
/// Cells are cheap-clone handles: cloning shares the underlying state, so a
/// cell can be owned by a node and simultaneously observed by any number of
/// bound parameters.
///
/// # Example
///
/// ```
/// use cascade_core::{TypedCell, Value, ValueType};
///
/// let cell = TypedCell::new(ValueType::Real);
/// assert!(cell.is_tainted());
///
/// cell.untaint();
/// assert_eq!(cell.write(Value::Real(0.0)), Ok(false)); // unchanged
/// assert_eq!(cell.write(Value::Real(3.0)), Ok(true)); // changed
/// assert!(cell.is_tainted());
/// ```
#[derive(Clone)]
pub struct TypedCell {
    /// The declared type; every stored value has this type.
    value_type: ValueType,

    /// The shared mutable state.
    state: Arc<RwLock<CellState>>,
}

struct CellState {
    value: Value,
    tainted: bool,
}

impl TypedCell {
    /// Create a new cell seeded with the type's default value.
    ///
    /// The cell starts tainted.
    pub fn new(value_type: ValueType) -> Self {
        Self {
            value_type,
            state: Arc::new(RwLock::new(CellState {
                value: value_type.default_value(),
                tainted: true,
            })),
        }
    }

    /// Create a new cell seeded with the given initial value.
    ///
    /// The value is coerced into `value_type`; the cell starts tainted.
    pub fn with_initial(value_type: ValueType, initial: Value) -> Result<Self, Error> {
        Ok(Self {
            value_type,
            state: Arc::new(RwLock::new(CellState {
                value: value_type.coerce(initial)?,
                tainted: true,
            })),
        })
    }

    /// The declared type of the cell.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Write a new value into the cell.
    ///
    /// The value is coerced into the cell's type first. Returns `Ok(true)`
    /// if the stored value changed (tainting the cell) and `Ok(false)` if
    /// the write was a no-op.
    pub fn write(&self, new_value: Value) -> Result<bool, Error> {
        let new_value = self.value_type.coerce(new_value)?;
        let mut state = self.state.write();
        if state.value == new_value {
            return Ok(false);
        }
        state.value = new_value;
        state.tainted = true;
        Ok(true)
    }

    /// Read the current value.
    pub fn read(&self) -> Value {
        self.state.read().value
    }

    /// Check the dirty flag. No side effects.
    pub fn is_tainted(&self) -> bool {
        self.state.read().tainted
    }

    /// Clear the dirty flag. Idempotent.
    pub fn untaint(&self) {
        self.state.write().tainted = false;
    }
}

impl Reactive for TypedCell {
    fn value_type(&self) -> ValueType {
        self.value_type
    }

    fn value(&self) -> Value {
        self.read()
    }

    fn tainted(&self) -> Result<bool, Error> {
        Ok(self.is_tainted())
    }

    fn dirty(&self) -> bool {
        self.is_tainted()
    }

    fn untaint(&self) {
        TypedCell::untaint(self);
    }

    /// Plain cells always belong to the global scope.
    fn scope(&self) -> Scope {
        Scope::global()
    }
}

impl fmt::Debug for TypedCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("TypedCell")
            .field("type", &self.value_type)
            .field("value", &state.value)
            .field("tainted", &state.tainted)
            .finish()
    }
}

impl fmt::Display for TypedCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.read())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_cell_is_tainted_with_default() {
        let cell = TypedCell::new(ValueType::Int);
        assert!(cell.is_tainted());
        assert_eq!(cell.read(), Value::Int(0));
    }

    #[test]
    fn with_initial_coerces() {
        let cell = TypedCell::with_initial(ValueType::Real, Value::Int(2)).unwrap();
        assert_eq!(cell.read(), Value::Real(2.0));
        assert!(cell.is_tainted());
    }

    #[test]
    fn with_initial_rejects_incompatible_values() {
        assert!(TypedCell::with_initial(ValueType::Bool, Value::Real(1.0)).is_err());
    }

    #[test]
    fn equal_write_does_not_taint() {
        let cell = TypedCell::new(ValueType::Real);
        cell.untaint();

        assert_eq!(cell.write(Value::Real(0.0)), Ok(false));
        assert!(!cell.is_tainted());
    }

    #[test]
    fn changing_write_taints() {
        let cell = TypedCell::new(ValueType::Real);
        cell.untaint();

        assert_eq!(cell.write(Value::Real(1.5)), Ok(true));
        assert!(cell.is_tainted());
        assert_eq!(cell.read(), Value::Real(1.5));
    }

    #[test]
    fn write_coerces_before_comparing() {
        let cell = TypedCell::with_initial(ValueType::Real, Value::Real(3.0)).unwrap();
        cell.untaint();

        // Int 3 coerces to Real 3.0, which is what the cell already holds.
        assert_eq!(cell.write(Value::Int(3)), Ok(false));
        assert!(!cell.is_tainted());
    }

    #[test]
    fn write_rejects_incompatible_values() {
        let cell = TypedCell::new(ValueType::Vec2);
        assert_eq!(
            cell.write(Value::Bool(true)),
            Err(Error::TypeMismatch {
                expected: ValueType::Vec2,
                found: ValueType::Bool,
            })
        );
    }

    #[test]
    fn untaint_is_idempotent() {
        let cell = TypedCell::new(ValueType::Bool);
        cell.untaint();
        cell.untaint();
        assert!(!cell.is_tainted());
    }

    #[test]
    fn clone_shares_state() {
        let cell1 = TypedCell::new(ValueType::Int);
        let cell2 = cell1.clone();

        cell1.write(Value::Int(7)).unwrap();
        assert_eq!(cell2.read(), Value::Int(7));

        cell2.untaint();
        assert!(!cell1.is_tainted());
    }

    #[test]
    fn cells_live_in_the_global_scope() {
        let cell = TypedCell::new(ValueType::Int);
        assert!(Reactive::scope(&cell).is_global());
    }
}
