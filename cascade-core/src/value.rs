//! Typed Values
//!
//! This module defines the closed set of value kinds that can flow through
//! the engine, together with the coercion rules applied on every write.
//!
//! # Coercion
//!
//! Cells are typed: a cell declared as `Real` stores an `f64` no matter what
//! is written into it. Writes therefore coerce first:
//!
//! - `Real` accepts `Real` and widens `Int`
//! - `Int` accepts `Int` and truncates `Real`
//! - `Bool` and `Vec2` accept only themselves
//!
//! Anything else fails with [`Error::TypeMismatch`].

use std::fmt;

use crate::error::Error;

/// The type tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// A boolean flag.
    Bool,
    /// A signed integer.
    Int,
    /// A double-precision float.
    Real,
    /// A two-component float vector.
    Vec2,
}

impl ValueType {
    /// The canonical default value of this type.
    ///
    /// Used to seed cells and parameters created without an explicit
    /// initial value.
    pub fn default_value(self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::Int => Value::Int(0),
            Self::Real => Value::Real(0.0),
            Self::Vec2 => Value::Vec2([0.0, 0.0]),
        }
    }

    /// Coerce `value` into this type's representation.
    ///
    /// Returns [`Error::TypeMismatch`] if no coercion exists.
    pub fn coerce(self, value: Value) -> Result<Value, Error> {
        let coerced = match (self, value) {
            (Self::Bool, Value::Bool(b)) => Value::Bool(b),
            (Self::Int, Value::Int(i)) => Value::Int(i),
            (Self::Int, Value::Real(r)) => Value::Int(r as i64),
            (Self::Real, Value::Real(r)) => Value::Real(r),
            (Self::Real, Value::Int(i)) => Value::Real(i as f64),
            (Self::Vec2, Value::Vec2(v)) => Value::Vec2(v),
            (_, value) => {
                return Err(Error::TypeMismatch {
                    expected: self,
                    found: value.value_type(),
                })
            }
        };
        Ok(coerced)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Real => "real",
            Self::Vec2 => "vec2",
        };
        f.write_str(name)
    }
}

/// A dynamically tagged value.
///
/// Equality is plain value equality; it is what decides whether a write
/// actually changes a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// A boolean flag.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A double-precision float.
    Real(f64),
    /// A two-component float vector.
    Vec2([f64; 2]),
}

impl Value {
    /// Get the type tag of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Real(_) => ValueType::Real,
            Self::Vec2(_) => ValueType::Vec2,
        }
    }

    /// Interpret the value as a boolean.
    ///
    /// Only `Bool(true)` is truthy; every other value is false.
    pub fn is_truthy(&self) -> bool {
        matches!(self, Self::Bool(true))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::Vec2([a, b]) => write!(f, "[{a}, {b}]"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Self::Real(r)
    }
}

impl From<[f64; 2]> for Value {
    fn from(v: [f64; 2]) -> Self {
        Self::Vec2(v)
    }
}
