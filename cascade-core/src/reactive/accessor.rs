//! Parameter Accessor
//!
//! A read-only view over a node's parameter map, handed to transforms so
//! they can read current input values by name without any way to mutate the
//! parameters or rebind them.

use indexmap::IndexMap;

use crate::error::Error;
use crate::reactive::Parameter;
use crate::value::Value;

/// Read-only named access to a set of parameters.
///
/// The accessor holds handles to the same parameters the node owns, so a
/// lookup always reflects the parameter's *current* value, constant or
/// bound.
#[derive(Clone)]
pub struct Accessor {
    parameters: IndexMap<String, Parameter>,
}

impl Accessor {
    /// Create an accessor over the given parameters.
    pub(crate) fn new(parameters: IndexMap<String, Parameter>) -> Self {
        Self { parameters }
    }

    /// Read the current value of the named parameter.
    ///
    /// Fails with [`Error::UnknownParameter`] if no parameter with that name
    /// was declared.
    pub fn get(&self, name: &str) -> Result<Value, Error> {
        self.parameters
            .get(name)
            .map(Parameter::value)
            .ok_or_else(|| Error::unknown_parameter(name))
    }
}
