// src/functions/types.rs
use thiserror::Error;

use crate::fs::VolumeError;
use crate::path::{VolumeId, VolumePath};
use crate::serialization::Value;
use crate::session::{PathLike, Session, VolumeRegistry};

/// Function-layer failure.
#[derive(Error, Debug)]
pub enum FunctionError {
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("{function}: expected {expected} argument(s), got {got}")]
    Arity { function: String, expected: String, got: usize },

    #[error("{function}: argument {index} must be {expected}, got {got}")]
    ArgumentType {
        function: String,
        index: usize,
        expected: &'static str,
        got: &'static str,
    },

    #[error("line {line}: {reason}")]
    Syntax { line: usize, reason: String },

    #[error(transparent)]
    Volume(#[from] VolumeError),
}

/// Result of one call: a value, or nothing for pure side effects.
pub type FunctionResult = Result<Option<Value>, FunctionError>;

/// A script-visible built-in.
pub trait Function {
    fn name(&self) -> &'static str;
    fn execute(&self, session: &mut Session, args: &[Value]) -> FunctionResult;
}

/// A path argument: text still to resolve, or a path taken from a value.
#[derive(Debug, Clone, PartialEq)]
pub enum PathArg {
    Text(String),
    Resolved(VolumePath),
}

impl PathLike for PathArg {
    fn locate(&self, registry: &VolumeRegistry) -> Result<VolumePath, VolumeError> {
        match self {
            PathArg::Text(text) => registry.resolve(text),
            PathArg::Resolved(path) => registry.canonicalize(path),
        }
    }
}

/// Positional argument access with the function's name baked into errors.
pub struct Args<'a> {
    function: &'static str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    pub fn new(function: &'static str, values: &'a [Value]) -> Self {
        Self { function, values }
    }

    /// Require exactly `count` arguments.
    pub fn exactly(&self, count: usize) -> Result<(), FunctionError> {
        if self.values.len() != count {
            return Err(self.arity(count.to_string()));
        }
        Ok(())
    }

    /// Require between `min` and `max` arguments.
    pub fn between(&self, min: usize, max: usize) -> Result<(), FunctionError> {
        if self.values.len() < min || self.values.len() > max {
            return Err(self.arity(format!("{} to {}", min, max)));
        }
        Ok(())
    }

    fn arity(&self, expected: String) -> FunctionError {
        FunctionError::Arity {
            function: self.function.to_string(),
            expected,
            got: self.values.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, index: usize) -> Result<&'a Value, FunctionError> {
        self.values
            .get(index)
            .ok_or_else(|| self.arity((index + 1).to_string()))
    }

    /// Path argument: a string, a path value, or an item's path.
    pub fn path(&self, index: usize) -> Result<PathArg, FunctionError> {
        match self.value(index)? {
            Value::String(text) => Ok(PathArg::Text(text.clone())),
            Value::Path(path) => Ok(PathArg::Resolved(path.clone())),
            Value::Item(item) => Ok(PathArg::Resolved(item.path().clone())),
            other => Err(self.type_error(index, "a path", other)),
        }
    }

    /// Volume identifier: a name or a slot number.
    pub fn volume_id(&self, index: usize) -> Result<VolumeId, FunctionError> {
        match self.value(index)? {
            Value::String(name) => Ok(VolumeId::parse(name)),
            Value::Integer(slot) if *slot >= 0 => Ok(VolumeId::Index(*slot as usize)),
            other => Err(self.type_error(index, "a volume name or slot", other)),
        }
    }

    fn type_error(&self, index: usize, expected: &'static str, got: &Value) -> FunctionError {
        FunctionError::ArgumentType {
            function: self.function.to_string(),
            index: index + 1,
            expected,
            got: got.type_name(),
        }
    }
}
