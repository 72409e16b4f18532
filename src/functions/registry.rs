// src/functions/registry.rs
use std::collections::HashMap;

use super::items::{CreateDirFunction, CreateFunction, ExistsFunction, ListFunction, OpenFunction};
use super::navigation::{CdFunction, PathFunction, SwitchFunction, VolumesFunction};
use super::persistence::{ReadJsonFunction, ScriptPathFunction, WriteJsonFunction};
use super::transfer::{CopyFunction, DeleteFunction, MoveFunction};
use super::types::{Function, FunctionError, FunctionResult};
use crate::serialization::Value;
use crate::session::Session;

pub struct FunctionRegistry {
    functions: HashMap<String, Box<dyn Function>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Registry holding every built-in.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        register_builtins(&mut registry);
        registry
    }

    pub fn register(&mut self, function: Box<dyn Function>) {
        self.functions.insert(function.name().to_string(), function);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Function> {
        self.functions.get(name).map(|f| f.as_ref())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn call(&self, session: &mut Session, name: &str, args: &[Value]) -> FunctionResult {
        let function = self
            .get(name)
            .ok_or_else(|| FunctionError::UnknownFunction(name.to_string()))?;
        tracing::debug!(function = name, args = args.len(), "calling function");
        function.execute(session, args)
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Register every built-in function.
pub fn register_builtins(registry: &mut FunctionRegistry) {
    registry.register(Box::new(PathFunction));
    registry.register(Box::new(SwitchFunction));
    registry.register(Box::new(CdFunction));
    registry.register(Box::new(VolumesFunction));
    registry.register(Box::new(CopyFunction));
    registry.register(Box::new(MoveFunction));
    registry.register(Box::new(DeleteFunction));
    registry.register(Box::new(ExistsFunction));
    registry.register(Box::new(OpenFunction));
    registry.register(Box::new(CreateFunction));
    registry.register(Box::new(CreateDirFunction));
    registry.register(Box::new(ListFunction));
    registry.register(Box::new(WriteJsonFunction));
    registry.register(Box::new(ReadJsonFunction));
    registry.register(Box::new(ScriptPathFunction));
}
