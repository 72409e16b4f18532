// src/functions/mod.rs
pub mod items;
pub mod navigation;
pub mod persistence;
pub mod registry;
pub mod script;
pub mod transfer;
pub mod types;

pub use registry::FunctionRegistry;
pub use script::{parse_line, run_script, run_volume_script, LineOutcome};
pub use types::{Args, Function, FunctionError, FunctionResult, PathArg};
