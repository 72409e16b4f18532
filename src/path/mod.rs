//! Path Module
//!
//! Textual path expressions and their resolution into volume-anchored paths.

pub mod resolver;
pub mod types;

pub use resolver::{parse, resolve, PathText};
pub use types::*;
