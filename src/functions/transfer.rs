// src/functions/transfer.rs
use super::types::{Args, Function, FunctionResult};
use crate::serialization::Value;
use crate::session::Session;

/// `copy(source, destination)`: returns the path of the copy.
pub struct CopyFunction;

impl Function for CopyFunction {
    fn name(&self) -> &'static str {
        "copy"
    }

    fn execute(&self, session: &mut Session, args: &[Value]) -> FunctionResult {
        let args = Args::new(self.name(), args);
        args.exactly(2)?;
        let target = session.copy(&args.path(0)?, &args.path(1)?)?;
        Ok(Some(Value::Path(target)))
    }
}

/// `move(source, destination)`: returns the new path.
pub struct MoveFunction;

impl Function for MoveFunction {
    fn name(&self) -> &'static str {
        "move"
    }

    fn execute(&self, session: &mut Session, args: &[Value]) -> FunctionResult {
        let args = Args::new(self.name(), args);
        args.exactly(2)?;
        let target = session.move_item(&args.path(0)?, &args.path(1)?)?;
        Ok(Some(Value::Path(target)))
    }
}

/// `delete(path)`: recursive, no confirmation.
pub struct DeleteFunction;

impl Function for DeleteFunction {
    fn name(&self) -> &'static str {
        "delete"
    }

    fn execute(&self, session: &mut Session, args: &[Value]) -> FunctionResult {
        let args = Args::new(self.name(), args);
        args.exactly(1)?;
        session.delete(&args.path(0)?)?;
        Ok(None)
    }
}
