// src/functions/persistence.rs
use super::types::{Args, Function, FunctionResult};
use crate::serialization::Value;
use crate::session::Session;

/// `writejson(value, path)`: returns whether the volume accepted the write.
pub struct WriteJsonFunction;

impl Function for WriteJsonFunction {
    fn name(&self) -> &'static str {
        "writejson"
    }

    fn execute(&self, session: &mut Session, args: &[Value]) -> FunctionResult {
        let args = Args::new(self.name(), args);
        args.exactly(2)?;
        let saved = session.write_json(args.value(0)?, &args.path(1)?)?;
        Ok(Some(Value::Boolean(saved)))
    }
}

pub struct ReadJsonFunction;

impl Function for ReadJsonFunction {
    fn name(&self) -> &'static str {
        "readjson"
    }

    fn execute(&self, session: &mut Session, args: &[Value]) -> FunctionResult {
        let args = Args::new(self.name(), args);
        args.exactly(1)?;
        Ok(Some(session.read_json(&args.path(0)?)?))
    }
}

/// `scriptpath()`: the volume file being run, or nothing outside a volume script.
pub struct ScriptPathFunction;

impl Function for ScriptPathFunction {
    fn name(&self) -> &'static str {
        "scriptpath"
    }

    fn execute(&self, session: &mut Session, args: &[Value]) -> FunctionResult {
        Args::new(self.name(), args).exactly(0)?;
        Ok(session.script_path().cloned().map(Value::Path))
    }
}
