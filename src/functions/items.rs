// src/functions/items.rs
use super::types::{Args, Function, FunctionResult, PathArg};
use crate::fs::VolumeItem;
use crate::serialization::Value;
use crate::session::Session;

pub struct ExistsFunction;

impl Function for ExistsFunction {
    fn name(&self) -> &'static str {
        "exists"
    }

    fn execute(&self, session: &mut Session, args: &[Value]) -> FunctionResult {
        let args = Args::new(self.name(), args);
        args.exactly(1)?;
        Ok(Some(Value::Boolean(session.exists(&args.path(0)?)?)))
    }
}

/// `open(path)`: a live file or directory handle.
pub struct OpenFunction;

impl Function for OpenFunction {
    fn name(&self) -> &'static str {
        "open"
    }

    fn execute(&self, session: &mut Session, args: &[Value]) -> FunctionResult {
        let args = Args::new(self.name(), args);
        args.exactly(1)?;
        Ok(Some(Value::Item(session.open(&args.path(0)?)?)))
    }
}

/// `create(path)`: an empty file; an existing file is truncated.
pub struct CreateFunction;

impl Function for CreateFunction {
    fn name(&self) -> &'static str {
        "create"
    }

    fn execute(&self, session: &mut Session, args: &[Value]) -> FunctionResult {
        let args = Args::new(self.name(), args);
        args.exactly(1)?;
        let file = session.create(&args.path(0)?)?;
        Ok(Some(Value::Item(VolumeItem::File(file))))
    }
}

pub struct CreateDirFunction;

impl Function for CreateDirFunction {
    fn name(&self) -> &'static str {
        "createdir"
    }

    fn execute(&self, session: &mut Session, args: &[Value]) -> FunctionResult {
        let args = Args::new(self.name(), args);
        args.exactly(1)?;
        let dir = session.create_dir(&args.path(0)?)?;
        Ok(Some(Value::Item(VolumeItem::Directory(dir))))
    }
}

/// `list(path)`: child paths in name order. `list()` lists the current directory.
pub struct ListFunction;

impl Function for ListFunction {
    fn name(&self) -> &'static str {
        "list"
    }

    fn execute(&self, session: &mut Session, args: &[Value]) -> FunctionResult {
        let args = Args::new(self.name(), args);
        args.between(0, 1)?;
        let path = if args.is_empty() { PathArg::Text(String::new()) } else { args.path(0)? };
        let children = session
            .list(&path)?
            .into_iter()
            .map(|item| Value::Path(item.path().clone()))
            .collect();
        Ok(Some(Value::list(children)))
    }
}
