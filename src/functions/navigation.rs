// src/functions/navigation.rs
use super::types::{Args, Function, FunctionResult};
use crate::serialization::Value;
use crate::session::Session;

/// `path(text)`: resolve without touching storage. `path()` is the current directory.
pub struct PathFunction;

impl Function for PathFunction {
    fn name(&self) -> &'static str {
        "path"
    }

    fn execute(&self, session: &mut Session, args: &[Value]) -> FunctionResult {
        let args = Args::new(self.name(), args);
        args.between(0, 1)?;
        let path = if args.is_empty() {
            session.current_path()
        } else {
            session.locate(&args.path(0)?)?
        };
        Ok(Some(Value::Path(path)))
    }
}

/// `switch(volume)`: make a volume current; the directory resets to its root.
pub struct SwitchFunction;

impl Function for SwitchFunction {
    fn name(&self) -> &'static str {
        "switch"
    }

    fn execute(&self, session: &mut Session, args: &[Value]) -> FunctionResult {
        let args = Args::new(self.name(), args);
        args.exactly(1)?;
        session.switch(&args.volume_id(0)?)?;
        Ok(Some(Value::Path(session.current_path())))
    }
}

pub struct CdFunction;

impl Function for CdFunction {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn execute(&self, session: &mut Session, args: &[Value]) -> FunctionResult {
        let args = Args::new(self.name(), args);
        args.exactly(1)?;
        let path = session.cd(&args.path(0)?)?;
        Ok(Some(Value::Path(path)))
    }
}

/// `volumes()`: one lexicon per registered volume, in slot order.
pub struct VolumesFunction;

impl Function for VolumesFunction {
    fn name(&self) -> &'static str {
        "volumes"
    }

    fn execute(&self, session: &mut Session, args: &[Value]) -> FunctionResult {
        Args::new(self.name(), args).exactly(0)?;
        let current = session.current_path();
        let volumes = session
            .registry()
            .volumes()
            .map(|(slot, volume)| {
                let mut entries = vec![
                    ("slot", Value::Integer(slot as i64)),
                    ("name", Value::from(volume.name())),
                    ("used", Value::Integer(volume.used() as i64)),
                ];
                if let Some(capacity) = volume.capacity() {
                    entries.push(("capacity", Value::Integer(capacity as i64)));
                }
                entries.push(("read_only", Value::Boolean(volume.is_read_only())));
                entries.push((
                    "current",
                    Value::Boolean(current.volume() == &crate::path::VolumeId::Index(slot)),
                ));
                Value::lexicon(entries)
            })
            .collect();
        Ok(Some(Value::list(volumes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{InMemoryBackend, Volume};
    use crate::functions::FunctionError;
    use crate::session::SessionOptions;

    fn session() -> Session {
        Session::new(SessionOptions {
            volumes: Some(vec![
                Volume::new("archive", InMemoryBackend::with_files(&[("/docs/readme", "hi")])),
                Volume::new("local", InMemoryBackend::with_capacity(100)),
            ]),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_path_resolves_without_storage() {
        let mut session = session();
        let result = PathFunction.execute(&mut session, &[Value::from("local:/not/yet")]).unwrap();
        assert_eq!(result.unwrap().to_string(), "1:/not/yet");
        let here = PathFunction.execute(&mut session, &[]).unwrap().unwrap();
        assert_eq!(here.to_string(), "0:/");
    }

    #[test]
    fn test_cd_and_switch() {
        let mut session = session();
        CdFunction.execute(&mut session, &[Value::from("docs")]).unwrap();
        assert_eq!(session.current_path().to_string(), "0:/docs");

        let result = SwitchFunction.execute(&mut session, &[Value::from("local")]).unwrap();
        assert_eq!(result.unwrap().to_string(), "1:/");

        let err = SwitchFunction.execute(&mut session, &[Value::from("floppy")]).unwrap_err();
        assert!(matches!(err, FunctionError::Volume(_)));
    }

    #[test]
    fn test_volumes_lists_slots() {
        let mut session = session();
        let listed = VolumesFunction.execute(&mut session, &[]).unwrap().unwrap();
        assert_eq!(
            listed.to_string(),
            "[{slot: 0, name: archive, used: 2, read_only: false, current: true}, \
             {slot: 1, name: local, used: 0, capacity: 100, read_only: false, current: false}]"
        );
    }
}
