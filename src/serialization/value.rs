//! Structured Values
//!
//! The script-level values that can be persisted. Collections are shared
//! references, as they are in the scripting runtime, so a collection may end
//! up containing itself.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::fs::VolumeItem;
use crate::path::VolumePath;

pub type Shared<T> = Rc<RefCell<T>>;

/// Ordered, string-keyed dictionary.
pub type Lexicon = IndexMap<String, Value>;

const DISPLAY_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    List(Shared<Vec<Value>>),
    /// Front of the queue first.
    Queue(Shared<VecDeque<Value>>),
    /// Bottom of the stack first.
    Stack(Shared<Vec<Value>>),
    Lexicon(Shared<Lexicon>),
    Path(VolumePath),
    /// A live file or directory handle; never serializable.
    Item(VolumeItem),
}

impl Value {
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn queue(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Queue(Rc::new(RefCell::new(items.into_iter().collect())))
    }

    pub fn stack(items: Vec<Value>) -> Self {
        Value::Stack(Rc::new(RefCell::new(items)))
    }

    pub fn lexicon<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Lexicon(Rc::new(RefCell::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )))
    }

    /// Type name as shown to scripts.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Queue(_) => "queue",
            Value::Stack(_) => "stack",
            Value::Lexicon(_) => "lexicon",
            Value::Path(_) => "path",
            Value::Item(item) if item.is_file() => "file",
            Value::Item(_) => "directory",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert untagged JSON (command-line literals) into a value.
    /// Arrays become lists and objects become lexicons; `null` has no counterpart.
    pub fn from_plain_json(json: &serde_json::Value) -> Option<Value> {
        Some(match json {
            serde_json::Value::Null => return None,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Double(n.as_f64()?),
            },
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => Value::list(
                items.iter().map(Value::from_plain_json).collect::<Option<Vec<_>>>()?,
            ),
            serde_json::Value::Object(map) => {
                let mut lexicon = Lexicon::new();
                for (key, value) in map {
                    lexicon.insert(key.clone(), Value::from_plain_json(value)?);
                }
                Value::Lexicon(Rc::new(RefCell::new(lexicon)))
            }
        })
    }

    fn fmt_depth(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        if depth > DISPLAY_DEPTH {
            return write!(f, "...");
        }
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Double(d) => write!(f, "{}", d),
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) | Value::Stack(items) => fmt_items(f, items.borrow().iter(), depth),
            Value::Queue(items) => fmt_items(f, items.borrow().iter(), depth),
            Value::Lexicon(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: ", key)?;
                    value.fmt_depth(f, depth + 1)?;
                }
                write!(f, "}}")
            }
            Value::Path(path) => write!(f, "{}", path),
            Value::Item(item) => write!(f, "{}", item.path()),
        }
    }
}

fn fmt_items<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = &'a Value>,
    depth: usize,
) -> fmt::Result {
    write!(f, "[")?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        item.fmt_depth(f, depth + 1)?;
    }
    write!(f, "]")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_depth(f, 0)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<VolumePath> for Value {
    fn from(path: VolumePath) -> Self {
        Value::Path(path)
    }
}

impl From<VolumeItem> for Value {
    fn from(item: VolumeItem) -> Self {
        Value::Item(item)
    }
}
