//! Tagged JSON Encoding
//!
//! Scalars are plain JSON tokens. Every group is an object tagged with
//! `"$type"` so decoding can pick the right variant:
//!
//! ```json
//! {"$type": "list", "items": [1, 2.0, "three"]}
//! {"$type": "lexicon", "entries": ["key", {"$type": "stack", "items": []}]}
//! {"$type": "path", "volume": {"index": 0}, "segments": ["boot", "start"]}
//! ```
//!
//! A path volume is `{"index": n}`, `{"name": s}` or `{"current": true}`.
//!
//! Integers are JSON integers and doubles always keep a fraction or exponent,
//! so the two never collapse into each other.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde_json::{json, Map, Value as Json};
use thiserror::Error;

use super::value::{Lexicon, Value};
use crate::path::{VolumeId, VolumePath};

const TYPE_KEY: &str = "$type";

/// Why a value could not be encoded or a payload decoded.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{reason} at {location}")]
pub struct CodecError {
    /// Where in the value the problem sits, e.g. `$[1]["k"]`
    pub location: String,
    pub reason: String,
}

impl CodecError {
    fn new(location: &str, reason: impl Into<String>) -> Self {
        Self { location: location.to_string(), reason: reason.into() }
    }
}

/// Encode a value as pretty-printed tagged JSON.
pub fn encode(value: &Value) -> Result<String, CodecError> {
    let mut ancestors = Vec::new();
    let json = to_json(value, "$", &mut ancestors)?;
    serde_json::to_string_pretty(&json).map_err(|e| CodecError::new("$", e.to_string()))
}

/// Decode tagged JSON text back into a value.
pub fn decode(text: &str) -> Result<Value, CodecError> {
    let json: Json = serde_json::from_str(text)
        .map_err(|e| CodecError::new("$", format!("invalid JSON: {}", e)))?;
    from_json(&json, "$")
}

fn enter<T>(
    shared: &Rc<RefCell<T>>,
    location: &str,
    ancestors: &mut Vec<*const ()>,
) -> Result<(), CodecError> {
    let ptr = Rc::as_ptr(shared) as *const ();
    if ancestors.contains(&ptr) {
        return Err(CodecError::new(location, "cyclic reference"));
    }
    ancestors.push(ptr);
    Ok(())
}

fn to_json(value: &Value, location: &str, ancestors: &mut Vec<*const ()>) -> Result<Json, CodecError> {
    match value {
        Value::Boolean(b) => Ok(Json::Bool(*b)),
        Value::Integer(i) => Ok(json!(i)),
        Value::Double(d) => serde_json::Number::from_f64(*d)
            .map(Json::Number)
            .ok_or_else(|| CodecError::new(location, format!("non-finite number {}", d))),
        Value::String(s) => Ok(Json::String(s.clone())),
        Value::List(items) | Value::Stack(items) => {
            enter(items, location, ancestors)?;
            let encoded = items
                .borrow()
                .iter()
                .enumerate()
                .map(|(i, item)| to_json(item, &format!("{}[{}]", location, i), ancestors))
                .collect::<Result<Vec<_>, _>>()?;
            ancestors.pop();
            Ok(tagged(value.type_name(), "items", Json::Array(encoded)))
        }
        Value::Queue(items) => {
            enter(items, location, ancestors)?;
            let encoded = items
                .borrow()
                .iter()
                .enumerate()
                .map(|(i, item)| to_json(item, &format!("{}[{}]", location, i), ancestors))
                .collect::<Result<Vec<_>, _>>()?;
            ancestors.pop();
            Ok(tagged("queue", "items", Json::Array(encoded)))
        }
        Value::Lexicon(entries) => {
            enter(entries, location, ancestors)?;
            let mut flat = Vec::new();
            for (key, item) in entries.borrow().iter() {
                flat.push(Json::String(key.clone()));
                flat.push(to_json(item, &format!("{}[{:?}]", location, key), ancestors)?);
            }
            ancestors.pop();
            Ok(tagged("lexicon", "entries", Json::Array(flat)))
        }
        Value::Path(path) => {
            let mut map = Map::new();
            map.insert(TYPE_KEY.to_string(), json!("path"));
            map.insert("volume".to_string(), volume_json(path.volume()));
            map.insert("segments".to_string(), json!(path.segments()));
            Ok(Json::Object(map))
        }
        Value::Item(item) => Err(CodecError::new(
            location,
            format!("{} handles cannot be serialized ({})", value.type_name(), item.path()),
        )),
    }
}

fn volume_json(volume: &VolumeId) -> Json {
    match volume {
        VolumeId::Index(index) => json!({ "index": index }),
        VolumeId::Name(name) => json!({ "name": name }),
        VolumeId::Current => json!({ "current": true }),
    }
}

fn tagged(type_name: &str, key: &str, body: Json) -> Json {
    let mut map = Map::new();
    map.insert(TYPE_KEY.to_string(), Json::String(type_name.to_string()));
    map.insert(key.to_string(), body);
    Json::Object(map)
}

fn from_json(json: &Json, location: &str) -> Result<Value, CodecError> {
    match json {
        Json::Null => Err(CodecError::new(location, "null has no value counterpart")),
        Json::Bool(b) => Ok(Value::Boolean(*b)),
        Json::Number(n) => {
            if n.is_f64() {
                n.as_f64()
                    .map(Value::Double)
                    .ok_or_else(|| CodecError::new(location, "invalid number"))
            } else {
                n.as_i64()
                    .map(Value::Integer)
                    .ok_or_else(|| CodecError::new(location, format!("integer {} out of range", n)))
            }
        }
        Json::String(s) => Ok(Value::String(s.clone())),
        Json::Array(_) => Err(CodecError::new(location, "untagged array")),
        Json::Object(map) => {
            let tag = map
                .get(TYPE_KEY)
                .and_then(Json::as_str)
                .ok_or_else(|| CodecError::new(location, "missing type tag"))?;
            match tag {
                "list" => Ok(Value::list(items(map, location)?)),
                "stack" => Ok(Value::stack(items(map, location)?)),
                "queue" => Ok(Value::Queue(Rc::new(RefCell::new(VecDeque::from(items(
                    map, location,
                )?))))),
                "lexicon" => lexicon(map, location),
                "path" => path(map, location),
                other => Err(CodecError::new(location, format!("unknown type tag '{}'", other))),
            }
        }
    }
}

fn field<'a>(map: &'a Map<String, Json>, key: &str, location: &str) -> Result<&'a Vec<Json>, CodecError> {
    map.get(key)
        .and_then(Json::as_array)
        .ok_or_else(|| CodecError::new(location, format!("missing '{}' array", key)))
}

fn items(map: &Map<String, Json>, location: &str) -> Result<Vec<Value>, CodecError> {
    field(map, "items", location)?
        .iter()
        .enumerate()
        .map(|(i, item)| from_json(item, &format!("{}[{}]", location, i)))
        .collect()
}

fn lexicon(map: &Map<String, Json>, location: &str) -> Result<Value, CodecError> {
    let flat = field(map, "entries", location)?;
    if flat.len() % 2 != 0 {
        return Err(CodecError::new(location, "odd number of lexicon entries"));
    }
    let mut entries = Lexicon::new();
    for pair in flat.chunks(2) {
        let key = pair[0]
            .as_str()
            .ok_or_else(|| CodecError::new(location, "lexicon keys must be strings"))?;
        let value = from_json(&pair[1], &format!("{}[{:?}]", location, key))?;
        if entries.insert(key.to_string(), value).is_some() {
            return Err(CodecError::new(location, format!("duplicate lexicon key {:?}", key)));
        }
    }
    Ok(Value::Lexicon(Rc::new(RefCell::new(entries))))
}

/// Exactly one of `index`, `name` or `current: true`.
fn volume_id(object: &Map<String, Json>) -> Option<VolumeId> {
    if object.len() != 1 {
        return None;
    }
    if let Some(index) = object.get("index") {
        return index.as_u64().and_then(|i| usize::try_from(i).ok()).map(VolumeId::Index);
    }
    if let Some(name) = object.get("name") {
        return name.as_str().map(|name| VolumeId::Name(name.to_string()));
    }
    match object.get("current") {
        Some(Json::Bool(true)) => Some(VolumeId::Current),
        _ => None,
    }
}

fn path(map: &Map<String, Json>, location: &str) -> Result<Value, CodecError> {
    let volume = map
        .get("volume")
        .and_then(Json::as_object)
        .and_then(volume_id)
        .ok_or_else(|| CodecError::new(location, "missing or invalid path volume"))?;
    let segments = field(map, "segments", location)?
        .iter()
        .map(|segment| match segment.as_str() {
            Some(s) if !s.is_empty() && !s.contains('/') && s != "." && s != ".." => Ok(s.to_string()),
            _ => Err(CodecError::new(location, "invalid path segment")),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Path(VolumePath::from_segments(volume, segments)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{VolumeDirectory, VolumeItem};

    fn round_trip(value: &Value) -> Value {
        decode(&encode(value).unwrap()).unwrap()
    }

    #[test]
    fn test_scalars_are_literal_tokens() {
        assert_eq!(encode(&Value::Integer(42)).unwrap(), "42");
        assert_eq!(encode(&Value::Double(2.0)).unwrap(), "2.0");
        assert_eq!(encode(&Value::Boolean(true)).unwrap(), "true");
        assert_eq!(encode(&Value::from("hi")).unwrap(), "\"hi\"");
    }

    #[test]
    fn test_integer_and_double_stay_distinct() {
        assert_eq!(round_trip(&Value::Integer(2)), Value::Integer(2));
        assert_eq!(round_trip(&Value::Double(2.0)), Value::Double(2.0));
        assert_eq!(round_trip(&Value::Double(0.1 + 0.2)), Value::Double(0.1 + 0.2));
        assert_eq!(round_trip(&Value::Double(-1.5e300)), Value::Double(-1.5e300));
        assert_eq!(round_trip(&Value::Integer(i64::MIN)), Value::Integer(i64::MIN));
    }

    #[test]
    fn test_nested_round_trip() {
        let value = Value::lexicon([
            ("name", Value::from("voyager")),
            ("mass", Value::Double(1.25)),
            ("stages", Value::list(vec![Value::Integer(1), Value::Integer(2)])),
            ("pending", Value::queue(vec![Value::from("a"), Value::from("b")])),
            ("history", Value::stack(vec![Value::Boolean(false), Value::list(vec![])])),
            (
                "home",
                Value::Path(VolumePath::from_segments(VolumeId::Index(0), vec!["boot".into()])),
            ),
            (
                "scratch",
                Value::Path(VolumePath::from_segments(VolumeId::Current, vec!["a".into()])),
            ),
            (
                "numbered",
                Value::Path(VolumePath::root(VolumeId::Name("42".into())).join("x")),
            ),
            ("empty", Value::lexicon(Vec::<(String, Value)>::new())),
        ]);
        assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn test_lexicon_order_preserved() {
        let value = Value::lexicon([("z", Value::Integer(1)), ("a", Value::Integer(2))]);
        match round_trip(&value) {
            Value::Lexicon(entries) => {
                let keys: Vec<String> = entries.borrow().keys().cloned().collect();
                assert_eq!(keys, vec!["z", "a"]);
            }
            other => panic!("expected lexicon, got {:?}", other),
        }
    }

    #[test]
    fn test_group_tags() {
        let text = encode(&Value::queue(vec![Value::Integer(1)])).unwrap();
        let json: Json = serde_json::from_str(&text).unwrap();
        assert_eq!(json["$type"], "queue");
        assert_eq!(json["items"][0], 1);
    }

    #[test]
    fn test_shared_but_acyclic_is_allowed() {
        let inner = Value::list(vec![Value::Integer(7)]);
        let outer = Value::list(vec![inner.clone(), inner]);
        assert_eq!(round_trip(&outer), outer);
    }

    #[test]
    fn test_cycle_is_rejected() {
        let list = Value::list(vec![Value::Integer(1)]);
        let lexicon = Value::lexicon([("self", list.clone())]);
        if let Value::List(items) = &list {
            items.borrow_mut().push(lexicon);
        }
        let err = encode(&list).unwrap_err();
        assert_eq!(err.reason, "cyclic reference");
        assert_eq!(err.location, "$[1][\"self\"]");

        // break the cycle so the test does not leak
        if let Value::List(items) = &list {
            items.borrow_mut().pop();
        }
    }

    #[test]
    fn test_non_finite_double_rejected() {
        assert!(encode(&Value::Double(f64::NAN)).is_err());
        assert!(encode(&Value::Double(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_item_not_serializable() {
        let dir = VolumeItem::Directory(VolumeDirectory::new(VolumePath::root(VolumeId::Index(0))));
        let err = encode(&Value::list(vec![Value::Item(dir)])).unwrap_err();
        assert_eq!(err.location, "$[0]");
    }

    #[test]
    fn test_path_volume_forms() {
        let current = Value::Path(VolumePath::from_segments(VolumeId::Current, vec!["a".into()]));
        let json: Json = serde_json::from_str(&encode(&current).unwrap()).unwrap();
        assert_eq!(json["volume"], json!({"current": true}));
        assert_eq!(round_trip(&current), current);

        let digits = Value::Path(VolumePath::root(VolumeId::Name("7".into())));
        assert_eq!(round_trip(&digits), digits);
        assert_ne!(round_trip(&digits), Value::Path(VolumePath::root(VolumeId::Index(7))));

        assert!(decode(r#"{"$type": "path", "volume": "0", "segments": []}"#).is_err());
        assert!(decode(r#"{"$type": "path", "volume": {"current": false}, "segments": []}"#).is_err());
        assert!(decode(r#"{"$type": "path", "volume": {"index": -1}, "segments": []}"#).is_err());
    }

    #[test]
    fn test_decode_rejects_unknown_or_untagged() {
        assert_eq!(
            decode(r#"{"$type": "vector", "items": []}"#).unwrap_err().reason,
            "unknown type tag 'vector'"
        );
        assert!(decode(r#"{"items": []}"#).is_err());
        assert!(decode("[1, 2]").is_err());
        assert!(decode("null").is_err());
        assert!(decode("not json").is_err());
        assert!(decode("18446744073709551615").is_err());
        assert!(decode(r#"{"$type": "lexicon", "entries": ["a"]}"#).is_err());
        assert!(decode(r#"{"$type": "lexicon", "entries": [1, 2]}"#).is_err());
        assert!(decode(r#"{"$type": "path", "volume": {"index": 0}, "segments": [".."]}"#).is_err());
    }
}
