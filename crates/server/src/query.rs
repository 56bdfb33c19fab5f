//! Query-string decoding
//!
//! Turns `get[]=a&get[]=b&store=people` into the same JSON payload a POST
//! body would carry:
//!
//! | Query | JSON |
//! |-------|------|
//! | `get=u1` | `{"get": "u1"}` |
//! | `get[]=a&get[]=b` | `{"get": ["a", "b"]}` |
//! | `get[0]=a&get[1]=b` | `{"get": ["a", "b"]}` |
//! | `get[name]=Ann` | `{"get": {"name": "Ann"}}` |
//! | `set[tags][]=x` | `{"set": {"tags": ["x"]}}` |
//! | `a=1&a=2` | `{"a": ["1", "2"]}` |
//!
//! Values are always strings. Objects whose keys are all array indices
//! collapse into arrays ordered by index.

use serde_json::{Map, Value};

/// Decode a raw query string (without the leading `?`).
pub fn parse_query(query: &str) -> Map<String, Value> {
    let mut root = Map::new();

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(raw_key);
        if key.is_empty() {
            continue;
        }
        let value = Value::String(decode_component(raw_value));
        let path = split_key(&key);
        insert_into_object(&mut root, &path, value);
    }

    root.into_iter()
        .map(|(k, v)| (k, collapse_indexed(v)))
        .collect()
}

/// Percent-decode one component, treating `+` as a space.
///
/// Broken escapes are kept literally; invalid UTF-8 is replaced.
pub fn decode_component(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push((hi << 4) | lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Bracket segments decoded per key; anything deeper stays one literal segment.
pub const MAX_DEPTH: usize = 5;

/// Split `a[b][]` into `["a", "b", ""]`.
///
/// Keys with unbalanced brackets, or no name before the first bracket,
/// are taken literally. After [`MAX_DEPTH`] segments the unparsed rest,
/// brackets included, becomes a single final segment.
fn split_key(key: &str) -> Vec<String> {
    let Some(open) = key.find('[') else {
        return vec![key.to_string()];
    };
    if open == 0 {
        return vec![key.to_string()];
    }

    let mut segments = vec![key[..open].to_string()];
    let mut rest = &key[open..];
    while !rest.is_empty() {
        if segments.len() > MAX_DEPTH {
            segments.push(rest.to_string());
            break;
        }
        let Some(inner) = rest.strip_prefix('[') else {
            return vec![key.to_string()];
        };
        let Some(close) = inner.find(']') else {
            return vec![key.to_string()];
        };
        segments.push(inner[..close].to_string());
        rest = &inner[close + 1..];
    }
    segments
}

fn empty_container(next_segment: &str) -> Value {
    if next_segment.is_empty() {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

fn insert_into_object(map: &mut Map<String, Value>, path: &[String], value: Value) {
    let Some((head, tail)) = path.split_first() else {
        return;
    };

    if tail.is_empty() {
        match map.get_mut(head) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let previous = existing.take();
                *existing = Value::Array(vec![previous, value]);
            }
            None => {
                map.insert(head.clone(), value);
            }
        }
        return;
    }

    let child = map
        .entry(head.clone())
        .or_insert_with(|| empty_container(&tail[0]));
    insert_into_value(child, tail, value);
}

fn insert_into_value(node: &mut Value, path: &[String], value: Value) {
    let Some((head, tail)) = path.split_first() else {
        return;
    };

    // `x[]` after `x[k]`, or `x[k]` after `x[]`: keep everything by
    // switching to an index-keyed object.
    if !head.is_empty() {
        if let Value::Array(items) = node {
            let indexed: Map<String, Value> = items
                .drain(..)
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect();
            *node = Value::Object(indexed);
        }
    }
    if !matches!(node, Value::Array(_) | Value::Object(_)) {
        *node = empty_container(head);
    }

    match node {
        Value::Array(items) => {
            if tail.is_empty() {
                items.push(value);
            } else {
                let mut child = empty_container(&tail[0]);
                insert_into_value(&mut child, tail, value);
                items.push(child);
            }
        }
        Value::Object(map) => {
            if head.is_empty() {
                let next = map.len().to_string();
                let mut path = vec![next];
                path.extend_from_slice(tail);
                insert_into_object(map, &path, value);
            } else {
                insert_into_object(map, path, value);
            }
        }
        _ => {}
    }
}

/// Turn `{"0": a, "1": b}` into `[a, b]`, recursively.
fn collapse_indexed(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(collapse_indexed).collect()),
        Value::Object(map) => {
            let all_indices =
                !map.is_empty() && map.keys().all(|k| k.parse::<usize>().is_ok());
            if all_indices {
                let mut entries: Vec<(usize, Value)> = map
                    .into_iter()
                    .filter_map(|(k, v)| k.parse::<usize>().ok().map(|i| (i, v)))
                    .collect();
                entries.sort_by_key(|(i, _)| *i);
                Value::Array(entries.into_iter().map(|(_, v)| collapse_indexed(v)).collect())
            } else {
                Value::Object(map.into_iter().map(|(k, v)| (k, collapse_indexed(v))).collect())
            }
        }
        other => other,
    }
}
