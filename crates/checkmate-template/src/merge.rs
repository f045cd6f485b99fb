//! In-place deep merge of JSON documents.
//!
//! Containers already present in the target are updated, never replaced, and scalars
//! are only written when they differ. Callers that watch the document for changes
//! therefore only see the leaves that actually moved.

use serde_json::{Map, Value};

/// Merge `src` into `target` in place and return `target`.
///
/// * A null `src` leaves `target` untouched.
/// * Arrays merge index by index; missing target slots are created.
/// * Objects merge key by key; keys absent from `src` are kept.
/// * On a scalar mismatch `src` wins.
pub fn merge_into<'a>(target: &'a mut Value, src: &Value) -> &'a mut Value {
    Merger { changed: None }.merge(target, src, &mut String::new());
    target
}

/// Same as [`merge_into`], returning the JSON pointer of every value written.
pub fn merge_into_tracked(target: &mut Value, src: &Value) -> Vec<String> {
    let mut merger = Merger {
        changed: Some(Vec::new()),
    };
    merger.merge(target, src, &mut String::new());
    merger.changed.unwrap_or_default()
}

struct Merger {
    changed: Option<Vec<String>>,
}

impl Merger {
    fn record(&mut self, path: &str) {
        if let Some(changed) = self.changed.as_mut() {
            changed.push(path.to_string());
        }
    }

    fn merge(&mut self, target: &mut Value, src: &Value, path: &mut String) {
        match src {
            Value::Null => {}
            Value::Array(items) => self.merge_array(target, items, path),
            Value::Object(map) => self.merge_object(target, map, path),
            scalar => self.overwrite(target, scalar, path),
        }
    }

    fn overwrite(&mut self, target: &mut Value, src: &Value, path: &str) {
        if target != src {
            *target = src.clone();
            self.record(path);
        }
    }

    fn merge_array(&mut self, target: &mut Value, items: &[Value], path: &mut String) {
        if !target.is_array() {
            *target = Value::Array(Vec::with_capacity(items.len()));
            self.record(path);
        }
        let Value::Array(slots) = target else {
            return;
        };

        for (index, item) in items.iter().enumerate() {
            let base = path.len();
            path.push('/');
            path.push_str(&index.to_string());

            if index >= slots.len() {
                slots.resize(index + 1, Value::Null);
            }
            if is_container(item) {
                self.merge(&mut slots[index], item, path);
            } else {
                self.overwrite(&mut slots[index], item, path);
            }
            path.truncate(base);
        }
    }

    fn merge_object(&mut self, target: &mut Value, map: &Map<String, Value>, path: &mut String) {
        if !target.is_object() {
            *target = Value::Object(Map::new());
            self.record(path);
        }
        let Value::Object(fields) = target else {
            return;
        };

        for (key, value) in map {
            let base = path.len();
            path.push('/');
            push_escaped(path, key);

            match fields.get_mut(key) {
                Some(existing) if is_container(existing) || is_container(value) => {
                    self.merge(existing, value, path);
                }
                Some(existing) => self.overwrite(existing, value, path),
                None => {
                    fields.insert(key.clone(), value.clone());
                    self.record(path);
                }
            }
            path.truncate(base);
        }
    }
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}

/// Append a JSON pointer reference token (`~` -> `~0`, `/` -> `~1`).
fn push_escaped(path: &mut String, key: &str) {
    for ch in key.chars() {
        match ch {
            '~' => path.push_str("~0"),
            '/' => path.push_str("~1"),
            other => path.push(other),
        }
    }
}
