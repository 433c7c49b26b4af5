// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Attribute flattening
//!
//! Nested attribute objects become dotted keys: `{"a": {"b": 1}}` is emitted
//! as `"a.b" → 1`. Structural members (`geometry`, `children`, `parents`)
//! are skipped at every level.

use cityjson_lite_core::{CityObject, RESERVED_KEYS};
use serde_json::{Map, Value};

/// Flattened attributes in source insertion order.
pub type PropertyMap = Map<String, Value>;

/// Flatten a nested attribute map.
///
/// Keys keep the insertion order of the source at each level. If two paths
/// flatten to the same key the later one wins.
pub fn flatten_properties(raw: &Map<String, Value>) -> PropertyMap {
    let mut out = PropertyMap::new();
    flatten_into(raw, None, &mut out);
    out
}

/// Flatten every attribute of a city object.
pub fn object_properties(object: &CityObject) -> PropertyMap {
    flatten_properties(&object.properties)
}

fn flatten_into(map: &Map<String, Value>, prefix: Option<&str>, out: &mut PropertyMap) {
    for (key, value) in map {
        if RESERVED_KEYS.contains(&key.as_str()) {
            continue;
        }

        let path = match prefix {
            Some(prefix) => format!("{}.{}", prefix, key),
            None => key.clone(),
        };

        match value {
            Value::Object(nested) => flatten_into(nested, Some(&path), out),
            leaf => {
                out.insert(path, leaf.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn nested_keys_are_dotted() {
        let flat = flatten_properties(&map(json!({"a": {"b": 1}})));
        assert_eq!(flat.len(), 1);
        assert_eq!(flat.get("a.b"), Some(&json!(1)));
    }

    #[test]
    fn flat_maps_round_trip() {
        let raw = map(json!({"type": "Building", "height": 12.5, "name": "Town hall"}));
        assert_eq!(flatten_properties(&raw), raw);
    }

    #[test]
    fn reserved_keys_skipped_at_every_level() {
        let flat = flatten_properties(&map(json!({
            "type": "Building",
            "parents": ["X"],
            "children": ["Y"],
            "attributes": {"geometry": "ignored", "storeys": 3}
        })));
        let keys: Vec<&str> = flat.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["type", "attributes.storeys"]);
    }

    #[test]
    fn insertion_order_is_kept() {
        let flat = flatten_properties(&map(json!({
            "z": 1,
            "m": {"y": 2, "b": {"c": 3}},
            "a": 4
        })));
        let keys: Vec<&str> = flat.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "m.y", "m.b.c", "a"]);
    }

    #[test]
    fn arrays_and_nulls_are_leaves() {
        let flat = flatten_properties(&map(json!({"tags": ["a", "b"], "owner": null})));
        assert_eq!(flat.get("tags"), Some(&json!(["a", "b"])));
        assert_eq!(flat.get("owner"), Some(&Value::Null));
    }

    #[test]
    fn last_writer_wins_on_collision() {
        let flat = flatten_properties(&map(json!({"a.b": 1, "a": {"b": 2}})));
        assert_eq!(flat.len(), 1);
        assert_eq!(flat.get("a.b"), Some(&json!(2)));
    }
}
