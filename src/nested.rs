//! Nested-map transforms for dynamically-shaped configuration data.
//!
//! Database configuration fragments travel through the agent as
//! [`serde_json::Value`] trees: sections map to nested objects, settings to
//! leaf values. This module provides the three transforms the configuration
//! builders are written against:
//!
//! - [`update`] — deep-merge an update map into a target, section by section
//! - [`flatten`] — linearize a nested object into namespaced flat keys
//! - [`expand`] — rebuild the nested object from its flattened form

use serde_json::{Map, Value};

/// Separator used to join nested keys into a namespaced flat key.
pub const DEFAULT_NAMESPACE_SEP: &str = ".";

/// Recursively merge an update map into a target value.
///
/// Updates are key-value pairs where a value may itself be an object, in
/// which case its key is treated as a sub-section of the outer key and the
/// merge recurses into the target's existing value there. Any other update
/// value (scalars and arrays alike) overwrites the target's value outright.
/// Keys present in the target but absent from the updates are left untouched.
///
/// If the target is an array, the updates are applied independently to every
/// element and the array is returned. A missing target, or a target that is
/// neither an object nor an array, is treated as an empty object.
///
/// # Arguments
///
/// * `updates` - Update map to apply, or `None` for no-op
/// * `target` - Value to merge into, or `None` for an empty object
///
/// # Returns
///
/// The merged value. Always an object or an array, never a scalar.
///
/// # Examples
///
/// ```
/// # use guest_utils::nested::update;
/// # use serde_json::json;
/// let updates = json!({"mysqld": {"max_connections": 100}});
/// let merged = update(
///     updates.as_object(),
///     Some(json!({"mysqld": {"datadir": "/var/lib/mysql"}})),
/// );
/// assert_eq!(
///     merged,
///     json!({"mysqld": {"datadir": "/var/lib/mysql", "max_connections": 100}})
/// );
/// ```
#[must_use]
pub fn update(updates: Option<&Map<String, Value>>, target: Option<Value>) -> Value {
    let target = target.unwrap_or_else(|| Value::Object(Map::new()));

    let mut merged = match target {
        Value::Array(items) => {
            return Value::Array(
                items
                    .into_iter()
                    .map(|item| update(updates, Some(item)))
                    .collect(),
            );
        }
        Value::Object(map) => map,
        _ => Map::new(),
    };

    if let Some(updates) = updates {
        for (key, value) in updates {
            match value {
                Value::Object(section) => {
                    let existing = merged.remove(key);
                    merged.insert(key.clone(), update(Some(section), existing));
                }
                other => {
                    merged.insert(key.clone(), other.clone());
                }
            }
        }
    }

    Value::Object(merged)
}

/// Flatten a nested object into a one-level map with keys joined by
/// [`DEFAULT_NAMESPACE_SEP`].
///
/// The nested object:
///
/// ```text
/// {"ns1": {"ns2a": {"ns3a": true, "ns3b": false}, "ns2b": 10}}
/// ```
///
/// flattens to:
///
/// ```text
/// {"ns1.ns2a.ns3a": true, "ns1.ns2a.ns3b": false, "ns1.ns2b": 10}
/// ```
///
/// Arrays are kept as leaf values, not traversed into. If two paths join to
/// the same flat key (a key already containing the separator), the last
/// one written wins.
#[must_use]
pub fn flatten(target: &Map<String, Value>) -> Map<String, Value> {
    flatten_with(target, DEFAULT_NAMESPACE_SEP)
}

/// [`flatten`] with a caller-chosen namespace separator.
#[must_use]
pub fn flatten_with(target: &Map<String, Value>, namespace_sep: &str) -> Map<String, Value> {
    let mut flattened = Map::new();
    for (key, value) in target {
        flatten_value(&mut flattened, key, value, namespace_sep);
    }
    flattened
}

/// Depth-first accumulator for [`flatten_with`].
fn flatten_value(out: &mut Map<String, Value>, prefix: &str, value: &Value, namespace_sep: &str) {
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                flatten_value(out, &format!("{prefix}{namespace_sep}{key}"), value, namespace_sep);
            }
        }
        leaf => {
            out.insert(prefix.to_string(), leaf.clone());
        }
    }
}

/// Expand a flat, namespaced map into a nested object.
///
/// This is the inverse of [`flatten`]: each key is split on
/// [`DEFAULT_NAMESPACE_SEP`] and intermediate objects are created for every
/// segment but the last. Keys sharing a prefix share the same sub-object.
#[must_use]
pub fn expand(target: &Map<String, Value>) -> Map<String, Value> {
    expand_with(target, DEFAULT_NAMESPACE_SEP)
}

/// [`expand`] with a caller-chosen namespace separator.
#[must_use]
pub fn expand_with(target: &Map<String, Value>, namespace_sep: &str) -> Map<String, Value> {
    let mut nested = Map::new();
    for (key, value) in target {
        let segments: Vec<&str> = key.split(namespace_sep).collect();
        insert_namespaced(&mut nested, &segments, value.clone());
    }
    nested
}

/// Walk/create nested objects along `segments` and assign `value` at the last
/// segment. A non-object intermediate is replaced, so later keys always land.
fn insert_namespaced(map: &mut Map<String, Value>, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => {
            map.insert((*last).to_string(), value);
        }
        [head, rest @ ..] => {
            let entry = map
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(sub) = entry {
                insert_namespaced(sub, rest, value);
            } else {
                let mut sub = Map::new();
                insert_namespaced(&mut sub, rest, value);
                *entry = Value::Object(sub);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Unwrap a `json!` literal into its object map.
    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object literal, got {other}"),
        }
    }

    // ── update ──────────────────────────────────────────────────────────

    #[test]
    fn test_update_none_none_is_empty_object() {
        assert_eq!(update(None, None), json!({}));
    }

    #[test]
    fn test_update_empty_updates_returns_target_unchanged() {
        let target = json!({"a": 1, "b": {"c": 2}});
        assert_eq!(update(Some(&Map::new()), Some(target.clone())), target);
    }

    #[test]
    fn test_update_none_updates_normalizes_absent_target() {
        assert_eq!(update(None, Some(json!({"a": 1}))), json!({"a": 1}));
        assert_eq!(update(None, None), json!({}));
    }

    #[test]
    fn test_update_adds_new_keys() {
        let updates = obj(json!({"b": 2}));
        let merged = update(Some(&updates), Some(json!({"a": 1})));
        assert_eq!(merged, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_update_overwrites_scalars() {
        let updates = obj(json!({"a": 10}));
        let merged = update(Some(&updates), Some(json!({"a": 1, "b": 2})));
        assert_eq!(merged, json!({"a": 10, "b": 2}));
    }

    #[test]
    fn test_update_merges_nested_sections() {
        let updates = obj(json!({"x": {"y": 1}}));
        let merged = update(Some(&updates), Some(json!({"x": {"z": 2}})));
        assert_eq!(merged, json!({"x": {"y": 1, "z": 2}}));
    }

    #[test]
    fn test_update_preserves_untouched_keys() {
        let updates = obj(json!({"mysqld": {"port": 3307}}));
        let target = json!({
            "mysqld": {"port": 3306, "datadir": "/var/lib/mysql"},
            "client": {"socket": "/tmp/mysql.sock"}
        });
        let merged = update(Some(&updates), Some(target));
        assert_eq!(
            merged,
            json!({
                "mysqld": {"port": 3307, "datadir": "/var/lib/mysql"},
                "client": {"socket": "/tmp/mysql.sock"}
            })
        );
    }

    #[test]
    fn test_update_array_value_overwrites_outright() {
        let updates = obj(json!({"include": ["a.cnf", "b.cnf"]}));
        let merged = update(Some(&updates), Some(json!({"include": ["old.cnf"]})));
        assert_eq!(merged, json!({"include": ["a.cnf", "b.cnf"]}));
    }

    #[test]
    fn test_update_section_onto_missing_key() {
        let updates = obj(json!({"new": {"a": 1}}));
        let merged = update(Some(&updates), Some(json!({"old": true})));
        assert_eq!(merged, json!({"old": true, "new": {"a": 1}}));
    }

    #[test]
    fn test_update_section_onto_scalar_replaces_it() {
        let updates = obj(json!({"a": {"b": 1}}));
        let merged = update(Some(&updates), Some(json!({"a": 5})));
        assert_eq!(merged, json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_update_applies_to_every_array_element() {
        let updates = obj(json!({"enabled": true}));
        let target = json!([{"name": "one"}, {"name": "two"}]);
        let merged = update(Some(&updates), Some(target));
        assert_eq!(
            merged,
            json!([
                {"name": "one", "enabled": true},
                {"name": "two", "enabled": true}
            ])
        );
    }

    #[test]
    fn test_update_array_distributes_like_per_element_calls() {
        let updates = obj(json!({"x": {"y": 1}}));
        let t1 = json!({"x": {"z": 2}});
        let t2 = json!({"w": 3});

        let merged = update(Some(&updates), Some(json!([t1.clone(), t2.clone()])));
        let expected = json!([
            update(Some(&updates), Some(t1)),
            update(Some(&updates), Some(t2))
        ]);
        assert_eq!(merged, expected);
    }

    #[test]
    fn test_update_recurses_into_nested_arrays() {
        let updates = obj(json!({"servers": {"port": 5432}}));
        let target = json!({"servers": [{"host": "a"}, {"host": "b"}]});
        let merged = update(Some(&updates), Some(target));
        assert_eq!(
            merged,
            json!({"servers": [
                {"host": "a", "port": 5432},
                {"host": "b", "port": 5432}
            ]})
        );
    }

    #[test]
    fn test_update_key_recursion_matches_subtree_merge() {
        let updates = obj(json!({"k": {"a": 1, "b": {"c": 2}}}));
        let target = json!({"k": {"b": {"d": 3}, "e": 4}});

        let merged = update(Some(&updates), Some(target.clone()));
        let sub_updates = obj(json!({"a": 1, "b": {"c": 2}}));
        let sub_target = target.get("k").cloned();
        assert_eq!(merged["k"], update(Some(&sub_updates), sub_target));
    }

    #[test]
    fn test_update_scalar_target_treated_as_empty_object() {
        let updates = obj(json!({"a": 1}));
        assert_eq!(update(Some(&updates), Some(json!(42))), json!({"a": 1}));
        assert_eq!(update(Some(&updates), Some(json!(null))), json!({"a": 1}));
    }

    #[test]
    fn test_update_deeply_nested_merge() {
        let updates = obj(json!({"a": {"b": {"c": {"d": 1}}}}));
        let merged = update(Some(&updates), Some(json!({"a": {"b": {"c": {"e": 2}, "f": 3}}})));
        assert_eq!(merged, json!({"a": {"b": {"c": {"d": 1, "e": 2}, "f": 3}}}));
    }

    // ── flatten ─────────────────────────────────────────────────────────

    #[test]
    fn test_flatten_simple_nesting() {
        let target = obj(json!({"a": {"b": 1, "c": 2}, "d": 3}));
        let flat = flatten(&target);
        assert_eq!(Value::Object(flat), json!({"a.b": 1, "a.c": 2, "d": 3}));
    }

    #[test]
    fn test_flatten_three_levels() {
        let target = obj(json!({"ns1": {"ns2a": {"ns3a": true, "ns3b": false}, "ns2b": 10}}));
        let flat = flatten(&target);
        assert_eq!(
            Value::Object(flat),
            json!({"ns1.ns2a.ns3a": true, "ns1.ns2a.ns3b": false, "ns1.ns2b": 10})
        );
    }

    #[test]
    fn test_flatten_empty_map() {
        assert!(flatten(&Map::new()).is_empty());
    }

    #[test]
    fn test_flatten_empty_section_vanishes() {
        let target = obj(json!({"a": {}, "b": 1}));
        let flat = flatten(&target);
        assert_eq!(Value::Object(flat), json!({"b": 1}));
    }

    #[test]
    fn test_flatten_keeps_arrays_as_leaves() {
        let target = obj(json!({"a": {"list": [1, 2, 3]}}));
        let flat = flatten(&target);
        assert_eq!(Value::Object(flat), json!({"a.list": [1, 2, 3]}));
    }

    #[test]
    fn test_flatten_custom_separator() {
        let target = obj(json!({"a": {"b": 1}}));
        let flat = flatten_with(&target, "/");
        assert_eq!(Value::Object(flat), json!({"a/b": 1}));
    }

    #[test]
    fn test_flatten_colliding_paths_last_write_wins() {
        // "a.b" as a literal key collides with the nested path a -> b.
        let target = obj(json!({"a": {"b": 1}, "a.b": 2}));
        let flat = flatten(&target);
        // Map iteration is key-ordered, so the literal key is visited
        // after the section it collides with and wins.
        assert_eq!(Value::Object(flat), json!({"a.b": 2}));
    }

    // ── expand ──────────────────────────────────────────────────────────

    #[test]
    fn test_expand_simple_namespaces() {
        let target = obj(json!({"a.b": 1, "a.c": 2, "d": 3}));
        let nested = expand(&target);
        assert_eq!(Value::Object(nested), json!({"a": {"b": 1, "c": 2}, "d": 3}));
    }

    #[test]
    fn test_expand_shared_prefixes_share_submaps() {
        let target = obj(json!({"x.y.z": 1, "x.y.w": 2, "x.v": 3}));
        let nested = expand(&target);
        assert_eq!(
            Value::Object(nested),
            json!({"x": {"y": {"z": 1, "w": 2}, "v": 3}})
        );
    }

    #[test]
    fn test_expand_empty_map() {
        assert!(expand(&Map::new()).is_empty());
    }

    #[test]
    fn test_expand_custom_separator() {
        let target = obj(json!({"a/b": 1}));
        let nested = expand_with(&target, "/");
        assert_eq!(Value::Object(nested), json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_expand_scalar_prefix_conflict_last_write_wins() {
        let target = obj(json!({"a": 1, "a.b": 2}));
        let nested = expand(&target);
        assert_eq!(Value::Object(nested), json!({"a": {"b": 2}}));
    }

    #[test]
    fn test_expand_keeps_array_leaves() {
        let target = obj(json!({"a.list": [1, 2]}));
        let nested = expand(&target);
        assert_eq!(Value::Object(nested), json!({"a": {"list": [1, 2]}}));
    }

    // ── round trips ─────────────────────────────────────────────────────

    #[test]
    fn test_expand_inverts_flatten() {
        let original = obj(json!({
            "mysqld": {
                "port": 3306,
                "replication": {"server_id": 7, "log_bin": "binlog"},
                "include": ["extra.cnf"]
            },
            "client": {"socket": "/tmp/mysql.sock"}
        }));
        assert_eq!(expand(&flatten(&original)), original);
    }

    #[test]
    fn test_expand_inverts_flatten_with_custom_separator() {
        let original = obj(json!({"a": {"b": {"c": 1}}, "d": true}));
        assert_eq!(expand_with(&flatten_with(&original, ":"), ":"), original);
    }
}
