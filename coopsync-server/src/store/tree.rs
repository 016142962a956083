use serde_json::{Map, Value};

use coopsync_api::parse::number_field;

use super::Query;

pub fn segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn read_node<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut node = root;

    for segment in segments {
        node = match node {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    (!node.is_null()).then_some(node)
}

/// Writes `value` below `node`. `null` removes the child, and parents left
/// empty are removed with it.
pub fn write_node(node: &mut Value, segments: &[String], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *node = value;
        return;
    };

    if !node.is_object() {
        if value.is_null() {
            return;
        }
        *node = Value::Object(Map::new());
    }

    let Value::Object(map) = node else {
        return;
    };

    if rest.is_empty() {
        if value.is_null() {
            map.remove(head);
        } else {
            map.insert(head.clone(), value);
        }
        return;
    }

    let child = map.entry(head.clone()).or_insert(Value::Null);
    write_node(child, rest, value);

    let empty = child.is_null() || child.as_object().is_some_and(Map::is_empty);
    if empty {
        map.remove(head);
    }
}

/// Keeps the last `limit_to_last` children ordered by `order_by`.
///
/// Children without a numeric `order_by` key sort first, like the hosted
/// database does with missing values.
pub fn limit_to_last(node: &Value, query: &Query) -> Option<Value> {
    let Value::Object(map) = node else {
        return (!node.is_null()).then(|| node.clone());
    };

    let mut children: Vec<(&String, &Value)> = map.iter().collect();
    children.sort_by(|(a_key, a), (b_key, b)| {
        let a_order = number_field(a, &query.order_by);
        let b_order = number_field(b, &query.order_by);

        a_order
            .partial_cmp(&b_order)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a_key.cmp(b_key))
    });

    let skip = children.len().saturating_sub(query.limit_to_last);
    let kept: Map<String, Value> = children
        .into_iter()
        .skip(skip)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    (!kept.is_empty()).then_some(Value::Object(kept))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_write_and_read() {
        let mut root = Value::Null;

        write_node(&mut root, &segments("/controls/feed"), json!(true));
        write_node(&mut root, &segments("/controls/feedDuration"), json!(3.0));

        assert_eq!(read_node(&root, &segments("/controls/feed")), Some(&json!(true)));
        assert_eq!(
            read_node(&root, &segments("/controls")),
            Some(&json!({ "feed": true, "feedDuration": 3.0 }))
        );
        assert_eq!(read_node(&root, &segments("/controls/fan")), None);
    }

    #[test]
    fn test_null_removes_and_prunes() {
        let mut root = json!({ "events": { "a": { "timestamp": 1 } }, "sensors": { "temperature": 20 } });

        write_node(&mut root, &segments("/events/a"), Value::Null);

        assert_eq!(root, json!({ "sensors": { "temperature": 20 } }));
        assert_eq!(read_node(&root, &segments("/events")), None);
    }

    #[test]
    fn test_limit_to_last() {
        let node = json!({
            "a": { "timestamp": 30 },
            "b": { "timestamp": 10 },
            "c": { "timestamp": "20" },
        });

        let limited = limit_to_last(&node, &Query::last("timestamp", 2)).unwrap();

        assert_eq!(limited, json!({ "a": { "timestamp": 30 }, "c": { "timestamp": "20" } }));
    }
}
