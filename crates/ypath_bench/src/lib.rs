//! Generated documents for the path benchmarks

use serde_json::{Value, json};

/// Inventory-like document with `items` entries under `store.items`
///
/// Every third item is named `foo`, the others `bar`.
pub fn sample_document(items: usize) -> Value {
    let items: Vec<Value> = (0..items)
        .map(|i| {
            json!({
                "name": if i % 3 == 0 { "foo" } else { "bar" },
                "value": i,
                "tags": ["a", "b", "c"],
                "details": {"price": i * 10, "in stock": i % 2 == 0},
            })
        })
        .collect();
    json!({"store": {"name": "sample", "items": items}})
}

/// Document nested `depth` maps deep under the key `a`, ending in `{"value": depth}`
pub fn deep_document(depth: usize) -> Value {
    (0..depth).fold(json!({"value": depth}), |inner, _| json!({"a": inner}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_document_shape() {
        let doc = sample_document(4);
        assert_eq!(doc["store"]["items"].as_array().map(Vec::len), Some(4));
        assert_eq!(doc["store"]["items"][3]["name"], json!("foo"));
    }

    #[test]
    fn test_deep_document() {
        let doc = deep_document(2);
        assert_eq!(doc, json!({"a": {"a": {"value": 2}}}));
    }
}
