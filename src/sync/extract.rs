use serde_json::Value;

/// Placeholder when no strategy finds an identifier in the response.
pub const PLACEHOLDER_ID: &str = "OK";

type Extractor = fn(&Value) -> Option<String>;

/// Ordered extraction strategies. The CRM has shipped several response
/// shapes; the nested pubsub id is the authoritative one when present.
const STRATEGIES: &[(&str, Extractor)] = &[
    ("pubsub.process_leadID", from_pubsub),
    ("lead_id", from_lead_id),
    ("id", from_id),
    ("leadId", from_lead_id_camel),
];

/// Pulls a remote lead identifier out of a delivery response body. Never
/// fails: an unrecognized shape yields the `"OK"` placeholder.
pub fn extract_remote_id(body: &Value) -> String {
    for (name, extract) in STRATEGIES {
        if let Some(id) = extract(body) {
            tracing::debug!("Remote id extracted via {name}");
            return id;
        }
    }
    PLACEHOLDER_ID.to_string()
}

/// Searches every top-level value for a nested `pubsub.process_leadID`.
fn from_pubsub(body: &Value) -> Option<String> {
    body.as_object()?
        .values()
        .find_map(|entry| scalar(entry.get("pubsub")?.get("process_leadID")?))
}

fn from_lead_id(body: &Value) -> Option<String> {
    top_level(body, "lead_id")
}

fn from_id(body: &Value) -> Option<String> {
    top_level(body, "id")
}

fn from_lead_id_camel(body: &Value) -> Option<String> {
    top_level(body, "leadId")
}

fn top_level(body: &Value, key: &str) -> Option<String> {
    scalar(body.as_object()?.get(key)?)
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pubsub_id_wins() {
        let body = json!({
            "crm": { "pubsub": { "process_leadID": "PL-77" } },
            "lead_id": "shadowed",
            "id": "also-shadowed"
        });
        assert_eq!(extract_remote_id(&body), "PL-77");
    }

    #[test]
    fn test_pubsub_found_under_any_top_level_key() {
        let body = json!({
            "unrelated": 1,
            "whatever_envelope": { "pubsub": { "process_leadID": 4512 } }
        });
        assert_eq!(extract_remote_id(&body), "4512");
    }

    #[test]
    fn test_fallback_order() {
        assert_eq!(
            extract_remote_id(&json!({"lead_id": "a", "id": "b", "leadId": "c"})),
            "a"
        );
        assert_eq!(extract_remote_id(&json!({"id": "b", "leadId": "c"})), "b");
        assert_eq!(extract_remote_id(&json!({"leadId": "c"})), "c");
    }

    #[test]
    fn test_numeric_id_rendered_as_string() {
        assert_eq!(extract_remote_id(&json!({"id": 42})), "42");
    }

    #[test]
    fn test_unrecognized_shapes_yield_placeholder() {
        assert_eq!(extract_remote_id(&json!({"status": "accepted"})), "OK");
        assert_eq!(extract_remote_id(&json!([1, 2, 3])), "OK");
        assert_eq!(extract_remote_id(&json!("plain text")), "OK");
        assert_eq!(extract_remote_id(&Value::Null), "OK");
    }

    #[test]
    fn test_nested_null_does_not_match() {
        let body = json!({"envelope": {"pubsub": {"process_leadID": null}}, "id": "real"});
        assert_eq!(extract_remote_id(&body), "real");
    }
}
