use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{GatewayError, Result};
use crate::models::{
    BuilderQueryModel, CanonicalQuery, CodeQueryModel, ModeDiscriminator, QueryPayload,
};

/// Discriminator value selecting the code-mode wire shape. Anything else,
/// including an absent discriminator, falls back to the builder shape.
const CODE_MODE: &str = "code";

/// Resolves a raw query descriptor into a [`CanonicalQuery`].
///
/// The descriptor is decoded in two phases: the discriminator alone first,
/// then the one matching variant in full. Code-mode payloads carry a second,
/// inner JSON document which is parsed independently. Exactly one variant is
/// ever decoded per request.
pub fn canonicalize(raw: &Value) -> Result<CanonicalQuery> {
    let teller = ModeDiscriminator::deserialize(raw)
        .map_err(|err| GatewayError::BadRequest(format!("mode discriminator: {err}")))?;

    let qm = if teller.editor_mode != CODE_MODE {
        BuilderQueryModel::deserialize(raw)
            .map_err(|err| GatewayError::BadRequest(format!("builder-mode query: {err}")))?
    } else {
        let code = CodeQueryModel::deserialize(raw)
            .map_err(|err| GatewayError::BadRequest(format!("code-mode query: {err}")))?;

        let payload: QueryPayload = serde_json::from_str(&code.payload)
            .map_err(|err| GatewayError::BadRequest(format!("code-mode payload: {err}")))?;

        BuilderQueryModel {
            target: code.target,
            payload,
            interval_ms: code.interval_ms,
            max_data_points: code.max_data_points,
            time_range: code.time_range,
        }
    };

    debug!(target = %qm.target, projection = %qm.payload.projection, "normalized query");

    Ok(CanonicalQuery {
        collection: qm.target,
        find_query: qm.payload.find_query,
        projection: qm.payload.projection,
        max_points: qm.max_data_points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn builder_descriptor() -> Value {
        json!({
            "editorMode": "builder",
            "target": "cpu",
            "payload": {"findQuery": "{'host': 'web-1'}", "projection": "usage_idle"},
            "intervalMs": 1000,
            "maxDataPoints": 500,
            "timeRange": {"from": "2024-01-01T00:00:00Z", "to": "2024-01-02T00:00:00Z"}
        })
    }

    fn code_descriptor() -> Value {
        json!({
            "editorMode": "code",
            "target": "cpu",
            "payload": "{\"findQuery\": \"{'host': 'web-1'}\", \"projection\": \"usage_idle\"}",
            "intervalMs": 1000,
            "maxDataPoints": 500,
            "timeRange": {"from": "2024-01-01T00:00:00Z", "to": "2024-01-02T00:00:00Z"}
        })
    }

    #[test]
    fn builder_mode_normalizes() {
        let canonical = canonicalize(&builder_descriptor()).unwrap();
        assert_eq!(
            canonical,
            CanonicalQuery {
                collection: "cpu".to_string(),
                find_query: "{'host': 'web-1'}".to_string(),
                projection: "usage_idle".to_string(),
                max_points: 500,
            }
        );
    }

    #[test]
    fn code_and_builder_modes_agree() {
        let from_builder = canonicalize(&builder_descriptor()).unwrap();
        let from_code = canonicalize(&code_descriptor()).unwrap();
        assert_eq!(from_builder, from_code);
    }

    #[test]
    fn unknown_mode_falls_back_to_builder() {
        let mut raw = builder_descriptor();
        raw["editorMode"] = json!("something-new");
        let canonical = canonicalize(&raw).unwrap();
        assert_eq!(canonical.collection, "cpu");
    }

    #[test]
    fn absent_mode_falls_back_to_builder() {
        let mut raw = builder_descriptor();
        raw.as_object_mut().unwrap().remove("editorMode");
        assert!(canonicalize(&raw).is_ok());
    }

    #[test]
    fn empty_find_query_is_valid() {
        let raw = json!({
            "editorMode": "builder",
            "target": "cpu",
            "payload": {"projection": "usage_idle"},
            "maxDataPoints": 100
        });
        let canonical = canonicalize(&raw).unwrap();
        assert_eq!(canonical.find_query, "");
    }

    #[test]
    fn malformed_inner_payload_is_a_bad_request() {
        let mut raw = code_descriptor();
        raw["payload"] = json!("{not valid json");
        let err = canonicalize(&raw).unwrap_err();
        assert_eq!(err.kind(), "bad_request");
        assert!(err.to_string().contains("code-mode payload"));
    }

    #[test]
    fn missing_target_is_a_bad_request() {
        let raw = json!({"editorMode": "builder", "payload": {}});
        let err = canonicalize(&raw).unwrap_err();
        assert_eq!(err.kind(), "bad_request");
    }
}
