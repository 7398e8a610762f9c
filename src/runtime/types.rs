//! Wire types for the agent runtime's `/run` endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::AgentError;
use crate::chat::RequestPayload;

/// Base64 inline payload carried next to the prompt text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Untagged union of text and inline media parts.
///
/// Variant order matters for `#[serde(untagged)]` decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl From<&RequestPayload> for Content {
    fn from(payload: &RequestPayload) -> Self {
        let mut parts = vec![Part::Text {
            text: payload.prompt.clone(),
        }];
        if let Some(inline_data) = &payload.inline_data {
            parts.push(Part::InlineData {
                inline_data: inline_data.clone(),
            });
        }
        Self {
            role: "user".to_string(),
            parts,
        }
    }
}

/// Envelope posted to `{base_url}/run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
    pub new_message: Content,
    pub streaming: bool,
}

impl RunRequest {
    pub fn new(app_name: &str, user_id: &str, session_id: &str, payload: &RequestPayload) -> Self {
        Self {
            app_name: app_name.to_string(),
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
            new_message: Content::from(payload),
            streaming: false,
        }
    }
}

/// Pull the summary text out of a runtime reply.
///
/// Accepts either `{"summary": "..."}` or the runtime's event list, in which
/// case the first text part of the last model event wins.
pub fn extract_summary(body: &Value) -> Result<String, AgentError> {
    if let Some(summary) = body.get("summary") {
        return summary
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AgentError::Format("`summary` is not a string".to_string()));
    }

    let events: Vec<&Value> = match body {
        Value::Array(events) => events.iter().collect(),
        Value::Object(obj) if obj.contains_key("content") => vec![body],
        _ => {
            return Err(AgentError::Format(
                "expected a `summary` field or a list of events".to_string(),
            ))
        }
    };

    let mut summary = None;
    for event in &events {
        let Some(content) = event.get("content") else {
            continue;
        };
        if content.get("role").and_then(|r| r.as_str()) != Some("model") {
            continue;
        }
        let text = content
            .get("parts")
            .and_then(|p| p.as_array())
            .and_then(|parts| parts.first())
            .and_then(|first| first.get("text"))
            .and_then(|t| t.as_str());
        if let Some(text) = text {
            summary = Some(text.to_string());
        }
    }

    summary.ok_or_else(|| {
        AgentError::Format(format!("no model text in {} event(s)", events.len()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_field_is_used_directly() {
        let body = json!({ "summary": "A red bicycle." });
        assert_eq!(extract_summary(&body).unwrap(), "A red bicycle.");
    }

    #[test]
    fn last_model_event_wins() {
        let body = json!([
            { "content": { "role": "user", "parts": [{ "text": "Describe this photo" }] } },
            { "content": { "role": "model", "parts": [{ "functionCall": { "name": "noop" } }] } },
            { "content": { "role": "model", "parts": [{ "text": "First draft." }] } },
            { "content": { "role": "model", "parts": [{ "text": "A dog on a beach." }] } },
            { "actions": {} }
        ]);
        assert_eq!(extract_summary(&body).unwrap(), "A dog on a beach.");
    }

    #[test]
    fn event_list_without_model_text_is_a_format_error() {
        let body = json!([
            { "content": { "role": "model", "parts": [] } },
            { "content": { "role": "user", "parts": [{ "text": "hello" }] } }
        ]);
        assert_eq!(
            extract_summary(&body),
            Err(AgentError::Format("no model text in 2 event(s)".to_string()))
        );
        assert!(extract_summary(&json!([])).is_err());
    }

    #[test]
    fn unexpected_shapes_are_format_errors() {
        assert!(matches!(
            extract_summary(&json!({ "answer": "x" })),
            Err(AgentError::Format(_))
        ));
        assert!(matches!(
            extract_summary(&json!({ "summary": 42 })),
            Err(AgentError::Format(_))
        ));
        assert!(extract_summary(&json!("plain string")).is_err());
    }

    #[test]
    fn run_request_matches_runtime_schema() {
        let payload = RequestPayload {
            prompt: "Describe this photo".to_string(),
            inline_data: Some(InlineData {
                mime_type: "image/jpeg".to_string(),
                data: "/9j/4A==".to_string(),
                display_name: Some("uploaded.jpg".to_string()),
            }),
        };
        let request = RunRequest::new("image_agent", "user-1", "session-1", &payload);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "appName": "image_agent",
                "userId": "user-1",
                "sessionId": "session-1",
                "newMessage": {
                    "role": "user",
                    "parts": [
                        { "text": "Describe this photo" },
                        { "inlineData": {
                            "mimeType": "image/jpeg",
                            "data": "/9j/4A==",
                            "displayName": "uploaded.jpg"
                        } }
                    ]
                },
                "streaming": false
            })
        );
    }

    #[test]
    fn text_only_message_has_a_single_part() {
        let payload = RequestPayload {
            prompt: "hi".to_string(),
            inline_data: None,
        };
        let content = Content::from(&payload);
        assert_eq!(content.parts.len(), 1);
        assert_eq!(content.role, "user");
    }
}
