//! Push payloads (push service → worker) and the notification built from them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Title used when the payload carries none.
pub const DEFAULT_NOTIFICATION_TITLE: &str = "New notification";

/// Payload a push backend sends. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Opaque data handed back on click; `url` selects the window to focus/open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Notification the worker shows for a push event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: Option<String>,
    pub icon: Option<String>,
    pub badge: Option<String>,
    pub tag: Option<String>,
    pub data: Value,
}

impl Notification {
    /// Build from a raw push body. JSON objects are read field by field; a body
    /// that is not JSON becomes the title as plain text.
    ///
    /// Numbers and booleans are shown as text (`{"title": 5}` gives `"5"`), and
    /// a falsy title (`""`, `0`, `false`, `null`) falls back to the default.
    /// Objects and arrays are never shown as text.
    pub fn from_push(raw: Option<&[u8]>) -> Self {
        let Some(raw) = raw else {
            return Self::titled(None);
        };
        match serde_json::from_slice::<Value>(raw) {
            Ok(Value::Object(fields)) => {
                let text = |key: &str| fields.get(key).and_then(scalar_text);
                let title = fields.get("title").filter(|t| truthy(t)).and_then(scalar_text);
                Self {
                    title: non_empty_or_default(title),
                    body: text("body"),
                    icon: text("icon"),
                    badge: text("badge"),
                    tag: text("tag"),
                    data: fields
                        .get("data")
                        .filter(|d| !d.is_null())
                        .cloned()
                        .unwrap_or_else(empty_data),
                }
            }
            // Valid JSON that is not an object has no title field.
            Ok(_) => Self::titled(None),
            Err(_) => Self::titled(Some(String::from_utf8_lossy(raw).into_owned())),
        }
    }

    fn titled(title: Option<String>) -> Self {
        Self {
            title: non_empty_or_default(title),
            body: None,
            icon: None,
            badge: None,
            tag: None,
            data: empty_data(),
        }
    }

    /// URL to open on click, `/` when the payload gave none.
    pub fn target_url(&self) -> &str {
        click_target(&self.data)
    }
}

/// Resolve `data.url` of a notification, defaulting to `/`.
pub fn click_target(data: &Value) -> &str {
    data.get("url").and_then(Value::as_str).unwrap_or("/")
}

/// Text form of a JSON scalar, formatted the way JS `String()` would.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 && !n.is_i64() && !n.is_u64() => {
                (f as i64).to_string()
            }
            _ => n.to_string(),
        }),
        _ => None,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn non_empty_or_default(title: Option<String>) -> String {
    title
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_NOTIFICATION_TITLE.to_string())
}

fn empty_data() -> Value {
    Value::Object(Default::default())
}
