//! Notification click routing against open window clients.

use serde_json::Value;

use crate::models::event::WorkerMessage;
use crate::models::push::click_target;

/// Window client returned by `clients.matchAll({type: "window", includeUncontrolled: true})`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowClient {
    pub id: String,
    pub url: String,
}

/// What the worker does after closing a clicked notification.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickAction {
    /// Focus an existing same-origin window and post it the click.
    Focus {
        client_id: String,
        message: WorkerMessage,
    },
    OpenWindow { url: String },
}

/// Origin (`scheme://host[:port]`, lowercased) of an absolute http(s) URL.
/// The scheme's default port is dropped, as `URL.origin` does.
pub(crate) fn origin_of(url: &str) -> Option<String> {
    let (scheme, rest) = url.split_once("://")?;
    let scheme = scheme.to_lowercase();
    if scheme != "https" && scheme != "http" {
        return None;
    }
    let host = rest.split(['/', '?', '#']).next()?.to_lowercase();
    let host = match (scheme.as_str(), host.rsplit_once(':')) {
        ("https", Some((bare, "443"))) | ("http", Some((bare, "80"))) => bare.to_string(),
        _ => host,
    };
    if host.is_empty() {
        return None;
    }
    Some(format!("{}://{}", scheme, host))
}

/// First window whose origin equals the worker's wins; otherwise open `data.url`.
pub fn resolve_click(worker_origin: &str, data: &Value, clients: &[WindowClient]) -> ClickAction {
    let url = click_target(data).to_string();
    let own = origin_of(worker_origin);
    let found = clients
        .iter()
        .find(|client| own.is_some() && origin_of(&client.url) == own);

    match found {
        Some(client) => ClickAction::Focus {
            client_id: client.id.clone(),
            message: WorkerMessage::NotificationClicked { url },
        },
        None => ClickAction::OpenWindow { url },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(id: &str, url: &str) -> WindowClient {
        WindowClient {
            id: id.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn origin_of_http_https() {
        assert_eq!(origin_of("https://App.Example.com/x"), Some("https://app.example.com".to_string()));
        assert_eq!(origin_of("http://localhost:3000"), Some("http://localhost:3000".to_string()));
        assert_eq!(origin_of("https://a.example?x=1"), Some("https://a.example".to_string()));
    }

    #[test]
    fn default_ports_are_ignored() {
        assert_eq!(origin_of("https://app.example:443/x"), Some("https://app.example".to_string()));
        assert_eq!(origin_of("http://app.example:80"), Some("http://app.example".to_string()));
        assert_eq!(origin_of("http://app.example:443"), Some("http://app.example:443".to_string()));
        assert_eq!(origin_of("https://[::1]:443/"), Some("https://[::1]".to_string()));

        let clients = [client("w1", "https://app.example:443/inbox")];
        let action = resolve_click("https://app.example", &json!({ "url": "/inbox/7" }), &clients);
        assert!(matches!(action, ClickAction::Focus { client_id, .. } if client_id == "w1"));
    }

    #[test]
    fn origin_of_invalid() {
        assert_eq!(origin_of("not-a-url"), None);
        assert_eq!(origin_of("/relative"), None);
        assert_eq!(origin_of("file:///tmp/x"), None);
        assert_eq!(origin_of("https://"), None);
    }

    #[test]
    fn focuses_first_same_origin_window() {
        let clients = [
            client("other", "https://elsewhere.example/"),
            client("a", "https://app.example/settings"),
            client("b", "https://app.example/"),
        ];
        let action = resolve_click("https://app.example", &json!({ "url": "/inbox/7" }), &clients);
        assert_eq!(
            action,
            ClickAction::Focus {
                client_id: "a".to_string(),
                message: WorkerMessage::NotificationClicked { url: "/inbox/7".to_string() },
            }
        );
    }

    #[test]
    fn opens_window_when_no_client_matches() {
        let clients = [client("other", "https://elsewhere.example/")];
        let action = resolve_click("https://app.example", &json!({ "url": "/inbox/7" }), &clients);
        assert_eq!(action, ClickAction::OpenWindow { url: "/inbox/7".to_string() });
    }

    #[test]
    fn missing_url_defaults_to_root() {
        let action = resolve_click("https://app.example", &json!({}), &[]);
        assert_eq!(action, ClickAction::OpenWindow { url: "/".to_string() });
    }
}
