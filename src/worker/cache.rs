//! In-memory Cache Storage: named stores of URL → response.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Response kind as exposed by `Response.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Basic,
    /// Cross-origin no-cors response: status 0, unreadable body.
    Opaque,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
    pub kind: ResponseKind,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            kind: ResponseKind::Basic,
        }
    }

    pub fn opaque() -> Self {
        Self {
            status: 0,
            body: Vec::new(),
            kind: ResponseKind::Opaque,
        }
    }

    /// `Response.ok`: 2xx only. Opaque responses report status 0 and are never ok.
    pub fn ok(&self) -> bool {
        self.kind != ResponseKind::Opaque && (200..300).contains(&self.status)
    }
}

/// Named stores, shared by every in-flight event of a worker.
#[derive(Clone, Default)]
pub struct CacheStorage {
    stores: Arc<RwLock<BTreeMap<String, HashMap<String, Response>>>>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store names, sorted.
    pub async fn keys(&self) -> Vec<String> {
        self.stores.read().await.keys().cloned().collect()
    }

    /// Create the store if missing (`caches.open`).
    pub async fn open(&self, name: &str) {
        self.stores
            .write()
            .await
            .entry(name.to_string())
            .or_default();
    }

    pub async fn delete(&self, name: &str) -> bool {
        let removed = self.stores.write().await.remove(name).is_some();
        debug!(cache = %name, removed, "cache store delete");
        removed
    }

    pub async fn match_in(&self, name: &str, key: &str) -> Option<Response> {
        self.stores
            .read()
            .await
            .get(name)
            .and_then(|store| store.get(key))
            .cloned()
    }

    pub async fn put(&self, name: &str, key: &str, response: Response) {
        self.stores
            .write()
            .await
            .entry(name.to_string())
            .or_default()
            .insert(key.to_string(), response);
    }

    /// Insert every entry under one write lock; readers see all or none.
    pub async fn put_all(&self, name: &str, entries: Vec<(String, Response)>) {
        let mut stores = self.stores.write().await;
        let store = stores.entry(name.to_string()).or_default();
        store.extend(entries);
    }

    /// Keys of one store, sorted.
    pub async fn entries(&self, name: &str) -> Vec<String> {
        let stores = self.stores.read().await;
        let mut keys: Vec<String> = stores
            .get(name)
            .map(|store| store.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_status_range() {
        assert!(Response::new(200, "x").ok());
        assert!(Response::new(204, "").ok());
        assert!(!Response::new(301, "").ok());
        assert!(!Response::new(404, "").ok());
        assert!(!Response::opaque().ok());
    }

    #[tokio::test]
    async fn put_and_match() {
        let caches = CacheStorage::new();
        caches.put("v1", "/a.js", Response::new(200, "a")).await;
        assert_eq!(
            caches.match_in("v1", "/a.js").await,
            Some(Response::new(200, "a"))
        );
        assert_eq!(caches.match_in("v2", "/a.js").await, None);
        assert_eq!(caches.match_in("v1", "/b.js").await, None);
    }

    #[tokio::test]
    async fn delete_removes_store() {
        let caches = CacheStorage::new();
        caches.open("v1").await;
        caches.open("v2").await;
        assert_eq!(caches.keys().await, vec!["v1", "v2"]);
        assert!(caches.delete("v1").await);
        assert!(!caches.delete("v1").await);
        assert_eq!(caches.keys().await, vec!["v2"]);
    }
}
