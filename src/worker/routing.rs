//! Fetch routing: which policy answers a request.

use crate::services::generator::GeneratorConfig;
use crate::worker::clients::origin_of;

/// `Request.mode` as seen by the worker's fetch handler. Only navigation
/// changes routing; every other mode is treated alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    Navigate,
    Cors,
}

/// Request intercepted by the worker. The cache key is derived from `url`
/// by [`cache_key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub mode: RequestMode,
}

impl Request {
    /// Subresource request (fetch/XHR/asset).
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: RequestMode::Cors,
        }
    }

    pub fn navigate(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: RequestMode::Navigate,
        }
    }

    pub fn path(&self) -> &str {
        request_path(&self.url)
    }
}

/// Path component of an absolute URL or origin-relative reference, without
/// query or fragment. `https://app.example/api/x?q=1` -> `/api/x`.
pub fn request_path(url: &str) -> &str {
    let rest = match url.split_once("://") {
        Some((_, after_scheme)) => match after_scheme.find('/') {
            Some(idx) => &after_scheme[idx..],
            None => "/",
        },
        None => url,
    };
    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    &rest[..end]
}

/// Key a URL is stored under, as `Cache.match` compares requests.
///
/// Same-origin absolute URLs reduce to path plus query, and relative
/// references resolve against the scope root, so `https://app.example/a.js`,
/// `./a.js` and `/a.js` share one entry. Cross-origin URLs keep their origin.
/// The fragment is never part of the key.
pub fn cache_key(origin: &str, url: &str) -> String {
    let url = url.split('#').next().unwrap_or_default();
    match origin_of(url) {
        Some(url_origin) if Some(&url_origin) == origin_of(origin).as_ref() => {
            let after_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
            match after_scheme.find(['/', '?']) {
                Some(idx) if after_scheme[idx..].starts_with('/') => after_scheme[idx..].to_string(),
                Some(idx) => format!("/{}", &after_scheme[idx..]),
                None => "/".to_string(),
            }
        }
        Some(_) => url.to_string(),
        None if url.contains("://") => url.to_string(),
        None => {
            let mut rest = url;
            while let Some(stripped) = rest.strip_prefix("./") {
                rest = stripped;
            }
            if rest == "." {
                rest = "";
            }
            if rest.starts_with('/') {
                rest.to_string()
            } else {
                format!("/{}", rest)
            }
        }
    }
}

/// Policy chosen for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Cached navigation fallback, live fetch when absent.
    NavigationFallback,
    /// Always network, cache untouched.
    NetworkOnly,
    /// Network, store on success, cache on failure.
    NetworkFirst,
    /// Cache, network on miss, no store.
    CacheFirst,
}

/// Navigation bypasses prefixes; network-only wins over network-first;
/// within a list the first matching prefix wins.
pub fn route(config: &GeneratorConfig, request: &Request) -> Route {
    if request.mode == RequestMode::Navigate {
        return Route::NavigationFallback;
    }
    let path = request.path();
    if matches_prefix(path, &config.network_only_prefixes) {
        Route::NetworkOnly
    } else if matches_prefix(path, &config.network_first_prefixes) {
        Route::NetworkFirst
    } else {
        Route::CacheFirst
    }
}

fn matches_prefix(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GeneratorConfig {
        GeneratorConfig::new("v1", vec!["/".to_string()])
            .with_network_first(vec!["/api/".to_string()])
            .with_network_only(vec!["/auth/".to_string(), "/api/live/".to_string()])
    }

    #[test]
    fn request_path_variants() {
        assert_eq!(request_path("/api/x"), "/api/x");
        assert_eq!(request_path("/api/x?page=2#top"), "/api/x");
        assert_eq!(request_path("https://app.example/api/x?q=1"), "/api/x");
        assert_eq!(request_path("https://app.example"), "/");
        assert_eq!(request_path("http://localhost:8080/"), "/");
    }

    #[test]
    fn same_origin_urls_share_a_cache_key() {
        let origin = "https://app.example";
        assert_eq!(cache_key(origin, "https://app.example/a.js"), "/a.js");
        assert_eq!(cache_key(origin, "https://APP.example:443/a.js"), "/a.js");
        assert_eq!(cache_key(origin, "/a.js"), "/a.js");
        assert_eq!(cache_key(origin, "./a.js"), "/a.js");
        assert_eq!(cache_key(origin, "a.js"), "/a.js");
        assert_eq!(cache_key(origin, "./"), "/");
        assert_eq!(cache_key(origin, "https://app.example"), "/");
        assert_eq!(cache_key(origin, "https://app.example?v=1"), "/?v=1");
    }

    #[test]
    fn cache_key_keeps_query_and_drops_fragment() {
        let origin = "https://app.example";
        assert_eq!(cache_key(origin, "https://app.example/api/x?q=1#top"), "/api/x?q=1");
        assert_eq!(cache_key(origin, "/api/x?q=1#top"), "/api/x?q=1");
    }

    #[test]
    fn cross_origin_cache_key_keeps_origin() {
        let origin = "https://app.example";
        assert_eq!(
            cache_key(origin, "https://cdn.example/lib.js#x"),
            "https://cdn.example/lib.js"
        );
        assert_eq!(cache_key(origin, "http://app.example/a.js"), "http://app.example/a.js");
    }

    #[test]
    fn navigation_ignores_prefixes() {
        assert_eq!(
            route(&config(), &Request::navigate("/auth/login")),
            Route::NavigationFallback
        );
        assert_eq!(
            route(&config(), &Request::navigate("/api/x")),
            Route::NavigationFallback
        );
    }

    #[test]
    fn network_only_before_network_first() {
        assert_eq!(route(&config(), &Request::get("/api/live/feed")), Route::NetworkOnly);
        assert_eq!(route(&config(), &Request::get("/api/x")), Route::NetworkFirst);
        assert_eq!(route(&config(), &Request::get("/auth/login")), Route::NetworkOnly);
    }

    #[test]
    fn query_does_not_affect_prefix_match() {
        assert_eq!(
            route(&config(), &Request::get("https://app.example/api/x?since=1")),
            Route::NetworkFirst
        );
    }

    #[test]
    fn everything_else_is_cache_first() {
        assert_eq!(route(&config(), &Request::get("/a.js")), Route::CacheFirst);
        assert_eq!(route(&config(), &Request::get("/apix")), Route::CacheFirst);
    }
}
