//! Service worker generator: embeds a serialized [`GeneratorConfig`] into a fixed script body.

use serde::{Deserialize, Serialize};
use tracing::warn;
use validator::Validate;

use crate::error::GeneratorError;

const TEMPLATE: &str = include_str!("sw_template.js");
const CONFIG_PLACEHOLDER: &str = "__PWA_KIT_CONFIG__";

/// Input to [`generate`]. Field names on the wire are camelCase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    /// Cache store identifier. Must change with every deployed version.
    #[validate(length(min = 1))]
    pub cache_name: String,
    /// Fetched and stored atomically at install time, in order. Relative URLs
    /// resolve against the worker script, as `cache.addAll` does.
    pub precache_urls: Vec<String>,
    /// Cache key answered for every navigation request.
    #[serde(default = "default_navigation_fallback")]
    pub navigation_fallback: String,
    /// Matched against the request pathname, so entries should start with `/`.
    #[serde(default)]
    pub network_first_prefixes: Vec<String>,
    /// Checked before `network_first_prefixes`; matches are never cached.
    #[serde(default)]
    pub network_only_prefixes: Vec<String>,
}

fn default_navigation_fallback() -> String {
    "/".to_string()
}

impl GeneratorConfig {
    pub fn new(cache_name: impl Into<String>, precache_urls: Vec<String>) -> Self {
        Self {
            cache_name: cache_name.into(),
            precache_urls,
            navigation_fallback: default_navigation_fallback(),
            network_first_prefixes: Vec::new(),
            network_only_prefixes: Vec::new(),
        }
    }

    pub fn with_navigation_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.navigation_fallback = fallback.into();
        self
    }

    pub fn with_network_first(mut self, prefixes: Vec<String>) -> Self {
        self.network_first_prefixes = prefixes;
        self
    }

    pub fn with_network_only(mut self, prefixes: Vec<String>) -> Self {
        self.network_only_prefixes = prefixes;
        self
    }

    /// Parse a JSON config. Absent `cacheName` or `precacheUrls` is reported
    /// as [`GeneratorError::MissingField`] rather than a generic parse error.
    pub fn from_json(raw: &str) -> Result<Self, GeneratorError> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, GeneratorError> {
        for field in ["cacheName", "precacheUrls"] {
            if value.get(field).map_or(true, serde_json::Value::is_null) {
                return Err(GeneratorError::MissingField(field));
            }
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// Prefixes without a leading `/` can never match a pathname. Legal, but
/// almost certainly a typo.
fn warn_unmatchable_prefixes(config: &GeneratorConfig) {
    let prefixes = config
        .network_first_prefixes
        .iter()
        .chain(&config.network_only_prefixes);
    for prefix in prefixes.filter(|p| !p.starts_with('/')) {
        warn!(prefix = %prefix, "route prefix does not start with '/' and will never match");
    }
}

/// Produce the complete worker source for `config`.
///
/// Pure and deterministic: the config is serialized once and substituted into
/// a fixed template, so equal configs yield byte-identical scripts.
pub fn generate(config: &GeneratorConfig) -> Result<String, GeneratorError> {
    if config.cache_name.is_empty() {
        return Err(GeneratorError::MissingField("cacheName"));
    }
    config.validate()?;
    warn_unmatchable_prefixes(config);

    let literal = js_literal(config)?;
    Ok(TEMPLATE.replacen(CONFIG_PLACEHOLDER, &literal, 1))
}

/// JSON is a JS expression except for raw U+2028/U+2029 inside strings on
/// older engines; escape them so the literal is safe in any script context.
fn js_literal(config: &GeneratorConfig) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string_pretty(config)?;
    Ok(json
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
        .replace("</", "<\\/"))
}
