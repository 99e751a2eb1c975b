//! Cache names derived from precached asset contents.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const DIGEST_LEN: usize = 12;

/// Hash `(url, contents)` pairs into `{prefix}-{hex}`. Order matters: the
/// precache list is ordered and so is the digest.
pub fn versioned_cache_name<'a, I>(prefix: &str, assets: I) -> String
where
    I: IntoIterator<Item = (&'a str, Option<&'a [u8]>)>,
{
    let mut hasher = Sha256::new();
    for (url, contents) in assets {
        hasher.update(url.as_bytes());
        hasher.update([0u8]);
        if let Some(bytes) = contents {
            hasher.update((bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        }
    }
    let digest = hex::encode(hasher.finalize());
    format!("{}-{}", prefix, &digest[..DIGEST_LEN])
}

/// Map a precache URL to the file that serves it under `static_dir`.
/// Absolute URLs (other origins) have no local file.
pub fn asset_path(static_dir: &Path, url: &str) -> Option<PathBuf> {
    if url.contains("://") {
        return None;
    }
    let mut path = url.strip_prefix('/').unwrap_or(url);
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    let path = path.split(['?', '#']).next().unwrap_or_default();
    if path.split('/').any(|segment| segment == "..") {
        return None;
    }
    let mut file = static_dir.join(path);
    if path.is_empty() || path.ends_with('/') {
        file.push("index.html");
    }
    Some(file)
}

/// Read every precached file under `static_dir` and derive the cache name.
/// Missing files contribute only their URL.
pub fn cache_name_for_dir(prefix: &str, static_dir: &Path, precache_urls: &[String]) -> String {
    let contents: Vec<Option<Vec<u8>>> = precache_urls
        .iter()
        .map(|url| {
            let file = asset_path(static_dir, url)?;
            match std::fs::read(&file) {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    warn!(url = %url, file = %file.display(), error = %e, "precache asset not readable");
                    None
                }
            }
        })
        .collect();

    let name = versioned_cache_name(
        prefix,
        precache_urls
            .iter()
            .zip(contents.iter())
            .map(|(url, bytes)| (url.as_str(), bytes.as_deref())),
    );
    debug!(cache_name = %name, assets = precache_urls.len(), "derived cache name");
    name
}
