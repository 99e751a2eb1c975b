//! Build-side services: worker generation, cache versioning, VAPID key handling.

pub mod generator;
pub mod vapid;
pub mod versioning;

pub use generator::{generate, GeneratorConfig};
pub use vapid::decode_application_server_key;
pub use versioning::{cache_name_for_dir, versioned_cache_name};
