//! Configuration loader implementations.

use std::env;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::schema::ToolhubSettings;
use crate::{ConfigError, ConfigResult};

/// Environment variable carrying the vector store API key.
pub const API_KEY_ENV: &str = "PINECONE_API_KEY";
/// Environment variable overriding the index name.
pub const INDEX_NAME_ENV: &str = "TOOLHUB_INDEX_NAME";
/// Environment variable overriding the namespace.
pub const NAMESPACE_ENV: &str = "TOOLHUB_NAMESPACE";
/// Environment variable overriding the embedding model.
pub const EMBEDDING_MODEL_ENV: &str = "TOOLHUB_EMBEDDING_MODEL";
/// Environment variable overriding the embedding dimensionality.
pub const DIMENSION_ENV: &str = "TOOLHUB_DIMENSION";
/// Environment variable overriding the sync batch size.
pub const BATCH_SIZE_ENV: &str = "TOOLHUB_BATCH_SIZE";
/// Environment variable overriding the log filter.
pub const LOG_ENV: &str = "TOOLHUB_LOG";

/// Builds settings from defaults plus environment overrides.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] when a numeric variable does not parse.
pub fn from_env() -> ConfigResult<ToolhubSettings> {
    apply_env_overrides(ToolhubSettings::default())
}

/// Reads settings from a JSON file, then applies environment overrides.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] or [`ConfigError::Parse`] when the file cannot
/// be read or decoded, and [`ConfigError::InvalidValue`] for bad overrides.
pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<ToolhubSettings> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)?;
    let settings: ToolhubSettings = serde_json::from_str(&raw)?;
    debug!(path = %path.display(), "loaded configuration file");
    apply_env_overrides(settings)
}

/// Applies environment overrides using the process environment.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] when a numeric variable does not parse.
pub fn apply_env_overrides(settings: ToolhubSettings) -> ConfigResult<ToolhubSettings> {
    apply_overrides(settings, |key| env::var(key).ok())
}

/// Applies overrides read through `lookup`, which maps a variable name to its value.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] when a numeric variable does not parse.
pub fn apply_overrides<F>(mut settings: ToolhubSettings, lookup: F) -> ConfigResult<ToolhubSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(key) = get(API_KEY_ENV) {
        settings.vector.api_key = Some(key);
    }
    if let Some(index) = get(INDEX_NAME_ENV) {
        settings.vector.index_name = index;
    }
    if let Some(namespace) = get(NAMESPACE_ENV) {
        settings.vector.namespace = namespace;
    }
    if let Some(model) = get(EMBEDDING_MODEL_ENV) {
        settings.vector.embedding_model = model;
    }
    if let Some(raw) = get(DIMENSION_ENV) {
        settings.vector.dimension = parse_number(DIMENSION_ENV, &raw)?;
    }
    if let Some(raw) = get(BATCH_SIZE_ENV) {
        settings.vector.batch_size = parse_number(BATCH_SIZE_ENV, &raw)?;
    }
    if let Some(filter) = get(LOG_ENV) {
        settings.telemetry.filter = filter;
    }
    Ok(settings)
}

fn parse_number<T>(key: &str, raw: &str) -> ConfigResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|err| ConfigError::invalid_value(key, err.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn overrides_replace_defaults() {
        let settings = apply_overrides(
            ToolhubSettings::default(),
            lookup_from(&[
                (API_KEY_ENV, "pk-test"),
                (NAMESPACE_ENV, "staging"),
                (BATCH_SIZE_ENV, "25"),
                (LOG_ENV, "debug"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.vector.api_key.as_deref(), Some("pk-test"));
        assert_eq!(settings.vector.namespace, "staging");
        assert_eq!(settings.vector.batch_size, 25);
        assert_eq!(settings.telemetry.filter, "debug");
    }

    #[test]
    fn blank_values_are_ignored() {
        let settings =
            apply_overrides(ToolhubSettings::default(), lookup_from(&[(NAMESPACE_ENV, "  ")]))
                .unwrap();
        assert_eq!(settings.vector.namespace, "production");
    }

    #[test]
    fn malformed_number_is_reported_with_key() {
        let err = apply_overrides(
            ToolhubSettings::default(),
            lookup_from(&[(DIMENSION_ENV, "many")]),
        )
        .expect_err("non-numeric dimension");
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == DIMENSION_ENV));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = from_json_file("/definitely/not/here.json").expect_err("missing file");
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
