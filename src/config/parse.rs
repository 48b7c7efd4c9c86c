//! Environment variable parsing utilities.

use std::path::PathBuf;
use std::str::FromStr;

use super::ConfigError;

/// Get optional environment variable (None if empty or missing).
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

/// Whether the variable is set at all, whatever its value.
pub fn env_present(key: &str) -> bool {
    std::env::var_os(key).is_some()
}

/// Parse environment variable with type conversion.
pub fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(v) if !v.is_empty() => v.parse().map_err(|e: T::Err| ConfigError::Parse {
            key: key.into(),
            value: v,
            error: e.to_string(),
        }),
        _ => Ok(default),
    }
}

/// Parse environment variable as an absolute path.
pub fn env_abs_path(key: &str, default: &str) -> Result<PathBuf, ConfigError> {
    let path = PathBuf::from(env_opt(key).unwrap_or_else(|| default.to_string()));
    if !path.is_absolute() {
        return Err(ConfigError::Invalid {
            key: key.into(),
            message: format!("'{}' must be an absolute path", path.display()),
        });
    }
    Ok(path)
}
