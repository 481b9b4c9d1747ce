//! CLI argument validation functions
//!
//! Value parsers for arguments that clap cannot check on its own.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Validate that a file path exists, is a regular file and is readable
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{}'", path_str));
    }

    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{}'", path_str));
    }

    match fs::File::open(&path) {
        Ok(_) => Ok(path),
        Err(e) => Err(format!("Cannot read configuration file '{}': {}", path_str, e)),
    }
}

/// Validate a cache key: non-empty, no whitespace or control characters
pub fn validate_key(key_str: &str) -> Result<String, String> {
    if key_str.is_empty() {
        return Err("Key cannot be empty".to_string());
    }

    if key_str.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(format!("Key cannot contain whitespace: '{}'", key_str.escape_debug()));
    }

    Ok(key_str.to_string())
}

/// Parse a JSON document given on the command line
pub fn validate_json_value(value_str: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str(value_str).map_err(|e| {
        format!(
            "Value must be valid JSON (quote strings, e.g. '\"hello\"'): {}",
            e
        )
    })
}

/// Parse a TTL in seconds; fractions are allowed, 0 means no expiry
pub fn validate_ttl(ttl_str: &str) -> Result<Duration, String> {
    let seconds: f64 = ttl_str
        .trim()
        .parse()
        .map_err(|_| format!("TTL must be a number of seconds, got: '{}'", ttl_str))?;

    Duration::try_from_secs_f64(seconds)
        .map_err(|_| format!("TTL must be a non-negative, finite number of seconds, got: '{}'", ttl_str))
}
