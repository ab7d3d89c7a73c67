//! Environment variable parsing with warn-level logging for invalid values.

use std::path::PathBuf;

/// Parse an environment variable with a default fallback.
///
/// - If the variable is not set: returns `default` silently (expected case).
/// - If the variable is set but cannot be parsed: logs a warning and returns `default`.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    parse_with_default(var, std::env::var(var).ok().as_deref(), default)
}

fn parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    raw: Option<&str>,
    default: T,
) -> T {
    match raw {
        Some(v) => match v.trim().parse() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!(
                    var,
                    value = %v,
                    default = %default,
                    "invalid env var value, using default"
                );
                default
            },
        },
        None => default,
    }
}

/// Reads an optional string variable, treating blank values as unset.
pub fn env_non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

/// Locates an optional JSON override file.
///
/// `env_var` wins when set; otherwise `<config dir>/leadmatch/<file_name>` is used
/// if it exists.
pub fn resolve_config_file(env_var: &str, file_name: &str) -> Option<PathBuf> {
    if let Some(path) = env_non_empty(env_var) {
        return Some(PathBuf::from(path));
    }
    let candidate = dirs::config_dir()?.join("leadmatch").join(file_name);
    candidate.is_file().then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_value() {
        let result: u32 = parse_with_default("X", Some("42"), 10);
        assert_eq!(result, 42);
    }

    #[test]
    fn trims_before_parsing() {
        let result: u64 = parse_with_default("X", Some(" 1500 "), 10);
        assert_eq!(result, 1500);
    }

    #[test]
    fn invalid_value_falls_back() {
        let result: u32 = parse_with_default("X", Some("banana"), 10);
        assert_eq!(result, 10);
    }

    #[test]
    fn missing_value_falls_back() {
        let result: u32 = parse_with_default("X", None, 10);
        assert_eq!(result, 10);
    }

    #[test]
    fn empty_value_falls_back() {
        let result: u32 = parse_with_default("X", Some(""), 10);
        assert_eq!(result, 10);
    }

    #[test]
    fn missing_env_var_uses_default() {
        let result: u32 = env_parse_with_default("LEADMATCH_TEST_MISSING_VAR_51237", 7);
        assert_eq!(result, 7);
    }

    #[test]
    fn missing_config_file_resolves_to_none() {
        assert!(resolve_config_file("LEADMATCH_TEST_MISSING_VAR_51237", "no-such-file-8812.json").is_none());
    }
}
