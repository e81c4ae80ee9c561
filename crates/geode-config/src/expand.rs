//! `${VAR}` and `${VAR:-default}` expansion for configuration strings.

use crate::ConfigError;

/// Expand environment variable references in `value`.
///
/// Strings without `${` are returned unchanged, so a bare `$` is literal.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, LookupError> {
        std::env::var(var).map(Some).map_err(|_| LookupError {
            var_name: var.to_owned(),
        })
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

struct LookupError {
    var_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_with_default_uses_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("GEODE_UNSET_HOST_TEST");
        }
        let result = expand_env("${GEODE_UNSET_HOST_TEST:-0.0.0.0}", "server.host").unwrap();
        assert_eq!(result, "0.0.0.0");
    }

    #[test]
    fn test_expand_embedded_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("GEODE_EMBEDDED_TEST", "example");
        }
        let result = expand_env("${GEODE_EMBEDDED_TEST}.local", "server.host").unwrap();
        assert_eq!(result, "example.local");
        unsafe {
            std::env::remove_var("GEODE_EMBEDDED_TEST");
        }
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("GEODE_MISSING_TEST");
        }
        let err = expand_env("${GEODE_MISSING_TEST}", "server.host").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("GEODE_MISSING_TEST"));
        assert!(err.to_string().contains("server.host"));
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        assert_eq!(expand_env("$HOST", "server.host").unwrap(), "$HOST");
    }
}
