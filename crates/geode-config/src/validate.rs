//! Range checks on a resolved [`Config`].

use crate::{Config, ConfigError};

/// Upper bound for `live_reload.debounce_ms`.
pub(crate) const MAX_DEBOUNCE_MS: u64 = 10_000;

/// Check every value and report all problems at once.
pub(crate) fn check(config: &Config) -> Result<(), ConfigError> {
    let mut problems = Vec::new();

    if config.server.host.trim().is_empty() {
        problems.push("server.host must not be empty".to_owned());
    }
    if config.server.port == 0 {
        problems.push("server.port must not be 0".to_owned());
    }
    if config.site.theme.trim().is_empty() {
        problems.push("site.theme must not be empty".to_owned());
    }
    if !(1..=MAX_DEBOUNCE_MS).contains(&config.live_reload.debounce_ms) {
        problems.push(format!(
            "live_reload.debounce_ms must be between 1 and {MAX_DEBOUNCE_MS}, got {}",
            config.live_reload.debounce_ms
        ));
    }
    problems.extend(config.site.ignore_patterns.iter().filter_map(|pattern| {
        glob::Pattern::new(pattern)
            .err()
            .map(|e| format!("site.ignore_patterns: {pattern:?} is not a valid glob ({e})"))
    }));

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(problems.join("; ")))
    }
}
