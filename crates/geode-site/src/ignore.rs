//! `site.ignore_patterns` matching.

use glob::Pattern;

/// Compiled ignore patterns.
///
/// During discovery a pattern excludes a path when it matches the base name
/// as a glob or occurs anywhere in the slash-separated relative path. Asset
/// copying is stricter about which form applies: patterns containing glob
/// metacharacters only match as globs, the rest only as substrings, both
/// compared case-insensitively.
#[derive(Debug, Default)]
pub struct IgnoreRules {
    rules: Vec<Rule>,
}

#[derive(Debug)]
struct Rule {
    raw: String,
    lowered: String,
    glob: Option<Pattern>,
    lowered_glob: Option<Pattern>,
}

fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

impl IgnoreRules {
    /// Compile `patterns`, skipping blank ones.
    ///
    /// Patterns that fail to compile as globs still match as substrings.
    #[must_use]
    pub fn new(patterns: &[String]) -> Self {
        let rules = patterns
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(|raw| {
                let lowered = raw.to_lowercase();
                Rule {
                    glob: Pattern::new(raw).ok(),
                    lowered_glob: Pattern::new(&lowered).ok(),
                    raw: raw.to_owned(),
                    lowered,
                }
            })
            .collect();
        Self { rules }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether discovery skips `relative` (and, for a directory, everything below it).
    #[must_use]
    pub fn excludes(&self, relative: &str) -> bool {
        let base = base_name(relative);
        self.rules.iter().any(|rule| {
            rule.glob.as_ref().is_some_and(|glob| glob.matches(base))
                || relative.contains(rule.raw.as_str())
        })
    }

    /// Whether the asset at `relative` is left out of the output.
    #[must_use]
    pub fn excludes_asset(&self, relative: &str) -> bool {
        let lowered = relative.to_lowercase();
        let base = base_name(&lowered);
        self.rules.iter().any(|rule| {
            if is_glob(&rule.lowered) {
                rule.lowered_glob
                    .as_ref()
                    .is_some_and(|glob| glob.matches(base))
            } else {
                lowered.contains(rule.lowered.as_str())
            }
        })
    }
}
