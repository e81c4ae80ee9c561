use geode_config::BuildMode;

use crate::front_matter::FrontMatter;

/// Whether a document with `front_matter` is built under `mode`.
#[must_use]
pub fn is_included(mode: BuildMode, front_matter: &FrontMatter) -> bool {
    match mode {
        BuildMode::Draft => !front_matter.draft,
        BuildMode::Explicit => front_matter.publish,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(publish: bool, draft: bool) -> FrontMatter {
        FrontMatter {
            publish,
            draft,
            ..FrontMatter::default()
        }
    }

    #[test]
    fn test_draft_mode_skips_drafts() {
        assert!(is_included(BuildMode::Draft, &meta(false, false)));
        assert!(is_included(BuildMode::Draft, &meta(true, false)));
        assert!(!is_included(BuildMode::Draft, &meta(false, true)));
    }

    #[test]
    fn test_explicit_mode_requires_publish() {
        assert!(!is_included(BuildMode::Explicit, &meta(false, false)));
        assert!(is_included(BuildMode::Explicit, &meta(true, false)));
        // publish wins over draft in explicit mode
        assert!(is_included(BuildMode::Explicit, &meta(true, true)));
    }
}
