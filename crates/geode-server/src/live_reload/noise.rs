//! Which filesystem events may trigger a rebuild.

use std::path::Path;

use notify::EventKind;
use notify::event::ModifyKind;

const NOISE_SUFFIXES: &[&str] = &["~", ".swp", ".swo", ".swx", ".tmp"];

/// Whether `path` names an editor backup, swap or lock file.
#[must_use]
pub fn is_noise(path: &Path) -> bool {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
        return false;
    };
    NOISE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
        || name.contains("4913")
        || name.starts_with(".#")
}

/// Whether an event of `kind` changes content: creation, removal, or a
/// data or name modification. Access and metadata events do not.
#[must_use]
pub fn qualifies(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Remove(_)
            | EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Name(_) | ModifyKind::Any)
    )
}

#[cfg(test)]
mod tests {
    use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind, RenameMode};

    use super::*;

    #[test]
    fn test_noise_names() {
        for name in [".file.swp", "file~", "4913", ".#file", "note.md.swo", "x.swx", "save.tmp"] {
            assert!(is_noise(Path::new("/notes").join(name).as_path()), "{name}");
        }
    }

    #[test]
    fn test_regular_names() {
        for name in ["note.md", "image.png", "swp.md", "notes"] {
            assert!(!is_noise(Path::new("/notes").join(name).as_path()), "{name}");
        }
        assert!(!is_noise(Path::new("/")));
    }

    #[test]
    fn test_qualifying_kinds() {
        assert!(qualifies(&EventKind::Create(CreateKind::File)));
        assert!(qualifies(&EventKind::Remove(RemoveKind::Folder)));
        assert!(qualifies(&EventKind::Modify(ModifyKind::Data(DataChange::Content))));
        assert!(qualifies(&EventKind::Modify(ModifyKind::Name(RenameMode::To))));
    }

    #[test]
    fn test_ignored_kinds() {
        assert!(!qualifies(&EventKind::Access(AccessKind::Read)));
        assert!(!qualifies(&EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions))));
        assert!(!qualifies(&EventKind::Any));
        assert!(!qualifies(&EventKind::Other));
    }
}
