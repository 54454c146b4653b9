use std::path::{Path, PathBuf};

use dirs_next::home_dir;

/// Expand a leading `~` (alone, or followed by a path separator) to the home directory.
///
/// Paths are trimmed first; without a home directory the `~` is kept literally.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    let rest = match trimmed.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with('/') || rest.starts_with('\\') => &rest[1..],
        _ => return PathBuf::from(trimmed),
    };
    match home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(trimmed),
    }
}

/// Expand `path` and anchor it at `base` when it is relative.
pub fn resolve_against(base: &Path, path: &str) -> PathBuf {
    let expanded = expand_tilde(path);
    if expanded.is_absolute() { expanded } else { base.join(expanded) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_are_anchored() {
        let resolved = resolve_against(Path::new("/work/project"), ".asc/workflow.json");
        assert_eq!(resolved, PathBuf::from("/work/project/.asc/workflow.json"));
    }

    #[cfg(unix)]
    #[test]
    fn absolute_paths_are_kept() {
        let resolved = resolve_against(Path::new("/work/project"), " /etc/workflow.json ");
        assert_eq!(resolved, PathBuf::from("/etc/workflow.json"));
    }

    #[test]
    fn tilde_expands_to_home() {
        if let Some(home) = home_dir() {
            assert_eq!(expand_tilde("~/flows.json"), home.join("flows.json"));
        }
    }
}
