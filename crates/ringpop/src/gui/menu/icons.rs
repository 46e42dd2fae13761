use freedesktop_icons::lookup;
use parking_lot::RwLock;
use ringmenu::IconName;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static RESOLVED: OnceLock<RwLock<HashMap<IconName, Option<PathBuf>>>> = OnceLock::new();

fn cache() -> &'static RwLock<HashMap<IconName, Option<PathBuf>>> {
    RESOLVED.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Resolves an icon theme name (or absolute path) to a file, remembering misses too.
pub fn find_icon_path(icon_name: &IconName) -> Option<PathBuf> {
    if icon_name.is_empty() {
        return None;
    }

    if let Some(hit) = cache().read().get(icon_name) {
        return hit.clone();
    }

    let found = resolve(icon_name);
    if found.is_none() {
        log::warn!("Icon '{}' not found in the current theme", icon_name);
    }
    cache().write().insert(icon_name.clone(), found.clone());
    found
}

/// Forgets every lookup, so a theme change is picked up on the next reload.
pub fn clear_cache() {
    cache().write().clear();
}

fn resolve(icon_name: &IconName) -> Option<PathBuf> {
    let path = Path::new(icon_name.as_str());
    if path.is_absolute() {
        return path.exists().then(|| path.to_path_buf());
    }

    lookup(icon_name.as_str())
        .with_size(512)
        .with_scale(1)
        .find()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name_is_never_resolved() {
        assert_eq!(find_icon_path(&IconName::from("")), None);
    }

    #[test]
    fn test_missing_absolute_path_stays_missing() {
        let name = IconName::from("/nonexistent/ringpop/icon.png");
        assert_eq!(find_icon_path(&name), None);
        assert_eq!(find_icon_path(&name), None);
    }

    #[test]
    fn test_existing_absolute_path_resolves_to_itself() {
        let file = std::env::temp_dir().join("ringpop-icon-test.png");
        fs_err::write(&file, b"").unwrap();
        let name = IconName::from(file.to_string_lossy().as_ref());
        assert_eq!(find_icon_path(&name), Some(file.clone()));
        let _ = fs_err::remove_file(&file);
    }
}
