//! Discovery of the markdown documents under a spec folder, plus the
//! per-document comment counts shown as badges.

use std::collections::BTreeMap;
use std::path::Path;

use walkdir::WalkDir;

use crate::kv::KvStore;
use crate::store::AnnotationStore;

/// One discoverable document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// `/`-separated path relative to the root; the document identity.
    pub id: String,
    /// File name only.
    pub name: String,
}

impl CatalogEntry {
    /// Directory part of the identity, `""` for files at the root.
    pub fn folder(&self) -> &str {
        self.id.rsplit_once('/').map_or("", |(dir, _)| dir)
    }
}

/// Walks `root` recursively and returns every `.md` file.
///
/// Entries are ordered by folder, then by file name, so each folder's files
/// are contiguous and root-level files come first.
/// Unreadable entries are skipped. A missing root yields an empty catalog.
pub fn discover(root: &Path) -> Vec<CatalogEntry> {
    let mut entries: Vec<CatalogEntry> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "md"))
        .filter_map(|e| {
            let rel = e.path().strip_prefix(root).ok()?;
            let id = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            Some(CatalogEntry {
                id,
                name: e.file_name().to_string_lossy().into_owned(),
            })
        })
        .collect();
    entries.sort_by(|a, b| {
        a.folder()
            .cmp(b.folder())
            .then_with(|| a.name.cmp(&b.name))
    });
    entries
}

/// Stored comment counts for `entries`. Documents without stored comments
/// are omitted.
pub async fn badge_counts<K: KvStore>(
    store: &AnnotationStore<K>,
    entries: &[CatalogEntry],
) -> BTreeMap<String, usize> {
    let stored = store.stored_documents().await;
    let mut counts = BTreeMap::new();
    for entry in entries.iter().filter(|e| stored.contains(&e.id)) {
        let n = store.count(&entry.id).await;
        if n > 0 {
            counts.insert(entry.id.clone(), n);
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_nested_markdown_grouped_by_folder() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("api").join("v2")).unwrap();
        std::fs::write(root.join("zeta.md"), "z").unwrap();
        std::fs::write(root.join("alpha.md"), "a").unwrap();
        std::fs::write(root.join("api").join("auth.md"), "a").unwrap();
        std::fs::write(root.join("api").join("v2").join("keys.md"), "k").unwrap();
        std::fs::write(root.join("notes.txt"), "skip").unwrap();

        let entries = discover(root);
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha.md", "zeta.md", "api/auth.md", "api/v2/keys.md"]);
        assert_eq!(entries[2].name, "auth.md");
    }

    #[test]
    fn folder_is_the_identity_minus_file_name() {
        let entry = |id: &str| CatalogEntry {
            id: id.to_owned(),
            name: id.rsplit('/').next().unwrap_or(id).to_owned(),
        };
        assert_eq!(entry("intro.md").folder(), "");
        assert_eq!(entry("api/auth.md").folder(), "api");
        assert_eq!(entry("api/v2/keys.md").folder(), "api/v2");
    }

    #[test]
    fn missing_root_is_empty() {
        assert!(discover(Path::new("/definitely/not/here")).is_empty());
    }
}
