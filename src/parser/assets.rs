use std::fs;
use std::path::Path;

use tracing::{debug, warn};

/// Sorted file names from the photo directory.
#[derive(Debug, Clone, Default)]
pub struct PhotoListing {
    files: Vec<String>,
}

impl PhotoListing {
    pub fn from_names<I>(names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut files: Vec<String> = names.into_iter().collect();
        files.sort();
        PhotoListing { files }
    }

    /// Missing or unreadable directories give an empty listing.
    pub fn scan(dir: &Path) -> Self {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("No photo listing at {}: {}", dir.display(), e);
                return PhotoListing::default();
            }
        };

        let names = entries.filter_map(|entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable photo entry in {}: {}", dir.display(), e);
                    return None;
                }
            };
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                return None;
            }
            entry.file_name().into_string().ok()
        });
        PhotoListing::from_names(names)
    }

    /// First file whose name starts with `local_name`.
    pub fn resolve(&self, local_name: &str) -> Option<&str> {
        if local_name.is_empty() {
            return None;
        }
        self.files
            .iter()
            .find(|f| f.starts_with(local_name))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(names: &[&str]) -> PhotoListing {
        PhotoListing::from_names(names.iter().map(|s| s.to_string()))
    }

    #[test]
    fn prefix_match_with_qualifier() {
        let photos = listing(&["韩梅梅.jpg", "李雷_证件照.jpg"]);
        assert_eq!(photos.resolve("李雷"), Some("李雷_证件照.jpg"));
    }

    #[test]
    fn first_match_in_sorted_order() {
        let photos = listing(&["李雷_证件照.jpg", "李雷.png", "李雷2.jpg"]);
        assert_eq!(photos.resolve("李雷"), Some("李雷.png"));
    }

    #[test]
    fn no_match_is_none() {
        let photos = listing(&["韩梅梅.jpg"]);
        assert_eq!(photos.resolve("李雷"), None);
        assert_eq!(photos.resolve(""), None);
    }

    #[test]
    fn empty_listing_is_none() {
        assert_eq!(PhotoListing::default().resolve("李雷"), None);
    }

    #[test]
    fn missing_directory_gives_empty_listing() {
        let dir = tempfile::tempdir().unwrap();
        let photos = PhotoListing::scan(&dir.path().join("photos"));
        assert!(photos.is_empty());
        assert_eq!(photos.resolve("李雷"), None);
    }

    #[test]
    fn scan_reads_files_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("李雷_1.jpg"), b"jpg").unwrap();
        fs::write(dir.path().join("韩梅梅.png"), b"png").unwrap();
        fs::create_dir(dir.path().join("李雷_archive")).unwrap();
        let photos = PhotoListing::scan(dir.path());
        assert_eq!(photos.len(), 2);
        assert_eq!(photos.resolve("李雷"), Some("李雷_1.jpg"));
    }
}
