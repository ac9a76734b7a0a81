use color_eyre::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::validation::Field;

/// Input history file for a parameter field.
pub fn history_file(field: Field) -> String {
    format!("{}_history.txt", field.history_id())
}

pub const EXPORT_PATH_HISTORY: &str = "export_path_history.txt";

/// Manages cache directory and cache file operations
#[derive(Clone)]
pub struct CacheManager {
    pub(crate) cache_dir: PathBuf,
}

impl CacheManager {
    /// Create a new CacheManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| color_eyre::eyre::eyre!("Could not determine cache directory"))?
            .join(app_name);

        Ok(Self { cache_dir })
    }

    /// Create a CacheManager rooted at `cache_dir` (used by tests)
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Get path to a specific cache file
    pub fn cache_file(&self, filename: &str) -> PathBuf {
        self.cache_dir.join(filename)
    }

    pub fn ensure_cache_dir(&self) -> Result<()> {
        if !self.cache_dir.exists() {
            fs::create_dir_all(&self.cache_dir)?;
        }
        Ok(())
    }

    /// Every file this app writes into the cache directory.
    /// `log_file` comes from `[logging] file_name`.
    pub fn known_files(log_file: &str) -> Vec<String> {
        let mut files: Vec<String> = [Field::Lambda, Field::Trials, Field::Probability]
            .into_iter()
            .map(history_file)
            .collect();
        files.push(EXPORT_PATH_HISTORY.to_string());
        files.push(log_file.to_string());
        files
    }

    /// Remove all known cache files. Returns the number of files removed.
    pub fn clear_all(&self, log_file: &str) -> Result<usize> {
        let mut removed = 0;
        for filename in Self::known_files(log_file) {
            let file_path = self.cache_file(&filename);
            if file_path.exists() {
                match fs::remove_file(&file_path) {
                    Ok(()) => removed += 1,
                    Err(e) => eprintln!("Warning: Could not remove cache file {}: {}", filename, e),
                }
            }
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_all_removes_known_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::with_dir(dir.path().to_path_buf());
        cache.ensure_cache_dir().unwrap();

        let lambda = cache.cache_file(&history_file(Field::Lambda));
        let log = cache.cache_file("pmfviz.log");
        let other = cache.cache_file("keep.txt");
        for path in [&lambda, &log, &other] {
            fs::write(path, "x").unwrap();
        }

        assert_eq!(cache.clear_all("pmfviz.log").unwrap(), 2);
        assert!(!lambda.exists());
        assert!(!log.exists());
        assert!(other.exists());
    }

    #[test]
    fn history_file_names() {
        assert_eq!(history_file(Field::Trials), "n_history.txt");
        assert_eq!(history_file(Field::Probability), "p_history.txt");
    }
}
