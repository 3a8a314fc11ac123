// Application path utilities.
// Locates the cache, config, and log files via the platform directories.

use std::path::PathBuf;

use directories::ProjectDirs;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "ember")
}

/// Base cache directory (~/.cache/ember on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// The single cache document.
pub fn cache_file() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join("cache.json"))
}

/// The startup configuration document.
pub fn config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
}

/// Log file written by the tracing subscriber (stdout belongs to the TUI).
pub fn log_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join("ember.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        let cache = cache_file().unwrap();
        assert!(cache.ends_with("cache.json"));

        let config = config_file().unwrap();
        assert!(config.ends_with("config.json"));

        let log = log_file().unwrap();
        assert!(log.ends_with("ember.log"));
    }
}
