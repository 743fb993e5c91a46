// Storage paths
// Where cloned repositories and cached data live on disk.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "localci";

/// Resolves the on-disk layout for repositories and cache data.
///
/// Repos live under a platform-appropriate data directory, cache and
/// artifacts under a platform-appropriate cache directory - `dirs::data_dir()`
/// and `dirs::cache_dir()` already branch between XDG on Linux and
/// `%APPDATA%`/`Library/Application Support` elsewhere.
#[derive(Debug, Clone)]
pub struct StorageProvider {
    repo_root: PathBuf,
    cache_root: PathBuf,
}

impl StorageProvider {
    /// Resolve the default platform locations and ensure they exist.
    pub fn new() -> std::io::Result<Self> {
        let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        let cache_dir = dirs::cache_dir().unwrap_or_else(|| PathBuf::from("."));

        let provider = Self {
            repo_root: data_dir.join(APP_DIR).join("repos"),
            cache_root: cache_dir.join(APP_DIR),
        };
        provider.ensure_directories_exist()?;
        Ok(provider)
    }

    /// Build a provider rooted at an arbitrary directory, for tests.
    pub fn with_root(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref();
        let provider = Self {
            repo_root: root.join("repos"),
            cache_root: root.join("cache"),
        };
        provider.ensure_directories_exist()?;
        Ok(provider)
    }

    pub fn repo_storage_root(&self) -> &Path {
        &self.repo_root
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    pub fn artifacts_root(&self) -> PathBuf {
        self.cache_root.join("artifacts")
    }

    pub fn cache_entries_root(&self) -> PathBuf {
        self.cache_root.join("cache")
    }

    /// Local clone directory for a repo URL.
    pub fn repo_directory(&self, repo_url: &str) -> PathBuf {
        self.repo_root.join(repo_key(repo_url))
    }

    fn ensure_directories_exist(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.repo_root)?;
        std::fs::create_dir_all(&self.cache_root)?;
        Ok(())
    }
}

/// Derive a filesystem-safe, stable key for a repo URL: `host/path_hash8`.
fn repo_key(repo_url: &str) -> String {
    let (host, path) = split_url(repo_url);
    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);

    let mut hasher = Sha256::new();
    hasher.update(repo_url.as_bytes());
    let digest = hasher.finalize();
    let hash8 = digest.iter().take(4).map(|b| format!("{:02x}", b)).collect::<String>();

    sanitize(&format!("{}/{}_{}", host, path, hash8))
}

/// Minimal host/path split. Handles `scheme://host/path`, `git@host:path`
/// and bare `host/path` forms without pulling in a full URL parser.
fn split_url(repo_url: &str) -> (String, String) {
    if let Some(rest) = repo_url.split("://").nth(1) {
        let mut parts = rest.splitn(2, '/');
        let host = parts.next().unwrap_or("").to_string();
        let path = parts.next().unwrap_or("").to_string();
        return (host, path);
    }

    if let Some(at_pos) = repo_url.find('@') {
        let rest = &repo_url[at_pos + 1..];
        if let Some(colon_pos) = rest.find(':') {
            let host = rest[..colon_pos].to_string();
            let path = rest[colon_pos + 1..].to_string();
            return (host, path);
        }
    }

    let mut parts = repo_url.splitn(2, '/');
    let host = parts.next().unwrap_or("").to_string();
    let path = parts.next().unwrap_or("").to_string();
    (host, path)
}

fn sanitize(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            ':' | '?' | '*' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect()
}

/// Sha256 hex digest of a cache key, used as its on-disk directory name.
pub fn cache_entry_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_key_strips_git_suffix_from_path() {
        let key = repo_key("https://github.com/octocat/hello-world.git");
        assert!(key.starts_with("github.com/octocat/hello-world_"));
        assert!(!key.contains(".git"));
    }

    #[test]
    fn test_repo_key_is_deterministic() {
        let url = "https://github.com/octocat/hello-world.git";
        assert_eq!(repo_key(url), repo_key(url));
    }

    #[test]
    fn test_repo_key_sanitizes_reserved_characters() {
        let key = repo_key("https://example.com/org/repo?ref=main");
        assert!(!key.contains('?'));
    }

    #[test]
    fn test_ssh_style_url_splits_host_and_path() {
        let (host, path) = split_url("git@github.com:octocat/hello-world.git");
        assert_eq!(host, "github.com");
        assert_eq!(path, "octocat/hello-world.git");
    }

    #[test]
    fn test_cache_entry_key_is_deterministic() {
        assert_eq!(cache_entry_key("build-cache-v1"), cache_entry_key("build-cache-v1"));
        assert_ne!(cache_entry_key("a"), cache_entry_key("b"));
    }

    #[test]
    fn test_with_root_creates_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let provider = StorageProvider::with_root(tmp.path()).unwrap();
        assert!(provider.repo_storage_root().exists());
        assert!(provider.cache_root().exists());
    }
}
