// Repository manager
// Clones and updates git repositories into storage, and lists what is
// already there.

use crate::error::{ServiceError, ServiceResult};
use crate::storage::StorageProvider;

use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

const CLONE_TIMEOUT: Duration = Duration::from_secs(300);
const PULL_TIMEOUT: Duration = Duration::from_secs(60);

pub struct RepoManager<'a> {
    storage: &'a StorageProvider,
}

impl<'a> RepoManager<'a> {
    pub fn new(storage: &'a StorageProvider) -> Self {
        Self { storage }
    }

    pub fn local_path(&self, repo_url: &str) -> PathBuf {
        self.storage.repo_directory(repo_url)
    }

    pub fn is_cloned(&self, repo_url: &str) -> bool {
        let path = self.local_path(repo_url);
        path.join(".git").exists()
    }

    pub async fn clone_repository(
        &self,
        repo_url: &str,
        branch: Option<&str>,
    ) -> ServiceResult<PathBuf> {
        let local_path = self.local_path(repo_url);

        if self.is_cloned(repo_url) {
            return Err(ServiceError::Repo(format!(
                "repository already cloned at {}",
                local_path.display()
            )));
        }

        if let Some(parent) = local_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut args = vec!["clone".to_string()];
        if let Some(branch) = branch {
            args.push("--branch".to_string());
            args.push(branch.to_string());
        }
        args.push(repo_url.to_string());
        args.push(local_path.display().to_string());

        let output = tokio::time::timeout(CLONE_TIMEOUT, Command::new("git").args(&args).output())
            .await
            .map_err(|_| ServiceError::Timeout(CLONE_TIMEOUT))??;

        if !output.status.success() {
            return Err(ServiceError::Repo(format!(
                "git clone failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        Ok(local_path)
    }

    pub async fn update_repository(&self, repo_url: &str) -> ServiceResult<()> {
        let local_path = self.local_path(repo_url);
        if !self.is_cloned(repo_url) {
            return Err(ServiceError::Repo(format!(
                "repository not cloned: {}",
                repo_url
            )));
        }

        let output = tokio::time::timeout(
            PULL_TIMEOUT,
            Command::new("git").arg("pull").current_dir(&local_path).output(),
        )
        .await
        .map_err(|_| ServiceError::Timeout(PULL_TIMEOUT))??;

        if !output.status.success() {
            return Err(ServiceError::Repo(format!(
                "git pull failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        Ok(())
    }

    /// Every cloned repo under storage, as `host/key` directories containing a `.git`.
    pub fn list_repositories(&self) -> Vec<PathBuf> {
        let root = self.storage.repo_storage_root();
        let Ok(hosts) = std::fs::read_dir(root) else {
            return Vec::new();
        };

        let mut repos = Vec::new();
        for host_entry in hosts.filter_map(|e| e.ok()) {
            if !host_entry.path().is_dir() {
                continue;
            }
            let Ok(repo_entries) = std::fs::read_dir(host_entry.path()) else {
                continue;
            };
            for repo_entry in repo_entries.filter_map(|e| e.ok()) {
                let path = repo_entry.path();
                if path.is_dir() && has_git_dir(&path) {
                    repos.push(path);
                }
            }
        }
        repos
    }
}

fn has_git_dir(path: &Path) -> bool {
    path.join(".git").exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_path_is_deterministic() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = StorageProvider::with_root(tmp.path()).unwrap();
        let manager = RepoManager::new(&storage);

        let a = manager.local_path("https://github.com/octocat/hello-world.git");
        let b = manager.local_path("https://github.com/octocat/hello-world.git");
        assert_eq!(a, b);
    }

    #[test]
    fn test_is_cloned_false_for_unknown_repo() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = StorageProvider::with_root(tmp.path()).unwrap();
        let manager = RepoManager::new(&storage);
        assert!(!manager.is_cloned("https://github.com/octocat/hello-world.git"));
    }

    #[test]
    fn test_list_repositories_finds_cloned_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = StorageProvider::with_root(tmp.path()).unwrap();
        let manager = RepoManager::new(&storage);

        let repo_dir = storage.repo_storage_root().join("github.com").join("octocat_hello-world_deadbeef");
        std::fs::create_dir_all(repo_dir.join(".git")).unwrap();

        let repos = manager.list_repositories();
        assert_eq!(repos.len(), 1);
    }
}
