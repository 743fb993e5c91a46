// Artifact store
// Named files produced by one workflow run, kept at
// <cacheRoot>/artifacts/<workflowId>/<name>.

use crate::storage::StorageProvider;

use std::path::PathBuf;

pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(storage: &StorageProvider) -> Self {
        Self {
            root: storage.artifacts_root(),
        }
    }

    fn workflow_dir(&self, workflow_id: &str) -> PathBuf {
        self.root.join(workflow_id)
    }

    pub fn save(&self, workflow_id: &str, name: &str, contents: &[u8]) -> std::io::Result<PathBuf> {
        let dir = self.workflow_dir(workflow_id);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn path(&self, workflow_id: &str, name: &str) -> Option<PathBuf> {
        let path = self.workflow_dir(workflow_id).join(name);
        path.is_file().then_some(path)
    }

    pub fn list(&self, workflow_id: &str) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.workflow_dir(workflow_id)) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_then_list_and_fetch() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = StorageProvider::with_root(tmp.path()).unwrap();
        let artifacts = ArtifactStore::new(&storage);

        artifacts.save("run-1", "coverage.xml", b"<report/>").unwrap();
        artifacts.save("run-1", "build.log", b"ok").unwrap();

        assert_eq!(artifacts.list("run-1"), vec!["build.log", "coverage.xml"]);
        assert!(artifacts.path("run-1", "coverage.xml").is_some());
        assert!(artifacts.path("run-1", "missing.txt").is_none());
    }

    #[test]
    fn test_list_unknown_workflow_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = StorageProvider::with_root(tmp.path()).unwrap();
        let artifacts = ArtifactStore::new(&storage);
        assert!(artifacts.list("nonexistent").is_empty());
    }
}
