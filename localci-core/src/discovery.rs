// Workflow discovery
// Finds candidate workflow files under a repo's .github/workflows directory.

use std::path::{Path, PathBuf};

/// List `.yml`/`.yaml` files directly under `<repo>/.github/workflows`.
///
/// Returns an empty list if the directory does not exist; this is not an
/// error, just a repo with no workflows to run.
pub fn discover_workflows(repo_path: impl AsRef<Path>) -> Vec<PathBuf> {
    let workflow_dir = repo_path.as_ref().join(".github").join("workflows");

    let Ok(entries) = std::fs::read_dir(&workflow_dir) else {
        return Vec::new();
    };

    let mut workflows: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| is_valid_workflow(path))
        .collect();

    workflows.sort();
    workflows
}

pub fn has_workflows(repo_path: impl AsRef<Path>) -> bool {
    !discover_workflows(repo_path).is_empty()
}

fn is_valid_workflow(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    let readable = std::fs::File::open(path).is_ok();
    if !readable {
        return false;
    }
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yml") | Some("yaml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discover_workflows_finds_yml_and_yaml() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".github").join("workflows");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("ci.yml"), "name: CI\non: push\njobs: {}").unwrap();
        fs::write(dir.join("release.yaml"), "name: Release\non: push\njobs: {}").unwrap();
        fs::write(dir.join("README.md"), "not a workflow").unwrap();

        let found = discover_workflows(tmp.path());
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_discover_workflows_missing_directory_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(discover_workflows(tmp.path()).is_empty());
        assert!(!has_workflows(tmp.path()));
    }
}
