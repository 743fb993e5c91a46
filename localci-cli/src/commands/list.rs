use crate::output;

use color_eyre::Result;

use localci_core::{RepoManager, StorageProvider};

pub fn execute() -> Result<()> {
    let storage = StorageProvider::new()?;
    let manager = RepoManager::new(&storage);

    let repos = manager.list_repositories();
    if repos.is_empty() {
        output::info("No repositories cloned yet. Use `localci clone <url>`.");
        return Ok(());
    }

    output::header(&format!("{} cloned repositories", repos.len()));
    for repo in repos {
        println!("  {}", repo.display());
    }
    Ok(())
}
