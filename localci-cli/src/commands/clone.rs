use crate::output;

use clap::Args;
use color_eyre::Result;

use localci_core::{RepoManager, StorageProvider};

/// Clone a repository into local storage
#[derive(Args, Debug)]
pub struct CloneArgs {
    /// Repository URL to clone
    pub url: String,

    /// Branch to clone
    #[arg(long, value_name = "BRANCH")]
    pub branch: Option<String>,
}

pub async fn execute(args: CloneArgs) -> Result<()> {
    let storage = StorageProvider::new()?;
    let manager = RepoManager::new(&storage);

    output::status("Cloning", &args.url);

    let local_path = manager
        .clone_repository(&args.url, args.branch.as_deref())
        .await
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    output::success(&format!("Cloned to {}", local_path.display()));
    Ok(())
}
