use crate::output;

use std::path::PathBuf;

use clap::Args;
use color_eyre::Result;

use localci_core::workflow::WorkflowParser;

/// List the workflows discovered in a repository
#[derive(Args, Debug)]
pub struct WorkflowsArgs {
    /// Path to a cloned repository
    pub repo_path: PathBuf,
}

pub fn execute(args: WorkflowsArgs) -> Result<()> {
    let files = localci_core::discovery::discover_workflows(&args.repo_path);

    if files.is_empty() {
        output::info(&format!(
            "No workflows found under {}/.github/workflows",
            args.repo_path.display()
        ));
        return Ok(());
    }

    output::header(&format!("Workflows in {}", args.repo_path.display()));
    for file in &files {
        let outcome = WorkflowParser::from_file(file);
        let name = outcome
            .workflow
            .as_ref()
            .and_then(|w| w.name.clone())
            .unwrap_or_else(|| "(unnamed)".to_string());
        let job_count = outcome.workflow.as_ref().map(|w| w.jobs.len()).unwrap_or(0);

        if outcome.has_errors() {
            output::failure(&format!("{} - {} ({} job(s), parse errors)", file.display(), name, job_count));
        } else {
            output::success(&format!("{} - {} ({} job(s))", file.display(), name, job_count));
        }
    }
    Ok(())
}
