use color_eyre::Result;

mod commands;
mod output;

use clap::{Parser, Subcommand};

/// localci - a local runner for GitHub Actions-style YAML workflows
///
/// Clone repositories, discover their workflows, and run them against a
/// local docker/podman or qemu sandbox. Launch the interactive TUI with
/// no arguments or the 'tui' subcommand.
#[derive(Parser, Debug)]
#[command(name = "localci", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clone a repository into local storage
    Clone(commands::clone::CloneArgs),

    /// List cloned repositories
    List,

    /// List the workflows discovered in a repository
    Workflows(commands::workflows::WorkflowsArgs),

    /// Run a workflow file locally
    Run(commands::run::RunArgs),

    /// Check backend availability and workflow compatibility
    Doctor(commands::doctor::DoctorArgs),

    /// Launch the interactive TUI
    Tui,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Tui) => localci_tui::run().await,

        Some(Commands::Clone(args)) => commands::clone::execute(args).await,

        Some(Commands::List) => commands::list::execute(),

        Some(Commands::Workflows(args)) => commands::workflows::execute(args),

        Some(Commands::Run(args)) => commands::run::execute(args).await,

        Some(Commands::Doctor(args)) => commands::doctor::execute(args).await,
    }
}
