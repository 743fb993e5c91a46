use crate::output;

use std::path::PathBuf;

use clap::Args;
use color_eyre::Result;

use localci_core::backend::BackendKind;
use localci_core::events::{progress_channel, ExecutionEvent, JobOutcome, LogLevel};
use localci_core::scheduler::Scheduler;
use localci_core::workflow::WorkflowParser;

/// Run a workflow file locally
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the cloned repository the workflow belongs to
    pub repo_path: PathBuf,

    /// Path to the workflow YAML file
    pub workflow: PathBuf,

    /// Use the qemu VM backend instead of containers
    #[arg(long)]
    pub qemu: bool,
}

pub async fn execute(args: RunArgs) -> Result<()> {
    if !args.repo_path.exists() {
        color_eyre::eyre::bail!("repository path not found: {}", args.repo_path.display());
    }

    let workflow_path = &args.workflow;
    if !workflow_path.exists() {
        color_eyre::eyre::bail!("workflow file not found: {}", workflow_path.display());
    }

    output::status("Parsing", &workflow_path.display().to_string());
    let outcome = WorkflowParser::from_file(workflow_path);

    for issue in &outcome.issues {
        output::warning(&issue.to_string());
    }

    if outcome.has_errors() {
        color_eyre::eyre::bail!("workflow has validation errors, see above");
    }
    let Some(workflow) = outcome.workflow else {
        color_eyre::eyre::bail!("workflow could not be parsed");
    };

    output::info(&format!(
        "workflow '{}': {} job(s)",
        workflow.name.clone().unwrap_or_else(|| "unnamed".to_string()),
        workflow.jobs.len()
    ));

    let backend_kind = if args.qemu { BackendKind::Vm } else { BackendKind::Container };

    let (tx, mut rx) = progress_channel();
    let mut scheduler = Scheduler::new(backend_kind);
    let stop_handle = scheduler.stop_handle();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop_handle.stop();
        }
    });

    let exec_handle = tokio::spawn(async move { scheduler.execute(&workflow, &Some(tx)).await });

    let mut overall_success = true;
    while let Some(event) = rx.recv().await {
        match event {
            ExecutionEvent::ExecutionStarted { workflow_name, total_jobs } => {
                println!();
                output::header(&format!("{} ({} job(s))", workflow_name, total_jobs));
            }

            ExecutionEvent::ExecutionFinished { success, duration } => {
                println!();
                overall_success = success;
                if success {
                    output::success(&format!("completed in {:.2}s", duration.as_secs_f64()));
                } else {
                    output::failure(&format!("failed after {:.2}s", duration.as_secs_f64()));
                }
            }

            ExecutionEvent::JobStarted { job_id, display_name, total_steps } => {
                output::job_header(&format!("{} [{}]", display_name, job_id), total_steps);
            }

            ExecutionEvent::JobFinished { job_id, outcome, duration } => {
                let line = format!("  job '{}' {} ({:.2}s)", job_id, outcome_label(outcome), duration.as_secs_f64());
                if outcome == JobOutcome::Succeeded {
                    output::dim_success(&line);
                } else {
                    output::dim_failure(&line);
                }
            }

            ExecutionEvent::JobSkipped { job_id, reason } => {
                output::warning(&format!("  job '{}' skipped: {}", job_id, reason));
            }

            ExecutionEvent::StepStarted { job_id, step_index, display_name } => {
                println!("    [{} step {}] {}", job_id, step_index + 1, display_name);
            }

            ExecutionEvent::StepOutput { line, is_stderr, .. } => {
                if is_stderr {
                    output::step_error(&line);
                } else {
                    output::step_output(&line);
                }
            }

            ExecutionEvent::StepFinished { success, duration, exit_code, .. } => {
                let exit_info = match exit_code {
                    Some(code) if code != 0 => format!(" (exit code: {})", code),
                    _ => String::new(),
                };
                let line = format!("      {:.2}s{}", duration.as_secs_f64(), exit_info);
                if success {
                    output::dim_success(&line);
                } else {
                    output::dim_failure(&line);
                }
            }

            ExecutionEvent::Log { level, message } => match level {
                LogLevel::Error => output::error(&message),
                LogLevel::Warning => output::warning(&message),
                _ => output::dim(&message),
            },

            ExecutionEvent::Error { job_id, message } => {
                let prefix = job_id.map(|id| format!("[{}] ", id)).unwrap_or_default();
                output::error(&format!("{}{}", prefix, message));
            }
        }
    }

    let result = exec_handle.await?;
    result.map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    if !overall_success {
        std::process::exit(1);
    }

    Ok(())
}

fn outcome_label(outcome: JobOutcome) -> &'static str {
    match outcome {
        JobOutcome::Succeeded => "OK",
        JobOutcome::Failed => "FAIL",
        JobOutcome::Skipped => "SKIP",
    }
}
