use crate::output;

use std::path::PathBuf;

use clap::Args;
use color_eyre::Result;

use localci_core::doctor::{self, Severity};
use localci_core::workflow::WorkflowParser;

/// Check backend availability and, optionally, a workflow's compatibility
#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Workflow file to check, in addition to the backend probes
    pub workflow: Option<PathBuf>,
}

pub async fn execute(args: DoctorArgs) -> Result<()> {
    output::header("localci diagnostics");

    let mut errors = 0;
    let mut warnings = 0;

    for finding in doctor::check_backends().await {
        print_finding(&finding, &mut errors, &mut warnings);
    }

    if let Some(path) = &args.workflow {
        println!();
        if !path.exists() {
            color_eyre::eyre::bail!("workflow file not found: {}", path.display());
        }

        output::status("Checking", &path.display().to_string());

        let content = std::fs::read_to_string(path)?;
        let outcome = WorkflowParser::parse(&content);

        match &outcome.workflow {
            Some(workflow) if !outcome.has_errors() => {
                output::check("basic workflow structure valid");
                for finding in doctor::check_workflow(workflow, &content) {
                    print_finding(&finding, &mut errors, &mut warnings);
                }
            }
            Some(workflow) => {
                for issue in &outcome.issues {
                    output::error(&issue.to_string());
                    errors += 1;
                }
                for finding in doctor::check_workflow(workflow, &content) {
                    print_finding(&finding, &mut errors, &mut warnings);
                }
            }
            None => {
                for issue in &outcome.issues {
                    output::error(&issue.to_string());
                    errors += 1;
                }
            }
        }
    }

    println!();
    if errors > 0 {
        output::failure(&format!("{} error(s), {} warning(s)", errors, warnings));
        std::process::exit(1);
    } else if warnings > 0 {
        output::warning(&format!("{} warning(s), no errors", warnings));
    } else {
        output::success("all checks passed");
    }

    Ok(())
}

fn print_finding(finding: &localci_core::DoctorFinding, errors: &mut u32, warnings: &mut u32) {
    match finding.severity {
        Severity::Info => output::check(&finding.message),
        Severity::Warning => {
            *warnings += 1;
            output::warning(&finding.message);
            if let Some(hint) = &finding.hint {
                output::dim(&format!("    -> {}", hint));
            }
        }
        Severity::Error => {
            *errors += 1;
            output::error(&finding.message);
            if let Some(hint) = &finding.hint {
                output::dim(&format!("    -> {}", hint));
            }
        }
    }
}
