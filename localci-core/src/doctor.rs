// Doctor
// Preflight checks: is a backend available, and does this workflow lean
// on anything this engine does not support.

use crate::workflow::Workflow;

use std::time::Duration;
use tokio::process::Command;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct DoctorFinding {
    pub severity: Severity,
    pub message: String,
    pub hint: Option<String>,
}

impl DoctorFinding {
    fn info(message: impl Into<String>) -> Self {
        Self { severity: Severity::Info, message: message.into(), hint: None }
    }

    fn warning(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, message: message.into(), hint: Some(hint.into()) }
    }

    fn error(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self { severity: Severity::Error, message: message.into(), hint: Some(hint.into()) }
    }
}

/// Probe docker/podman/qemu presence on PATH.
pub async fn check_backends() -> Vec<DoctorFinding> {
    let mut findings = Vec::new();

    if probe("docker").await {
        findings.push(DoctorFinding::info("container backend: docker detected"));
    } else if probe("podman").await {
        findings.push(DoctorFinding::info("container backend: podman detected"));
    } else {
        findings.push(DoctorFinding::error(
            "container backend: neither docker nor podman found",
            "install docker or podman for container backend support",
        ));
    }

    if probe("qemu-system-x86_64").await {
        findings.push(DoctorFinding::info("qemu backend: available"));
    } else {
        findings.push(DoctorFinding::warning(
            "qemu backend: not available",
            "install qemu for VM-based execution (optional)",
        ));
    }

    findings
}

async fn probe(binary: &str) -> bool {
    let result = tokio::time::timeout(PROBE_TIMEOUT, Command::new(binary).arg("--version").output()).await;
    matches!(result, Ok(Ok(output)) if output.status.success())
}

/// Structural checks plus a substring scan for unsupported features.
///
/// `workflow` is assumed already parsed; `raw_yaml` is scanned verbatim so
/// findings don't depend on how the parser's model happens to represent a
/// feature.
pub fn check_workflow(workflow: &Workflow, raw_yaml: &str) -> Vec<DoctorFinding> {
    let mut findings = Vec::new();

    let mut deps_valid = true;
    for (job_id, job) in &workflow.jobs {
        for dep in job.needs.to_vec() {
            if !workflow.jobs.contains_key(&dep) {
                deps_valid = false;
                findings.push(DoctorFinding::error(
                    format!("job '{}' depends on non-existent job '{}'", job_id, dep),
                    "fix the `needs:` reference or add the missing job",
                ));
            }
        }
    }
    if deps_valid {
        findings.push(DoctorFinding::info("job dependencies resolvable"));
    }

    if raw_yaml.contains("workflow_call") {
        findings.push(DoctorFinding::warning(
            "uses a reusable workflow (workflow_call)",
            "flatten the workflow; reusable workflows are not executed locally",
        ));
    }

    if raw_yaml.contains("services:") {
        findings.push(DoctorFinding::warning(
            "service containers detected",
            "start services manually before running the workflow",
        ));
    }

    for expr in ["fromJSON", "hashFiles", "toJSON"] {
        if raw_yaml.contains(expr) {
            findings.push(DoctorFinding::warning(
                format!("uses the '{}' expression", expr),
                "expression functions are not evaluated; simplify or use explicit run steps",
            ));
            break;
        }
    }

    if raw_yaml.contains("macos-latest") || raw_yaml.contains("macos-") {
        findings.push(DoctorFinding::error(
            "macOS runners are not supported",
            "use a Linux runner label instead",
        ));
    }

    if raw_yaml.contains("concurrency:") {
        findings.push(DoctorFinding::warning(
            "concurrency groups are parsed but not enforced",
            "jobs run as scheduled; no concurrency limits are applied",
        ));
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::WorkflowParser;

    #[test]
    fn test_missing_dependency_is_an_error() {
        let yaml = r#"
name: CI
on: push
jobs:
  test:
    needs: build
    runs-on: ubuntu-latest
    steps:
      - run: echo testing
"#;
        let workflow = WorkflowParser::parse(yaml).workflow.unwrap();
        let findings = check_workflow(&workflow, yaml);
        assert!(findings.iter().any(|f| f.severity == Severity::Error && f.message.contains("non-existent")));
    }

    #[test]
    fn test_workflow_call_warns() {
        let yaml = r#"
name: CI
on:
  workflow_call: {}
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - run: echo hi
"#;
        let workflow = WorkflowParser::parse(yaml).workflow.unwrap();
        let findings = check_workflow(&workflow, yaml);
        assert!(findings.iter().any(|f| f.severity == Severity::Warning && f.message.contains("reusable workflow")));
    }

    #[test]
    fn test_macos_runner_is_an_error() {
        let yaml = r#"
name: CI
on: push
jobs:
  build:
    runs-on: macos-latest
    steps:
      - run: echo hi
"#;
        let workflow = WorkflowParser::parse(yaml).workflow.unwrap();
        let findings = check_workflow(&workflow, yaml);
        assert!(findings.iter().any(|f| f.severity == Severity::Error && f.message.contains("macOS")));
    }

    #[test]
    fn test_clean_workflow_has_no_findings() {
        let yaml = r#"
name: CI
on: push
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - run: echo hi
"#;
        let workflow = WorkflowParser::parse(yaml).workflow.unwrap();
        let findings = check_workflow(&workflow, yaml);
        assert!(findings.iter().all(|f| f.severity != Severity::Error));
    }
}
