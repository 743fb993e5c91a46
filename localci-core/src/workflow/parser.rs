use crate::workflow::models::Workflow;

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Severity of a single parse or validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    Warning,
    Error,
}

/// One accumulated parse or validation issue.
///
/// The parser never returns an `Err` for a malformed workflow file - every
/// problem, from a YAML syntax error to an unresolved `needs` reference, is
/// recorded here instead so a caller can inspect the whole list.
#[derive(Debug, Clone)]
pub struct ParseIssue {
    pub severity: IssueSeverity,
    pub message: String,
    pub file: Option<PathBuf>,
}

impl ParseIssue {
    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Error,
            message: message.into(),
            file: None,
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            message: message.into(),
            file: None,
        }
    }

    fn with_file(mut self, file: impl AsRef<Path>) -> Self {
        self.file = Some(file.as_ref().to_path_buf());
        self
    }
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            IssueSeverity::Warning => "warning",
            IssueSeverity::Error => "error",
        };
        match &self.file {
            Some(path) => write!(f, "{}: {}: {}", tag, path.display(), self.message),
            None => write!(f, "{}: {}", tag, self.message),
        }
    }
}

/// Result of attempting to parse a workflow file.
///
/// `workflow` is `None` only when the YAML itself could not be read or
/// deserialized at all; semantic problems (missing `needs` target, cycles,
/// steps with neither `run` nor `uses`, ...) still produce a `Some`
/// workflow alongside the accumulated errors, matching the tolerant
/// contract the rest of the engine expects.
#[derive(Debug)]
pub struct ParseOutcome {
    pub workflow: Option<Workflow>,
    pub issues: Vec<ParseIssue>,
}

impl ParseOutcome {
    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == IssueSeverity::Error)
    }
}

/// Parser for GitHub Actions-flavored workflow YAML files.
pub struct WorkflowParser;

impl WorkflowParser {
    /// Parse a workflow from a file path. Never fails: all problems are
    /// recorded on the returned outcome.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ParseOutcome {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                return ParseOutcome {
                    workflow: None,
                    issues: vec![ParseIssue::error(format!("failed to read file: {}", e))
                        .with_file(path)],
                };
            }
        };

        let mut outcome = Self::parse(&content);
        for issue in &mut outcome.issues {
            if issue.file.is_none() {
                issue.file = Some(path.to_path_buf());
            }
        }
        outcome
    }

    /// Parse a workflow from a YAML string.
    pub fn parse(content: &str) -> ParseOutcome {
        let workflow: Workflow = match serde_yaml::from_str(content) {
            Ok(w) => w,
            Err(e) => {
                return ParseOutcome {
                    workflow: None,
                    issues: vec![ParseIssue::error(format!("invalid YAML: {}", e))],
                };
            }
        };

        let issues = Self::validate(&workflow);
        ParseOutcome {
            workflow: Some(workflow),
            issues,
        }
    }

    /// Validate a parsed workflow for semantic correctness, returning every
    /// problem found rather than stopping at the first one.
    pub fn validate(workflow: &Workflow) -> Vec<ParseIssue> {
        let mut issues = Vec::new();

        for (job_id, job) in &workflow.jobs {
            for needed in job.needs.to_vec() {
                if !workflow.jobs.contains_key(&needed) {
                    issues.push(ParseIssue::error(format!(
                        "job '{}' depends on non-existent job '{}'",
                        job_id, needed
                    )));
                }
            }
        }

        issues.extend(Self::find_cycles(workflow));

        for (job_id, job) in &workflow.jobs {
            if job.steps.is_empty() {
                issues.push(ParseIssue::error(format!("job '{}' has no steps", job_id)));
            }

            for (idx, step) in job.steps.iter().enumerate() {
                let has_run = step.run.is_some();
                let has_uses = step.uses.is_some();
                let name = step.name.as_deref().unwrap_or("unnamed");

                if !has_run && !has_uses {
                    issues.push(ParseIssue::error(format!(
                        "step {} '{}' in job '{}' has neither 'run' nor 'uses'",
                        idx, name, job_id
                    )));
                } else if has_run && has_uses {
                    issues.push(ParseIssue::error(format!(
                        "step {} '{}' in job '{}' has both 'run' and 'uses'",
                        idx, name, job_id
                    )));
                }
            }
        }

        for (job_id, job) in &workflow.jobs {
            if let Some(strategy) = &job.strategy {
                if let Some(matrix) = &strategy.matrix {
                    for (axis, value) in &matrix.dimensions {
                        if !value.is_array() {
                            issues.push(ParseIssue::warning(format!(
                                "job '{}' matrix axis '{}' is a scalar, treating as a singleton sequence",
                                job_id, axis
                            )));
                        }
                    }
                    if matrix.dimensions.is_empty() {
                        issues.push(ParseIssue::error(format!(
                            "job '{}' has an empty matrix strategy",
                            job_id
                        )));
                    }
                }
            }
        }

        issues
    }

    /// Find every job participating in a `needs` cycle.
    fn find_cycles(workflow: &Workflow) -> Vec<ParseIssue> {
        fn visit(
            job_id: &str,
            workflow: &Workflow,
            visited: &mut HashSet<String>,
            rec_stack: &mut Vec<String>,
        ) -> Option<String> {
            visited.insert(job_id.to_string());
            rec_stack.push(job_id.to_string());

            if let Some(job) = workflow.jobs.get(job_id) {
                for needed in job.needs.to_vec() {
                    if rec_stack.contains(&needed) {
                        let start = rec_stack.iter().position(|j| j == &needed).unwrap();
                        let mut cycle = rec_stack[start..].to_vec();
                        cycle.push(needed);
                        return Some(cycle.join(" -> "));
                    }
                    if !visited.contains(&needed) {
                        if let Some(cycle) = visit(&needed, workflow, visited, rec_stack) {
                            return Some(cycle);
                        }
                    }
                }
            }

            rec_stack.pop();
            None
        }

        let mut visited = HashSet::new();
        let mut issues = Vec::new();
        for job_id in workflow.jobs.keys() {
            if visited.contains(job_id) {
                continue;
            }
            let mut rec_stack = Vec::new();
            if let Some(cycle) = visit(job_id, workflow, &mut visited, &mut rec_stack) {
                issues.push(ParseIssue::error(format!(
                    "circular dependency detected: {}",
                    cycle
                )));
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_workflow() {
        let yaml = r#"
on: push
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - run: echo "Hello"
"#;
        let outcome = WorkflowParser::parse(yaml);
        assert!(!outcome.has_errors());
        let workflow = outcome.workflow.unwrap();
        assert!(workflow.jobs.contains_key("build"));
    }

    #[test]
    fn test_job_order_preserved() {
        let yaml = r#"
on: push
jobs:
  zeta:
    runs-on: ubuntu-latest
    steps:
      - run: echo zeta
  alpha:
    runs-on: ubuntu-latest
    steps:
      - run: echo alpha
"#;
        let outcome = WorkflowParser::parse(yaml);
        let workflow = outcome.workflow.unwrap();
        let ids: Vec<_> = workflow.jobs.keys().cloned().collect();
        assert_eq!(ids, vec!["zeta".to_string(), "alpha".to_string()]);
    }

    #[test]
    fn test_invalid_yaml_never_panics() {
        let yaml = "not: [valid: yaml: at: all";
        let outcome = WorkflowParser::parse(yaml);
        assert!(outcome.workflow.is_none());
        assert!(outcome.has_errors());
    }

    #[test]
    fn test_validate_missing_dependency() {
        let yaml = r#"
on: push
jobs:
  deploy:
    needs: build
    runs-on: ubuntu-latest
    steps:
      - run: echo "Deploying"
"#;
        let outcome = WorkflowParser::parse(yaml);
        assert!(outcome.has_errors());
        assert!(outcome
            .issues
            .iter()
            .any(|i| i.message.contains("non-existent job")));
        // the workflow itself still comes back - tolerant parsing
        assert!(outcome.workflow.is_some());
    }

    #[test]
    fn test_validate_circular_dependency() {
        let yaml = r#"
on: push
jobs:
  a:
    needs: c
    runs-on: ubuntu-latest
    steps:
      - run: echo "a"
  b:
    needs: a
    runs-on: ubuntu-latest
    steps:
      - run: echo "b"
  c:
    needs: b
    runs-on: ubuntu-latest
    steps:
      - run: echo "c"
"#;
        let outcome = WorkflowParser::parse(yaml);
        assert!(outcome
            .issues
            .iter()
            .any(|i| i.message.contains("circular dependency")));
    }

    #[test]
    fn test_validate_empty_job() {
        let yaml = r#"
on: push
jobs:
  empty:
    runs-on: ubuntu-latest
    steps: []
"#;
        let outcome = WorkflowParser::parse(yaml);
        assert!(outcome.issues.iter().any(|i| i.message.contains("no steps")));
    }

    #[test]
    fn test_validate_step_without_run_or_uses() {
        let yaml = r#"
on: push
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - name: Invalid step
        env:
          FOO: bar
"#;
        let outcome = WorkflowParser::parse(yaml);
        assert!(outcome
            .issues
            .iter()
            .any(|i| i.message.contains("neither 'run' nor 'uses'")));
    }

    #[test]
    fn test_validate_step_with_both_run_and_uses() {
        let yaml = r#"
on: push
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - name: Invalid step
        run: echo "Hello"
        uses: actions/checkout@v4
"#;
        let outcome = WorkflowParser::parse(yaml);
        assert!(outcome
            .issues
            .iter()
            .any(|i| i.message.contains("both 'run' and 'uses'")));
    }

    #[test]
    fn test_parse_complex_workflow() {
        let yaml = r#"
name: Rust CI

on:
  push:
    branches: [main, develop]
  pull_request:
    branches: [main]

env:
  CARGO_TERM_COLOR: always

jobs:
  check:
    name: Check
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - name: Run check
        run: cargo check --all-features

  test:
    name: Test Suite
    needs: check
    runs-on: ubuntu-latest
    strategy:
      matrix:
        rust: [stable, beta, nightly]
    steps:
      - uses: actions/checkout@v4
      - name: Run tests
        run: cargo test --all-features
        env:
          RUST_BACKTRACE: 1

  deploy:
    name: Deploy
    needs: [test]
    runs-on: ubuntu-latest
    if: github.ref == 'refs/heads/main'
    steps:
      - run: echo "Deploying..."
"#;
        let outcome = WorkflowParser::parse(yaml);
        assert!(!outcome.has_errors());
        let workflow = outcome.workflow.unwrap();
        assert_eq!(workflow.name, Some("Rust CI".to_string()));
        assert_eq!(workflow.jobs.len(), 3);

        let test = workflow.jobs.get("test").unwrap();
        assert_eq!(test.needs.to_vec(), vec!["check"]);

        let deploy = workflow.jobs.get("deploy").unwrap();
        assert_eq!(deploy.needs.to_vec(), vec!["test"]);

        let strategy = test.strategy.as_ref().unwrap();
        let matrix = strategy.matrix.as_ref().unwrap();
        assert!(matrix.dimensions.contains_key("rust"));
    }

    #[test]
    fn test_scalar_matrix_axis_warns() {
        let yaml = r#"
on: push
jobs:
  test:
    runs-on: ubuntu-latest
    strategy:
      matrix:
        node: 18
    steps:
      - run: echo test
"#;
        let outcome = WorkflowParser::parse(yaml);
        assert!(!outcome.has_errors());
        assert!(outcome
            .issues
            .iter()
            .any(|i| i.severity == IssueSeverity::Warning && i.message.contains("scalar")));
    }
}
