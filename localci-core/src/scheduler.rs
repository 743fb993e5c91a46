// Job scheduler
// Runs a workflow's jobs in dependency order with a single ready queue:
// a job becomes ready once every job it needs has finished, and is
// skipped outright if any of them failed.

use crate::backend::{Backend, BackendKind, StepContext};
use crate::error::{ServiceError, ServiceResult};
use crate::events::{EventSender, ExecutionEvent, JobOutcome, ProgressSender};
use crate::matrix;
use crate::workflow::Workflow;

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A handle that can request early termination of an in-flight
/// `Scheduler::execute` call. Checked between jobs; the job currently
/// running is allowed to finish its current step before the run stops.
#[derive(Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Runs one workflow to completion, honoring `needs` ordering.
pub struct Scheduler {
    backend_kind: BackendKind,
    running: bool,
    stop_flag: Arc<AtomicBool>,
}

impl Scheduler {
    pub fn new(backend_kind: BackendKind) -> Self {
        Self {
            backend_kind,
            running: false,
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A cloneable handle that lets a caller (the CLI's signal handler, the
    /// TUI's keybinding) request cancellation from outside the task driving
    /// `execute`.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(self.stop_flag.clone())
    }

    /// Expand matrix jobs, then run the resulting job graph to completion.
    ///
    /// Returns `true` if every job either succeeded or was intentionally
    /// skipped by its own `if` - never by a failed dependency.
    pub async fn execute(
        &mut self,
        workflow: &Workflow,
        events: &Option<ProgressSender>,
    ) -> ServiceResult<bool> {
        if self.running {
            return Err(ServiceError::Busy);
        }
        self.running = true;
        self.stop_flag.store(false, Ordering::SeqCst);

        let jobs = expand_all(workflow);

        let mut dependencies: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut dependents: HashMap<String, Vec<String>> = HashMap::new();
        let mut ready_queue: Vec<String> = Vec::new();
        let mut queued: HashSet<String> = HashSet::new();

        for (job_id, job) in &jobs {
            let needs = job.needs.to_vec();
            for dep in &needs {
                dependents.entry(dep.clone()).or_default().push(job_id.clone());
            }
            if needs.is_empty() {
                ready_queue.push(job_id.clone());
                queued.insert(job_id.clone());
            }
            dependencies.insert(job_id.clone(), needs);
        }

        let start = Instant::now();

        if ready_queue.is_empty() && !jobs.is_empty() {
            events.send_event(ExecutionEvent::execution_started(
                workflow.name.clone().unwrap_or_else(|| "workflow".to_string()),
                jobs.len(),
            ));
            events.send_event(ExecutionEvent::error(
                None,
                "no runnable jobs found: check for circular or missing dependencies".to_string(),
            ));
            events.send_event(ExecutionEvent::execution_finished(false, start.elapsed()));
            self.running = false;
            return Ok(false);
        }

        events.send_event(ExecutionEvent::execution_started(
            workflow.name.clone().unwrap_or_else(|| "workflow".to_string()),
            jobs.len(),
        ));

        let mut processed: HashSet<String> = HashSet::new();
        let mut failed: HashSet<String> = HashSet::new();
        let mut success = true;

        let mut cancelled = false;
        while let Some(job_id) = ready_queue.pop() {
            if self.stop_flag.load(Ordering::SeqCst) {
                cancelled = true;
                break;
            }
            queued.remove(&job_id);
            let job = jobs.get(&job_id).expect("queued job must exist");

            let job_started = Instant::now();
            events.send_event(ExecutionEvent::job_started(
                &job_id,
                job.name.clone().unwrap_or_else(|| job_id.clone()),
                job.steps.len(),
            ));

            let job_success = self.execute_job(&job_id, job, &workflow.env, events).await;

            events.send_event(ExecutionEvent::job_finished(
                &job_id,
                if job_success { JobOutcome::Succeeded } else { JobOutcome::Failed },
                job_started.elapsed(),
            ));

            processed.insert(job_id.clone());
            if !job_success {
                failed.insert(job_id.clone());
                success = false;
            }

            let Some(dependent_ids) = dependents.get(&job_id).cloned() else {
                continue;
            };

            for dependent_id in dependent_ids {
                if processed.contains(&dependent_id) || queued.contains(&dependent_id) {
                    continue;
                }

                let needs = dependencies.get(&dependent_id).cloned().unwrap_or_default();
                let all_processed = needs.iter().all(|dep| processed.contains(dep));
                if !all_processed {
                    continue;
                }

                let any_failed = needs.iter().any(|dep| failed.contains(dep));
                if any_failed {
                    events.send_event(ExecutionEvent::error(
                        Some(dependent_id.clone()),
                        "skipping because a dependency failed".to_string(),
                    ));
                    events.send_event(ExecutionEvent::job_finished(
                        &dependent_id,
                        JobOutcome::Failed,
                        Duration::ZERO,
                    ));
                    processed.insert(dependent_id.clone());
                    failed.insert(dependent_id);
                    success = false;
                } else {
                    ready_queue.push(dependent_id.clone());
                    queued.insert(dependent_id);
                }
            }
        }

        if cancelled {
            events.send_event(ExecutionEvent::error(None, "execution cancelled".to_string()));
            success = false;
        } else if processed.len() != jobs.len() {
            events.send_event(ExecutionEvent::error(
                None,
                "workflow contains unresolved dependencies or cycles".to_string(),
            ));
            success = false;
        }

        events.send_event(ExecutionEvent::execution_finished(success, start.elapsed()));
        self.running = false;
        Ok(success)
    }

    async fn execute_job(
        &self,
        job_id: &str,
        job: &crate::workflow::Job,
        workflow_env: &HashMap<String, String>,
        events: &Option<ProgressSender>,
    ) -> bool {
        let mut backend: Box<dyn Backend> = crate::backend::create(self.backend_kind);

        let runs_on = match &job.runs_on {
            Some(runs_on) => runs_on.clone(),
            None => crate::workflow::RunsOn::Label("ubuntu-latest".to_string()),
        };

        if let Err(e) = backend.prepare_environment(&runs_on).await {
            events.send_event(ExecutionEvent::error(Some(job_id.to_string()), e.to_string()));
            return false;
        }

        let mut job_success = true;
        for (index, step) in job.steps.iter().enumerate() {
            let started = Instant::now();
            events.send_event(ExecutionEvent::step_started(job_id, index, step.display_name()));

            let mut env: HashMap<String, String> = workflow_env.clone();
            env.extend(job.env.clone());
            env.extend(step.env.clone());
            let context = StepContext {
                env,
                working_directory: step.working_directory.clone(),
            };

            match backend.execute_step(step, &context).await {
                Ok(outcome) => {
                    if !outcome.output.is_empty() {
                        events.send_event(ExecutionEvent::step_output(job_id, index, outcome.output, false));
                    }
                    events.send_event(ExecutionEvent::step_finished(
                        job_id,
                        index,
                        outcome.success,
                        outcome.exit_code,
                        started.elapsed(),
                    ));
                    if !outcome.success {
                        job_success = false;
                        break;
                    }
                }
                Err(e) => {
                    events.send_event(ExecutionEvent::step_finished(job_id, index, false, None, started.elapsed()));
                    events.send_event(ExecutionEvent::error(Some(job_id.to_string()), e.to_string()));
                    job_success = false;
                    break;
                }
            }
        }

        let _ = backend.cleanup().await;
        job_success
    }
}

/// Expand every job's matrix strategy into its concrete jobs, preserving
/// the original source order of non-matrix jobs and grouping each
/// matrix job's instances together where it was declared.
fn expand_all(workflow: &Workflow) -> IndexMap<String, crate::workflow::Job> {
    let mut expanded = IndexMap::new();
    for (job_id, job) in &workflow.jobs {
        for (new_id, new_job) in matrix::expand(job_id, job) {
            expanded.insert(new_id, new_job);
        }
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::progress_channel;
    use crate::workflow::WorkflowParser;

    fn parse(yaml: &str) -> Workflow {
        WorkflowParser::parse(yaml).workflow.expect("workflow should parse")
    }

    #[tokio::test]
    async fn test_busy_guard_rejects_concurrent_execution() {
        let workflow = parse(
            r#"
name: CI
on: push
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - run: echo hi
"#,
        );
        let mut scheduler = Scheduler::new(BackendKind::Vm);
        scheduler.running = true;
        let result = scheduler.execute(&workflow, &None).await;
        assert!(matches!(result, Err(ServiceError::Busy)));
    }

    #[tokio::test]
    async fn test_no_runnable_jobs_reports_failure_instead_of_erroring() {
        let workflow = parse(
            r#"
name: CI
on: push
jobs:
  a:
    needs: b
    runs-on: ubuntu-latest
    steps:
      - run: echo a
  b:
    needs: a
    runs-on: ubuntu-latest
    steps:
      - run: echo b
"#,
        );
        let (tx, mut rx) = progress_channel();
        let mut scheduler = Scheduler::new(BackendKind::Vm);
        let result = scheduler.execute(&workflow, &Some(tx)).await.unwrap();
        assert!(!result);

        let mut saw_error = false;
        let mut saw_finished = false;
        while let Some(event) = rx.recv().await {
            match event {
                ExecutionEvent::Error { .. } => saw_error = true,
                ExecutionEvent::ExecutionFinished { success, .. } => {
                    saw_finished = true;
                    assert!(!success);
                }
                ExecutionEvent::JobStarted { .. } => panic!("no job should ever start"),
                _ => {}
            }
        }
        assert!(saw_error);
        assert!(saw_finished);
    }

    #[tokio::test]
    async fn test_stop_handle_cancels_before_next_job() {
        let workflow = parse(
            r#"
name: CI
on: push
jobs:
  a:
    runs-on: ubuntu-latest
    steps:
      - run: echo a
  b:
    needs: a
    runs-on: ubuntu-latest
    steps:
      - run: echo b
"#,
        );
        let mut scheduler = Scheduler::new(BackendKind::Vm);
        let stop = scheduler.stop_handle();
        stop.stop();
        let result = scheduler.execute(&workflow, &None).await.unwrap();
        assert!(!result);
    }

    #[test]
    fn test_expand_all_preserves_non_matrix_job_count() {
        let workflow = parse(
            r#"
name: CI
on: push
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - run: echo building
  test:
    needs: build
    runs-on: ubuntu-latest
    steps:
      - run: echo testing
"#,
        );
        let expanded = expand_all(&workflow);
        assert_eq!(expanded.len(), 2);
        assert!(expanded.contains_key("build"));
        assert!(expanded.contains_key("test"));
    }
}
