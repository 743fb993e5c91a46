// Execution events
// Progress reporting for workflow execution: a flat event stream a CLI
// or GUI subscriber can render without knowing about the scheduler.

use std::time::Duration;
use tokio::sync::mpsc;

/// Sender half of a progress channel.
pub type ProgressSender = mpsc::UnboundedSender<ExecutionEvent>;

/// Receiver half of a progress channel.
pub type ProgressReceiver = mpsc::UnboundedReceiver<ExecutionEvent>;

/// Open a new progress channel.
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    mpsc::unbounded_channel()
}

/// A job's terminal state, reported once per job when it finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Succeeded,
    Failed,
    Skipped,
}

/// Events emitted while a workflow runs.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    /// The whole run started, after expansion and scheduling order are known.
    ExecutionStarted { workflow_name: String, total_jobs: usize },

    /// The whole run finished.
    ExecutionFinished { success: bool, duration: Duration },

    /// A job began executing.
    JobStarted { job_id: String, display_name: String, total_steps: usize },

    /// A job reached a terminal state.
    JobFinished {
        job_id: String,
        outcome: JobOutcome,
        duration: Duration,
    },

    /// A job was skipped because a dependency failed, or its `if` was false.
    JobSkipped { job_id: String, reason: String },

    /// A step began executing.
    StepStarted { job_id: String, step_index: usize, display_name: String },

    /// Output captured from a running step, as it arrives.
    StepOutput {
        job_id: String,
        step_index: usize,
        line: String,
        is_stderr: bool,
    },

    /// A step reached a terminal state.
    StepFinished {
        job_id: String,
        step_index: usize,
        success: bool,
        exit_code: Option<i32>,
        duration: Duration,
    },

    /// A structured log message, not tied to a particular job or step.
    Log { level: LogLevel, message: String },

    /// An error that aborted the run or a single job.
    Error { job_id: Option<String>, message: String },
}

/// Severity for `ExecutionEvent::Log`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl ExecutionEvent {
    pub fn execution_started(workflow_name: impl Into<String>, total_jobs: usize) -> Self {
        Self::ExecutionStarted {
            workflow_name: workflow_name.into(),
            total_jobs,
        }
    }

    pub fn execution_finished(success: bool, duration: Duration) -> Self {
        Self::ExecutionFinished { success, duration }
    }

    pub fn job_started(job_id: impl Into<String>, display_name: impl Into<String>, total_steps: usize) -> Self {
        Self::JobStarted {
            job_id: job_id.into(),
            display_name: display_name.into(),
            total_steps,
        }
    }

    pub fn job_finished(job_id: impl Into<String>, outcome: JobOutcome, duration: Duration) -> Self {
        Self::JobFinished {
            job_id: job_id.into(),
            outcome,
            duration,
        }
    }

    pub fn job_skipped(job_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::JobSkipped {
            job_id: job_id.into(),
            reason: reason.into(),
        }
    }

    pub fn step_started(
        job_id: impl Into<String>,
        step_index: usize,
        display_name: impl Into<String>,
    ) -> Self {
        Self::StepStarted {
            job_id: job_id.into(),
            step_index,
            display_name: display_name.into(),
        }
    }

    pub fn step_output(
        job_id: impl Into<String>,
        step_index: usize,
        line: impl Into<String>,
        is_stderr: bool,
    ) -> Self {
        Self::StepOutput {
            job_id: job_id.into(),
            step_index,
            line: line.into(),
            is_stderr,
        }
    }

    pub fn step_finished(
        job_id: impl Into<String>,
        step_index: usize,
        success: bool,
        exit_code: Option<i32>,
        duration: Duration,
    ) -> Self {
        Self::StepFinished {
            job_id: job_id.into(),
            step_index,
            success,
            exit_code,
            duration,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::Log {
            level: LogLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::Log {
            level: LogLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(job_id: Option<String>, message: impl Into<String>) -> Self {
        Self::Error {
            job_id,
            message: message.into(),
        }
    }
}

/// Fire-and-forget sending: a no-op when there is nothing listening.
pub trait EventSender {
    fn send_event(&self, event: ExecutionEvent);
}

impl EventSender for ProgressSender {
    fn send_event(&self, event: ExecutionEvent) {
        let _ = self.send(event);
    }
}

impl EventSender for Option<ProgressSender> {
    fn send_event(&self, event: ExecutionEvent) {
        if let Some(sender) = self {
            let _ = sender.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_progress_channel_delivers_in_order() {
        let (tx, mut rx) = progress_channel();

        tx.send_event(ExecutionEvent::execution_started("ci", 3));
        tx.send_event(ExecutionEvent::job_started("build", "Build", 2));

        let first = rx.recv().await.unwrap();
        assert!(matches!(first, ExecutionEvent::ExecutionStarted { .. }));

        let second = rx.recv().await.unwrap();
        assert!(matches!(second, ExecutionEvent::JobStarted { .. }));
    }

    #[test]
    fn test_job_finished_carries_outcome() {
        let event = ExecutionEvent::job_finished("test", JobOutcome::Failed, Duration::from_secs(5));
        match event {
            ExecutionEvent::JobFinished { job_id, outcome, duration } => {
                assert_eq!(job_id, "test");
                assert_eq!(outcome, JobOutcome::Failed);
                assert_eq!(duration, Duration::from_secs(5));
            }
            _ => panic!("wrong event type"),
        }
    }

    #[test]
    fn test_none_sender_does_not_panic() {
        let sender: Option<ProgressSender> = None;
        sender.send_event(ExecutionEvent::info("no subscriber attached"));
    }
}
