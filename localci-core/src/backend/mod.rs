// Execution backends
// A backend owns one job's sandbox: bring it up, run steps in it, tear it
// down. Two implementations exist - a container backend (docker/podman)
// and a VM backend (qemu) - selected once per run.

mod container;
mod vm;

pub use container::ContainerBackend;
pub use vm::VmBackend;

use crate::error::ServiceResult;
use crate::workflow::{RunsOn, Step};

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Timeout for `prepare_environment`.
pub const PREPARE_TIMEOUT: Duration = Duration::from_secs(60);
/// Timeout for a single `execute_step` call.
pub const STEP_TIMEOUT: Duration = Duration::from_secs(300);
/// Timeout for `cleanup`.
pub const CLEANUP_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout for runtime presence detection (docker/podman/qemu probes).
pub const DETECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of running one step.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub output: String,
}

/// Everything a backend needs to run a step beyond the step itself: the
/// effective environment (workflow env \<- job env \<- step env \<- matrix
/// injections, already merged by the scheduler) and an optional working
/// directory override.
#[derive(Debug, Clone, Default)]
pub struct StepContext {
    pub env: HashMap<String, String>,
    pub working_directory: Option<String>,
}

/// A sandbox a job's steps run inside.
///
/// Implementations map a `runs-on` label to a concrete image, bring up
/// the sandbox, execute steps one at a time, and tear it down. `uses`
/// steps are not resolved against the action marketplace; they are
/// reported as unsupported and treated as a no-op success.
#[async_trait]
pub trait Backend: Send {
    async fn prepare_environment(&mut self, runs_on: &RunsOn) -> ServiceResult<()>;

    async fn execute_step(
        &mut self,
        step: &Step,
        context: &StepContext,
    ) -> ServiceResult<StepOutcome>;

    async fn cleanup(&mut self) -> ServiceResult<()>;
}

/// Which backend a run should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Container,
    Vm,
}

/// Construct the requested backend.
pub fn create(kind: BackendKind) -> Box<dyn Backend> {
    match kind {
        BackendKind::Container => Box::new(ContainerBackend::new()),
        BackendKind::Vm => Box::new(VmBackend::new()),
    }
}
