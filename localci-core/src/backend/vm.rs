// QEMU VM backend
// Runs job steps inside a qcow2-backed virtual machine.
//
// Startup/shutdown and step execution are stubs: a full implementation
// would provision networking and talk to a guest agent or SSH into the
// VM. This mirrors how far the pipeline this was modeled on got before
// the VM path was shelved in favor of containers.

use super::{Backend, StepContext, StepOutcome, DETECT_TIMEOUT};
use crate::error::{ServiceError, ServiceResult};
use crate::workflow::{RunsOn, Step};

use async_trait::async_trait;
use tokio::process::Command;

pub struct VmBackend {
    vm_id: Option<String>,
}

impl VmBackend {
    pub fn new() -> Self {
        Self { vm_id: None }
    }

    async fn detect_qemu(&self) -> ServiceResult<()> {
        let result = tokio::time::timeout(
            DETECT_TIMEOUT,
            Command::new("qemu-system-x86_64").arg("--version").output(),
        )
        .await;

        match result {
            Ok(Ok(output)) if output.status.success() => Ok(()),
            _ => Err(ServiceError::RuntimeMissing(
                "qemu-system-x86_64 was not found on PATH".to_string(),
            )),
        }
    }
}

/// Map a `runs-on` label to a prebuilt VM image.
fn map_vm_image(runs_on: &str) -> &'static str {
    if runs_on.contains("ubuntu-latest") || runs_on.contains("ubuntu-22.04") {
        "ubuntu-22.04.qcow2"
    } else if runs_on.contains("ubuntu-20.04") {
        "ubuntu-20.04.qcow2"
    } else if runs_on.contains("windows-latest") {
        "windows-2022.qcow2"
    } else {
        "ubuntu-22.04.qcow2"
    }
}

#[async_trait]
impl Backend for VmBackend {
    async fn prepare_environment(&mut self, runs_on: &RunsOn) -> ServiceResult<()> {
        self.detect_qemu().await?;
        let image = map_vm_image(runs_on.label());

        // Stand-in id; a real implementation would come from the qemu
        // process handle once networking and a monitor socket exist.
        self.vm_id = Some(format!("vm-{}-{}", image, std::process::id()));
        Ok(())
    }

    async fn execute_step(
        &mut self,
        step: &Step,
        _context: &StepContext,
    ) -> ServiceResult<StepOutcome> {
        if self.vm_id.is_none() {
            return Err(ServiceError::Sandbox("VM not prepared".to_string()));
        }

        let output = if let Some(run) = &step.run {
            format!("executing in VM (unsupported, treated as a no-op): {}", run)
        } else if let Some(uses) = &step.uses {
            format!("action execution in VM (unsupported, treated as a no-op): {}", uses)
        } else {
            String::new()
        };

        Ok(StepOutcome {
            success: true,
            exit_code: Some(0),
            output,
        })
    }

    async fn cleanup(&mut self) -> ServiceResult<()> {
        self.vm_id = None;
        Ok(())
    }
}

impl Default for VmBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_vm_image_known_labels() {
        assert_eq!(map_vm_image("ubuntu-latest"), "ubuntu-22.04.qcow2");
        assert_eq!(map_vm_image("ubuntu-20.04"), "ubuntu-20.04.qcow2");
        assert_eq!(map_vm_image("windows-latest"), "windows-2022.qcow2");
        assert_eq!(map_vm_image("macos-latest"), "ubuntu-22.04.qcow2");
    }

    #[tokio::test]
    async fn test_execute_step_before_prepare_is_an_error() {
        use std::collections::HashMap;

        let mut backend = VmBackend::new();
        let step = Step {
            id: None,
            name: None,
            if_condition: None,
            run: Some("echo hi".to_string()),
            shell: None,
            working_directory: None,
            uses: None,
            with: HashMap::new(),
            env: HashMap::new(),
            continue_on_error: false,
            timeout_minutes: None,
        };
        let result = backend.execute_step(&step, &StepContext::default()).await;
        assert!(result.is_err());
    }
}
