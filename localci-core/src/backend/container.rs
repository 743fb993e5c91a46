// Container backend
// Runs job steps inside a docker/podman container.

use super::{
    Backend, StepContext, StepOutcome, CLEANUP_TIMEOUT, DETECT_TIMEOUT, PREPARE_TIMEOUT,
    STEP_TIMEOUT,
};
use crate::error::{ServiceError, ServiceResult};
use crate::workflow::{RunsOn, Step};

use async_trait::async_trait;
use tokio::process::Command;

/// A container-based sandbox. One instance handles one job.
pub struct ContainerBackend {
    runtime: Option<&'static str>,
    container_id: Option<String>,
}

impl ContainerBackend {
    pub fn new() -> Self {
        Self {
            runtime: None,
            container_id: None,
        }
    }

    async fn detect_runtime(&mut self) -> ServiceResult<&'static str> {
        if let Some(runtime) = self.runtime {
            return Ok(runtime);
        }

        for candidate in ["docker", "podman"] {
            if probe(candidate).await {
                self.runtime = Some(candidate);
                return Ok(candidate);
            }
        }

        Err(ServiceError::RuntimeMissing(
            "neither docker nor podman was found on PATH".to_string(),
        ))
    }
}

async fn probe(binary: &str) -> bool {
    let result = tokio::time::timeout(
        DETECT_TIMEOUT,
        Command::new(binary).arg("--version").output(),
    )
    .await;

    matches!(result, Ok(Ok(output)) if output.status.success())
}

/// Map a `runs-on` label to a container image.
fn map_image(runs_on: &str) -> &'static str {
    if runs_on.contains("ubuntu-latest") || runs_on.contains("ubuntu-22.04") {
        "ubuntu:22.04"
    } else if runs_on.contains("ubuntu-20.04") {
        "ubuntu:20.04"
    } else if runs_on.contains("ubuntu") {
        "ubuntu:latest"
    } else if runs_on.contains("debian") {
        "debian:latest"
    } else if runs_on.contains("alpine") {
        "alpine:latest"
    } else {
        "ubuntu:22.04"
    }
}

#[async_trait]
impl Backend for ContainerBackend {
    async fn prepare_environment(&mut self, runs_on: &RunsOn) -> ServiceResult<()> {
        let runtime = self.detect_runtime().await?;
        let image = map_image(runs_on.label());

        let output = tokio::time::timeout(
            PREPARE_TIMEOUT,
            Command::new(runtime)
                .args(["run", "-d", "-it", image, "sh"])
                .output(),
        )
        .await
        .map_err(|_| ServiceError::Timeout(PREPARE_TIMEOUT))??;

        if !output.status.success() {
            return Err(ServiceError::Sandbox(format!(
                "failed to start container: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if id.is_empty() {
            return Err(ServiceError::Sandbox(
                "container runtime returned an empty container id".to_string(),
            ));
        }
        self.container_id = Some(id);
        Ok(())
    }

    async fn execute_step(
        &mut self,
        step: &Step,
        context: &StepContext,
    ) -> ServiceResult<StepOutcome> {
        let runtime = self.runtime.ok_or_else(|| {
            ServiceError::Sandbox("container not prepared before running a step".to_string())
        })?;
        let container_id = self
            .container_id
            .clone()
            .ok_or_else(|| ServiceError::Sandbox("container not prepared".to_string()))?;

        if let Some(run) = &step.run {
            let shell = step.shell.clone().unwrap_or_else(|| "sh".to_string());
            let mut command = Command::new(runtime);
            command.arg("exec");
            if let Some(dir) = &context.working_directory {
                command.arg("-w").arg(dir);
            }
            for (key, value) in &context.env {
                command.arg("-e").arg(format!("{}={}", key, value));
            }
            command.args([container_id.as_str(), shell.as_str(), "-c", run.as_str()]);

            let output = tokio::time::timeout(STEP_TIMEOUT, command.output())
                .await
                .map_err(|_| ServiceError::Timeout(STEP_TIMEOUT))??;

            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));

            Ok(StepOutcome {
                success: output.status.success(),
                exit_code: output.status.code(),
                output: combined,
            })
        } else if let Some(uses) = &step.uses {
            Ok(StepOutcome {
                success: true,
                exit_code: Some(0),
                output: format!("action execution: {} (unsupported, treated as a no-op)", uses),
            })
        } else {
            Ok(StepOutcome {
                success: true,
                exit_code: Some(0),
                output: String::new(),
            })
        }
    }

    async fn cleanup(&mut self) -> ServiceResult<()> {
        let Some(container_id) = self.container_id.take() else {
            return Ok(());
        };
        let runtime = self.runtime.unwrap_or("docker");

        let _ = tokio::time::timeout(
            CLEANUP_TIMEOUT,
            Command::new(runtime).args(["rm", "-f", &container_id]).output(),
        )
        .await;

        Ok(())
    }
}

impl Default for ContainerBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_image_known_labels() {
        assert_eq!(map_image("ubuntu-latest"), "ubuntu:22.04");
        assert_eq!(map_image("ubuntu-22.04"), "ubuntu:22.04");
        assert_eq!(map_image("ubuntu-20.04"), "ubuntu:20.04");
        assert_eq!(map_image("ubuntu-18.04"), "ubuntu:latest");
        assert_eq!(map_image("debian-11"), "debian:latest");
        assert_eq!(map_image("alpine-3.18"), "alpine:latest");
    }

    #[test]
    fn test_map_image_unknown_label_defaults() {
        assert_eq!(map_image("self-hosted"), "ubuntu:22.04");
        assert_eq!(map_image("windows-latest"), "ubuntu:22.04");
    }

    #[tokio::test]
    async fn test_execute_step_before_prepare_is_an_error() {
        use std::collections::HashMap;

        let mut backend = ContainerBackend::new();
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

    #[tokio::test]
    async fn test_cleanup_without_prepare_is_a_noop() {
        let mut backend = ContainerBackend::new();
        assert!(backend.cleanup().await.is_ok());
    }
}
