use std::collections::HashMap;
use std::path::PathBuf;

use color_eyre::Result;
use ratatui::DefaultTerminal;
use tokio::sync::mpsc::UnboundedReceiver;

use localci_core::backend::BackendKind;
use localci_core::events::{progress_channel, ExecutionEvent, JobOutcome, LogLevel};
use localci_core::scheduler::{Scheduler, StopHandle};
use localci_core::workflow::WorkflowParser;

use crate::events::EventHandler;
use crate::ui;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    WorkflowList,
    Executing,
}

pub struct App {
    pub state: AppState,
    pub workflows: Vec<WorkflowInfo>,
    pub selected_index: usize,
    pub should_quit: bool,
    pub execution_state: Option<ExecutionState>,
    pub event_receiver: Option<UnboundedReceiver<ExecutionEvent>>,
    pub discovery_errors: Vec<DiscoveryError>,
    stop_handle: Option<StopHandle>,
    pending_execution: bool,
}

#[derive(Debug, Clone)]
pub struct DiscoveryError {
    pub file_name: String,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct WorkflowInfo {
    pub name: String,
    pub path: PathBuf,
    pub job_count: usize,
}

#[derive(Debug, Default)]
pub struct ExecutionState {
    pub workflow_name: String,
    pub total_jobs: usize,
    pub completed_jobs: usize,
    pub active_jobs: Vec<String>,
    pub job_outputs: HashMap<String, Vec<String>>,
    pub output_lines: Vec<String>,
    pub is_complete: bool,
    pub success: bool,
}

impl App {
    pub fn new() -> Self {
        let (workflows, discovery_errors) = Self::discover_workflows();
        Self {
            state: AppState::WorkflowList,
            workflows,
            selected_index: 0,
            should_quit: false,
            execution_state: None,
            event_receiver: None,
            discovery_errors,
            stop_handle: None,
            pending_execution: false,
        }
    }

    pub async fn run(&mut self, mut terminal: DefaultTerminal) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| ui::render(self, frame))?;
            self.handle_events()?;

            if self.pending_execution {
                self.pending_execution = false;
                self.execute_selected_workflow()?;
            }

            self.process_execution_events().await;
        }
        Ok(())
    }

    fn discover_workflows() -> (Vec<WorkflowInfo>, Vec<DiscoveryError>) {
        let mut workflows = Vec::new();
        let mut errors = Vec::new();

        let current_dir = match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                errors.push(DiscoveryError {
                    file_name: "<current directory>".to_string(),
                    error: format!("failed to get current directory: {}", e),
                });
                return (workflows, errors);
            }
        };

        let entries = match std::fs::read_dir(&current_dir) {
            Ok(entries) => entries,
            Err(e) => {
                errors.push(DiscoveryError {
                    file_name: current_dir.display().to_string(),
                    error: format!("failed to read directory: {}", e),
                });
                return (workflows, errors);
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let Some(ext) = path.extension() else {
                continue;
            };
            if ext != "yaml" && ext != "yml" {
                continue;
            }

            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown")
                .to_string();

            let outcome = WorkflowParser::from_file(&path);
            match outcome.workflow {
                Some(workflow) if !outcome.has_errors() => {
                    workflows.push(WorkflowInfo {
                        name: workflow.name.unwrap_or_else(|| file_name.clone()),
                        path: path.clone(),
                        job_count: workflow.jobs.len(),
                    });
                }
                _ => {
                    let error = outcome
                        .issues
                        .iter()
                        .map(|issue| issue.to_string())
                        .collect::<Vec<_>>()
                        .join("; ");
                    errors.push(DiscoveryError {
                        file_name,
                        error: if error.is_empty() {
                            "workflow could not be parsed".to_string()
                        } else {
                            error
                        },
                    });
                }
            }
        }

        workflows.sort_by(|a, b| a.name.cmp(&b.name));
        (workflows, errors)
    }

    pub fn move_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.selected_index < self.workflows.len().saturating_sub(1) {
            self.selected_index += 1;
        }
    }

    pub fn request_execute_workflow(&mut self) {
        self.pending_execution = true;
    }

    pub fn execute_selected_workflow(&mut self) -> Result<()> {
        if self.workflows.is_empty() {
            return Ok(());
        }

        let info = &self.workflows[self.selected_index];
        let outcome = WorkflowParser::from_file(&info.path);
        let Some(workflow) = outcome.workflow else {
            return Ok(());
        };
        if outcome.has_errors() {
            return Ok(());
        }

        self.state = AppState::Executing;
        self.execution_state = Some(ExecutionState {
            workflow_name: info.name.clone(),
            ..Default::default()
        });

        let (tx, rx) = progress_channel();
        self.event_receiver = Some(rx);

        let mut scheduler = Scheduler::new(BackendKind::Container);
        self.stop_handle = Some(scheduler.stop_handle());

        tokio::spawn(async move {
            let _ = scheduler.execute(&workflow, &Some(tx)).await;
        });

        Ok(())
    }

    pub fn request_cancel(&mut self) {
        if let Some(handle) = &self.stop_handle {
            handle.stop();
        }
    }

    pub async fn process_execution_events(&mut self) {
        let Some(rx) = &mut self.event_receiver else {
            return;
        };

        let mut should_close_receiver = false;

        while let Ok(event) = rx.try_recv() {
            let Some(exec_state) = &mut self.execution_state else {
                break;
            };

            match event {
                ExecutionEvent::ExecutionStarted { workflow_name, total_jobs } => {
                    exec_state.total_jobs = total_jobs;
                    exec_state
                        .output_lines
                        .push(format!("workflow '{}' started", workflow_name));
                }
                ExecutionEvent::JobStarted { job_id, display_name, .. } => {
                    exec_state.active_jobs.push(job_id.clone());
                    exec_state.job_outputs.entry(job_id.clone()).or_default();
                    exec_state
                        .output_lines
                        .push(format!("\n[job] {} ({})", display_name, job_id));
                }
                ExecutionEvent::JobFinished { job_id, outcome, duration } => {
                    exec_state.active_jobs.retain(|id| id != &job_id);
                    exec_state.completed_jobs += 1;
                    let mark = match outcome {
                        JobOutcome::Succeeded => "\u{2713}",
                        JobOutcome::Failed => "\u{2717}",
                        JobOutcome::Skipped => "-",
                    };
                    exec_state.output_lines.push(format!(
                        "  {} job '{}' finished in {:.2}s",
                        mark,
                        job_id,
                        duration.as_secs_f64()
                    ));
                }
                ExecutionEvent::JobSkipped { job_id, reason } => {
                    exec_state.active_jobs.retain(|id| id != &job_id);
                    exec_state.completed_jobs += 1;
                    exec_state
                        .output_lines
                        .push(format!("  - job '{}' skipped: {}", job_id, reason));
                }
                ExecutionEvent::StepStarted { job_id, step_index, display_name } => {
                    let line = format!("[step {}] {}", step_index + 1, display_name);
                    exec_state
                        .job_outputs
                        .entry(job_id.clone())
                        .or_default()
                        .push(line.clone());
                    exec_state.output_lines.push(format!("    {}", line));
                }
                ExecutionEvent::StepOutput { job_id, line, .. } => {
                    exec_state
                        .job_outputs
                        .entry(job_id.clone())
                        .or_default()
                        .push(line.clone());
                    exec_state.output_lines.push(format!("      {}", line));
                }
                ExecutionEvent::StepFinished { job_id, success, duration, exit_code, .. } => {
                    let mark = if success { "\u{2713}" } else { "\u{2717}" };
                    let exit_info = match exit_code {
                        Some(code) if code != 0 => format!(" (exit code: {})", code),
                        _ => String::new(),
                    };
                    let line = format!("{} {:.2}s{}", mark, duration.as_secs_f64(), exit_info);
                    exec_state
                        .job_outputs
                        .entry(job_id.clone())
                        .or_default()
                        .push(line.clone());
                    exec_state.output_lines.push(format!("      {}", line));
                }
                ExecutionEvent::Log { level, message } => {
                    let prefix = match level {
                        LogLevel::Error => "error",
                        LogLevel::Warning => "warn",
                        LogLevel::Info => "info",
                        LogLevel::Debug => "debug",
                    };
                    exec_state
                        .output_lines
                        .push(format!("[{}] {}", prefix, message));
                }
                ExecutionEvent::Error { job_id, message } => {
                    let prefix = job_id.map(|id| format!("[{}] ", id)).unwrap_or_default();
                    exec_state
                        .output_lines
                        .push(format!("\u{2717} {}{}", prefix, message));
                }
                ExecutionEvent::ExecutionFinished { success, duration } => {
                    exec_state.is_complete = true;
                    exec_state.success = success;
                    if success {
                        exec_state.output_lines.push(format!(
                            "\n\u{2713} workflow completed successfully! ({:.2}s)",
                            duration.as_secs_f64()
                        ));
                    } else {
                        exec_state.output_lines.push(format!(
                            "\n\u{2717} workflow failed! ({:.2}s)",
                            duration.as_secs_f64()
                        ));
                    }
                    should_close_receiver = true;
                }
            }
        }

        if should_close_receiver {
            self.event_receiver = None;
        }
    }

    pub fn back_to_list(&mut self) {
        self.state = AppState::WorkflowList;
        self.execution_state = None;
        self.event_receiver = None;
        self.stop_handle = None;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}
