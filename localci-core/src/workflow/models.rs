use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use std::collections::HashMap;

/// A GitHub Actions-compatible workflow definition.
///
/// This represents the top-level structure of a workflow YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    /// The name of the workflow (displayed in GitHub Actions UI)
    pub name: Option<String>,

    /// The trigger configuration for the workflow
    #[serde(default, rename = "on")]
    pub on: Option<Trigger>,

    /// Workflow-level environment variables
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Default settings for all jobs in the workflow
    #[serde(default)]
    pub defaults: Option<Defaults>,

    /// The jobs that make up this workflow, in source order
    pub jobs: IndexMap<String, Job>,

    /// Permissions for the GITHUB_TOKEN (parsed but not enforced locally)
    #[serde(default)]
    pub permissions: Option<Permissions>,

    /// Concurrency settings (parsed but not enforced locally)
    #[serde(default)]
    pub concurrency: Option<Concurrency>,
}

/// Trigger configuration for when the workflow should run.
///
/// Supports multiple trigger formats:
/// - Simple: `on: push`
/// - List: `on: [push, pull_request]`
/// - Detailed: `on: { push: { branches: [main] } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Trigger {
    /// Single event trigger: `on: push`
    Single(String),

    /// Multiple events: `on: [push, pull_request]`
    Multiple(Vec<String>),

    /// Detailed event configuration
    Detailed(HashMap<String, Option<EventConfig>>),
}

/// Configuration for a specific trigger event.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EventConfig {
    /// Branch filters for push/pull_request events
    #[serde(default)]
    pub branches: Vec<String>,

    /// Branch ignore patterns
    #[serde(default, rename = "branches-ignore")]
    pub branches_ignore: Vec<String>,

    /// Tag filters for push events
    #[serde(default)]
    pub tags: Vec<String>,

    /// Tag ignore patterns
    #[serde(default, rename = "tags-ignore")]
    pub tags_ignore: Vec<String>,

    /// Path filters
    #[serde(default)]
    pub paths: Vec<String>,

    /// Path ignore patterns
    #[serde(default, rename = "paths-ignore")]
    pub paths_ignore: Vec<String>,

    /// Event types for events like issues, pull_request_review, etc.
    #[serde(default)]
    pub types: Vec<String>,

    /// Cron schedules for schedule events
    #[serde(default)]
    pub cron: Option<String>,

    /// Inputs for workflow_dispatch
    #[serde(default)]
    pub inputs: HashMap<String, WorkflowInput>,

    /// Outputs for workflow_call
    #[serde(default)]
    pub outputs: HashMap<String, WorkflowOutput>,

    /// Secrets for workflow_call
    #[serde(default)]
    pub secrets: HashMap<String, WorkflowSecret>,
}

/// Input definition for workflow_dispatch or workflow_call triggers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowInput {
    /// Description of the input
    #[serde(default)]
    pub description: Option<String>,

    /// Whether the input is required
    #[serde(default)]
    pub required: bool,

    /// Default value for the input
    #[serde(default)]
    pub default: Option<Value>,

    /// Input type (string, boolean, choice, environment)
    #[serde(default, rename = "type")]
    pub input_type: Option<String>,

    /// Options for choice type inputs
    #[serde(default)]
    pub options: Vec<String>,
}

/// Output definition for workflow_call triggers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowOutput {
    /// Description of the output
    #[serde(default)]
    pub description: Option<String>,

    /// Value expression for the output
    pub value: String,
}

/// Secret definition for workflow_call triggers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSecret {
    /// Description of the secret
    #[serde(default)]
    pub description: Option<String>,

    /// Whether the secret is required
    #[serde(default)]
    pub required: bool,
}

/// Default settings for jobs and steps.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Defaults {
    /// Default settings for run steps
    #[serde(default)]
    pub run: Option<RunDefaults>,
}

/// Default settings for run steps.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunDefaults {
    /// Default shell to use
    #[serde(default)]
    pub shell: Option<String>,

    /// Default working directory
    #[serde(default, rename = "working-directory")]
    pub working_directory: Option<String>,
}

/// Permissions configuration for GITHUB_TOKEN.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Permissions {
    /// Read-all or write-all
    Level(String),

    /// Granular permissions
    Granular(HashMap<String, String>),
}

/// Concurrency settings to limit workflow runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Concurrency {
    /// Simple concurrency group name
    Simple(String),

    /// Detailed concurrency configuration
    Detailed {
        group: String,
        #[serde(default, rename = "cancel-in-progress")]
        cancel_in_progress: bool,
    },
}

/// A job within a workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Display name for the job
    #[serde(default)]
    pub name: Option<String>,

    /// Jobs that must complete before this job runs
    #[serde(default)]
    pub needs: JobNeeds,

    /// Runner label (parsed but ignored locally - always runs locally)
    #[serde(default, rename = "runs-on")]
    pub runs_on: Option<RunsOn>,

    /// Conditional expression for job execution
    #[serde(default, rename = "if")]
    pub if_condition: Option<String>,

    /// Job-level environment variables
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Default settings for steps in this job
    #[serde(default)]
    pub defaults: Option<Defaults>,

    /// Job outputs to pass to dependent jobs
    #[serde(default)]
    pub outputs: HashMap<String, String>,

    /// Matrix strategy for running multiple job instances
    #[serde(default)]
    pub strategy: Option<Strategy>,

    /// The steps that make up this job
    #[serde(default)]
    pub steps: Vec<Step>,

    /// Service containers for the job
    #[serde(default)]
    pub services: HashMap<String, Service>,

    /// Container to run the job in
    #[serde(default)]
    pub container: Option<Container>,

    /// Job timeout in minutes
    #[serde(default, rename = "timeout-minutes")]
    pub timeout_minutes: Option<u32>,

    /// Whether to continue workflow if this job fails
    #[serde(default, rename = "continue-on-error")]
    pub continue_on_error: ContinueOnError,

    /// Permissions for this job's GITHUB_TOKEN
    #[serde(default)]
    pub permissions: Option<Permissions>,

    /// Concurrency settings for this job
    #[serde(default)]
    pub concurrency: Option<Concurrency>,

    /// Environment deployment target
    #[serde(default)]
    pub environment: Option<Environment>,
}

/// Job dependencies - can be a single string or a list.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum JobNeeds {
    #[default]
    None,
    Single(String),
    Multiple(Vec<String>),
}

impl JobNeeds {
    /// Convert to a vector of job IDs.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            JobNeeds::None => vec![],
            JobNeeds::Single(s) => vec![s.clone()],
            JobNeeds::Multiple(v) => v.clone(),
        }
    }

    /// Check if there are any dependencies.
    pub fn is_empty(&self) -> bool {
        match self {
            JobNeeds::None => true,
            JobNeeds::Single(_) => false,
            JobNeeds::Multiple(v) => v.is_empty(),
        }
    }
}

/// Runner specification - can be a string or a list of labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunsOn {
    /// Single runner label: `runs-on: ubuntu-latest`
    Label(String),

    /// Multiple labels: `runs-on: [self-hosted, linux]`
    Labels(Vec<String>),

    /// Expression: `runs-on: ${{ matrix.os }}`
    Expression(String),
}

impl RunsOn {
    /// A single representative string for image/VM-template lookup.
    pub fn label(&self) -> &str {
        match self {
            RunsOn::Label(s) => s,
            RunsOn::Labels(v) => v.first().map(|s| s.as_str()).unwrap_or(""),
            RunsOn::Expression(s) => s,
        }
    }
}

/// Continue-on-error setting - can be a boolean or an expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContinueOnError {
    Bool(bool),
    Expression(String),
}

impl Default for ContinueOnError {
    fn default() -> Self {
        ContinueOnError::Bool(false)
    }
}

/// Strategy configuration for matrix builds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strategy {
    /// Matrix configuration
    #[serde(default)]
    pub matrix: Option<Matrix>,

    /// Whether to cancel all jobs if one fails
    #[serde(default = "default_fail_fast", rename = "fail-fast")]
    pub fail_fast: bool,

    /// Maximum number of jobs to run in parallel
    #[serde(default, rename = "max-parallel")]
    pub max_parallel: Option<u32>,
}

fn default_fail_fast() -> bool {
    true
}

/// Matrix configuration for parallel job execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Matrix {
    /// Matrix dimensions (dynamic keys), in source order.
    ///
    /// A dimension's value is normally a sequence but a bare scalar is
    /// accepted too and treated as a singleton sequence by the expander.
    #[serde(flatten)]
    pub dimensions: IndexMap<String, Value>,

    /// Additional matrix combinations to include
    #[serde(default)]
    pub include: Vec<HashMap<String, Value>>,

    /// Matrix combinations to exclude
    #[serde(default)]
    pub exclude: Vec<HashMap<String, Value>>,
}

/// A step within a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Unique identifier for the step (used in outputs)
    #[serde(default)]
    pub id: Option<String>,

    /// Display name for the step
    #[serde(default)]
    pub name: Option<String>,

    /// Conditional expression for step execution
    #[serde(default, rename = "if")]
    pub if_condition: Option<String>,

    /// Shell command to run
    #[serde(default)]
    pub run: Option<String>,

    /// Shell to use for the run command
    #[serde(default)]
    pub shell: Option<String>,

    /// Working directory for the step
    #[serde(default, rename = "working-directory")]
    pub working_directory: Option<String>,

    /// Action to use (e.g., "actions/checkout@v4")
    #[serde(default)]
    pub uses: Option<String>,

    /// Inputs to pass to the action
    #[serde(default)]
    pub with: HashMap<String, Value>,

    /// Step-level environment variables
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Whether to continue job if this step fails
    #[serde(default, rename = "continue-on-error")]
    pub continue_on_error: bool,

    /// Step timeout in minutes
    #[serde(default, rename = "timeout-minutes")]
    pub timeout_minutes: Option<u32>,
}

impl Step {
    /// Get a display name for the step.
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            name.clone()
        } else if let Some(uses) = &self.uses {
            format!("Run {}", uses)
        } else if let Some(run) = &self.run {
            // Truncate long commands
            let first_line = run.lines().next().unwrap_or(run);
            if first_line.len() > 50 {
                format!("{}...", &first_line[..47])
            } else {
                format!("Run {}", first_line)
            }
        } else {
            "Unnamed step".to_string()
        }
    }

    /// Check if this is a run step.
    pub fn is_run(&self) -> bool {
        self.run.is_some()
    }

    /// Check if this is a uses step.
    pub fn is_uses(&self) -> bool {
        self.uses.is_some()
    }
}

/// Service container definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    /// Docker image to use
    pub image: String,

    /// Environment variables for the container
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Port mappings (host:container)
    #[serde(default)]
    pub ports: Vec<String>,

    /// Volume mounts
    #[serde(default)]
    pub volumes: Vec<String>,

    /// Additional docker options
    #[serde(default)]
    pub options: Option<String>,

    /// Credentials for private registries
    #[serde(default)]
    pub credentials: Option<ContainerCredentials>,
}

/// Container configuration for running a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Container {
    /// Simple image name
    Image(String),

    /// Detailed container configuration
    Detailed(ContainerConfig),
}

/// Detailed container configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Docker image to use
    pub image: String,

    /// Environment variables for the container
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Port mappings
    #[serde(default)]
    pub ports: Vec<String>,

    /// Volume mounts
    #[serde(default)]
    pub volumes: Vec<String>,

    /// Additional docker options
    #[serde(default)]
    pub options: Option<String>,

    /// Credentials for private registries
    #[serde(default)]
    pub credentials: Option<ContainerCredentials>,
}

/// Credentials for container registries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerCredentials {
    /// Username for the registry
    pub username: String,

    /// Password for the registry
    pub password: String,
}

/// Environment deployment target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Environment {
    /// Simple environment name
    Name(String),

    /// Detailed environment configuration
    Detailed {
        name: String,
        #[serde(default)]
        url: Option<String>,
    },
}
