pub mod models;
pub mod parser;

pub use models::{
    ContinueOnError, Defaults, Environment, EventConfig, Job, JobNeeds, Matrix, Permissions,
    RunDefaults, RunsOn, Service, Step, Strategy, Trigger, Workflow, WorkflowInput, WorkflowOutput,
    WorkflowSecret,
};
pub use parser::{IssueSeverity, ParseIssue, ParseOutcome, WorkflowParser};
