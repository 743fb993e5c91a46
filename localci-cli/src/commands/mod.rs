pub mod clone;
pub mod doctor;
pub mod list;
pub mod run;
pub mod workflows;
