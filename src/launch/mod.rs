//! Launcher command line assembly and process execution

pub mod command;
pub mod path;
pub mod process;

// Re-export public types
pub use command::CommandLineBuilder;
pub use path::PathArgument;
pub use process::{LaunchPlan, ProcessRunner, RunOutcome};
