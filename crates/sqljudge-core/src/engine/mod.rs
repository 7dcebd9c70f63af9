pub mod executor;
pub mod grader;

pub use executor::{Execution, ExecutionOutcome, SandboxExecutor};
pub use grader::Grader;
