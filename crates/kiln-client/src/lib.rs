//! Client SDK for Kiln sandboxed compute sessions.
//!
//! This crate provides the building blocks for driving a remote kernel
//! session to completion:
//! - `Kernel` - Handle to one remote session (create, execute, destroy, ...)
//! - `run_to_completion` - The interactive execution loop
//! - `RunIo` - Console and prompt collaborator for the loop
//! - `Admin` - GraphQL admin passthrough

pub mod admin;
pub mod driver;
pub mod error;
pub mod exec;
pub mod kernel;

pub use admin::{Admin, AgentInfo};
pub use driver::{RunIo, run_to_completion};
pub use error::ClientError;
pub use exec::{
    BatchOpts, CompleteOpts, ConsoleRecord, ExecuteOpts, ExecutionMode, ExecutionResult,
    InputOptions, RunStatus,
};
pub use kernel::Kernel;

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, ClientError>;
