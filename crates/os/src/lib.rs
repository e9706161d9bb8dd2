//! Multiprogramming simulator driver.
//!
//! Ties the `vm` CPU and memory store to the `kernel` scheduler and memory
//! manager:
//! - parses program text and program lists into machine words,
//! - spawns each program into its own partition,
//! - runs the clock loop and summarises the outcome as a [`RunReport`].

pub mod config;
pub use config::MachineConfig;

pub mod loader;
pub use loader::{LoadError, ProgramEntry};

pub mod logger;

pub mod machine;
pub use machine::Machine;

pub mod report;
pub use report::{Probe, RunReport};
