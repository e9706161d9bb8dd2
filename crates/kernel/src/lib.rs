pub mod config;
pub use config::Config;

pub mod mmu;
pub use mmu::{Allocation, Hole, MemoryManager};

pub mod task;
pub use task::{Pcb, ProcessState};

pub mod scheduler;
pub use scheduler::Scheduler;

pub mod protection;
pub use protection::{FaultLog, ProtectedMemory};
