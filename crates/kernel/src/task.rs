use serde::Serialize;
use types::{Addr, Pid};
use vm::RegisterSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProcessState {
    /// Queued, not bound to the CPU.
    Ready,
    /// Queue head, registers live in the CPU.
    Running,
    /// Removed from the table and queue; only seen on PCBs handed back to callers.
    Terminated,
}

/// Kernel-owned per-process state.
#[derive(Debug, Clone, Serialize)]
pub struct Pcb {
    pub pid: Pid,
    /// Partition base the process was created with.
    pub base: Addr,
    /// Partition size in words.
    pub size: usize,
    /// Register snapshot restored on the next dispatch. Stale while Running.
    pub saved: RegisterSet,
    pub state: ProcessState,
    /// Cycles charged to this process.
    pub cycles_run: u64,
    /// Times the process has been bound to the CPU.
    pub dispatches: u64,
}

impl Pcb {
    pub fn new(pid: Pid, base: Addr, size: usize) -> Self {
        Self {
            pid,
            base,
            size,
            saved: RegisterSet::at_base(base),
            state: ProcessState::Ready,
            cycles_run: 0,
            dispatches: 0,
        }
    }
}
