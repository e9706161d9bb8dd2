use serde::Serialize;
use types::{Addr, Fault, Pid, Word};
use vm::{Bus, MemoryStore};

use crate::mmu::MemoryManager;
use crate::scheduler::Scheduler;

/// Running tally of faults raised through a [`ProtectedMemory`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct FaultLog {
    pub out_of_bounds: u64,
    pub protection_violations: u64,
    pub invalid_opcodes: u64,
    /// Processes torn down for touching memory outside their partition, in order.
    pub evicted: Vec<Pid>,
}

impl FaultLog {
    pub fn record(&mut self, fault: &Fault) {
        match fault {
            Fault::OutOfBounds { .. } => self.out_of_bounds += 1,
            Fault::ProtectionViolation { .. } => self.protection_violations += 1,
            Fault::InvalidOpcode { .. } => self.invalid_opcodes += 1,
            Fault::AllocationFailure(_) | Fault::Exhaustion(_) => {}
        }
    }
}

/// The memory store as seen by a running process.
///
/// Every access is checked against the partition of the scheduler's current
/// pid. A denied access frees that partition and unlinks the process from the
/// ready queue before returning; the access itself reads as `None` or is
/// dropped. With no current pid the store is accessed unchecked.
pub struct ProtectedMemory<'a> {
    store: &'a mut MemoryStore,
    mmu: &'a mut MemoryManager,
    scheduler: &'a mut Scheduler,
    faults: &'a mut FaultLog,
}

impl<'a> ProtectedMemory<'a> {
    pub fn new(
        store: &'a mut MemoryStore,
        mmu: &'a mut MemoryManager,
        scheduler: &'a mut Scheduler,
        faults: &'a mut FaultLog,
    ) -> Self {
        Self {
            store,
            mmu,
            scheduler,
            faults,
        }
    }

    /// Bounds and permission check for one access. `op` names the access in logs.
    fn permit(&mut self, addr: Addr, op: &str) -> bool {
        if !self.store.contains(addr) {
            let fault = Fault::OutOfBounds { addr };
            log::warn!("{op} ERROR: {fault} (0..{})", self.store.len());
            self.faults.record(&fault);
            return false;
        }
        let Some(pid) = self.scheduler.current_pid() else {
            return true;
        };
        if self.mmu.is_allowed(pid, addr) {
            return true;
        }

        let fault = Fault::ProtectionViolation { pid, addr };
        self.faults.record(&fault);
        if self.scheduler.contains(pid) {
            log::warn!("{op} ERROR: {fault} - terminating process");
            self.evict(pid);
        } else {
            log::warn!("{op} ERROR: {fault} (process already terminated)");
        }
        false
    }

    fn evict(&mut self, pid: Pid) {
        if self.mmu.allocation_of(pid).is_some() {
            self.mmu.deallocate(pid);
        }
        self.scheduler.remove_from_ready(pid);
        self.faults.evicted.push(pid);
    }
}

impl Bus for ProtectedMemory<'_> {
    fn read(&mut self, addr: Addr) -> Option<Word> {
        if !self.permit(addr, "mem_read") {
            return None;
        }
        self.store.read(addr)
    }

    fn write(&mut self, addr: Addr, word: Word) {
        if self.permit(addr, "mem_write") {
            self.store.write(addr, word);
        }
    }

    fn on_fault(&mut self, fault: Fault) {
        log::warn!("{fault}");
        self.faults.record(&fault);
    }
}
