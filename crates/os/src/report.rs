use core::fmt;

use kernel::{FaultLog, Hole};
use serde::Serialize;
use types::{Addr, Pid, Word};
use vm::RegisterSet;

/// Contents of one physical address after the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Probe {
    pub addr: Addr,
    /// `None` when the address is outside the store.
    pub word: Option<Word>,
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.word {
            Some(word) => write!(f, "mem[{}] = {}", self.addr, word),
            None => write!(f, "mem[{}] = (out of bounds)", self.addr),
        }
    }
}

/// Outcome of [`Machine::run`](crate::Machine::run).
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub cycles: u64,
    pub stopped_by_limit: bool,
    pub new_hole_count: u64,
    /// Pids that reached `exit`, in order.
    pub exited: Vec<Pid>,
    pub faults: FaultLog,
    /// Live CPU registers when the loop stopped.
    pub registers: RegisterSet,
    pub holes: Vec<Hole>,
    pub probes: Vec<Probe>,
}

impl RunReport {
    /// Pids torn down by memory protection, in order.
    pub fn evicted(&self) -> &[Pid] {
        &self.faults.evicted
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Run Report ===")?;
        write!(f, "Cycles: {}", self.cycles)?;
        if self.stopped_by_limit {
            write!(f, " (stopped by cycle limit)")?;
        }
        writeln!(f)?;
        writeln!(f, "Exited: {:?}", self.exited)?;
        writeln!(f, "Evicted: {:?}", self.faults.evicted)?;
        writeln!(
            f,
            "Faults: {} out of bounds, {} protection, {} invalid opcode",
            self.faults.out_of_bounds, self.faults.protection_violations, self.faults.invalid_opcodes
        )?;
        writeln!(f, "New holes created: {}", self.new_hole_count)?;
        writeln!(f, "Holes:")?;
        for hole in &self.holes {
            writeln!(f, "  [{}, {}) size {}", hole.base, hole.end(), hole.size)?;
        }
        writeln!(f, "Memory:")?;
        for probe in &self.probes {
            writeln!(f, "  {probe}")?;
        }
        writeln!(f, "Registers after execution:")?;
        writeln!(f, "  {}", self.registers)?;

        Ok(())
    }
}
