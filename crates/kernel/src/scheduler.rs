use std::collections::{BTreeMap, VecDeque};

use types::{Addr, ExhaustionError, Pid};
use vm::Cpu;

use crate::Config;
use crate::task::{Pcb, ProcessState};

/// Round-robin scheduler over a FIFO ready queue.
///
/// The queue head is the running process whenever one is bound. The
/// quantum is measured against a single global cycle counter supplied by the
/// caller, not per-process remaining time.
#[derive(Debug)]
pub struct Scheduler {
    table: BTreeMap<Pid, Pcb>,
    ready: VecDeque<Pid>,
    /// Pid whose registers are live in the CPU. Stays set for the rest of a
    /// cycle in which that process was evicted.
    current: Option<Pid>,
    quantum: u64,
    capacity: usize,
    checkpoint: u64,
    /// Last cycle number passed to `schedule`.
    clock: u64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(Config::TIME_QUANTUM, Config::MAX_PROCESSES)
    }
}

impl Scheduler {
    pub fn new(quantum: u64, capacity: usize) -> Self {
        Self {
            table: BTreeMap::new(),
            ready: VecDeque::new(),
            current: None,
            quantum,
            capacity,
            checkpoint: 0,
            clock: 0,
        }
    }

    pub fn quantum(&self) -> u64 {
        self.quantum
    }

    pub fn current_pid(&self) -> Option<Pid> {
        self.current
    }

    /// Smallest pid not in the process table. Does not reserve it.
    pub fn free_pid(&self) -> Option<Pid> {
        let mut candidate = 0;
        for &pid in self.table.keys() {
            if pid != candidate {
                break;
            }
            candidate += 1;
        }
        (candidate < self.capacity).then_some(candidate)
    }

    pub fn is_empty(&self) -> bool {
        self.ready.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ready.len()
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.table.contains_key(&pid)
    }

    pub fn pcb(&self, pid: Pid) -> Option<&Pcb> {
        self.table.get(&pid)
    }

    /// Pids in queue order, head first.
    pub fn ready_pids(&self) -> impl Iterator<Item = Pid> + '_ {
        self.ready.iter().copied()
    }

    /// Create a process under the smallest free pid.
    pub fn create_process(&mut self, cpu: &mut Cpu, base: Addr, size: usize) -> Result<Pid, ExhaustionError> {
        let pid = self.free_pid().ok_or(ExhaustionError::TableFull)?;
        self.create_process_with_pid(cpu, pid, base, size)
    }

    /// Create a process under a caller-chosen pid and queue it at the tail.
    /// Binds it immediately if the CPU is idle.
    pub fn create_process_with_pid(
        &mut self,
        cpu: &mut Cpu,
        pid: Pid,
        base: Addr,
        size: usize,
    ) -> Result<Pid, ExhaustionError> {
        if pid >= self.capacity {
            return Err(ExhaustionError::InvalidPid { pid });
        }
        if self.table.contains_key(&pid) {
            return Err(ExhaustionError::PidInUse { pid });
        }

        self.table.insert(pid, Pcb::new(pid, base, size));
        self.ready.push_back(pid);
        log::info!("scheduler: created PID {pid} (base {base}, size {size})");

        if self.current.is_none() {
            self.dispatch(cpu);
            self.checkpoint = self.clock;
        }
        Ok(pid)
    }

    /// Called once per completed cycle with the CPU's halt/continue result.
    /// Returns false when no process is left to run.
    pub fn schedule(&mut self, cpu: &mut Cpu, cycle: u64, continued: bool) -> bool {
        self.clock = cycle;
        if let Some(pcb) = self.current.and_then(|pid| self.table.get_mut(&pid)) {
            pcb.cycles_run += 1;
        }

        if self.ready.is_empty() {
            self.current = None;
            return false;
        }

        if !continued {
            if let Some(pid) = self.current.filter(|pid| self.table.contains_key(pid)) {
                self.terminate(pid);
                log::info!("scheduler: PID {pid} exited at cycle {cycle}");
            }
            self.current = None;
            if self.ready.is_empty() {
                return false;
            }
            self.dispatch(cpu);
            self.checkpoint = cycle;
            return true;
        }

        // The running process was evicted during this cycle.
        if !self.current.is_some_and(|pid| self.table.contains_key(&pid)) {
            self.current = None;
            self.dispatch(cpu);
            self.checkpoint = cycle;
            return true;
        }

        if cycle.saturating_sub(self.checkpoint) >= self.quantum {
            self.next_process();
            self.dispatch(cpu);
            self.checkpoint = cycle;
        }
        true
    }

    /// Unlink `pid` from wherever it sits in the queue and free its slot.
    /// The CPU is not rebound here; the next `schedule` promotes the new head.
    pub fn remove_from_ready(&mut self, pid: Pid) -> Option<Pcb> {
        let removed = self.terminate(pid);
        if removed.is_some() {
            log::info!("scheduler: PID {pid} removed from ready queue");
        }
        removed
    }

    fn terminate(&mut self, pid: Pid) -> Option<Pcb> {
        let idx = self.ready.iter().position(|&p| p == pid)?;
        self.ready.remove(idx);
        let mut pcb = self.table.remove(&pid)?;
        pcb.state = ProcessState::Terminated;
        Some(pcb)
    }

    /// Rotate the head to the tail. No-op for fewer than two processes.
    fn next_process(&mut self) {
        if self.ready.len() < 2 {
            return;
        }
        if let Some(head) = self.ready.pop_front() {
            self.ready.push_back(head);
        }
    }

    /// Bind the queue head to the CPU, saving the outgoing registers into
    /// the previous process's PCB if it still exists.
    fn dispatch(&mut self, cpu: &mut Cpu) {
        let Some(&next) = self.ready.front() else {
            self.current = None;
            return;
        };
        if self.current == Some(next) {
            return;
        }
        let Some(incoming) = self.table.get_mut(&next) else {
            self.current = None;
            return;
        };
        incoming.state = ProcessState::Running;
        incoming.dispatches += 1;
        let outgoing = cpu.context_switch(incoming.saved);

        if let Some(prev) = self.current.and_then(|pid| self.table.get_mut(&pid)) {
            prev.saved = outgoing;
            prev.state = ProcessState::Ready;
        }
        log::debug!(
            "scheduler: context switch {:?} -> PID {} (pc {})",
            self.current,
            next,
            cpu.regs.pc
        );
        self.current = Some(next);
    }
}
