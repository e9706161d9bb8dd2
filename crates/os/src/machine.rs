use kernel::{FaultLog, MemoryManager, ProtectedMemory, Scheduler};
use types::{Addr, ExhaustionError, Fault, Pid, Word};
use vm::{Cpu, MemoryStore};

use crate::config::MachineConfig;
use crate::loader::LoadError;
use crate::report::{Probe, RunReport};

/// The whole simulated machine: one CPU, one memory store, and the kernel
/// structures that share it.
#[derive(Debug)]
pub struct Machine {
    pub cpu: Cpu,
    pub store: MemoryStore,
    pub mmu: MemoryManager,
    pub scheduler: Scheduler,
    pub faults: FaultLog,
    /// Completed clock cycles.
    pub cycles: u64,
    pub exited: Vec<Pid>,
    probes: Vec<Addr>,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(&MachineConfig::default())
    }
}

impl Machine {
    pub fn new(config: &MachineConfig) -> Self {
        Self {
            cpu: Cpu::new(),
            store: MemoryStore::new(config.memory_size),
            mmu: MemoryManager::with_rows(config.memory_size, config.allocation_rows),
            scheduler: Scheduler::new(config.quantum, config.max_processes),
            faults: FaultLog::default(),
            cycles: 0,
            exited: Vec::new(),
            probes: config.probes.clone(),
        }
    }

    /// Place `image` in a fresh partition of `size` words and queue it.
    ///
    /// The image is copied with kernel privilege, bypassing protection. On
    /// any failure the partition is released again.
    pub fn spawn(&mut self, image: &[Word], size: usize) -> Result<Pid, LoadError> {
        if image.len() > size {
            return Err(LoadError::TooLarge {
                words: image.len(),
                size,
            });
        }
        let pid = self
            .scheduler
            .free_pid()
            .ok_or(Fault::Exhaustion(ExhaustionError::TableFull))?;
        let base = self.mmu.try_allocate(pid, size).map_err(Fault::from)?;
        log::info!("allocated {size} words at base {base} (PID {pid})");

        let Ok(base) = Addr::try_from(base) else {
            self.mmu.deallocate(pid);
            return Err(Fault::OutOfBounds { addr: Addr::MAX }.into());
        };
        if !self.store.load(base, image) {
            self.mmu.deallocate(pid);
            return Err(Fault::OutOfBounds { addr: base }.into());
        }
        if let Err(e) = self
            .scheduler
            .create_process_with_pid(&mut self.cpu, pid, base, size)
        {
            self.mmu.deallocate(pid);
            return Err(Fault::from(e).into());
        }
        Ok(pid)
    }

    /// Run one clock cycle. Returns false once nothing is left to run.
    pub fn step(&mut self) -> bool {
        if self.scheduler.is_empty() {
            return false;
        }

        let mut bus = ProtectedMemory::new(
            &mut self.store,
            &mut self.mmu,
            &mut self.scheduler,
            &mut self.faults,
        );
        let continued = self.cpu.clock_cycle(&mut bus);
        self.cycles += 1;

        // evicted this cycle means already torn down, not exited
        let halted = if continued {
            None
        } else {
            self.scheduler
                .current_pid()
                .filter(|&pid| self.scheduler.contains(pid))
        };

        let runnable = self.scheduler.schedule(&mut self.cpu, self.cycles, continued);

        if let Some(pid) = halted {
            if self.mmu.base_of(pid).is_some() {
                self.mmu.deallocate(pid);
            }
            self.exited.push(pid);
        }
        runnable
    }

    /// Step until idle or until `max_cycles` cycles have run in total.
    pub fn run(&mut self, max_cycles: u64) -> RunReport {
        let mut stopped_by_limit = false;
        loop {
            if self.cycles >= max_cycles {
                stopped_by_limit = !self.scheduler.is_empty();
                break;
            }
            if !self.step() {
                break;
            }
        }
        if stopped_by_limit {
            log::warn!("cycle limit {max_cycles} reached with processes still queued");
        } else {
            log::info!("all processes finished after {} cycles", self.cycles);
        }
        self.report(stopped_by_limit)
    }

    pub fn probe(&self, addr: Addr) -> Probe {
        Probe {
            addr,
            word: self.store.read(addr),
        }
    }

    pub fn report(&self, stopped_by_limit: bool) -> RunReport {
        RunReport {
            cycles: self.cycles,
            stopped_by_limit,
            new_hole_count: self.mmu.new_hole_count(),
            exited: self.exited.clone(),
            faults: self.faults.clone(),
            registers: *self.cpu.registers(),
            holes: self.mmu.holes().to_vec(),
            probes: self.probes.iter().map(|&a| self.probe(a)).collect(),
        }
    }
}
