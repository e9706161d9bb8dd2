use std::mem;

use types::{Addr, Fault, Word};

use crate::instruction::Opcode;
use crate::memory::Bus;
use crate::registers::RegisterSet;

/// The fetch/execute engine.
///
/// The CPU owns exactly one live [`RegisterSet`]. It never touches memory
/// directly: every access goes through the [`Bus`] passed into each call, so
/// the caller decides which process the access is checked against.
#[derive(Debug, Default)]
pub struct Cpu {
    /// Live register set. Swapped as a unit by [`Cpu::context_switch`].
    pub regs: RegisterSet,
}

impl Cpu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registers(&self) -> &RegisterSet {
        &self.regs
    }

    /// Flat base+offset translation. No paging, no limit check here.
    pub fn translate_address(&self, logical: Addr) -> Addr {
        self.regs.base.wrapping_add(logical)
    }

    /// Load the word at `addr` into IR0/IR1. An unreadable address decodes
    /// as `exit` so the caller sees a halt instead of an error.
    pub fn fetch(&mut self, addr: Addr, bus: &mut dyn Bus) {
        let word = bus.read(addr).unwrap_or(Word::HALT);
        self.regs.ir0 = word.opcode;
        self.regs.ir1 = word.argument;
    }

    /// Execute the instruction currently held in IR0/IR1.
    ///
    /// The PC advances by one after every opcode except `exit`. `ifgo`
    /// pre-decrements so the generic increment lands exactly on its target.
    pub fn execute(&mut self, bus: &mut dyn Bus) {
        let Some(op) = Opcode::decode(self.regs.ir0) else {
            bus.on_fault(Fault::InvalidOpcode {
                opcode: self.regs.ir0,
                pc: self.regs.pc,
            });
            self.regs.pc = self.regs.pc.wrapping_add(1);
            return;
        };

        let r = &mut self.regs;
        match op {
            Opcode::Exit => return,
            Opcode::LoadConst => r.ac = r.ir1,
            Opcode::MoveFromMbr => r.ac = r.mbr,
            Opcode::MoveFromMar => r.ac = r.mar,
            Opcode::MoveToMbr => r.mbr = r.ac,
            Opcode::MoveToMar => r.mar = r.ac,
            Opcode::LoadAtAddr => {
                let phys = r.base.wrapping_add(r.mar);
                r.mbr = bus.read(phys).map_or(0, |w| w.opcode);
            }
            Opcode::WriteAtAddr => {
                let phys = r.base.wrapping_add(r.mar);
                bus.write(phys, Word::data(r.mbr));
            }
            Opcode::Add => r.ac = r.ac.wrapping_add(r.mbr),
            Opcode::Multiply => r.ac = r.ac.wrapping_mul(r.mbr),
            Opcode::And => r.ac = (r.ac != 0 && r.mbr != 0) as i32,
            Opcode::Or => r.ac = (r.ac != 0 || r.mbr != 0) as i32,
            Opcode::IfGo => {
                if r.ac != 0 {
                    r.pc = r.ir1.wrapping_sub(1);
                }
            }
            Opcode::Sleep => {}
        }
        r.pc = r.pc.wrapping_add(1);
    }

    /// One full cycle. Returns `false` when the fetched instruction is `exit`;
    /// in that case nothing but IR0/IR1 has changed.
    pub fn clock_cycle(&mut self, bus: &mut dyn Bus) -> bool {
        let addr = self.translate_address(self.regs.pc);
        self.fetch(addr, bus);
        if self.regs.ir0 == Opcode::Exit as i32 {
            log::trace!("pc={} (phys {}) exit", self.regs.pc, addr);
            return false;
        }
        log::trace!(
            "pc={} (phys {}) op={} arg={}",
            self.regs.pc,
            addr,
            self.regs.ir0,
            self.regs.ir1
        );
        self.execute(bus);
        true
    }

    /// Install `next` as the live register set and hand back the previous one.
    pub fn context_switch(&mut self, next: RegisterSet) -> RegisterSet {
        mem::replace(&mut self.regs, next)
    }
}
