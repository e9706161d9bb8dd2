use core::fmt;
use serde::{Deserialize, Serialize};
use types::Addr;

/// The complete architectural state of the CPU.
///
/// Exactly one `RegisterSet` is live inside a [`crate::Cpu`]; every other
/// process keeps a saved copy in its PCB and swaps it in wholesale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterSet {
    /// Partition base used for logical → physical translation.
    pub base: Addr,
    /// Logical address of the next instruction.
    pub pc: Addr,
    /// Opcode register (IR0).
    pub ir0: i32,
    /// Argument register (IR1).
    pub ir1: i32,
    /// Accumulator.
    pub ac: i32,
    /// Memory address register.
    pub mar: i32,
    /// Memory buffer (data) register.
    pub mbr: i32,
}

impl RegisterSet {
    /// Fresh context for a process loaded at `base`: everything zero except the base.
    pub fn at_base(base: Addr) -> Self {
        Self {
            base,
            ..Self::default()
        }
    }
}

impl fmt::Display for RegisterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Base={} PC={} IR0={} IR1={} AC={} MAR={} MBR={}",
            self.base, self.pc, self.ir0, self.ir1, self.ac, self.mar, self.mbr
        )
    }
}
