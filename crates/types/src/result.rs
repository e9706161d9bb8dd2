use core::fmt;

use crate::{Addr, Pid};

/// Reasons an allocation request is refused. None of them change manager state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// Requested size was zero.
    InvalidSize,
    /// The pid already owns a live partition.
    AlreadyAllocated { pid: Pid },
    /// Every allocation-table row is in use.
    NoFreeRow { pid: Pid },
    /// No hole is large enough for the request.
    NoHole { pid: Pid, size: usize },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::InvalidSize => write!(f, "allocation size must be positive"),
            AllocError::AlreadyAllocated { pid } => {
                write!(f, "allocation failed for PID {pid} (already holds a partition)")
            }
            AllocError::NoFreeRow { pid } => {
                write!(f, "allocation failed for PID {pid} (no free table row)")
            }
            AllocError::NoHole { pid, size } => {
                write!(f, "allocation failed for PID {pid} (no hole large enough for {size})")
            }
        }
    }
}

impl std::error::Error for AllocError {}

/// Process-table exhaustion and pid misuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustionError {
    /// No unused pid below the table capacity.
    TableFull,
    /// Explicit pid is outside `[0, capacity)`.
    InvalidPid { pid: Pid },
    /// Explicit pid is already in the table.
    PidInUse { pid: Pid },
}

impl fmt::Display for ExhaustionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExhaustionError::TableFull => write!(f, "process table full"),
            ExhaustionError::InvalidPid { pid } => write!(f, "invalid pid {pid}"),
            ExhaustionError::PidInUse { pid } => write!(f, "pid {pid} already occupied"),
        }
    }
}

impl std::error::Error for ExhaustionError {}

/// Every recoverable condition the simulated machine can report.
///
/// Faults are logged and handled in place; none of them stop the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    OutOfBounds { addr: Addr },
    ProtectionViolation { pid: Pid, addr: Addr },
    InvalidOpcode { opcode: i32, pc: Addr },
    AllocationFailure(AllocError),
    Exhaustion(ExhaustionError),
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::OutOfBounds { addr } => write!(f, "address {addr} out of bounds"),
            Fault::ProtectionViolation { pid, addr } => {
                write!(f, "PID {pid} illegal memory access at address {addr}")
            }
            Fault::InvalidOpcode { opcode, pc } => write!(f, "invalid opcode {opcode} at pc {pc}"),
            Fault::AllocationFailure(e) => e.fmt(f),
            Fault::Exhaustion(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Fault {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Fault::AllocationFailure(e) => Some(e),
            Fault::Exhaustion(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AllocError> for Fault {
    fn from(e: AllocError) -> Self {
        Fault::AllocationFailure(e)
    }
}

impl From<ExhaustionError> for Fault {
    fn from(e: ExhaustionError) -> Self {
        Fault::Exhaustion(e)
    }
}
