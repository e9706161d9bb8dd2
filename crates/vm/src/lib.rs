pub mod cpu;
pub mod instruction;
pub mod memory;
pub mod registers;

pub use cpu::Cpu;
pub use instruction::Opcode;
pub use memory::{Bus, MemoryStore};
pub use registers::RegisterSet;
