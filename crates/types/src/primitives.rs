use core::fmt;
use serde::{Deserialize, Serialize};

/// One memory cell: an (opcode, argument) pair.
///
/// Instructions and data share the same representation; data writes store
/// the value in `opcode` and leave `argument` at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub opcode: i32,
    pub argument: i32,
}

impl Word {
    pub const HALT: Word = Word { opcode: 0, argument: 0 };

    pub const fn new(opcode: i32, argument: i32) -> Self {
        Self { opcode, argument }
    }

    /// A data word as written by `write_at_addr`.
    pub const fn data(value: i32) -> Self {
        Self { opcode: value, argument: 0 }
    }
}

impl From<(i32, i32)> for Word {
    fn from((opcode, argument): (i32, i32)) -> Self {
        Self { opcode, argument }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OP={} ARG={}", self.opcode, self.argument)
    }
}
