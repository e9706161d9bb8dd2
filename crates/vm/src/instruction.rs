/// The fixed instruction set. Discriminants are the encoded opcode values
/// stored in [`types::Word::opcode`].
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// Stop the running process. The engine itself does nothing.
    Exit = 0,
    /// AC ← IR1
    LoadConst = 1,
    /// AC ← MBR
    MoveFromMbr = 2,
    /// AC ← MAR
    MoveFromMar = 3,
    /// MBR ← AC
    MoveToMbr = 4,
    /// MAR ← AC
    MoveToMar = 5,
    /// MBR ← memory[base + MAR]
    LoadAtAddr = 6,
    /// memory[base + MAR] ← MBR
    WriteAtAddr = 7,
    /// AC ← AC + MBR
    Add = 8,
    /// AC ← AC * MBR
    Multiply = 9,
    /// AC ← (AC != 0 && MBR != 0)
    And = 10,
    /// AC ← (AC != 0 || MBR != 0)
    Or = 11,
    /// if AC != 0, continue at logical address IR1
    IfGo = 12,
    /// No operation.
    Sleep = 13,
}

impl Opcode {
    pub const ALL: [Opcode; 14] = [
        Opcode::Exit,
        Opcode::LoadConst,
        Opcode::MoveFromMbr,
        Opcode::MoveFromMar,
        Opcode::MoveToMbr,
        Opcode::MoveToMar,
        Opcode::LoadAtAddr,
        Opcode::WriteAtAddr,
        Opcode::Add,
        Opcode::Multiply,
        Opcode::And,
        Opcode::Or,
        Opcode::IfGo,
        Opcode::Sleep,
    ];

    pub fn decode(raw: i32) -> Option<Opcode> {
        Self::ALL.iter().copied().find(|op| *op as i32 == raw)
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Exit => "exit",
            Opcode::LoadConst => "load_const",
            Opcode::MoveFromMbr => "move_from_mbr",
            Opcode::MoveFromMar => "move_from_mar",
            Opcode::MoveToMbr => "move_to_mbr",
            Opcode::MoveToMar => "move_to_mar",
            Opcode::LoadAtAddr => "load_at_addr",
            Opcode::WriteAtAddr => "write_at_addr",
            Opcode::Add => "add",
            Opcode::Multiply => "multiply",
            Opcode::And => "and",
            Opcode::Or => "or",
            Opcode::IfGo => "ifgo",
            Opcode::Sleep => "sleep",
        }
    }

    /// Case-insensitive lookup used by the program loader.
    pub fn from_mnemonic(name: &str) -> Option<Opcode> {
        Self::ALL.iter()
            .copied()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(name))
    }

    /// Whether the textual form carries an integer operand.
    pub fn takes_argument(self) -> bool {
        matches!(self, Opcode::LoadConst | Opcode::IfGo)
    }
}

impl TryFrom<i32> for Opcode {
    type Error = i32;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        Opcode::decode(raw).ok_or(raw)
    }
}
