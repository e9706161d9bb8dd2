/// Compiled-in machine limits. Runtime overrides live in the `os` crate.
pub struct Config;

impl Config {
    /// Words of physical memory.
    pub const MEMORY_SIZE: usize = 1024;
    /// Cycles a process may hold the CPU before rotation.
    pub const TIME_QUANTUM: u64 = 10;
    /// Process-table slots; pids range over `[0, MAX_PROCESSES)`.
    pub const MAX_PROCESSES: usize = 1024;
    /// Rows in the memory manager's allocation table.
    pub const ALLOCATION_ROWS: usize = 256;
}
