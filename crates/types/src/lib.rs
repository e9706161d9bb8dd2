pub mod address;
pub use address::{Addr, Pid};

pub mod primitives;
pub use primitives::Word;

pub mod result;
pub use result::{AllocError, ExhaustionError, Fault};
