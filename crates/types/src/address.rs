/// Physical or logical index into the word-addressed memory store.
///
/// Signed on purpose: `base + MAR` may go negative and must be caught as an
/// out-of-bounds access rather than wrap into a valid index.
pub type Addr = i32;

/// Process identifier. Allocated smallest-unused-first by the scheduler.
pub type Pid = usize;

/// Convert a signed address into a store index if it lies inside `[0, len)`.
pub fn to_index(addr: Addr, len: usize) -> Option<usize> {
    usize::try_from(addr).ok().filter(|idx| *idx < len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_and_past_end_are_rejected() {
        assert_eq!(to_index(-1, 10), None);
        assert_eq!(to_index(10, 10), None);
        assert_eq!(to_index(0, 10), Some(0));
        assert_eq!(to_index(9, 10), Some(9));
    }
}
