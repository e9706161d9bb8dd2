use kernel::{Hole, MemoryManager};
use types::AllocError;

fn fragmented() -> MemoryManager {
    // holes at [0,10) [20,25) [30,130) once pids 0, 2 and 4 are released
    let mut mmu = MemoryManager::new(130);
    for (pid, size) in [(0, 10), (1, 10), (2, 5), (3, 5), (4, 100)] {
        assert!(mmu.allocate(pid, size));
    }
    for pid in [0, 2, 4] {
        assert!(mmu.deallocate(pid));
    }
    assert_eq!(
        mmu.holes(),
        &[Hole::new(0, 10), Hole::new(20, 5), Hole::new(30, 100)]
    );
    mmu
}

#[test]
fn test_first_fit_is_deterministic() {
    let mut mmu = fragmented();

    assert_eq!(mmu.try_allocate(10, 5), Ok(0));
    assert_eq!(mmu.holes()[0], Hole::new(5, 5));

    // exact fit swallows the shrunken first hole
    assert_eq!(mmu.try_allocate(11, 5), Ok(5));
    assert_eq!(mmu.holes()[0], Hole::new(20, 5));

    assert_eq!(mmu.try_allocate(12, 5), Ok(20));
    assert_eq!(mmu.holes(), &[Hole::new(30, 100)]);
    assert!(mmu.is_consistent());
}

#[test]
fn test_words_are_conserved() {
    let mut mmu = MemoryManager::new(1024);
    let sizes = [100, 3, 250, 1, 64, 400];
    for (pid, size) in sizes.iter().enumerate() {
        assert!(mmu.allocate(pid, *size));
        assert_eq!(mmu.free_words() + mmu.allocated_words(), 1024);
    }
    for pid in [1, 4, 0, 5] {
        assert!(mmu.deallocate(pid));
        assert_eq!(mmu.free_words() + mmu.allocated_words(), 1024);
        assert!(mmu.is_consistent());
    }
}

#[test]
fn test_partitions_never_overlap() {
    let mut mmu = MemoryManager::new(512);
    for pid in 0..8 {
        assert!(mmu.allocate(pid, 16 + pid * 8));
    }
    mmu.deallocate(3);
    mmu.deallocate(5);
    assert!(mmu.allocate(20, 30));
    assert!(mmu.allocate(21, 12));

    let mut spans: Vec<(usize, usize)> = mmu
        .allocations()
        .map(|a| (a.base, a.base + a.size))
        .collect();
    spans.sort_unstable();
    for pair in spans.windows(2) {
        assert!(pair[0].1 <= pair[1].0, "overlap between {:?} and {:?}", pair[0], pair[1]);
    }
    assert!(mmu.is_consistent());
}

#[test]
fn test_allocate_then_free_restores_single_hole() {
    let mut mmu = MemoryManager::new(1024);
    assert!(mmu.allocate(7, 300));
    assert_eq!(mmu.base_of(7), Some(0));
    assert!(mmu.deallocate(7));
    assert_eq!(mmu.holes(), &[Hole::new(0, 1024)]);
    assert_eq!(mmu.base_of(7), None);
    assert_eq!(mmu.new_hole_count(), 1);
}

#[test]
fn test_row_exhaustion_leaves_holes_untouched() {
    let mut mmu = MemoryManager::with_rows(100, 2);
    assert!(mmu.allocate(0, 10));
    assert!(mmu.allocate(1, 10));
    let before = mmu.holes().to_vec();

    assert_eq!(mmu.try_allocate(2, 10), Err(AllocError::NoFreeRow { pid: 2 }));
    assert_eq!(mmu.holes(), before.as_slice());
    assert_eq!(mmu.free_words(), 80);
    assert!(mmu.is_consistent());
}

#[test]
fn test_rejected_requests() {
    let mut mmu = MemoryManager::new(64);
    assert_eq!(mmu.try_allocate(0, 0), Err(AllocError::InvalidSize));
    assert_eq!(mmu.try_allocate(0, 65), Err(AllocError::NoHole { pid: 0, size: 65 }));
    assert_eq!(mmu.try_allocate(0, 32), Ok(0));
    assert_eq!(mmu.try_allocate(0, 8), Err(AllocError::AlreadyAllocated { pid: 0 }));
    assert!(!mmu.deallocate(9));
    assert_eq!(mmu.holes(), &[Hole::new(32, 32)]);
}

#[test]
fn test_is_allowed_covers_exactly_the_partition() {
    let mut mmu = MemoryManager::new(200);
    assert!(mmu.allocate(5, 100));
    assert!(mmu.allocate(0, 10));
    assert_eq!(mmu.base_of(0), Some(100));

    assert!(!mmu.is_allowed(0, 99));
    assert!(mmu.is_allowed(0, 100));
    assert!(mmu.is_allowed(0, 109));
    assert!(!mmu.is_allowed(0, 110));
    assert!(!mmu.is_allowed(0, -1));
    assert!(!mmu.is_allowed(3, 0));
}
