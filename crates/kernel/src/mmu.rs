use serde::Serialize;
use types::{Addr, AllocError, Pid};

use crate::Config;

/// A free, contiguous run of words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hole {
    pub base: usize,
    pub size: usize,
}

impl Hole {
    pub const fn new(base: usize, size: usize) -> Self {
        Self { base, size }
    }

    /// One past the last word of the hole.
    pub const fn end(&self) -> usize {
        self.base + self.size
    }
}

/// One live partition: words `[base, base + size)` belong to `pid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub pid: Pid,
    pub base: usize,
    pub size: usize,
}

impl Allocation {
    pub fn contains(&self, addr: usize) -> bool {
        addr >= self.base && addr < self.base + self.size
    }
}

/// Dynamic-partition memory manager with first-fit placement.
///
/// Standing invariants, checked by [`MemoryManager::is_consistent`]:
/// - `holes` is sorted by base; no two holes overlap or touch.
/// - Free words plus allocated words equal `total_size`.
/// - A pid owns at most one row of the allocation table.
#[derive(Debug, Clone)]
pub struct MemoryManager {
    total_size: usize,
    holes: Vec<Hole>,
    rows: Vec<Option<Allocation>>,
    new_hole_count: u64,
}

impl MemoryManager {
    /// One hole covering `[0, total_size)` and the default table size.
    pub fn new(total_size: usize) -> Self {
        Self::with_rows(total_size, Config::ALLOCATION_ROWS)
    }

    pub fn with_rows(total_size: usize, rows: usize) -> Self {
        let holes = if total_size > 0 {
            vec![Hole::new(0, total_size)]
        } else {
            Vec::new()
        };
        Self {
            total_size,
            holes,
            rows: vec![None; rows],
            new_hole_count: 0,
        }
    }

    pub fn total_size(&self) -> usize {
        self.total_size
    }

    pub fn holes(&self) -> &[Hole] {
        &self.holes
    }

    pub fn allocations(&self) -> impl Iterator<Item = &Allocation> {
        self.rows.iter().flatten()
    }

    pub fn free_words(&self) -> usize {
        self.holes.iter().map(|h| h.size).sum()
    }

    pub fn allocated_words(&self) -> usize {
        self.allocations().map(|a| a.size).sum()
    }

    /// Number of holes ever inserted, including ones merged away immediately.
    pub fn new_hole_count(&self) -> u64 {
        self.new_hole_count
    }

    /// Index of the first unused allocation-table row.
    pub fn find_empty_row(&self) -> Option<usize> {
        self.rows.iter().position(Option::is_none)
    }

    /// First-fit: carve `size` words off the low end of the first hole that
    /// is large enough and return the carved base. An exact fit removes the
    /// hole entirely.
    pub fn find_hole(&mut self, size: usize) -> Option<usize> {
        let idx = self.holes.iter().position(|h| h.size >= size)?;
        let hole = &mut self.holes[idx];
        let base = hole.base;
        if hole.size == size {
            self.holes.remove(idx);
        } else {
            hole.base += size;
            hole.size -= size;
        }
        Some(base)
    }

    /// Allocate a partition for `pid` and return its base.
    ///
    /// The table row is reserved before any hole is touched, so every
    /// failure leaves the manager exactly as it was.
    pub fn try_allocate(&mut self, pid: Pid, size: usize) -> Result<usize, AllocError> {
        if size == 0 {
            return Err(AllocError::InvalidSize);
        }
        if self.allocation_of(pid).is_some() {
            return Err(AllocError::AlreadyAllocated { pid });
        }
        let row = self.find_empty_row().ok_or(AllocError::NoFreeRow { pid })?;
        let base = self.find_hole(size).ok_or(AllocError::NoHole { pid, size })?;
        self.rows[row] = Some(Allocation { pid, base, size });
        debug_assert!(self.is_consistent());
        Ok(base)
    }

    /// `try_allocate` reduced to success/failure; failures are logged.
    pub fn allocate(&mut self, pid: Pid, size: usize) -> bool {
        match self.try_allocate(pid, size) {
            Ok(base) => {
                log::debug!("SMM: allocated {size} words at base {base} for PID {pid}");
                true
            }
            Err(e) => {
                log::error!("SMM: {e}");
                false
            }
        }
    }

    /// Release the partition owned by `pid` and coalesce the freed region
    /// with its neighbours. Returns false if `pid` owned nothing.
    pub fn deallocate(&mut self, pid: Pid) -> bool {
        let Some(slot) = self
            .rows
            .iter_mut()
            .find(|row| row.is_some_and(|a| a.pid == pid))
        else {
            log::warn!("SMM: deallocate called for unknown PID {pid}");
            return false;
        };
        let Some(freed) = slot.take() else {
            return false;
        };
        self.add_hole(freed.base, freed.size);
        log::debug!(
            "SMM: released {} words at base {} from PID {}",
            freed.size,
            freed.base,
            pid
        );
        debug_assert!(self.is_consistent());
        true
    }

    /// Insert a hole in base order and merge. Counts every insertion.
    fn add_hole(&mut self, base: usize, size: usize) {
        if size == 0 {
            return;
        }
        let idx = self.holes.partition_point(|h| h.base < base);
        self.holes.insert(idx, Hole::new(base, size));
        self.new_hole_count += 1;
        self.merge_holes();
    }

    /// Merge touching neighbours until no two holes are adjacent.
    fn merge_holes(&mut self) {
        let mut i = 0;
        while i + 1 < self.holes.len() {
            if self.holes[i].end() == self.holes[i + 1].base {
                let next = self.holes.remove(i + 1);
                self.holes[i].size += next.size;
                log::trace!("SMM: merged hole at {} into hole at {}", next.base, self.holes[i].base);
            } else {
                i += 1;
            }
        }
    }

    pub fn allocation_of(&self, pid: Pid) -> Option<&Allocation> {
        self.allocations().find(|a| a.pid == pid)
    }

    pub fn base_of(&self, pid: Pid) -> Option<Addr> {
        self.allocation_of(pid)
            .and_then(|a| Addr::try_from(a.base).ok())
    }

    /// True iff `addr` lies inside the partition owned by `pid`.
    pub fn is_allowed(&self, pid: Pid, addr: Addr) -> bool {
        let Ok(addr) = usize::try_from(addr) else {
            return false;
        };
        self.allocation_of(pid).is_some_and(|a| a.contains(addr))
    }

    /// Verify conservation, ordering, and non-overlap of holes and partitions.
    pub fn is_consistent(&self) -> bool {
        if self.free_words() + self.allocated_words() != self.total_size {
            return false;
        }
        let holes_ok = self
            .holes
            .windows(2)
            .all(|w| w[0].end() < w[1].base)
            && self.holes.iter().all(|h| h.size > 0 && h.end() <= self.total_size);
        if !holes_ok {
            return false;
        }

        let mut regions: Vec<(usize, usize)> = self
            .holes
            .iter()
            .map(|h| (h.base, h.end()))
            .chain(self.allocations().map(|a| (a.base, a.base + a.size)))
            .collect();
        regions.sort_unstable();
        let disjoint = regions.windows(2).all(|w| w[0].1 <= w[1].0);

        let mut pids: Vec<Pid> = self.allocations().map(|a| a.pid).collect();
        let owners = pids.len();
        pids.sort_unstable();
        pids.dedup();

        disjoint && pids.len() == owners
    }
}
