use std::fmt::Write as _;

use types::address::to_index;
use types::{Addr, Fault, Word};

/// Flat, word-addressed physical memory.
///
/// The store only knows its own bounds. Anything outside `[0, len)` reads as
/// `None` and writes are dropped; permission checks belong to whoever wraps it.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    words: Vec<Word>,
}

impl MemoryStore {
    pub fn new(size: usize) -> Self {
        Self {
            words: vec![Word::default(); size],
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, addr: Addr) -> bool {
        to_index(addr, self.words.len()).is_some()
    }

    pub fn read(&self, addr: Addr) -> Option<Word> {
        to_index(addr, self.words.len()).map(|idx| self.words[idx])
    }

    /// Store `word` at `addr`. Out-of-range addresses are ignored.
    pub fn write(&mut self, addr: Addr, word: Word) {
        if let Some(idx) = to_index(addr, self.words.len()) {
            self.words[idx] = word;
        }
    }

    /// Copy a whole image starting at `base`. Returns false, writing nothing,
    /// if any part of the image would fall outside the store.
    pub fn load(&mut self, base: Addr, image: &[Word]) -> bool {
        if image.is_empty() {
            return true;
        }
        let Some(start) = to_index(base, self.words.len()) else {
            return false;
        };
        let end = start + image.len();
        if end > self.words.len() {
            return false;
        }
        self.words[start..end].copy_from_slice(image);
        true
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Human-readable listing of `[start, end)`, one cell per line.
    pub fn dump(&self, start: usize, end: usize) -> String {
        let end = end.min(self.words.len());
        let mut out = String::new();
        for (offset, word) in self.words[start.min(end)..end].iter().enumerate() {
            let _ = writeln!(out, "[{:>4}] {}", start + offset, word);
        }
        out
    }
}

/// The CPU's view of memory.
///
/// Implementations may refuse an access (returning `None` or dropping the
/// write) and report why through [`Bus::on_fault`].
pub trait Bus {
    fn read(&mut self, addr: Addr) -> Option<Word>;

    fn write(&mut self, addr: Addr, word: Word);

    /// Called for every recoverable fault raised while a cycle runs.
    fn on_fault(&mut self, fault: Fault) {
        log::warn!("{fault}");
    }
}

/// Unprotected access, used for kernel-privileged work and bare-CPU tests.
impl Bus for MemoryStore {
    fn read(&mut self, addr: Addr) -> Option<Word> {
        let word = MemoryStore::read(self, addr);
        if word.is_none() {
            self.on_fault(Fault::OutOfBounds { addr });
        }
        word
    }

    fn write(&mut self, addr: Addr, word: Word) {
        if !self.contains(addr) {
            self.on_fault(Fault::OutOfBounds { addr });
            return;
        }
        MemoryStore::write(self, addr, word);
    }
}
