use crate::Move;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TranspositionEntry {
    pub hash: u64,
    pub depth: u32,
    pub best_move: Move,
    pub age: u32,
}

/// Remembers the best move found for a position so later iterations search
/// it first. Scores are not stored, the table only feeds move ordering.
#[derive(Debug, Clone)]
pub struct TranspositionTable {
    table: Vec<Option<TranspositionEntry>>,
    age: u32,
}

impl TranspositionTable {
    pub fn new(size_mb: usize) -> Self {
        let entry_size = std::mem::size_of::<Option<TranspositionEntry>>();
        let num_entries = ((size_mb * 1024 * 1024) / entry_size).max(1);

        TranspositionTable {
            table: vec![None; num_entries],
            age: 0,
        }
    }

    /// Replaces the slot's entry if it is from an earlier search or was
    /// searched less deep.
    pub fn store(&mut self, hash: u64, depth: u32, best_move: Move) {
        let index = self.index(hash);
        let entry = TranspositionEntry {
            hash,
            depth,
            best_move,
            age: self.age,
        };

        match self.table[index] {
            Some(existing) if existing.age == self.age && existing.depth > depth => {}
            _ => self.table[index] = Some(entry),
        }
    }

    /// Entries stored before the last [TranspositionTable::new_search] are
    /// invisible.
    pub fn probe(&self, hash: u64) -> Option<&TranspositionEntry> {
        self.table[self.index(hash)]
            .as_ref()
            .filter(|entry| entry.hash == hash && entry.age == self.age)
    }

    pub fn best_move(&self, hash: u64) -> Option<Move> {
        self.probe(hash).map(|entry| entry.best_move)
    }

    pub fn new_search(&mut self) {
        self.age = self.age.wrapping_add(1);
    }

    fn index(&self, hash: u64) -> usize {
        (hash % self.table.len() as u64) as usize
    }
}
