//! Per-list level counters, scoped to one extraction.

use std::collections::HashMap;

/// Number of list levels a WordprocessingML list can have.
pub const MAX_LEVELS: usize = 9;

/// Counter arena: one `[u32; 9]` per concrete list, looked up by list id.
#[derive(Debug, Default)]
pub struct ListCounters {
    index: HashMap<u32, usize>,
    arena: Vec<[u32; MAX_LEVELS]>,
}

impl ListCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one paragraph at `level` of `list`: bump that level and reset
    /// every deeper one. Returns the counters after the step.
    ///
    /// `level` must be below [`MAX_LEVELS`].
    pub fn advance(&mut self, list: u32, level: usize) -> [u32; MAX_LEVELS] {
        let slot = match self.index.get(&list) {
            Some(&slot) => slot,
            None => {
                self.arena.push([0; MAX_LEVELS]);
                let slot = self.arena.len() - 1;
                self.index.insert(list, slot);
                slot
            }
        };

        let counters = &mut self.arena[slot];
        counters[level] = counters[level].saturating_add(1);
        for deeper in counters.iter_mut().skip(level + 1) {
            *deeper = 0;
        }
        *counters
    }

    /// Number of lists seen so far.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}
