/// Hands out record ids for a `World`.
///
/// One counter covers political memories, conflicts, metrics, narratives and
/// suggestions, so an id never names two records even across tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn starting_from(start: u64) -> Self {
        Self { next: start.max(1) }
    }

    /// The id the next call to `next_id` will return.
    pub fn peek(&self) -> u64 {
        self.next
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Make sure `id` is never handed out again. Lower ids are a no-op.
    pub fn advance_past(&mut self, id: u64) {
        self.next = self.next.max(id.saturating_add(1));
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
