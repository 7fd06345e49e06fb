/// Tracks how many items were produced and consumed against a fixed target.
///
/// The counter lives behind the same lock as the buffer's queue so that every decision
/// to store, take or stop is made on a consistent view of both. It maintains
/// `consumed <= produced <= target` at all times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminationCounter {
    produced: usize,
    consumed: usize,
    target: usize,
}

impl TerminationCounter {
    /// Returns a counter that completes once `target` items went through.
    #[inline]
    pub const fn new(target: usize) -> Self {
        Self {
            produced: 0,
            consumed: 0,
            target,
        }
    }

    /// Number of items produced so far.
    #[inline]
    pub const fn produced(&self) -> usize {
        self.produced
    }

    /// Number of items consumed so far.
    #[inline]
    pub const fn consumed(&self) -> usize {
        self.consumed
    }

    /// The total number of items the run must go through.
    #[inline]
    pub const fn target(&self) -> usize {
        self.target
    }

    /// Returns `true` once no more items may be produced.
    #[inline]
    pub const fn production_complete(&self) -> bool {
        self.produced >= self.target
    }

    /// Returns `true` once every item that will ever be produced has been consumed.
    #[inline]
    pub const fn consumption_complete(&self) -> bool {
        self.consumed >= self.target
    }

    /// Returns `true` once the whole run is over.
    #[inline]
    pub const fn is_complete(&self) -> bool {
        self.production_complete() && self.consumption_complete()
    }

    /// Counts a produced item and returns the new total.
    ///
    /// Returns `None`, leaving the counter untouched, if the target was already reached.
    #[inline]
    pub fn record_produced(&mut self) -> Option<usize> {
        if self.production_complete() {
            return None;
        }

        self.produced += 1;
        Some(self.produced)
    }

    /// Counts a consumed item and returns the new total.
    ///
    /// Returns `None`, leaving the counter untouched, if that would make more items
    /// consumed than produced.
    #[inline]
    pub fn record_consumed(&mut self) -> Option<usize> {
        if self.consumed >= self.produced {
            return None;
        }

        self.consumed += 1;
        Some(self.consumed)
    }
}

/* ---------- */
