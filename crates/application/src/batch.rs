use std::num::NonZeroUsize;
use std::ops::Range;

/// Contiguous, non-overlapping index windows covering `0..count`.
///
/// Every window holds at most `batch_size` indices and windows are yielded in
/// ascending order. A zero count yields nothing.
#[derive(Debug, Clone)]
pub struct Batches {
    next_start: usize,
    count: usize,
    batch_size: NonZeroUsize,
}

impl Batches {
    /// Creates the window sequence for `count` items.
    #[must_use]
    pub fn new(count: usize, batch_size: NonZeroUsize) -> Self {
        Self {
            next_start: 0,
            count,
            batch_size,
        }
    }
}

impl Iterator for Batches {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_start >= self.count {
            return None;
        }

        let start = self.next_start;
        let end = start.saturating_add(self.batch_size.get()).min(self.count);
        self.next_start = end;
        Some(start..end)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .count
            .saturating_sub(self.next_start)
            .div_ceil(self.batch_size.get());
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Batches {}
