//! Block slot iterator
//!
//! Sequential iteration over the block slots of one page.

use crate::header::PAGE_HEADER_SIZE;
use crate::size_class::SizeClass;

/// Iterator over the slot (block header) offsets of a page
///
/// Only slots whose header and payload both end inside the page are
/// yielded, so the walk never crosses into the next page's header.
#[derive(Debug, Clone)]
pub struct BlockSlots {
    /// Offset of the next slot to yield
    next_offset: usize,
    /// Distance between slots
    stride: usize,
    /// Slots left to yield
    remaining: usize,
}

impl BlockSlots {
    /// Slots of the page starting at `page_start`, laid out for `class`
    pub fn new(page_start: usize, class: SizeClass) -> Self {
        Self {
            next_offset: page_start + PAGE_HEADER_SIZE,
            stride: class.stride(),
            remaining: class.slots_per_page(),
        }
    }
}

impl Iterator for BlockSlots {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let slot = self.next_offset;
        self.next_offset += self.stride;
        self.remaining -= 1;
        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for BlockSlots {}
