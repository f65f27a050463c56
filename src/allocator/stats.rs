//! Usage statistics
//!
//! Computed on demand from the headers in the buffer; nothing is tracked
//! incrementally.

use std::collections::BTreeMap;

use crate::size_class::SizeClass;

/// Allocator statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocatorStats {
    /// Pages in the buffer
    pub total_pages: usize,
    /// Pages not yet committed to a class
    pub empty_pages: usize,
    /// Pages whose header names no known class
    pub unknown_pages: usize,
    /// Per-class usage of committed pages
    pub classes: BTreeMap<SizeClass, ClassUsage>,
}

/// Block usage of all pages committed to one class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassUsage {
    pub pages: usize,
    pub live_blocks: usize,
    pub free_blocks: usize,
}

impl AllocatorStats {
    /// Pages committed to some class
    pub fn committed_pages(&self) -> usize {
        self.classes.values().map(|usage| usage.pages).sum()
    }

    /// Blocks currently handed out, across all classes
    pub fn live_blocks(&self) -> usize {
        self.classes.values().map(|usage| usage.live_blocks).sum()
    }

    /// Payload bytes reserved by live blocks (full class width each)
    pub fn live_bytes(&self) -> usize {
        self.classes
            .iter()
            .map(|(class, usage)| class.payload_width() * usage.live_blocks)
            .sum()
    }

    /// Usage for `class`, zeroed if no page is committed to it
    pub fn class(&self, class: SizeClass) -> ClassUsage {
        self.classes.get(&class).copied().unwrap_or_default()
    }
}
