//! Configuration for pagealloc
//!
//! Centralized configuration with sensible defaults.

use crate::error::{AllocError, Result};
use crate::header::PAGE_TOTAL_SIZE;

/// Number of pages an allocator gets when no capacity is given
pub const DEFAULT_PAGE_COUNT: usize = 10;

/// Main configuration for a PageAllocator instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Requested buffer capacity in bytes.
    ///
    /// Rounded up to a whole number of pages when the allocator is built.
    pub capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_PAGE_COUNT * PAGE_TOTAL_SIZE,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Capacity after rounding up to the next multiple of the page size
    ///
    /// Zero stays zero; only a capacity too close to `usize::MAX` to round
    /// up is rejected.
    pub fn aligned_capacity(&self) -> Result<usize> {
        align_to_page(self.capacity).ok_or_else(|| {
            AllocError::Config(format!(
                "capacity {} overflows when rounded up to {}-byte pages",
                self.capacity, PAGE_TOTAL_SIZE
            ))
        })
    }
}

/// Round `size` up to the next multiple of the page size
///
/// Returns `None` on overflow.
pub fn align_to_page(size: usize) -> Option<usize> {
    match size % PAGE_TOTAL_SIZE {
        0 => Some(size),
        rem => size.checked_add(PAGE_TOTAL_SIZE - rem),
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the buffer capacity (in bytes)
    pub fn capacity(mut self, bytes: usize) -> Self {
        self.config.capacity = bytes;
        self
    }

    /// Set the buffer capacity as a number of whole pages
    pub fn pages(mut self, count: usize) -> Self {
        self.config.capacity = count.saturating_mul(PAGE_TOTAL_SIZE);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
