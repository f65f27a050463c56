//! Allocator Module
//!
//! The allocation engine that owns the paged buffer.
//!
//! ## Responsibilities
//! - Commit empty pages to a size class on demand
//! - First-fit allocation over pages in ascending offset order
//! - Free, reallocate, read and write by payload offset
//! - Read-only dump and usage statistics
//!
//! ## Offsets
//! Every offset handed out by [`PageAllocator::allocate`] is the first payload
//! byte of a block. The block's header sits immediately before it, at
//! `offset - BLOCK_HEADER_SIZE`.

mod dump;
mod stats;

pub use dump::{Dump, PageDump};
pub use stats::{AllocatorStats, ClassUsage};

use std::fmt;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::config::{align_to_page, Config};
use crate::error::{AllocError, Result};
use crate::header::{BlockHeader, PageHeader, BLOCK_HEADER_SIZE, PAGE_HEADER_SIZE, PAGE_TOTAL_SIZE};
use crate::page::{self, BlockSlots};
use crate::size_class::{classify, SizeClass};

/// Page-based allocator over a single owned byte buffer
///
/// ## Concurrency Model
///
/// Single owner, single caller. Mutating operations take `&mut self`, so the
/// borrow checker rules out concurrent access; callers that need sharing
/// must wrap the allocator in their own lock.
///
/// ## Bounds
///
/// `free`, `reallocate`, `read_payload` and `write_payload` only check that
/// the block header implied by an offset lies in
/// `[0, len - PAGE_HEADER_SIZE - BLOCK_HEADER_SIZE)`. They do not check that
/// the offset sits on a slot boundary or that the block is occupied; a
/// misaligned offset inside that window is accepted and will overwrite
/// whatever bytes it lands on.
pub struct PageAllocator {
    /// The whole heap; length is a multiple of `PAGE_TOTAL_SIZE`
    buffer: Vec<u8>,
}

impl PageAllocator {
    /// Create an allocator with the default capacity (ten pages)
    pub fn new() -> Self {
        Self::with_len(crate::config::DEFAULT_PAGE_COUNT * PAGE_TOTAL_SIZE)
    }

    /// Create an allocator of at least `capacity` bytes
    ///
    /// The capacity is rounded up to the next multiple of the page size. A
    /// capacity of zero gives an empty buffer: every allocation returns
    /// `None` and every offset is out of bounds.
    ///
    /// # Panics
    ///
    /// Panics if the rounded capacity does not fit in `usize`. Use
    /// [`PageAllocator::from_config`] to get an error instead.
    pub fn with_capacity(capacity: usize) -> Self {
        let len = align_to_page(capacity).unwrap_or_else(|| {
            panic!(
                "capacity {} overflows when rounded up to {}-byte pages",
                capacity, PAGE_TOTAL_SIZE
            )
        });
        Self::with_len(len)
    }

    /// Create an allocator from a validated config
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::with_len(config.aligned_capacity()?))
    }

    /// `len` must already be a multiple of `PAGE_TOTAL_SIZE`
    fn with_len(len: usize) -> Self {
        let mut buffer = vec![0u8; len];

        let empty = PageHeader::empty();
        for page_start in (0..buffer.len()).step_by(PAGE_TOTAL_SIZE) {
            empty.write_at(&mut buffer, page_start);
        }

        debug!(
            pages = len / PAGE_TOTAL_SIZE,
            bytes = len,
            "Allocator buffer initialized"
        );
        Self { buffer }
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    /// Allocate a block able to hold `size` payload bytes
    ///
    /// Scans pages in ascending order. A page already committed to the
    /// target class is searched for a free slot; the first empty page is
    /// committed to the target class and its first slot is used; pages of
    /// any other class are skipped.
    ///
    /// Returns `None` when no page can satisfy the request. Nothing is
    /// changed in that case.
    pub fn allocate(&mut self, size: usize) -> Option<usize> {
        let class = classify(size);

        for page_start in (0..self.buffer.len()).step_by(PAGE_TOTAL_SIZE) {
            let slot = match page::page_header(&self.buffer, page_start).size_class() {
                Some(page_class) if page_class == class => {
                    page::first_free_block(&self.buffer, page_start)
                }
                Some(SizeClass::Empty) => {
                    page::commit_page(&mut self.buffer, page_start, class);
                    debug!(
                        page = page_start / PAGE_TOTAL_SIZE,
                        class = %class,
                        "Committed page"
                    );
                    Some(page_start + PAGE_HEADER_SIZE)
                }
                _ => None,
            };

            if let Some(slot) = slot {
                self.set_free(slot, false);
                let offset = slot + BLOCK_HEADER_SIZE;
                trace!(size, class = %class, offset, "Allocated block");
                return Some(offset);
            }
        }

        debug!(size, class = %class, "Allocation failed: buffer exhausted");
        None
    }

    /// Mark the block at `offset` free
    ///
    /// Freeing an already free block is a no-op. Payload bytes are kept and
    /// the page stays committed to its class.
    pub fn free(&mut self, offset: usize) -> Result<()> {
        let slot = self.check_offset(offset)?;
        self.set_free(slot, true);
        trace!(offset, "Freed block");
        Ok(())
    }

    /// Move the block at `offset` into a block sized for `new_size`
    ///
    /// Steps:
    /// 1. Capture the old block's full class-width payload
    /// 2. Mark the old block free
    /// 3. Allocate for `new_size` (may reuse the same slot)
    /// 4. Copy the whole captured payload to the new block
    ///
    /// The copy is always the old class width. When the new class is
    /// narrower it spills into the following slots, the same as an
    /// oversized `write_payload`; only the end of the buffer cuts it short.
    ///
    /// Returns `Ok(None)` if step 3 finds no space. The old block has
    /// already been freed at that point and its contents are not restored.
    pub fn reallocate(&mut self, offset: usize, new_size: usize) -> Result<Option<usize>> {
        let slot = self.check_offset(offset)?;
        let old_width = self.payload_width_at(offset);
        self.check_range(offset, old_width)?;

        let data = self.buffer[offset..offset + old_width].to_vec();
        self.set_free(slot, true);

        let Some(new_offset) = self.allocate(new_size) else {
            debug!(offset, new_size, "Reallocation failed: old block already freed");
            return Ok(None);
        };

        let copy_len = data.len().min(self.buffer.len() - new_offset);
        self.buffer[new_offset..new_offset + copy_len].copy_from_slice(&data[..copy_len]);

        trace!(offset, new_offset, copied = copy_len, "Reallocated block");
        Ok(Some(new_offset))
    }

    // =========================================================================
    // Payload Access
    // =========================================================================

    /// Overwrite payload bytes starting at `offset`
    ///
    /// The length of `bytes` is not checked against the block's class; a
    /// write longer than the block spills into the following slot. Only a
    /// write running past the end of the buffer is rejected.
    pub fn write_payload(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        self.check_offset(offset)?;
        self.check_range(offset, bytes.len())?;

        self.buffer[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Read the full class-width payload starting at `offset`
    ///
    /// Always returns as many bytes as the owning page's class holds,
    /// regardless of how many were written.
    pub fn read_payload(&self, offset: usize) -> Result<Bytes> {
        self.check_offset(offset)?;
        let width = self.payload_width_at(offset);
        self.check_range(offset, width)?;

        Ok(Bytes::copy_from_slice(&self.buffer[offset..offset + width]))
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Lazily describe every page in ascending order
    pub fn dump(&self) -> Dump<'_> {
        Dump::new(&self.buffer)
    }

    /// Count pages and blocks per class with a read-only scan
    pub fn stats(&self) -> AllocatorStats {
        let mut stats = AllocatorStats::default();

        for page_start in (0..self.buffer.len()).step_by(PAGE_TOTAL_SIZE) {
            stats.total_pages += 1;

            match page::page_header(&self.buffer, page_start).size_class() {
                Some(SizeClass::Empty) => stats.empty_pages += 1,
                Some(class) => {
                    let usage = stats.classes.entry(class).or_default();
                    usage.pages += 1;
                    for slot in BlockSlots::new(page_start, class) {
                        if BlockHeader::read_at(&self.buffer, slot).is_free {
                            usage.free_blocks += 1;
                        } else {
                            usage.live_blocks += 1;
                        }
                    }
                }
                None => stats.unknown_pages += 1,
            }
        }

        stats
    }

    /// Whether the block header implied by `offset` is marked free
    pub fn is_free(&self, offset: usize) -> Result<bool> {
        let slot = self.check_offset(offset)?;
        Ok(BlockHeader::read_at(&self.buffer, slot).is_free)
    }

    /// Class of the page at `page_index`, `None` if out of range or unrecognised
    pub fn page_class(&self, page_index: usize) -> Option<SizeClass> {
        if page_index >= self.page_count() {
            return None;
        }
        page::page_header(&self.buffer, page_index * PAGE_TOTAL_SIZE).size_class()
    }

    /// Buffer length in bytes
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Number of pages in the buffer
    pub fn page_count(&self) -> usize {
        self.buffer.len() / PAGE_TOTAL_SIZE
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    /// Validate `offset` and return the offset of its block header
    fn check_offset(&self, offset: usize) -> Result<usize> {
        let limit = self
            .buffer
            .len()
            .checked_sub(PAGE_HEADER_SIZE + BLOCK_HEADER_SIZE);

        match (offset.checked_sub(BLOCK_HEADER_SIZE), limit) {
            (Some(slot), Some(limit)) if slot < limit => Ok(slot),
            _ => Err(self.out_of_bounds(offset)),
        }
    }

    /// Reject byte ranges that would run past the end of the buffer
    fn check_range(&self, offset: usize, len: usize) -> Result<()> {
        match offset.checked_add(len) {
            Some(end) if end <= self.buffer.len() => Ok(()),
            _ => Err(self.out_of_bounds(offset)),
        }
    }

    fn out_of_bounds(&self, offset: usize) -> AllocError {
        AllocError::OutOfBounds {
            offset,
            len: self.buffer.len(),
        }
    }

    /// Payload width of the class owning `offset` (0 for empty or unknown pages)
    fn payload_width_at(&self, offset: usize) -> usize {
        page::owning_class(&self.buffer, offset).map_or(0, SizeClass::payload_width)
    }

    /// Flip the free flag of the block header at `slot`, keeping its padding
    fn set_free(&mut self, slot: usize, is_free: bool) {
        let mut header = BlockHeader::read_at(&self.buffer, slot);
        header.is_free = is_free;
        header.write_at(&mut self.buffer, slot);
    }
}

impl Default for PageAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PageAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for page in self.dump() {
            writeln!(f, "{}", page)?;
        }
        Ok(())
    }
}

impl fmt::Debug for PageAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageAllocator")
            .field("capacity", &self.capacity())
            .field("pages", &self.page_count())
            .finish()
    }
}
