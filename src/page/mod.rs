//! Page Module
//!
//! Offset arithmetic over the paged buffer.
//!
//! ## Responsibilities
//! - Map any buffer offset to the start of its owning page
//! - Walk the block slots of a committed page
//! - Find the first free slot with a linear scan (no free list)
//! - Commit an empty page to a size class
//!
//! Slot offsets returned here point at the block *header*; the allocator
//! adds `BLOCK_HEADER_SIZE` before handing an offset to callers.

mod slots;

pub use slots::BlockSlots;

use crate::header::{BlockHeader, PageHeader, PAGE_TOTAL_SIZE};
use crate::size_class::SizeClass;

/// Round `offset` down to the start of its page
pub fn page_start(offset: usize) -> usize {
    offset - offset % PAGE_TOTAL_SIZE
}

/// Decode the header of the page starting at `page_start`
pub fn page_header(buffer: &[u8], page_start: usize) -> PageHeader {
    PageHeader::read_at(buffer, page_start)
}

/// Size class of the page owning `offset`, `None` if the header is unrecognised
pub fn owning_class(buffer: &[u8], offset: usize) -> Option<SizeClass> {
    page_header(buffer, page_start(offset)).size_class()
}

/// Slot offset of the first free block in the page at `page_start`
///
/// Returns `None` when every slot is occupied, or when the page is empty or
/// carries an unknown class (such pages have no slots to walk).
pub fn first_free_block(buffer: &[u8], page_start: usize) -> Option<usize> {
    let class = page_header(buffer, page_start).size_class()?;

    BlockSlots::new(page_start, class).find(|&slot| BlockHeader::read_at(buffer, slot).is_free)
}

/// Commit the empty page at `page_start` to `class`
///
/// Rewrites the page header (span fields are left as they were) and marks
/// every slot free. Payload bytes are not touched.
pub fn commit_page(buffer: &mut [u8], page_start: usize, class: SizeClass) {
    let mut header = page_header(buffer, page_start);
    header.set_size_class(class);
    header.write_at(buffer, page_start);

    let free = BlockHeader::free();
    for slot in BlockSlots::new(page_start, class) {
        free.write_at(buffer, slot);
    }
}
