//! Size class selection
//!
//! The closed set of page types and the binning policy that maps a
//! requested payload size onto one of them.

use std::fmt;

use crate::header::{BLOCK_HEADER_SIZE, PAGE_PAYLOAD_SIZE};

/// Page type: the block payload width a page is committed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SizeClass {
    /// Uncommitted page, eligible for any class
    Empty,
    /// 4-byte blocks
    Block4,
    /// 16-byte blocks
    Block16,
    /// 32-byte blocks
    Block32,
    /// One block filling the whole page payload
    Whole,
}

impl SizeClass {
    /// Every class, ascending by payload width
    pub const ALL: [SizeClass; 5] = [
        SizeClass::Empty,
        SizeClass::Block4,
        SizeClass::Block16,
        SizeClass::Block32,
        SizeClass::Whole,
    ];

    /// Classes with a fixed small block width, in the order `classify` tries them
    const FIXED: [SizeClass; 3] = [SizeClass::Block4, SizeClass::Block16, SizeClass::Block32];

    /// Payload bytes per block
    pub const fn payload_width(self) -> usize {
        match self {
            SizeClass::Empty => 0,
            SizeClass::Block4 => 4,
            SizeClass::Block16 => 16,
            SizeClass::Block32 => 32,
            SizeClass::Whole => PAGE_PAYLOAD_SIZE - BLOCK_HEADER_SIZE,
        }
    }

    /// Distance between consecutive block slots (header + payload)
    pub const fn stride(self) -> usize {
        BLOCK_HEADER_SIZE + self.payload_width()
    }

    /// Number of block slots that fit entirely inside one page payload
    pub const fn slots_per_page(self) -> usize {
        match self {
            SizeClass::Empty => 0,
            _ => PAGE_PAYLOAD_SIZE / self.stride(),
        }
    }

    /// Exact-width lookup, as stored in a page header
    pub fn from_width(width: usize) -> Option<SizeClass> {
        Self::ALL
            .iter()
            .copied()
            .find(|class| class.payload_width() == width)
    }

    /// Name used in dumps
    pub const fn name(self) -> &'static str {
        match self {
            SizeClass::Empty => "EMPTY",
            SizeClass::Block4 => "BLOCK_4",
            SizeClass::Block16 => "BLOCK_16",
            SizeClass::Block32 => "BLOCK_32",
            SizeClass::Whole => "BLOCK_PAGE",
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pick the size class for a request of `size` payload bytes
///
/// The block header width is added to `size` first; the smallest fixed class
/// whose payload width covers that sum wins. Anything larger lands in
/// [`SizeClass::Whole`], which takes a full page regardless of how much of it
/// the caller needs. Requests are never split across pages.
pub fn classify(size: usize) -> SizeClass {
    let needed = size.saturating_add(BLOCK_HEADER_SIZE);

    SizeClass::FIXED
        .iter()
        .copied()
        .find(|class| class.payload_width() >= needed)
        .unwrap_or(SizeClass::Whole)
}
