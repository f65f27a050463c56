//! Header codec
//!
//! Encoding and decoding of page and block headers at buffer offsets.
//!
//! Decoding trusts its input: any byte pattern of the right width decodes to
//! some header, and re-encoding it yields the same bytes.

use std::fmt;

use super::{BLOCK_HEADER_SIZE, PAGE_HEADER_SIZE};
use crate::size_class::SizeClass;

/// Byte written into the flag position of a free block
const FREE_MARKER: u8 = 1;

/// Byte written into the flag position of an occupied block
const OCCUPIED_MARKER: u8 = 0;

// =============================================================================
// Page Header
// =============================================================================

/// Decoded page header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageHeader {
    /// Payload width of the page's blocks (0 = uncommitted)
    pub class_width: u32,

    /// Number of pages in a multi-page span (never consulted)
    pub span_pages: u32,

    /// Position of this page inside its span (never consulted)
    pub span_index: u32,
}

impl PageHeader {
    /// Header of a page committed to `class`, span fields zeroed
    pub fn new(class: SizeClass) -> Self {
        Self {
            class_width: class.payload_width() as u32,
            span_pages: 0,
            span_index: 0,
        }
    }

    /// Header of an uncommitted page
    pub fn empty() -> Self {
        Self::new(SizeClass::Empty)
    }

    /// Size class this header is committed to, or `None` for an unknown width
    pub fn size_class(&self) -> Option<SizeClass> {
        SizeClass::from_width(self.class_width as usize)
    }

    /// Re-point the header at another class, keeping the span fields
    pub fn set_size_class(&mut self, class: SizeClass) {
        self.class_width = class.payload_width() as u32;
    }

    /// Encode to the fixed-width little-endian layout
    pub fn encode(&self) -> [u8; PAGE_HEADER_SIZE] {
        let mut bytes = [0u8; PAGE_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.class_width.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.span_pages.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.span_index.to_le_bytes());
        bytes
    }

    /// Decode from the fixed-width little-endian layout
    pub fn decode(bytes: &[u8; PAGE_HEADER_SIZE]) -> Self {
        Self {
            class_width: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            span_pages: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            span_index: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
        }
    }

    /// Decode the header stored at `offset`
    ///
    /// # Panics
    ///
    /// Panics if `buffer` holds fewer than `PAGE_HEADER_SIZE` bytes past `offset`.
    pub fn read_at(buffer: &[u8], offset: usize) -> Self {
        let mut raw = [0u8; PAGE_HEADER_SIZE];
        raw.copy_from_slice(&buffer[offset..offset + PAGE_HEADER_SIZE]);
        Self::decode(&raw)
    }

    /// Encode this header into `buffer` at `offset`
    ///
    /// # Panics
    ///
    /// Panics if `buffer` holds fewer than `PAGE_HEADER_SIZE` bytes past `offset`.
    pub fn write_at(&self, buffer: &mut [u8], offset: usize) {
        buffer[offset..offset + PAGE_HEADER_SIZE].copy_from_slice(&self.encode());
    }
}

impl fmt::Display for PageHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = match self.size_class() {
            Some(class) => class.name().to_string(),
            None => format!("UNKNOWN({})", self.class_width),
        };
        write!(
            f,
            "Page type: {} Block number of pages: {} Block page index: {}",
            class, self.span_pages, self.span_index
        )
    }
}

// =============================================================================
// Block Header
// =============================================================================

/// Decoded block header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Whether the slot is available for allocation
    pub is_free: bool,

    /// Padding bytes after the flag, kept as found
    pub reserved: [u8; BLOCK_HEADER_SIZE - 1],
}

impl BlockHeader {
    /// A free block header with zeroed padding
    pub fn free() -> Self {
        Self {
            is_free: true,
            reserved: [0; BLOCK_HEADER_SIZE - 1],
        }
    }

    /// An occupied block header with zeroed padding
    pub fn occupied() -> Self {
        Self {
            is_free: false,
            reserved: [0; BLOCK_HEADER_SIZE - 1],
        }
    }

    pub fn encode(&self) -> [u8; BLOCK_HEADER_SIZE] {
        let mut bytes = [0u8; BLOCK_HEADER_SIZE];
        bytes[0] = if self.is_free { FREE_MARKER } else { OCCUPIED_MARKER };
        bytes[1..].copy_from_slice(&self.reserved);
        bytes
    }

    /// Any non-zero flag byte decodes as free
    pub fn decode(bytes: &[u8; BLOCK_HEADER_SIZE]) -> Self {
        Self {
            is_free: bytes[0] != OCCUPIED_MARKER,
            reserved: [bytes[1], bytes[2], bytes[3]],
        }
    }

    /// Decode the header stored at `offset`
    ///
    /// # Panics
    ///
    /// Panics if `buffer` holds fewer than `BLOCK_HEADER_SIZE` bytes past `offset`.
    pub fn read_at(buffer: &[u8], offset: usize) -> Self {
        let mut raw = [0u8; BLOCK_HEADER_SIZE];
        raw.copy_from_slice(&buffer[offset..offset + BLOCK_HEADER_SIZE]);
        Self::decode(&raw)
    }

    /// Encode this header into `buffer` at `offset`
    ///
    /// # Panics
    ///
    /// Panics if `buffer` holds fewer than `BLOCK_HEADER_SIZE` bytes past `offset`.
    pub fn write_at(&self, buffer: &mut [u8], offset: usize) {
        buffer[offset..offset + BLOCK_HEADER_SIZE].copy_from_slice(&self.encode());
    }
}

impl Default for BlockHeader {
    fn default() -> Self {
        Self::free()
    }
}

impl fmt::Display for BlockHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Free: {}", self.is_free)
    }
}
