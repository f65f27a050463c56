//! Header Module
//!
//! Fixed-width binary layout of page headers and block headers.
//!
//! ## Page Layout
//! ```text
//! ┌──────────────────┬──────────────────────────────────────────────┐
//! │ Page Header (12) │              Page Payload (480)              │
//! └──────────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! ### Page Header
//! ```text
//! ┌──────────────┬───────────────┬───────────────┐
//! │ Class (4)    │ Span Pages (4)│ Span Index (4)│
//! └──────────────┴───────────────┴───────────────┘
//! ```
//! All three fields are little-endian `u32`. `Class` is the payload width of
//! the page's blocks (0 = empty page). The span fields are carried for layout
//! compatibility only.
//!
//! ### Block Slot (inside a committed page payload)
//! ```text
//! ┌──────────┬──────────────┬───────────────────────────┐
//! │ Free (1) │ Reserved (3) │  Payload (class width)    │
//! └──────────┴──────────────┴───────────────────────────┘
//! ```

mod codec;

pub use codec::{BlockHeader, PageHeader};

/// Page header size: class (4) + span pages (4) + span index (4)
pub const PAGE_HEADER_SIZE: usize = 12;

/// Bytes available for block slots in every page
pub const PAGE_PAYLOAD_SIZE: usize = 480;

/// Full page stride inside the buffer
pub const PAGE_TOTAL_SIZE: usize = PAGE_HEADER_SIZE + PAGE_PAYLOAD_SIZE;

/// Block header size: free flag (1) + reserved (3)
pub const BLOCK_HEADER_SIZE: usize = 4;
