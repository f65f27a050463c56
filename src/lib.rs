//! # pagealloc
//!
//! A simulated page-based memory allocator over one contiguous byte buffer:
//! - Fixed-size pages, each committed to a single size class
//! - Fixed-size blocks inside a page, each with a one-flag header
//! - First-fit allocation by linear scan, no free lists
//! - Byte offsets instead of pointers
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      PageAllocator                           │
//! │      allocate / free / reallocate / read / write / dump      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │    Page     │          │ Size Class  │
//!   │ (Addressing)│          │  (Binning)  │
//!   └──────┬──────┘          └─────────────┘
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │   Header    │
//!   │   (Codec)   │
//!   └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use pagealloc::PageAllocator;
//!
//! let mut allocator = PageAllocator::with_capacity(1024);
//! let offset = allocator.allocate(24).expect("fresh allocator has room");
//! allocator.write_payload(offset, &[1, 4, 8, 5]).unwrap();
//!
//! let moved = allocator.reallocate(offset, 48).unwrap().expect("room for a whole page");
//! assert_eq!(&allocator.read_payload(moved).unwrap()[..4], &[1, 4, 8, 5]);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod header;
pub mod size_class;
pub mod page;
pub mod allocator;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{AllocError, Result};
pub use config::Config;
pub use allocator::{AllocatorStats, PageAllocator};
pub use size_class::{classify, SizeClass};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of pagealloc
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
