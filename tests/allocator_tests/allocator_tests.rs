//! Tests for PageAllocator
//!
//! These tests verify:
//! - Construction and capacity rounding
//! - Page commit and first-fit reuse
//! - Exhaustion
//! - Reallocation data movement and failure behavior
//! - The coarse bounds contract (including the offsets it lets through)
//! - Dump and statistics

use pagealloc::header::{BLOCK_HEADER_SIZE, PAGE_HEADER_SIZE, PAGE_TOTAL_SIZE};
use pagealloc::{AllocError, Config, PageAllocator, SizeClass};

// =============================================================================
// Helper Functions
// =============================================================================

fn single_page_allocator() -> PageAllocator {
    PageAllocator::with_capacity(PAGE_TOTAL_SIZE)
}

/// Payload offset of slot `index` in page `page` for `class`
fn payload_offset(page: usize, class: SizeClass, index: usize) -> usize {
    page * PAGE_TOTAL_SIZE + PAGE_HEADER_SIZE + index * class.stride() + BLOCK_HEADER_SIZE
}

// =============================================================================
// Construction Tests
// =============================================================================

#[test]
fn test_default_capacity_is_ten_pages() {
    let allocator = PageAllocator::new();

    assert_eq!(allocator.capacity(), 10 * PAGE_TOTAL_SIZE);
    assert_eq!(allocator.page_count(), 10);
}

#[test]
fn test_capacity_rounds_up_to_page_multiple() {
    let cases = [
        (1, PAGE_TOTAL_SIZE),
        (491, PAGE_TOTAL_SIZE),
        (PAGE_TOTAL_SIZE, PAGE_TOTAL_SIZE),
        (PAGE_TOTAL_SIZE + 1, 2 * PAGE_TOTAL_SIZE),
        (1024, 3 * PAGE_TOTAL_SIZE),
        (4920, 4920),
    ];

    for (requested, expected) in cases {
        let allocator = PageAllocator::with_capacity(requested);
        assert_eq!(allocator.capacity(), expected, "requested {}", requested);
        assert_eq!(allocator.capacity() % PAGE_TOTAL_SIZE, 0);
    }
}

#[test]
fn test_zero_capacity_is_empty_buffer() {
    let mut allocator = PageAllocator::with_capacity(0);

    assert_eq!(allocator.capacity(), 0);
    assert_eq!(allocator.page_count(), 0);
    assert_eq!(allocator.allocate(0), None);
    assert_eq!(allocator.allocate(1000), None);
    assert_eq!(
        allocator.free(4),
        Err(AllocError::OutOfBounds { offset: 4, len: 0 })
    );
    assert!(allocator.read_payload(4).is_err());
    assert_eq!(allocator.dump().count(), 0);
    assert_eq!(allocator.to_string(), "");
}

#[test]
#[should_panic(expected = "overflows when rounded up")]
fn test_capacity_overflow_panics() {
    PageAllocator::with_capacity(usize::MAX);
}

#[test]
fn test_from_config() {
    let config = Config::builder().capacity(1000).build();
    let allocator = PageAllocator::from_config(&config).unwrap();
    assert_eq!(allocator.capacity(), 3 * PAGE_TOTAL_SIZE);

    let config = Config::builder().capacity(0).build();
    assert_eq!(PageAllocator::from_config(&config).unwrap().capacity(), 0);

    let config = Config::builder().capacity(usize::MAX).build();
    assert!(matches!(
        PageAllocator::from_config(&config),
        Err(AllocError::Config(_))
    ));
}

#[test]
fn test_fresh_allocator_is_all_empty() {
    let allocator = PageAllocator::new();

    for page in 0..allocator.page_count() {
        assert_eq!(allocator.page_class(page), Some(SizeClass::Empty));
    }
    assert_eq!(allocator.page_class(allocator.page_count()), None);

    let stats = allocator.stats();
    assert_eq!(stats.total_pages, 10);
    assert_eq!(stats.empty_pages, 10);
    assert_eq!(stats.committed_pages(), 0);
}

// =============================================================================
// Allocation Tests
// =============================================================================

#[test]
fn test_first_allocation_commits_one_page() {
    let mut allocator = PageAllocator::new();

    let offset = allocator.allocate(24).unwrap();

    assert_eq!(offset, PAGE_HEADER_SIZE + BLOCK_HEADER_SIZE);
    assert_eq!(allocator.page_class(0), Some(SizeClass::Block32));
    assert!(!allocator.is_free(offset).unwrap());

    let stats = allocator.stats();
    assert_eq!(stats.empty_pages, 9);
    assert_eq!(stats.committed_pages(), 1);

    let usage = stats.class(SizeClass::Block32);
    assert_eq!(usage.live_blocks, 1);
    assert_eq!(usage.free_blocks, SizeClass::Block32.slots_per_page() - 1);

    let non_empty = allocator
        .dump()
        .filter(|page| page.header.size_class() != Some(SizeClass::Empty))
        .count();
    assert_eq!(non_empty, 1);
}

#[test]
fn test_whole_page_request_uses_first_page() {
    let mut allocator = PageAllocator::new();

    let offset = allocator.allocate(1000).unwrap();

    assert_eq!(offset, PAGE_HEADER_SIZE + BLOCK_HEADER_SIZE);
    assert_eq!(allocator.page_class(0), Some(SizeClass::Whole));
}

#[test]
fn test_consecutive_allocations_fill_slots_in_order() {
    let mut allocator = PageAllocator::new();

    for index in 0..5 {
        let offset = allocator.allocate(8).unwrap();
        assert_eq!(offset, payload_offset(0, SizeClass::Block16, index));
    }
}

#[test]
fn test_classes_get_separate_pages() {
    let mut allocator = PageAllocator::new();

    let tiny = allocator.allocate(0).unwrap();
    let small = allocator.allocate(8).unwrap();
    let whole = allocator.allocate(100).unwrap();
    let tiny_again = allocator.allocate(0).unwrap();

    assert_eq!(tiny, payload_offset(0, SizeClass::Block4, 0));
    assert_eq!(small, payload_offset(1, SizeClass::Block16, 0));
    assert_eq!(whole, payload_offset(2, SizeClass::Whole, 0));
    assert_eq!(tiny_again, payload_offset(0, SizeClass::Block4, 1));
}

#[test]
fn test_free_then_allocate_reuses_offset() {
    let mut allocator = PageAllocator::new();

    let first = allocator.allocate(10).unwrap();
    let second = allocator.allocate(10).unwrap();
    allocator.free(first).unwrap();

    let reused = allocator.allocate(12).unwrap();

    assert_eq!(reused, first);
    assert_ne!(reused, second);
    assert_eq!(allocator.stats().committed_pages(), 1);
}

#[test]
fn test_full_page_spills_into_next_empty_page() {
    let mut allocator = PageAllocator::new();

    for _ in 0..SizeClass::Block16.slots_per_page() {
        allocator.allocate(8).unwrap();
    }
    let spilled = allocator.allocate(8).unwrap();

    assert_eq!(spilled, payload_offset(1, SizeClass::Block16, 0));
    assert_eq!(allocator.stats().class(SizeClass::Block16).pages, 2);
}

// =============================================================================
// Exhaustion Tests
// =============================================================================

#[test]
fn test_single_page_exhaustion() {
    let mut allocator = single_page_allocator();

    let offsets: Vec<usize> = (0..SizeClass::Block4.slots_per_page())
        .map(|_| allocator.allocate(0).unwrap())
        .collect();

    assert_eq!(offsets.len(), 60);
    assert_eq!(allocator.allocate(0), None);
    // No empty page left for another class either
    assert_eq!(allocator.allocate(8), None);
}

#[test]
fn test_whole_pages_exhaust_after_page_count() {
    let mut allocator = PageAllocator::new();

    for page in 0..allocator.page_count() {
        assert_eq!(
            allocator.allocate(200),
            Some(payload_offset(page, SizeClass::Whole, 0))
        );
    }
    assert_eq!(allocator.allocate(200), None);
}

#[test]
fn test_failed_allocation_changes_nothing() {
    let mut allocator = PageAllocator::with_capacity(2 * PAGE_TOTAL_SIZE);
    allocator.allocate(0).unwrap();
    allocator.allocate(100).unwrap();

    let before = allocator.to_string();
    assert_eq!(allocator.allocate(8), None);

    assert_eq!(allocator.to_string(), before);
}

// =============================================================================
// Free Tests
// =============================================================================

#[test]
fn test_free_is_idempotent() {
    let mut allocator = PageAllocator::new();
    let offset = allocator.allocate(4).unwrap();

    allocator.free(offset).unwrap();
    assert!(allocator.is_free(offset).unwrap());

    allocator.free(offset).unwrap();
    assert!(allocator.is_free(offset).unwrap());
}

#[test]
fn test_free_keeps_payload_and_page_class() {
    let mut allocator = PageAllocator::new();
    let offset = allocator.allocate(4).unwrap();
    allocator.write_payload(offset, &[9, 8, 7]).unwrap();

    allocator.free(offset).unwrap();

    assert_eq!(&allocator.read_payload(offset).unwrap()[..3], &[9, 8, 7]);
    assert_eq!(allocator.page_class(0), Some(SizeClass::Block16));
}

// =============================================================================
// Read/Write Tests
// =============================================================================

#[test]
fn test_read_returns_full_class_width() {
    let mut allocator = PageAllocator::new();
    let offset = allocator.allocate(0).unwrap();

    allocator.write_payload(offset, &[1, 2]).unwrap();
    let data = allocator.read_payload(offset).unwrap();

    assert_eq!(data.as_ref(), &[1, 2, 0, 0]);
}

#[test]
fn test_read_on_empty_page_is_empty() {
    let allocator = PageAllocator::new();
    assert!(allocator.read_payload(100).unwrap().is_empty());
}

#[test]
fn test_oversized_write_spills_into_next_slot() {
    let mut allocator = PageAllocator::new();
    let first = allocator.allocate(0).unwrap();
    let second = allocator.allocate(0).unwrap();
    assert!(!allocator.is_free(second).unwrap());

    // Length is the caller's responsibility: eight bytes overwrite the
    // next block's header with a non-zero flag.
    allocator.write_payload(first, &[1; 8]).unwrap();

    assert!(allocator.is_free(second).unwrap());
}

#[test]
fn test_write_past_buffer_end_rejected() {
    let mut allocator = single_page_allocator();

    let result = allocator.write_payload(400, &[0; 200]);

    assert_eq!(
        result,
        Err(AllocError::OutOfBounds {
            offset: 400,
            len: PAGE_TOTAL_SIZE
        })
    );
}

#[test]
fn test_misaligned_read_past_buffer_end_rejected() {
    let mut allocator = single_page_allocator();
    allocator.allocate(100).unwrap();

    assert!(matches!(
        allocator.read_payload(470),
        Err(AllocError::OutOfBounds { offset: 470, .. })
    ));
}

// =============================================================================
// Reallocation Tests
// =============================================================================

#[test]
fn test_reallocate_grow_preserves_prefix() {
    let mut allocator = PageAllocator::new();
    let offset = allocator.allocate(3).unwrap();
    allocator.write_payload(offset, &[10, 20, 30]).unwrap();

    let moved = allocator.reallocate(offset, 200).unwrap().unwrap();

    assert_eq!(moved, payload_offset(1, SizeClass::Whole, 0));
    let data = allocator.read_payload(moved).unwrap();
    assert_eq!(data.len(), SizeClass::Whole.payload_width());
    assert_eq!(&data[..3], &[10, 20, 30]);
    assert!(allocator.is_free(offset).unwrap());
}

#[test]
fn test_reallocate_same_class_reuses_slot() {
    let mut allocator = PageAllocator::new();
    let offset = allocator.allocate(5).unwrap();
    allocator.write_payload(offset, &[1, 2, 3, 4, 5]).unwrap();

    let moved = allocator.reallocate(offset, 12).unwrap().unwrap();

    assert_eq!(moved, offset);
    assert!(!allocator.is_free(moved).unwrap());
    assert_eq!(&allocator.read_payload(moved).unwrap()[..5], &[1, 2, 3, 4, 5]);
}

#[test]
fn test_reallocate_shrink_copies_full_old_width() {
    let mut allocator = PageAllocator::new();
    let offset = allocator.allocate(20).unwrap();
    let data: Vec<u8> = (1..=32).collect();
    allocator.write_payload(offset, &data).unwrap();

    let moved = allocator.reallocate(offset, 0).unwrap().unwrap();

    assert_eq!(moved, payload_offset(1, SizeClass::Block4, 0));
    assert_eq!(allocator.read_payload(moved).unwrap().as_ref(), &[1, 2, 3, 4]);

    // All 32 old bytes are copied: the rest runs over the next slots,
    // header bytes included
    let neighbour = payload_offset(1, SizeClass::Block4, 1);
    assert_eq!(neighbour, moved + 8);
    assert_eq!(allocator.read_payload(neighbour).unwrap().as_ref(), &[9, 10, 11, 12]);
    assert!(allocator.is_free(neighbour).unwrap());

    let page = allocator.dump().nth(1).unwrap();
    let start = moved - PAGE_TOTAL_SIZE - PAGE_HEADER_SIZE;
    assert_eq!(&page.payload[start..start + 32], data.as_slice());
}

#[test]
fn test_reallocate_copy_stops_at_buffer_end() {
    let mut allocator = PageAllocator::with_capacity(2 * PAGE_TOTAL_SIZE);
    let whole = allocator.allocate(100).unwrap();
    // Leave only the last 4-byte slot of the final page free
    for _ in 0..SizeClass::Block4.slots_per_page() - 1 {
        allocator.allocate(0).unwrap();
    }
    allocator.write_payload(whole, &[0x11, 0x22, 0x33, 0x44, 0x55]).unwrap();

    let moved = allocator.reallocate(whole, 0).unwrap().unwrap();

    assert_eq!(moved, payload_offset(1, SizeClass::Block4, 59));
    assert_eq!(moved + 4, allocator.capacity());
    let page = allocator.dump().nth(1).unwrap();
    assert_eq!(&page.payload[page.payload.len() - 4..], &[0x11, 0x22, 0x33, 0x44]);
}

#[test]
fn test_reallocate_exhaustion_frees_old_block() {
    let mut allocator = single_page_allocator();
    let offset = allocator.allocate(0).unwrap();
    allocator.write_payload(offset, &[9, 9, 9, 9]).unwrap();

    let result = allocator.reallocate(offset, 100).unwrap();

    assert_eq!(result, None);
    assert!(allocator.is_free(offset).unwrap());
}

// =============================================================================
// Bounds Tests
// =============================================================================

#[test]
fn test_bounds_rejects_minus_one_and_buffer_length() {
    let mut allocator = PageAllocator::new();
    let len = allocator.capacity();

    // usize::MAX is -1 wrapped
    for offset in [usize::MAX, len] {
        let expected = Err(AllocError::OutOfBounds { offset, len });

        assert_eq!(allocator.free(offset), expected);
        assert_eq!(allocator.write_payload(offset, &[1]), expected);
        assert_eq!(allocator.read_payload(offset).map(|_| ()), expected);
        assert_eq!(allocator.reallocate(offset, 4).map(|_| ()), expected);
    }
}

#[test]
fn test_bounds_rejects_offsets_without_room_for_header() {
    let mut allocator = PageAllocator::new();

    for offset in 0..BLOCK_HEADER_SIZE {
        assert!(allocator.free(offset).is_err());
    }
    assert!(allocator.free(BLOCK_HEADER_SIZE).is_ok());
}

#[test]
fn test_bounds_upper_limit() {
    let mut allocator = PageAllocator::new();
    let len = allocator.capacity();
    let last_accepted = len - PAGE_HEADER_SIZE - 1;

    assert!(allocator.free(last_accepted).is_ok());
    assert!(allocator.free(last_accepted + 1).is_err());
}

#[test]
fn test_coarse_bounds_accept_misaligned_offset() {
    let mut allocator = PageAllocator::new();

    // Offset 4 is not a block payload: its "header" is the page header's
    // class field and the write lands on the span page count.
    allocator.write_payload(4, &[7]).unwrap();

    let first = allocator.dump().next().unwrap();
    assert_eq!(first.header.span_pages, 7);
    assert_eq!(first.header.size_class(), Some(SizeClass::Empty));
}

#[test]
fn test_last_slots_of_final_page_fall_outside_bounds() {
    let mut allocator = single_page_allocator();
    let offsets: Vec<usize> = (0..SizeClass::Block4.slots_per_page())
        .map(|_| allocator.allocate(0).unwrap())
        .collect();

    let n = offsets.len();
    assert!(allocator.free(offsets[n - 1]).is_err());
    assert!(allocator.free(offsets[n - 2]).is_err());
    assert!(allocator.free(offsets[n - 3]).is_ok());
}

// =============================================================================
// Dump Tests
// =============================================================================

#[test]
fn test_dump_lists_every_page() {
    let mut allocator = PageAllocator::with_capacity(1024);
    allocator.allocate(24).unwrap();

    let pages: Vec<_> = allocator.dump().collect();
    assert_eq!(pages.len(), 3);
    assert_eq!(allocator.dump().len(), 3);

    let text = allocator.to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(
        lines[0],
        "Page type: BLOCK_32 Block number of pages: 0 Block page index: 0"
    );
    assert!(lines[1].starts_with("00-00-00-00-"));
    assert_eq!(lines[2], "Page type: EMPTY Block number of pages: 0 Block page index: 0");
}

#[test]
fn test_dump_is_read_only() {
    let mut allocator = PageAllocator::new();
    allocator.allocate(8).unwrap();

    let first = allocator.to_string();
    let _ = allocator.dump().count();
    let second = allocator.to_string();

    assert_eq!(first, second);
}

// =============================================================================
// Statistics Tests
// =============================================================================

#[test]
fn test_stats_track_live_and_free_blocks() {
    let mut allocator = PageAllocator::new();
    let a = allocator.allocate(0).unwrap();
    allocator.allocate(0).unwrap();
    allocator.allocate(300).unwrap();
    allocator.free(a).unwrap();

    let stats = allocator.stats();

    assert_eq!(stats.committed_pages(), 2);
    assert_eq!(stats.empty_pages, 8);
    assert_eq!(stats.class(SizeClass::Block4).live_blocks, 1);
    assert_eq!(stats.class(SizeClass::Block4).free_blocks, 59);
    assert_eq!(stats.class(SizeClass::Whole).live_blocks, 1);
    assert_eq!(stats.live_bytes(), 4 + 476);
}
