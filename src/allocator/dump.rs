//! Page dump
//!
//! Lazy, read-only iteration over page descriptions.

use std::fmt;

use crate::header::{PageHeader, PAGE_HEADER_SIZE, PAGE_TOTAL_SIZE};

/// Iterator over every page of an allocator buffer, in ascending order
#[derive(Debug, Clone)]
pub struct Dump<'a> {
    buffer: &'a [u8],
    /// Byte offset of the next page to describe
    current_offset: usize,
}

impl<'a> Dump<'a> {
    pub(super) fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            current_offset: 0,
        }
    }
}

impl<'a> Iterator for Dump<'a> {
    type Item = PageDump<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let page_start = self.current_offset;
        if page_start + PAGE_TOTAL_SIZE > self.buffer.len() {
            return None;
        }
        self.current_offset += PAGE_TOTAL_SIZE;

        Some(PageDump {
            index: page_start / PAGE_TOTAL_SIZE,
            header: PageHeader::read_at(self.buffer, page_start),
            payload: &self.buffer[page_start + PAGE_HEADER_SIZE..page_start + PAGE_TOTAL_SIZE],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.buffer.len() - self.current_offset) / PAGE_TOTAL_SIZE;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Dump<'_> {}

/// Snapshot of one page: decoded header plus raw payload bytes
#[derive(Debug, Clone, Copy)]
pub struct PageDump<'a> {
    /// Page number, counted from the start of the buffer
    pub index: usize,
    pub header: PageHeader,
    /// Everything after the page header, block headers included
    pub payload: &'a [u8],
}

impl fmt::Display for PageDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;

        for (i, byte) in self.payload.iter().enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}
