//! Page-number and page-size policy for public listings.
//!
//! # Invariants
//! - Unparseable or non-positive page numbers mean page 1.
//! - Page numbers past the end clamp to the last page, however large.
//! - An empty set has zero pages and is not an error.

use serde::Serialize;
use std::num::IntErrorKind;

/// Page size used when the caller passes 0.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Upper bound on any single page or limit.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Normalizes a requested page size or limit.
pub fn normalize_page_size(page_size: u32) -> u32 {
    match page_size {
        0 => DEFAULT_PAGE_SIZE,
        value if value > MAX_PAGE_SIZE => MAX_PAGE_SIZE,
        value => value,
    }
}

/// Interprets raw caller text (e.g. a `?page=` query value) as a page number.
///
/// Digit strings too large for `u64` saturate, so they still land on the
/// last page.
pub fn parse_page_number(raw: Option<&str>) -> u64 {
    let Some(text) = raw.map(str::trim) else {
        return 1;
    };
    match text.parse::<u64>() {
        Ok(number) if number >= 1 => number,
        Err(err) if *err.kind() == IntErrorKind::PosOverflow => u64::MAX,
        _ => 1,
    }
}

/// Resolved position of one page inside a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    /// 1-based page number actually served.
    pub number: u64,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PageInfo {
    /// Clamps `requested` into `1..=total_pages` for a set of `total_items`.
    ///
    /// `page_size` must already be normalized (non-zero).
    pub fn resolve(requested: u64, page_size: u32, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(u64::from(page_size.max(1)));
        let number = requested.clamp(1, total_pages.max(1));
        Self {
            number,
            page_size,
            total_items,
            total_pages,
            has_previous: total_pages > 0 && number > 1,
            has_next: number < total_pages,
        }
    }

    /// Row offset of the first item on this page.
    pub fn offset(&self) -> u64 {
        (self.number - 1) * u64::from(self.page_size)
    }
}
