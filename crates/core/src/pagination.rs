//! Pagination boundary math for the catalog list view.
//!
//! Offsets are always multiples of the page size and clamped into
//! `[0, total)`; navigation that would leave that range is disabled by the
//! coordinator rather than silently clamped.

/// Round an offset down to the nearest page boundary.
pub fn page_floor(offset: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    (offset.max(0) / limit) * limit
}

/// Offset of the last non-empty page, or 0 when the catalog is empty.
pub fn last_page_offset(total: i64, limit: i64) -> i64 {
    if total <= 0 || limit <= 0 {
        return 0;
    }
    ((total - 1) / limit) * limit
}

/// Clamp an offset into `[0, total)`, rounded down to a page boundary.
pub fn clamp_offset(offset: i64, total: i64, limit: i64) -> i64 {
    let floored = page_floor(offset, limit);
    floored.min(last_page_offset(total, limit))
}

/// Whether a previous page exists.
pub fn can_prev(offset: i64) -> bool {
    offset > 0
}

/// Whether a next page exists.
pub fn can_next(offset: i64, limit: i64, total: i64) -> bool {
    offset + limit < total
}

/// 1-based page number / page count summary, for status-bar rendering.
pub fn page_position(offset: i64, limit: i64, total: i64) -> (i64, i64) {
    if limit <= 0 {
        return (1, 1);
    }
    let pages = ((total.max(0) + limit - 1) / limit).max(1);
    let current = (page_floor(offset, limit) / limit + 1).min(pages);
    (current, pages)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
