// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Active-window selection over a [`RowHeights`] table.

use core::ops::Range;

use crate::{RowHeights, Scalar};

/// The contiguous range of rows that must be mounted for the current scroll position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveWindow<S: Scalar> {
    /// First active row (inclusive).
    pub start: usize,
    /// One past the last active row (exclusive).
    pub end: usize,

    /// Total height of the rows before `start`.
    pub before_extent: S,
    /// Total height of the rows from `end` to the last row.
    pub after_extent: S,
    /// Total height of every row, measured or estimated.
    pub total_extent: S,
}

impl<S: Scalar> ActiveWindow<S> {
    /// A window with no rows over empty content.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            start: 0,
            end: 0,
            before_extent: S::zero(),
            after_extent: S::zero(),
            total_extent: S::zero(),
        }
    }

    /// Returns `true` if no rows are active.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Number of active rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Active row indices.
    #[must_use]
    pub const fn rows(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Returns `true` if `row` is inside the window.
    #[must_use]
    pub const fn contains(&self, row: usize) -> bool {
        row >= self.start && row < self.end
    }
}

/// Compute which rows must be mounted for a scroll position and viewport.
///
/// - `scroll_offset`: top of the viewport in grid coordinates (clamped to `>= 0`).
/// - `viewport_extent`: height of the viewport (clamped to `>= 0`).
/// - `overscan`: extra rows to mount on *each* side of the rows that intersect
///   the viewport.
///
/// A row intersects the viewport when `[offset, offset + height)` meets the
/// closed range `[scroll_offset, scroll_offset + viewport_extent]`. When the
/// viewport lies past the end of the content, the last row is treated as the
/// intersecting row so the window never collapses while rows exist.
pub fn compute_active_window<S: Scalar>(
    heights: &mut RowHeights<S>,
    scroll_offset: S,
    viewport_extent: S,
    overscan: usize,
) -> ActiveWindow<S> {
    let rows = heights.len();
    if rows == 0 {
        return ActiveWindow::empty();
    }

    let total_extent = heights.total();
    let view_start = scroll_offset.non_negative();
    let view_end = view_start + viewport_extent.non_negative();

    // The last row starting at or before the viewport top is the first row that
    // ends below it: row `lo + 1` (if any) starts strictly after `view_start`.
    let lo = heights.row_at_offset(view_start);
    let hi = heights
        .rows_starting_at_or_before(view_end)
        .saturating_sub(1)
        .max(lo);

    let start = lo.saturating_sub(overscan);
    let end = hi.saturating_add(1).saturating_add(overscan).min(rows);

    let before_extent = heights.offset(start);
    let end_offset = heights.offset(end);

    ActiveWindow {
        start,
        end,
        before_extent,
        after_extent: (total_extent - end_offset).non_negative(),
        total_extent,
    }
}
