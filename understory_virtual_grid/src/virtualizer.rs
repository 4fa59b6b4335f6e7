// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row virtualization over a flat item sequence laid out in columns.

use core::num::NonZeroUsize;
use core::ops::Range;

use crate::trace::{grid_debug, grid_trace};
use crate::{ActiveWindow, RowHeights, Scalar, compute_active_window};

/// Where a row lands in the viewport after [`RowVirtualizer::scroll_to_row`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAlign {
    /// Row top at the viewport top.
    Start,
    /// Row midpoint at the viewport midpoint.
    Center,
    /// Row bottom at the viewport bottom.
    End,
    /// Keep the offset if the row is already fully shown; otherwise use
    /// `Start` for rows above the viewport and `End` for rows below it.
    Nearest,
}

/// Stable identity of a mounted row.
///
/// Keys are row indices, so a row keeps its key across scroll events and
/// measurements, and hosts can reuse the mounted node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowKey(pub usize);

/// A row that must be mounted, with its position and the items it holds.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveRow<S: Scalar> {
    /// Row index.
    pub index: usize,
    /// Stable identity for the host's mounted node.
    pub key: RowKey,
    /// Absolute top offset of the row.
    pub top: S,
    /// Current height of the row, measured or estimated.
    pub height: S,
    /// Indices of the items in this row.
    pub items: Range<usize>,
}

/// Windowing state for a grid whose rows are `columns` items wide.
///
/// This type:
/// - derives the row count from the item count and column count,
/// - owns the [`RowHeights`] table, seeding estimates and accepting measurements,
/// - stores scroll offset, viewport height, and overscan (in rows),
/// - caches the last computed [`ActiveWindow`] until any input changes.
///
/// Hosts feed it the detected column count, scroll/viewport changes, and the
/// measured height of each mounted row.
#[derive(Debug, Clone)]
pub struct RowVirtualizer<S: Scalar> {
    item_count: usize,
    columns: NonZeroUsize,
    heights: RowHeights<S>,
    overscan: usize,
    scroll_offset: S,
    viewport_extent: S,

    dirty: bool,
    last_window: ActiveWindow<S>,
}

impl<S: Scalar> RowVirtualizer<S> {
    /// Creates an empty virtualizer with one column.
    ///
    /// `estimate` seeds the height of every row until it is measured.
    /// `overscan` is the number of extra rows mounted above and below the
    /// viewport.
    #[must_use]
    pub fn new(estimate: S, overscan: usize) -> Self {
        Self {
            item_count: 0,
            columns: NonZeroUsize::MIN,
            heights: RowHeights::new(estimate),
            overscan,
            scroll_offset: S::zero(),
            viewport_extent: S::zero(),
            dirty: true,
            last_window: ActiveWindow::empty(),
        }
    }

    /// Number of items in the sequence.
    #[must_use]
    pub const fn item_count(&self) -> usize {
        self.item_count
    }

    /// Number of items per row.
    #[must_use]
    pub const fn columns(&self) -> NonZeroUsize {
        self.columns
    }

    /// Number of rows: `ceil(item_count / columns)`.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.heights.len()
    }

    /// Sets the number of items and reflows rows.
    pub fn set_item_count(&mut self, item_count: usize) {
        if item_count != self.item_count {
            self.item_count = item_count;
            self.reflow();
        }
    }

    /// Sets the number of items per row and reflows rows.
    ///
    /// A count of zero is treated as one.
    pub fn set_columns(&mut self, columns: usize) {
        let columns = NonZeroUsize::new(columns).unwrap_or(NonZeroUsize::MIN);
        if columns != self.columns {
            self.columns = columns;
            self.reflow();
        }
    }

    /// Recomputes the row count from the current item and column counts.
    ///
    /// Rows past the new count are dropped from the height table; rows below it
    /// keep their measured heights.
    fn reflow(&mut self) {
        let rows = self.item_count.div_ceil(self.columns.get());
        grid_debug!(
            items = self.item_count,
            columns = self.columns.get(),
            rows,
            "reflow"
        );
        self.heights.set_len(rows);
        self.dirty = true;
    }

    /// Height used for rows that have not been measured.
    #[must_use]
    pub fn estimate(&self) -> S {
        self.heights.estimate()
    }

    /// Replaces the estimate; unmeasured rows adopt it immediately.
    pub fn set_estimate(&mut self, estimate: S) {
        self.heights.set_estimate(estimate);
        self.dirty = true;
    }

    /// Forgets every measured height.
    pub fn invalidate_measurements(&mut self) {
        self.heights.invalidate();
        self.dirty = true;
    }

    /// Number of extra rows mounted on each side of the viewport.
    #[must_use]
    pub const fn overscan(&self) -> usize {
        self.overscan
    }

    /// Sets the number of extra rows mounted on each side of the viewport.
    pub fn set_overscan(&mut self, overscan: usize) {
        if overscan != self.overscan {
            self.overscan = overscan;
            self.dirty = true;
        }
    }

    /// Returns the current scroll offset.
    #[must_use]
    pub const fn scroll_offset(&self) -> S {
        self.scroll_offset
    }

    /// Sets the scroll offset.
    pub fn set_scroll_offset(&mut self, offset: S) {
        let offset = offset.non_negative();
        if offset != self.scroll_offset {
            self.scroll_offset = offset;
            self.dirty = true;
        }
    }

    /// Adjusts the scroll offset by `delta`.
    pub fn scroll_by(&mut self, delta: S) {
        self.set_scroll_offset(self.scroll_offset + delta);
    }

    /// Returns the current viewport height.
    #[must_use]
    pub const fn viewport_extent(&self) -> S {
        self.viewport_extent
    }

    /// Sets the viewport height.
    pub fn set_viewport_extent(&mut self, extent: S) {
        let extent = extent.non_negative();
        if extent != self.viewport_extent {
            self.viewport_extent = extent;
            self.dirty = true;
        }
    }

    /// Records the measured height of a mounted row.
    ///
    /// Returns `true` if the height changed, in which case offsets of all later
    /// rows and the total height move with it. Reports for rows that no longer
    /// exist are dropped.
    pub fn measure(&mut self, row: usize, height: S) -> bool {
        if row >= self.heights.len() {
            grid_trace!(row, rows = self.heights.len(), "dropped stale measurement");
            return false;
        }
        let changed = self.heights.measure(row, height);
        if changed {
            grid_trace!(row, height = ?height, "row measured");
            self.dirty = true;
        }
        changed
    }

    /// Height of `row`, measured or estimated.
    #[must_use]
    pub fn height_of(&self, row: usize) -> Option<S> {
        self.heights.height(row)
    }

    /// Returns `true` if `row` has been measured.
    #[must_use]
    pub fn is_measured(&self, row: usize) -> bool {
        self.heights.is_measured(row)
    }

    /// Absolute top offset of `row`.
    ///
    /// `offset_of(row_count())` is the total height; larger rows clamp to it.
    pub fn offset_of(&mut self, row: usize) -> S {
        self.heights.offset(row)
    }

    /// Total scrollable height: the sum of every row's height.
    pub fn total_height(&mut self) -> S {
        self.heights.total()
    }

    /// Indices of the items in `row`, clamped to the item count.
    #[must_use]
    pub fn items_in_row(&self, row: usize) -> Range<usize> {
        row_items(row, self.columns, self.item_count)
    }

    /// Row that holds item `index`.
    #[must_use]
    pub const fn row_of_item(&self, index: usize) -> usize {
        index / self.columns.get()
    }

    /// Computes or returns the cached active window.
    #[must_use]
    pub fn active_window(&mut self) -> ActiveWindow<S> {
        if self.dirty {
            self.last_window = compute_active_window(
                &mut self.heights,
                self.scroll_offset,
                self.viewport_extent,
                self.overscan,
            );
            self.dirty = false;
        }
        self.last_window
    }

    /// The rows of the active window with their positions and item ranges.
    pub fn active_rows(&mut self) -> impl Iterator<Item = ActiveRow<S>> + '_ {
        let window = self.active_window();
        let columns = self.columns;
        let item_count = self.item_count;
        let heights = &mut self.heights;
        window.rows().map(move |index| ActiveRow {
            index,
            key: RowKey(index),
            top: heights.offset(index),
            height: heights.height(index).unwrap_or_else(S::zero),
            items: row_items(index, columns, item_count),
        })
    }

    /// Returns `true` if `row` lies entirely within the viewport.
    #[must_use]
    pub fn is_row_fully_visible(&mut self, row: usize) -> bool {
        let Some(height) = self.heights.height(row) else {
            return false;
        };
        let top = self.heights.offset(row);
        let view_end = self.scroll_offset + self.viewport_extent;
        top >= self.scroll_offset && top + height <= view_end
    }

    /// Returns `true` if `row` overlaps the viewport at all.
    #[must_use]
    pub fn is_row_partially_visible(&mut self, row: usize) -> bool {
        let Some(height) = self.heights.height(row) else {
            return false;
        };
        let top = self.heights.offset(row);
        let view_end = self.scroll_offset + self.viewport_extent;
        top + height > self.scroll_offset && top < view_end
    }

    /// Clamps the scroll offset so the viewport stays within the content.
    pub fn clamp_scroll_to_content(&mut self) {
        let total = self.heights.total();
        let max_offset = (total - self.viewport_extent).non_negative();
        if self.scroll_offset > max_offset {
            self.set_scroll_offset(max_offset);
        }
    }

    /// Scrolls so that `row` is brought into view using the given alignment.
    pub fn scroll_to_row(&mut self, row: usize, align: ScrollAlign) {
        let rows = self.heights.len();
        if rows == 0 {
            self.set_scroll_offset(S::zero());
            return;
        }
        let row = row.min(rows - 1);
        let top = self.heights.offset(row);
        let bottom = top + self.heights.height(row).unwrap_or_else(S::zero);
        let viewport = self.viewport_extent;

        let offset = match align {
            ScrollAlign::Start => top,
            ScrollAlign::End => (bottom - viewport).non_negative(),
            ScrollAlign::Center => {
                let half = S::from_usize(2);
                ((top + bottom) / half - viewport / half).non_negative()
            }
            ScrollAlign::Nearest => {
                let current = self.scroll_offset;
                if top >= current && bottom <= current + viewport {
                    current
                } else if top < current {
                    top
                } else {
                    (bottom - viewport).non_negative()
                }
            }
        };
        self.set_scroll_offset(offset);
    }

    /// Scrolls so that the row holding item `index` is brought into view.
    pub fn scroll_to_item(&mut self, index: usize, align: ScrollAlign) {
        self.scroll_to_row(self.row_of_item(index), align);
    }
}

fn row_items(row: usize, columns: NonZeroUsize, item_count: usize) -> Range<usize> {
    let start = row.saturating_mul(columns.get()).min(item_count);
    let end = start.saturating_add(columns.get()).min(item_count);
    start..end
}
