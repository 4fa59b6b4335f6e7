// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-row height table with estimate seeding and a lazily-maintained prefix sum.

use alloc::vec::Vec;

use crate::Scalar;

/// Heights of every row in the grid, estimated until measured.
///
/// New rows are seeded with the current estimate. Measurements overwrite the
/// estimate for a single row and mark cumulative offsets dirty for every row
/// after it; offsets are recomputed lazily the next time they are queried, so a
/// burst of measurements costs one prefix-sum pass.
///
/// Heights are keyed by row index only. When the items occupying a row change
/// (reordering, filtering), the stored measurement is kept until the host
/// reports a new one.
#[derive(Clone, Debug)]
pub struct RowHeights<S: Scalar> {
    estimate: S,
    heights: Vec<S>,
    measured: Vec<bool>,
    starts: Vec<S>,
    dirty_from: Option<usize>,
}

impl<S: Scalar> RowHeights<S> {
    /// Creates an empty table that seeds new rows with `estimate`.
    #[must_use]
    pub fn new(estimate: S) -> Self {
        Self {
            estimate: sanitize(estimate),
            heights: Vec::new(),
            measured: Vec::new(),
            starts: Vec::new(),
            dirty_from: None,
        }
    }

    /// Number of rows in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// Returns `true` if the table holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Height used for rows that have not been measured yet.
    #[must_use]
    pub fn estimate(&self) -> S {
        self.estimate
    }

    /// Resizes the table to `len` rows.
    ///
    /// Rows past `len` are discarded together with their measurements. New rows
    /// start at the current estimate. Existing rows below `len` keep their heights.
    pub fn set_len(&mut self, len: usize) {
        let old = self.heights.len();
        if len == old {
            return;
        }
        self.heights.resize(len, self.estimate);
        self.measured.resize(len, false);
        self.starts.resize(len, S::zero());
        if len > old {
            self.mark_dirty(old);
        } else if self.dirty_from.is_some_and(|d| d >= len) {
            self.dirty_from = None;
        }
    }

    /// Replaces the estimate and re-seeds every unmeasured row with it.
    pub fn set_estimate(&mut self, estimate: S) {
        let estimate = sanitize(estimate);
        self.estimate = estimate;
        let mut first_changed = None;
        for (row, (height, measured)) in self.heights.iter_mut().zip(&self.measured).enumerate() {
            if !*measured && *height != estimate {
                *height = estimate;
                first_changed = first_changed.or(Some(row));
            }
        }
        if let Some(row) = first_changed {
            self.mark_dirty(row + 1);
        }
    }

    /// Forgets every measurement, returning all rows to the estimate.
    pub fn invalidate(&mut self) {
        self.heights.fill(self.estimate);
        self.measured.fill(false);
        self.mark_dirty(0);
    }

    /// Records the measured height of `row`.
    ///
    /// Returns `true` if the stored height changed. Rows outside the table are
    /// ignored and return `false`; reporting the same height twice is a no-op.
    pub fn measure(&mut self, row: usize, height: S) -> bool {
        let height = sanitize(height);
        let Some(slot) = self.heights.get_mut(row) else {
            return false;
        };
        self.measured[row] = true;
        if *slot == height {
            return false;
        }
        *slot = height;
        // Only rows after `row` move.
        self.mark_dirty(row + 1);
        true
    }

    /// Returns `true` if `row` holds a measured (rather than estimated) height.
    #[must_use]
    pub fn is_measured(&self, row: usize) -> bool {
        self.measured.get(row).copied().unwrap_or(false)
    }

    /// Height of `row`, or `None` if the row does not exist.
    #[must_use]
    pub fn height(&self, row: usize) -> Option<S> {
        self.heights.get(row).copied()
    }

    /// Offset of the top of `row` from the top of the grid.
    ///
    /// `offset(len())` is the total height; larger indices clamp to it.
    pub fn offset(&mut self, row: usize) -> S {
        let len = self.heights.len();
        if row == 0 || len == 0 {
            return S::zero();
        }
        if row >= len {
            return self.total();
        }
        self.ensure_prefix_through(row);
        self.starts[row]
    }

    /// Sum of all row heights, measured or estimated.
    pub fn total(&mut self) -> S {
        let Some(last) = self.heights.len().checked_sub(1) else {
            return S::zero();
        };
        self.ensure_prefix_through(last);
        self.starts[last] + self.heights[last]
    }

    /// Number of rows whose top is at or before `offset`.
    ///
    /// Rows are ordered by offset, so `rows_starting_at_or_before(y) - 1` is the
    /// last row that begins at or above `y`.
    pub fn rows_starting_at_or_before(&mut self, offset: S) -> usize {
        let len = self.heights.len();
        if len == 0 {
            return 0;
        }
        self.ensure_prefix_through(len - 1);
        self.starts.partition_point(|start| *start <= offset)
    }

    /// The row containing `offset`, clamped into `0..len()`.
    ///
    /// Returns `0` for an empty table.
    pub fn row_at_offset(&mut self, offset: S) -> usize {
        self.rows_starting_at_or_before(offset.non_negative())
            .saturating_sub(1)
    }

    fn mark_dirty(&mut self, from: usize) {
        if from >= self.heights.len() {
            return;
        }
        self.dirty_from = Some(self.dirty_from.map_or(from, |d| d.min(from)));
    }

    fn ensure_prefix_through(&mut self, through: usize) {
        let len = self.heights.len();
        let dirty_from = match self.dirty_from {
            Some(d) if d <= through && through < len => d,
            _ => return,
        };

        let mut pos = if dirty_from == 0 {
            S::zero()
        } else {
            self.starts[dirty_from - 1] + self.heights[dirty_from - 1]
        };
        for row in dirty_from..=through {
            self.starts[row] = pos;
            pos = pos + self.heights[row];
        }

        self.dirty_from = if through + 1 < len {
            Some(through + 1)
        } else {
            None
        };
    }
}

fn sanitize<S: Scalar>(height: S) -> S {
    debug_assert!(
        height.is_finite(),
        "row heights must be finite; got {height:?}"
    );
    height.non_negative()
}
