// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-facing controller that wires column detection into row virtualization.

use alloc::borrow::Cow;
use alloc::vec::Vec;
use core::num::NonZeroUsize;

use crate::{
    ActiveWindow, ColumnChange, ColumnDetector, LayoutProbe, RowKey, RowVirtualizer, Scalar,
    ScrollAlign,
};

/// Default estimated row height, in whole layout units (typically logical pixels).
///
/// Stored as an integer so one constant serves every [`Scalar`]; it is
/// converted with [`Scalar::from_usize`].
pub const DEFAULT_ESTIMATE_ROW_HEIGHT: usize = 320;

/// Default number of overscan rows on each side of the viewport.
pub const DEFAULT_OVERSCAN: usize = 3;

/// Default column count used until the probe reports a layout.
pub const DEFAULT_INITIAL_COLUMNS: NonZeroUsize = NonZeroUsize::new(3).unwrap();

/// Construction options for a [`VirtualGrid`].
#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig<S: Scalar> {
    /// Height assumed for rows that have not been measured yet.
    ///
    /// Should include any gap the host adds below each row, since measurements
    /// will include it too.
    pub estimate_row_height: S,
    /// Extra rows mounted above and below the viewport.
    pub overscan: usize,
    /// Column count used until the first successful detection.
    pub initial_columns: NonZeroUsize,
    /// Layout class applied to both the probe and every content row, so the
    /// probe resolves the same column tracks as the real content.
    pub layout_class: Cow<'static, str>,
    /// Class for the per-row wrapper, for example bottom padding that acts as
    /// the row gap.
    pub row_class: Cow<'static, str>,
}

impl<S: Scalar> Default for GridConfig<S> {
    fn default() -> Self {
        Self {
            estimate_row_height: S::from_usize(DEFAULT_ESTIMATE_ROW_HEIGHT),
            overscan: DEFAULT_OVERSCAN,
            initial_columns: DEFAULT_INITIAL_COLUMNS,
            layout_class: Cow::Borrowed(""),
            row_class: Cow::Borrowed(""),
        }
    }
}

impl<S: Scalar> GridConfig<S> {
    /// Sets the estimated row height.
    #[must_use]
    pub fn with_estimate_row_height(mut self, estimate: S) -> Self {
        self.estimate_row_height = estimate;
        self
    }

    /// Sets the number of overscan rows.
    #[must_use]
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    /// Sets the column count used before the first detection.
    #[must_use]
    pub fn with_initial_columns(mut self, columns: NonZeroUsize) -> Self {
        self.initial_columns = columns;
        self
    }

    /// Sets the layout class shared by the probe and the content rows.
    #[must_use]
    pub fn with_layout_class(mut self, class: impl Into<Cow<'static, str>>) -> Self {
        self.layout_class = class.into();
        self
    }

    /// Sets the per-row wrapper class.
    #[must_use]
    pub fn with_row_class(mut self, class: impl Into<Cow<'static, str>>) -> Self {
        self.row_class = class.into();
        self
    }
}

/// Token a host hands back once a mounted row has been sized.
///
/// See [`VirtualGrid::report_measurement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeasureHook {
    row: usize,
}

impl MeasureHook {
    /// The row this hook measures.
    #[must_use]
    pub const fn row(&self) -> usize {
        self.row
    }
}

/// A mounted row with its rendered cells.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRow<S: Scalar, R> {
    /// Stable identity for the host's row node.
    pub key: RowKey,
    /// Row index.
    pub index: usize,
    /// Absolute top offset of the row.
    pub top: S,
    /// Hook to report the row's real height once it is laid out.
    pub measure: MeasureHook,
    /// Rendered items, in column order.
    pub cells: Vec<R>,
}

/// Everything the host needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<S: Scalar, R> {
    /// Height of the scrollable content, counting unmounted rows.
    pub total_height: S,
    /// Rows to mount, top to bottom.
    pub rows: Vec<FrameRow<S, R>>,
}

/// A row-virtualized grid whose column count comes from a live layout probe.
///
/// Event flow:
/// - [`VirtualGrid::on_probe_mount`] / [`VirtualGrid::on_probe_resize`] re-detect
///   the column count and reflow rows when it changes.
/// - [`VirtualGrid::on_scroll`] updates the scroll position and viewport height.
/// - [`VirtualGrid::report_measurement`] records a mounted row's real height.
/// - [`VirtualGrid::frame`] slices the items into the active rows and renders them.
///
/// All of these are synchronous and cheap; the active window is recomputed
/// lazily on the next query after any input changed.
#[derive(Debug)]
pub struct VirtualGrid<P, S: Scalar = f64> {
    detector: ColumnDetector<P>,
    rows: RowVirtualizer<S>,
    layout_class: Cow<'static, str>,
    row_class: Cow<'static, str>,
}

impl<P: LayoutProbe, S: Scalar> VirtualGrid<P, S> {
    /// Creates a grid with no probe attached.
    #[must_use]
    pub fn new(config: GridConfig<S>) -> Self {
        let GridConfig {
            estimate_row_height,
            overscan,
            initial_columns,
            layout_class,
            row_class,
        } = config;
        let mut rows = RowVirtualizer::new(estimate_row_height, overscan);
        rows.set_columns(initial_columns.get());
        Self {
            detector: ColumnDetector::new(initial_columns),
            rows,
            layout_class,
            row_class,
        }
    }

    /// Creates a grid with `probe` attached and runs the initial detection.
    #[must_use]
    pub fn with_probe(probe: P, config: GridConfig<S>) -> Self {
        let mut grid = Self::new(config);
        grid.attach_probe(probe);
        grid
    }

    /// Attaches the probe and runs detection as on mount.
    pub fn attach_probe(&mut self, probe: P) -> Option<ColumnChange> {
        self.detector.attach(probe);
        self.on_probe_mount()
    }

    /// Detaches the probe. The last detected column count stays in effect.
    pub fn detach_probe(&mut self) -> Option<P> {
        self.detector.detach()
    }

    /// The column detector.
    #[must_use]
    pub fn detector(&self) -> &ColumnDetector<P> {
        &self.detector
    }

    /// The row virtualizer.
    #[must_use]
    pub fn virtualizer(&self) -> &RowVirtualizer<S> {
        &self.rows
    }

    /// Mutable access to the row virtualizer, for scrolling helpers and
    /// estimate changes.
    ///
    /// The column count is owned by the detector: a column count set here is
    /// replaced by the detected one on the next probe event or frame.
    pub fn virtualizer_mut(&mut self) -> &mut RowVirtualizer<S> {
        &mut self.rows
    }

    /// Layout class the host applies to the probe and every content row.
    #[must_use]
    pub fn layout_class(&self) -> &str {
        &self.layout_class
    }

    /// Class the host applies to each row wrapper.
    #[must_use]
    pub fn row_class(&self) -> &str {
        &self.row_class
    }

    /// Current column count, as last detected.
    #[must_use]
    pub fn columns(&self) -> NonZeroUsize {
        self.detector.columns()
    }

    /// Runs column detection after the probe is mounted.
    pub fn on_probe_mount(&mut self) -> Option<ColumnChange> {
        let change = self.detector.on_mount();
        self.apply(change)
    }

    /// Runs column detection after the probe is resized.
    pub fn on_probe_resize(&mut self) -> Option<ColumnChange> {
        let change = self.detector.on_resize();
        self.apply(change)
    }

    fn apply(&mut self, change: Option<ColumnChange>) -> Option<ColumnChange> {
        self.sync_columns();
        change
    }

    /// The detector owns the column count; rows always follow it.
    fn sync_columns(&mut self) {
        self.rows.set_columns(self.detector.columns().get());
    }

    /// Updates the scroll position and viewport height.
    pub fn on_scroll(&mut self, scroll_offset: S, viewport_extent: S) {
        self.rows.set_scroll_offset(scroll_offset);
        self.rows.set_viewport_extent(viewport_extent);
    }

    /// Sets the number of items without rendering a frame.
    pub fn set_item_count(&mut self, item_count: usize) {
        self.rows.set_item_count(item_count);
    }

    /// Records the real height of a mounted row.
    ///
    /// Returns `true` if offsets changed. Hooks for rows that no longer exist
    /// are ignored.
    pub fn report_measurement(&mut self, hook: MeasureHook, height: S) -> bool {
        self.rows.measure(hook.row, height)
    }

    /// Total scrollable height.
    pub fn total_height(&mut self) -> S {
        self.rows.total_height()
    }

    /// The current active window.
    pub fn active_window(&mut self) -> ActiveWindow<S> {
        self.rows.active_window()
    }

    /// Scrolls the row holding item `index` into view.
    pub fn scroll_to_item(&mut self, index: usize, align: ScrollAlign) -> S {
        self.rows.scroll_to_item(index, align);
        self.rows.scroll_offset()
    }

    /// Builds the rows to mount for `items`.
    ///
    /// The item count is synchronized with `items.len()` first. `render` is
    /// called with each item of every active row and the item's index in
    /// `items`.
    pub fn frame<T, R>(
        &mut self,
        items: &[T],
        mut render: impl FnMut(&T, usize) -> R,
    ) -> Frame<S, R> {
        self.sync_columns();
        self.rows.set_item_count(items.len());
        let total_height = self.rows.total_height();
        let rows = self
            .rows
            .active_rows()
            .map(|row| {
                let start = row.items.start;
                let cells = items
                    .get(row.items)
                    .unwrap_or_default()
                    .iter()
                    .enumerate()
                    .map(|(i, item)| render(item, start + i))
                    .collect();
                FrameRow {
                    key: row.key,
                    index: row.index,
                    top: row.top,
                    measure: MeasureHook { row: row.index },
                    cells,
                }
            })
            .collect();
        Frame { total_height, rows }
    }
}

#[cfg(test)]
mod tests {
    use alloc::borrow::Cow;
    use alloc::format;
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::cell::Cell;
    use core::num::NonZeroUsize;

    use super::{GridConfig, MeasureHook, VirtualGrid};
    use crate::{LayoutProbe, ScrollAlign};

    /// Resolves `columns` equal tracks, or nothing while `columns` is zero.
    #[derive(Debug, Default)]
    struct TrackProbe {
        columns: Cell<usize>,
    }

    impl TrackProbe {
        fn with_columns(columns: usize) -> Self {
            Self {
                columns: Cell::new(columns),
            }
        }
    }

    impl LayoutProbe for TrackProbe {
        fn grid_template_columns(&self) -> Option<Cow<'_, str>> {
            let tracks: Vec<&str> = (0..self.columns.get()).map(|_| "240px").collect();
            Some(Cow::Owned(tracks.join(" ")))
        }
    }

    fn config() -> GridConfig<f64> {
        GridConfig::default()
            .with_estimate_row_height(100.0)
            .with_overscan(0)
    }

    #[test]
    fn defaults_match_the_documented_values() {
        let config = GridConfig::<f64>::default();
        assert_eq!(config.estimate_row_height, 320.0);
        assert_eq!(config.overscan, 3);
        assert_eq!(config.initial_columns.get(), 3);

        let config = config
            .with_layout_class("grid-cols-2 md:grid-cols-4")
            .with_row_class(String::from("pb-14"));
        let grid = VirtualGrid::<TrackProbe>::new(config);
        assert_eq!(grid.layout_class(), "grid-cols-2 md:grid-cols-4");
        assert_eq!(grid.row_class(), "pb-14");
        assert_eq!(grid.columns().get(), 3);
    }

    #[test]
    fn frame_slices_items_into_active_rows() {
        let probe = TrackProbe::with_columns(4);
        let mut grid = VirtualGrid::with_probe(&probe, config());
        assert_eq!(grid.columns().get(), 4);
        grid.on_scroll(0.0, 150.0);

        let items: Vec<u32> = (0..10).collect();
        let frame = grid.frame(&items, |item, index| format!("{index}:{item}"));

        assert_eq!(frame.total_height, 300.0);
        assert_eq!(frame.rows.len(), 2);
        assert_eq!(frame.rows[0].cells, ["0:0", "1:1", "2:2", "3:3"]);
        assert_eq!(frame.rows[1].top, 100.0);
        assert_eq!(frame.rows[1].cells[0], "4:4");
    }

    #[test]
    fn last_row_holds_the_remainder() {
        let probe = TrackProbe::with_columns(3);
        let mut grid = VirtualGrid::with_probe(&probe, config());
        grid.on_scroll(0.0, 1_000.0);

        let items: Vec<u32> = (0..10).collect();
        let frame = grid.frame(&items, |item, _| *item);
        let sizes: Vec<usize> = frame.rows.iter().map(|r| r.cells.len()).collect();
        assert_eq!(sizes, [3, 3, 3, 1]);
        assert_eq!(frame.rows[3].cells, [9]);
    }

    #[test]
    fn probe_resize_reflows_and_drops_stale_rows() {
        let probe = TrackProbe::with_columns(3);
        let mut grid = VirtualGrid::with_probe(&probe, config());
        grid.on_scroll(0.0, 1_000.0);
        let items: Vec<u32> = (0..10).collect();

        let frame = grid.frame(&items, |item, _| *item);
        let hooks: Vec<MeasureHook> = frame.rows.iter().map(|r| r.measure).collect();
        assert_eq!(hooks.len(), 4);
        for hook in &hooks {
            grid.report_measurement(*hook, 120.0);
        }
        assert_eq!(grid.total_height(), 480.0);

        probe.columns.set(5);
        let change = grid.on_probe_resize().unwrap();
        assert_eq!(change.current.get(), 5);
        assert_eq!(grid.virtualizer().row_count(), 2);
        assert_eq!(grid.total_height(), 240.0);

        // Hooks from the old layout that point past the new rows are ignored.
        assert!(!grid.report_measurement(hooks[3], 500.0));
        assert_eq!(grid.total_height(), 240.0);

        let frame = grid.frame(&items, |item, _| *item);
        assert_eq!(frame.rows.len(), 2);
        assert_eq!(frame.rows[1].cells, [5, 6, 7, 8, 9]);
    }

    #[test]
    fn rows_follow_the_detected_columns_after_a_manual_override() {
        let probe = TrackProbe::with_columns(4);
        let mut grid = VirtualGrid::with_probe(&probe, config());
        grid.on_scroll(0.0, 1_000.0);
        let items: Vec<u32> = (0..8).collect();

        grid.virtualizer_mut().set_columns(7);
        let frame = grid.frame(&items, |item, _| *item);
        let sizes: Vec<usize> = frame.rows.iter().map(|r| r.cells.len()).collect();
        assert_eq!(sizes, [4, 4]);

        grid.virtualizer_mut().set_columns(7);
        assert_eq!(grid.on_probe_resize(), None);
        assert_eq!(grid.columns().get(), 4);
        assert_eq!(grid.virtualizer().row_count(), 2);
    }

    #[test]
    fn unresolved_probe_keeps_the_last_column_count() {
        let probe = TrackProbe::with_columns(2);
        let mut grid = VirtualGrid::with_probe(&probe, config());
        assert_eq!(grid.columns().get(), 2);

        probe.columns.set(0);
        assert_eq!(grid.on_probe_resize(), None);
        assert_eq!(grid.columns().get(), 2);

        assert!(grid.detach_probe().is_some());
        assert_eq!(grid.on_probe_resize(), None);
        assert_eq!(grid.columns().get(), 2);
    }

    #[test]
    fn measurements_move_rows_in_the_next_frame() {
        let probe = TrackProbe::with_columns(2);
        let mut grid = VirtualGrid::with_probe(&probe, config());
        grid.on_scroll(0.0, 250.0);
        let items: Vec<u32> = (0..20).collect();

        let frame = grid.frame(&items, |_, index| index);
        assert_eq!(frame.rows.len(), 3);
        assert!(grid.report_measurement(frame.rows[0].measure, 260.0));

        let frame = grid.frame(&items, |_, index| index);
        assert_eq!(frame.total_height, 1_160.0);
        assert_eq!(frame.rows.len(), 1);
        assert_eq!(frame.rows[0].key, crate::RowKey(0));
    }

    #[test]
    fn empty_items_render_nothing() {
        let probe = TrackProbe::with_columns(3);
        let mut grid = VirtualGrid::with_probe(&probe, config());
        grid.on_scroll(0.0, 800.0);
        let items: [u8; 0] = [];
        let frame = grid.frame(&items, |item, _| *item);
        assert!(frame.rows.is_empty());
        assert_eq!(frame.total_height, 0.0);
    }

    #[test]
    fn scroll_to_item_targets_its_row() {
        let probe = TrackProbe::with_columns(4);
        let mut grid = VirtualGrid::with_probe(&probe, config());
        grid.set_item_count(40);
        grid.on_scroll(0.0, 200.0);
        assert_eq!(grid.scroll_to_item(21, ScrollAlign::Start), 500.0);
        assert_eq!(grid.active_window().rows(), 5..8);
        assert_eq!(
            grid.detector().columns(),
            NonZeroUsize::new(4).unwrap()
        );
    }
}
