// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_virtual_grid --heading-base-level=0

//! Understory Virtual Grid: row virtualization for responsive grids.
//!
//! This crate keeps the cost of showing a large item collection in a grid
//! bounded by what is visible. Items are laid out in rows of `columns` items;
//! only rows that intersect the viewport (plus a few overscan rows) are mounted,
//! and each mounted row is placed at an absolute offset so the unmounted rows
//! never need layout.
//!
//! The column count is not configured. A layout engine outside this crate
//! decides it (for example from responsive breakpoints), and the grid reads it
//! back from an invisible probe element that shares the real rows' layout class.
//!
//! The core concepts are:
//!
//! - [`ColumnDetector`]: reads the resolved column tracks from a [`LayoutProbe`]
//!   on mount and resize, keeping the last known-good count when the layout is
//!   not ready.
//! - [`RowHeights`]: per-row heights, seeded with an estimate and overwritten by
//!   measurements, with lazily recomputed cumulative offsets.
//! - [`compute_active_window`]: given a scroll offset, viewport height, and
//!   overscan rows, returns the [`ActiveWindow`] of rows to mount.
//! - [`RowVirtualizer`]: derives `ceil(items / columns)` rows, owns the height
//!   table and scroll state, and caches the active window.
//! - [`VirtualGrid`]: the host-facing controller tying detection to the
//!   virtualizer and rendering active rows into a [`Frame`].
//! - [`seen`]: an insert-only membership cache for resources already fetched.
//!
//! This crate deliberately does **not** know about widgets, the DOM, or any
//! particular UI framework. Host frameworks are responsible for:
//!
//! - Keeping the probe styled like the content rows and calling
//!   [`VirtualGrid::on_probe_resize`] when it resizes.
//! - Forwarding scroll position and viewport height via [`VirtualGrid::on_scroll`].
//! - Mounting the rows of each [`Frame`] at their `top` offset inside a container
//!   `total_height` tall, reusing nodes by [`RowKey`].
//! - Reporting each mounted row's real height back through its [`MeasureHook`].
//!
//! ## Minimal example
//!
//! ```rust
//! use std::borrow::Cow;
//! use understory_virtual_grid::{GridConfig, LayoutProbe, VirtualGrid};
//!
//! // Stand-in for a layout engine that resolved four 240px columns.
//! struct Probe;
//!
//! impl LayoutProbe for Probe {
//!     fn grid_template_columns(&self) -> Option<Cow<'_, str>> {
//!         Some(Cow::Borrowed("240px 240px 240px 240px"))
//!     }
//! }
//!
//! let items: Vec<u32> = (0..1_000).collect();
//! let mut grid: VirtualGrid<Probe> = VirtualGrid::with_probe(Probe, GridConfig::default());
//! grid.on_scroll(0.0, 900.0);
//!
//! let frame = grid.frame(&items, |item, index| (index, *item));
//! assert_eq!(grid.columns().get(), 4);
//! // 250 rows at the 320px estimate.
//! assert_eq!(frame.total_height, 80_000.0);
//! // Three rows meet the viewport and three more are overscanned below.
//! assert_eq!(frame.rows.len(), 6);
//!
//! // After layout, report the real height of the first row.
//! grid.report_measurement(frame.rows[0].measure, 280.0);
//! assert_eq!(grid.total_height(), 79_960.0);
//! ```
//!
//! ## Features
//!
//! - `std` *(default)*: enables [`seen::SharedSeenSet`] and [`seen::global`].
//! - `tracing`: emits `tracing` events for column changes, reflows, and
//!   measurements.
//!
//! Without `std` this crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

mod columns;
mod grid;
mod heights;
mod scalar;
pub mod seen;
mod trace;
mod virtualizer;
mod window;

pub use columns::{ColumnChange, ColumnDetector, LayoutProbe, count_tracks};
pub use grid::{
    DEFAULT_ESTIMATE_ROW_HEIGHT, DEFAULT_INITIAL_COLUMNS, DEFAULT_OVERSCAN, Frame, FrameRow,
    GridConfig, MeasureHook, VirtualGrid,
};
pub use heights::RowHeights;
pub use scalar::Scalar;
pub use virtualizer::{ActiveRow, RowKey, RowVirtualizer, ScrollAlign};
pub use window::{ActiveWindow, compute_active_window};
