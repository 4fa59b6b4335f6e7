// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Logging shims that forward to `tracing` when the `tracing` feature is enabled.
//!
//! Without the feature the macros expand to nothing, so call sites never pay
//! for formatting or field capture.

macro_rules! grid_debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        {
            tracing::debug!(target: "understory_virtual_grid", $($arg)*);
        }
    };
}

macro_rules! grid_trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        {
            tracing::trace!(target: "understory_virtual_grid", $($arg)*);
        }
    };
}

pub(crate) use grid_debug;
pub(crate) use grid_trace;
