// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Column detection from a live layout probe.
//!
//! The grid never decides how many columns to show. Instead the host keeps an
//! invisible, zero-height *probe* element styled with the same layout class as
//! the real rows, and [`ColumnDetector`] reads back how many column tracks the
//! layout engine resolved for it. Detection runs on mount and on every resize of
//! the probe, so container-level changes (a sidebar collapsing, a split pane
//! moving) are caught as well as window resizes.

use alloc::borrow::Cow;
use core::num::NonZeroUsize;

use crate::trace::{grid_debug, grid_trace};

/// Read access to the resolved layout of the probe element.
///
/// Implemented by the host on top of whatever layout engine places the grid.
pub trait LayoutProbe {
    /// The resolved `grid-template-columns` value of the probe, listing one
    /// size per column track (for example `"240px 240px 240px"`).
    ///
    /// Returns `None` when no resolved style is available.
    fn grid_template_columns(&self) -> Option<Cow<'_, str>>;
}

impl<P: LayoutProbe + ?Sized> LayoutProbe for &P {
    fn grid_template_columns(&self) -> Option<Cow<'_, str>> {
        (**self).grid_template_columns()
    }
}

/// Counts the column tracks listed in a resolved `grid-template-columns` value.
///
/// Whitespace separates tracks. Bracketed line names (`[sidebar-start]`) are not
/// tracks, and whitespace inside functional notation (`minmax(0px, 1fr)`) does
/// not split one. `none` and an empty value count as zero tracks.
#[must_use]
pub fn count_tracks(template: &str) -> usize {
    let template = template.trim();
    if template.is_empty() || template.eq_ignore_ascii_case("none") {
        return 0;
    }

    let mut tracks = 0;
    let mut parens = 0_usize;
    let mut in_line_names = false;
    let mut in_token = false;
    for ch in template.chars() {
        match ch {
            '[' if parens == 0 => {
                in_line_names = true;
                in_token = false;
            }
            ']' if in_line_names => in_line_names = false,
            _ if in_line_names => {}
            '(' => {
                parens += 1;
                if !in_token {
                    in_token = true;
                    tracks += 1;
                }
            }
            ')' => parens = parens.saturating_sub(1),
            c if c.is_whitespace() => {
                if parens == 0 {
                    in_token = false;
                }
            }
            _ => {
                if !in_token {
                    in_token = true;
                    tracks += 1;
                }
            }
        }
    }
    tracks
}

/// A change in the detected column count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnChange {
    /// Column count before the change.
    pub previous: NonZeroUsize,
    /// Newly detected column count.
    pub current: NonZeroUsize,
}

/// Tracks the number of columns the layout engine resolved for the probe.
///
/// The stored count is always at least one. A detection that finds zero tracks
/// means the layout is not ready yet and keeps the last known-good value.
#[derive(Debug, Clone)]
pub struct ColumnDetector<P> {
    probe: Option<P>,
    columns: NonZeroUsize,
}

impl<P: LayoutProbe> ColumnDetector<P> {
    /// Creates a detector with no probe attached.
    ///
    /// `initial` is reported until the first successful detection.
    #[must_use]
    pub const fn new(initial: NonZeroUsize) -> Self {
        Self {
            probe: None,
            columns: initial,
        }
    }

    /// Creates a detector with `probe` already attached, without detecting.
    #[must_use]
    pub const fn with_probe(probe: P, initial: NonZeroUsize) -> Self {
        Self {
            probe: Some(probe),
            columns: initial,
        }
    }

    /// The last known-good column count.
    #[must_use]
    pub const fn columns(&self) -> NonZeroUsize {
        self.columns
    }

    /// The attached probe, if any.
    #[must_use]
    pub fn probe(&self) -> Option<&P> {
        self.probe.as_ref()
    }

    /// Mutable access to the attached probe, if any.
    pub fn probe_mut(&mut self) -> Option<&mut P> {
        self.probe.as_mut()
    }

    /// Attaches a probe, returning the previous one.
    ///
    /// This does not detect; call [`ColumnDetector::on_mount`] once the probe has
    /// been laid out.
    pub fn attach(&mut self, probe: P) -> Option<P> {
        self.probe.replace(probe)
    }

    /// Detaches the probe. The column count is kept.
    pub fn detach(&mut self) -> Option<P> {
        self.probe.take()
    }

    /// Runs detection after the probe has been mounted.
    pub fn on_mount(&mut self) -> Option<ColumnChange> {
        self.detect()
    }

    /// Runs detection after the probe has been resized.
    pub fn on_resize(&mut self) -> Option<ColumnChange> {
        self.detect()
    }

    /// Reads the probe's resolved column tracks and updates the stored count.
    ///
    /// Returns the change if the count moved to a different positive value.
    /// With no probe attached, no resolved style, or zero tracks, the stored
    /// count is left untouched and `None` is returned.
    pub fn detect(&mut self) -> Option<ColumnChange> {
        let Some(probe) = self.probe.as_ref() else {
            grid_trace!("column detection skipped: probe not attached");
            return None;
        };
        let Some(template) = probe.grid_template_columns() else {
            grid_trace!("column detection skipped: probe has no resolved layout");
            return None;
        };
        let Some(current) = NonZeroUsize::new(count_tracks(&template)) else {
            grid_trace!("column detection skipped: zero tracks resolved");
            return None;
        };
        if current == self.columns {
            return None;
        }

        let previous = core::mem::replace(&mut self.columns, current);
        grid_debug!(
            previous = previous.get(),
            current = current.get(),
            "column count changed"
        );
        Some(ColumnChange { previous, current })
    }
}

#[cfg(test)]
mod tests {
    use alloc::borrow::Cow;
    use alloc::string::String;
    use core::cell::RefCell;
    use core::num::NonZeroUsize;

    use super::{ColumnChange, ColumnDetector, LayoutProbe, count_tracks};

    /// A probe whose resolved template can be swapped to simulate resizes.
    #[derive(Debug, Default)]
    struct FakeProbe {
        template: RefCell<Option<String>>,
    }

    impl FakeProbe {
        fn resolved(template: &str) -> Self {
            Self {
                template: RefCell::new(Some(template.into())),
            }
        }

        fn resize_to(&self, template: &str) {
            *self.template.borrow_mut() = Some(template.into());
        }
    }

    impl LayoutProbe for FakeProbe {
        fn grid_template_columns(&self) -> Option<Cow<'_, str>> {
            self.template.borrow().clone().map(Cow::Owned)
        }
    }

    fn cols(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn counts_plain_track_lists() {
        assert_eq!(count_tracks("240px 240px 240px"), 3);
        assert_eq!(count_tracks("  100px\t200px  "), 2);
        assert_eq!(count_tracks("1024px"), 1);
    }

    #[test]
    fn empty_and_none_count_as_zero() {
        assert_eq!(count_tracks(""), 0);
        assert_eq!(count_tracks("   "), 0);
        assert_eq!(count_tracks("none"), 0);
    }

    #[test]
    fn line_names_and_functions_are_not_split() {
        assert_eq!(count_tracks("[full-start] 100px [main-start] 200px [end]"), 2);
        assert_eq!(count_tracks("minmax(0px, 1fr) minmax(0px, 1fr)"), 2);
        assert_eq!(count_tracks("fit-content( 40% ) 10px"), 2);
    }

    #[test]
    fn detects_on_mount_and_resize() {
        let probe = FakeProbe::resolved("300px 300px 300px 300px");
        let mut detector = ColumnDetector::with_probe(&probe, cols(3));

        assert_eq!(
            detector.on_mount(),
            Some(ColumnChange {
                previous: cols(3),
                current: cols(4),
            })
        );
        assert_eq!(detector.columns(), cols(4));

        // Same layout: no change reported.
        assert_eq!(detector.on_resize(), None);

        probe.resize_to("500px 500px");
        let change = detector.on_resize().unwrap();
        assert_eq!(change.previous, cols(4));
        assert_eq!(change.current, cols(2));
    }

    #[test]
    fn zero_tracks_keep_the_previous_count() {
        let probe = FakeProbe::resolved("200px 200px");
        let mut detector = ColumnDetector::with_probe(&probe, cols(3));
        detector.detect();
        assert_eq!(detector.columns(), cols(2));

        probe.resize_to("none");
        assert_eq!(detector.detect(), None);
        assert_eq!(detector.columns(), cols(2));

        probe.resize_to("");
        assert_eq!(detector.detect(), None);
        assert_eq!(detector.columns(), cols(2));
    }

    #[test]
    fn missing_probe_is_a_no_op() {
        let mut detector = ColumnDetector::<FakeProbe>::new(cols(3));
        assert_eq!(detector.detect(), None);
        assert_eq!(detector.columns(), cols(3));

        detector.attach(FakeProbe::default());
        assert_eq!(detector.detect(), None, "unresolved layout is ignored");

        detector.probe_mut().unwrap().resize_to("1fr");
        assert!(detector.detect().is_some());
        assert_eq!(detector.columns(), cols(1));

        assert!(detector.detach().is_some());
        assert_eq!(detector.on_resize(), None);
        assert_eq!(detector.columns(), cols(1));
    }
}
