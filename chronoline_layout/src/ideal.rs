// Copyright 2025 the Chronoline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time-proportional placement.

use alloc::vec::Vec;

#[cfg(not(any(feature = "std", test)))]
use crate::float::FloatExt;
use crate::point::TimePoint;

/// The usable horizontal range of the timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimelineSpan {
    /// Left edge (`X0`).
    pub start: f64,
    /// Width (`W`). Negative widths behave like zero.
    pub width: f64,
}

impl TimelineSpan {
    /// Creates a span.
    #[must_use]
    pub const fn new(start: f64, width: f64) -> Self {
        Self { start, width }
    }

    /// Right edge.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.start + self.width.max(0.0)
    }

    /// Center of the span.
    #[must_use]
    pub fn midpoint(&self) -> f64 {
        self.start + self.width.max(0.0) / 2.0
    }

    /// Clamps `x` into `[start, end]`.
    #[must_use]
    pub fn clamp(&self, x: f64) -> f64 {
        x.min(self.end()).max(self.start)
    }

    /// Returns `true` if `x` lies inside the span.
    #[must_use]
    pub fn contains(&self, x: f64) -> bool {
        x >= self.start && x <= self.end()
    }
}

/// Maps each point to the position its timestamp earns on `span`.
///
/// The first point lands on `span.start` and the last on `span.end()`; offsets
/// are rounded to whole units. Degenerate inputs:
/// - a single point is centered,
/// - when every timestamp is equal the points are spread evenly,
/// - no points produce no positions.
///
/// `points` must be sorted by timestamp.
#[must_use]
pub fn ideal_positions(points: &[TimePoint], span: TimelineSpan) -> Vec<f64> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Vec::new();
    };
    let width = span.width.max(0.0);
    if points.len() == 1 {
        return Vec::from([span.midpoint()]);
    }

    let range = last.timestamp.millis_since(first.timestamp);
    if range <= 0 {
        let step = width / (points.len() - 1) as f64;
        return (0..points.len())
            .map(|i| span.start + i as f64 * step)
            .collect();
    }

    points
        .iter()
        .map(|p| {
            let proportion = p.timestamp.millis_since(first.timestamp) as f64 / range as f64;
            span.start + (proportion * width).round()
        })
        .collect()
}
