// Copyright 2025 the Chronoline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Temporal cluster detection.
//!
//! A timeline's opening events are often crammed into a few hours while the
//! rest spread over days. Those opening points get special treatment: the
//! optimizer searches callout heights for them, and the solver lets their text
//! blocks crowd each other so they stay near their true positions.

use crate::point::{MILLIS_PER_HOUR, TimePoint};

/// Largest gap from the first point that still counts as clustered.
pub const CLUSTER_THRESHOLD_MILLIS: i64 = 2 * MILLIS_PER_HOUR;

/// How many points of a pair belong to the cluster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PairMembership {
    /// Both points are clustered.
    Both,
    /// Exactly one point is clustered.
    One,
    /// Neither point is clustered.
    Neither,
}

/// The clustered prefix `[0, size)` of a sorted point list.
///
/// Membership is measured from point 0 only: a point joins when it lies
/// within [`CLUSTER_THRESHOLD_MILLIS`] of the first point, no matter how close
/// it is to its neighbors. Computed once per layout and handed to every phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClusterScope {
    size: usize,
}

impl ClusterScope {
    /// Detects the cluster with the standard two-hour threshold.
    #[must_use]
    pub fn detect(points: &[TimePoint]) -> Self {
        Self::detect_with_threshold(points, CLUSTER_THRESHOLD_MILLIS)
    }

    /// Detects the cluster with a custom threshold in milliseconds.
    ///
    /// Non-empty input always yields a size of at least one.
    #[must_use]
    pub fn detect_with_threshold(points: &[TimePoint], threshold_millis: i64) -> Self {
        let Some(first) = points.first() else {
            return Self { size: 0 };
        };
        let size = points
            .iter()
            .take_while(|p| p.timestamp.millis_since(first.timestamp) <= threshold_millis)
            .count()
            .max(1);
        Self { size }
    }

    /// Number of clustered points.
    #[must_use]
    pub const fn size(self) -> usize {
        self.size
    }

    /// Returns `true` if point `index` is clustered.
    #[must_use]
    pub const fn contains(self, index: usize) -> bool {
        index < self.size
    }

    /// Classifies a pair of point indices.
    #[must_use]
    pub const fn membership(self, i: usize, j: usize) -> PairMembership {
        match (self.contains(i), self.contains(j)) {
            (true, true) => PairMembership::Both,
            (false, false) => PairMembership::Neither,
            _ => PairMembership::One,
        }
    }

    /// Weight of point `index` in the temporal distortion score.
    ///
    /// Early cluster members count most (`4.0`, then `0.3` less per index,
    /// never negative); the first point after the cluster counts `1.5`;
    /// everything else counts `1.0`.
    #[must_use]
    pub fn distortion_weight(self, index: usize) -> f64 {
        if index < self.size {
            (4.0 - 0.3 * index as f64).max(0.0)
        } else if index == self.size {
            1.5
        } else {
            1.0
        }
    }
}
