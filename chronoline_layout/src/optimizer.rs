// Copyright 2025 the Chronoline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Callout-height search for the temporal cluster.
//!
//! Lengthening some callouts in a crowded cluster staggers the text blocks
//! vertically, which lets the solver keep the markers closer to where their
//! timestamps put them. The optimizer tries a fixed family of callout patterns
//! for the cluster prefix, simulates each one, and keeps the pattern with the
//! lowest weighted temporal distortion.

use alloc::vec;
use alloc::vec::Vec;

use log::debug;
use smallvec::SmallVec;

use crate::cluster::ClusterScope;
use crate::config::LayoutConfig;
use crate::context::LayoutContext;
use crate::solver::{SolverPass, solve};

/// Outcome of the callout search.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct CalloutPlan {
    pub(crate) callouts: Vec<f64>,
    /// Simulated positions for `callouts`.
    pub(crate) positions: Vec<f64>,
    pub(crate) baseline_score: f64,
    pub(crate) score: f64,
}

/// Weighted temporal distortion `Σ wᵢ·|xᵢ − idealᵢ|`.
#[must_use]
pub fn temporal_distortion(positions: &[f64], ideal: &[f64], cluster: ClusterScope) -> f64 {
    positions
        .iter()
        .zip(ideal)
        .enumerate()
        .map(|(i, (x, ix))| cluster.distortion_weight(i) * (x - ix).abs())
        .sum()
}

/// Discrete callout lengths the search draws from, shortest first.
///
/// `min`, `min + 25`, `min + 50`, `min + 75`, plus the maximum (capped at
/// `min + 100`) when it is longer still. Every option is clamped into the
/// configured callout range.
#[must_use]
pub fn callout_options(config: &LayoutConfig) -> SmallVec<[f64; 5]> {
    let min = config.min_callout;
    let mut options: SmallVec<[f64; 5]> = [0.0, 25.0, 50.0, 75.0]
        .iter()
        .map(|step| config.clamp_callout(min + step))
        .collect();
    let top = config.max_callout.min(min + 100.0);
    if top > min + 75.0 {
        options.push(top);
    }
    options
}

/// Candidate callout vectors for a cluster of `cluster_size` points.
///
/// The first candidate is always the all-minimum baseline.
#[must_use]
pub fn candidate_patterns(options: &[f64], cluster_size: usize) -> Vec<Vec<f64>> {
    let (Some(&lo), Some(&hi)) = (options.first(), options.last()) else {
        return Vec::new();
    };
    let mut patterns = vec![vec![lo; cluster_size]];
    let last = options.len() - 1;
    let at = |k: usize| options[k.min(last)];
    let alternating = |phase: usize| -> Vec<f64> {
        (0..cluster_size)
            .map(|i| if (i + phase) % 2 == 0 { lo } else { hi })
            .collect()
    };

    if cluster_size == 5 {
        let mid = options[options.len() / 2];
        patterns.push(alternating(0));
        patterns.push(alternating(1));
        patterns.push((0..5).map(at).collect());
        patterns.push((0..5).rev().map(at).collect());
        patterns.push(vec![hi, mid, lo, mid, hi]);
        patterns.push(vec![lo, mid, hi, mid, lo]);
        if options.len() >= 5 {
            patterns.push(vec![lo, hi, options[1], options[3], options[2]]);
        }
    } else {
        patterns.push(alternating(0));
        patterns.push(alternating(1));
        patterns.push(
            (0..cluster_size)
                .map(|i| at(i * options.len() / cluster_size))
                .collect(),
        );
        patterns.push(
            (0..cluster_size)
                .map(|i| at((cluster_size - 1 - i) * options.len() / cluster_size))
                .collect(),
        );
    }
    patterns
}

/// Searches callout patterns for the cluster prefix.
///
/// Points outside the cluster keep the minimum callout. A candidate replaces
/// the incumbent only when it scores strictly lower.
pub(crate) fn optimize_callouts(ctx: &LayoutContext<'_>, ideal: &[f64]) -> CalloutPlan {
    let n = ctx.len();
    let cluster = ctx.cluster;
    let pass = SolverPass::simulation(ctx.config);
    let min = ctx.config.min_callout;
    let simulate = |callouts: &[f64]| {
        let positions = solve(ctx, ideal, callouts, &pass).positions;
        let score = temporal_distortion(&positions, ideal, cluster);
        (positions, score)
    };

    let baseline = vec![min; n];
    let (baseline_positions, baseline_score) = simulate(&baseline);
    let mut best = CalloutPlan {
        callouts: baseline,
        positions: baseline_positions,
        baseline_score,
        score: baseline_score,
    };

    let options = callout_options(ctx.config);
    let prefix = cluster.size().min(n);
    for pattern in candidate_patterns(&options, prefix) {
        let mut callouts = vec![min; n];
        callouts[..prefix].copy_from_slice(&pattern);
        let (positions, score) = simulate(&callouts);
        if score < best.score {
            best.callouts = callouts;
            best.positions = positions;
            best.score = score;
        }
    }

    debug!(
        "optimizer: cluster of {prefix}, distortion {:.1} -> {:.1}",
        best.baseline_score, best.score
    );
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ideal::ideal_positions;
    use crate::point::{TimePoint, Timestamp};
    use chronoline_text::HeuristicTextMeasurer;

    #[test]
    fn options_follow_the_callout_range() {
        let config = LayoutConfig::default();
        assert_eq!(callout_options(&config).as_slice(), [60.0, 85.0, 110.0, 135.0, 160.0]);

        let config = config.with_callout_range(60.0, 130.0);
        assert_eq!(
            callout_options(&config).as_slice(),
            [60.0, 85.0, 110.0, 130.0],
            "options never exceed the maximum"
        );
    }

    #[test]
    fn five_point_cluster_patterns() {
        let options = [60.0, 85.0, 110.0, 135.0, 160.0];
        let patterns = candidate_patterns(&options, 5);
        assert_eq!(patterns.len(), 8);
        assert_eq!(patterns[0], [60.0; 5], "baseline first");
        assert_eq!(patterns[1], [60.0, 160.0, 60.0, 160.0, 60.0]);
        assert_eq!(patterns[2], [160.0, 60.0, 160.0, 60.0, 160.0]);
        assert_eq!(patterns[3], options);
        assert_eq!(patterns[4], [160.0, 135.0, 110.0, 85.0, 60.0]);
        assert_eq!(patterns[5], [160.0, 110.0, 60.0, 110.0, 160.0]);
        assert_eq!(patterns[6], [60.0, 110.0, 160.0, 110.0, 60.0]);
        assert_eq!(patterns[7], [60.0, 160.0, 85.0, 135.0, 110.0]);
    }

    #[test]
    fn staircase_indices_stay_in_range_with_four_options() {
        let options = [60.0, 85.0, 110.0, 135.0];
        let patterns = candidate_patterns(&options, 5);
        assert_eq!(patterns.len(), 7, "no hand-composed spread without five options");
        assert_eq!(patterns[3], [60.0, 85.0, 110.0, 135.0, 135.0]);
    }

    #[test]
    fn other_cluster_sizes_use_generic_patterns() {
        let options = [60.0, 85.0, 110.0, 135.0, 160.0];
        let patterns = candidate_patterns(&options, 3);
        assert_eq!(patterns.len(), 5);
        assert_eq!(patterns[1], [60.0, 160.0, 60.0]);
        assert_eq!(patterns[2], [160.0, 60.0, 160.0]);
        assert_eq!(patterns[3], [60.0, 85.0, 135.0], "indices 0, 5/3, 10/3");
        assert_eq!(patterns[4], [135.0, 85.0, 60.0]);
        assert!(candidate_patterns(&[], 3).is_empty(), "no options, no candidates");
    }

    #[test]
    fn distortion_weights_the_cluster_heavier() {
        let cluster = ClusterScope::detect(&[
            TimePoint::new(Timestamp::from_millis(0)),
            TimePoint::new(Timestamp::from_millis(1)),
        ]);
        let ideal = [0.0, 0.0, 0.0];
        assert_eq!(temporal_distortion(&[1.0, 0.0, 0.0], &ideal, cluster), 4.0);
        assert_eq!(temporal_distortion(&[0.0, 0.0, 2.0], &ideal, cluster), 3.0);
    }

    #[test]
    fn optimized_score_never_exceeds_baseline() {
        let config = LayoutConfig::default();
        let m = HeuristicTextMeasurer::default();
        let minute = 60_000;
        let pts: Vec<TimePoint> = (0..7)
            .map(|i| {
                TimePoint::new(Timestamp::from_millis(i * 15 * minute))
                    .with_attribute("title", "Standup and planning")
                    .with_attribute("notes", "Discussed the backlog and reassigned two tickets")
            })
            .collect();
        let span = config.timeline_span();
        let ctx = LayoutContext::new(&pts, &config, span, config.axis_y(), &m);
        let ideal = ideal_positions(&pts, span);
        let plan = optimize_callouts(&ctx, &ideal);
        assert!(plan.score <= plan.baseline_score, "{} > {}", plan.score, plan.baseline_score);
        assert_eq!(plan.callouts.len(), pts.len());
        assert!(
            plan.callouts
                .iter()
                .all(|&c| (config.min_callout..=config.max_callout).contains(&c)),
            "callouts stay in range"
        );
    }
}
