// Copyright 2025 the Chronoline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two-dimensional collision resolution and the final hard invariants.
//!
//! After the horizontal solve some text blocks may still overlap. Each pass
//! looks at every overlapping pair and either changes their callout lengths
//! (vertical separation) or nudges them apart horizontally, depending on how
//! far apart they are in time and on screen.

use alloc::vec::Vec;

use log::{debug, trace};

use crate::context::LayoutContext;
use crate::ideal::TimelineSpan;
use crate::point::{MILLIS_PER_HOUR, TimePoint};
use crate::text_block::{CalloutSide, boxes_overlap, overlap_extent};

/// Pass budget for collision resolution.
pub const MAX_RESOLVER_PASSES: usize = 10;

/// Why a pair was resolved the way it was.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResolutionRule {
    /// More than an hour apart and already well separated on screen: keep the
    /// time-proportional positions and separate vertically.
    TimeGap,
    /// Crowded horizontally with distinct callouts on the same side: spread
    /// the callouts further.
    CrowdedVertical,
    /// Crowded horizontally otherwise: nudge apart.
    CrowdedHorizontal,
    /// On opposite sides of the axis: nudge apart.
    OppositeSides,
    /// Everything else: separate vertically.
    SameSide,
}

impl ResolutionRule {
    /// Returns `true` if the rule changes callout lengths rather than positions.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::TimeGap | Self::CrowdedVertical | Self::SameSide)
    }
}

/// The facts about an overlapping pair that pick a [`ResolutionRule`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairFacts {
    /// Absolute time between the two points, in milliseconds.
    pub time_gap_millis: u64,
    /// Absolute horizontal distance between the two points.
    pub horizontal_distance: f64,
    /// Mean width of the two text blocks.
    pub average_width: f64,
    /// Absolute difference between the two callout lengths.
    pub callout_difference: f64,
    /// Whether both points are on the same side of the axis.
    pub same_side: bool,
}

/// Picks the resolution rule for an overlapping pair, first match wins.
#[must_use]
pub fn choose_rule(facts: &PairFacts) -> ResolutionRule {
    const HOUR: u64 = MILLIS_PER_HOUR.unsigned_abs();
    if facts.time_gap_millis > HOUR && facts.horizontal_distance > 30.0 {
        ResolutionRule::TimeGap
    } else if facts.horizontal_distance < facts.average_width / 2.0 {
        if facts.callout_difference > 30.0 && facts.same_side {
            ResolutionRule::CrowdedVertical
        } else {
            ResolutionRule::CrowdedHorizontal
        }
    } else if !facts.same_side {
        ResolutionRule::OppositeSides
    } else {
        ResolutionRule::SameSide
    }
}

/// Output of the collision passes.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Resolved {
    pub(crate) positions: Vec<f64>,
    pub(crate) callouts: Vec<f64>,
    pub(crate) passes: usize,
}

pub(crate) fn resolve_collisions(
    ctx: &LayoutContext<'_>,
    mut positions: Vec<f64>,
    mut callouts: Vec<f64>,
) -> Resolved {
    let n = ctx.len();
    let clamp_widths: Vec<f64> = ctx.stacks.iter().map(|s| s.clamp_width()).collect();
    let mut passes = 0;

    for _ in 0..MAX_RESOLVER_PASSES {
        passes += 1;
        let boxes = ctx.all_bounds(&positions, &callouts);
        let mut collisions = 0_usize;

        for i in 0..n {
            for j in i + 1..n {
                if !boxes_overlap(boxes[i], boxes[j]) {
                    continue;
                }
                collisions += 1;
                let (overlap_w, overlap_h) = overlap_extent(boxes[i], boxes[j]);
                let facts = PairFacts {
                    time_gap_millis: ctx.points[i]
                        .timestamp
                        .abs_gap_millis(ctx.points[j].timestamp),
                    horizontal_distance: (positions[i] - positions[j]).abs(),
                    average_width: (boxes[i].width() + boxes[j].width()) / 2.0,
                    callout_difference: (callouts[i] - callouts[j]).abs(),
                    same_side: CalloutSide::for_index(i) == CalloutSide::for_index(j),
                };
                let rule = choose_rule(&facts);
                trace!("resolver: pair ({i}, {j}) overlaps {overlap_w:.1}x{overlap_h:.1}, {rule:?}");

                if rule.is_vertical() {
                    spread_callouts(ctx, &mut callouts, i, j, overlap_h);
                } else {
                    let (early, late) = if ctx.points[i].timestamp <= ctx.points[j].timestamp {
                        (i, j)
                    } else {
                        (j, i)
                    };
                    nudge_apart(ctx, &mut positions, &clamp_widths, early, late, overlap_w);
                }
            }
        }

        if collisions == 0 {
            break;
        }
    }

    debug!("resolver: {passes} pass(es)");
    Resolved {
        positions,
        callouts,
        passes,
    }
}

/// Shortens the smaller callout and lengthens the larger one.
fn spread_callouts(
    ctx: &LayoutContext<'_>,
    callouts: &mut [f64],
    i: usize,
    j: usize,
    overlap_h: f64,
) {
    let half = (overlap_h / 3.0 + 15.0) / 2.0;
    let (short, long) = if callouts[i] <= callouts[j] {
        (i, j)
    } else {
        (j, i)
    };
    callouts[short] = ctx.config.clamp_callout(callouts[short] - half);
    callouts[long] = ctx.config.clamp_callout(callouts[long] + half);
}

/// Moves `early` left and `late` right, keeping both text blocks on canvas.
fn nudge_apart(
    ctx: &LayoutContext<'_>,
    positions: &mut [f64],
    clamp_widths: &[f64],
    early: usize,
    late: usize,
    overlap_w: f64,
) {
    let (min_x, max_x) = ctx.config.text_limits();
    let half = (overlap_w / 2.0 + 3.0).max(5.0) / 2.0;
    let (w_early, w_late) = (clamp_widths[early], clamp_widths[late]);

    let mut x_early = positions[early] - half;
    let mut x_late = positions[late] + half;
    if x_early - w_early / 2.0 < min_x {
        x_early = min_x + w_early / 2.0;
    }
    if x_late + w_late / 2.0 > max_x {
        x_late = max_x - w_late / 2.0;
    }
    if x_early >= x_late {
        let gap = w_early.max(w_late) / 2.0 + 10.0;
        x_late = x_early + gap;
        if x_late + w_late / 2.0 > max_x {
            x_late = max_x - w_late / 2.0;
            x_early = x_late - gap;
        }
    }
    positions[early] = x_early;
    positions[late] = x_late;
}

/// Applies the guarantees every layout ends with.
///
/// 1. Every position lies in `span` and adjacent positions (in x order) are at
///    least `min_spacing` apart. When the span is too narrow to fit every
///    marker, the bounds win.
/// 2. Positions follow time order: whenever an earlier point sits right of a
///    later one, their positions are swapped.
///
/// Either step may reintroduce text overlap.
pub fn enforce_invariants(
    points: &[TimePoint],
    positions: &mut [f64],
    min_spacing: f64,
    span: TimelineSpan,
) {
    let n = positions.len().min(points.len());
    if n == 0 {
        return;
    }
    for x in positions.iter_mut() {
        *x = span.clamp(*x);
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| positions[a].total_cmp(&positions[b]).then(a.cmp(&b)));

    for k in 1..n {
        let (prev, cur) = (order[k - 1], order[k]);
        let shortfall = min_spacing - (positions[cur] - positions[prev]);
        if shortfall > 0.0 {
            positions[cur] += shortfall;
        }
    }
    let end = span.end();
    if positions[order[n - 1]] > end {
        positions[order[n - 1]] = end;
    }
    for k in (0..n - 1).rev() {
        let cap = positions[order[k + 1]] - min_spacing;
        if positions[order[k]] > cap {
            positions[order[k]] = cap;
        }
    }
    for x in positions.iter_mut() {
        *x = x.max(span.start);
    }

    for i in 0..n {
        for j in i + 1..n {
            if points[i].timestamp < points[j].timestamp && positions[i] > positions[j] {
                positions.swap(i, j);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::config::LayoutConfig;
    use crate::point::Timestamp;
    use chronoline_text::HeuristicTextMeasurer;

    fn at_hours(hours: &[i64]) -> Vec<TimePoint> {
        hours
            .iter()
            .map(|&h| TimePoint::new(Timestamp::from_millis(h * MILLIS_PER_HOUR)))
            .collect()
    }

    fn facts() -> PairFacts {
        PairFacts {
            time_gap_millis: 0,
            horizontal_distance: 100.0,
            average_width: 120.0,
            callout_difference: 0.0,
            same_side: true,
        }
    }

    #[test]
    fn rule_priority() {
        let far_in_time = PairFacts {
            time_gap_millis: 3 * MILLIS_PER_HOUR.unsigned_abs(),
            horizontal_distance: 40.0,
            same_side: false,
            ..facts()
        };
        assert_eq!(choose_rule(&far_in_time), ResolutionRule::TimeGap);

        let crowded = PairFacts {
            horizontal_distance: 10.0,
            ..facts()
        };
        assert_eq!(choose_rule(&crowded), ResolutionRule::CrowdedHorizontal);
        let crowded_distinct = PairFacts {
            callout_difference: 40.0,
            ..crowded
        };
        assert_eq!(choose_rule(&crowded_distinct), ResolutionRule::CrowdedVertical);

        let opposite = PairFacts {
            same_side: false,
            ..facts()
        };
        assert_eq!(choose_rule(&opposite), ResolutionRule::OppositeSides);
        assert_eq!(choose_rule(&facts()), ResolutionRule::SameSide);
    }

    #[test]
    fn one_hour_gap_is_not_enough_for_the_time_rule() {
        let exactly_an_hour = PairFacts {
            time_gap_millis: MILLIS_PER_HOUR.unsigned_abs(),
            horizontal_distance: 10.0,
            ..facts()
        };
        assert_eq!(choose_rule(&exactly_an_hour), ResolutionRule::CrowdedHorizontal);
    }

    #[test]
    fn distant_in_time_overlap_is_resolved_vertically() {
        let config = LayoutConfig::default();
        let m = HeuristicTextMeasurer::default();
        let pts: Vec<TimePoint> = at_hours(&[0, 1, 3])
            .into_iter()
            .map(|p| p.with_attribute("title", "A title long enough to collide"))
            .collect();
        let ctx = LayoutContext::new(&pts, &config, config.timeline_span(), config.axis_y(), &m);
        let positions = vec![400.0, 800.0, 450.0];
        let callouts = vec![60.0; 3];
        assert!(
            boxes_overlap(ctx.bounds(0, 400.0, 60.0), ctx.bounds(2, 450.0, 60.0)),
            "points 0 and 2 start out overlapping"
        );

        let resolved = resolve_collisions(&ctx, positions.clone(), callouts);
        assert_eq!(resolved.positions, positions, "x stays time-proportional");
        assert!(
            resolved.callouts[0] != resolved.callouts[2],
            "callouts were spread: {:?}",
            resolved.callouts
        );
        let boxes = ctx.all_bounds(&resolved.positions, &resolved.callouts);
        assert!(!boxes_overlap(boxes[0], boxes[2]), "overlap removed");
    }

    #[test]
    fn crowded_pair_is_nudged_in_time_order() {
        let config = LayoutConfig::default();
        let m = HeuristicTextMeasurer::default();
        let pts: Vec<TimePoint> = at_hours(&[0, 0, 0])
            .into_iter()
            .map(|p| p.with_attribute("title", "Overlap"))
            .collect();
        let ctx = LayoutContext::new(&pts, &config, config.timeline_span(), config.axis_y(), &m);
        let resolved = resolve_collisions(&ctx, vec![500.0, 700.0, 505.0], vec![60.0; 3]);
        assert!(resolved.positions[0] < 500.0, "earlier point moved left");
        assert!(resolved.positions[2] > 505.0, "later point moved right");
        assert!(resolved.passes <= MAX_RESOLVER_PASSES, "bounded passes");
    }

    #[test]
    fn nudge_keeps_blocks_inside_the_text_limits() {
        let config = LayoutConfig::default();
        let m = HeuristicTextMeasurer::default();
        let pts: Vec<TimePoint> = at_hours(&[0, 1])
            .into_iter()
            .map(|p| p.with_attribute("title", "Edge"))
            .collect();
        let ctx = LayoutContext::new(&pts, &config, config.timeline_span(), config.axis_y(), &m);
        let widths = [60.0, 60.0];
        let mut xs = vec![1040.0, 1045.0];
        nudge_apart(&ctx, &mut xs, &widths, 0, 1, 50.0);
        assert_eq!(xs[1], 1080.0 - 30.0, "later block pinned to the right limit");
        assert!(xs[0] < xs[1], "order preserved");

        let mut xs = vec![1070.0, 1072.0];
        nudge_apart(&ctx, &mut xs, &widths, 0, 1, 50.0);
        assert_eq!(xs, [1050.0 - 40.0, 1050.0], "re-spaced from the right limit");
    }

    #[test]
    fn vertical_spread_stays_in_range() {
        let config = LayoutConfig::default();
        let m = HeuristicTextMeasurer::default();
        let pts = at_hours(&[0, 5]);
        let ctx = LayoutContext::new(&pts, &config, config.timeline_span(), config.axis_y(), &m);
        let mut callouts = [60.0, 175.0];
        spread_callouts(&ctx, &mut callouts, 0, 1, 30.0);
        assert_eq!(callouts, [60.0, 180.0]);
    }

    #[test]
    fn invariants_space_markers_and_restore_time_order() {
        let pts = at_hours(&[0, 1, 2, 3]);
        let span = TimelineSpan::new(0.0, 100.0);
        let mut xs = [50.0, 10.0, 52.0, 200.0];
        enforce_invariants(&pts, &mut xs, 8.0, span);
        assert_eq!(xs, [10.0, 50.0, 58.0, 100.0]);
    }

    #[test]
    fn invariants_pull_back_from_the_span_end() {
        let pts = at_hours(&[0, 1, 2]);
        let span = TimelineSpan::new(0.0, 100.0);
        let mut xs = [99.0, 100.0, 100.0];
        enforce_invariants(&pts, &mut xs, 8.0, span);
        assert_eq!(xs, [84.0, 92.0, 100.0]);
    }

    #[test]
    fn zero_width_span_collapses_to_its_boundary() {
        let pts = at_hours(&[0, 1, 2]);
        let span = TimelineSpan::new(300.0, 0.0);
        let mut xs = [100.0, 300.0, 500.0];
        enforce_invariants(&pts, &mut xs, 8.0, span);
        assert_eq!(xs, [300.0; 3]);
    }
}
