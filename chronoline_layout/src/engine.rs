// Copyright 2025 the Chronoline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use chronoline_text::TextMeasurer;
use log::debug;

use crate::config::LayoutConfig;
use crate::context::LayoutContext;
use crate::ideal::{TimelineSpan, ideal_positions};
use crate::optimizer::{optimize_callouts, temporal_distortion};
use crate::point::TimePoint;
use crate::resolver::{enforce_invariants, resolve_collisions};
use crate::solver::{SolverPass, solve};
use crate::text_block::{CalloutSide, TextBlock, TextStack, boxes_overlap};

/// Final placement of one point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutState {
    /// Marker position on the axis.
    pub x: f64,
    /// Length of the callout line.
    pub callout_length: f64,
    /// Side of the axis the callout extends to.
    pub side: CalloutSide,
}

/// Diagnostics collected while laying out.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutReport {
    /// Number of points in the temporal cluster.
    pub cluster_size: usize,
    /// Weighted distortion with every callout at the minimum.
    pub baseline_distortion: f64,
    /// Weighted distortion of the chosen callouts.
    pub optimized_distortion: f64,
    /// Shortfall of the optimizer's positions against the final solve's
    /// separation requirements.
    pub constraint_pressure: f64,
    /// Collision passes the resolver used.
    pub resolver_passes: usize,
    /// Overlapping text block pairs left after the hard invariants.
    pub remaining_overlaps: usize,
}

/// States plus diagnostics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutOutcome {
    /// One state per input point, in input order.
    pub states: Vec<LayoutState>,
    /// How the layout went.
    pub report: LayoutReport,
}

/// A point's text as placed by a finished layout, ready for rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct CalloutPlacement {
    /// The point's final state.
    pub state: LayoutState,
    /// Measured text lines.
    pub stack: TextStack,
    /// Where the lines and their bounding box landed.
    pub block: TextBlock,
}

/// The timeline layout engine.
///
/// Runs the phases in order, each taking the previous phase's output:
/// 1. ideal positions from timestamps,
/// 2. cluster detection and text measurement (once),
/// 3. callout search for the cluster,
/// 4. the final horizontal constraint solve,
/// 5. collision resolution,
/// 6. hard invariants (bounds, marker spacing, time order).
///
/// Points must be sorted by timestamp.
pub struct TimelineLayout<'a> {
    config: &'a LayoutConfig,
    measurer: &'a dyn TextMeasurer,
    span: TimelineSpan,
    axis_y: f64,
}

impl core::fmt::Debug for TimelineLayout<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TimelineLayout")
            .field("config", self.config)
            .field("span", &self.span)
            .field("axis_y", &self.axis_y)
            .finish_non_exhaustive()
    }
}

impl<'a> TimelineLayout<'a> {
    /// Creates an engine with the span and axis derived from `config`.
    #[must_use]
    pub fn new(config: &'a LayoutConfig, measurer: &'a dyn TextMeasurer) -> Self {
        Self {
            config,
            measurer,
            span: config.timeline_span(),
            axis_y: config.axis_y(),
        }
    }

    /// Overrides the usable span.
    #[must_use]
    pub fn with_span(mut self, span: TimelineSpan) -> Self {
        self.span = span;
        self
    }

    /// Overrides the axis y coordinate.
    #[must_use]
    pub fn with_axis_y(mut self, axis_y: f64) -> Self {
        self.axis_y = axis_y;
        self
    }

    /// The usable span.
    #[must_use]
    pub fn span(&self) -> TimelineSpan {
        self.span
    }

    /// The axis y coordinate.
    #[must_use]
    pub fn axis_y(&self) -> f64 {
        self.axis_y
    }

    /// Lays out `points` starting from their time-proportional positions.
    #[must_use]
    pub fn run(&self, points: &[TimePoint]) -> LayoutOutcome {
        let ideal = ideal_positions(points, self.span);
        self.run_from_ideal(points, &ideal)
    }

    /// Lays out `points` starting from caller-provided ideal positions.
    ///
    /// Useful for re-laying out a previous result. Points without an entry in
    /// `ideal` fall back to their time-proportional position.
    #[must_use]
    pub fn run_from_ideal(&self, points: &[TimePoint], ideal: &[f64]) -> LayoutOutcome {
        let n = points.len();
        if n == 0 {
            return LayoutOutcome::default();
        }
        let ideal = if ideal.len() >= n {
            ideal[..n].to_vec()
        } else {
            let mut mapped = ideal_positions(points, self.span);
            mapped[..ideal.len()].copy_from_slice(ideal);
            mapped
        };

        let ctx = LayoutContext::new(points, self.config, self.span, self.axis_y, self.measurer);
        let mut report = LayoutReport {
            cluster_size: ctx.cluster.size(),
            ..LayoutReport::default()
        };
        debug!("layout: {n} point(s), cluster of {}", report.cluster_size);

        let (mut positions, callouts) = if self.config.avoid_text_overlap {
            let plan = optimize_callouts(&ctx, &ideal);
            report.baseline_distortion = plan.baseline_score;
            report.optimized_distortion = plan.score;

            let solved = solve(
                &ctx,
                &plan.positions,
                &plan.callouts,
                &SolverPass::final_pass(self.config),
            );
            report.constraint_pressure = solved.pressure;
            debug!(
                "solver: pressure {:.1}, {} pass(es)",
                solved.pressure, solved.passes
            );

            let resolved = resolve_collisions(&ctx, solved.positions, plan.callouts);
            report.resolver_passes = resolved.passes;
            (resolved.positions, resolved.callouts)
        } else {
            (ideal.clone(), alloc::vec![self.config.min_callout; n])
        };

        enforce_invariants(
            points,
            &mut positions,
            self.config.min_marker_spacing(),
            self.span,
        );

        let boxes = ctx.all_bounds(&positions, &callouts);
        for i in 0..n {
            for j in i + 1..n {
                if boxes_overlap(boxes[i], boxes[j]) {
                    report.remaining_overlaps += 1;
                }
            }
        }
        if !self.config.avoid_text_overlap {
            let d = temporal_distortion(&positions, &ideal, ctx.cluster);
            report.baseline_distortion = d;
            report.optimized_distortion = d;
        }
        debug!(
            "layout: done, {} overlapping pair(s) remain",
            report.remaining_overlaps
        );

        let states = positions
            .into_iter()
            .zip(callouts)
            .enumerate()
            .map(|(i, (x, callout_length))| LayoutState {
                x,
                callout_length,
                side: CalloutSide::for_index(i),
            })
            .collect();
        LayoutOutcome { states, report }
    }

    /// Places every point's text for a finished layout.
    ///
    /// `states` must come from a layout of the same `points`.
    #[must_use]
    pub fn placements(&self, points: &[TimePoint], states: &[LayoutState]) -> Vec<CalloutPlacement> {
        points
            .iter()
            .zip(states)
            .map(|(point, state)| {
                let stack = TextStack::measure(point, self.config, self.measurer);
                let block = stack.place(
                    state.x,
                    self.axis_y,
                    state.callout_length,
                    state.side,
                    self.config,
                );
                CalloutPlacement {
                    state: *state,
                    stack,
                    block,
                }
            })
            .collect()
    }
}

/// Lays out sorted `points` on `span`, with the axis at `axis_y`.
///
/// Returns one state per point, in input order. Empty input yields an empty
/// result.
#[must_use]
pub fn compute_layout(
    points: &[TimePoint],
    config: &LayoutConfig,
    span: TimelineSpan,
    axis_y: f64,
    measurer: &dyn TextMeasurer,
) -> Vec<LayoutState> {
    TimelineLayout::new(config, measurer)
        .with_span(span)
        .with_axis_y(axis_y)
        .run(points)
        .states
}

/// Like [`compute_layout`], seeded with caller-provided ideal positions.
#[must_use]
pub fn compute_layout_from_ideal(
    points: &[TimePoint],
    ideal: &[f64],
    config: &LayoutConfig,
    span: TimelineSpan,
    axis_y: f64,
    measurer: &dyn TextMeasurer,
) -> Vec<LayoutState> {
    TimelineLayout::new(config, measurer)
        .with_span(span)
        .with_axis_y(axis_y)
        .run_from_ideal(points, ideal)
        .states
}
