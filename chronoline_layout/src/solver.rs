// Copyright 2025 the Chronoline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Horizontal constraint solving.
//!
//! Every pair of points whose text blocks overlap gets a minimum horizontal
//! separation; the solver relaxes positions until every pair meets its
//! minimum (or the pass budget runs out). The same machinery runs twice with
//! different settings:
//! - [`SolverPass::simulation`] scores candidate callouts for the optimizer,
//! - [`SolverPass::final_pass`] produces the positions handed to the resolver.

use alloc::vec::Vec;

use log::trace;

use crate::cluster::PairMembership;
use crate::config::LayoutConfig;
use crate::context::LayoutContext;
use crate::ideal::TimelineSpan;
use crate::text_block::boxes_overlap;

/// Separation required between points whose text blocks do not overlap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerFloor {
    /// The marker size.
    Marker,
    /// The smaller of the marker size and the pair's current separation.
    CurrentOrMarker,
}

/// Settings for one run of the constraint solver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverPass {
    /// Divisor applied to the summed widths of two clustered points.
    pub cluster_divisor: f64,
    /// Buffer added to the separation of two clustered points.
    pub cluster_buffer: f64,
    /// Lower bound for the separation of two clustered points.
    pub cluster_floor: f64,
    /// Buffer when exactly one point is clustered.
    pub mixed_buffer: f64,
    /// Buffer when neither point is clustered.
    pub standard_buffer: f64,
    /// Relaxation pass budget.
    pub max_passes: usize,
    /// Separation for pairs whose blocks do not overlap.
    pub marker_floor: MarkerFloor,
}

impl SolverPass {
    /// Settings used while the optimizer simulates a candidate.
    #[must_use]
    pub fn simulation(config: &LayoutConfig) -> Self {
        let b = config.buffers;
        Self {
            cluster_divisor: 3.0,
            cluster_buffer: b.mixed,
            cluster_floor: b.cluster_floor,
            mixed_buffer: b.mixed,
            standard_buffer: b.standard,
            max_passes: 10,
            marker_floor: MarkerFloor::Marker,
        }
    }

    /// Settings for the final solve.
    #[must_use]
    pub fn final_pass(config: &LayoutConfig) -> Self {
        let b = config.buffers;
        Self {
            cluster_divisor: 2.0,
            cluster_buffer: b.cluster,
            cluster_floor: b.cluster_floor,
            mixed_buffer: b.mixed,
            standard_buffer: b.standard,
            max_passes: 20,
            marker_floor: MarkerFloor::CurrentOrMarker,
        }
    }
}

/// Required separations for every ordered pair `i < j`.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SeparationMatrix {
    n: usize,
    data: Vec<f64>,
}

impl SeparationMatrix {
    pub(crate) fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    /// Total amount by which `positions` fall short of the requirements.
    pub(crate) fn pressure(&self, positions: &[f64]) -> f64 {
        let mut total = 0.0;
        for i in 0..self.n {
            for j in i + 1..self.n {
                total += (self.get(i, j) - (positions[j] - positions[i]).abs()).max(0.0);
            }
        }
        total
    }
}

/// Builds the separation matrix from text blocks placed at `positions`.
pub(crate) fn separation_matrix(
    ctx: &LayoutContext<'_>,
    positions: &[f64],
    callouts: &[f64],
    pass: &SolverPass,
) -> SeparationMatrix {
    let n = ctx.len();
    let boxes = ctx.all_bounds(positions, callouts);
    let marker = ctx.config.marker_size;
    let mut data = alloc::vec![0.0; n * n];

    for i in 0..n {
        for j in i + 1..n {
            let required = if boxes_overlap(boxes[i], boxes[j]) {
                let widths = boxes[i].width() + boxes[j].width();
                match ctx.cluster.membership(i, j) {
                    PairMembership::Both => (widths / pass.cluster_divisor + pass.cluster_buffer)
                        .max(pass.cluster_floor),
                    PairMembership::One => widths / 2.0 + pass.mixed_buffer,
                    PairMembership::Neither => widths / 2.0 + pass.standard_buffer,
                }
            } else {
                match pass.marker_floor {
                    MarkerFloor::Marker => marker,
                    MarkerFloor::CurrentOrMarker => (positions[j] - positions[i]).abs().min(marker),
                }
            };
            data[i * n + j] = required;
            data[j * n + i] = required;
        }
    }
    SeparationMatrix { n, data }
}

/// Result of a solver run.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Solved {
    pub(crate) positions: Vec<f64>,
    /// Shortfall of the starting positions against the requirements.
    pub(crate) pressure: f64,
    pub(crate) passes: usize,
}

/// Runs the solver starting from `start`, with text blocks at `callouts`.
///
/// `start` doubles as the reference positions that decide how a deficit is
/// split between the two points of a pair.
pub(crate) fn solve(
    ctx: &LayoutContext<'_>,
    start: &[f64],
    callouts: &[f64],
    pass: &SolverPass,
) -> Solved {
    let matrix = separation_matrix(ctx, start, callouts, pass);
    let pressure = matrix.pressure(start);
    let (positions, passes) = relax(start, &matrix, pass.max_passes, ctx.span);
    Solved {
        positions: finalize(positions, ctx.config.marker_size, ctx.span),
        pressure,
        passes,
    }
}

fn relax(
    reference: &[f64],
    matrix: &SeparationMatrix,
    max_passes: usize,
    span: TimelineSpan,
) -> (Vec<f64>, usize) {
    let mut positions = reference.to_vec();
    let n = positions.len();
    if n < 2 {
        return (positions, 0);
    }
    let range = reference[n - 1] - reference[0];
    let mut passes = 0;

    for _ in 0..max_passes {
        passes += 1;
        let mut violations = 0_usize;
        for i in 0..n - 1 {
            for j in i + 1..n {
                let required = matrix.get(i, j);
                let current = positions[j] - positions[i];
                if current >= required {
                    continue;
                }
                violations += 1;
                if range <= 0.0 {
                    continue;
                }

                let deficit = required - current;
                let lw = (reference[i] - reference[0]) / range;
                let rw = (reference[n - 1] - reference[j]) / range;
                let left = deficit * lw / (lw + rw + 0.1);
                let right = deficit - left;
                let new_i = positions[i] - left;
                let new_j = positions[j] + right;
                if new_i >= span.start && new_j <= span.end() && new_i < new_j {
                    trace!("solver: pair ({i}, {j}) short by {deficit:.1}, moved {left:.1}/{right:.1}");
                    positions[i] = new_i;
                    positions[j] = new_j;
                }
            }
        }
        if violations == 0 {
            break;
        }
    }
    (positions, passes)
}

/// Forces strictly increasing positions, then clamps them into the span.
fn finalize(mut positions: Vec<f64>, increment: f64, span: TimelineSpan) -> Vec<f64> {
    for i in 1..positions.len() {
        if positions[i] <= positions[i - 1] {
            positions[i] = positions[i - 1] + increment;
        }
    }
    for x in &mut positions {
        *x = span.clamp(*x);
    }
    positions
}
