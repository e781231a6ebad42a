// Copyright 2025 the Chronoline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use chronoline_text::TextMeasurer;
use kurbo::Rect;

use crate::cluster::ClusterScope;
use crate::config::LayoutConfig;
use crate::ideal::TimelineSpan;
use crate::point::TimePoint;
use crate::text_block::{CalloutSide, TextBlock, TextStack};

/// Everything the phases share for one layout call.
///
/// Text is measured and the cluster detected exactly once, when the context is
/// built; phases only read it.
#[derive(Debug)]
pub(crate) struct LayoutContext<'a> {
    pub(crate) points: &'a [TimePoint],
    pub(crate) config: &'a LayoutConfig,
    pub(crate) span: TimelineSpan,
    pub(crate) axis_y: f64,
    pub(crate) cluster: ClusterScope,
    pub(crate) stacks: Vec<TextStack>,
}

impl<'a> LayoutContext<'a> {
    pub(crate) fn new(
        points: &'a [TimePoint],
        config: &'a LayoutConfig,
        span: TimelineSpan,
        axis_y: f64,
        measurer: &dyn TextMeasurer,
    ) -> Self {
        let stacks = points
            .iter()
            .map(|p| TextStack::measure(p, config, measurer))
            .collect();
        Self {
            points,
            config,
            span,
            axis_y,
            cluster: ClusterScope::detect(points),
            stacks,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.points.len()
    }

    pub(crate) fn block(&self, index: usize, x: f64, callout: f64) -> TextBlock {
        self.stacks[index].place(
            x,
            self.axis_y,
            callout,
            CalloutSide::for_index(index),
            self.config,
        )
    }

    pub(crate) fn bounds(&self, index: usize, x: f64, callout: f64) -> Rect {
        self.block(index, x, callout).bounds
    }

    /// Bounding boxes for every point at the given positions and callouts.
    pub(crate) fn all_bounds(&self, positions: &[f64], callouts: &[f64]) -> Vec<Rect> {
        positions
            .iter()
            .zip(callouts)
            .enumerate()
            .map(|(i, (&x, &c))| self.bounds(i, x, c))
            .collect()
    }
}
