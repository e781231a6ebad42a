// Copyright 2025 the Chronoline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Callout text blocks and their bounding boxes.
//!
//! Each point stacks its text elements at the end of its callout line, above or
//! below the axis. Text is measured once per layout into a [`TextStack`]; the
//! phases then ask the stack for a [`TextBlock`] at whatever `(x, callout)` they
//! are trying, which is pure geometry.

use alloc::string::String;

use chronoline_text::{TextExtent, TextMeasurer, wrap_words};
use kurbo::Rect;
use smallvec::SmallVec;

use crate::config::LayoutConfig;
use crate::point::TimePoint;

/// Extra width added to the clamp estimate of a text block.
const CLAMP_WIDTH_SLACK: f64 = 20.0;

/// Which side of the axis a point's callout extends to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CalloutSide {
    /// Toward smaller y (up on screen).
    Above,
    /// Toward larger y (down on screen).
    Below,
}

impl CalloutSide {
    /// Side for point `index`: even indices go above, odd below.
    #[must_use]
    pub const fn for_index(index: usize) -> Self {
        if index % 2 == 0 { Self::Above } else { Self::Below }
    }

    /// Direction away from the axis along y.
    #[must_use]
    pub const fn direction(self) -> f64 {
        match self {
            Self::Above => -1.0,
            Self::Below => 1.0,
        }
    }
}

/// One measured element of a point's text stack.
#[derive(Clone, Debug, PartialEq)]
pub struct StackedText {
    /// Index into [`LayoutConfig::elements`].
    pub element: usize,
    /// The text content.
    pub text: String,
    /// Font size the text was measured at.
    pub font_size: f64,
    /// Single-line extent of the full text.
    pub extent: TextExtent,
    /// Width the element contributes to the bounding box.
    pub box_width: f64,
    /// Width estimate used when clamping the block against the canvas edges.
    pub clamp_width: f64,
}

/// The measured, non-empty text elements of one point, in stacking order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextStack {
    lines: SmallVec<[StackedText; 4]>,
}

impl TextStack {
    /// Measures every configured element `point` has text for.
    ///
    /// Elements whose attribute is missing or empty are skipped.
    #[must_use]
    pub fn measure(point: &TimePoint, config: &LayoutConfig, measurer: &dyn TextMeasurer) -> Self {
        let mut lines = SmallVec::new();
        for (element, spec) in config.elements.iter().enumerate() {
            let Some(text) = point.attribute(&spec.name).filter(|t| !t.is_empty()) else {
                continue;
            };
            let extent = measurer.measure(text, spec.font_size);
            let (box_width, clamp_width) = match spec.wrap_chars {
                Some(wrap) if wrap > 0 && text.chars().count() > wrap => {
                    let wrapped = measurer.measure(&"A".repeat(wrap), spec.font_size).width;
                    let longest = wrap_words(text, wrap)
                        .iter()
                        .map(|line| measurer.measure(line, spec.font_size).width)
                        .fold(0.0, f64::max);
                    (wrapped.min(extent.width), longest)
                }
                _ => (extent.width, extent.width),
            };
            lines.push(StackedText {
                element,
                text: String::from(text),
                font_size: spec.font_size,
                extent,
                box_width,
                clamp_width,
            });
        }
        Self { lines }
    }

    /// The measured lines, nearest the axis first.
    #[must_use]
    pub fn lines(&self) -> &[StackedText] {
        &self.lines
    }

    /// Returns `true` if the point has no text at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Width of the widest line as it counts toward the bounding box.
    #[must_use]
    pub fn content_width(&self) -> f64 {
        self.lines.iter().map(|l| l.box_width).fold(0.0, f64::max)
    }

    /// Width estimate used to keep the block inside the canvas edges.
    #[must_use]
    pub fn clamp_width(&self) -> f64 {
        self.lines.iter().map(|l| l.clamp_width).fold(0.0, f64::max) + CLAMP_WIDTH_SLACK
    }

    /// Places the stack for a point at `x` with the given callout.
    #[must_use]
    pub fn place(
        &self,
        x: f64,
        axis_y: f64,
        callout: f64,
        side: CalloutSide,
        config: &LayoutConfig,
    ) -> TextBlock {
        let dir = side.direction();
        let anchor_y = axis_y + dir * callout;
        let mut edge = anchor_y + dir * config.callout_text_gap;
        let mut placed = SmallVec::new();
        let mut y_range: Option<(f64, f64)> = None;

        for (line, text) in self.lines.iter().enumerate() {
            let h = text.extent.height;
            let (top, bottom) = match side {
                CalloutSide::Above => (edge - h, edge),
                CalloutSide::Below => (edge, edge + h),
            };
            edge = match side {
                CalloutSide::Above => top - config.text_element_padding,
                CalloutSide::Below => bottom + config.text_element_padding,
            };
            y_range = Some(match y_range {
                Some((lo, hi)) => (lo.min(top), hi.max(bottom)),
                None => (top, bottom),
            });
            placed.push(PlacedText { line, top, bottom });
        }

        let (lo, hi) = y_range.unwrap_or((anchor_y, anchor_y));
        let half_width = (self.content_width() + 2.0 * config.box_padding) / 2.0;
        TextBlock {
            bounds: Rect::new(
                x - half_width,
                lo - config.box_padding,
                x + half_width,
                hi + config.box_padding,
            ),
            anchor_y,
            lines: placed,
        }
    }
}

/// Vertical placement of one line of a [`TextStack`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedText {
    /// Index into [`TextStack::lines`].
    pub line: usize,
    /// Top edge of the line.
    pub top: f64,
    /// Bottom edge of the line.
    pub bottom: f64,
}

/// A text stack placed on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    /// Padded bounding box.
    pub bounds: Rect,
    /// Y coordinate where the callout line ends.
    pub anchor_y: f64,
    /// Line placements, nearest the axis first.
    pub lines: SmallVec<[PlacedText; 4]>,
}

/// Strict overlap test: boxes that only touch do not overlap.
#[must_use]
pub fn boxes_overlap(a: Rect, b: Rect) -> bool {
    !(a.x1 <= b.x0 || b.x1 <= a.x0 || a.y1 <= b.y0 || b.y1 <= a.y0)
}

/// Width and height of the intersection of `a` and `b` (zero when disjoint).
#[must_use]
pub fn overlap_extent(a: Rect, b: Rect) -> (f64, f64) {
    let w = a.x1.min(b.x1) - a.x0.max(b.x0);
    let h = a.y1.min(b.y1) - a.y0.max(b.y0);
    (w.max(0.0), h.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Timestamp;
    use chronoline_text::HeuristicTextMeasurer;

    fn point(title: &str, notes: &str) -> TimePoint {
        TimePoint::new(Timestamp::from_millis(0))
            .with_attribute("title", title)
            .with_attribute("timestamp", "2024-01-01 09:00")
            .with_attribute("notes", notes)
    }

    #[test]
    fn sides_alternate_by_index() {
        assert_eq!(CalloutSide::for_index(0), CalloutSide::Above);
        assert_eq!(CalloutSide::for_index(1), CalloutSide::Below);
        assert_eq!(CalloutSide::for_index(4), CalloutSide::Above);
    }

    #[test]
    fn above_block_stacks_upward_from_the_anchor() {
        let config = LayoutConfig::default();
        let m = HeuristicTextMeasurer::default();
        let stack = TextStack::measure(&point("Kickoff", ""), &config, &m);
        assert_eq!(stack.lines().len(), 2, "empty notes are skipped");

        let block = stack.place(500.0, 400.0, 60.0, CalloutSide::Above, &config);
        // Anchor 340, first line bottom 335, 18 tall; second line 2 above that.
        assert_eq!(block.anchor_y, 340.0);
        assert_eq!(block.lines[0].bottom, 335.0);
        assert_eq!(block.lines[0].top, 317.0);
        assert_eq!(block.lines[1].bottom, 315.0);
        assert_eq!(block.lines[1].top, 297.0);
        assert_eq!(block.bounds.y0, 292.0, "outermost edge plus padding");
        assert_eq!(block.bounds.y1, 340.0, "innermost edge plus padding");
        // Timestamp is the widest line: 16 chars * 7.2.
        let width = 16.0 * 7.2 + 10.0;
        assert!((block.bounds.width() - width).abs() < 1e-9, "width {}", block.bounds.width());
        assert!((block.bounds.center().x - 500.0).abs() < 1e-9, "centered on x");
    }

    #[test]
    fn below_block_stacks_downward() {
        let config = LayoutConfig::default();
        let m = HeuristicTextMeasurer::default();
        let stack = TextStack::measure(&point("Kickoff", ""), &config, &m);
        let block = stack.place(500.0, 400.0, 100.0, CalloutSide::Below, &config);
        assert_eq!(block.anchor_y, 500.0);
        assert_eq!(block.lines[0].top, 505.0);
        assert_eq!(block.bounds.y0, 500.0);
        assert_eq!(block.bounds.y1, 505.0 + 18.0 + 2.0 + 18.0 + 5.0);
    }

    #[test]
    fn long_notes_are_estimated_as_wrapped() {
        let config = LayoutConfig::default();
        let m = HeuristicTextMeasurer::default();
        let notes = "a fairly long note that certainly needs more than one line to fit";
        let stack = TextStack::measure(&point("T", notes), &config, &m);
        let note = &stack.lines()[2];
        assert_eq!(note.box_width, m.measure(&"A".repeat(30), 12.0).width);
        assert!(note.clamp_width <= note.box_width, "longest wrapped line fits the wrap width");
        assert!(stack.clamp_width() >= note.clamp_width + 20.0, "clamp width adds slack");
    }

    #[test]
    fn empty_stack_collapses_to_padded_anchor() {
        let config = LayoutConfig::default();
        let stack = TextStack::default();
        let block = stack.place(10.0, 400.0, 60.0, CalloutSide::Above, &config);
        assert_eq!(block.bounds, Rect::new(5.0, 335.0, 15.0, 345.0));
        assert!(block.lines.is_empty(), "nothing to place");
    }

    #[test]
    fn touching_boxes_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 20.0, 10.0);
        let c = Rect::new(9.0, 9.0, 20.0, 20.0);
        assert!(!boxes_overlap(a, b), "shared edge");
        assert!(boxes_overlap(a, c), "one unit of overlap on both axes");
        assert_eq!(overlap_extent(a, c), (1.0, 1.0));
        assert_eq!(overlap_extent(a, Rect::new(50.0, 50.0, 60.0, 60.0)), (0.0, 0.0));
    }
}
