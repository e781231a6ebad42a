// Copyright 2025 the Chronoline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout knobs.
//!
//! Every phase reads the same [`LayoutConfig`]; nothing in it changes during a
//! layout call.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::ideal::TimelineSpan;

/// A width/height pair in canvas units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    /// Width in canvas units.
    pub width: f64,
    /// Height in canvas units.
    pub height: f64,
}

impl Size {
    /// Creates a size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Canvas margins, in canvas units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margins {
    /// Space above the drawing area.
    pub top: f64,
    /// Space right of the drawing area.
    pub right: f64,
    /// Space below the drawing area.
    pub bottom: f64,
    /// Space left of the drawing area.
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 50.0,
            right: 100.0,
            bottom: 50.0,
            left: 100.0,
        }
    }
}

/// Buffers added to the separation a pair of overlapping text blocks needs.
///
/// Which buffer applies depends on how many of the two points belong to the
/// temporal cluster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeparationBuffers {
    /// Both points clustered, final solve. Negative values let cluster text
    /// blocks crowd each other.
    pub cluster: f64,
    /// Lower bound for the separation of two clustered points.
    pub cluster_floor: f64,
    /// Exactly one point clustered. Also the cluster buffer used while the
    /// optimizer simulates candidates.
    pub mixed: f64,
    /// Neither point clustered.
    pub standard: f64,
}

impl Default for SeparationBuffers {
    fn default() -> Self {
        Self {
            cluster: -50.0,
            cluster_floor: 20.0,
            mixed: 5.0,
            standard: 15.0,
        }
    }
}

/// One line of text stacked in a point's callout block.
#[derive(Clone, Debug, PartialEq)]
pub struct TextElement {
    /// Attribute name the text is read from.
    pub name: String,
    /// Font size in canvas units.
    pub font_size: f64,
    /// Wrap width in characters; longer text is estimated as wrapped.
    pub wrap_chars: Option<usize>,
}

impl TextElement {
    /// Creates an unwrapped element.
    #[must_use]
    pub fn new(name: impl Into<String>, font_size: f64) -> Self {
        Self {
            name: name.into(),
            font_size,
            wrap_chars: None,
        }
    }

    /// Sets the wrap width in characters.
    #[must_use]
    pub fn with_wrap(mut self, wrap_chars: usize) -> Self {
        self.wrap_chars = Some(wrap_chars);
        self
    }
}

/// Read-only knobs for a layout call.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Canvas size.
    pub canvas: Size,
    /// Canvas margins.
    pub margins: Margins,
    /// Extra inset between the margins and the usable timeline span.
    pub horizontal_buffer: f64,
    /// Run the optimizer, solver and collision resolver.
    ///
    /// When `false` only the hard invariants are applied to the ideal
    /// positions and every callout stays at `min_callout`.
    pub avoid_text_overlap: bool,
    /// Shortest callout line.
    pub min_callout: f64,
    /// Longest callout line.
    pub max_callout: f64,
    /// Vertical gap between stacked text elements.
    pub text_element_padding: f64,
    /// Gap between the end of the callout line and the first text element.
    pub callout_text_gap: f64,
    /// Padding around the text block's bounding box.
    pub box_padding: f64,
    /// Marker size; also the base spacing between adjacent markers.
    pub marker_size: f64,
    /// Distance text blocks keep from the canvas margins when nudged.
    pub edge_inset: f64,
    /// Separation buffers for the constraint solver.
    pub buffers: SeparationBuffers,
    /// Text elements, stacked away from the axis in this order.
    pub elements: Vec<TextElement>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas: Size::new(1200.0, 800.0),
            margins: Margins::default(),
            horizontal_buffer: 50.0,
            avoid_text_overlap: true,
            min_callout: 60.0,
            max_callout: 180.0,
            text_element_padding: 2.0,
            callout_text_gap: 5.0,
            box_padding: 5.0,
            marker_size: 8.0,
            edge_inset: 20.0,
            buffers: SeparationBuffers::default(),
            elements: vec![
                TextElement::new("title", 12.0),
                TextElement::new("timestamp", 12.0),
                TextElement::new("notes", 12.0).with_wrap(30),
            ],
        }
    }
}

impl LayoutConfig {
    /// Sets the canvas size.
    #[must_use]
    pub fn with_canvas(mut self, canvas: Size) -> Self {
        self.canvas = canvas;
        self
    }

    /// Sets the margins.
    #[must_use]
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    /// Sets the horizontal buffer.
    #[must_use]
    pub fn with_horizontal_buffer(mut self, buffer: f64) -> Self {
        self.horizontal_buffer = buffer;
        self
    }

    /// Sets the callout length range.
    #[must_use]
    pub fn with_callout_range(mut self, min: f64, max: f64) -> Self {
        self.min_callout = min;
        self.max_callout = max;
        self
    }

    /// Sets the marker size.
    #[must_use]
    pub fn with_marker_size(mut self, marker_size: f64) -> Self {
        self.marker_size = marker_size;
        self
    }

    /// Enables or disables overlap avoidance.
    #[must_use]
    pub fn with_overlap_avoidance(mut self, enabled: bool) -> Self {
        self.avoid_text_overlap = enabled;
        self
    }

    /// Replaces the stacked text elements.
    #[must_use]
    pub fn with_elements(mut self, elements: Vec<TextElement>) -> Self {
        self.elements = elements;
        self
    }

    /// The usable horizontal span: the canvas minus margins and buffer on
    /// both sides.
    #[must_use]
    pub fn timeline_span(&self) -> TimelineSpan {
        let start = self.margins.left + self.horizontal_buffer;
        let width = self.canvas.width
            - self.margins.left
            - self.margins.right
            - 2.0 * self.horizontal_buffer;
        TimelineSpan::new(start, width)
    }

    /// Y coordinate of the timeline axis, centered between the vertical margins.
    #[must_use]
    pub fn axis_y(&self) -> f64 {
        let inner = self.canvas.height - self.margins.top - self.margins.bottom;
        self.margins.top + inner / 2.0
    }

    /// Horizontal limits text blocks are nudged within.
    #[must_use]
    pub fn text_limits(&self) -> (f64, f64) {
        (
            self.margins.left + self.edge_inset,
            self.canvas.width - self.margins.right - self.edge_inset,
        )
    }

    /// Minimum distance between adjacent markers in the final layout.
    #[must_use]
    pub fn min_marker_spacing(&self) -> f64 {
        self.marker_size.max(6.0)
    }

    /// Clamps a callout length into `[min_callout, max_callout]`.
    ///
    /// A misordered range resolves to `min_callout`.
    #[must_use]
    pub fn clamp_callout(&self, callout: f64) -> f64 {
        callout.min(self.max_callout).max(self.min_callout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_span_and_axis() {
        let config = LayoutConfig::default();
        let span = config.timeline_span();
        assert_eq!(span.start, 150.0, "left margin plus buffer");
        assert_eq!(span.width, 900.0, "1200 - 200 margins - 100 buffers");
        assert_eq!(config.axis_y(), 400.0, "centered between top and bottom margins");
        assert_eq!(config.text_limits(), (120.0, 1080.0));
    }

    #[test]
    fn marker_spacing_has_a_floor() {
        let config = LayoutConfig::default().with_marker_size(3.0);
        assert_eq!(config.min_marker_spacing(), 6.0);
        let config = config.with_marker_size(10.0);
        assert_eq!(config.min_marker_spacing(), 10.0);
    }

    #[test]
    fn callout_clamp_respects_range() {
        let config = LayoutConfig::default();
        assert_eq!(config.clamp_callout(10.0), 60.0);
        assert_eq!(config.clamp_callout(500.0), 180.0);
        assert_eq!(config.clamp_callout(90.0), 90.0);
    }

    #[test]
    fn default_elements_stack_title_timestamp_notes() {
        let config = LayoutConfig::default();
        let names: Vec<&str> = config.elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["title", "timestamp", "notes"]);
        assert_eq!(config.elements[2].wrap_chars, Some(30));
    }
}
