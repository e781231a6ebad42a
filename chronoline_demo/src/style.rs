// Copyright 2025 the Chronoline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! TOML style documents.
//!
//! A style document tweaks the canvas, timeline knobs, marker, colors and the
//! stacked text elements. Every section and key is optional; anything missing
//! keeps the [`LayoutConfig`] default.

use chronoline_layout::{LayoutConfig, Margins, Size, TextElement};
use chronoline_text::{FontFamily, FontWeight};
use peniko::Color;
use serde::Deserialize;
use thiserror::Error;

/// Errors loading a style document.
#[derive(Debug, Error)]
pub(crate) enum StyleError {
    /// The document is not valid TOML or has the wrong shape.
    #[error("style document: {0}")]
    Toml(#[from] toml::de::Error),

    /// A color is not `#rgb`, `#rrggbb` or `#rrggbbaa`.
    #[error("invalid color `{value}` for {key}")]
    Color {
        /// Key the color was given for.
        key: String,
        /// The offending value.
        value: String,
    },

    /// A numeric knob is out of range.
    #[error("invalid {key}: {reason}")]
    Knob {
        /// Offending key.
        key: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// An element has an unknown font weight.
    #[error("invalid font weight `{0}`")]
    FontWeight(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct StyleDoc {
    canvas: CanvasDoc,
    font: FontDoc,
    timeline: TimelineDoc,
    marker: MarkerDoc,
    colors: ColorsDoc,
    elements: Vec<ElementDoc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CanvasDoc {
    width: Option<f64>,
    height: Option<f64>,
    margin_top: Option<f64>,
    margin_right: Option<f64>,
    margin_bottom: Option<f64>,
    margin_left: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FontDoc {
    family: Option<String>,
    size: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TimelineDoc {
    line_width: Option<f64>,
    horizontal_buffer: Option<f64>,
    avoid_text_overlap: Option<bool>,
    min_callout_length: Option<f64>,
    max_callout_length: Option<f64>,
    text_element_padding: Option<f64>,
    callout_text_gap: Option<f64>,
    show_times: Option<bool>,
    timestamp_column: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct MarkerDoc {
    shape: Option<MarkerShape>,
    size: Option<f64>,
    fill_color: Option<String>,
    stroke_color: Option<String>,
    stroke_width: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ColorsDoc {
    background: Option<String>,
    timeline: Option<String>,
    text: Option<String>,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ElementDoc {
    name: String,
    font_size: Option<f64>,
    font_weight: Option<String>,
    color: Option<String>,
    wrap_chars: Option<usize>,
}

/// Marker shapes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum MarkerShape {
    #[default]
    Circle,
    Square,
    Diamond,
    Triangle,
}

/// How event markers are drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct MarkerStyle {
    pub(crate) shape: MarkerShape,
    pub(crate) fill: Color,
    pub(crate) stroke: Color,
    pub(crate) stroke_width: f64,
}

/// Colors for everything that isn't a marker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Palette {
    pub(crate) background: Color,
    pub(crate) timeline: Color,
    pub(crate) text: Color,
    pub(crate) notes: Color,
}

/// Rendering attributes of one stacked element; indices match
/// [`LayoutConfig::elements`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ElementStyle {
    pub(crate) weight: FontWeight,
    pub(crate) color: Color,
}

/// A loaded style: layout knobs plus everything the renderer needs.
#[derive(Clone, Debug)]
pub(crate) struct Style {
    pub(crate) layout: LayoutConfig,
    pub(crate) family: FontFamily,
    pub(crate) line_width: f64,
    pub(crate) marker: MarkerStyle,
    pub(crate) palette: Palette,
    pub(crate) elements: Vec<ElementStyle>,
    pub(crate) show_times: bool,
    pub(crate) timestamp_column: String,
}

impl Default for Style {
    fn default() -> Self {
        let layout = LayoutConfig::default();
        let palette = Palette {
            background: Color::from_rgba8(0xff, 0xff, 0xff, 0xff),
            timeline: Color::from_rgba8(0x33, 0x33, 0x33, 0xff),
            text: Color::from_rgba8(0x33, 0x33, 0x33, 0xff),
            notes: Color::from_rgba8(0x66, 0x66, 0x66, 0xff),
        };
        let elements = default_element_styles(&layout, &palette);
        Self {
            layout,
            family: FontFamily::SansSerif,
            line_width: 2.0,
            marker: MarkerStyle {
                shape: MarkerShape::Circle,
                fill: Color::from_rgba8(0x42, 0x85, 0xf4, 0xff),
                stroke: Color::from_rgba8(0xff, 0xff, 0xff, 0xff),
                stroke_width: 2.0,
            },
            palette,
            elements,
            show_times: true,
            timestamp_column: "timestamp".to_string(),
        }
    }
}

/// Titles are bold, notes use the notes color.
fn default_element_style(name: &str, palette: &Palette) -> ElementStyle {
    ElementStyle {
        weight: if name == "title" {
            FontWeight::BOLD
        } else {
            FontWeight::NORMAL
        },
        color: if name == "notes" {
            palette.notes
        } else {
            palette.text
        },
    }
}

fn default_element_styles(layout: &LayoutConfig, palette: &Palette) -> Vec<ElementStyle> {
    layout
        .elements
        .iter()
        .map(|e| default_element_style(&e.name, palette))
        .collect()
}

impl Style {
    /// Parses a style document on top of the defaults.
    pub(crate) fn from_toml(source: &str) -> Result<Self, StyleError> {
        let doc: StyleDoc = toml::from_str(source)?;
        let mut style = Self::default();

        let canvas = &doc.canvas;
        let layout = &mut style.layout;
        layout.canvas = Size::new(
            canvas.width.unwrap_or(layout.canvas.width),
            canvas.height.unwrap_or(layout.canvas.height),
        );
        let m = layout.margins;
        layout.margins = Margins {
            top: canvas.margin_top.unwrap_or(m.top),
            right: canvas.margin_right.unwrap_or(m.right),
            bottom: canvas.margin_bottom.unwrap_or(m.bottom),
            left: canvas.margin_left.unwrap_or(m.left),
        };

        let t = &doc.timeline;
        set(&mut layout.horizontal_buffer, t.horizontal_buffer);
        set(&mut layout.avoid_text_overlap, t.avoid_text_overlap);
        set(&mut layout.min_callout, t.min_callout_length);
        set(&mut layout.max_callout, t.max_callout_length);
        set(&mut layout.text_element_padding, t.text_element_padding);
        set(&mut layout.callout_text_gap, t.callout_text_gap);
        set(&mut style.line_width, t.line_width);
        set(&mut style.show_times, t.show_times);
        if let Some(column) = &t.timestamp_column {
            style.timestamp_column.clone_from(column);
        }

        let mk = &doc.marker;
        set(&mut style.marker.shape, mk.shape);
        set(&mut layout.marker_size, mk.size);
        set(&mut style.marker.stroke_width, mk.stroke_width);
        set_color(&mut style.marker.fill, "marker.fill_color", &mk.fill_color)?;
        set_color(&mut style.marker.stroke, "marker.stroke_color", &mk.stroke_color)?;

        let c = &doc.colors;
        set_color(&mut style.palette.background, "colors.background", &c.background)?;
        set_color(&mut style.palette.timeline, "colors.timeline", &c.timeline)?;
        set_color(&mut style.palette.text, "colors.text", &c.text)?;
        set_color(&mut style.palette.notes, "colors.notes", &c.notes)?;

        if let Some(family) = &doc.font.family {
            // Only the first entry of a CSS fallback list is used for measurement.
            let first = family.split(',').next().unwrap_or("");
            style.family = FontFamily::from_css(first.trim().trim_matches(['"', '\'']));
        }
        let base_size = doc.font.size;
        if let Some(size) = base_size {
            for e in &mut layout.elements {
                e.font_size = size;
            }
        }

        if doc.elements.is_empty() {
            style.elements = default_element_styles(layout, &style.palette);
        } else {
            let defaults = LayoutConfig::default();
            let mut elements = Vec::with_capacity(doc.elements.len());
            let mut element_styles = Vec::with_capacity(doc.elements.len());
            for e in &doc.elements {
                let name = e.name.trim().to_lowercase();
                let fallback = defaults.elements.iter().find(|d| d.name == name);
                let mut element = TextElement::new(
                    name.as_str(),
                    e.font_size
                        .or(base_size)
                        .or(fallback.map(|d| d.font_size))
                        .unwrap_or(12.0),
                );
                element.wrap_chars = e.wrap_chars.or(fallback.and_then(|d| d.wrap_chars));

                let mut styled = default_element_style(&element.name, &style.palette);
                if let Some(w) = &e.font_weight {
                    styled.weight =
                        FontWeight::from_css(w).ok_or_else(|| StyleError::FontWeight(w.clone()))?;
                }
                set_color(&mut styled.color, "elements.color", &e.color)?;

                elements.push(element);
                element_styles.push(styled);
            }
            layout.elements = elements;
            style.elements = element_styles;
        }

        style.validate()?;
        Ok(style)
    }

    fn validate(&self) -> Result<(), StyleError> {
        let l = &self.layout;
        if !(l.canvas.width > 0.0 && l.canvas.height > 0.0) {
            return Err(knob("canvas", "width and height must be positive"));
        }
        if l.min_callout < 0.0 {
            return Err(knob("timeline.min_callout_length", "must not be negative"));
        }
        if l.max_callout < l.min_callout {
            return Err(knob(
                "timeline.max_callout_length",
                format!("{} is below the minimum {}", l.max_callout, l.min_callout),
            ));
        }
        if l.marker_size <= 0.0 {
            return Err(knob("marker.size", "must be positive"));
        }
        if l.elements.iter().any(|e| e.font_size <= 0.0) {
            return Err(knob("elements.font_size", "must be positive"));
        }
        Ok(())
    }
}

fn knob(key: &'static str, reason: impl Into<String>) -> StyleError {
    StyleError::Knob {
        key,
        reason: reason.into(),
    }
}

fn set<T: Copy>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

fn set_color(slot: &mut Color, key: &str, value: &Option<String>) -> Result<(), StyleError> {
    if let Some(raw) = value {
        *slot = parse_hex_color(raw).ok_or_else(|| StyleError::Color {
            key: key.to_string(),
            value: raw.clone(),
        })?;
    }
    Ok(())
}

/// Parses `#rgb`, `#rrggbb` or `#rrggbbaa` (the `#` is optional).
pub(crate) fn parse_hex_color(raw: &str) -> Option<Color> {
    let hex = raw.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => {
            let mut rgb = [0_u8; 3];
            for (slot, c) in rgb.iter_mut().zip(hex.chars()) {
                let v = u8::try_from(c.to_digit(16)?).ok()?;
                *slot = v * 17;
            }
            Some(Color::from_rgba8(rgb[0], rgb[1], rgb[2], 0xff))
        }
        6 => Some(Color::from_rgba8(byte(0)?, byte(2)?, byte(4)?, 0xff)),
        8 => Some(Color::from_rgba8(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}
