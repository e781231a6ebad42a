// Copyright 2025 the Chronoline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parley-backed text measurement for chronoline.
//!
//! [`ParleyTextMeasurer`] implements [`chronoline_text::TextMeasurer`] with real
//! shaping, so callout text blocks can be sized from actual font metrics instead
//! of the constant-factor estimate. The layout engine only sees the trait, so the
//! two measurers are interchangeable.

#![no_std]

extern crate alloc;

use alloc::borrow::Cow;
use core::cell::RefCell;

use chronoline_text::{FontFamily, FontWeight, TextExtent, TextMeasurer};
use parley::style::{FontFamily as ParleyFontFamily, FontStack, GenericFamily, StyleProperty};
use parley::{Alignment, AlignmentOptions, FontContext, FontWeight as ParleyFontWeight};

/// A [`TextMeasurer`] backed by Parley.
///
/// Every call measures the first line of `text` with the measurer's font family
/// and weight; the font size comes from the caller.
pub struct ParleyTextMeasurer {
    font_cx: RefCell<FontContext>,
    layout_cx: RefCell<parley::LayoutContext<()>>,
    family: FontFamily,
    weight: FontWeight,
    display_scale: f32,
}

impl core::fmt::Debug for ParleyTextMeasurer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ParleyTextMeasurer")
            .field("family", &self.family)
            .field("weight", &self.weight)
            .field("display_scale", &self.display_scale)
            .finish_non_exhaustive()
    }
}

impl ParleyTextMeasurer {
    /// Creates a sans-serif, normal-weight measurer using the system font collection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            font_cx: RefCell::new(FontContext::new()),
            layout_cx: RefCell::new(parley::LayoutContext::new()),
            family: FontFamily::SansSerif,
            weight: FontWeight::NORMAL,
            display_scale: 1.0,
        }
    }

    /// Sets the font family used for every measurement.
    #[must_use]
    pub fn with_family(mut self, family: FontFamily) -> Self {
        self.family = family;
        self
    }

    /// Sets the font weight used for every measurement.
    #[must_use]
    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    /// Sets the display scale (device pixel ratio) passed to Parley.
    ///
    /// Extents are divided by the scale, so results stay in logical units.
    #[must_use]
    pub fn with_display_scale(mut self, display_scale: f32) -> Self {
        self.display_scale = display_scale.max(0.0);
        self
    }

    fn font_stack(&self) -> FontStack<'_> {
        let family = match &self.family {
            FontFamily::Serif => ParleyFontFamily::Generic(GenericFamily::Serif),
            FontFamily::SansSerif => ParleyFontFamily::Generic(GenericFamily::SansSerif),
            FontFamily::Monospace => ParleyFontFamily::Generic(GenericFamily::Monospace),
            FontFamily::Named(name) => ParleyFontFamily::Named(Cow::Borrowed(name.as_ref())),
        };
        FontStack::from(family)
    }
}

impl Default for ParleyTextMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

fn font_size_f32(font_size: f64) -> f32 {
    if !font_size.is_finite() || font_size <= 0.0 {
        return 0.0;
    }
    #[allow(
        clippy::cast_possible_truncation,
        reason = "font sizes are small; values past f32::MAX saturate"
    )]
    {
        font_size.min(f64::from(f32::MAX)) as f32
    }
}

impl TextMeasurer for ParleyTextMeasurer {
    fn measure(&self, text: &str, font_size: f64) -> TextExtent {
        let text = text.lines().next().unwrap_or("");
        let size = font_size_f32(font_size);
        if text.is_empty() || size == 0.0 {
            return TextExtent::ZERO;
        }

        let scale = self.display_scale.max(1.0e-6);
        let mut font_cx = self.font_cx.borrow_mut();
        let mut layout_cx = self.layout_cx.borrow_mut();

        let mut builder = layout_cx.ranged_builder(&mut font_cx, text, scale, true);
        builder.push_default(StyleProperty::FontSize(size));
        builder.push_default(StyleProperty::FontStack(self.font_stack()));
        builder.push_default(StyleProperty::FontWeight(ParleyFontWeight::new(f32::from(
            self.weight.0,
        ))));

        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(None, Alignment::Start, AlignmentOptions::default());

        layout.lines().next().map_or(TextExtent::ZERO, |line| {
            let m = line.metrics();
            let scale = f64::from(scale);
            TextExtent::new(
                f64::from(m.advance) / scale,
                f64::from(m.ascent + m.descent + m.leading) / scale,
            )
        })
    }
}
