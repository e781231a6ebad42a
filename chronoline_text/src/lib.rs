// Copyright 2025 the Chronoline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text measurement hooks for timeline layout.
//!
//! The layout engine needs the extent of every label it stacks under a callout,
//! but glyph shaping belongs downstream. Layout code therefore depends on the
//! one-method [`TextMeasurer`] trait defined here:
//! - [`HeuristicTextMeasurer`] is the constant-factor estimator used by default,
//! - `chronoline_text_parley` provides a shaping-backed implementation.
//!
//! The crate is `no_std` (it uses `alloc` for wrapped lines and named families).

#![no_std]

extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

/// Text measurement capability consumed by the layout engine.
pub trait TextMeasurer {
    /// Measure `text` as a single line at `font_size`.
    fn measure(&self, text: &str, font_size: f64) -> TextExtent;
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for &T {
    fn measure(&self, text: &str, font_size: f64) -> TextExtent {
        (**self).measure(text, font_size)
    }
}

/// Width/height of a measured line, in canvas units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextExtent {
    /// Advance width of the line.
    pub width: f64,
    /// Line height (ascent + descent + leading).
    pub height: f64,
}

impl TextExtent {
    /// An empty extent.
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Creates an extent from a width and height.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A constant-factor text measurer.
///
/// Width is `char_width_em * font_size` per character, height is
/// `line_height_em * font_size`. The defaults (`0.6em` glyphs, `1.5em` lines)
/// deliberately overestimate line height so stacked labels keep some air.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeuristicTextMeasurer {
    /// Average glyph advance, in ems.
    pub char_width_em: f64,
    /// Line height, in ems.
    pub line_height_em: f64,
}

impl HeuristicTextMeasurer {
    /// Creates a measurer with explicit factors.
    #[must_use]
    pub const fn new(char_width_em: f64, line_height_em: f64) -> Self {
        Self {
            char_width_em,
            line_height_em,
        }
    }
}

impl Default for HeuristicTextMeasurer {
    fn default() -> Self {
        Self::new(0.6, 1.5)
    }
}

impl TextMeasurer for HeuristicTextMeasurer {
    fn measure(&self, text: &str, font_size: f64) -> TextExtent {
        let font_size = font_size.max(0.0);
        let width = self.char_width_em * font_size * text.chars().count() as f64;
        TextExtent::new(width, self.line_height_em * font_size)
    }
}

/// Greedy word wrap on whitespace.
///
/// Lines hold at most `max_chars` characters unless a single word is longer,
/// in which case that word gets a line of its own. Words are never split.
pub fn wrap_words(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_chars = 0_usize;

    for word in text.split_whitespace() {
        let word_chars = word.chars().count();
        if line_chars == 0 {
            line.push_str(word);
            line_chars = word_chars;
        } else if line_chars + 1 + word_chars <= max_chars {
            line.push(' ');
            line.push_str(word);
            line_chars += 1 + word_chars;
        } else {
            lines.push(core::mem::take(&mut line));
            line.push_str(word);
            line_chars = word_chars;
        }
    }

    if line_chars > 0 {
        lines.push(line);
    }
    lines
}

/// Font family selection for measurement and rendering.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontFamily {
    /// A generic serif family (CSS `serif`).
    Serif,
    /// A generic sans-serif family (CSS `sans-serif`).
    #[default]
    SansSerif,
    /// A generic monospace family (CSS `monospace`).
    Monospace,
    /// A named family (e.g. `"Inter"`, `"Helvetica Neue"`).
    Named(Arc<str>),
}

impl FontFamily {
    /// Parses a CSS-ish family name; generic keywords map to the generic variants.
    #[must_use]
    pub fn from_css(name: &str) -> Self {
        match name.trim() {
            "serif" => Self::Serif,
            "sans-serif" | "" => Self::SansSerif,
            "monospace" => Self::Monospace,
            other => Self::Named(Arc::from(other)),
        }
    }

    /// Returns the font family string for CSS-style font declarations.
    #[must_use]
    pub fn as_css_family(&self) -> &str {
        match self {
            Self::Serif => "serif",
            Self::SansSerif => "sans-serif",
            Self::Monospace => "monospace",
            Self::Named(name) => name,
        }
    }
}

/// CSS-style font weights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontWeight(pub u16);

impl FontWeight {
    /// Normal weight (`400`).
    pub const NORMAL: Self = Self(400);
    /// Bold weight (`700`).
    pub const BOLD: Self = Self(700);

    /// Parses `normal`, `bold` or a numeric weight.
    #[must_use]
    pub fn from_css(value: &str) -> Option<Self> {
        match value.trim() {
            "normal" => Some(Self::NORMAL),
            "bold" => Some(Self::BOLD),
            other => other.parse::<u16>().ok().filter(|w| (1..=1000).contains(w)).map(Self),
        }
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn heuristic_scales_with_char_count_and_font_size() {
        let m = HeuristicTextMeasurer::default();
        let e = m.measure("abcd", 10.0);
        assert!((e.width - 24.0).abs() < 1e-9, "width was {}", e.width);
        assert!((e.height - 15.0).abs() < 1e-9, "height was {}", e.height);
        assert_eq!(m.measure("", 10.0).width, 0.0, "empty text has no width");
    }

    #[test]
    fn heuristic_counts_chars_not_bytes() {
        let m = HeuristicTextMeasurer::default();
        assert_eq!(
            m.measure("ééé", 10.0).width,
            m.measure("eee", 10.0).width,
            "multi-byte glyphs count once"
        );
    }

    #[test]
    fn wrap_keeps_long_words_whole() {
        let lines = wrap_words("a supercalifragilistic word", 10);
        assert_eq!(lines, ["a", "supercalifragilistic", "word"]);
    }

    #[test]
    fn wrap_packs_words_up_to_limit() {
        let lines = wrap_words("one two three four", 9);
        assert_eq!(lines, ["one two", "three", "four"]);
        assert!(wrap_words("   ", 5).is_empty(), "blank text wraps to nothing");
    }

    #[test]
    fn font_descriptors_parse_css_values() {
        assert_eq!(FontFamily::from_css("monospace"), FontFamily::Monospace);
        assert_eq!(FontFamily::from_css(" Inter ").as_css_family(), "Inter");
        assert_eq!(FontWeight::from_css("bold"), Some(FontWeight::BOLD));
        assert_eq!(FontWeight::from_css("600"), Some(FontWeight(600)));
        assert_eq!(FontWeight::from_css("heavy"), None);
    }
}
