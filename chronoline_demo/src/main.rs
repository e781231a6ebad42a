// Copyright 2025 the Chronoline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timeline demo for `chronoline_layout`.
//!
//! Reads the bundled sprint CSV and style document, lays the events out and
//! writes `chronoline_demo.svg`. Set `RUST_LOG=debug` to watch the layout
//! phases.

mod input;
mod style;
mod svg;

use chronoline_layout::TimelineLayout;
use chronoline_text::TextMeasurer;
use thiserror::Error;

use crate::input::{InputError, InputOptions};
use crate::style::{Style, StyleError};

const EVENTS: &str = include_str!("../data/sprint.csv");
const STYLE: &str = include_str!("../data/style.toml");
const OUTPUT: &str = "chronoline_demo.svg";

/// Anything that can stop the demo.
#[derive(Debug, Error)]
enum DemoError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Style(#[from] StyleError),
    #[error("writing the SVG failed: {0}")]
    Io(#[from] std::io::Error),
}

fn main() -> Result<(), DemoError> {
    env_logger::init();

    let style = Style::from_toml(STYLE)?;
    let options = InputOptions {
        timestamp_column: style.timestamp_column.clone(),
        show_times: style.show_times,
    };
    let points = input::read_points(EVENTS.as_bytes(), &options)?;

    let measurer = demo_measurer(&style);
    let engine = TimelineLayout::new(&style.layout, measurer.as_ref());
    let outcome = engine.run(&points);
    let report = &outcome.report;
    log::info!(
        "cluster of {}, distortion {:.1} -> {:.1}, {} overlap(s) left",
        report.cluster_size,
        report.baseline_distortion,
        report.optimized_distortion,
        report.remaining_overlaps
    );

    let placements = engine.placements(&points, &outcome.states);
    let svg = svg::render_timeline(&style, engine.axis_y(), &placements);
    std::fs::write(OUTPUT, svg)?;
    println!("wrote {OUTPUT}");
    Ok(())
}

#[cfg(feature = "parley")]
fn demo_measurer(style: &Style) -> Box<dyn TextMeasurer> {
    Box::new(chronoline_text_parley::ParleyTextMeasurer::new().with_family(style.family.clone()))
}

#[cfg(not(feature = "parley"))]
fn demo_measurer(_style: &Style) -> Box<dyn TextMeasurer> {
    Box::new(chronoline_text::HeuristicTextMeasurer::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_data_lays_out() {
        let style = Style::from_toml(STYLE).expect("bundled style is valid");
        let options = InputOptions {
            timestamp_column: style.timestamp_column.clone(),
            show_times: style.show_times,
        };
        let points = input::read_points(EVENTS.as_bytes(), &options).expect("bundled csv is valid");
        assert_eq!(points.len(), 10);

        let measurer = chronoline_text::HeuristicTextMeasurer::default();
        let engine = TimelineLayout::new(&style.layout, &measurer);
        let outcome = engine.run(&points);
        assert_eq!(outcome.report.cluster_size, 5, "the first morning is one cluster");
        let span = style.layout.timeline_span();
        assert!(
            outcome.states.iter().all(|s| span.contains(s.x)),
            "every marker inside the span"
        );
    }

    #[test]
    fn demo_measurer_sizes_text() {
        let measurer = demo_measurer(&Style::default());
        let extent = measurer.measure("Kickoff", 12.0);
        assert!(extent.width > 0.0, "width was {}", extent.width);
        assert!(extent.height > 0.0, "height was {}", extent.height);
    }
}
