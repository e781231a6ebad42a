// Copyright 2025 the Chronoline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal SVG output for laid-out timelines.

use chronoline_layout::{CalloutPlacement, CalloutSide};
use kurbo::{BezPath, Circle, Point, Rect, Shape};
use peniko::Color;

use crate::style::{MarkerShape, Style};

/// Serializes a finished layout.
///
/// Draw order: background, axis, then per point its callout line, marker and
/// text, so later points paint over earlier ones.
pub(crate) fn render_timeline(style: &Style, axis_y: f64, placements: &[CalloutPlacement]) -> String {
    let layout = &style.layout;
    let (w, h) = (layout.canvas.width, layout.canvas.height);
    let mut out = String::new();

    out.push_str(r#"<svg xmlns="http://www.w3.org/2000/svg" "#);
    out.push_str(&format!(r#"viewBox="0 0 {w} {h}" width="{w}" height="{h}">"#));
    out.push('\n');

    out.push_str(&format!(r#"<rect x="0" y="0" width="{w}" height="{h}""#));
    write_paint_attr(&mut out, "fill", style.palette.background);
    out.push_str("/>\n");

    let (x0, x1) = (layout.margins.left, w - layout.margins.right);
    out.push_str(&format!(r#"<line x1="{x0}" y1="{axis_y}" x2="{x1}" y2="{axis_y}""#));
    write_paint_attr(&mut out, "stroke", style.palette.timeline);
    out.push_str(&format!(r#" stroke-width="{}"/>"#, style.line_width));
    out.push('\n');

    for placed in placements {
        write_callout_line(&mut out, style, axis_y, placed);
        write_marker(&mut out, style, Point::new(placed.state.x, axis_y));
        write_text(&mut out, style, placed);
    }

    out.push_str("</svg>\n");
    out
}

fn write_callout_line(out: &mut String, style: &Style, axis_y: f64, placed: &CalloutPlacement) {
    let x = placed.state.x;
    let end = placed.block.anchor_y;
    if placed.state.callout_length > style.layout.min_callout + 10.0 {
        let dir = match placed.state.side {
            CalloutSide::Above => -1.0,
            CalloutSide::Below => 1.0,
        };
        let step = axis_y + dir * placed.state.callout_length / 3.0;
        out.push_str(&format!(r#"<path d="M{x},{axis_y} L{x},{step} L{x},{end}" fill="none""#));
    } else {
        out.push_str(&format!(r#"<line x1="{x}" y1="{axis_y}" x2="{x}" y2="{end}""#));
    }
    write_paint_attr(out, "stroke", style.palette.timeline);
    out.push_str(r#" stroke-width="1"/>"#);
    out.push('\n');
}

fn write_marker(out: &mut String, style: &Style, center: Point) {
    let path = marker_path(style.marker.shape, center, style.layout.marker_size);
    out.push_str(&format!(r#"<path d="{}""#, path.to_svg()));
    write_paint_attr(out, "fill", style.marker.fill);
    if style.marker.stroke_width > 0.0 {
        write_paint_attr(out, "stroke", style.marker.stroke);
        out.push_str(&format!(r#" stroke-width="{}""#, style.marker.stroke_width));
    }
    out.push_str("/>\n");
}

/// Outline of a marker; `size` is the radius for circles and the side length otherwise.
fn marker_path(shape: MarkerShape, c: Point, size: f64) -> BezPath {
    let half = size / 2.0;
    match shape {
        MarkerShape::Circle => Circle::new(c, size).to_path(0.1),
        MarkerShape::Square => {
            Rect::new(c.x - half, c.y - half, c.x + half, c.y + half).to_path(0.1)
        }
        MarkerShape::Diamond => polygon(&[
            (c.x, c.y - half),
            (c.x + half, c.y),
            (c.x, c.y + half),
            (c.x - half, c.y),
        ]),
        MarkerShape::Triangle => {
            let height = size * 3.0_f64.sqrt() / 2.0;
            polygon(&[
                (c.x, c.y - height * 2.0 / 3.0),
                (c.x + half, c.y + height / 3.0),
                (c.x - half, c.y + height / 3.0),
            ])
        }
    }
}

fn polygon(points: &[(f64, f64)]) -> BezPath {
    let mut path = BezPath::new();
    for (i, &p) in points.iter().enumerate() {
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    path
}

fn write_text(out: &mut String, style: &Style, placed: &CalloutPlacement) {
    let lines = placed.stack.lines();
    let family = escape_xml(style.family.as_css_family());
    for line_place in &placed.block.lines {
        let Some(line) = lines.get(line_place.line) else {
            continue;
        };
        let Some(element) = style.elements.get(line.element) else {
            continue;
        };
        let y = (line_place.top + line_place.bottom) / 2.0;
        out.push_str(&format!(
            r#"<text x="{}" y="{y}" text-anchor="middle" dominant-baseline="middle" font-family="{family}" font-size="{}" font-weight="{}""#,
            placed.state.x, line.font_size, element.weight.0
        ));
        write_paint_attr(out, "fill", element.color);
        out.push('>');
        out.push_str(&escape_xml(&line.text));
        out.push_str("</text>\n");
    }
}

fn svg_paint(color: Color) -> (String, Option<f64>) {
    let rgba = color.to_rgba8();
    let fill = format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b);
    let opacity = if rgba.a == 255 {
        None
    } else {
        Some(f64::from(rgba.a) / 255.0)
    };
    (fill, opacity)
}

fn write_paint_attr(out: &mut String, name: &str, color: Color) {
    let (value, opacity) = svg_paint(color);
    out.push_str(&format!(r#" {name}="{value}""#));
    if let Some(o) = opacity {
        out.push_str(&format!(r#" {name}-opacity="{o}""#));
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chronoline_layout::{HeuristicTextMeasurer, TimePoint, TimelineLayout, Timestamp};

    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml(r#"a<b & "c"'"#), "a&lt;b &amp; &quot;c&quot;&apos;");
    }

    #[test]
    fn translucent_colors_get_an_opacity() {
        let (fill, opacity) = svg_paint(Color::from_rgba8(0x10, 0x20, 0x30, 0x80));
        assert_eq!(fill, "#102030");
        assert!(opacity.is_some_and(|o| (o - 128.0 / 255.0).abs() < 1e-12), "{opacity:?}");
        assert_eq!(svg_paint(Color::from_rgba8(0, 0, 0, 255)).1, None);
    }

    #[test]
    fn marker_shapes_are_closed_paths_around_the_center() {
        let c = Point::new(100.0, 50.0);
        for shape in [
            MarkerShape::Circle,
            MarkerShape::Square,
            MarkerShape::Diamond,
            MarkerShape::Triangle,
        ] {
            let path = marker_path(shape, c, 8.0);
            let bounds = path.bounding_box();
            assert!(bounds.contains(c), "{shape:?} contains its center");
            assert!(bounds.width() <= 16.0 + 1e-9, "{shape:?} is marker sized");
        }
    }

    #[test]
    fn renders_every_point() {
        let style = Style::default();
        let m = HeuristicTextMeasurer::default();
        let points = [
            TimePoint::new(Timestamp::from_seconds(0))
                .with_attribute("title", "Fish & chips")
                .with_attribute("timestamp", "2024-03-04"),
            TimePoint::new(Timestamp::from_seconds(36_000)).with_attribute("title", "Dessert"),
        ];
        let engine = TimelineLayout::new(&style.layout, &m);
        let outcome = engine.run(&points);
        let svg = render_timeline(&style, engine.axis_y(), &engine.placements(&points, &outcome.states));

        assert!(svg.starts_with("<svg"), "svg root");
        assert!(svg.trim_end().ends_with("</svg>"), "closed root");
        assert_eq!(svg.matches("<text ").count(), 3, "two titles and one timestamp");
        assert!(svg.contains("Fish &amp; chips"), "text is escaped");
        assert!(svg.contains(r#"font-weight="700""#), "titles are bold");
    }

    #[test]
    fn one_element_per_line() {
        let style = Style::default();
        let svg = render_timeline(&style, 400.0, &[]);
        let lines: Vec<&str> = svg.lines().collect();
        assert_eq!(lines.len(), 4, "root, background, axis, close: {svg}");
        assert!(lines[1].starts_with("<rect ") && lines[1].ends_with("/>"), "{}", lines[1]);
        assert!(lines[2].starts_with("<line "), "{}", lines[2]);
        assert!(lines[2].ends_with(r#"stroke-width="2"/>"#), "{}", lines[2]);
        assert_eq!(lines[3], "</svg>");
    }
}
