//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - likelihood curve: `-` line
//! - marker (optimized θ̂): `|` column, `*` where it crosses the curve

use std::io::Write;

use crate::plot::{PlotRequest, PlotSink};

/// Plot sink that renders into any writer (stdout in the binary).
pub struct AsciiPlot<W: Write> {
    pub width: usize,
    pub height: usize,
    out: W,
}

impl<W: Write> AsciiPlot<W> {
    pub fn new(out: W, width: usize, height: usize) -> Self {
        Self { width, height, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> PlotSink for AsciiPlot<W> {
    fn plot(&mut self, request: &PlotRequest<'_>) -> std::io::Result<()> {
        let txt = render_ascii_plot(request, self.width, self.height);
        self.out.write_all(txt.as_bytes())?;
        self.out.flush()
    }
}

/// Render a plot request to a string.
pub fn render_ascii_plot(request: &PlotRequest<'_>, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let points = &request.curve.points;

    let (x_min, x_max) = x_range(points).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = y_range(points, request.y_min).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    draw_curve(&mut grid, points, x_min, x_max, y_min, y_max);

    let marker = request
        .marker
        .filter(|m| m.is_finite() && *m >= x_min && *m <= x_max);
    if let Some(m) = marker {
        let x = map_x(m, x_min, x_max, width);
        for row in grid.iter_mut() {
            row[x] = if row[x] == ' ' { '|' } else { '*' };
        }
    }

    let mut out = String::new();
    if let Some(title) = &request.title {
        out.push_str(title);
        out.push('\n');
    }
    out.push_str(&format!(
        "Plot: {x}=[{x_min:.3}, {x_max:.3}] | {y}=[{y_min:.2}, {y_max:.2}]\n",
        x = request.x_label,
        y = request.y_label,
    ));
    if let Some(m) = marker {
        out.push_str(&format!("Marker: {} = {m:.6}\n", request.x_label));
    }

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    if let Some(caption) = &request.caption {
        out.push_str(caption);
        out.push('\n');
    }

    out
}

fn x_range(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for &(x, _) in points {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
    }
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

fn y_range(points: &[(f64, f64)], floor: Option<f64>) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in points {
        if !y.is_finite() {
            continue;
        }
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if let Some(floor) = floor.filter(|f| f.is_finite() && *f < max_y) {
        min_y = min_y.max(floor);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in curve {
        if !y.is_finite() {
            prev = None;
            continue;
        }
        let x = map_x(t, x_min, x_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, yy, '-');
        } else {
            grid[yy][x] = '-';
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LikelihoodCurve;

    fn request(curve: &LikelihoodCurve, marker: Option<f64>) -> PlotRequest<'_> {
        PlotRequest {
            curve,
            marker,
            x_label: "theta",
            y_label: "log-likelihood",
            title: None,
            caption: None,
            y_min: None,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let curve = LikelihoodCurve {
            points: vec![(1.0, 0.0), (2.0, 10.0)],
        };
        let txt = render_ascii_plot(&request(&curve, Some(1.5)), 10, 5);
        let expected = concat!(
            "Plot: theta=[1.000, 2.000] | log-likelihood=[-0.50, 10.50]\n",
            "Marker: theta = 1.500000\n",
            "     |  --\n",
            "     |--  \n",
            "    -*    \n",
            "  -- |    \n",
            "--   |    \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn marker_outside_range_is_dropped() {
        let curve = LikelihoodCurve {
            points: vec![(1.0, 0.0), (2.0, 10.0)],
        };
        let txt = render_ascii_plot(&request(&curve, Some(5.0)), 10, 5);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 6, "{txt}");
        assert!(lines[0].starts_with("Plot: "));
        assert!(!txt.contains("Marker"));
        // The header separates the axis ranges with '|'; the grid must not
        // contain a marker column.
        for row in &lines[1..] {
            assert!(!row.contains('|') && !row.contains('*'), "row {row:?}");
        }
    }

    #[test]
    fn sink_writes_rendered_text() {
        let curve = LikelihoodCurve {
            points: vec![(1.0, -3.0), (2.0, -1.0), (3.0, -2.0)],
        };
        let mut sink = AsciiPlot::new(Vec::new(), 20, 6);
        sink.plot(&request(&curve, Some(2.0))).unwrap();
        let txt = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(txt, render_ascii_plot(&request(&curve, Some(2.0)), 20, 6));
        assert!(txt.contains('*'));
    }
}
