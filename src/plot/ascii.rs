//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - emissions: `o` points joined by `-`
//! - anomaly: `*` points joined by `.`
//!
//! In the dual chart each series is scaled to its own y-range, so the two
//! shapes can be compared even though their units differ by orders of magnitude.

use crate::domain::{AlignedTable, ChartKind};

struct Series {
    label: &'static str,
    points: Vec<(f64, f64)>,
    point: char,
    line: char,
}

/// Render one of the three charts for an aligned table.
pub fn render_ascii_chart(table: &AlignedTable, kind: ChartKind, width: usize, height: usize) -> String {
    let (Some(first), Some(last)) = (table.first_year(), table.last_year()) else {
        return "Plot: no aligned data\n".to_string();
    };

    let emissions = Series {
        label: "emissions",
        points: table.emissions_points(),
        point: 'o',
        line: '-',
    };
    let anomaly = Series {
        label: "anomaly",
        points: table.anomaly_points(),
        point: '*',
        line: '.',
    };

    let series = match kind {
        ChartKind::Emissions => vec![emissions],
        ChartKind::Anomaly => vec![anomaly],
        ChartKind::Dual => vec![emissions, anomaly],
    };

    render_plot(&series, first, last, width, height)
}

fn render_plot(series: &[Series], first: i32, last: i32, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = if last > first {
        (f64::from(first), f64::from(last))
    } else {
        // A single year still gets a centered column.
        (f64::from(first) - 1.0, f64::from(last) + 1.0)
    };

    let ranges: Vec<(f64, f64)> = series
        .iter()
        .map(|s| {
            let (lo, hi) = y_range(&s.points).unwrap_or((0.0, 1.0));
            pad_range(lo, hi, 0.05)
        })
        .collect();

    let mut grid = vec![vec![' '; width]; height];

    // Draw lines first (so points can overlay).
    for (s, &(y_min, y_max)) in series.iter().zip(&ranges) {
        draw_series_line(&mut grid, s, x_min, x_max, y_min, y_max);
    }
    for (s, &(y_min, y_max)) in series.iter().zip(&ranges) {
        for &(x, y) in &s.points {
            let col = map_x(x, x_min, x_max, width);
            let row = map_y(y, y_min, y_max, height);
            grid[row][col] = s.point;
        }
    }

    let mut out = String::new();
    out.push_str(&format!("Plot: year=[{first}, {last}]"));
    for (s, (y_min, y_max)) in series.iter().zip(&ranges) {
        if series.len() > 1 {
            out.push_str(&format!(" | {}({})=[{y_min:.2}, {y_max:.2}]", s.label, s.point));
        } else {
            out.push_str(&format!(" | {}=[{y_min:.2}, {y_max:.2}]", s.label));
        }
    }
    out.push('\n');

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn y_range(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in points {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if !(min_y.is_finite() && max_y.is_finite()) {
        None
    } else if max_y > min_y {
        Some((min_y, max_y))
    } else {
        Some((min_y - 1.0, max_y + 1.0))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_series_line(grid: &mut [Vec<char>], series: &Series, x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in &series.points {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, series.line);
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham). Only fills blank cells.
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
    use crate::align::align;
    use crate::domain::YearlySeries;

    fn table(rows: &[(i32, f64, f64)]) -> AlignedTable {
        let emissions: YearlySeries = rows.iter().map(|&(y, e, _)| (y, e)).collect();
        let anomaly: YearlySeries = rows.iter().map(|&(y, _, a)| (y, a)).collect();
        align(&emissions, &anomaly)
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let t = table(&[(2000, 10.0, 0.5), (2001, 20.0, 0.7)]);
        let txt = render_ascii_chart(&t, ChartKind::Emissions, 10, 5);
        let expected = concat!(
            "Plot: year=[2000, 2001] | emissions=[9.50, 20.50]\n",
            "        -o\n",
            "      --  \n",
            "    --    \n",
            "  --      \n",
            "o-        \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn dual_chart_scales_each_series() {
        let t = table(&[(2000, 10.0, 1.0), (2001, 20.0, 0.0)]);
        let txt = render_ascii_chart(&t, ChartKind::Dual, 10, 5);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(
            lines[0],
            "Plot: year=[2000, 2001] | emissions(o)=[9.50, 20.50] | anomaly(*)=[-0.05, 1.05]"
        );
        // Emissions rises left to right, anomaly falls; both hit their own extremes.
        assert_eq!(lines[1].chars().next(), Some('*'));
        assert_eq!(lines[1].chars().last(), Some('o'));
        assert_eq!(lines[5].chars().next(), Some('o'));
        assert_eq!(lines[5].chars().last(), Some('*'));
    }

    #[test]
    fn empty_table_has_placeholder() {
        let txt = render_ascii_chart(&AlignedTable::default(), ChartKind::Anomaly, 40, 10);
        assert_eq!(txt, "Plot: no aligned data\n");
    }

    #[test]
    fn single_year_is_centered() {
        let t = table(&[(1990, 5.0, 0.2)]);
        let txt = render_ascii_chart(&t, ChartKind::Anomaly, 11, 5);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[3], "     *     ");
    }
}
