//! ASCII plotting for terminal output.
//!
//! The 3D view lives in the TUI; here we draw a 2D slice of the fitted plane at a
//! fixed mass: distance (up) against pull force (across). This is intentionally
//! "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - fitted line at the chosen mass: `-`
//! - measured trials (all masses, projected): `o`
//! - the prediction: `X`

use crate::domain::{Coefficients, Observation, Prediction};
use crate::models::predict_distance;

/// Render the force/distance slice at `mass`.
pub fn render_force_slice(
    observations: &[Observation],
    coefficients: &Coefficients,
    mass: f64,
    prediction: Option<&Prediction>,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(8);
    let height = height.max(5);

    let mut forces: Vec<f64> = observations.iter().map(|o| o.force).collect();
    if let Some(p) = prediction {
        forces.push(p.force);
    }
    let (f_min, f_max) = span(&forces).unwrap_or((0.0, 1.0));

    let line = sample_line(coefficients, mass, f_min, f_max, width);

    let mut ys: Vec<f64> = observations.iter().map(|o| o.distance).collect();
    ys.extend(line.iter().map(|&(_, d)| d));
    if let Some(p) = prediction {
        ys.push(p.distance);
    }
    let (y_min, y_max) = span(&ys).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Line first so points overlay it.
    draw_polyline(&mut grid, &line, f_min, f_max, y_min, y_max);

    for o in observations {
        let x = map_x(o.force, f_min, f_max, width);
        let y = map_y(o.distance, y_min, y_max, height);
        grid[y][x] = 'o';
    }

    if let Some(p) = prediction {
        let x = map_x(p.force, f_min, f_max, width);
        let y = map_y(p.distance, y_min, y_max, height);
        grid[y][x] = 'X';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: mass={mass:.1}g | pull=[{f_min:.3}, {f_max:.3}] lbs | distance=[{y_min:.2}, {y_max:.2}] ft\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out.push_str("o trial  - fit at this mass  X prediction\n");
    out
}

/// Min/max of finite values, widened to a unit span around a single value.
fn span(values: &[f64]) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in values.iter().filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !(lo.is_finite() && hi.is_finite()) {
        return None;
    }
    if hi > lo {
        Some((lo, hi))
    } else {
        Some((lo - 1.0, hi + 1.0))
    }
}

fn sample_line(coefficients: &Coefficients, mass: f64, f_min: f64, f_max: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let f = f_min + u * (f_max - f_min);
            (f, predict_distance(coefficients, mass, f))
        })
        .collect()
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(v: f64, lo: f64, hi: f64, width: usize) -> usize {
    let u = ((v - lo) / (hi - lo)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(v: f64, lo: f64, hi: f64, height: usize) -> usize {
    let u = ((v - lo) / (hi - lo)).clamp(0.0, 1.0);
    // Largest distance on the top row.
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_polyline(grid: &mut [Vec<char>], pts: &[(f64, f64)], x_lo: f64, x_hi: f64, y_lo: f64, y_hi: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev: Option<(usize, usize)> = None;
    for &(x, y) in pts {
        let cx = map_x(x, x_lo, x_hi, width);
        let cy = map_y(y, y_lo, y_hi, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, cx, cy, '-'),
            None => grid[cy][cx] = '-',
        }
        prev = Some((cx, cy));
    }
}

/// Integer line drawing (Bresenham).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let (mut x, mut y) = (x0 as isize, y0 as isize);
    let (x1, y1) = (x1 as isize, y1 as isize);

    let dx = (x1 - x).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let dy = -(y1 - y).abs();
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if let Some(cell) = grid.get_mut(y as usize).and_then(|row| row.get_mut(x as usize)) {
            if *cell == ' ' {
                *cell = ch;
            }
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_golden_snapshot_small() {
        // distance = 2·pull regardless of mass.
        let c = Coefficients::new(0.0, 0.0, 2.0);
        let trials = [Observation::new(50.0, 1.0, 2.0), Observation::new(50.0, 5.0, 14.0)];
        let prediction = Prediction {
            mass: 50.0,
            distance: 6.0,
            force: 3.0,
        };

        let txt = render_force_slice(&trials, &c, 50.0, Some(&prediction), 9, 5);
        let expected = concat!(
            "Plot: mass=50.0g | pull=[1.000, 5.000] lbs | distance=[1.40, 14.60] ft\n",
            "        o\n",
            "        -\n",
            "     --- \n",
            "  --X    \n",
            "o-       \n",
            "o trial  - fit at this mass  X prediction\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_table_still_renders() {
        let c = Coefficients::new(1.0, 0.0, 1.0);
        let txt = render_force_slice(&[], &c, 100.0, None, 20, 6);
        assert_eq!(txt.lines().count(), 1 + 6 + 1);
        assert!(txt.contains('-'));
    }
}
