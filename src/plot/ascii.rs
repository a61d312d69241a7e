//! ASCII plotting for terminal output.
//!
//! Fixed-size grid, deterministic output (helpful for golden tests).
//!
//! Plot elements:
//! - free-energy profile points: `o`
//! - fitted potential: `-` line

use crate::domain::{FreeEnergyProfile, FunctionalForm};
use crate::models::evaluate;

/// Render a profile with the fitted potential of `form` overlaid.
pub fn render_fit_plot(
    profile: &FreeEnergyProfile,
    form: FunctionalForm,
    params: &[f64],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = x_range(profile).unwrap_or((0.0, 1.0));
    let curve = sample_curve(form, params, x_min, x_max, width);
    let points: Vec<(f64, f64)> = profile
        .coords
        .iter()
        .zip(&profile.energies)
        .map(|(&x, &e)| (x, e))
        .collect();

    let (y_min, y_max) = y_range(&points, &curve).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curve first so points overlay it.
    draw_curve(&mut grid, &curve, x_min, x_max, y_min, y_max);

    for &(x, e) in &points {
        if !e.is_finite() {
            continue;
        }
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(e, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} | x=[{x_min:.3}, {x_max:.3}] | E=[{y_min:.2}, {y_max:.2}] kJ/mol\n",
        form.display_name()
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn x_range(profile: &FreeEnergyProfile) -> Option<(f64, f64)> {
    let min_x = profile.coords.iter().copied().fold(f64::INFINITY, f64::min);
    let max_x = profile.coords.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else if min_x.is_finite() {
        // Single bin: widen so it lands mid-plot.
        Some((min_x - 0.5, min_x + 0.5))
    } else {
        None
    }
}

fn sample_curve(form: FunctionalForm, params: &[f64], x_min: f64, x_max: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let x = x_min + u * (x_max - x_min);
            (x, evaluate(form, x, params))
        })
        .collect()
}

fn y_range(points: &[(f64, f64)], curve: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in points.iter().chain(curve) {
        if y.is_finite() {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
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

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // Row 0 is the top (highest energy).
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        if !y.is_finite() {
            prev = None;
            continue;
        }
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, '-'),
            None => grid[row][col] = '-',
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let (mut x0, mut y0) = (x0 as isize, y0 as isize);
    let (x1, y1) = (x1 as isize, y1 as isize);

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if let Some(cell) = grid
            .get_mut(y0 as usize)
            .and_then(|row| row.get_mut(x0 as usize))
        {
            if *cell == ' ' {
                *cell = ch;
            }
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
