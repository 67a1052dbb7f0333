//! Price against room count density, drawn as a joint plot: a 2-D kernel density heat map
//! with the 1-D densities of each axis along the top and right edges.

use std::f64::consts::PI;
use std::path::Path;

use anyhow::{anyhow, Result};
use plotters::prelude::*;
use tracing::info;

use crate::models::Post;

pub const DEFAULT_PLOT_PATH: &str = "price_rooms_density.svg";

/// Grid cells per axis for the heat map
const GRID_RESOLUTION: usize = 80;

/// Bandwidths of padding beyond the data on each side
const CUT: f64 = 3.0;

const LOW: (u8, u8, u8) = (255, 255, 255);
const HIGH: (u8, u8, u8) = (33, 78, 145);

/// (price, rooms) of every post carrying both
pub fn price_room_pairs(posts: &[Post]) -> Vec<(f64, f64)> {
    posts
        .iter()
        .filter_map(|p| Some((p.price? as f64, f64::from(p.rooms?))))
        .collect()
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample covariance (n - 1 denominator)
fn covariance(xs: &[f64], ys: &[f64]) -> f64 {
    let (mx, my) = (mean(xs), mean(ys));
    let sum: f64 = xs.iter().zip(ys).map(|(x, y)| (x - mx) * (y - my)).sum();
    sum / (xs.len() - 1) as f64
}

/// A zero-variance axis gets a unit spread so a kernel can still be placed on it
fn usable_variance(var: f64) -> f64 {
    if var > 1e-9 {
        var
    } else {
        1.0
    }
}

/// Gaussian kernel density over one variable, Scott's rule bandwidth
#[derive(Debug, Clone)]
pub struct Kde1d {
    samples: Vec<f64>,
    bandwidth: f64,
}

impl Kde1d {
    pub fn new(samples: Vec<f64>) -> Option<Self> {
        if samples.len() < 2 {
            return None;
        }
        let n = samples.len() as f64;
        let std = usable_variance(covariance(&samples, &samples)).sqrt();
        let bandwidth = std * n.powf(-1.0 / 5.0);
        Some(Self { samples, bandwidth })
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn density(&self, x: f64) -> f64 {
        let h = self.bandwidth;
        let sum: f64 = self
            .samples
            .iter()
            .map(|s| {
                let z = (x - s) / h;
                (-0.5 * z * z).exp()
            })
            .sum();
        sum / (self.samples.len() as f64 * h * (2.0 * PI).sqrt())
    }
}

/// Gaussian kernel density over two variables with a full covariance kernel
#[derive(Debug, Clone)]
pub struct Kde2d {
    points: Vec<(f64, f64)>,
    kernel: [[f64; 2]; 2],
    inverse: [[f64; 2]; 2],
    norm: f64,
}

impl Kde2d {
    pub fn new(points: &[(f64, f64)]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let n = points.len() as f64;
        let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.1).collect();

        let raw_x = covariance(&xs, &xs);
        let raw_y = covariance(&ys, &ys);
        let var_x = usable_variance(raw_x);
        let var_y = usable_variance(raw_y);
        let mut cov = if var_x == raw_x && var_y == raw_y {
            covariance(&xs, &ys)
        } else {
            0.0
        };
        // Perfectly correlated samples leave a singular kernel
        if var_x * var_y - cov * cov <= 1e-9 * var_x * var_y {
            cov = 0.0;
        }

        // Scott's factor n^(-1/(d+4)), squared for the covariance
        let factor2 = n.powf(-1.0 / 3.0);
        let kernel = [
            [var_x * factor2, cov * factor2],
            [cov * factor2, var_y * factor2],
        ];
        let det = kernel[0][0] * kernel[1][1] - kernel[0][1] * kernel[1][0];
        let inverse = [
            [kernel[1][1] / det, -kernel[0][1] / det],
            [-kernel[1][0] / det, kernel[0][0] / det],
        ];
        let norm = 1.0 / (n * 2.0 * PI * det.sqrt());

        Some(Self {
            points: points.to_vec(),
            kernel,
            inverse,
            norm,
        })
    }

    /// Kernel standard deviation along each axis
    pub fn bandwidths(&self) -> (f64, f64) {
        (self.kernel[0][0].sqrt(), self.kernel[1][1].sqrt())
    }

    pub fn density(&self, x: f64, y: f64) -> f64 {
        let inv = &self.inverse;
        let sum: f64 = self
            .points
            .iter()
            .map(|&(px, py)| {
                let (dx, dy) = (x - px, y - py);
                let q = dx * (inv[0][0] * dx + inv[0][1] * dy)
                    + dy * (inv[1][0] * dx + inv[1][1] * dy);
                (-0.5 * q).exp()
            })
            .sum();
        sum * self.norm
    }
}

/// Density sampled on a regular grid; `values[j][i]` is at `(xs[i], ys[j])`
#[derive(Debug, Clone)]
pub struct DensityGrid {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub values: Vec<Vec<f64>>,
    pub max: f64,
}

impl DensityGrid {
    pub fn sample(
        kde: &Kde2d,
        x_range: (f64, f64),
        y_range: (f64, f64),
        resolution: usize,
    ) -> Self {
        let xs = linspace(x_range, resolution);
        let ys = linspace(y_range, resolution);
        let values: Vec<Vec<f64>> = ys
            .iter()
            .map(|&y| xs.iter().map(|&x| kde.density(x, y)).collect())
            .collect();
        let max = values.iter().flatten().copied().fold(0.0, f64::max);
        Self {
            xs,
            ys,
            values,
            max,
        }
    }
}

fn linspace((lo, hi): (f64, f64), n: usize) -> Vec<f64> {
    if n < 2 {
        return vec![lo];
    }
    let step = (hi - lo) / (n - 1) as f64;
    (0..n).map(|i| lo + step * i as f64).collect()
}

fn padded_range(values: impl Iterator<Item = f64>, pad: f64) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    (lo - pad, hi + pad)
}

fn shade(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
    RGBColor(mix(LOW.0, HIGH.0), mix(LOW.1, HIGH.1), mix(LOW.2, HIGH.2))
}

/// Write the joint density plot of `points` as SVG
pub fn render_joint_density(points: &[(f64, f64)], path: &Path) -> Result<()> {
    let not_enough = || anyhow!("Need at least two posts with price and rooms to plot");
    let joint = Kde2d::new(points).ok_or_else(not_enough)?;
    let price_kde = Kde1d::new(points.iter().map(|p| p.0).collect()).ok_or_else(not_enough)?;
    let rooms_kde = Kde1d::new(points.iter().map(|p| p.1).collect()).ok_or_else(not_enough)?;

    let (bw_x, bw_y) = joint.bandwidths();
    let x_range = padded_range(points.iter().map(|p| p.0), CUT * bw_x.max(price_kde.bandwidth()));
    let y_range = padded_range(points.iter().map(|p| p.1), CUT * bw_y.max(rooms_kde.bandwidth()));
    let grid = DensityGrid::sample(&joint, x_range, y_range, GRID_RESOLUTION);

    let root = SVGBackend::new(path, (800, 800)).into_drawing_area();
    root.fill(&WHITE)?;
    let (top, bottom) = root.split_vertically(160);
    let (top_left, _) = top.split_horizontally(640);
    let (heat_area, right) = bottom.split_horizontally(640);

    let mut chart = ChartBuilder::on(&heat_area)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("price")
        .y_desc("rooms")
        .draw()?;

    let (xs, ys, values, max) = (&grid.xs, &grid.ys, &grid.values, grid.max);
    let half_dx = (xs[1] - xs[0]) / 2.0;
    let half_dy = (ys[1] - ys[0]) / 2.0;
    let cells = ys.iter().enumerate().flat_map(move |(j, &y)| {
        xs.iter().enumerate().filter_map(move |(i, &x)| {
            let t = values[j][i] / max;
            // Faint cells stay background
            (t >= 0.02).then(|| {
                Rectangle::new(
                    [(x - half_dx, y - half_dy), (x + half_dx, y + half_dy)],
                    shade(t).filled(),
                )
            })
        })
    });
    chart.draw_series(cells)?;
    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 2, BLACK.mix(0.6).filled())),
    )?;

    let price_curve: Vec<(f64, f64)> = grid
        .xs
        .iter()
        .map(|&x| (x, price_kde.density(x)))
        .collect();
    let price_peak = price_curve.iter().map(|p| p.1).fold(0.0, f64::max);
    let mut top_chart = ChartBuilder::on(&top_left)
        .margin(10)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.0..x_range.1, 0.0..price_peak * 1.1)?;
    top_chart.draw_series(
        AreaSeries::new(price_curve, 0.0, shade(1.0).mix(0.3)).border_style(shade(1.0)),
    )?;

    let rooms_curve: Vec<(f64, f64)> = grid
        .ys
        .iter()
        .map(|&y| (rooms_kde.density(y), y))
        .collect();
    let rooms_peak = rooms_curve.iter().map(|p| p.0).fold(0.0, f64::max);
    let mut right_chart = ChartBuilder::on(&right)
        .margin(10)
        .x_label_area_size(40)
        .build_cartesian_2d(0.0..rooms_peak * 1.1, y_range.0..y_range.1)?;
    right_chart.draw_series(LineSeries::new(rooms_curve, shade(1.0).stroke_width(2)))?;

    root.present()?;
    info!("Saved density plot to {}", path.display());
    Ok(())
}
