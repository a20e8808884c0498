//! Bernstein/Bezier curve evaluation
//!
//! Pointer paths are Bezier curves whose degree is the control point count
//! minus one. Sampling adds per-point jitter and a tremor that grows toward
//! the end of the movement.

use std::f64::consts::PI;

use crate::stealth::Humanizer;

/// Floating point 2D point
pub type Point = (f64, f64);

/// Corners with a smaller cut factor are left untouched
const MIN_CUT_FACTOR: f64 = 0.05;
/// Jitter cap per sample in pixels (before `jitter_factor`)
const MAX_SAMPLE_JITTER: f64 = 2.0;

/// Binomial coefficient `C(n, k)`; zero outside `0..=n`
pub fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u64 = 1;
    for i in 1..=k {
        result = result * (n - k + i) as u64 / i as u64;
    }
    result
}

/// Bernstein basis polynomial `C(n, i) * t^i * (1 - t)^(n - i)`
pub fn bernstein(i: usize, n: usize, t: f64) -> f64 {
    binomial(n, i) as f64 * t.powi(i as i32) * (1.0 - t).powi((n - i.min(n)) as i32)
}

/// Evaluate the Bezier curve at `t`; an empty control set yields the origin
pub fn bezier_point(control: &[Point], t: f64) -> Point {
    let Some(n) = control.len().checked_sub(1) else {
        return (0.0, 0.0);
    };
    control
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(x, y), (i, &(px, py))| {
            let w = bernstein(i, n, t);
            (x + w * px, y + w * py)
        })
}

/// Replace sharp interior corners with a before/after pair
///
/// The cut for each corner is `corner_cutting * angle / PI`, measured on the
/// unmodified neighbours. Paths with three or fewer points are returned as is.
pub fn cut_corners(control: &[Point], corner_cutting: f64) -> Vec<Point> {
    if corner_cutting <= 0.0 || control.len() <= 3 {
        return control.to_vec();
    }

    let mut cut = Vec::with_capacity(control.len() * 2);
    cut.push(control[0]);

    for window in control.windows(3) {
        let (prev, current, next) = (window[0], window[1], window[2]);
        let d1 = (current.0 - prev.0, current.1 - prev.1);
        let d2 = (next.0 - current.0, next.1 - current.1);
        let mag1 = d1.0.hypot(d1.1);
        let mag2 = d2.0.hypot(d2.1);

        if mag1 > 0.0 && mag2 > 0.0 {
            let cos = ((d1.0 * d2.0 + d1.1 * d2.1) / (mag1 * mag2)).clamp(-1.0, 1.0);
            let cut_factor = corner_cutting * (cos.acos() / PI);

            if cut_factor > MIN_CUT_FACTOR {
                cut.push((current.0 - d1.0 * cut_factor, current.1 - d1.1 * cut_factor));
                cut.push((current.0 + d2.0 * cut_factor, current.1 + d2.1 * cut_factor));
                continue;
            }
        }

        cut.push(current);
    }

    if let Some(&last) = control.last() {
        cut.push(last);
    }
    cut
}

/// Noise applied while sampling
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SampleNoise {
    pub jitter_factor: f64,
    pub tremor: f64,
}

/// Sample `count` evenly spaced points, add noise, round to pixels
pub fn sample(
    control: &[Point],
    count: usize,
    noise: SampleNoise,
    humanizer: &mut Humanizer,
) -> Vec<(i32, i32)> {
    let count = count.max(2);
    let step = 1.0 / (count - 1) as f64;
    let mut points = Vec::with_capacity(count);

    for i in 0..count {
        let t = i as f64 * step;
        let (mut x, mut y) = bezier_point(control, t);

        if noise.jitter_factor > 0.0 {
            let amount = if i < count - 1 {
                let (nx, ny) = bezier_point(control, (i + 1) as f64 * step);
                (nx - x).hypot(ny - y) * 0.1
            } else {
                1.0
            };
            let amount = amount.min(MAX_SAMPLE_JITTER) * noise.jitter_factor;
            x += humanizer.spread(amount);
            y += humanizer.spread(amount);
        }

        if noise.tremor > 0.0 {
            let scale = noise.tremor * (0.5 + t * 0.5);
            x += humanizer.spread(scale);
            y += humanizer.spread(scale);
        }

        points.push((x.round() as i32, y.round() as i32));
    }

    points
}
