//! Horizontal wind from the superposition of all active vortices.
//!
//! Each vortex contributes its Rankine tangential speed, directed
//! counter-clockwise around its axis, plus its advection velocity. The sum is
//! linear, so the order of the vortices does not matter.
//!
//! Wind vectors live in the x/z plane and are returned as [`DVec2`] with
//! `x → x` and `y → z`.
//!
//! ```
//! use twister::prelude::*;
//! use twister::wind::wind_at;
//!
//! let mut rng = SpawnRng::seeded(0);
//! let v = Vortex::new(VortexId(0), VortexParams::default().with_particle_count(0), &mut rng).unwrap();
//! let w = wind_at(DVec2::new(1.2, 0.0), &[v]);
//! assert!((w.y - 2.1).abs() < 1e-9);
//! ```

use crate::vortex::Vortex;
use glam::DVec2;

/// Speed below which a sample has no meaningful direction.
pub const CALM_EPSILON: f64 = 1e-3;

/// Total wind at `point` from every vortex in `vortices`.
///
/// Points within [`crate::vortex::AXIS_EPSILON`] of a vortex axis get no
/// contribution from that vortex.
pub fn wind_at<'a, I>(point: DVec2, vortices: I) -> DVec2
where
    I: IntoIterator<Item = &'a Vortex>,
{
    vortices
        .into_iter()
        .filter_map(|v| v.wind_sample(point))
        .fold(DVec2::ZERO, |acc, w| acc + w)
}

/// Coarse strength class of a wind sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindBand {
    /// Speed below 0.5.
    Calm,
    /// Speed in `[0.5, 1.0)`.
    Moderate,
    /// Speed of 1.0 and above.
    Strong,
}

impl WindBand {
    /// Classify a wind speed.
    pub fn classify(speed: f64) -> Self {
        if speed < 0.5 {
            WindBand::Calm
        } else if speed < 1.0 {
            WindBand::Moderate
        } else {
            WindBand::Strong
        }
    }
}

/// Wind evaluated at one map point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindSample {
    /// Sample location (x/z plane).
    pub point: DVec2,
    /// Wind vector.
    pub wind: DVec2,
    /// Wind speed.
    pub speed: f64,
    /// Unit direction; `(0, 1)` when calm.
    pub direction: DVec2,
    /// Heading in degrees, `atan2(dir.x, dir.z)`.
    pub heading_deg: f64,
    /// Strength class.
    pub band: WindBand,
}

impl WindSample {
    fn new(point: DVec2, wind: DVec2) -> Self {
        let speed = wind.length();
        let direction = if speed < CALM_EPSILON {
            DVec2::new(0.0, 1.0)
        } else {
            wind / speed
        };
        Self {
            point,
            wind,
            speed,
            direction,
            heading_deg: direction.x.atan2(direction.y).to_degrees(),
            band: WindBand::classify(speed),
        }
    }
}

/// Regular grid of wind samples, the data behind a wind minimap.
#[derive(Clone, Debug, PartialEq)]
pub struct WindMap {
    /// Samples in x-major order.
    pub samples: Vec<WindSample>,
    /// Number of sample columns along x.
    pub columns: usize,
    /// Number of sample rows along z.
    pub rows: usize,
}

impl WindMap {
    /// Sample the wind every `step` units inside `[min + margin, max - margin)`.
    pub fn sample<'a, I>(min: DVec2, max: DVec2, step: f64, margin: f64, vortices: I) -> Self
    where
        I: IntoIterator<Item = &'a Vortex>,
        I::IntoIter: Clone,
    {
        let vortices = vortices.into_iter();
        let xs = axis(min.x + margin, max.x - margin, step);
        let zs = axis(min.y + margin, max.y - margin, step);

        let mut samples = Vec::with_capacity(xs.len() * zs.len());
        for &x in &xs {
            for &z in &zs {
                let point = DVec2::new(x, z);
                samples.push(WindSample::new(point, wind_at(point, vortices.clone())));
            }
        }

        Self {
            samples,
            columns: xs.len(),
            rows: zs.len(),
        }
    }

    /// Strongest sample, if any.
    pub fn strongest(&self) -> Option<&WindSample> {
        self.samples.iter().max_by(|a, b| a.speed.total_cmp(&b.speed))
    }
}

fn axis(start: f64, end: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 || !(end > start) {
        return Vec::new();
    }
    let n = ((end - start) / step).ceil() as usize;
    (0..n).map(|i| start + i as f64 * step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawn::SpawnRng;
    use crate::vortex::{VortexId, VortexParams};
    use glam::DVec3;

    fn vortex(id: u64, x: f64, z: f64, omega0: f64, wind: DVec3) -> Vortex {
        let mut rng = SpawnRng::seeded(id);
        let params = VortexParams::default()
            .with_particle_count(0)
            .with_position(DVec3::new(x, 0.0, z))
            .with_core(0.6 + id as f64 * 0.3, omega0)
            .with_wind_speed(wind);
        Vortex::new(VortexId(id), params, &mut rng).unwrap()
    }

    #[test]
    fn test_empty_field_is_still() {
        assert_eq!(wind_at(DVec2::new(3.0, 4.0), &[]), DVec2::ZERO);
    }

    #[test]
    fn test_superposition_commutes() {
        let v1 = vortex(1, 10.0, 10.0, 7.0, DVec3::new(0.03, 0.0, 0.0));
        let v2 = vortex(2, 30.0, 12.0, 15.5, DVec3::new(-0.19, 0.0, 0.0));
        for k in 0..40 {
            let p = DVec2::new(k as f64 * 1.1, 30.0 - k as f64 * 0.7);
            let a = wind_at(p, &[v1.clone(), v2.clone()]);
            let b = wind_at(p, &[v2.clone(), v1.clone()]);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_superposition_is_linear() {
        let vs = [
            vortex(1, 10.0, 10.0, 7.0, DVec3::ZERO),
            vortex(2, 30.0, 12.0, 15.5, DVec3::new(0.1, 0.0, 0.2)),
            vortex(3, 20.0, 25.0, 3.0, DVec3::ZERO),
        ];
        let p = DVec2::new(17.0, 14.0);
        let total = wind_at(p, &vs);
        let parts: DVec2 = vs.iter().map(|v| wind_at(p, [v])).sum();
        assert!((total - parts).length() < 1e-12);

        let reversed: Vec<Vortex> = vs.iter().rev().cloned().collect();
        assert!((wind_at(p, &reversed) - total).length() < 1e-12);
    }

    #[test]
    fn test_axis_contribution_skipped() {
        let v1 = vortex(1, 10.0, 10.0, 7.0, DVec3::new(1.0, 0.0, 0.0));
        let v2 = vortex(2, 20.0, 10.0, 7.0, DVec3::ZERO);
        let on_axis = DVec2::new(10.0, 10.0);
        let w = wind_at(on_axis, &[v1.clone(), v2.clone()]);
        assert_eq!(w, v2.wind_sample(on_axis).unwrap());
        assert!(w.is_finite());
    }

    #[test]
    fn test_wind_band() {
        assert_eq!(WindBand::classify(0.0), WindBand::Calm);
        assert_eq!(WindBand::classify(0.5), WindBand::Moderate);
        assert_eq!(WindBand::classify(0.99), WindBand::Moderate);
        assert_eq!(WindBand::classify(1.0), WindBand::Strong);
    }

    #[test]
    fn test_wind_map_grid() {
        let v = vortex(1, 22.4, 22.4, 7.0, DVec3::ZERO);
        let map = WindMap::sample(DVec2::ZERO, DVec2::splat(44.8), 2.0, 2.0, &[v]);
        // arange(2, 42.8, 2) has 21 entries
        assert_eq!(map.columns, 21);
        assert_eq!(map.rows, 21);
        assert_eq!(map.samples.len(), 441);
        assert_eq!(map.samples[0].point, DVec2::new(2.0, 2.0));
        assert_eq!(map.samples[1].point, DVec2::new(2.0, 4.0));
        assert!(map.samples.iter().all(|s| (s.direction.length() - 1.0).abs() < 1e-9));
        let strongest = map.strongest().unwrap();
        assert!(strongest.point.distance(DVec2::new(22.4, 22.4)) < 3.0);
    }

    #[test]
    fn test_calm_sample_points_north() {
        let map = WindMap::sample(DVec2::ZERO, DVec2::splat(10.0), 2.0, 2.0, &[]);
        assert!(map.samples.iter().all(|s| s.direction == DVec2::new(0.0, 1.0) && s.band == WindBand::Calm));
        assert!(map.samples.iter().all(|s| s.heading_deg == 0.0));
    }
}
