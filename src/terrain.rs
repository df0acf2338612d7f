//! Terrain height queries.
//!
//! The simulation never builds terrain geometry. It only asks a [`Terrain`]
//! for ground height under a vortex and, optionally, for the playable extent
//! used to clamp vortex positions.

use glam::DVec2;

/// Ground height provider.
pub trait Terrain {
    /// Ground height at world `(x, z)`. Must be deterministic for fixed inputs.
    fn height(&self, x: f64, z: f64) -> f64;

    /// Playable `(min, max)` corners in the x/z plane, if bounded.
    fn extent(&self) -> Option<(DVec2, DVec2)> {
        None
    }
}

/// Any `Fn(x, z) -> height` closure is an unbounded terrain.
impl<F> Terrain for F
where
    F: Fn(f64, f64) -> f64,
{
    fn height(&self, x: f64, z: f64) -> f64 {
        self(x, z)
    }
}

/// Constant-height terrain, optionally bounded.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlatTerrain {
    /// Ground height everywhere.
    pub elevation: f64,
    /// Optional `(min, max)` extent.
    pub bounds: Option<(DVec2, DVec2)>,
}

impl FlatTerrain {
    /// Unbounded ground at `elevation`.
    pub fn new(elevation: f64) -> Self {
        Self { elevation, bounds: None }
    }

    /// Restrict the playable area to `[min, max]`.
    pub fn with_bounds(mut self, min: DVec2, max: DVec2) -> Self {
        self.bounds = Some((min, max));
        self
    }
}

impl Terrain for FlatTerrain {
    fn height(&self, _x: f64, _z: f64) -> f64 {
        self.elevation
    }

    fn extent(&self) -> Option<(DVec2, DVec2)> {
        self.bounds
    }
}

/// Rolling sinusoidal heightmap sampled on a square grid.
///
/// Sample `(i, j)` sits at world `(i * spacing, j * spacing)` and holds
/// `sin(u_i) * cos(v_j) * amplitude`, with `u`, `v` spanning `[0, 4π]`.
/// Lookups use the nearest lower sample, clamped to the grid.
#[derive(Clone, Debug)]
pub struct SineHeightmap {
    size: usize,
    spacing: f64,
    heights: Vec<f64>,
}

impl SineHeightmap {
    /// Build a `size × size` heightmap.
    pub fn new(size: usize, spacing: f64, amplitude: f64) -> Self {
        let size = size.max(2);
        let step = 4.0 * std::f64::consts::PI / (size - 1) as f64;
        let mut heights = Vec::with_capacity(size * size);
        for i in 0..size {
            for j in 0..size {
                // Row index i varies along the grid's y axis, column j along x.
                let u = j as f64 * step;
                let v = i as f64 * step;
                heights.push(u.sin() * v.cos() * amplitude);
            }
        }
        Self { size, spacing, heights }
    }

    /// Samples per side.
    pub fn size(&self) -> usize {
        self.size
    }

    /// World distance between adjacent samples.
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// World length of one side.
    pub fn world_size(&self) -> f64 {
        self.size as f64 * self.spacing
    }

    fn index(&self, coord: f64) -> usize {
        let max = (self.size - 1) as f64;
        (coord / self.spacing).clamp(0.0, max) as usize
    }
}

impl Default for SineHeightmap {
    fn default() -> Self {
        Self::new(64, 0.7, 0.8)
    }
}

impl Terrain for SineHeightmap {
    fn height(&self, x: f64, z: f64) -> f64 {
        let i = self.index(x);
        let j = self.index(z);
        self.heights[i * self.size + j]
    }

    fn extent(&self) -> Option<(DVec2, DVec2)> {
        Some((DVec2::ZERO, DVec2::splat(self.world_size())))
    }
}
