//! Discretized atmosphere derived from the active vortices.
//!
//! A square grid of cells in the x/z plane holds pressure, temperature and a
//! horizontal wind vector. The grid holds no history: every tick it is reset
//! to baseline and each vortex stamps a radial footprint around its cell.
//!
//! | Field | Baseline | Per-vortex contribution at cell distance `d` |
//! |-------|----------|-----------------------------------------------|
//! | pressure | 1000.0 | `-intensity * 0.5 / (d + 1)` |
//! | temperature | 25.0 | `+intensity * 0.02 / (d + 1)` |
//! | wind | 0 | `intensity * 0.1 / (d + 1)` along the bearing vortex → cell |
//!
//! Only cells with `d < 8` are touched. Contributions sum linearly.
//!
//! ```
//! use twister::prelude::*;
//!
//! let mut rng = SpawnRng::seeded(0);
//! let params = VortexParams::default()
//!     .with_position(DVec3::new(7.0, 0.0, 7.0))
//!     .with_particle_count(0);
//! let vortex = Vortex::new(VortexId(0), params, &mut rng).unwrap();
//!
//! let mut grid = AtmosphericGrid::default();
//! grid.update(&[vortex]);
//! assert_eq!(grid.pressure(10, 10), 1000.0 - 0.5);
//! ```

use crate::vortex::Vortex;
use glam::DVec2;

/// Pressure of an undisturbed cell.
pub const BASELINE_PRESSURE: f64 = 1000.0;
/// Temperature of an undisturbed cell.
pub const BASELINE_TEMPERATURE: f64 = 25.0;
/// Footprint radius in cells.
pub const FOOTPRINT_RADIUS: i64 = 8;
/// Pressure drop coefficient.
pub const K_PRESSURE: f64 = 0.5;
/// Temperature rise coefficient.
pub const K_TEMPERATURE: f64 = 0.02;
/// Wind coefficient.
pub const K_WIND: f64 = 0.1;

/// Default grid resolution (cells per side).
pub const DEFAULT_GRID_SIZE: usize = 64;
/// Default cell edge length in world units.
pub const DEFAULT_CELL_SIZE: f64 = 0.7;

/// State of one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalWeather {
    /// Pressure.
    pub pressure: f64,
    /// Temperature.
    pub temperature: f64,
    /// Horizontal wind (x, z).
    pub wind: DVec2,
}

/// Pressure, temperature and wind over a square grid.
#[derive(Clone, Debug, PartialEq)]
pub struct AtmosphericGrid {
    size: usize,
    cell_size: f64,
    pressure: Vec<f64>,
    temperature: Vec<f64>,
    wind: Vec<DVec2>,
}

impl Default for AtmosphericGrid {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_SIZE, DEFAULT_CELL_SIZE)
    }
}

impl AtmosphericGrid {
    /// Create a `size × size` grid at baseline. `size` is at least 1.
    pub fn new(size: usize, cell_size: f64) -> Self {
        let size = size.max(1);
        let cells = size * size;
        Self {
            size,
            cell_size,
            pressure: vec![BASELINE_PRESSURE; cells],
            temperature: vec![BASELINE_TEMPERATURE; cells],
            wind: vec![DVec2::ZERO; cells],
        }
    }

    /// Cells per side.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Cell edge length.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// World-space edge length of the whole grid.
    pub fn world_size(&self) -> f64 {
        self.size as f64 * self.cell_size
    }

    #[inline]
    fn index(&self, i: usize, j: usize) -> usize {
        i * self.size + j
    }

    /// Reset every cell to baseline.
    pub fn reset(&mut self) {
        self.pressure.fill(BASELINE_PRESSURE);
        self.temperature.fill(BASELINE_TEMPERATURE);
        self.wind.fill(DVec2::ZERO);
    }

    /// Recompute the whole grid from `vortices`.
    pub fn update<'a, I>(&mut self, vortices: I)
    where
        I: IntoIterator<Item = &'a Vortex>,
    {
        self.reset();
        for vortex in vortices {
            let p = vortex.position();
            let (cx, cz) = self.cell_of(p.x, p.z);
            self.stamp(cx, cz, vortex.params().intensity);
        }
    }

    fn stamp(&mut self, cx: i64, cz: i64, intensity: f64) {
        let last = self.size as i64 - 1;
        let (i0, i1) = ((cx - FOOTPRINT_RADIUS).max(0), (cx + FOOTPRINT_RADIUS).min(last));
        let (j0, j1) = ((cz - FOOTPRINT_RADIUS).max(0), (cz + FOOTPRINT_RADIUS).min(last));

        for i in i0..=i1 {
            for j in j0..=j1 {
                let (di, dj) = ((i - cx) as f64, (j - cz) as f64);
                let d = di.hypot(dj);
                if d >= FOOTPRINT_RADIUS as f64 {
                    continue;
                }
                let falloff = intensity / (d + 1.0);
                let angle = dj.atan2(di);
                let idx = self.index(i as usize, j as usize);
                self.pressure[idx] -= K_PRESSURE * falloff;
                self.temperature[idx] += K_TEMPERATURE * falloff;
                self.wind[idx] += DVec2::new(angle.cos(), angle.sin()) * K_WIND * falloff;
            }
        }
    }

    /// Unclamped cell coordinates of a world point (`floor(pos / cell_size)`).
    pub fn cell_of(&self, x: f64, z: f64) -> (i64, i64) {
        (
            (x / self.cell_size).floor() as i64,
            (z / self.cell_size).floor() as i64,
        )
    }

    /// Cell coordinates of a world point, clamped into the grid.
    pub fn clamped_cell_of(&self, x: f64, z: f64) -> (usize, usize) {
        let (i, j) = self.cell_of(x, z);
        (self.clamp_index(i), self.clamp_index(j))
    }

    /// Clamp a cell index into `[0, size)`.
    pub fn clamp_index(&self, i: i64) -> usize {
        i.clamp(0, self.size as i64 - 1) as usize
    }

    /// World position of a cell's reference corner (`index * cell_size`).
    pub fn cell_center(&self, i: usize, j: usize) -> DVec2 {
        DVec2::new(i as f64 * self.cell_size, j as f64 * self.cell_size)
    }

    /// Pressure of a cell. Indices are clamped.
    pub fn pressure(&self, i: usize, j: usize) -> f64 {
        self.pressure[self.clamped(i, j)]
    }

    /// Temperature of a cell. Indices are clamped.
    pub fn temperature(&self, i: usize, j: usize) -> f64 {
        self.temperature[self.clamped(i, j)]
    }

    /// Wind of a cell. Indices are clamped.
    pub fn wind(&self, i: usize, j: usize) -> DVec2 {
        self.wind[self.clamped(i, j)]
    }

    fn clamped(&self, i: usize, j: usize) -> usize {
        self.index(i.min(self.size - 1), j.min(self.size - 1))
    }

    /// Overwrite a cell's pressure until the next update.
    pub fn set_pressure(&mut self, i: usize, j: usize, value: f64) {
        let idx = self.clamped(i, j);
        self.pressure[idx] = value;
    }

    /// Weather at a world point; points outside the grid read the nearest edge cell.
    pub fn local(&self, x: f64, z: f64) -> LocalWeather {
        let (i, j) = self.clamped_cell_of(x, z);
        let idx = self.index(i, j);
        LocalWeather {
            pressure: self.pressure[idx],
            temperature: self.temperature[idx],
            wind: self.wind[idx],
        }
    }

    /// Lowest pressure over the whole grid.
    pub fn min_pressure(&self) -> f64 {
        self.pressure.iter().copied().fold(f64::INFINITY, f64::min)
    }
}
