//! Simulation builder and tick driver.
//!
//! [`Simulation`] owns the vortex list and every per-tick collaborator. One
//! call to [`Simulation::step`] runs, in order:
//!
//! 1. the atmospheric grid rebuild,
//! 2. AI decisions for every free, autonomous vortex,
//! 3. the fusion tick (advection, blending, completion, detection),
//! 4. particle and debris updates for every vortex, emitted to the sink,
//! 5. precipitation.
//!
//! Cross-vortex reads in steps 1-3 see the positions left by the previous
//! step; the vortex list only changes through the fusion machine's staged
//! swap.

use crate::ai::{self, AiConfig, MovementPolicy};
use crate::atmosphere::AtmosphericGrid;
use crate::error::Result;
use crate::fusion::{FusionConfig, FusionEvent, FusionMachine};
use crate::spawn::SpawnRng;
use crate::terrain::{SineHeightmap, Terrain};
use crate::time::Clock;
use crate::visuals::{RenderSink, VisualConfig};
use crate::vortex::{Vortex, VortexId, VortexParams};
use crate::weather::{Precipitation, PrecipitationConfig};
use crate::wind::{self, WindMap};
use glam::DVec2;

/// Distance kept between a vortex and the terrain edge.
pub const EXTENT_MARGIN: f64 = 2.0;

/// Wind map sample spacing.
pub const WIND_MAP_STEP: f64 = 2.0;

/// Outcome of one [`Simulation::step`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Clock after the step.
    pub elapsed: f64,
    /// Step length actually simulated.
    pub delta: f64,
    /// Vortices moved by their policy this step.
    pub ai_moves: usize,
    /// Fusion transitions.
    pub fusion: Vec<FusionEvent>,
}

/// A tornado simulation.
///
/// Use method chaining to configure, then [`spawn_vortex`](Self::spawn_vortex)
/// and call [`step`](Self::step) once per frame.
///
/// ```
/// use twister::prelude::*;
///
/// let mut sim = Simulation::new().with_seed(7);
/// let id = sim
///     .spawn_vortex(VortexParams::from_intensity(1.2).with_position(DVec3::new(15.0, 0.0, 15.0)), MovementPolicy::Manual)
///     .unwrap();
///
/// let mut frame = InstanceBuffer::new();
/// sim.step(1.0 / 60.0, &mut frame);
/// assert_eq!(frame.count_for(id), 540);
/// ```
pub struct Simulation {
    terrain: Box<dyn Terrain>,
    vortices: Vec<Vortex>,
    grid: AtmosphericGrid,
    fusion: FusionMachine,
    ai: AiConfig,
    visuals: VisualConfig,
    precipitation: Option<Precipitation>,
    clock: Clock,
    rng: SpawnRng,
    next_id: u64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulation {
    /// Create a simulation over the default sine heightmap, with no vortices.
    pub fn new() -> Self {
        Self {
            terrain: Box::new(SineHeightmap::default()),
            vortices: Vec::new(),
            grid: AtmosphericGrid::default(),
            fusion: FusionMachine::default(),
            ai: AiConfig::default(),
            visuals: VisualConfig::default(),
            precipitation: None,
            clock: Clock::new(),
            rng: SpawnRng::seeded(0),
            next_id: 0,
        }
    }

    /// Set the terrain.
    pub fn with_terrain<T: Terrain + 'static>(mut self, terrain: T) -> Self {
        self.terrain = Box::new(terrain);
        self
    }

    /// Reseed the random source.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SpawnRng::seeded(seed);
        self
    }

    /// Replace the atmospheric grid.
    pub fn with_grid(mut self, grid: AtmosphericGrid) -> Self {
        self.grid = grid;
        self
    }

    /// Set the visual configuration.
    pub fn with_visuals(mut self, visuals: VisualConfig) -> Self {
        self.visuals = visuals;
        self
    }

    /// Set the fusion timing. Fails when `config` does not validate.
    pub fn with_fusion(mut self, config: FusionConfig) -> Result<Self> {
        self.fusion = FusionMachine::new(config)?;
        Ok(self)
    }

    /// Set the AI tuning.
    pub fn with_ai(mut self, config: AiConfig) -> Self {
        self.ai = config;
        self
    }

    /// Enable precipitation.
    pub fn with_precipitation(mut self, config: PrecipitationConfig) -> Self {
        self.precipitation = Some(Precipitation::new(config));
        self
    }

    /// Use a fixed step regardless of the `dt` passed to [`step`](Self::step).
    pub fn with_fixed_delta(mut self, delta: f64) -> Self {
        self.clock.set_fixed_delta(Some(delta));
        self
    }

    /// Validate `params`, spawn the vortex and return its id.
    pub fn spawn_vortex(&mut self, params: VortexParams, policy: MovementPolicy) -> Result<VortexId> {
        let id = self.alloc_id();
        let mut vortex = Vortex::new(id, params, &mut self.rng)?.with_policy(policy);
        if let Some((min, max)) = self.bounds() {
            vortex.clamp_to(min, max);
        }
        tracing::info!(%id, ?policy, position = ?vortex.position(), "vortex spawned");
        self.vortices.push(vortex);
        Ok(id)
    }

    /// Remove a vortex. A fusion it was part of is aborted on the next step.
    pub fn remove_vortex(&mut self, id: VortexId) -> Option<Vortex> {
        let index = self.vortices.iter().position(|v| v.id() == id)?;
        Some(self.vortices.remove(index))
    }

    fn alloc_id(&mut self) -> VortexId {
        let id = VortexId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Playable area shrunk by [`EXTENT_MARGIN`], if the terrain is bounded.
    fn bounds(&self) -> Option<(DVec2, DVec2)> {
        let (min, max) = self.terrain.extent()?;
        let lo = min + DVec2::splat(EXTENT_MARGIN);
        let hi = max - DVec2::splat(EXTENT_MARGIN);
        // Extents narrower than twice the margin collapse to their center.
        let center = (min + max) / 2.0;
        Some((lo.min(center), hi.max(center)))
    }

    /// Player move command. Returns `false` when `id` does not exist.
    pub fn move_vortex(&mut self, id: VortexId, dx: f64, dz: f64) -> bool {
        let bounds = self.bounds();
        match self.vortices.iter_mut().find(|v| v.id() == id) {
            Some(vortex) => {
                vortex.move_by(dx, dz);
                if let Some((min, max)) = bounds {
                    vortex.clamp_to(min, max);
                }
                true
            }
            None => false,
        }
    }

    /// Change a vortex's movement policy. Returns `false` when `id` does not exist.
    pub fn set_policy(&mut self, id: VortexId, policy: MovementPolicy) -> bool {
        match self.vortices.iter_mut().find(|v| v.id() == id) {
            Some(vortex) => {
                tracing::debug!(%id, ?policy, "policy changed");
                vortex.set_policy(policy);
                true
            }
            None => false,
        }
    }

    /// Advance the world by `dt` and emit render output to `sink`.
    pub fn step(&mut self, dt: f64, sink: &mut dyn RenderSink) -> TickReport {
        let (elapsed, delta) = self.clock.advance(dt);
        if self.clock.is_paused() {
            return TickReport { elapsed, delta, ..Default::default() };
        }

        self.grid.update(&self.vortices);
        let ai_moves = self.run_ai();

        let next_id = &mut self.next_id;
        let mut alloc = || {
            let id = VortexId(*next_id);
            *next_id += 1;
            id
        };
        let fusion = self.fusion.check_and_advance(&mut self.vortices, delta, &mut alloc);
        self.clamp_all();

        for vortex in &mut self.vortices {
            vortex.update_particles(
                delta,
                elapsed,
                self.terrain.as_ref(),
                &self.grid,
                &mut self.rng,
                &self.visuals,
                sink,
            );
        }

        if let Some(rain) = &mut self.precipitation {
            let max_intensity = self
                .vortices
                .iter()
                .map(|v| v.params().intensity)
                .fold(0.0, f64::max);
            let (min, max) = self
                .terrain
                .extent()
                .unwrap_or((DVec2::ZERO, DVec2::splat(self.grid.world_size())));
            rain.update(delta, max_intensity, min, max, &mut self.rng);
            rain.emit(sink);
        }

        tracing::trace!(elapsed, delta, vortices = self.vortices.len(), "tick");
        TickReport {
            elapsed,
            delta,
            ai_moves,
            fusion,
        }
    }

    fn run_ai(&mut self) -> usize {
        let moves: Vec<(usize, DVec2)> = self
            .vortices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.policy().is_autonomous() && !self.fusion.is_merging(v.id()))
            .filter_map(|(i, v)| ai::decide(v, &self.vortices, &self.grid, &self.ai).map(|d| (i, d)))
            .collect();

        let bounds = self.bounds();
        for &(i, d) in &moves {
            let vortex = &mut self.vortices[i];
            vortex.move_by(d.x, d.y);
            if let Some((min, max)) = bounds {
                vortex.clamp_to(min, max);
            }
        }
        moves.len()
    }

    fn clamp_all(&mut self) {
        if let Some((min, max)) = self.bounds() {
            for vortex in &mut self.vortices {
                vortex.clamp_to(min, max);
            }
        }
    }

    /// Active vortices.
    pub fn vortices(&self) -> &[Vortex] {
        &self.vortices
    }

    /// Look up a vortex.
    pub fn vortex(&self, id: VortexId) -> Option<&Vortex> {
        self.vortices.iter().find(|v| v.id() == id)
    }

    /// Total particles over all vortices.
    pub fn particle_count(&self) -> usize {
        self.vortices.iter().map(Vortex::particle_count).sum()
    }

    /// Atmospheric grid as of the last step.
    pub fn grid(&self) -> &AtmosphericGrid {
        &self.grid
    }

    /// Fusion machine.
    pub fn fusion(&self) -> &FusionMachine {
        &self.fusion
    }

    /// Simulation clock.
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Mutable clock, for pausing and time scaling.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// Terrain.
    pub fn terrain(&self) -> &dyn Terrain {
        self.terrain.as_ref()
    }

    /// Rain, if enabled.
    pub fn precipitation(&self) -> Option<&Precipitation> {
        self.precipitation.as_ref()
    }

    /// Total wind at `point` (x/z plane).
    pub fn wind_at(&self, point: DVec2) -> DVec2 {
        wind::wind_at(point, &self.vortices)
    }

    /// Wind sampled over the terrain (or grid) extent.
    pub fn wind_map(&self) -> WindMap {
        let (min, max) = self
            .terrain
            .extent()
            .unwrap_or((DVec2::ZERO, DVec2::splat(self.grid.world_size())));
        WindMap::sample(min, max, WIND_MAP_STEP, EXTENT_MARGIN, &self.vortices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::FlatTerrain;
    use crate::visuals::{InstanceBuffer, NullSink};
    use glam::DVec3;

    fn bounded() -> FlatTerrain {
        FlatTerrain::new(0.0).with_bounds(DVec2::ZERO, DVec2::splat(40.0))
    }

    #[test]
    fn test_spawn_rejects_invalid() {
        let mut sim = Simulation::new();
        assert!(sim
            .spawn_vortex(VortexParams::default().with_radii(3.0, 1.0), MovementPolicy::Manual)
            .is_err());
        assert!(sim.vortices().is_empty());
    }

    #[test]
    fn test_rejects_broken_fusion_timing() {
        assert!(Simulation::new().with_fusion(FusionConfig::default().with_duration(0.0)).is_err());
        assert!(Simulation::new().with_fusion(FusionConfig::default().with_blend_rate(-0.5)).is_err());
        let sim = Simulation::new()
            .with_fusion(FusionConfig::default().with_duration(8.0))
            .unwrap();
        assert_eq!(sim.fusion().config().duration, 8.0);
    }

    #[test]
    fn test_move_clamps_to_extent() {
        let mut sim = Simulation::new().with_terrain(bounded());
        let id = sim
            .spawn_vortex(
                VortexParams::default().with_particle_count(0).with_position(DVec3::new(10.0, 0.0, 10.0)),
                MovementPolicy::Manual,
            )
            .unwrap();
        assert!(sim.move_vortex(id, 100.0, -100.0));
        assert_eq!(sim.vortex(id).unwrap().planar_position(), DVec2::new(38.0, 2.0));
        assert!(!sim.move_vortex(VortexId(99), 1.0, 1.0));
    }

    #[test]
    fn test_unbounded_terrain_never_clamps() {
        let mut sim = Simulation::new().with_terrain(|_x: f64, _z: f64| 0.0);
        let id = sim
            .spawn_vortex(VortexParams::default().with_particle_count(0), MovementPolicy::Manual)
            .unwrap();
        sim.move_vortex(id, -500.0, 0.0);
        assert_eq!(sim.vortex(id).unwrap().position().x, -500.0);
    }

    #[test]
    fn test_step_emits_every_particle() {
        let mut sim = Simulation::new().with_terrain(bounded());
        let a = sim
            .spawn_vortex(
                VortexParams::default().with_particle_count(120).with_position(DVec3::new(8.0, 0.0, 8.0)),
                MovementPolicy::Manual,
            )
            .unwrap();
        let b = sim
            .spawn_vortex(
                VortexParams::default().with_particle_count(80).with_position(DVec3::new(30.0, 0.0, 30.0)),
                MovementPolicy::Manual,
            )
            .unwrap();
        let mut frame = InstanceBuffer::new();
        let report = sim.step(0.016, &mut frame);
        assert_eq!(frame.count_for(a), 120);
        assert_eq!(frame.count_for(b), 80);
        assert!(report.fusion.is_empty());
        assert!((report.elapsed - 0.016).abs() < 1e-12);
    }

    #[test]
    fn test_ai_moves_toward_manual_vortex() {
        let mut sim = Simulation::new().with_terrain(bounded());
        let player = sim
            .spawn_vortex(
                VortexParams::default().with_particle_count(0).with_position(DVec3::new(10.0, 0.0, 10.0)),
                MovementPolicy::Manual,
            )
            .unwrap();
        let hunter = sim
            .spawn_vortex(
                VortexParams::default().with_particle_count(0).with_position(DVec3::new(30.0, 0.0, 10.0)),
                MovementPolicy::DirectPursuit(player),
            )
            .unwrap();
        let report = sim.step(0.016, &mut NullSink);
        assert_eq!(report.ai_moves, 1);
        let x = sim.vortex(hunter).unwrap().position().x;
        assert!((x - (30.0 - 0.35)).abs() < 1e-12);
        assert_eq!(sim.vortex(player).unwrap().position().x, 10.0);
    }

    #[test]
    fn test_paused_clock_freezes_world() {
        let mut sim = Simulation::new();
        sim.spawn_vortex(VortexParams::default().with_particle_count(10), MovementPolicy::PressureGradient)
            .unwrap();
        sim.clock_mut().pause();
        let mut frame = InstanceBuffer::new();
        let report = sim.step(0.5, &mut frame);
        assert_eq!(report.delta, 0.0);
        assert!(frame.particles.is_empty());
    }

    #[test]
    fn test_rain_follows_intensity() {
        let mut sim = Simulation::new().with_precipitation(PrecipitationConfig::default());
        sim.spawn_vortex(
            VortexParams::default().with_particle_count(0).with_intensity(0.05).with_position(DVec3::new(20.0, 0.0, 20.0)),
            MovementPolicy::Manual,
        )
        .unwrap();
        let mut frame = InstanceBuffer::new();
        for _ in 0..5 {
            frame.clear();
            sim.step(0.016, &mut frame);
        }
        assert_eq!(sim.precipitation().unwrap().len(), 10);
        assert_eq!(frame.rain.len(), 10);
    }

    #[test]
    fn test_wind_map_covers_terrain() {
        let sim = Simulation::new().with_terrain(bounded());
        let map = sim.wind_map();
        assert_eq!(map.columns, 18);
        assert_eq!(sim.wind_at(DVec2::new(3.0, 3.0)), DVec2::ZERO);
    }
}
