//! Vortex: one tornado column and the particles that draw it.
//!
//! A [`Vortex`] is plain data: parameters describing the funnel, an exclusively
//! owned [`ParticlePool`], an optional debris ring, and the movement policy
//! chosen at construction. It produces render output but holds no reference to
//! any renderer.
//!
//! # Example
//!
//! ```
//! use twister::prelude::*;
//!
//! let mut rng = SpawnRng::seeded(1);
//! let params = VortexParams::default()
//!     .with_position(DVec3::new(10.0, 0.0, 10.0))
//!     .with_particle_count(200);
//! let mut vortex = Vortex::new(VortexId(0), params, &mut rng).unwrap();
//!
//! let terrain = FlatTerrain::new(0.0);
//! let grid = AtmosphericGrid::default();
//! let visuals = VisualConfig::default();
//! vortex.update_particles(1.0 / 60.0, 0.0, &terrain, &grid, &mut rng, &visuals, &mut NullSink);
//! assert_eq!(vortex.particle_count(), 200);
//! ```

use crate::ai::MovementPolicy;
use crate::atmosphere::AtmosphericGrid;
use crate::debris::DebrisRing;
use crate::error::{Result, VortexError};
use crate::field::{self, tangential_speed};
use crate::particle::{Particle, ParticlePool};
use crate::spawn::SpawnRng;
use crate::terrain::Terrain;
use crate::visuals::{palette, RenderSink, VisualConfig};
use glam::{DVec2, DVec3, Vec3};
use std::f64::consts::PI;
use std::fmt;

/// Planar distance below which a wind sample is treated as on the axis.
pub const AXIS_EPSILON: f64 = 1e-2;

/// Opaque vortex identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VortexId(pub u64);

impl fmt::Display for VortexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vortex#{}", self.0)
    }
}

/// Geometric and physical parameters of a vortex.
///
/// Build with the `with_*` methods; [`VortexParams::validate`] runs when a
/// [`Vortex`] is constructed.
#[derive(Clone, Debug, PartialEq)]
pub struct VortexParams {
    /// Base position. `y` is an offset above the terrain.
    pub position: DVec3,
    /// Column height `H`.
    pub height: f64,
    /// Orbit radius at the ground.
    pub radius_base: f64,
    /// Orbit radius at the top.
    pub radius_top: f64,
    /// Radius of the solid-body core.
    pub core_radius: f64,
    /// Angular velocity of the core.
    pub omega0: f64,
    /// Horizontal lean of the column top along x.
    pub max_inclination: f64,
    /// Amplitude of the column sway.
    pub sin_amplitude: f64,
    /// Spatial frequency of the column sway.
    pub sin_freq: f64,
    /// Advection velocity (the vortex drifts with it).
    pub wind_speed: DVec3,
    /// Scalar strength used by the atmospheric grid.
    pub intensity: f64,
    /// Radius of the collision sphere.
    pub collider_radius: f64,
    /// Color tag of the first half of the particles.
    pub primary_color: Vec3,
    /// Color tag of the second half of the particles.
    pub secondary_color: Vec3,
    /// Particles spawned at construction.
    pub particle_count: usize,
    /// Upper bound of the uniform radius jitter applied at spawn only.
    pub spawn_jitter: f64,
    /// Debris pieces orbiting the base.
    pub debris_count: usize,
    /// Height of the funnel base above the terrain.
    pub base_offset: f64,
}

impl Default for VortexParams {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            height: 20.0,
            radius_base: 0.25,
            radius_top: 2.0,
            core_radius: 0.6,
            omega0: 7.0,
            max_inclination: 4.5,
            sin_amplitude: 0.5,
            sin_freq: 2.5,
            wind_speed: DVec3::ZERO,
            intensity: 1.0,
            collider_radius: 3.5,
            primary_color: palette::AZURE,
            secondary_color: palette::ORANGE,
            particle_count: 1000,
            spawn_jitter: 0.0,
            debris_count: 0,
            base_offset: 0.2,
        }
    }
}

impl VortexParams {
    /// Parameters scaled from a single intensity value.
    ///
    /// Height `8 + 2i`, base radius `0.7 + 0.5i`, top radius `2 + 1.5i` and
    /// `300 + 200i` particles; everything else keeps its default.
    pub fn from_intensity(intensity: f64) -> Self {
        let i = intensity.max(0.0);
        Self {
            height: 8.0 + 2.0 * i,
            radius_base: 0.7 + 0.5 * i,
            radius_top: 2.0 + 1.5 * i,
            particle_count: 300 + (200.0 * i) as usize,
            intensity,
            ..Self::default()
        }
    }

    /// Set the base position.
    pub fn with_position(mut self, position: DVec3) -> Self {
        self.position = position;
        self
    }

    /// Set the column height.
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    /// Set ground and top orbit radii.
    pub fn with_radii(mut self, base: f64, top: f64) -> Self {
        self.radius_base = base;
        self.radius_top = top;
        self
    }

    /// Set the Rankine core radius and core angular velocity.
    pub fn with_core(mut self, core_radius: f64, omega0: f64) -> Self {
        self.core_radius = core_radius;
        self.omega0 = omega0;
        self
    }

    /// Set lean and sway.
    pub fn with_sway(mut self, max_inclination: f64, amplitude: f64, freq: f64) -> Self {
        self.max_inclination = max_inclination;
        self.sin_amplitude = amplitude;
        self.sin_freq = freq;
        self
    }

    /// Set the advection velocity.
    pub fn with_wind_speed(mut self, wind_speed: DVec3) -> Self {
        self.wind_speed = wind_speed;
        self
    }

    /// Set the scalar intensity.
    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = intensity;
        self
    }

    /// Set the collision sphere radius.
    pub fn with_collider_radius(mut self, radius: f64) -> Self {
        self.collider_radius = radius;
        self
    }

    /// Set the two particle color tags.
    pub fn with_colors(mut self, primary: Vec3, secondary: Vec3) -> Self {
        self.primary_color = primary;
        self.secondary_color = secondary;
        self
    }

    /// Set the particle count.
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    /// Set the spawn-time radius jitter.
    pub fn with_spawn_jitter(mut self, jitter: f64) -> Self {
        self.spawn_jitter = jitter;
        self
    }

    /// Set the number of debris pieces.
    pub fn with_debris(mut self, count: usize) -> Self {
        self.debris_count = count;
        self
    }

    /// Set the funnel base height above the terrain.
    pub fn with_base_offset(mut self, offset: f64) -> Self {
        self.base_offset = offset;
        self
    }

    /// Check the construction invariants.
    ///
    /// `H > 0`, `0 < radius_base <= radius_top`, `core_radius > 0`, no
    /// negative intensity, collider radius or jitter, and every value finite.
    pub fn validate(&self) -> Result<()> {
        let scalars = [
            ("height", self.height),
            ("radius_base", self.radius_base),
            ("radius_top", self.radius_top),
            ("core_radius", self.core_radius),
            ("omega0", self.omega0),
            ("max_inclination", self.max_inclination),
            ("sin_amplitude", self.sin_amplitude),
            ("sin_freq", self.sin_freq),
            ("intensity", self.intensity),
            ("collider_radius", self.collider_radius),
            ("spawn_jitter", self.spawn_jitter),
            ("base_offset", self.base_offset),
        ];
        for (parameter, value) in scalars {
            if !value.is_finite() {
                return Err(VortexError::NotFinite { parameter, value });
            }
        }
        for (parameter, v) in [("position", self.position), ("wind_speed", self.wind_speed)] {
            if !v.is_finite() {
                let value = [v.x, v.y, v.z].into_iter().find(|c| !c.is_finite()).unwrap_or(f64::NAN);
                return Err(VortexError::NotFinite { parameter, value });
            }
        }

        for (parameter, value) in [
            ("height", self.height),
            ("radius_base", self.radius_base),
            ("core_radius", self.core_radius),
        ] {
            if value <= 0.0 {
                return Err(VortexError::NonPositive { parameter, value });
            }
        }
        if self.radius_base > self.radius_top {
            return Err(VortexError::InvertedFunnel {
                radius_base: self.radius_base,
                radius_top: self.radius_top,
            });
        }
        for (parameter, value) in [
            ("intensity", self.intensity),
            ("collider_radius", self.collider_radius),
            ("spawn_jitter", self.spawn_jitter),
        ] {
            if value < 0.0 {
                return Err(VortexError::Negative { parameter, value });
            }
        }
        Ok(())
    }

    /// Orbit radius at altitude `z`.
    #[inline]
    pub fn radius_at(&self, z: f64) -> f64 {
        field::funnel_radius(z, self.height, self.radius_base, self.radius_top)
    }

    /// Sway offsets `(x_off, z_off)` of the column at relative altitude `frac`
    /// and global time `t`.
    #[inline]
    pub fn sway(&self, frac: f64, t: f64) -> (f64, f64) {
        let phase = self.sin_freq * frac * PI;
        let x_off = self.max_inclination * frac + self.sin_amplitude * (phase + t).sin();
        let z_off = self.sin_amplitude * (phase + 0.8 * t).cos();
        (x_off, z_off)
    }
}

/// A tornado column.
#[derive(Clone, Debug)]
pub struct Vortex {
    id: VortexId,
    params: VortexParams,
    pool: ParticlePool,
    debris: DebrisRing,
    policy: MovementPolicy,
}

impl Vortex {
    /// Build a vortex and spawn its particles and debris.
    pub fn new(id: VortexId, params: VortexParams, rng: &mut SpawnRng) -> Result<Self> {
        params.validate()?;
        let pool = ParticlePool::spawn(&params, rng);
        let debris = DebrisRing::spawn(params.debris_count, params.radius_base, rng);
        tracing::debug!(%id, particles = pool.len(), "vortex created");
        Ok(Self {
            id,
            params,
            pool,
            debris,
            policy: MovementPolicy::Manual,
        })
    }

    /// Build a vortex around existing particles, without resampling them.
    pub fn from_parts(
        id: VortexId,
        params: VortexParams,
        pool: ParticlePool,
        debris: DebrisRing,
    ) -> Result<Self> {
        params.validate()?;
        Ok(Self::assemble(id, params, pool, debris, MovementPolicy::Manual))
    }

    /// Unchecked constructor for parameters derived from already valid vortices.
    pub(crate) fn assemble(
        id: VortexId,
        params: VortexParams,
        pool: ParticlePool,
        debris: DebrisRing,
        policy: MovementPolicy,
    ) -> Self {
        debug_assert!(params.validate().is_ok(), "assembled invalid vortex {id}");
        Self {
            id,
            params,
            pool,
            debris,
            policy,
        }
    }

    /// Set the movement policy.
    pub fn with_policy(mut self, policy: MovementPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Identity.
    #[inline]
    pub fn id(&self) -> VortexId {
        self.id
    }

    /// Current parameters.
    #[inline]
    pub fn params(&self) -> &VortexParams {
        &self.params
    }

    pub(crate) fn params_mut(&mut self) -> &mut VortexParams {
        &mut self.params
    }

    /// Movement policy.
    #[inline]
    pub fn policy(&self) -> MovementPolicy {
        self.policy
    }

    /// Replace the movement policy.
    pub fn set_policy(&mut self, policy: MovementPolicy) {
        self.policy = policy;
    }

    /// Base position.
    #[inline]
    pub fn position(&self) -> DVec3 {
        self.params.position
    }

    /// Base position projected onto the x/z plane.
    #[inline]
    pub fn planar_position(&self) -> DVec2 {
        DVec2::new(self.params.position.x, self.params.position.z)
    }

    /// The particle pool.
    pub fn particles(&self) -> &[Particle] {
        self.pool.as_slice()
    }

    /// Number of particles.
    pub fn particle_count(&self) -> usize {
        self.pool.len()
    }

    /// Debris orbiting the base.
    pub fn debris(&self) -> &DebrisRing {
        &self.debris
    }

    /// Split into parameters, pool and debris.
    pub fn into_parts(self) -> (VortexParams, ParticlePool, DebrisRing) {
        (self.params, self.pool, self.debris)
    }

    /// Displace the vortex in the horizontal plane. No bounds check.
    pub fn move_by(&mut self, dx: f64, dz: f64) {
        self.params.position.x += dx;
        self.params.position.z += dz;
    }

    /// Drift with the advection velocity for `dt`.
    pub fn advect(&mut self, dt: f64) {
        self.params.position += self.params.wind_speed * dt;
    }

    /// Clamp the base position to `[min, max]` in the x/z plane.
    pub fn clamp_to(&mut self, min: DVec2, max: DVec2) {
        self.params.position.x = self.params.position.x.clamp(min.x, max.x);
        self.params.position.z = self.params.position.z.clamp(min.y, max.y);
    }

    /// Whether the collision spheres of two vortices overlap.
    pub fn intersects(&self, other: &Vortex) -> bool {
        spheres_intersect(
            self.params.position,
            self.params.collider_radius,
            other.params.position,
            other.params.collider_radius,
        )
    }

    /// This vortex's contribution to the horizontal wind at `point` (x/z plane).
    ///
    /// `None` when `point` lies within [`AXIS_EPSILON`] of the axis.
    pub fn wind_sample(&self, point: DVec2) -> Option<DVec2> {
        let rel = point - self.planar_position();
        let r = rel.length();
        if r < AXIS_EPSILON {
            return None;
        }
        let v_theta = tangential_speed(r, self.params.core_radius, self.params.omega0);
        let tangent = rel.perp() / r;
        let advection = DVec2::new(self.params.wind_speed.x, self.params.wind_speed.z);
        Some(tangent * v_theta + advection)
    }

    /// Advance every particle by `dt` and emit their transforms.
    ///
    /// `t` is the global clock, shared by all vortices in a tick so that
    /// columns sway coherently. With a non-zero
    /// [`atmospheric_drift`](VisualConfig::atmospheric_drift) every particle is
    /// also shifted by the grid wind at the vortex axis. Debris is advanced and
    /// emitted afterwards.
    pub fn update_particles(
        &mut self,
        dt: f64,
        t: f64,
        terrain: &dyn Terrain,
        atmosphere: &AtmosphericGrid,
        rng: &mut SpawnRng,
        visuals: &VisualConfig,
        sink: &mut dyn RenderSink,
    ) {
        let params = &self.params;
        let ground = terrain.height(params.position.x, params.position.z);
        let base_y = ground + params.position.y + params.base_offset;
        let reference = field::reference_speed(params.radius_top, params.core_radius, params.omega0);
        let drift = atmosphere.local(params.position.x, params.position.z).wind * visuals.atmospheric_drift;

        for (index, particle) in self.pool.iter_mut().enumerate() {
            let motion = particle.advance(dt, params, rng);

            let frac = particle.altitude_frac(params.height);
            let (x_off, z_off) = params.sway(frac, t);
            let position = DVec3::new(
                params.position.x + x_off + particle.r * particle.theta.cos() + drift.x,
                base_y + particle.z,
                params.position.z + z_off + particle.r * particle.theta.sin() + drift.y,
            );

            let speed_frac = if reference > 0.0 { motion.speed() / reference } else { 0.0 };
            let instance = visuals.instance(position, frac, speed_frac, particle.color);
            sink.emit_particle_transform(self.id, index, instance);
        }

        self.debris.advance(dt);
        let center = DVec3::new(params.position.x, ground + params.base_offset, params.position.z);
        self.debris.emit(self.id, center, rng, sink);
    }
}

/// Sphere-sphere overlap test: `|a - b| < ra + rb`.
pub fn spheres_intersect(a: DVec3, ra: f64, b: DVec3, rb: f64) -> bool {
    a.distance(b) < ra + rb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::FlatTerrain;
    use crate::visuals::InstanceBuffer;

    fn vortex(params: VortexParams) -> Vortex {
        let mut rng = SpawnRng::seeded(17);
        Vortex::new(VortexId(1), params, &mut rng).unwrap()
    }

    #[test]
    fn test_validation_rejects_bad_shapes() {
        let mut rng = SpawnRng::seeded(0);
        let cases = [
            VortexParams::default().with_height(0.0),
            VortexParams::default().with_height(-1.0),
            VortexParams::default().with_radii(3.0, 2.0),
            VortexParams::default().with_radii(0.0, 2.0),
            VortexParams::default().with_core(0.0, 7.0),
            VortexParams::default().with_core(0.6, f64::NAN),
            VortexParams::default().with_position(DVec3::new(f64::INFINITY, 0.0, 0.0)),
            VortexParams::default().with_intensity(-1.0),
        ];
        for params in cases {
            assert!(Vortex::new(VortexId(0), params, &mut rng).is_err());
        }
    }

    #[test]
    fn test_validation_error_kinds() {
        assert_eq!(
            VortexParams::default().with_radii(3.0, 2.0).validate(),
            Err(VortexError::InvertedFunnel { radius_base: 3.0, radius_top: 2.0 })
        );
        assert_eq!(
            VortexParams::default().with_height(0.0).validate(),
            Err(VortexError::NonPositive { parameter: "height", value: 0.0 })
        );
        assert!(VortexParams::default().with_radii(2.0, 2.0).validate().is_ok());
    }

    #[test]
    fn test_from_intensity() {
        let p = VortexParams::from_intensity(1.2);
        assert!((p.height - 10.4).abs() < 1e-12);
        assert!((p.radius_base - 1.3).abs() < 1e-12);
        assert!((p.radius_top - 3.8).abs() < 1e-12);
        assert_eq!(p.particle_count, 540);
        assert_eq!(p.intensity, 1.2);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_move_and_advect() {
        let mut v = vortex(
            VortexParams::default()
                .with_particle_count(0)
                .with_wind_speed(DVec3::new(0.5, 0.0, -1.0)),
        );
        v.move_by(1.0, 2.0);
        assert_eq!(v.position(), DVec3::new(1.0, 0.0, 2.0));
        v.advect(2.0);
        assert_eq!(v.position(), DVec3::new(2.0, 0.0, 0.0));
        v.clamp_to(DVec2::splat(3.0), DVec2::splat(10.0));
        assert_eq!(v.planar_position(), DVec2::new(3.0, 3.0));
    }

    #[test]
    fn test_collision_scenario() {
        let a = DVec3::ZERO;
        assert!(spheres_intersect(a, 2.5, DVec3::new(4.0, 0.0, 0.0), 2.5));
        assert!(!spheres_intersect(a, 2.5, DVec3::new(6.0, 0.0, 0.0), 2.5));
    }

    #[test]
    fn test_wind_sample_is_tangential() {
        let v = vortex(VortexParams::default().with_particle_count(0).with_core(0.6, 7.0));
        let w = v.wind_sample(DVec2::new(1.2, 0.0)).unwrap();
        // Counter-clockwise tangent at +x is +z.
        assert!(w.x.abs() < 1e-12);
        assert!((w.y - 2.1).abs() < 1e-12);
        assert!(v.wind_sample(DVec2::new(0.005, 0.0)).is_none());
    }

    #[test]
    fn test_update_emits_every_particle() {
        let mut v = vortex(VortexParams::default().with_particle_count(50).with_debris(4));
        let mut rng = SpawnRng::seeded(2);
        let mut sink = InstanceBuffer::new();
        let terrain = FlatTerrain::new(1.0);
        let grid = AtmosphericGrid::default();
        v.update_particles(0.016, 0.0, &terrain, &grid, &mut rng, &VisualConfig::default(), &mut sink);
        assert_eq!(sink.particles.len(), 50);
        assert_eq!(sink.debris.len(), 4);
        // Every particle sits above the funnel base.
        assert!(sink.particles.iter().all(|p| p.position[1] >= 1.2 - 1e-6));
    }

    #[test]
    fn test_world_position_matches_kinematics() {
        let params = VortexParams::default()
            .with_particle_count(1)
            .with_position(DVec3::new(5.0, 0.0, 7.0))
            .with_sway(0.0, 0.0, 2.5);
        let mut v = vortex(params);
        let mut rng = SpawnRng::seeded(2);
        let mut sink = InstanceBuffer::new();
        let mut grid = AtmosphericGrid::default();
        // A vortex next door: the default config must ignore its wind.
        let mut neighbor_rng = SpawnRng::seeded(9);
        let neighbor = Vortex::new(
            VortexId(2),
            VortexParams::default().with_particle_count(0).with_position(DVec3::new(7.0, 0.0, 7.0)),
            &mut neighbor_rng,
        )
        .unwrap();
        grid.update([&neighbor]);
        v.update_particles(0.0, 0.0, &FlatTerrain::new(0.0), &grid, &mut rng, &VisualConfig::default(), &mut sink);

        let p = v.particles()[0];
        let inst = sink.particles[0];
        let expected = [
            (5.0 + p.r * p.theta.cos()) as f32,
            (0.2 + p.z) as f32,
            (7.0 + p.r * p.theta.sin()) as f32,
        ];
        for k in 0..3 {
            assert!((inst.position[k] - expected[k]).abs() < 1e-4);
        }
    }

    #[test]
    fn test_atmospheric_drift_follows_grid_wind() {
        let params = VortexParams::default()
            .with_particle_count(8)
            .with_position(DVec3::new(5.0, 0.0, 7.0));
        let mut rng = SpawnRng::seeded(4);
        let neighbor = Vortex::new(
            VortexId(2),
            VortexParams::default()
                .with_particle_count(0)
                .with_position(DVec3::new(7.0, 0.0, 9.0))
                .with_intensity(3.0),
            &mut rng,
        )
        .unwrap();
        let mut grid = AtmosphericGrid::default();
        grid.update([&neighbor]);
        let wind = grid.local(5.0, 7.0).wind;
        assert!(wind.length() > 0.0);

        let mut still = vortex(params.clone());
        let mut drifting = vortex(params);
        let (mut plain, mut shifted) = (InstanceBuffer::new(), InstanceBuffer::new());
        let terrain = FlatTerrain::new(0.0);
        still.update_particles(0.05, 1.0, &terrain, &grid, &mut SpawnRng::seeded(3), &VisualConfig::default(), &mut plain);
        let visuals = VisualConfig::default().with_atmospheric_drift(0.5);
        drifting.update_particles(0.05, 1.0, &terrain, &grid, &mut SpawnRng::seeded(3), &visuals, &mut shifted);

        for (a, b) in plain.particles.iter().zip(&shifted.particles) {
            assert!((b.position[0] - a.position[0] - (wind.x * 0.5) as f32).abs() < 1e-4);
            assert_eq!(b.position[1], a.position[1]);
            assert!((b.position[2] - a.position[2] - (wind.y * 0.5) as f32).abs() < 1e-4);
        }
    }

    #[test]
    fn test_sway_uses_shared_clock() {
        let p = VortexParams::default();
        let (x0, z0) = p.sway(0.5, 0.0);
        let (x1, z1) = p.sway(0.5, 1.0);
        assert!((x0 - (4.5 * 0.5 + 0.5 * (2.5 * 0.5 * PI).sin())).abs() < 1e-12);
        assert!((z1 - 0.5 * (2.5 * 0.5 * PI + 0.8).cos()).abs() < 1e-12);
        assert!(x0 != x1 && z0 != z1);
    }
}
