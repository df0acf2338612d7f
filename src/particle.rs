//! Vortex particles and their per-tick kinematics.
//!
//! A particle is a point sample of the funnel described in cylindrical
//! coordinates around the vortex axis:
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `z` | altitude above the funnel base, always in `[0, H]` after a tick |
//! | `theta` | orbital phase, wrapped to `[0, 2π)` |
//! | `r` | orbit radius, derived from `z` by the funnel profile |
//! | `color` | color tag fixed at spawn, carried verbatim through fusion |
//!
//! Particles rise with the updraft and orbit with the Rankine field. A
//! particle that leaves the top is recycled in place: back to `z = 0` with a
//! fresh random phase. Pools never shrink or grow during normal updates.

use crate::field::{self, tangential_speed, updraft_speed};
use crate::spawn::SpawnRng;
use crate::vortex::VortexParams;
use glam::Vec3;
use std::f64::consts::TAU;

/// Shape of the spawn altitude distribution (power law, see [`SpawnRng::power`]).
pub const SPAWN_ALTITUDE_SHAPE: f64 = 2.5;

/// Kinematic record of one particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Altitude above the funnel base.
    pub z: f64,
    /// Orbital phase in radians.
    pub theta: f64,
    /// Current orbit radius.
    pub r: f64,
    /// Color tag assigned at spawn.
    pub color: Vec3,
}

/// Velocities a particle moved with during its last step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Motion {
    /// Tangential speed.
    pub v_theta: f64,
    /// Vertical speed.
    pub v_up: f64,
}

impl Motion {
    /// Magnitude of the combined tangential and vertical velocity.
    #[inline]
    pub fn speed(&self) -> f64 {
        self.v_theta.hypot(self.v_up)
    }
}

impl Particle {
    /// Spawn particle `index` of `count` for a vortex with `params`.
    ///
    /// Altitude follows the power-law spawn distribution, radius the funnel
    /// profile plus the construction-only jitter. The first half of the pool
    /// takes the primary color tag, the rest the secondary one.
    pub fn spawn(index: usize, count: usize, params: &VortexParams, rng: &mut SpawnRng) -> Self {
        let z = rng.power(SPAWN_ALTITUDE_SHAPE) * params.height;
        let r = field::funnel_radius(z, params.height, params.radius_base, params.radius_top)
            + rng.range(0.0, params.spawn_jitter);
        let theta = rng.phase();
        let color = if index < count / 2 {
            params.primary_color
        } else {
            params.secondary_color
        };
        Self { z, theta, r, color }
    }

    /// Relative altitude `z / H`.
    #[inline]
    pub fn altitude_frac(&self, height: f64) -> f64 {
        (self.z / height).clamp(0.0, 1.0)
    }

    /// Advance one tick of length `dt`.
    ///
    /// Rotation and rise use the radius from the previous tick. The radius is
    /// recomputed from the new altitude afterwards, so it never drifts from
    /// the funnel profile.
    pub fn advance(&mut self, dt: f64, params: &VortexParams, rng: &mut SpawnRng) -> Motion {
        let v_theta = tangential_speed(self.r, params.core_radius, params.omega0);
        let v_up = updraft_speed(self.r, params.radius_top);

        self.theta = (self.theta + dt * v_theta / (self.r + field::ANGULAR_EPSILON)).rem_euclid(TAU);
        self.z += dt * v_up;

        if self.z > params.height {
            self.z = 0.0;
            self.theta = rng.phase();
        }

        self.r = field::funnel_radius(self.z, params.height, params.radius_base, params.radius_top);

        Motion { v_theta, v_up }
    }
}

/// Particles owned by a single vortex.
///
/// Only the owning vortex mutates the pool; fusion consumes whole pools by
/// value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticlePool {
    particles: Vec<Particle>,
}

impl ParticlePool {
    /// Spawn `params.particle_count` particles.
    pub fn spawn(params: &VortexParams, rng: &mut SpawnRng) -> Self {
        let count = params.particle_count;
        let particles = (0..count).map(|i| Particle::spawn(i, count, params, rng)).collect();
        Self { particles }
    }

    /// Wrap an existing set of particles without resampling.
    pub fn from_particles(particles: Vec<Particle>) -> Self {
        Self { particles }
    }

    /// Concatenate two pools, `first` then `second`, particles unchanged.
    pub fn merged(first: ParticlePool, second: ParticlePool) -> Self {
        let mut particles = first.particles;
        particles.extend(second.particles);
        Self { particles }
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Read-only view of the particles.
    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    /// Iterate over the particles.
    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Particle> {
        self.particles.iter_mut()
    }

    /// Take the particles out of the pool.
    pub fn into_particles(self) -> Vec<Particle> {
        self.particles
    }
}
