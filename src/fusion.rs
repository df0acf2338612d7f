//! Collision-driven fusion of vortex pairs.
//!
//! A vortex is `Free` until its collision sphere overlaps another free
//! vortex. The pair then enters `Merging`: both sources drift toward the
//! midpoint and their parameters are pulled toward a shared target every
//! tick. When the fusion timer runs out the two sources are destroyed and a
//! single free vortex takes their place, carrying both particle pools
//! unchanged.
//!
//! # Tick
//!
//! [`FusionMachine::check_and_advance`] runs once per tick:
//!
//! 1. Every vortex drifts with its advection velocity.
//! 2. Running fusions advance `progress` and `timer`, then blend both
//!    sources toward the target.
//! 3. Fusions whose timer reached the duration complete. The next vortex
//!    list is built in a staging buffer and swapped in.
//! 4. Free pairs are tested for collision in list order. A vortex joins at
//!    most one fusion.
//!
//! # Example
//!
//! ```
//! use twister::prelude::*;
//!
//! let mut rng = SpawnRng::seeded(5);
//! let mut vortices = vec![
//!     Vortex::new(VortexId(0), VortexParams::default().with_particle_count(30), &mut rng).unwrap(),
//!     Vortex::new(
//!         VortexId(1),
//!         VortexParams::default()
//!             .with_particle_count(20)
//!             .with_position(DVec3::new(4.0, 0.0, 0.0)),
//!         &mut rng,
//!     )
//!     .unwrap(),
//! ];
//!
//! let config = FusionConfig::default().with_duration(1.0).with_blend_rate(1.0);
//! let mut fusion = FusionMachine::new(config).unwrap();
//! let mut next = 2;
//! let mut alloc = || { next += 1; VortexId(next - 1) };
//! let started = fusion.check_and_advance(&mut vortices, 0.1, &mut alloc);
//! assert!(matches!(started[0], FusionEvent::Started { .. }));
//!
//! for _ in 0..12 {
//!     fusion.check_and_advance(&mut vortices, 0.1, &mut alloc);
//! }
//! assert_eq!(vortices.len(), 1);
//! assert_eq!(vortices[0].particle_count(), 50);
//! ```

use crate::ai::MovementPolicy;
use crate::debris::DebrisRing;
use crate::error::{Result, VortexError};
use crate::field::lerp;
use crate::particle::ParticlePool;
use crate::vortex::{Vortex, VortexId, VortexParams};
use glam::DVec3;
use std::collections::{HashMap, HashSet};

/// Timing of a fusion.
#[derive(Clone, Debug, PartialEq)]
pub struct FusionConfig {
    /// Time from collision to completion.
    pub duration: f64,
    /// Progress gained per time unit.
    pub blend_rate: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            duration: 100.0,
            blend_rate: 0.5,
        }
    }
}

impl FusionConfig {
    /// Set the fusion duration.
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    /// Set the blend rate.
    pub fn with_blend_rate(mut self, rate: f64) -> Self {
        self.blend_rate = rate;
        self
    }

    /// Check that both values are finite and positive, and that progress can
    /// reach 1 by the time the fusion completes (`duration * blend_rate >= 1`).
    pub fn validate(&self) -> Result<()> {
        for (parameter, value) in [("duration", self.duration), ("blend_rate", self.blend_rate)] {
            if !value.is_finite() {
                return Err(VortexError::NotFinite { parameter, value });
            }
            if value <= 0.0 {
                return Err(VortexError::NonPositive { parameter, value });
            }
        }
        if self.duration * self.blend_rate < 1.0 {
            return Err(VortexError::FusionTooShort {
                duration: self.duration,
                blend_rate: self.blend_rate,
            });
        }
        Ok(())
    }
}

/// Parameter set both sources converge to.
#[derive(Clone, Debug, PartialEq)]
pub struct FusionTarget {
    pub position: DVec3,
    pub height: f64,
    pub radius_base: f64,
    pub radius_top: f64,
    pub core_radius: f64,
    pub omega0: f64,
    pub max_inclination: f64,
    pub sin_amplitude: f64,
    pub sin_freq: f64,
    pub collider_radius: f64,
    pub intensity: f64,
}

impl FusionTarget {
    /// Blend two parameter sets.
    ///
    /// Midpoint position, mean of the shape scalars, a wider top
    /// (`(rt1 + rt2) * 0.7`), a larger collider (`(c1 + c2) / 1.5`) and the
    /// summed intensity.
    pub fn blend(a: &VortexParams, b: &VortexParams) -> Self {
        let mean = |x: f64, y: f64| (x + y) / 2.0;
        Self {
            position: (a.position + b.position) / 2.0,
            height: mean(a.height, b.height),
            radius_base: mean(a.radius_base, b.radius_base),
            radius_top: (a.radius_top + b.radius_top) * 0.7,
            core_radius: mean(a.core_radius, b.core_radius),
            omega0: mean(a.omega0, b.omega0),
            max_inclination: mean(a.max_inclination, b.max_inclination),
            sin_amplitude: mean(a.sin_amplitude, b.sin_amplitude),
            sin_freq: mean(a.sin_freq, b.sin_freq),
            collider_radius: (a.collider_radius + b.collider_radius) / 1.5,
            intensity: a.intensity + b.intensity,
        }
    }

    /// Move every blended parameter of `params` toward the target by `t`.
    pub fn pull(&self, params: &mut VortexParams, t: f64) {
        params.position = params.position.lerp(self.position, t);
        params.height = lerp(params.height, self.height, t);
        params.radius_base = lerp(params.radius_base, self.radius_base, t);
        params.radius_top = lerp(params.radius_top, self.radius_top, t);
        params.core_radius = lerp(params.core_radius, self.core_radius, t);
        params.omega0 = lerp(params.omega0, self.omega0, t);
        params.max_inclination = lerp(params.max_inclination, self.max_inclination, t);
        params.sin_amplitude = lerp(params.sin_amplitude, self.sin_amplitude, t);
        params.sin_freq = lerp(params.sin_freq, self.sin_freq, t);
        params.collider_radius = lerp(params.collider_radius, self.collider_radius, t);
        params.intensity = lerp(params.intensity, self.intensity, t);
    }
}

/// A running fusion.
#[derive(Clone, Debug, PartialEq)]
pub struct FusionState {
    /// First source (earlier in the vortex list at detection).
    pub first: VortexId,
    /// Second source.
    pub second: VortexId,
    /// Blend progress in `[0, 1]`.
    pub progress: f64,
    /// Time since the collision.
    pub timer: f64,
    /// Parameters both sources converge to.
    pub target: FusionTarget,
}

impl FusionState {
    /// Whether `id` is one of the sources.
    pub fn involves(&self, id: VortexId) -> bool {
        self.first == id || self.second == id
    }
}

/// What happened during a fusion tick.
#[derive(Clone, Debug, PartialEq)]
pub enum FusionEvent {
    /// Two free vortices collided and began merging.
    Started {
        first: VortexId,
        second: VortexId,
    },
    /// A fusion finished; both sources were replaced by `merged`.
    Completed {
        first: VortexId,
        second: VortexId,
        merged: VortexId,
        particles: usize,
    },
    /// A fusion was dropped because a source disappeared.
    Aborted {
        first: VortexId,
        second: VortexId,
    },
}

/// Tracks every running fusion.
#[derive(Clone, Debug, Default)]
pub struct FusionMachine {
    config: FusionConfig,
    active: Vec<FusionState>,
}

impl FusionMachine {
    /// Create a machine with no running fusions.
    ///
    /// Fails when `config` does not pass [`FusionConfig::validate`].
    pub fn new(config: FusionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            active: Vec::new(),
        })
    }

    /// Timing configuration.
    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Running fusions.
    pub fn active(&self) -> &[FusionState] {
        &self.active
    }

    /// Whether `id` is currently merging.
    pub fn is_merging(&self, id: VortexId) -> bool {
        self.active.iter().any(|s| s.involves(id))
    }

    /// Run one fusion tick over `vortices`.
    ///
    /// `alloc` hands out ids for merged vortices.
    pub fn check_and_advance(
        &mut self,
        vortices: &mut Vec<Vortex>,
        dt: f64,
        alloc: &mut dyn FnMut() -> VortexId,
    ) -> Vec<FusionEvent> {
        let mut events = Vec::new();

        for vortex in vortices.iter_mut() {
            vortex.advect(dt);
        }

        self.advance(vortices, dt, &mut events);
        self.complete(vortices, alloc, &mut events);
        self.detect(vortices, &mut events);

        events
    }

    fn advance(&mut self, vortices: &mut [Vortex], dt: f64, events: &mut Vec<FusionEvent>) {
        let present: HashSet<VortexId> = vortices.iter().map(Vortex::id).collect();
        self.active.retain(|state| {
            let alive = present.contains(&state.first) && present.contains(&state.second);
            if !alive {
                tracing::warn!(first = %state.first, second = %state.second, "fusion source vanished, aborting");
                events.push(FusionEvent::Aborted {
                    first: state.first,
                    second: state.second,
                });
            }
            alive
        });

        for state in &mut self.active {
            state.progress = (state.progress + dt * self.config.blend_rate).min(1.0);
            state.timer += dt;
            for vortex in vortices.iter_mut().filter(|v| state.involves(v.id())) {
                state.target.pull(vortex.params_mut(), state.progress);
            }
        }
    }

    fn complete(
        &mut self,
        vortices: &mut Vec<Vortex>,
        alloc: &mut dyn FnMut() -> VortexId,
        events: &mut Vec<FusionEvent>,
    ) {
        let duration = self.config.duration;
        let (done, running): (Vec<_>, Vec<_>) = self.active.drain(..).partition(|s| s.timer >= duration);
        self.active = running;
        if done.is_empty() {
            return;
        }

        let consumed: HashSet<VortexId> = done.iter().flat_map(|s| [s.first, s.second]).collect();
        let mut staging = Vec::with_capacity(vortices.len());
        let mut sources = HashMap::new();
        for vortex in vortices.drain(..) {
            if consumed.contains(&vortex.id()) {
                sources.insert(vortex.id(), vortex);
            } else {
                staging.push(vortex);
            }
        }

        let mut remap = HashMap::new();
        for state in done {
            let (Some(a), Some(b)) = (sources.remove(&state.first), sources.remove(&state.second)) else {
                continue;
            };
            let merged = merge(a, b, &state.target, alloc());
            tracing::info!(
                first = %state.first,
                second = %state.second,
                merged = %merged.id(),
                particles = merged.particle_count(),
                "fusion completed"
            );
            remap.insert(state.first, merged.id());
            remap.insert(state.second, merged.id());
            events.push(FusionEvent::Completed {
                first: state.first,
                second: state.second,
                merged: merged.id(),
                particles: merged.particle_count(),
            });
            staging.push(merged);
        }

        for vortex in &mut staging {
            if let MovementPolicy::DirectPursuit(target) = vortex.policy() {
                if let Some(&merged) = remap.get(&target) {
                    vortex.set_policy(MovementPolicy::DirectPursuit(merged));
                }
            }
        }

        *vortices = staging;
    }

    fn detect(&mut self, vortices: &mut [Vortex], events: &mut Vec<FusionEvent>) {
        for i in 0..vortices.len() {
            if self.is_merging(vortices[i].id()) {
                continue;
            }
            for j in (i + 1)..vortices.len() {
                if self.is_merging(vortices[j].id()) || !vortices[i].intersects(&vortices[j]) {
                    continue;
                }

                let target = FusionTarget::blend(vortices[i].params(), vortices[j].params());
                for k in [i, j] {
                    let params = vortices[k].params_mut();
                    params.wind_speed = (target.position - params.position) / self.config.duration;
                }

                let (first, second) = (vortices[i].id(), vortices[j].id());
                tracing::info!(%first, %second, "fusion started");
                events.push(FusionEvent::Started { first, second });
                self.active.push(FusionState {
                    first,
                    second,
                    progress: 0.0,
                    timer: 0.0,
                    target,
                });
                break;
            }
        }
    }
}

/// Combine two sources into one free vortex at their midpoint.
fn merge(a: Vortex, b: Vortex, target: &FusionTarget, id: VortexId) -> Vortex {
    let policy = if a.policy().is_autonomous() || b.policy().is_autonomous() {
        MovementPolicy::PressureGradient
    } else {
        MovementPolicy::Manual
    };
    let (pa, pool_a, debris_a) = a.into_parts();
    let (pb, pool_b, debris_b) = b.into_parts();

    let mut params = pa.clone();
    target.pull(&mut params, 1.0);
    params.position = (pa.position + pb.position) / 2.0;
    params.wind_speed = DVec3::ZERO;
    params.primary_color = pa.primary_color;
    params.secondary_color = pb.primary_color;
    params.spawn_jitter = 0.0;

    let pool = ParticlePool::merged(pool_a, pool_b);
    let debris = DebrisRing::merged(debris_a, debris_b);
    params.particle_count = pool.len();
    params.debris_count = debris.len();

    Vortex::assemble(id, params, pool, debris, policy)
}
