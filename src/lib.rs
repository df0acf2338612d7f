//! # twister
//!
//! Tornado vortex kinematics: Rankine particle columns, multi-vortex wind
//! superposition, an atmospheric grid, autonomous movement and collision-driven
//! fusion.
//!
//! ## Quick Start
//!
//! ```
//! use twister::prelude::*;
//!
//! let mut sim = Simulation::new().with_seed(42);
//! let player = sim
//!     .spawn_vortex(
//!         VortexParams::default().with_position(DVec3::new(4.5, 0.0, 22.4)),
//!         MovementPolicy::Manual,
//!     )
//!     .unwrap();
//! sim.spawn_vortex(
//!     VortexParams::from_intensity(1.6).with_position(DVec3::new(40.3, 0.0, 22.4)),
//!     MovementPolicy::DirectPursuit(player),
//! )
//! .unwrap();
//!
//! let mut frame = InstanceBuffer::new();
//! for _ in 0..60 {
//!     frame.clear();
//!     sim.step(1.0 / 60.0, &mut frame);
//! }
//! assert_eq!(frame.particles.len(), sim.particle_count());
//! ```
//!
//! ## Core Concepts
//!
//! ### Vortices
//!
//! A [`Vortex`] is plain data: a [`VortexParams`] set describing the funnel,
//! the particles that draw it and a [`MovementPolicy`]. Parameters are
//! validated at construction; an inverted funnel or a non-positive height is a
//! [`VortexError`], never a NaN later on.
//!
//! ### Particles
//!
//! Particles orbit with the Rankine tangential field ([`field`]), rise with
//! the updraft and are recycled at the ground when they pass the top. Their
//! radius always follows the funnel profile `rb + (rt - rb) (z/H)^1.5`.
//!
//! ### Rendering
//!
//! Nothing here draws. Every tick each particle becomes a
//! [`ParticleInstance`] handed to a [`RenderSink`]. [`InstanceBuffer`]
//! collects a frame for GPU upload, [`NullSink`] discards it.
//!
//! ### Fusion
//!
//! Overlapping collision spheres start a fusion: both sources blend toward a
//! shared parameter set and finally become one vortex owning both particle
//! pools, unchanged. See [`fusion`].
//!
//! ## Module Overview
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`field`] | Rankine speed, updraft, funnel profile |
//! | [`particle`] | Particle kinematics and pools |
//! | [`vortex`] | Vortex parameters and aggregate |
//! | [`wind`] | Wind superposition and wind maps |
//! | [`atmosphere`] | Pressure / temperature / wind grid |
//! | [`ai`] | Movement policies |
//! | [`fusion`] | Fusion state machine |
//! | [`weather`] | Precipitation |
//! | [`simulation`] | Tick driver |

pub mod ai;
pub mod atmosphere;
pub mod debris;
pub mod error;
pub mod field;
pub mod fusion;
pub mod particle;
pub mod simulation;
pub mod spawn;
pub mod terrain;
pub mod time;
pub mod visuals;
pub mod vortex;
pub mod weather;
pub mod wind;

pub use ai::{AiConfig, MovementPolicy};
pub use atmosphere::AtmosphericGrid;
pub use bytemuck;
pub use error::{Result, VortexError};
pub use fusion::{FusionConfig, FusionEvent, FusionMachine};
pub use glam::{DVec2, DVec3, Vec3};
pub use particle::{Particle, ParticlePool};
pub use simulation::{Simulation, TickReport};
pub use spawn::SpawnRng;
pub use terrain::{FlatTerrain, SineHeightmap, Terrain};
pub use time::Clock;
pub use visuals::{ColorMapping, InstanceBuffer, NullSink, ParticleInstance, RenderSink, VisualConfig};
pub use vortex::{Vortex, VortexId, VortexParams};
pub use weather::{Precipitation, PrecipitationConfig};
pub use wind::{wind_at, WindMap};

/// Convenient re-exports for common usage.
///
/// ```
/// use twister::prelude::*;
/// ```
pub mod prelude {
    pub use crate::ai::{AiConfig, MovementPolicy};
    pub use crate::atmosphere::AtmosphericGrid;
    pub use crate::error::VortexError;
    pub use crate::fusion::{FusionConfig, FusionEvent, FusionMachine};
    pub use crate::simulation::{Simulation, TickReport};
    pub use crate::spawn::SpawnRng;
    pub use crate::terrain::{FlatTerrain, SineHeightmap, Terrain};
    pub use crate::time::Clock;
    pub use crate::visuals::{palette, ColorMapping, InstanceBuffer, NullSink, RenderSink, VisualConfig};
    pub use crate::vortex::{Vortex, VortexId, VortexParams};
    pub use crate::weather::PrecipitationConfig;
    pub use crate::{DVec2, DVec3, Vec3};
}
