//! Debris swirling around the foot of a vortex.
//!
//! Debris pieces orbit the base on fixed radii at a constant angular rate and
//! bounce a little above the ground. They are purely decorative and do not
//! take part in the wind field.

use crate::spawn::SpawnRng;
use crate::vortex::VortexId;
use crate::visuals::{palette, ParticleInstance, RenderSink};
use glam::DVec3;

/// Angular rate of every debris piece (rad per time unit).
pub const DEBRIS_SPIN: f64 = 3.5;

/// Debris orbit radii span `[0.7, 5.6)` times the funnel base radius.
pub const DEBRIS_RADIUS_RANGE: (f64, f64) = (0.7, 5.6);

/// Maximum height of the per-frame bounce above the ground.
pub const DEBRIS_BOUNCE: f64 = 0.3;

const DEBRIS_SCALE: f32 = 0.12;
const DEBRIS_ALPHA: f32 = 0.7;

/// One debris piece.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Debris {
    /// Orbital phase.
    pub angle: f64,
    /// Orbit radius.
    pub radius: f64,
}

/// Debris belonging to one vortex.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DebrisRing {
    pieces: Vec<Debris>,
}

impl DebrisRing {
    /// Scatter `count` pieces around a base of radius `radius_base`.
    pub fn spawn(count: usize, radius_base: f64, rng: &mut SpawnRng) -> Self {
        let (lo, hi) = DEBRIS_RADIUS_RANGE;
        let pieces = (0..count)
            .map(|_| Debris {
                angle: rng.phase(),
                radius: rng.range(radius_base * lo, radius_base * hi),
            })
            .collect();
        Self { pieces }
    }

    /// Concatenate two rings.
    pub fn merged(first: DebrisRing, second: DebrisRing) -> Self {
        let mut pieces = first.pieces;
        pieces.extend(second.pieces);
        Self { pieces }
    }

    /// Debris pieces.
    pub fn pieces(&self) -> &[Debris] {
        &self.pieces
    }

    /// Number of pieces.
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// Whether the ring is empty.
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Rotate every piece by `dt`.
    pub fn advance(&mut self, dt: f64) {
        for piece in &mut self.pieces {
            piece.angle += dt * DEBRIS_SPIN;
        }
    }

    /// Emit one instance per piece around `center` (ground level under the axis).
    pub fn emit(&self, vortex: VortexId, center: DVec3, rng: &mut SpawnRng, sink: &mut dyn RenderSink) {
        for (index, piece) in self.pieces.iter().enumerate() {
            let position = DVec3::new(
                center.x + piece.radius * piece.angle.cos(),
                center.y + rng.range(0.0, DEBRIS_BOUNCE),
                center.z + piece.radius * piece.angle.sin(),
            );
            let instance = ParticleInstance::new(position, palette::BLACK, DEBRIS_SCALE, DEBRIS_ALPHA);
            sink.emit_debris_transform(vortex, index, instance);
        }
    }
}
