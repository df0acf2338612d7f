//! Rain that thickens with the strongest vortex.
//!
//! Drops fall at a random speed each tick and respawn at a random point above
//! the terrain once they pass below the ground plane. While the pool is
//! smaller than `drops_per_intensity * max_intensity` it grows by one batch
//! per tick. It never shrinks.

use crate::spawn::SpawnRng;
use crate::visuals::{palette, ParticleInstance, RenderSink};
use glam::{DVec2, DVec3};

const DROP_SCALE: f32 = 0.05;
const DROP_ALPHA: f32 = 0.8;

/// Precipitation tuning.
#[derive(Clone, Debug, PartialEq)]
pub struct PrecipitationConfig {
    /// Fall speed range, sampled per drop per tick.
    pub fall_speed: (f64, f64),
    /// Respawn height range.
    pub spawn_height: (f64, f64),
    /// Target drop count per unit of the strongest intensity.
    pub drops_per_intensity: f64,
    /// Drops added per tick while below target.
    pub batch: usize,
}

impl Default for PrecipitationConfig {
    fn default() -> Self {
        Self {
            fall_speed: (8.0, 12.0),
            spawn_height: (10.0, 20.0),
            drops_per_intensity: 200.0,
            batch: 5,
        }
    }
}

/// Rain drops over the terrain.
#[derive(Clone, Debug, Default)]
pub struct Precipitation {
    config: PrecipitationConfig,
    drops: Vec<DVec3>,
}

impl Precipitation {
    /// Empty sky.
    pub fn new(config: PrecipitationConfig) -> Self {
        Self {
            config,
            drops: Vec::new(),
        }
    }

    /// Drop positions.
    pub fn drops(&self) -> &[DVec3] {
        &self.drops
    }

    /// Number of drops.
    pub fn len(&self) -> usize {
        self.drops.len()
    }

    /// Whether there is no rain.
    pub fn is_empty(&self) -> bool {
        self.drops.is_empty()
    }

    /// Drop count the pool grows toward for a given intensity.
    pub fn target_count(&self, max_intensity: f64) -> usize {
        (self.config.drops_per_intensity * max_intensity.max(0.0)) as usize
    }

    /// Let every drop fall for `dt`, respawn the grounded ones inside
    /// `[min, max]`, and grow the pool toward the target for `max_intensity`.
    pub fn update(&mut self, dt: f64, max_intensity: f64, min: DVec2, max: DVec2, rng: &mut SpawnRng) {
        let (lo, hi) = self.config.fall_speed;
        for i in 0..self.drops.len() {
            self.drops[i].y -= dt * rng.range(lo, hi);
            if self.drops[i].y < 0.0 {
                self.drops[i] = self.spawn_point(min, max, rng);
            }
        }

        if self.drops.len() < self.target_count(max_intensity) {
            for _ in 0..self.config.batch {
                let drop = self.spawn_point(min, max, rng);
                self.drops.push(drop);
            }
        }
    }

    fn spawn_point(&self, min: DVec2, max: DVec2, rng: &mut SpawnRng) -> DVec3 {
        let (lo, hi) = self.config.spawn_height;
        DVec3::new(rng.range(min.x, max.x), rng.range(lo, hi), rng.range(min.y, max.y))
    }

    /// Emit one instance per drop.
    pub fn emit(&self, sink: &mut dyn RenderSink) {
        for (index, &drop) in self.drops.iter().enumerate() {
            sink.emit_raindrop(index, ParticleInstance::new(drop, palette::AZURE, DROP_SCALE, DROP_ALPHA));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visuals::InstanceBuffer;

    const MIN: DVec2 = DVec2::ZERO;
    const MAX: DVec2 = DVec2::new(44.8, 44.8);

    #[test]
    fn test_no_rain_without_vortices() {
        let mut rain = Precipitation::default();
        let mut rng = SpawnRng::seeded(1);
        rain.update(0.1, 0.0, MIN, MAX, &mut rng);
        assert!(rain.is_empty());
    }

    #[test]
    fn test_grows_in_batches_up_to_target() {
        let mut rain = Precipitation::new(PrecipitationConfig::default());
        let mut rng = SpawnRng::seeded(1);
        assert_eq!(rain.target_count(0.1), 20);
        for tick in 1..=10 {
            rain.update(0.0, 0.1, MIN, MAX, &mut rng);
            assert_eq!(rain.len(), (tick * 5).min(20));
        }
    }

    #[test]
    fn test_drops_stay_in_sky() {
        let mut rain = Precipitation::default();
        let mut rng = SpawnRng::seeded(8);
        for _ in 0..500 {
            rain.update(1.0 / 30.0, 1.6, MIN, MAX, &mut rng);
            for d in rain.drops() {
                assert!(d.y >= 0.0 && d.y < 20.0);
                assert!(d.x >= 0.0 && d.x < 44.8 && d.z >= 0.0 && d.z < 44.8);
            }
        }
        assert_eq!(rain.len(), 320);
    }

    #[test]
    fn test_emit() {
        let mut rain = Precipitation::default();
        let mut rng = SpawnRng::seeded(8);
        rain.update(0.0, 1.0, MIN, MAX, &mut rng);
        let mut sink = InstanceBuffer::new();
        rain.emit(&mut sink);
        assert_eq!(sink.rain.len(), 5);
    }
}
