//! Render output: per-particle instances and the sink that consumes them.
//!
//! The simulation owns no scene graph. Each tick it hands one
//! [`ParticleInstance`] per particle to a [`RenderSink`]; what the sink does
//! with it (GPU upload, debug dump, nothing) is up to the host.
//!
//! # Color Mapping
//!
//! | Mapping | Description |
//! |---------|-------------|
//! | [`ColorMapping::Tag`] | Particle keeps the color tag it was spawned with (survives fusion) |
//! | [`ColorMapping::Speed`] | Gradient by total speed relative to the vortex's reference speed |
//!
//! Scale and alpha always interpolate over the particle's relative altitude.

use crate::vortex::VortexId;
use bytemuck::{Pod, Zeroable};
use glam::{DVec3, Vec3};

/// Named colors used by default vortex palettes.
pub mod palette {
    use glam::Vec3;

    /// Light blue.
    pub const AZURE: Vec3 = Vec3::new(0.0, 0.5, 1.0);
    /// Cyan.
    pub const CYAN: Vec3 = Vec3::new(0.0, 1.0, 1.0);
    /// Deep blue.
    pub const BLUE: Vec3 = Vec3::new(0.0, 0.0, 1.0);
    /// Orange.
    pub const ORANGE: Vec3 = Vec3::new(1.0, 0.5, 0.0);
    /// Red.
    pub const RED: Vec3 = Vec3::new(1.0, 0.0, 0.0);
    /// White.
    pub const WHITE: Vec3 = Vec3::new(1.0, 1.0, 1.0);
    /// Dark debris color.
    pub const BLACK: Vec3 = Vec3::new(0.0, 0.0, 0.0);
}

/// GPU-ready per-particle render data.
///
/// 32 bytes, no padding; a slice of these can be uploaded as an instance
/// buffer with [`bytemuck::cast_slice`].
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    /// World position.
    pub position: [f32; 3],
    /// Visual size.
    pub scale: f32,
    /// RGB color, 0.0-1.0.
    pub color: [f32; 3],
    /// Opacity, 0.0-1.0.
    pub alpha: f32,
}

impl ParticleInstance {
    /// Build an instance from simulation-space values.
    pub fn new(position: DVec3, color: Vec3, scale: f32, alpha: f32) -> Self {
        Self {
            position: position.as_vec3().to_array(),
            scale,
            color: color.to_array(),
            alpha,
        }
    }
}

/// How particle color is chosen each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ColorMapping {
    /// Use the particle's spawn color tag.
    #[default]
    Tag,
    /// Interpolate from `slow` to `fast` by normalized total speed.
    Speed {
        /// Color at rest.
        slow: Vec3,
        /// Color at the vortex's reference speed and above.
        fast: Vec3,
    },
}

impl ColorMapping {
    /// Cyan-to-blue speed gradient.
    pub fn speed() -> Self {
        ColorMapping::Speed {
            slow: palette::CYAN,
            fast: palette::BLUE,
        }
    }
}

/// Visual parameters shared by every vortex of a simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualConfig {
    /// Color selection.
    pub color_mapping: ColorMapping,
    /// Scale at the ground and at the top of the column.
    pub scale_range: (f32, f32),
    /// Alpha at the ground and at the top of the column.
    pub alpha_range: (f32, f32),
    /// Particles are shifted by the atmospheric wind under their vortex times
    /// this factor. `0.0` (the default) disables the shift.
    pub atmospheric_drift: f64,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            color_mapping: ColorMapping::Tag,
            scale_range: (0.2, 0.38),
            alpha_range: (0.9, 0.4),
            atmospheric_drift: 0.0,
        }
    }
}

impl VisualConfig {
    /// Set the color mapping.
    pub fn with_color_mapping(mut self, mapping: ColorMapping) -> Self {
        self.color_mapping = mapping;
        self
    }

    /// Set scale at ground and top.
    pub fn with_scale_range(mut self, ground: f32, top: f32) -> Self {
        self.scale_range = (ground, top);
        self
    }

    /// Set alpha at ground and top.
    pub fn with_alpha_range(mut self, ground: f32, top: f32) -> Self {
        self.alpha_range = (ground, top);
        self
    }

    /// Shift particles along the grid wind, e.g. `0.5`.
    pub fn with_atmospheric_drift(mut self, factor: f64) -> Self {
        self.atmospheric_drift = factor;
        self
    }

    /// Build the instance for a particle.
    ///
    /// * `altitude_frac` - `z / H`
    /// * `speed_frac` - total speed over the vortex's reference speed
    /// * `tag` - the particle's color tag
    pub fn instance(&self, position: DVec3, altitude_frac: f64, speed_frac: f64, tag: Vec3) -> ParticleInstance {
        let frac = altitude_frac.clamp(0.0, 1.0) as f32;
        let color = match self.color_mapping {
            ColorMapping::Tag => tag,
            ColorMapping::Speed { slow, fast } => slow.lerp(fast, speed_frac.clamp(0.0, 1.0) as f32),
        };
        let scale = lerp32(self.scale_range.0, self.scale_range.1, frac);
        let alpha = lerp32(self.alpha_range.0, self.alpha_range.1, frac);
        ParticleInstance::new(position, color, scale, alpha)
    }
}

fn lerp32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Consumer of render output.
pub trait RenderSink {
    /// One call per particle per tick.
    fn emit_particle_transform(&mut self, vortex: VortexId, index: usize, instance: ParticleInstance);

    /// One call per debris piece per tick.
    fn emit_debris_transform(&mut self, _vortex: VortexId, _index: usize, _instance: ParticleInstance) {}

    /// One call per rain drop per tick.
    fn emit_raindrop(&mut self, _index: usize, _instance: ParticleInstance) {}
}

/// Sink that discards everything (headless runs, benchmarks).
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn emit_particle_transform(&mut self, _vortex: VortexId, _index: usize, _instance: ParticleInstance) {}
}

/// Sink that collects a frame of instances for upload.
///
/// Call [`InstanceBuffer::clear`] before each tick.
#[derive(Clone, Debug, Default)]
pub struct InstanceBuffer {
    /// Particle instances in emission order.
    pub particles: Vec<ParticleInstance>,
    /// Owning vortex of each entry in `particles`.
    pub owners: Vec<VortexId>,
    /// Debris instances.
    pub debris: Vec<ParticleInstance>,
    /// Rain drop instances.
    pub rain: Vec<ParticleInstance>,
}

impl InstanceBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the previous frame.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.owners.clear();
        self.debris.clear();
        self.rain.clear();
    }

    /// Raw bytes of the particle instances, ready for a GPU buffer.
    pub fn particle_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.particles)
    }

    /// Number of particle instances emitted by `vortex`.
    pub fn count_for(&self, vortex: VortexId) -> usize {
        self.owners.iter().filter(|&&id| id == vortex).count()
    }
}

impl RenderSink for InstanceBuffer {
    fn emit_particle_transform(&mut self, vortex: VortexId, _index: usize, instance: ParticleInstance) {
        self.particles.push(instance);
        self.owners.push(vortex);
    }

    fn emit_debris_transform(&mut self, _vortex: VortexId, _index: usize, instance: ParticleInstance) {
        self.debris.push(instance);
    }

    fn emit_raindrop(&mut self, _index: usize, instance: ParticleInstance) {
        self.rain.push(instance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_layout() {
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 32);
        let buf = InstanceBuffer {
            particles: vec![ParticleInstance::default(); 3],
            ..Default::default()
        };
        assert_eq!(buf.particle_bytes().len(), 96);
    }

    #[test]
    fn test_tag_mapping_keeps_tag() {
        let cfg = VisualConfig::default();
        let inst = cfg.instance(DVec3::new(1.0, 2.0, 3.0), 0.0, 1.0, palette::ORANGE);
        assert_eq!(inst.color, palette::ORANGE.to_array());
        assert_eq!(inst.position, [1.0, 2.0, 3.0]);
        assert_eq!(inst.scale, 0.2);
        assert_eq!(inst.alpha, 0.9);
    }

    #[test]
    fn test_speed_mapping() {
        let cfg = VisualConfig::default().with_color_mapping(ColorMapping::speed());
        let slow = cfg.instance(DVec3::ZERO, 1.0, 0.0, palette::RED);
        let fast = cfg.instance(DVec3::ZERO, 1.0, 5.0, palette::RED);
        assert_eq!(slow.color, palette::CYAN.to_array());
        assert_eq!(fast.color, palette::BLUE.to_array());
        assert!((slow.scale - 0.38).abs() < 1e-6);
        assert!((slow.alpha - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_instance_buffer_counts_per_owner() {
        let mut buf = InstanceBuffer::new();
        buf.emit_particle_transform(VortexId(1), 0, ParticleInstance::default());
        buf.emit_particle_transform(VortexId(2), 0, ParticleInstance::default());
        buf.emit_particle_transform(VortexId(1), 1, ParticleInstance::default());
        buf.emit_raindrop(0, ParticleInstance::default());
        assert_eq!(buf.count_for(VortexId(1)), 2);
        assert_eq!(buf.count_for(VortexId(2)), 1);
        assert_eq!(buf.rain.len(), 1);
        buf.clear();
        assert!(buf.particles.is_empty() && buf.rain.is_empty());
    }
}
