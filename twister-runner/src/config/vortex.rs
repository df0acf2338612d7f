use glam::DVec3;
use serde::{Deserialize, Serialize};
use twister::{MovementPolicy, Vec3, VortexId, VortexParams};

/// Movement policy, with pursuit targets referenced by vortex name.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub enum PolicyConfig {
    #[default]
    Manual,
    Pursue {
        target: String,
    },
    PressureGradient,
}

impl PolicyConfig {
    pub fn name(&self) -> &'static str {
        match self {
            PolicyConfig::Manual => "Manual",
            PolicyConfig::Pursue { .. } => "Pursue",
            PolicyConfig::PressureGradient => "Pressure Gradient",
        }
    }

    /// Name of the pursued vortex, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            PolicyConfig::Pursue { target } => Some(target),
            _ => None,
        }
    }

    /// Resolve against a name lookup. `None` when the pursuit target is unknown.
    pub fn to_policy(&self, lookup: impl Fn(&str) -> Option<VortexId>) -> Option<MovementPolicy> {
        match self {
            PolicyConfig::Manual => Some(MovementPolicy::Manual),
            PolicyConfig::Pursue { target } => lookup(target).map(MovementPolicy::DirectPursuit),
            PolicyConfig::PressureGradient => Some(MovementPolicy::PressureGradient),
        }
    }
}

/// One vortex of a scenario. Missing fields take the library defaults.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VortexConfig {
    pub name: String,
    /// Scale height, radii and particle count from this intensity first.
    pub preset_intensity: Option<f64>,
    pub position: [f64; 3],
    pub height: f64,
    pub radius_base: f64,
    pub radius_top: f64,
    pub core_radius: f64,
    pub omega0: f64,
    pub max_inclination: f64,
    pub sin_amplitude: f64,
    pub sin_freq: f64,
    /// Advection velocity, world units per time unit.
    pub wind_speed: [f64; 3],
    pub intensity: f64,
    pub collider_radius: f64,
    pub primary_color: [f32; 3],
    pub secondary_color: [f32; 3],
    pub particle_count: usize,
    pub spawn_jitter: f64,
    pub debris_count: usize,
    pub policy: PolicyConfig,
}

impl Default for VortexConfig {
    fn default() -> Self {
        Self::from_params("vortex", &VortexParams::default())
    }
}

impl VortexConfig {
    /// Capture a parameter set.
    pub fn from_params(name: impl Into<String>, p: &VortexParams) -> Self {
        Self {
            name: name.into(),
            preset_intensity: None,
            position: p.position.to_array(),
            height: p.height,
            radius_base: p.radius_base,
            radius_top: p.radius_top,
            core_radius: p.core_radius,
            omega0: p.omega0,
            max_inclination: p.max_inclination,
            sin_amplitude: p.sin_amplitude,
            sin_freq: p.sin_freq,
            wind_speed: p.wind_speed.to_array(),
            intensity: p.intensity,
            collider_radius: p.collider_radius,
            primary_color: p.primary_color.to_array(),
            secondary_color: p.secondary_color.to_array(),
            particle_count: p.particle_count,
            spawn_jitter: p.spawn_jitter,
            debris_count: p.debris_count,
            policy: PolicyConfig::Manual,
        }
    }

    /// Convert to library parameters.
    ///
    /// With `preset_intensity` set, height, radii, particle count and
    /// intensity come from [`VortexParams::from_intensity`] and the matching
    /// fields here are ignored.
    pub fn to_params(&self) -> VortexParams {
        let base = VortexParams::default()
            .with_height(self.height)
            .with_radii(self.radius_base, self.radius_top)
            .with_particle_count(self.particle_count)
            .with_intensity(self.intensity);
        let base = match self.preset_intensity {
            Some(i) => {
                let preset = VortexParams::from_intensity(i);
                base.with_height(preset.height)
                    .with_radii(preset.radius_base, preset.radius_top)
                    .with_particle_count(preset.particle_count)
                    .with_intensity(preset.intensity)
            }
            None => base,
        };
        base.with_position(DVec3::from_array(self.position))
            .with_core(self.core_radius, self.omega0)
            .with_sway(self.max_inclination, self.sin_amplitude, self.sin_freq)
            .with_wind_speed(DVec3::from_array(self.wind_speed))
            .with_collider_radius(self.collider_radius)
            .with_colors(Vec3::from_array(self.primary_color), Vec3::from_array(self.secondary_color))
            .with_spawn_jitter(self.spawn_jitter)
            .with_debris(self.debris_count)
    }
}
