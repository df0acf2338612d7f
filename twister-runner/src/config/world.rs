use glam::DVec2;
use serde::{Deserialize, Serialize};
use twister::{
    AiConfig, AtmosphericGrid, ColorMapping, FlatTerrain, FusionConfig, PrecipitationConfig, SineHeightmap,
    Simulation, Vec3, VisualConfig,
};

/// Ground under the vortices.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum TerrainConfig {
    /// Rolling `sin * cos` heightmap.
    Sine { size: usize, spacing: f64, amplitude: f64 },
    /// Level ground over a square of edge `extent`.
    Flat { elevation: f64, extent: f64 },
}

impl Default for TerrainConfig {
    fn default() -> Self {
        TerrainConfig::Sine {
            size: 64,
            spacing: 0.7,
            amplitude: 0.8,
        }
    }
}

impl TerrainConfig {
    pub fn name(&self) -> &'static str {
        match self {
            TerrainConfig::Sine { .. } => "Sine",
            TerrainConfig::Flat { .. } => "Flat",
        }
    }

    /// Install the terrain on a simulation.
    pub fn apply(&self, sim: Simulation) -> Simulation {
        match *self {
            TerrainConfig::Sine { size, spacing, amplitude } => {
                sim.with_terrain(SineHeightmap::new(size, spacing, amplitude))
            }
            TerrainConfig::Flat { elevation, extent } => {
                sim.with_terrain(FlatTerrain::new(elevation).with_bounds(DVec2::ZERO, DVec2::splat(extent)))
            }
        }
    }
}

/// Atmospheric grid resolution.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridSettings {
    pub size: usize,
    pub cell_size: f64,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            size: 64,
            cell_size: 0.7,
        }
    }
}

impl GridSettings {
    pub fn to_grid(&self) -> AtmosphericGrid {
        AtmosphericGrid::new(self.size, self.cell_size)
    }
}

/// Fusion timing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FusionSettings {
    pub duration: f64,
    pub blend_rate: f64,
}

impl Default for FusionSettings {
    fn default() -> Self {
        let c = FusionConfig::default();
        Self {
            duration: c.duration,
            blend_rate: c.blend_rate,
        }
    }
}

impl FusionSettings {
    pub fn to_fusion_config(&self) -> FusionConfig {
        FusionConfig::default()
            .with_duration(self.duration)
            .with_blend_rate(self.blend_rate)
    }
}

/// AI tuning.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AiSettings {
    pub pursuit_step: f64,
    pub gradient_step: f64,
    pub arrive_epsilon: f64,
    pub search_radius: usize,
}

impl Default for AiSettings {
    fn default() -> Self {
        let c = AiConfig::default();
        Self {
            pursuit_step: c.pursuit_step,
            gradient_step: c.gradient_step,
            arrive_epsilon: c.arrive_epsilon,
            search_radius: c.search_radius,
        }
    }
}

impl AiSettings {
    pub fn to_ai_config(&self) -> AiConfig {
        AiConfig::default()
            .with_steps(self.pursuit_step, self.gradient_step)
            .with_arrive_epsilon(self.arrive_epsilon)
            .with_search_radius(self.search_radius)
    }
}

/// Particle color selection.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub enum ColorMappingConfig {
    #[default]
    Tag,
    Speed { slow: [f32; 3], fast: [f32; 3] },
}

impl ColorMappingConfig {
    pub fn name(&self) -> &'static str {
        match self {
            ColorMappingConfig::Tag => "Tag",
            ColorMappingConfig::Speed { .. } => "Speed",
        }
    }

    pub fn to_color_mapping(&self) -> ColorMapping {
        match self {
            ColorMappingConfig::Tag => ColorMapping::Tag,
            ColorMappingConfig::Speed { slow, fast } => ColorMapping::Speed {
                slow: Vec3::from_array(*slow),
                fast: Vec3::from_array(*fast),
            },
        }
    }
}

/// Render output settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VisualsConfig {
    pub color_mapping: ColorMappingConfig,
    /// Particle scale at the ground and at the top.
    pub scale_range: [f32; 2],
    /// Particle alpha at the ground and at the top.
    pub alpha_range: [f32; 2],
    /// Shift particles by the atmospheric wind times this factor; 0 disables.
    pub atmospheric_drift: f64,
}

impl Default for VisualsConfig {
    fn default() -> Self {
        let v = VisualConfig::default();
        Self {
            color_mapping: ColorMappingConfig::Tag,
            scale_range: [v.scale_range.0, v.scale_range.1],
            alpha_range: [v.alpha_range.0, v.alpha_range.1],
            atmospheric_drift: v.atmospheric_drift,
        }
    }
}

impl VisualsConfig {
    pub fn to_visual_config(&self) -> VisualConfig {
        VisualConfig::default()
            .with_color_mapping(self.color_mapping.to_color_mapping())
            .with_scale_range(self.scale_range[0], self.scale_range[1])
            .with_alpha_range(self.alpha_range[0], self.alpha_range[1])
            .with_atmospheric_drift(self.atmospheric_drift)
    }
}

/// Rain settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PrecipitationSettings {
    pub fall_speed: [f64; 2],
    pub spawn_height: [f64; 2],
    pub drops_per_intensity: f64,
    pub batch: usize,
}

impl Default for PrecipitationSettings {
    fn default() -> Self {
        let c = PrecipitationConfig::default();
        Self {
            fall_speed: [c.fall_speed.0, c.fall_speed.1],
            spawn_height: [c.spawn_height.0, c.spawn_height.1],
            drops_per_intensity: c.drops_per_intensity,
            batch: c.batch,
        }
    }
}

impl PrecipitationSettings {
    pub fn to_precipitation_config(&self) -> PrecipitationConfig {
        PrecipitationConfig {
            fall_speed: (self.fall_speed[0], self.fall_speed[1]),
            spawn_height: (self.spawn_height[0], self.spawn_height[1]),
            drops_per_intensity: self.drops_per_intensity,
            batch: self.batch,
        }
    }
}
