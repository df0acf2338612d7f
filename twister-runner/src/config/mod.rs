//! Scenario configuration.
//!
//! A scenario is everything needed to reproduce a run: world settings, the
//! vortices to spawn and how long to step. It serializes to JSON and is what
//! the runner loads.

mod vortex;
mod world;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use twister::{Simulation, Vec3, VortexError, VortexId, VortexParams};

pub use vortex::{PolicyConfig, VortexConfig};
pub use world::{
    AiSettings, ColorMappingConfig, FusionSettings, GridSettings, PrecipitationSettings, TerrainConfig,
    VisualsConfig,
};

/// Errors from loading or building a scenario.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("vortex '{name}' is invalid: {source}")]
    InvalidVortex {
        name: String,
        #[source]
        source: VortexError,
    },

    #[error("invalid fusion settings: {0}")]
    InvalidFusion(#[source] VortexError),

    #[error("vortex '{vortex}' pursues unknown vortex '{target}'")]
    UnknownTarget { vortex: String, target: String },

    #[error("vortex name '{0}' is used more than once")]
    DuplicateName(String),
}

fn default_seed() -> u64 {
    0
}

fn default_dt() -> f64 {
    1.0 / 60.0
}

fn default_ticks() -> u64 {
    600
}

/// Complete scenario.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScenarioConfig {
    pub name: String,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Step length.
    #[serde(default = "default_dt")]
    pub dt: f64,
    /// Steps to run.
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    #[serde(default)]
    pub terrain: TerrainConfig,
    #[serde(default)]
    pub grid: GridSettings,
    #[serde(default)]
    pub fusion: FusionSettings,
    #[serde(default)]
    pub ai: AiSettings,
    #[serde(default)]
    pub visuals: VisualsConfig,
    /// Rain; disabled when absent.
    #[serde(default)]
    pub precipitation: Option<PrecipitationSettings>,
    pub vortices: Vec<VortexConfig>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self::two_twister_fusion()
    }
}

/// A built scenario, ready to step.
pub struct Scenario {
    pub simulation: Simulation,
    /// Configured name of every spawned vortex.
    pub names: Vec<(String, VortexId)>,
    pub dt: f64,
    pub ticks: u64,
}

impl Scenario {
    /// Name of a vortex, falling back to its id.
    pub fn name_of(&self, id: VortexId) -> String {
        self.names
            .iter()
            .find(|(_, v)| *v == id)
            .map(|(n, _)| n.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

impl ScenarioConfig {
    /// Two columns drifting into each other and fusing: a thin blue one and a
    /// broad orange one across a 64-cell sine heightmap.
    pub fn two_twister_fusion() -> Self {
        let extent = 64.0 * 0.7;
        let thin = VortexParams::default()
            .with_position(twister::DVec3::new(extent * 0.1, 0.0, extent * 0.5))
            .with_particle_count(900)
            .with_colors(Vec3::new(0.0, 0.5, 1.0), Vec3::new(0.0, 1.0, 1.0))
            .with_wind_speed(twister::DVec3::new(1.8, 0.0, 0.0))
            .with_collider_radius(3.2);
        let broad = VortexParams::default()
            .with_position(twister::DVec3::new(extent * 0.9, 0.0, extent * 0.5))
            .with_particle_count(1900)
            .with_height(25.0)
            .with_radii(0.9, 9.2)
            .with_core(3.0, 15.5)
            .with_sway(10.0, 0.7, 3.0)
            .with_colors(Vec3::new(1.0, 0.5, 0.0), Vec3::new(1.0, 0.0, 0.0))
            .with_wind_speed(twister::DVec3::new(-11.4, 0.0, 0.0))
            .with_collider_radius(3.5);

        Self {
            name: "Two twister fusion".into(),
            seed: default_seed(),
            dt: default_dt(),
            ticks: 6_600,
            terrain: TerrainConfig::default(),
            grid: GridSettings::default(),
            fusion: FusionSettings::default(),
            ai: AiSettings::default(),
            visuals: VisualsConfig::default(),
            precipitation: None,
            vortices: vec![
                VortexConfig::from_params("thin", &thin),
                VortexConfig::from_params("broad", &broad),
            ],
        }
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Build the simulation and spawn every vortex.
    ///
    /// Vortices are spawned in order; pursuit targets are resolved by name
    /// afterwards, so a vortex may pursue one listed after it.
    pub fn build(&self) -> Result<Scenario, ConfigError> {
        let mut sim = self.terrain.apply(
            Simulation::new()
                .with_seed(self.seed)
                .with_grid(self.grid.to_grid())
                .with_fusion(self.fusion.to_fusion_config())
                .map_err(ConfigError::InvalidFusion)?
                .with_ai(self.ai.to_ai_config())
                .with_visuals(self.visuals.to_visual_config()),
        );
        if let Some(rain) = &self.precipitation {
            sim = sim.with_precipitation(rain.to_precipitation_config());
        }

        let mut names: Vec<(String, VortexId)> = Vec::with_capacity(self.vortices.len());
        for cfg in &self.vortices {
            if names.iter().any(|(n, _)| n == &cfg.name) {
                return Err(ConfigError::DuplicateName(cfg.name.clone()));
            }
            let id = sim
                .spawn_vortex(cfg.to_params(), twister::MovementPolicy::Manual)
                .map_err(|source| ConfigError::InvalidVortex {
                    name: cfg.name.clone(),
                    source,
                })?;
            names.push((cfg.name.clone(), id));
        }

        let lookup = |name: &str| names.iter().find(|(n, _)| n == name).map(|(_, id)| *id);
        for (cfg, (_, id)) in self.vortices.iter().zip(&names) {
            let policy = cfg.policy.to_policy(lookup).ok_or_else(|| ConfigError::UnknownTarget {
                vortex: cfg.name.clone(),
                target: cfg.policy.target().unwrap_or_default().to_string(),
            })?;
            sim.set_policy(*id, policy);
        }

        tracing::info!(scenario = %self.name, vortices = names.len(), "scenario built");
        Ok(Scenario {
            simulation: sim,
            names,
            dt: self.dt,
            ticks: self.ticks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twister::MovementPolicy;

    #[test]
    fn test_default_scenario_builds() {
        let scenario = ScenarioConfig::default().build().unwrap();
        assert_eq!(scenario.names.len(), 2);
        assert_eq!(scenario.simulation.particle_count(), 2800);
        assert_eq!(scenario.name_of(scenario.names[1].1), "broad");
    }

    #[test]
    fn test_json_round_trip() {
        let cfg = ScenarioConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ScenarioConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn test_minimal_json() {
        let cfg: ScenarioConfig = serde_json::from_str(
            r#"{
                "name": "chase",
                "terrain": { "Flat": { "elevation": 0.0, "extent": 40.0 } },
                "vortices": [
                    { "name": "hunter", "position": [30.0, 0.0, 10.0], "policy": { "Pursue": { "target": "prey" } } },
                    { "name": "prey", "position": [10.0, 0.0, 10.0], "particle_count": 10 }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.ticks, 600);
        let scenario = cfg.build().unwrap();
        let hunter = scenario.names[0].1;
        let prey = scenario.names[1].1;
        assert_eq!(
            scenario.simulation.vortex(hunter).unwrap().policy(),
            MovementPolicy::DirectPursuit(prey)
        );
    }

    #[test]
    fn test_unknown_target() {
        let mut cfg = ScenarioConfig::default();
        cfg.vortices[0].policy = PolicyConfig::Pursue { target: "nobody".into() };
        assert!(matches!(cfg.build(), Err(ConfigError::UnknownTarget { .. })));
    }

    #[test]
    fn test_invalid_vortex_named() {
        let mut cfg = ScenarioConfig::default();
        cfg.vortices[1].radius_base = 20.0;
        match cfg.build() {
            Err(ConfigError::InvalidVortex { name, source }) => {
                assert_eq!(name, "broad");
                assert!(matches!(source, VortexError::InvertedFunnel { .. }));
            }
            other => panic!("unexpected: {:?}", other.err()),
        }
    }

    #[test]
    fn test_broken_fusion_settings_rejected() {
        let cases = [
            (r#"{ "duration": 0.0 }"#, VortexError::NonPositive { parameter: "duration", value: 0.0 }),
            (r#"{ "blend_rate": -0.5 }"#, VortexError::NonPositive { parameter: "blend_rate", value: -0.5 }),
            (
                r#"{ "duration": 1.0, "blend_rate": 0.5 }"#,
                VortexError::FusionTooShort { duration: 1.0, blend_rate: 0.5 },
            ),
        ];
        for (json, expected) in cases {
            let mut cfg = ScenarioConfig::default();
            cfg.fusion = serde_json::from_str(json).unwrap();
            match cfg.build() {
                Err(ConfigError::InvalidFusion(source)) => assert_eq!(source, expected),
                other => panic!("unexpected: {:?}", other.err()),
            }
        }
    }

    #[test]
    fn test_duplicate_names() {
        let mut cfg = ScenarioConfig::default();
        cfg.vortices[1].name = "thin".into();
        assert!(matches!(cfg.build(), Err(ConfigError::DuplicateName(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = ScenarioConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
