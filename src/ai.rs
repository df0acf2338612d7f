//! Movement policies for autonomous vortices.
//!
//! Each vortex carries a [`MovementPolicy`] chosen at construction. Every tick
//! the policy is evaluated into an optional planar displacement; applying it
//! (and clamping the result to the terrain) is the caller's job.
//!
//! | Policy | Behavior |
//! |--------|----------|
//! | [`MovementPolicy::Manual`] | Never moves on its own |
//! | [`MovementPolicy::DirectPursuit`] | Steps straight toward another vortex |
//! | [`MovementPolicy::PressureGradient`] | Steps toward the lowest-pressure cell nearby |
//!
//! A pursuit whose target no longer exists falls back to the pressure
//! gradient.

use crate::atmosphere::AtmosphericGrid;
use crate::vortex::{Vortex, VortexId};
use glam::DVec2;

/// How a vortex chooses where to go.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MovementPolicy {
    /// Driven only by external move commands.
    #[default]
    Manual,
    /// Chase the vortex with this id.
    DirectPursuit(VortexId),
    /// Descend the atmospheric pressure field.
    PressureGradient,
}

impl MovementPolicy {
    /// Whether the policy moves the vortex by itself.
    pub fn is_autonomous(&self) -> bool {
        !matches!(self, MovementPolicy::Manual)
    }
}

/// Step sizes and search window of the autonomous policies.
#[derive(Clone, Debug, PartialEq)]
pub struct AiConfig {
    /// Distance covered per tick while pursuing.
    pub pursuit_step: f64,
    /// Distance covered per tick while descending the pressure field.
    pub gradient_step: f64,
    /// No move when the target is closer than this.
    pub arrive_epsilon: f64,
    /// Half-width of the pressure search window, in cells.
    pub search_radius: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            pursuit_step: 0.35,
            gradient_step: 0.25,
            arrive_epsilon: 0.1,
            search_radius: 8,
        }
    }
}

impl AiConfig {
    /// Set both step sizes.
    pub fn with_steps(mut self, pursuit: f64, gradient: f64) -> Self {
        self.pursuit_step = pursuit;
        self.gradient_step = gradient;
        self
    }

    /// Set the arrival threshold.
    pub fn with_arrive_epsilon(mut self, epsilon: f64) -> Self {
        self.arrive_epsilon = epsilon;
        self
    }

    /// Set the search window half-width.
    pub fn with_search_radius(mut self, radius: usize) -> Self {
        self.search_radius = radius;
        self
    }
}

/// Fixed-length step from `from` toward `to`, or `None` once within `epsilon`.
pub fn step_toward(from: DVec2, to: DVec2, step: f64, epsilon: f64) -> Option<DVec2> {
    let delta = to - from;
    let dist = delta.length();
    if dist > epsilon {
        Some(delta / dist * step)
    } else {
        None
    }
}

/// Cell with the lowest pressure in the window around `cell`.
///
/// The window spans `radius` cells each way, clamped to the grid. The start
/// cell is the initial candidate and only a strictly lower pressure replaces
/// it, so ties resolve to the first minimum in scan order.
pub fn lowest_pressure_cell(grid: &AtmosphericGrid, cell: (usize, usize), radius: usize) -> (usize, usize) {
    let last = grid.size() - 1;
    let (ci, cj) = (cell.0.min(last), cell.1.min(last));

    let mut best = (ci, cj);
    let mut best_pressure = grid.pressure(ci, cj);
    for i in ci.saturating_sub(radius)..=(ci + radius).min(last) {
        for j in cj.saturating_sub(radius)..=(cj + radius).min(last) {
            let p = grid.pressure(i, j);
            if p < best_pressure {
                best_pressure = p;
                best = (i, j);
            }
        }
    }
    best
}

/// Displacement that moves `position` toward the lowest nearby pressure.
pub fn gradient_move(position: DVec2, grid: &AtmosphericGrid, config: &AiConfig) -> Option<DVec2> {
    let cell = grid.clamped_cell_of(position.x, position.y);
    let (ti, tj) = lowest_pressure_cell(grid, cell, config.search_radius);
    step_toward(position, grid.cell_center(ti, tj), config.gradient_step, config.arrive_epsilon)
}

/// Evaluate `vortex`'s policy against the current world.
///
/// `vortices` is the full list as of the previous step; it may include
/// `vortex` itself.
pub fn decide(vortex: &Vortex, vortices: &[Vortex], grid: &AtmosphericGrid, config: &AiConfig) -> Option<DVec2> {
    let position = vortex.planar_position();
    match vortex.policy() {
        MovementPolicy::Manual => None,
        MovementPolicy::DirectPursuit(target) => {
            match vortices.iter().find(|v| v.id() == target && v.id() != vortex.id()) {
                Some(prey) => step_toward(
                    position,
                    prey.planar_position(),
                    config.pursuit_step,
                    config.arrive_epsilon,
                ),
                None => {
                    tracing::trace!(id = %vortex.id(), %target, "pursuit target missing, following pressure");
                    gradient_move(position, grid, config)
                }
            }
        }
        MovementPolicy::PressureGradient => gradient_move(position, grid, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawn::SpawnRng;
    use crate::vortex::VortexParams;
    use glam::DVec3;

    fn vortex(id: u64, x: f64, z: f64, policy: MovementPolicy) -> Vortex {
        let mut rng = SpawnRng::seeded(id);
        let params = VortexParams::default()
            .with_particle_count(0)
            .with_position(DVec3::new(x, 0.0, z));
        Vortex::new(VortexId(id), params, &mut rng).unwrap().with_policy(policy)
    }

    #[test]
    fn test_manual_never_moves() {
        let grid = AtmosphericGrid::default();
        let v = vortex(0, 5.0, 5.0, MovementPolicy::Manual);
        assert_eq!(decide(&v, &[], &grid, &AiConfig::default()), None);
        assert!(!MovementPolicy::Manual.is_autonomous());
    }

    #[test]
    fn test_pursuit_step() {
        let grid = AtmosphericGrid::default();
        let prey = vortex(0, 10.0, 10.0, MovementPolicy::Manual);
        let hunter = vortex(1, 13.0, 14.0, MovementPolicy::DirectPursuit(VortexId(0)));
        let all = [prey, hunter.clone()];
        let step = decide(&hunter, &all, &grid, &AiConfig::default()).unwrap();
        assert!((step.length() - 0.35).abs() < 1e-12);
        assert!((step - DVec2::new(-0.6, -0.8) * 0.35).length() < 1e-12);
    }

    #[test]
    fn test_pursuit_arrived() {
        let grid = AtmosphericGrid::default();
        let prey = vortex(0, 10.0, 10.0, MovementPolicy::Manual);
        let hunter = vortex(1, 10.05, 10.0, MovementPolicy::DirectPursuit(VortexId(0)));
        assert_eq!(decide(&hunter, &[prey, hunter.clone()], &grid, &AiConfig::default()), None);
    }

    #[test]
    fn test_missing_target_falls_back_to_gradient() {
        let mut grid = AtmosphericGrid::new(32, 1.0);
        grid.set_pressure(12, 10, 990.0);
        let hunter = vortex(1, 10.0, 10.0, MovementPolicy::DirectPursuit(VortexId(42)));
        let step = decide(&hunter, &[hunter.clone()], &grid, &AiConfig::default()).unwrap();
        assert!((step - DVec2::new(0.25, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_injected_low_pressure_cell_wins() {
        let mut grid = AtmosphericGrid::new(64, 1.0);
        grid.set_pressure(5, 5, 900.0);
        for ci in 0..=13 {
            for cj in 0..=13 {
                assert_eq!(lowest_pressure_cell(&grid, (ci, cj), 8), (5, 5), "start ({ci}, {cj})");
            }
        }
        // Outside the window the start cell stays.
        assert_eq!(lowest_pressure_cell(&grid, (14, 5), 8), (14, 5));
    }

    #[test]
    fn test_gradient_policy_moves_toward_low_cell() {
        let mut grid = AtmosphericGrid::new(64, 0.7);
        grid.set_pressure(5, 5, 900.0);
        let v = vortex(0, 8.4, 3.5, MovementPolicy::PressureGradient);
        let step = decide(&v, &[v.clone()], &grid, &AiConfig::default()).unwrap();
        let expected = (grid.cell_center(5, 5) - DVec2::new(8.4, 3.5)).normalize() * 0.25;
        assert!((step - expected).length() < 1e-9);
    }

    #[test]
    fn test_tie_keeps_first_minimum() {
        let mut grid = AtmosphericGrid::new(16, 1.0);
        grid.set_pressure(6, 9, 950.0);
        grid.set_pressure(9, 2, 950.0);
        // Scan runs i-major, so (6, 9) is found first.
        assert_eq!(lowest_pressure_cell(&grid, (8, 6), 8), (6, 9));
    }

    #[test]
    fn test_uniform_field_stays_put() {
        let grid = AtmosphericGrid::new(16, 1.0);
        let v = vortex(0, 4.0, 4.0, MovementPolicy::PressureGradient);
        assert_eq!(decide(&v, &[], &grid, &AiConfig::default()), None);
    }
}
