//! Rankine vortex velocity field and funnel shape profile.
//!
//! The tangential field combines two regimes:
//!
//! - **Solid-body core** (`r < core_radius`): speed grows linearly with radius.
//! - **Free vortex** (`r >= core_radius`): speed decays as `1/r`, conserving
//!   circulation.
//!
//! Both branches yield `omega0 * core_radius` at the core boundary, so the
//! profile is continuous.
//!
//! # Example
//!
//! ```
//! use twister::field::tangential_speed;
//!
//! let inside = tangential_speed(0.3, 0.6, 7.0);
//! let edge = tangential_speed(0.6, 0.6, 7.0);
//! assert!((inside - 2.1).abs() < 1e-12);
//! assert!((edge - 4.2).abs() < 1e-12);
//! ```
//!
//! All functions here are pure; vortex state lives in [`crate::vortex`].

/// Added to the radius when converting tangential speed into angular rate.
pub const ANGULAR_EPSILON: f64 = 1e-3;

/// Updraft speed on the vortex axis.
pub const UPDRAFT_AXIS: f64 = 2.0;

/// Updraft speed at the outer edge of the funnel.
pub const UPDRAFT_EDGE: f64 = 0.5;

/// Reference vertical speed used to normalize total particle speed for coloring.
pub const UPDRAFT_REFERENCE: f64 = 1.5;

/// Shape exponent of the funnel widening with altitude.
pub const WIDENING_EXPONENT: f64 = 1.5;

/// Tangential speed of the Rankine vortex at radial distance `r`.
#[inline]
pub fn tangential_speed(r: f64, core_radius: f64, omega0: f64) -> f64 {
    if r < core_radius {
        omega0 * r
    } else {
        omega0 * core_radius * core_radius / r
    }
}

/// Angular rate (rad per time unit) of a particle orbiting at radius `r`.
///
/// Never divides by zero: [`ANGULAR_EPSILON`] is added to the radius.
#[inline]
pub fn angular_rate(r: f64, core_radius: f64, omega0: f64) -> f64 {
    tangential_speed(r, core_radius, omega0) / (r + ANGULAR_EPSILON)
}

/// Vertical updraft speed at radius `r` for a funnel whose top radius is `radius_top`.
///
/// Decays linearly from [`UPDRAFT_AXIS`] on the axis to [`UPDRAFT_EDGE`] at
/// `radius_top`. The interpolation fraction is clamped to `[0, 1]`, so radii
/// beyond `radius_top` (seen while a fusion shrinks the funnel) keep the edge
/// speed instead of extrapolating below it.
#[inline]
pub fn updraft_speed(r: f64, radius_top: f64) -> f64 {
    let frac = if radius_top > 0.0 {
        (r / radius_top).clamp(0.0, 1.0)
    } else {
        1.0
    };
    lerp(UPDRAFT_AXIS, UPDRAFT_EDGE, frac)
}

/// Orbit radius at altitude `z` of a funnel of height `height`.
///
/// `radius_base + (radius_top - radius_base) * (z / height)^1.5`, with the
/// altitude fraction clamped to `[0, 1]`. Non-decreasing in `z`.
#[inline]
pub fn funnel_radius(z: f64, height: f64, radius_base: f64, radius_top: f64) -> f64 {
    let frac = (z / height).clamp(0.0, 1.0);
    radius_base + (radius_top - radius_base) * frac.powf(WIDENING_EXPONENT)
}

/// Maximum total particle speed used to normalize speed-based coloring.
pub fn reference_speed(radius_top: f64, core_radius: f64, omega0: f64) -> f64 {
    tangential_speed(radius_top, core_radius, omega0).hypot(UPDRAFT_REFERENCE)
}

/// Linear interpolation from `a` to `b` by `t` (unclamped).
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
