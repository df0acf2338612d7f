//! Error types for twister.
//!
//! Per-tick operations never fail: numerically risky spots are guarded in
//! place (epsilon in the angular rate, clamped grid lookups, skipped wind
//! contributions at a vortex axis). The fallible steps are building a vortex
//! or a fusion machine from parameters that would otherwise produce NaNs.

use thiserror::Error;

/// Errors raised while validating vortex and fusion parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VortexError {
    /// A parameter must be strictly positive.
    #[error("{parameter} must be > 0, got {value}")]
    NonPositive {
        /// Parameter name
        parameter: &'static str,
        /// Offending value
        value: f64,
    },

    /// The funnel must not narrow with altitude.
    #[error("radius_base ({radius_base}) must not exceed radius_top ({radius_top})")]
    InvertedFunnel {
        /// Radius at ground level
        radius_base: f64,
        /// Radius at the top of the column
        radius_top: f64,
    },

    /// A parameter is NaN or infinite.
    #[error("{parameter} must be finite, got {value}")]
    NotFinite {
        /// Parameter name
        parameter: &'static str,
        /// Offending value
        value: f64,
    },

    /// A parameter must not be negative.
    #[error("{parameter} must be >= 0, got {value}")]
    Negative {
        /// Parameter name
        parameter: &'static str,
        /// Offending value
        value: f64,
    },

    /// Blending cannot finish before the fusion completes.
    #[error("blend_rate ({blend_rate}) * duration ({duration}) must be >= 1")]
    FusionTooShort {
        /// Fusion duration
        duration: f64,
        /// Progress gained per time unit
        blend_rate: f64,
    },
}

/// Result alias used by constructors.
pub type Result<T> = std::result::Result<T, VortexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_parameter() {
        let err = VortexError::NonPositive { parameter: "height", value: 0.0 };
        assert_eq!(err.to_string(), "height must be > 0, got 0");

        let err = VortexError::InvertedFunnel { radius_base: 3.0, radius_top: 2.0 };
        assert!(err.to_string().contains("radius_base (3)"));

        let err = VortexError::FusionTooShort { duration: 1.0, blend_rate: 0.5 };
        assert_eq!(err.to_string(), "blend_rate (0.5) * duration (1) must be >= 1");
    }
}
