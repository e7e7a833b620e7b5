//! Parameters structure for HeadCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for heading control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- GAINS ----

    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,

    /// Limit on the magnitude of the integral accumulation. Zero disables
    /// the limit.
    ///
    /// Units: radian seconds
    #[serde(default)]
    pub integral_limit: f64,

    /// Limit on the magnitude of the controller output.
    #[serde(default = "Params::default_max_output")]
    pub max_output: f64,

    // ---- SETTLING ----

    /// Heading error under which the heading is considered on target.
    ///
    /// Units: radians
    pub tolerance_rad: f64,

    /// Time the heading must remain within tolerance before the rotation is
    /// considered finished.
    ///
    /// Units: seconds
    pub settle_time_s: f64,

    // ---- TIMING AND WRAPPING ----

    /// If true the heading error is wrapped into `(-pi, pi]` so that the
    /// controller always turns the short way round.
    #[serde(default = "Params::default_wrap_error")]
    pub wrap_error: bool,

    /// If set every update is assumed to take exactly this long, otherwise
    /// the wall-clock time between updates is measured.
    ///
    /// Units: seconds
    #[serde(default)]
    pub fixed_dt_s: Option<f64>,
}

impl Params {
    fn default_max_output() -> f64 {
        1.0
    }

    fn default_wrap_error() -> bool {
        true
    }
}
