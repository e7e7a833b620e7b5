//! Parameters for the drive executable

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::time::Duration;
use serde::Deserialize;

// Internal
use crate::{head_ctrl, mecanum, sim};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// All parameters required by `drive_exec`, loaded from a single file.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecParams {
    pub head_ctrl: head_ctrl::Params,

    pub mecanum: mecanum::Params,

    pub sim: sim::Params,

    pub run: RunParams,
}

/// The scripted run performed by the executable.
#[derive(Debug, Clone, Deserialize)]
pub struct RunParams {
    /// Heading to rotate to before driving.
    ///
    /// Units: radians
    pub target_heading_rad: f64,

    /// Time allowed for the initial rotation to settle.
    ///
    /// Units: seconds
    pub rotate_timeout_s: f64,

    /// Field-relative course to drive along after the rotation.
    ///
    /// Units: radians
    pub course_rad: f64,

    /// Translation velocity while driving, between 0 and 1.
    pub velocity: f64,

    /// Number of control cycles to drive for.
    pub drive_cycles: usize,

    /// Target period of one control cycle while driving.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors found when interpreting the run parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RunParamsError {
    #[error("{name} must be a finite, non-negative number of seconds, found {value}")]
    InvalidDuration {
        name: &'static str,
        value: f64
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RunParams {
    /// The rotation timeout as a `Duration`.
    pub fn rotate_timeout(&self) -> Result<Duration, RunParamsError> {
        secs_to_duration("rotate_timeout_s", self.rotate_timeout_s)
    }

    /// The drive cycle period as a `Duration`.
    pub fn cycle_period(&self) -> Result<Duration, RunParamsError> {
        secs_to_duration("cycle_period_s", self.cycle_period_s)
    }
}

/// `Duration::from_secs_f64` panics on negative or non-finite input, so check
/// it first.
fn secs_to_duration(name: &'static str, value: f64) -> Result<Duration, RunParamsError> {
    if value.is_finite() && value >= 0f64 {
        Ok(Duration::from_secs_f64(value))
    }
    else {
        Err(RunParamsError::InvalidDuration { name, value })
    }
}
