//! # Heading control module
//!
//! Heading control samples a heading sensor (usually a gyro), compares it to
//! a target heading and produces a scalar correction which the drivetrain
//! applies as a rotation demand. It also decides when the heading has
//! settled, i.e. when the rotation is complete.
//!
//! The `HeadingController` trait is the capability consumed by the heading
//! drivetrain. `PidHeadingController` is the provided implementation.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod pid;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::Params;
pub use pid::PidController;
pub use state::*;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A source of heading measurements.
pub trait HeadingSensor {
    /// Take a new heading sample.
    ///
    /// Units: radians, counter-clockwise positive
    fn read_heading(&mut self) -> Result<f64, HeadCtrlError>;
}

/// A feedback controller which drives a heading towards a target.
pub trait HeadingController {
    /// Set the heading the controller shall drive towards.
    fn set_target(&mut self, target: f64);

    /// Advance the controller by one control cycle, sampling the sensor.
    fn update(&mut self) -> Result<(), HeadCtrlError>;

    /// The correction computed by the most recent `update`.
    fn output(&self) -> f64;

    /// Take a fresh sample of the heading sensor and return it.
    fn sensor_value(&mut self) -> Result<f64, HeadCtrlError>;

    /// Returns `true` once the controller has met its settling condition.
    fn finished(&self) -> bool;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during heading control.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HeadCtrlError {
    #[error("Could not read the heading sensor: {0}")]
    SensorRead(String),

    #[error("The heading sensor returned a non-finite value ({0})")]
    NonFinite(f64),
}
