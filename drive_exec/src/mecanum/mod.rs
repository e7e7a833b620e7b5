//! # Mecanum drivetrain module
//!
//! A mecanum drivetrain is a four wheeled holonomic base. Each wheel carries
//! rollers at 45 degrees to its axle, so by mixing the wheel powers the base
//! can translate in any direction (the course) while independently rotating.
//!
//! The `Drivetrain` trait is the capability consumed by the heading
//! drivetrain, `MecanumDrivetrain` is the provided implementation driving
//! four `DriveMotor`s.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calc_mix;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use calc_mix::calc_wheel_powers;
pub use params::Params;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of drive motors on a mecanum base.
pub const NUM_MOTORS: usize = 4;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// An omnidirectional drivetrain accepting robot-relative commands.
pub trait Drivetrain {
    /// Set the direction of translation relative to the robot's forward axis.
    ///
    /// Units: radians, counter-clockwise positive
    fn set_course(&mut self, course: f64) -> Result<(), DriveError>;

    /// Set the rotation power, counter-clockwise positive.
    fn set_rotation(&mut self, rotation: f64) -> Result<(), DriveError>;

    /// Advance any position keeping the drivetrain performs.
    fn update_position(&mut self) -> Result<(), DriveError>;
}

/// A single motor accepting a normalised power demand.
pub trait DriveMotor {
    /// Set the power of the motor, between -1 and +1.
    fn set_power(&mut self, power: f64) -> Result<(), MotorError>;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Positions of the motors on the base, in the order used for power arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorPosition {
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight
}

/// Possible errors that can occur while driving the base.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DriveError {
    #[error("Could not write power to the {position:?} motor: {source}")]
    MotorWrite {
        position: MotorPosition,
        source: MotorError
    },
}

/// An error reported by a single motor.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct MotorError(pub String);

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotorPosition {
    /// All positions in power array order.
    pub const ALL: [MotorPosition; NUM_MOTORS] = [
        MotorPosition::FrontLeft,
        MotorPosition::FrontRight,
        MotorPosition::BackLeft,
        MotorPosition::BackRight
    ];

    /// Index of this position in power arrays.
    pub fn index(self) -> usize {
        match self {
            MotorPosition::FrontLeft => 0,
            MotorPosition::FrontRight => 1,
            MotorPosition::BackLeft => 2,
            MotorPosition::BackRight => 3
        }
    }
}
