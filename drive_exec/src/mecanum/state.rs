//! Implementations for the mecanum drivetrain state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;

// Internal
use super::{
    calc_wheel_powers,
    DriveError, DriveMotor, Drivetrain, MotorPosition, Params,
    NUM_MOTORS};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A four motor mecanum drivetrain.
///
/// Every setter recomputes the wheel powers and writes them to the motors
/// immediately. This drivetrain does not perform odometry, so
/// `update_position` simply rewrites the current powers.
pub struct MecanumDrivetrain<M> {
    params: Params,

    /// Motors in the order front-left, front-right, back-left, back-right.
    motors: [M; NUM_MOTORS],

    /// Robot-relative course
    ///
    /// Units: radians
    course_rad: f64,

    /// Translation velocity, between 0 and 1.
    velocity: f64,

    /// Rotation power, between -1 and 1.
    rotation: f64,

    /// Powers most recently written to the motors, after inversion and
    /// scaling.
    powers: [f64; NUM_MOTORS],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<M: DriveMotor> MecanumDrivetrain<M> {

    /// Create a new drivetrain. The base starts stopped with a forward course.
    pub fn new(params: Params, motors: [M; NUM_MOTORS]) -> Self {
        Self {
            params,
            motors,
            course_rad: 0f64,
            velocity: 0f64,
            rotation: 0f64,
            powers: [0f64; NUM_MOTORS]
        }
    }

    /// Set the translation velocity, between 0 and 1.
    pub fn set_velocity(&mut self, velocity: f64) -> Result<(), DriveError> {
        self.velocity = velocity;
        self.write_powers()
    }

    /// Stop all translation and rotation.
    pub fn stop(&mut self) -> Result<(), DriveError> {
        self.velocity = 0f64;
        self.rotation = 0f64;
        self.write_powers()
    }

    pub fn course(&self) -> f64 {
        self.course_rad
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Powers most recently written to the motors.
    pub fn powers(&self) -> [f64; NUM_MOTORS] {
        self.powers
    }

    pub fn motors(&self) -> &[M; NUM_MOTORS] {
        &self.motors
    }

    /// Mix the current demands and write the result to every motor.
    ///
    /// All motors are written even if an earlier one fails, the first error
    /// is returned.
    fn write_powers(&mut self) -> Result<(), DriveError> {
        let mixed = calc_wheel_powers(self.course_rad, self.velocity, self.rotation);
        let mut result = Ok(());

        for position in MotorPosition::ALL.iter().copied() {
            let i = position.index();
            let sign = if self.params.inverted[i] { -1f64 } else { 1f64 };
            let power = mixed[i] * sign * self.params.max_power;

            match self.motors[i].set_power(power) {
                Ok(()) => self.powers[i] = power,
                Err(source) => if result.is_ok() {
                    result = Err(DriveError::MotorWrite { position, source });
                }
            }
        }

        trace!(
            "Mecanum: course {:.4} rad, velocity {:.3}, rotation {:.3}, powers {:?}",
            self.course_rad, self.velocity, self.rotation, self.powers
        );

        result
    }
}

impl<M: DriveMotor> Drivetrain for MecanumDrivetrain<M> {
    fn set_course(&mut self, course: f64) -> Result<(), DriveError> {
        self.course_rad = course;
        self.write_powers()
    }

    fn set_rotation(&mut self, rotation: f64) -> Result<(), DriveError> {
        self.rotation = rotation;
        self.write_powers()
    }

    fn update_position(&mut self) -> Result<(), DriveError> {
        self.write_powers()
    }
}
