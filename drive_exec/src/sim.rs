//! # Simulated platform
//!
//! A minimal yaw-only model of a mecanum base, used for development and
//! testing without hardware. The platform's yaw rate is proportional to the
//! rotation component of the four motor powers. Translation is not modelled.
//!
//! The platform is shared between a `SimGyro` and four `SimMotor`s through an
//! `Rc<RefCell<_>>`, as all of them are driven from the one control thread.
//! Every gyro read advances the model by `Params::dt_s`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{cell::RefCell, rc::Rc};
use log::warn;
use serde::Deserialize;

use crate::{
    head_ctrl::{HeadCtrlError, HeadingSensor},
    mecanum::{DriveMotor, MotorError, MotorPosition, NUM_MOTORS}
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the simulated platform.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Yaw rate of the platform when turning at full power.
    ///
    /// Units: radians/second
    pub max_yaw_rate_rads: f64,

    /// Simulated time which passes on each gyro read.
    ///
    /// Units: seconds
    pub dt_s: f64,

    /// Constant bias added to every gyro reading.
    ///
    /// Units: radians
    #[serde(default)]
    pub gyro_bias_rad: f64,

    /// Heading of the platform at the start of the simulation.
    ///
    /// Units: radians
    #[serde(default)]
    pub initial_heading_rad: f64,
}

/// The simulated platform state.
#[derive(Debug)]
pub struct SimPlatform {
    params: Params,
    heading_rad: f64,
    time_s: f64,
    powers: [f64; NUM_MOTORS],
    gyro_fault: Option<String>,
    motor_faults: [Option<String>; NUM_MOTORS]
}

/// A platform shared between the simulated devices.
pub type SharedPlatform = Rc<RefCell<SimPlatform>>;

/// Simulated gyro measuring the platform's heading.
pub struct SimGyro {
    platform: SharedPlatform
}

/// Simulated drive motor.
pub struct SimMotor {
    platform: SharedPlatform,
    position: MotorPosition
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimPlatform {
    /// Create a new shared platform at rest.
    pub fn new_shared(params: Params) -> SharedPlatform {
        Rc::new(RefCell::new(Self {
            heading_rad: params.initial_heading_rad,
            time_s: 0f64,
            powers: [0f64; NUM_MOTORS],
            gyro_fault: None,
            motor_faults: Default::default(),
            params
        }))
    }

    /// Create a gyro attached to the shared platform.
    pub fn gyro(platform: &SharedPlatform) -> SimGyro {
        SimGyro { platform: platform.clone() }
    }

    /// Create the four motors attached to the shared platform, in the order
    /// front-left, front-right, back-left, back-right.
    pub fn motors(platform: &SharedPlatform) -> [SimMotor; NUM_MOTORS] {
        let motor = |position| SimMotor { platform: platform.clone(), position };

        [
            motor(MotorPosition::FrontLeft),
            motor(MotorPosition::FrontRight),
            motor(MotorPosition::BackLeft),
            motor(MotorPosition::BackRight)
        ]
    }

    /// Advance the model by `dt_s` seconds.
    pub fn step(&mut self, dt_s: f64) {
        self.heading_rad += self.yaw_rate_rads() * dt_s;
        self.time_s += dt_s;
    }

    /// Current yaw rate from the motor powers.
    ///
    /// Units: radians/second
    pub fn yaw_rate_rads(&self) -> f64 {
        let p = &self.powers;
        let rotation = (-p[0] + p[1] - p[2] + p[3]) / 4f64;

        self.params.max_yaw_rate_rads * rotation
    }

    /// True heading of the platform, without gyro bias.
    pub fn heading_rad(&self) -> f64 {
        self.heading_rad
    }

    /// Simulated time elapsed.
    pub fn time_s(&self) -> f64 {
        self.time_s
    }

    /// Powers most recently written to each motor.
    pub fn powers(&self) -> [f64; NUM_MOTORS] {
        self.powers
    }

    /// Make every following gyro read fail with the given reason.
    pub fn inject_gyro_fault(&mut self, reason: &str) {
        warn!("Injecting gyro fault: {}", reason);
        self.gyro_fault = Some(reason.to_string());
    }

    /// Make every following write to the given motor fail.
    pub fn inject_motor_fault(&mut self, position: MotorPosition, reason: &str) {
        warn!("Injecting {:?} motor fault: {}", position, reason);
        self.motor_faults[position.index()] = Some(reason.to_string());
    }

    /// Remove all injected faults.
    pub fn clear_faults(&mut self) {
        self.gyro_fault = None;
        self.motor_faults = Default::default();
    }
}

impl HeadingSensor for SimGyro {
    fn read_heading(&mut self) -> Result<f64, HeadCtrlError> {
        let mut platform = self.platform.borrow_mut();

        if let Some(ref reason) = platform.gyro_fault {
            return Err(HeadCtrlError::SensorRead(reason.clone()))
        }

        let dt_s = platform.params.dt_s;
        platform.step(dt_s);

        Ok(platform.heading_rad + platform.params.gyro_bias_rad)
    }
}

impl DriveMotor for SimMotor {
    fn set_power(&mut self, power: f64) -> Result<(), MotorError> {
        let mut platform = self.platform.borrow_mut();
        let i = self.position.index();

        if let Some(ref reason) = platform.motor_faults[i] {
            return Err(MotorError(reason.clone()))
        }

        platform.powers[i] = power;
        Ok(())
    }
}
