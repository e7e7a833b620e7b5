//! # Heading drive library.
//!
//! This library provides a mecanum drivetrain with closed-loop heading
//! control, able to translate along a robot- or field-relative course while
//! holding or rotating to a target heading.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Executable parameters - the combined parameter file for the drive executable
pub mod exec_params;

/// Heading control - feedback control of the platform's heading
pub mod head_ctrl;

/// Heading drivetrain - combines heading control with an omnidirectional base
pub mod heading_drive;

/// Mecanum drivetrain - converts course and rotation demands into motor powers
pub mod mecanum;

/// Simulation - a simulated platform providing a gyro and drive motors
pub mod sim;
