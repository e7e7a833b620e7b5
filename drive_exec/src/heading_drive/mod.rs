//! # Heading drivetrain module
//!
//! The heading drivetrain combines a heading controller with an
//! omnidirectional base. It holds (or rotates to) a target heading while the
//! base translates along a commanded course.
//!
//! ## Reference frames
//!
//! In intrinsic (robot-relative) mode a course is passed to the base
//! unchanged. In extrinsic (field-relative) mode the course is given in a
//! fixed external frame, so the live heading is subtracted from it before it
//! is forwarded. Because the heading changes as the robot turns, the
//! extrinsic course has to be re-resolved every control cycle, which is what
//! `update_course` does.
//!
//! ## Control cycle
//!
//! Within a cycle the heading correction is applied before the course is
//! re-resolved, so that the course transform uses a heading sampled after
//! the rotation demand was issued:
//!
//! ```text
//! update_heading()   sensor -> controller -> base rotation
//! update_course()    stored course - live heading -> base course
//! ```
//!
//! `rotate` runs this cycle until the controller reports the heading has
//! settled, bounded by a `RotateLimit`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod rotate;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::time::Duration;

// Internal
pub use rotate::RotateLimit;
pub use state::*;
use crate::{head_ctrl::HeadCtrlError, mecanum::DriveError};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A drivetrain able to hold and rotate to a heading.
pub trait Headingable {
    /// Set the heading to drive towards or maintain.
    fn set_target_heading(&mut self, target: f64);

    /// Sample the heading sensor and return the heading the drivetrain is
    /// currently facing.
    fn current_heading(&mut self) -> Result<f64, HeadingDriveError>;

    /// The heading the drivetrain is trying to reach or maintain.
    fn target_heading(&self) -> f64;

    /// Run one heading control cycle, updating the rotation demand.
    fn update_heading(&mut self) -> Result<(), HeadingDriveError>;

    /// Re-resolve the stored course against the live heading.
    fn update_course(&mut self) -> Result<(), HeadingDriveError>;

    /// Whether the drivetrain is still rotating towards the target heading.
    ///
    /// Use this as a loop condition around `update_heading` when turning to
    /// a heading as part of a larger control loop.
    fn is_rotating(&self) -> bool;

    /// Called once when `rotate` observes that the heading has settled.
    ///
    /// Implementors which temporarily change a drivetrain setting for the
    /// duration of a rotation should restore it here.
    fn finish_rotating(&mut self) -> Result<(), HeadingDriveError> {
        Ok(())
    }

    /// Rotate to the target heading, blocking until the heading settles or
    /// the limit is reached.
    ///
    /// Each cycle runs `update_heading` then `update_course`. On settling
    /// `finish_rotating` is called and the number of cycles is returned. If
    /// the limit is reached first a `Rotate*` error is returned and
    /// `finish_rotating` is not called.
    fn rotate(&mut self, limit: &RotateLimit) -> Result<usize, HeadingDriveError> {
        let start = limit.start();
        let mut ticks = 0;

        while self.is_rotating() {
            limit.check(&start, ticks)?;

            self.update_heading()?;
            self.update_course()?;
            ticks += 1;
        }

        self.finish_rotating()?;

        Ok(ticks)
    }
}

/// A drivetrain able to switch between robot-relative and field-relative
/// courses.
pub trait Extrinsicable {
    /// Set whether courses are field-relative (`true`) or robot-relative
    /// (`false`). Takes effect on the next course command.
    fn set_extrinsic(&mut self, extrinsic: bool);

    /// Whether courses are field-relative.
    fn extrinsic(&self) -> bool;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur while operating the heading drivetrain.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HeadingDriveError {
    #[error("Heading controller error: {0}")]
    HeadCtrl(#[from] HeadCtrlError),

    #[error("Drivetrain error: {0}")]
    Drive(#[from] DriveError),

    #[error("Rotation did not settle within {timeout:?} (stopped after {elapsed:?})")]
    RotateTimeout {
        timeout: Duration,
        elapsed: Duration
    },

    #[error("Rotation did not settle within {0} control cycles")]
    RotateTickLimit(usize),

    #[error("Rotation was cancelled after {0} control cycles")]
    RotateCancelled(usize),
}

/// The rotation state of a heading drivetrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum RotationState {
    /// The heading controller has not met its settling condition.
    Rotating,

    /// The heading is within the controller's settling condition.
    Settled
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Resolve a course into the robot-relative course sent to the base.
///
/// In extrinsic mode the heading is subtracted from the course, otherwise the
/// course is returned unchanged.
pub fn transform_course(course: f64, heading: f64, extrinsic: bool) -> f64 {
    if extrinsic {
        course - heading
    }
    else {
        course
    }
}
