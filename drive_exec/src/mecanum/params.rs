//! Parameters structure for the mecanum drivetrain

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use super::NUM_MOTORS;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the mecanum drivetrain.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Scale applied to every motor power after mixing, between 0 and 1.
    pub max_power: f64,

    /// Motors which are mounted reversed, in the order front-left,
    /// front-right, back-left, back-right.
    #[serde(default)]
    pub inverted: [bool; NUM_MOTORS],
}

impl Default for Params {
    fn default() -> Self {
        Self {
            max_power: 1.0,
            inverted: [false; NUM_MOTORS]
        }
    }
}
