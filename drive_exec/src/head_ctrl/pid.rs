//! PID controller used for heading control

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// Limit on the magnitude of the integral, zero for no limit
    integral_limit: f64,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {

    /// Create a new controller with the given gains.
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            k_p, k_i, k_d,
            integral_limit: 0f64,
            integral: 0f64,
            prev_error: None
        }
    }

    /// Set the limit on the magnitude of the integral accumulation.
    pub fn with_integral_limit(mut self, limit: f64) -> Self {
        self.integral_limit = limit.abs();
        self
    }

    /// Get the value of the controller for the given error.
    ///
    /// `dt` is the time since the previous call, or `None` if it is not
    /// known (e.g. on the first call after a reset).
    pub fn get(&mut self, error: f64, dt: Option<f64>) -> f64 {
        // Accumulate the integral term.
        //
        // If there's no time difference then we don't accumulate the integral
        // as adding on the raw error would produce a large spike compared to
        // normal operation.
        self.integral += match dt {
            Some(t) => error * t,
            None => 0f64
        };

        if self.integral_limit > 0f64 {
            self.integral = clamp(
                self.integral, -self.integral_limit, self.integral_limit
            );
        }

        // Calculate the derivative, zero if there's no history to compare to.
        let deriv = match (self.prev_error, dt) {
            (Some(e), Some(t)) if t > 0f64 => (error - e) / t,
            _ => 0f64
        };

        // Remember the previous error
        self.prev_error = Some(error);

        self.k_p * error
            + self.k_i * self.integral
            + self.k_d * deriv
    }

    /// Clear the integral and derivative history.
    pub fn reset(&mut self) {
        self.integral = 0f64;
        self.prev_error = None;
    }

    /// The current integral accumulation.
    pub fn integral(&self) -> f64 {
        self.integral
    }
}
