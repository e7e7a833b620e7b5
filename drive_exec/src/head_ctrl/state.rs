//! PID heading controller state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::time::Instant;
use log::trace;
use serde::Serialize;

// Internal
use super::{HeadCtrlError, HeadingController, HeadingSensor, Params, PidController};
use util::maths::{clamp, get_ang_dist_2pi};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A heading controller built on a PID loop with a settling condition.
///
/// The rotation is finished once the heading error has stayed within
/// `Params::tolerance_rad` for at least `Params::settle_time_s`. Leaving the
/// tolerance band restarts the dwell, as does setting a new target.
pub struct PidHeadingController<S> {
    params: Params,

    sensor: S,

    pid: PidController,

    /// The heading being driven towards.
    target_rad: f64,

    /// The most recent heading sample, `None` before the first sample.
    heading_rad: Option<f64>,

    /// Status of the most recent update.
    report: StatusReport,

    /// Instant of the previous update, used when measuring dt.
    prev_update: Option<Instant>,

    /// How long the error has been within tolerance, `None` if it is not.
    in_tolerance_s: Option<f64>,
}

/// Status report for heading control processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// Heading error of the last update
    ///
    /// Units: radians
    pub error_rad: f64,

    /// Controller output of the last update, after limiting
    pub output: f64,

    /// True if the output was limited to `Params::max_output`
    pub output_limited: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<S: HeadingSensor> PidHeadingController<S> {

    /// Create a new controller reading from the given sensor. The initial
    /// target is zero.
    pub fn new(params: Params, sensor: S) -> Self {
        let pid = PidController::new(params.k_p, params.k_i, params.k_d)
            .with_integral_limit(params.integral_limit);

        Self {
            params,
            sensor,
            pid,
            target_rad: 0f64,
            heading_rad: None,
            report: StatusReport::default(),
            prev_update: None,
            in_tolerance_s: None
        }
    }

    /// The current target heading.
    pub fn target(&self) -> f64 {
        self.target_rad
    }

    /// The heading from the most recent sample, without resampling.
    pub fn last_heading(&self) -> Option<f64> {
        self.heading_rad
    }

    /// Report from the most recent update.
    pub fn report(&self) -> StatusReport {
        self.report
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// Sample the sensor, rejecting non-finite readings.
    fn sample(&mut self) -> Result<f64, HeadCtrlError> {
        let heading = self.sensor.read_heading()?;

        if !heading.is_finite() {
            return Err(HeadCtrlError::NonFinite(heading))
        }

        self.heading_rad = Some(heading);
        Ok(heading)
    }

    /// Get the time step of this update, either fixed or measured.
    fn step_dt(&mut self) -> Option<f64> {
        let now = Instant::now();
        let measured = self.prev_update.map(|t| (now - t).as_secs_f64());
        self.prev_update = Some(now);

        match self.params.fixed_dt_s {
            Some(dt) => Some(dt),
            None => measured
        }
    }

    /// Calculate the heading error for the given heading.
    fn calc_error(&self, heading_rad: f64) -> f64 {
        if self.params.wrap_error {
            get_ang_dist_2pi(heading_rad, self.target_rad)
        }
        else {
            self.target_rad - heading_rad
        }
    }
}

impl<S: HeadingSensor> HeadingController for PidHeadingController<S> {

    fn set_target(&mut self, target: f64) {
        self.target_rad = target;

        // Loop history, dwell and the measured dt all restart with a new
        // target, otherwise the first update would integrate over the idle
        // time since the last one.
        self.pid.reset();
        self.prev_update = None;
        self.in_tolerance_s = None;
    }

    fn update(&mut self) -> Result<(), HeadCtrlError> {
        let heading_rad = self.sample()?;
        let dt = self.step_dt();

        let error_rad = self.calc_error(heading_rad);
        let raw = self.pid.get(error_rad, dt);
        let output = clamp(raw, -self.params.max_output, self.params.max_output);

        self.report = StatusReport {
            error_rad,
            output,
            output_limited: output != raw
        };

        // Settling dwell
        self.in_tolerance_s = if error_rad.abs() <= self.params.tolerance_rad {
            Some(self.in_tolerance_s.map_or(0f64, |t| t + dt.unwrap_or(0f64)))
        }
        else {
            None
        };

        trace!(
            "HeadCtrl: heading {:.4} rad, error {:.4} rad, output {:.4}, in tolerance for {:?} s",
            heading_rad, error_rad, output, self.in_tolerance_s
        );

        Ok(())
    }

    fn output(&self) -> f64 {
        self.report.output
    }

    fn sensor_value(&mut self) -> Result<f64, HeadCtrlError> {
        self.sample()
    }

    fn finished(&self) -> bool {
        match self.in_tolerance_s {
            Some(t) => t >= self.params.settle_time_s,
            None => false
        }
    }
}
