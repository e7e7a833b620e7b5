//! Implementations for the heading drivetrain state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::time::Instant;
use log::{debug, trace};
use serde::Serialize;

// Internal
use super::{
    transform_course,
    Extrinsicable, HeadingDriveError, Headingable, RotationState};
use crate::{head_ctrl::HeadingController, mecanum::Drivetrain};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An omnidirectional drivetrain with closed-loop heading control.
///
/// Wraps a base `Drivetrain` and a `HeadingController`. The controller's
/// output is applied as the base's rotation demand, and in extrinsic mode
/// courses are resolved against the live heading before being sent to the
/// base.
///
/// # Example
///
/// ```ignore
/// let mut drive = HeadingDrivetrain::new(mecanum, pid_heading_ctrl);
/// drive.set_extrinsic(true);
/// drive.set_course(std::f64::consts::FRAC_PI_2)?;
///
/// // Turn to face along the field's x axis
/// drive.set_target_heading(0.0);
/// drive.rotate(&RotateLimit::unbounded().with_timeout(Duration::from_secs(3)))?;
///
/// // Then hold it while driving
/// loop {
///     drive.update_heading()?;
///     drive.update_course()?;
/// }
/// ```
pub struct HeadingDrivetrain<D, C> {
    base: D,

    controller: C,

    /// The heading being driven towards or held.
    target_heading: f64,

    /// The course most recently requested by the caller, untransformed.
    course: f64,

    /// Whether courses are field-relative.
    extrinsic: bool,

    /// The last control cycle on which the heading was not settled.
    ///
    /// Only recorded at the moment, nothing reads it back to make decisions.
    last_out_of_range: Option<Instant>,
}

/// Snapshot of the heading drivetrain's demands, for archiving.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct DriveReport {
    /// Units: radians
    pub target_heading: f64,

    /// The requested course, untransformed.
    ///
    /// Units: radians
    pub course: f64,

    pub extrinsic: bool,

    /// The heading controller's most recent output.
    pub rotation_output: f64,

    pub rotating: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<D: Drivetrain, C: HeadingController> HeadingDrivetrain<D, C> {

    /// Create a new heading drivetrain in intrinsic mode with a target
    /// heading and course of zero.
    ///
    /// The zero target is pushed into the controller so the two start in
    /// agreement.
    pub fn new(base: D, mut controller: C) -> Self {
        controller.set_target(0f64);

        Self {
            base,
            controller,
            target_heading: 0f64,
            course: 0f64,
            extrinsic: false,
            last_out_of_range: None
        }
    }

    /// Set the course, storing it as given and forwarding the resolved course
    /// to the base.
    ///
    /// In extrinsic mode the heading is sampled now, so the forwarded course
    /// depends on when this is called.
    pub fn set_course(&mut self, course: f64) -> Result<(), HeadingDriveError> {
        self.course = course;

        let forwarded = if self.extrinsic {
            let heading = self.current_heading()?;
            transform_course(course, heading, true)
        }
        else {
            course
        };

        trace!("Course {:.4} forwarded as {:.4}", course, forwarded);

        self.base.set_course(forwarded)?;
        Ok(())
    }

    /// The course most recently passed to `set_course`, untransformed.
    pub fn course(&self) -> f64 {
        self.course
    }

    /// Update the base's position keeping, then re-resolve the course.
    pub fn update_position(&mut self) -> Result<(), HeadingDriveError> {
        self.base.update_position()?;
        self.update_course()
    }

    /// The current rotation state, as given by the controller.
    pub fn rotation_state(&self) -> RotationState {
        if self.is_rotating() {
            RotationState::Rotating
        }
        else {
            RotationState::Settled
        }
    }

    /// The last control cycle on which the heading had not settled.
    pub fn last_out_of_range(&self) -> Option<Instant> {
        self.last_out_of_range
    }

    /// Snapshot the drivetrain's demands.
    pub fn report(&self) -> DriveReport {
        DriveReport {
            target_heading: self.target_heading,
            course: self.course,
            extrinsic: self.extrinsic,
            rotation_output: self.controller.output(),
            rotating: self.is_rotating()
        }
    }

    pub fn base(&self) -> &D {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut D {
        &mut self.base
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    /// Release the base and the controller.
    pub fn into_parts(self) -> (D, C) {
        (self.base, self.controller)
    }
}

impl<D: Drivetrain, C: HeadingController> Headingable for HeadingDrivetrain<D, C> {

    fn set_target_heading(&mut self, target: f64) {
        debug!("Target heading set to {:.4}", target);
        self.target_heading = target;
        self.controller.set_target(target);
    }

    fn current_heading(&mut self) -> Result<f64, HeadingDriveError> {
        Ok(self.controller.sensor_value()?)
    }

    fn target_heading(&self) -> f64 {
        self.target_heading
    }

    fn update_heading(&mut self) -> Result<(), HeadingDriveError> {
        self.controller.update()?;

        let output = self.controller.output();
        self.base.set_rotation(output)?;

        if !self.controller.finished() {
            self.last_out_of_range = Some(Instant::now());
        }

        trace!("Heading cycle: rotation {:.4}", output);

        Ok(())
    }

    fn update_course(&mut self) -> Result<(), HeadingDriveError> {
        if self.extrinsic {
            let heading = self.current_heading()?;
            self.base.set_course(transform_course(self.course, heading, true))?;
        }

        Ok(())
    }

    fn is_rotating(&self) -> bool {
        !self.controller.finished()
    }
}

impl<D: Drivetrain, C: HeadingController> Extrinsicable for HeadingDrivetrain<D, C> {

    fn set_extrinsic(&mut self, extrinsic: bool) {
        debug!("Extrinsic course control {}", if extrinsic { "enabled" } else { "disabled" });
        self.extrinsic = extrinsic;
    }

    fn extrinsic(&self) -> bool {
        self.extrinsic
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        head_ctrl::HeadCtrlError,
        heading_drive::RotateLimit,
        mecanum::{DriveError, MotorError, MotorPosition}
    };
    use std::collections::VecDeque;
    use std::sync::{atomic::AtomicBool, Arc};
    use std::time::Duration;

    // ---- TEST DOUBLES ----

    /// A call made on the base drivetrain.
    #[derive(Debug, Clone, Copy, PartialEq)]
    enum BaseCall {
        Course(f64),
        Rotation(f64),
        UpdatePosition
    }

    #[derive(Default)]
    struct RecordingBase {
        calls: Vec<BaseCall>,
        fault: bool
    }

    impl RecordingBase {
        fn courses(&self) -> Vec<f64> {
            self.calls.iter().filter_map(|c| match c {
                BaseCall::Course(v) => Some(*v),
                _ => None
            }).collect()
        }

        fn rotations(&self) -> Vec<f64> {
            self.calls.iter().filter_map(|c| match c {
                BaseCall::Rotation(v) => Some(*v),
                _ => None
            }).collect()
        }

        fn check_fault(&self) -> Result<(), DriveError> {
            if self.fault {
                return Err(DriveError::MotorWrite {
                    position: MotorPosition::FrontRight,
                    source: MotorError("stalled".into())
                })
            }
            Ok(())
        }
    }

    impl Drivetrain for RecordingBase {
        fn set_course(&mut self, course: f64) -> Result<(), DriveError> {
            self.check_fault()?;
            self.calls.push(BaseCall::Course(course));
            Ok(())
        }

        fn set_rotation(&mut self, rotation: f64) -> Result<(), DriveError> {
            self.check_fault()?;
            self.calls.push(BaseCall::Rotation(rotation));
            Ok(())
        }

        fn update_position(&mut self) -> Result<(), DriveError> {
            self.check_fault()?;
            self.calls.push(BaseCall::UpdatePosition);
            Ok(())
        }
    }

    /// Proportional controller whose heading follows a script, advancing one
    /// entry per `update`. Finished once an update leaves the heading within
    /// tolerance of the target.
    struct ScriptedController {
        target: f64,
        heading: f64,
        script: VecDeque<f64>,
        output: f64,
        updated: bool,
        tolerance: f64,
        updates: usize,
        samples: usize,
        sensor_fault: bool
    }

    impl ScriptedController {
        fn new(heading: f64) -> Self {
            Self {
                target: f64::NAN,
                heading,
                script: VecDeque::new(),
                output: 0.0,
                updated: false,
                tolerance: 0.5,
                updates: 0,
                samples: 0,
                sensor_fault: false
            }
        }

        fn with_script(mut self, script: &[f64]) -> Self {
            self.script = script.iter().copied().collect();
            self
        }
    }

    impl HeadingController for ScriptedController {
        fn set_target(&mut self, target: f64) {
            self.target = target;
        }

        fn update(&mut self) -> Result<(), HeadCtrlError> {
            if self.sensor_fault {
                return Err(HeadCtrlError::SensorRead("gyro offline".into()))
            }
            if let Some(h) = self.script.pop_front() {
                self.heading = h;
            }
            self.updates += 1;
            self.updated = true;
            self.output = 0.1 * (self.target - self.heading);
            Ok(())
        }

        fn output(&self) -> f64 {
            self.output
        }

        fn sensor_value(&mut self) -> Result<f64, HeadCtrlError> {
            if self.sensor_fault {
                return Err(HeadCtrlError::SensorRead("gyro offline".into()))
            }
            self.samples += 1;
            Ok(self.heading)
        }

        fn finished(&self) -> bool {
            self.updated && (self.target - self.heading).abs() <= self.tolerance
        }
    }

    type TestDrive = HeadingDrivetrain<RecordingBase, ScriptedController>;

    fn drive(heading: f64) -> TestDrive {
        HeadingDrivetrain::new(RecordingBase::default(), ScriptedController::new(heading))
    }

    /// Wrapper overriding `finish_rotating` to count invocations.
    struct CountingDrive {
        inner: TestDrive,
        finish_calls: usize
    }

    impl Headingable for CountingDrive {
        fn set_target_heading(&mut self, target: f64) {
            self.inner.set_target_heading(target)
        }

        fn current_heading(&mut self) -> Result<f64, HeadingDriveError> {
            self.inner.current_heading()
        }

        fn target_heading(&self) -> f64 {
            self.inner.target_heading()
        }

        fn update_heading(&mut self) -> Result<(), HeadingDriveError> {
            self.inner.update_heading()
        }

        fn update_course(&mut self) -> Result<(), HeadingDriveError> {
            self.inner.update_course()
        }

        fn is_rotating(&self) -> bool {
            self.inner.is_rotating()
        }

        fn finish_rotating(&mut self) -> Result<(), HeadingDriveError> {
            self.finish_calls += 1;
            Ok(())
        }
    }

    // ---- TARGET HEADING ----

    #[test]
    fn test_new_syncs_controller_target() {
        let d = drive(0.0);
        assert_eq!(d.target_heading(), 0.0);
        assert_eq!(d.controller().target, 0.0);
        assert!(!d.extrinsic());
        assert!(d.base().calls.is_empty());
    }

    #[test]
    fn test_set_target_heading_syncs_controller() {
        let mut d = drive(0.0);
        for h in [-720.0, -1.5, 0.0, 33.3, 359.9, 1e6].iter().copied() {
            d.set_target_heading(h);
            assert_eq!(d.target_heading(), h);
            assert_eq!(d.controller().target, h);
        }
    }

    #[test]
    fn test_target_heading_is_not_live_heading() {
        let mut d = drive(12.0);
        d.set_target_heading(90.0);
        assert_eq!(d.target_heading(), 90.0);
        assert_eq!(d.current_heading().unwrap(), 12.0);
    }

    #[test]
    fn test_current_heading_samples_each_call() {
        let mut d = drive(5.0);
        d.current_heading().unwrap();
        d.current_heading().unwrap();
        assert_eq!(d.controller().samples, 2);
    }

    // ---- COURSE ----

    #[test]
    fn test_intrinsic_set_course_forwards_unchanged() {
        let mut d = drive(37.0);
        for c in [0.0, 45.0, -90.0, 400.0].iter().copied() {
            d.set_course(c).unwrap();
            assert_eq!(d.course(), c);
        }
        assert_eq!(d.base().courses(), vec![0.0, 45.0, -90.0, 400.0]);

        // Heading is never sampled in intrinsic mode
        assert_eq!(d.controller().samples, 0);
    }

    #[test]
    fn test_extrinsic_set_course_subtracts_heading_at_call_time() {
        let mut d = drive(30.0);
        d.set_extrinsic(true);

        d.set_course(90.0).unwrap();
        assert_eq!(d.base().courses(), vec![60.0]);
        assert_eq!(d.course(), 90.0);

        // Moving the heading afterwards does not change what was sent
        d.controller_mut().heading = 50.0;
        assert_eq!(d.base().courses(), vec![60.0]);
        assert_eq!(d.course(), 90.0);
    }

    #[test]
    fn test_extrinsic_update_course_re_resolves() {
        let mut d = drive(0.0);
        d.set_extrinsic(true);
        d.set_course(90.0).unwrap();

        for h in [0.0, 30.0, 90.0, -45.0].iter().copied() {
            d.controller_mut().heading = h;
            d.update_course().unwrap();
        }

        assert_eq!(d.base().courses(), vec![90.0, 90.0, 60.0, 0.0, 135.0]);
        assert_eq!(d.course(), 90.0);
    }

    #[test]
    fn test_extrinsic_course_scenario() {
        // Stored course 90, live heading 0 then 30, no intervening set_course
        let mut d = drive(0.0);
        d.set_extrinsic(true);
        d.set_course(90.0).unwrap();
        d.base_mut().calls.clear();

        d.controller_mut().heading = 0.0;
        d.update_course().unwrap();
        d.controller_mut().heading = 30.0;
        d.update_course().unwrap();

        assert_eq!(d.base().calls, vec![BaseCall::Course(90.0), BaseCall::Course(60.0)]);
    }

    #[test]
    fn test_intrinsic_scenario() {
        let mut d = drive(0.0);
        d.set_course(45.0).unwrap();

        d.controller_mut().heading = 90.0;
        d.update_course().unwrap();
        assert_eq!(d.base().courses(), vec![45.0]);

        d.set_course(45.0).unwrap();
        assert_eq!(d.base().courses(), vec![45.0, 45.0]);
    }

    #[test]
    fn test_mode_switch_takes_effect_immediately() {
        let mut d = drive(20.0);
        d.set_course(100.0).unwrap();

        d.set_extrinsic(true);
        assert!(d.extrinsic());
        d.update_course().unwrap();

        d.set_extrinsic(false);
        d.update_course().unwrap();
        d.set_course(100.0).unwrap();

        assert_eq!(d.base().courses(), vec![100.0, 80.0, 100.0]);
    }

    #[test]
    fn test_update_position_updates_base_then_course() {
        let mut d = drive(10.0);
        d.set_extrinsic(true);
        d.set_course(40.0).unwrap();
        d.base_mut().calls.clear();

        d.update_position().unwrap();
        assert_eq!(d.base().calls, vec![BaseCall::UpdatePosition, BaseCall::Course(30.0)]);

        d.set_extrinsic(false);
        d.base_mut().calls.clear();
        d.update_position().unwrap();
        assert_eq!(d.base().calls, vec![BaseCall::UpdatePosition]);
    }

    // ---- ROTATION ----

    #[test]
    fn test_update_heading_applies_output_as_rotation() {
        let mut d = drive(10.0);
        d.set_target_heading(0.0);
        d.update_heading().unwrap();

        assert_eq!(d.controller().updates, 1);
        assert_eq!(d.base().calls, vec![BaseCall::Rotation(-1.0)]);
        assert!(d.last_out_of_range().is_some());
    }

    #[test]
    fn test_is_rotating_mirrors_finished() {
        let mut d = drive(10.0);
        d.controller_mut().script = vec![10.0, 2.0, 0.0].into_iter().collect();
        d.set_target_heading(0.0);

        assert!(d.is_rotating());
        assert_eq!(d.rotation_state(), RotationState::Rotating);

        let mut checks = vec![];
        for _ in 0..3 {
            d.update_heading().unwrap();
            assert_eq!(d.is_rotating(), !d.controller().finished());
            checks.push(d.is_rotating());
        }

        assert_eq!(checks, vec![true, true, false]);
        assert_eq!(d.rotation_state(), RotationState::Settled);

        // A disturbance moves the heading out of tolerance again
        d.controller_mut().script.push_back(5.0);
        d.update_heading().unwrap();
        assert!(d.is_rotating());
    }

    #[test]
    fn test_new_target_restarts_rotation() {
        let mut d = drive(0.0);
        d.update_heading().unwrap();
        assert!(!d.is_rotating());

        d.set_target_heading(45.0);
        assert!(d.is_rotating());
    }

    #[test]
    fn test_rotate_scenario() {
        let mut d = CountingDrive {
            inner: HeadingDrivetrain::new(
                RecordingBase::default(),
                ScriptedController::new(10.0).with_script(&[10.0, 2.0, 0.0])
            ),
            finish_calls: 0
        };
        d.set_target_heading(0.0);

        let ticks = d.rotate(&RotateLimit::unbounded()).unwrap();

        assert_eq!(ticks, 3);
        assert_eq!(d.inner.controller().updates, 3);
        assert_eq!(d.inner.base().rotations().len(), 3);
        assert_eq!(d.finish_calls, 1);
        assert!(!d.is_rotating());

        // Rotating again when already settled runs no cycles but still
        // finishes
        let ticks = d.rotate(&RotateLimit::unbounded()).unwrap();
        assert_eq!(ticks, 0);
        assert_eq!(d.finish_calls, 2);
    }

    #[test]
    fn test_rotate_heading_before_course() {
        let mut d = HeadingDrivetrain::new(
            RecordingBase::default(),
            ScriptedController::new(40.0).with_script(&[20.0, 0.0])
        );
        d.set_extrinsic(true);
        d.set_course(90.0).unwrap();
        d.base_mut().calls.clear();

        d.set_target_heading(0.0);
        let ticks = d.rotate(&RotateLimit::unbounded()).unwrap();
        assert_eq!(ticks, 2);

        // Each cycle issues the rotation first, then the course resolved
        // against the heading after the update
        assert_eq!(d.base().calls, vec![
            BaseCall::Rotation(-2.0),
            BaseCall::Course(70.0),
            BaseCall::Rotation(0.0),
            BaseCall::Course(90.0),
        ]);
    }

    #[test]
    fn test_rotate_tick_limit() {
        let mut d = CountingDrive { inner: drive(100.0), finish_calls: 0 };
        d.set_target_heading(0.0);

        let r = d.rotate(&RotateLimit::unbounded().with_max_ticks(5));
        assert_eq!(r, Err(HeadingDriveError::RotateTickLimit(5)));
        assert_eq!(d.inner.controller().updates, 5);
        assert_eq!(d.finish_calls, 0);
    }

    #[test]
    fn test_rotate_timeout() {
        let mut d = drive(100.0);
        d.set_target_heading(0.0);

        let timeout = Duration::from_millis(20);
        match d.rotate(&RotateLimit::unbounded().with_timeout(timeout)) {
            Err(HeadingDriveError::RotateTimeout { timeout: t, elapsed }) => {
                assert_eq!(t, timeout);
                assert!(elapsed >= timeout);
            },
            r => panic!("Expected a timeout, got {:?}", r)
        }
        assert!(d.is_rotating());
    }

    #[test]
    fn test_rotate_cancelled() {
        let cancel = Arc::new(AtomicBool::new(true));
        let mut d = CountingDrive { inner: drive(100.0), finish_calls: 0 };
        d.set_target_heading(0.0);

        let r = d.rotate(&RotateLimit::unbounded().with_cancel(cancel));
        assert_eq!(r, Err(HeadingDriveError::RotateCancelled(0)));
        assert_eq!(d.inner.controller().updates, 0);
        assert_eq!(d.finish_calls, 0);
    }

    // ---- ERROR PROPAGATION ----

    #[test]
    fn test_sensor_faults_propagate() {
        let mut d = drive(0.0);
        d.controller_mut().sensor_fault = true;
        let expected = HeadingDriveError::HeadCtrl(HeadCtrlError::SensorRead("gyro offline".into()));

        assert_eq!(d.update_heading(), Err(expected.clone()));
        assert_eq!(d.current_heading(), Err(expected.clone()));

        // Intrinsic courses do not need the sensor
        assert!(d.set_course(1.0).is_ok());

        d.set_extrinsic(true);
        assert_eq!(d.set_course(2.0), Err(expected.clone()));
        assert_eq!(d.update_course(), Err(expected.clone()));
        assert_eq!(d.rotate(&RotateLimit::unbounded()), Err(expected));

        // The course is stored even though forwarding failed
        assert_eq!(d.course(), 2.0);
    }

    #[test]
    fn test_drive_faults_propagate() {
        let mut d = drive(10.0);
        d.base_mut().fault = true;

        match d.update_heading() {
            Err(HeadingDriveError::Drive(DriveError::MotorWrite { position, .. })) =>
                assert_eq!(position, MotorPosition::FrontRight),
            r => panic!("Expected a drive error, got {:?}", r)
        }
        assert!(matches!(d.set_course(1.0), Err(HeadingDriveError::Drive(_))));
        assert!(matches!(d.update_position(), Err(HeadingDriveError::Drive(_))));
    }

    #[test]
    fn test_report() {
        let mut d = drive(10.0);
        d.set_extrinsic(true);
        d.set_target_heading(0.0);
        d.set_course(3.0).unwrap();
        d.update_heading().unwrap();

        let report = d.report();
        assert_eq!(report.target_heading, 0.0);
        assert_eq!(report.course, 3.0);
        assert!(report.extrinsic);
        assert_eq!(report.rotation_output, -1.0);
        assert!(report.rotating);
    }

    #[test]
    fn test_per_cycle_logging_capped() {
        assert!(
            util::logger::TICK_TARGETS.iter().any(|t| module_path!().starts_with(t)),
            "{} is not capped by the logger's tick level", module_path!()
        );
    }
}
