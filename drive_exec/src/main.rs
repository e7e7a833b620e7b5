//! Heading drive executable entry point.
//!
//! # Architecture
//!
//! The executable drives a simulated mecanum platform through a scripted run:
//!
//!     - Initialise the session, logging and parameters
//!     - Build the simulated platform, heading controller and drivetrain
//!     - Rotate to the target heading, bounded by a timeout
//!     - Main loop, for the configured number of cycles:
//!         - Heading control processing
//!         - Course re-resolution (field-relative driving)
//!         - Archiving of the drivetrain report
//!
//! # Usage
//!
//! `drive_exec [PARAMS_FILE]`
//!
//! If no parameter file is given `heading_drive.toml` is loaded from the
//! `params` directory under `$HEADING_DRIVE_SW_ROOT`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use serde::Serialize;
use std::env;
use std::thread;
use std::time::Instant;
use color_eyre::{Report, eyre::{WrapErr, eyre}};

// Internal
use drive_lib::{
    exec_params::ExecParams,
    head_ctrl::PidHeadingController,
    heading_drive::{
        DriveReport, Extrinsicable, HeadingDriveError, HeadingDrivetrain, Headingable,
        RotateLimit},
    mecanum::MecanumDrivetrain,
    sim::{SharedPlatform, SimPlatform}
};
use util::{
    archive::Archiver,
    logger::{logger_init, LevelFilter},
    maths::get_ang_dist_2pi,
    session::{self, Session}
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Name of the default parameter file within the params directory.
const PARAMS_FILE: &str = "heading_drive.toml";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One row of the drive archive.
///
/// Kept flat since the CSV writer cannot serialise nested structures.
#[derive(Serialize)]
struct ArchiveRecord {
    time_s: f64,
    sim_time_s: f64,
    true_heading_rad: f64,
    heading_error_rad: f64,
    target_heading_rad: f64,
    course_rad: f64,
    extrinsic: bool,
    rotation_output: f64,
    rotating: bool,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    // ---- EARLY INITIALISATION ----

    color_eyre::install()?;

    // Initialise session
    let session = Session::new(
        "drive_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, LevelFilter::Info, &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Heading Drive Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let args: Vec<String> = env::args().collect();
    debug!("CLI arguments: {:?}", args);

    let params: ExecParams = match args.len() {
        1 => util::params::load(PARAMS_FILE)
            .wrap_err("Could not load exec params")?,
        2 => {
            info!("Loading parameters from \"{}\"", &args[1]);
            util::params::load_from_path(&args[1])
                .wrap_err("Could not load exec params")?
        },
        n => return Err(eyre!(
            "Expected either zero or one argument, found {}", n - 1
        ))
    };

    info!("Exec parameters loaded");
    debug!("{:#?}", params);

    let rotate_timeout = params.run.rotate_timeout()
        .wrap_err("Invalid run parameters")?;
    let cycle_period = params.run.cycle_period()
        .wrap_err("Invalid run parameters")?;

    // ---- INITIALISE DRIVETRAIN ----

    let platform = SimPlatform::new_shared(params.sim.clone());

    let mut drive = HeadingDrivetrain::new(
        MecanumDrivetrain::new(params.mecanum.clone(), SimPlatform::motors(&platform)),
        PidHeadingController::new(params.head_ctrl.clone(), SimPlatform::gyro(&platform))
    );
    drive.set_extrinsic(true);

    info!("Drivetrain initialised\n");

    let mut archiver = Archiver::from_path(&session, "heading_drive/report.csv")
        .wrap_err("Failed to initialise the drive archive")?;

    // ---- ROTATE TO TARGET ----

    let run = &params.run;

    info!("Rotating to {:.4} rad", run.target_heading_rad);
    drive.set_target_heading(run.target_heading_rad);

    let limit = RotateLimit::unbounded().with_timeout(rotate_timeout);

    match drive.rotate(&limit) {
        Ok(ticks) => info!(
            "Rotation settled after {} cycles, heading {:.4} rad",
            ticks, platform.borrow().heading_rad()
        ),
        Err(e @ HeadingDriveError::RotateTimeout { .. }) => warn!(
            "{}, continuing with heading {:.4} rad", e, platform.borrow().heading_rad()
        ),
        Err(e) => return Err(e).wrap_err("Rotation failed")
    }

    // ---- MAIN LOOP ----

    info!(
        "Driving field-relative course {:.4} rad at velocity {:.2} for {} cycles\n",
        run.course_rad, run.velocity, run.drive_cycles
    );

    drive.base_mut().set_velocity(run.velocity)
        .wrap_err("Failed to set the drive velocity")?;
    drive.set_course(run.course_rad)
        .wrap_err("Failed to set the course")?;

    for cycle in 0..run.drive_cycles {
        let cycle_start = Instant::now();

        // Heading must be corrected before the course is re-resolved
        drive.update_heading().wrap_err("Heading control failed")?;
        drive.update_position().wrap_err("Course update failed")?;

        archiver.serialise(record(&drive, &platform))
            .wrap_err("Failed to archive the drive report")?;

        if cycle % 100 == 0 {
            debug!(
                "Cycle {}: heading {:.4} rad, base course {:.4} rad",
                cycle, platform.borrow().heading_rad(), drive.base().course()
            );
        }

        // Sleep until the end of the cycle
        match cycle_period.checked_sub(cycle_start.elapsed()) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_start.elapsed().as_secs_f64() - cycle_period.as_secs_f64()
            )
        }
    }

    drive.base_mut().stop()
        .wrap_err("Failed to stop the drivetrain")?;

    info!(
        "Run complete, final heading {:.4} rad (target {:.4} rad)",
        platform.borrow().heading_rad(), drive.target_heading()
    );

    Ok(())
}

/// Build an archive record from the drivetrain and the simulated truth.
fn record<D, C>(drive: &HeadingDrivetrain<D, C>, platform: &SharedPlatform) -> ArchiveRecord
where
    D: drive_lib::mecanum::Drivetrain,
    C: drive_lib::head_ctrl::HeadingController
{
    let p = platform.borrow();
    let DriveReport { target_heading, course, extrinsic, rotation_output, rotating }
        = drive.report();

    ArchiveRecord {
        time_s: session::get_elapsed_seconds(),
        sim_time_s: p.time_s(),
        true_heading_rad: p.heading_rad(),
        heading_error_rad: get_ang_dist_2pi(p.heading_rad(), drive.target_heading()),
        target_heading_rad: target_heading,
        course_rad: course,
        extrinsic,
        rotation_output,
        rotating
    }
}
