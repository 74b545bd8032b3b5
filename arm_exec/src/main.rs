//! Main arm executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Build the (simulated) hardware and the arm state
//!     - Bring the arm up: load limits, attach servos, calibrate joysticks
//!     - Main loop:
//!         - Telecommand processing, at most one character per cycle
//!         - Arm control processing, which ends with the inter-cycle delay
//!
//! Commands are read from stdin by a separate thread and handed over through a channel, so the
//! loop never blocks waiting for input. Responses are printed to stdout, logs go to stderr and the
//! session log file.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::{
    io::{self, Read},
    sync::mpsc::{self, Receiver, TryRecvError},
    thread,
};

// Internal
use arm_lib::{
    arm_ctrl,
    config_store::{ConfigStore, FileByteStore, STORE_SIZE},
    data_store::ArmState,
    hal::{ChannelId, SimPanel, StdDelay},
    joystick::Joystick,
    params::ArmExecParams,
    servo_ctrl::{sim::SimServo, BoundedActuator, Servos},
    tc_processor,
};
use comms_if::eqpt::mech::NUM_MOTORS;
use util::{
    host,
    logger::{logger_init, parse_level},
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("arm_exec", "sessions").wrap_err("Failed to create the session")?;

    // Parameters are needed for the log level, so they come before the logger
    let params: ArmExecParams =
        util::params::load("arm_exec.toml").wrap_err("Could not load arm_exec params")?;

    let log_level = parse_level(&params.log_level)
        .ok_or_else(|| eyre!("Unrecognised log level \"{}\"", params.log_level))?;

    // Initialise logger
    logger_init(log_level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Arm Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);
    debug!("Parameters: {:#?}", params);

    // ---- INITIALISE HARDWARE ----

    info!("Initialising hardware...");

    let panel = SimPanel::new(params.sim_rest_value);

    let left = Joystick::new(
        panel.clone(),
        StdDelay,
        params.channels.left_x,
        params.channels.left_y,
        params.channels.left_button,
    );
    let right = Joystick::new(
        panel,
        StdDelay,
        params.channels.right_x,
        params.channels.right_y,
        params.channels.right_button,
    );

    let servos = build_servos(&params.channels.servos);

    let store_path = session.sw_root.join(&params.store_path);
    let store = FileByteStore::open(&store_path, STORE_SIZE)
        .wrap_err_with(|| format!("Failed to open the limit store at {:?}", store_path))?;
    info!("Limit store opened at {:?}", store.path());

    let config = ConfigStore::new(store, params.store_offset)
        .wrap_err("Failed to create the config store")?;

    // ---- INITIALISE ARM ----

    info!("Initialising arm...");

    let mut state = ArmState::new(
        left,
        right,
        servos,
        config,
        StdDelay,
        params.arm_ctrl.clone(),
    );
    state.persist_limit_edits = params.persist_limit_edits;

    let outcome = state.init().wrap_err("Failed to initialise the arm")?;
    info!("Arm initialisation complete ({:?})\n", outcome);

    // ---- COMMAND INPUT ----

    let cmd_rx = spawn_stdin_reader();
    let mut input_open = true;

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    loop {
        // ---- TELECOMMAND PROCESSING ----

        if input_open {
            match cmd_rx.try_recv() {
                Ok(c) => match tc_processor::exec_char(&mut state, c) {
                    Ok(lines) => {
                        for line in lines {
                            println!("{}", line);
                        }
                    }
                    Err(e) => warn!("Could not execute command {:?}: {}", c, e),
                },
                Err(TryRecvError::Empty) => (),
                Err(TryRecvError::Disconnected) => {
                    info!("Command input closed");

                    if params.exit_on_eof {
                        break;
                    }
                    input_open = false;
                }
            }
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        let report = arm_ctrl::proc(&mut state);

        if report.commanded_deg.iter().any(|d| d.is_some()) {
            debug!("ArmCtrl status: {:?}", report);
        }
    }

    info!("Stopping after {} cycles", state.num_cycles);

    Ok(())
}

/// Build the servo arena with one simulated servo per output channel.
fn build_servos(channels: &[ChannelId; NUM_MOTORS]) -> Servos<SimServo> {
    Servos::new([
        BoundedActuator::new(SimServo::default(), channels[0]),
        BoundedActuator::new(SimServo::default(), channels[1]),
        BoundedActuator::new(SimServo::default(), channels[2]),
        BoundedActuator::new(SimServo::default(), channels[3]),
    ])
}

/// Start the thread which forwards stdin to the main loop one character at a time.
///
/// The returned receiver disconnects when stdin is closed.
fn spawn_stdin_reader() -> Receiver<char> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let stdin = io::stdin();
        for byte in stdin.lock().bytes() {
            let b = match byte {
                Ok(b) => b,
                Err(e) => {
                    warn!("Error reading command input: {}", e);
                    break;
                }
            };

            if tx.send(b as char).is_err() {
                break;
            }
        }
    });

    rx
}
