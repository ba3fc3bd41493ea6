//! Identifier assignments shared by the device and its host
//!
//! Command IDs double as frame headers. State IDs select what goes into the
//! periodic report. Step IDs name the processing steps a host may place in
//! the process sequence.

/// Command IDs (host → device frame headers)
pub mod command {
    /// Acknowledge only, no action
    pub const ONLY_ACK: u8 = 0x01;
    /// Query the device identifier
    pub const DEVICE_ID: u8 = 0x02;
    /// Clear the soft-fault register
    pub const CLEAR_FAULTS: u8 = 0x03;

    /// Reset and restart alignment followed by ZUPT-aided navigation
    pub const RESET_ZUPT_AIDED_INS: u8 = 0x10;
    /// Start gyroscope bias self-calibration
    pub const GYRO_CALIBRATION: u8 = 0x11;
    /// Start accelerometer calibration with N orientations
    pub const ACC_CALIBRATION: u8 = 0x12;
    /// Set the IMU low-pass filter (log2 of tap count)
    pub const SET_LOWPASS_FILTER: u8 = 0x13;

    /// Enable/disable one state output with a divider
    pub const OUTPUT_STATE: u8 = 0x20;
    /// Disable every state output
    pub const OUTPUT_ALL_OFF: u8 = 0x21;
    /// Enable specific force and angular rate outputs
    pub const OUTPUT_INERTIAL: u8 = 0x22;
    /// Enable position and zero-velocity flag outputs
    pub const OUTPUT_POSITION_PLUS_ZUPT: u8 = 0x23;
    /// Enable position, velocity, attitude and cycle counter outputs
    pub const OUTPUT_NAVIGATIONAL_STATES: u8 = 0x24;
    /// Enable one state output and resynchronize all outputs
    pub const ADD_SYNC_OUTPUT: u8 = 0x25;
    /// Resynchronize all outputs
    pub const SYNC_OUTPUT: u8 = 0x26;

    /// Place or remove a processing step in the process sequence
    pub const PROCESSING_STEP_ONOFF: u8 = 0x30;
}

/// Reportable state IDs
pub mod state {
    // Sensor readings
    pub const SPECIFIC_FORCE: u8 = 0x01;
    pub const ANGULAR_RATE: u8 = 0x02;
    pub const IMU_TEMPERATURES: u8 = 0x03;
    pub const IMU_SUPPLY_VOLTAGE: u8 = 0x04;

    // Filter state
    pub const POSITION: u8 = 0x11;
    pub const VELOCITY: u8 = 0x12;
    pub const QUATERNION: u8 = 0x13;
    pub const ZUPT: u8 = 0x14;

    // System state
    pub const CYCLE_COUNTER: u8 = 0x21;
    pub const SOFT_FAULTS: u8 = 0x22;
    pub const DEADLINE_OVERRUNS: u8 = 0x23;

    // Other
    pub const ACCELEROMETER_BIASES: u8 = 0x35;
}

/// Processing step IDs
pub mod step {
    pub const UPDATE_BUFFER: u8 = 0x04;
    pub const INITIAL_ALIGNMENT: u8 = 0x05;
    pub const MECHANIZATION: u8 = 0x06;
    pub const TIME_UPDATE: u8 = 0x07;
    pub const ZUPT_DETECTOR: u8 = 0x08;
    pub const ZUPT_UPDATE: u8 = 0x09;
    pub const GYRO_CALIBRATION: u8 = 0x10;
    pub const ACCELEROMETER_CALIBRATION: u8 = 0x11;
}

/// Notice codes carried by notice frames
pub mod notice {
    /// Accelerometer calibration wants the device in its next orientation
    pub const NEXT_ORIENTATION: u8 = 0x66;
    /// Accelerometer calibration finished
    pub const CALIBRATION_COMPLETE: u8 = 0x67;
}
