//! Fixed constants of the RF ring gateway
//!
//! Naming fragments are consumed verbatim by the supervisory control system,
//! so every value here is part of the external contract.

use std::time::Duration;

// ============================================================================
// Serial link
// ============================================================================

/// Environment variable that overrides the serial device path
pub const SERIAL_PORT_ENV: &str = "RF_RING_SERIAL_PORT";

/// Device path used when no override is configured
pub const DEFAULT_SERIAL_PORT: &str = "/dev/ttyUSB0";

pub const BAUD_RATE: u32 = 500_000;
pub const SERIAL_TIMEOUT: Duration = Duration::from_secs(2);

// ============================================================================
// Timers
// ============================================================================

/// Seconds between attempts to reconnect the serial port
pub const TIME_RECONNECT_SECS: f64 = 10.0;

/// Seconds between scan requests
pub const SCAN_TIMER_SECS: f64 = 5.0;

// ============================================================================
// Parameter store filenames
// ============================================================================

pub const OFFSETS_DB_FILENAME: &str = "offsets_parameters.db";
pub const ALARMS_DB_FILENAME: &str = "alarms_parameters.db";

// ============================================================================
// Inter-component tokens
// ============================================================================

/// Token used on the consumer thread to request readings
pub const READ_PARAMETERS: &str = "READ_PARAMETERS";

/// Token that signals the end of the stream
pub const END_OF_STREAM: &str = "####FIM!;";

// ============================================================================
// Rack layout
// ============================================================================

pub const RACK_COUNT: u8 = 4;
pub const HEATSINKS_PER_RACK: u8 = 2;

/// Synthetic slot holding the rack-level aggregate power readings
pub const AGGREGATE_SLOT: u8 = 9;

/// Readings 1..=34 are currents, 35..=38 heatsink powers
pub const LAST_CURRENT_READING: u8 = 34;
pub const LAST_HEATSINK_READING: u8 = 38;
pub const AGGREGATE_READINGS: u8 = 4;

/// Request labels written to the bus for each rack
pub const RACK_LABELS: [&[u8]; 4] = [b"RACK1", b"RACK2", b"RACK3", b"RACK4"];

// ============================================================================
// PV naming
// ============================================================================

pub const SEC_SUB_KEY: &str = "RA-ToSIA01";
pub const DISCIPLINE: &str = "RF";
pub const DEV_STATUS: &str = "SSAmpTower";
pub const DEV_CURRENT: &str = "SSAmp";
pub const DEV_POWER: &str = "HeatSink";
pub const DEV_GENERAL_POWER: &str = "SSAmpTower";

pub const STATES: [&str; 4] = ["PwrDCR1-Mon", "PwrDCR2-Mon", "PwrDCR3-Mon", "PwrDCR4-Mon"];

pub const OFFSET_CONFIG_KEY: &str = "OffsetConfig";
pub const ALARM_CONFIG_KEY: &str = "AlarmConfig";

/// Suffix of the "save parameters" command PV in the parameter store
pub const SAVE: &str = "Save";
pub const HEATSINK: &str = "H";
pub const READING_ITEM_A: &str = "AM";
pub const READING_ITEM_B: &str = "BM";
pub const PRE_AMP: &str = "PreAmp";

pub const CURRENT_1: &str = "Current1-Mon";
pub const CURRENT_2: &str = "Current2-Mon";

/// Heatsink power properties for readings 35..=38, in order
pub const HEATSINK_POWER_PROPS: [&str; 4] = [
    "PwrRevBot-Mon",
    "PwrFwdBot-Mon",
    "PwrRevTop-Mon",
    "PwrFwdTop-Mon",
];

/// `RA-ToSIA01:OffsetConfig`
pub fn conf_pv_prefix() -> String {
    format!("{}:{}", SEC_SUB_KEY, OFFSET_CONFIG_KEY)
}

/// `RA-ToSIA01:AlarmConfig`
pub fn alarm_pv_prefix() -> String {
    format!("{}:{}", SEC_SUB_KEY, ALARM_CONFIG_KEY)
}
