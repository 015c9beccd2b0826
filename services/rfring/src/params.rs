//! Alarm limit and offset configuration PVs
//!
//! Both dictionaries are constant: a fixed prefix joined with a fixed suffix
//! per semantic key. They are the names the parameter store reads and writes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{alarm_pv_prefix, conf_pv_prefix, SAVE};
use crate::error::RfRingError;

/// Alarm limit parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmKey {
    GeneralPowerLimHigh,
    GeneralPowerLimLow,
    InnerPowerLimHigh,
    InnerPowerLimLow,
    CurrentLimHigh,
    CurrentLimLow,
}

impl AlarmKey {
    pub const ALL: [AlarmKey; 6] = [
        AlarmKey::GeneralPowerLimHigh,
        AlarmKey::GeneralPowerLimLow,
        AlarmKey::InnerPowerLimHigh,
        AlarmKey::InnerPowerLimLow,
        AlarmKey::CurrentLimHigh,
        AlarmKey::CurrentLimLow,
    ];

    /// Semantic key as used by the parameter store
    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmKey::GeneralPowerLimHigh => "general_power_lim_high",
            AlarmKey::GeneralPowerLimLow => "general_power_lim_low",
            AlarmKey::InnerPowerLimHigh => "inner_power_lim_high",
            AlarmKey::InnerPowerLimLow => "inner_power_lim_low",
            AlarmKey::CurrentLimHigh => "current_lim_high",
            AlarmKey::CurrentLimLow => "current_lim_low",
        }
    }

    pub fn pv_suffix(&self) -> &'static str {
        match self {
            AlarmKey::GeneralPowerLimHigh => "GeneralPowerLimHigh",
            AlarmKey::GeneralPowerLimLow => "GeneralPowerLimLow",
            AlarmKey::InnerPowerLimHigh => "InnerPowerLimHigh",
            AlarmKey::InnerPowerLimLow => "InnerPowerLimLow",
            AlarmKey::CurrentLimHigh => "CurrentLimHigh",
            AlarmKey::CurrentLimLow => "CurrentLimLow",
        }
    }
}

impl fmt::Display for AlarmKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlarmKey {
    type Err = RfRingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlarmKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| RfRingError::UnknownParameter(s.to_string()))
    }
}

/// Power offset calibration parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetKey {
    BarUpperIncidentPower,
    BarUpperReflectedPower,
    BarLowerIncidentPower,
    BarLowerReflectedPower,
    InputIncidentPower,
    InputReflectedPower,
    OutputIncidentPower,
    OutputReflectedPower,
}

impl OffsetKey {
    pub const ALL: [OffsetKey; 8] = [
        OffsetKey::BarUpperIncidentPower,
        OffsetKey::BarUpperReflectedPower,
        OffsetKey::BarLowerIncidentPower,
        OffsetKey::BarLowerReflectedPower,
        OffsetKey::InputIncidentPower,
        OffsetKey::InputReflectedPower,
        OffsetKey::OutputIncidentPower,
        OffsetKey::OutputReflectedPower,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OffsetKey::BarUpperIncidentPower => "bar_upper_incident_power",
            OffsetKey::BarUpperReflectedPower => "bar_upper_reflected_power",
            OffsetKey::BarLowerIncidentPower => "bar_lower_incident_power",
            OffsetKey::BarLowerReflectedPower => "bar_lower_reflected_power",
            OffsetKey::InputIncidentPower => "input_incident_power",
            OffsetKey::InputReflectedPower => "input_reflected_power",
            OffsetKey::OutputIncidentPower => "output_incident_power",
            OffsetKey::OutputReflectedPower => "output_reflected_power",
        }
    }

    /// The `bar_` prefix of the semantic key is not part of the PV suffix.
    pub fn pv_suffix(&self) -> &'static str {
        match self {
            OffsetKey::BarUpperIncidentPower => "UpperIncidentPower",
            OffsetKey::BarUpperReflectedPower => "UpperReflectedPower",
            OffsetKey::BarLowerIncidentPower => "LowerIncidentPower",
            OffsetKey::BarLowerReflectedPower => "LowerReflectedPower",
            OffsetKey::InputIncidentPower => "InputIncidentPower",
            OffsetKey::InputReflectedPower => "InputReflectedPower",
            OffsetKey::OutputIncidentPower => "OutputIncidentPower",
            OffsetKey::OutputReflectedPower => "OutputReflectedPower",
        }
    }
}

impl fmt::Display for OffsetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OffsetKey {
    type Err = RfRingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OffsetKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| RfRingError::UnknownParameter(s.to_string()))
    }
}

/// Alarm key -> `RA-ToSIA01:AlarmConfig:<Suffix>`
pub fn build_alarm_pvs() -> BTreeMap<AlarmKey, String> {
    let prefix = alarm_pv_prefix();
    AlarmKey::ALL
        .into_iter()
        .map(|key| (key, format!("{}:{}", prefix, key.pv_suffix())))
        .collect()
}

/// Offset key -> `RA-ToSIA01:OffsetConfig:<Suffix>`
pub fn build_offset_pvs() -> BTreeMap<OffsetKey, String> {
    let prefix = conf_pv_prefix();
    OffsetKey::ALL
        .into_iter()
        .map(|key| (key, format!("{}:{}", prefix, key.pv_suffix())))
        .collect()
}

/// Command PV asking the parameter store to persist the alarm limits
pub fn alarm_save_pv() -> String {
    format!("{}:{}", alarm_pv_prefix(), SAVE)
}

/// Command PV asking the parameter store to persist the offsets
pub fn offset_save_pv() -> String {
    format!("{}:{}", conf_pv_prefix(), SAVE)
}
