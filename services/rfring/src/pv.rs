//! PV naming tables
//!
//! Maps rack/heatsink/reading coordinates to the process-variable names
//! published by the supervisory control system. Every name is a pure
//! function of its coordinate and the constants in [`crate::constants`];
//! the tables are built once at startup and never mutated afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::constants::{
    AGGREGATE_READINGS, AGGREGATE_SLOT, CURRENT_1, CURRENT_2, DEV_CURRENT, DEV_GENERAL_POWER,
    DEV_POWER, DEV_STATUS, DISCIPLINE, HEATSINK, HEATSINKS_PER_RACK, HEATSINK_POWER_PROPS,
    LAST_CURRENT_READING, LAST_HEATSINK_READING, PRE_AMP, RACK_COUNT, READING_ITEM_A,
    READING_ITEM_B, SEC_SUB_KEY, STATES,
};
use crate::error::{Result, RfRingError};
use crate::params::{build_alarm_pvs, build_offset_pvs, AlarmKey, OffsetKey};

/// Coordinate of a rack-table PV.
///
/// `slot` is a heatsink number (1..=8) or [`AGGREGATE_SLOT`] for the
/// rack-level power readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PvKey {
    pub rack: u8,
    pub slot: u8,
    pub reading: u8,
}

impl PvKey {
    pub const fn new(rack: u8, slot: u8, reading: u8) -> Self {
        Self {
            rack,
            slot,
            reading,
        }
    }
}

impl fmt::Display for PvKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.rack, self.slot, self.reading)
    }
}

/// Rack number -> status PV
pub type StatePvs = BTreeMap<u8, String>;

/// Rack coordinate -> reading PV
pub type RackPvs = BTreeMap<PvKey, String>;

/// Heatsink numbers mounted in `rack` (1..=4): rack 1 -> 1..=2, rack 4 -> 7..=8.
///
/// Unknown racks yield an empty range.
#[allow(clippy::reversed_empty_ranges)]
pub fn heatsink_range(rack: u8) -> RangeInclusive<u8> {
    if !(1..=RACK_COUNT).contains(&rack) {
        return 1..=0;
    }
    let last = HEATSINKS_PER_RACK * rack;
    (last - HEATSINKS_PER_RACK + 1)..=last
}

fn state_pv(rack: u8) -> String {
    format!(
        "{}:{}-{}:{}",
        SEC_SUB_KEY,
        DISCIPLINE,
        DEV_STATUS,
        STATES[usize::from(rack - 1)]
    )
}

/// Build the rack status table.
pub fn build_state_pvs() -> StatePvs {
    (1..=RACK_COUNT).map(|rack| (rack, state_pv(rack))).collect()
}

/// Build the full rack table: 38 readings per heatsink plus 4 aggregates per rack.
pub fn build_rack_pvs() -> RackPvs {
    let mut pvs = RackPvs::new();
    for rack in 1..=RACK_COUNT {
        for heatsink in heatsink_range(rack) {
            insert_current_pvs(&mut pvs, rack, heatsink);
            insert_heatsink_power_pvs(&mut pvs, rack, heatsink);
        }
        insert_aggregate_pvs(&mut pvs, rack);
    }
    pvs
}

/// Readings 1..=34. Odd readings are `Current1`, even ones `Current2`, each
/// numbered by its own counter. Readings 17..=32 belong to the B bank and
/// are renumbered by subtracting 8 from the counter.
fn insert_current_pvs(pvs: &mut RackPvs, rack: u8, heatsink: u8) {
    let mut odd_item = 1u8;
    let mut even_item = 1u8;

    for reading in 1..=LAST_CURRENT_READING {
        let (item, prop) = if reading % 2 != 0 {
            let item = odd_item;
            odd_item += 1;
            (item, CURRENT_1)
        } else {
            let item = even_item;
            even_item += 1;
            (item, CURRENT_2)
        };

        let name = match reading {
            33 | 34 => format!(
                "{}:{}-{}-{}{:02}{}:{}",
                SEC_SUB_KEY, DISCIPLINE, DEV_CURRENT, HEATSINK, heatsink, PRE_AMP, prop
            ),
            1..=16 => bar_current_pv(heatsink, READING_ITEM_A, item, prop),
            _ => bar_current_pv(heatsink, READING_ITEM_B, item - 8, prop),
        };
        pvs.insert(PvKey::new(rack, heatsink, reading), name);
    }
}

fn bar_current_pv(heatsink: u8, bar_item: &str, item: u8, prop: &str) -> String {
    format!(
        "{}:{}-{}-{}{:02}{}{:02}:{}",
        SEC_SUB_KEY, DISCIPLINE, DEV_CURRENT, HEATSINK, heatsink, bar_item, item, prop
    )
}

/// Readings 35..=38: bottom/top reflected and forward power.
fn insert_heatsink_power_pvs(pvs: &mut RackPvs, rack: u8, heatsink: u8) {
    let readings = (LAST_CURRENT_READING + 1)..=LAST_HEATSINK_READING;
    for (reading, prop) in readings.zip(HEATSINK_POWER_PROPS) {
        let name = format!(
            "{}:{}-{}-{}{:02}:{}",
            SEC_SUB_KEY, DISCIPLINE, DEV_POWER, HEATSINK, heatsink, prop
        );
        pvs.insert(PvKey::new(rack, heatsink, reading), name);
    }
}

/// Aggregate slot: 1 -> RevOut, 2 -> FwdOut, 3 -> RevIn, 4 -> FwdIn.
fn insert_aggregate_pvs(pvs: &mut RackPvs, rack: u8) {
    for reading in 1..=AGGREGATE_READINGS {
        let direction = if reading % 2 == 0 { "Fwd" } else { "Rev" };
        let stage = if reading <= 2 { "Out" } else { "In" };
        let name = format!(
            "{}:{}-{}:Pwr{}{}{}-Mon",
            SEC_SUB_KEY, DISCIPLINE, DEV_GENERAL_POWER, direction, stage, rack
        );
        pvs.insert(PvKey::new(rack, AGGREGATE_SLOT, reading), name);
    }
}

/// All naming tables of the gateway, built once and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PvTables {
    states: StatePvs,
    racks: RackPvs,
    alarms: BTreeMap<AlarmKey, String>,
    offsets: BTreeMap<OffsetKey, String>,
}

impl Default for PvTables {
    fn default() -> Self {
        Self::build(false)
    }
}

impl PvTables {
    /// Build every table. With `trace` set, each generated name is logged.
    pub fn build(trace: bool) -> Self {
        let tables = Self {
            states: build_state_pvs(),
            racks: build_rack_pvs(),
            alarms: build_alarm_pvs(),
            offsets: build_offset_pvs(),
        };
        if trace {
            tables.trace_names();
        }
        tables
    }

    fn trace_names(&self) {
        for name in self.offsets.values().chain(self.alarms.values()) {
            info!("{}", name);
        }
        for (rack, state) in &self.states {
            info!("{}", state);
            let first = PvKey::new(*rack, 0, 0);
            let last = PvKey::new(*rack, u8::MAX, u8::MAX);
            for name in self.racks.range(first..=last).map(|(_, name)| name) {
                info!("{}", name);
            }
        }
    }

    pub fn get_state_pv(&self, rack: u8) -> Result<&str> {
        self.states
            .get(&rack)
            .map(String::as_str)
            .ok_or(RfRingError::UnknownRack(rack))
    }

    pub fn get_heatsink_pv_name(&self, rack: u8, heatsink: u8, reading: u8) -> Result<&str> {
        let key = PvKey::new(rack, heatsink, reading);
        self.racks
            .get(&key)
            .map(String::as_str)
            .ok_or(RfRingError::UnknownPv {
                rack,
                slot: heatsink,
                reading,
            })
    }

    pub fn alarm_pv(&self, key: AlarmKey) -> &str {
        // build_alarm_pvs inserts every AlarmKey variant
        &self.alarms[&key]
    }

    pub fn offset_pv(&self, key: OffsetKey) -> &str {
        // build_offset_pvs inserts every OffsetKey variant
        &self.offsets[&key]
    }

    /// Look up an alarm PV by its semantic key, e.g. `current_lim_high`.
    pub fn alarm_pv_by_name(&self, key: &str) -> Result<&str> {
        let key: AlarmKey = key.parse()?;
        Ok(self.alarm_pv(key))
    }

    /// Look up an offset PV by its semantic key, e.g. `input_incident_power`.
    pub fn offset_pv_by_name(&self, key: &str) -> Result<&str> {
        let key: OffsetKey = key.parse()?;
        Ok(self.offset_pv(key))
    }

    pub fn states(&self) -> &StatePvs {
        &self.states
    }

    pub fn racks(&self) -> &RackPvs {
        &self.racks
    }

    pub fn alarms(&self) -> &BTreeMap<AlarmKey, String> {
        &self.alarms
    }

    pub fn offsets(&self) -> &BTreeMap<OffsetKey, String> {
        &self.offsets
    }

    /// Flat, JSON-friendly view of the tables.
    pub fn snapshot(&self) -> PvSnapshot<'_> {
        PvSnapshot {
            states: self
                .states
                .iter()
                .map(|(rack, name)| (*rack, name.as_str()))
                .collect(),
            racks: self
                .racks
                .iter()
                .map(|(key, name)| PvEntry {
                    rack: key.rack,
                    slot: key.slot,
                    reading: key.reading,
                    name: name.as_str(),
                })
                .collect(),
            alarms: self
                .alarms
                .iter()
                .map(|(key, name)| (key.as_str(), name.as_str()))
                .collect(),
            offsets: self
                .offsets
                .iter()
                .map(|(key, name)| (key.as_str(), name.as_str()))
                .collect(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }
}

/// One row of the rack table in a [`PvSnapshot`].
#[derive(Debug, Clone, Serialize)]
pub struct PvEntry<'a> {
    pub rack: u8,
    pub slot: u8,
    pub reading: u8,
    pub name: &'a str,
}

/// Serializable view of [`PvTables`]; rack rows keep coordinate order.
#[derive(Debug, Clone, Serialize)]
pub struct PvSnapshot<'a> {
    pub states: BTreeMap<u8, &'a str>,
    pub racks: Vec<PvEntry<'a>>,
    pub alarms: BTreeMap<&'static str, &'a str>,
    pub offsets: BTreeMap<&'static str, &'a str>,
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn rack_pv(rack: u8, slot: u8, reading: u8) -> String {
        build_rack_pvs()[&PvKey::new(rack, slot, reading)].clone()
    }

    #[test]
    fn test_heatsink_range() {
        assert_eq!(heatsink_range(1), 1..=2);
        assert_eq!(heatsink_range(2), 3..=4);
        assert_eq!(heatsink_range(3), 5..=6);
        assert_eq!(heatsink_range(4), 7..=8);
    }

    #[test]
    fn test_heatsink_range_unknown_rack_is_empty() {
        assert_eq!(heatsink_range(0).count(), 0);
        assert_eq!(heatsink_range(5).count(), 0);
        assert_eq!(heatsink_range(200).count(), 0);
    }

    #[test]
    fn test_every_parameter_key_has_a_pv() {
        let tables = PvTables::build(false);
        for key in AlarmKey::ALL {
            assert!(tables.alarm_pv(key).ends_with(key.pv_suffix()));
        }
        for key in OffsetKey::ALL {
            assert!(tables.offset_pv(key).ends_with(key.pv_suffix()));
        }
    }

    #[test]
    fn test_state_pv_format() {
        let states = build_state_pvs();
        assert_eq!(states.len(), 4);
        assert_eq!(states[&1], "RA-ToSIA01:RF-SSAmpTower:PwrDCR1-Mon");
        assert_eq!(states[&4], "RA-ToSIA01:RF-SSAmpTower:PwrDCR4-Mon");
    }

    #[test]
    fn test_rack_table_size() {
        // 4 racks * (2 heatsinks * 38 readings + 4 aggregates)
        assert_eq!(build_rack_pvs().len(), 4 * (2 * 38 + 4));
    }

    #[test]
    fn test_a_bank_numbering() {
        assert_eq!(rack_pv(1, 1, 1), "RA-ToSIA01:RF-SSAmp-H01AM01:Current1-Mon");
        assert_eq!(rack_pv(1, 1, 2), "RA-ToSIA01:RF-SSAmp-H01AM01:Current2-Mon");
        assert_eq!(rack_pv(1, 1, 3), "RA-ToSIA01:RF-SSAmp-H01AM02:Current1-Mon");
        assert_eq!(rack_pv(1, 1, 16), "RA-ToSIA01:RF-SSAmp-H01AM08:Current2-Mon");
    }

    #[test]
    fn test_b_bank_subtracts_eight() {
        assert_eq!(rack_pv(1, 1, 17), "RA-ToSIA01:RF-SSAmp-H01BM01:Current1-Mon");
        assert_eq!(rack_pv(1, 1, 18), "RA-ToSIA01:RF-SSAmp-H01BM01:Current2-Mon");
        assert_eq!(rack_pv(1, 1, 31), "RA-ToSIA01:RF-SSAmp-H01BM08:Current1-Mon");
        assert_eq!(rack_pv(1, 1, 32), "RA-ToSIA01:RF-SSAmp-H01BM08:Current2-Mon");
    }

    #[test]
    fn test_pre_amp_readings() {
        assert_eq!(rack_pv(1, 1, 33), "RA-ToSIA01:RF-SSAmp-H01PreAmp:Current1-Mon");
        assert_eq!(rack_pv(3, 6, 34), "RA-ToSIA01:RF-SSAmp-H06PreAmp:Current2-Mon");
    }

    #[test]
    fn test_heatsink_power_readings() {
        assert_eq!(rack_pv(2, 3, 35), "RA-ToSIA01:RF-HeatSink-H03:PwrRevBot-Mon");
        assert_eq!(rack_pv(2, 3, 36), "RA-ToSIA01:RF-HeatSink-H03:PwrFwdBot-Mon");
        assert_eq!(rack_pv(2, 4, 37), "RA-ToSIA01:RF-HeatSink-H04:PwrRevTop-Mon");
        assert_eq!(rack_pv(4, 8, 38), "RA-ToSIA01:RF-HeatSink-H08:PwrFwdTop-Mon");
    }

    #[test]
    fn test_aggregate_readings() {
        assert_eq!(rack_pv(2, 9, 1), "RA-ToSIA01:RF-SSAmpTower:PwrRevOut2-Mon");
        assert_eq!(rack_pv(2, 9, 2), "RA-ToSIA01:RF-SSAmpTower:PwrFwdOut2-Mon");
        assert_eq!(rack_pv(2, 9, 3), "RA-ToSIA01:RF-SSAmpTower:PwrRevIn2-Mon");
        assert_eq!(rack_pv(2, 9, 4), "RA-ToSIA01:RF-SSAmpTower:PwrFwdIn2-Mon");
    }

    #[test]
    fn test_heatsinks_do_not_leak_across_racks() {
        let pvs = build_rack_pvs();
        assert!(!pvs.contains_key(&PvKey::new(1, 3, 1)));
        assert!(!pvs.contains_key(&PvKey::new(4, 6, 1)));
        assert!(!pvs.contains_key(&PvKey::new(1, 9, 5)));
        assert!(!pvs.contains_key(&PvKey::new(1, 1, 39)));
    }

    #[test]
    fn test_pv_key_display() {
        assert_eq!(PvKey::new(1, 9, 4).to_string(), "1:9:4");
    }

    #[test]
    fn test_snapshot_keeps_coordinate_order() {
        let tables = PvTables::build(false);
        let snapshot = tables.snapshot();
        assert_eq!(snapshot.racks.len(), tables.racks().len());
        let first = &snapshot.racks[0];
        assert_eq!((first.rack, first.slot, first.reading), (1, 1, 1));
        let last = snapshot.racks.last().unwrap();
        assert_eq!((last.rack, last.slot, last.reading), (4, 9, 4));
    }

    #[test]
    #[traced_test]
    fn test_build_traces_names_when_enabled() {
        PvTables::build(true);
        assert!(logs_contain("RA-ToSIA01:OffsetConfig:UpperIncidentPower"));
        assert!(logs_contain("RA-ToSIA01:AlarmConfig:CurrentLimHigh"));
        assert!(logs_contain("RA-ToSIA01:RF-SSAmpTower:PwrDCR4-Mon"));
        assert!(logs_contain("RA-ToSIA01:RF-HeatSink-H08:PwrFwdTop-Mon"));
    }

    #[test]
    #[traced_test]
    fn test_build_traces_names_in_table_order() {
        PvTables::build(true);
        logs_assert(|lines: &[&str]| {
            let position = |name: &str| {
                lines
                    .iter()
                    .position(|line| line.contains(name))
                    .ok_or(format!("{} was not traced", name))
            };
            let ordered = [
                "RA-ToSIA01:OffsetConfig:UpperIncidentPower",
                "RA-ToSIA01:AlarmConfig:GeneralPowerLimHigh",
                "RA-ToSIA01:RF-SSAmpTower:PwrDCR1-Mon",
                "RA-ToSIA01:RF-SSAmp-H01AM01:Current1-Mon",
                "RA-ToSIA01:RF-HeatSink-H02:PwrFwdTop-Mon",
                "RA-ToSIA01:RF-SSAmpTower:PwrFwdIn1-Mon",
                "RA-ToSIA01:RF-SSAmpTower:PwrDCR2-Mon",
                "RA-ToSIA01:RF-SSAmp-H03AM01:Current1-Mon",
            ];
            let mut last = None;
            for name in ordered {
                let at = position(name)?;
                if last.is_some_and(|prev| prev >= at) {
                    return Err(format!("{} traced out of order", name));
                }
                last = Some(at);
            }
            Ok(())
        });
    }

    #[test]
    #[traced_test]
    fn test_build_is_quiet_when_disabled() {
        PvTables::build(false);
        assert!(!logs_contain("RA-ToSIA01:RF-SSAmpTower:PwrDCR1-Mon"));
    }
}
