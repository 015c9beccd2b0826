//! PV table integration tests
//!
//! Exercises the public lookup API the way the gateway consumers use it.

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use rfring::constants::{END_OF_STREAM, READ_PARAMETERS, STATES};
use rfring::{AlarmKey, OffsetKey, PvTables, RfRingError};

// ============================================================================
// State PVs
// ============================================================================

#[test]
fn test_state_pv_per_rack() {
    let tables = PvTables::build(false);
    for rack in 1..=4u8 {
        let name = tables.get_state_pv(rack).unwrap();
        assert!(name.ends_with(STATES[usize::from(rack - 1)]));
        assert_eq!(tables.get_state_pv(rack).unwrap(), name);
    }
}

#[test]
fn test_state_pv_unknown_rack() {
    let tables = PvTables::build(false);
    assert_eq!(tables.get_state_pv(0), Err(RfRingError::UnknownRack(0)));
    assert_eq!(tables.get_state_pv(5), Err(RfRingError::UnknownRack(5)));
}

// ============================================================================
// Heatsink PVs
// ============================================================================

#[test]
fn test_first_reading_is_am01() {
    let tables = PvTables::build(false);
    let name = tables.get_heatsink_pv_name(1, 1, 1).unwrap();
    assert!(name.ends_with("H01AM01:Current1-Mon"), "{}", name);
}

#[test]
fn test_reading_33_is_pre_amp() {
    let tables = PvTables::build(false);
    let name = tables.get_heatsink_pv_name(1, 1, 33).unwrap();
    assert!(name.ends_with("H01PreAmp:Current1-Mon"), "{}", name);
}

#[test]
fn test_reading_17_is_bm01() {
    let tables = PvTables::build(false);
    let name = tables.get_heatsink_pv_name(1, 1, 17).unwrap();
    assert!(name.ends_with("H01BM01:Current1-Mon"), "{}", name);
}

#[test]
fn test_every_heatsink_has_38_readings() {
    let tables = PvTables::build(false);
    for rack in 1..=4u8 {
        for heatsink in rfring::pv::heatsink_range(rack) {
            for reading in 1..=38u8 {
                let name = tables.get_heatsink_pv_name(rack, heatsink, reading).unwrap();
                assert!(name.contains(&format!("-H{:02}", heatsink)), "{}", name);
            }
            assert!(tables.get_heatsink_pv_name(rack, heatsink, 39).is_err());
        }
    }
}

#[test]
fn test_unknown_heatsink_coordinate() {
    let tables = PvTables::build(false);
    assert_eq!(
        tables.get_heatsink_pv_name(1, 3, 1),
        Err(RfRingError::UnknownPv {
            rack: 1,
            slot: 3,
            reading: 1
        })
    );
}

// ============================================================================
// Aggregate PVs
// ============================================================================

#[test]
fn test_aggregate_slot_has_four_readings() {
    let tables = PvTables::build(false);
    for rack in 1..=4u8 {
        let aggregates: Vec<_> = tables
            .racks()
            .iter()
            .filter(|(key, _)| key.rack == rack && key.slot == 9)
            .map(|(_, name)| name.as_str())
            .collect();
        assert_eq!(aggregates.len(), 4);
        assert!(aggregates[0].contains(&format!("PwrRevOut{}", rack)));
        assert!(aggregates[1].contains(&format!("PwrFwdOut{}", rack)));
        assert!(aggregates[2].contains(&format!("PwrRevIn{}", rack)));
        assert!(aggregates[3].contains(&format!("PwrFwdIn{}", rack)));
    }
}

// ============================================================================
// Parameter PVs
// ============================================================================

#[test]
fn test_parameter_lookup_by_semantic_key() {
    let tables = PvTables::build(false);
    assert_eq!(
        tables.alarm_pv_by_name("current_lim_high").unwrap(),
        "RA-ToSIA01:AlarmConfig:CurrentLimHigh"
    );
    assert_eq!(
        tables.offset_pv_by_name("input_reflected_power").unwrap(),
        "RA-ToSIA01:OffsetConfig:InputReflectedPower"
    );
    assert!(tables.alarm_pv_by_name("voltage_lim_high").is_err());
    assert_eq!(tables.alarms().len(), AlarmKey::ALL.len());
    assert_eq!(tables.offsets().len(), OffsetKey::ALL.len());
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_builders_are_idempotent() {
    assert_eq!(PvTables::build(false), PvTables::build(false));
    assert_eq!(rfring::pv::build_rack_pvs(), rfring::pv::build_rack_pvs());
    assert_eq!(rfring::pv::build_state_pvs(), rfring::pv::build_state_pvs());
    assert_eq!(
        rfring::params::build_alarm_pvs(),
        rfring::params::build_alarm_pvs()
    );
    assert_eq!(
        rfring::params::build_offset_pvs(),
        rfring::params::build_offset_pvs()
    );
}

#[test]
fn test_tracing_does_not_change_tables() {
    assert_eq!(PvTables::build(true), PvTables::build(false));
}

#[test]
fn test_json_dump_shape() {
    let tables = PvTables::build(false);
    let json: serde_json::Value = serde_json::from_str(&tables.to_json_pretty().unwrap()).unwrap();

    assert_eq!(json["states"]["1"], "RA-ToSIA01:RF-SSAmpTower:PwrDCR1-Mon");
    assert_eq!(json["racks"].as_array().unwrap().len(), 320);
    assert_eq!(json["racks"][0]["name"], "RA-ToSIA01:RF-SSAmp-H01AM01:Current1-Mon");
    assert_eq!(
        json["alarms"]["inner_power_lim_low"],
        "RA-ToSIA01:AlarmConfig:InnerPowerLimLow"
    );
    assert_eq!(
        json["offsets"]["bar_upper_reflected_power"],
        "RA-ToSIA01:OffsetConfig:UpperReflectedPower"
    );
}

#[test]
fn test_stream_tokens() {
    assert_eq!(READ_PARAMETERS, "READ_PARAMETERS");
    assert_eq!(END_OF_STREAM, "####FIM!;");
}
