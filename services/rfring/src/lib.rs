//! RF ring amplifier gateway
//!
//! Naming and connection configuration for the RF amplifier rack monitor:
//! - PV naming tables for rack status, heatsink readings and rack aggregates
//! - alarm limit and offset parameter PVs
//! - the shared serial link and its liveness refresh
//! - configuration loading and service bootstrap

pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod error;
pub mod link_manager;
pub mod params;
pub mod pv;
pub mod serial;

pub use config::RfRingConfig;
pub use error::{Result, RfRingError};
pub use link_manager::{LinkManager, ReaderSlot, SharedLink};
pub use params::{AlarmKey, OffsetKey};
pub use pv::{PvKey, PvTables};
pub use serial::{
    open_link, LinkError, LinkOpener, SerialHandle, SerialLink, SerialSettings, TtyOpener,
};
