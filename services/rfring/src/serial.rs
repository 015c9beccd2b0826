//! Serial link abstraction
//!
//! The rack bus is a single serial device with fixed framing. Access goes
//! through two small traits so the link manager can be exercised without
//! hardware: [`LinkOpener`] knows how to reach the device and open it,
//! [`SerialLink`] is one open handle.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio_serial::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info, warn};

use crate::constants::{BAUD_RATE, DEFAULT_SERIAL_PORT, SERIAL_TIMEOUT};

/// Serial link errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// The device node does not exist (unplugged, or the socat bridge is down)
    #[error("Serial device not found: {0}")]
    DeviceAbsent(String),

    /// The device exists but could not be opened (permissions, busy, bad parameters)
    #[error("Failed to open serial port {path}: {reason}")]
    OpenFailed { path: String, reason: String },

    /// I/O failure on an open handle
    #[error("Serial I/O error: {0}")]
    Io(String),

    /// Anything that is not a device-level failure
    #[error("Unexpected serial failure: {0}")]
    Unexpected(String),
}

impl LinkError {
    /// Device-level failures mean "disconnected"; the rest are bugs worth an error log.
    pub fn is_device_level(&self) -> bool {
        !matches!(self, LinkError::Unexpected(_))
    }
}

/// One open connection to the rack bus.
pub trait SerialLink: Send {
    /// Whether the handle is still usable.
    fn is_open(&self) -> bool;

    /// Release the handle. Closing an already closed link is a no-op.
    fn close(&mut self) -> Result<(), LinkError>;
}

/// Knows where the device lives and how to open it.
pub trait LinkOpener: Send + Sync {
    type Link: SerialLink + 'static;

    fn device_path(&self) -> &Path;

    /// Whether the device node is currently present.
    fn device_exists(&self) -> bool {
        self.device_path().exists()
    }

    fn open(&self) -> Result<Self::Link, LinkError>;
}

/// Framing parameters of the rack bus.
///
/// Only the device path varies between installations; the rest is fixed by
/// the rack firmware.
#[derive(Debug, Clone, PartialEq)]
pub struct SerialSettings {
    pub path: PathBuf,
    pub baud_rate: u32,
    pub timeout: Duration,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl SerialSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            baud_rate: BAUD_RATE,
            timeout: SERIAL_TIMEOUT,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self::new(DEFAULT_SERIAL_PORT)
    }
}

/// Opens the real tty with [`SerialSettings`].
#[derive(Debug, Clone)]
pub struct TtyOpener {
    settings: SerialSettings,
}

impl TtyOpener {
    pub fn new(settings: SerialSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SerialSettings {
        &self.settings
    }
}

fn map_serial_error(path: &str, err: tokio_serial::Error) -> LinkError {
    match err.kind() {
        tokio_serial::ErrorKind::NoDevice => LinkError::DeviceAbsent(path.to_string()),
        _ => LinkError::OpenFailed {
            path: path.to_string(),
            reason: err.to_string(),
        },
    }
}

impl LinkOpener for TtyOpener {
    type Link = SerialHandle;

    fn device_path(&self) -> &Path {
        &self.settings.path
    }

    fn open(&self) -> Result<SerialHandle, LinkError> {
        let path = self.settings.path.to_str().ok_or_else(|| {
            LinkError::Unexpected(format!(
                "Device path is not valid UTF-8: {:?}",
                self.settings.path
            ))
        })?;

        if !self.device_exists() {
            return Err(LinkError::DeviceAbsent(path.to_string()));
        }

        debug!("Opening serial port: {}", path);

        let port = tokio_serial::new(path, self.settings.baud_rate)
            .data_bits(self.settings.data_bits)
            .parity(self.settings.parity)
            .stop_bits(self.settings.stop_bits)
            .flow_control(FlowControl::None)
            .timeout(self.settings.timeout)
            .open()
            .map_err(|e| map_serial_error(path, e))?;

        info!("Opened serial port: {} @ {} baud", path, self.settings.baud_rate);
        Ok(SerialHandle {
            path: self.settings.path.clone(),
            port: Some(port),
        })
    }
}

/// An open tty. Dropping the inner port closes the file descriptor.
pub struct SerialHandle {
    path: PathBuf,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw port for the bus readers; `None` once closed.
    pub fn port_mut(&mut self) -> Option<&mut (dyn SerialPort + 'static)> {
        self.port.as_deref_mut()
    }
}

impl fmt::Debug for SerialHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialHandle")
            .field("path", &self.path)
            .field("open", &self.port.is_some())
            .finish()
    }
}

impl SerialLink for SerialHandle {
    /// A handle counts as open while the driver still answers a status query;
    /// an unplugged adapter fails it.
    fn is_open(&self) -> bool {
        self.port
            .as_ref()
            .is_some_and(|port| port.bytes_to_read().is_ok())
    }

    fn close(&mut self) -> Result<(), LinkError> {
        if self.port.take().is_some() {
            debug!("Closed serial port: {}", self.path.display());
        }
        Ok(())
    }
}

/// Best-effort open used at startup.
///
/// A missing device or any open failure yields `None`; the periodic refresh
/// takes over from there.
pub fn open_link<O: LinkOpener>(opener: &O) -> Option<O::Link> {
    if !opener.device_exists() {
        debug!(
            "Serial device {} not present, starting disconnected",
            opener.device_path().display()
        );
        return None;
    }

    match opener.open() {
        Ok(link) => Some(link),
        Err(e) => {
            warn!("Initial serial open failed, starting disconnected: {}", e);
            None
        },
    }
}
