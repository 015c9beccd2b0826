//! Serial link manager
//!
//! Owns the single serial link shared by the four rack readers. Readers are
//! identified by rack number and always resolve to the manager's current
//! link, so every slot sees the same instance. Swapping the link happens
//! only inside [`LinkManager::refresh`], under the manager's lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::constants::{RACK_COUNT, RACK_LABELS};
use crate::serial::{open_link, LinkOpener, SerialLink};

/// Handle shared between the manager and the readers
pub type SharedLink<L> = Arc<Mutex<L>>;

/// Reader of one rack on the shared bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderSlot {
    pub rack: u8,
    /// Request written to the bus to poll this rack
    pub label: &'static [u8],
}

impl ReaderSlot {
    pub fn all() -> [ReaderSlot; RACK_COUNT as usize] {
        let mut rack = 0u8;
        RACK_LABELS.map(|label| {
            rack += 1;
            ReaderSlot { rack, label }
        })
    }
}

/// Liveness probe with repair for the rack bus.
pub struct LinkManager<O: LinkOpener> {
    opener: O,
    slots: [ReaderSlot; RACK_COUNT as usize],
    current: Mutex<Option<SharedLink<O::Link>>>,
    reconnects: AtomicU64,
}

impl<O: LinkOpener> LinkManager<O> {
    /// Create a manager with no link; the first `refresh` opens it.
    pub fn new(opener: O) -> Self {
        Self {
            opener,
            slots: ReaderSlot::all(),
            current: Mutex::new(None),
            reconnects: AtomicU64::new(0),
        }
    }

    /// Create a manager and try to open the link right away.
    ///
    /// A missing or unopenable device leaves the manager disconnected.
    pub fn connect(opener: O) -> Self {
        let link = open_link(&opener).map(|link| Arc::new(Mutex::new(link)));
        let manager = Self::new(opener);
        *manager.current.lock() = link;
        manager
    }

    pub fn opener(&self) -> &O {
        &self.opener
    }

    pub fn slots(&self) -> &[ReaderSlot] {
        &self.slots
    }

    pub fn slot(&self, rack: u8) -> Option<&ReaderSlot> {
        self.slots.iter().find(|slot| slot.rack == rack)
    }

    /// The link every reader currently uses.
    pub fn current(&self) -> Option<SharedLink<O::Link>> {
        self.current.lock().clone()
    }

    /// The link used by the reader of `rack`; `None` for unknown racks or
    /// while disconnected.
    pub fn slot_link(&self, rack: u8) -> Option<SharedLink<O::Link>> {
        self.slot(rack)?;
        self.current()
    }

    /// Whether a link is present and reports itself open.
    pub fn is_connected(&self) -> bool {
        self.current
            .lock()
            .as_ref()
            .is_some_and(|link| link.lock().is_open())
    }

    /// Number of times `refresh` replaced the link.
    pub fn reconnect_count(&self) -> u64 {
        self.reconnects.load(Ordering::Relaxed)
    }

    /// Check the link and reopen it if needed.
    ///
    /// Returns `false` when the device node is missing or the reopen failed,
    /// `true` when the readers hold an open link afterwards. Never errors.
    pub fn refresh(&self) -> bool {
        if !self.opener.device_exists() {
            debug!(
                "Serial device {} not present",
                self.opener.device_path().display()
            );
            return false;
        }

        let mut current = self.current.lock();

        if current.as_ref().is_some_and(|link| link.lock().is_open()) {
            return true;
        }

        if let Some(stale) = current.take() {
            if let Err(e) = stale.lock().close() {
                debug!("Ignoring close error on stale link: {}", e);
            }
        }

        match self.opener.open() {
            Ok(link) => {
                *current = Some(Arc::new(Mutex::new(link)));
                let count = self.reconnects.fetch_add(1, Ordering::Relaxed) + 1;
                info!(
                    "Serial link to {} reopened for {} racks (reconnect #{})",
                    self.opener.device_path().display(),
                    self.slots.len(),
                    count
                );
                true
            },
            Err(e) if e.is_device_level() => {
                warn!("Serial device disconnected: {}", e);
                false
            },
            Err(e) => {
                error!("Refresh serial connection failed: {}", e);
                false
            },
        }
    }
}
