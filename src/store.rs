//! Per-constellation aggregation of satellite corrections.

use std::collections::BTreeMap;

use log::debug;

/// Bit ticks after which an entry that has not been refreshed is
/// evicted.
const REMOVE_OLD_TICKS: u64 = 5000;

/// The latest correction seen for one (satellite, issue-of-data) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SatelliteRecord {
    pub scale: u8,
    pub udre: u8,
    /// Pseudorange correction, metres.
    pub psc: f64,
    /// Range-rate correction, metres per second.
    pub rrc: f64,
    /// Bit tick of the last update.
    pub tick: u64,
    /// Number of times this key has been written.
    pub updates: u32,
}

/// Most recent corrections per satellite for one constellation family.
///
/// GPS corrections key on the issue-of-data; GLONASS corrections key on
/// the ephemeris time `tb`. The map is ordered so dumps iterate in key
/// order.
#[derive(Debug, Default)]
pub struct SatelliteStore {
    entries: BTreeMap<(u8, u8), SatelliteRecord>,
}

impl SatelliteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or refreshes the entry at `(satid, key2)`. A refresh
    /// keeps counting updates; a new key starts at one.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        satid: u8,
        key2: u8,
        scale: u8,
        udre: u8,
        psc: f64,
        rrc: f64,
        tick: u64,
        label: u8,
    ) {
        let updates = match self.entries.get(&(satid, key2)) {
            Some(record) => record.updates + 1,
            None => {
                debug!("T{} store add {} ({}, {})", label, tick, satid, key2);
                1
            }
        };
        self.entries.insert(
            (satid, key2),
            SatelliteRecord {
                scale,
                udre,
                psc,
                rrc,
                tick,
                updates,
            },
        );
    }

    /// Drops entries last updated before `tick` minus the eviction
    /// horizon.
    pub fn cleanup(&mut self, tick: u64, label: u8) {
        let horizon = tick.saturating_sub(REMOVE_OLD_TICKS);
        self.entries.retain(|&(satid, key2), record| {
            if record.tick < horizon {
                debug!(
                    "T{} store del {} ({}, {}) {}",
                    label, tick, satid, key2, record.updates
                );
                false
            } else {
                true
            }
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&(u8, u8), &SatelliteRecord)> {
        self.entries.iter()
    }
}
