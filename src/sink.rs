//! Rendition of decoded records.

use std::io::Write;

use crate::messages::{DgpsMessage, Frame, MessageHeader};
use crate::store::SatelliteStore;

/// Receives decoded records in bit-stream order. Implementations other
/// than [TextSink] exist so tests can capture records without parsing
/// text.
pub trait Sink {
    /// A synchronised two-word header. `w1` and `w2` are the corrected
    /// shift-register words the header was read from.
    fn header(&mut self, count: u64, w1: u32, w2: u32, header: &MessageHeader);
    /// The body frames of a message and the record count recovered from
    /// them.
    fn frames(&mut self, msgtype: u8, msglen: u8, frames: &[Frame], records: usize);
    /// A message whose body carries no frames worth dumping.
    fn empty_message(&mut self, msgtype: u8, msglen: u8);
    /// A decoded message body.
    fn body(&mut self, msgtype: u8, message: &DgpsMessage);
    /// Store contents after a correction batch.
    fn store(&mut self, msgtype: u8, store: &SatelliteStore);
    /// A header announcing an unsupported message type.
    fn unknown(&mut self, msgtype: u8);
    /// End of the bit stream.
    fn done(&mut self);
}

/// Renders records as whitespace-separated text lines.
pub struct TextSink<W> {
    out: W,
    debug: bool,
}

impl<W: Write> TextSink<W> {
    /// `debug` includes the raw 32-bit register words in status lines.
    pub fn new(out: W, debug: bool) -> Self {
        Self { out, debug }
    }
}

impl<W: Write> Sink for TextSink<W> {
    fn header(&mut self, count: u64, w1: u32, w2: u32, header: &MessageHeader) {
        if self.debug {
            let _ = writeln!(
                self.out,
                "S {:>8} {:032b} {:032b} {} {} {:.1} {} {} {}",
                count,
                w1,
                w2,
                header.msgtype,
                header.stationid,
                header.mod_z,
                header.seq,
                header.msglen,
                header.stationhealth
            );
        } else {
            let _ = writeln!(
                self.out,
                "S {:>8} {} {} {:.1} {} {} {}",
                count,
                header.msgtype,
                header.stationid,
                header.mod_z,
                header.seq,
                header.msglen,
                header.stationhealth
            );
        }
        let _ = self.out.flush();
    }

    fn frames(&mut self, msgtype: u8, msglen: u8, frames: &[Frame], records: usize) {
        let hex: Vec<String> = frames.iter().map(|frame| format!("{:06x}", frame)).collect();
        let _ = writeln!(
            self.out,
            "type {:>2} message received: {} {:?} {}",
            msgtype, msglen, hex, records
        );
    }

    fn empty_message(&mut self, msgtype: u8, msglen: u8) {
        let _ = writeln!(self.out, "type {:>2} message received: {}", msgtype, msglen);
    }

    fn body(&mut self, msgtype: u8, message: &DgpsMessage) {
        match message {
            DgpsMessage::GpsCorrections(set) | DgpsMessage::GpsSubsetCorrections(set) => {
                for sat in &set.satellites {
                    let _ = writeln!(
                        self.out,
                        "T{}Sat {} {} {} {:.2} {:.3} {}",
                        msgtype, sat.satid, sat.scale, sat.udre, sat.psc, sat.rrc, sat.iod
                    );
                }
            }
            DgpsMessage::GlonassCorrections(set) => {
                for sat in &set.satellites {
                    let _ = writeln!(
                        self.out,
                        "T{}Sat {} {} {} {:.2} {:.3} {} {}",
                        msgtype, sat.satid, sat.scale, sat.udre, sat.psc, sat.rrc, sat.r, sat.tb
                    );
                }
            }
            DgpsMessage::ReferencePosition(Some(position)) => {
                let _ = writeln!(
                    self.out,
                    "T{} {:?} {:?} {:?}",
                    msgtype, position.x, position.y, position.z
                );
            }
            DgpsMessage::ReferencePosition(None) => {}
            DgpsMessage::ConstellationHealth(health) => {
                for sat in &health.satellites {
                    let _ = writeln!(
                        self.out,
                        "T{} {} {} {} {} {} {} {} {} {} {}",
                        msgtype,
                        sat.satid,
                        sat.iod,
                        sat.health,
                        sat.cno,
                        sat.health_enable,
                        sat.new_nav_data,
                        sat.loss_warning,
                        sat.time_to_unhealthy,
                        sat.reserved,
                        sat.unassigned
                    );
                }
            }
            DgpsMessage::BeaconAlmanac(almanac) | DgpsMessage::GlonassBeaconAlmanac(almanac) => {
                for entry in &almanac.entries {
                    let _ = writeln!(
                        self.out,
                        "T{} {:.7} {:.7} {} {:?} {} {} {} {} {} {}",
                        msgtype,
                        entry.latitude,
                        entry.longitude,
                        entry.range,
                        entry.frequency,
                        entry.health,
                        entry.stationid,
                        entry.bitrate,
                        entry.modulation,
                        entry.sync_type,
                        entry.coding
                    );
                }
            }
            DgpsMessage::RadioAlmanac(almanac) => {
                for entry in &almanac.entries {
                    let _ = writeln!(
                        self.out,
                        "T{} {:.7} {:.7} {} {} {:?} {} {} {} {} {} {} {} {}",
                        msgtype,
                        entry.latitude,
                        entry.longitude,
                        entry.refid1,
                        entry.refid2,
                        entry.frequency,
                        entry.op,
                        entry.bitrate,
                        entry.dat,
                        entry.r,
                        entry.bc,
                        entry.integrity,
                        entry.constellations,
                        entry.name
                    );
                }
            }
            DgpsMessage::SpecialMessage(message) => {
                let _ = writeln!(self.out, "T{} {}", msgtype, message.text);
            }
            DgpsMessage::NullFrame | DgpsMessage::Unknown(_) => {}
        }
    }

    fn store(&mut self, msgtype: u8, store: &SatelliteStore) {
        if store.is_empty() {
            return;
        }
        for (&(satid, key2), record) in store.iter() {
            let _ = writeln!(
                self.out,
                "T{} {} {:>6} {:>6} {:>6} {:>6} {:>6.2} {:>6.2} {:>6}",
                msgtype,
                record.tick,
                satid,
                key2,
                record.scale,
                record.udre,
                record.psc,
                record.rrc,
                record.updates
            );
        }
        let _ = writeln!(self.out, "T{}-----------", msgtype);
    }

    fn unknown(&mut self, msgtype: u8) {
        let _ = writeln!(self.out, "unknown type {}", msgtype);
    }

    fn done(&mut self) {
        let _ = writeln!(self.out, "done");
        let _ = self.out.flush();
    }
}
