//! The bit-synchronous frame decoder and message dispatcher.
//!
//! A continuously running shift register ingests the stream one bit at a
//! time. Whenever both register words pass parity and the corrected
//! upper payload opens with the 0x66 preamble, the two words are a
//! message header; the body is then pulled through the same register one
//! 30-bit frame at a time. A parity failure while streaming is silent:
//! the register keeps shifting until the next independently valid header
//! pair. A parity failure inside a body truncates it to the intact
//! prefix.

use log::{error, trace};

use crate::errors::Result;
use crate::messages::{self, DgpsMessage, Frame, MessageHeader, PREAMBLE};
use crate::parity;
use crate::register::ShiftRegister;
use crate::sink::Sink;
use crate::source::BitSource;
use crate::store::SatelliteStore;

/// Minimum ticks between cleanup sweeps of one store.
const CLEANUP_INTERVAL_TICKS: u64 = 1000;

/// Decodes a DGPS broadcast bit stream into records on a [Sink].
pub struct Decoder<S, K> {
    source: S,
    sink: K,
    register: ShiftRegister,
    /// Bits consumed so far; the time base for store eviction.
    count: u64,
    gps_store: SatelliteStore,
    glonass_store: SatelliteStore,
    last_gps_cleanup: u64,
    last_glonass_cleanup: u64,
}

impl<S: BitSource, K: Sink> Decoder<S, K> {
    pub fn new(source: S, sink: K) -> Self {
        Self {
            source,
            sink,
            register: ShiftRegister::new(),
            count: 0,
            gps_store: SatelliteStore::new(),
            glonass_store: SatelliteStore::new(),
            last_gps_cleanup: 0,
            last_glonass_cleanup: 0,
        }
    }

    /// Runs until the bit source closes.
    pub fn run(&mut self) {
        loop {
            let bits = self.source.get(1);
            let Some(&bit) = bits.first() else { break };
            self.count += 1;
            self.register.push(bit);

            if !self.register.parity_ok() {
                continue;
            }

            let w2r = self.register.w2_payload();
            if w2r >> 16 != PREAMBLE {
                trace!(
                    "{:>8} {:032b} {:032b}",
                    self.count,
                    self.register.w1_corrected(),
                    self.register.w2_corrected()
                );
                continue;
            }

            match MessageHeader::parse(w2r, self.register.w1_payload()) {
                Ok(header) => {
                    self.sink.header(
                        self.count,
                        self.register.w1_corrected(),
                        self.register.w2_corrected(),
                        &header,
                    );
                    if let Err(err) = self.dispatch(&header) {
                        error!("type {} message discarded: {}", header.msgtype, err);
                    }
                }
                Err(err) => error!("header discarded: {}", err),
            }
        }
        self.sink.done();
    }

    /// Bits consumed from the source.
    pub fn bit_count(&self) -> u64 {
        self.count
    }

    pub fn into_sink(self) -> K {
        self.sink
    }

    /// Routes a synchronised header. Bodies whose announced length
    /// violates the type's constraint are not read at all; the stream
    /// re-acquires sync on its own.
    fn dispatch(&mut self, header: &MessageHeader) -> Result<()> {
        let msglen = usize::from(header.msglen);
        match header.msgtype {
            1 | 31 if !matches!(msglen % 5, 0 | 2 | 4) => Ok(()),
            3 if msglen != 4 => Ok(()),
            6 => {
                if msglen > 1 {
                    return Ok(());
                }
                self.sink.empty_message(6, header.msglen);
                if msglen == 1 {
                    self.read_frames(1);
                }
                Ok(())
            }
            5 | 36 if msglen == 0 => {
                self.sink.empty_message(header.msgtype, 0);
                Ok(())
            }
            7 | 35 if msglen % 3 != 0 => Ok(()),
            9 if !matches!(msglen, 2 | 4 | 5) => Ok(()),
            27 if msglen % 6 != 0 => Ok(()),
            1 | 3 | 5 | 7 | 9 | 27 | 31 | 35 | 36 => self.handle_body(header),
            unknown => {
                self.sink.unknown(unknown);
                Ok(())
            }
        }
    }

    fn handle_body(&mut self, header: &MessageHeader) -> Result<()> {
        let frames = self.read_frames(usize::from(header.msglen));
        let message = messages::parse(header.msgtype, &frames)?;
        self.sink
            .frames(header.msgtype, header.msglen, &frames, message.record_count());
        self.sink.body(header.msgtype, &message);
        self.apply_stores(header.msgtype, &message);
        Ok(())
    }

    /// Reads up to `max` frames through the shift register, verifying
    /// each word's parity and stopping at the first corrupted one.
    /// Advances the tick counter by 30 per intact frame.
    fn read_frames(&mut self, max: usize) -> Vec<Frame> {
        let mut frames = Vec::with_capacity(max);
        for _ in 0..max {
            let bits = self.source.get(30);
            if bits.len() < 30 {
                break;
            }
            for &bit in &bits {
                self.register.push(bit);
            }
            if !parity::parity_ok(self.register.w1()) {
                break;
            }
            frames.push(self.register.w1_payload());
        }
        self.count += frames.len() as u64 * 30;
        frames
    }

    fn apply_stores(&mut self, msgtype: u8, message: &DgpsMessage) {
        match message {
            DgpsMessage::GpsCorrections(set) | DgpsMessage::GpsSubsetCorrections(set) => {
                // Evict before updating so a stale entry for a key seen
                // again in this batch starts a fresh update count.
                if self.count - self.last_gps_cleanup > CLEANUP_INTERVAL_TICKS {
                    self.last_gps_cleanup = self.count;
                    self.gps_store.cleanup(self.count, msgtype);
                }
                for sat in &set.satellites {
                    self.gps_store.update(
                        sat.satid, sat.iod, sat.scale, sat.udre, sat.psc, sat.rrc, self.count,
                        msgtype,
                    );
                }
                self.sink.store(msgtype, &self.gps_store);
            }
            DgpsMessage::GlonassCorrections(set) => {
                if self.count - self.last_glonass_cleanup > CLEANUP_INTERVAL_TICKS {
                    self.last_glonass_cleanup = self.count;
                    self.glonass_store.cleanup(self.count, msgtype);
                }
                for sat in &set.satellites {
                    self.glonass_store.update(
                        sat.satid, sat.tb, sat.scale, sat.udre, sat.psc, sat.rrc, self.count,
                        msgtype,
                    );
                }
                self.sink.store(msgtype, &self.glonass_store);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::corrections::{CorrectionSet, SatelliteCorrection};
    use crate::messages::radio_almanac::{RadioAlmanac, RadioAlmanacEntry};
    use crate::messages::reference_position::EcefPosition;
    use crate::messages::special_message::SpecialMessage;
    use crate::source::ReadBitSource;
    use crate::test_helpers::{BitPacker, Event, RecordingSink, StreamBuilder};
    use std::io::Cursor;

    fn decode(bits: Vec<u8>) -> (Vec<Event>, u64) {
        let mut decoder = Decoder::new(
            ReadBitSource::new(Cursor::new(bits)),
            RecordingSink::default(),
        );
        decoder.run();
        let count = decoder.bit_count();
        (decoder.into_sink().events, count)
    }

    fn header(msgtype: u8, msglen: u8) -> MessageHeader {
        MessageHeader {
            msgtype,
            stationid: 0,
            mod_z: 0.0,
            seq: 0,
            msglen,
            stationhealth: 0,
        }
    }

    fn subset_correction_frames() -> Vec<Frame> {
        let mut packer = BitPacker::new();
        packer
            .satellite(0, 0, 1, 100, 10)
            .push(7, 8)
            .satellite(1, 0, 2, -100, -10)
            .push(8, 8)
            .satellite(0, 0, 3, 0, 0)
            .push(0, 8);
        packer.frames()
    }

    #[test]
    fn sync_then_null_message() {
        let mut builder = StreamBuilder::new();
        builder.header(6, 0, 0, 0, 0, 0);
        let total = builder.len() as u64;

        let (events, count) = decode(builder.build());
        assert_eq!(count, total);
        assert_eq!(
            events,
            vec![
                Event::Header {
                    count: total,
                    header: header(6, 0),
                },
                Event::EmptyMessage {
                    msgtype: 6,
                    msglen: 0,
                },
                Event::Done,
            ]
        );
    }

    #[test]
    fn reference_position_message() {
        let mut packer = BitPacker::new();
        packer.push(10000, 32).push(0xFFFF_D8F0, 32).push(0, 32);
        let frames = packer.frames();

        let mut builder = StreamBuilder::new();
        builder.header(3, 0, 0, 0, 4, 0).body(&frames);
        let total = builder.len() as u64;

        let (events, count) = decode(builder.build());
        assert_eq!(count, total);
        assert_eq!(
            events,
            vec![
                Event::Header {
                    count: total - 120,
                    header: header(3, 4),
                },
                Event::Frames {
                    msgtype: 3,
                    msglen: 4,
                    frames,
                    records: 1,
                },
                Event::Body {
                    msgtype: 3,
                    message: DgpsMessage::ReferencePosition(Some(EcefPosition {
                        x: 100.0,
                        y: -100.0,
                        z: 0.0,
                    })),
                },
                Event::Done,
            ]
        );
    }

    #[test]
    fn subset_corrections_fill_the_store() {
        let frames = subset_correction_frames();
        let mut builder = StreamBuilder::new();
        builder.header(9, 0, 0, 0, 5, 0).body(&frames);
        let total = builder.len() as u64;

        let (events, count) = decode(builder.build());
        assert_eq!(count, total);

        let expected_set = CorrectionSet {
            satellites: vec![
                SatelliteCorrection {
                    scale: 0,
                    udre: 0,
                    satid: 1,
                    psc: 2.0,
                    rrc: 0.02,
                    iod: 7,
                },
                SatelliteCorrection {
                    scale: 1,
                    udre: 0,
                    satid: 2,
                    psc: -32.0,
                    rrc: -0.32,
                    iod: 8,
                },
                SatelliteCorrection {
                    scale: 0,
                    udre: 0,
                    satid: 3,
                    psc: 0.0,
                    rrc: 0.0,
                    iod: 0,
                },
            ],
        };
        assert_eq!(
            events,
            vec![
                Event::Header {
                    count: total - 150,
                    header: header(9, 5),
                },
                Event::Frames {
                    msgtype: 9,
                    msglen: 5,
                    frames,
                    records: 3,
                },
                Event::Body {
                    msgtype: 9,
                    message: DgpsMessage::GpsSubsetCorrections(expected_set),
                },
                Event::Store {
                    msgtype: 9,
                    entries: vec![(1, 7, total, 1), (2, 8, total, 1), (3, 0, total, 1)],
                },
                Event::Done,
            ]
        );
    }

    #[test]
    fn corrupted_body_keeps_intact_prefix() {
        let frames = subset_correction_frames();
        let mut builder = StreamBuilder::new();
        builder.header(9, 0, 0, 0, 5, 0).body(&frames);
        // Flip a data bit of the third body frame.
        builder.flip(32 + 60 + 60 + 10);

        let (events, count) = decode(builder.build());
        // The two intact frames count 60 ticks; the corrupted frame's 30
        // bits are consumed uncounted; the last two frames stream back
        // through the bit-by-bit loop.
        let sync = 32 + 60;
        assert_eq!(count, (sync + 60 + 60) as u64);

        assert_eq!(events.len(), 5);
        assert_eq!(
            events[1],
            Event::Frames {
                msgtype: 9,
                msglen: 5,
                frames: frames[..2].to_vec(),
                records: 1,
            }
        );
        match &events[2] {
            Event::Body {
                msgtype: 9,
                message: DgpsMessage::GpsSubsetCorrections(set),
            } => {
                assert_eq!(set.satellites.len(), 1);
                assert_eq!(set.satellites[0].satid, 1);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(
            events[3],
            Event::Store {
                msgtype: 9,
                entries: vec![(1, 7, (sync + 60) as u64, 1)],
            }
        );
    }

    #[test]
    fn radio_almanac_station_name() {
        let mut packer = BitPacker::new();
        packer
            .push(0, 16)
            .push(0, 16)
            .push(0, 10)
            .push(0, 12)
            .push(0, 2)
            .push(0, 10)
            .push(0, 3)
            .push(0, 1)
            .push(0, 1)
            .push(0, 1)
            .push(0, 2)
            .push(0, 7);
        for &byte in b"DGPS" {
            packer.push(byte.into(), 7);
        }
        for _ in 0..5 {
            packer.push(0, 7);
        }
        let frames = packer.frames();
        assert_eq!(frames.len(), 6);

        let mut builder = StreamBuilder::new();
        builder.header(27, 0, 0, 0, 6, 0).body(&frames);

        let (events, _) = decode(builder.build());
        assert_eq!(
            events[2],
            Event::Body {
                msgtype: 27,
                message: DgpsMessage::RadioAlmanac(RadioAlmanac {
                    entries: vec![RadioAlmanacEntry {
                        latitude: 0.0,
                        longitude: 0.0,
                        refid1: 0,
                        refid2: 0,
                        frequency: 190.0,
                        op: 0,
                        bitrate: 25,
                        dat: 0,
                        r: 0,
                        bc: 0,
                        integrity: 0,
                        constellations: 0,
                        name: "DGPS_____".into(),
                    }],
                }),
            }
        );
    }

    #[test]
    fn stale_entry_evicted_before_reinsert() {
        let mut packer = BitPacker::new();
        packer.satellite(0, 0, 1, 100, 10).push(7, 8);
        let frames = packer.frames();
        assert_eq!(frames.len(), 2);

        let mut builder = StreamBuilder::new();
        builder.header(9, 0, 0, 0, 2, 0).body(&frames);
        builder.ticks(6000);
        builder.header(9, 0, 0, 0, 2, 0).body(&frames);

        let (events, count) = decode(builder.build());

        let stores: Vec<_> = events
            .iter()
            .filter(|event| matches!(event, Event::Store { .. }))
            .collect();
        assert_eq!(stores.len(), 2);
        assert_eq!(
            stores[0],
            &Event::Store {
                msgtype: 9,
                entries: vec![(1, 7, 152, 1)],
            }
        );
        // The 6000 idle ticks outlived the eviction horizon: the old
        // entry is dropped before the refresh, not counted up.
        assert_eq!(
            stores[1],
            &Event::Store {
                msgtype: 9,
                entries: vec![(1, 7, count, 1)],
            }
        );
    }

    #[test]
    fn special_message_then_empty_health() {
        let mut builder = StreamBuilder::new();
        builder.header(36, 0, 0, 0, 1, 0).body(&[0x414243]);
        builder.header(5, 0, 0, 0, 0, 0);
        let total = builder.len() as u64;

        let (events, count) = decode(builder.build());
        assert_eq!(count, total);
        assert_eq!(
            events,
            vec![
                Event::Header {
                    count: 92,
                    header: header(36, 1),
                },
                Event::Frames {
                    msgtype: 36,
                    msglen: 1,
                    frames: vec![0x414243],
                    records: 1,
                },
                Event::Body {
                    msgtype: 36,
                    message: DgpsMessage::SpecialMessage(SpecialMessage {
                        text: "ABC".into(),
                    }),
                },
                Event::Header {
                    count: total,
                    header: header(5, 0),
                },
                Event::EmptyMessage {
                    msgtype: 5,
                    msglen: 0,
                },
                Event::Done,
            ]
        );
    }

    #[test]
    fn invalid_length_skips_body() {
        let mut builder = StreamBuilder::new();
        // A type 3 body must be exactly four frames.
        builder.header(3, 0, 0, 0, 3, 0);
        builder.ticks(40);
        builder.header(6, 0, 0, 0, 0, 0);
        let total = builder.len() as u64;

        let (events, _) = decode(builder.build());
        assert_eq!(
            events,
            vec![
                Event::Header {
                    count: 92,
                    header: header(3, 3),
                },
                Event::Header {
                    count: total,
                    header: header(6, 0),
                },
                Event::EmptyMessage {
                    msgtype: 6,
                    msglen: 0,
                },
                Event::Done,
            ]
        );
    }

    #[test]
    fn unknown_type_consumes_no_body() {
        let mut builder = StreamBuilder::new();
        builder.header(59, 0, 0, 0, 2, 0);
        let total = builder.len() as u64;

        let (events, count) = decode(builder.build());
        assert_eq!(count, total);
        assert_eq!(
            events,
            vec![
                Event::Header {
                    count: total,
                    header: header(59, 2),
                },
                Event::Unknown { msgtype: 59 },
                Event::Done,
            ]
        );
    }
}
