//! Specific DGPS message types
use crate::errors::*;
use nom::bits::{bits, complete::take as take_bits};
use nom::combinator::map;
use nom::IResult;

pub mod beacon_almanac;
pub mod constellation_health;
pub mod corrections;
pub mod glonass_corrections;
mod parsers;
pub mod radio_almanac;
pub mod reference_position;
pub mod special_message;

pub use parsers::sign_extend;

use beacon_almanac::BeaconAlmanac;
use constellation_health::ConstellationHealth;
use corrections::CorrectionSet;
use glonass_corrections::GlonassCorrectionSet;
use radio_almanac::RadioAlmanac;
use reference_position::EcefPosition;
use special_message::SpecialMessage;

/// The 24 payload bits of one 30-bit word.
pub type Frame = u32;

/// The fixed 8-bit pattern opening a header word pair.
pub const PREAMBLE: u32 = 0x66;

/// Contains all structured messages recognized by this crate
#[derive(Debug, Clone, PartialEq)]
pub enum DgpsMessage {
    /// Type 1: differential GPS corrections.
    GpsCorrections(CorrectionSet),
    /// Type 3: reference station ECEF position.
    ReferencePosition(Option<EcefPosition>),
    /// Type 5: GPS constellation health.
    ConstellationHealth(ConstellationHealth),
    /// Type 6: null frame.
    NullFrame,
    /// Type 7: radiobeacon almanac.
    BeaconAlmanac(BeaconAlmanac),
    /// Type 9: GPS corrections for a partial satellite set.
    GpsSubsetCorrections(CorrectionSet),
    /// Type 27: extended radiobeacon almanac with station name.
    RadioAlmanac(RadioAlmanac),
    /// Type 31: differential GLONASS corrections.
    GlonassCorrections(GlonassCorrectionSet),
    /// Type 35: GLONASS radiobeacon almanac.
    GlonassBeaconAlmanac(BeaconAlmanac),
    /// Type 36: GLONASS free-text special message.
    SpecialMessage(SpecialMessage),
    Unknown(u8),
}

/// Trait that describes specific types of DGPS messages
pub trait DgpsMessageType: Sized {
    /// The common name for the message type
    fn name(&self) -> &'static str;
    /// Converts a run of body frames into a structured, queryable version
    fn parse(frames: &[Frame]) -> Result<Self>;
}

impl DgpsMessage {
    /// Number of complete records recovered from the body frames.
    pub fn record_count(&self) -> usize {
        match self {
            Self::GpsCorrections(set) | Self::GpsSubsetCorrections(set) => set.satellites.len(),
            Self::ReferencePosition(position) => usize::from(position.is_some()),
            Self::ConstellationHealth(health) => health.satellites.len(),
            Self::NullFrame => 0,
            Self::BeaconAlmanac(almanac) | Self::GlonassBeaconAlmanac(almanac) => {
                almanac.entries.len()
            }
            Self::RadioAlmanac(almanac) => almanac.entries.len(),
            Self::GlonassCorrections(set) => set.satellites.len(),
            Self::SpecialMessage(message) => message.text.chars().count() / 3,
            Self::Unknown(_) => 0,
        }
    }
}

/// Given a message type and the intact prefix of its body frames, this
/// will return the structured message.
pub fn parse(msgtype: u8, frames: &[Frame]) -> Result<DgpsMessage> {
    match msgtype {
        1 => Ok(DgpsMessage::GpsCorrections(CorrectionSet::parse(frames)?)),
        3 => Ok(DgpsMessage::ReferencePosition(match frames.len() / 4 {
            0 => None,
            _ => Some(EcefPosition::parse(frames)?),
        })),
        5 => Ok(DgpsMessage::ConstellationHealth(ConstellationHealth::parse(frames)?)),
        6 => Ok(DgpsMessage::NullFrame),
        7 => Ok(DgpsMessage::BeaconAlmanac(BeaconAlmanac::parse(frames)?)),
        9 => Ok(DgpsMessage::GpsSubsetCorrections(CorrectionSet::parse(frames)?)),
        27 => Ok(DgpsMessage::RadioAlmanac(RadioAlmanac::parse(frames)?)),
        31 => Ok(DgpsMessage::GlonassCorrections(GlonassCorrectionSet::parse(frames)?)),
        35 => Ok(DgpsMessage::GlonassBeaconAlmanac(BeaconAlmanac::parse(frames)?)),
        36 => Ok(DgpsMessage::SpecialMessage(SpecialMessage::parse(frames)?)),
        unknown => Ok(DgpsMessage::Unknown(unknown)),
    }
}

/// Fields of the two-word message header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MessageHeader {
    pub msgtype: u8,
    pub stationid: u16,
    /// Modified Z-count, seconds.
    pub mod_z: f64,
    pub seq: u8,
    /// Body length in 30-bit frames.
    pub msglen: u8,
    pub stationhealth: u8,
}

impl MessageHeader {
    /// Decodes the header from the corrected 24-bit payloads of the two
    /// sync words: `w2r` is first on air, `w1r` second.
    pub fn parse(w2r: Frame, w1r: Frame) -> Result<Self> {
        let bytes = pack_frames(&[w2r, w1r]);
        let (_, header) = parse_header(&bytes)?;
        Ok(header)
    }
}

fn parse_header(data: &[u8]) -> IResult<&[u8], MessageHeader> {
    bits(move |data| -> IResult<_, _> {
        let (data, _preamble) = take_bits::<_, u8, _, _>(8u8)(data)?;
        let (data, msgtype) = take_bits(6u8)(data)?;
        let (data, stationid) = take_bits(10u16)(data)?;
        let (data, mod_z) = map(take_bits::<_, u16, _, _>(13u8), |raw| f64::from(raw) * 0.6)(data)?;
        let (data, seq) = take_bits(3u8)(data)?;
        let (data, msglen) = take_bits(5u8)(data)?;
        let (data, stationhealth) = take_bits(3u8)(data)?;
        Ok((
            data,
            MessageHeader {
                msgtype,
                stationid,
                mod_z,
                seq,
                msglen,
                stationhealth,
            },
        ))
    })(data)
}

/// Packs 24-bit payload frames into bytes, MSB first. Message bodies are
/// bit-, not byte-oriented; each frame contributes exactly three bytes,
/// so multi-frame records parse as one contiguous bit run.
pub fn pack_frames(frames: &[Frame]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(frames.len() * 3);
    for frame in frames {
        bytes.extend_from_slice(&[(frame >> 16) as u8, (frame >> 8) as u8, *frame as u8]);
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_frames_is_msb_first() {
        assert_eq!(pack_frames(&[0xABCDEF, 0x123456]), vec![0xAB, 0xCD, 0xEF, 0x12, 0x34, 0x56]);
    }

    #[test]
    fn header_field_split() {
        // preamble 0x66, msgtype 9, station 0x155
        let w2r = 0x66 << 16 | 9 << 10 | 0x155;
        // mod_z 600, seq 2, msglen 5, health 1
        let w1r = 600 << 11 | 2 << 8 | 5 << 3 | 1;
        let header = MessageHeader::parse(w2r, w1r).unwrap();
        assert_eq!(header.msgtype, 9);
        assert_eq!(header.stationid, 0x155);
        assert_eq!(header.mod_z, 360.0);
        assert_eq!(header.seq, 2);
        assert_eq!(header.msglen, 5);
        assert_eq!(header.stationhealth, 1);
    }

    #[test]
    fn unknown_type_is_tagged() {
        assert_eq!(parse(42, &[]).unwrap(), DgpsMessage::Unknown(42));
    }

    #[test]
    fn truncated_position_has_no_record() {
        let message = parse(3, &[0x000001, 0x000002]).unwrap();
        assert_eq!(message, DgpsMessage::ReferencePosition(None));
        assert_eq!(message.record_count(), 0);
    }
}
