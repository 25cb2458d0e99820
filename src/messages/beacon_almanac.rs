//! Radiobeacon almanac (types 7 and 35)
use super::parsers::*;
use super::{pack_frames, DgpsMessageType, Frame};
use crate::errors::Result;
use nom::bits::{bits, complete::take as take_bits};
use nom::combinator::map;
use nom::multi::count;
use nom::IResult;

/// Broadcast rates by 3-bit code; negative values flag reserved codes.
const BITRATES: [i16; 8] = [25, 50, 100, -3, 150, 200, -6, -7];

/// One almanac entry, three frames (72 bits) on air.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeaconAlmanacEntry {
    /// Degrees, positive north.
    pub latitude: f64,
    /// Degrees, positive east.
    pub longitude: f64,
    /// Service range, kilometres.
    pub range: u16,
    /// Transmission frequency, kHz.
    pub frequency: f64,
    pub health: u8,
    pub stationid: u16,
    /// Bits per second; negative for reserved codes.
    pub bitrate: i16,
    pub modulation: u8,
    pub sync_type: u8,
    pub coding: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BeaconAlmanac {
    pub entries: Vec<BeaconAlmanacEntry>,
}

impl DgpsMessageType for BeaconAlmanac {
    fn name(&self) -> &'static str {
        "Radiobeacon Almanac"
    }

    fn parse(frames: &[Frame]) -> Result<Self> {
        let complete = frames.len() / 3 * 3;
        let bytes = pack_frames(&frames[..complete]);
        let (_, entries) = parse_entries(&bytes, complete / 3)?;
        Ok(Self { entries })
    }
}

fn parse_entries(data: &[u8], total: usize) -> IResult<&[u8], Vec<BeaconAlmanacEntry>> {
    bits(move |data| -> IResult<_, _> { count(parse_entry, total)(data) })(data)
}

fn parse_entry(data: (&[u8], usize)) -> IResult<(&[u8], usize), BeaconAlmanacEntry> {
    let (data, latitude) = map(|data| signed_i32(data, 16), scale_latitude)(data)?;
    let (data, longitude) = map(|data| signed_i32(data, 16), scale_longitude)(data)?;
    let (data, range) = take_bits(10u16)(data)?;
    let (data, frequency) = map(take_bits::<_, u16, _, _>(12u8), scale_frequency)(data)?;
    let (data, health) = take_bits(3u8)(data)?;
    let (data, stationid) = take_bits(9u16)(data)?;
    let (data, bitrate) = map(take_bits::<_, usize, _, _>(3u8), |code| BITRATES[code])(data)?;
    let (data, modulation) = take_bits(1u8)(data)?;
    let (data, sync_type) = take_bits(1u8)(data)?;
    let (data, coding) = take_bits(1u8)(data)?;
    Ok((
        data,
        BeaconAlmanacEntry {
            latitude,
            longitude,
            range,
            frequency,
            health,
            stationid,
            bitrate,
            modulation,
            sync_type,
            coding,
        },
    ))
}
