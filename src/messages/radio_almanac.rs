//! Extended radiobeacon almanac with station name (type 27)
//!
//! As transmitted in real networks this record differs from the draft
//! recommendation: the trailing text field carries an integrity test
//! indicator, a monitored-constellations mask and the station name as
//! nine 7-bit ASCII characters.
use super::parsers::*;
use super::{pack_frames, DgpsMessageType, Frame};
use crate::errors::Result;
use nom::bits::{bits, complete::take as take_bits};
use nom::combinator::map;
use nom::multi::count;
use nom::IResult;

/// Broadcast rates by 3-bit code; negative values flag reserved codes.
const BITRATES: [i16; 8] = [25, 50, 100, 200, -4, -5, -6, -7];

/// Characters in a station name.
const NAME_CHARS: usize = 9;

/// One almanac entry, six frames (144 bits) on air.
#[derive(Debug, Clone, PartialEq)]
pub struct RadioAlmanacEntry {
    /// Degrees, positive north.
    pub latitude: f64,
    /// Degrees, positive east.
    pub longitude: f64,
    /// Reference station id.
    pub refid1: u16,
    /// Id of the paired reference station.
    pub refid2: u16,
    /// Transmission frequency, kHz.
    pub frequency: f64,
    /// Operating mode.
    pub op: u8,
    /// Bits per second; negative for reserved codes.
    pub bitrate: i16,
    pub dat: u8,
    pub r: u8,
    pub bc: u8,
    /// Integrity test indicator.
    pub integrity: u8,
    /// Monitored constellations mask.
    pub constellations: u8,
    /// Station name; unset characters render as `_`.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadioAlmanac {
    pub entries: Vec<RadioAlmanacEntry>,
}

impl DgpsMessageType for RadioAlmanac {
    fn name(&self) -> &'static str {
        "Extended Radiobeacon Almanac"
    }

    fn parse(frames: &[Frame]) -> Result<Self> {
        let complete = frames.len() / 6 * 6;
        let bytes = pack_frames(&frames[..complete]);
        let (_, entries) = parse_entries(&bytes, complete / 6)?;
        Ok(Self { entries })
    }
}

fn parse_entries(data: &[u8], total: usize) -> IResult<&[u8], Vec<RadioAlmanacEntry>> {
    bits(move |data| -> IResult<_, _> { count(parse_entry, total)(data) })(data)
}

fn parse_entry(data: (&[u8], usize)) -> IResult<(&[u8], usize), RadioAlmanacEntry> {
    let (data, latitude) = map(|data| signed_i32(data, 16), scale_latitude)(data)?;
    let (data, longitude) = map(|data| signed_i32(data, 16), scale_longitude)(data)?;
    let (data, refid1) = take_bits(10u16)(data)?;
    let (data, frequency) = map(take_bits::<_, u16, _, _>(12u8), scale_frequency)(data)?;
    let (data, op) = take_bits(2u8)(data)?;
    let (data, refid2) = take_bits(10u16)(data)?;
    let (data, bitrate) = map(take_bits::<_, usize, _, _>(3u8), |code| BITRATES[code])(data)?;
    let (data, dat) = take_bits(1u8)(data)?;
    let (data, r) = take_bits(1u8)(data)?;
    let (data, bc) = take_bits(1u8)(data)?;
    let (data, integrity) = take_bits(2u8)(data)?;
    let (data, constellations) = take_bits(7u8)(data)?;
    let (data, name) = parse_name(data)?;
    Ok((
        data,
        RadioAlmanacEntry {
            latitude,
            longitude,
            refid1,
            refid2,
            frequency,
            op,
            bitrate,
            dat,
            r,
            bc,
            integrity,
            constellations,
            name,
        },
    ))
}

/// Nine 7-bit ASCII characters; zero marks an unset position.
fn parse_name(input: (&[u8], usize)) -> IResult<(&[u8], usize), String> {
    let (input, chars) = count(
        map(take_bits::<_, u8, _, _>(7u8), to_name_char),
        NAME_CHARS,
    )(input)?;
    Ok((input, chars.into_iter().collect()))
}

fn to_name_char(code: u8) -> char {
    match code {
        0 => '_',
        _ => char::from(code),
    }
}
