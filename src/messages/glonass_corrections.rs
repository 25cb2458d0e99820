//! Differential GLONASS pseudorange corrections (type 31)
use super::corrections::satellite_count;
use super::parsers::*;
use super::{pack_frames, DgpsMessageType, Frame};
use crate::errors::Result;
use nom::bits::{bits, complete::take as take_bits};
use nom::multi::count;
use nom::IResult;

/// One satellite's 40-bit correction record. The GPS issue-of-data byte
/// is replaced by a change flag and the GLONASS ephemeris time `tb`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlonassSatelliteCorrection {
    pub scale: u8,
    pub udre: u8,
    pub satid: u8,
    /// Pseudorange correction, metres.
    pub psc: f64,
    /// Range-rate correction, metres per second.
    pub rrc: f64,
    /// Ephemeris change flag.
    pub r: u8,
    /// Ephemeris time index keying the correction.
    pub tb: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlonassCorrectionSet {
    pub satellites: Vec<GlonassSatelliteCorrection>,
}

impl DgpsMessageType for GlonassCorrectionSet {
    fn name(&self) -> &'static str {
        "Differential GLONASS Corrections"
    }

    fn parse(frames: &[Frame]) -> Result<Self> {
        let bytes = pack_frames(frames);
        let (_, satellites) = parse_satellites(&bytes, satellite_count(frames.len()))?;
        Ok(Self { satellites })
    }
}

fn parse_satellites(data: &[u8], total: usize) -> IResult<&[u8], Vec<GlonassSatelliteCorrection>> {
    bits(move |data| -> IResult<_, _> { count(parse_satellite, total)(data) })(data)
}

fn parse_satellite(data: (&[u8], usize)) -> IResult<(&[u8], usize), GlonassSatelliteCorrection> {
    let (data, scale) = take_bits(1u8)(data)?;
    let (data, udre) = take_bits(2u8)(data)?;
    let (data, satid) = take_bits(5u8)(data)?;
    let (data, psc) = signed_i32(data, 16)?;
    let (data, rrc) = signed_i32(data, 8)?;
    let (data, r) = take_bits(1u8)(data)?;
    let (data, tb) = take_bits(7u8)(data)?;
    Ok((
        data,
        GlonassSatelliteCorrection {
            scale,
            udre,
            satid,
            psc: scale_psc(psc, scale),
            rrc: scale_rrc(rrc, scale),
            r,
            tb,
        },
    ))
}
