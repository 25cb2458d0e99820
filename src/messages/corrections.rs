//! Differential GPS pseudorange corrections (types 1 and 9)
use super::parsers::*;
use super::{pack_frames, DgpsMessageType, Frame};
use crate::errors::Result;
use nom::bits::{bits, complete::take as take_bits};
use nom::multi::count;
use nom::IResult;

/// Correction records recoverable from `frames` intact body frames.
/// Each full five-frame group carries three 40-bit records; a trailing
/// partial group carries none, one or two.
pub(crate) fn satellite_count(frames: usize) -> usize {
    frames / 5 * 3 + [0, 0, 1, 1, 2][frames % 5]
}

/// One satellite's 40-bit correction record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SatelliteCorrection {
    pub scale: u8,
    pub udre: u8,
    pub satid: u8,
    /// Pseudorange correction, metres.
    pub psc: f64,
    /// Range-rate correction, metres per second.
    pub rrc: f64,
    /// Issue of data of the ephemeris the correction applies to.
    pub iod: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionSet {
    pub satellites: Vec<SatelliteCorrection>,
}

impl DgpsMessageType for CorrectionSet {
    fn name(&self) -> &'static str {
        "Differential GPS Corrections"
    }

    fn parse(frames: &[Frame]) -> Result<Self> {
        let bytes = pack_frames(frames);
        let (_, satellites) = parse_satellites(&bytes, satellite_count(frames.len()))?;
        Ok(Self { satellites })
    }
}

fn parse_satellites(data: &[u8], total: usize) -> IResult<&[u8], Vec<SatelliteCorrection>> {
    bits(move |data| -> IResult<_, _> { count(parse_satellite, total)(data) })(data)
}

fn parse_satellite(data: (&[u8], usize)) -> IResult<(&[u8], usize), SatelliteCorrection> {
    let (data, scale) = take_bits(1u8)(data)?;
    let (data, udre) = take_bits(2u8)(data)?;
    let (data, satid) = take_bits(5u8)(data)?;
    let (data, psc) = signed_i32(data, 16)?;
    let (data, rrc) = signed_i32(data, 8)?;
    let (data, iod) = take_bits(8u8)(data)?;
    Ok((
        data,
        SatelliteCorrection {
            scale,
            udre,
            satid,
            psc: scale_psc(psc, scale),
            rrc: scale_rrc(rrc, scale),
            iod,
        },
    ))
}
