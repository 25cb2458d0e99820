//! Reference station ECEF position (type 3)
use super::parsers::signed_i32;
use super::{pack_frames, DgpsMessageType, Frame};
use crate::errors::Result;
use nom::bits::bits;
use nom::IResult;

/// Earth-centred, earth-fixed station coordinates in metres, carried on
/// air in centimetres as three signed 32-bit components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EcefPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl DgpsMessageType for EcefPosition {
    fn name(&self) -> &'static str {
        "Reference Station Parameters"
    }

    fn parse(frames: &[Frame]) -> Result<Self> {
        if frames.len() < 4 {
            return Err("truncated station position body".into());
        }
        let bytes = pack_frames(&frames[..4]);
        let (_, position) = parse_position(&bytes)?;
        Ok(position)
    }
}

fn parse_position(data: &[u8]) -> IResult<&[u8], EcefPosition> {
    bits(move |data| -> IResult<_, _> {
        let (data, x) = signed_i32(data, 32)?;
        let (data, y) = signed_i32(data, 32)?;
        let (data, z) = signed_i32(data, 32)?;
        Ok((
            data,
            EcefPosition {
                x: f64::from(x) / 100.0,
                y: f64::from(y) / 100.0,
                z: f64::from(z) / 100.0,
            },
        ))
    })(data)
}
