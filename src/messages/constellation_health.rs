//! GPS constellation health (type 5)
use super::{pack_frames, DgpsMessageType, Frame};
use crate::errors::Result;
use nom::bits::{bits, complete::take as take_bits};
use nom::combinator::map;
use nom::multi::count;
use nom::IResult;

/// One satellite's health record; each body frame carries exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SatelliteHealth {
    pub reserved: u8,
    pub satid: u8,
    /// Issue of data link.
    pub iod: u8,
    /// Navigation data health bits.
    pub health: u8,
    /// Carrier-to-noise density in dB(Hz); zero means not tracked.
    pub cno: u8,
    pub health_enable: u8,
    pub new_nav_data: u8,
    pub loss_warning: u8,
    /// Seconds until the satellite is flagged unhealthy.
    pub time_to_unhealthy: u16,
    pub unassigned: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstellationHealth {
    pub satellites: Vec<SatelliteHealth>,
}

impl DgpsMessageType for ConstellationHealth {
    fn name(&self) -> &'static str {
        "GPS Constellation Health"
    }

    fn parse(frames: &[Frame]) -> Result<Self> {
        let bytes = pack_frames(frames);
        let (_, satellites) = parse_satellites(&bytes, frames.len())?;
        Ok(Self { satellites })
    }
}

fn parse_satellites(data: &[u8], total: usize) -> IResult<&[u8], Vec<SatelliteHealth>> {
    bits(move |data| -> IResult<_, _> { count(parse_satellite, total)(data) })(data)
}

fn parse_satellite(data: (&[u8], usize)) -> IResult<(&[u8], usize), SatelliteHealth> {
    let (data, reserved) = take_bits(1u8)(data)?;
    let (data, satid) = take_bits(5u8)(data)?;
    let (data, iod) = take_bits(1u8)(data)?;
    let (data, health) = take_bits(3u8)(data)?;
    let (data, cno) = map(take_bits::<_, u8, _, _>(5u8), scale_cno)(data)?;
    let (data, health_enable) = take_bits(1u8)(data)?;
    let (data, new_nav_data) = take_bits(1u8)(data)?;
    let (data, loss_warning) = take_bits(1u8)(data)?;
    let (data, time_to_unhealthy) =
        map(take_bits::<_, u16, _, _>(4u8), |raw| raw * 300)(data)?;
    let (data, unassigned) = take_bits(2u8)(data)?;
    Ok((
        data,
        SatelliteHealth {
            reserved,
            satid,
            iod,
            health,
            cno,
            health_enable,
            new_nav_data,
            loss_warning,
            time_to_unhealthy,
            unassigned,
        },
    ))
}

/// C/N0: 0 means untracked, otherwise the carrier rides 24 dB(Hz) above
/// the 5-bit field.
fn scale_cno(raw: u8) -> u8 {
    match raw {
        0 => 0,
        _ => raw + 24,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::BitPacker;

    #[test]
    fn one_record_per_frame() {
        let mut packer = BitPacker::new();
        // reserved, satid, iod, health, cno, enable, new, loss, ttu, unassigned
        packer
            .push(0, 1)
            .push(7, 5)
            .push(1, 1)
            .push(2, 3)
            .push(20, 5)
            .push(1, 1)
            .push(0, 1)
            .push(1, 1)
            .push(3, 4)
            .push(0, 2);
        packer
            .push(1, 1)
            .push(19, 5)
            .push(0, 1)
            .push(0, 3)
            .push(0, 5)
            .push(0, 1)
            .push(1, 1)
            .push(0, 1)
            .push(0, 4)
            .push(2, 2);
        let frames = packer.frames();
        assert_eq!(frames.len(), 2);

        let health = ConstellationHealth::parse(&frames).unwrap();
        assert_eq!(health.satellites.len(), 2);

        let first = health.satellites[0];
        assert_eq!(first.satid, 7);
        assert_eq!(first.iod, 1);
        assert_eq!(first.health, 2);
        assert_eq!(first.cno, 44);
        assert_eq!(first.loss_warning, 1);
        assert_eq!(first.time_to_unhealthy, 900);

        let second = health.satellites[1];
        assert_eq!(second.satid, 19);
        // Untracked satellites report no carrier level.
        assert_eq!(second.cno, 0);
        assert_eq!(second.time_to_unhealthy, 0);
        assert_eq!(second.unassigned, 2);
    }

    #[test]
    fn empty_body() {
        let health = ConstellationHealth::parse(&[]).unwrap();
        assert!(health.satellites.is_empty());
    }
}
