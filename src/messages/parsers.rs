//! Common parsers
use nom::bits::complete::take as take_bits;
use nom::IResult;

/// Recovers a `width`-bit two's-complement value from its unsigned
/// carrier.
pub fn sign_extend(value: u32, width: u32) -> i32 {
    debug_assert!((1..=32).contains(&width));
    let shift = 32 - width;
    ((value << shift) as i32) >> shift
}

/// Takes `len` bits and sign-extends them.
pub fn signed_i32(input: (&[u8], usize), len: usize) -> IResult<(&[u8], usize), i32> {
    assert!(len <= ::std::mem::size_of::<i32>() * 8);
    let (input, num) = take_bits::<_, u32, _, _>(len)(input)?;
    Ok((input, sign_extend(num, len as u32)))
}

/// Rounds to `digits` decimal places.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

/// Pseudorange correction in metres: 0.02 m units, or 0.32 m when the
/// scale flag is set.
pub fn scale_psc(raw: i32, scale: u8) -> f64 {
    match scale {
        0 => round_to(f64::from(raw) * 0.02, 2),
        _ => round_to(f64::from(raw) * 0.32, 2),
    }
}

/// Range-rate correction in metres per second: 0.002 m/s units, or
/// 0.032 m/s when the scale flag is set.
pub fn scale_rrc(raw: i32, scale: u8) -> f64 {
    match scale {
        0 => round_to(f64::from(raw) * 0.002, 3),
        _ => round_to(f64::from(raw) * 0.032, 3),
    }
}

/// Latitude in degrees from its signed 16-bit carrier.
pub fn scale_latitude(raw: i32) -> f64 {
    f64::from(raw) * 0.002747
}

/// Longitude in degrees from its signed 16-bit carrier.
pub fn scale_longitude(raw: i32) -> f64 {
    f64::from(raw) * 0.005493
}

/// Beacon frequency in kHz from its 12-bit carrier.
pub fn scale_frequency(raw: u16) -> f64 {
    f64::from(raw) * 0.1 + 190.0
}
