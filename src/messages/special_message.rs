//! GLONASS free-text special message (type 36)
use super::{pack_frames, DgpsMessageType, Frame};
use crate::errors::Result;

/// Unicode offset of the upper half of the M.823 8-bit code page
/// (0x80 maps to U+0410, Cyrillic А).
const CYRILLIC_OFFSET: u32 = 0x390;

/// Free text carried three 8-bit characters per frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialMessage {
    pub text: String,
}

impl DgpsMessageType for SpecialMessage {
    fn name(&self) -> &'static str {
        "GLONASS Special Message"
    }

    fn parse(frames: &[Frame]) -> Result<Self> {
        let text = pack_frames(frames).iter().map(|&byte| remap(byte)).collect();
        Ok(Self { text })
    }
}

/// Maps the broadcast code page to Unicode: ASCII below 0x80, Cyrillic
/// above (table 4 of the recommendation).
fn remap(byte: u8) -> char {
    if byte < 128 {
        char::from(byte)
    } else {
        char::from_u32(u32::from(byte) + CYRILLIC_OFFSET).unwrap_or(char::REPLACEMENT_CHARACTER)
    }
}
