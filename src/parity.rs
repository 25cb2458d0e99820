//! M.823 (32,26) word parity and D30* polarity correction.
//!
//! Each 30-bit word carries 24 data bits and 6 parity bits, preceded in
//! the 32-bit shift container by the previous word's two trailing bits.
//! The parity generator covers those pre-bits, so the same masks verify
//! a word wherever it sits in the stream.

/// XOR masks generating the six parity bits, most significant first.
const PARITY_MASKS: [u32; 6] = [
    0xBB1F_3480,
    0x5D8F_9A40,
    0xAEC7_CD00,
    0x5763_E680,
    0x6BB1_F340,
    0x8B7A_89C0,
];

/// The 24 data bits of a shifted word (bits 29..=6).
pub const DATA_MASK: u32 = 0x3FFF_FFC0;

/// The parity bits of a shifted word (bits 5..=0).
pub const PARITY_MASK: u32 = 0x0000_003F;

/// The trailing pre-bit of the previous word (D30*), bit 30.
const D30_BIT: u32 = 0x4000_0000;

/// Computes the six parity bits of a 32-bit shifted word, packed
/// MSB-first into the low bits of the result.
pub fn parity(word: u32) -> u32 {
    PARITY_MASKS
        .iter()
        .fold(0, |acc, &mask| (acc << 1) | ((word & mask).count_ones() & 1))
}

/// Undoes the D30* inversion: when the previous word ended in a one, the
/// current word's data bits arrive complemented.
pub fn correct(word: u32) -> u32 {
    if word & D30_BIT != 0 {
        word ^ DATA_MASK
    } else {
        word
    }
}

/// True when the word's parity bits match the parity of its corrected
/// form.
pub fn parity_ok(word: u32) -> bool {
    parity(correct(word)) == word & PARITY_MASK
}
