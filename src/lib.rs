//! Decoder for the ITU-R M.823 DGPS beacon broadcast.
//!
//! The input is the 100/200 bps beacon data stream, delivered as a run of
//! bit-bytes (one byte per bit, low bit significant) over a UDP multicast
//! group or replayed from a capture file. The decoder hunts for the
//! two-word header synchronisation pattern in a rolling shift register,
//! checks the (32,26) word parity with D30* polarity correction, and
//! decodes the message bodies into structured records: pseudorange
//! corrections (GPS and GLONASS), reference station positions, station
//! almanacs, constellation health and GLONASS free-text messages.

pub mod decoder;
pub mod errors;
pub mod messages;
pub mod parity;
pub mod register;
pub mod sink;
pub mod source;
pub mod store;

#[cfg(test)]
pub mod test_helpers;
