//! Byte order helpers for 16-bit pixel planes
//!
//! Planes cross the session boundary as raw big-endian byte pairs, matching the
//! `BigEndian="true"` declaration on every Pixels block of the model.

/// Converts 16-bit samples into their big-endian byte representation.
pub fn samples_to_be_bytes(samples: &[u16]) -> Vec<u8> {
    samples.iter().flat_map(|&sample| sample.to_be_bytes()).collect()
}

/// Reassembles big-endian byte pairs into 16-bit samples.
///
/// A trailing odd byte is ignored; callers check the buffer length first.
pub fn be_bytes_to_samples(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect()
}
