//! Packed 5-bit waveform codec.
//!
//! Voice message metadata stores the loudness envelope as a bit-packed buffer:
//! each sample is 5 bits wide (values 0-31), written LSB-first across the byte
//! stream. Decoding reads 16-bit little-endian windows so a sample spanning a
//! byte boundary comes out in one shift-and-mask.

/// Maximum number of metadata bytes considered when rendering.
///
/// Longer buffers are cut here before decoding, matching the envelope length
/// voice messages carry in practice (63 bytes = 100 samples).
pub const WAVEFORM_MAX_BYTES: usize = 63;

/// Number of envelope samples generated when importing a local file.
pub const ENVELOPE_SAMPLES: usize = 100;

/// Decodes a packed 5-bit waveform buffer into per-sample amplitudes (0-31).
///
/// Produces exactly `floor(len * 8 / 5)` samples. An empty or sub-5-bit input
/// yields an empty vector; malformed input never errors. When the 16-bit
/// window for the last sample would run one byte past the end of the buffer,
/// the missing high byte is read as zero.
pub fn decode_waveform(waveform: &[u8]) -> Vec<u8> {
    let bit_count = waveform.len() * 8;
    let value_count = bit_count / 5;
    if value_count == 0 {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(value_count);
    for i in 0..value_count {
        let byte_index = i * 5 / 8;
        let bit_shift = i * 5 % 8;

        let window = if byte_index + 1 < waveform.len() {
            u16::from_le_bytes([waveform[byte_index], waveform[byte_index + 1]])
        } else {
            waveform[byte_index] as u16
        };

        result.push(((window >> bit_shift) & 0b0001_1111) as u8);
    }

    result
}

/// Encodes amplitudes (clamped to 0-31) into the packed 5-bit format.
///
/// Inverse of [`decode_waveform`]: sample `i` occupies bits `i*5 .. i*5+5`
/// of the output, LSB-first within each byte.
pub fn encode_waveform(samples: &[u8]) -> Vec<u8> {
    let bit_count = samples.len() * 5;
    let byte_count = bit_count.div_ceil(8);
    let mut result = vec![0u8; byte_count];

    for (i, &sample) in samples.iter().enumerate() {
        let value = (sample.min(31)) as u16;
        let byte_index = i * 5 / 8;
        let bit_shift = i * 5 % 8;

        result[byte_index] |= (value << bit_shift) as u8;
        if bit_shift > 3 && byte_index + 1 < byte_count {
            result[byte_index + 1] |= (value >> (8 - bit_shift)) as u8;
        }
    }

    result
}

/// Reduces PCM samples to a packed 5-bit loudness envelope.
///
/// Splits the signal into [`ENVELOPE_SAMPLES`] segments, takes the peak
/// amplitude of each, and scales against the global peak so the loudest
/// segment maps to 31. Silent input produces an all-zero envelope.
pub fn envelope_from_samples(samples: &[i16]) -> Vec<u8> {
    if samples.is_empty() {
        return encode_waveform(&[0u8; ENVELOPE_SAMPLES]);
    }

    let mut peaks = [0u32; ENVELOPE_SAMPLES];
    for (i, peak) in peaks.iter_mut().enumerate() {
        let start = i * samples.len() / ENVELOPE_SAMPLES;
        let end = ((i + 1) * samples.len() / ENVELOPE_SAMPLES).max(start + 1);
        *peak = samples[start..end.min(samples.len())]
            .iter()
            .map(|&s| (s as i32).unsigned_abs())
            .max()
            .unwrap_or(0);
    }

    let global_peak = peaks.iter().copied().max().unwrap_or(0).max(1);
    let scaled: Vec<u8> = peaks
        .iter()
        .map(|&p| ((p * 31) / global_peak) as u8)
        .collect();

    encode_waveform(&scaled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_sample_count() {
        // floor(L * 8 / 5) samples for a buffer of L bytes
        for len in 0..=64usize {
            let buf = vec![0xAAu8; len];
            let decoded = decode_waveform(&buf);
            assert_eq!(decoded.len(), len * 8 / 5, "length {len}");
            assert!(decoded.iter().all(|&s| s <= 31));
        }
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode_waveform(&[]).is_empty());
    }

    #[test]
    fn test_decode_known_vector() {
        // 40 bits -> 8 samples; verified against the little-endian
        // window-shift-mask rule by hand
        let decoded = decode_waveform(&[0xFF, 0x00, 0xFF, 0x00, 0xFF]);
        assert_eq!(decoded, vec![31, 7, 0, 30, 15, 0, 28, 31]);
    }

    #[test]
    fn test_decode_never_panics_on_short_input() {
        // Sub-sample buffers and odd tails must degrade to fewer (or zero)
        // samples, never to an error
        assert!(decode_waveform(&[0b0001_0101]).len() == 1);
        for len in 1..10usize {
            let _ = decode_waveform(&vec![0xFFu8; len]);
        }
    }

    #[test]
    fn test_encode_decode_identity() {
        let samples: Vec<u8> = (0..100).map(|i| (i * 7) % 32).map(|v| v as u8).collect();
        let encoded = encode_waveform(&samples);
        let decoded = decode_waveform(&encoded);
        // Encoding may leave room for one extra sample in the final byte
        assert!(decoded.len() >= samples.len());
        assert_eq!(&decoded[..samples.len()], samples.as_slice());
    }

    #[test]
    fn test_encode_clamps_out_of_range() {
        let encoded = encode_waveform(&[255, 32, 31]);
        let decoded = decode_waveform(&encoded);
        assert_eq!(&decoded[..3], &[31, 31, 31]);
    }

    #[test]
    fn test_envelope_silent_input() {
        let envelope = envelope_from_samples(&[0i16; 1000]);
        let decoded = decode_waveform(&envelope);
        assert!(decoded.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_envelope_peak_reaches_full_scale() {
        let mut samples = vec![100i16; 10_000];
        samples[5_000] = i16::MAX;
        let decoded = decode_waveform(&envelope_from_samples(&samples));
        assert_eq!(decoded.iter().copied().max(), Some(31));
    }
}
