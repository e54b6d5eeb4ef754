//! Waveform decoding and bar reduction for voice message display.
//!
//! A voice message carries its loudness envelope as packed 5-bit metadata.
//! `codec` unpacks (and packs) that format; `bars` compresses the decoded
//! samples into however many bars fit the display.

pub mod bars;
pub mod codec;

pub use bars::{bar_count, bar_heights, PLACEHOLDER_SAMPLE_COUNT};
pub use codec::{
    decode_waveform, encode_waveform, envelope_from_samples, ENVELOPE_SAMPLES, WAVEFORM_MAX_BYTES,
};
