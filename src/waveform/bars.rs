//! Bar bucketing for waveform display.
//!
//! Compresses an arbitrary-length amplitude sequence into a fixed number of
//! visual bars. The reduction is a greedy single-pass max-in-bucket walk with
//! carry: bucket widths vary by at most one sample and the residual budget of
//! a partial bucket rolls into the next one so no drift accumulates.

/// Substitute sample count used when a message carries no waveform metadata.
///
/// Produces a flat strip of minimum-height bars instead of an empty display.
pub const PLACEHOLDER_SAMPLE_COUNT: usize = 100;

/// Computes how many bars fit in the available width.
///
/// One bar occupies `bar_width + bar_margin` columns. The count never exceeds
/// the number of decoded samples (or [`PLACEHOLDER_SAMPLE_COUNT`] when there
/// are none), since stretching few samples over many bars adds no detail.
pub fn bar_count(
    avail_width: usize,
    bar_width: usize,
    bar_margin: usize,
    sample_count: usize,
) -> usize {
    let pitch = (bar_width + bar_margin).max(1);
    let effective_samples = if sample_count == 0 {
        PLACEHOLDER_SAMPLE_COUNT
    } else {
        sample_count
    };
    (avail_width / pitch).min(effective_samples)
}

/// Buckets decoded samples into exactly `bar_count` bar heights.
///
/// Each sample adds `bar_count` to a running budget; a bar is emitted from
/// the running maximum every time the budget reaches the total sample count,
/// with the remainder carried forward. A sample straddling a bucket boundary
/// counts toward the bar being emitted when at most half of its budget
/// carried over, and seeds the next bucket's maximum otherwise.
///
/// Heights are normalized so the globally loudest sample maps near
/// `height_max - height_min`, with add-one smoothing so an all-zero envelope
/// divides cleanly; every height is clamped to `[height_min, height_max]`.
/// Empty input yields `bar_count` bars at `height_min`.
pub fn bar_heights(
    samples: &[u8],
    bar_count: usize,
    height_min: u64,
    height_max: u64,
) -> Vec<u64> {
    if bar_count == 0 {
        return Vec::new();
    }
    let height_max = height_max.max(height_min);
    if samples.is_empty() {
        return vec![height_min; bar_count];
    }

    let total = samples.len();
    let norm = samples.iter().copied().max().unwrap_or(0) as f64;
    let max_delta = (height_max - height_min) as f64;

    let mut heights = Vec::with_capacity(bar_count);
    let mut budget = 0usize;
    let mut bucket_max = 0u8;

    for &value in samples {
        budget += bar_count;

        if budget < total {
            bucket_max = bucket_max.max(value);
            continue;
        }

        // A sample may close more than one bucket when there are fewer
        // samples than bars
        while budget >= total && heights.len() < bar_count {
            budget -= total;

            // The straddle threshold is (bar_count + 1) / 2 in the reals,
            // so compare doubled to keep the half step for even counts
            let closes_here = budget * 2 <= bar_count;
            if closes_here {
                bucket_max = bucket_max.max(value);
            }

            let raw = (bucket_max as f64 * max_delta + (norm + 1.0) / 2.0) / (norm + 1.0);
            heights.push((raw.round() as u64).clamp(height_min, height_max));

            bucket_max = if closes_here { 0 } else { value };
        }
    }

    // Rounding slack: the budget walk emits exactly bar_count bars when the
    // arithmetic is exact, but guard the invariant regardless
    while heights.len() < bar_count {
        heights.push(height_min);
    }

    heights
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_bar_count_when_more_samples_than_bars() {
        let samples: Vec<u8> = (0..100).map(|i| (i % 32) as u8).collect();
        for k in [1usize, 7, 37, 50, 99, 100] {
            assert_eq!(bar_heights(&samples, k, 4, 23).len(), k, "k={k}");
        }
    }

    #[test]
    fn test_exact_bar_count_when_fewer_samples_than_bars() {
        let samples = vec![10u8, 20, 30];
        for k in [4usize, 10, 37] {
            assert_eq!(bar_heights(&samples, k, 4, 23).len(), k, "k={k}");
        }
    }

    #[test]
    fn test_heights_stay_within_configured_range() {
        let samples: Vec<u8> = (0..311).map(|i| ((i * 13) % 32) as u8).collect();
        for &h in bar_heights(&samples, 37, 4, 23).iter() {
            assert!((4..=23).contains(&h), "height {h} out of range");
        }
    }

    #[test]
    fn test_empty_samples_yield_flat_minimum_bars() {
        assert_eq!(bar_heights(&[], 37, 4, 23), vec![4u64; 37]);
    }

    #[test]
    fn test_zero_bar_count_yields_nothing() {
        assert!(bar_heights(&[1, 2, 3], 0, 4, 23).is_empty());
    }

    #[test]
    fn test_constant_input_is_flat() {
        let heights = bar_heights(&[16u8; 80], 20, 4, 23);
        assert_eq!(heights.len(), 20);
        assert!(heights.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_loudest_sample_lands_in_its_bucket() {
        // One full-scale sample in the middle of silence: exactly the bars
        // covering it should ride high
        let mut samples = vec![0u8; 100];
        samples[50] = 31;
        let heights = bar_heights(&samples, 10, 4, 23);
        let peak = heights.iter().copied().max().unwrap();
        assert!(peak > 4);
        assert_eq!(heights.iter().filter(|&&h| h == peak).count(), 1);
        assert!(heights[5] == peak);
    }

    #[test]
    fn test_even_bar_count_straddle_joins_closing_bucket() {
        // The middle sample's carry is exactly half the bar count, which
        // still belongs to the bucket being closed
        let heights = bar_heights(&[0, 31, 0], 2, 4, 23);
        assert_eq!(heights, vec![19, 4]);
    }

    #[test]
    fn test_bar_count_is_width_limited_then_sample_limited() {
        // 150 columns at 2+2 pitch -> 37 slots
        assert_eq!(bar_count(150, 2, 2, 100), 37);
        assert_eq!(bar_count(150, 2, 2, 8), 8);
        // Missing metadata falls back to the placeholder count
        assert_eq!(bar_count(1000, 2, 2, 0), 100);
    }
}
