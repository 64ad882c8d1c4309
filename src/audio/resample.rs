//! Channel mixing and sample-rate conversion.
//!
//! Microphone audio is averaged to mono and brought to 16 kHz before
//! endpointing; synthesised replies (24 kHz mono) are brought up to the
//! output device's rate. Linear interpolation is enough for speech.

/// Average interleaved frames of `channels` samples into one mono sample.
/// A trailing partial frame is dropped.
///
/// ```rust
/// use garden_voice::audio::stereo_to_mono;
///
/// assert_eq!(stereo_to_mono(&[0.5, -0.5, 0.25, 0.75], 2), vec![0.0, 0.5]);
/// ```
pub fn stereo_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    let width = usize::from(channels);
    match width {
        0 => Vec::new(),
        1 => samples.to_vec(),
        _ => samples
            .chunks_exact(width)
            .map(|frame| frame.iter().sum::<f32>() / width as f32)
            .collect(),
    }
}

/// Convert mono `samples` from `from_hz` to `to_hz`.
///
/// ```rust
/// use garden_voice::audio::resample;
///
/// assert_eq!(resample(&[0.25; 240], 24_000, 48_000).len(), 480);
/// ```
pub fn resample(samples: &[f32], from_hz: u32, to_hz: u32) -> Vec<f32> {
    if from_hz == to_hz {
        return samples.to_vec();
    }
    let Some(&last) = samples.last() else {
        return Vec::new();
    };
    if from_hz == 0 || to_hz == 0 {
        return Vec::new();
    }

    let step = f64::from(from_hz) / f64::from(to_hz);
    let len = (samples.len() as f64 / step).ceil() as usize;

    (0..len)
        .map(|i| {
            let pos = i as f64 * step;
            let left = pos.floor() as usize;
            let t = (pos - left as f64) as f32;
            let a = samples.get(left).copied().unwrap_or(last);
            let b = samples.get(left + 1).copied().unwrap_or(a);
            a + (b - a) * t
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_passes_through_and_zero_channels_is_empty() {
        assert_eq!(stereo_to_mono(&[0.1, 0.2, 0.3], 1), vec![0.1, 0.2, 0.3]);
        assert!(stereo_to_mono(&[1.0, 2.0], 0).is_empty());
    }

    #[test]
    fn partial_frame_is_dropped() {
        assert_eq!(stereo_to_mono(&[1.0, 1.0, 1.0, 0.0, 0.0], 3), vec![1.0]);
    }

    #[test]
    fn degenerate_resample_inputs() {
        let x = [0.1_f32, 0.2];
        assert_eq!(resample(&x, 8_000, 8_000), x.to_vec());
        assert!(resample(&[], 48_000, 16_000).is_empty());
        assert!(resample(&x, 0, 16_000).is_empty());
    }

    #[test]
    fn lengths_follow_the_rate_ratio() {
        let mic = resample(&vec![0.0; 44_100], 44_100, 16_000);
        assert!(mic.len().abs_diff(16_000) <= 1, "got {}", mic.len());

        let reply = resample(&vec![0.0; 24_000], 24_000, 44_100);
        assert!(reply.len().abs_diff(44_100) <= 1, "got {}", reply.len());
    }

    #[test]
    fn upsampling_interpolates_between_neighbours() {
        let out = resample(&[0.0, 1.0], 1, 2);
        assert_eq!(out.len(), 4);
        assert!((out[1] - 0.5).abs() < 1e-6);
        assert_eq!(out[3], 1.0);
    }

    #[test]
    fn constant_signal_keeps_its_level() {
        assert!(resample(&vec![0.5; 480], 48_000, 16_000)
            .iter()
            .all(|s| (s - 0.5).abs() < 1e-5));
    }
}
