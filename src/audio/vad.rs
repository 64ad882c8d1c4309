//! Energy-based voice activity detection.
//!
//! A frame counts as speech when its RMS amplitude exceeds a fixed
//! threshold.  Crude, but a garden is either quiet or windy, and the
//! threshold is configurable (`audio.vad_threshold`).

/// Per-frame speech/silence classifier.
///
/// ```rust
/// use garden_voice::audio::VadDetector;
///
/// let vad = VadDetector::new(0.01); // typical for a quiet room
/// assert!(vad.is_voice(&[0.5_f32; 4_000]));
/// assert!(!vad.is_voice(&[0.001_f32; 4_000]));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct VadDetector {
    threshold: f32,
}

impl VadDetector {
    /// `threshold` is an RMS amplitude in `[0.0, 1.0]`; `0.01` suits a quiet
    /// microphone, `0.02`–`0.05` a noisy one.
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// `true` if `frame` is loud enough to be speech.  An empty frame is
    /// silence.
    pub fn is_voice(&self, frame: &[f32]) -> bool {
        !frame.is_empty() && rms(frame) > self.threshold
    }
}

/// Root-mean-square amplitude of `chunk` (0.0 for an empty chunk).
pub fn rms(chunk: &[f32]) -> f32 {
    if chunk.is_empty() {
        return 0.0;
    }
    let mean_sq: f32 = chunk.iter().map(|s| s * s).sum::<f32>() / chunk.len() as f32;
    mean_sq.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loud_and_quiet_frames() {
        let vad = VadDetector::new(0.1);
        assert!(vad.is_voice(&[0.2_f32; 100]));
        assert!(!vad.is_voice(&[0.05_f32; 100]));
        assert!(!vad.is_voice(&[]));
    }

    #[test]
    fn threshold_is_exclusive() {
        let vad = VadDetector::new(0.5);
        assert!(!vad.is_voice(&[0.5_f32; 10]));
    }

    #[test]
    fn rms_of_square_wave() {
        let wave: Vec<f32> = (0..100).map(|i| if i % 2 == 0 { 0.5 } else { -0.5 }).collect();
        assert!((rms(&wave) - 0.5).abs() < 1e-6);
        assert_eq!(rms(&[]), 0.0);
    }
}
