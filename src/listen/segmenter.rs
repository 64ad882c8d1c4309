//! Energy-based utterance endpointing.
//!
//! [`UtteranceSegmenter`] receives 16 kHz mono audio in arbitrary slices,
//! cuts it into fixed analysis frames and decides where each spoken command
//! begins and ends:
//!
//! ```text
//!  silent frames ──▶ pre-roll (last frame kept)
//!  first voiced frame ──▶ utterance = pre-roll + frame
//!  …voiced / short pauses… ──▶ appended
//!  `end_silence_frames` silent frames in a row, or max length ──▶ finished
//! ```

use crate::audio::{PreRoll, VadDetector};
use crate::config::AudioConfig;

pub struct UtteranceSegmenter {
    vad: VadDetector,
    frame_size: usize,
    end_silence_frames: usize,
    max_samples: usize,
    /// Samples not yet filling a whole frame.
    pending: Vec<f32>,
    pre_roll: PreRoll,
    utterance: Vec<f32>,
    in_speech: bool,
    silent_run: usize,
}

impl UtteranceSegmenter {
    /// # Panics
    ///
    /// Panics if `frame_size == 0`.
    pub fn new(
        vad_threshold: f32,
        frame_size: usize,
        end_silence_frames: usize,
        max_samples: usize,
    ) -> Self {
        assert!(frame_size > 0, "frame_size must be > 0");
        Self {
            vad: VadDetector::new(vad_threshold),
            frame_size,
            end_silence_frames: end_silence_frames.max(1),
            max_samples: max_samples.max(frame_size),
            pending: Vec::with_capacity(frame_size),
            pre_roll: PreRoll::new(frame_size),
            utterance: Vec::new(),
            in_speech: false,
            silent_run: 0,
        }
    }

    pub fn from_config(config: &AudioConfig) -> Self {
        let max_samples = (config.max_utterance_secs.max(0.0) * config.sample_rate as f32) as usize;
        Self::new(
            config.vad_threshold,
            config.frame_size.max(1),
            config.end_silence_frames,
            max_samples,
        )
    }

    /// Feed audio; returns every utterance finished by it (usually none).
    pub fn push(&mut self, samples: &[f32]) -> Vec<Vec<f32>> {
        let mut finished = Vec::new();
        let mut rest = samples;

        while !rest.is_empty() {
            let take = (self.frame_size - self.pending.len()).min(rest.len());
            self.pending.extend_from_slice(&rest[..take]);
            rest = &rest[take..];

            if self.pending.len() == self.frame_size {
                let frame = std::mem::replace(&mut self.pending, Vec::with_capacity(self.frame_size));
                if let Some(done) = self.push_frame(frame) {
                    finished.push(done);
                }
            }
        }

        finished
    }

    /// Forget everything heard so far, including a half-spoken utterance.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.pre_roll.clear();
        self.utterance.clear();
        self.in_speech = false;
        self.silent_run = 0;
    }

    /// `true` while an utterance is being collected.
    pub fn in_speech(&self) -> bool {
        self.in_speech
    }

    /// The detector used for per-frame decisions.
    pub fn vad(&self) -> &VadDetector {
        &self.vad
    }

    fn push_frame(&mut self, frame: Vec<f32>) -> Option<Vec<f32>> {
        let voiced = self.vad.is_voice(&frame);

        if !self.in_speech {
            if voiced {
                self.in_speech = true;
                self.silent_run = 0;
                self.utterance = self.pre_roll.take();
                self.utterance.extend_from_slice(&frame);
            } else {
                self.pre_roll.remember(&frame);
            }
            return None;
        }

        self.utterance.extend_from_slice(&frame);
        if voiced {
            self.silent_run = 0;
        } else {
            self.silent_run += 1;
        }

        if self.silent_run >= self.end_silence_frames || self.utterance.len() >= self.max_samples {
            self.in_speech = false;
            self.silent_run = 0;
            return Some(std::mem::take(&mut self.utterance));
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: usize = 100;

    fn seg(end_silence: usize, max_samples: usize) -> UtteranceSegmenter {
        UtteranceSegmenter::new(0.01, FRAME, end_silence, max_samples)
    }

    fn silence(frames: usize) -> Vec<f32> {
        vec![0.0; frames * FRAME]
    }

    fn voice(frames: usize) -> Vec<f32> {
        vec![0.5; frames * FRAME]
    }

    #[test]
    fn silence_never_finishes() {
        let mut s = seg(2, 10_000);
        assert!(s.push(&silence(50)).is_empty());
        assert!(!s.in_speech());
    }

    #[test]
    fn utterance_ends_after_trailing_silence() {
        let mut s = seg(2, 10_000);
        assert!(s.push(&silence(3)).is_empty());
        assert!(s.push(&voice(4)).is_empty());
        assert!(s.in_speech());
        assert!(s.push(&silence(1)).is_empty());

        let done = s.push(&silence(1));
        assert_eq!(done.len(), 1);
        // one frame of pre-roll + 4 voiced + 2 silent
        assert_eq!(done[0].len(), 7 * FRAME);
        assert!(!s.in_speech());
    }

    #[test]
    fn short_pause_inside_utterance_is_kept() {
        let mut s = seg(3, 10_000);
        let mut audio = voice(2);
        audio.extend(silence(2));
        audio.extend(voice(2));
        audio.extend(silence(3));

        let done = s.push(&audio);
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].len(), 9 * FRAME);
    }

    #[test]
    fn frames_are_assembled_across_odd_slices() {
        let mut s = seg(1, 10_000);
        let mut audio = voice(3);
        audio.extend(silence(1));

        let mut done = Vec::new();
        for chunk in audio.chunks(37) {
            done.extend(s.push(chunk));
        }
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].len(), 4 * FRAME);
    }

    #[test]
    fn long_speech_is_force_finished() {
        let mut s = seg(3, 5 * FRAME);
        let done = s.push(&voice(12));
        assert_eq!(done.len(), 2);
        assert!(done.iter().all(|u| u.len() == 5 * FRAME));
    }

    #[test]
    fn reset_discards_partial_utterance() {
        let mut s = seg(2, 10_000);
        s.push(&voice(3));
        assert!(s.in_speech());

        s.reset();
        assert!(!s.in_speech());
        // The trailing silence alone must not finish anything.
        assert!(s.push(&silence(5)).is_empty());
    }

    #[test]
    fn from_config_uses_frame_size() {
        let s = UtteranceSegmenter::from_config(&AudioConfig::default());
        assert_eq!(s.frame_size, 4_000);
        assert_eq!(s.max_samples, 240_000);
        assert!((s.vad().threshold() - 0.01).abs() < 1e-7);
    }
}
