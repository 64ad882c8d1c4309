//! The audio heard just before speech started.
//!
//! Thai commands often open on a quiet consonant that stays below the VAD
//! threshold. [`PreRoll`] keeps the most recent silent audio so the segmenter
//! can prepend it once a voiced frame arrives.
//!
//! ```rust
//! use garden_voice::audio::PreRoll;
//!
//! let mut pre = PreRoll::new(4);
//! pre.remember(&[1.0, 2.0, 3.0]);
//! pre.remember(&[4.0, 5.0]);
//! assert_eq!(pre.take(), vec![2.0, 3.0, 4.0, 5.0]);
//! assert!(pre.is_empty());
//! ```

use std::collections::VecDeque;

/// Keeps the newest `capacity` samples; older ones fall out.
#[derive(Debug, Clone)]
pub struct PreRoll {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl PreRoll {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn remember(&mut self, audio: &[f32]) {
        let tail = &audio[audio.len().saturating_sub(self.capacity)..];
        let excess = (self.samples.len() + tail.len()).saturating_sub(self.capacity);
        self.samples.drain(..excess);
        self.samples.extend(tail);
    }

    /// The remembered samples, oldest first. Leaves the pre-roll empty.
    pub fn take(&mut self) -> Vec<f32> {
        self.samples.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_audio_is_kept_whole() {
        let mut pre = PreRoll::new(4_000);
        pre.remember(&[0.1, 0.2]);
        assert_eq!(pre.len(), 2);
        assert_eq!(pre.capacity(), 4_000);
        assert_eq!(pre.take(), vec![0.1, 0.2]);
    }

    #[test]
    fn oversized_write_keeps_its_tail() {
        let mut pre = PreRoll::new(3);
        pre.remember(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(pre.take(), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut pre = PreRoll::new(2);
        pre.remember(&[1.0, 2.0]);
        pre.clear();
        assert!(pre.take().is_empty());

        pre.remember(&[7.0]);
        assert_eq!(pre.take(), vec![7.0]);
    }

    #[test]
    fn zero_capacity_remembers_nothing() {
        let mut pre = PreRoll::new(0);
        pre.remember(&[1.0, 2.0]);
        assert!(pre.is_empty());
    }
}
