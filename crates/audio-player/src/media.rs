//! Seam between the orchestrator and the platform audio primitives.
//!
//! The browser implementation lives in `crate::web`. Platform callbacks never touch player
//! state directly: they queue [`MediaEvent`]s which the player drains on the UI thread.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::config::AnalyzerConfig;
use crate::error::PlayerResult;

/// Identifies one play request so late completions can be recognised as stale.
pub type PlayGeneration = u64;

#[derive(Clone, Debug, PartialEq)]
pub enum MediaEvent {
    /// Metadata ready; carries the authoritative duration in seconds
    MetadataLoaded(f64),
    /// Playback position advanced
    TimeUpdate(f64),
    /// Current source finished playing
    Ended,
    /// Source failed to load or decode
    Error(String),
    /// A play request resolved
    PlayStarted(PlayGeneration),
    /// A play request was rejected by the platform
    PlayRejected(PlayGeneration, String),
}

/// Queue shared between platform callbacks and the player
#[derive(Clone, Default)]
pub struct EventQueue(Rc<RefCell<VecDeque<MediaEvent>>>);

impl EventQueue {
    pub fn push(&self, event: MediaEvent) {
        self.0.borrow_mut().push_back(event);
    }

    pub fn drain(&self) -> Vec<MediaEvent> {
        self.0.borrow_mut().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// Live frequency data from an attached analyser
pub trait FrequencyTap {
    fn bin_count(&self) -> usize;

    /// Copy the current magnitudes into `out` (at most `out.len()` bins)
    fn read_into(&self, out: &mut [u8]);
}

/// One owned playable media handle
pub trait MediaBinding {
    /// Replace the source and start loading it
    fn load(&mut self, url: &str);

    /// Ask the platform to start playback. Completion arrives later as
    /// `PlayStarted(generation)` or `PlayRejected(generation, _)`.
    fn request_play(&mut self, generation: PlayGeneration);

    fn pause(&mut self);

    fn set_position(&mut self, seconds: f64);

    /// Linear gain in `0.0..=1.0`
    fn set_volume(&mut self, volume: f64);

    fn set_muted(&mut self, muted: bool);

    /// Build an analyser on this binding's output. Called at most once successfully.
    fn attach_analyzer(&mut self, config: &AnalyzerConfig) -> PlayerResult<Box<dyn FrequencyTap>>;

    /// Events produced since the last call, in arrival order
    fn take_events(&mut self) -> Vec<MediaEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_preserves_order_across_clones() {
        let queue = EventQueue::default();
        let producer = queue.clone();
        producer.push(MediaEvent::TimeUpdate(1.0));
        producer.push(MediaEvent::Ended);
        assert!(!queue.is_empty());
        assert_eq!(
            queue.drain(),
            vec![MediaEvent::TimeUpdate(1.0), MediaEvent::Ended]
        );
        assert!(queue.is_empty());
    }
}
