// Scripted media binding for unit tests.

use std::cell::Cell;
use std::rc::Rc;

use crate::config::AnalyzerConfig;
use crate::error::{PlayerError, PlayerResult};
use crate::media::{EventQueue, FrequencyTap, MediaBinding, MediaEvent, PlayGeneration};

// Where a scripted analyser attachment fails
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AttachFailure {
    /// Before the element is routed into the audio graph
    BeforeRouting,
    /// After routing, while wiring the analyser
    AfterRouting,
}

#[derive(Clone, Debug, PartialEq)]
enum PlayMode {
    Resolve,
    Reject(String),
    Hold,
}

pub struct FakeBinding {
    pub src: Option<String>,
    pub loads: usize,
    pub position: f64,
    pub volume: f64,
    pub muted: bool,
    pub playing: bool,
    pub play_requests: Vec<PlayGeneration>,
    queue: EventQueue,
    mode: PlayMode,
    attachments: usize,
    routings: usize,
    fail_attach: Option<AttachFailure>,
    spectrum: Rc<Cell<u8>>,
    released: Rc<Cell<bool>>,
}

impl Default for FakeBinding {
    fn default() -> Self {
        Self {
            src: None,
            loads: 0,
            position: 0.0,
            volume: 1.0,
            muted: false,
            playing: false,
            play_requests: Vec::new(),
            queue: EventQueue::default(),
            mode: PlayMode::Resolve,
            attachments: 0,
            routings: 0,
            fail_attach: None,
            spectrum: Rc::new(Cell::new(0)),
            released: Rc::new(Cell::new(false)),
        }
    }
}

impl FakeBinding {
    pub fn analyser_attachments(&self) -> usize {
        self.attachments
    }

    pub fn fail_next_attach(&mut self) {
        self.fail_attach = Some(AttachFailure::BeforeRouting);
    }

    pub fn fail_next_attach_at(&mut self, stage: AttachFailure) {
        self.fail_attach = Some(stage);
    }

    /// Times the element was routed into an audio graph; the browser allows this once
    pub fn routings(&self) -> usize {
        self.routings
    }

    /// Flag set when the binding is dropped
    pub fn released_flag(&self) -> Rc<Cell<bool>> {
        self.released.clone()
    }

    pub fn set_spectrum(&self, value: u8) {
        self.spectrum.set(value);
    }

    pub fn reject_plays(&mut self, reason: &str) {
        self.mode = PlayMode::Reject(reason.to_owned());
    }

    pub fn resolve_plays(&mut self) {
        self.mode = PlayMode::Resolve;
    }

    /// Leave play requests pending until `complete` is called
    pub fn hold_plays(&mut self) {
        self.mode = PlayMode::Hold;
    }

    pub fn complete(&mut self, generation: PlayGeneration, ok: bool) {
        if ok {
            self.playing = true;
            self.queue.push(MediaEvent::PlayStarted(generation));
        } else {
            self.queue
                .push(MediaEvent::PlayRejected(generation, "NotAllowedError".into()));
        }
    }

    pub fn emit(&self, event: MediaEvent) {
        self.queue.push(event);
    }
}

struct FakeTap {
    bins: usize,
    value: Rc<Cell<u8>>,
}

impl FrequencyTap for FakeTap {
    fn bin_count(&self) -> usize {
        self.bins
    }

    fn read_into(&self, out: &mut [u8]) {
        out.iter_mut().take(self.bins).for_each(|b| *b = self.value.get());
    }
}

impl MediaBinding for FakeBinding {
    fn load(&mut self, url: &str) {
        self.src = Some(url.to_owned());
        self.loads += 1;
        self.position = 0.0;
        self.playing = false;
    }

    fn request_play(&mut self, generation: PlayGeneration) {
        self.play_requests.push(generation);
        match self.mode.clone() {
            PlayMode::Resolve => self.complete(generation, true),
            PlayMode::Reject(reason) => self
                .queue
                .push(MediaEvent::PlayRejected(generation, reason)),
            PlayMode::Hold => {}
        }
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn set_position(&mut self, seconds: f64) {
        self.position = seconds;
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn attach_analyzer(&mut self, config: &AnalyzerConfig) -> PlayerResult<Box<dyn FrequencyTap>> {
        let failure = self.fail_attach.take();
        if self.routings == 0 {
            if failure == Some(AttachFailure::BeforeRouting) {
                return Err(PlayerError::Initialization("AudioContext unavailable".into()));
            }
            self.routings += 1;
        }
        if failure == Some(AttachFailure::AfterRouting) {
            return Err(PlayerError::Initialization("connect failed".into()));
        }
        self.attachments += 1;
        Ok(Box::new(FakeTap {
            bins: config.bin_count(),
            value: self.spectrum.clone(),
        }))
    }

    fn take_events(&mut self) -> Vec<MediaEvent> {
        self.queue.drain()
    }
}

impl Drop for FakeBinding {
    fn drop(&mut self) {
        self.released.set(true);
    }
}
