//! Playback orchestrator.
//!
//! `Player` owns the playback state, the playlist, the single media binding and its analyser.
//! Every operation pushes the matching change to the binding in the same call, so the media
//! element never drifts from `PlaybackState`.

use serde_json::Value;

use crate::analyzer::{AnalyzerSnapshot, FrequencyAnalyzer};
use crate::config::{AnalyzerConfig, PlayerOptions};
use crate::error::{ImportError, PlayOrigin, PlayerError, PlayerResult};
use crate::media::{MediaBinding, MediaEvent, PlayGeneration};
use crate::playlist::{Playlist, Track};

#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackState {
    pub current_track: Track,
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64, // From media metadata once loaded
    pub volume: u8,    // 0-100
    pub is_muted: bool,
    pub audio_error: Option<String>,
}

impl PlaybackState {
    /// Played fraction in `[0, 1]`; zero when the duration is unknown
    pub fn progress(&self) -> f64 {
        progress_fraction(self.current_time, self.duration)
    }
}

pub fn progress_fraction(current_time: f64, duration: f64) -> f64 {
    if duration.is_finite() && duration > 0.0 && current_time.is_finite() {
        (current_time / duration).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

// Play request still waiting for the platform to answer
#[derive(Clone, Copy, Debug)]
struct PendingPlay {
    generation: PlayGeneration,
    origin: PlayOrigin,
}

pub struct Player<B: MediaBinding> {
    binding: B,
    analyzer: FrequencyAnalyzer,
    playlist: Playlist,
    state: PlaybackState,
    generation: PlayGeneration,
    pending: Option<PendingPlay>,
}

impl<B: MediaBinding> Player<B> {
    pub fn new(binding: B, options: &PlayerOptions) -> Self {
        let (playlist, track) = options.resolve();
        let mut player = Self {
            binding,
            analyzer: FrequencyAnalyzer::new(AnalyzerConfig::default()),
            playlist,
            state: PlaybackState {
                duration: track.duration,
                current_track: track,
                is_playing: false,
                current_time: 0.0,
                volume: options.volume(),
                is_muted: false,
                audio_error: None,
            },
            generation: 0,
            pending: None,
        };

        let url = player.state.current_track.audio_url.clone();
        player.binding.load(&url);
        player.binding.set_volume(f64::from(player.state.volume) / 100.0);
        player.binding.set_muted(false);
        log::debug!(
            "player ready with {} track(s), current {:?}",
            player.playlist.len(),
            player.state.current_track.id
        );
        player
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn snapshot(&self) -> &AnalyzerSnapshot {
        self.analyzer.snapshot()
    }

    pub fn is_analyzer_attached(&self) -> bool {
        self.analyzer.is_attached()
    }

    pub fn binding(&self) -> &B {
        &self.binding
    }

    pub fn binding_mut(&mut self) -> &mut B {
        &mut self.binding
    }

    // ===== TRANSPORT =====

    /// Toggle playback. Must be driven by a user gesture: the first call attaches the
    /// analyser, which browsers only allow after user activation.
    pub fn play_pause(&mut self) {
        self.ensure_analyzer();

        if self.state.is_playing {
            self.binding.pause();
            self.state.is_playing = false;
            self.pending = None;
        } else {
            self.request_play(PlayOrigin::Resume);
        }
    }

    /// Move the playhead, clamped to `[0, duration]`. Mirrors into state immediately.
    pub fn seek(&mut self, time: f64) {
        if !time.is_finite() {
            return;
        }
        let upper = if self.state.duration.is_finite() && self.state.duration > 0.0 {
            self.state.duration
        } else {
            f64::INFINITY
        };
        let time = time.clamp(0.0, upper);
        self.binding.set_position(time);
        self.state.current_time = time;
    }

    pub fn set_volume(&mut self, volume: u8) {
        let volume = volume.min(100);
        self.state.volume = volume;
        self.binding.set_volume(f64::from(volume) / 100.0);
        if volume > 0 && self.state.is_muted {
            self.state.is_muted = false;
            self.binding.set_muted(false);
        }
    }

    /// Flip mute; the stored volume is kept
    pub fn toggle_mute(&mut self) {
        self.state.is_muted = !self.state.is_muted;
        self.binding.set_muted(self.state.is_muted);
    }

    /// Handle a click on a playlist row.
    ///
    /// The current track toggles play/pause; any other track becomes current and autoplays.
    pub fn select_track(&mut self, track: &Track) {
        self.ensure_analyzer();

        if track.id == self.state.current_track.id {
            self.play_pause();
        } else {
            self.change_track(track.clone(), true);
        }
    }

    /// User-initiated skip forward
    pub fn next(&mut self) {
        self.ensure_analyzer();
        self.advance(1);
    }

    /// User-initiated skip back
    pub fn previous(&mut self) {
        self.ensure_analyzer();
        self.advance(-1);
    }

    // ===== IMPORT =====

    /// Replace the playlist with the valid tracks of `payload`.
    ///
    /// On error nothing changes except the status message.
    ///
    /// # Errors
    ///
    /// [`PlayerError::ImportFormat`] when the payload is rejected.
    pub fn import_playlist(&mut self, payload: &Value) -> PlayerResult<()> {
        self.apply_import(Playlist::from_import(payload))
    }

    /// JSON text variant of [`Player::import_playlist`].
    ///
    /// # Errors
    ///
    /// [`PlayerError::ImportFormat`] for invalid JSON or a rejected payload.
    pub fn import_playlist_json(&mut self, text: &str) -> PlayerResult<()> {
        self.apply_import(Playlist::from_import_json(text))
    }

    fn apply_import(&mut self, parsed: Result<Playlist, ImportError>) -> PlayerResult<()> {
        let playlist = match parsed {
            Ok(playlist) => playlist,
            Err(e) => {
                let e = PlayerError::from(e);
                self.report(&e);
                return Err(e);
            }
        };
        let Some(first) = playlist.first().cloned() else {
            // from_import never yields an empty playlist
            let e = PlayerError::from(ImportError::NoValidTracks);
            self.report(&e);
            return Err(e);
        };

        log::info!("imported playlist with {} track(s)", playlist.len());
        self.playlist = playlist;
        self.change_track(first, false);
        Ok(())
    }

    // ===== MEDIA EVENTS =====

    /// Apply everything the binding reported since the last frame
    pub fn pump_events(&mut self) {
        for event in self.binding.take_events() {
            self.handle_event(event);
        }
    }

    pub fn handle_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::MetadataLoaded(duration) => {
                if duration.is_finite() && duration >= 0.0 {
                    self.state.duration = duration;
                }
                self.state.audio_error = None;
            }
            MediaEvent::TimeUpdate(time) => {
                if time.is_finite() {
                    self.state.current_time = time;
                }
            }
            MediaEvent::Ended => {
                log::debug!("track {:?} ended", self.state.current_track.id);
                self.state.is_playing = false;
                self.advance(1);
            }
            MediaEvent::Error(detail) => {
                self.pending = None;
                self.state.is_playing = false;
                self.report(&PlayerError::Load(detail));
            }
            MediaEvent::PlayStarted(generation) => {
                if self.take_pending(generation).is_some() {
                    self.state.is_playing = true;
                    self.state.audio_error = None;
                }
            }
            MediaEvent::PlayRejected(generation, detail) => {
                if let Some(pending) = self.take_pending(generation) {
                    self.state.is_playing = false;
                    self.report(&PlayerError::Playback {
                        origin: pending.origin,
                        detail,
                    });
                }
            }
        }
    }

    /// Copy fresh analyser data into the snapshot. Driven by the analyser loop while playing.
    pub fn refresh_analyzer(&mut self) {
        self.analyzer.refresh();
    }

    // ===== INTERNALS =====

    fn ensure_analyzer(&mut self) {
        if let Err(e) = self.analyzer.attach_once(&mut self.binding) {
            self.report(&e);
        }
    }

    fn advance(&mut self, step: isize) {
        let Some(track) = self
            .playlist
            .neighbour_of(&self.state.current_track.id, step)
            .cloned()
        else {
            return;
        };
        self.change_track(track, true);
    }

    fn change_track(&mut self, track: Track, autoplay: bool) {
        log::info!("now on {:?} - {}", track.id, track.title);
        self.pending = None;
        self.state.current_time = 0.0;
        self.state.duration = track.duration;
        self.state.audio_error = None;
        self.binding.load(&track.audio_url);
        self.state.current_track = track;

        self.state.is_playing = autoplay;
        if autoplay {
            self.request_play(PlayOrigin::TrackChange);
        }
    }

    fn request_play(&mut self, origin: PlayOrigin) {
        self.generation += 1;
        self.pending = Some(PendingPlay {
            generation: self.generation,
            origin,
        });
        self.binding.request_play(self.generation);
    }

    fn take_pending(&mut self, generation: PlayGeneration) -> Option<PendingPlay> {
        match self.pending {
            Some(p) if p.generation == generation => self.pending.take(),
            _ => {
                log::debug!("ignoring stale play completion #{generation}");
                None
            }
        }
    }

    fn report(&mut self, error: &PlayerError) {
        match error.detail() {
            Some(detail) => log::warn!("{error} ({detail})"),
            None => log::warn!("{error}"),
        }
        self.state.audio_error = Some(error.to_string());
    }
}
