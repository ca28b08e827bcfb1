//! Construction options and fixed tuning constants.

use serde::Deserialize;

use crate::playlist::{Playlist, Track};
use crate::theme::Theme;

pub const DEFAULT_VOLUME: u8 = 75;

/// Number of decorative bars in the waveform surface
pub const WAVEFORM_BARS: usize = 100;
/// Redraw period of the waveform while playing
pub const WAVEFORM_REDRAW_MS: u64 = 50;

/// Hue advance per visualizer frame, in degrees
pub const HUE_STEP: f32 = 0.5;

// Analyser node configuration. Fixed, not tunable at runtime.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnalyzerConfig {
    pub fft_size: u32,
    pub smoothing: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_size: 256,
            smoothing: 0.8,
        }
    }
}

impl AnalyzerConfig {
    /// Frequency bins exposed by the analyser (half the FFT size)
    pub fn bin_count(&self) -> usize {
        (self.fft_size / 2) as usize
    }
}

/// Caller-provided options, usually passed as JSON by the host page.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerOptions {
    pub initial_track: Option<Track>,
    pub playlist: Option<Vec<Track>>,
    pub volume: Option<u8>,
    pub theme: Option<Theme>,
}

impl PlayerOptions {
    /// Parse options JSON; invalid input falls back to defaults
    pub fn from_json(text: &str) -> Self {
        match serde_json::from_str(text) {
            Ok(options) => options,
            Err(e) => {
                log::warn!("ignoring invalid player options: {e}");
                Self::default()
            }
        }
    }

    /// Resolve the playlist and starting track.
    ///
    /// An absent or empty playlist falls back to the built-in sample list. The initial track
    /// may be one that is not in the playlist.
    pub fn resolve(&self) -> (Playlist, Track) {
        let playlist = match &self.playlist {
            Some(tracks) if !tracks.is_empty() => Playlist::new(tracks.clone()),
            _ => Playlist::sample(),
        };
        let track = self
            .initial_track
            .clone()
            .or_else(|| playlist.first().cloned())
            .unwrap_or_else(|| Track::new("", "", "", 0.0, ""));
        (playlist, track)
    }

    pub fn volume(&self) -> u8 {
        self.volume.unwrap_or(DEFAULT_VOLUME).min(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyser_exposes_128_bins() {
        assert_eq!(AnalyzerConfig::default().bin_count(), 128);
    }

    #[test]
    fn defaults_use_sample_playlist() {
        let (playlist, track) = PlayerOptions::default().resolve();
        assert_eq!(playlist.len(), 4);
        assert_eq!(track.id, "1");
        assert_eq!(PlayerOptions::default().volume(), DEFAULT_VOLUME);
    }

    #[test]
    fn options_parse_from_camel_case_json() {
        let options = PlayerOptions::from_json(
            r#"{
                "initialTrack": {"id": "ext", "title": "E", "artist": "A", "duration": 3, "audioUrl": "e.mp3"},
                "playlist": [{"id": "p", "title": "P", "artist": "A", "duration": 4, "audioUrl": "p.mp3"}],
                "volume": 140,
                "theme": "glassmorphic"
            }"#,
        );
        let (playlist, track) = options.resolve();
        assert_eq!(playlist.len(), 1);
        assert_eq!(track.id, "ext");
        assert_eq!(options.volume(), 100);
        assert_eq!(options.theme, Some(Theme::Glassmorphic));
    }

    #[test]
    fn invalid_options_fall_back() {
        let options = PlayerOptions::from_json("{not json");
        assert!(options.playlist.is_none());
        let empty = PlayerOptions::from_json(r#"{"playlist": []}"#);
        assert_eq!(empty.resolve().0.len(), 4);
    }
}
