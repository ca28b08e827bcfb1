use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ImportError;

// One playable item. Identity is `id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub duration: f64, // Declared duration in seconds
    pub audio_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
}

impl Track {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        duration: f64,
        audio_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            duration,
            audio_url: audio_url.into(),
            cover_url: None,
        }
    }

    /// Build a track from one element of an import payload.
    ///
    /// Requires string `id`, `title`, `artist`, `audioUrl` and a numeric `duration`.
    /// Extra keys are ignored; `coverUrl` is only kept when it is a string.
    pub fn from_import_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_owned);

        Some(Self {
            id: text("id")?,
            title: text("title")?,
            artist: text("artist")?,
            duration: obj.get("duration").and_then(Value::as_f64)?,
            audio_url: text("audioUrl")?,
            cover_url: text("coverUrl"),
        })
    }
}

/// Ordered tracks; order is playback order for wrap-around navigation.
///
/// A playlist is never edited in place: import builds a new one and the player swaps it in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    /// Later tracks that repeat an earlier id are dropped.
    pub fn new(tracks: Vec<Track>) -> Self {
        let mut unique: Vec<Track> = Vec::with_capacity(tracks.len());
        for track in tracks {
            if unique.iter().any(|t| t.id == track.id) {
                log::debug!("playlist: dropping duplicate track id {:?}", track.id);
                continue;
            }
            unique.push(track);
        }
        Self { tracks: unique }
    }

    /// Built-in four-track list used when the host supplies none
    pub fn sample() -> Self {
        Self::new(vec![
            Track::new(
                "1",
                "Lofi Study",
                "Lofi Geek",
                144.0,
                "https://storage.googleapis.com/media-session/sintel/snow-fight.mp3",
            ),
            Track::new(
                "2",
                "Chill Vibes",
                "Chill Music Lab",
                184.0,
                "https://storage.googleapis.com/media-session/big-buck-bunny/big-buck-bunny-background-music.mp3",
            ),
            Track::new(
                "3",
                "Ambient Waves",
                "Ambient Sounds",
                261.0,
                "https://storage.googleapis.com/media-session/big-buck-bunny/big-buck-bunny-surround-sound.mp3",
            ),
            Track::new(
                "4",
                "Meditation",
                "Zen Music",
                156.0,
                "https://storage.googleapis.com/media-session/elephants-dream/the-wires.mp3",
            ),
        ])
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn first(&self) -> Option<&Track> {
        self.tracks.first()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    /// Index `step` places away from `from`, wrapping in both directions.
    ///
    /// A missing `from` counts as index 0. Returns `None` only for an empty playlist.
    pub fn wrapped_index(&self, from: Option<usize>, step: isize) -> Option<usize> {
        if self.tracks.is_empty() {
            return None;
        }
        let len = self.tracks.len();
        let base = from.unwrap_or(0) % len;
        let offset = step.unsigned_abs() % len;
        Some(if step >= 0 {
            (base + offset) % len
        } else {
            (base + len - offset) % len
        })
    }

    /// Track `step` places away from the track with `id`
    pub fn neighbour_of(&self, id: &str, step: isize) -> Option<&Track> {
        self.wrapped_index(self.position_of(id), step)
            .and_then(|i| self.tracks.get(i))
    }

    /// Validate an import payload and build a playlist from its valid elements.
    ///
    /// # Errors
    ///
    /// [`ImportError::NotAnArray`] when `payload` is not an array, and
    /// [`ImportError::NoValidTracks`] when no element describes a track.
    pub fn from_import(payload: &Value) -> Result<Self, ImportError> {
        let items = payload.as_array().ok_or(ImportError::NotAnArray)?;

        let tracks: Vec<Track> = items.iter().filter_map(Track::from_import_value).collect();
        if tracks.len() < items.len() {
            log::debug!(
                "playlist import: dropped {} invalid element(s)",
                items.len() - tracks.len()
            );
        }
        if tracks.is_empty() {
            return Err(ImportError::NoValidTracks);
        }

        Ok(Self::new(tracks))
    }

    /// Parse JSON text, then validate it like [`Playlist::from_import`].
    ///
    /// # Errors
    ///
    /// [`ImportError::InvalidJson`] for unparsable text, otherwise as
    /// [`Playlist::from_import`].
    pub fn from_import_json(text: &str) -> Result<Self, ImportError> {
        let payload: Value =
            serde_json::from_str(text).map_err(|e| ImportError::InvalidJson(e.to_string()))?;
        Self::from_import(&payload)
    }

    /// Two-track example shown by the import dialog
    pub fn example_json() -> String {
        let example = [
            Track::new(
                "sample1",
                "Sample Track 1",
                "Artist Name",
                180.0,
                "https://example.com/track1.mp3",
            ),
            Track::new(
                "sample2",
                "Sample Track 2",
                "Another Artist",
                240.0,
                "https://example.com/track2.mp3",
            ),
        ];
        serde_json::to_string_pretty(&example).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ab() -> Playlist {
        Playlist::new(vec![
            Track::new("1", "A", "x", 10.0, "a.mp3"),
            Track::new("2", "B", "y", 20.0, "b.mp3"),
        ])
    }

    #[test]
    fn sample_has_four_unique_tracks() {
        let p = Playlist::sample();
        assert_eq!(p.len(), 4);
        assert_eq!(p.first().map(|t| t.title.as_str()), Some("Lofi Study"));
    }

    #[test]
    fn wrapped_index_cycles() {
        let p = ab();
        assert_eq!(p.wrapped_index(Some(0), 1), Some(1));
        assert_eq!(p.wrapped_index(Some(1), 1), Some(0));
        assert_eq!(p.wrapped_index(Some(0), -1), Some(1));
        // unknown current track counts as index 0
        assert_eq!(p.wrapped_index(None, 1), Some(1));
        assert_eq!(p.wrapped_index(None, -1), Some(1));
        assert_eq!(Playlist::default().wrapped_index(Some(0), 1), None);
    }

    #[test]
    fn wrapped_index_handles_large_steps() {
        let p = Playlist::new(vec![
            Track::new("1", "A", "x", 1.0, "a"),
            Track::new("2", "B", "x", 1.0, "b"),
            Track::new("3", "C", "x", 1.0, "c"),
        ]);
        assert_eq!(p.wrapped_index(Some(2), 4), Some(0));
        assert_eq!(p.wrapped_index(Some(0), -5), Some(1));
        assert_eq!(p.wrapped_index(Some(0), isize::MAX), Some(1));
        assert_eq!(p.wrapped_index(Some(0), isize::MIN), Some(1));
        // a stale index beyond the end still lands inside the list
        assert_eq!(p.wrapped_index(Some(7), 0), Some(1));
    }

    #[test]
    fn next_then_previous_returns_to_start() {
        let p = Playlist::sample();
        for t in p.tracks() {
            let next = p.neighbour_of(&t.id, 1).unwrap();
            let back = p.neighbour_of(&next.id, -1).unwrap();
            assert_eq!(back.id, t.id);
        }
    }

    #[test]
    fn import_drops_invalid_elements() {
        let payload = json!([
            {"id": "x", "title": "T", "artist": "Ar", "duration": 5, "audioUrl": "u", "extra": true},
            {"id": 7, "title": "T", "artist": "Ar", "duration": 5, "audioUrl": "u"},
            {"id": "y", "title": "T", "artist": "Ar", "duration": "5", "audioUrl": "u"},
            {"id": "z", "title": "T", "artist": "Ar", "audioUrl": "u"},
            "just a string",
            null,
            {"id": "w", "title": "W", "artist": "Ar", "duration": 1.5, "audioUrl": "w", "coverUrl": "c.png"}
        ]);
        let p = Playlist::from_import(&payload).unwrap();
        let ids: Vec<&str> = p.tracks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["x", "w"]);
        assert_eq!(p.tracks()[0].duration, 5.0);
        assert_eq!(p.tracks()[1].cover_url.as_deref(), Some("c.png"));
    }

    #[test]
    fn import_rejects_non_arrays_and_empty_results() {
        assert_eq!(
            Playlist::from_import(&json!("not an array")),
            Err(ImportError::NotAnArray)
        );
        assert_eq!(
            Playlist::from_import(&json!({"id": "x"})),
            Err(ImportError::NotAnArray)
        );
        assert_eq!(Playlist::from_import(&json!([])), Err(ImportError::NoValidTracks));
        assert_eq!(
            Playlist::from_import(&json!([{"title": "no id"}])),
            Err(ImportError::NoValidTracks)
        );
        assert!(matches!(
            Playlist::from_import_json("[{oops"),
            Err(ImportError::InvalidJson(_))
        ));
    }

    #[test]
    fn import_is_idempotent() {
        let text = Playlist::example_json();
        let first = Playlist::from_import_json(&text).unwrap();
        let second = Playlist::from_import_json(&text).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let p = Playlist::new(vec![
            Track::new("1", "A", "x", 1.0, "a"),
            Track::new("1", "A again", "x", 1.0, "a2"),
        ]);
        assert_eq!(p.len(), 1);
        assert_eq!(p.tracks()[0].title, "A");
    }
}
