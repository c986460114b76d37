use serde::{Deserialize, Serialize};
use std::fmt;

/// A single song with its lyrics, as extracted from a lyrics page.
///
/// Songs are immutable once built. Two songs are equal when every field
/// they were constructed with is equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    title: String,
    album: String,
    artist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    lyrics: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    writers: Option<String>,
}

impl Song {
    pub fn new(
        title: impl Into<String>,
        album: impl Into<String>,
        artist: impl Into<String>,
        lyrics: Option<String>,
        writers: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            album: album.into(),
            artist: artist.into(),
            lyrics,
            writers,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Title of the album this song was listed under.
    pub fn album(&self) -> &str {
        &self.album
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    /// Lyrics text, `None` when the page had a lyrics block we could not read.
    pub fn lyrics(&self) -> Option<&str> {
        self.lyrics.as_deref()
    }

    /// Songwriter credits, when the site lists them.
    pub fn writers(&self) -> Option<&str> {
        self.writers.as_deref()
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Song({}, {}, {})", self.title, self.album, self.artist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn things_done_changed() -> Song {
        Song::new(
            "Things Done Changed",
            "Ready to Die (1994)",
            "The Notorious B.I.G.",
            Some("Remember back in the days...".into()),
            None,
        )
    }

    #[test]
    fn test_song_accessors() {
        let song = things_done_changed();
        assert_eq!(song.title(), "Things Done Changed");
        assert_eq!(song.album(), "Ready to Die (1994)");
        assert_eq!(song.artist(), "The Notorious B.I.G.");
        assert_eq!(song.lyrics(), Some("Remember back in the days..."));
        assert_eq!(song.writers(), None);
    }

    #[test]
    fn test_song_equality_by_fields() {
        assert_eq!(things_done_changed(), things_done_changed());
        let other = Song::new(
            "Things Done Changed",
            "Ready to Die (1994)",
            "The Notorious B.I.G.",
            Some("Remember back in the days...".into()),
            Some("C. Wallace".into()),
        );
        assert_ne!(things_done_changed(), other);
    }

    #[test]
    fn test_song_display() {
        assert_eq!(
            things_done_changed().to_string(),
            "Song(Things Done Changed, Ready to Die (1994), The Notorious B.I.G.)"
        );
    }

    #[test]
    fn test_song_json_skips_missing_writers() {
        let json = serde_json::to_string(&things_done_changed()).unwrap();
        assert!(!json.contains("writers"));
        let back: Song = serde_json::from_str(&json).unwrap();
        assert_eq!(back, things_done_changed());
    }
}
