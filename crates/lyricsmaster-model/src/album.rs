use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;
use std::slice;

use crate::song::Song;

/// Release date recorded when a site gives none or gives one we cannot read.
pub const UNKNOWN_RELEASE_DATE: &str = "Unknown";

/// An album of downloaded songs, in the order the site lists them.
///
/// Deserialized albums go through the same checks as downloaded ones: a
/// blank release date reads as [`UNKNOWN_RELEASE_DATE`] and an album
/// without songs is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AlbumRecord")]
pub struct Album {
    title: String,
    artist: String,
    release_date: String,
    songs: Vec<Song>,
}

impl Album {
    /// Build an album. An empty release date is stored as [`UNKNOWN_RELEASE_DATE`].
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        songs: Vec<Song>,
        release_date: impl Into<String>,
    ) -> Self {
        let release_date = release_date.into();
        let release_date = if release_date.trim().is_empty() {
            UNKNOWN_RELEASE_DATE.to_string()
        } else {
            release_date
        };
        Self {
            title: title.into(),
            artist: artist.into(),
            release_date,
            songs,
        }
    }

    /// Build an album from per-song download results, dropping the failures.
    ///
    /// Returns `None` when no song was downloaded, since an album is never
    /// built without songs.
    pub fn from_results(
        title: impl Into<String>,
        artist: impl Into<String>,
        results: impl IntoIterator<Item = Option<Song>>,
        release_date: impl Into<String>,
    ) -> Option<Self> {
        let songs: Vec<Song> = results.into_iter().flatten().collect();
        if songs.is_empty() {
            return None;
        }
        Some(Self::new(title, artist, songs, release_date))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn release_date(&self) -> &str {
        &self.release_date
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Song> {
        self.songs.get(index)
    }

    /// A fresh double-ended iterator over the songs. Every call starts over.
    pub fn iter(&self) -> slice::Iter<'_, Song> {
        self.songs.iter()
    }
}

#[derive(Deserialize)]
struct AlbumRecord {
    title: String,
    artist: String,
    #[serde(default)]
    release_date: String,
    songs: Vec<Song>,
}

impl TryFrom<AlbumRecord> for Album {
    type Error = String;

    fn try_from(record: AlbumRecord) -> Result<Self, Self::Error> {
        if record.songs.is_empty() {
            return Err(format!("album {:?} has no songs", record.title));
        }
        Ok(Self::new(record.title, record.artist, record.songs, record.release_date))
    }
}

impl Index<usize> for Album {
    type Output = Song;

    fn index(&self, index: usize) -> &Song {
        &self.songs[index]
    }
}

impl<'a> IntoIterator for &'a Album {
    type Item = &'a Song;
    type IntoIter = slice::Iter<'a, Song>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Album {
    type Item = Song;
    type IntoIter = std::vec::IntoIter<Song>;

    fn into_iter(self) -> Self::IntoIter {
        self.songs.into_iter()
    }
}

impl fmt::Display for Album {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Album({}, {})", self.title, self.artist)
    }
}
