use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;
use std::slice;

use crate::album::Album;
use crate::song::Song;

/// Every album downloaded for one artist.
///
/// An empty discography means the artist was found but none of its albums
/// produced lyrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discography {
    artist: String,
    albums: Vec<Album>,
}

impl Discography {
    pub fn new(artist: impl Into<String>, albums: Vec<Album>) -> Self {
        Self {
            artist: artist.into(),
            albums,
        }
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn len(&self) -> usize {
        self.albums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Album> {
        self.albums.get(index)
    }

    /// A fresh double-ended iterator over the albums. Every call starts over.
    pub fn iter(&self) -> slice::Iter<'_, Album> {
        self.albums.iter()
    }

    /// All songs across all albums, album by album.
    pub fn songs(&self) -> impl DoubleEndedIterator<Item = &Song> + '_ {
        self.albums.iter().flat_map(Album::iter)
    }
}

impl Index<usize> for Discography {
    type Output = Album;

    fn index(&self, index: usize) -> &Album {
        &self.albums[index]
    }
}

impl<'a> IntoIterator for &'a Discography {
    type Item = &'a Album;
    type IntoIter = slice::Iter<'a, Album>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Discography {
    type Item = Album;
    type IntoIter = std::vec::IntoIter<Album>;

    fn into_iter(self) -> Self::IntoIter {
        self.albums.into_iter()
    }
}

impl fmt::Display for Discography {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Discography({})", self.artist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTIST: &str = "The Notorious B.I.G.";

    fn album(title: &str, songs: &[&str]) -> Album {
        let songs = songs
            .iter()
            .map(|s| Song::new(*s, title, ARTIST, Some("...".into()), None))
            .collect();
        Album::new(title, ARTIST, songs, "1994")
    }

    fn discography() -> Discography {
        Discography::new(
            ARTIST,
            vec![
                album("Ready to Die", &["Intro", "Juicy"]),
                album("Life After Death", &["Hypnotize"]),
            ],
        )
    }

    #[test]
    fn test_discography_fields() {
        let disco = discography();
        assert_eq!(disco.artist(), ARTIST);
        assert_eq!(disco.len(), 2);
        assert_eq!(disco[1].title(), "Life After Death");
        assert_eq!(disco.to_string(), format!("Discography({ARTIST})"));
    }

    #[test]
    fn test_reverse_traversal_mirrors_forward() {
        let disco = discography();
        let forward: Vec<&str> = disco.iter().map(Album::title).collect();
        let backward: Vec<&str> = disco.iter().rev().map(Album::title).collect();
        assert_eq!(forward, ["Ready to Die", "Life After Death"]);
        assert_eq!(backward, ["Life After Death", "Ready to Die"]);
    }

    #[test]
    fn test_for_loop_over_reference() {
        let disco = discography();
        let mut count = 0;
        for album in &disco {
            count += album.len();
        }
        assert_eq!(count, 3);
    }

    #[test]
    fn test_songs_flattens_in_order() {
        let discography = discography();
        let titles: Vec<&str> = discography.songs().map(Song::title).collect();
        assert_eq!(titles, ["Intro", "Juicy", "Hypnotize"]);
    }

    #[test]
    fn test_empty_discography() {
        let disco = Discography::new(ARTIST, Vec::new());
        assert!(disco.is_empty());
        assert!(disco.get(0).is_none());
        assert_eq!(disco.iter().count(), 0);
    }
}
