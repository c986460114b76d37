use crate::normalize;
use anyhow::{Context, Result};
use lyricsmaster_model::{Album, Discography, Song};
use std::fs;
use std::path::{Path, PathBuf};

/// Folder created under the save root.
pub const APP_FOLDER: &str = "LyricsMaster";

/// Save root used when none is given: the user's documents folder, or the
/// home directory on systems without one.
pub fn default_root() -> Result<PathBuf> {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .context("no documents or home directory to save lyrics in")
}

/// Where a song's lyrics are written:
/// `<root>/LyricsMaster/<artist>/<album>/<title>.txt`.
pub fn song_path(song: &Song, root: &Path) -> PathBuf {
    root.join(APP_FOLDER)
        .join(normalize::slugify(song.artist()))
        .join(normalize::slugify(song.album()))
        .join(format!("{}.txt", normalize::slugify(song.title())))
}

/// Write one song's lyrics. Returns the file written, or `None` when the
/// song has no lyrics to save.
pub fn save_song(song: &Song, root: Option<&Path>) -> Result<Option<PathBuf>> {
    let Some(lyrics) = song.lyrics() else {
        tracing::debug!(song = %song.title(), "No lyrics to save");
        return Ok(None);
    };

    let root = match root {
        Some(root) => root.to_path_buf(),
        None => default_root()?,
    };
    let path = song_path(song, &root);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let text = normalize::tidy_lyrics(lyrics);
    fs::write(&path, &text).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), lines = text.lines().count(), "Wrote lyrics");
    Ok(Some(path))
}

/// Write every song of an album. Returns the files written.
pub fn save_album(album: &Album, root: Option<&Path>) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for song in album {
        written.extend(save_song(song, root)?);
    }
    tracing::info!(album = %album.title(), files = written.len(), "Saved album");
    Ok(written)
}

/// Write every album of a discography. Returns the files written.
pub fn save_discography(discography: &Discography, root: Option<&Path>) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for album in discography {
        written.extend(save_album(album, root)?);
    }
    tracing::info!(artist = %discography.artist(), files = written.len(), "Saved discography");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(title: &str, lyrics: Option<&str>) -> Song {
        Song::new(
            title,
            "Ready to Die",
            "The Notorious B.I.G.",
            lyrics.map(str::to_string),
            Some("Christopher Wallace".to_string()),
        )
    }

    #[test]
    fn test_song_path_layout() {
        let path = song_path(&song("Things Done Changed", None), Path::new("/music"));
        assert_eq!(
            path,
            Path::new("/music/LyricsMaster/The-Notorious-BIG/Ready-to-Die/Things-Done-Changed.txt")
        );
    }

    #[test]
    fn test_saved_lyrics_read_back() {
        let root = tempfile::tempdir().unwrap();
        let lyrics = "Remember back in the days\n\nGazelle shades, and corn braids";
        let path = save_song(&song("Things Done Changed", Some(lyrics)), Some(root.path()))
            .unwrap()
            .unwrap();

        assert!(path.starts_with(root.path()));
        assert_eq!(fs::read_to_string(&path).unwrap(), lyrics);
    }

    #[test]
    fn test_song_without_lyrics_is_skipped() {
        let root = tempfile::tempdir().unwrap();
        assert!(save_song(&song("Intro", None), Some(root.path())).unwrap().is_none());
        assert!(!root.path().join(APP_FOLDER).exists());
    }

    #[test]
    fn test_save_discography() {
        let root = tempfile::tempdir().unwrap();
        let album = Album::new(
            "Ready to Die",
            "The Notorious B.I.G.",
            vec![
                song("Intro", None),
                song("Juicy", Some("It was all a dream")),
                song("Unbelievable", Some("Live from Bedford-Stuyvesant")),
            ],
            "1994",
        );
        let discography = Discography::new("The Notorious B.I.G.", vec![album]);

        let written = save_discography(&discography, Some(root.path())).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(fs::read_to_string(&written[0]).unwrap(), "It was all a dream");
        assert!(written[1].ends_with("Ready-to-Die/Unbelievable.txt"));
    }
}
