use async_trait::async_trait;
use lyricsmaster_model::Song;

use crate::error::AdapterError;
use crate::http::Fetch;
use crate::page::Page;
use crate::types::{AlbumRef, ArtistCandidate, SongLink};

/// What a lyrics website must provide to be driven by
/// [`LyricsProvider`](crate::provider::LyricsProvider).
///
/// Each site owns its URL scheme and markup selectors. Methods that only
/// read a page are synchronous; methods that may need to follow a link
/// (an albums tab, an album page, a lyrics page) get the session to fetch
/// with. "Not found" is always `None` or an empty list, never an error.
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    /// Display name, e.g. `"AzLyrics"`.
    fn name(&self) -> &'static str;

    fn base_url(&self) -> &'static str;

    /// Whether a downloaded page actually holds lyrics.
    fn has_lyrics(&self, page: &Page) -> bool;

    /// Whether a downloaded page is an existing artist's page.
    fn has_artist(&self, page: &Page) -> bool;

    /// Direct artist page URL, or `None` when the site can only be searched.
    fn make_artist_url(&self, artist: &str) -> Option<String>;

    fn make_search_artist_url(&self, artist: &str) -> String;

    /// Reshape a name the way the site spells it in URLs.
    fn clean_string(&self, text: &str) -> String;

    /// Album entries of an artist page, in listing order.
    async fn get_albums(&self, fetch: &dyn Fetch, artist_page: &str) -> Vec<AlbumRef>;

    /// Album title and release date. The date falls back to
    /// [`UNKNOWN_RELEASE_DATE`](lyricsmaster_model::UNKNOWN_RELEASE_DATE).
    async fn get_album_infos(
        &self,
        fetch: &dyn Fetch,
        album: &AlbumRef,
    ) -> Result<(String, String), AdapterError>;

    /// Song links of an album. Entries without a usable link are `None`.
    async fn get_songs(&self, fetch: &dyn Fetch, album: &AlbumRef) -> Vec<Option<SongLink>>;

    /// Download and read one song. `None` when the lyrics page is missing.
    async fn create_song(
        &self,
        fetch: &dyn Fetch,
        link: &SongLink,
        artist: &str,
        album_title: &str,
    ) -> Option<Song>;

    fn extract_lyrics(&self, page: &Page) -> Option<String>;

    fn extract_writers(&self, page: &Page) -> Option<String>;

    fn extract_artists_from_search(&self, page: &Page) -> Vec<ArtistCandidate>;

    /// Download a lyrics page, keeping it only if it has lyrics.
    async fn get_lyrics_page(&self, fetch: &dyn Fetch, url: &str) -> Option<String> {
        let body = fetch.fetch_text(url).await?;
        if self.has_lyrics(&Page::parse(body.as_str())) {
            Some(body)
        } else {
            tracing::debug!(site = self.name(), url = %url, "No lyrics on page");
            None
        }
    }

    /// Album title only, for filtering albums before their songs are listed.
    ///
    /// Sites that keep the title on the entry itself override this to
    /// avoid fetching the album page.
    async fn album_title(&self, fetch: &dyn Fetch, album: &AlbumRef) -> Option<String> {
        self.get_album_infos(fetch, album).await.ok().map(|(title, _)| title)
    }

    /// Download `url` and build a song from it with this site's extractors.
    async fn song_from_url(
        &self,
        fetch: &dyn Fetch,
        url: &str,
        title: &str,
        artist: &str,
        album_title: &str,
    ) -> Option<Song> {
        let body = self.get_lyrics_page(fetch, url).await?;
        let page = Page::parse(body);
        let lyrics = self.extract_lyrics(&page);
        let writers = self.extract_writers(&page);
        Some(Song::new(title, album_title, artist, lyrics, writers))
    }
}
