use async_trait::async_trait;
use lyricsmaster_model::{Song, UNKNOWN_RELEASE_DATE};

use crate::adapter::SiteAdapter;
use crate::error::AdapterError;
use crate::http::Fetch;
use crate::page::{collect_text, element_text, selector, Page};
use crate::types::{absolute_url, AlbumRef, ArtistCandidate, SongLink};

const BASE_URL: &str = "https://www.musixmatch.com";
const TRACK_ITEMS: &str =
    r#"div.mxm-album__tracks.mxm-collection-container li[class^="mui-collection__item"]"#;

/// musixmatch.com: the artist page links to an albums tab; each album has
/// its own track page.
#[derive(Debug, Default, Clone, Copy)]
pub struct MusixMatch;

#[async_trait]
impl SiteAdapter for MusixMatch {
    fn name(&self) -> &'static str {
        "MusixMatch"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    fn has_lyrics(&self, page: &Page) -> bool {
        page.has("div.mxm-lyrics")
    }

    fn has_artist(&self, page: &Page) -> bool {
        page.has("div.artist-page.main-wrapper")
    }

    fn make_artist_url(&self, _artist: &str) -> Option<String> {
        None
    }

    fn make_search_artist_url(&self, artist: &str) -> String {
        format!("{BASE_URL}/search/{artist}/artists")
    }

    fn clean_string(&self, text: &str) -> String {
        let text = text.replace([' ', '.'], "-");
        text.strip_suffix('-').unwrap_or(&text).to_string()
    }

    async fn get_albums(&self, fetch: &dyn Fetch, artist_page: &str) -> Vec<AlbumRef> {
        let albums_url = {
            let page = Page::parse(artist_page);
            page.first("li#albums a")
                .and_then(|a| a.value().attr("href"))
                .map(absolute)
        };
        let Some(albums_url) = albums_url else {
            tracing::debug!(site = self.name(), "Artist page has no albums tab");
            return Vec::new();
        };
        let Some(body) = fetch.fetch_text(&albums_url).await else {
            return Vec::new();
        };

        let page = Page::parse(body);
        let (title, link) = (selector("h2"), selector("a"));
        page.all("div.media-card-text")
            .into_iter()
            .map(|card| AlbumRef {
                text: card.select(&title).next().map(element_text).unwrap_or_default(),
                href: card
                    .select(&link)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .map(str::to_string),
                fragment: card.html(),
            })
            .collect()
    }

    async fn get_album_infos(
        &self,
        _fetch: &dyn Fetch,
        album: &AlbumRef,
    ) -> Result<(String, String), AdapterError> {
        let card = Page::fragment(album.fragment.as_str());
        let title = card
            .first("h2")
            .map(element_text)
            .ok_or_else(|| {
                AdapterError::MalformedPage(format!("album card without title: {}", album.fragment))
            })?;
        let release_date = card
            .first("h3")
            .map(element_text)
            .unwrap_or_else(|| UNKNOWN_RELEASE_DATE.to_string());
        Ok((title, release_date))
    }

    async fn get_songs(&self, fetch: &dyn Fetch, album: &AlbumRef) -> Vec<Option<SongLink>> {
        let Some(href) = album.href.as_deref() else {
            return Vec::new();
        };
        let Some(body) = fetch.fetch_text(&absolute(href)).await else {
            return Vec::new();
        };
        let page = Page::parse(body);
        let anchor = selector("a");
        page.all(TRACK_ITEMS)
            .into_iter()
            .map(|item| item.select(&anchor).next().and_then(SongLink::from_anchor))
            .collect()
    }

    /// Pages without lyric paragraphs (instrumentals, restricted tracks) give no song.
    async fn create_song(
        &self,
        fetch: &dyn Fetch,
        link: &SongLink,
        artist: &str,
        album_title: &str,
    ) -> Option<Song> {
        let body = self.get_lyrics_page(fetch, &link.absolute_url(BASE_URL)).await?;
        let page = Page::parse(body);
        let lyrics = self.extract_lyrics(&page)?;
        let writers = self.extract_writers(&page);
        Some(Song::new(link.text.as_str(), album_title, artist, Some(lyrics), writers))
    }

    fn extract_lyrics(&self, page: &Page) -> Option<String> {
        let paragraphs = page.all(r#"p[class^="mxm-lyrics__content"]"#);
        if paragraphs.is_empty() {
            return None;
        }
        let lyrics = paragraphs.into_iter().map(collect_text).collect::<Vec<_>>().join("\n");
        Some(lyrics.trim().to_string())
    }

    fn extract_writers(&self, page: &Page) -> Option<String> {
        page.first(r#"p[class^="mxm-lyrics__copyright"]"#).map(element_text)
    }

    fn extract_artists_from_search(&self, page: &Page) -> Vec<ArtistCandidate> {
        page.all("div.box-content div.media-card-body a.cover")
            .into_iter()
            .filter_map(|a| {
                let href = a.value().attr("href")?;
                Some(ArtistCandidate::new(element_text(a), absolute(href)))
            })
            .collect()
    }
}

fn absolute(href: &str) -> String {
    absolute_url(BASE_URL, href)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeFetch;

    const ARTIST_PAGE: &str = r#"
    <html><body><div class="artist-page main-wrapper">
      <ul class="tabs">
        <li id="tracks"><a href="/artist/The-Notorious-B-I-G">Tracks</a></li>
        <li id="albums"><a href="/artist/The-Notorious-B-I-G/albums">Albums</a></li>
      </ul>
    </div></body></html>
    "#;

    const ALBUMS_PAGE: &str = r#"
    <html><body>
      <div class="media-card-text">
        <h2 class="media-card-title"><a href="/album/The-Notorious-B-I-G/Ready-to-Die">Ready to Die</a></h2>
        <h3 class="media-card-subtitle">Sep 1994</h3>
      </div>
      <div class="media-card-text">
        <h2 class="media-card-title"><a href="/album/The-Notorious-B-I-G/Duets">Duets: The Final Chapter</a></h2>
      </div>
    </body></html>
    "#;

    const ALBUM_PAGE: &str = r#"
    <html><body>
      <div class="mxm-album__tracks mxm-collection-container"><ul>
        <li class="mui-collection__item mui-collection__item--1"><h2><a href="/lyrics/The-Notorious-B-I-G/Intro">Intro</a></h2></li>
        <li class="mui-collection__item mui-collection__item--2"><h2><a href="/lyrics/The-Notorious-B-I-G/Things-Done-Changed">Things Done Changed</a></h2></li>
        <li class="mui-collection__item"><h2>Removed</h2></li>
      </ul></div>
    </body></html>
    "#;

    const LYRICS_PAGE: &str = r#"
    <html><body><div class="mxm-lyrics">
      <p class="mxm-lyrics__content ">Remember back in the days</p>
      <p class="mxm-lyrics__content ">Gazelle shades, and corn braids</p>
      <p class="mxm-lyrics__copyright">Writer(s): Christopher Wallace, Osten Harvey Jr.</p>
    </div></body></html>
    "#;

    const RESTRICTED_PAGE: &str =
        r#"<html><body><div class="mxm-lyrics"><span>Restricted lyrics</span></div></body></html>"#;

    const SEARCH_PAGE: &str = r#"
    <html><body><div class="box-content">
      <div class="media-card-body"><a class="cover" href="/artist/The-Notorious-B-I-G">The Notorious B.I.G.</a></div>
      <div class="media-card-body"><a class="cover" href="/artist/Notorious-2">Notorious</a></div>
    </div></body></html>
    "#;

    fn fixtures() -> FakeFetch {
        FakeFetch::new()
            .page("https://www.musixmatch.com/artist/The-Notorious-B-I-G/albums", ALBUMS_PAGE)
            .page("https://www.musixmatch.com/album/The-Notorious-B-I-G/Ready-to-Die", ALBUM_PAGE)
            .page(
                "https://www.musixmatch.com/lyrics/The-Notorious-B-I-G/Things-Done-Changed",
                LYRICS_PAGE,
            )
            .page("https://www.musixmatch.com/lyrics/The-Notorious-B-I-G/Intro", RESTRICTED_PAGE)
    }

    #[tokio::test]
    async fn test_albums_from_albums_tab() {
        let fetch = fixtures();
        let albums = MusixMatch.get_albums(&fetch, ARTIST_PAGE).await;
        assert_eq!(albums.len(), 2);
        assert_eq!(albums[1].text, "Duets: The Final Chapter");

        let infos = MusixMatch.get_album_infos(&fetch, &albums[0]).await.unwrap();
        assert_eq!(infos, ("Ready to Die".to_string(), "Sep 1994".to_string()));
        let infos = MusixMatch.get_album_infos(&fetch, &albums[1]).await.unwrap();
        assert_eq!(infos.1, UNKNOWN_RELEASE_DATE);
    }

    #[tokio::test]
    async fn test_songs_and_lyrics() {
        let fetch = fixtures();
        let albums = MusixMatch.get_albums(&fetch, ARTIST_PAGE).await;
        let songs = MusixMatch.get_songs(&fetch, &albums[0]).await;
        assert_eq!(songs.len(), 3);
        assert!(songs[2].is_none());

        let links: Vec<SongLink> = songs.into_iter().flatten().collect();
        let song = MusixMatch
            .create_song(&fetch, &links[1], "The Notorious B.I.G.", "Ready to Die")
            .await
            .unwrap();
        assert_eq!(song.title(), "Things Done Changed");
        assert_eq!(
            song.lyrics(),
            Some("Remember back in the days\nGazelle shades, and corn braids")
        );
        assert_eq!(song.writers(), Some("Writer(s): Christopher Wallace, Osten Harvey Jr."));

        // Lyrics page without lyric paragraphs.
        let restricted = MusixMatch
            .create_song(&fetch, &links[0], "The Notorious B.I.G.", "Ready to Die")
            .await;
        assert!(restricted.is_none());
        // Album page not reachable.
        assert!(MusixMatch.get_songs(&fetch, &albums[1]).await.is_empty());
    }

    #[test]
    fn test_clean_string() {
        assert_eq!(MusixMatch.clean_string("The Notorious B.I.G."), "The-Notorious-B-I-G");
        assert_eq!(MusixMatch.clean_string("Nas"), "Nas");
        assert_eq!(
            MusixMatch.make_search_artist_url("The-Notorious-B-I-G"),
            "https://www.musixmatch.com/search/The-Notorious-B-I-G/artists"
        );
    }

    #[test]
    fn test_page_checks_and_search() {
        assert!(MusixMatch.has_artist(&Page::parse(ARTIST_PAGE)));
        assert!(!MusixMatch.has_artist(&Page::parse(ALBUMS_PAGE)));
        assert!(MusixMatch.has_lyrics(&Page::parse(LYRICS_PAGE)));
        assert_eq!(MusixMatch.extract_lyrics(&Page::parse(RESTRICTED_PAGE)), None);

        let found = MusixMatch.extract_artists_from_search(&Page::parse(SEARCH_PAGE));
        assert_eq!(
            found[0],
            ArtistCandidate::new(
                "The Notorious B.I.G.",
                "https://www.musixmatch.com/artist/The-Notorious-B-I-G"
            )
        );
        assert_eq!(found.len(), 2);
    }
}
