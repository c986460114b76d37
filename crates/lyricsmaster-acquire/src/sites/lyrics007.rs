use async_trait::async_trait;
use lyricsmaster_model::{Song, UNKNOWN_RELEASE_DATE};

use crate::adapter::SiteAdapter;
use crate::error::AdapterError;
use crate::http::Fetch;
use crate::page::{element_text, lyrics_text, next_sibling_named, selector, Page};
use crate::types::{AlbumRef, ArtistCandidate, SongLink};

const BASE_URL: &str = "https://www.lyrics007.com";

/// lyrics007.com: artist pages alternate album headings (`<li>`) and
/// track lists (`<ul>`).
#[derive(Debug, Default, Clone, Copy)]
pub struct Lyrics007;

#[async_trait]
impl SiteAdapter for Lyrics007 {
    fn name(&self) -> &'static str {
        "Lyrics007"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    fn has_lyrics(&self, page: &Page) -> bool {
        page.has("div.lyrics")
    }

    fn has_artist(&self, page: &Page) -> bool {
        page.has("ul.song_title")
    }

    fn make_artist_url(&self, _artist: &str) -> Option<String> {
        None
    }

    fn make_search_artist_url(&self, artist: &str) -> String {
        let query: String = artist
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '.' { c } else { '+' })
            .collect();
        format!("{BASE_URL}/search.php?category=artist&q={query}")
    }

    fn clean_string(&self, text: &str) -> String {
        text.to_string()
    }

    async fn get_albums(&self, _fetch: &dyn Fetch, artist_page: &str) -> Vec<AlbumRef> {
        let page = Page::parse(artist_page);
        page.all("div.content > li")
            .into_iter()
            .map(|heading| {
                let mut fragment = heading.html();
                if let Some(tracks) = next_sibling_named(heading, "ul") {
                    fragment.push_str(&tracks.html());
                }
                AlbumRef {
                    text: element_text(heading),
                    href: None,
                    fragment,
                }
            })
            .collect()
    }

    async fn get_album_infos(
        &self,
        _fetch: &dyn Fetch,
        album: &AlbumRef,
    ) -> Result<(String, String), AdapterError> {
        Ok(split_heading(&album.text))
    }

    async fn get_songs(&self, _fetch: &dyn Fetch, album: &AlbumRef) -> Vec<Option<SongLink>> {
        let fragment = Page::fragment(album.fragment.as_str());
        let anchor = selector("a");
        fragment
            .all("ul li")
            .into_iter()
            .filter_map(|item| item.select(&anchor).next())
            .map(SongLink::from_anchor)
            .collect()
    }

    async fn create_song(
        &self,
        fetch: &dyn Fetch,
        link: &SongLink,
        artist: &str,
        album_title: &str,
    ) -> Option<Song> {
        let url = link.absolute_url(BASE_URL);
        self.song_from_url(fetch, &url, &link.text, artist, album_title).await
    }

    fn extract_lyrics(&self, page: &Page) -> Option<String> {
        page.first("div.lyrics").and_then(lyrics_text)
    }

    fn extract_writers(&self, page: &Page) -> Option<String> {
        page.strings()
            .map(str::trim)
            .find(|s| {
                let lower = s.to_lowercase();
                lower.starts_with("writers:") || lower.starts_with("writer:")
            })
            .map(str::to_string)
    }

    fn extract_artists_from_search(&self, page: &Page) -> Vec<ArtistCandidate> {
        let anchor = selector("a");
        page.all("div#search_result h2")
            .into_iter()
            .filter_map(|heading| heading.select(&anchor).next())
            .filter_map(|a| {
                let href = a.value().attr("href")?;
                Some(ArtistCandidate::new(element_text(a), format!("{BASE_URL}{href}")))
            })
            .collect()
    }
}

/// `"1994: Ready to Die"` is (title, date); a heading without a date keeps
/// the whole text as title.
fn split_heading(text: &str) -> (String, String) {
    let parts: Vec<&str> = text.split(": ").collect();
    match parts.as_slice() {
        [date, title] => (title.to_string(), date.to_string()),
        _ => (text.to_string(), UNKNOWN_RELEASE_DATE.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeFetch;

    const ARTIST_PAGE: &str = r#"
    <html><body>
    <ul class="song_title"><li>The Notorious B.I.G. Lyrics</li></ul>
    <div class="content">
      <li>1994: Ready to Die</li>
      <ul>
        <li><a href="/The%20Notorious%20B.I.G.%20Lyrics/Intro%20Lyrics.html">Intro</a></li>
        <li>Unreleased skit</li>
        <li><a href="/The%20Notorious%20B.I.G.%20Lyrics/Things%20Done%20Changed%20Lyrics.html">Things Done Changed</a></li>
      </ul>
      <li>Greatest Hits</li>
      <ul>
        <li><a href="/The%20Notorious%20B.I.G.%20Lyrics/Juicy%20Lyrics.html">Juicy</a></li>
      </ul>
    </div>
    </body></html>
    "#;

    const LYRICS_PAGE: &str = r#"
    <html><body>
      <div class="lyrics">Remember back in the days<br>Gazelle shades, and corn braids<br></div>
      <div class="credits">
        <p>Writer: Christopher Wallace, Darnell Scott</p>
      </div>
    </body></html>
    "#;

    const SEARCH_PAGE: &str = r#"
    <html><body><div id="search_result">
      <h2><a href="/artist/The%20Notorious%20B.I.G.">The Notorious B.I.G.</a></h2>
      <h2><a href="/artist/Notorious">Notorious</a></h2>
      <h2>no link here</h2>
    </div></body></html>
    "#;

    #[tokio::test]
    async fn test_albums_and_songs() {
        let fetch = FakeFetch::new();
        let albums = Lyrics007.get_albums(&fetch, ARTIST_PAGE).await;
        assert_eq!(albums.len(), 2);

        let (title, date) = Lyrics007.get_album_infos(&fetch, &albums[0]).await.unwrap();
        assert_eq!((title.as_str(), date.as_str()), ("Ready to Die", "1994"));
        let (title, date) = Lyrics007.get_album_infos(&fetch, &albums[1]).await.unwrap();
        assert_eq!((title.as_str(), date.as_str()), ("Greatest Hits", UNKNOWN_RELEASE_DATE));

        let songs = Lyrics007.get_songs(&fetch, &albums[0]).await;
        let titles: Vec<String> = songs.into_iter().flatten().map(|l| l.text).collect();
        assert_eq!(titles, ["Intro", "Things Done Changed"]);
    }

    #[tokio::test]
    async fn test_create_song() {
        let fetch = FakeFetch::new().page(
            "https://www.lyrics007.com/The Notorious B.I.G. Lyrics/Things Done Changed Lyrics.html",
            LYRICS_PAGE,
        );
        let link = SongLink {
            text: "Things Done Changed".into(),
            href: "/The%20Notorious%20B.I.G.%20Lyrics/Things%20Done%20Changed%20Lyrics.html".into(),
            title: None,
        };
        let song = Lyrics007
            .create_song(&fetch, &link, "The Notorious B.I.G.", "Ready to Die")
            .await
            .unwrap();
        assert_eq!(
            song.lyrics(),
            Some("Remember back in the days\nGazelle shades, and corn braids")
        );
        assert_eq!(song.writers(), Some("Writer: Christopher Wallace, Darnell Scott"));
    }

    #[test]
    fn test_page_checks() {
        assert!(Lyrics007.has_artist(&Page::parse(ARTIST_PAGE)));
        assert!(!Lyrics007.has_artist(&Page::parse(LYRICS_PAGE)));
        assert!(Lyrics007.has_lyrics(&Page::parse(LYRICS_PAGE)));
        assert_eq!(Lyrics007.extract_writers(&Page::parse(ARTIST_PAGE)), None);
    }

    #[test]
    fn test_search() {
        assert_eq!(
            Lyrics007.make_search_artist_url("The Notorious B.I.G."),
            "https://www.lyrics007.com/search.php?category=artist&q=The+Notorious+B.I.G."
        );
        let found = Lyrics007.extract_artists_from_search(&Page::parse(SEARCH_PAGE));
        assert_eq!(
            found,
            [
                ArtistCandidate::new(
                    "The Notorious B.I.G.",
                    "https://www.lyrics007.com/artist/The%20Notorious%20B.I.G."
                ),
                ArtistCandidate::new("Notorious", "https://www.lyrics007.com/artist/Notorious"),
            ]
        );
    }

    #[test]
    fn test_split_heading() {
        assert_eq!(
            split_heading("1997: Life After Death"),
            ("Life After Death".into(), "1997".into())
        );
        assert_eq!(split_heading("A: B: C"), ("A: B: C".into(), UNKNOWN_RELEASE_DATE.into()));
    }
}
