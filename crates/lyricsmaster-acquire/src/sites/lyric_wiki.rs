use async_trait::async_trait;
use lyricsmaster_model::{Song, UNKNOWN_RELEASE_DATE};
use regex::Regex;
use std::sync::LazyLock;

use crate::adapter::SiteAdapter;
use crate::error::AdapterError;
use crate::http::Fetch;
use crate::page::{element_text, lyrics_text, next_sibling_named, selector, Page};
use crate::types::{AlbumRef, ArtistCandidate, SongLink};

const BASE_URL: &str = "http://lyrics.wikia.com";

/// Section headings on artist pages that are not albums.
const NON_ALBUM_SECTIONS: &[&str] = &["Additional_information", "External_links"];

static PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^()]+)\)").expect("valid regex"));

/// LyricWiki (lyrics.wikia.com): one wiki section per album, songs in an
/// ordered list under it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LyricWiki;

impl LyricWiki {
    /// Raw page of one album, `None` when the wiki has no such article.
    pub async fn get_album_page(
        &self,
        fetch: &dyn Fetch,
        artist: &str,
        album: &str,
    ) -> Option<String> {
        let (artist, album) = (self.clean_string(artist), self.clean_string(album));
        let url = format!("{BASE_URL}/wiki/{artist}:{album}");
        let body = fetch.fetch_text(&url).await?;
        if Page::parse(body.as_str()).has("div.noarticletext") {
            return None;
        }
        Some(body)
    }
}

#[async_trait]
impl SiteAdapter for LyricWiki {
    fn name(&self) -> &'static str {
        "LyricWiki"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    fn has_lyrics(&self, page: &Page) -> bool {
        !page.has("div.noarticletext")
    }

    fn has_artist(&self, page: &Page) -> bool {
        self.has_lyrics(page)
    }

    fn make_artist_url(&self, _artist: &str) -> Option<String> {
        None
    }

    fn make_search_artist_url(&self, artist: &str) -> String {
        format!("{BASE_URL}/wiki/Special:Search?query=%3Aartist+{}", self.clean_string(artist))
    }

    fn clean_string(&self, text: &str) -> String {
        text.replace('#', "Number_")
            .replace(['[', '{'], "(")
            .replace([']', '}'], ")")
            .replace(' ', "_")
    }

    async fn get_albums(&self, _fetch: &dyn Fetch, artist_page: &str) -> Vec<AlbumRef> {
        let page = Page::parse(artist_page);
        page.all("span.mw-headline")
            .into_iter()
            .filter(|headline| {
                let id = headline.value().attr("id").unwrap_or_default();
                !NON_ALBUM_SECTIONS.contains(&id)
            })
            .map(|headline| {
                let mut fragment = headline.html();
                // The track list follows the heading element, not the span.
                if let Some(tracks) = headline
                    .parent()
                    .and_then(scraper::ElementRef::wrap)
                    .and_then(|heading| next_sibling_named(heading, "ol"))
                {
                    fragment.push_str(&tracks.html());
                }
                AlbumRef {
                    text: element_text(headline),
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
        let text = album.text.as_str();
        let Some(cut) = text.find(" (") else {
            return Ok((text.to_string(), UNKNOWN_RELEASE_DATE.to_string()));
        };
        let release_date = PARENTHESIZED
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| UNKNOWN_RELEASE_DATE.to_string());
        Ok((text[..cut].to_string(), release_date))
    }

    async fn get_songs(&self, _fetch: &dyn Fetch, album: &AlbumRef) -> Vec<Option<SongLink>> {
        let fragment = Page::fragment(album.fragment.as_str());
        let anchor = selector("a");
        fragment
            .all("ol li")
            .into_iter()
            .map(|item| item.select(&anchor).next().and_then(SongLink::from_anchor))
            .collect()
    }

    async fn create_song(
        &self,
        fetch: &dyn Fetch,
        link: &SongLink,
        artist: &str,
        album_title: &str,
    ) -> Option<Song> {
        // Wiki titles are "Artist:Song".
        let title = match link.title.as_deref() {
            Some(title) => title.split_once(':').map_or(title, |(_, song)| song),
            None => link.text.as_str(),
        };
        if title.contains("(page does not exist") {
            tracing::warn!(site = self.name(), song = %title, "Song has no lyrics page");
            return None;
        }
        let url = link.absolute_url(BASE_URL);
        self.song_from_url(fetch, &url, title, artist, album_title).await
    }

    fn extract_lyrics(&self, page: &Page) -> Option<String> {
        page.first("div.lyricbox").and_then(lyrics_text)
    }

    fn extract_writers(&self, page: &Page) -> Option<String> {
        let credits = page.first("table.song-credit-box")?;
        credits.select(&selector("p")).last().map(element_text)
    }

    fn extract_artists_from_search(&self, page: &Page) -> Vec<ArtistCandidate> {
        let anchor = selector("a");
        page.all("div.results-wrapper ul.Results li.result")
            .into_iter()
            .filter_map(|item| item.select(&anchor).next()?.value().attr("href"))
            .map(|url| ArtistCandidate::new(artist_name_from_url(url), url))
            .collect()
    }
}

/// `http://lyrics.wikia.com/wiki/The_Notorious_B.I.G.:Juicy` names
/// "The Notorious B.I.G.".
fn artist_name_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let tag = path.rsplit('/').next().unwrap_or_default();
    let slug = tag.split(':').next().unwrap_or_default();
    let name = urlencoding::decode(slug)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| slug.to_string());
    name.split('_').collect::<Vec<_>>().join(" ")
}
