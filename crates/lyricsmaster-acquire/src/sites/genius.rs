use async_trait::async_trait;
use lyricsmaster_model::{Song, UNKNOWN_RELEASE_DATE};
use serde::Deserialize;

use crate::adapter::SiteAdapter;
use crate::error::AdapterError;
use crate::http::Fetch;
use crate::page::{element_text, lyrics_text, Page};
use crate::types::{absolute_url, AlbumRef, ArtistCandidate, SongLink};

const BASE_URL: &str = "https://genius.com";
/// Web search backend; answers JSON, not markup.
const SEARCH_URL: &str = "https://genius.com/api/search/multi?per_page=5&q=";

const TRACK_ROW: &str =
    "div.chart_row.chart_row--light_border.chart_row--full_bleed_left.chart_row--align_baseline.chart_row--no_hover";

/// genius.com: albums and tracks live on their own pages, so most
/// operations fetch.
#[derive(Debug, Default, Clone, Copy)]
pub struct Genius;

#[derive(Deserialize)]
struct SearchReply {
    response: SearchResponse,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    sections: Vec<SearchSection>,
}

#[derive(Deserialize)]
struct SearchSection {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    #[serde(rename = "type", default)]
    kind: String,
    result: serde_json::Value,
}

#[async_trait]
impl SiteAdapter for Genius {
    fn name(&self) -> &'static str {
        "Genius"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    fn has_lyrics(&self, page: &Page) -> bool {
        page.has("div.song_body-lyrics")
    }

    fn has_artist(&self, page: &Page) -> bool {
        !page.has("div.render_404")
    }

    fn make_artist_url(&self, _artist: &str) -> Option<String> {
        None
    }

    fn make_search_artist_url(&self, artist: &str) -> String {
        format!("{SEARCH_URL}{}", urlencoding::encode(artist))
    }

    fn clean_string(&self, text: &str) -> String {
        text.to_string()
    }

    async fn get_albums(&self, fetch: &dyn Fetch, artist_page: &str) -> Vec<AlbumRef> {
        let albums_url = albums_listing_url(&Page::parse(artist_page));
        let Some(albums_url) = albums_url else {
            tracing::debug!(site = self.name(), "Artist page has no song listing link");
            return Vec::new();
        };
        let Some(body) = fetch.fetch_text(&albums_url).await else {
            return Vec::new();
        };
        Page::parse(body)
            .all("a.album_link")
            .into_iter()
            .map(|link| AlbumRef {
                text: element_text(link),
                href: link.value().attr("href").map(str::to_string),
                fragment: link.html(),
            })
            .collect()
    }

    async fn get_album_infos(
        &self,
        fetch: &dyn Fetch,
        album: &AlbumRef,
    ) -> Result<(String, String), AdapterError> {
        let body = self.album_page(fetch, album).await?;
        let page = Page::parse(body);
        let release_date = page
            .all("div.header_with_cover_art-primary_info div.metadata_unit")
            .into_iter()
            .map(element_text)
            .find(|text| text.starts_with("Released"))
            .unwrap_or_else(|| UNKNOWN_RELEASE_DATE.to_string());
        Ok((album.text.clone(), release_date))
    }

    async fn album_title(&self, _fetch: &dyn Fetch, album: &AlbumRef) -> Option<String> {
        Some(album.text.clone())
    }

    async fn get_songs(&self, fetch: &dyn Fetch, album: &AlbumRef) -> Vec<Option<SongLink>> {
        let Ok(body) = self.album_page(fetch, album).await else {
            return Vec::new();
        };
        let page = Page::parse(body);
        let anchor = crate::page::selector("a");
        page.all(TRACK_ROW)
            .into_iter()
            .map(|row| row.select(&anchor).next().and_then(SongLink::from_anchor))
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
        // Track rows carry the title followed by the "Lyrics" label on later lines.
        let title = link.text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or_default();
        self.song_from_url(fetch, &url, title, artist, album_title).await
    }

    fn extract_lyrics(&self, page: &Page) -> Option<String> {
        page.first("div.lyrics").and_then(lyrics_text)
    }

    fn extract_writers(&self, page: &Page) -> Option<String> {
        let label = page
            .all("span.metadata_unit-label")
            .into_iter()
            .find(|label| element_text(*label) == "Written By")?;
        label
            .next_siblings()
            .filter_map(scraper::ElementRef::wrap)
            .find(|sibling| {
                sibling.value().name() == "span"
                    && sibling.value().classes().any(|c| c == "metadata_unit-info")
            })
            .map(element_text)
    }

    fn extract_artists_from_search(&self, page: &Page) -> Vec<ArtistCandidate> {
        let reply: SearchReply = match serde_json::from_str(page.raw()) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(site = self.name(), error = %e, "Unreadable search reply");
                return Vec::new();
            }
        };
        let mut sections = reply.response.sections;
        // Artist sections first, keeping the order within each group.
        sections.sort_by_key(|section| section.kind != "artist");
        sections
            .into_iter()
            .flat_map(|section| section.hits)
            .filter(|hit| hit.kind == "artist")
            .filter_map(|hit| {
                let name = hit.result.get("name")?.as_str()?;
                let url = hit.result.get("url")?.as_str()?;
                Some(ArtistCandidate::new(name, url))
            })
            .collect()
    }
}

impl Genius {
    async fn album_page(
        &self,
        fetch: &dyn Fetch,
        album: &AlbumRef,
    ) -> Result<String, AdapterError> {
        let href = album.href.as_deref().ok_or_else(|| {
            AdapterError::MalformedPage(format!("album link without href: {}", album.text))
        })?;
        let url = absolute_url(BASE_URL, href);
        fetch.fetch_text(&url).await.ok_or(AdapterError::Unreachable(url))
    }
}

/// The artist page links to "all songs"; the albums listing shares its query.
fn albums_listing_url(page: &Page) -> Option<String> {
    let href = page.first("a.full_width_button")?.value().attr("href")?;
    let href = href.replace("songs?", "albums?");
    Some(absolute_url(BASE_URL, &href))
}
