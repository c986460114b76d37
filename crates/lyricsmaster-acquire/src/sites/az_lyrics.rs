use async_trait::async_trait;
use lyricsmaster_model::{Song, UNKNOWN_RELEASE_DATE};
use regex::Regex;
use scraper::ElementRef;
use std::sync::LazyLock;

use crate::adapter::SiteAdapter;
use crate::error::AdapterError;
use crate::http::Fetch;
use crate::page::{element_text, lyrics_text, selector, Page};
use crate::types::{AlbumRef, ArtistCandidate, SongLink};

const BASE_URL: &str = "https://www.azlyrics.com";
const SEARCH_URL: &str = "https://search.azlyrics.com/search.php?q=";

static QUOTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""([^"]*)""#).expect("valid regex"));
static PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^()]+)\)").expect("valid regex"));

/// azlyrics.com: artist pages list every album inline, songs are plain links.
#[derive(Debug, Default, Clone, Copy)]
pub struct AzLyrics;

#[async_trait]
impl SiteAdapter for AzLyrics {
    fn name(&self) -> &'static str {
        "AzLyrics"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    fn has_lyrics(&self, page: &Page) -> bool {
        page.has("div.lyricsh")
    }

    fn has_artist(&self, page: &Page) -> bool {
        page.has("div#listAlbum")
    }

    fn make_artist_url(&self, _artist: &str) -> Option<String> {
        None
    }

    fn make_search_artist_url(&self, artist: &str) -> String {
        format!("{SEARCH_URL}{artist}")
    }

    fn clean_string(&self, text: &str) -> String {
        text.to_string()
    }

    async fn get_albums(&self, _fetch: &dyn Fetch, artist_page: &str) -> Vec<AlbumRef> {
        split_album_listing(&Page::parse(artist_page))
    }

    async fn get_album_infos(
        &self,
        _fetch: &dyn Fetch,
        album: &AlbumRef,
    ) -> Result<(String, String), AdapterError> {
        let title = QUOTED
            .captures(&album.text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| {
                AdapterError::MalformedPage(format!("no quoted album title in {:?}", album.text))
            })?;
        let release_date = PARENTHESIZED
            .captures(&album.text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| UNKNOWN_RELEASE_DATE.to_string());
        Ok((title, release_date))
    }

    async fn get_songs(&self, _fetch: &dyn Fetch, album: &AlbumRef) -> Vec<Option<SongLink>> {
        let fragment = Page::fragment(album.fragment.as_str());
        fragment.all("a").into_iter().map(SongLink::from_anchor).collect()
    }

    async fn create_song(
        &self,
        fetch: &dyn Fetch,
        link: &SongLink,
        artist: &str,
        album_title: &str,
    ) -> Option<Song> {
        let url = format!("{BASE_URL}{}", link.href.replace("..", ""));
        self.song_from_url(fetch, &url, &link.text, artist, album_title).await
    }

    fn extract_lyrics(&self, page: &Page) -> Option<String> {
        page.first("div:not([class]):not([id])").and_then(lyrics_text)
    }

    fn extract_writers(&self, page: &Page) -> Option<String> {
        page.all("div.smt")
            .last()
            .map(|div| element_text(*div))
            .filter(|writers| !writers.is_empty())
    }

    fn extract_artists_from_search(&self, page: &Page) -> Vec<ArtistCandidate> {
        let Some(heading) = page.first("div.panel-heading") else {
            return Vec::new();
        };
        let Some(table) = crate::page::next_sibling_named(heading, "table") else {
            return Vec::new();
        };
        let bold = selector("b");
        table
            .select(&selector("a"))
            .filter_map(|a| {
                let name = element_text(a.select(&bold).next()?);
                let url = a.value().attr("href")?;
                Some(ArtistCandidate::new(name, url))
            })
            .collect()
    }
}

/// Cut `#listAlbum` into one entry per `div.album` heading, each carrying
/// the heading and every element up to the next heading.
fn split_album_listing(page: &Page) -> Vec<AlbumRef> {
    let Some(listing) = page.first("div#listAlbum") else {
        return Vec::new();
    };

    let mut albums = Vec::new();
    let mut current: Option<AlbumRef> = None;
    for child in listing.children().filter_map(ElementRef::wrap) {
        if is_album_heading(child) {
            albums.extend(current.take());
            current = Some(AlbumRef {
                text: element_text(child),
                href: None,
                fragment: child.html(),
            });
        } else if let Some(album) = current.as_mut() {
            album.fragment.push_str(&child.html());
        }
    }
    albums.extend(current);
    albums
}

fn is_album_heading(element: ElementRef) -> bool {
    element.value().name() == "div" && element.value().classes().any(|c| c == "album")
}
