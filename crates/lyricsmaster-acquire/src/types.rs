use scraper::ElementRef;
use serde::{Deserialize, Serialize};

/// An album entry as found on an artist page.
///
/// Adapters keep whatever they need to come back to the album later: its
/// visible heading, a link to its own page, and/or the raw markup that
/// lists its songs. Everything is owned so albums can be handed to workers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumRef {
    /// Visible heading text of the album entry.
    pub text: String,
    /// Link to a dedicated album page, when the site has one.
    pub href: Option<String>,
    /// Outer HTML of the album entry and its track listing.
    pub fragment: String,
}

/// A link to one song's lyrics page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongLink {
    /// Visible link text. The song filter matches against this.
    pub text: String,
    pub href: String,
    /// `title` attribute, which some sites use for the canonical name.
    pub title: Option<String>,
}

impl SongLink {
    /// Read an `<a>` element. Anchors without `href` are not links to a song.
    pub fn from_anchor(anchor: ElementRef) -> Option<Self> {
        let href = anchor.value().attr("href")?;
        Some(Self {
            text: anchor.text().collect::<String>().trim().to_string(),
            href: href.to_string(),
            title: anchor.value().attr("title").map(str::to_string),
        })
    }

    /// Absolute URL of the lyrics page, resolving site-relative links.
    pub fn absolute_url(&self, base_url: &str) -> String {
        absolute_url(base_url, &self.href)
    }
}

/// `href` as found on a page of `base_url`, made absolute.
pub fn absolute_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{base_url}{href}")
    } else {
        format!("{base_url}/{href}")
    }
}

/// An artist returned by a site's search page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistCandidate {
    pub name: String,
    pub url: String,
}

impl ArtistCandidate {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}
