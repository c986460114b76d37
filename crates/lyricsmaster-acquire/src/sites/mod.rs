//! Supported lyrics websites.

use std::sync::Arc;

use crate::adapter::SiteAdapter;

mod az_lyrics;
mod genius;
mod lyric_wiki;
mod lyrics007;
mod musix_match;

pub use az_lyrics::AzLyrics;
pub use genius::Genius;
pub use lyric_wiki::LyricWiki;
pub use lyrics007::Lyrics007;
pub use musix_match::MusixMatch;

/// Registry keys accepted by [`by_name`].
pub const NAMES: &[&str] = &["azlyrics", "genius", "lyrics007", "lyricwiki", "musixmatch"];

/// Look up a site by its registry key (case-insensitive).
pub fn by_name(name: &str) -> Option<Arc<dyn SiteAdapter>> {
    let adapter: Arc<dyn SiteAdapter> = match name.to_ascii_lowercase().as_str() {
        "azlyrics" => Arc::new(AzLyrics),
        "genius" => Arc::new(Genius),
        "lyrics007" => Arc::new(Lyrics007),
        "lyricwiki" => Arc::new(LyricWiki),
        "musixmatch" => Arc::new(MusixMatch),
        _ => return None,
    };
    Some(adapter)
}
