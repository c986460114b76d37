//! Discography download engine shared by every site.
//!
//! Resolves the artist page, walks its albums one at a time and downloads
//! each album's songs concurrently through a bounded pool.

use std::sync::Arc;

use lyricsmaster_model::{Album, Discography, Song};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::adapter::SiteAdapter;
use crate::error::{AcquireError, TransportError};
use crate::fuzzy::Resolver;
use crate::http::{ClientConfig, Fetch, HttpClient};
use crate::page::Page;
use crate::tor::TorController;
use crate::types::{AlbumRef, ArtistCandidate, SongLink};

/// Songs of one album fetched at the same time, unless the caller says otherwise.
pub const DEFAULT_POOL_SIZE: usize = 25;

/// Builds the session used through a Tor transport, again after every
/// circuit renewal.
pub type SessionFactory =
    Box<dyn Fn(&TorController) -> Result<Arc<dyn Fetch>, TransportError> + Send + Sync>;

/// Downloads lyrics from one site.
pub struct LyricsProvider {
    adapter: Arc<dyn SiteAdapter>,
    transport: Option<TorController>,
    sessions: SessionFactory,
    session: Arc<dyn Fetch>,
    resolver: Resolver,
    pool_size: usize,
}

impl LyricsProvider {
    /// Provider with a direct HTTPS session, or one routed through Tor when
    /// a transport is given.
    pub fn new(
        adapter: Arc<dyn SiteAdapter>,
        transport: Option<TorController>,
    ) -> Result<Self, AcquireError> {
        match transport {
            Some(tor) => Self::with_transport(adapter, tor, tor_session),
            None => {
                let session = Arc::new(HttpClient::new(&ClientConfig::default())?);
                Ok(Self::assemble(adapter, None, Box::new(tor_session), session))
            }
        }
    }

    /// Provider routed through `tor`, with `sessions` building each session
    /// instead of the default proxied [`HttpClient`].
    pub fn with_transport<F>(
        adapter: Arc<dyn SiteAdapter>,
        tor: TorController,
        sessions: F,
    ) -> Result<Self, AcquireError>
    where
        F: Fn(&TorController) -> Result<Arc<dyn Fetch>, TransportError> + Send + Sync + 'static,
    {
        let session = sessions(&tor)?;
        Ok(Self::assemble(adapter, Some(tor), Box::new(sessions), session))
    }

    /// Provider downloading through `fetcher` instead of the network.
    pub fn with_fetcher(adapter: Arc<dyn SiteAdapter>, fetcher: Arc<dyn Fetch>) -> Self {
        Self::assemble(adapter, None, Box::new(tor_session), fetcher)
    }

    fn assemble(
        adapter: Arc<dyn SiteAdapter>,
        transport: Option<TorController>,
        sessions: SessionFactory,
        session: Arc<dyn Fetch>,
    ) -> Self {
        let provider = Self {
            adapter,
            transport,
            sessions,
            session,
            resolver: Resolver::default(),
            pool_size: DEFAULT_POOL_SIZE,
        };
        provider.log_transport_status();
        provider
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size.max(1);
        self
    }

    /// Lowest fuzzy score at which a search result counts as the artist.
    pub fn with_min_score(mut self, min_score: u8) -> Self {
        self.resolver = Resolver::new(min_score);
        self
    }

    pub fn name(&self) -> &'static str {
        self.adapter.name()
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn transport(&self) -> Option<&TorController> {
        self.transport.as_ref()
    }

    fn log_transport_status(&self) {
        match &self.transport {
            None => tracing::info!(
                site = self.adapter.name(),
                "Anonymous requests disabled. The connection will not be anonymous."
            ),
            Some(tor) => tracing::info!(
                site = self.adapter.name(),
                proxy = %tor.proxy_url(),
                "{}",
                tor.describe()
            ),
        }
    }

    /// Search the site for `artist` and keep the closest result.
    pub async fn search(&self, artist: &str) -> Option<ArtistCandidate> {
        let url = self.adapter.make_search_artist_url(artist);
        let body = self.session.fetch_text(&url).await?;
        let candidates = self.adapter.extract_artists_from_search(&Page::parse(body));
        tracing::debug!(
            site = self.adapter.name(),
            artist,
            found = candidates.len(),
            "Searched artist"
        );
        self.resolver.resolve(&candidates, artist)
    }

    /// Raw artist page, or `None` when the site does not know the artist.
    pub async fn get_artist_page(&self, artist: &str) -> Option<String> {
        let artist = self.adapter.clean_string(artist);
        let url = match self.adapter.make_artist_url(&artist) {
            Some(url) => url,
            None => self.search(&artist).await?.url,
        };
        let body = self.session.fetch_text(&url).await?;
        if !self.adapter.has_artist(&Page::parse(body.as_str())) {
            tracing::debug!(site = self.adapter.name(), url = %url, "Page is not an artist page");
            return None;
        }
        Some(body)
    }

    /// Download the discography of `artist`.
    ///
    /// `album` and `song` keep only titles containing them, ignoring case.
    /// `pool_size` overrides the provider's pool width for this call.
    /// Returns `None` when the artist is not on the site; albums that end
    /// up without any song are left out.
    pub async fn get_lyrics(
        &mut self,
        artist: &str,
        album: Option<&str>,
        song: Option<&str>,
        pool_size: Option<usize>,
    ) -> Option<Discography> {
        let Some(artist_page) = self.get_artist_page(artist).await else {
            tracing::warn!(artist, site = self.adapter.name(), "Artist was not found");
            return None;
        };

        let mut albums = self.adapter.get_albums(self.session.as_ref(), &artist_page).await;
        tracing::debug!(artist, albums = albums.len(), "Listed albums");
        if let Some(filter) = album {
            albums = self.filter_albums(albums, filter).await;
        }

        let pool_size = pool_size.unwrap_or(self.pool_size).max(1);
        let mut downloaded = Vec::new();
        for entry in &albums {
            let infos = self.adapter.get_album_infos(self.session.as_ref(), entry).await;
            let (title, release_date) = match infos {
                Ok(infos) => infos,
                Err(e) => {
                    tracing::warn!(
                        site = self.adapter.name(),
                        album = %entry.text,
                        error = %e,
                        "Skipping album"
                    );
                    continue;
                }
            };

            let mut links: Vec<SongLink> = self
                .adapter
                .get_songs(self.session.as_ref(), entry)
                .await
                .into_iter()
                .flatten()
                .collect();
            if let Some(filter) = song {
                let filter = filter.to_lowercase();
                links.retain(|link| link.text.to_lowercase().contains(&filter));
            }

            self.rotate_circuit().await;

            if links.is_empty() {
                tracing::info!(album = %title, "No songs to download");
                continue;
            }

            tracing::info!(album = %title, songs = links.len(), pool_size, "Downloading album");
            let results = self.download_songs(links, artist, &title, pool_size).await;
            match Album::from_results(title.as_str(), artist, results, release_date) {
                Some(album) => {
                    tracing::info!(album = %title, songs = album.len(), "Album downloaded");
                    downloaded.push(album);
                }
                None => tracing::info!(album = %title, "Skipped album as no lyrics matched"),
            }
        }

        Some(Discography::new(artist, downloaded))
    }

    async fn filter_albums(&self, albums: Vec<AlbumRef>, filter: &str) -> Vec<AlbumRef> {
        let filter = filter.to_lowercase();
        let mut kept = Vec::new();
        for entry in albums {
            let Some(title) = self.adapter.album_title(self.session.as_ref(), &entry).await else {
                continue;
            };
            if title.to_lowercase().contains(&filter) {
                kept.push(entry);
            }
        }
        tracing::debug!(filter = %filter, kept = kept.len(), "Filtered albums");
        kept
    }

    /// New Tor circuit and session before an album, when a control channel
    /// is configured.
    async fn rotate_circuit(&mut self) {
        let Some(tor) = &self.transport else {
            return;
        };
        if !tor.has_control_port() {
            return;
        }
        tor.renew_circuit().await;
        match (self.sessions)(tor) {
            Ok(session) => self.session = session,
            Err(e) => tracing::warn!(error = %e, "Keeping the previous Tor session"),
        }
    }

    /// Run `create_song` for every link with at most `pool_size` in flight.
    /// Results come back in link order.
    async fn download_songs(
        &self,
        links: Vec<SongLink>,
        artist: &str,
        album_title: &str,
        pool_size: usize,
    ) -> Vec<Option<Song>> {
        let permits = Arc::new(Semaphore::new(pool_size));
        let mut tasks = JoinSet::new();
        let count = links.len();

        for (index, link) in links.into_iter().enumerate() {
            let adapter = Arc::clone(&self.adapter);
            let session = Arc::clone(&self.session);
            let permits = Arc::clone(&permits);
            let artist = artist.to_string();
            let album_title = album_title.to_string();
            tasks.spawn(async move {
                let Ok(_permit) = permits.acquire().await else {
                    return (index, None);
                };
                let song = adapter
                    .create_song(session.as_ref(), &link, &artist, &album_title)
                    .await;
                if song.is_none() {
                    tracing::debug!(song = %link.text, "No lyrics downloaded");
                }
                (index, song)
            });
        }

        let mut results: Vec<Option<Song>> = vec![None; count];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, song)) => results[index] = song,
                Err(e) => {
                    tracing::warn!(album = %album_title, error = %e, "Song download task failed")
                }
            }
        }
        results
    }
}

fn tor_session(tor: &TorController) -> Result<Arc<dyn Fetch>, TransportError> {
    Ok(Arc::new(tor.get_session()?))
}
