use anyhow::Result;
use clap::Parser;
use lyricsmaster_acquire::provider::DEFAULT_POOL_SIZE;
use lyricsmaster_acquire::tor::DEFAULT_SOCKS_PORT;
use lyricsmaster_acquire::{
    output, sites, AcquireError, ControlPort, LyricsProvider, TorConfig, TorController,
};
use lyricsmaster_model::Discography;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lyricsmaster")]
#[command(about = "Download the lyrics of an artist's discography from lyrics websites")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_HASH"), ")"))]
struct Cli {
    /// Artist name, e.g. "The Notorious B.I.G."
    artist: String,

    /// Only albums whose title contains this (case-insensitive)
    #[arg(short, long)]
    album: Option<String>,

    /// Only songs whose title contains this (case-insensitive)
    #[arg(short, long)]
    song: Option<String>,

    /// Lyrics website to download from
    #[arg(
        short,
        long,
        default_value = "genius",
        value_parser = clap::builder::PossibleValuesParser::new(sites::NAMES.iter().copied())
    )]
    provider: String,

    /// Save root; lyrics land in <FOLDER>/LyricsMaster (default: documents folder)
    #[arg(short, long)]
    folder: Option<PathBuf>,

    /// Songs of one album downloaded at the same time
    #[arg(long, default_value_t = DEFAULT_POOL_SIZE)]
    pool_size: usize,

    /// Route requests through the Tor SOCKS proxy at this address
    #[arg(long, value_name = "IP")]
    tor: Option<String>,

    /// Tor SOCKS port
    #[arg(long, default_value_t = DEFAULT_SOCKS_PORT, requires = "tor")]
    socks_port: u16,

    /// Tor control port number or socket path; renews the circuit for each album
    #[arg(long, value_name = "PORT|PATH", requires = "tor", requires = "password")]
    controlport: Option<ControlPort>,

    /// Tor control password
    #[arg(long, requires = "controlport")]
    password: Option<String>,

    /// Print the discography as JSON instead of saving it
    #[arg(long)]
    json: bool,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, default_value = "info", value_enum)]
    log_level: LogLevel,

    /// Use UTC timestamps instead of local time
    #[arg(long)]
    utc: bool,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Map log level, suppressing noisy HTML-parsing crates at debug/trace
    let level = match cli.log_level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug,selectors=warn,html5ever=warn",
        LogLevel::Trace => "trace,selectors=warn,html5ever=warn",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Timestamp format: 2026-02-14 19:44:09.123 -08:00
    let time_format = "%Y-%m-%d %H:%M:%S%.3f %:z";

    if cli.utc {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoUtc::new(time_format.to_string()))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(time_format.to_string()))
            .init();
    }

    let adapter = sites::by_name(&cli.provider)
        .ok_or_else(|| AcquireError::UnknownProvider(cli.provider.clone()))?;

    let transport = match &cli.tor {
        Some(ip) => {
            let config = TorConfig {
                ip: ip.clone(),
                socks_port: cli.socks_port,
                control: cli.controlport.clone(),
                password: cli.password.clone(),
            };
            Some(TorController::connect(config).await?)
        }
        None => None,
    };

    let mut provider = LyricsProvider::new(adapter, transport)?.with_pool_size(cli.pool_size);
    tracing::info!(artist = %cli.artist, site = provider.name(), "Downloading lyrics");

    let Some(discography) = provider
        .get_lyrics(&cli.artist, cli.album.as_deref(), cli.song.as_deref(), None)
        .await
    else {
        // Not found has already been reported by the provider.
        return Ok(());
    };
    report(&discography);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&discography)?);
    } else if !discography.is_empty() {
        let written = output::save_discography(&discography, cli.folder.as_deref())?;
        tracing::info!(files = written.len(), "Saved lyrics");
    }

    Ok(())
}

fn report(discography: &Discography) {
    if discography.is_empty() {
        tracing::info!(artist = %discography.artist(), "No lyrics matched");
        return;
    }
    for album in discography {
        tracing::info!(
            album = %album.title(),
            released = %album.release_date(),
            songs = album.len(),
            "Downloaded"
        );
    }
}
