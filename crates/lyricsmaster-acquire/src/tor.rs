//! Optional Tor transport: SOCKS5 proxying and circuit renewal.
//!
//! Requests go through the local Tor SOCKS port. When a control port and
//! password are configured, the controller can also ask Tor for a fresh
//! circuit (`SIGNAL NEWNYM`), which the provider does before each album.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::TransportError;
use crate::http::{ClientConfig, HttpClient};

pub const DEFAULT_SOCKS_PORT: u16 = 9050;

const CONTROL_TIMEOUT: Duration = Duration::from_secs(10);

/// Where Tor's control channel listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlPort {
    Tcp(u16),
    /// Unix domain socket, e.g. `/var/run/tor/control`.
    Unix(PathBuf),
}

impl FromStr for ControlPort {
    type Err = std::convert::Infallible;

    /// A bare number is a TCP port; anything else is a socket path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<u16>() {
            Ok(port) => ControlPort::Tcp(port),
            Err(_) => ControlPort::Unix(PathBuf::from(s)),
        })
    }
}

impl fmt::Display for ControlPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlPort::Tcp(port) => write!(f, "tcp port {port}"),
            ControlPort::Unix(path) => write!(f, "socket {}", path.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TorConfig {
    pub ip: String,
    pub socks_port: u16,
    pub control: Option<ControlPort>,
    pub password: Option<String>,
}

impl Default for TorConfig {
    fn default() -> Self {
        Self {
            ip: "127.0.0.1".to_string(),
            socks_port: DEFAULT_SOCKS_PORT,
            control: None,
            password: None,
        }
    }
}

/// Handle on a local Tor daemon.
#[derive(Debug, Clone)]
pub struct TorController {
    config: TorConfig,
    client: ClientConfig,
}

impl TorController {
    /// Check the configuration without touching the network.
    pub fn new(config: TorConfig) -> Result<Self, TransportError> {
        if config.control.is_some() && config.password.is_none() {
            return Err(TransportError::MissingPassword);
        }
        let controller = Self {
            config,
            client: ClientConfig::default(),
        };
        reqwest::Proxy::all(controller.proxy_url())
            .map_err(|_| TransportError::InvalidProxy(controller.proxy_url()))?;
        Ok(controller)
    }

    /// Like [`TorController::new`], and also authenticate once on the control
    /// channel so a wrong port or password is reported now rather than
    /// mid-download.
    pub async fn connect(config: TorConfig) -> Result<Self, TransportError> {
        let controller = Self::new(config)?;
        if controller.has_control_port() {
            controller.send_commands(&[]).await?;
        }
        Ok(controller)
    }

    /// Base HTTP settings for proxied sessions (user agent, retries, timeout).
    pub fn with_client_config(mut self, client: ClientConfig) -> Self {
        self.client = client;
        self
    }

    pub fn config(&self) -> &TorConfig {
        &self.config
    }

    /// `socks5h` so host names are resolved by Tor, not locally.
    pub fn proxy_url(&self) -> String {
        format!("socks5h://{}:{}", self.config.ip, self.config.socks_port)
    }

    pub fn has_control_port(&self) -> bool {
        self.config.control.is_some()
    }

    /// A fresh pooled client whose requests all go through Tor.
    pub fn get_session(&self) -> Result<HttpClient, TransportError> {
        let config = ClientConfig {
            proxy: Some(self.proxy_url()),
            ..self.client.clone()
        };
        Ok(HttpClient::new(&config)?)
    }

    /// Ask Tor to switch to a new circuit. Returns `false` (and logs) on any
    /// failure, including when no control port is configured.
    pub async fn renew_circuit(&self) -> bool {
        if !self.has_control_port() {
            return false;
        }
        match self.send_commands(&["SIGNAL NEWNYM".to_string()]).await {
            Ok(()) => {
                tracing::debug!("Tor circuit renewed");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to renew the Tor circuit");
                false
            }
        }
    }

    /// Authenticate, then run `commands`, expecting a `250` reply to each.
    async fn send_commands(&self, commands: &[String]) -> Result<(), TransportError> {
        let Some(control) = &self.config.control else {
            return Ok(());
        };
        let password = self.config.password.as_deref().unwrap_or_default();
        let mut script = vec![format!("AUTHENTICATE \"{}\"", escape(password))];
        script.extend(commands.iter().cloned());

        let unreachable =
            |e: std::io::Error| TransportError::ControlUnreachable(control.to_string(), e);
        let conversation = async {
            match control {
                ControlPort::Tcp(port) => {
                    let stream = tokio::net::TcpStream::connect((self.config.ip.as_str(), *port))
                        .await
                        .map_err(unreachable)?;
                    converse(stream, &script).await
                }
                #[cfg(unix)]
                ControlPort::Unix(path) => {
                    let stream = tokio::net::UnixStream::connect(path)
                        .await
                        .map_err(unreachable)?;
                    converse(stream, &script).await
                }
                #[cfg(not(unix))]
                ControlPort::Unix(_) => Err(unreachable(std::io::Error::new(
                    std::io::ErrorKind::Unsupported,
                    "unix sockets are not available on this platform",
                ))),
            }
        };

        tokio::time::timeout(CONTROL_TIMEOUT, conversation)
            .await
            .map_err(|_| unreachable(std::io::ErrorKind::TimedOut.into()))?
    }

    /// One-line summary of the anonymity setup, for logs.
    pub fn describe(&self) -> &'static str {
        if self.has_control_port() {
            "Anonymous requests enabled. The Tor circuit will change for each album."
        } else {
            "Anonymous requests enabled. The Tor circuit will change according to the Tor network defaults."
        }
    }
}

async fn converse<S>(stream: S, script: &[String]) -> Result<(), TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut stream = BufReader::new(stream);
    let mut reply = String::new();

    for command in script {
        stream
            .get_mut()
            .write_all(format!("{command}\r\n").as_bytes())
            .await
            .map_err(|e| TransportError::ControlRejected(e.to_string()))?;

        reply.clear();
        stream
            .read_line(&mut reply)
            .await
            .map_err(|e| TransportError::ControlRejected(e.to_string()))?;

        if !reply.starts_with("250") {
            let verb = command.split_whitespace().next().unwrap_or_default();
            return Err(TransportError::ControlRejected(format!("{verb}: {}", reply.trim())));
        }
    }

    // Best effort; Tor closes the channel itself after QUIT.
    let _ = stream.get_mut().write_all(b"QUIT\r\n").await;
    Ok(())
}

fn escape(password: &str) -> String {
    password.replace('\\', "\\\\").replace('"', "\\\"")
}
