//! Retrying HTTP GET client shared by every site adapter.

use async_trait::async_trait;
use std::time::Duration;

/// Desktop browser identity; several lyrics sites refuse obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.1) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/41.0.2228.0 Safari/537.36";

/// Attempts made for one URL before giving up.
pub const DEFAULT_RETRIES: u32 = 30;

/// Characters left as-is in path, query and fragment besides the unreserved set.
/// `%` is kept so already-encoded URLs pass through unchanged.
const SAFE_CHARS: &[char] = &['/', '=', '+', '&', '%'];

/// A downloaded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can download a page.
///
/// Failures never escape: an unreachable page is `None` and has already
/// been logged by the implementation.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Option<Response>;

    /// Download a page and keep only its body.
    async fn fetch_text(&self, url: &str) -> Option<String> {
        self.fetch(url).await.map(|response| response.body)
    }
}

/// Settings for [`HttpClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub user_agent: String,
    pub retries: u32,
    pub timeout: Duration,
    /// Proxy URL every request goes through, e.g. `socks5h://127.0.0.1:9050`.
    pub proxy: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retries: DEFAULT_RETRIES,
            timeout: Duration::from_secs(30),
            proxy: None,
        }
    }
}

/// Pooled HTTPS client with certificate validation and a retry budget.
///
/// Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    retries: u32,
}

impl HttpClient {
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .pool_max_idle_per_host(10);

        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
        }

        Ok(Self {
            client: builder.build()?,
            retries: config.retries.max(1),
        })
    }

    async fn get_once(&self, url: &str) -> Result<Response, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await?;
        Ok(Response {
            url: final_url,
            status,
            body,
        })
    }
}

#[async_trait]
impl Fetch for HttpClient {
    async fn fetch(&self, url: &str) -> Option<Response> {
        let url = quote_url(url);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.get_once(&url).await {
                Ok(response) => {
                    tracing::debug!(
                        url = %url,
                        status = response.status,
                        bytes = response.body.len(),
                        "Fetched page"
                    );
                    return Some(response);
                }
                Err(e) if attempt < self.retries && is_transient(&e) => {
                    tracing::debug!(url = %url, attempt, error = %e, "Transient failure, retrying");
                    tokio::time::sleep(backoff(attempt)).await;
                }
                Err(e) => {
                    tracing::warn!(
                        url = %url,
                        attempts = attempt,
                        error = %e,
                        "Unable to download url"
                    );
                    return None;
                }
            }
        }
    }
}

fn is_transient(e: &reqwest::Error) -> bool {
    e.is_connect() || e.is_timeout() || e.is_request() || e.is_body()
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(u64::from(attempt.min(20)) * 50)
}

/// Percent-encode the path, query and fragment of a URL.
///
/// Scheme and host are left untouched. Already-encoded input is returned
/// unchanged, so quoting twice is the same as quoting once.
pub fn quote_url(url: &str) -> String {
    let (head, rest) = split_authority(url);
    let (rest, fragment) = match rest.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (rest, None),
    };
    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };

    let mut quoted = String::with_capacity(url.len());
    quoted.push_str(head);
    quoted.push_str(&quote(path));
    if let Some(query) = query {
        quoted.push('?');
        quoted.push_str(&quote(query));
    }
    if let Some(fragment) = fragment {
        quoted.push('#');
        quoted.push_str(&quote(fragment));
    }
    quoted
}

/// Split `scheme://host:port` from the remainder of the URL.
fn split_authority(url: &str) -> (&str, &str) {
    let Some(scheme_end) = url.find("://") else {
        return ("", url);
    };
    let authority_start = scheme_end + 3;
    let authority_end = url[authority_start..]
        .find(['/', '?', '#'])
        .map(|i| authority_start + i)
        .unwrap_or(url.len());
    url.split_at(authority_end)
}

fn quote(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    let mut buf = [0u8; 4];
    for c in component.chars() {
        if SAFE_CHARS.contains(&c) {
            out.push(c);
        } else {
            out.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    out
}
