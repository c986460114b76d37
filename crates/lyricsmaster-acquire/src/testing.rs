//! In-memory `Fetch` for offline tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::http::{quote_url, Fetch, Response};

/// Serves fixture pages by URL and records every request.
///
/// Unknown URLs behave like an unreachable host (`None`).
#[derive(Default)]
pub struct FakeFetch {
    pages: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    requests: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeFetch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: impl Into<String>) -> Self {
        self.pages.insert(quote_url(url), body.into());
        self
    }

    /// Answer `url` only after `delay`, to shuffle completion order.
    pub fn delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(quote_url(url), delay);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested(&self, url: &str) -> bool {
        let url = quote_url(url);
        self.requests().iter().any(|r| *r == url)
    }

    /// Highest number of requests that were in progress at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetch for FakeFetch {
    async fn fetch(&self, url: &str) -> Option<Response> {
        let url = quote_url(url);
        self.requests.lock().unwrap().push(url.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        // Let other requests start so concurrency is observable.
        tokio::task::yield_now().await;
        if let Some(delay) = self.delays.get(&url) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.pages.get(&url).map(|body| Response {
            url: url.clone(),
            status: 200,
            body: body.clone(),
        })
    }
}
