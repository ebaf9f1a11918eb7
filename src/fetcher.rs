use reqwest::blocking::Client;
use reqwest::redirect;
use tracing::debug;

use crate::config::ScraperConfig;
use crate::error::{Result, ScrapeError};

/// Source of page HTML. The walker only ever asks for one page at a time.
pub trait Fetch {
    fn fetch_html(&self, url: &str) -> Result<String>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let max_redirects = config.max_redirects;
        let redirect_policy = redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() > max_redirects {
                attempt.error(format!("Too many redirects (>{max_redirects})"))
            } else {
                attempt.follow()
            }
        });

        let client = Client::builder()
            .redirect(redirect_policy)
            .timeout(config.request_timeout)
            .build()
            .map_err(|source| ScrapeError::Fetch {
                url: config.base_url.clone(),
                source,
            })?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch_html(&self, url: &str) -> Result<String> {
        debug!(url, "GET");
        let fetch_err = |source| ScrapeError::Fetch {
            url: url.to_string(),
            source,
        };

        let resp = self.client.get(url).send().map_err(fetch_err)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        resp.text().map_err(fetch_err)
    }
}
