use std::time::Duration;

use anyhow::Context as _;
use reqwest::header::{ACCEPT, USER_AGENT};
use url::Url;

use crate::formats::ChapterNumber;
use crate::urls::{DEFAULT_BASE_URL, raw_chapter_url, raw_index_url};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_USER_AGENT: &str = "obs-qa/0.1";

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl FetchConfig {
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("OBS_QA_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
        let timeout_secs = std::env::var("OBS_QA_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let user_agent =
            std::env::var("OBS_QA_USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_owned());
        Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            user_agent,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let url = Url::parse(&self.base_url)
            .with_context(|| format!("parse base url: {}", self.base_url))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            anyhow::bail!("base url must be http/https: {url}");
        }
        if self.timeout.is_zero() {
            anyhow::bail!("timeout must be greater than zero");
        }
        Ok(())
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// Source of raw chapter markup.
///
/// `Ok(None)` / `Ok(false)` mean the remote answered with a status other
/// than 200. `Err` is reserved for transport failures.
#[async_trait::async_trait]
pub trait ChapterFetcher: Send + Sync {
    async fn index_exists(&self, lang: &str) -> anyhow::Result<bool>;

    async fn fetch_chapter(
        &self,
        lang: &str,
        chapter: ChapterNumber,
    ) -> anyhow::Result<Option<String>>;
}

#[derive(Debug, Clone)]
pub struct HttpChapterFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl HttpChapterFetcher {
    pub fn new(config: FetchConfig) -> anyhow::Result<Self> {
        config.validate().context("validate fetch config")?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build chapter http client")?;
        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn get(&self, url: &str) -> anyhow::Result<Option<String>> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.config.user_agent.as_str())
            .header(ACCEPT, "text/plain,*/*;q=0.8")
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            tracing::debug!(%url, %status, "non-200 response");
            return Ok(None);
        }

        // Decoded as UTF-8 whatever charset the server declares.
        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("read body: {url}"))?;
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }
}

#[async_trait::async_trait]
impl ChapterFetcher for HttpChapterFetcher {
    async fn index_exists(&self, lang: &str) -> anyhow::Result<bool> {
        let url = raw_index_url(&self.config.base_url, lang);
        Ok(self.get(&url).await?.is_some())
    }

    async fn fetch_chapter(
        &self,
        lang: &str,
        chapter: ChapterNumber,
    ) -> anyhow::Result<Option<String>> {
        let url = raw_chapter_url(&self.config.base_url, lang, chapter);
        tracing::debug!(%url, "fetch chapter");
        self.get(&url).await
    }
}
