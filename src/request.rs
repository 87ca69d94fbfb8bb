use std::time::Duration;

use reqwest::{
    header::{ACCEPT_LANGUAGE, USER_AGENT},
    Client, StatusCode, Url,
};

use crate::{Error, Result};

/// Where and how to ask for detail pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    pub base_url: String,
    pub user_agent: String,
    pub accept_language: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: crate::BASE_URL.to_string(),
            user_agent: crate::USER_AGENT.to_string(),
            accept_language: crate::ACCEPT_LANGUAGE.to_string(),
        }
    }
}

impl LookupConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// A fetched detail page together with the URL it was finally served from.
#[derive(Debug, Clone)]
pub struct Page {
    pub html: String,
    pub url: Url,
}

#[derive(Debug, Clone)]
pub struct LookupClient {
    // Client uses Arc so we can clone cheaply
    client: Client,
    config: LookupConfig,
}

impl LookupClient {
    pub fn new(config: LookupConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// `<base>/Search/?type=auto&q=<identifier>`
    pub fn search_url(&self, identifier: &str) -> Result<Url> {
        let base = self.config.base_url.trim_end_matches('/');
        let url = Url::parse_with_params(
            &format!("{base}/Search/"),
            &[("type", "auto"), ("q", identifier)],
        )?;
        Ok(url)
    }

    /// Requests the detail page for `identifier` and returns its HTML.
    /// Redirects are followed by reqwest, `Page::url` is where they ended.
    pub async fn fetch(&self, identifier: &str, timeout: Duration) -> Result<Page> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(Error::EmptyIdentifier);
        }

        let url = self.search_url(identifier)?;
        let res = self
            .client
            .get(url.clone())
            .header(USER_AGENT, &self.config.user_agent)
            .header(ACCEPT_LANGUAGE, &self.config.accept_language)
            .timeout(timeout)
            .send()
            .await?;

        if res.status() != StatusCode::OK {
            return Err(Error::Http {
                status: res.status().as_u16(),
                url: url.to_string(),
            });
        }

        let url = res.url().clone();
        let html = res.text().await?;
        Ok(Page { html, url })
    }
}
