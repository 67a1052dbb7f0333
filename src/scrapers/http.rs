use crate::scrapers::parse::{parse_group_page, MBASIC_BASE_URL};
use crate::scrapers::traits::GroupSource;
use crate::scrapers::types::{Credentials, Group, GroupPage};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Plain HTTP group scraper against the lightweight mobile site
pub struct HttpGroupScraper {
    client: Client,
    base_url: String,
}

impl HttpGroupScraper {
    pub fn new(credentials: Option<&Credentials>) -> Result<Self> {
        Self::with_base_url(MBASIC_BASE_URL, credentials)
    }

    pub fn with_base_url(base_url: &str, credentials: Option<&Credentials>) -> Result<Self> {
        if let Some(credentials) = credentials {
            warn!(
                "Ignoring credentials for {}: logging in needs the browser source",
                credentials.username
            );
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn first_page_url(&self, group: &Group) -> String {
        format!("{}/groups/{}/", self.base_url, group.id)
    }
}

#[async_trait]
impl GroupSource for HttpGroupScraper {
    async fn fetch_page(&self, group: &Group, cursor: Option<&str>) -> Result<GroupPage> {
        let url = match cursor {
            Some(next) => next.to_string(),
            None => self.first_page_url(group),
        };

        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch group {}", group.id))?;

        if !response.status().is_success() {
            warn!("Group {} returned status: {}", group.id, response.status());
            anyhow::bail!("Failed to fetch group {}: {}", group.id, response.status());
        }

        let html = response
            .text()
            .await
            .context("Failed to read response body")?;

        debug!("Downloaded {} bytes of HTML", html.len());

        parse_group_page(&html, &self.base_url)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_url_uses_group_id() {
        let scraper = HttpGroupScraper::with_base_url("https://m.example.com/", None).unwrap();
        assert_eq!(
            scraper.first_page_url(&Group::new("253957624766723")),
            "https://m.example.com/groups/253957624766723/"
        );
    }
}
