use crate::scrapers::parse::{parse_group_page, MBASIC_BASE_URL};
use crate::scrapers::traits::GroupSource;
use crate::scrapers::types::{Credentials, Group, GroupPage};
use anyhow::{Context, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Time given to a page to finish rendering after navigation
const SETTLE_TIME: Duration = Duration::from_secs(3);

/// Browser-based group scraper using headless Chrome
pub struct BrowserGroupScraper {
    // Keeps the Chrome process alive for the tab
    _browser: Browser,
    tab: Arc<Tab>,
    debug_dir: Option<PathBuf>,
    fetched: AtomicUsize,
}

impl BrowserGroupScraper {
    /// Launch Chrome, logging in first when credentials are given
    pub fn new(credentials: Option<&Credentials>, debug_dir: Option<PathBuf>) -> Result<Self> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(true)
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;
        let tab = browser.new_tab().context("Failed to open browser tab")?;

        if let Some(dir) = &debug_dir {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        let scraper = Self {
            _browser: browser,
            tab,
            debug_dir,
            fetched: AtomicUsize::new(0),
        };

        if let Some(credentials) = credentials {
            scraper.login(credentials)?;
        }

        Ok(scraper)
    }

    fn login(&self, credentials: &Credentials) -> Result<()> {
        info!("Logging in as {}...", credentials.username);

        self.tab
            .navigate_to(&format!("{MBASIC_BASE_URL}/login/"))?
            .wait_until_navigated()?;

        self.tab
            .wait_for_element("input[name=email]")
            .context("Login form not found")?
            .click()?;
        self.tab.type_str(&credentials.username)?;

        self.tab.wait_for_element("input[name=pass]")?.click()?;
        self.tab.type_str(&credentials.password)?;
        self.tab.press_key("Enter")?;
        self.tab
            .wait_until_navigated()
            .context("Login did not complete")?;

        Ok(())
    }

    fn dismiss_cookie_dialog(&self) {
        let result = self.tab.evaluate(
            r#"
            const button = document.querySelector('button[data-cookiebanner="accept_button"], button[value="1"][name="accept_consent"]');
            if (button) button.click();
            "#,
            false,
        );
        if let Err(err) = result {
            debug!("Cookie dialog not dismissed: {err}");
        }
    }

    fn page_html(&self) -> Result<String> {
        let html_result = self
            .tab
            .evaluate("document.documentElement.outerHTML", false)?;
        match html_result.value {
            Some(value) => Ok(value.as_str().unwrap_or("").to_string()),
            None => {
                warn!("Could not get HTML from page");
                Ok(String::new())
            }
        }
    }

    fn save_debug_html(&self, group: &Group, html: &str) -> Result<()> {
        let Some(dir) = &self.debug_dir else {
            return Ok(());
        };
        let n = self.fetched.fetch_add(1, Ordering::Relaxed);
        let path = dir.join(format!("group_{}_{n:03}.html", group.id));
        std::fs::write(&path, html)?;
        info!("Saved page HTML to {} ({} bytes)", path.display(), html.len());
        Ok(())
    }
}

#[async_trait]
impl GroupSource for BrowserGroupScraper {
    async fn fetch_page(&self, group: &Group, cursor: Option<&str>) -> Result<GroupPage> {
        let url = match cursor {
            Some(next) => next.to_string(),
            None => format!("{MBASIC_BASE_URL}/groups/{}/", group.id),
        };

        debug!("Opening {}", url);
        self.tab
            .navigate_to(&url)
            .with_context(|| format!("Failed to open group {}", group.id))?
            .wait_until_navigated()?;

        tokio::time::sleep(SETTLE_TIME).await;
        self.dismiss_cookie_dialog();

        let html = self.page_html()?;
        if html.is_empty() {
            warn!("HTML is empty");
            return Ok(GroupPage::default());
        }
        self.save_debug_html(group, &html)?;

        parse_group_page(&html, MBASIC_BASE_URL)
    }

    fn source_name(&self) -> &'static str {
        "browser"
    }
}
