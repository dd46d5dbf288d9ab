#![allow(async_fn_in_trait)]

pub mod config;
pub mod drivers;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod results;
pub mod scroll;

// Re-export commonly used types for convenience
pub use config::{Credentials, ScraperConfig};
pub use error::ScrapeError;
pub use extract::{ExtractionPolicy, extract_profile_id, normalize};
pub use results::{EmployeeRecord, OutputFormat, RawEntry, ResultDocument};

use drivers::WebPageDriver;

/// Builder for scraping one company's people page
pub struct PeopleScrape {
    company: String,
    config: ScraperConfig,
}

impl PeopleScrape {
    /// Create a new builder for the given company identifier
    pub fn new(company: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            config: ScraperConfig::default(),
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: ScraperConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a JSON file
    pub fn with_config_file(self, path: impl AsRef<std::path::Path>) -> error::Result<Self> {
        let config = ScraperConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Load configuration from a JSON string
    pub fn with_config_str(self, json: &str) -> error::Result<Self> {
        let config = ScraperConfig::from_json(json)?;
        Ok(self.with_config(config))
    }

    pub fn with_webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.config.webdriver_url = url.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    /// Cap the number of profiles to scroll through
    pub fn with_max_scrolls(mut self, max_scrolls: usize) -> Self {
        self.config.scroll.max_scrolls = max_scrolls;
        self
    }

    pub fn with_extraction_policy(mut self, policy: ExtractionPolicy) -> Self {
        self.config.extraction_policy = policy;
        self
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ScraperConfig {
        &mut self.config
    }

    /// Scrape through a WebDriver session, reading credentials from the
    /// environment under the configured prefix
    pub async fn run(&self) -> error::Result<ResultDocument> {
        let credentials = Credentials::from_env(&self.config.credentials_prefix)?;
        self.run_with_credentials(credentials).await
    }

    /// Scrape through a WebDriver session with explicit credentials
    pub async fn run_with_credentials(
        &self,
        credentials: Credentials,
    ) -> error::Result<ResultDocument> {
        let mut driver = WebPageDriver::connect(&self.config, credentials).await?;
        let mut policy = self.config.scroll.build_policy();
        pipeline::run(&mut driver, &self.company, &self.config, &mut policy).await
    }

    /// Extract from a saved copy of the people page
    pub fn run_offline(&self, html: &str) -> error::Result<ResultDocument> {
        pipeline::from_html(html, &self.company, &self.config)
    }
}
