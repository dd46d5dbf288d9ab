use crate::error::{Result, ScrapeError};
use crate::extract::ExtractionPolicy;
use crate::results::OutputFormat;
use crate::scroll::{DelayRange, FixedScrolls, ScrollPolicy, UntilStable};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Browser requested from the WebDriver server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Browser {
    #[default]
    Chrome,
    Firefox,
}

/// What to do when the people page yields nothing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyResultPolicy {
    /// Stop with an error and write no output
    #[default]
    Fail,
    /// Log the error and emit a document with no employees
    Continue,
}

/// Where the `company` field of the output comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyLabel {
    /// The identifier given on the command line
    #[default]
    Identifier,
    /// The company name shown in the page header
    PageTitle,
}

/// How the scroll loop decides when to stop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollMode {
    /// Always scroll the full number of iterations
    #[default]
    Fixed,
    /// Stop early once no new entries appear for `stall_timeout_secs`
    UntilStable,
}

/// Configuration for the scroll loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollConfig {
    #[serde(default)]
    pub mode: ScrollMode,

    /// Upper bound on profiles to load
    #[serde(default = "default_max_scrolls")]
    pub max_scrolls: usize,

    /// Profiles the site loads per scroll; `max_scrolls / profiles_per_scroll`
    /// gives the iteration count
    #[serde(default = "default_profiles_per_scroll")]
    pub profiles_per_scroll: usize,

    /// Lower bound of the randomized wait after each scroll
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Upper bound of the randomized wait after each scroll
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Only used in `until_stable` mode
    #[serde(default = "default_stall_timeout_secs")]
    pub stall_timeout_secs: u64,
}

/// Configuration for a scrape run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    #[serde(default)]
    pub browser: Browser,

    /// Site root, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Credentials are read from `{prefix}_USER` and `{prefix}_PASS`
    #[serde(default = "default_credentials_prefix")]
    pub credentials_prefix: String,

    #[serde(default = "default_login_timeout_secs")]
    pub login_timeout_secs: u64,

    /// Regex the browser URL must match once login went through
    #[serde(default = "default_login_success_pattern")]
    pub login_success_pattern: String,

    /// Pause after opening the people page
    #[serde(default = "default_page_settle_secs")]
    pub page_settle_secs: u64,

    /// CSS selector for the profile links on the people page
    #[serde(default = "default_profile_selector")]
    pub profile_selector: String,

    /// CSS selector for the company name header
    #[serde(default = "default_title_selector")]
    pub title_selector: String,

    #[serde(default)]
    pub scroll: ScrollConfig,

    #[serde(default)]
    pub extraction_policy: ExtractionPolicy,

    #[serde(default)]
    pub empty_result_policy: EmptyResultPolicy,

    #[serde(default)]
    pub company_label: CompanyLabel,

    #[serde(default)]
    pub output_format: OutputFormat,
}

impl ScraperConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| {
            ScrapeError::Configuration(format!("cannot open {}: {}", path.display(), e))
        })?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ScrapeError::Configuration(format!("invalid config: {}", e)))
    }

    pub fn login_url(&self) -> String {
        format!("{}/login", self.base_url.trim_end_matches('/'))
    }

    pub fn people_url(&self, company: &str) -> String {
        format!(
            "{}/company/{}/people",
            self.base_url.trim_end_matches('/'),
            company_path_segment(company)
        )
    }

    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }

    pub fn page_settle(&self) -> Duration {
        Duration::from_secs(self.page_settle_secs)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            browser: Browser::default(),
            base_url: default_base_url(),
            headless: default_headless(),
            credentials_prefix: default_credentials_prefix(),
            login_timeout_secs: default_login_timeout_secs(),
            login_success_pattern: default_login_success_pattern(),
            page_settle_secs: default_page_settle_secs(),
            profile_selector: default_profile_selector(),
            title_selector: default_title_selector(),
            scroll: ScrollConfig::default(),
            extraction_policy: ExtractionPolicy::default(),
            empty_result_policy: EmptyResultPolicy::default(),
            company_label: CompanyLabel::default(),
            output_format: OutputFormat::default(),
        }
    }
}

impl ScrollConfig {
    /// Number of scroll iterations, rounding partial pages up
    pub fn iterations(&self) -> usize {
        self.max_scrolls.div_ceil(self.profiles_per_scroll.max(1))
    }

    pub fn delay_range(&self) -> DelayRange {
        DelayRange::new(
            Duration::from_millis(self.min_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
    }

    /// Build the wait policy described by this configuration
    pub fn build_policy(&self) -> ScrollPolicy {
        match self.mode {
            ScrollMode::Fixed => {
                ScrollPolicy::Fixed(FixedScrolls::new(self.iterations(), self.delay_range()))
            }
            ScrollMode::UntilStable => ScrollPolicy::UntilStable(UntilStable::new(
                self.iterations(),
                Duration::from_secs(self.stall_timeout_secs),
                self.delay_range(),
            )),
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            mode: ScrollMode::default(),
            max_scrolls: default_max_scrolls(),
            profiles_per_scroll: default_profiles_per_scroll(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            stall_timeout_secs: default_stall_timeout_secs(),
        }
    }
}

/// Login credentials for the automated session
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Read `{prefix}_USER` and `{prefix}_PASS` from the environment
    pub fn from_env(prefix: &str) -> Result<Self> {
        Self::from_lookup(prefix, |key| std::env::var(key).ok())
    }

    /// Read credentials through an arbitrary key lookup. Empty values count
    /// as missing.
    pub fn from_lookup<F>(prefix: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let user_key = format!("{}_USER", prefix);
        let pass_key = format!("{}_PASS", prefix);

        let username = lookup(&user_key).filter(|v| !v.is_empty());
        let password = lookup(&pass_key).filter(|v| !v.is_empty());

        match (username, password) {
            (Some(username), Some(password)) => Ok(Self { username, password }),
            _ => Err(ScrapeError::Configuration(format!(
                "credentials missing, set {} and {}",
                user_key, pass_key
            ))),
        }
    }
}

/// Identifiers copied from the address bar are already percent-encoded and
/// go in unchanged; anything else is encoded.
fn company_path_segment(company: &str) -> Cow<'_, str> {
    if has_percent_escape(company) {
        Cow::Borrowed(company)
    } else {
        urlencoding::encode(company)
    }
}

fn has_percent_escape(s: &str) -> bool {
    s.as_bytes()
        .windows(3)
        .any(|w| w[0] == b'%' && w[1].is_ascii_hexdigit() && w[2].is_ascii_hexdigit())
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_base_url() -> String {
    "https://www.linkedin.com".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_credentials_prefix() -> String {
    "LINKEDIN".to_string()
}

fn default_login_timeout_secs() -> u64 {
    60
}

fn default_login_success_pattern() -> String {
    r"/feed/?$".to_string()
}

fn default_page_settle_secs() -> u64 {
    3
}

fn default_profile_selector() -> String {
    ".org-people-profile-card__profile-info a".to_string()
}

fn default_title_selector() -> String {
    "h1.org-top-card-summary__title".to_string()
}

fn default_max_scrolls() -> usize {
    900
}

fn default_profiles_per_scroll() -> usize {
    12
}

fn default_min_delay_ms() -> u64 {
    10_000
}

fn default_max_delay_ms() -> u64 {
    15_000
}

fn default_stall_timeout_secs() -> u64 {
    60
}
