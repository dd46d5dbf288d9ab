use crate::config::{Browser, Credentials, ScraperConfig};
use crate::drivers::PageDriver;
use crate::error::{Result, ScrapeError};
use crate::results::RawEntry;
use crate::scroll::ScrollTarget;
use fantoccini::wd::Capabilities;
use fantoccini::{Client, ClientBuilder, Locator};
use regex::Regex;
use serde_json::{Value, json};
use std::time::Duration;

const LOGIN_POLL_INTERVAL: Duration = Duration::from_millis(500);

const COLLECT_SCRIPT: &str = r#"
return [...document.querySelectorAll(arguments[0])]
    .map(e => [e.innerText, e.href])
    .filter(e => e[0] !== "");
"#;

const COUNT_SCRIPT: &str = "return document.querySelectorAll(arguments[0]).length;";

const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// Page driver backed by a WebDriver session
pub struct WebPageDriver {
    client: Client,
    config: ScraperConfig,
    credentials: Credentials,
    login_success: Regex,
    closed: bool,
}

impl WebPageDriver {
    /// Opens a WebDriver session configured from `config`
    pub async fn connect(config: &ScraperConfig, credentials: Credentials) -> Result<Self> {
        let login_success = Regex::new(&config.login_success_pattern).map_err(|e| {
            ScrapeError::Configuration(format!(
                "invalid login_success_pattern '{}': {}",
                config.login_success_pattern, e
            ))
        })?;

        let client = connect_to_webdriver(&config.webdriver_url, config.browser, config.headless)
            .await?;

        Ok(Self {
            client,
            config: config.clone(),
            credentials,
            login_success,
            closed: false,
        })
    }

    async fn submit_login_form(&self) -> Result<()> {
        self.client.goto(&self.config.login_url()).await?;
        self.client
            .find(Locator::Css("#username"))
            .await?
            .send_keys(&self.credentials.username)
            .await?;
        self.client
            .find(Locator::Css("#password"))
            .await?
            .send_keys(&self.credentials.password)
            .await?;
        self.client
            .find(Locator::Css("button[type=submit]"))
            .await?
            .click()
            .await?;
        Ok(())
    }

    async fn wait_for_signed_in(&self) -> Result<()> {
        loop {
            let current = self.client.current_url().await?;
            if self.login_success.is_match(current.as_str()) {
                ::log::debug!("Signed in, landed on {}", current);
                return Ok(());
            }
            ::log::trace!("Still waiting for login, at {}", current);
            tokio::time::sleep(LOGIN_POLL_INTERVAL).await;
        }
    }
}

/// WebDriver capabilities for the requested browser
pub fn capabilities(browser: Browser, headless: bool) -> Capabilities {
    let mut caps = Capabilities::new();
    match browser {
        Browser::Chrome => {
            let mut args = vec!["--disable-gpu", "--window-size=1920,1080"];
            if headless {
                args.push("--headless=new");
            }
            caps.insert("browserName".to_string(), json!("chrome"));
            caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        }
        Browser::Firefox => {
            let args: Vec<&str> = if headless { vec!["-headless"] } else { Vec::new() };
            caps.insert("browserName".to_string(), json!("firefox"));
            caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
        }
    }
    caps
}

/// Connects to the WebDriver instance, falling back to the usual local ports
async fn connect_to_webdriver(webdriver_url: &str, browser: Browser, headless: bool) -> Result<Client> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(capabilities(browser, headless));

    let first_error = match builder.connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
            e
        }
    };

    let fallback_urls = [
        "http://localhost:9515", // ChromeDriver default
        "http://localhost:4444", // geckodriver / Selenium default
        "http://127.0.0.1:4444",
    ];

    for url in fallback_urls.iter() {
        if *url == webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = builder.connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(first_error.into())
}

impl ScrollTarget for WebPageDriver {
    async fn scroll(&mut self) -> Result<()> {
        self.client.execute(SCROLL_SCRIPT, Vec::new()).await?;
        Ok(())
    }

    async fn entry_count(&mut self) -> Result<usize> {
        let value = self
            .client
            .execute(
                COUNT_SCRIPT,
                vec![Value::String(self.config.profile_selector.clone())],
            )
            .await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }
}

impl PageDriver for WebPageDriver {
    async fn login(&mut self) -> Result<()> {
        let login_timeout = self.config.login_timeout();
        ::log::info!("Logging in at {}", self.config.login_url());

        let attempt = async {
            self.submit_login_form().await?;
            self.wait_for_signed_in().await
        };

        match tokio::time::timeout(login_timeout, attempt).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ScrapeError::Authentication(e.to_string())),
            Err(_) => Err(ScrapeError::Authentication(format!(
                "login did not complete within {} seconds",
                login_timeout.as_secs()
            ))),
        }
    }

    async fn open_company(&mut self, company: &str) -> Result<()> {
        let url = self.config.people_url(company);
        ::log::info!("Opening {}", url);
        self.client.goto(&url).await?;
        tokio::time::sleep(self.config.page_settle()).await;
        Ok(())
    }

    async fn company_title(&mut self) -> Result<String> {
        let text = self
            .client
            .find(Locator::Css(&self.config.title_selector))
            .await?
            .text()
            .await?;
        Ok(text.trim().to_string())
    }

    async fn collect_entries(&mut self) -> Result<Vec<RawEntry>> {
        let value = self
            .client
            .execute(
                COLLECT_SCRIPT,
                vec![Value::String(self.config.profile_selector.clone())],
            )
            .await?;
        let pairs: Vec<(String, String)> = serde_json::from_value(value)?;
        ::log::info!("Collected {} profile links", pairs.len());
        Ok(pairs.into_iter().map(RawEntry::from).collect())
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.client.clone().close().await?;
        Ok(())
    }
}
