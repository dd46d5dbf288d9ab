use clap::{Parser, ValueEnum};
use people_page::config::{CompanyLabel, EmptyResultPolicy, ScrollMode};
use people_page::{ExtractionPolicy, OutputFormat, ScraperConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "people-page")]
#[command(about = "Scrapes employee names and profile identifiers from a company's people page")]
#[command(version)]
pub struct Args {
    /// Company identifier as it appears in the company page URL
    pub company: String,

    /// Write results to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Run the browser with a visible window
    #[arg(long)]
    pub noheadless: bool,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// WebDriver server URL
    #[arg(long, env = "WEBDRIVER_URL")]
    pub webdriver_url: Option<String>,

    /// Output document shape
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Skip entries whose URL has no profile identifier instead of failing
    #[arg(long)]
    pub skip_malformed: bool,

    /// Emit an empty document instead of failing when nothing is found
    #[arg(long)]
    pub allow_empty: bool,

    /// Use the company name from the page header in the output
    #[arg(long)]
    pub company_from_title: bool,

    /// Upper bound on profiles to scroll through
    #[arg(long)]
    pub max_scrolls: Option<usize>,

    /// Stop scrolling once no new profiles load
    #[arg(long)]
    pub until_stable: bool,

    /// Credentials are read from {PREFIX}_USER and {PREFIX}_PASS
    #[arg(long)]
    pub credentials_prefix: Option<String>,

    /// Extract from a saved people page instead of driving a browser
    #[arg(long)]
    pub input_html: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Standard,
    Legacy,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Standard => OutputFormat::Standard,
            FormatArg::Legacy => OutputFormat::Legacy,
        }
    }
}

/// Apply command-line overrides on top of a loaded configuration
pub fn apply_overrides(config: &mut ScraperConfig, args: &Args) {
    if args.noheadless {
        config.headless = false;
    }
    if let Some(url) = args.webdriver_url.as_ref().filter(|u| !u.is_empty()) {
        config.webdriver_url = url.clone();
    }
    if let Some(format) = args.format {
        config.output_format = format.into();
    }
    if args.skip_malformed {
        config.extraction_policy = ExtractionPolicy::Skip;
    }
    if args.allow_empty {
        config.empty_result_policy = EmptyResultPolicy::Continue;
    }
    if args.company_from_title {
        config.company_label = CompanyLabel::PageTitle;
    }
    if let Some(max_scrolls) = args.max_scrolls {
        config.scroll.max_scrolls = max_scrolls;
    }
    if args.until_stable {
        config.scroll.mode = ScrollMode::UntilStable;
    }
    if let Some(prefix) = &args.credentials_prefix {
        config.credentials_prefix = prefix.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_leave_config_alone() {
        let args = Args::try_parse_from(["people-page", "acme"]).unwrap();
        let mut config = ScraperConfig::default();
        let mut expected = ScraperConfig::default();
        if let Some(url) = args.webdriver_url.as_ref().filter(|u| !u.is_empty()) {
            // WEBDRIVER_URL may be set in the environment
            expected.webdriver_url = url.clone();
        }
        apply_overrides(&mut config, &args);
        assert_eq!(args.company, "acme");
        assert!(args.output.is_none());
        assert_eq!(config, expected);
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from([
            "people-page",
            "acme",
            "-o",
            "out.json",
            "--noheadless",
            "--format",
            "legacy",
            "--skip-malformed",
            "--allow-empty",
            "--company-from-title",
            "--max-scrolls",
            "24",
            "--until-stable",
            "--credentials-prefix",
            "FACELIFT",
            "--webdriver-url",
            "http://localhost:9515",
        ])
        .unwrap();

        let mut config = ScraperConfig::default();
        apply_overrides(&mut config, &args);

        assert_eq!(args.output, Some(PathBuf::from("out.json")));
        assert!(!config.headless);
        assert_eq!(config.output_format, OutputFormat::Legacy);
        assert_eq!(config.extraction_policy, ExtractionPolicy::Skip);
        assert_eq!(config.empty_result_policy, EmptyResultPolicy::Continue);
        assert_eq!(config.company_label, CompanyLabel::PageTitle);
        assert_eq!(config.scroll.iterations(), 2);
        assert_eq!(config.scroll.mode, ScrollMode::UntilStable);
        assert_eq!(config.credentials_prefix, "FACELIFT");
        assert_eq!(config.webdriver_url, "http://localhost:9515");
    }

    #[test]
    fn test_company_is_required() {
        assert!(Args::try_parse_from(["people-page"]).is_err());
    }
}
