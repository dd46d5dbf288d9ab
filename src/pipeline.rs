use crate::config::{CompanyLabel, EmptyResultPolicy, ScraperConfig};
use crate::drivers::PageDriver;
use crate::error::{Result, ScrapeError};
use crate::extract::{self, html};
use crate::results::{RawEntry, ResultDocument};
use crate::scroll::{WaitPolicy, scroll_until_done};

/// Runs a full scrape: login, navigate, scroll, collect, normalize.
///
/// The driver is closed before returning, whether or not the run succeeded.
pub async fn run<D, P>(
    driver: &mut D,
    company: &str,
    config: &ScraperConfig,
    policy: &mut P,
) -> Result<ResultDocument>
where
    D: PageDriver,
    P: WaitPolicy,
{
    let collected = collect(driver, company, config, policy).await;

    if let Err(e) = driver.close().await {
        ::log::warn!("Failed to close browser session: {}", e);
    }

    let (label, entries) = collected?;
    build_document(label, &entries, config)
}

/// Builds a document from a saved people page instead of a live session
pub fn from_html(html: &str, company: &str, config: &ScraperConfig) -> Result<ResultDocument> {
    let entries = html::parse_entries(html, &config.profile_selector, &config.base_url)?;
    build_document(company.to_string(), &entries, config)
}

async fn collect<D, P>(
    driver: &mut D,
    company: &str,
    config: &ScraperConfig,
    policy: &mut P,
) -> Result<(String, Vec<RawEntry>)>
where
    D: PageDriver,
    P: WaitPolicy,
{
    driver.login().await?;
    driver.open_company(company).await?;

    let label = match config.company_label {
        CompanyLabel::Identifier => company.to_string(),
        CompanyLabel::PageTitle => match driver.company_title().await {
            Ok(title) if !title.is_empty() => title,
            Ok(_) => {
                ::log::warn!("Company title is empty, using '{}'", company);
                company.to_string()
            }
            Err(e) => {
                ::log::warn!("Could not read company title ({}), using '{}'", e, company);
                company.to_string()
            }
        },
    };
    ::log::info!("Company name: {}", label);

    scroll_until_done(driver, policy).await?;
    let entries = driver.collect_entries().await?;
    Ok((label, entries))
}

fn build_document(
    company: String,
    entries: &[RawEntry],
    config: &ScraperConfig,
) -> Result<ResultDocument> {
    if entries.is_empty() {
        match config.empty_result_policy {
            EmptyResultPolicy::Fail => return Err(ScrapeError::EmptyResult { company }),
            EmptyResultPolicy::Continue => {
                ::log::error!("No profiles found for '{}', continuing with none", company);
            }
        }
    }

    let employees = extract::normalize(entries, config.extraction_policy)?;
    ::log::info!("Extracted {} employees for {}", employees.len(), company);
    Ok(ResultDocument::new(company, employees))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractionPolicy;
    use crate::results::EmployeeRecord;
    use crate::scroll::{DelayRange, FixedScrolls, ScrollTarget};

    #[derive(Default)]
    struct FakeDriver {
        entries: Vec<RawEntry>,
        title: Option<String>,
        fail_login: bool,
        calls: Vec<String>,
        scrolls: usize,
        closed: bool,
    }

    impl ScrollTarget for FakeDriver {
        async fn scroll(&mut self) -> Result<()> {
            self.scrolls += 1;
            Ok(())
        }

        async fn entry_count(&mut self) -> Result<usize> {
            Ok(self.entries.len().min(self.scrolls * 2))
        }
    }

    impl PageDriver for FakeDriver {
        async fn login(&mut self) -> Result<()> {
            self.calls.push("login".to_string());
            if self.fail_login {
                return Err(ScrapeError::Authentication("timed out".to_string()));
            }
            Ok(())
        }

        async fn open_company(&mut self, company: &str) -> Result<()> {
            self.calls.push(format!("open:{}", company));
            Ok(())
        }

        async fn company_title(&mut self) -> Result<String> {
            self.title
                .clone()
                .ok_or_else(|| ScrapeError::Configuration("no title".to_string()))
        }

        async fn collect_entries(&mut self) -> Result<Vec<RawEntry>> {
            self.calls.push("collect".to_string());
            Ok(self.entries.clone())
        }

        async fn close(&mut self) -> Result<()> {
            self.closed = true;
            Ok(())
        }
    }

    fn entries() -> Vec<RawEntry> {
        vec![
            RawEntry::new("A", "https://x/in/a1/"),
            RawEntry::new("", "https://x/in/b2"),
            RawEntry::new("C", "https://x/in/c3?x=1"),
        ]
    }

    fn no_wait(iterations: usize) -> FixedScrolls {
        FixedScrolls::new(iterations, DelayRange::none())
    }

    #[tokio::test]
    async fn test_run_produces_document() {
        let mut driver = FakeDriver {
            entries: entries(),
            ..FakeDriver::default()
        };
        let config = ScraperConfig::default();

        let doc = run(&mut driver, "acme", &config, &mut no_wait(3))
            .await
            .unwrap();

        assert_eq!(doc.company, "acme");
        assert_eq!(
            doc.employees,
            vec![
                EmployeeRecord {
                    name: "A".to_string(),
                    profile_id: "a1".to_string()
                },
                EmployeeRecord {
                    name: "C".to_string(),
                    profile_id: "c3".to_string()
                },
            ]
        );
        assert_eq!(driver.calls, vec!["login", "open:acme", "collect"]);
        assert_eq!(driver.scrolls, 3);
        assert!(driver.closed);
    }

    #[tokio::test]
    async fn test_login_failure_closes_and_skips_scrape() {
        let mut driver = FakeDriver {
            entries: entries(),
            fail_login: true,
            ..FakeDriver::default()
        };

        let result = run(&mut driver, "acme", &ScraperConfig::default(), &mut no_wait(3)).await;

        assert!(matches!(result, Err(ScrapeError::Authentication(_))));
        assert_eq!(driver.calls, vec!["login"]);
        assert_eq!(driver.scrolls, 0);
        assert!(driver.closed);
    }

    #[tokio::test]
    async fn test_empty_result_fails_by_default() {
        let mut driver = FakeDriver::default();

        let result = run(&mut driver, "acme", &ScraperConfig::default(), &mut no_wait(1)).await;

        match result {
            Err(ScrapeError::EmptyResult { company }) => assert_eq!(company, "acme"),
            other => panic!("expected empty result error, got {:?}", other),
        }
        assert!(driver.closed);
    }

    #[tokio::test]
    async fn test_empty_result_can_continue() {
        let mut driver = FakeDriver::default();
        let config = ScraperConfig {
            empty_result_policy: EmptyResultPolicy::Continue,
            ..ScraperConfig::default()
        };

        let doc = run(&mut driver, "acme", &config, &mut no_wait(1))
            .await
            .unwrap();
        assert!(doc.employees.is_empty());
    }

    #[tokio::test]
    async fn test_page_title_label_with_fallback() {
        let config = ScraperConfig {
            company_label: CompanyLabel::PageTitle,
            ..ScraperConfig::default()
        };

        let mut driver = FakeDriver {
            entries: entries(),
            title: Some("Acme Corporation".to_string()),
            ..FakeDriver::default()
        };
        let doc = run(&mut driver, "acme", &config, &mut no_wait(0))
            .await
            .unwrap();
        assert_eq!(doc.company, "Acme Corporation");

        let mut driver = FakeDriver {
            entries: entries(),
            ..FakeDriver::default()
        };
        let doc = run(&mut driver, "acme", &config, &mut no_wait(0))
            .await
            .unwrap();
        assert_eq!(doc.company, "acme");
    }

    #[tokio::test]
    async fn test_malformed_url_policies() {
        let mut bad = entries();
        bad.push(RawEntry::new("D", "https://x/company/acme"));

        let mut driver = FakeDriver {
            entries: bad.clone(),
            ..FakeDriver::default()
        };
        let result = run(&mut driver, "acme", &ScraperConfig::default(), &mut no_wait(0)).await;
        assert!(matches!(
            result,
            Err(ScrapeError::Extraction { index: 3, .. })
        ));
        assert!(driver.closed);

        let config = ScraperConfig {
            extraction_policy: ExtractionPolicy::Skip,
            ..ScraperConfig::default()
        };
        let mut driver = FakeDriver {
            entries: bad,
            ..FakeDriver::default()
        };
        let doc = run(&mut driver, "acme", &config, &mut no_wait(0))
            .await
            .unwrap();
        assert_eq!(doc.employees.len(), 2);
    }

    #[test]
    fn test_from_html() {
        let page = r#"<div class="org-people-profile-card__profile-info">
            <a href="https://www.linkedin.com/in/jane-doe/">Jane Doe</a>
        </div>"#;
        let doc = from_html(page, "acme", &ScraperConfig::default()).unwrap();
        assert_eq!(doc.company, "acme");
        assert_eq!(doc.employees[0].profile_id, "jane-doe");

        let result = from_html("<p>nothing</p>", "acme", &ScraperConfig::default());
        assert!(matches!(result, Err(ScrapeError::EmptyResult { .. })));
    }
}
