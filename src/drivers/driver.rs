use crate::error::Result;
use crate::results::RawEntry;
use crate::scroll::ScrollTarget;

/// A browser session able to reach a company's people page
pub trait PageDriver: ScrollTarget {
    /// Sign in with the credentials the driver was built with
    async fn login(&mut self) -> Result<()>;

    /// Navigate to the people listing of `company`
    async fn open_company(&mut self, company: &str) -> Result<()>;

    /// Company name shown in the page header
    async fn company_title(&mut self) -> Result<String>;

    /// Collect (text, URL) pairs for every rendered profile link with non-empty text
    async fn collect_entries(&mut self) -> Result<Vec<RawEntry>>;

    /// End the browser session
    async fn close(&mut self) -> Result<()>;
}
