use serde::{Deserialize, Serialize};

/// A (display text, profile URL) pair as collected from the rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// Text shown for the profile link (may be empty)
    pub display_text: String,

    /// Absolute URL of the profile link
    pub profile_url: String,
}

impl RawEntry {
    /// Create a new raw entry
    pub fn new(display_text: impl Into<String>, profile_url: impl Into<String>) -> Self {
        Self {
            display_text: display_text.into(),
            profile_url: profile_url.into(),
        }
    }
}

impl From<(String, String)> for RawEntry {
    fn from((display_text, profile_url): (String, String)) -> Self {
        Self {
            display_text,
            profile_url,
        }
    }
}

/// One normalized employee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub name: String,
    pub profile_id: String,
}

/// Final output of a run, in scrape order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDocument {
    pub company: String,
    pub employees: Vec<EmployeeRecord>,
}

/// Shape of the emitted JSON
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// `{"company", "employees": [{"name", "profile_id"}]}`
    #[default]
    Standard,
    /// `{"company", "profiles", "facets", "numEmployees"}` kept for 1.0 consumers
    Legacy,
}

/// Profile entry of the legacy document. Only `firstName` and
/// `publicIdentifier` are ever filled; the rest serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub occupation: Option<String>,
    pub object_urn: Option<String>,
    pub entity_urn: Option<String>,
    pub public_identifier: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyDocument {
    pub company: String,
    pub profiles: Vec<LegacyProfile>,
    pub facets: serde_json::Map<String, serde_json::Value>,
    pub num_employees: u64,
}

impl From<&EmployeeRecord> for LegacyProfile {
    fn from(record: &EmployeeRecord) -> Self {
        Self {
            first_name: Some(record.name.clone()),
            public_identifier: Some(record.profile_id.clone()),
            ..Self::default()
        }
    }
}

impl ResultDocument {
    /// Create a new result document
    pub fn new(company: impl Into<String>, employees: Vec<EmployeeRecord>) -> Self {
        Self {
            company: company.into(),
            employees,
        }
    }

    /// Convert into the legacy shape
    pub fn to_legacy(&self) -> LegacyDocument {
        LegacyDocument {
            company: self.company.clone(),
            profiles: self.employees.iter().map(LegacyProfile::from).collect(),
            facets: serde_json::Map::new(),
            num_employees: 0,
        }
    }

    /// Serialize as pretty JSON (2-space indent) in the requested format
    pub fn to_json(&self, format: OutputFormat) -> Result<String, serde_json::Error> {
        match format {
            OutputFormat::Standard => serde_json::to_string_pretty(self),
            OutputFormat::Legacy => serde_json::to_string_pretty(&self.to_legacy()),
        }
    }
}
