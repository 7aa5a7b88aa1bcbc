use serde::{Deserialize, Serialize};

/// Salary text used when a listing shows no salary range.
pub const SALARY_NOT_SPECIFIED: &str = "Not specified";

/// One scraped job listing. Optional fields are empty strings, never absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub position: String,
    pub company: String,
    pub company_logo: String,
    pub location: String,
    /// Machine-readable posting date, e.g. `2024-05-01`.
    pub date: String,
    /// Relative posting time, e.g. `2 days ago`.
    pub ago_time: String,
    pub salary: String,
    pub job_url: String,
}

impl JobRecord {
    /// Both position and company are required.
    pub fn is_valid(&self) -> bool {
        !self.position.trim().is_empty() && !self.company.trim().is_empty()
    }
}
