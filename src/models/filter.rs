use serde::Deserialize;

pub const DEFAULT_HOST: &str = "www.linkedin.com";

/// Raw search criteria exactly as the caller supplied them.
///
/// Every field is optional free text. Nothing here is validated;
/// [`FilterState::normalize`] maps it onto the recognized options and
/// silently drops anything it does not recognize.
#[derive(Debug, Default, Clone, Deserialize, clap::Args)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilter {
    /// Source host, e.g. www.linkedin.com
    #[arg(long)]
    pub host: Option<String>,

    /// Free-text search keywords
    #[arg(long)]
    pub keyword: Option<String>,

    /// Free-text location
    #[arg(long)]
    pub location: Option<String>,

    /// "past month", "past week" or "24hr"
    #[arg(long)]
    pub date_since_posted: Option<String>,

    /// "full time", "part time", "contract", "temporary", "volunteer" or "internship"
    #[arg(long)]
    pub job_type: Option<String>,

    /// "on-site", "remote" or "hybrid"
    #[arg(long)]
    pub remote_filter: Option<String>,

    /// Minimum yearly salary: 40000, 60000, 80000, 100000 or 120000
    #[arg(long)]
    pub salary: Option<String>,

    /// "internship", "entry level", "associate", "senior", "director" or "executive"
    #[arg(long)]
    pub experience_level: Option<String>,

    /// "recent" or "relevant"
    #[arg(long)]
    pub sort_by: Option<String>,

    /// Maximum number of records to return (0 = all)
    #[arg(long)]
    pub limit: Option<String>,

    /// Page offset, in batches of 25
    #[arg(long)]
    pub page: Option<String>,

    /// Only listings from verified employers
    #[arg(long)]
    pub has_verification: Option<String>,

    /// Only listings with fewer than 10 applicants
    #[arg(long = "under-10-applicants")]
    #[serde(rename = "under10Applicants")]
    pub under_10_applicants: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatePosted {
    #[default]
    Any,
    PastMonth,
    PastWeek,
    Past24Hours,
}

impl DatePosted {
    fn lookup(raw: &str) -> Self {
        match lookup_key(raw).as_str() {
            "past month" => Self::PastMonth,
            "past week" => Self::PastWeek,
            "24hr" => Self::Past24Hours,
            _ => Self::Any,
        }
    }

    pub fn code(self) -> Option<&'static str> {
        match self {
            Self::Any => None,
            Self::PastMonth => Some("r2592000"),
            Self::PastWeek => Some("r604800"),
            Self::Past24Hours => Some("r86400"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobType {
    #[default]
    Any,
    FullTime,
    PartTime,
    Contract,
    Temporary,
    Volunteer,
    Internship,
}

impl JobType {
    fn lookup(raw: &str) -> Self {
        match lookup_key(raw).as_str() {
            "full time" | "full-time" => Self::FullTime,
            "part time" | "part-time" => Self::PartTime,
            "contract" => Self::Contract,
            "temporary" => Self::Temporary,
            "volunteer" => Self::Volunteer,
            "internship" => Self::Internship,
            _ => Self::Any,
        }
    }

    pub fn code(self) -> Option<&'static str> {
        match self {
            Self::Any => None,
            Self::FullTime => Some("F"),
            Self::PartTime => Some("P"),
            Self::Contract => Some("C"),
            Self::Temporary => Some("T"),
            Self::Volunteer => Some("V"),
            Self::Internship => Some("I"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoteFilter {
    #[default]
    Any,
    OnSite,
    Remote,
    Hybrid,
}

impl RemoteFilter {
    fn lookup(raw: &str) -> Self {
        match lookup_key(raw).as_str() {
            "on-site" | "on site" => Self::OnSite,
            "remote" => Self::Remote,
            "hybrid" => Self::Hybrid,
            _ => Self::Any,
        }
    }

    pub fn code(self) -> Option<&'static str> {
        match self {
            Self::Any => None,
            Self::OnSite => Some("1"),
            Self::Remote => Some("2"),
            Self::Hybrid => Some("3"),
        }
    }
}

/// Minimum yearly salary bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SalaryBucket {
    #[default]
    Any,
    From40k,
    From60k,
    From80k,
    From100k,
    From120k,
}

impl SalaryBucket {
    fn lookup(raw: &str) -> Self {
        match lookup_key(raw).as_str() {
            "40000" => Self::From40k,
            "60000" => Self::From60k,
            "80000" => Self::From80k,
            "100000" => Self::From100k,
            "120000" => Self::From120k,
            _ => Self::Any,
        }
    }

    pub fn code(self) -> Option<&'static str> {
        match self {
            Self::Any => None,
            Self::From40k => Some("1"),
            Self::From60k => Some("2"),
            Self::From80k => Some("3"),
            Self::From100k => Some("4"),
            Self::From120k => Some("5"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExperienceLevel {
    #[default]
    Any,
    Internship,
    EntryLevel,
    Associate,
    Senior,
    Director,
    Executive,
}

impl ExperienceLevel {
    fn lookup(raw: &str) -> Self {
        match lookup_key(raw).as_str() {
            "internship" => Self::Internship,
            "entry level" | "entry-level" => Self::EntryLevel,
            "associate" => Self::Associate,
            "senior" => Self::Senior,
            "director" => Self::Director,
            "executive" => Self::Executive,
            _ => Self::Any,
        }
    }

    pub fn code(self) -> Option<&'static str> {
        match self {
            Self::Any => None,
            Self::Internship => Some("1"),
            Self::EntryLevel => Some("2"),
            Self::Associate => Some("3"),
            Self::Senior => Some("4"),
            Self::Director => Some("5"),
            Self::Executive => Some("6"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Default,
    Recent,
    Relevant,
}

impl SortOrder {
    fn lookup(raw: &str) -> Self {
        match lookup_key(raw).as_str() {
            "recent" => Self::Recent,
            "relevant" => Self::Relevant,
            _ => Self::Default,
        }
    }

    pub fn code(self) -> Option<&'static str> {
        match self {
            Self::Default => None,
            Self::Recent => Some("DD"),
            Self::Relevant => Some("R"),
        }
    }
}

/// Canonical, URL-ready search criteria for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub host: String,
    /// Search terms joined with `+`.
    pub keyword: String,
    /// Location terms joined with `+`.
    pub location: String,
    pub date_since_posted: DatePosted,
    pub job_type: JobType,
    pub remote_filter: RemoteFilter,
    pub salary: SalaryBucket,
    pub experience_level: ExperienceLevel,
    pub sort_by: SortOrder,
    /// 0 means unbounded.
    pub limit: u32,
    pub page: u32,
    pub has_verification: bool,
    pub under_10_applicants: bool,
}

impl FilterState {
    /// Canonicalize raw criteria. Never fails: unknown or malformed values
    /// fall back to "no filter".
    pub fn normalize(raw: &QueryFilter, default_host: &str) -> Self {
        let host = raw
            .host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .unwrap_or(default_host)
            .to_string();

        fn text(v: &Option<String>) -> &str {
            v.as_deref().unwrap_or("")
        }

        Self {
            host,
            keyword: join_terms(text(&raw.keyword)),
            location: join_terms(text(&raw.location)),
            date_since_posted: DatePosted::lookup(text(&raw.date_since_posted)),
            job_type: JobType::lookup(text(&raw.job_type)),
            remote_filter: RemoteFilter::lookup(text(&raw.remote_filter)),
            salary: SalaryBucket::lookup(text(&raw.salary)),
            experience_level: ExperienceLevel::lookup(text(&raw.experience_level)),
            sort_by: SortOrder::lookup(text(&raw.sort_by)),
            limit: coerce_count(text(&raw.limit)),
            page: coerce_count(text(&raw.page)),
            has_verification: coerce_flag(text(&raw.has_verification)),
            under_10_applicants: coerce_flag(text(&raw.under_10_applicants)),
        }
    }

    /// `limit` as a record count, `None` when unbounded.
    pub fn record_limit(&self) -> Option<usize> {
        (self.limit > 0).then_some(self.limit as usize)
    }
}

/// Lowercased, trimmed, single-spaced form used for table lookups.
fn lookup_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn join_terms(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join("+")
}

/// Non-negative integer, or 0 for anything unparseable.
fn coerce_count(raw: &str) -> u32 {
    let raw = raw.trim();
    raw.parse::<u32>()
        .ok()
        .or_else(|| {
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| v.min(f64::from(u32::MAX)) as u32)
        })
        .unwrap_or(0)
}

fn coerce_flag(raw: &str) -> bool {
    matches!(lookup_key(raw).as_str(), "true" | "1" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> QueryFilter {
        QueryFilter::default()
    }

    #[test]
    fn empty_input_uses_defaults() {
        let state = FilterState::normalize(&raw(), DEFAULT_HOST);
        assert_eq!(state.host, DEFAULT_HOST);
        assert_eq!(state.keyword, "");
        assert_eq!(state.date_since_posted, DatePosted::Any);
        assert_eq!(state.sort_by, SortOrder::Default);
        assert_eq!(state.limit, 0);
        assert_eq!(state.page, 0);
        assert!(!state.has_verification);
        assert_eq!(state.record_limit(), None);
    }

    #[test]
    fn text_fields_collapse_whitespace_to_plus() {
        let input = QueryFilter {
            keyword: Some("  software \t  engineer ".into()),
            location: Some("San Francisco, CA".into()),
            ..raw()
        };
        let state = FilterState::normalize(&input, DEFAULT_HOST);
        assert_eq!(state.keyword, "software+engineer");
        assert_eq!(state.location, "San+Francisco,+CA");
    }

    #[test]
    fn enum_lookups_ignore_case_and_spacing() {
        let input = QueryFilter {
            date_since_posted: Some("Past  Week".into()),
            job_type: Some("FULL-TIME".into()),
            remote_filter: Some("On Site".into()),
            salary: Some(" 100000 ".into()),
            experience_level: Some("Entry Level".into()),
            sort_by: Some("RECENT".into()),
            ..raw()
        };
        let state = FilterState::normalize(&input, DEFAULT_HOST);
        assert_eq!(state.date_since_posted, DatePosted::PastWeek);
        assert_eq!(state.job_type, JobType::FullTime);
        assert_eq!(state.remote_filter, RemoteFilter::OnSite);
        assert_eq!(state.salary, SalaryBucket::From100k);
        assert_eq!(state.experience_level, ExperienceLevel::EntryLevel);
        assert_eq!(state.sort_by, SortOrder::Recent);
    }

    #[test]
    fn unknown_values_degrade_to_no_filter() {
        let input = QueryFilter {
            date_since_posted: Some("yesterday".into()),
            job_type: Some("gig".into()),
            remote_filter: Some("mars".into()),
            salary: Some("55000".into()),
            experience_level: Some("wizard".into()),
            sort_by: Some("alphabetical".into()),
            has_verification: Some("maybe".into()),
            ..raw()
        };
        let state = FilterState::normalize(&input, DEFAULT_HOST);
        assert_eq!(state, FilterState::normalize(&raw(), DEFAULT_HOST));
    }

    #[test]
    fn counts_coerce_to_non_negative_integers() {
        assert_eq!(coerce_count("1"), 1);
        assert_eq!(coerce_count(" 40 "), 40);
        assert_eq!(coerce_count("2.7"), 2);
        assert_eq!(coerce_count("-3"), 0);
        assert_eq!(coerce_count("ten"), 0);
        assert_eq!(coerce_count(""), 0);
    }

    #[test]
    fn blank_host_falls_back_to_default() {
        let input = QueryFilter {
            host: Some("   ".into()),
            ..raw()
        };
        assert_eq!(FilterState::normalize(&input, "jobs.example").host, "jobs.example");
    }
}
