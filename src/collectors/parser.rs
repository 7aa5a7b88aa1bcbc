use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::models::job::{JobRecord, SALARY_NOT_SPECIFIED};

/// CSS selectors for one listing card in a guest search fragment.
struct ListingSelectors {
    container: Selector,
    title: Selector,
    company: Selector,
    location: Selector,
    date: Selector,
    ago_time: Selector,
    salary: Selector,
    logo: Selector,
    link: Selector,
}

impl ListingSelectors {
    fn new() -> Result<Self, String> {
        let parse = |css: &str| Selector::parse(css).map_err(|e| format!("{css}: {e}"));
        Ok(Self {
            container: parse("li")?,
            title: parse(".base-search-card__title")?,
            company: parse(".base-search-card__subtitle")?,
            location: parse(".job-search-card__location")?,
            date: parse("time")?,
            ago_time: parse(".job-search-card__listdate, .job-search-card__listdate--new")?,
            salary: parse(".job-search-card__salary-info")?,
            logo: parse(".artdeco-entity-image")?,
            link: parse(".base-card__full-link")?,
        })
    }
}

static SELECTORS: LazyLock<Option<ListingSelectors>> = LazyLock::new(|| {
    ListingSelectors::new()
        .map_err(|e| tracing::error!("Invalid listing selector {e}"))
        .ok()
});

/// Extract job records from one raw HTML batch, in document order.
///
/// Each field is looked up independently inside its own listing; a missing
/// field becomes an empty string. Listings without a position or company
/// are dropped. A document with no recognizable listings yields an empty
/// vector, which the fetch loop reads as end of results.
pub fn parse_listings(html: &str) -> Vec<JobRecord> {
    let Some(selectors) = SELECTORS.as_ref() else {
        return Vec::new();
    };

    let document = Html::parse_fragment(html);
    let mut jobs = Vec::new();
    let mut dropped = 0usize;

    for card in document.select(&selectors.container) {
        match parse_listing(card, selectors) {
            Some(job) => jobs.push(job),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        tracing::debug!("Dropped {dropped} listings missing a position or company");
    }
    jobs
}

fn parse_listing(card: ElementRef<'_>, sel: &ListingSelectors) -> Option<JobRecord> {
    let salary = text_of(card, &sel.salary)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let job = JobRecord {
        position: text_of(card, &sel.title),
        company: text_of(card, &sel.company),
        company_logo: attr_of(card, &sel.logo, "data-delayed-url"),
        location: text_of(card, &sel.location),
        date: attr_of(card, &sel.date, "datetime"),
        ago_time: text_of(card, &sel.ago_time),
        salary: if salary.is_empty() {
            SALARY_NOT_SPECIFIED.to_string()
        } else {
            salary
        },
        job_url: attr_of(card, &sel.link, "href"),
    };

    job.is_valid().then_some(job)
}

/// Trimmed text of the first match inside `card`, or empty.
fn text_of(card: ElementRef<'_>, selector: &Selector) -> String {
    card.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Trimmed attribute of the first match inside `card`, or empty.
fn attr_of(card: ElementRef<'_>, selector: &Selector, name: &str) -> String {
    card.select(selector)
        .next()
        .and_then(|el| el.value().attr(name))
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}
