//! Data models for job listings and UI selection state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a job listing. `0` is never a valid id.
pub type JobId = u64;

// =============================================================================
// RECORDS
// =============================================================================

/// Summary record returned by a search-query fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobItem {
    pub id: JobId,
    #[serde(default)]
    pub badge_letters: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    pub days_ago: f64,
    pub relevance_score: f64,
}

/// Full record for one id, returned by a single-item fetch.
///
/// Carries every summary field plus the extended detail fields. It is cached
/// independently of any [`JobItem`] with the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobItemExpanded {
    pub id: JobId,
    #[serde(default)]
    pub badge_letters: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    pub days_ago: f64,
    pub relevance_score: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub qualifications: Vec<String>,
    #[serde(default)]
    pub reviews: Vec<String>,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub salary: String,
    #[serde(default, rename = "coverImgURL")]
    pub cover_img_url: String,
    #[serde(default, rename = "companyURL")]
    pub company_url: String,
}

impl JobItemExpanded {
    /// Project the summary fields out of a detail record.
    pub fn summary(&self) -> JobItem {
        JobItem {
            id: self.id,
            badge_letters: self.badge_letters.clone(),
            title: self.title.clone(),
            company: self.company.clone(),
            days_ago: self.days_ago,
            relevance_score: self.relevance_score,
        }
    }
}

// =============================================================================
// WIRE ENVELOPES
// =============================================================================

/// Body of a successful list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobItemsResponse {
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub sorted: bool,
    pub job_items: Vec<JobItem>,
}

/// Body of a successful detail response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobItemResponse {
    #[serde(default)]
    pub public: bool,
    pub job_item: JobItemExpanded,
}

/// Body of a non-2xx response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub description: String,
}

// =============================================================================
// SORT / PAGINATION
// =============================================================================

/// Ordering applied to the result set before pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Descending relevance score.
    #[default]
    Relevant,
    /// Ascending days since posted.
    Recent,
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortBy::Relevant => write!(f, "relevant"),
            SortBy::Recent => write!(f, "recent"),
        }
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "relevant" => Ok(SortBy::Relevant),
            "recent" => Ok(SortBy::Recent),
            _ => Err(format!("Invalid sort mode: {}", s)),
        }
    }
}

/// Direction of a page change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageDirection {
    Next,
    Previous,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_item_decodes_camel_case() {
        let item: JobItem = serde_json::from_value(json!({
            "id": 42,
            "badgeLetters": "AC",
            "title": "Front End React Engineer",
            "company": "Acme",
            "daysAgo": 3,
            "relevanceScore": 87.5
        }))
        .unwrap();

        assert_eq!(item.id, 42);
        assert_eq!(item.badge_letters, "AC");
        assert_eq!(item.days_ago, 3.0);
        assert_eq!(item.relevance_score, 87.5);
    }

    #[test]
    fn test_job_item_requires_sort_fields() {
        let result: Result<JobItem, _> = serde_json::from_value(json!({
            "id": 1,
            "title": "No score"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_expanded_decodes_url_fields() {
        let item: JobItemExpanded = serde_json::from_value(json!({
            "id": 7,
            "daysAgo": 1,
            "relevanceScore": 10,
            "coverImgURL": "https://img.example/cover.png",
            "companyURL": "https://acme.example",
            "qualifications": ["Rust"],
        }))
        .unwrap();

        assert_eq!(item.cover_img_url, "https://img.example/cover.png");
        assert_eq!(item.company_url, "https://acme.example");
        assert_eq!(item.qualifications, vec!["Rust".to_string()]);
        assert!(item.reviews.is_empty());
    }

    #[test]
    fn test_expanded_summary_projection() {
        let item: JobItemExpanded = serde_json::from_value(json!({
            "id": 9,
            "title": "Backend",
            "daysAgo": 4,
            "relevanceScore": 55,
            "salary": "$100k"
        }))
        .unwrap();

        let summary = item.summary();
        assert_eq!(summary.id, 9);
        assert_eq!(summary.title, "Backend");
        assert_eq!(summary.relevance_score, 55.0);
    }

    #[test]
    fn test_sort_by_round_trip_str() {
        assert_eq!("Recent".parse::<SortBy>().unwrap(), SortBy::Recent);
        assert_eq!(SortBy::Relevant.to_string(), "relevant");
        assert!("oldest".parse::<SortBy>().is_err());
        assert_eq!(SortBy::default(), SortBy::Relevant);
    }

    #[test]
    fn test_sort_by_serde_lowercase() {
        assert_eq!(serde_json::to_string(&SortBy::Recent).unwrap(), "\"recent\"");
    }

    #[test]
    fn test_items_response_tolerates_missing_flags() {
        let resp: JobItemsResponse = serde_json::from_value(json!({
            "jobItems": []
        }))
        .unwrap();
        assert!(resp.job_items.is_empty());
        assert!(!resp.sorted);
    }
}
