//! Mock job API for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jobdeck_core::mock::MockJobApi;
//!
//! let api = MockJobApi::new()
//!     .with_search("rust", vec![job(1, 50.0, 3.0)])
//!     .with_latency_ms(100);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::{JobId, JobItem, JobItemExpanded};
use crate::traits::JobApi;

/// Mock job API with scripted responses and a call log.
#[derive(Clone, Default)]
pub struct MockJobApi {
    config: Arc<MockConfig>,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone, Default)]
struct MockConfig {
    searches: HashMap<String, Result<Vec<JobItem>, FetchError>>,
    items: HashMap<JobId, Result<JobItemExpanded, FetchError>>,
    latency_ms: u64,
}

/// A recorded call against the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Search(String),
    JobItem(JobId),
}

impl MockJobApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful search response.
    pub fn with_search(mut self, text: impl Into<String>, items: Vec<JobItem>) -> Self {
        Arc::make_mut(&mut self.config)
            .searches
            .insert(text.into(), Ok(items));
        self
    }

    /// Script a failing search response.
    pub fn with_search_error(mut self, text: impl Into<String>, err: FetchError) -> Self {
        Arc::make_mut(&mut self.config)
            .searches
            .insert(text.into(), Err(err));
        self
    }

    /// Script a successful detail response.
    pub fn with_item(mut self, item: JobItemExpanded) -> Self {
        Arc::make_mut(&mut self.config)
            .items
            .insert(item.id, Ok(item));
        self
    }

    /// Script a failing detail response.
    pub fn with_item_error(mut self, id: JobId, err: FetchError) -> Self {
        Arc::make_mut(&mut self.config).items.insert(id, Err(err));
        self
    }

    /// Delay every response by `ms` milliseconds.
    pub fn with_latency_ms(mut self, ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = ms;
        self
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of calls matching `call`.
    pub fn call_count(&self, call: &MockCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: MockCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    async fn delay(&self) {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }
    }
}

#[async_trait]
impl JobApi for MockJobApi {
    async fn search(&self, text: &str) -> Result<Vec<JobItem>, FetchError> {
        self.record(MockCall::Search(text.to_string()));
        self.delay().await;
        self.config
            .searches
            .get(text)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn job_item(&self, id: JobId) -> Result<JobItemExpanded, FetchError> {
        self.record(MockCall::JobItem(id));
        self.delay().await;
        self.config.items.get(&id).cloned().unwrap_or_else(|| {
            Err(FetchError::Remote {
                status: 404,
                description: format!("Job item {} not found", id),
            })
        })
    }
}

/// Build a summary record for tests.
pub fn job(id: JobId, relevance_score: f64, days_ago: f64) -> JobItem {
    JobItem {
        id,
        badge_letters: "JD".to_string(),
        title: format!("Job {}", id),
        company: "Acme".to_string(),
        days_ago,
        relevance_score,
    }
}

/// Build a detail record for tests.
pub fn job_expanded(id: JobId) -> JobItemExpanded {
    JobItemExpanded {
        id,
        badge_letters: "JD".to_string(),
        title: format!("Job {}", id),
        company: "Acme".to_string(),
        days_ago: 1.0,
        relevance_score: 50.0,
        description: format!("Description for job {}", id),
        qualifications: vec!["Rust".to_string()],
        reviews: Vec::new(),
        duration: "Full-Time".to_string(),
        location: "Remote".to_string(),
        salary: "$120,000+".to_string(),
        cover_img_url: String::new(),
        company_url: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_scripted_search() {
        let api = MockJobApi::new().with_search("rust", vec![job(1, 10.0, 2.0)]);
        let items = api.search("rust").await.unwrap();
        assert_eq!(items.len(), 1);
        assert!(api.search("go").await.unwrap().is_empty());
        assert_eq!(api.call_count(&MockCall::Search("rust".into())), 1);
    }

    #[tokio::test]
    async fn test_mock_unknown_item_is_remote_404() {
        let api = MockJobApi::new();
        let err = api.job_item(5).await.unwrap_err();
        assert!(matches!(err, FetchError::Remote { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_mock_clones_share_call_log() {
        let api = MockJobApi::new().with_item(job_expanded(3));
        let clone = api.clone();
        clone.job_item(3).await.unwrap();
        assert_eq!(api.calls(), vec![MockCall::JobItem(3)]);
    }
}
