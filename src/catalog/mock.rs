use super::{Catalog, DetailRecord, LookupError};
use media_diary_common::{Candidate, MediaKind};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A recorded `search_by_title` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCall {
    pub text: String,
    pub year_hint: Option<i32>,
}

/// In-memory catalog with scripted responses and call recording.
///
/// Lookup order: exact `(text, year_hint)` script, then a text-only script,
/// then the default response (empty unless set).
#[derive(Clone, Default)]
pub struct MockCatalog {
    by_text_and_year: HashMap<(String, Option<i32>), Vec<Candidate>>,
    by_text: HashMap<String, Vec<Candidate>>,
    default_response: Vec<Candidate>,
    details: HashMap<(MediaKind, u64), DetailRecord>,
    fail_with: Option<String>,
    calls: Arc<Mutex<Vec<SearchCall>>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every search fails with `LookupError::Unavailable`
    pub fn with_failure(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_results(
        mut self,
        text: &str,
        year_hint: Option<i32>,
        results: Vec<Candidate>,
    ) -> Self {
        self.by_text_and_year
            .insert((text.to_string(), year_hint), results);
        self
    }

    pub fn with_results_for_text(mut self, text: &str, results: Vec<Candidate>) -> Self {
        self.by_text.insert(text.to_string(), results);
        self
    }

    pub fn with_default_results(mut self, results: Vec<Candidate>) -> Self {
        self.default_response = results;
        self
    }

    pub fn with_detail(mut self, detail: DetailRecord) -> Self {
        self.details.insert((detail.kind, detail.id), detail);
        self
    }

    pub fn search_calls(&self) -> Vec<SearchCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Catalog for MockCatalog {
    async fn search_by_title(
        &self,
        text: &str,
        year_hint: Option<i32>,
    ) -> Result<Vec<Candidate>, LookupError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(SearchCall {
                text: text.to_string(),
                year_hint,
            });
        }

        if let Some(message) = &self.fail_with {
            return Err(LookupError::Unavailable(message.clone()));
        }

        let results = self
            .by_text_and_year
            .get(&(text.to_string(), year_hint))
            .or_else(|| self.by_text.get(text))
            .unwrap_or(&self.default_response);
        Ok(results.clone())
    }

    async fn fetch_detail(&self, kind: MediaKind, id: u64) -> Result<DetailRecord, LookupError> {
        if let Some(message) = &self.fail_with {
            return Err(LookupError::Unavailable(message.clone()));
        }
        self.details
            .get(&(kind, id))
            .cloned()
            .ok_or(LookupError::Status(404))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: &str, title: &str) -> Candidate {
        Candidate {
            external_id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_scripted_lookup_order() {
        let catalog = MockCatalog::new()
            .with_results("Dune", Some(2021), vec![movie("1", "Dune")])
            .with_results_for_text("Dune", vec![movie("2", "Dune")])
            .with_default_results(vec![movie("3", "Other")]);

        assert_eq!(catalog.search_by_title("Dune", Some(2021)).await.unwrap()[0].external_id, "1");
        assert_eq!(catalog.search_by_title("Dune", None).await.unwrap()[0].external_id, "2");
        assert_eq!(catalog.search_by_title("Heat", None).await.unwrap()[0].external_id, "3");
        assert_eq!(catalog.total_calls(), 3);
    }

    #[tokio::test]
    async fn test_failure_is_recorded() {
        let catalog = MockCatalog::with_failure("offline");
        let err = catalog.search_by_title("Heat", Some(1995)).await.unwrap_err();
        assert!(matches!(err, LookupError::Unavailable(_)));
        assert_eq!(
            catalog.search_calls(),
            vec![SearchCall {
                text: "Heat".into(),
                year_hint: Some(1995)
            }]
        );
    }

    #[tokio::test]
    async fn test_clones_share_call_log() {
        let catalog = MockCatalog::new();
        let clone = catalog.clone();
        clone.search_by_title("Heat", None).await.unwrap();
        assert_eq!(catalog.total_calls(), 1);
    }

    #[tokio::test]
    async fn test_detail_lookup() {
        let catalog = MockCatalog::new().with_detail(DetailRecord {
            id: 10,
            kind: MediaKind::Series,
            title: "Dark".into(),
            ..Default::default()
        });
        assert_eq!(catalog.fetch_detail(MediaKind::Series, 10).await.unwrap().title, "Dark");
        assert!(matches!(
            catalog.fetch_detail(MediaKind::Movie, 10).await,
            Err(LookupError::Status(404))
        ));
    }
}
