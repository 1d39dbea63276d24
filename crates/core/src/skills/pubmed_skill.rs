//! # PubMed Skill
//!
//! Literature search handler. Runs the configured search provider and
//! formats the top results; when the provider is absent or errors the step
//! still yields content describing the degradation.

use crate::models::{SearchProvider, SearchRecord};
use crate::skills::StepOutcome;

/// Results past this count are not rendered into the step content
const MAX_FORMATTED: usize = 10;

/// PubMed literature search
pub struct PubmedSkill;

impl PubmedSkill {
    /// Search the literature for the query
    pub async fn run(
        search: Option<&dyn SearchProvider>,
        query: &str,
    ) -> anyhow::Result<StepOutcome> {
        tracing::info!(query, "searching PubMed");

        let Some(provider) = search else {
            return Ok(StepOutcome::text(
                "PubMed search engine not configured. Please configure a search engine.",
            ));
        };

        match provider.search(query).await {
            Ok(results) if results.is_empty() => {
                Ok(StepOutcome::text("No search results available"))
            }
            Ok(results) => Ok(StepOutcome {
                content: format_results(&results),
                sources: results,
                evidence_levels: Default::default(),
            }),
            Err(e) => {
                tracing::warn!("PubMed search failed: {e:#}");
                Ok(StepOutcome::text("No search results available"))
            }
        }
    }
}

/// Format search results into readable text
fn format_results(results: &[SearchRecord]) -> String {
    let formatted: Vec<String> = results
        .iter()
        .take(MAX_FORMATTED)
        .enumerate()
        .map(|(i, r)| {
            let mut entry = format!("{}. **{}**", i + 1, r.title);
            if !r.authors.is_empty() {
                let mut author_str = r
                    .authors
                    .iter()
                    .take(3)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ");
                if r.authors.len() > 3 {
                    author_str.push_str(" et al.");
                }
                entry.push_str(&format!("\n   Authors: {author_str}"));
            }
            if let Some(date) = r.pubdate.as_deref() {
                let year: String = date.chars().take(4).collect();
                if !year.is_empty() {
                    entry.push_str(&format!(" ({year})"));
                }
            }
            if !r.snippet.is_empty() {
                let snippet: String = r.snippet.chars().take(300).collect();
                entry.push_str(&format!("\n   {snippet}..."));
            }
            if !r.link.is_empty() {
                entry.push_str(&format!("\n   Link: {}", r.link));
            }
            entry
        })
        .collect();

    format!(
        "Found {} results:\n\n{}",
        results.len(),
        formatted.join("\n\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedSearch(Vec<SearchRecord>);

    #[async_trait]
    impl SearchProvider for FixedSearch {
        async fn search(&self, _query: &str) -> anyhow::Result<Vec<SearchRecord>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenSearch;

    #[async_trait]
    impl SearchProvider for BrokenSearch {
        async fn search(&self, _query: &str) -> anyhow::Result<Vec<SearchRecord>> {
            anyhow::bail!("connection refused")
        }
    }

    fn record(n: usize) -> SearchRecord {
        SearchRecord {
            title: format!("Trial {n}"),
            link: format!("https://pubmed.ncbi.nlm.nih.gov/{n}/"),
            snippet: "A randomized controlled trial".to_string(),
            authors: vec!["Smith J".to_string()],
            pubdate: Some("2024 Jan".to_string()),
        }
    }

    #[tokio::test]
    async fn test_formats_results_and_keeps_sources() {
        let records: Vec<SearchRecord> = (1..=3).map(record).collect();
        let outcome = PubmedSkill::run(Some(&FixedSearch(records)), "metformin")
            .await
            .unwrap();

        assert!(outcome.content.starts_with("Found 3 results:"));
        assert!(outcome.content.contains("1. **Trial 1**"));
        assert!(outcome.content.contains("Authors: Smith J"));
        assert_eq!(outcome.sources.len(), 3);
    }

    #[tokio::test]
    async fn test_formats_at_most_ten_results() {
        let records: Vec<SearchRecord> = (1..=15).map(record).collect();
        let outcome = PubmedSkill::run(Some(&FixedSearch(records)), "metformin")
            .await
            .unwrap();

        assert!(outcome.content.contains("Found 15 results:"));
        assert!(outcome.content.contains("10. **Trial 10**"));
        assert!(!outcome.content.contains("11. **Trial 11**"));
        // all sources are retained even when not rendered
        assert_eq!(outcome.sources.len(), 15);
    }

    #[tokio::test]
    async fn test_missing_provider_degrades_to_text() {
        let outcome = PubmedSkill::run(None, "metformin").await.unwrap();
        assert!(outcome.content.contains("not configured"));
        assert!(outcome.sources.is_empty());
    }

    #[tokio::test]
    async fn test_provider_error_degrades_to_text() {
        let outcome = PubmedSkill::run(Some(&BrokenSearch), "metformin")
            .await
            .unwrap();
        assert_eq!(outcome.content, "No search results available");
    }
}
