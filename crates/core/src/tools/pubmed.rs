//! # PubMed Client
//!
//! Literature search over the NCBI E-utilities API: `esearch` resolves the
//! query to PMIDs, `esummary` expands them into titled records linking back
//! to pubmed.ncbi.nlm.nih.gov.

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::models::{SearchProvider, SearchRecord};

const EUTILS_BASE: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
const DEFAULT_MAX_RESULTS: u32 = 10;
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// PubMed search engine over NCBI E-utilities
pub struct PubMedClient {
    client: reqwest::Client,
    max_results: u32,
}

impl PubMedClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("medresearch/0.1")
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            max_results: DEFAULT_MAX_RESULTS,
        })
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    async fn esearch(&self, query: &str) -> Result<Vec<String>> {
        let url = format!(
            "{EUTILS_BASE}/esearch.fcgi?db=pubmed&retmode=json&retmax={}&term={}",
            self.max_results,
            urlencoding::encode(query)
        );

        let json: serde_json::Value = self
            .client
            .get(&url)
            .send()
            .await
            .context("esearch request failed")?
            .error_for_status()
            .context("esearch returned an error status")?
            .json()
            .await
            .context("failed to parse esearch response")?;

        let ids = json["esearchresult"]["idlist"]
            .as_array()
            .map(|list| {
                list.iter()
                    .filter_map(|id| id.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        Ok(ids)
    }

    async fn esummary(&self, ids: &[String]) -> Result<Vec<SearchRecord>> {
        let url = format!(
            "{EUTILS_BASE}/esummary.fcgi?db=pubmed&retmode=json&id={}",
            ids.join(",")
        );

        let json: serde_json::Value = self
            .client
            .get(&url)
            .send()
            .await
            .context("esummary request failed")?
            .error_for_status()
            .context("esummary returned an error status")?
            .json()
            .await
            .context("failed to parse esummary response")?;

        let result = &json["result"];
        let records = ids
            .iter()
            .filter_map(|id| {
                let doc = &result[id];
                let title = doc["title"].as_str()?;
                Some(SearchRecord {
                    title: title.to_string(),
                    link: format!("https://pubmed.ncbi.nlm.nih.gov/{id}/"),
                    snippet: summary_snippet(doc),
                    authors: doc["authors"]
                        .as_array()
                        .map(|authors| {
                            authors
                                .iter()
                                .filter_map(|a| a["name"].as_str().map(str::to_string))
                                .collect()
                        })
                        .unwrap_or_default(),
                    pubdate: doc["pubdate"].as_str().map(str::to_string),
                })
            })
            .collect();

        Ok(records)
    }
}

/// Journal citation line used as the record snippet
fn summary_snippet(doc: &serde_json::Value) -> String {
    let journal = doc["fulljournalname"]
        .as_str()
        .or_else(|| doc["source"].as_str())
        .unwrap_or_default();
    let pubdate = doc["pubdate"].as_str().unwrap_or_default();

    match (journal.is_empty(), pubdate.is_empty()) {
        (false, false) => format!("{journal} ({pubdate})"),
        (false, true) => journal.to_string(),
        (true, false) => pubdate.to_string(),
        (true, true) => String::new(),
    }
}

#[async_trait]
impl SearchProvider for PubMedClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchRecord>> {
        tracing::debug!(query, "querying PubMed E-utilities");

        let ids = self.esearch(query).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.esummary(&ids).await
    }
}
