//! # Report Formatter
//!
//! Assembles ordered findings plus the synthesis into the final research
//! report. Purely presentational; no state.

use serde::Serialize;

use super::coordinator::Finding;
use crate::models::SearchRecord;

/// At most this many sources are rendered into the report
const MAX_SOURCES: usize = 20;

/// The final artifact of a research run
#[derive(Debug, Clone, Serialize)]
pub struct ResearchReport {
    pub query: String,
    pub findings: Vec<Finding>,
    /// Markdown report assembled by [`format_report`]
    pub formatted: String,
    /// The synthesis text, also embedded as the executive summary
    pub synthesis: String,
    /// Every source accumulated across steps, in discovery order
    pub sources: Vec<SearchRecord>,
}

/// Assemble the markdown report: header, executive summary, numbered
/// finding sections (error findings skipped), and up to the first 20
/// sources as a linked list.
pub fn format_report(
    query: &str,
    findings: &[Finding],
    synthesis: &str,
    sources: &[SearchRecord],
) -> String {
    let mut out = format!(
        "# Research Report: {query}\n\n## Executive Summary\n{synthesis}\n\n## Detailed Findings\n"
    );

    let mut section = 0;
    for finding in findings {
        if finding.content.is_empty() || finding.error.is_some() {
            continue;
        }
        section += 1;
        out.push_str(&format!(
            "\n### {section}. {}\n{}\n",
            finding.step_name, finding.content
        ));
    }

    if !sources.is_empty() {
        out.push_str("\n## Sources\n");
        for (i, source) in sources.iter().take(MAX_SOURCES).enumerate() {
            out.push_str(&format!("{}. [{}]({})\n", i + 1, source.title, source.link));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(name: &str, content: &str, error: Option<&str>) -> Finding {
        Finding {
            step_id: "1".to_string(),
            step_name: name.to_string(),
            action: "search".to_string(),
            content: content.to_string(),
            sources: Vec::new(),
            evidence_levels: Default::default(),
            error: error.map(String::from),
        }
    }

    fn source(n: usize) -> SearchRecord {
        SearchRecord {
            title: format!("Study {n}"),
            link: format!("https://pubmed.ncbi.nlm.nih.gov/{n}/"),
            ..Default::default()
        }
    }

    #[test]
    fn test_report_structure() {
        let findings = vec![finding("Search PubMed", "Found 3 trials", None)];
        let report = format_report("metformin", &findings, "It works.", &[source(1)]);

        assert!(report.starts_with("# Research Report: metformin"));
        assert!(report.contains("## Executive Summary\nIt works."));
        assert!(report.contains("### 1. Search PubMed\nFound 3 trials"));
        assert!(report.contains("1. [Study 1](https://pubmed.ncbi.nlm.nih.gov/1/)"));
    }

    #[test]
    fn test_error_findings_skipped() {
        let findings = vec![
            finding("Good step", "content", None),
            finding("Bad step", "Error: boom", Some("boom")),
            finding("Another good step", "more content", None),
        ];
        let report = format_report("q", &findings, "s", &[]);

        assert!(report.contains("### 1. Good step"));
        assert!(!report.contains("Bad step"));
        assert!(report.contains("### 2. Another good step"));
    }

    #[test]
    fn test_sources_truncated_to_twenty() {
        let sources: Vec<SearchRecord> = (1..=25).map(source).collect();
        let report = format_report("q", &[], "s", &sources);

        assert!(report.contains("20. [Study 20]"));
        assert!(!report.contains("21. [Study 21]"));
    }

    #[test]
    fn test_no_sources_section_when_empty() {
        let report = format_report("q", &[], "s", &[]);
        assert!(!report.contains("## Sources"));
    }
}
