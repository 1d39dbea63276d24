//! # Citation Skill
//!
//! Vancouver/ICMJE-style citation formatting for medical literature.
//! Purely presentational.

/// Format a citation in Vancouver style.
///
/// Empty fields are skipped; the result always ends with a period.
pub fn format_citation(title: &str, authors: &str, journal: &str, year: &str, pmid: &str) -> String {
    let mut parts: Vec<String> = Vec::new();

    if !authors.is_empty() {
        parts.push(authors.to_string());
    }

    parts.push(title.to_string());

    if !journal.is_empty() {
        let mut journal_part = journal.to_string();
        if !year.is_empty() {
            journal_part.push_str(&format!(". {year}"));
        }
        parts.push(journal_part);
    } else if !year.is_empty() {
        parts.push(year.to_string());
    }

    if !pmid.is_empty() {
        parts.push(format!("PMID: {pmid}"));
    }

    let mut formatted = parts.join(". ");
    if !formatted.ends_with('.') {
        formatted.push('.');
    }
    formatted
}
