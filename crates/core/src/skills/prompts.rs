//! Prompt templates for the research skills.
//!
//! The system prompt is bundled at compile time; per-call prompts are
//! built from the templates below.

/// Medical researcher system prompt - sent with planning and synthesis calls
pub const MEDICAL_RESEARCHER: &str = include_str!("defaults/medical_researcher.md");

/// Prompt asking the model to break a query into STEP/ACTION lines
pub fn planning_prompt(query: &str) -> String {
    format!(
        r#"Break down this medical research query into a step-by-step plan.

Research Query: {query}

Create 3-6 concrete steps to answer this query. Each step should use one of these approaches:
1. Build PICO query - Structure the question using PICO framework
2. Map MeSH terms - Convert common terms to MeSH vocabulary
3. Search PubMed - Search for evidence on specific aspects
4. Classify evidence - Evaluate the quality of found studies
5. Synthesize findings - Combine results into conclusions

Format each step as:
STEP [number]: [brief description]
ACTION: [pico_query | mesh_mapping | pubmed_search | evidence_classification | synthesis]

Example:
STEP 1: Structure the research question using PICO
ACTION: pico_query

STEP 2: Map key terms to MeSH vocabulary
ACTION: mesh_mapping

Provide your plan:
"#
    )
}

/// Prompt for structured PICO extraction
pub fn pico_prompt(query: &str) -> String {
    format!(
        r#"Analyze this medical research question and extract PICO components:

Question: {query}

Extract and format as:
P (Population): [patient/population characteristics]
I (Intervention): [treatment, test, or exposure]
C (Comparison): [alternative or control, if applicable]
O (Outcome): [outcomes of interest]

Also provide:
- Optimized PubMed search query using MeSH terms
- Key search terms to include

Be specific and use medical terminology."#
    )
}

/// Fallback prompt for classifying evidence when no marker matches
pub fn evidence_prompt(context: &str) -> String {
    format!(
        r#"Classify the evidence levels of studies mentioned in this research context:

{context}

For each study or finding, identify:
- Study type (RCT, cohort, case-control, etc.)
- Evidence level (I-V)
- Key limitations

Format as a structured summary."#
    )
}

/// Prompt for the final synthesis over accumulated findings
pub fn synthesis_prompt(query: &str, context: &str) -> String {
    format!(
        r#"Synthesize the following medical research findings to answer the original query.

Original Query: {query}

Research Findings:
{context}

Provide a comprehensive synthesis that:
1. Directly answers the research question
2. Weighs evidence by quality level
3. Acknowledges limitations and gaps
4. Suggests clinical/research implications
5. Identifies areas needing further research

Format with clear sections and proper citations."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_non_empty() {
        assert!(MEDICAL_RESEARCHER.len() > 50);
        assert!(MEDICAL_RESEARCHER.contains("PICO"));
    }

    #[test]
    fn test_templates_embed_inputs() {
        assert!(planning_prompt("statins in elderly").contains("statins in elderly"));
        assert!(pico_prompt("q").contains("P (Population)"));
        assert!(synthesis_prompt("q", "ctx").contains("Research Findings:\nctx"));
    }
}
