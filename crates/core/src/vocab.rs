//! # Medical Vocabulary
//!
//! Static lookup tables for evidence-based medicine: common-term to MeSH
//! (Medical Subject Headings) mappings and the keyword markers used to place
//! a study on the evidence hierarchy.

/// Common medical terms mapped to their official MeSH vocabulary equivalents.
///
/// Multi-word keys are matched by substring against the lower-cased input, so
/// "type 2 diabetes" must appear before it would ever be shadowed by "diabetes"
/// in caller output ordering. The table itself is unordered lookup data.
pub const MESH_TERM_MAPPINGS: &[(&str, &str)] = &[
    // Cardiovascular
    ("high blood pressure", "Hypertension"),
    ("hypertension", "Hypertension"),
    ("heart attack", "Myocardial Infarction"),
    ("myocardial infarction", "Myocardial Infarction"),
    ("heart failure", "Heart Failure"),
    ("irregular heartbeat", "Arrhythmias, Cardiac"),
    ("arrhythmia", "Arrhythmias, Cardiac"),
    ("chest pain", "Chest Pain"),
    ("stroke", "Stroke"),
    ("atrial fibrillation", "Atrial Fibrillation"),
    ("coronary artery disease", "Coronary Artery Disease"),
    // Diabetes
    ("diabetes", "Diabetes Mellitus"),
    ("type 2 diabetes", "Diabetes Mellitus, Type 2"),
    ("type 1 diabetes", "Diabetes Mellitus, Type 1"),
    ("high blood sugar", "Hyperglycemia"),
    ("low blood sugar", "Hypoglycemia"),
    ("insulin resistance", "Insulin Resistance"),
    ("hba1c", "Glycated Hemoglobin A"),
    ("metformin", "Metformin"),
    ("sglt2", "Sodium-Glucose Transporter 2 Inhibitors"),
    ("sglt2 inhibitors", "Sodium-Glucose Transporter 2 Inhibitors"),
    // Oncology
    ("cancer", "Neoplasms"),
    ("tumor", "Neoplasms"),
    ("breast cancer", "Breast Neoplasms"),
    ("lung cancer", "Lung Neoplasms"),
    ("colon cancer", "Colonic Neoplasms"),
    ("prostate cancer", "Prostatic Neoplasms"),
    ("chemotherapy", "Antineoplastic Agents"),
    ("immunotherapy", "Immunotherapy"),
    // Respiratory
    ("asthma", "Asthma"),
    ("copd", "Pulmonary Disease, Chronic Obstructive"),
    ("pneumonia", "Pneumonia"),
    ("bronchitis", "Bronchitis"),
    // Infectious Disease
    ("infection", "Infection"),
    ("covid", "COVID-19"),
    ("coronavirus", "COVID-19"),
    ("flu", "Influenza, Human"),
    ("influenza", "Influenza, Human"),
    ("antibiotic", "Anti-Bacterial Agents"),
    ("antiviral", "Antiviral Agents"),
    // Mental Health
    ("depression", "Depressive Disorder"),
    ("anxiety", "Anxiety Disorders"),
    ("schizophrenia", "Schizophrenia"),
    ("bipolar", "Bipolar Disorder"),
    ("ptsd", "Stress Disorders, Post-Traumatic"),
    // Pain
    ("pain", "Pain"),
    ("headache", "Headache"),
    ("migraine", "Migraine Disorders"),
    ("back pain", "Back Pain"),
    ("chronic pain", "Chronic Pain"),
    // Dental
    ("tooth decay", "Dental Caries"),
    ("gum disease", "Periodontal Diseases"),
    ("periodontitis", "Periodontitis"),
    ("gingivitis", "Gingivitis"),
    ("toothache", "Toothache"),
    ("oral health", "Oral Health"),
    ("dental implant", "Dental Implants"),
    // Study Types
    ("randomized controlled trial", "Randomized Controlled Trial"),
    ("rct", "Randomized Controlled Trial"),
    ("systematic review", "Systematic Review"),
    ("meta-analysis", "Meta-Analysis"),
    ("cohort study", "Cohort Studies"),
    ("case-control", "Case-Control Studies"),
    // Outcomes
    ("mortality", "Mortality"),
    ("survival", "Survival Rate"),
    ("quality of life", "Quality of Life"),
    ("adverse effects", "Drug-Related Side Effects and Adverse Reactions"),
    ("side effects", "Drug-Related Side Effects and Adverse Reactions"),
];

/// Keyword markers for each evidence level, highest quality first.
///
/// Level I outranks Level V; [`level_rank`] gives the ordering.
pub const EVIDENCE_LEVEL_MARKERS: &[(&str, &[&str])] = &[
    (
        "Level I",
        &[
            "systematic review",
            "meta-analysis",
            "cochrane review",
            "pooled analysis",
            "umbrella review",
        ],
    ),
    (
        "Level II",
        &[
            "randomized controlled trial",
            "rct",
            "randomised controlled trial",
            "double-blind",
            "placebo-controlled",
            "multicenter trial",
        ],
    ),
    (
        "Level III",
        &[
            "cohort study",
            "prospective study",
            "longitudinal study",
            "follow-up study",
            "observational study",
        ],
    ),
    (
        "Level IV",
        &[
            "case-control",
            "case control",
            "retrospective study",
            "cross-sectional",
            "survey",
        ],
    ),
    (
        "Level V",
        &[
            "case report",
            "case series",
            "expert opinion",
            "narrative review",
            "editorial",
            "letter",
            "commentary",
        ],
    ),
];

/// Look up the MeSH heading for a common term (exact, case-insensitive)
pub fn mesh_term(term: &str) -> Option<&'static str> {
    let needle = term.to_lowercase();
    MESH_TERM_MAPPINGS
        .iter()
        .find(|(common, _)| *common == needle)
        .map(|(_, mesh)| *mesh)
}

/// Rank of an evidence level, 0 = Level I (highest quality)
///
/// Unknown labels rank below Level V.
pub fn level_rank(level: &str) -> usize {
    EVIDENCE_LEVEL_MARKERS
        .iter()
        .position(|(name, _)| *name == level)
        .unwrap_or(EVIDENCE_LEVEL_MARKERS.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_lookup() {
        assert_eq!(mesh_term("heart attack"), Some("Myocardial Infarction"));
        assert_eq!(mesh_term("Heart Attack"), Some("Myocardial Infarction"));
        assert_eq!(mesh_term("quantum entanglement"), None);
    }

    #[test]
    fn test_level_rank_ordering() {
        assert!(level_rank("Level I") < level_rank("Level II"));
        assert!(level_rank("Level IV") < level_rank("Level V"));
        assert_eq!(level_rank("Level VIII"), EVIDENCE_LEVEL_MARKERS.len());
    }

    #[test]
    fn test_markers_are_lowercase() {
        for (_, markers) in EVIDENCE_LEVEL_MARKERS {
            for marker in *markers {
                assert_eq!(*marker, marker.to_lowercase());
            }
        }
    }
}
