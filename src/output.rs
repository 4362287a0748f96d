//! Output types for a handbook audit.
//!
//! Everything the pipeline produces lives here: the extracted document, the
//! parsed findings and their derived classifications, the recomputed summary,
//! and the run statistics. All types are `Serialize` so the CLI can emit the
//! whole result as JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Text extracted from the handbook PDF.
///
/// Created once per run and discarded when the pipeline completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Every page's text in order, each preceded by a `[PAGE N]` marker.
    pub text: String,
    /// Raw per-page text, keyed by 1-indexed page number.
    pub pages: BTreeMap<usize, String>,
}

impl ExtractedDocument {
    /// Number of pages the PDF contained (including empty ones).
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// True when no page yielded any non-whitespace text.
    pub fn has_no_text(&self) -> bool {
        self.pages.values().all(|t| t.trim().is_empty())
    }
}

/// Derived compliance classification for one finding.
///
/// Recomputed locally from the Status and Assessment fields because the
/// model's self-declared scorecard can disagree with its own per-item text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compliance {
    Compliant,
    PartiallyCompliant,
    NonCompliant,
}

impl Compliance {
    /// Classify from the raw Status and Assessment text.
    ///
    /// Priority order:
    /// 1. Status contains "present" AND assessment contains "compliant"
    ///    without "non-compliant" or "partially" → compliant
    /// 2. Status contains "missing" OR assessment contains "non-compliant"
    ///    → non-compliant
    /// 3. everything else → partially compliant
    pub fn classify(status: &str, assessment: &str) -> Self {
        let status = status.to_lowercase();
        let assessment = assessment.to_lowercase();

        if status.contains("present")
            && assessment.contains("compliant")
            && !assessment.contains("non-compliant")
            && !assessment.contains("partially")
        {
            Compliance::Compliant
        } else if status.contains("missing") || assessment.contains("non-compliant") {
            Compliance::NonCompliant
        } else {
            Compliance::PartiallyCompliant
        }
    }
}

/// Risk tier used for color coding in the rendered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    High,
    Medium,
    Low,
}

impl RiskTier {
    /// Classify from the raw Risk Level text; anything unrecognised is Low.
    pub fn classify(risk: &str) -> Self {
        if risk.contains("High") {
            RiskTier::High
        } else if risk.contains("Medium") {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }
}

/// One parsed checklist finding.
///
/// All fields except `number` are free text captured from the model's
/// response; a field the model omitted is an empty string rather than a
/// parse failure (partial tolerance).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceFinding {
    /// Checklist ordinal as emitted by the model.
    pub number: u32,
    /// Policy title from the heading line.
    pub title: String,
    /// Legal code from the heading's parenthetical.
    pub code: String,
    /// Raw Status text (expected: Present / Missing / Partially Present).
    pub status: String,
    /// Free-text page locator, e.g. "Pages 5, 9". Not a structured list.
    pub pages: String,
    /// Free-text assessment.
    pub assessment: String,
    /// Raw Risk Level text.
    pub risk: String,
    /// Free-text recommendation.
    pub recommendation: String,
    /// Free-text legal citation.
    pub citation: String,
}

impl ComplianceFinding {
    /// Derived compliance classification.
    pub fn compliance(&self) -> Compliance {
        Compliance::classify(&self.status, &self.assessment)
    }

    /// Derived risk tier.
    pub fn risk_tier(&self) -> RiskTier {
        RiskTier::classify(&self.risk)
    }
}

/// Recomputed summary counts plus the model-reported letter grade.
///
/// Invariant: `compliant + partial + noncompliant == total` and `total`
/// equals the number of findings parsed, for any input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceSummary {
    pub compliant: usize,
    pub partial: usize,
    pub noncompliant: usize,
    pub total: usize,
    /// Letter grade A–F from the model's text, or "N/A" when absent.
    pub grade: String,
}

impl ComplianceSummary {
    /// Recompute counts from the findings; the grade is the only field taken
    /// from the model's text.
    pub fn from_findings(findings: &[ComplianceFinding], grade: Option<char>) -> Self {
        let mut compliant = 0;
        let mut partial = 0;
        let mut noncompliant = 0;
        for f in findings {
            match f.compliance() {
                Compliance::Compliant => compliant += 1,
                Compliance::PartiallyCompliant => partial += 1,
                Compliance::NonCompliant => noncompliant += 1,
            }
        }
        ComplianceSummary {
            compliant,
            partial,
            noncompliant,
            total: findings.len(),
            grade: grade.map(|g| g.to_string()).unwrap_or_else(|| "N/A".into()),
        }
    }

    /// Whole-percent compliance rate (compliant / total), 0 when empty.
    pub fn rate_percent(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.compliant * 100 / self.total
        }
    }
}

/// One entry from the critical-issues summary section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalIssue {
    pub title: String,
    pub description: String,
}

/// The structured result of parsing the model's raw analysis text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAnalysis {
    /// Findings in the order the model emitted them. May be fewer than 20
    /// when the model deviates from the requested format.
    pub findings: Vec<ComplianceFinding>,
    pub summary: ComplianceSummary,
    pub critical_issues: Vec<CriticalIssue>,
}

/// Statistics for one audit run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditStats {
    /// Pages in the source PDF.
    pub page_count: usize,
    /// Characters of extracted handbook text (markers included).
    pub extracted_chars: usize,
    /// Characters in the assembled prompt.
    pub prompt_chars: usize,
    /// Prompt tokens reported by the provider.
    pub input_tokens: u64,
    /// Completion tokens reported by the provider.
    pub output_tokens: u64,
    /// Whether the single rate-limit retry fired.
    pub rate_limit_retried: bool,
    /// True when the response did not parse and the report fell back to
    /// raw text.
    pub parse_degraded: bool,
    pub extract_duration_ms: u64,
    pub llm_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// The complete result of one audit run.
#[derive(Debug, Clone, Serialize)]
pub struct AuditOutput {
    /// Subject name shown on the report (the handbook file stem).
    pub subject: String,
    /// Raw model text, kept verbatim for the degraded rendering path.
    pub analysis: String,
    /// Structured result, or `None` when the grammar did not match
    /// (parse degradation — the report falls back to the raw text).
    pub parsed: Option<ParsedAnalysis>,
    pub stats: AuditStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_present_and_compliant() {
        assert_eq!(
            Compliance::classify("Present", "Compliant. Covers all classes."),
            Compliance::Compliant
        );
    }

    #[test]
    fn classify_missing_is_noncompliant() {
        assert_eq!(
            Compliance::classify("Missing", "No harassment policy found."),
            Compliance::NonCompliant
        );
    }

    #[test]
    fn classify_non_compliant_assessment_wins_over_present() {
        assert_eq!(
            Compliance::classify("Present", "Non-compliant: lacks premium pay language."),
            Compliance::NonCompliant
        );
    }

    #[test]
    fn classify_partial_falls_through() {
        assert_eq!(
            Compliance::classify("Present", "Partially compliant; missing PAGA language."),
            Compliance::PartiallyCompliant
        );
        assert_eq!(
            Compliance::classify("Partially Present", "Covers some classes."),
            Compliance::PartiallyCompliant
        );
    }

    #[test]
    fn risk_tier_defaults_to_low() {
        assert_eq!(RiskTier::classify("High"), RiskTier::High);
        assert_eq!(RiskTier::classify("Medium risk"), RiskTier::Medium);
        assert_eq!(RiskTier::classify("Low"), RiskTier::Low);
        assert_eq!(RiskTier::classify("unclear"), RiskTier::Low);
    }

    fn finding(status: &str, assessment: &str) -> ComplianceFinding {
        ComplianceFinding {
            number: 1,
            title: "T".into(),
            code: "C".into(),
            status: status.into(),
            pages: String::new(),
            assessment: assessment.into(),
            risk: "Low".into(),
            recommendation: String::new(),
            citation: String::new(),
        }
    }

    #[test]
    fn summary_counts_are_internally_consistent() {
        let findings = vec![
            finding("Present", "Compliant."),
            finding("Missing", "Absent."),
            finding("Present", "Partially compliant."),
            finding("Present", "Compliant. Thorough."),
        ];
        let summary = ComplianceSummary::from_findings(&findings, Some('B'));
        assert_eq!(summary.compliant, 2);
        assert_eq!(summary.noncompliant, 1);
        assert_eq!(summary.partial, 1);
        assert_eq!(
            summary.compliant + summary.partial + summary.noncompliant,
            summary.total
        );
        assert_eq!(summary.grade, "B");
        assert_eq!(summary.rate_percent(), 50);
    }

    #[test]
    fn summary_grade_defaults_to_na() {
        let summary = ComplianceSummary::from_findings(&[], None);
        assert_eq!(summary.grade, "N/A");
        assert_eq!(summary.total, 0);
        assert_eq!(summary.rate_percent(), 0);
    }

    #[test]
    fn extracted_document_no_text_detection() {
        let mut pages = BTreeMap::new();
        pages.insert(1, "  \n".to_string());
        pages.insert(2, String::new());
        let doc = ExtractedDocument {
            text: "[PAGE 1]\n\n[PAGE 2]\n".into(),
            pages,
        };
        assert!(doc.has_no_text());
        assert_eq!(doc.page_count(), 2);
    }
}
