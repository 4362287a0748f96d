//! The compliance-analysis prompt and its output grammar.
//!
//! Centralising the prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the six field labels and the two summary
//!    headings are constants shared with the response parser, so the grammar
//!    the model is told to follow and the grammar the parser expects cannot
//!    drift apart.
//!
//! 2. **Testability** — unit tests inspect the assembled prompt directly
//!    without a live model, making grammar regressions easy to catch.

use crate::checklist;

/// The six per-item field labels, in the order the model must emit them.
///
/// Referenced verbatim by the parser's field regex.
pub const FIELD_LABELS: [&str; 6] = [
    "Status",
    "Pages",
    "Assessment",
    "Risk Level",
    "Recommendation",
    "Legal Citation",
];

/// Heading of the critical-issues summary section.
pub const CRITICAL_ISSUES_HEADING: &str = "SUMMARY OF CRITICAL ISSUES";

/// Heading of the self-reported scorecard section.
///
/// The scorecard counts are never trusted (the parser recomputes them); only
/// the letter grade is read from this section.
pub const SCORECARD_HEADING: &str = "COMPLIANCE SCORECARD";

/// Build the full analysis prompt for one handbook.
///
/// The handbook text is embedded verbatim with its `[PAGE N]` markers so the
/// model can report page locations, followed by the 20-item checklist and an
/// exact, machine-parseable output grammar. Everything after the `CRITICAL:`
/// line is a contract the response parser depends on; a model that deviates
/// degrades to partial or zero parsed findings.
pub fn compliance_prompt(handbook_text: &str) -> String {
    format!(
        r####"You are a California employment law expert specializing in employee handbook compliance.

Analyze the following employee handbook for compliance with California law.

IMPORTANT: The handbook text includes [PAGE X] markers showing which page each section is on. When you identify a policy, please note which page(s) it appears on.

HANDBOOK TEXT:
{handbook_text}

---

Check for the following required policies and provisions:

{checklist}

---

CRITICAL: You MUST format your response EXACTLY as shown below. Use this format for EACH item:

### 1. At-Will Employment Disclaimer (Labor Code §2922)
- **Status**: Present
- **Pages**: Pages 5, 9
- **Assessment**: Compliant. Clear statement that employment can be terminated by either party...
- **Risk Level**: Low
- **Recommendation**: No action needed
- **Legal Citation**: Labor Code §2922

### 2. Equal Employment Opportunity Policy (Gov. Code §12940)
- **Status**: Present
- **Pages**: Page 12
- **Assessment**: Compliant. Comprehensive policy covering all protected classes...
- **Risk Level**: Low
- **Recommendation**: No action needed
- **Legal Citation**: Gov. Code §12940

IMPORTANT FORMATTING RULES:
1. Start each item with "### [NUMBER]. [TITLE] ([CODE])"
2. Use bullet points with "- **FieldName**: value" format
3. ALL field names must be bolded with **
4. Include all 6 fields in order: {field_list}
5. Use exactly these field names (case-sensitive)

At the end, provide a summary section:

## {critical_heading}

1. **Missing PAGA Notice** - Description of the issue
2. **Another Issue** - Description

---

## {scorecard_heading}

- **Compliant Items**: 15
- **Partially Compliant Items**: 2
- **Non-Compliant Items**: 3
- **Total Items Reviewed**: 20
- **Overall Compliance Grade**: B

DO NOT deviate from this format. The output will be parsed by software that expects this exact structure.
"####,
        handbook_text = handbook_text,
        checklist = checklist::render_for_prompt(),
        field_list = FIELD_LABELS.join(", "),
        critical_heading = CRITICAL_ISSUES_HEADING,
        scorecard_heading = SCORECARD_HEADING,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_handbook_text_verbatim() {
        let prompt = compliance_prompt("[PAGE 1]\n\nWelcome to Acme Corp.");
        assert!(prompt.contains("[PAGE 1]\n\nWelcome to Acme Corp."));
    }

    #[test]
    fn prompt_enumerates_all_field_labels() {
        let prompt = compliance_prompt("text");
        for label in FIELD_LABELS {
            assert!(
                prompt.contains(&format!("**{label}**")),
                "prompt must show the {label} field"
            );
        }
        assert!(prompt.contains("Status, Pages, Assessment, Risk Level, Recommendation, Legal Citation"));
    }

    #[test]
    fn prompt_carries_checklist_and_summary_headings() {
        let prompt = compliance_prompt("text");
        assert!(prompt.contains("At-Will Employment Disclaimer"));
        assert!(prompt.contains("Workers' Rights Notice"));
        assert!(prompt.contains(CRITICAL_ISSUES_HEADING));
        assert!(prompt.contains(SCORECARD_HEADING));
    }
}
