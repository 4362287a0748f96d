//! Report rendering: lay the parsed analysis out as a paginated PDF.
//!
//! The document is built directly with lopdf: US Letter pages, Helvetica
//! base-14 fonts, and a small cursor-based composer that wraps text and
//! breaks pages. Byte-exact layout is not contractual — only the section
//! order is: title block, metadata table, executive summary, score table,
//! critical issues, one detail block per finding, disclaimer.
//!
//! Two paths share the title/metadata block:
//!
//! * **Structured** — the parsed findings with risk levels in three color
//!   tiers and an executive summary worded by compliance-rate thresholds.
//! * **Degraded** — the model's raw text rendered verbatim with minimal
//!   markup stripped. This path must never fail, whatever the text looks
//!   like; everything is sanitised to Latin-1 before it reaches the page.

use crate::error::AuditError;
use crate::output::{AuditOutput, ComplianceSummary, ParsedAnalysis, RiskTier};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::{info, warn};

// US Letter, 0.75" margins.
const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 54.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
/// Left column width for label/value rows.
const LABEL_WIDTH: f32 = 120.0;
const LEADING: f32 = 1.35;

// Font resource names registered on the page tree.
const REGULAR: &str = "F1";
const BOLD: &str = "F2";
const ITALIC: &str = "F3";

// Colors as (r, g, b) in 0..=1.
const BODY: (f32, f32, f32) = (0.2, 0.2, 0.2);
const HEADER_BLUE: (f32, f32, f32) = (0.17, 0.35, 0.63);
const RISK_HIGH: (f32, f32, f32) = (0.8, 0.0, 0.0);
const RISK_MEDIUM: (f32, f32, f32) = (0.9, 0.5, 0.0);
const RISK_LOW: (f32, f32, f32) = (0.0, 0.5, 0.0);

/// Render the audit result as PDF bytes.
///
/// Chooses the structured or degraded path depending on whether parsing
/// succeeded. The degraded path accepts arbitrary unstructured text.
pub fn render_report(output: &AuditOutput) -> Result<Vec<u8>, AuditError> {
    let generated = chrono::Local::now().format("%B %d, %Y").to_string();

    let mut page = Composer::new();
    match &output.parsed {
        Some(parsed) => {
            info!("Rendering structured report: {} findings", parsed.findings.len());
            render_structured(&mut page, &output.subject, &generated, parsed);
        }
        None => {
            warn!("Analysis did not match the expected grammar; rendering raw text");
            render_degraded(&mut page, &output.subject, &generated, &output.analysis);
        }
    }

    build_pdf(page.finish())
}

// ── Structured path ───────────────────────────────────────────────────────

fn render_structured(page: &mut Composer, subject: &str, generated: &str, parsed: &ParsedAnalysis) {
    render_title_block(page, subject, generated, Some(&parsed.summary.grade));

    // Executive summary
    page.section_header("Executive Summary");
    page.paragraph(REGULAR, 11.0, BODY, MARGIN, CONTENT_WIDTH, &executive_summary(parsed));
    page.spacer(18.0);

    // Compliance score
    page.section_header("Compliance Score");
    let s = &parsed.summary;
    page.paragraph(
        BOLD,
        12.0,
        BODY,
        MARGIN,
        CONTENT_WIDTH,
        &format!(
            "{} out of {} items compliant ({}%)",
            s.compliant,
            s.total,
            s.rate_percent()
        ),
    );
    page.spacer(8.0);
    page.field_row("Compliant Items", &s.compliant.to_string(), BODY);
    page.field_row("Partially Compliant", &s.partial.to_string(), BODY);
    page.field_row("Non-Compliant Items", &s.noncompliant.to_string(), BODY);
    page.field_row("Total Items Reviewed", &s.total.to_string(), BODY);
    page.spacer(18.0);

    // Critical issues
    if parsed.critical_issues.is_empty() {
        page.section_header("No Critical Issues");
        page.paragraph(
            REGULAR,
            10.0,
            BODY,
            MARGIN,
            CONTENT_WIDTH,
            "No high-risk compliance issues were identified. However, please review the \
             detailed analysis for any medium-risk items that may require attention.",
        );
    } else {
        page.section_header("Critical Issues Requiring Immediate Attention");
        page.paragraph(
            REGULAR,
            10.0,
            BODY,
            MARGIN,
            CONTENT_WIDTH,
            &format!(
                "The following {} high-risk items require immediate remediation to avoid \
                 potential legal liability:",
                parsed.critical_issues.len()
            ),
        );
        page.spacer(6.0);
        for (idx, issue) in parsed.critical_issues.iter().enumerate() {
            page.paragraph(
                BOLD,
                11.0,
                RISK_HIGH,
                MARGIN + 14.0,
                CONTENT_WIDTH - 14.0,
                &format!("{}. {}", idx + 1, issue.title),
            );
            page.paragraph(
                REGULAR,
                10.0,
                BODY,
                MARGIN + 14.0,
                CONTENT_WIDTH - 14.0,
                &issue.description,
            );
            page.spacer(10.0);
        }
    }

    // Detailed analysis — one block per finding.
    page.page_break();
    page.section_header("Detailed Compliance Analysis");
    page.spacer(6.0);

    for finding in &parsed.findings {
        // Keep at least the header and the info rows together.
        page.ensure_room(110.0);

        page.paragraph(
            BOLD,
            12.0,
            (0.1, 0.1, 0.1),
            MARGIN,
            CONTENT_WIDTH,
            &format!("{}. {}", finding.number, finding.title),
        );
        page.spacer(4.0);

        let risk_color = match finding.risk_tier() {
            RiskTier::High => RISK_HIGH,
            RiskTier::Medium => RISK_MEDIUM,
            RiskTier::Low => RISK_LOW,
        };

        page.field_row("Legal Citation", &finding.citation, BODY);
        page.field_row("Status", &finding.status, BODY);
        page.field_row("Found on Pages", &finding.pages, BODY);
        page.field_row("Risk Level", &finding.risk, risk_color);
        page.spacer(4.0);
        page.field_row("Assessment", &finding.assessment, BODY);
        page.field_row("Recommendation", &finding.recommendation, BODY);
        page.spacer(16.0);
    }

    render_disclaimer(page);
}

/// Executive-summary paragraph, worded by compliance-rate thresholds.
pub fn executive_summary(parsed: &ParsedAnalysis) -> String {
    let s = &parsed.summary;
    let overall = overall_wording(s);

    let mut text = format!(
        "This handbook was analyzed against {} California employment law requirements. \
         The handbook demonstrates {} compliance with an overall grade of {}. ",
        s.total, overall, s.grade
    );

    if s.compliant > 0 {
        text.push_str(&format!("{} items are fully compliant. ", s.compliant));
    }
    if s.partial > 0 {
        text.push_str(&format!(
            "{} items are partially compliant and may need updates. ",
            s.partial
        ));
    }
    if s.noncompliant > 0 {
        text.push_str(&format!(
            "{} items are non-compliant and require immediate attention to avoid legal exposure. ",
            s.noncompliant
        ));
    }

    if !parsed.critical_issues.is_empty() {
        text.push_str(&format!(
            "There are {} critical issues that pose high legal risk and should be addressed \
             as a priority. These issues are detailed in the Critical Issues section below.",
            parsed.critical_issues.len()
        ));
    }

    text
}

/// Threshold wording: ≥90 excellent, ≥75 good, ≥60 fair, else needs work.
fn overall_wording(summary: &ComplianceSummary) -> &'static str {
    match summary.rate_percent() {
        r if r >= 90 => "excellent",
        r if r >= 75 => "good",
        r if r >= 60 => "fair",
        _ => "needs significant improvement",
    }
}

// ── Degraded path ─────────────────────────────────────────────────────────

fn render_degraded(page: &mut Composer, subject: &str, generated: &str, raw: &str) {
    render_title_block(page, subject, generated, None);

    page.section_header("Compliance Analysis");
    page.paragraph(
        ITALIC,
        9.0,
        BODY,
        MARGIN,
        CONTENT_WIDTH,
        "The analysis below could not be parsed into the standard report structure \
         and is reproduced as received.",
    );
    page.spacer(10.0);

    for block in raw.split("\n\n") {
        let cleaned = strip_markup(block);
        if cleaned.trim().is_empty() {
            continue;
        }
        page.paragraph(REGULAR, 10.0, BODY, MARGIN, CONTENT_WIDTH, &cleaned);
        page.spacer(6.0);
    }

    render_disclaimer(page);
}

/// Strip the markdown the model tends to emit so raw text reads as prose.
pub fn strip_markup(text: &str) -> String {
    text.lines()
        .map(|line| {
            let line = line.trim_start_matches('#').trim_start();
            line.replace("**", "").replace('`', "")
        })
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

// ── Shared sections ───────────────────────────────────────────────────────

fn render_title_block(page: &mut Composer, subject: &str, generated: &str, grade: Option<&str>) {
    page.spacer(28.0);
    page.centered_line(BOLD, 22.0, (0.1, 0.1, 0.1), "California Employee Handbook");
    page.centered_line(BOLD, 22.0, (0.1, 0.1, 0.1), "Compliance Analysis Report");
    page.spacer(28.0);

    page.field_row("Handbook Analyzed", subject, BODY);
    page.field_row("Analysis Date", generated, BODY);
    page.field_row("Generated By", "handbook-audit", BODY);
    if let Some(grade) = grade {
        page.field_row("Compliance Grade", grade, BODY);
    }
    page.spacer(20.0);
}

fn render_disclaimer(page: &mut Composer) {
    page.spacer(20.0);
    page.paragraph(
        ITALIC,
        9.0,
        (0.35, 0.35, 0.35),
        MARGIN,
        CONTENT_WIDTH,
        "This analysis is provided for informational purposes only and does not constitute \
         legal advice. Please consult with a qualified employment law attorney for specific \
         legal guidance.",
    );
}

// ── Composer: cursor-based page layout ────────────────────────────────────

/// Accumulates content-stream operations page by page, wrapping text and
/// breaking pages as the cursor reaches the bottom margin.
struct Composer {
    finished: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    y: f32,
}

impl Composer {
    fn new() -> Self {
        Composer {
            finished: Vec::new(),
            ops: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn page_break(&mut self) {
        let ops = std::mem::take(&mut self.ops);
        self.finished.push(ops);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// Break the page now unless `needed` points of height remain.
    fn ensure_room(&mut self, needed: f32) {
        if self.y - needed < MARGIN && !self.ops.is_empty() {
            self.page_break();
        }
    }

    fn spacer(&mut self, height: f32) {
        self.y -= height;
    }

    fn section_header(&mut self, title: &str) {
        self.ensure_room(60.0);
        self.spacer(10.0);
        self.text_line(BOLD, 16.0, HEADER_BLUE, MARGIN, title);
        self.spacer(6.0);
    }

    /// Emit one line of text at `x`, advancing the cursor.
    fn text_line(&mut self, font: &str, size: f32, color: (f32, f32, f32), x: f32, text: &str) {
        self.y -= size * LEADING;
        if self.y < MARGIN {
            self.page_break();
            self.y -= size * LEADING;
        }
        self.emit_at(font, size, color, x, self.y, text);
    }

    fn centered_line(&mut self, font: &str, size: f32, color: (f32, f32, f32), text: &str) {
        let x = MARGIN + (CONTENT_WIDTH - text_width(text, size)).max(0.0) / 2.0;
        self.text_line(font, size, color, x, text);
    }

    /// Emit a wrapped paragraph starting at `x`, `width` points wide.
    fn paragraph(
        &mut self,
        font: &str,
        size: f32,
        color: (f32, f32, f32),
        x: f32,
        width: f32,
        text: &str,
    ) {
        for line in wrap(text, size, width) {
            self.text_line(font, size, color, x, &line);
        }
    }

    /// A bold label in the left column with a wrapped value beside it.
    fn field_row(&mut self, label: &str, value: &str, value_color: (f32, f32, f32)) {
        let size = 10.0;
        let value_x = MARGIN + LABEL_WIDTH;
        let value_width = CONTENT_WIDTH - LABEL_WIDTH;
        let lines = wrap(value, size, value_width);

        self.text_line(BOLD, size, (0.33, 0.33, 0.33), MARGIN, &format!("{label}:"));
        // First value line shares the label's baseline.
        let mut first = true;
        for line in lines {
            if first {
                self.emit_at(REGULAR, size, value_color, value_x, self.y, &line);
                first = false;
            } else {
                self.text_line(REGULAR, size, value_color, value_x, &line);
            }
        }
    }

    fn emit_at(&mut self, font: &str, size: f32, color: (f32, f32, f32), x: f32, y: f32, text: &str) {
        if text.is_empty() {
            return;
        }
        self.ops.push(Operation::new("BT", vec![]));
        self.ops
            .push(Operation::new("Tf", vec![font.into(), size.into()]));
        self.ops.push(Operation::new(
            "rg",
            vec![color.0.into(), color.1.into(), color.2.into()],
        ));
        self.ops
            .push(Operation::new("Td", vec![x.into(), y.into()]));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(to_latin1(text))],
        ));
        self.ops.push(Operation::new("ET", vec![]));
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.ops.is_empty() || self.finished.is_empty() {
            let ops = std::mem::take(&mut self.ops);
            self.finished.push(ops);
        }
        self.finished
    }
}

// ── Text measurement & encoding ───────────────────────────────────────────

/// Approximate Helvetica advance width for one character, in em units.
///
/// Good enough for wrapping: layout precision is not contractual, and
/// over-estimating slightly only wraps a word early.
fn char_width(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | '!' | '|' | '.' | ',' | ';' | ':' | '\'' => 0.28,
        'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '-' => 0.36,
        'm' | 'M' | 'W' | 'w' => 0.85,
        ' ' => 0.28,
        c if c.is_ascii_uppercase() => 0.70,
        _ => 0.52,
    }
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().map(char_width).sum::<f32>() * size
}

/// Greedy word wrap to `width` points; words longer than a line are split.
fn wrap(text: &str, size: f32, width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        if text_width(&candidate, size) <= width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        // Hard-split a word that alone exceeds the line.
        let mut piece = String::new();
        for c in word.chars() {
            piece.push(c);
            if text_width(&piece, size) > width {
                piece.pop();
                if !piece.is_empty() {
                    lines.push(std::mem::take(&mut piece));
                }
                piece.push(c);
            }
        }
        current = piece;
    }

    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Encode for a WinAnsi/Latin-1 text-showing operand. Characters outside
/// Latin-1 become '?', so arbitrary model output can never fail the render.
fn to_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code <= 0xFF {
                code as u8
            } else {
                b'?'
            }
        })
        .collect()
}

// ── Document assembly ─────────────────────────────────────────────────────

/// Assemble finished content pages into a PDF document.
fn build_pdf(pages: Vec<Vec<Operation>>) -> Result<Vec<u8>, AuditError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let italic_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Oblique",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR => regular_id,
            BOLD => bold_id,
            ITALIC => italic_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for ops in pages {
        let content = Content { operations: ops };
        let encoded = content
            .encode()
            .map_err(|e| AuditError::Internal(format!("content encoding failed: {e}")))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| AuditError::Internal(format!("PDF serialisation failed: {e}")))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{AuditStats, ComplianceFinding, CriticalIssue};

    fn finding(n: u32, status: &str, assessment: &str, risk: &str) -> ComplianceFinding {
        ComplianceFinding {
            number: n,
            title: format!("Policy {n}"),
            code: "Labor Code §1".into(),
            status: status.into(),
            pages: "Page 3".into(),
            assessment: assessment.into(),
            risk: risk.into(),
            recommendation: "Review with counsel.".into(),
            citation: "Labor Code §1".into(),
        }
    }

    fn parsed_fixture() -> ParsedAnalysis {
        let findings = vec![
            finding(1, "Present", "Compliant. Clear language.", "Low"),
            finding(2, "Missing", "No policy found.", "High"),
            finding(3, "Present", "Partially compliant; gaps.", "Medium"),
        ];
        let summary = ComplianceSummary::from_findings(&findings, Some('C'));
        ParsedAnalysis {
            findings,
            summary,
            critical_issues: vec![CriticalIssue {
                title: "Missing policy".into(),
                description: "Policy 2 is absent entirely.".into(),
            }],
        }
    }

    fn output_with(parsed: Option<ParsedAnalysis>, analysis: &str) -> AuditOutput {
        AuditOutput {
            subject: "acme-handbook".into(),
            analysis: analysis.into(),
            parsed,
            stats: AuditStats::default(),
        }
    }

    #[test]
    fn structured_report_is_a_loadable_pdf() {
        let out = output_with(Some(parsed_fixture()), "raw");
        let bytes = render_report(&out).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        let doc = Document::load_mem(&bytes).expect("rendered report must re-load");
        assert!(doc.get_pages().len() >= 2, "detail section starts on a new page");
    }

    #[test]
    fn degraded_report_never_fails_on_arbitrary_text() {
        let weird = "no structure at all\n\n((parens)) and \\backslashes\\ and \
                     unicode: 日本語 → ok\n\n### half a heading";
        let out = output_with(None, weird);
        let bytes = render_report(&out).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        Document::load_mem(&bytes).expect("degraded report must re-load");
    }

    #[test]
    fn degraded_report_handles_empty_text() {
        let out = output_with(None, "");
        let bytes = render_report(&out).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn executive_summary_thresholds() {
        let mk = |compliant: usize, total: usize| {
            let mut findings = Vec::new();
            for i in 0..total {
                if i < compliant {
                    findings.push(finding(i as u32, "Present", "Compliant.", "Low"));
                } else {
                    findings.push(finding(i as u32, "Missing", "Absent.", "High"));
                }
            }
            ParsedAnalysis {
                summary: ComplianceSummary::from_findings(&findings, None),
                findings,
                critical_issues: vec![],
            }
        };

        assert!(executive_summary(&mk(19, 20)).contains("excellent"));
        assert!(executive_summary(&mk(16, 20)).contains("good"));
        assert!(executive_summary(&mk(13, 20)).contains("fair"));
        assert!(executive_summary(&mk(5, 20)).contains("needs significant improvement"));
    }

    #[test]
    fn executive_summary_mentions_critical_issues() {
        let parsed = parsed_fixture();
        let text = executive_summary(&parsed);
        assert!(text.contains("1 critical issues"));
        assert!(text.contains("grade of C"));
    }

    #[test]
    fn strip_markup_removes_bold_and_headings() {
        assert_eq!(strip_markup("### 1. **Title** here"), "1. Title here");
        assert_eq!(strip_markup("plain `code` text"), "plain code text");
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap(
            "The quick brown fox jumps over the lazy dog repeatedly and often",
            10.0,
            120.0,
        );
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, 10.0) <= 120.0 + 0.01, "too wide: {line:?}");
        }
    }

    #[test]
    fn wrap_splits_oversized_words() {
        let lines = wrap("Supercalifragilisticexpialidocious", 12.0, 60.0);
        assert!(lines.len() > 1);
    }

    #[test]
    fn to_latin1_replaces_out_of_range() {
        assert_eq!(to_latin1("a§b"), vec![b'a', 0xA7, b'b']);
        assert_eq!(to_latin1("日"), vec![b'?']);
    }

    #[test]
    fn rendering_is_deterministic_apart_from_timestamp() {
        // Same parsed input renders identical page content; only the
        // metadata date can differ across days, not within a run.
        let out = output_with(Some(parsed_fixture()), "raw");
        let a = render_report(&out).unwrap();
        let b = render_report(&out).unwrap();
        assert_eq!(a, b);
    }
}
