//! The fixed California employment-law checklist.
//!
//! Twenty core requirements an employee handbook must address, each with its
//! statutory citation and the sub-points the model is asked to verify. The
//! list is compiled in and never mutated; changing it changes both the prompt
//! grammar's item count and the number of findings the parser can recover,
//! so the two stay in lockstep by construction.

use serde::Serialize;

/// One checklist requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChecklistItem {
    /// 1-based ordinal, stable across runs.
    pub number: u8,
    /// Short policy title, e.g. "At-Will Employment Disclaimer".
    pub title: &'static str,
    /// Statutory citation, e.g. "Labor Code §2922".
    pub citation: &'static str,
    /// Sub-points the policy must cover to be compliant.
    pub points: &'static [&'static str],
}

/// The full 20-item checklist, in report order.
pub const CHECKLIST: [ChecklistItem; 20] = [
    ChecklistItem {
        number: 1,
        title: "At-Will Employment Disclaimer",
        citation: "Labor Code §2922",
        points: &[
            "Clear statement that employment is at-will",
            "Can be terminated by either party at any time",
            "Only authorized person can modify in writing",
        ],
    },
    ChecklistItem {
        number: 2,
        title: "Equal Employment Opportunity Policy",
        citation: "Gov. Code §12940",
        points: &[
            "Prohibits discrimination based on all protected classes",
            "Includes: race, color, religion, sex, gender identity, sexual orientation, \
             age, disability, medical condition, genetic information, marital status, \
             military status, reproductive health decisions",
        ],
    },
    ChecklistItem {
        number: 3,
        title: "Anti-Harassment Policy",
        citation: "Gov. Code §12940",
        points: &[
            "Definitions of harassment (sexual and all protected classes)",
            "Examples of prohibited conduct",
            "Clear statement it will not be tolerated",
        ],
    },
    ChecklistItem {
        number: 4,
        title: "Harassment Complaint Procedure",
        citation: "Gov. Code §12950",
        points: &[
            "Multiple reporting channels",
            "Investigation process",
            "Confidentiality provisions",
            "Anti-retaliation statement",
        ],
    },
    ChecklistItem {
        number: 5,
        title: "Meal Break Policy",
        citation: "Labor Code §512",
        points: &[
            "30-minute unpaid meal break before end of 5th hour",
            "Second meal break before end of 10th hour",
            "Waiver provisions",
            "Premium pay for violations",
        ],
    },
    ChecklistItem {
        number: 6,
        title: "Rest Break Policy",
        citation: "Labor Code §226.7",
        points: &[
            "10-minute paid rest break per 4 hours worked",
            "Timing requirements",
            "Premium pay for violations",
        ],
    },
    ChecklistItem {
        number: 7,
        title: "Overtime Policy",
        citation: "Labor Code §510",
        points: &[
            "Time-and-a-half after 8 hours/day or 40 hours/week",
            "Double-time after 12 hours/day",
            "7th day overtime rules",
        ],
    },
    ChecklistItem {
        number: 8,
        title: "Paid Sick Leave",
        citation: "Labor Code §246",
        points: &[
            "Accrual requirements (1 hour per 30 hours worked)",
            "Usage rights (employee, family member, designated person)",
            "Covered reasons including safe time",
        ],
    },
    ChecklistItem {
        number: 9,
        title: "California Family Rights Act (CFRA)",
        citation: "Gov. Code §12945.2",
        points: &[
            "12 weeks protected leave for eligible employees",
            "Covered reasons: bonding, serious health condition, military exigency",
            "Job restoration rights",
        ],
    },
    ChecklistItem {
        number: 10,
        title: "Pregnancy Disability Leave (PDL)",
        citation: "Gov. Code §12945",
        points: &[
            "Up to 4 months leave for pregnancy-related disability",
            "Reasonable accommodation requirements",
            "No minimum service requirement",
        ],
    },
    ChecklistItem {
        number: 11,
        title: "Wage Statement Requirements",
        citation: "Labor Code §226",
        points: &[
            "Required information on pay stubs",
            "Sick leave balance disclosure",
            "Employee access to records",
        ],
    },
    ChecklistItem {
        number: 12,
        title: "Personnel Records Access",
        citation: "Labor Code §1198.5",
        points: &[
            "Employee right to inspect personnel files",
            "Timing requirements (within 30 days)",
            "Representative designation rights",
        ],
    },
    ChecklistItem {
        number: 13,
        title: "Expense Reimbursement",
        citation: "Labor Code §2802",
        points: &[
            "Reimbursement for necessary business expenses",
            "Covers mileage, cell phone, tools, supplies",
        ],
    },
    ChecklistItem {
        number: 14,
        title: "PAGA Notice",
        citation: "Labor Code §2699",
        points: &[
            "Notice of Private Attorneys General Act rights",
            "Employee right to file representative claims",
        ],
    },
    ChecklistItem {
        number: 15,
        title: "Lactation Accommodation",
        citation: "Labor Code §1031",
        points: &[
            "Break time for expressing milk",
            "Private space requirements",
            "Anti-retaliation protections",
        ],
    },
    ChecklistItem {
        number: 16,
        title: "Whistleblower Protection",
        citation: "Labor Code §1102.5",
        points: &[
            "Protection for reporting legal violations",
            "Covers internal and external reporting",
            "Anti-retaliation provisions",
        ],
    },
    ChecklistItem {
        number: 17,
        title: "Anti-Retaliation Policy",
        citation: "Labor Code §98.6",
        points: &[
            "Prohibition on retaliation for exercising rights",
            "Covers wage complaints, leave requests, complaints",
        ],
    },
    ChecklistItem {
        number: 18,
        title: "AI/Automated Decision Systems Policy",
        citation: "SB 1001 - effective 2026",
        points: &[
            "Disclosure of AI use in employment decisions",
            "Transparency requirements",
            "Employee rights regarding automated systems",
        ],
    },
    ChecklistItem {
        number: 19,
        title: "Emergency Contact Designation",
        citation: "SB 294 - effective 2026",
        points: &[
            "Allow employees to designate emergency contacts",
            "Notification procedures during emergencies",
            "Confidentiality protections",
        ],
    },
    ChecklistItem {
        number: 20,
        title: "Workers' Rights Notice",
        citation: "SB 294 - effective 2026",
        points: &[
            "Comprehensive notice of employee rights",
            "Wage/hour protections",
            "Safety and anti-discrimination rights",
        ],
    },
];

/// Render the checklist as the block of text embedded in the analysis prompt.
pub fn render_for_prompt() -> String {
    let mut out = String::with_capacity(4096);
    out.push_str("# CALIFORNIA EMPLOYMENT LAW COMPLIANCE CHECKLIST (20 Core Items)\n");
    for item in &CHECKLIST {
        out.push('\n');
        out.push_str(&format!(
            "{}. **{}** ({})\n",
            item.number, item.title, item.citation
        ));
        for point in item.points {
            out.push_str(&format!("   - {point}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_items_in_order() {
        assert_eq!(CHECKLIST.len(), 20);
        for (i, item) in CHECKLIST.iter().enumerate() {
            assert_eq!(item.number as usize, i + 1, "ordinals must be 1..=20");
            assert!(!item.title.is_empty());
            assert!(!item.citation.is_empty());
            assert!(!item.points.is_empty(), "item {} has no sub-points", item.number);
        }
    }

    #[test]
    fn rendered_checklist_lists_every_item() {
        let text = render_for_prompt();
        for item in &CHECKLIST {
            assert!(text.contains(item.title), "missing title: {}", item.title);
            assert!(
                text.contains(item.citation),
                "missing citation: {}",
                item.citation
            );
        }
        assert!(text.contains("20. **Workers' Rights Notice**"));
    }
}
