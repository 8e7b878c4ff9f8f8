use std::fmt::Write;

use super::report::{ComplianceReport, MAX_SCORE};
use super::types::Analysis;

pub const HL7_REPORT_HEADING: &str = "## HL7v2 Analysis Result";

pub const HIPAA_REPORT_HEADING: &str = "## HIPAA Compliance Report";

/// Narrative body, verbatim, under the fixed heading.
pub fn render_narrative(markdown: &str) -> String {
    format!("{HL7_REPORT_HEADING}\n\n{markdown}\n")
}

/// Overall score, summary, recommendations, then the per-category breakdown.
pub fn render_compliance(report: &ComplianceReport) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "{HIPAA_REPORT_HEADING}\n");
    let _ = writeln!(
        out,
        "**Overall Compliance Score:** {}/{MAX_SCORE}\n",
        report.overall_compliance_score
    );

    let _ = writeln!(out, "### Summary\n");
    let _ = writeln!(out, "{}\n", report.summary);

    let _ = writeln!(out, "### Recommendations\n");
    if report.recommendations.is_empty() {
        let _ = writeln!(out, "_No recommendations provided._\n");
    } else {
        for (i, recommendation) in report.recommendations.iter().enumerate() {
            let _ = writeln!(out, "{}. {recommendation}", i + 1);
        }
        out.push('\n');
    }

    let _ = writeln!(out, "### Detailed Scores\n");
    for (category, score) in report.detailed_scores.iter() {
        let _ = writeln!(
            out,
            "- **{}:** {}/{MAX_SCORE} - {}",
            category.label(),
            score.score,
            score.justification
        );
    }

    out
}

pub fn render_analysis(analysis: &Analysis) -> String {
    match analysis {
        Analysis::Narrative(markdown) => render_narrative(markdown),
        Analysis::Compliance(report) => render_compliance(report),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::report::{CategoryScore, DetailedScores, ScoreCategory};

    fn report(recommendations: Vec<&str>) -> ComplianceReport {
        let score = |n: u8, why: &str| CategoryScore {
            score: n,
            justification: why.to_string(),
        };
        ComplianceReport {
            overall_compliance_score: 7,
            detailed_scores: DetailedScores {
                privacy_rule_compliance: score(8, "Notice present"),
                security_rule_compliance: score(6, "Partial safeguards"),
                breach_notification_rule: score(5, "No timeline"),
                employee_training: score(7, "Annual"),
                data_access_encryption: score(9, "Encrypted"),
                third_party_agreements: score(4, "BAAs missing"),
            },
            summary: "ok".into(),
            recommendations: recommendations.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn narrative_rendered_verbatim_under_heading() {
        let body = "## MSH\n- Sending Application: A";
        let rendered = render_narrative(body);
        assert!(rendered.starts_with(HL7_REPORT_HEADING));
        assert!(rendered.contains(body));
    }

    #[test]
    fn compliance_sections_in_fixed_order() {
        let rendered = render_compliance(&report(vec!["do X", "do Y"]));
        let score = rendered.find("**Overall Compliance Score:** 7/10").unwrap();
        let summary = rendered.find("### Summary").unwrap();
        let recs = rendered.find("### Recommendations").unwrap();
        let detailed = rendered.find("### Detailed Scores").unwrap();
        assert!(score < summary && summary < recs && recs < detailed);
        assert!(rendered.contains("1. do X\n2. do Y\n"));
    }

    #[test]
    fn every_category_is_rendered() {
        let rendered = render_compliance(&report(vec!["do X"]));
        for category in ScoreCategory::ALL {
            assert!(rendered.contains(category.label()), "missing {}", category.label());
        }
        assert!(rendered.contains("**Third-Party Agreements:** 4/10 - BAAs missing"));
    }

    #[test]
    fn empty_recommendations_are_explicit() {
        let rendered = render_compliance(&report(vec![]));
        assert!(rendered.contains("_No recommendations provided._"));
    }

    #[test]
    fn rendering_does_not_mutate_report() {
        let original = report(vec!["do X"]);
        let copy = original.clone();
        let _ = render_analysis(&Analysis::Compliance(original.clone()));
        assert_eq!(original, copy);
    }
}
