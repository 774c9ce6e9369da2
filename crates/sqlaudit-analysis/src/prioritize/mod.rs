//! Prioritizer: render, bucket, order, and total up surviving findings.

use sqlaudit_core::events::{EventDispatcher, FindingWithheldEvent};
use sqlaudit_core::RenderError;

use crate::report::{Caveat, CaveatKind, IndexScorecard, Recommendation};
use crate::scoring::{Category, Finding, FindingKind, Severity};

/// Action verbs each category's recommendations may open with.
pub static CATEGORY_VERBS: &[(Category, &[&str])] = &[
    (Category::UnusedIndex, &["Drop", "Disable"]),
    (Category::MissingIndex, &["Create"]),
    (Category::RedundantIndex, &["Drop", "Consolidate"]),
    (Category::QueryHotspot, &["Tune", "Rewrite", "Review"]),
    (
        Category::WaitBottleneck,
        &["Add", "Move", "Review", "Tune", "Reduce", "Investigate"],
    ),
    (Category::DesignSmell, &["Add", "Split", "Replace", "Review"]),
    (Category::FragmentedIndex, &["Rebuild", "Reorganize"]),
    (Category::StaleStatistics, &["Update"]),
];

pub fn verbs_for(category: Category) -> &'static [&'static str] {
    CATEGORY_VERBS
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, verbs)| *verbs)
        .unwrap_or(&[])
}

/// Render a finding as one sentence: `"<Action>, otherwise <risk>."`.
pub fn render_sentence(finding: &Finding) -> Result<String, RenderError> {
    let subject = || finding.subject.clone();
    let action = finding.action.trim();
    let risk = finding.risk.trim();

    let first_word = action.split_whitespace().next().unwrap_or_default();
    if !verbs_for(finding.category()).contains(&first_word) {
        return Err(RenderError::MissingActionVerb { subject: subject() });
    }
    if risk.is_empty() {
        return Err(RenderError::MissingRisk { subject: subject() });
    }
    for part in [action, risk] {
        if part.ends_with('.')
            || part.contains(". ")
            || part.contains(['!', '?', '\n', '\r'])
        {
            return Err(RenderError::NotOneSentence { subject: subject() });
        }
    }
    Ok(format!("{action}, otherwise {risk}."))
}

/// Findings split into ordered buckets, plus scorecard and caveats.
#[derive(Debug, Clone, Default)]
pub struct Prioritized {
    pub critical: Vec<Recommendation>,
    pub important: Vec<Recommendation>,
    pub advisory: Vec<Recommendation>,
    pub scorecard: IndexScorecard,
    pub caveats: Vec<Caveat>,
}

pub fn prioritize(findings: Vec<Finding>, events: &EventDispatcher) -> Prioritized {
    let mut out = Prioritized::default();

    let mut findings = findings;
    findings.sort_by(|a, b| {
        b.magnitude
            .total_cmp(&a.magnitude)
            .then_with(|| a.category().cmp(&b.category()))
            .then_with(|| a.subject.cmp(&b.subject))
    });

    for finding in findings {
        let sentence = match render_sentence(&finding) {
            Ok(sentence) => sentence,
            Err(e) => {
                tracing::warn!(subject = %finding.subject, error = %e, "recommendation withheld");
                events.emit_finding_withheld(&FindingWithheldEvent {
                    subject: finding.subject.clone(),
                    reason: e.to_string(),
                });
                out.caveats.push(Caveat::new(
                    CaveatKind::FindingWithheld,
                    format!("{} recommendation withheld: {e}", finding.category()),
                ));
                continue;
            }
        };

        tally(&mut out.scorecard, &finding.kind);
        let recommendation = Recommendation {
            category: finding.category(),
            evidence: finding.evidence(),
            subject: finding.subject,
            severity: finding.severity,
            sentence,
            reason: finding.reason,
            magnitude: finding.magnitude,
            ddl: finding.ddl,
        };
        match recommendation.severity {
            Severity::Critical => out.critical.push(recommendation),
            Severity::Important => out.important.push(recommendation),
            Severity::Advisory => out.advisory.push(recommendation),
        }
    }
    if !out.caveats.is_empty() {
        tracing::info!(findings_withheld = out.caveats.len(), "some findings were withheld");
    }
    out
}

fn tally(scorecard: &mut IndexScorecard, kind: &FindingKind) {
    match kind {
        FindingKind::UnusedIndex { writes, .. } | FindingKind::RedundantIndex { writes, .. } => {
            scorecard.drop.count += 1;
            scorecard.drop.estimated_impact += *writes as f64;
        }
        FindingKind::MissingIndex { score, .. } => {
            scorecard.create.count += 1;
            scorecard.create.estimated_impact += *score;
        }
        FindingKind::FragmentedIndex { page_count, .. } => {
            scorecard.rebuild.count += 1;
            scorecard.rebuild.estimated_impact += *page_count as f64;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::QueryStatId;

    fn hotspot(action: &str, risk: &str) -> Finding {
        Finding {
            kind: FindingKind::QueryHotspot {
                query: QueryStatId(0),
                total_cpu_ms: 10.0,
            },
            subject: "query q1".into(),
            severity: Severity::Important,
            reason: String::new(),
            action: action.into(),
            risk: risk.into(),
            magnitude: 10.0,
            ddl: None,
        }
    }

    #[test]
    fn renders_action_then_risk() {
        let sentence = render_sentence(&hotspot("Tune query q1", "it keeps burning CPU")).unwrap();
        assert_eq!(sentence, "Tune query q1, otherwise it keeps burning CPU.");
    }

    #[test]
    fn rejects_verbs_from_other_categories() {
        let err = render_sentence(&hotspot("Drop query q1", "it keeps burning CPU")).unwrap_err();
        assert!(matches!(err, RenderError::MissingActionVerb { .. }));
    }

    #[test]
    fn rejects_missing_risk() {
        let err = render_sentence(&hotspot("Tune query q1", "  ")).unwrap_err();
        assert!(matches!(err, RenderError::MissingRisk { .. }));
    }

    #[test]
    fn rejects_multiple_sentences() {
        let err = render_sentence(&hotspot("Tune query q1. Then rest", "it burns")).unwrap_err();
        assert!(matches!(err, RenderError::NotOneSentence { .. }));
    }

    #[test]
    fn every_category_has_verbs() {
        for (category, verbs) in CATEGORY_VERBS {
            assert!(!verbs.is_empty(), "{category} has no verbs");
        }
        assert_eq!(CATEGORY_VERBS.len(), 8);
    }

    #[test]
    fn withheld_findings_become_caveats() {
        let out = prioritize(vec![hotspot("Drop it", "cost")], &EventDispatcher::new());
        assert_eq!(out.critical.len() + out.important.len() + out.advisory.len(), 0);
        assert_eq!(out.caveats.len(), 1);
        assert_eq!(out.caveats[0].kind, CaveatKind::FindingWithheld);
    }
}
