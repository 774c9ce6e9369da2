//! Markdown reporter.

use super::{format_bytes, Reporter};
use crate::report::{AuditReport, Recommendation};

pub struct MarkdownReporter;

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

fn section(output: &mut String, title: &str, items: &[Recommendation]) {
    output.push_str(&format!("## {title} ({})\n\n", items.len()));
    if items.is_empty() {
        output.push_str("_None._\n\n");
        return;
    }
    for rec in items {
        output.push_str(&format!(
            "- **{}** `{}`: {}\n  - Evidence: {}\n",
            rec.category,
            rec.subject,
            rec.sentence,
            rec.reason
        ));
        if let Some(ref ddl) = rec.ddl {
            output.push_str(&format!("  - DDL: `{ddl}`\n"));
        }
    }
    output.push('\n');
}

impl Reporter for MarkdownReporter {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn generate(&self, report: &AuditReport) -> Result<String, String> {
        let header = &report.header;
        let mut output = String::from("# sqlaudit report\n\n");
        output.push_str(&format!("- Source: {}\n", header.source));
        output.push_str(&format!("- Scanned at (unix): {}\n", header.scanned_at));
        output.push_str(&format!(
            "- Tables: {} ({})\n",
            header.table_count,
            format_bytes(header.total_size_bytes)
        ));
        output.push_str(&format!("- Engine: sqlaudit {}\n\n", header.engine_version));

        output.push_str("| Phase | Status |\n|---|---|\n");
        for phase in &header.phases {
            output.push_str(&format!(
                "| {} | {} |\n",
                phase.phase,
                escape_cell(&phase.status.to_string())
            ));
        }
        output.push('\n');

        section(&mut output, "Critical", &report.critical);
        section(&mut output, "Important", &report.important);
        section(&mut output, "Advisory", &report.advisory);

        let card = &report.scorecard;
        output.push_str("## Index scorecard\n\n| Action | Count | Estimated impact |\n|---|---|---|\n");
        output.push_str(&format!(
            "| Drop | {} | {:.0} writes avoided |\n",
            card.drop.count, card.drop.estimated_impact
        ));
        output.push_str(&format!(
            "| Create | {} | {:.0} impact score |\n",
            card.create.count, card.create.estimated_impact
        ));
        output.push_str(&format!(
            "| Rebuild | {} | {:.0} pages |\n\n",
            card.rebuild.count, card.rebuild.estimated_impact
        ));

        if !report.caveats.is_empty() {
            output.push_str("## Caveats\n\n");
            for caveat in &report.caveats {
                output.push_str(&format!("- {}\n", caveat.message));
            }
        }
        Ok(output)
    }
}
