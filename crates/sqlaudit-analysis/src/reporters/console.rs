//! Console reporter: human-readable output with color codes.

use super::{format_bytes, Reporter};
use crate::report::{AuditReport, Recommendation, ScorecardLine};
use crate::scoring::Severity;

/// Console reporter for terminal output.
pub struct ConsoleReporter {
    pub use_color: bool,
}

impl ConsoleReporter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn color_start(&self, severity: Severity) -> &'static str {
        if !self.use_color {
            return "";
        }
        match severity {
            Severity::Critical => "\x1b[31m",  // red
            Severity::Important => "\x1b[33m", // yellow
            Severity::Advisory => "\x1b[36m",  // cyan
        }
    }

    fn color_end(&self) -> &'static str {
        if self.use_color {
            "\x1b[0m"
        } else {
            ""
        }
    }

    fn bucket(&self, output: &mut String, severity: Severity, items: &[Recommendation]) {
        let cs = self.color_start(severity);
        let ce = self.color_end();
        let title = match severity {
            Severity::Critical => "CRITICAL",
            Severity::Important => "IMPORTANT",
            Severity::Advisory => "ADVISORY",
        };
        output.push_str(&format!("{cs}{title}{ce} ({})\n", items.len()));
        if items.is_empty() {
            output.push_str("  none\n\n");
            return;
        }
        for (i, rec) in items.iter().enumerate() {
            output.push_str(&format!(
                "  {}. [{}] {}\n     {}\n     evidence: {}\n",
                i + 1,
                rec.category,
                rec.subject,
                rec.sentence,
                rec.reason
            ));
            if let Some(ref ddl) = rec.ddl {
                output.push_str(&format!("     ddl: {ddl}\n"));
            }
        }
        output.push('\n');
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new(true)
    }
}

fn scorecard_line(label: &str, line: &ScorecardLine, unit: &str) -> String {
    format!(
        "  {label:<18} {:>5}   est. impact {:.0} {unit}\n",
        line.count, line.estimated_impact
    )
}

impl Reporter for ConsoleReporter {
    fn name(&self) -> &'static str {
        "console"
    }

    fn generate(&self, report: &AuditReport) -> Result<String, String> {
        let mut output = String::new();
        let header = &report.header;

        output.push_str("╔══════════════════════════════════════════╗\n");
        output.push_str("║          sqlaudit Database Report        ║\n");
        output.push_str("╚══════════════════════════════════════════╝\n\n");

        output.push_str(&format!("Source:   {}\n", header.source));
        output.push_str(&format!("Scanned:  {} (unix)\n", header.scanned_at));
        output.push_str(&format!(
            "Tables:   {} ({})\n",
            header.table_count,
            format_bytes(header.total_size_bytes)
        ));
        output.push_str(&format!("Engine:   sqlaudit {}\n\n", header.engine_version));

        output.push_str("Phases:\n");
        for phase in &header.phases {
            output.push_str(&format!("  {:<14} {}\n", phase.phase.as_str(), phase.status));
        }
        output.push('\n');

        self.bucket(&mut output, Severity::Critical, &report.critical);
        self.bucket(&mut output, Severity::Important, &report.important);
        self.bucket(&mut output, Severity::Advisory, &report.advisory);

        output.push_str("Index scorecard:\n");
        let card = &report.scorecard;
        output.push_str(&scorecard_line("drop", &card.drop, "writes avoided"));
        output.push_str(&scorecard_line("create", &card.create, "impact score"));
        output.push_str(&scorecard_line("rebuild", &card.rebuild, "pages"));
        output.push('\n');

        if !report.caveats.is_empty() {
            output.push_str("Caveats:\n");
            for caveat in &report.caveats {
                output.push_str(&format!("  ⚠ {}\n", caveat.message));
            }
            output.push('\n');
        }

        output.push_str(&format!(
            "─── Summary: {} critical, {} important, {} advisory ───\n",
            report.critical.len(),
            report.important.len(),
            report.advisory.len()
        ));
        Ok(output)
    }
}
