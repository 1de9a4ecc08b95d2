//! Terminal rendering for digest runs and inspection

use console::style;

use crate::digest::DistributionReport;

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn header(&self, title: &str) {
        println!("\n{}", style(title).bold().underlined());
    }

    pub fn section(&self, title: &str) {
        println!("\n{}", style(title).bold());
        println!("{}", style("─".repeat(40)).dim());
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn note(&self, message: &str) {
        println!("  {}", style(message).dim());
    }

    pub fn posted(&self, label: &str, channel: &str) {
        println!("{} {} → {}", style("✓").green(), label, style(channel).cyan());
    }

    pub fn filtered(&self, label: &str) {
        println!("{} {}", style("-").dim(), style(format!("{} (filtered)", label)).dim());
    }

    pub fn skipped(&self, label: &str, reason: &str) {
        println!("{} {}: {}", style("⚠").yellow(), label, reason);
    }

    /// Failures go to stderr so `-f json` on stdout stays parseable
    pub fn failed(&self, label: &str, reason: &str) {
        eprintln!("{} {}: {}", style("✗").red(), label, reason);
    }

    pub fn report(&self, report: &DistributionReport) {
        self.header(&format!("Digest: {}", report.page));

        for posted in &report.posted {
            self.posted(&posted.label, &posted.channel);
        }
        for label in &report.filtered {
            self.filtered(label);
        }
        for issue in &report.skipped {
            self.skipped(&issue.label, &issue.reason);
        }
        for issue in &report.failed {
            self.failed(&issue.label, &issue.reason);
        }

        let counts = format!(
            "{} segments: {} posted, {} filtered, {} skipped, {} failed",
            report.total(),
            report.posted.len(),
            report.filtered.len(),
            report.skipped.len(),
            report.failed.len()
        );
        if report.has_failures() {
            println!("\n{}", style(counts).red());
        } else {
            println!("\n{}", style(counts).green());
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
