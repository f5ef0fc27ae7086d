//! Output formatting for review reports (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::pagination::WalkEnd;
use crate::pipeline::ReviewReport;
use crate::sentiment::SentimentResult;
use serde::Serialize;

/// Report plus the human-readable verdict line.
#[derive(Serialize)]
struct JsonReport<'a> {
    verdict: String,
    #[serde(flatten)]
    report: &'a ReviewReport,
}

impl<'a> JsonReport<'a> {
    fn new(report: &'a ReviewReport) -> Self {
        Self { verdict: report.decision.to_string(), report }
    }
}

/// Formats review reports for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a single report, including every classified fragment.
    pub fn format_report(&self, report: &ReviewReport) -> String {
        match self.format {
            OutputFormat::Json => self.json_single(report),
            OutputFormat::Table => self.table_single(report),
            OutputFormat::Markdown => self.markdown_single(report),
            OutputFormat::Csv => self.csv_fragments(report),
        }
    }

    /// Formats a one-line-per-product summary of several reports.
    pub fn format_reports(&self, reports: &[ReviewReport]) -> String {
        if reports.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => self.csv_summary_header(),
                _ => "No products analyzed.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => self.json_reports(reports),
            OutputFormat::Table => self.table_reports(reports),
            OutputFormat::Markdown => self.markdown_reports(reports),
            OutputFormat::Csv => self.csv_summary(reports),
        }
    }

    // JSON formatting

    fn json_single(&self, report: &ReviewReport) -> String {
        serde_json::to_string_pretty(&JsonReport::new(report)).unwrap_or_else(|_| "{}".to_string())
    }

    fn json_reports(&self, reports: &[ReviewReport]) -> String {
        let reports: Vec<_> = reports.iter().map(JsonReport::new).collect();
        serde_json::to_string_pretty(&reports).unwrap_or_else(|_| "[]".to_string())
    }

    // Table formatting

    fn table_single(&self, report: &ReviewReport) -> String {
        let diagnostics = &report.diagnostics;
        let tally = report.tally();
        let mut lines = Vec::new();

        lines.push(format!("Product: {}", report.product.name.as_deref().unwrap_or("N/A")));
        lines.push(format!("Price:   {}", report.product.price.as_deref().unwrap_or("N/A")));
        lines.push(format!("URL:     {}", diagnostics.target));
        lines.push(format!("Site:    {}", diagnostics.site));
        lines.push(format!(
            "Pages:   {}{}",
            diagnostics.pages_visited,
            match diagnostics.walk_end {
                Some(end) => format!(" ({})", walk_end_name(end)),
                None => String::new(),
            }
        ));
        lines.push(format!(
            "Found:   {} reviews, {} titles",
            report.reviews.len(),
            report.titles.len()
        ));
        lines.push(format!(
            "Mood:    {} positive, {} negative, {} neutral",
            tally.positive, tally.negative, tally.neutral
        ));
        lines.push(format!("Status:  {}", diagnostics.code));
        lines.push(format!("Verdict: {}", report.decision));

        if report.results.is_empty() {
            return lines.join("\n");
        }

        let label_width = 8;
        let score_width = 6;
        let origin_width = 14;
        let text_width = 60;

        lines.push(String::new());
        lines.push(format!(
            "{:<label_width$}  {:>score_width$}  {:<origin_width$}  {}",
            "Label", "Score", "Origin", "Text"
        ));
        lines.push(format!(
            "{:-<label_width$}  {:-<score_width$}  {:-<origin_width$}  {:-<text_width$}",
            "", "", "", ""
        ));

        for result in &report.results {
            lines.push(format!(
                "{:<label_width$}  {:>score_width$.2}  {:<origin_width$}  {}",
                result.label.to_string(),
                result.score,
                result.fragment.origin.to_string(),
                truncate(&result.fragment.text, text_width)
            ));
        }

        lines.join("\n")
    }

    fn table_reports(&self, reports: &[ReviewReport]) -> String {
        let verdict_width = 12;
        let count_width = 5;
        let site_width = 8;
        let product_width = 50;

        let mut lines = Vec::new();

        lines.push(format!(
            "{:<verdict_width$}  {:>count_width$}  {:>count_width$}  {:>count_width$}  {:<site_width$}  {}",
            "Verdict", "Pos", "Neg", "Neu", "Site", "Product"
        ));
        lines.push(format!(
            "{:-<verdict_width$}  {:-<count_width$}  {:-<count_width$}  {:-<count_width$}  {:-<site_width$}  {:-<product_width$}",
            "", "", "", "", "", ""
        ));

        for report in reports {
            let tally = report.tally();
            lines.push(format!(
                "{:<verdict_width$}  {:>count_width$}  {:>count_width$}  {:>count_width$}  {:<site_width$}  {}",
                report.decision.label().as_str(),
                tally.positive,
                tally.negative,
                tally.neutral,
                report.diagnostics.site.to_string(),
                truncate(product_label(report), product_width)
            ));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} products", reports.len()));

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_single(&self, report: &ReviewReport) -> String {
        let diagnostics = &report.diagnostics;
        let tally = report.tally();
        let mut lines = Vec::new();

        lines.push(format!("## {}", product_label(report)));
        lines.push(String::new());

        lines.push(format!("- **Verdict:** {}", report.decision));
        lines.push(format!("- **URL:** [View on {}]({})", diagnostics.site, diagnostics.target));

        if let Some(price) = &report.product.price {
            lines.push(format!("- **Price:** {}", price));
        }

        lines.push(format!(
            "- **Sentiment:** {} positive, {} negative, {} neutral",
            tally.positive, tally.negative, tally.neutral
        ));
        lines.push(format!(
            "- **Pages:** {} ({} reviews, {} titles)",
            diagnostics.pages_visited,
            report.reviews.len(),
            report.titles.len()
        ));
        lines.push(format!("- **Status:** `{}`", diagnostics.code));

        if !report.results.is_empty() {
            lines.push(String::new());
            lines.push("| Label | Score | Text |".to_string());
            lines.push("|-------|-------|------|".to_string());

            for result in &report.results {
                lines.push(format!(
                    "| {} | {:.2} | {} |",
                    result.label,
                    result.score,
                    markdown_cell(&result.fragment.text)
                ));
            }
        }

        lines.join("\n")
    }

    fn markdown_reports(&self, reports: &[ReviewReport]) -> String {
        let mut lines = Vec::new();

        lines.push("| Verdict | Positive | Negative | Neutral | Product |".to_string());
        lines.push("|---------|----------|----------|---------|---------|".to_string());

        for report in reports {
            let tally = report.tally();
            lines.push(format!(
                "| {} | {} | {} | {} | [{}]({}) |",
                report.decision.label().as_str(),
                tally.positive,
                tally.negative,
                tally.neutral,
                markdown_cell(&truncate(product_label(report), 40)),
                report.diagnostics.target
            ));
        }

        lines.push(String::new());
        lines.push(format!("*{} products analyzed*", reports.len()));

        lines.join("\n")
    }

    // CSV formatting

    fn csv_fragment_header(&self) -> String {
        "site,target,origin,label,score,text".to_string()
    }

    fn csv_fragments(&self, report: &ReviewReport) -> String {
        let mut lines = Vec::new();
        lines.push(self.csv_fragment_header());

        for result in &report.results {
            lines.push(self.csv_fragment_row(report, result));
        }

        lines.join("\n")
    }

    fn csv_fragment_row(&self, report: &ReviewReport, result: &SentimentResult) -> String {
        format!(
            "{},{},{},{},{:.4},{}",
            report.diagnostics.site,
            Self::csv_escape(&report.diagnostics.target),
            result.fragment.origin,
            result.label,
            result.score,
            Self::csv_escape(&result.fragment.text)
        )
    }

    fn csv_summary_header(&self) -> String {
        "site,target,product,price,decision,positive,negative,neutral,total,status,verdict"
            .to_string()
    }

    fn csv_summary(&self, reports: &[ReviewReport]) -> String {
        let mut lines = Vec::new();
        lines.push(self.csv_summary_header());

        for report in reports {
            let tally = report.tally();
            let name = report.product.name.as_deref().map(Self::csv_escape).unwrap_or_default();
            let price = report.product.price.as_deref().map(Self::csv_escape).unwrap_or_default();

            lines.push(format!(
                "{},{},{},{},{},{},{},{},{},{},{}",
                report.diagnostics.site,
                Self::csv_escape(&report.diagnostics.target),
                name,
                price,
                report.decision.label().as_str(),
                tally.positive,
                tally.negative,
                tally.neutral,
                tally.total,
                report.diagnostics.code,
                Self::csv_escape(&report.decision.to_string())
            ));
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

fn product_label(report: &ReviewReport) -> &str {
    report.product.name.as_deref().unwrap_or(&report.diagnostics.target)
}

fn walk_end_name(end: WalkEnd) -> &'static str {
    match end {
        WalkEnd::Exhausted => "no more pages",
        WalkEnd::Capped => "page cap reached",
    }
}

/// Shortens `s` to at most `max` characters, ending with "..." when cut.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

fn markdown_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}
