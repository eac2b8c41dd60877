//! Plain-text and CSV rendering of coefficient results.
//!
//! # Invariants
//! - Formatting never changes the numbers it is given.
//! - The stated threshold comparison matches `nakamoto_coefficient` (`>=`).

use crate::aggregate::sort_rows;
use crate::config::DEFAULT_REPORT_TOP_N;
use crate::model::share::{total_share, CoefficientResult, ShareRow};
use crate::pipeline::DomainSummary;
use std::io::Write;

const MAX_ENTITY_WIDTH: usize = 30;
const BAR_WIDTH: usize = 40;
const ELLIPSIS: &str = "...";

/// Everything a formatter needs for one domain.
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub title: &'a str,
    pub entity_column: &'a str,
    pub rows: &'a [ShareRow],
    pub coefficient: &'a CoefficientResult,
}

/// Renders one domain report. `None` means nothing should be written.
pub trait ReportFormatter {
    fn format(&self, input: &ReportInput<'_>) -> Option<String>;
}

/// Fixed-width table with a share bar per entity.
#[derive(Debug, Clone, Copy)]
pub struct TextReportFormatter {
    top_n: usize,
}

impl TextReportFormatter {
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }
}

impl Default for TextReportFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_REPORT_TOP_N)
    }
}

impl ReportFormatter for TextReportFormatter {
    fn format(&self, input: &ReportInput<'_>) -> Option<String> {
        let mut ranked = input.rows.to_vec();
        sort_rows(&mut ranked);
        let shown = &ranked[..ranked.len().min(self.top_n)];

        let width = shown
            .iter()
            .map(|row| row.entity.chars().count())
            .max()
            .unwrap_or(0)
            .min(MAX_ENTITY_WIDTH)
            .max(input.entity_column.chars().count());

        let mut lines = vec![
            input.title.to_string(),
            "=".repeat(input.title.chars().count()),
            String::new(),
            format!("Total entities: {}", input.rows.len()),
            format!("Total share: {:.2}", total_share(input.rows)),
            String::new(),
            "Top entities by share:".to_string(),
            String::new(),
            format!(
                "{:<4} | {:<width$} | {:>6} | {:>10} | Bar",
                "Rank", input.entity_column, "Share", "Cumulative"
            ),
            "-".repeat(4 + 3 + width + 3 + 6 + 3 + 10 + 3 + BAR_WIDTH),
        ];

        let mut cumulative = 0.0;
        for (index, row) in shown.iter().enumerate() {
            cumulative += row.share;
            lines.push(format!(
                "{:<4} | {:<width$} | {:>6.2} | {:>10.2} | {}",
                index + 1,
                truncate(&row.entity, width),
                row.share,
                cumulative,
                bar(row.share)
            ));
        }

        let result = input.coefficient;
        lines.push(String::new());
        lines.push(format!("Nakamoto Coefficient: {}", result.coefficient));
        lines.push(format!(
            "(Minimum entities needed to reach {:.0}% share: {})",
            result.threshold * 100.0,
            result.coefficient
        ));
        if !result.threshold_reached {
            lines.push(format!(
                "(Threshold not reached: all {} entities hold {:.2})",
                result.coefficient, result.cumulative_share
            ));
        }

        let mut text = lines.join("\n");
        text.push('\n');
        Some(text)
    }
}

/// Formatter for dry runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentFormatter;

impl ReportFormatter for SilentFormatter {
    fn format(&self, _input: &ReportInput<'_>) -> Option<String> {
        None
    }
}

/// Writes the `Domain,Nakamoto_Coefficient` table, one row per recorded domain.
pub fn write_summary_csv<W: Write>(summary: &DomainSummary, writer: W) -> Result<(), csv::Error> {
    let mut table = csv::Writer::from_writer(writer);
    table.write_record(["Domain", "Nakamoto_Coefficient"])?;
    for (domain, result) in summary.iter() {
        let coefficient = result.coefficient.to_string();
        table.write_record([domain.as_str(), coefficient.as_str()])?;
    }
    table.flush()?;
    Ok(())
}

/// Short console listing of every recorded domain.
pub fn render_summary_text(summary: &DomainSummary) -> String {
    let mut text = String::from("Nakamoto Coefficients:\n");
    for (domain, result) in summary.iter() {
        text.push_str(&format!("  {}: {}\n", domain.title(), result.coefficient));
    }
    text
}

fn truncate(entity: &str, width: usize) -> String {
    if entity.chars().count() <= width {
        return entity.to_string();
    }
    let keep = width.saturating_sub(ELLIPSIS.len());
    let mut out: String = entity.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

fn bar(share: f64) -> String {
    let filled = (share.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(filled)
}
