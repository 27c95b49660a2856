//! Reporting utilities: formatted terminal output and the markdown report.
//!
//! We keep formatting code in one place so:
//! - the aggregation code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::domain::{ChartData, ChartSpec, Kpis};
use crate::error::AppError;
use crate::io::ingest::IngestedData;
use crate::views::ChartSlot;

/// Dataset summary printed before any view.
pub fn format_load_summary(path: &Path, ingest: &IngestedData) -> String {
    let mut out = String::new();

    out.push_str("=== hotels - Hotel Bookings Dashboard ===\n");
    out.push_str(&format!("File: {}\n", path.display()));
    out.push_str(&format!(
        "Rows: read={} | used={} | skipped={}\n",
        ingest.rows_read,
        ingest.rows_used,
        ingest.row_errors.len()
    ));
    if !ingest.missing_fields.is_empty() {
        let names: Vec<&str> = ingest.missing_fields.iter().map(|f| f.name()).collect();
        out.push_str(&format!("Missing columns: {}\n", names.join(", ")));
    }
    for err in ingest.row_errors.iter().take(5) {
        out.push_str(&format!("  line {}: {}\n", err.line, err.message));
    }
    if ingest.row_errors.len() > 5 {
        out.push_str(&format!("  ... {} more\n", ingest.row_errors.len() - 5));
    }

    out
}

/// The three headline KPIs as aligned `label: value` lines.
pub fn format_kpis(kpis: &Kpis) -> String {
    format!(
        "{:<18} {}\n{:<18} {}\n{:<18} {}\n",
        "Total Bookings",
        kpis.total_bookings_label(),
        "Average Lead Time",
        kpis.avg_lead_time_label(),
        "Cancellation Rate",
        kpis.cancellation_rate_label(),
    )
}

/// [`format_kpis`], or a one-line reason when the KPIs could not be computed.
pub fn format_kpi_block<E: std::fmt::Display>(kpis: &Result<Kpis, E>) -> String {
    match kpis {
        Ok(kpis) => format_kpis(kpis),
        Err(e) => format!("KPIs unavailable: {e}\n"),
    }
}

/// Markdown report: KPIs, then one section per chart with its data as a table.
///
/// A chart that failed keeps its section, holding the reason instead of data.
pub fn format_markdown_report<E: std::fmt::Display>(
    source: &Path,
    kpis: &Result<Kpis, E>,
    charts: &[ChartSlot],
) -> String {
    let mut out = String::new();
    out.push_str("# Hotel bookings report\n");
    out.push_str(&format!("- generated: {}\n", Local::now().to_rfc3339()));
    out.push_str(&format!("- source: {}\n", source.display()));

    out.push_str("\n## KPIs\n");
    match kpis {
        Ok(kpis) => {
            out.push_str("| metric | value |\n| - | - |\n");
            out.push_str(&format!("| Total Bookings | {} |\n", kpis.total_bookings_label()));
            out.push_str(&format!("| Average Lead Time | {} |\n", kpis.avg_lead_time_label()));
            out.push_str(&format!("| Cancellation Rate | {} |\n", kpis.cancellation_rate_label()));
        }
        Err(e) => out.push_str(&format!("> unavailable: {e}\n")),
    }

    for slot in charts {
        out.push_str(&format!("\n## {}\n", slot.heading));
        match &slot.chart {
            Ok(chart) => {
                out.push_str(&format!("_{}_ ({:?})\n\n", chart.title, chart.kind));
                out.push_str(&chart_table(chart));
            }
            Err(e) => out.push_str(&format!("> unavailable: {e}\n")),
        }
    }
    out
}

/// Write [`format_markdown_report`] to `path`.
pub fn write_markdown_report<E: std::fmt::Display>(
    path: &Path,
    source: &Path,
    kpis: &Result<Kpis, E>,
    charts: &[ChartSlot],
) -> Result<PathBuf, AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create report '{}': {e}", path.display())))?;
    file.write_all(format_markdown_report(source, kpis, charts).as_bytes())
        .map_err(|e| AppError::new(2, format!("Failed to write report: {e}")))?;
    tracing::info!(path = %path.display(), charts = charts.len(), "wrote markdown report");
    Ok(path.to_path_buf())
}

fn chart_table(chart: &ChartSpec) -> String {
    let mut out = String::new();
    match &chart.data {
        ChartData::Categories { values } => {
            out.push_str(&format!("| {} | {} |\n| - | - |\n", chart.x_label, chart.y_label));
            for (label, v) in values {
                out.push_str(&format!("| {label} | {v:.2} |\n"));
            }
        }
        ChartData::Grouped { groups } => {
            out.push_str(&format!("| {} | series | {} |\n| - | - | - |\n", chart.x_label, chart.y_label));
            for g in groups {
                for (series, v) in &g.bars {
                    out.push_str(&format!("| {} | {series} | {v:.0} |\n", g.category));
                }
            }
        }
        ChartData::Points { points } => {
            out.push_str(&format!(
                "- points: {} ({} vs {})\n",
                points.len(),
                chart.x_label,
                chart.y_label
            ));
        }
        ChartData::Matrix { labels, values } => {
            out.push_str(&format!("| | {} |\n", labels.join(" | ")));
            out.push_str(&format!("| - |{}\n", " - |".repeat(labels.len())));
            for (label, row) in labels.iter().zip(values) {
                let cells: Vec<String> = row.iter().map(|c| fmt_opt(*c)).collect();
                out.push_str(&format!("| {label} | {} |\n", cells.join(" | ")));
            }
        }
    }
    out
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.2}"),
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookingRecord, BookingTable, Field, GroupBy, Insight};
    use crate::error::MetricsError;
    use crate::io::ingest::RowError;
    use crate::views;

    #[test]
    fn kpi_block_is_aligned() {
        let kpis = Kpis {
            total_bookings: 3,
            avg_lead_time: Some(10.0),
            cancellation_rate: Some(66.67),
        };
        assert_eq!(
            format_kpis(&kpis),
            "Total Bookings     3\nAverage Lead Time  10.0 days\nCancellation Rate  66.67%\n"
        );
    }

    #[test]
    fn load_summary_lists_problems() {
        let ingest = IngestedData {
            table: BookingTable::default(),
            row_errors: vec![RowError {
                line: 4,
                message: "Invalid `adr` value 'x'.".to_string(),
            }],
            rows_read: 3,
            rows_used: 2,
            missing_fields: vec![Field::Babies],
        };
        let txt = format_load_summary(Path::new("hotels.csv"), &ingest);
        assert!(txt.contains("Rows: read=3 | used=2 | skipped=1"));
        assert!(txt.contains("Missing columns: babies"));
        assert!(txt.contains("line 4: Invalid `adr` value 'x'."));
    }

    #[test]
    fn markdown_report_has_a_section_per_chart() {
        let table = BookingTable::from_records(&[
            BookingRecord::default(),
            BookingRecord {
                hotel: "Resort Hotel".to_string(),
                lead_time: 40.0,
                is_canceled: true,
                ..BookingRecord::default()
            },
        ]);
        let kpis = views::compute_kpis(&table);
        let mut charts = views::overview_charts(&table, Some(GroupBy::Hotel));
        for insight in Insight::ALL {
            charts.push(views::insight_slot(&table, insight));
        }

        let md = format_markdown_report(Path::new("hotels.csv"), &kpis, &charts);
        assert!(md.starts_with("# Hotel bookings report\n"));
        assert!(md.contains("| Cancellation Rate | 50.00% |"));
        assert_eq!(md.matches("\n## ").count(), 1 + charts.len());
        assert!(md.contains("## Correlation Heatmap"));
        assert!(md.contains("| Resort Hotel | 100.00 |"));
    }

    #[test]
    fn markdown_report_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        let kpis = Kpis {
            total_bookings: 0,
            avg_lead_time: None,
            cancellation_rate: None,
        };
        let kpis: Result<Kpis, MetricsError> = Ok(kpis);
        let written = write_markdown_report(&path, Path::new("empty.csv"), &kpis, &[]).unwrap();
        let body = std::fs::read_to_string(written).unwrap();
        assert!(body.contains("| Average Lead Time | n/a |"));
    }

    #[test]
    fn failed_chart_keeps_its_section() {
        let kpis: Result<Kpis, MetricsError> = Err(MetricsError::MissingColumn(Field::LeadTime));
        let charts = vec![
            ChartSlot::new("Average ADR by Hotel Type", Err(MetricsError::MissingColumn(Field::Adr))),
            views::insight_slot(&BookingTable::from_records(&[BookingRecord::default()]), Insight::Adr),
        ];

        let md = format_markdown_report(Path::new("hotels.csv"), &kpis, &charts);
        assert!(md.contains("## KPIs\n> unavailable: Missing column `lead_time`"));
        assert!(md.contains("## Average ADR by Hotel Type\n> unavailable: Missing column `adr`"));
        assert!(md.contains(&format!("## {}\n_ADR (Average Daily Rate) per Hotel_", Insight::Adr.heading())));
    }

    #[test]
    fn kpi_block_reports_why_it_is_missing() {
        let kpis: Result<Kpis, MetricsError> = Err(MetricsError::MissingColumn(Field::IsCanceled));
        assert_eq!(
            format_kpi_block(&kpis),
            "KPIs unavailable: Missing column `is_canceled` in the bookings table.\n"
        );
    }
}
