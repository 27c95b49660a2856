//! Read/write chart spec JSON files.
//!
//! A chart JSON is the "portable" form of one view: chart kind, labels, and
//! the aggregated data. It can be re-plotted later with `hotels plot` or
//! handed to an external renderer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::domain::ChartSpec;
use crate::error::AppError;

/// On-disk wrapper around a chart spec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartFile {
    pub tool: String,
    pub source: String,
    pub generated: String,
    pub chart: ChartSpec,
}

/// Write a chart spec as pretty JSON.
pub fn write_chart_json(path: &Path, spec: &ChartSpec, source: &Path) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create chart JSON '{}': {e}", path.display())))?;

    let chart = ChartFile {
        tool: "hotels".to_string(),
        source: source.display().to_string(),
        generated: Local::now().to_rfc3339(),
        chart: spec.clone(),
    };

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &chart)
        .map_err(|e| AppError::new(2, format!("Failed to write chart JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write chart JSON: {e}")))?;

    tracing::info!(path = %path.display(), "exported chart");
    Ok(())
}

/// Read a chart JSON file.
pub fn read_chart_json(path: &Path) -> Result<ChartFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open chart JSON '{}': {e}", path.display())))?;
    let chart: ChartFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid chart JSON: {e}")))?;
    Ok(chart)
}

/// Timestamped export path inside `dir`, e.g. `hotels_adr_by_hotel_20261019_101500.json`.
pub fn timestamped_path(dir: &Path, heading: &str) -> PathBuf {
    let ts = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("hotels_{}_{ts}.json", slug(heading)))
}

fn slug(s: &str) -> String {
    let mut out = String::new();
    for ch in s.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
    }
    out.trim_end_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChartData, ChartKind, ScatterPoint};

    #[test]
    fn chart_json_survives_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.json");
        let spec = ChartSpec {
            kind: ChartKind::Heatmap,
            heading: "Correlation Heatmap".to_string(),
            title: "Correlation Heatmap".to_string(),
            x_label: String::new(),
            y_label: String::new(),
            data: ChartData::Matrix {
                labels: vec!["adr".to_string(), "babies".to_string()],
                values: vec![vec![Some(1.0), None], vec![None, None]],
            },
        };

        write_chart_json(&path, &spec, Path::new("hotels.csv")).unwrap();
        let back = read_chart_json(&path).unwrap();
        assert_eq!(back.tool, "hotels");
        assert_eq!(back.source, "hotels.csv");
        assert_eq!(back.chart, spec);
    }

    #[test]
    fn scatter_export_keeps_marker_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scatter.json");
        let spec = ChartSpec {
            kind: ChartKind::Scatter,
            heading: "Lead Time vs Average Daily Rate (ADR)".to_string(),
            title: String::new(),
            x_label: "lead_time".to_string(),
            y_label: "adr".to_string(),
            data: ChartData::Points {
                points: vec![ScatterPoint {
                    x: 12.0,
                    y: 95.5,
                    size: 95.5,
                    group: Some("City Hotel".to_string()),
                }],
            },
        };

        write_chart_json(&path, &spec, Path::new("hotels.csv")).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["chart"]["data"]["points"][0]["size"], 95.5);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn buffered_write_failure_is_reported() {
        let spec = ChartSpec {
            kind: ChartKind::Bar,
            heading: "Average ADR by Hotel Type".to_string(),
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            data: ChartData::Categories {
                values: vec![("City Hotel".to_string(), 100.0)],
            },
        };
        let err = write_chart_json(Path::new("/dev/full"), &spec, Path::new("hotels.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().starts_with("Failed to write chart JSON"));
    }

    #[test]
    fn invalid_json_is_exit_code_2() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(read_chart_json(&path).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn slug_collapses_punctuation() {
        assert_eq!(slug("ADR (Average Daily Rate) per Hotel"), "adr_average_daily_rate_per_hotel");
        assert_eq!(slug("Top 5 Room Types Reserved"), "top_5_room_types_reserved");
    }
}
