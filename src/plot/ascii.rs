//! ASCII/Unicode rendering of chart specs for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid, fixed-width bars), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - bars / pie shares: `█` runs scaled to the widest value
//! - scatter: one symbol per group (`o`, `x`, `+`, ...) with a legend
//! - heatmap: the matrix values, `--` for undefined cells

use std::collections::HashMap;

use crate::domain::{BarGroup, ChartData, ChartKind, ChartSpec, ScatterPoint};

const BAR: char = '█';
const GROUP_SYMBOLS: [char; 8] = ['o', 'x', '+', '*', '#', '@', '%', '&'];
const LABEL_WIDTH: usize = 18;

/// Render any chart spec as text.
pub fn render_chart(spec: &ChartSpec, width: usize, height: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("== {} ==\n", spec.heading));
    if spec.title != spec.heading {
        out.push_str(&format!("{}\n", spec.title));
    }

    let body = match (&spec.kind, &spec.data) {
        (ChartKind::Pie, ChartData::Categories { values }) => render_shares(values, width),
        (_, ChartData::Categories { values }) => render_bars(values, width, &spec.y_label),
        (_, ChartData::Grouped { groups }) => render_grouped(groups, width, &spec.y_label),
        (_, ChartData::Points { points }) => {
            render_scatter(points, width, height, &spec.x_label, &spec.y_label)
        }
        (_, ChartData::Matrix { labels, values }) => render_matrix(labels, values),
    };
    out.push_str(&body);
    out
}

fn render_bars(values: &[(String, f64)], width: usize, y_label: &str) -> String {
    if values.is_empty() {
        return "(no data)\n".to_string();
    }
    let max = values.iter().map(|(_, v)| *v).fold(0.0, f64::max);
    let bar_width = width.saturating_sub(LABEL_WIDTH + 12).max(10);

    let mut out = String::new();
    if !y_label.is_empty() {
        out.push_str(&format!("{:<w$} {y_label}\n", "", w = LABEL_WIDTH));
    }
    for (label, v) in values {
        out.push_str(&bar_line(label, *v, max, bar_width, &fmt_value(*v)));
    }
    out
}

fn render_grouped(groups: &[BarGroup], width: usize, y_label: &str) -> String {
    if groups.is_empty() {
        return "(no data)\n".to_string();
    }
    let max = groups
        .iter()
        .flat_map(|g| g.bars.iter().map(|(_, v)| *v))
        .fold(0.0, f64::max);
    let bar_width = width.saturating_sub(LABEL_WIDTH + 12).max(10);

    let mut out = String::new();
    if !y_label.is_empty() {
        out.push_str(&format!("{:<w$} {y_label}\n", "", w = LABEL_WIDTH));
    }
    for group in groups {
        out.push_str(&format!("{}\n", group.category));
        for (series, v) in &group.bars {
            out.push_str(&bar_line(&format!("  {series}"), *v, max, bar_width, &fmt_value(*v)));
        }
    }
    out
}

fn render_shares(values: &[(String, f64)], width: usize) -> String {
    let total: f64 = values.iter().map(|(_, v)| *v).sum();
    if values.is_empty() || total <= 0.0 {
        return "(no data)\n".to_string();
    }
    let bar_width = width.saturating_sub(LABEL_WIDTH + 12).max(10);

    let mut out = String::new();
    for (label, v) in values {
        let pct = 100.0 * v / total;
        out.push_str(&bar_line(label, pct, 100.0, bar_width, &format!("{pct:.1}%")));
    }
    out
}

fn bar_line(label: &str, value: f64, max: f64, bar_width: usize, shown: &str) -> String {
    let len = if max > 0.0 && value > 0.0 {
        ((value / max) * bar_width as f64).round() as usize
    } else {
        0
    };
    let bar: String = std::iter::repeat_n(BAR, len).collect();
    format!("{:<w$} {bar} {shown}\n", truncate(label, LABEL_WIDTH), w = LABEL_WIDTH)
}

fn render_scatter(points: &[ScatterPoint], width: usize, height: usize, x_label: &str, y_label: &str) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (Some((x_min, x_max)), Some((y_min, y_max))) = (
        range(points.iter().map(|p| p.x)),
        range(points.iter().map(|p| p.y)),
    ) else {
        return "(no data)\n".to_string();
    };
    let (x_min, x_max) = pad_range(x_min, x_max, 0.02);
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    // Symbols are assigned in first-seen group order.
    let mut symbols: HashMap<&str, char> = HashMap::new();
    let mut legend: Vec<(&str, char)> = Vec::new();
    let mut grid = vec![vec![' '; width]; height];

    for p in points {
        let ch = match p.group.as_deref() {
            Some(g) => *symbols.entry(g).or_insert_with(|| {
                let ch = GROUP_SYMBOLS[legend.len() % GROUP_SYMBOLS.len()];
                legend.push((g, ch));
                ch
            }),
            None => '.',
        };
        let x = map_x(p.x, x_min, x_max, width);
        let y = map_y(p.y, y_min, y_max, height);
        grid[y][x] = ch;
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {x_label}=[{x_min:.1}, {x_max:.1}] | {y_label}=[{y_min:.2}, {y_max:.2}] | n={}\n",
        points.len()
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    if !legend.is_empty() {
        let parts: Vec<String> = legend.iter().map(|(g, ch)| format!("{ch} {g}")).collect();
        out.push_str(&format!("Legend: {}\n", parts.join("  ")));
    }
    out
}

fn render_matrix(labels: &[String], values: &[Vec<Option<f64>>]) -> String {
    const CELL: usize = 7;
    let short: Vec<String> = labels.iter().map(|l| truncate(l, CELL - 1)).collect();

    let mut out = String::new();
    out.push_str(&format!("{:<w$}", "", w = LABEL_WIDTH + 1));
    for s in &short {
        out.push_str(&format!("{s:>CELL$}"));
    }
    out.push('\n');

    for (label, row) in labels.iter().zip(values) {
        out.push_str(&format!("{:<w$} ", truncate(label, LABEL_WIDTH), w = LABEL_WIDTH));
        for cell in row {
            let txt = cell.map(|v| format!("{v:.2}")).unwrap_or_else(|| "--".to_string());
            out.push_str(&format!("{txt:>CELL$}"));
        }
        out.push('\n');
    }
    out
}

fn fmt_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(0.5);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
