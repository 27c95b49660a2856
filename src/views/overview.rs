//! The overview panel: scatter, average ADR, customer mix, correlations.

use crate::domain::{
    BookingTable, ChartData, ChartKind, ChartSpec, Field, GroupBy, ScatterPoint, CORRELATION_FIELDS,
};
use crate::error::MetricsError;
use crate::metrics;

use super::ChartSlot;

pub const SCATTER_HEADING: &str = "Lead Time vs Average Daily Rate (ADR)";
pub const HOTEL_ADR_HEADING: &str = "Average ADR by Hotel Type";
pub const CUSTOMER_SHARE_HEADING: &str = "Customer Type Distribution";
pub const HEATMAP_HEADING: &str = "Correlation Heatmap";

/// All four overview charts in display order.
///
/// Each slot succeeds or fails on its own, so a missing column only costs the
/// charts that read it.
pub fn overview_charts(table: &BookingTable, group_by: Option<GroupBy>) -> Vec<ChartSlot> {
    vec![
        ChartSlot::new(SCATTER_HEADING, lead_time_vs_adr(table, group_by)),
        ChartSlot::new(HOTEL_ADR_HEADING, adr_by_hotel_type(table)),
        ChartSlot::new(CUSTOMER_SHARE_HEADING, customer_type_share(table)),
        ChartSlot::new(HEATMAP_HEADING, correlation_heatmap(table)),
    ]
}

/// Lead time against ADR, one point per booking, coloured by `group_by`.
pub fn lead_time_vs_adr(table: &BookingTable, group_by: Option<GroupBy>) -> Result<ChartSpec, MetricsError> {
    let lead = table.numeric(Field::LeadTime)?;
    let adr = table.numeric(Field::Adr)?;
    let groups = group_by.map(|g| table.categorical(g.field())).transpose()?;

    let points = lead
        .iter()
        .zip(adr)
        .enumerate()
        .filter(|(_, (x, y))| x.is_finite() && y.is_finite())
        .map(|(i, (x, y))| ScatterPoint {
            x: *x,
            y: *y,
            size: *y,
            group: groups.and_then(|g| g[i].clone()),
        })
        .collect();

    Ok(ChartSpec {
        kind: ChartKind::Scatter,
        heading: SCATTER_HEADING.to_string(),
        title: "ADR by Lead Time Grouped by Selected Category".to_string(),
        x_label: Field::LeadTime.name().to_string(),
        y_label: Field::Adr.name().to_string(),
        data: ChartData::Points { points },
    })
}

pub fn adr_by_hotel_type(table: &BookingTable) -> Result<ChartSpec, MetricsError> {
    Ok(ChartSpec {
        kind: ChartKind::Bar,
        heading: HOTEL_ADR_HEADING.to_string(),
        title: "Average ADR".to_string(),
        x_label: Field::Hotel.name().to_string(),
        y_label: Field::Adr.name().to_string(),
        data: ChartData::Categories {
            values: metrics::mean_by(table, Field::Hotel, Field::Adr)?,
        },
    })
}

pub fn customer_type_share(table: &BookingTable) -> Result<ChartSpec, MetricsError> {
    let counts = metrics::value_counts(table, Field::CustomerType)?;
    Ok(ChartSpec {
        kind: ChartKind::Pie,
        heading: CUSTOMER_SHARE_HEADING.to_string(),
        title: "Customer Type Distribution".to_string(),
        x_label: "Customer Type".to_string(),
        y_label: "Count".to_string(),
        data: ChartData::Categories {
            values: super::counts_as_values(counts),
        },
    })
}

pub fn correlation_heatmap(table: &BookingTable) -> Result<ChartSpec, MetricsError> {
    let corr = metrics::correlation_matrix(table, &CORRELATION_FIELDS)?;
    Ok(ChartSpec {
        kind: ChartKind::Heatmap,
        heading: HEATMAP_HEADING.to_string(),
        title: "Correlation Heatmap".to_string(),
        x_label: String::new(),
        y_label: String::new(),
        data: ChartData::Matrix {
            labels: corr.labels(),
            values: corr.to_rows(),
        },
    })
}
