//! View selection: maps a user choice to chart specifications.
//!
//! Each function recomputes from the immutable table; nothing is cached between
//! selections. Presentation sinks (text plots, TUI, exports) consume the
//! returned [`ChartSpec`]s and never touch the table themselves.

use crate::domain::{BarGroup, BookingTable, ChartData, ChartKind, ChartSpec, Field, Insight, Kpis};
use crate::error::MetricsError;
use crate::metrics;

pub mod overview;

pub use overview::*;

/// One chart position in a view: the chart, or why it could not be built.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSlot {
    pub heading: String,
    pub chart: Result<ChartSpec, MetricsError>,
}

impl ChartSlot {
    pub fn new(heading: &str, chart: Result<ChartSpec, MetricsError>) -> Self {
        if let Err(e) = &chart {
            tracing::warn!(chart = heading, "chart unavailable: {e}");
        }
        Self {
            heading: heading.to_string(),
            chart,
        }
    }
}

/// How many countries the distribution view shows.
pub const TOP_COUNTRIES: usize = 10;
/// How many room types the reservation view shows.
pub const TOP_ROOM_TYPES: usize = 5;

/// Headline KPIs.
///
/// An empty table yields the undefined sentinels rather than an error; a
/// missing column is still an error.
pub fn compute_kpis(table: &BookingTable) -> Result<Kpis, MetricsError> {
    let avg_lead_time = metrics::mean(table, Field::LeadTime)?;
    let cancellation_rate = match metrics::cancellation_rate(table) {
        Ok(rate) => Some(rate),
        Err(MetricsError::EmptyTable) => None,
        Err(e) => return Err(e),
    };
    Ok(Kpis {
        total_bookings: metrics::count(table),
        avg_lead_time,
        cancellation_rate,
    })
}

/// Build the chart for one insight.
pub fn insight_chart(table: &BookingTable, insight: Insight) -> Result<ChartSpec, MetricsError> {
    let spec = match insight {
        Insight::Country => bar(
            insight,
            "Top 10 Countries by Number of Bookings",
            "Country",
            "Number of Bookings",
            counts_as_values(metrics::top_n(table, Field::Country, TOP_COUNTRIES)?),
        ),
        Insight::LeadTime => bar(
            insight,
            "Average Lead Time per Hotel",
            "Hotel",
            "Average Lead Time (days)",
            metrics::mean_by(table, Field::Hotel, Field::LeadTime)?,
        ),
        Insight::CustomerType => {
            let groups = metrics::counts_by(table, Field::CustomerType, Field::Hotel)?
                .into_iter()
                .map(|(category, counts)| BarGroup {
                    category,
                    bars: counts_as_values(counts),
                })
                .collect();
            ChartSpec {
                kind: ChartKind::GroupedBar,
                heading: insight.heading().to_string(),
                title: "Distribution of Customer Types by Hotel".to_string(),
                x_label: "Customer Type".to_string(),
                y_label: "Number of Bookings".to_string(),
                data: ChartData::Grouped { groups },
            }
        }
        Insight::Adr => bar(
            insight,
            "ADR (Average Daily Rate) per Hotel",
            "Hotel",
            "ADR (USD)",
            metrics::mean_by(table, Field::Hotel, Field::Adr)?,
        ),
        Insight::Cancellation => bar(
            insight,
            "Cancellation Rate per Hotel (%)",
            "Hotel",
            "Cancellation Rate (%)",
            metrics::mean_by(table, Field::Hotel, Field::IsCanceled)?
                .into_iter()
                .map(|(hotel, rate)| (hotel, rate * 100.0))
                .collect(),
        ),
        Insight::RoomTypes => bar(
            insight,
            "Top 5 Room Types Reserved",
            "Room Type",
            "Number of Reservations",
            counts_as_values(metrics::top_n(table, Field::ReservedRoomType, TOP_ROOM_TYPES)?),
        ),
    };
    tracing::debug!(insight = insight.number(), "built insight chart");
    Ok(spec)
}

/// [`insight_chart`] wrapped as a slot titled with the insight heading.
pub fn insight_slot(table: &BookingTable, insight: Insight) -> ChartSlot {
    ChartSlot::new(insight.heading(), insight_chart(table, insight))
}

fn bar(insight: Insight, title: &str, x_label: &str, y_label: &str, values: Vec<(String, f64)>) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Bar,
        heading: insight.heading().to_string(),
        title: title.to_string(),
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        data: ChartData::Categories { values },
    }
}

pub(crate) fn counts_as_values(counts: Vec<(String, usize)>) -> Vec<(String, f64)> {
    counts.into_iter().map(|(k, n)| (k, n as f64)).collect()
}
