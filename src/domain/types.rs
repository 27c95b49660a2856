//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed from the view selector to any presentation sink
//! - exported to JSON/markdown
//! - compared directly in tests

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Whether a column holds numbers or category labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Numeric,
    Categorical,
}

impl FieldKind {
    pub fn label(self) -> &'static str {
        match self {
            FieldKind::Numeric => "numeric",
            FieldKind::Categorical => "categorical",
        }
    }
}

/// A column of the booking schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Hotel,
    Country,
    CustomerType,
    ReservedRoomType,
    LeadTime,
    Adr,
    StaysInWeekendNights,
    StaysInWeekNights,
    Adults,
    Children,
    Babies,
    IsCanceled,
    PreviousCancellations,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::Hotel,
        Field::Country,
        Field::CustomerType,
        Field::ReservedRoomType,
        Field::LeadTime,
        Field::Adr,
        Field::StaysInWeekendNights,
        Field::StaysInWeekNights,
        Field::Adults,
        Field::Children,
        Field::Babies,
        Field::IsCanceled,
        Field::PreviousCancellations,
    ];

    /// CSV header name.
    pub fn name(self) -> &'static str {
        match self {
            Field::Hotel => "hotel",
            Field::Country => "country",
            Field::CustomerType => "customer_type",
            Field::ReservedRoomType => "reserved_room_type",
            Field::LeadTime => "lead_time",
            Field::Adr => "adr",
            Field::StaysInWeekendNights => "stays_in_weekend_nights",
            Field::StaysInWeekNights => "stays_in_week_nights",
            Field::Adults => "adults",
            Field::Children => "children",
            Field::Babies => "babies",
            Field::IsCanceled => "is_canceled",
            Field::PreviousCancellations => "previous_cancellations",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Hotel | Field::Country | Field::CustomerType | Field::ReservedRoomType => {
                FieldKind::Categorical
            }
            _ => FieldKind::Numeric,
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.name() == name)
    }
}

/// Numeric columns shown in the correlation heatmap, in display order.
pub const CORRELATION_FIELDS: [Field; 8] = [
    Field::LeadTime,
    Field::Adr,
    Field::StaysInWeekendNights,
    Field::StaysInWeekNights,
    Field::Adults,
    Field::Children,
    Field::Babies,
    Field::PreviousCancellations,
];

/// Categorical column used to colour the overview scatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Hotel,
    Country,
    #[value(name = "customer_type", alias = "customer-type")]
    CustomerType,
}

impl GroupBy {
    pub fn field(self) -> Field {
        match self {
            GroupBy::Hotel => Field::Hotel,
            GroupBy::Country => Field::Country,
            GroupBy::CustomerType => Field::CustomerType,
        }
    }

    /// Cycle `hotel -> country -> customer_type -> none -> hotel`.
    pub fn cycle(current: Option<GroupBy>) -> Option<GroupBy> {
        match current {
            Some(GroupBy::Hotel) => Some(GroupBy::Country),
            Some(GroupBy::Country) => Some(GroupBy::CustomerType),
            Some(GroupBy::CustomerType) => None,
            None => Some(GroupBy::Hotel),
        }
    }

    pub fn display(group: Option<GroupBy>) -> &'static str {
        group.map(|g| g.field().name()).unwrap_or("none")
    }
}

/// The six fixed insight views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Insight {
    #[value(alias = "1")]
    Country,
    #[value(name = "lead-time", alias = "2")]
    LeadTime,
    #[value(name = "customer-type", alias = "3")]
    CustomerType,
    #[value(alias = "4")]
    Adr,
    #[value(alias = "5")]
    Cancellation,
    #[value(name = "room-types", alias = "6")]
    RoomTypes,
}

impl Insight {
    pub const ALL: [Insight; 6] = [
        Insight::Country,
        Insight::LeadTime,
        Insight::CustomerType,
        Insight::Adr,
        Insight::Cancellation,
        Insight::RoomTypes,
    ];

    /// 1-based position in the navigation list.
    pub fn number(self) -> usize {
        match self {
            Insight::Country => 1,
            Insight::LeadTime => 2,
            Insight::CustomerType => 3,
            Insight::Adr => 4,
            Insight::Cancellation => 5,
            Insight::RoomTypes => 6,
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            Insight::Country => "Booking Distribution by Country",
            Insight::LeadTime => "Average Lead Time per Hotel",
            Insight::CustomerType => "Customer Type vs Hotel Bookings",
            Insight::Adr => "ADR by Hotel",
            Insight::Cancellation => "Cancellation Rate by Hotel",
            Insight::RoomTypes => "Top 5 Room Types Reserved",
        }
    }

    /// Navigation label, e.g. `"1. Booking Distribution by Country"`.
    pub fn label(self) -> String {
        format!("{}. {}", self.number(), self.heading())
    }

    pub fn next(self) -> Insight {
        Insight::ALL[self.number() % Insight::ALL.len()]
    }

    pub fn prev(self) -> Insight {
        let n = Insight::ALL.len();
        Insight::ALL[(self.number() + n - 2) % n]
    }
}

/// Chart type requested from the presentation sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Scatter,
    Bar,
    GroupedBar,
    Pie,
    Heatmap,
}

/// One point of a scatter series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    /// Marker size for renderers of the exported JSON (the overview uses ADR).
    /// Terminal plots draw every marker at one size.
    pub size: f64,
    pub group: Option<String>,
}

/// A group of bars sharing one x-axis category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarGroup {
    pub category: String,
    /// `(series, value)` pairs in descending value order.
    pub bars: Vec<(String, f64)>,
}

/// The data a chart plots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ChartData {
    /// Labeled values (bar heights or pie slices).
    Categories { values: Vec<(String, f64)> },
    /// Bars grouped by an outer category, one bar per inner series.
    Grouped { groups: Vec<BarGroup> },
    Points { points: Vec<ScatterPoint> },
    /// Square matrix; `None` marks an undefined cell.
    Matrix {
        labels: Vec<String>,
        values: Vec<Vec<Option<f64>>>,
    },
}

/// Everything a presentation sink needs to draw one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    /// Section heading shown above the chart.
    pub heading: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub data: ChartData,
}

/// Headline numbers shown above every view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub total_bookings: usize,
    /// `None` when the table holds no lead times.
    pub avg_lead_time: Option<f64>,
    /// Percentage rounded to 2 decimals; `None` for an empty table.
    pub cancellation_rate: Option<f64>,
}

impl Kpis {
    pub fn total_bookings_label(&self) -> String {
        self.total_bookings.to_string()
    }

    pub fn avg_lead_time_label(&self) -> String {
        match self.avg_lead_time {
            Some(v) => format!("{v:.1} days"),
            None => "n/a".to_string(),
        }
    }

    pub fn cancellation_rate_label(&self) -> String {
        match self.cancellation_rate {
            Some(v) => format!("{v:.2}%"),
            None => "n/a".to_string(),
        }
    }
}

/// One booking row.
///
/// The loaded table is columnar; this row form exists for building tables in
/// code (tests, synthetic samples).
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRecord {
    pub hotel: String,
    pub country: Option<String>,
    pub customer_type: String,
    pub lead_time: f64,
    pub adr: f64,
    pub stays_in_weekend_nights: f64,
    pub stays_in_week_nights: f64,
    pub adults: f64,
    /// `NaN` when the source cell was missing.
    pub children: f64,
    pub babies: f64,
    pub is_canceled: bool,
    pub previous_cancellations: f64,
    pub reserved_room_type: String,
}

impl Default for BookingRecord {
    fn default() -> Self {
        Self {
            hotel: "City Hotel".to_string(),
            country: Some("PRT".to_string()),
            customer_type: "Transient".to_string(),
            lead_time: 0.0,
            adr: 0.0,
            stays_in_weekend_nights: 0.0,
            stays_in_week_nights: 1.0,
            adults: 2.0,
            children: 0.0,
            babies: 0.0,
            is_canceled: false,
            previous_cancellations: 0.0,
            reserved_room_type: "A".to_string(),
        }
    }
}

/// A full run's configuration as understood by the front-ends.
///
/// This is derived from CLI flags (plus environment and defaults).
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub csv_path: PathBuf,
    pub group_by: Option<GroupBy>,
    pub plot_width: usize,
    pub plot_height: usize,
    /// Where the TUI writes `e` exports.
    pub export_dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_round_trip() {
        for field in Field::ALL {
            assert_eq!(Field::from_name(field.name()), Some(field));
        }
        assert_eq!(Field::from_name("arrival_date_year"), None);
    }

    #[test]
    fn insight_navigation_wraps() {
        assert_eq!(Insight::Country.next(), Insight::LeadTime);
        assert_eq!(Insight::RoomTypes.next(), Insight::Country);
        assert_eq!(Insight::Country.prev(), Insight::RoomTypes);
        assert_eq!(Insight::Adr.prev(), Insight::CustomerType);
        assert_eq!(Insight::Country.label(), "1. Booking Distribution by Country");
    }

    #[test]
    fn group_by_cycles_through_none() {
        let mut g = Some(GroupBy::Hotel);
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(GroupBy::display(g));
            g = GroupBy::cycle(g);
        }
        assert_eq!(seen, ["hotel", "country", "customer_type", "none"]);
        assert_eq!(g, Some(GroupBy::Hotel));
    }

    #[test]
    fn kpi_labels_use_sentinel_when_undefined() {
        let kpis = Kpis {
            total_bookings: 0,
            avg_lead_time: None,
            cancellation_rate: None,
        };
        assert_eq!(kpis.avg_lead_time_label(), "n/a");
        assert_eq!(kpis.cancellation_rate_label(), "n/a");

        let kpis = Kpis {
            total_bookings: 3,
            avg_lead_time: Some(12.345),
            cancellation_rate: Some(66.67),
        };
        assert_eq!(kpis.avg_lead_time_label(), "12.3 days");
        assert_eq!(kpis.cancellation_rate_label(), "66.67%");
    }
}
