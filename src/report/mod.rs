//! Reporting utilities: load summary, KPI block and the markdown report.

pub mod format;

pub use format::*;

use crate::domain::{BookingTable, GroupBy, Insight};
use crate::views::{self, ChartSlot};

/// Every chart the dashboard can show: the overview first, then the six insights.
pub fn all_charts(table: &BookingTable, group_by: Option<GroupBy>) -> Vec<ChartSlot> {
    let mut slots = views::overview_charts(table, group_by);
    slots.extend(Insight::ALL.into_iter().map(|insight| views::insight_slot(table, insight)));
    slots
}
