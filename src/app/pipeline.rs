//! Shared loading logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load CSV -> KPIs -> overview / insight chart specs
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::path::{Path, PathBuf};

use crate::domain::{BookingTable, ChartSpec, GroupBy, Insight, Kpis};
use crate::error::AppError;
use crate::io::ingest::{IngestedData, load_table};
use crate::views::{self, ChartSlot};

/// A loaded bookings file.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub source: PathBuf,
    pub ingest: IngestedData,
}

impl Dashboard {
    pub fn table(&self) -> &BookingTable {
        &self.ingest.table
    }

    pub fn kpis(&self) -> Result<Kpis, AppError> {
        Ok(views::compute_kpis(self.table())?)
    }

    pub fn insight(&self, insight: Insight) -> Result<ChartSpec, AppError> {
        Ok(views::insight_chart(self.table(), insight)?)
    }

    pub fn overview(&self, group_by: Option<GroupBy>) -> Vec<ChartSlot> {
        views::overview_charts(self.table(), group_by)
    }

    /// The overview followed by every insight.
    pub fn all_charts(&self, group_by: Option<GroupBy>) -> Vec<ChartSlot> {
        crate::report::all_charts(self.table(), group_by)
    }
}

/// Load the CSV at `path`.
pub fn load_dashboard(path: &Path) -> Result<Dashboard, AppError> {
    Ok(Dashboard {
        source: path.to_path_buf(),
        ingest: load_table(path)?,
    })
}
