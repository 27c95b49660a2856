//! Command-line parsing for the hotel bookings dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the aggregation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{GroupBy, Insight};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "hotels", version, about = "Hotel Bookings Dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level or filter directive (e.g. `debug`, `hotel_insights=trace`).
    #[arg(long, global = true, env = "HOTELS_LOG", default_value = "info")]
    pub log_level: String,

    /// Also write logs to this file.
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard (default).
    Tui(DashboardArgs),
    /// Print the dataset load summary and the headline KPIs.
    Summary(InputArgs),
    /// Print one insight as a text chart.
    View(ViewArgs),
    /// Print the KPIs and the four overview charts.
    Overview(DashboardArgs),
    /// Write a markdown report with the KPIs and every chart's data.
    Report(ReportArgs),
    /// Write a synthetic bookings CSV.
    Sample(SampleArgs),
    /// Re-render a chart JSON written by `hotels view --export`.
    Plot(PlotArgs),
}

/// Where the bookings CSV comes from.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// Bookings CSV. Falls back to `./hotels.csv`, then to an interactive picker.
    #[arg(short = 'f', long = "file", env = "HOTELS_CSV", value_name = "CSV")]
    pub file: Option<PathBuf>,
}

/// Text plot size.
#[derive(Debug, Args, Clone)]
pub struct PlotSizeArgs {
    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Scatter grouping: `--group-by` or `--no-group`.
#[derive(Debug, Args, Clone)]
pub struct GroupingArgs {
    /// Category that colours the lead time vs ADR scatter.
    #[arg(long, value_enum, default_value_t = GroupBy::Hotel)]
    pub group_by: GroupBy,

    /// Draw the scatter without grouping.
    #[arg(long, conflicts_with = "group_by")]
    pub no_group: bool,
}

/// Options shared by the dashboard views.
#[derive(Debug, Args, Clone)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub grouping: GroupingArgs,

    #[command(flatten)]
    pub size: PlotSizeArgs,

    /// Directory for chart exports made from the TUI.
    #[arg(long, default_value = ".", value_name = "DIR")]
    pub export_dir: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct ViewArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Insight to show, by name or number (1-6).
    #[arg(short = 'i', long, value_enum)]
    pub insight: Insight,

    #[command(flatten)]
    pub size: PlotSizeArgs,

    /// Export the chart spec to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Markdown file to write.
    #[arg(short = 'o', long, value_name = "MD")]
    pub output: PathBuf,

    #[command(flatten)]
    pub grouping: GroupingArgs,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// CSV file to write.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub output: PathBuf,

    /// Number of bookings to generate.
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub count: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Options for plotting a saved chart.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Chart JSON file.
    #[arg(long, value_name = "JSON")]
    pub spec: PathBuf,

    #[command(flatten)]
    pub size: PlotSizeArgs,
}

impl GroupingArgs {
    pub fn selected(&self) -> Option<GroupBy> {
        (!self.no_group).then_some(self.group_by)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn insight_accepts_number_or_name() {
        for (arg, expected) in [("4", Insight::Adr), ("room-types", Insight::RoomTypes)] {
            let cli = parse(&["hotels", "view", "-f", "h.csv", "--insight", arg]);
            let Command::View(view) = cli.command else {
                panic!("expected view");
            };
            assert_eq!(view.insight, expected);
        }
    }

    #[test]
    fn dashboard_grouping_defaults_to_hotel() {
        let cli = parse(&["hotels", "overview", "-f", "h.csv"]);
        let Command::Overview(args) = cli.command else {
            panic!("expected overview");
        };
        assert_eq!(args.grouping.selected(), Some(GroupBy::Hotel));
        assert_eq!(args.size.width, 100);

        let cli = parse(&["hotels", "tui", "--no-group"]);
        let Command::Tui(args) = cli.command else {
            panic!("expected tui");
        };
        assert_eq!(args.grouping.selected(), None);
    }

    #[test]
    fn report_takes_the_same_grouping_flags() {
        let cli = parse(&["hotels", "report", "-f", "h.csv", "-o", "r.md", "--no-group"]);
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.grouping.selected(), None);

        let cli = parse(&["hotels", "report", "-o", "r.md", "--group-by", "country"]);
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.grouping.selected(), Some(GroupBy::Country));

        assert!(Cli::try_parse_from(["hotels", "report", "-o", "r.md", "--no-group", "--group-by", "hotel"]).is_err());
    }

    #[test]
    fn log_flags_are_global() {
        let cli = parse(&["hotels", "sample", "-o", "s.csv", "--log-level", "debug"]);
        assert_eq!(cli.log_level, "debug");
        let Command::Sample(args) = cli.command else {
            panic!("expected sample");
        };
        assert_eq!(args.count, 1000);
        assert_eq!(args.seed, 42);
    }
}
