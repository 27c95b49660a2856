//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - resolves and loads the bookings CSV
//! - prints KPIs, text charts and reports
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, DashboardArgs, InputArgs, PlotArgs, ReportArgs, SampleArgs, ViewArgs};
use crate::domain::DashboardConfig;
use crate::error::AppError;
use crate::views::ChartSlot;

pub mod pipeline;

/// Entry point for the `hotels` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is fine; a malformed one is worth a warning once logging is up.
    let dotenv = dotenvy::dotenv();

    // We want `hotels` and `hotels -f x.csv` to behave like `hotels tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let tui = matches!(cli.command, Command::Tui(_));
    crate::logging::setup_log(&cli.log_level, cli.log_file.as_deref(), tui)?;
    if let Err(e) = dotenv {
        if !e.not_found() {
            tracing::warn!("Ignoring .env file: {e}");
        }
    }

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Summary(args) => handle_summary(args),
        Command::View(args) => handle_view(args),
        Command::Overview(args) => handle_overview(args),
        Command::Report(args) => handle_report(args),
        Command::Sample(args) => handle_sample(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_tui(args: DashboardArgs) -> Result<(), AppError> {
    let config = dashboard_config_from_args(&args)?;
    crate::tui::run(config)
}

fn handle_summary(args: InputArgs) -> Result<(), AppError> {
    let dashboard = load(&args)?;
    let kpis = dashboard.kpis()?;

    println!("{}", crate::report::format_load_summary(&dashboard.source, &dashboard.ingest));
    print!("{}", crate::report::format_kpis(&kpis));
    Ok(())
}

fn handle_view(args: ViewArgs) -> Result<(), AppError> {
    let dashboard = load(&args.input)?;
    let chart = dashboard.insight(args.insight)?;

    println!("{}", kpi_block(&dashboard));
    println!("{}", crate::plot::render_chart(&chart, args.size.width, args.size.height));

    if let Some(path) = &args.export {
        crate::io::export::write_chart_json(path, &chart, &dashboard.source)?;
        println!("Exported chart to {}", path.display());
    }
    Ok(())
}

/// Prints every overview chart it can; exits with the first chart failure, if any.
fn handle_overview(args: DashboardArgs) -> Result<(), AppError> {
    let config = dashboard_config_from_args(&args)?;
    let dashboard = pipeline::load_dashboard(&config.csv_path)?;
    let slots = dashboard.overview(config.group_by);

    println!("{}", kpi_block(&dashboard));
    for slot in &slots {
        println!("{}", render_slot(slot, config.plot_width, config.plot_height));
    }
    first_failure(slots)
}

/// Writes the report even when some charts fail; those keep a section holding the reason.
fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let dashboard = load(&args.input)?;
    let kpis = dashboard.kpis();
    let slots = dashboard.all_charts(args.grouping.selected());

    let path = crate::report::write_markdown_report(&args.output, &dashboard.source, &kpis, &slots)?;
    println!("Wrote report to {}", path.display());
    first_failure(slots)
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let rows = crate::data::write_sample_csv(&args.output, args.count, args.seed)?;
    println!("Wrote {rows} synthetic bookings to {}", args.output.display());
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::export::read_chart_json(&args.spec)?;
    println!("Source: {} ({})", file.source, file.generated);
    println!("{}", crate::plot::render_chart(&file.chart, args.size.width, args.size.height));
    Ok(())
}

/// KPI lines, or the reason they are unavailable; never fails the command.
fn kpi_block(dashboard: &pipeline::Dashboard) -> String {
    let kpis = dashboard.kpis();
    if let Err(e) = &kpis {
        tracing::warn!("KPIs unavailable: {e}");
    }
    crate::report::format_kpi_block(&kpis)
}

fn render_slot(slot: &ChartSlot, width: usize, height: usize) -> String {
    match &slot.chart {
        Ok(chart) => crate::plot::render_chart(chart, width, height),
        Err(e) => format!("== {} ==\nunavailable: {e}\n", slot.heading),
    }
}

fn first_failure(slots: Vec<ChartSlot>) -> Result<(), AppError> {
    match slots.into_iter().find_map(|slot| slot.chart.err()) {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn load(args: &InputArgs) -> Result<pipeline::Dashboard, AppError> {
    let path = crate::cli::picker::resolve_csv_path(args.file.clone())?;
    pipeline::load_dashboard(&path)
}

/// Fold dashboard flags into a [`DashboardConfig`], resolving the CSV path.
pub fn dashboard_config_from_args(args: &DashboardArgs) -> Result<DashboardConfig, AppError> {
    Ok(DashboardConfig {
        csv_path: crate::cli::picker::resolve_csv_path(args.input.file.clone())?,
        group_by: args.grouping.selected(),
        plot_width: args.size.width,
        plot_height: args.size.height,
        export_dir: args.export_dir.clone(),
    })
}

/// Rewrite argv so `hotels` defaults to `hotels tui`.
///
/// Rules:
/// - `hotels`                          -> `hotels tui`
/// - `hotels -f x.csv ...`             -> `hotels tui -f x.csv ...`
/// - `hotels --help/--version/-h`      -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "tui" | "summary" | "view" | "overview" | "report" | "sample" | "plot"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_the_tui() {
        assert_eq!(rewrite_args(args(&["hotels"])), args(&["hotels", "tui"]));
        assert_eq!(
            rewrite_args(args(&["hotels", "-f", "h.csv"])),
            args(&["hotels", "tui", "-f", "h.csv"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        for argv in [
            args(&["hotels", "summary", "-f", "h.csv"]),
            args(&["hotels", "--help"]),
            args(&["hotels", "plot", "--spec", "c.json"]),
        ] {
            assert_eq!(rewrite_args(argv.clone()), argv);
        }
    }

    const NO_LEAD_TIME: &str = "country,hotel,is_canceled\nPRT,City Hotel,1\nGBR,Resort Hotel,0\nPRT,City Hotel,0\n";

    fn view_args(csv: &std::path::Path, insight: crate::domain::Insight, export: Option<std::path::PathBuf>) -> ViewArgs {
        ViewArgs {
            input: InputArgs {
                file: Some(csv.to_path_buf()),
            },
            insight,
            size: crate::cli::PlotSizeArgs { width: 60, height: 10 },
            export,
        }
    }

    #[test]
    fn view_renders_its_chart_without_kpi_columns() {
        use crate::domain::Insight;

        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("hotels.csv");
        std::fs::write(&csv, NO_LEAD_TIME).unwrap();
        let dashboard = pipeline::load_dashboard(&csv).unwrap();
        assert!(kpi_block(&dashboard).starts_with("KPIs unavailable: Missing column `lead_time`"));

        let json = dir.path().join("country.json");
        handle_view(view_args(&csv, Insight::Country, Some(json.clone()))).unwrap();
        let saved = crate::io::export::read_chart_json(&json).unwrap();
        assert_eq!(saved.chart.heading, Insight::Country.heading());

        let err = handle_view(view_args(&csv, Insight::LeadTime, None)).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.message().contains("`lead_time`"));
    }

    #[test]
    fn report_is_written_around_failed_charts() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("hotels.csv");
        std::fs::write(&csv, NO_LEAD_TIME).unwrap();
        let output = dir.path().join("report.md");

        let err = handle_report(ReportArgs {
            input: InputArgs {
                file: Some(csv.clone()),
            },
            output: output.clone(),
            grouping: crate::cli::GroupingArgs {
                group_by: crate::domain::GroupBy::Hotel,
                no_group: true,
            },
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), 3);

        let md = std::fs::read_to_string(&output).unwrap();
        assert!(md.contains("## KPIs\n> unavailable:"));
        assert!(md.contains("## Lead Time vs Average Daily Rate (ADR)\n> unavailable:"));
        assert!(md.contains("| PRT | 2.00 |"));
    }

    #[test]
    fn failed_slot_renders_its_reason() {
        let slot = ChartSlot::new(
            "Correlation Heatmap",
            Err(crate::error::MetricsError::MissingColumn(crate::domain::Field::Babies)),
        );
        assert_eq!(
            render_slot(&slot, 60, 10),
            "== Correlation Heatmap ==\nunavailable: Missing column `babies` in the bookings table.\n"
        );
        assert_eq!(first_failure(vec![slot]).unwrap_err().exit_code(), 3);
    }
}
