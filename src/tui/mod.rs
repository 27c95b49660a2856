//! Ratatui-based terminal UI.
//!
//! The TUI shows the headline KPIs, a navigation list (overview plus the six
//! insights) and the selected chart. Every selection or grouping change
//! recomputes from the loaded table.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table},
};

use crate::app::pipeline::{Dashboard, load_dashboard};
use crate::domain::{ChartData, ChartKind, ChartSpec, DashboardConfig, GroupBy, Insight, Kpis, ScatterPoint};
use crate::error::AppError;
use crate::io::export::{timestamped_path, write_chart_json};
use crate::views::{self, ChartSlot};

mod plotters_chart;

use plotters_chart::{PALETTE, ScatterPlottersChart, palette_color};

/// Start the TUI.
pub fn run(config: DashboardConfig) -> Result<(), AppError> {
    // Load before touching the terminal so input errors print normally.
    let dashboard = load_dashboard(&config.csv_path)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(dashboard, config);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Entries of the navigation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Overview,
    Insight(Insight),
}

impl Page {
    const COUNT: usize = 1 + Insight::ALL.len();

    fn from_index(idx: usize) -> Page {
        match idx {
            0 => Page::Overview,
            n => Page::Insight(Insight::ALL[(n - 1) % Insight::ALL.len()]),
        }
    }

    fn index(self) -> usize {
        match self {
            Page::Overview => 0,
            Page::Insight(i) => i.number(),
        }
    }

    fn label(self) -> String {
        match self {
            Page::Overview => "Overview".to_string(),
            Page::Insight(i) => i.label(),
        }
    }
}

struct App {
    dashboard: Dashboard,
    config: DashboardConfig,
    page: Page,
    /// Which overview chart is shown (the overview has four).
    chart_index: usize,
    kpis: Result<Kpis, String>,
    /// One slot per page of the current view; a failed slot shows its error in place.
    charts: Vec<ChartSlot>,
    status: String,
}

impl App {
    fn new(dashboard: Dashboard, config: DashboardConfig) -> Self {
        let status = format!(
            "Loaded {} bookings from {}",
            dashboard.table().len(),
            dashboard.source.display()
        );
        let mut app = Self {
            dashboard,
            config,
            page: Page::Overview,
            chart_index: 0,
            kpis: Err(String::new()),
            charts: Vec::new(),
            status,
        };
        app.recompute_kpis();
        app.recompute();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up | KeyCode::Char('k') => {
                let idx = (self.page.index() + Page::COUNT - 1) % Page::COUNT;
                self.select(Page::from_index(idx));
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let idx = (self.page.index() + 1) % Page::COUNT;
                self.select(Page::from_index(idx));
            }
            KeyCode::Char(c @ '0'..='6') => {
                let idx = c as usize - '0' as usize;
                self.select(Page::from_index(idx));
            }
            KeyCode::Left | KeyCode::Right => self.step_chart(code == KeyCode::Right),
            KeyCode::Char('g') => {
                self.config.group_by = GroupBy::cycle(self.config.group_by);
                self.status = format!("group by: {}", GroupBy::display(self.config.group_by));
                if self.page == Page::Overview {
                    self.recompute();
                }
            }
            KeyCode::Char('e') => self.export_current(),
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
        false
    }

    fn select(&mut self, page: Page) {
        if page == self.page {
            return;
        }
        self.page = page;
        self.chart_index = 0;
        self.recompute();
    }

    fn step_chart(&mut self, forward: bool) {
        let n = self.charts.len();
        if n > 1 {
            self.chart_index = if forward {
                (self.chart_index + 1) % n
            } else {
                (self.chart_index + n - 1) % n
            };
        }
    }

    fn recompute_kpis(&mut self) {
        self.kpis = self.dashboard.kpis().map_err(|e| e.to_string());
    }

    fn recompute(&mut self) {
        self.charts = match self.page {
            Page::Overview => self.dashboard.overview(self.config.group_by),
            Page::Insight(insight) => vec![views::insight_slot(self.dashboard.table(), insight)],
        };
        self.chart_index = self.chart_index.min(self.charts.len().saturating_sub(1));
    }

    fn current_slot(&self) -> Option<&ChartSlot> {
        self.charts.get(self.chart_index)
    }

    fn current_chart(&self) -> Option<&ChartSpec> {
        self.current_slot().and_then(|slot| slot.chart.as_ref().ok())
    }

    fn export_current(&mut self) {
        let Some(chart) = self.current_chart() else {
            self.status = "Nothing to export.".to_string();
            return;
        };
        let path = timestamped_path(&self.config.export_dir, &chart.heading);
        self.status = match write_chart_json(&path, chart, &self.dashboard.source) {
            Ok(()) => format!("Exported {}", path.display()),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn reload(&mut self) {
        match load_dashboard(&self.dashboard.source) {
            Ok(dashboard) => {
                self.status = format!("Reloaded {} bookings", dashboard.table().len());
                self.dashboard = dashboard;
                self.recompute_kpis();
                self.recompute();
            }
            Err(err) => self.status = format!("Reload failed: {err}"),
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let kpis = match &self.kpis {
            Ok(kpis) => kpis,
            Err(msg) => {
                let p = Paragraph::new(msg.as_str())
                    .style(Style::default().fg(Color::Red))
                    .block(Block::default().title("KPIs").borders(Borders::ALL));
                frame.render_widget(p, area);
                return;
            }
        };

        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)])
            .split(area);

        let metrics = [
            ("Total Bookings", kpis.total_bookings_label()),
            ("Average Lead Time", kpis.avg_lead_time_label()),
            ("Cancellation Rate", kpis.cancellation_rate_label()),
        ];
        for ((label, value), cell) in metrics.into_iter().zip(cells.iter()) {
            let text = Text::from(vec![
                Line::from(Span::styled(label, Style::default().fg(Color::Gray))),
                Line::from(Span::styled(value, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))),
            ]);
            frame.render_widget(Paragraph::new(text).block(Block::default().borders(Borders::ALL)), *cell);
        }
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(42), Constraint::Min(0)])
            .split(area);

        self.draw_nav(frame, chunks[0]);
        self.draw_chart(frame, chunks[1]);
    }

    fn draw_nav(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut items: Vec<ListItem> = (0..Page::COUNT)
            .map(|i| ListItem::new(Page::from_index(i).label()))
            .collect();
        items.push(ListItem::new(""));
        items.push(ListItem::new(Span::styled(
            format!("group by: {}", GroupBy::display(self.config.group_by)),
            Style::default().fg(Color::Gray),
        )));

        let list = List::new(items)
            .block(Block::default().title("Views").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default().with_selected(Some(self.page.index()));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = match self.current_slot() {
            Some(slot) if self.charts.len() > 1 => {
                format!("{} [{}/{}]", slot.heading, self.chart_index + 1, self.charts.len())
            }
            Some(slot) => slot.heading.clone(),
            None => self.page.label(),
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let chart = match self.current_slot().map(|slot| &slot.chart) {
            Some(Err(err)) => {
                let p = Paragraph::new(err.to_string()).style(Style::default().fg(Color::Red));
                frame.render_widget(p, inner);
                return;
            }
            None => {
                let p = Paragraph::new("(no data)").style(Style::default().fg(Color::Yellow));
                frame.render_widget(p, inner);
                return;
            }
            Some(Ok(chart)) => chart,
        };

        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner);
        frame.render_widget(
            Paragraph::new(chart.title.as_str()).style(Style::default().fg(Color::Gray)),
            parts[0],
        );

        match &chart.data {
            ChartData::Points { points } => draw_scatter(frame, parts[1], chart, points),
            ChartData::Categories { values } => {
                let rows = bar_rows(values, chart.kind == ChartKind::Pie);
                let bars: Vec<Bar> = rows
                    .into_iter()
                    .enumerate()
                    .map(|(i, (label, value, shown))| {
                        let (r, g, b) = palette_color(i);
                        Bar::default()
                            .label(Line::from(label))
                            .value(value)
                            .text_value(shown)
                            .style(Style::default().fg(Color::Rgb(r, g, b)))
                    })
                    .collect();
                frame.render_widget(horizontal_bars().data(BarGroup::default().bars(&bars)), parts[1]);
            }
            ChartData::Grouped { groups } => {
                // One colour per inner series, stable across groups.
                let mut series: Vec<&str> = Vec::new();
                for (name, _) in groups.iter().flat_map(|g| &g.bars) {
                    if !series.contains(&name.as_str()) {
                        series.push(name);
                    }
                }

                let mut widget = horizontal_bars();
                for group in groups {
                    let bars: Vec<Bar> = bar_rows(&group.bars, false)
                        .into_iter()
                        .map(|(label, value, shown)| {
                            let idx = series.iter().position(|s| *s == label).unwrap_or(0);
                            let (r, g, b) = palette_color(idx);
                            Bar::default()
                                .label(Line::from(label))
                                .value(value)
                                .text_value(shown)
                                .style(Style::default().fg(Color::Rgb(r, g, b)))
                        })
                        .collect();
                    widget = widget.data(
                        BarGroup::default()
                            .label(Line::from(group.category.clone()))
                            .bars(&bars),
                    );
                }
                frame.render_widget(widget, parts[1]);
            }
            ChartData::Matrix { labels, values } => draw_heatmap(frame, parts[1], labels, values),
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ view  ←/→ chart  g group  e export  r reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn horizontal_bars<'a>() -> BarChart<'a> {
    BarChart::default()
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .group_gap(1)
}

fn draw_scatter(frame: &mut ratatui::Frame<'_>, area: Rect, chart: &ChartSpec, points: &[ScatterPoint]) {
    let Some((series, x_bounds, y_bounds)) = scatter_series(points) else {
        frame.render_widget(Paragraph::new("(no data)").style(Style::default().fg(Color::Yellow)), area);
        return;
    };

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let widget = ScatterPlottersChart {
        series: &series,
        x_bounds,
        y_bounds,
        x_label: &chart.x_label,
        y_label: &chart.y_label,
    };
    frame.render_widget(widget, parts[0]);

    let mut legend: Vec<Span> = Vec::new();
    for (idx, (group, _)) in series.iter().take(PALETTE.len()).enumerate() {
        let (r, g, b) = palette_color(idx);
        legend.push(Span::styled("● ", Style::default().fg(Color::Rgb(r, g, b))));
        legend.push(Span::raw(format!("{group}  ")));
    }
    if series.len() > PALETTE.len() {
        legend.push(Span::styled(
            format!("+{} more (colours repeat)", series.len() - PALETTE.len()),
            Style::default().fg(Color::Gray),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(legend)), parts[1]);
}

fn draw_heatmap(frame: &mut ratatui::Frame<'_>, area: Rect, labels: &[String], values: &[Vec<Option<f64>>]) {
    const CELL: u16 = 8;

    let header = Row::new(
        std::iter::once(Cell::from(""))
            .chain(labels.iter().map(|l| Cell::from(short_label(l, CELL as usize - 1))))
            .collect::<Vec<_>>(),
    )
    .style(Style::default().fg(Color::Gray));

    let rows: Vec<Row> = labels
        .iter()
        .zip(values)
        .map(|(label, row)| {
            let cells = std::iter::once(Cell::from(label.clone())).chain(row.iter().map(|v| {
                let txt = v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "--".to_string());
                Cell::from(txt).style(Style::default().fg(heat_color(*v)))
            }));
            Row::new(cells.collect::<Vec<_>>())
        })
        .collect();

    let widths: Vec<Constraint> = std::iter::once(Constraint::Length(24))
        .chain(labels.iter().map(|_| Constraint::Length(CELL)))
        .collect();

    frame.render_widget(Table::new(rows, widths).header(header), area);
}

/// `(label, bar length, shown value)` per bar. Lengths keep two decimals of
/// precision; pie slices become percentage shares.
fn bar_rows(values: &[(String, f64)], as_share: bool) -> Vec<(String, u64, String)> {
    let total: f64 = values.iter().map(|(_, v)| *v).sum();
    values
        .iter()
        .map(|(label, v)| {
            let (value, shown) = if as_share && total > 0.0 {
                let pct = 100.0 * v / total;
                (pct, format!("{pct:.1}%"))
            } else if v.fract() == 0.0 {
                (*v, format!("{v:.0}"))
            } else {
                (*v, format!("{v:.2}"))
            };
            let len = if value.is_finite() && value > 0.0 {
                (value * 100.0).round() as u64
            } else {
                0
            };
            (label.clone(), len, shown)
        })
        .collect()
}

/// `(group, points)` per scatter series.
type Series = Vec<(String, Vec<(f64, f64)>)>;

/// Split scatter points into per-group series (first-seen order) and compute
/// padded axis bounds. `None` when there is nothing to plot.
fn scatter_series(points: &[ScatterPoint]) -> Option<(Series, [f64; 2], [f64; 2])> {
    let mut series: Series = Vec::new();
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);

    for p in points.iter().filter(|p| p.x.is_finite() && p.y.is_finite()) {
        let group = p.group.as_deref().unwrap_or("all");
        match series.iter_mut().find(|(g, _)| g == group) {
            Some((_, pts)) => pts.push((p.x, p.y)),
            None => series.push((group.to_string(), vec![(p.x, p.y)])),
        }
        x_min = x_min.min(p.x);
        x_max = x_max.max(p.x);
        y_min = y_min.min(p.y);
        y_max = y_max.max(p.y);
    }

    if series.is_empty() {
        return None;
    }

    let pad = |lo: f64, hi: f64| {
        let pad = ((hi - lo).abs() * 0.05).max(0.5);
        [lo - pad, hi + pad]
    };
    Some((series, pad(x_min, x_max), pad(y_min, y_max)))
}

fn heat_color(value: Option<f64>) -> Color {
    match value {
        None => Color::DarkGray,
        Some(v) if v >= 0.5 => Color::Red,
        Some(v) if v >= 0.2 => Color::LightRed,
        Some(v) if v > -0.2 => Color::Gray,
        Some(v) if v > -0.5 => Color::LightBlue,
        Some(_) => Color::Blue,
    }
}

fn short_label(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
