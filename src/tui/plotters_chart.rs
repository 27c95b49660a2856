//! Plotters-powered scatter widget for Ratatui.
//!
//! Used for the lead time vs ADR overview chart. Plotters handles axes and
//! tick labels; its output is drawn into the Ratatui buffer through
//! `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// High-contrast series colours, assigned in group order.
pub const PALETTE: [(u8, u8, u8); 6] = [
    (0, 255, 255),
    (255, 170, 0),
    (0, 255, 0),
    (255, 85, 255),
    (255, 255, 0),
    (255, 80, 80),
];

pub fn palette_color(idx: usize) -> (u8, u8, u8) {
    PALETTE[idx % PALETTE.len()]
}

/// Render-only scatter description; series and bounds are computed by the caller.
pub struct ScatterPlottersChart<'a> {
    /// `(group, points)` per series; an ungrouped chart has a single series.
    pub series: &'a [(String, Vec<(f64, f64)>)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
}

impl<'a> Widget for ScatterPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| format!("{v:.0}"))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            // `Circle` radii are mis-scaled by the backend; a coloured `Pixel`
            // renders as a clean dot.
            for (idx, (_, points)) in self.series.iter().enumerate() {
                let (r, g, b) = palette_color(idx);
                let color = RGBColor(r, g, b);
                chart.draw_series(points.iter().map(|&(x, y)| Pixel::new((x, y), color)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
