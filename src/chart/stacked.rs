//! Stacked bar chart over the rolling per-minute window.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use super::{palette_color, ChartStyle, LegendPosition, STACKED_STYLE};
use crate::data::{StackedDataset, StackedSeries};

const BAR_SYMBOL: &str = "█";
const GRID_SYMBOL: &str = "·";
const LEGEND_SYMBOL: &str = "■";

#[derive(Debug, Clone)]
pub struct StackedBarChart {
    pub area: Rect,
    pub labels: Vec<String>,
    pub datasets: Vec<StackedDataset>,
    pub totals: Vec<u64>,
    pub style: ChartStyle,
}

/// Areas a stacked chart is split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Regions {
    gutter: Rect,
    plot: Rect,
    axis: Rect,
    legend: Rect,
}

impl StackedBarChart {
    pub fn new(area: Rect, series: &StackedSeries) -> Self {
        Self {
            area,
            labels: series.labels.clone(),
            datasets: series.datasets.clone(),
            totals: series.column_totals(),
            style: STACKED_STYLE,
        }
    }

    fn max_total(&self) -> u64 {
        self.totals.iter().copied().max().unwrap_or(0).max(1)
    }

    fn regions(&self, area: Rect) -> Regions {
        let legend_width = match self.style.legend {
            LegendPosition::Right => self
                .datasets
                .iter()
                .map(|d| d.label.chars().count() as u16 + 3)
                .max()
                .unwrap_or(0)
                .min(area.width / 3),
            LegendPosition::None => 0,
        };
        let gutter_width = (self.max_total().to_string().len() as u16 + 1).min(area.width / 4);
        let chart_width = area.width.saturating_sub(legend_width);
        let plot_height = area.height.saturating_sub(1);

        Regions {
            gutter: Rect::new(area.x, area.y, gutter_width, plot_height),
            plot: Rect::new(
                area.x + gutter_width,
                area.y,
                chart_width.saturating_sub(gutter_width),
                plot_height,
            ),
            axis: Rect::new(
                area.x + gutter_width,
                area.y + plot_height,
                chart_width.saturating_sub(gutter_width),
                area.height.min(1),
            ),
            legend: Rect::new(area.x + chart_width, area.y, legend_width, area.height),
        }
    }

    /// Cells per time point and the first point that fits, keeping the most
    /// recent points when the plot is narrow.
    fn columns(&self, width: u16) -> (u16, usize) {
        let points = self.labels.len().max(1);
        let column_width = (width as usize / points).max(1);
        let visible = (width as usize / column_width).min(points);
        (column_width as u16, points - visible)
    }

    fn render_gridlines(&self, plot: Rect, buf: &mut Buffer) {
        if !self.style.gridlines.value || plot.height == 0 {
            return;
        }
        let style = Style::default().fg(Color::DarkGray);
        for y in [plot.y, plot.y + plot.height / 2] {
            for x in plot.x..plot.x + plot.width {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_symbol(GRID_SYMBOL).set_style(style);
                }
            }
        }
    }

    fn render_bars(&self, plot: Rect, buf: &mut Buffer) {
        if plot.width == 0 || plot.height == 0 {
            return;
        }
        let (column_width, first) = self.columns(plot.width);
        let window = self.labels.len();
        let bar_width = if column_width > 1 { column_width - 1 } else { 1 };
        let max = self.max_total() as f64;
        let height = f64::from(plot.height);
        let bottom = plot.y + plot.height;

        for (slot, point) in (first..self.labels.len()).enumerate() {
            let x0 = plot.x + slot as u16 * column_width;
            let mut sum = 0u64;
            for dataset in &self.datasets {
                let value = dataset.sample_at(point, window);
                let from = (sum as f64 * height / max).round() as u16;
                sum = sum.saturating_add(value);
                let to = (sum as f64 * height / max).round() as u16;
                let style = Style::default().fg(palette_color(dataset.color));
                for row in from..to.min(plot.height) {
                    for x in x0..(x0 + bar_width).min(plot.x + plot.width) {
                        if let Some(cell) = buf.cell_mut((x, bottom - 1 - row)) {
                            cell.set_symbol(BAR_SYMBOL).set_style(style);
                        }
                    }
                }
            }
        }
    }

    fn render_axes(&self, regions: &Regions, buf: &mut Buffer) {
        let style = Style::default().fg(Color::Gray);
        let gutter = regions.gutter;
        if gutter.width > 0 && gutter.height > 0 {
            let top = self.max_total().to_string();
            let x = gutter.x + gutter.width.saturating_sub(top.len() as u16 + 1);
            buf.set_stringn(x, gutter.y, &top, gutter.width as usize, style);
            let zero_x = gutter.x + gutter.width.saturating_sub(2);
            buf.set_stringn(zero_x, gutter.y + gutter.height - 1, "0", 1, style);
        }

        let axis = regions.axis;
        if axis.width == 0 || axis.height == 0 || self.labels.is_empty() {
            return;
        }
        let (column_width, first) = self.columns(axis.width);
        let last = self.labels.len() - 1;
        let right = axis.x + axis.width;

        let mut next_free = axis.x;
        for point in [first, first + (last - first) / 2, last] {
            let label = &self.labels[point];
            let len = label.chars().count() as u16;
            let x = (axis.x + (point - first) as u16 * column_width)
                .min(right.saturating_sub(len))
                .max(next_free);
            if x + len > right {
                continue;
            }
            buf.set_stringn(x, axis.y, label, len as usize, style);
            next_free = x + len + 1;
        }
    }

    fn render_legend(&self, legend: Rect, buf: &mut Buffer) {
        // symbol, space, at least one character of label
        if legend.width < 4 {
            return;
        }
        for (i, dataset) in self.datasets.iter().enumerate().take(legend.height as usize) {
            let y = legend.y + i as u16;
            let style = Style::default().fg(palette_color(dataset.color));
            buf.set_stringn(legend.x + 1, y, LEGEND_SYMBOL, 1, style);
            buf.set_stringn(
                legend.x + 3,
                y,
                &dataset.label,
                legend.width.saturating_sub(3) as usize,
                Style::default(),
            );
        }
    }
}

impl Widget for &StackedBarChart {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let regions = self.regions(area);
        self.render_gridlines(regions.plot, buf);
        self.render_bars(regions.plot, buf);
        self.render_axes(&regions, buf);
        self.render_legend(regions.legend, buf);
    }
}
