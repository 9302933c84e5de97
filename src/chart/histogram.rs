//! Bucketed latency histogram drawn as a vertical bar chart.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Widget},
};

use super::{palette_color, ChartStyle, BORDER_WIDTH, HISTOGRAM_COLOR, HISTOGRAM_STYLE};
use crate::data::HistogramSeries;

#[derive(Debug, Clone)]
pub struct HistogramChart {
    pub area: Rect,
    pub labels: Vec<&'static str>,
    pub counts: Vec<u64>,
    /// Hide tick labels and bar values.
    pub noaxis: bool,
    pub style: ChartStyle,
}

impl HistogramChart {
    pub fn new(area: Rect, series: &HistogramSeries, noaxis: bool) -> Self {
        Self {
            area,
            labels: series.labels.clone(),
            counts: series.counts.clone(),
            noaxis,
            style: HISTOGRAM_STYLE,
        }
    }

    /// Bar width that fits every bucket into `width` cells.
    fn bar_width(&self, width: u16) -> u16 {
        let bars = self.counts.len().max(1) as u16;
        let gaps = BORDER_WIDTH.saturating_mul(bars.saturating_sub(1));
        (width.saturating_sub(gaps) / bars).max(1)
    }
}

impl Widget for &HistogramChart {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let color = palette_color(HISTOGRAM_COLOR);
        let bars: Vec<Bar> = self
            .counts
            .iter()
            .zip(&self.labels)
            .map(|(count, label)| {
                let bar = Bar::default()
                    .value(*count)
                    .style(Style::default().fg(color));
                if self.noaxis {
                    bar.text_value(String::new())
                } else {
                    bar.label(Line::from(*label))
                }
            })
            .collect();

        BarChart::default()
            .data(BarGroup::default().bars(&bars))
            .bar_width(self.bar_width(area.width))
            .bar_gap(BORDER_WIDTH)
            .value_style(Style::default().fg(color).add_modifier(Modifier::REVERSED))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{normalize_histogram, HistogramStat};

    fn chart(noaxis: bool) -> HistogramChart {
        let mut counts = vec![0u64; 22];
        counts[3] = 40;
        counts[10] = 10;
        let series = normalize_histogram(&counts, &HistogramStat::default()).unwrap();
        HistogramChart::new(Rect::new(0, 0, 66, 10), &series, noaxis)
    }

    #[test]
    fn bars_share_the_width() {
        let chart = chart(true);
        assert_eq!(chart.bar_width(66), 2);
        assert_eq!(chart.bar_width(10), 1);
    }

    #[test]
    fn tallest_bucket_reaches_the_top() {
        let chart = chart(true);
        let area = chart.area;
        let mut buf = Buffer::empty(area);
        (&chart).render(area, &mut buf);

        // bucket 3 starts at column 3 * (2 + 1)
        let top = buf.cell((9, 0)).unwrap();
        assert_ne!(top.symbol(), " ");
        // empty bucket stays blank
        assert_eq!(buf.cell((0, 0)).unwrap().symbol(), " ");
    }

    #[test]
    fn axis_labels_only_when_requested() {
        let with_axis = chart(false);
        let area = with_axis.area;
        let mut buf = Buffer::empty(area);
        (&with_axis).render(area, &mut buf);
        let bottom: String = (0..area.width)
            .map(|x| buf.cell((x, area.height - 1)).unwrap().symbol().to_string())
            .collect();
        assert!(bottom.contains('-'));

        let without = chart(true);
        let mut buf = Buffer::empty(area);
        (&without).render(area, &mut buf);
        let bottom: String = (0..area.width)
            .map(|x| buf.cell((x, area.height - 1)).unwrap().symbol().to_string())
            .collect();
        assert!(!bottom.contains('-'));
    }
}
