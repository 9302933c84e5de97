//! Categorical pie chart painted on a braille canvas.

use std::f64::consts::TAU;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Painter, Shape},
        Widget,
    },
};

use super::{palette_color, ChartStyle, PIE_STYLE};
use crate::data::{CategoricalSeries, PaletteColor};

/// Sample steps across the pie's diameter.
const RESOLUTION: usize = 160;

#[derive(Debug, Clone)]
pub struct PieChart {
    pub area: Rect,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<PaletteColor>,
    pub style: ChartStyle,
}

impl PieChart {
    pub fn new(area: Rect, series: &CategoricalSeries) -> Self {
        Self {
            area,
            labels: series.labels.clone(),
            values: series.values.clone(),
            colors: series.colors.clone(),
            style: PIE_STYLE,
        }
    }

    /// Slice index covering `angle`, measured clockwise from twelve o'clock.
    pub fn slice_at(&self, angle: f64) -> Option<usize> {
        let total: f64 = self.values.iter().filter(|v| **v > 0.0).sum();
        if total <= 0.0 {
            return None;
        }
        let target = angle.rem_euclid(TAU) / TAU * total;
        let mut end = 0.0;
        let mut last = None;
        for (i, value) in self.values.iter().enumerate() {
            if *value <= 0.0 {
                continue;
            }
            end += value;
            last = Some(i);
            if target < end {
                return last;
            }
        }
        last
    }
}

/// Horizontal stretch that keeps the pie round in a cell grid.
///
/// Braille gives 2x4 dots per cell and cells are about twice as tall as
/// wide, so dots are close to square.
fn aspect(area: Rect) -> f64 {
    let width = f64::from(area.width) * 2.0;
    let height = f64::from(area.height) * 4.0;
    if height <= 0.0 {
        1.0
    } else {
        (width / height).max(1.0)
    }
}

struct Slices<'a> {
    chart: &'a PieChart,
}

impl Shape for Slices<'_> {
    fn draw(&self, painter: &mut Painter) {
        let step = 2.0 / RESOLUTION as f64;
        for row in 0..=RESOLUTION {
            let y = -1.0 + row as f64 * step;
            for col in 0..=RESOLUTION {
                let x = -1.0 + col as f64 * step;
                if x * x + y * y > 1.0 {
                    continue;
                }
                let Some(slice) = self.chart.slice_at(x.atan2(y)) else {
                    return;
                };
                if let Some((px, py)) = painter.get_point(x, y) {
                    painter.paint(px, py, palette_color(self.chart.colors[slice]));
                }
            }
        }
    }
}

impl Widget for &PieChart {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let stretch = aspect(area);
        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([-stretch, stretch])
            .y_bounds([-1.0, 1.0])
            .paint(|ctx| ctx.draw(&Slices { chart: self }))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{normalize_categorical, NamedValue};
    use ratatui::style::Color;
    use std::collections::HashSet;
    use std::f64::consts::PI;

    fn chart(values: &[(&str, f64)]) -> PieChart {
        let values: Vec<NamedValue> = values
            .iter()
            .map(|(name, value)| NamedValue::new(*name, *value))
            .collect();
        PieChart::new(Rect::new(0, 0, 20, 10), &normalize_categorical(&values))
    }

    #[test]
    fn slices_run_clockwise_from_top() {
        let chart = chart(&[("a", 1.0), ("b", 1.0), ("c", 2.0)]);
        assert_eq!(chart.slice_at(0.1), Some(0));
        assert_eq!(chart.slice_at(PI * 0.75), Some(1));
        assert_eq!(chart.slice_at(PI * 1.5), Some(2));
        // atan2 gives negative angles west of north
        assert_eq!(chart.slice_at(-0.1), Some(2));
    }

    #[test]
    fn zero_slices_take_no_space() {
        let chart = chart(&[("a", 0.0), ("b", 3.0)]);
        assert_eq!(chart.slice_at(0.0), Some(1));
        assert_eq!(chart.slice_at(PI), Some(1));
    }

    #[test]
    fn empty_pie_draws_nothing() {
        let chart = chart(&[("a", 0.0)]);
        assert_eq!(chart.slice_at(1.0), None);

        let area = chart.area;
        let mut buf = Buffer::empty(area);
        (&chart).render(area, &mut buf);
        let drawn = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .filter(|&(x, y)| buf.cell((x, y)).is_some_and(|c| c.symbol() != " "))
            .count();
        assert_eq!(drawn, 0);
    }

    #[test]
    fn pie_paints_the_center() {
        let chart = chart(&[("a", 1.0), ("b", 1.0)]);
        let area = chart.area;
        let mut buf = Buffer::empty(area);
        (&chart).render(area, &mut buf);
        let center = buf.cell((area.width / 2, area.height / 2)).unwrap();
        assert_ne!(center.symbol(), " ");
    }

    #[test]
    fn slice_colors_follow_the_palette() {
        // first slice runs clockwise from the top, so it fills the right half
        let chart = chart(&[("uplink", 1.0), ("downlink", 1.0)]);
        assert_eq!(palette_color(chart.colors[0]), Color::Red);
        assert_eq!(palette_color(chart.colors[1]), Color::Green);

        let area = chart.area;
        let mut buf = Buffer::empty(area);
        (&chart).render(area, &mut buf);

        let painted = |columns: std::ops::Range<u16>| -> HashSet<Color> {
            columns
                .flat_map(|x| (0..area.height).map(move |y| (x, y)))
                .filter_map(|pos| buf.cell(pos))
                .filter(|cell| cell.symbol() != " ")
                .map(|cell| cell.fg)
                .collect()
        };
        let middle = area.width / 2;
        assert_eq!(painted(middle + 2..area.width), HashSet::from([Color::Red]));
        assert_eq!(painted(0..middle - 2), HashSet::from([Color::Green]));
    }

    #[test]
    fn wide_areas_stretch_horizontally() {
        assert_eq!(aspect(Rect::new(0, 0, 20, 10)), 1.0);
        assert_eq!(aspect(Rect::new(0, 0, 40, 10)), 2.0);
    }
}
