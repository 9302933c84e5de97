//! Chart builders: bind normalized series to a rendering surface.
//!
//! A builder looks up its target surface by id, pairs it with the series and
//! a fixed [`ChartStyle`], and returns a [`RenderedChart`] the caller draws
//! with [`RenderedChart::render`]. The pipeline keeps no reference to the
//! returned chart.
//!
//! ```
//! use ratatui::layout::Rect;
//! use vardash::chart::{build_pie, Surfaces};
//! use vardash::data::{normalize_categorical, NamedValue};
//!
//! let mut surfaces = Surfaces::new();
//! surfaces.insert("messages", Rect::new(0, 0, 20, 10));
//!
//! let series = normalize_categorical(&[NamedValue::new("up", 3.0), NamedValue::new("down", 1.0)]);
//! let chart = build_pie(&surfaces, "messages", &series).unwrap();
//! assert_eq!(chart.area(), Rect::new(0, 0, 20, 10));
//! assert!(build_pie(&surfaces, "missing", &series).is_err());
//! ```

mod histogram;
mod pie;
mod stacked;

pub use histogram::HistogramChart;
pub use pie::PieChart;
pub use stacked::StackedBarChart;

use std::collections::HashMap;

use ratatui::{layout::Rect, style::Color, widgets::Paragraph, Frame};

use crate::data::{CategoricalSeries, HistogramSeries, HistogramSummary, PaletteColor, StackedSeries};
use crate::error::DashError;

/// Which axes draw gridlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gridlines {
    pub category: bool,
    pub value: bool,
}

/// Where a chart's legend goes, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPosition {
    None,
    Right,
}

/// Fixed presentation policy for one chart kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartStyle {
    pub gridlines: Gridlines,
    pub legend: LegendPosition,
    pub stacked: bool,
    /// Size to whatever area the surface has this frame.
    pub responsive: bool,
    pub show_title: bool,
}

pub const HISTOGRAM_STYLE: ChartStyle = ChartStyle {
    gridlines: Gridlines {
        category: false,
        value: false,
    },
    legend: LegendPosition::None,
    stacked: false,
    responsive: true,
    show_title: false,
};

pub const PIE_STYLE: ChartStyle = ChartStyle {
    gridlines: Gridlines {
        category: false,
        value: false,
    },
    legend: LegendPosition::None,
    stacked: false,
    responsive: true,
    show_title: false,
};

pub const STACKED_STYLE: ChartStyle = ChartStyle {
    gridlines: Gridlines {
        category: false,
        value: true,
    },
    legend: LegendPosition::Right,
    stacked: true,
    responsive: true,
    show_title: false,
};

/// Histogram bar fill and border color.
pub const HISTOGRAM_COLOR: PaletteColor = PaletteColor::Blue;

/// Gap between histogram bars, in cells.
pub const BORDER_WIDTH: u16 = 1;

/// Terminal color for a palette entry.
pub fn palette_color(color: PaletteColor) -> Color {
    match color {
        PaletteColor::Red => Color::Red,
        PaletteColor::Green => Color::Green,
        PaletteColor::Blue => Color::Blue,
        PaletteColor::Orange => Color::Rgb(255, 165, 0),
        PaletteColor::Purple => Color::Magenta,
        PaletteColor::Yellow => Color::Yellow,
    }
}

/// Named areas of the current frame that charts and text can bind to.
///
/// The UI rebuilds this every frame from its layout, so a surface only
/// exists while the view that owns it is on screen.
#[derive(Debug, Clone, Default)]
pub struct Surfaces {
    areas: HashMap<String, Rect>,
}

impl Surfaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, area: Rect) {
        self.areas.insert(id.into(), area);
    }

    /// Area bound to `id`, or [`DashError::SurfaceNotFound`].
    pub fn area(&self, id: &str) -> Result<Rect, DashError> {
        self.areas
            .get(id)
            .copied()
            .ok_or_else(|| DashError::SurfaceNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.areas.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

/// A chart bound to its area, ready to draw.
#[derive(Debug, Clone)]
pub enum RenderedChart {
    Histogram(HistogramChart),
    Pie(PieChart),
    Stacked(StackedBarChart),
}

impl RenderedChart {
    pub fn area(&self) -> Rect {
        match self {
            RenderedChart::Histogram(chart) => chart.area,
            RenderedChart::Pie(chart) => chart.area,
            RenderedChart::Stacked(chart) => chart.area,
        }
    }

    pub fn style(&self) -> &ChartStyle {
        match self {
            RenderedChart::Histogram(chart) => &chart.style,
            RenderedChart::Pie(chart) => &chart.style,
            RenderedChart::Stacked(chart) => &chart.style,
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let area = self.area();
        match self {
            RenderedChart::Histogram(chart) => frame.render_widget(chart, area),
            RenderedChart::Pie(chart) => frame.render_widget(chart, area),
            RenderedChart::Stacked(chart) => frame.render_widget(chart, area),
        }
    }
}

/// Bind a histogram to surface `id`.
///
/// `noaxis` hides tick labels and values for compact inline use.
pub fn build_histogram(
    surfaces: &Surfaces,
    id: &str,
    series: &HistogramSeries,
    noaxis: bool,
) -> Result<RenderedChart, DashError> {
    let area = surfaces.area(id)?;
    Ok(RenderedChart::Histogram(HistogramChart::new(area, series, noaxis)))
}

/// Bind a pie chart to surface `id`.
pub fn build_pie(
    surfaces: &Surfaces,
    id: &str,
    series: &CategoricalSeries,
) -> Result<RenderedChart, DashError> {
    let area = surfaces.area(id)?;
    Ok(RenderedChart::Pie(PieChart::new(area, series)))
}

/// Bind a stacked time-series bar chart to surface `id`.
pub fn build_stacked(
    surfaces: &Surfaces,
    id: &str,
    series: &StackedSeries,
) -> Result<RenderedChart, DashError> {
    let area = surfaces.area(id)?;
    Ok(RenderedChart::Stacked(StackedBarChart::new(area, series)))
}

/// Text placed in one display slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSlot {
    pub area: Rect,
    pub text: String,
}

impl TextSlot {
    pub fn render(&self, frame: &mut Frame) {
        frame.render_widget(Paragraph::new(self.text.as_str()), self.area);
    }
}

/// Slot ids for a histogram's min/avg/max text.
pub fn summary_slot_ids(id: &str) -> [String; 3] {
    [
        format!("{}-min", id),
        format!("{}-avg", id),
        format!("{}-max", id),
    ]
}

/// Place a histogram summary into the `<id>-min`, `<id>-avg` and `<id>-max`
/// slots.
///
/// Kept apart from [`build_histogram`] so formatting never depends on what
/// the current layout happens to contain.
pub fn display_summary(
    surfaces: &Surfaces,
    id: &str,
    summary: &HistogramSummary,
) -> Result<[TextSlot; 3], DashError> {
    let [min_id, avg_id, max_id] = summary_slot_ids(id);
    Ok([
        TextSlot {
            area: surfaces.area(&min_id)?,
            text: format!("min {}", summary.min),
        },
        TextSlot {
            area: surfaces.area(&avg_id)?,
            text: format!("avg {}", summary.avg),
        },
        TextSlot {
            area: surfaces.area(&max_id)?,
            text: format!("max {}", summary.max),
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{
        normalize_categorical, normalize_histogram, normalize_stacked, HistogramStat, NamedValue,
        TimeSeries,
    };

    fn surfaces() -> Surfaces {
        let mut surfaces = Surfaces::new();
        surfaces.insert("decoder", Rect::new(0, 0, 44, 8));
        surfaces.insert("decoder-min", Rect::new(0, 8, 14, 1));
        surfaces.insert("decoder-avg", Rect::new(15, 8, 14, 1));
        surfaces.insert("decoder-max", Rect::new(30, 8, 14, 1));
        surfaces.insert("lora", Rect::new(0, 10, 20, 10));
        surfaces.insert("gateways", Rect::new(20, 10, 80, 12));
        surfaces
    }

    fn histogram() -> HistogramSeries {
        normalize_histogram(&[1; 22], &HistogramStat::default()).unwrap()
    }

    #[test]
    fn unknown_surface_is_reported() {
        let result = build_histogram(&surfaces(), "nowhere", &histogram(), false);
        assert!(matches!(result, Err(DashError::SurfaceNotFound(ref id)) if id == "nowhere"));
    }

    #[test]
    fn builders_bind_to_surface_area() {
        let surfaces = surfaces();

        let chart = build_histogram(&surfaces, "decoder", &histogram(), true).unwrap();
        assert_eq!(chart.area(), Rect::new(0, 0, 44, 8));
        assert_eq!(chart.style(), &HISTOGRAM_STYLE);

        let pie = normalize_categorical(&[NamedValue::new("a", 1.0)]);
        let chart = build_pie(&surfaces, "lora", &pie).unwrap();
        assert_eq!(chart.style().legend, LegendPosition::None);

        let stacked = normalize_stacked(&[TimeSeries::new("created", vec![1; 61])]);
        let chart = build_stacked(&surfaces, "gateways", &stacked).unwrap();
        assert!(chart.style().stacked);
        assert_eq!(chart.style().legend, LegendPosition::Right);
        assert!(!chart.style().gridlines.category);
    }

    #[test]
    fn summary_goes_to_three_slots() {
        let summary = HistogramSummary {
            min: "1.000us".to_string(),
            avg: "2.000ms".to_string(),
            max: "3.000s".to_string(),
        };
        let slots = display_summary(&surfaces(), "decoder", &summary).unwrap();

        assert_eq!(slots[0].text, "min 1.000us");
        assert_eq!(slots[1].area, Rect::new(15, 8, 14, 1));
        assert_eq!(slots[2].text, "max 3.000s");
    }

    #[test]
    fn summary_without_slots_fails() {
        let summary = histogram().summary;
        assert!(matches!(
            display_summary(&surfaces(), "lora", &summary),
            Err(DashError::SurfaceNotFound(ref id)) if id == "lora-min"
        ));
    }

    #[test]
    fn palette_maps_to_terminal_colors() {
        assert_eq!(palette_color(PaletteColor::Blue), Color::Blue);
        assert_eq!(palette_color(PaletteColor::Purple), Color::Magenta);
    }
}
