//! PNG chart backend built on plotters' bitmap backend.

use super::{Chart, ChartError, ChartRenderer};
use chrono::NaiveDate;
use plotters::prelude::*;
use std::path::Path;

// matplotlib's default cycle, so charts look like the usual finance notebooks
const TRACE_COLORS: [RGBColor; 4] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
];

/// Renders charts as PNG images (1000×600 by default, i.e. 10×6 in at 100 dpi).
#[derive(Debug, Clone, Copy)]
pub struct PngChartRenderer {
    width: u32,
    height: u32,
}

impl Default for PngChartRenderer {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
        }
    }
}

impl PngChartRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn x_range(dates: &[NaiveDate]) -> std::ops::Range<NaiveDate> {
        let first = dates[0];
        let last = dates[dates.len() - 1];
        if last > first {
            first..last
        } else {
            first..first + chrono::Duration::days(1)
        }
    }

    fn y_range(lo: f64, hi: f64) -> std::ops::Range<f64> {
        let pad = ((hi - lo) * 0.05).max(lo.abs() * 0.01).max(0.01);
        (lo - pad)..(hi + pad)
    }
}

fn render_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Render(e.to_string())
}

impl ChartRenderer for PngChartRenderer {
    fn render_chart(&self, chart: &Chart, path: &Path) -> Result<(), ChartError> {
        chart.validate()?;
        let (lo, hi) = chart
            .value_range()
            .ok_or_else(|| ChartError::NoData(chart.title.clone()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ChartError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        // The backend lives only for this call; dropping it frees the pixel buffer.
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(70)
            .build_cartesian_2d(Self::x_range(&chart.dates), Self::y_range(lo, hi))
            .map_err(render_err)?;

        ctx.configure_mesh()
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .x_labels(8)
            .x_label_formatter(&|d: &NaiveDate| d.format("%Y-%m-%d").to_string())
            .y_label_formatter(&|v: &f64| format!("{v:.2}"))
            .draw()
            .map_err(render_err)?;

        for (idx, trace) in chart.traces.iter().enumerate() {
            let color = TRACE_COLORS[idx % TRACE_COLORS.len()];
            let points = chart
                .dates
                .iter()
                .zip(&trace.values)
                .filter_map(|(d, v)| v.map(|v| (*d, v)));
            ctx.draw_series(LineSeries::new(points, color.stroke_width(2)))
                .map_err(render_err)?
                .label(trace.label.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
        }

        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
        Ok(())
    }
}
