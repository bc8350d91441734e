use std::panic;
use std::path::{Path, PathBuf};

use anyhow::Result;
use cluster_view::{ChartBackend, ChartError, ChartKind, ChartSlot, ChartSpec};
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::{debug, info};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrittenChart {
    pub slot: ChartSlot,
    pub path: PathBuf,
    pub title: String,
}

/// Writes each constructed chart to `<dir>/<slot>.<ext>`; a live instance is
/// the file most recently written for its slot.
pub struct PlotBackend {
    target: Option<(PathBuf, ImageFormat)>,
    live: Vec<WrittenChart>,
}

impl PlotBackend {
    pub fn new(dir: &Path, format: ImageFormat) -> Self {
        Self {
            target: Some((dir.to_path_buf(), format)),
            live: Vec::new(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            target: None,
            live: Vec::new(),
        }
    }

    pub fn written(&self) -> Vec<WrittenChart> {
        self.live.clone()
    }
}

impl ChartBackend for PlotBackend {
    type Handle = Option<ChartSlot>;

    fn construct(&mut self, slot: ChartSlot, spec: &ChartSpec) -> Result<Self::Handle, ChartError> {
        let Some((dir, format)) = self.target.as_ref() else {
            debug!(slot = slot.name(), "plotting disabled");
            return Ok(None);
        };
        let path = dir.join(format!("{}.{}", slot.name(), format.extension()));
        render_guard(spec, &path, *format).map_err(ChartError::Backend)?;
        info!("Chart written to {}", path.display());
        self.live.push(WrittenChart {
            slot,
            path,
            title: spec.title.clone(),
        });
        Ok(Some(slot))
    }

    fn destroy(&mut self, handle: Self::Handle) {
        if let Some(slot) = handle {
            self.live.retain(|c| c.slot != slot);
        }
    }
}

fn render_guard(spec: &ChartSpec, path: &Path, format: ImageFormat) -> Result<(), String> {
    let render = || -> Result<()> {
        match format {
            ImageFormat::Png => {
                let root = BitMapBackend::new(path, (1000, 640)).into_drawing_area();
                draw_spec(root, spec)
            }
            ImageFormat::Svg => {
                let root = SVGBackend::new(path, (1000, 640)).into_drawing_area();
                draw_spec(root, spec)
            }
        }
    };

    panic::catch_unwind(panic::AssertUnwindSafe(render))
        .map_err(|_| "plotting backend panicked".to_string())?
        .map_err(|e| format!("plotting error: {e}"))
}

fn draw_spec<DB>(area: DrawingArea<DB, Shift>, spec: &ChartSpec) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    area.fill(&WHITE)?;
    let (x_range, y_range) = bounds(spec);
    let mut chart = ChartBuilder::on(&area)
        .caption(&spec.title, ("sans-serif", 24))
        .margin(25)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)?;

    let decimals = if spec.kind == ChartKind::Line { 0 } else { 2 };
    let x_fmt = move |v: &f64| format!("{:.*}", decimals, v);
    let y_fmt = |v: &f64| format!("{:.2}", v);
    chart
        .configure_mesh()
        .light_line_style(&TRANSPARENT)
        .x_desc(spec.x_title.as_str())
        .y_desc(spec.y_title.as_str())
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .draw()?;

    for series in &spec.series {
        let border = parse_color(&series.border_color);
        let coords: Vec<(f64, f64)> = series.points.iter().map(|p| (p.x, p.y)).collect();
        match spec.kind {
            ChartKind::Line => {
                let style = ShapeStyle {
                    color: border,
                    filled: false,
                    stroke_width: series.border_width,
                };
                chart.draw_series(LineSeries::new(coords.iter().copied(), style))?;
                let marker = series
                    .point_background_color
                    .as_deref()
                    .map(parse_color)
                    .unwrap_or(border);
                chart.draw_series(
                    coords
                        .iter()
                        .map(|&c| Circle::new(c, series.point_radius as i32, marker.filled())),
                )?;
            }
            ChartKind::Scatter => {
                let fill = parse_color(&series.background_color);
                chart
                    .draw_series(coords.iter().map(|&c| {
                        Circle::new(c, series.point_radius as i32, fill.filled())
                    }))?
                    .label(series.label.as_str())
                    .legend(move |(x, y)| Circle::new((x, y), 5, border.filled()));
            }
        }
    }

    if spec.show_legend {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK.mix(0.3))
            .position(SeriesLabelPosition::UpperRight)
            .draw()?;
    }

    area.present()?;
    Ok(())
}

fn bounds(spec: &ChartSpec) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let mut xs = (f64::INFINITY, f64::NEG_INFINITY);
    let mut ys = (f64::INFINITY, f64::NEG_INFINITY);
    for p in spec.series.iter().flat_map(|s| s.points.iter()) {
        xs = (xs.0.min(p.x), xs.1.max(p.x));
        ys = (ys.0.min(p.y), ys.1.max(p.y));
    }
    (padded(xs), padded(ys))
}

fn padded((lo, hi): (f64, f64)) -> std::ops::Range<f64> {
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    (lo - pad)..(hi + pad)
}

/// Parses `#rrggbb`, `#rrggbbaa` and `rgba(r, g, b, a)`; unknown input is black.
pub fn parse_color(text: &str) -> RGBAColor {
    parse_hex(text)
        .or_else(|| parse_rgba(text))
        .unwrap_or(RGBAColor(0, 0, 0, 1.0))
}

fn parse_hex(text: &str) -> Option<RGBAColor> {
    let hex = text.strip_prefix('#')?;
    if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let alpha = if hex.len() == 8 {
        byte(6)? as f64 / 255.0
    } else {
        1.0
    };
    Some(RGBAColor(byte(0)?, byte(2)?, byte(4)?, alpha))
}

fn parse_rgba(text: &str) -> Option<RGBAColor> {
    let inner = text.strip_prefix("rgba(")?.strip_suffix(')')?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return None;
    }
    Some(RGBAColor(
        parts[0].parse().ok()?,
        parts[1].parse().ok()?,
        parts[2].parse().ok()?,
        parts[3].parse().ok()?,
    ))
}
