use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::error::Error;
use std::io::Cursor;

use super::layout::{MarkShape, SpiralLayout, SpiralPoint};
use super::styles::{ChartStyle, ChartTheme, EXPORT_SCALE};

pub type PlotError = Box<dyn Error + Send + Sync>;

/// Maps scene coordinates to backend pixels: `(p + translate) * scale`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl Projection {
    pub fn new(translate_x: f64, translate_y: f64, scale: f64) -> Self {
        Self {
            translate_x,
            translate_y,
            scale,
        }
    }

    fn apply(&self, x: f64, y: f64) -> (i32, i32) {
        (
            ((x + self.translate_x) * self.scale).round() as i32,
            ((y + self.translate_y) * self.scale).round() as i32,
        )
    }

    fn length(&self, value: f64) -> f64 {
        value * self.scale
    }
}

/// Draw the spiral, its marks and month labels onto `area`
pub fn draw_scene<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    layout: &SpiralLayout,
    theme: &ChartTheme,
    style: &ChartStyle,
    projection: Projection,
) -> Result<(), PlotError>
where
    DB::ErrorType: 'static,
{
    area.fill(&theme.background_color)?;

    let curve = match &layout.curve {
        Some(curve) => curve,
        None => return Ok(()),
    };

    let path: Vec<(i32, i32)> = curve
        .path()
        .iter()
        .map(|point| projection.apply(point.x, point.y))
        .collect();
    area.draw(&PathElement::new(
        path,
        theme.spiral_color.stroke_width(style.line_width),
    ))?;

    for point in &layout.points {
        draw_mark(area, point, theme, projection)?;
    }

    if style.show_labels {
        let font_size = projection.length(style.font_size as f64);
        for label in &layout.labels {
            area.draw(&Text::new(
                label.text.clone(),
                projection.apply(label.x, label.y + style.label_dy),
                ("sans-serif", font_size)
                    .into_font()
                    .color(&theme.label_color),
            ))?;
        }
    }

    Ok(())
}

fn draw_mark<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    point: &SpiralPoint,
    theme: &ChartTheme,
    projection: Projection,
) -> Result<(), PlotError>
where
    DB::ErrorType: 'static,
{
    let fill = point.mark.fill.unwrap_or(theme.mark_color).filled();

    match point.mark.shape {
        MarkShape::Bar { width, height } => {
            let corners = bar_corners(point, width, height)
                .iter()
                .map(|&(x, y)| projection.apply(x, y))
                .collect::<Vec<_>>();
            area.draw(&Polygon::new(corners, fill))?;
        }
        MarkShape::Circle { radius } => {
            let center = projection.apply(point.x, point.y);
            let radius = projection.length(radius).round() as i32;
            area.draw(&Circle::new(center, radius, fill))?;
        }
    }

    Ok(())
}

/// Corners of a `width` x `height` bar anchored at the point, rotated about it
pub fn bar_corners(point: &SpiralPoint, width: f64, height: f64) -> [(f64, f64); 4] {
    let (sin, cos) = point.rotation_degrees.to_radians().sin_cos();
    let rotate = |dx: f64, dy: f64| (point.x + dx * cos - dy * sin, point.y + dx * sin + dy * cos);
    [
        rotate(0.0, 0.0),
        rotate(width, 0.0),
        rotate(width, height),
        rotate(0.0, height),
    ]
}

/// Render the scene as an SVG document of `size` pixels
pub fn render_svg(
    layout: &SpiralLayout,
    theme: &ChartTheme,
    style: &ChartStyle,
    size: (u32, u32),
    projection: Projection,
) -> Result<String, PlotError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        draw_scene(&root, layout, theme, style, projection)?;
        root.present()?;
    }
    Ok(svg)
}

/// Canvas size and projection that frame the whole scene at `scale`
pub fn fit_to_scene(
    layout: &SpiralLayout,
    margin: f64,
    scale: f64,
) -> Result<((u32, u32), Projection), PlotError> {
    let bounds = layout
        .bounds()
        .ok_or_else(|| PlotError::from("nothing to render: the series is empty"))?;

    let width = ((bounds.width() + 2.0 * margin) * scale).ceil().max(1.0) as u32;
    let height = ((bounds.height() + 2.0 * margin) * scale).ceil().max(1.0) as u32;
    let projection = Projection::new(margin - bounds.min_x, margin - bounds.min_y, scale);

    Ok(((width, height), projection))
}

/// Rasterize the scene, cropped to its bounds, as PNG bytes at 300 DPI
pub fn export_png(
    layout: &SpiralLayout,
    theme: &ChartTheme,
    style: &ChartStyle,
) -> Result<Vec<u8>, PlotError> {
    let ((width, height), projection) = fit_to_scene(layout, style.margin as f64, EXPORT_SCALE)?;

    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        draw_scene(&root, layout, theme, style, projection)?;
        root.present()?;
    }

    let image = RgbImage::from_raw(width, height, pixels)
        .ok_or_else(|| PlotError::from("pixel buffer does not match image size"))?;
    let mut png = Cursor::new(Vec::new());
    image.write_to(&mut png, ImageFormat::Png)?;

    log::info!("Exported {}x{} PNG ({} bytes)", width, height, png.get_ref().len());
    Ok(png.into_inner())
}

/// Render the scene cropped to its bounds as SVG at 1:1 scale
pub fn export_svg(
    layout: &SpiralLayout,
    theme: &ChartTheme,
    style: &ChartStyle,
) -> Result<String, PlotError> {
    let (size, projection) = fit_to_scene(layout, style.margin as f64, 1.0)?;
    render_svg(layout, theme, style, size, projection)
}
