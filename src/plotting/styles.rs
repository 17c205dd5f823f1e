use plotters::style::RGBColor;

pub const DEFAULT_STARTING_RADIUS: f64 = 40.0;
pub const DEFAULT_SPACING: f64 = 10.0;
pub const DEFAULT_BAR_WIDTH: f64 = 5.0;
pub const DEFAULT_VALUE_LIMIT: f64 = 40.0;
pub const DEFAULT_MIN_RADIUS: f64 = 10.0;
pub const DEFAULT_MAX_RADIUS: f64 = 10.0;

pub const STEEL_BLUE: RGBColor = RGBColor(70, 130, 180);
pub const GREY: RGBColor = RGBColor(128, 128, 128);

/// Raster export resolution relative to the 96 DPI scene
pub const EXPORT_SCALE: f64 = 300.0 / 96.0;

/// Chart theme configuration
#[derive(Clone, Copy, Debug)]
pub struct ChartTheme {
    pub background_color: plotters::style::RGBAColor,
    pub spiral_color: RGBColor,
    pub mark_color: RGBColor,
    pub label_color: RGBColor,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            background_color: plotters::style::RGBAColor(255, 255, 255, 1.0),
            spiral_color: STEEL_BLUE,
            mark_color: STEEL_BLUE,
            label_color: GREY,
        }
    }
}

/// Chart style configuration
#[derive(Clone, Copy, Debug)]
pub struct ChartStyle {
    pub line_width: u32,
    pub font_size: u32,
    /// Label offset from the curve, perpendicular to the reading direction
    pub label_dy: f64,
    pub margin: u32,
    pub show_labels: bool,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            line_width: 1,
            font_size: 10,
            label_dy: 10.0,
            margin: 10,
            show_labels: true,
        }
    }
}

/// Turbo sequential color scale, `t` in `[0, 1]`.
///
/// Polynomial fit of Google's Turbo colormap.
pub fn turbo(t: f64) -> RGBColor {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;

    let r = 34.61 + t * (1172.33 - t * (10793.56 - t * (33300.12 - t * (38394.49 - t * 14825.05))));
    let g = 23.31 + t * (557.33 + t * (1225.33 - t * (3574.96 - t * (1073.77 + t * 707.56))));
    let b = 27.2 + t * (3211.1 - t * (15327.97 - t * (27814.0 - t * (22569.18 - t * 6838.66))));

    RGBColor(channel(r), channel(g), channel(b))
}
