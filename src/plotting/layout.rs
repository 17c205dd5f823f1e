//! # Spiral Layout
//!
//! Places each day of a [`DailySeries`] on a spiral. Index order fixes the shape
//! of the curve: point `i` sits at radius `startingRadius + sqrt(i + 1) * spacing`
//! and angle `i * asin(1 / sqrt(i + 2))`. Dates are then positioned along that
//! curve by time, so a day's distance along the curve is proportional to its
//! offset from the first date.

use chrono::NaiveDate;
use plotters::style::RGBColor;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::spiral::{Bounds, Point, SpiralCurve};
use super::styles::{self, turbo};
use crate::types::{DailySeries, DATE_FORMAT};

/// Mark encoding for each day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Bar height follows the count
    #[default]
    Bar,
    /// Fixed-height bar, color follows the count
    HeatBar,
    /// Circle radius follows the count
    Circle,
    /// Circle radius and color follow the count
    HeatCircle,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::Bar,
        Variant::HeatBar,
        Variant::Circle,
        Variant::HeatCircle,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Variant::Bar => "bar",
            Variant::HeatBar => "heatbar",
            Variant::Circle => "circle",
            Variant::HeatCircle => "heatcircle",
        }
    }

    /// Shape, size range and color mode selected by this variant
    pub fn encoding(&self, config: &ChartConfig) -> Encoding {
        match self {
            Variant::Bar => Encoding {
                shape: ShapeKind::Bar,
                extent: Extent::Scaled {
                    min: 0.0,
                    max: config.spacing * 5.0,
                },
                heat: false,
            },
            Variant::HeatBar => Encoding {
                shape: ShapeKind::Bar,
                extent: Extent::Fixed(config.spacing * 4.0),
                heat: true,
            },
            Variant::Circle => Encoding {
                shape: ShapeKind::Circle,
                extent: Extent::Scaled {
                    min: 0.0,
                    max: config.max_radius,
                },
                heat: false,
            },
            Variant::HeatCircle => Encoding {
                shape: ShapeKind::Circle,
                extent: Extent::Scaled {
                    min: config.min_radius,
                    max: config.max_radius,
                },
                heat: true,
            },
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|variant| variant.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown chart variant '{}'", s))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Bar,
    Circle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Extent {
    /// Linear in the clamped value between `min` and `max`
    Scaled { min: f64, max: f64 },
    Fixed(f64),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Encoding {
    pub shape: ShapeKind,
    pub extent: Extent,
    pub heat: bool,
}

/// Caller-supplied chart options; any field left out takes its default.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    #[serde(alias = "type")]
    pub variant: Option<Variant>,
    pub starting_radius: Option<f64>,
    pub spacing: Option<f64>,
    pub bar_width: Option<f64>,
    #[serde(alias = "limit")]
    pub value_limit: Option<f64>,
    pub min_radius: Option<f64>,
    pub max_radius: Option<f64>,
}

impl ChartOptions {
    pub fn resolve(&self) -> ChartConfig {
        let defaults = ChartConfig::default();
        ChartConfig {
            variant: self.variant.unwrap_or(defaults.variant),
            starting_radius: self.starting_radius.unwrap_or(defaults.starting_radius),
            spacing: self.spacing.unwrap_or(defaults.spacing),
            bar_width: self.bar_width.unwrap_or(defaults.bar_width),
            value_limit: self.value_limit.unwrap_or(defaults.value_limit),
            min_radius: self.min_radius.unwrap_or(defaults.min_radius),
            max_radius: self.max_radius.unwrap_or(defaults.max_radius),
        }
    }
}

/// Fully resolved chart configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartConfig {
    pub variant: Variant,
    pub starting_radius: f64,
    pub spacing: f64,
    pub bar_width: f64,
    pub value_limit: f64,
    pub min_radius: f64,
    pub max_radius: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            starting_radius: styles::DEFAULT_STARTING_RADIUS,
            spacing: styles::DEFAULT_SPACING,
            bar_width: styles::DEFAULT_BAR_WIDTH,
            value_limit: styles::DEFAULT_VALUE_LIMIT,
            min_radius: styles::DEFAULT_MIN_RADIUS,
            max_radius: styles::DEFAULT_MAX_RADIUS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarkShape {
    /// Rectangle anchored at the point, standing off the curve
    Bar { width: f64, height: f64 },
    Circle { radius: f64 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mark {
    pub shape: MarkShape,
    /// `None` uses the theme's mark color
    pub fill: Option<RGBColor>,
    /// Tooltip text, `"<date>: <count>"`
    pub title: String,
}

impl Mark {
    /// Size along the mark's visual axis (bar height or circle radius)
    pub fn size(&self) -> f64 {
        match self.shape {
            MarkShape::Bar { height, .. } => height,
            MarkShape::Circle { radius } => radius,
        }
    }
}

/// One day placed on the spiral
#[derive(Clone, Debug, PartialEq)]
pub struct SpiralPoint {
    pub date: NaiveDate,
    pub value: usize,
    pub distance_along_curve: f64,
    pub x: f64,
    pub y: f64,
    /// Rotation applied to bar marks about `(x, y)`; zero for circles
    pub rotation_degrees: f64,
    pub mark: Mark,
}

impl SpiralPoint {
    /// Extent of the point and its mark
    pub fn bounds(&self) -> Bounds {
        let center = Point::new(self.x, self.y);
        match self.mark.shape {
            MarkShape::Circle { radius } => Bounds::around(center, radius),
            MarkShape::Bar { width, height } => Bounds::around(center, width.hypot(height)),
        }
    }
}

/// Month label anchored on the curve
#[derive(Clone, Debug, PartialEq)]
pub struct MonthLabel {
    pub text: String,
    pub date: NaiveDate,
    pub distance_along_curve: f64,
    /// Anchor as a percentage of the curve's total length
    pub offset_percent: f64,
    pub x: f64,
    pub y: f64,
}

/// Output of one layout pass
#[derive(Clone, Debug)]
pub struct SpiralLayout {
    pub config: ChartConfig,
    /// `None` for an empty series; nothing should be rendered
    pub curve: Option<SpiralCurve>,
    pub points: Vec<SpiralPoint>,
    pub labels: Vec<MonthLabel>,
}

impl SpiralLayout {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn total_length(&self) -> f64 {
        self.curve
            .as_ref()
            .map(SpiralCurve::total_length)
            .unwrap_or(0.0)
    }

    /// Extent of the curve and every mark
    pub fn bounds(&self) -> Option<Bounds> {
        let curve = self.curve.as_ref().and_then(SpiralCurve::bounds);
        self.points
            .iter()
            .map(SpiralPoint::bounds)
            .chain(curve)
            .reduce(Bounds::union)
    }
}

/// Lays out daily series along a spiral for one chart configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpiralLayoutEngine {
    config: ChartConfig,
}

impl SpiralLayoutEngine {
    pub fn new(config: ChartConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn layout(&self, series: &DailySeries) -> SpiralLayout {
        let config = self.config;
        let (first, last) = match series.first_date().zip(series.last_date()) {
            Some(bounds) => bounds,
            None => {
                return SpiralLayout {
                    config,
                    curve: None,
                    points: Vec::new(),
                    labels: Vec::new(),
                }
            }
        };

        let polar: Vec<(f64, f64)> = (0..series.len())
            .map(|i| (spiral_angle(i), spiral_radius(&config, i)))
            .collect();
        let curve = SpiralCurve::radial(&polar);
        let total = curve.total_length();

        let encoding = config.variant.encoding(&config);
        let scale = ValueScale::new(series, config.value_limit);

        let points: Vec<SpiralPoint> = series
            .iter()
            .map(|(date, value)| {
                let distance = distance_along_curve(date, first, last, total);
                let position = curve.point_at_length(distance);
                let rotation_degrees = match encoding.shape {
                    ShapeKind::Bar => {
                        let reference = curve.point_at_length(distance - config.bar_width);
                        reference.y.atan2(reference.x).to_degrees() - 90.0
                    }
                    ShapeKind::Circle => 0.0,
                };

                SpiralPoint {
                    date,
                    value,
                    distance_along_curve: distance,
                    x: position.x,
                    y: position.y,
                    rotation_degrees,
                    mark: scale.mark(&encoding, &config, date, value),
                }
            })
            .collect();

        let labels = month_labels(&points, total);

        log::debug!(
            "Laid out {} days ({} labels) along {:.1} units of spiral",
            points.len(),
            labels.len(),
            total
        );

        SpiralLayout {
            config,
            curve: Some(curve),
            points,
            labels,
        }
    }
}

fn spiral_radius(config: &ChartConfig, index: usize) -> f64 {
    config.starting_radius + ((index + 1) as f64).sqrt() * config.spacing
}

fn spiral_angle(index: usize) -> f64 {
    index as f64 * (1.0 / ((index + 2) as f64).sqrt()).asin()
}

/// Position of `date` between `first` and `last`, scaled to the curve length
pub fn distance_along_curve(date: NaiveDate, first: NaiveDate, last: NaiveDate, total: f64) -> f64 {
    let span = (last - first).num_days();
    if span <= 0 || total <= 0.0 {
        return 0.0;
    }
    (date - first).num_days() as f64 / span as f64 * total
}

/// Linear map from clamped values onto a mark's size and heat
struct ValueScale {
    limit: f64,
    domain_max: f64,
}

impl ValueScale {
    fn new(series: &DailySeries, limit: f64) -> Self {
        let domain_max = series
            .iter()
            .map(|(_, value)| (value as f64).min(limit))
            .fold(0.0, f64::max);
        Self { limit, domain_max }
    }

    /// Clamped value as a fraction of the domain
    fn fraction(&self, value: usize) -> f64 {
        if self.domain_max <= 0.0 {
            return 0.0;
        }
        (value as f64).min(self.limit) / self.domain_max
    }

    fn mark(&self, encoding: &Encoding, config: &ChartConfig, date: NaiveDate, value: usize) -> Mark {
        let fraction = self.fraction(value);
        let size = match encoding.extent {
            Extent::Scaled { min, max } => min + (max - min) * fraction,
            Extent::Fixed(size) => size,
        };
        let shape = match encoding.shape {
            ShapeKind::Bar => MarkShape::Bar {
                width: config.bar_width,
                height: size,
            },
            ShapeKind::Circle => MarkShape::Circle { radius: size },
        };

        Mark {
            shape,
            fill: encoding.heat.then(|| turbo(fraction)),
            title: format!("{}: {}", date.format(DATE_FORMAT), value),
        }
    }
}

/// First point of each distinct "Mon YYYY" label, in date order
pub fn month_labels(points: &[SpiralPoint], total: f64) -> Vec<MonthLabel> {
    let mut seen = HashSet::new();
    points
        .iter()
        .filter_map(|point| {
            let text = point.date.format("%b %Y").to_string();
            if !seen.insert(text.clone()) {
                return None;
            }
            let offset_percent = if total > 0.0 {
                point.distance_along_curve / total * 100.0
            } else {
                0.0
            };
            Some(MonthLabel {
                text,
                date: point.date,
                distance_along_curve: point.distance_along_curve,
                offset_percent,
                x: point.x,
                y: point.y,
            })
        })
        .collect()
}
