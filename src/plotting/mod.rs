pub mod chart;
pub mod layout;
pub mod spiral;
pub mod styles;


pub use chart::{export_png, export_svg, render_svg, PlotError, Projection};
pub use layout::{
    ChartConfig, ChartOptions, MarkShape, MonthLabel, SpiralLayout, SpiralLayoutEngine,
    SpiralPoint, Variant,
};
pub use spiral::{Bounds, Point, SpiralCurve};
pub use styles::{ChartStyle, ChartTheme};
