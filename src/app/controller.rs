use super::state::{reduce, Layout, LayoutEvent};
use crate::plotting::{
    export_png, render_svg, ChartStyle, ChartTheme, PlotError, SpiralLayout,
};

/// Operations a viewer control can drive.
///
/// Controls receive a `&mut dyn LayoutCommands` rather than reaching into
/// the viewer's state.
pub trait LayoutCommands {
    fn move_by(&mut self, dx: f64, dy: f64);
    fn resize(&mut self, width: f64, height: f64);
    fn zoom_in(&mut self);
    fn zoom_out(&mut self);
    /// Fit the whole scene into the window
    fn fit(&mut self);
    /// PNG snapshot of the scene
    fn export_image(&self) -> Result<Vec<u8>, PlotError>;
}

/// Owns the viewport and the scene it shows
pub struct LayoutController {
    layout: Layout,
    scene: SpiralLayout,
    theme: ChartTheme,
    style: ChartStyle,
}

impl LayoutController {
    pub fn new(width: f64, height: f64, scene: SpiralLayout) -> Self {
        Self {
            layout: Layout::new(width, height),
            scene,
            theme: ChartTheme::default(),
            style: ChartStyle::default(),
        }
    }

    pub fn with_style(mut self, theme: ChartTheme, style: ChartStyle) -> Self {
        self.theme = theme;
        self.style = style;
        self
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn scene(&self) -> &SpiralLayout {
        &self.scene
    }

    /// Replace the scene, keeping the viewport
    pub fn set_scene(&mut self, scene: SpiralLayout) {
        self.scene = scene;
    }

    pub fn dispatch(&mut self, event: LayoutEvent) {
        self.layout = reduce(self.layout, event);
    }

    /// Render the current viewport as SVG
    pub fn render(&self) -> Result<String, PlotError> {
        render_svg(
            &self.scene,
            &self.theme,
            &self.style,
            self.layout.pixel_size(),
            self.layout.projection(),
        )
    }
}

impl LayoutCommands for LayoutController {
    fn move_by(&mut self, dx: f64, dy: f64) {
        self.dispatch(LayoutEvent::Move { dx, dy });
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.dispatch(LayoutEvent::Resize { width, height });
    }

    fn zoom_in(&mut self) {
        self.dispatch(LayoutEvent::ZoomIn);
    }

    fn zoom_out(&mut self) {
        self.dispatch(LayoutEvent::ZoomOut);
    }

    fn fit(&mut self) {
        match self.scene.bounds() {
            Some(bounds) => self.dispatch(LayoutEvent::Fit(bounds)),
            None => log::debug!("Nothing to fit, scene is empty"),
        }
    }

    fn export_image(&self) -> Result<Vec<u8>, PlotError> {
        export_png(&self.scene, &self.theme, &self.style)
    }
}
