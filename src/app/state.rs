use crate::plotting::{Bounds, Point, Projection};

pub const ZOOM_STEP: f64 = 0.1;
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 2.0;

/// Viewport over the spiral scene.
///
/// `zoom` scales the visible window: below 1 shows less of the scene (magnified),
/// above 1 shows more of it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    /// Where the scene origin (the spiral's center) lands in the window
    pub center: Point,
    pub zoom: f64,
}

/// Visible window in scene-plus-center coordinates, as for an SVG `viewBox`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayoutEvent {
    Move { dx: f64, dy: f64 },
    Resize { width: f64, height: f64 },
    ZoomIn,
    ZoomOut,
    /// Recenter and zoom so the given scene extent fits the window
    Fit(Bounds),
}

impl Layout {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            center: Point::new(width / 2.0, height / 2.0),
            zoom: 1.0,
        }
    }

    pub fn view_box(&self) -> ViewBox {
        let width = self.width * self.zoom;
        let height = self.height * self.zoom;
        ViewBox {
            x: (self.width - width) / 2.0,
            y: (self.height - height) / 2.0,
            width,
            height,
        }
    }

    /// Scene-to-window mapping for this viewport
    pub fn projection(&self) -> Projection {
        let view = self.view_box();
        Projection::new(
            self.center.x - view.x,
            self.center.y - view.y,
            1.0 / self.zoom,
        )
    }

    /// Window size in whole pixels
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.width.round().max(1.0) as u32,
            self.height.round().max(1.0) as u32,
        )
    }
}

/// Apply one event to a layout, returning the new layout
pub fn reduce(layout: Layout, event: LayoutEvent) -> Layout {
    match event {
        LayoutEvent::Move { dx, dy } => Layout {
            center: Point::new(layout.center.x + dx, layout.center.y + dy),
            ..layout
        },
        LayoutEvent::Resize { width, height } => Layout {
            width,
            height,
            ..layout
        },
        LayoutEvent::ZoomIn => Layout {
            zoom: (layout.zoom - ZOOM_STEP).max(MIN_ZOOM),
            ..layout
        },
        LayoutEvent::ZoomOut => Layout {
            zoom: (layout.zoom + ZOOM_STEP).min(MAX_ZOOM),
            ..layout
        },
        LayoutEvent::Fit(bounds) => {
            let zoom = (bounds.width() / layout.width).max(bounds.height() / layout.height);
            Layout {
                center: Point::new(layout.width / 2.0, layout.height / 2.0),
                zoom: if zoom.is_finite() && zoom > 0.0 {
                    zoom
                } else {
                    layout.zoom
                },
                ..layout
            }
        }
    }
}
