//! Draggable boundary between the editor and preview panes.
//!
//! Independent of the session: it only reacts to pointer events.

use serde::{Deserialize, Serialize};

/// Pointer holding the drag capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerId(pub u32);

/// Width of the preview frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewViewport {
    #[default]
    Desktop,
    Mobile,
}

impl PreviewViewport {
    pub const MOBILE_WIDTH: f64 = 375.0;

    /// Frame width inside a preview pane of `pane_width` pixels
    pub fn frame_width(self, pane_width: f64) -> f64 {
        match self {
            PreviewViewport::Desktop => pane_width,
            PreviewViewport::Mobile => Self::MOBILE_WIDTH.min(pane_width),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitPane {
    container_left: f64,
    container_width: f64,
    /// Pixels from the container's left edge
    boundary: f64,
    min_ratio: f64,
    max_ratio: f64,
    capture: Option<PointerId>,
}

impl SplitPane {
    pub const DEFAULT_MIN_RATIO: f64 = 0.25;
    pub const DEFAULT_MAX_RATIO: f64 = 0.75;

    /// Container at `container_left` spanning `container_width` pixels, split
    /// down the middle
    pub fn new(container_left: f64, container_width: f64) -> Self {
        let width = container_width.max(0.0);
        Self {
            container_left,
            container_width: width,
            boundary: width * 0.5,
            min_ratio: Self::DEFAULT_MIN_RATIO,
            max_ratio: Self::DEFAULT_MAX_RATIO,
            capture: None,
        }
    }

    /// Override the allowed boundary range, as fractions of the width
    pub fn with_bounds(mut self, min_ratio: f64, max_ratio: f64) -> Self {
        let min = min_ratio.clamp(0.0, 1.0);
        let max = max_ratio.clamp(min, 1.0);
        self.min_ratio = min;
        self.max_ratio = max;
        self.boundary = self.clamp(self.boundary);
        self
    }

    pub fn boundary(&self) -> f64 {
        self.boundary
    }

    pub fn ratio(&self) -> f64 {
        if self.container_width == 0.0 {
            return 0.5;
        }
        self.boundary / self.container_width
    }

    pub fn editor_width(&self) -> f64 {
        self.boundary
    }

    pub fn preview_width(&self) -> f64 {
        self.container_width - self.boundary
    }

    pub fn is_dragging(&self) -> bool {
        self.capture.is_some()
    }

    pub fn begin_drag(&mut self, pointer: PointerId) {
        self.capture = Some(pointer);
    }

    /// Follow the pointer while dragging. Past either bound the boundary
    /// stays pinned to that bound. Returns whether the boundary moved.
    pub fn on_pointer_move(&mut self, client_x: f64) -> bool {
        if self.capture.is_none() || !client_x.is_finite() {
            return false;
        }

        let next = self.clamp(client_x - self.container_left);
        if next == self.boundary {
            return false;
        }
        self.boundary = next;
        true
    }

    /// Release the capture, returning the pointer that held it
    pub fn end_drag(&mut self) -> Option<PointerId> {
        self.capture.take()
    }

    /// Container moved or resized; the split keeps its proportion.
    pub fn resize_container(&mut self, container_left: f64, container_width: f64) {
        let ratio = self.ratio();
        self.container_left = container_left;
        self.container_width = container_width.max(0.0);
        self.boundary = self.clamp(self.container_width * ratio);
    }

    fn clamp(&self, offset: f64) -> f64 {
        let min = self.container_width * self.min_ratio;
        let max = self.container_width * self.max_ratio;
        offset.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dragging(width: f64) -> SplitPane {
        let mut pane = SplitPane::new(0.0, width);
        pane.begin_drag(PointerId(1));
        pane
    }

    #[test]
    fn test_starts_centered() {
        let pane = SplitPane::new(120.0, 1000.0);
        assert_eq!(pane.boundary(), 500.0);
        assert!(!pane.is_dragging());
    }

    #[test]
    fn test_drag_clamps_to_quarter_bounds() {
        let mut pane = dragging(1000.0);

        assert!(pane.on_pointer_move(100.0));
        assert_eq!(pane.boundary(), 250.0);

        assert!(pane.on_pointer_move(900.0));
        assert_eq!(pane.boundary(), 750.0);

        assert!(pane.on_pointer_move(500.0));
        assert_eq!(pane.boundary(), 500.0);
    }

    #[test]
    fn test_offset_is_relative_to_container() {
        let mut pane = SplitPane::new(200.0, 1000.0);
        pane.begin_drag(PointerId(7));

        pane.on_pointer_move(800.0);
        assert_eq!(pane.boundary(), 600.0);
        assert_eq!(pane.preview_width(), 400.0);
    }

    #[test]
    fn test_boundary_stops_at_bound() {
        let mut pane = dragging(1000.0);
        pane.on_pointer_move(260.0);
        assert_eq!(pane.boundary(), 260.0);

        assert!(pane.on_pointer_move(240.0));
        assert_eq!(pane.boundary(), 250.0);
        assert!(!pane.on_pointer_move(10.0));
        assert_eq!(pane.boundary(), 250.0);
    }

    #[test]
    fn test_moves_ignored_without_drag() {
        let mut pane = SplitPane::new(0.0, 1000.0);
        assert!(!pane.on_pointer_move(300.0));
        assert_eq!(pane.boundary(), 500.0);

        pane.begin_drag(PointerId(3));
        assert_eq!(pane.end_drag(), Some(PointerId(3)));
        assert!(!pane.on_pointer_move(300.0));
        assert_eq!(pane.end_drag(), None);
    }

    #[test]
    fn test_resize_keeps_ratio() {
        let mut pane = dragging(1000.0);
        pane.on_pointer_move(300.0);

        pane.resize_container(0.0, 2000.0);
        assert_eq!(pane.boundary(), 600.0);
        assert_eq!(pane.ratio(), 0.3);
    }

    #[test]
    fn test_custom_bounds() {
        let mut pane = SplitPane::new(0.0, 1000.0).with_bounds(0.4, 0.6);
        pane.begin_drag(PointerId(1));
        pane.on_pointer_move(0.0);
        assert_eq!(pane.boundary(), 400.0);
    }

    #[test]
    fn test_mobile_viewport_width() {
        assert_eq!(PreviewViewport::Mobile.frame_width(800.0), 375.0);
        assert_eq!(PreviewViewport::Mobile.frame_width(300.0), 300.0);
        assert_eq!(PreviewViewport::Desktop.frame_width(800.0), 800.0);
    }
}
