//! Display space <-> document space mapping
//!
//! Display space: pixels, origin top-left, y down. Document space: points,
//! origin bottom-left, y up. The mapping uses the dimensions recorded when
//! the page was rendered; a stale record yields misplaced output and is not
//! detected here.

use crate::model::PageDimensions;
use pdf_core::{PageSize, Viewport};

/// A point in document space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentPoint {
    pub x: f64,
    pub y: f64,
}

/// Converts display-space geometry of one page to document space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    page: PageSize,
    scale_x: f64,
    scale_y: f64,
}

impl CoordinateMapper {
    pub fn new(page: PageSize, rendered: &PageDimensions) -> Self {
        Self {
            page,
            scale_x: page.width / rendered.width,
            scale_y: page.height / rendered.height,
        }
    }

    /// Document units per display unit, horizontally
    pub fn scale_x(&self) -> f64 {
        self.scale_x
    }

    pub fn scale_y(&self) -> f64 {
        self.scale_y
    }

    /// Display size to document size (horizontal scale)
    pub fn font_size_to_document(&self, display_size: f64) -> f64 {
        display_size * self.scale_x
    }

    /// Top-left of a display text box to the document baseline of its first
    /// line
    ///
    /// `document_font_size` moves the point one line down from the box top.
    pub fn to_document(&self, x: f64, y: f64, document_font_size: f64) -> DocumentPoint {
        DocumentPoint {
            x: x * self.scale_x,
            y: self.page.height - y * self.scale_y - document_font_size,
        }
    }

    /// Inverse of [`Self::to_document`] with a zero baseline offset
    pub fn to_display_ignoring_baseline(&self, point: DocumentPoint) -> (f64, f64) {
        (
            point.x / self.scale_x,
            (self.page.height - point.y) / self.scale_y,
        )
    }
}

/// Document point to display space through the page viewport
pub fn to_display(viewport: &Viewport, point: DocumentPoint) -> (f64, f64) {
    viewport.convert_to_viewport_point(point.x, point.y)
}
