//! Page source: the read-side collaborator consumed by extraction

use crate::render::CancellationToken;
use async_trait::async_trait;
use image::RgbaImage;
use pdf_core::{FontDescriptor, PageSize, PdfPage, TextContent, Viewport};
use tracing::debug;

/// A rendered page handle
///
/// Provides structured text content, font descriptor lookups, viewport
/// transforms and (optionally) rasterization.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// 0-based page index
    fn page_index(&self) -> usize;

    /// Page size in points
    fn size(&self) -> PageSize;

    fn text_content(&self) -> pdf_core::Result<TextContent>;

    /// Descriptor for a font id; may take a while to become available
    async fn font_descriptor(&self, font_id: &str) -> Option<FontDescriptor>;

    fn viewport(&self, scale: f64) -> Viewport {
        Viewport::new(self.size(), scale)
    }

    /// Rasterize the full page at `scale`
    ///
    /// `None` when rasterization is unsupported, failed or was cancelled.
    async fn render(&self, scale: f64, token: &CancellationToken) -> Option<RgbaImage>;
}

#[async_trait]
impl PageSource for PdfPage {
    fn page_index(&self) -> usize {
        self.number() - 1
    }

    fn size(&self) -> PageSize {
        PdfPage::size(self)
    }

    fn text_content(&self) -> pdf_core::Result<TextContent> {
        PdfPage::text_content(self)
    }

    async fn font_descriptor(&self, font_id: &str) -> Option<FontDescriptor> {
        PdfPage::font_descriptor(self, font_id)
    }

    fn viewport(&self, scale: f64) -> Viewport {
        PdfPage::viewport(self, scale)
    }

    async fn render(&self, scale: f64, _token: &CancellationToken) -> Option<RgbaImage> {
        debug!(
            page = self.number(),
            scale, "content-stream pages are not rasterized"
        );
        None
    }
}
