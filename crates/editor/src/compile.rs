//! Compilation of editor state into a new PDF

use crate::config::EditorConfig;
use crate::coords::CoordinateMapper;
use crate::ink::RasterSource;
use crate::model::{
    DrawingPath, EditorState, ExtractedText, PageDimensions, PaginationPosition,
    PaginationSettings, TextBlock,
};
use crate::overlay::{EffectiveStyle, LINE_HEIGHT};
use crate::{EditorError, Result};
use pdf_core::{Align, Color, FontSet, PageSize, PdfDocument, StandardFont};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Everything one export reads, borrowed from a state snapshot
pub struct CompileInput<'a> {
    pub pdf_data: &'a [u8],
    pub text_blocks: &'a [TextBlock],
    pub drawings: &'a [DrawingPath],
    pub extracted_texts: &'a [ExtractedText],
    pub page_dimensions: &'a BTreeMap<usize, PageDimensions>,
    pub rasters: &'a dyn RasterSource,
    pub pagination: &'a PaginationSettings,
}

impl<'a> CompileInput<'a> {
    /// Borrow a snapshot; fails when no document is loaded
    pub fn from_state(state: &'a EditorState, rasters: &'a dyn RasterSource) -> Result<Self> {
        let pdf_data = state.pdf_data.as_deref().ok_or(EditorError::NoDocument)?;
        Ok(Self {
            pdf_data,
            text_blocks: &state.text_blocks,
            drawings: &state.drawings,
            extracted_texts: &state.extracted_texts,
            page_dimensions: &state.page_dimensions,
            rasters,
            pagination: &state.pagination,
        })
    }
}

/// Applies text edits, text blocks, ink and footers to a copy of the
/// original document
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: EditorConfig,
}

impl Compiler {
    pub fn new(config: EditorConfig) -> Self {
        Self { config }
    }

    /// Produce the edited document
    ///
    /// The original bytes are never modified; a fresh document is loaded for
    /// every call.
    pub fn compile(&self, input: &CompileInput<'_>) -> Result<Vec<u8>> {
        let mut doc = PdfDocument::open_from_bytes(input.pdf_data)
            .map_err(|e| EditorError::OpenDocument(e.to_string()))?;
        let fonts = doc.embed_font_set();
        let total = doc.page_count();

        for page_index in 0..total {
            let page = page_index + 1;
            let size = doc.page_size(page)?;

            match input.page_dimensions.get(&page_index) {
                Some(dims) => {
                    let mapper = CoordinateMapper::new(size, dims);
                    self.redraw_extracted(&mut doc, &fonts, input, page_index)?;
                    self.draw_text_blocks(&mut doc, &fonts, &mapper, input, page_index)?;
                    self.draw_ink(&mut doc, input, page_index, size)?;
                }
                None => debug!(page = page_index, "no rendered dimensions, skipping edits"),
            }

            if input.pagination.enabled {
                self.draw_footer(&mut doc, input.pagination, page_index, total, size)?;
            }
        }

        let bytes = doc.to_bytes()?;
        info!(
            pages = total,
            text_blocks = input.text_blocks.len(),
            drawings = input.drawings.len(),
            bytes = bytes.len(),
            "compiled edited document"
        );
        Ok(bytes)
    }

    /// Cover each edited run with white and draw its replacement
    fn redraw_extracted(
        &self,
        doc: &mut PdfDocument,
        fonts: &FontSet,
        input: &CompileInput<'_>,
        page_index: usize,
    ) -> Result<()> {
        let page = page_index + 1;
        let edited = input
            .extracted_texts
            .iter()
            .filter(|text| text.page_index == page_index && text.has_edits());

        for text in edited {
            let fs = text.pdf_font_size;
            doc.fill_rect(
                page,
                text.pdf_x - 0.2 * fs,
                text.pdf_y - 0.3 * fs,
                text.pdf_width + 0.4 * fs,
                1.4 * fs,
                Color::white(),
            )?;

            let content = text.effective_text();
            if content.trim().is_empty() {
                continue;
            }
            let style = EffectiveStyle::of(text);
            let face = fonts.resolve(&style.css_font_family, style.is_bold, style.is_italic);
            debug!(page = page_index, id = %text.id, font = face.base_font(), "redrawing edited run");
            doc.set_font(face, style.font_size);
            doc.set_text_color(Color::from_hex(&style.color));
            doc.insert_text(content, page, text.pdf_x, text.pdf_y, Align::Left)?;
        }
        Ok(())
    }

    /// Draw free text blocks line by line
    fn draw_text_blocks(
        &self,
        doc: &mut PdfDocument,
        fonts: &FontSet,
        mapper: &CoordinateMapper,
        input: &CompileInput<'_>,
        page_index: usize,
    ) -> Result<()> {
        let page = page_index + 1;
        let blocks = input
            .text_blocks
            .iter()
            .filter(|block| block.page_index == page_index && !block.text.trim().is_empty());

        for block in blocks {
            let font_size = mapper.font_size_to_document(block.font_size);
            let anchor = mapper.to_document(block.x, block.y, font_size);
            doc.set_font(fonts.sans(block.bold, block.italic), font_size);
            doc.set_text_color(Color::from_hex(&block.color));

            for (k, line) in block.text.split('\n').enumerate() {
                let y = anchor.y - k as f64 * font_size * LINE_HEIGHT;
                doc.insert_text(line.trim_end_matches('\r'), page, anchor.x, y, Align::Left)?;
            }
        }
        Ok(())
    }

    /// Lay the page's ink raster over the whole page
    fn draw_ink(
        &self,
        doc: &mut PdfDocument,
        input: &CompileInput<'_>,
        page_index: usize,
        size: PageSize,
    ) -> Result<()> {
        let Some(png) = input.rasters.page_raster(page_index)? else {
            return Ok(());
        };
        debug!(page = page_index, bytes = png.len(), "embedding ink raster");
        doc.insert_image(&png, page_index + 1, 0.0, 0.0, size.width, size.height)
            .map_err(|e| EditorError::Raster {
                page: page_index,
                message: e.to_string(),
            })
    }

    fn draw_footer(
        &self,
        doc: &mut PdfDocument,
        pagination: &PaginationSettings,
        page_index: usize,
        total: usize,
        size: PageSize,
    ) -> Result<()> {
        let label = pagination.format.render(page_index, total);
        doc.set_font(StandardFont::Helvetica, pagination.font_size);
        doc.set_text_color(Color::gray(self.config.footer_gray));

        let (x, align) = match pagination.position {
            PaginationPosition::BottomCenter => (size.width / 2.0, Align::Center),
            PaginationPosition::BottomRight => (size.width - self.config.footer_margin, Align::Right),
        };
        doc.insert_text(&label, page_index + 1, x, self.config.footer_baseline, align)?;
        Ok(())
    }
}

/// Download name for an edited copy: `report.PDF` -> `report_edited.pdf`
pub fn edited_file_name(original: &str) -> String {
    let lower = original.to_ascii_lowercase();
    let base = if lower.ends_with(".pdf") {
        &original[..original.len() - 4]
    } else {
        original
    };
    format!("{base}_edited.pdf")
}
