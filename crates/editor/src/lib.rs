//! Editor - annotation model and PDF compilation for inkpdf
//!
//! This crate provides:
//! - The annotation store (a pure reducer over [`EditorState`])
//! - Text extraction from rendered pages, with bold/italic inference
//! - Overlay geometry for editing extracted text in place
//! - Display <-> document coordinate mapping
//! - Freehand ink rasters and eraser hit tests
//! - Compilation of all edits into a new PDF
//!
//! # Example
//!
//! ```ignore
//! use editor::{load_document, Action, CompileInput, Compiler, StateRasters, Store};
//!
//! let mut store = Store::new();
//! let reader = load_document(&mut store, &pdf_bytes, "report.pdf")?;
//! store.dispatch(Action::SetPaginationEnabled { enabled: true });
//!
//! let state = store.snapshot();
//! let rasters = StateRasters::new(&state);
//! let output = Compiler::default().compile(&CompileInput::from_state(&state, &rasters)?)?;
//! ```

pub mod compile;
pub mod config;
pub mod coords;
pub mod extract;
pub mod ink;
pub mod model;
pub mod overlay;
pub mod render;
mod session;
pub mod source;
pub mod store;

pub use compile::{edited_file_name, CompileInput, Compiler};
pub use config::{ColorSampling, EditorConfig};
pub use coords::{CoordinateMapper, DocumentPoint};
pub use extract::{ExtractionLatch, FontFlags, TextExtractor};
pub use ink::{
    erase_at, InkCanvas, InkSurface, NoRasters, PathRecorder, RasterRegistry, RasterSource,
    StateRasters, StrokeStyle,
};
pub use model::*;
pub use overlay::{EffectiveStyle, ScreenItem};
pub use render::{CancellationToken, LoadGeneration, RenderSlot, RenderTicket};
pub use session::{Compiled, Session, TextEdit};
pub use source::PageSource;
pub use store::{Action, Store};

use pdf_core::{PdfError, PdfReader};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors that can occur while editing or exporting
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Failed to open document: {0}")]
    OpenDocument(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    #[error("Failed to embed ink on page {page}: {message}")]
    Raster { page: usize, message: String },

    #[error("No document loaded")]
    NoDocument,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for editor operations
pub type Result<T> = std::result::Result<T, EditorError>;

/// Parse a document and, only if that succeeds, load it into the store
///
/// Loading replaces all annotations. The returned reader provides the pages
/// for extraction.
pub fn load_document(store: &mut Store, data: &[u8], file_name: &str) -> Result<PdfReader> {
    let reader =
        PdfReader::from_bytes(data).map_err(|e| EditorError::OpenDocument(e.to_string()))?;
    let num_pages = reader.page_count();
    store.dispatch(Action::LoadDocument {
        data: Arc::from(data),
        file_name: file_name.to_string(),
        num_pages,
    });
    info!(file = file_name, pages = num_pages, "loaded document");
    Ok(reader)
}
