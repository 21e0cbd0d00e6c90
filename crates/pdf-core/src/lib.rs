//! PDF Core - Low-level PDF reading and writing
//!
//! This crate provides functionality for:
//! - Opening PDF documents from bytes and saving them back
//! - Drawing filled rectangles, text in the standard 14 fonts, and images
//! - Reading page geometry and text runs (with font metadata) from content streams
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Align, Color, PdfDocument, StandardFont};
//!
//! let mut doc = PdfDocument::open_from_bytes(&bytes)?;
//! doc.fill_rect(1, 90.0, 690.0, 120.0, 20.0, Color::white())?;
//! doc.set_font(StandardFont::Helvetica, 12.0);
//! doc.insert_text("Hello", 1, 100.0, 700.0, Align::Left)?;
//! let out = doc.to_bytes()?;
//! ```

mod document;
mod font;
mod image;
mod reader;
mod text;

pub use document::{Color, PageSize, PdfDocument};
pub use font::{FontClass, FontSet, StandardFont};
pub use image::ImageXObject;
pub use reader::{FontDescriptor, FontStyleInfo, PdfPage, PdfReader, TextContent, TextRun, Viewport};
pub use text::{encode_win_ansi, generate_rect_operators, generate_text_operators, TextRenderContext};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Character {0:?} cannot be encoded in WinAnsiEncoding")]
    UnencodableText(char),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text alignment options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_default() {
        assert_eq!(Align::default(), Align::Left);
    }

    #[test]
    fn test_invalid_page_message() {
        let err = PdfError::InvalidPage(3, 2);
        assert_eq!(err.to_string(), "Invalid page number: 3 (document has 2 pages)");
    }
}
