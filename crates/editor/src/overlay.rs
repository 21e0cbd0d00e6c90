//! Overlay reconciliation: effective styles and screen geometry of
//! extracted text

use crate::model::{EditorState, ExtractedText};
use pdf_core::Viewport;
use serde::Serialize;

/// Line height as a multiple of the font size
pub const LINE_HEIGHT: f64 = 1.2;

/// Minimum display width of an overlay box
pub const MIN_SCREEN_WIDTH: f64 = 20.0;

/// Style of an extracted run after applying the user's overrides
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveStyle {
    pub font_size: f64,
    pub is_bold: bool,
    pub is_italic: bool,
    pub color: String,
    pub css_font_family: String,
}

impl EffectiveStyle {
    /// Field-wise override-or-baseline merge
    pub fn of(text: &ExtractedText) -> Self {
        let edits = text.style_edits.as_ref();
        Self {
            font_size: edits
                .and_then(|e| e.font_size)
                .unwrap_or(text.pdf_font_size),
            is_bold: edits.and_then(|e| e.is_bold).unwrap_or(text.is_bold),
            is_italic: edits.and_then(|e| e.is_italic).unwrap_or(text.is_italic),
            color: edits
                .and_then(|e| e.color.clone())
                .unwrap_or_else(|| text.color.clone()),
            css_font_family: edits
                .and_then(|e| e.css_font_family.clone())
                .unwrap_or_else(|| text.css_font_family.clone()),
        }
    }
}

/// Display geometry of one extracted run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenItem {
    pub id: String,
    /// Top-left corner in display space
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub font_size: f64,
    pub style: EffectiveStyle,
}

impl ScreenItem {
    /// Place a run in display space; the box bottom sits on the baseline
    pub fn layout(text: &ExtractedText, viewport: &Viewport) -> Self {
        let style = EffectiveStyle::of(text);
        let (x, baseline_y) = viewport.convert_to_viewport_point(text.pdf_x, text.pdf_y);
        let font_size = style.font_size * viewport.scale;
        let height = (font_size * LINE_HEIGHT).max(text.pdf_height * viewport.scale);
        Self {
            id: text.id.clone(),
            x,
            y: baseline_y - height,
            width: (text.pdf_width * viewport.scale).max(MIN_SCREEN_WIDTH),
            height,
            font_size,
            style,
        }
    }
}

/// Layout every extracted run of a page
pub fn layout_page(state: &EditorState, page_index: usize, viewport: &Viewport) -> Vec<ScreenItem> {
    state
        .extracted_texts_on(page_index)
        .map(|text| ScreenItem::layout(text, viewport))
        .collect()
}

/// CSS font stack for displaying a family
pub fn font_stack(css_family: &str) -> String {
    format!("\"{css_family}\", {css_family}, sans-serif")
}

impl EditorState {
    /// Effective style of the selected extracted run, for a style panel
    pub fn selected_effective_style(&self) -> Option<EffectiveStyle> {
        self.selected_extracted_text().map(EffectiveStyle::of)
    }
}
