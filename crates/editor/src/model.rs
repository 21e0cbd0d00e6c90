//! Annotation model types
//!
//! Field names serialize in camelCase so sessions exchanged with a browser
//! host keep the host's JSON shape.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// Fresh opaque identifier for a model record
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// A point in display space (pixels, origin top-left, y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Active editing tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Select,
    Text,
    Draw,
    Highlight,
    Eraser,
}

/// Default box width of a new text block (display units)
pub const DEFAULT_TEXT_BLOCK_WIDTH: f64 = 200.0;

/// Default font family of a new text block
pub const DEFAULT_TEXT_BLOCK_FAMILY: &str = "Helvetica, sans-serif";

/// A user-created free text annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    pub id: String,
    pub page_index: usize,
    /// Top-left corner in display space
    pub x: f64,
    pub y: f64,
    /// Box width used for wrapping
    pub width: f64,
    /// Content, possibly multi-line
    pub text: String,
    pub font_size: f64,
    pub font_family: String,
    /// Hex RGB (`#rrggbb`)
    pub color: String,
    pub bold: bool,
    pub italic: bool,
}

impl TextBlock {
    /// Empty block created by a text-tool click
    pub fn at_click(page_index: usize, at: Point, font_size: f64, color: &str) -> Self {
        Self {
            id: new_id(),
            page_index,
            x: at.x,
            y: at.y,
            width: DEFAULT_TEXT_BLOCK_WIDTH,
            text: String::new(),
            font_size,
            font_family: DEFAULT_TEXT_BLOCK_FAMILY.to_string(),
            color: color.to_string(),
            bold: false,
            italic: false,
        }
    }

    /// Backspace in an empty block deletes it
    pub fn should_delete_on_backspace(&self) -> bool {
        self.text.is_empty()
    }

    /// Apply the fields present in `patch`
    pub(crate) fn apply(&mut self, patch: &TextBlockPatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(text) = &patch.text {
            self.text = text.clone();
        }
        if let Some(font_size) = patch.font_size {
            self.font_size = font_size;
        }
        if let Some(font_family) = &patch.font_family {
            self.font_family = font_family.clone();
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
        if let Some(bold) = patch.bold {
            self.bold = bold;
        }
        if let Some(italic) = patch.italic {
            self.italic = italic;
        }
    }
}

/// Partial update of a [`TextBlock`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextBlockPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
}

/// A committed freehand or highlight stroke
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingPath {
    pub id: String,
    pub page_index: usize,
    /// Display-space points, at least two
    pub points: Vec<Point>,
    pub color: String,
    pub width: f64,
    /// 0.0 - 1.0
    pub opacity: f64,
}

/// User overrides of an extracted run's style; absent fields fall back to
/// the extracted value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleEdits {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css_font_family: Option<String>,
}

impl StyleEdits {
    /// Shallow merge: fields present in `patch` replace ours, the rest stay
    pub fn merge(&mut self, patch: &StyleEdits) {
        if patch.font_size.is_some() {
            self.font_size = patch.font_size;
        }
        if patch.is_bold.is_some() {
            self.is_bold = patch.is_bold;
        }
        if patch.is_italic.is_some() {
            self.is_italic = patch.is_italic;
        }
        if patch.color.is_some() {
            self.color.clone_from(&patch.color);
        }
        if patch.css_font_family.is_some() {
            self.css_font_family.clone_from(&patch.css_font_family);
        }
    }
}

/// One run of original page text, with the user's overrides
///
/// The `pdf_*` fields are document space and never change after
/// extraction; only `edited_str` and `style_edits` are mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedText {
    pub id: String,
    pub page_index: usize,
    pub original_str: String,
    pub edited_str: Option<String>,
    /// Baseline origin (text matrix translation)
    pub pdf_x: f64,
    pub pdf_y: f64,
    pub pdf_font_size: f64,
    pub pdf_width: f64,
    pub pdf_height: f64,
    /// Source font resource name
    pub font_name: String,
    pub css_font_family: String,
    pub is_bold: bool,
    pub is_italic: bool,
    pub color: String,
    pub transform: [f64; 6],
    pub style_edits: Option<StyleEdits>,
}

impl ExtractedText {
    /// The text to show: the user's edit if any, else the original
    pub fn effective_text(&self) -> &str {
        self.edited_str.as_deref().unwrap_or(&self.original_str)
    }

    /// Whether the run has a differing text edit or any style override
    pub fn has_edits(&self) -> bool {
        let text_changed = self
            .edited_str
            .as_ref()
            .is_some_and(|edited| *edited != self.original_str);
        text_changed || self.style_edits.is_some()
    }
}

/// Rendered display size of a page and the scale used to render it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageDimensions {
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

/// Footer text format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationFormat {
    /// "Page 3 / 10"
    #[default]
    PageXOfY,
}

impl PaginationFormat {
    /// Footer text for a 0-based page index
    pub fn render(&self, page_index: usize, total: usize) -> String {
        match self {
            PaginationFormat::PageXOfY => format!("Page {} / {}", page_index + 1, total),
        }
    }
}

/// Footer placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaginationPosition {
    #[default]
    BottomCenter,
    BottomRight,
}

/// Page footer settings, global to the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginationSettings {
    pub enabled: bool,
    pub format: PaginationFormat,
    pub position: PaginationPosition,
    pub font_size: f64,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            format: PaginationFormat::default(),
            position: PaginationPosition::default(),
            font_size: 10.0,
        }
    }
}

/// Aggregate editor state
///
/// Owned by [`crate::store::Store`]; everything else reads snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    /// Original document bytes, shared and never mutated
    pub pdf_data: Option<Arc<[u8]>>,
    pub file_name: String,
    pub num_pages: usize,
    pub current_tool: Tool,
    pub color: String,
    pub font_size: f64,
    pub stroke_width: f64,
    pub text_blocks: Vec<TextBlock>,
    pub drawings: Vec<DrawingPath>,
    pub extracted_texts: Vec<ExtractedText>,
    pub page_dimensions: BTreeMap<usize, PageDimensions>,
    pub zoom: f64,
    pub selected_extracted_text_id: Option<String>,
    pub pagination: PaginationSettings,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            pdf_data: None,
            file_name: String::new(),
            num_pages: 0,
            current_tool: Tool::default(),
            color: "#000000".to_string(),
            font_size: 16.0,
            stroke_width: 3.0,
            text_blocks: Vec::new(),
            drawings: Vec::new(),
            extracted_texts: Vec::new(),
            page_dimensions: BTreeMap::new(),
            zoom: 1.0,
            selected_extracted_text_id: None,
            pagination: PaginationSettings::default(),
        }
    }
}

impl EditorState {
    /// Number of user edits: edited extracted runs, text blocks and drawings
    pub fn edit_count(&self) -> usize {
        let edited_texts = self
            .extracted_texts
            .iter()
            .filter(|text| text.has_edits())
            .count();
        edited_texts + self.text_blocks.len() + self.drawings.len()
    }

    pub fn text_blocks_on(&self, page_index: usize) -> impl Iterator<Item = &TextBlock> {
        self.text_blocks
            .iter()
            .filter(move |block| block.page_index == page_index)
    }

    pub fn drawings_on(&self, page_index: usize) -> impl Iterator<Item = &DrawingPath> {
        self.drawings
            .iter()
            .filter(move |path| path.page_index == page_index)
    }

    pub fn extracted_texts_on(&self, page_index: usize) -> impl Iterator<Item = &ExtractedText> {
        self.extracted_texts
            .iter()
            .filter(move |text| text.page_index == page_index)
    }

    pub fn selected_extracted_text(&self) -> Option<&ExtractedText> {
        let id = self.selected_extracted_text_id.as_deref()?;
        self.extracted_texts.iter().find(|text| text.id == id)
    }
}
