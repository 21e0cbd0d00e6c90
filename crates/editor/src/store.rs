//! Annotation store: a pure reducer over [`EditorState`]

use crate::model::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// State transitions
///
/// Serialized as `{"type": "SET_COLOR", "color": "#ff0000"}`.
/// `LoadDocument` carries raw bytes and is not part of the JSON surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Action {
    #[serde(skip)]
    LoadDocument {
        data: Arc<[u8]>,
        file_name: String,
        num_pages: usize,
    },
    SelectTool {
        tool: Tool,
    },
    SetColor {
        color: String,
    },
    SetFontSize {
        size: f64,
    },
    SetStrokeWidth {
        width: f64,
    },
    AddTextBlock {
        block: TextBlock,
    },
    UpdateTextBlock {
        id: String,
        updates: TextBlockPatch,
    },
    DeleteTextBlock {
        id: String,
    },
    AddDrawing {
        drawing: DrawingPath,
    },
    DeleteDrawing {
        id: String,
    },
    ClearPageDrawings {
        page_index: usize,
    },
    SetPageDimensions {
        page_index: usize,
        dimensions: PageDimensions,
    },
    AppendExtractedTexts {
        texts: Vec<ExtractedText>,
    },
    UpdateExtractedText {
        id: String,
        edited_str: String,
    },
    UpdateExtractedTextStyle {
        id: String,
        edits: StyleEdits,
    },
    SelectExtractedText {
        id: Option<String>,
    },
    /// Callers clamp to the zoom bounds; see [`clamp_zoom_step`]
    SetZoom {
        zoom: f64,
    },
    SetPaginationEnabled {
        enabled: bool,
    },
    SetPaginationFormat {
        format: PaginationFormat,
    },
    SetPaginationPosition {
        position: PaginationPosition,
    },
    SetPaginationFontSize {
        font_size: f64,
    },
    Reset,
}

/// Apply an action to a state snapshot
///
/// Returns the same `Arc` when the action changes nothing, so callers can
/// detect no-ops with [`Arc::ptr_eq`].
pub fn reduce(state: &Arc<EditorState>, action: Action) -> Arc<EditorState> {
    let mut next = EditorState::clone(state);
    if apply(&mut next, action) {
        Arc::new(next)
    } else {
        Arc::clone(state)
    }
}

/// Set `slot` to `value`, reporting whether it changed
fn set<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

fn apply(state: &mut EditorState, action: Action) -> bool {
    match action {
        Action::LoadDocument {
            data,
            file_name,
            num_pages,
        } => {
            *state = EditorState {
                pdf_data: Some(data),
                file_name,
                num_pages,
                pagination: std::mem::take(&mut state.pagination),
                ..EditorState::default()
            };
            true
        }
        Action::SelectTool { tool } => {
            let tool_changed = set(&mut state.current_tool, tool);
            let deselected = state.selected_extracted_text_id.take().is_some();
            tool_changed || deselected
        }
        Action::SetColor { color } => set(&mut state.color, color),
        Action::SetFontSize { size } => set(&mut state.font_size, size),
        Action::SetStrokeWidth { width } => set(&mut state.stroke_width, width),
        Action::AddTextBlock { block } => {
            state.text_blocks.push(block);
            true
        }
        Action::UpdateTextBlock { id, updates } => {
            match state.text_blocks.iter_mut().find(|block| block.id == id) {
                Some(block) => {
                    let before = block.clone();
                    block.apply(&updates);
                    *block != before
                }
                None => false,
            }
        }
        Action::DeleteTextBlock { id } => {
            let before = state.text_blocks.len();
            state.text_blocks.retain(|block| block.id != id);
            state.text_blocks.len() != before
        }
        Action::AddDrawing { drawing } => {
            state.drawings.push(drawing);
            true
        }
        Action::DeleteDrawing { id } => {
            let before = state.drawings.len();
            state.drawings.retain(|path| path.id != id);
            state.drawings.len() != before
        }
        Action::ClearPageDrawings { page_index } => {
            let before = state.drawings.len();
            state.drawings.retain(|path| path.page_index != page_index);
            state.drawings.len() != before
        }
        Action::SetPageDimensions {
            page_index,
            dimensions,
        } => state.page_dimensions.insert(page_index, dimensions) != Some(dimensions),
        Action::AppendExtractedTexts { texts } => {
            if texts.is_empty() {
                return false;
            }
            state.extracted_texts.extend(texts);
            true
        }
        Action::UpdateExtractedText { id, edited_str } => {
            match state.extracted_texts.iter_mut().find(|text| text.id == id) {
                Some(text) => set(&mut text.edited_str, Some(edited_str)),
                None => false,
            }
        }
        Action::UpdateExtractedTextStyle { id, edits } => {
            match state.extracted_texts.iter_mut().find(|text| text.id == id) {
                Some(text) => {
                    let before = text.style_edits.clone();
                    text.style_edits.get_or_insert_with(StyleEdits::default).merge(&edits);
                    text.style_edits != before
                }
                None => false,
            }
        }
        Action::SelectExtractedText { id } => set(&mut state.selected_extracted_text_id, id),
        Action::SetZoom { zoom } => set(&mut state.zoom, zoom),
        Action::SetPaginationEnabled { enabled } => set(&mut state.pagination.enabled, enabled),
        Action::SetPaginationFormat { format } => set(&mut state.pagination.format, format),
        Action::SetPaginationPosition { position } => {
            set(&mut state.pagination.position, position)
        }
        Action::SetPaginationFontSize { font_size } => {
            set(&mut state.pagination.font_size, font_size)
        }
        Action::Reset => set(state, EditorState::default()),
    }
}

/// Owner of the current editor state
#[derive(Debug, Default)]
pub struct Store {
    state: Arc<EditorState>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an action; returns whether the state changed
    pub fn dispatch(&mut self, action: Action) -> bool {
        let next = reduce(&self.state, action);
        let changed = !Arc::ptr_eq(&next, &self.state);
        self.state = next;
        changed
    }

    /// Read-only snapshot of the current state
    pub fn snapshot(&self) -> Arc<EditorState> {
        Arc::clone(&self.state)
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }
}

/// Zoom bounds accepted by the viewer
pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 3.0;

/// Next zoom level for a toolbar step, rounded to two decimals
///
/// Returns `None` when the result would leave [`MIN_ZOOM`, `MAX_ZOOM`];
/// the caller then does not dispatch.
pub fn clamp_zoom_step(current: f64, delta: f64) -> Option<f64> {
    let next = ((current + delta) * 100.0).round() / 100.0;
    (MIN_ZOOM..=MAX_ZOOM).contains(&next).then_some(next)
}

/// Font size bounds for the style panel
pub const MIN_FONT_SIZE: f64 = 4.0;
pub const MAX_FONT_SIZE: f64 = 200.0;

/// Step a font size, clamped to [`MIN_FONT_SIZE`, `MAX_FONT_SIZE`]
pub fn step_font_size(current: f64, delta: f64) -> f64 {
    (current + delta).clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}
